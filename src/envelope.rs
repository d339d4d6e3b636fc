//! Envelope generator simulation (component B).
//!
//! Models the YM2149's 32-step hardware envelope: a 5-bit counter that
//! ramps up or down depending on the 4-bit shape register, with continue/
//! attack/alternate/hold bits controlling what happens once the counter
//! wraps past 31.

/// One of the 16 hardware envelope shapes (CAAH bits of R13).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeShape {
    /// Continue bit: if clear, the envelope holds at its terminal level
    /// after one pass regardless of the other bits.
    pub continue_bit: bool,
    /// Attack bit: counter counts up (true) or down (false) on the first pass.
    pub attack: bool,
    /// Alternate bit: direction flips every pass when continuing.
    pub alternate: bool,
    /// Hold bit: counter freezes at the end of the first pass when continuing.
    pub hold: bool,
}

impl EnvelopeShape {
    /// Decode a 4-bit shape register value.
    pub fn from_bits(bits: u8) -> Self {
        EnvelopeShape {
            continue_bit: bits & 0x08 != 0,
            attack: bits & 0x04 != 0,
            alternate: bits & 0x02 != 0,
            hold: bits & 0x01 != 0,
        }
    }
}

/// Current phase of the envelope ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running { counting_up: bool },
    HoldLow,
    HoldHigh,
}

/// Persistent envelope generator state, advanced once per output tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeState {
    /// 5-bit position within the current ramp pass (0..=31).
    counter: u32,
    shape: EnvelopeShape,
    phase: Phase,
    /// Sub-step accumulator tracking fractional envelope clocks carried
    /// over between output ticks.
    sub_clock: u64,
}

impl EnvelopeState {
    /// Construct a fresh generator, as if shape 0 had just been written.
    pub fn new() -> Self {
        let mut state = EnvelopeState {
            counter: 0,
            shape: EnvelopeShape::from_bits(0),
            phase: Phase::Running { counting_up: false },
            sub_clock: 0,
        };
        state.retrigger(0);
        state
    }

    /// Apply a write to the envelope shape register, resetting the ramp.
    ///
    /// If this write lands on the same tick the envelope would naturally
    /// have expired, the retrigger wins: the counter resets before this
    /// tick's advance runs, matching the order writes land relative to the
    /// chip's own clock.
    pub fn retrigger(&mut self, shape_bits: u8) {
        self.shape = EnvelopeShape::from_bits(shape_bits);
        self.counter = 0;
        self.sub_clock = 0;
        self.phase = Phase::Running {
            counting_up: self.shape.attack,
        };
    }

    /// Advance the envelope by `period_ticks` YM clocks divided by 256
    /// (one envelope "step" per such unit), returning the sampled 4-bit
    /// level at the end of the advance.
    ///
    /// `env_period` of 0 is treated as 1, matching hardware wraparound.
    /// Long periods are skipped analytically rather than iterated.
    pub fn advance(&mut self, env_period: u16, source_clock_hz: u32, duration_samples: u64) -> u8 {
        let period = env_period.max(1) as u64;
        // Envelope clock: source_clock_hz / (256 * period) steps per second,
        // at a VGM-stream sample rate of 44100 Hz; fold into 32-bit fixed
        // point milli-step accumulation to stay deterministic cross-platform.
        let steps_num = (source_clock_hz as u64) * duration_samples;
        let steps_den = 256 * period * 44_100;
        let mut total = self.sub_clock + steps_num;
        let mut steps = total / steps_den;
        total %= steps_den;
        self.sub_clock = total;

        while steps > 0 {
            match self.phase {
                Phase::HoldLow | Phase::HoldHigh => {
                    // Frozen; nothing left to advance but still consume the budget.
                    steps = 0;
                }
                Phase::Running { counting_up } => {
                    let remaining_in_pass = 32 - self.counter;
                    if steps < remaining_in_pass as u64 {
                        self.counter += steps as u32;
                        steps = 0;
                    } else {
                        steps -= remaining_in_pass as u64;
                        self.counter = 31;
                        self.finish_pass(counting_up);
                    }
                }
            }
        }
        self.sample_level()
    }

    fn finish_pass(&mut self, counting_up: bool) {
        if !self.shape.continue_bit {
            // One-shot (shapes 0x00-0x07): always settles at level 0,
            // regardless of the attack bit.
            self.phase = Phase::HoldLow;
            return;
        }
        if self.shape.hold {
            self.phase = if counting_up ^ self.shape.alternate {
                Phase::HoldHigh
            } else {
                Phase::HoldLow
            };
            return;
        }
        let next_up = if self.shape.alternate {
            !counting_up
        } else {
            counting_up
        };
        self.counter = 0;
        self.phase = Phase::Running {
            counting_up: next_up,
        };
    }

    fn sample_level(&self) -> u8 {
        match self.phase {
            Phase::HoldLow => 0,
            Phase::HoldHigh => 15,
            Phase::Running { counting_up } => {
                let step = (self.counter / 2) as u8; // 32 counter steps -> 16 levels
                if counting_up {
                    step
                } else {
                    15 - step
                }
            }
        }
    }
}

impl Default for EnvelopeState {
    fn default() -> Self {
        Self::new()
    }
}
