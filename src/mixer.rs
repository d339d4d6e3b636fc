//! YM2149 mixer control register (R7) decoding.
//!
//! The hardware encodes "enabled" as a low bit; callers of this module see
//! the normalized active-high view instead.

use bitflags::bitflags;

bitflags! {
    /// Mixer control register (R7) bitflags, active-low on the hardware.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MixerFlags: u8 {
        /// Channel A tone disable (1 = disabled).
        const CH_A_TONE = 0x01;
        /// Channel B tone disable.
        const CH_B_TONE = 0x02;
        /// Channel C tone disable.
        const CH_C_TONE = 0x04;
        /// Channel A noise disable.
        const CH_A_NOISE = 0x08;
        /// Channel B noise disable.
        const CH_B_NOISE = 0x10;
        /// Channel C noise disable.
        const CH_C_NOISE = 0x20;
    }
}

impl MixerFlags {
    /// Build flags from a raw register value, ignoring unused high bits.
    pub fn from_register(value: u8) -> Self {
        MixerFlags::from_bits_truncate(value)
    }

    /// Whether `voice`'s tone output is enabled (active-high view).
    pub fn tone_enabled(&self, voice: usize) -> bool {
        let bit = [
            MixerFlags::CH_A_TONE,
            MixerFlags::CH_B_TONE,
            MixerFlags::CH_C_TONE,
        ][voice];
        !self.contains(bit)
    }

    /// Whether `voice`'s noise output is enabled (active-high view).
    pub fn noise_enabled(&self, voice: usize) -> bool {
        let bit = [
            MixerFlags::CH_A_NOISE,
            MixerFlags::CH_B_NOISE,
            MixerFlags::CH_C_NOISE,
        ][voice];
        !self.contains(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_zero_register_enables_everything() {
        let flags = MixerFlags::from_register(0x00);
        for v in 0..3 {
            assert!(flags.tone_enabled(v));
            assert!(flags.noise_enabled(v));
        }
    }

    #[test]
    fn all_one_register_disables_everything() {
        let flags = MixerFlags::from_register(0xFF);
        for v in 0..3 {
            assert!(!flags.tone_enabled(v));
            assert!(!flags.noise_enabled(v));
        }
    }

    #[test]
    fn channel_bits_are_independent() {
        // Only channel B tone disabled.
        let flags = MixerFlags::from_register(0x02);
        assert!(flags.tone_enabled(0));
        assert!(!flags.tone_enabled(1));
        assert!(flags.tone_enabled(2));
        assert!(flags.noise_enabled(0));
        assert!(flags.noise_enabled(1));
        assert!(flags.noise_enabled(2));
    }
}
