//! End-to-end scenarios exercising the full reader-less pipeline: a
//! hand-built frame sequence through `convert::convert`, decoding the
//! resulting SN76489 command stream back into register values.

use ym2sn::{convert, model::YmFrame, ConversionConfig, SnCommand, SnRegister};

fn base_frame() -> YmFrame {
    YmFrame::default()
}

/// Decode the two-byte tone write pair for `channel` out of a command
/// stream into `(period, software_bass_flag)`.
fn decode_tone(commands: &[SnCommand], channel: u8) -> (u16, bool) {
    let mut latch = None;
    let mut data = None;
    for cmd in commands {
        if let SnCommand::Write { register: SnRegister::Tone(ch), value } = cmd {
            if *ch != channel {
                continue;
            }
            if value & 0x80 != 0 {
                latch = Some(*value);
            } else {
                data = Some(*value);
            }
        }
    }
    let latch = latch.expect("tone latch byte not found");
    let data = data.expect("tone data byte not found");
    let period = (latch as u16 & 0x0F) | ((data as u16 & 0x3F) << 4);
    (period, data & 0x40 != 0)
}

fn decode_atten(commands: &[SnCommand], channel: u8) -> u8 {
    let register = if channel < 3 {
        SnRegister::Attenuation(channel)
    } else {
        SnRegister::NoiseAttenuation
    };
    commands
        .iter()
        .find_map(|cmd| match cmd {
            SnCommand::Write { register: r, value } if *r == register => Some(value & 0x0F),
            _ => None,
        })
        .expect("attenuation write not found")
}

/// E1: a single mid-range tone on voice A, everything else muted, clock
/// matched between source and target so the expected period is exact.
#[test]
fn e1_single_voice_in_range_tone() {
    let mut config = ConversionConfig::default();
    config.source_clock_hz = 2_000_000;
    config.target_clock_hz = 2_000_000;

    let frame = YmFrame {
        tone_period: [0x1C2, 0, 0],
        mixer: 0b0011_1110, // tone A enabled (bit0=0), B/C tone disabled, all noise disabled
        level: [15, 0, 0],
        ..base_frame()
    };

    let (commands, report) = convert::convert(&[frame], &config, None).unwrap();
    assert_eq!(report.frames_processed, 1);

    // source == target clock, so the SN period is exactly half the YM
    // period (tone divisors of 16 vs 32): 0x1C2 / 2 = 225.
    let (period_a, _) = decode_tone(&commands, 0);
    assert_eq!(period_a, 225);
    assert_eq!(decode_atten(&commands, 0), 0);
    assert_eq!(decode_atten(&commands, 1), 0x0F);
    assert_eq!(decode_atten(&commands, 2), 0x0F);
    assert_eq!(decode_atten(&commands, 3), 0x0F);
}

/// E2: a too-low voice on C claims the noise channel as periodic-noise
/// bass; its own tone channel is silenced and the shared noise channel
/// carries its volume instead.
#[test]
fn e2_periodic_noise_bass_claims_channel_c() {
    let config = ConversionConfig::default();

    let frame = YmFrame {
        tone_period: [0, 0, 0x0FFF],
        mixer: 0b0011_1011, // tone C enabled, A/B tone disabled, all noise disabled
        level: [0, 0, 10],
        ..base_frame()
    };

    let (commands, _report) = convert::convert(&[frame], &config, None).unwrap();

    let (tone_c, software_bass) = decode_tone(&commands, 2);
    assert!((1..=1023).contains(&tone_c));
    assert!(!software_bass);
    assert_eq!(decode_atten(&commands, 2), 0x0F);
    assert_ne!(decode_atten(&commands, 3), 0x0F);
}

/// E3: same as E2 but with software bass enabled; the too-low voice is
/// instead encoded directly on its own channel with the out-of-band flag.
#[test]
fn e3_software_bass_flag_set_on_channel_c() {
    let mut config = ConversionConfig::default();
    config.software_bass = true;

    let frame = YmFrame {
        tone_period: [0, 0, 0x0FFF],
        mixer: 0b0011_1011,
        level: [0, 0, 10],
        ..base_frame()
    };

    let (commands, _report) = convert::convert(&[frame], &config, None).unwrap();

    let (_tone_c, software_bass) = decode_tone(&commands, 2);
    assert!(software_bass);
    assert_ne!(decode_atten(&commands, 2), 0x0F);
}

/// E4: two tone voices plus voice A also driving the shared noise
/// generator; the collapsed noise channel adopts voice A's volume and one
/// of the three fixed noise rates.
#[test]
fn e4_noise_collapses_to_a_fixed_rate_with_dominant_volume() {
    let config = ConversionConfig::default();

    let frame = YmFrame {
        tone_period: [0x100, 0x180, 0],
        mixer: 0b0011_0100, // tone A, tone B, noise A enabled
        level: [12, 8, 0],
        noise_period: 0x10,
        ..base_frame()
    };

    let (commands, _report) = convert::convert(&[frame], &config, None).unwrap();
    assert_eq!(decode_atten(&commands, 3), ym2sn::volume::map_linear(12));
}

/// Value of channel `0`'s attenuation register at the end of each frame
/// (after any writes for that frame, before the next frame's writes begin).
fn attenuation_trace(commands: &[SnCommand]) -> Vec<u8> {
    let mut current = None;
    let mut trace = Vec::new();
    for cmd in commands {
        match cmd {
            SnCommand::Write { register: SnRegister::Attenuation(0), value } => {
                current = Some(value & 0x0F);
            }
            SnCommand::Wait { .. } => {
                if let Some(v) = current {
                    trace.push(v);
                }
            }
            _ => {}
        }
    }
    trace
}

/// E5: shape 0x0E (continue, attack, alternate, no hold) is a hardware
/// triangle, not a continuously rising sawtooth: the counter ramps up for
/// one pass, then `alternate` flips direction and it ramps back down. This
/// is confirmed against `ay3_8910.rs`'s `envelope_amplitude` and
/// `envelope_generator.rs`'s `ENVELOPE_TABLE` in the reference pack, both of
/// which hold at 0 (not 15) for one-shot shapes and treat 0x0E as
/// alternating. A 51_200 Hz source clock and an envelope period of 1 are
/// chosen so each 50 Hz frame advances the counter by exactly 4 of its 32
/// steps, with zero fractional carry between frames, making the expected
/// envelope level at every frame boundary exactly computable by hand.
#[test]
fn e5_triangle_envelope_rises_then_falls_across_frames() {
    let mut config = ConversionConfig::default();
    config.source_clock_hz = 51_200; // 200 Hz tone A at period 16, and a clean 4-step/frame envelope advance

    let mut frames = Vec::new();
    for i in 0..64 {
        frames.push(YmFrame {
            tone_period: [16, 0, 0],
            mixer: 0b0011_1110,
            level: [0x10, 0, 0], // envelope-selected
            env_period: 1,
            env_shape: 0x0E,
            env_shape_written: i == 0,
            ..base_frame()
        });
    }

    let (commands, report) = convert::convert(&frames, &config, None).unwrap();
    assert_eq!(report.frames_processed, 64);

    // One 16-frame triangle cycle: rises 2,4,..,14, peaks at 15, then falls
    // 13,11,..,1, bottoms at 0, repeating four times over 64 frames.
    let cycle: [u8; 16] = [2, 4, 6, 8, 10, 12, 14, 15, 13, 11, 9, 7, 5, 3, 1, 0];
    let expected_levels: Vec<u8> = cycle.iter().cycle().take(64).copied().collect();
    let expected_attens: Vec<u8> =
        expected_levels.iter().map(|&level| ym2sn::volume::map_linear(level)).collect();

    assert_eq!(attenuation_trace(&commands), expected_attens);
}

/// E6: ten identical frames should only ever emit the first frame's
/// register writes, with every later frame contributing just its `Wait`.
#[test]
fn e6_unchanged_frames_suppress_redundant_writes() {
    let config = ConversionConfig::default();
    let frame = YmFrame {
        tone_period: [0x1C2, 0, 0],
        mixer: 0b0011_1110,
        level: [15, 0, 0],
        ..base_frame()
    };
    let frames = vec![frame; 10];

    let (commands, report) = convert::convert(&frames, &config, None).unwrap();
    assert_eq!(report.frames_processed, 10);

    let write_count = commands
        .iter()
        .filter(|c| matches!(c, SnCommand::Write { .. }))
        .count();
    // First frame: 3 channels * (tone latch + tone data + atten) + noise + noise atten = 11.
    assert_eq!(write_count, 11);
    let wait_count = commands.iter().filter(|c| matches!(c, SnCommand::Wait { .. })).count();
    assert_eq!(wait_count, 10);
}
