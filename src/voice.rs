//! Per-frame voice derivation (component C).

use crate::mixer::MixerFlags;
use crate::model::{Voice, YmFrame};

/// Derive the three YM voices' per-frame state from a register frame and
/// the envelope levels already sampled for this frame (one per voice that
/// selects the envelope; voices that don't select it are passed `None` and
/// ignore the argument).
pub fn derive_voices(frame: &YmFrame, source_clock_hz: u32, env_levels: [u8; 3]) -> [Voice; 3] {
    let mixer = MixerFlags::from_register(frame.mixer);
    let mut voices = [Voice {
        freq_hz: 0.0,
        raw_volume: 0,
        env_selected: false,
        tone_on: false,
        noise_on: false,
    }; 3];

    for i in 0..3 {
        let period = frame.tone_period[i].max(1);
        let freq_hz = source_clock_hz as f64 / (16.0 * period as f64);
        let env_selected = frame.envelope_selected(i);
        let raw_volume = if env_selected {
            env_levels[i]
        } else {
            frame.fixed_volume(i)
        };
        voices[i] = Voice {
            freq_hz,
            raw_volume,
            env_selected,
            tone_on: mixer.tone_enabled(i),
            noise_on: mixer.noise_enabled(i),
        };
    }
    voices
}
