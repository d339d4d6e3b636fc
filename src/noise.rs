//! Collapse three YM noise mixers into one SN noise channel (component G).

use crate::model::{NoiseRate, Voice};
use crate::volume;

/// SN76489's three fixed white-noise rate divisors.
const FIXED_RATE_DIVISORS: [u32; 3] = [512, 1024, 2048];

/// Resolved noise state for a frame, before the arbiter (F) has a chance to
/// override the rate for tuned-white-noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollapsedNoise {
    /// Attenuation to apply to the noise channel; silent if no voice
    /// enables noise this frame.
    pub atten: u8,
    /// Selected fixed noise rate, nearest to the YM noise frequency.
    pub rate: NoiseRate,
}

/// Collapse the three voices' noise-mix state and the shared YM noise
/// period into one SN noise channel.
///
/// The dominant-source rule is used for volume: averaging the contributing
/// voices' volumes produced audibly under-powered noise in practice, so the
/// loudest contributing voice wins outright.
pub fn collapse(
    voices: &[Voice; 3],
    raw_volumes: [u8; 3],
    noise_period: u8,
    source_clock_hz: u32,
    target_clock_hz: u32,
) -> CollapsedNoise {
    let contributing: Vec<usize> = (0..3).filter(|&i| voices[i].noise_on).collect();
    if contributing.is_empty() {
        return CollapsedNoise {
            atten: volume::SN_ATTEN_SILENT,
            rate: NoiseRate::Rate0,
        };
    }

    let loudest = contributing
        .iter()
        .copied()
        .max_by_key(|&i| raw_volumes[i])
        .unwrap();
    let atten = volume::map_linear(raw_volumes[loudest]);

    let ym_noise_hz = source_clock_hz as f64 / (16.0 * noise_period.max(1) as f64);
    let rate = nearest_fixed_rate(ym_noise_hz, target_clock_hz);

    CollapsedNoise { atten, rate }
}

fn nearest_fixed_rate(desired_hz: f64, target_clock_hz: u32) -> NoiseRate {
    let variants = [NoiseRate::Rate0, NoiseRate::Rate1, NoiseRate::Rate2];
    let mut best = variants[0];
    let mut best_err = f64::MAX;
    for (i, divisor) in FIXED_RATE_DIVISORS.iter().enumerate() {
        let hz = target_clock_hz as f64 / *divisor as f64;
        let err = (hz - desired_hz).abs();
        if err < best_err {
            best_err = err;
            best = variants[i];
        }
    }
    best
}
