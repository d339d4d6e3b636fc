//! Frequency re-ranging: YM tone frequency -> SN tone register (component D).

use crate::config::LfsrTap;

/// Lowest representable SN76489 tone register value; below this the period
/// is clamped and treated as silence by convention (`n == 0` aliases to a
/// maximal, inaudibly low tone on real hardware).
pub const SN_TONE_MIN: u16 = 1;
/// Highest representable SN76489 tone register value (10 bits).
pub const SN_TONE_MAX: u16 = 1023;

/// How a desired frequency classified against the SN's representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreqClass {
    /// Directly representable as an SN tone period.
    InRange(u16),
    /// Too high for a 10-bit period at this octave; callers should fold down.
    TooHigh,
    /// Too low for a 10-bit period; eligible for periodic-noise bass or
    /// software-bass if nothing else claims the channel.
    TooLow,
}

/// Map a target frequency to the SN76489 tone period at `target_clock_hz`,
/// without any octave folding. `round-half-to-even` on the nearest integer
/// keeps results deterministic across platforms.
fn tone_period_for(freq_hz: f64, target_clock_hz: u32) -> i64 {
    if freq_hz <= 0.0 {
        return i64::MAX;
    }
    let exact = target_clock_hz as f64 / (32.0 * freq_hz);
    round_half_to_even(exact)
}

/// Deterministic round-half-to-even, avoiding platform-dependent rounding
/// modes in floating point arithmetic.
pub fn round_half_to_even(x: f64) -> i64 {
    let floor = x.floor();
    let diff = x - floor;
    let floor_i = floor as i64;
    if diff < 0.5 {
        floor_i
    } else if diff > 0.5 {
        floor_i + 1
    } else if floor_i % 2 == 0 {
        floor_i
    } else {
        floor_i + 1
    }
}

/// Classify `freq_hz` against the SN76489's representable tone range,
/// returning the raw (unfolded) result.
pub fn classify(freq_hz: f64, target_clock_hz: u32) -> FreqClass {
    if freq_hz <= 0.0 {
        return FreqClass::TooLow;
    }
    let n = tone_period_for(freq_hz, target_clock_hz);
    if n < SN_TONE_MIN as i64 {
        FreqClass::TooHigh
    } else if n > SN_TONE_MAX as i64 {
        FreqClass::TooLow
    } else {
        FreqClass::InRange(n as u16)
    }
}

/// Fold `freq_hz` down by octaves (halving) until it lands in-range on the
/// SN, bounded to 8 octaves before saturating at the minimum tone register.
/// Ties are broken toward whichever octave minimises absolute cents error.
pub fn fold_down_to_range(freq_hz: f64, target_clock_hz: u32) -> u16 {
    let mut candidates: Vec<(f64, u16)> = Vec::new();
    let mut f = freq_hz;
    for _ in 0..8 {
        f /= 2.0;
        match classify(f, target_clock_hz) {
            FreqClass::InRange(n) => candidates.push((f, n)),
            FreqClass::TooHigh => continue,
            FreqClass::TooLow => break,
        }
    }
    if candidates.is_empty() {
        return SN_TONE_MAX;
    }
    candidates
        .into_iter()
        .min_by(|(fa, na), (fb, nb)| {
            let actual_a = target_clock_hz as f64 / (32.0 * *na as f64);
            let actual_b = target_clock_hz as f64 / (32.0 * *nb as f64);
            let cents_a = (1200.0 * (actual_a / fa).log2()).abs();
            let cents_b = (1200.0 * (actual_b / fb).log2()).abs();
            cents_a.partial_cmp(&cents_b).unwrap()
        })
        .unwrap()
        .1
}

/// Compute the SN76489 periodic-noise tone register that best reproduces
/// `freq_hz` as a noise pitch, given the configured LFSR tap divisor.
pub fn periodic_noise_period(freq_hz: f64, target_clock_hz: u32, tap: LfsrTap) -> Option<u16> {
    if freq_hz <= 0.0 {
        return None;
    }
    let divisor = match tap {
        LfsrTap::Bit15 => 15.0,
        LfsrTap::Bit16 => 16.0,
    };
    let exact = target_clock_hz as f64 / (32.0 * divisor * freq_hz);
    let n = round_half_to_even(exact);
    if (SN_TONE_MIN as i64..=SN_TONE_MAX as i64).contains(&n) {
        Some(n as u16)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_tone_matches_hand_computed_period() {
        // 440 Hz at a 4 MHz target clock.
        let class = classify(440.0, 4_000_000);
        match class {
            FreqClass::InRange(n) => assert_eq!(n, 284),
            other => panic!("expected in-range, got {:?}", other),
        }
    }

    #[test]
    fn very_low_frequency_is_too_low() {
        assert_eq!(classify(20.0, 4_000_000), FreqClass::TooLow);
    }

    #[test]
    fn very_high_frequency_is_too_high() {
        assert_eq!(classify(30_000.0, 4_000_000), FreqClass::TooHigh);
    }

    #[test]
    fn fold_down_brings_high_tone_into_range() {
        let n = fold_down_to_range(30_000.0, 4_000_000);
        assert!((SN_TONE_MIN..=SN_TONE_MAX).contains(&n));
    }

    #[test]
    fn periodic_noise_period_is_in_range_for_bass_frequency() {
        let n = periodic_noise_period(30.0, 4_000_000, LfsrTap::Bit15);
        assert!(n.is_some());
        let n = n.unwrap();
        assert!((SN_TONE_MIN..=SN_TONE_MAX).contains(&n));
    }

    #[test]
    fn round_half_to_even_matches_banker_rounding() {
        assert_eq!(round_half_to_even(2.5), 2);
        assert_eq!(round_half_to_even(3.5), 4);
        assert_eq!(round_half_to_even(2.4), 2);
        assert_eq!(round_half_to_even(2.6), 3);
    }
}
