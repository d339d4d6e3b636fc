//! Channel Arbiter (component F): resolves contention for SN channel C
//! between tuned white noise, periodic-noise bass, and normal tone duty.

use crate::config::ConversionConfig;
use crate::freq::{self, FreqClass};
use crate::model::{NoiseFeedback, NoiseRate, SnFrame, Voice, SN_ATTEN_SILENT, SN_TONE_OFF};
use crate::noise;
use crate::volume;

/// Per-voice bass-frame tallies from an optional offline pre-scan, used
/// only to break ties between multiple bass-eligible voices.
#[derive(Debug, Clone, Copy, Default)]
pub struct BassBias {
    /// Count of frames in which each voice (A, B, C) classified `too_low`.
    pub counts: [u32; 3],
}

/// A non-fatal condition observed while arbitrating this frame, surfaced to
/// the caller's running [`crate::convert::ConversionReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterEvent {
    /// A voice's tone was folded down by one or more octaves to fit the SN.
    OctaveFolded { voice: usize },
    /// A too-low voice could not be serviced this frame (no bass channel
    /// available and software bass disabled) and was silenced instead.
    SilencedUnreachable { voice: usize },
    /// Both percussive noise-tuning and periodic-noise bass wanted channel
    /// C this frame; percussive noise won.
    BassNoiseContention,
}

/// Resolve one frame's worth of voice + noise state into the SN76489's
/// register-level shape, recording any compromises as [`ArbiterEvent`]s.
pub fn arbitrate(
    voices: &[Voice; 3],
    noise_period: u8,
    config: &ConversionConfig,
    bias: &BassBias,
    events: &mut Vec<ArbiterEvent>,
) -> SnFrame {
    let mut frame = SnFrame::default();

    let raw_volumes = [voices[0].raw_volume, voices[1].raw_volume, voices[2].raw_volume];
    let collapsed = noise::collapse(
        voices,
        raw_volumes,
        noise_period,
        config.source_clock_hz,
        config.target_clock_hz,
    );
    frame.atten[3] = collapsed.atten;
    frame.noise_rate = collapsed.rate;
    frame.noise_feedback = if noise_period > 0 {
        NoiseFeedback::White
    } else {
        NoiseFeedback::Periodic
    };

    let any_noise_enabled = (0..3).any(|i| voices[i].noise_on);
    let percussive_noise_active =
        config.tuned_white_noise && any_noise_enabled && noise_period > 1;

    // Classify each voice up front so bass candidates can be compared.
    let classes: [FreqClass; 3] = [
        freq::classify(voices[0].freq_hz, config.target_clock_hz),
        freq::classify(voices[1].freq_hz, config.target_clock_hz),
        freq::classify(voices[2].freq_hz, config.target_clock_hz),
    ];

    let mut channel_c_claimed_by_noise = false;
    let wanted_bass_voice = select_bass_voice(voices, &classes, config, bias);

    if percussive_noise_active {
        // Channel C's tone divider now drives the noise pitch directly.
        if let Some(n) = freq::periodic_noise_period(
            noise_source_freq(config.source_clock_hz, noise_period),
            config.target_clock_hz,
            config.lfsr_tap,
        ) {
            frame.tone[2] = n;
        } else {
            frame.tone[2] = SN_TONE_OFF;
        }
        frame.atten[2] = SN_ATTEN_SILENT;
        frame.noise_rate = NoiseRate::ToneC;
        channel_c_claimed_by_noise = true;

        if wanted_bass_voice.is_some() {
            events.push(ArbiterEvent::BassNoiseContention);
        }
    }

    let bass_candidate = if !channel_c_claimed_by_noise {
        wanted_bass_voice
    } else {
        None
    };

    if let Some(bass_voice) = bass_candidate {
        let freq_hz = voices[bass_voice].freq_hz;
        if let Some(n) =
            freq::periodic_noise_period(freq_hz, config.target_clock_hz, config.lfsr_tap)
        {
            frame.tone[2] = n;
            frame.atten[2] = SN_ATTEN_SILENT;
            frame.atten[3] = volume::map_linear(voices[bass_voice].raw_volume);
            frame.noise_rate = NoiseRate::ToneC;
        }
    }

    // Normal tone assignment: identity mapping A->0, B->1, C->2, except
    // where channel C has already been claimed above.
    for i in 0..3 {
        if i == 2 && (channel_c_claimed_by_noise || bass_candidate.is_some()) {
            if i != bass_candidate.unwrap_or(usize::MAX)
                && matches!(classes[2], FreqClass::TooLow)
                && !voices[2].is_silent()
            {
                events.push(ArbiterEvent::SilencedUnreachable { voice: 2 });
            }
            continue;
        }
        assign_tone_channel(i, i, voices, &classes, config, &mut frame, events);
    }

    apply_channel_filter(config, &mut frame);
    frame
}

fn noise_source_freq(source_clock_hz: u32, noise_period: u8) -> f64 {
    source_clock_hz as f64 / (16.0 * noise_period.max(1) as f64)
}

/// A too-low voice is only a periodic-noise-bass *candidate* if software
/// bass won't already claim it directly: per 4.3's classification
/// contract, `software_bass`-representable voices are handled entirely by
/// the Software-Bass Encoder and never contend for the noise channel.
fn select_bass_voice(
    voices: &[Voice; 3],
    classes: &[FreqClass; 3],
    config: &ConversionConfig,
    bias: &BassBias,
) -> Option<usize> {
    let mut candidates: Vec<usize> = (0..3)
        .filter(|&i| matches!(classes[i], FreqClass::TooLow) && !voices[i].is_silent())
        .filter(|&i| {
            !(config.software_bass
                && software_bass_period(voices[i].freq_hz, config.source_clock_hz).is_some())
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }
    // Lowest frequency wins; ties broken by higher pre-scan bass count,
    // then by voice index.
    candidates.sort_by(|&a, &b| {
        voices[a]
            .freq_hz
            .partial_cmp(&voices[b].freq_hz)
            .unwrap()
            .then(bias.counts[b].cmp(&bias.counts[a]))
            .then(a.cmp(&b))
    });
    Some(candidates[0])
}

#[allow(clippy::too_many_arguments)]
fn assign_tone_channel(
    voice_idx: usize,
    channel: usize,
    voices: &[Voice; 3],
    classes: &[FreqClass; 3],
    config: &ConversionConfig,
    frame: &mut SnFrame,
    events: &mut Vec<ArbiterEvent>,
) {
    let voice = voices[voice_idx];
    if voice.is_silent() || !voice.tone_on {
        frame.tone[channel] = SN_TONE_OFF;
        frame.atten[channel] = SN_ATTEN_SILENT;
        return;
    }

    let atten = if config.force_attenuation_mapping {
        volume::map_forced_db(voice.raw_volume)
    } else {
        volume::map_linear(voice.raw_volume)
    };

    match classes[voice_idx] {
        FreqClass::InRange(n) => {
            frame.tone[channel] = n;
            frame.atten[channel] = atten;
        }
        FreqClass::TooHigh => {
            let n = freq::fold_down_to_range(voice.freq_hz, config.target_clock_hz);
            frame.tone[channel] = n;
            frame.atten[channel] = atten;
            events.push(ArbiterEvent::OctaveFolded { voice: voice_idx });
        }
        FreqClass::TooLow => {
            if config.software_bass {
                if let Some(n) = software_bass_period(voice.freq_hz, config.source_clock_hz) {
                    frame.tone[channel] = n;
                    frame.atten[channel] = atten;
                    frame.bass_flags[channel] = true;
                    return;
                }
            }
            frame.tone[channel] = SN_TONE_OFF;
            frame.atten[channel] = SN_ATTEN_SILENT;
            events.push(ArbiterEvent::SilencedUnreachable { voice: voice_idx });
        }
    }
}

/// Recover the original 12-bit YM tone period from `freq_hz` and right-shift
/// it by 2 to fit the SN's 10 data bits; bit 6 of the data-high byte flags
/// the result as software bass to the packetizer. Always representable
/// (12 bits shifted by 2 fits in 10), so this only fails for a degenerate
/// (non-positive) frequency.
fn software_bass_period(freq_hz: f64, source_clock_hz: u32) -> Option<u16> {
    if freq_hz <= 0.0 {
        return None;
    }
    let original_period = freq::round_half_to_even(source_clock_hz as f64 / (16.0 * freq_hz));
    let shifted = original_period >> 2;
    if shifted >= 1 && shifted <= 0x3FF {
        Some(shifted as u16)
    } else {
        None
    }
}

fn apply_channel_filter(config: &ConversionConfig, frame: &mut SnFrame) {
    let filter = config.channel_filter;
    if !filter.tone_a {
        frame.tone[0] = SN_TONE_OFF;
        frame.atten[0] = SN_ATTEN_SILENT;
    }
    if !filter.tone_b {
        frame.tone[1] = SN_TONE_OFF;
        frame.atten[1] = SN_ATTEN_SILENT;
    }
    if !filter.tone_c {
        frame.tone[2] = SN_TONE_OFF;
        frame.atten[2] = SN_ATTEN_SILENT;
    }
    if !filter.noise {
        frame.atten[3] = SN_ATTEN_SILENT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;

    fn voice(freq_hz: f64, volume: u8, tone_on: bool, noise_on: bool) -> Voice {
        Voice {
            freq_hz,
            raw_volume: volume,
            env_selected: false,
            tone_on,
            noise_on,
        }
    }

    #[test]
    fn channel_filter_mutes_excluded_channel() {
        let mut config = ConversionConfig::default();
        config.channel_filter.tone_b = false;
        let voices = [
            voice(440.0, 15, true, false),
            voice(440.0, 15, true, false),
            voice(0.0, 0, false, false),
        ];
        let mut events = Vec::new();
        let frame = arbitrate(&voices, 0, &config, &BassBias::default(), &mut events);
        assert_eq!(frame.atten[1], SN_ATTEN_SILENT);
    }

    #[test]
    fn identity_mapping_when_nothing_contends_for_c() {
        let config = ConversionConfig::default();
        let voices = [
            voice(440.0, 15, true, false),
            voice(220.0, 10, true, false),
            voice(110.0, 8, true, false),
        ];
        let mut events = Vec::new();
        let frame = arbitrate(&voices, 0, &config, &BassBias::default(), &mut events);
        assert_ne!(frame.tone[0], SN_TONE_OFF);
        assert_ne!(frame.tone[1], SN_TONE_OFF);
        assert_ne!(frame.tone[2], SN_TONE_OFF);
    }

    #[test]
    fn too_low_voice_claims_channel_c_for_bass() {
        let config = ConversionConfig::default();
        // ~30 Hz is below the SN's minimum tone frequency at 4 MHz.
        let voices = [
            voice(0.0, 0, false, false),
            voice(0.0, 0, false, false),
            voice(30.0, 10, true, false),
        ];
        let mut events = Vec::new();
        let frame = arbitrate(&voices, 0, &config, &BassBias::default(), &mut events);
        // Channel C tone register now carries the periodic-noise period,
        // and the noise channel carries the bass voice's volume.
        assert_ne!(frame.atten[3], SN_ATTEN_SILENT);
    }

    #[test]
    fn percussive_noise_wins_contention_over_bass() {
        let mut config = ConversionConfig::default();
        config.tuned_white_noise = true;
        let voices = [
            voice(0.0, 0, false, true),
            voice(0.0, 0, false, false),
            voice(30.0, 10, true, false),
        ];
        let mut events = Vec::new();
        let _frame = arbitrate(&voices, 16, &config, &BassBias::default(), &mut events);
        assert!(events.contains(&ArbiterEvent::BassNoiseContention));
    }

    #[test]
    fn unreachable_low_tone_without_software_bass_is_silenced() {
        let config = ConversionConfig::default();
        // Two low voices: only one can claim the bass channel, the other
        // must be silenced since software bass is off.
        let voices = [
            voice(25.0, 10, true, false),
            voice(0.0, 0, false, false),
            voice(30.0, 10, true, false),
        ];
        let mut events = Vec::new();
        let _frame = arbitrate(&voices, 0, &config, &BassBias::default(), &mut events);
        assert!(events
            .iter()
            .any(|e| matches!(e, ArbiterEvent::SilencedUnreachable { voice: 0 })));
    }

    #[test]
    fn software_bass_keeps_its_own_channel_instead_of_claiming_noise() {
        let mut config = ConversionConfig::default();
        config.software_bass = true;
        // ~30.5 Hz, reachable from a real 12-bit YM period (0xFFF) at the
        // default 2 MHz source clock.
        let voices = [
            voice(0.0, 0, false, false),
            voice(0.0, 0, false, false),
            voice(30.525, 10, true, false),
        ];
        let mut events = Vec::new();
        let frame = arbitrate(&voices, 0, &config, &BassBias::default(), &mut events);
        assert!(frame.bass_flags[2]);
        assert_ne!(frame.atten[2], SN_ATTEN_SILENT);
        assert_eq!(frame.atten[3], SN_ATTEN_SILENT);
    }
}
