//! Conversion configuration surface.

use serde::{Deserialize, Serialize};

/// Which of the four SN76489 output channels should actually produce sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFilter {
    /// Tone channel A (index 0).
    #[serde(default = "default_true")]
    pub tone_a: bool,
    /// Tone channel B (index 1).
    #[serde(default = "default_true")]
    pub tone_b: bool,
    /// Tone channel C (index 2).
    #[serde(default = "default_true")]
    pub tone_c: bool,
    /// Noise channel.
    #[serde(default = "default_true")]
    pub noise: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ChannelFilter {
    fn default() -> Self {
        ChannelFilter {
            tone_a: true,
            tone_b: true,
            tone_c: true,
            noise: true,
        }
    }
}

/// The LFSR tap bit used by the SN76489's noise generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LfsrTap {
    /// Bit 15 tap (most common real-hardware variant).
    Bit15,
    /// Bit 16 tap (used by some SN76489 clones).
    Bit16,
}

impl Default for LfsrTap {
    fn default() -> Self {
        LfsrTap::Bit15
    }
}

/// All tunables for a single YM-to-SN conversion run.
///
/// Deserializable from a JSON sidecar so the CLI can load overrides with
/// `--config path.json`; every field falls back to its documented default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Target SN76489 clock in Hz.
    pub target_clock_hz: u32,
    /// Source YM2149 clock in Hz; overridden by container metadata unless
    /// explicitly set on the CLI.
    pub source_clock_hz: u32,
    /// Which LFSR tap the target chip uses for white noise.
    pub lfsr_tap: LfsrTap,
    /// How many envelope samples to compute per source frame. Must evenly
    /// divide into an integer number of frames-per-sample or vice versa.
    pub envelope_sample_rate_hz: u32,
    /// Frame rate of the source material in Hz (usually 50).
    pub frame_rate_hz: u32,
    /// Per-channel output mute.
    pub channel_filter: ChannelFilter,
    /// Enable the software-bass out-of-band encoding for unreachable low tones.
    pub software_bass: bool,
    /// Enable tuned white noise (sacrifices channel C's tone register for
    /// percussive noise pitch).
    pub tuned_white_noise: bool,
    /// Disable the envelope generator entirely; envelope-selected voices fall
    /// back to silence.
    pub disable_envelopes: bool,
    /// Use the direct dB-to-dB attenuation table instead of amplitude-matched
    /// lookup.
    pub force_attenuation_mapping: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        ConversionConfig {
            target_clock_hz: 4_000_000,
            source_clock_hz: 2_000_000,
            lfsr_tap: LfsrTap::Bit15,
            envelope_sample_rate_hz: 50,
            frame_rate_hz: 50,
            channel_filter: ChannelFilter::default(),
            software_bass: false,
            tuned_white_noise: false,
            disable_envelopes: false,
            force_attenuation_mapping: false,
        }
    }
}

impl ConversionConfig {
    /// Number of envelope sub-samples computed per source frame.
    ///
    /// Returns an error if `envelope_sample_rate_hz` is not an integer
    /// multiple of `frame_rate_hz` and vice versa is not integer either;
    /// one of the two directions must divide evenly.
    pub fn envelope_subsamples_per_frame(&self) -> crate::error::Result<u32> {
        if self.frame_rate_hz == 0 {
            return Err(crate::error::Ym2snError::ConfigError(
                "frame_rate_hz must be non-zero".into(),
            ));
        }
        if self.envelope_sample_rate_hz % self.frame_rate_hz == 0 {
            Ok(self.envelope_sample_rate_hz / self.frame_rate_hz)
        } else {
            Err(crate::error::Ym2snError::ConfigError(format!(
                "envelope_sample_rate_hz ({}) is not an integer multiple of frame_rate_hz ({})",
                self.envelope_sample_rate_hz, self.frame_rate_hz
            )))
        }
    }

    /// Adopt clock/frame-rate hints from a parsed container's metadata,
    /// but only where the caller has not already set a non-default value.
    pub fn apply_metadata_defaults(&mut self, meta: &crate::model::SongMetadata) {
        if self.source_clock_hz == ConversionConfig::default().source_clock_hz {
            self.source_clock_hz = meta.source_clock_hz;
        }
        if self.frame_rate_hz == ConversionConfig::default().frame_rate_hz {
            self.frame_rate_hz = meta.frame_rate_hz as u32;
            self.envelope_sample_rate_hz = self.frame_rate_hz;
        }
    }
}
