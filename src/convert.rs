//! Pipeline orchestration: wires the frame source through envelope, voice,
//! arbiter and packetizer stages, and accumulates a [`ConversionReport`].

use crate::arbiter::{self, ArbiterEvent, BassBias};
use crate::config::ConversionConfig;
use crate::envelope::EnvelopeState;
use crate::error::Result;
use crate::model::{SnCommand, YmFrame};
use crate::packetizer::RegisterCache;
use crate::voice;

/// Summary of non-fatal conditions observed across an entire conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// Total frames processed.
    pub frames_processed: u32,
    /// Number of times a voice's tone was octave-folded to fit the SN.
    pub octave_fold_count: u32,
    /// Number of times a too-low voice could not be serviced at all.
    pub unreachable_silenced_count: u32,
    /// Number of frames where percussive noise and periodic-noise bass
    /// both wanted channel C.
    pub bass_noise_contention_count: u32,
}

impl ConversionReport {
    fn record(&mut self, event: &ArbiterEvent) {
        match event {
            ArbiterEvent::OctaveFolded { voice } => {
                log::warn!("frame {}: voice {voice} octave-folded", self.frames_processed);
                self.octave_fold_count += 1;
            }
            ArbiterEvent::SilencedUnreachable { voice } => {
                log::warn!(
                    "frame {}: voice {voice} too low for SN range, silenced",
                    self.frames_processed
                );
                self.unreachable_silenced_count += 1;
            }
            ArbiterEvent::BassNoiseContention => {
                log::warn!(
                    "frame {}: channel C contention between percussive noise and bass",
                    self.frames_processed
                );
                self.bass_noise_contention_count += 1;
            }
        }
    }
}

/// Optional offline pre-scan: tallies how often each voice would classify
/// as `too_low`, to break bass-channel ties in favor of the voice that
/// plays bass most often across the whole tune.
pub fn prescan_bass_bias(frames: &[YmFrame], config: &ConversionConfig) -> BassBias {
    let mut bias = BassBias::default();
    for frame in frames {
        for v in 0..3 {
            let period = frame.tone_period[v].max(1);
            let freq_hz = config.source_clock_hz as f64 / (16.0 * period as f64);
            if matches!(
                crate::freq::classify(freq_hz, config.target_clock_hz),
                crate::freq::FreqClass::TooLow
            ) {
                bias.counts[v] += 1;
            }
        }
    }
    bias
}

/// Convert a full sequence of YM frames into an SN command stream.
///
/// Validates the configuration up front (fatal on contradiction), then
/// processes each frame in order; per-frame issues never abort the run and
/// are instead folded into the returned [`ConversionReport`].
pub fn convert(
    frames: &[YmFrame],
    config: &ConversionConfig,
    loop_frame: Option<u32>,
) -> Result<(Vec<SnCommand>, ConversionReport)> {
    let subsamples_per_frame = config.envelope_subsamples_per_frame()?;

    let bias = prescan_bass_bias(frames, config);
    let mut envelopes = [EnvelopeState::new(), EnvelopeState::new(), EnvelopeState::new()];
    let mut cache = RegisterCache::default();
    let mut report = ConversionReport::default();
    let mut commands = Vec::new();

    let samples_per_frame = (44_100u32 / config.frame_rate_hz.max(1)).max(1);
    let sub_wait = (samples_per_frame / subsamples_per_frame.max(1)).max(1);

    for (idx, frame) in frames.iter().enumerate() {
        if Some(idx as u32) == loop_frame {
            commands.push(SnCommand::LoopStart);
        }

        if frame.env_shape_written {
            for env in envelopes.iter_mut() {
                env.retrigger(frame.env_shape);
            }
        }

        for sub in 0..subsamples_per_frame {
            let mut env_levels = [0u8; 3];
            if !config.disable_envelopes {
                for v in 0..3 {
                    env_levels[v] = envelopes[v].advance(
                        frame.env_period,
                        config.source_clock_hz,
                        sub_wait as u64,
                    );
                }
            }

            let voices = voice::derive_voices(frame, config.source_clock_hz, env_levels);
            let mut events = Vec::new();
            let sn_frame =
                arbiter::arbitrate(&voices, frame.noise_period, config, &bias, &mut events);
            for event in &events {
                report.record(event);
            }

            cache.diff_emit(&sn_frame, &mut commands);
            let is_last_sub = sub + 1 == subsamples_per_frame;
            let wait = if is_last_sub {
                samples_per_frame - sub_wait * (subsamples_per_frame - 1)
            } else {
                sub_wait
            };
            commands.push(SnCommand::Wait { samples: wait });
        }

        report.frames_processed += 1;
    }

    commands.push(SnCommand::End);
    log::info!(
        "conversion complete: {} frames, {} octave folds, {} unreachable, {} bass/noise contentions",
        report.frames_processed,
        report.octave_fold_count,
        report.unreachable_silenced_count,
        report.bass_noise_contention_count,
    );

    Ok((commands, report))
}
