//! VGM v1.50 byte-stream encoder.

use crate::error::{Result, Ym2snError};
use crate::model::{SnCommand, SnRegister};

const HEADER_SIZE: usize = 0x40;
const VGM_VERSION: u32 = 0x150;

/// 1/60th-second wait shorthand, in samples at the 44.1 kHz VGM rate.
const WAIT_60HZ_SAMPLES: u32 = 735;
/// 1/50th-second wait shorthand.
const WAIT_50HZ_SAMPLES: u32 = 882;

/// Accumulates an `SnCommand` stream into a VGM v1.50 file body, then
/// finalizes the fixed header once the total/loop sample counts are known.
pub struct VgmWriter {
    sn_clock_hz: u32,
    body: Vec<u8>,
    total_samples: u64,
    loop_offset_in_body: Option<usize>,
    loop_samples: u64,
    ended: bool,
}

impl VgmWriter {
    /// Create a writer targeting the given SN76489 clock.
    pub fn new(sn_clock_hz: u32) -> Self {
        VgmWriter {
            sn_clock_hz,
            body: Vec::new(),
            total_samples: 0,
            loop_offset_in_body: None,
            loop_samples: 0,
            ended: false,
        }
    }

    /// Feed one command from the core pipeline into the body.
    pub fn push(&mut self, command: SnCommand) -> Result<()> {
        if self.ended {
            return Err(Ym2snError::VgmEncodeError(
                "command written after End".into(),
            ));
        }
        match command {
            SnCommand::Write { register: _, value } => {
                self.body.push(0x50);
                self.body.push(value);
            }
            SnCommand::Wait { samples } => {
                self.push_wait(samples);
            }
            SnCommand::LoopStart => {
                if self.loop_offset_in_body.is_some() {
                    return Err(Ym2snError::VgmEncodeError(
                        "LoopStart emitted more than once".into(),
                    ));
                }
                self.loop_offset_in_body = Some(self.body.len());
            }
            SnCommand::End => {
                self.body.push(0x66);
                self.ended = true;
            }
        }
        Ok(())
    }

    fn push_wait(&mut self, mut samples: u32) {
        if self.loop_offset_in_body.is_some() {
            self.loop_samples += samples as u64;
        }
        self.total_samples += samples as u64;

        if samples == WAIT_60HZ_SAMPLES {
            self.body.push(0x62);
            return;
        }
        if samples == WAIT_50HZ_SAMPLES {
            self.body.push(0x63);
            return;
        }
        while samples > 0 {
            let chunk = samples.min(0xFFFF);
            self.body.push(0x61);
            self.body.extend_from_slice(&(chunk as u16).to_le_bytes());
            samples -= chunk;
        }
    }

    /// Finalize the file. Requires `End` to already have been pushed.
    pub fn finish(self) -> Result<Vec<u8>> {
        if !self.ended {
            return Err(Ym2snError::VgmEncodeError(
                "finish called before End command".into(),
            ));
        }

        let mut out = vec![0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(b"Vgm ");

        let eof_offset = (HEADER_SIZE + self.body.len() - 4) as u32;
        out[4..8].copy_from_slice(&eof_offset.to_le_bytes());

        out[8..12].copy_from_slice(&VGM_VERSION.to_le_bytes());
        out[0x0c..0x10].copy_from_slice(&self.sn_clock_hz.to_le_bytes());

        // GD3 offset: 0 (no tag; metadata lives in the input YM header).
        out[0x14..0x18].copy_from_slice(&0u32.to_le_bytes());

        let total_samples_u32 = u32::try_from(self.total_samples).unwrap_or(u32::MAX);
        out[0x18..0x1c].copy_from_slice(&total_samples_u32.to_le_bytes());

        if let Some(loop_body_offset) = self.loop_offset_in_body {
            let loop_abs = HEADER_SIZE + loop_body_offset;
            let loop_rel = (loop_abs - 0x1c) as u32;
            out[0x1c..0x20].copy_from_slice(&loop_rel.to_le_bytes());
            let loop_samples_u32 = u32::try_from(self.loop_samples).unwrap_or(u32::MAX);
            out[0x20..0x24].copy_from_slice(&loop_samples_u32.to_le_bytes());
        }

        // VGM data offset: relative to field start (0x34), pointing at
        // 0x0c past the header start (the earliest version-1.50-safe spot).
        let data_offset = (HEADER_SIZE - 0x34) as u32;
        out[0x34..0x38].copy_from_slice(&data_offset.to_le_bytes());

        out.extend_from_slice(&self.body);
        Ok(out)
    }
}
