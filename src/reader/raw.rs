//! Raw register dump parser: a bare sequence of 14-byte frames (R0-R13),
//! no header. Metadata falls back to config defaults.

use crate::error::{Result, Ym2snError};
use crate::model::YmFrame;

const FRAME_SIZE: usize = 14;

/// Parse a buffer as a sequence of headerless 14-byte register frames.
pub fn parse_frames(data: &[u8]) -> Result<Vec<YmFrame>> {
    if data.len() % FRAME_SIZE != 0 || data.is_empty() {
        return Err(Ym2snError::ParseError(format!(
            "raw dump length {} is not a positive multiple of {FRAME_SIZE}",
            data.len()
        )));
    }

    let mut frames = Vec::with_capacity(data.len() / FRAME_SIZE);
    let mut last_shape: Option<u8> = None;
    for chunk in data.chunks_exact(FRAME_SIZE) {
        let tone_period = [
            u16::from(chunk[0]) | (u16::from(chunk[1] & 0x0F) << 8),
            u16::from(chunk[2]) | (u16::from(chunk[3] & 0x0F) << 8),
            u16::from(chunk[4]) | (u16::from(chunk[5] & 0x0F) << 8),
        ];
        let noise_period = chunk[6] & 0x1F;
        let mixer = chunk[7];
        let level = [chunk[8] & 0x1F, chunk[9] & 0x1F, chunk[10] & 0x1F];
        let env_period = u16::from(chunk[11]) | (u16::from(chunk[12]) << 8);
        let env_shape = chunk[13] & 0x0F;
        let env_shape_written = last_shape != Some(chunk[13]);
        last_shape = Some(chunk[13]);

        frames.push(YmFrame {
            tone_period,
            noise_period,
            mixer,
            level,
            env_period,
            env_shape,
            env_shape_written,
        });
    }
    Ok(frames)
}
