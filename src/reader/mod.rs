//! YM container reader (component J): decodes raw or YM6-style register
//! dumps into [`crate::model::YmFrame`] plus [`crate::model::SongMetadata`].

pub mod raw;
pub mod ym6;

use crate::error::{Result, Ym2snError};
use crate::model::SongMetadata;

/// A parsed song: its frames and whatever metadata the container carried.
pub struct ParsedSong {
    /// Decoded register frames, already built into the conversion model.
    pub frames: Vec<crate::model::YmFrame>,
    /// Header metadata (falls back to defaults for headerless formats).
    pub metadata: SongMetadata,
}

/// LHA/LZH archive magic bytes used by compressed `.ym` downloads in the wild.
const LHA_MAGIC_OFFSETS: [&[u8]; 2] = [b"-lh5-", b"-lh0-"];

/// Detect and parse a YM container from an in-memory buffer.
///
/// Recognises the `YM6!` header format and a bare raw 14-byte-per-frame
/// dump. Compressed payloads are detected (LHA/LZH magic within the first
/// 32 bytes) and rejected with [`Ym2snError::DecompressionError`] rather
/// than silently misparsed, since LHA decompression is out of scope here.
pub fn parse(data: &[u8]) -> Result<ParsedSong> {
    if let Some(method) = detect_lha(data) {
        return Err(Ym2snError::DecompressionError(format!(
            "input is LHA-compressed ({method}); decompress it before conversion"
        )));
    }

    if data.len() >= 4 && &data[0..4] == b"YM6!" {
        return ym6::parse(data);
    }

    let frames = raw::parse_frames(data)?;
    Ok(ParsedSong {
        frames,
        metadata: SongMetadata::default(),
    })
}

fn detect_lha(data: &[u8]) -> Option<&'static str> {
    let window = &data[..data.len().min(32)];
    for marker in LHA_MAGIC_OFFSETS {
        if window.windows(marker.len()).any(|w| w == marker) {
            return Some(std::str::from_utf8(marker).unwrap_or("lha"));
        }
    }
    None
}
