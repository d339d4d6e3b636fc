//! YM6 container parser: `"YM6!"` magic + `"LeOnArD!"` signature + a 34-byte
//! header + null-terminated metadata strings + 16-byte-per-frame register
//! data (interleaved or not) + an `"End!"` marker.

use std::io::Cursor;

use crate::error::{Result, Ym2snError};
use crate::model::{SongMetadata, YmFrame};
use crate::reader::ParsedSong;

/// Largest frame count accepted before refusing to allocate further; guards
/// against a corrupt header claiming an absurd song length.
const MAX_REASONABLE_FRAMES: u32 = 500_000;

struct Ym6Header {
    frame_count: u32,
    attributes: u32,
    digidrum_count: u16,
    master_clock: u32,
    frame_rate: u16,
    loop_frame: u32,
    extra_data_size: u16,
}

fn parse_header(data: &[u8]) -> Result<Ym6Header> {
    if data.len() < 34 {
        return Err(Ym2snError::ParseError("YM6 file too small for header".into()));
    }
    if &data[0..4] != b"YM6!" {
        return Err(Ym2snError::ParseError("invalid YM6 magic number".into()));
    }
    if &data[4..12] != b"LeOnArD!" {
        return Err(Ym2snError::ParseError("invalid YM6 signature".into()));
    }

    let frame_count = u32::from_be_bytes([data[12], data[13], data[14], data[15]]);
    let attributes = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let digidrum_count = u16::from_be_bytes([data[20], data[21]]);
    let master_clock = u32::from_be_bytes([data[22], data[23], data[24], data[25]]);
    let frame_rate = u16::from_be_bytes([data[26], data[27]]);
    let loop_frame = u32::from_be_bytes([data[28], data[29], data[30], data[31]]);
    let extra_data_size = u16::from_be_bytes([data[32], data[33]]);

    if frame_count == 0 {
        return Err(Ym2snError::ParseError("YM6 file has zero frames".into()));
    }
    if frame_count > MAX_REASONABLE_FRAMES {
        return Err(Ym2snError::ParseError(format!(
            "YM6 frame count {frame_count} exceeds reasonable limit of {MAX_REASONABLE_FRAMES}"
        )));
    }

    Ok(Ym6Header {
        frame_count,
        attributes,
        digidrum_count,
        master_clock,
        frame_rate,
        loop_frame,
        extra_data_size,
    })
}

fn parse_nt_string(cursor: &mut Cursor<&[u8]>) -> String {
    let mut string = String::new();
    let buf = cursor.get_ref();
    let pos = cursor.position() as usize;
    if pos >= buf.len() {
        return string;
    }
    for i in pos..buf.len() {
        if buf[i] == 0 {
            cursor.set_position((i + 1) as u64);
            return string;
        }
        string.push(buf[i] as char);
    }
    cursor.set_position(buf.len() as u64);
    string
}

fn parse_metadata(data: &[u8], offset: usize) -> Result<(String, String, String, usize)> {
    let mut cursor = Cursor::new(&data[offset..]);
    let title = parse_nt_string(&mut cursor);
    let author = parse_nt_string(&mut cursor);
    let comment = parse_nt_string(&mut cursor);
    let final_offset = offset + cursor.position() as usize;
    Ok((title, author, comment, final_offset))
}

fn parse_register_frames(
    data: &[u8],
    offset: usize,
    frame_count: u32,
    is_interleaved: bool,
) -> Result<Vec<[u8; 16]>> {
    let size = (frame_count as usize) * 16;
    if offset + size > data.len() {
        return Err(Ym2snError::ParseError("not enough data for register frames".into()));
    }
    let bytes = &data[offset..offset + size];
    let mut frames = vec![[0u8; 16]; frame_count as usize];

    if is_interleaved {
        for reg_idx in 0..16 {
            for (frame_idx, frame) in frames.iter_mut().enumerate() {
                frame[reg_idx] = bytes[reg_idx * frame_count as usize + frame_idx];
            }
        }
    } else {
        for (frame_idx, frame) in frames.iter_mut().enumerate() {
            let start = frame_idx * 16;
            frame.copy_from_slice(&bytes[start..start + 16]);
        }
    }
    Ok(frames)
}

fn raw_frame_to_model(raw: &[u8; 16], last_shape: &mut Option<u8>) -> YmFrame {
    let tone_period = [
        u16::from(raw[0]) | (u16::from(raw[1] & 0x0F) << 8),
        u16::from(raw[2]) | (u16::from(raw[3] & 0x0F) << 8),
        u16::from(raw[4]) | (u16::from(raw[5] & 0x0F) << 8),
    ];
    let noise_period = raw[6] & 0x1F;
    let mixer = raw[7];
    let level = [raw[8] & 0x1F, raw[9] & 0x1F, raw[10] & 0x1F];
    let env_period = u16::from(raw[11]) | (u16::from(raw[12]) << 8);
    let env_shape = raw[13] & 0x0F;
    let env_shape_written = *last_shape != Some(raw[13]);
    *last_shape = Some(raw[13]);

    YmFrame {
        tone_period,
        noise_period,
        mixer,
        level,
        env_period,
        env_shape,
        env_shape_written,
    }
}

/// Parse a complete YM6 buffer into the conversion model.
pub fn parse(data: &[u8]) -> Result<ParsedSong> {
    let header = parse_header(data)?;

    let mut offset: usize = 34;
    offset = offset
        .checked_add(header.extra_data_size as usize)
        .ok_or_else(|| Ym2snError::ParseError("extra data offset overflow".into()))?;
    if offset > data.len() {
        return Err(Ym2snError::ParseError("extra data extends beyond file".into()));
    }

    for _ in 0..header.digidrum_count {
        if offset + 4 > data.len() {
            return Err(Ym2snError::ParseError(
                "incomplete digidrum sample size field".into(),
            ));
        }
        let sample_size = u32::from_be_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]) as usize;
        offset = offset
            .checked_add(4)
            .ok_or_else(|| Ym2snError::ParseError("digidrum offset overflow".into()))?;
        if offset.checked_add(sample_size).is_none() || offset + sample_size > data.len() {
            return Err(Ym2snError::ParseError("incomplete digidrum sample data".into()));
        }
        offset += sample_size;
    }

    let (title, author, comment, metadata_end) = parse_metadata(data, offset)?;
    offset = metadata_end;

    let is_interleaved = (header.attributes & 1) != 0;
    let raw_frames = parse_register_frames(data, offset, header.frame_count, is_interleaved)?;

    let register_data_size = (header.frame_count as usize) * 16;
    let end_marker_offset = offset + register_data_size;
    if end_marker_offset + 4 > data.len() {
        return Err(Ym2snError::ParseError("YM6 file truncated, missing end marker".into()));
    }
    if &data[end_marker_offset..end_marker_offset + 4] != b"End!" {
        return Err(Ym2snError::ParseError("invalid YM6 end marker".into()));
    }

    let mut last_shape = None;
    let frames = raw_frames
        .iter()
        .map(|raw| raw_frame_to_model(raw, &mut last_shape))
        .collect();

    let metadata = SongMetadata {
        source_clock_hz: header.master_clock,
        frame_rate_hz: header.frame_rate,
        loop_frame: if header.loop_frame == 0 && header.frame_rate != 0 {
            None
        } else {
            Some(header.loop_frame)
        },
        song_length_frames: header.frame_count,
        song_attributes: header.attributes,
        title,
        author,
        comment,
    };

    Ok(ParsedSong { frames, metadata })
}
