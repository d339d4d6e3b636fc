//! YM2149 PSG register-stream to SN76489-compatible VGM converter.
//!
//! Reads a frame-oriented YM2149 register dump (raw or YM6 container),
//! translates each frame's tone/noise/envelope state onto the SN76489's
//! narrower three-tone-plus-noise model, and packetizes the result as a
//! stream of SN register writes ready for VGM encoding.
//!
//! # Quick start
//! ```no_run
//! use ym2sn::{config::ConversionConfig, convert, reader, vgm::VgmWriter};
//!
//! let data = std::fs::read("song.ym").unwrap();
//! let song = reader::parse(&data).unwrap();
//! let mut config = ConversionConfig::default();
//! config.apply_metadata_defaults(&song.metadata);
//!
//! let (commands, report) =
//!     convert::convert(&song.frames, &config, song.metadata.loop_frame).unwrap();
//! println!("octave folds: {}", report.octave_fold_count);
//!
//! let mut writer = VgmWriter::new(config.target_clock_hz);
//! for cmd in commands {
//!     writer.push(cmd).unwrap();
//! }
//! let vgm_bytes = writer.finish().unwrap();
//! std::fs::write("song.vgm", vgm_bytes).unwrap();
//! ```

#![warn(missing_docs)]

pub mod arbiter;
pub mod config;
pub mod convert;
pub mod envelope;
pub mod error;
pub mod freq;
pub mod mixer;
pub mod model;
pub mod noise;
pub mod packetizer;
pub mod reader;
pub mod vgm;
pub mod voice;
pub mod volume;

pub use config::ConversionConfig;
pub use convert::{convert as run_conversion, ConversionReport};
pub use error::{Result, Ym2snError};
pub use model::{SnCommand, SnFrame, SnRegister, SongMetadata, Voice, YmFrame};
pub use reader::ParsedSong;
pub use vgm::VgmWriter;
