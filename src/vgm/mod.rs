//! VGM wire-format encoder (component K): serializes an [`crate::model::SnCommand`]
//! stream into a VGM v1.50 byte stream.

pub mod writer;

pub use writer::VgmWriter;
