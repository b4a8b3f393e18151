//! Marrow binary asset formats
//!
//! POD formats, little-endian, no padding between sections. No magic bytes -
//! the format is determined by file extension and loader context.
//!
//! All format headers implement the [`BinarySerializable`] trait for
//! consistent serialization/deserialization.

pub mod mesh;
pub mod rig;
mod serialization;

pub use mesh::*;
pub use rig::*;
pub use serialization::BinarySerializable;

use thiserror::Error;

/// File extension for rigged (skinned + animated) models.
pub const RIG_EXT: &str = "mrwrig";
/// File extension for static models.
pub const MESH_EXT: &str = "mrwmesh";

/// Errors produced when decoding a Marrow asset file.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unexpected end of file: needed {needed} more bytes in {section}")]
    UnexpectedEof { section: &'static str, needed: usize },
    #[error("{count} trailing bytes after final section")]
    TrailingBytes { count: usize },
}

/// Sequential little-endian reader over a byte slice.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn take(&mut self, n: usize, section: &'static str) -> Result<&'a [u8], FormatError> {
        let remaining = self.bytes.len() - self.offset;
        if remaining < n {
            return Err(FormatError::UnexpectedEof {
                section,
                needed: n - remaining,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    pub(crate) fn read_u32(&mut self, section: &'static str) -> Result<u32, FormatError> {
        let b = self.take(4, section)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn read_f32(&mut self, section: &'static str) -> Result<f32, FormatError> {
        let b = self.take(4, section)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Error unless the whole input has been consumed.
    pub(crate) fn finish(self) -> Result<(), FormatError> {
        let count = self.bytes.len() - self.offset;
        if count != 0 {
            return Err(FormatError::TrailingBytes { count });
        }
        Ok(())
    }
}
