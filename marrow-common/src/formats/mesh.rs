//! MarrowMesh binary format (.mrwmesh)
//!
//! Static (unskinned) model: deduplicated vertices plus a triangle index
//! stream. Same vertex record as the rig format. POD, little-endian.
//!
//! # Layout
//! ```text
//! 0x00: vertex_count u32
//! 0x04: index_count u32
//! 0x08: vertices (vertex_count × 32 bytes: position f32×3, normal f32×3, uv f32×2)
//! var:  indices  (index_count × u32)
//! ```

use super::rig::{RigVertex, RIG_VERTEX_SIZE};
use super::{ByteReader, FormatError};

/// MarrowMesh header (8 bytes)
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct MarrowMeshHeader {
    pub vertex_count: u32,
    pub index_count: u32,
}

impl MarrowMeshHeader {
    pub const SIZE: usize = 8;

    pub fn new(vertex_count: u32, index_count: u32) -> Self {
        Self {
            vertex_count,
            index_count,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.index_count.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            vertex_count: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            index_count: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}

/// Fully decoded .mrwmesh file.
#[derive(Debug, Clone)]
pub struct MeshFile {
    pub header: MarrowMeshHeader,
    pub vertices: Vec<RigVertex>,
    pub indices: Vec<u32>,
}

impl MeshFile {
    /// Exact file size implied by the header.
    pub fn expected_size(header: &MarrowMeshHeader) -> usize {
        MarrowMeshHeader::SIZE
            + header.vertex_count as usize * RIG_VERTEX_SIZE
            + header.index_count as usize * 4
    }

    /// Decode a complete mesh file. The whole input must be consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut r = ByteReader::new(bytes);

        let header_bytes = r.take(MarrowMeshHeader::SIZE, "header")?;
        let header = MarrowMeshHeader::from_bytes(header_bytes).expect("sized above");

        let mut vertices = Vec::with_capacity(header.vertex_count as usize);
        for _ in 0..header.vertex_count {
            let mut fields = [0f32; 8];
            for f in &mut fields {
                *f = r.read_f32("vertices")?;
            }
            vertices.push(RigVertex {
                position: [fields[0], fields[1], fields[2]],
                normal: [fields[3], fields[4], fields[5]],
                uv: [fields[6], fields[7]],
            });
        }

        let mut indices = Vec::with_capacity(header.index_count as usize);
        for _ in 0..header.index_count {
            indices.push(r.read_u32("indices")?);
        }

        r.finish()?;

        Ok(Self {
            header,
            vertices,
            indices,
        })
    }
}
