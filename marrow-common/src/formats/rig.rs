//! MarrowRig binary format (.mrwrig)
//!
//! Rigged model: deduplicated mesh, per-vertex bone influences, inverse bind
//! matrices, per-bone keyframe tracks, and the flattened bone hierarchy.
//! POD format, little-endian, no padding between sections.
//!
//! # Layout
//! ```text
//! 0x00: vertex_count u32
//! 0x04: index_count u32
//! 0x08: bone_count u32
//! 0x0C: vertices       (vertex_count × 32 bytes: position f32×3, normal f32×3, uv f32×2)
//! var:  indices        (index_count × u32)
//! var:  influences     (vertex_count × 32 bytes: bone ids u32×4, weights f32×4)
//! var:  inverse binds  (bone_count × 64 bytes: 16 × f32 per bone)
//! var:  frame_counts   (bone_count × u32)
//! var:  timestamps     (Σ frame_counts × f32, grouped by bone, no padding)
//! var:  keyframes      (Σ frame_counts × 32 bytes: position f32×4, rotation f32×4 (w,x,y,z))
//! var:  child_counts   (bone_count × u32; 0xFFFFFFFF = bone absent from tree)
//! var:  child_ids      (u32 array; length = Σ child_counts over present bones)
//! ```
//!
//! A bone with child count [`CHILD_COUNT_NONE`] never appeared in the
//! skeleton tree and contributes nothing to `child_ids`.

use bytemuck::{Pod, Zeroable};

use super::{ByteReader, FormatError};

/// Size of one vertex record in bytes (8 floats).
pub const RIG_VERTEX_SIZE: usize = 32;
/// Size of one bone-influence record in bytes (4 ids + 4 weights).
pub const RIG_INFLUENCE_SIZE: usize = 32;
/// Size of one inverse bind matrix in bytes (16 floats).
pub const RIG_INVERSE_BIND_SIZE: usize = 64;
/// Size of one decomposed keyframe in bytes (position + rotation).
pub const RIG_KEYFRAME_SIZE: usize = 32;
/// Child-count sentinel for bones that never appear in the skeleton tree.
pub const CHILD_COUNT_NONE: u32 = u32::MAX;

/// MarrowRig header (12 bytes)
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct MarrowRigHeader {
    pub vertex_count: u32,
    pub index_count: u32,
    pub bone_count: u32,
}

impl MarrowRigHeader {
    pub const SIZE: usize = 12;

    pub fn new(vertex_count: u32, index_count: u32, bone_count: u32) -> Self {
        Self {
            vertex_count,
            index_count,
            bone_count,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.index_count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.bone_count.to_le_bytes());
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
            bone_count: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        })
    }
}

/// One deduplicated vertex (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct RigVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Bone influences for one vertex (32 bytes). Slots are ordered by
/// descending weight; unused slots hold bone id 0 with weight 0.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct RigInfluence {
    pub bone_ids: [u32; 4],
    pub weights: [f32; 4],
}

/// One decomposed keyframe (32 bytes). Position is (x, y, z, 1.0);
/// rotation is a quaternion stored (w, x, y, z).
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct RigKeyframe {
    pub position: [f32; 4],
    pub rotation: [f32; 4],
}

/// Fully decoded .mrwrig file.
#[derive(Debug, Clone)]
pub struct RigFile {
    pub header: MarrowRigHeader,
    pub vertices: Vec<RigVertex>,
    pub indices: Vec<u32>,
    pub influences: Vec<RigInfluence>,
    pub inverse_bind_matrices: Vec<[f32; 16]>,
    pub frame_counts: Vec<u32>,
    /// Keyframe times, one inner Vec per bone (lengths match `frame_counts`).
    pub timestamps: Vec<Vec<f32>>,
    /// Decomposed keyframes, one inner Vec per bone.
    pub keyframes: Vec<Vec<RigKeyframe>>,
    pub child_counts: Vec<u32>,
    pub child_ids: Vec<u32>,
}

impl RigFile {
    /// Total file size implied by the header plus per-bone frame counts and
    /// the child-id count. There is no implicit padding anywhere, so the
    /// real file length must equal this exactly.
    pub fn expected_size(
        header: &MarrowRigHeader,
        frame_counts: &[u32],
        child_id_count: usize,
    ) -> usize {
        let v = header.vertex_count as usize;
        let i = header.index_count as usize;
        let b = header.bone_count as usize;
        let frames: usize = frame_counts.iter().map(|&c| c as usize).sum();
        MarrowRigHeader::SIZE
            + v * RIG_VERTEX_SIZE
            + i * 4
            + v * RIG_INFLUENCE_SIZE
            + b * RIG_INVERSE_BIND_SIZE
            + b * 4
            + frames * 4
            + frames * RIG_KEYFRAME_SIZE
            + b * 4
            + child_id_count * 4
    }

    /// Decode a complete rig file. The whole input must be consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut r = ByteReader::new(bytes);

        let header_bytes = r.take(MarrowRigHeader::SIZE, "header")?;
        let header = MarrowRigHeader::from_bytes(header_bytes).expect("sized above");

        let vertex_count = header.vertex_count as usize;
        let index_count = header.index_count as usize;
        let bone_count = header.bone_count as usize;

        let mut vertices = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            vertices.push(RigVertex {
                position: read_f32_array(&mut r, "vertices")?,
                normal: read_f32_array(&mut r, "vertices")?,
                uv: read_f32_array(&mut r, "vertices")?,
            });
        }

        let mut indices = Vec::with_capacity(index_count);
        for _ in 0..index_count {
            indices.push(r.read_u32("indices")?);
        }

        let mut influences = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            let mut bone_ids = [0u32; 4];
            for id in &mut bone_ids {
                *id = r.read_u32("influences")?;
            }
            influences.push(RigInfluence {
                bone_ids,
                weights: read_f32_array(&mut r, "influences")?,
            });
        }

        let mut inverse_bind_matrices = Vec::with_capacity(bone_count);
        for _ in 0..bone_count {
            inverse_bind_matrices.push(read_f32_array::<16>(&mut r, "inverse bind matrices")?);
        }

        let mut frame_counts = Vec::with_capacity(bone_count);
        for _ in 0..bone_count {
            frame_counts.push(r.read_u32("frame counts")?);
        }

        let mut timestamps = Vec::with_capacity(bone_count);
        for &count in &frame_counts {
            let mut times = Vec::with_capacity(count as usize);
            for _ in 0..count {
                times.push(r.read_f32("timestamps")?);
            }
            timestamps.push(times);
        }

        let mut keyframes = Vec::with_capacity(bone_count);
        for &count in &frame_counts {
            let mut frames = Vec::with_capacity(count as usize);
            for _ in 0..count {
                frames.push(RigKeyframe {
                    position: read_f32_array(&mut r, "keyframes")?,
                    rotation: read_f32_array(&mut r, "keyframes")?,
                });
            }
            keyframes.push(frames);
        }

        let mut child_counts = Vec::with_capacity(bone_count);
        for _ in 0..bone_count {
            child_counts.push(r.read_u32("child counts")?);
        }

        // Bones absent from the tree (sentinel) contribute no child ids.
        let child_id_count: usize = child_counts
            .iter()
            .filter(|&&c| c != CHILD_COUNT_NONE)
            .map(|&c| c as usize)
            .sum();
        let mut child_ids = Vec::with_capacity(child_id_count);
        for _ in 0..child_id_count {
            child_ids.push(r.read_u32("child ids")?);
        }

        r.finish()?;

        Ok(Self {
            header,
            vertices,
            indices,
            influences,
            inverse_bind_matrices,
            frame_counts,
            timestamps,
            keyframes,
            child_counts,
            child_ids,
        })
    }
}

fn read_f32_array<const N: usize>(
    r: &mut ByteReader,
    section: &'static str,
) -> Result<[f32; N], FormatError> {
    let mut out = [0f32; N];
    for f in &mut out {
        *f = r.read_f32(section)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rig_header_roundtrip() {
        let header = MarrowRigHeader::new(10, 24, 5);
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), MarrowRigHeader::SIZE);

        let parsed = MarrowRigHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.vertex_count, 10);
        assert_eq!(parsed.index_count, 24);
        assert_eq!(parsed.bone_count, 5);
    }

    #[test]
    fn test_rig_header_from_short_bytes() {
        assert!(MarrowRigHeader::from_bytes(&[0u8; 11]).is_none());
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<RigVertex>(), RIG_VERTEX_SIZE);
        assert_eq!(std::mem::size_of::<RigInfluence>(), RIG_INFLUENCE_SIZE);
        assert_eq!(std::mem::size_of::<RigKeyframe>(), RIG_KEYFRAME_SIZE);
    }

    /// Hand-build a minimal rig file (1 vertex, 3 indices, 1 bone, 2 frames)
    /// and decode it back.
    fn tiny_rig_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MarrowRigHeader::new(1, 3, 1).to_bytes());
        // vertex
        for f in [0.0f32, 1.0, 2.0, 0.0, 1.0, 0.0, 0.5, 0.5] {
            bytes.extend_from_slice(&f.to_le_bytes());
        }
        // indices
        for i in [0u32, 0, 0] {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
        // influence
        for id in [0u32, 0, 0, 0] {
            bytes.extend_from_slice(&id.to_le_bytes());
        }
        for w in [1.0f32, 0.0, 0.0, 0.0] {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        // inverse bind matrix (identity)
        for row in 0..4 {
            for col in 0..4 {
                let f: f32 = if row == col { 1.0 } else { 0.0 };
                bytes.extend_from_slice(&f.to_le_bytes());
            }
        }
        // frame counts
        bytes.extend_from_slice(&2u32.to_le_bytes());
        // timestamps
        for t in [0.0f32, 0.5] {
            bytes.extend_from_slice(&t.to_le_bytes());
        }
        // keyframes
        for _ in 0..2 {
            for f in [0.0f32, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0] {
                bytes.extend_from_slice(&f.to_le_bytes());
            }
        }
        // child counts: the single bone is the root with no children
        bytes.extend_from_slice(&0u32.to_le_bytes());
        // child ids: empty
        bytes
    }

    #[test]
    fn test_rig_decode_tiny() {
        let bytes = tiny_rig_bytes();
        let rig = RigFile::from_bytes(&bytes).unwrap();

        assert_eq!(rig.header.vertex_count, 1);
        assert_eq!(rig.vertices[0].position, [0.0, 1.0, 2.0]);
        assert_eq!(rig.vertices[0].uv, [0.5, 0.5]);
        assert_eq!(rig.indices, vec![0, 0, 0]);
        assert_eq!(rig.influences[0].weights[0], 1.0);
        assert_eq!(rig.inverse_bind_matrices[0][0], 1.0);
        assert_eq!(rig.frame_counts, vec![2]);
        assert_eq!(rig.timestamps[0], vec![0.0, 0.5]);
        assert_eq!(rig.keyframes[0].len(), 2);
        assert_eq!(rig.keyframes[0][0].rotation, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(rig.child_counts, vec![0]);
        assert!(rig.child_ids.is_empty());

        assert_eq!(
            bytes.len(),
            RigFile::expected_size(&rig.header, &rig.frame_counts, rig.child_ids.len())
        );
    }

    #[test]
    fn test_rig_decode_rejects_truncation() {
        let bytes = tiny_rig_bytes();
        let err = RigFile::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, FormatError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_rig_decode_rejects_trailing_bytes() {
        let mut bytes = tiny_rig_bytes();
        bytes.push(0);
        let err = RigFile::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::TrailingBytes { count: 1 }));
    }

    #[test]
    fn test_sentinel_child_count_contributes_no_ids() {
        // 0 vertices, 0 indices, 1 bone, 0 frames, child count = sentinel
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MarrowRigHeader::new(0, 0, 1).to_bytes());
        // inverse bind matrix
        for _ in 0..16 {
            bytes.extend_from_slice(&0f32.to_le_bytes());
        }
        bytes.extend_from_slice(&0u32.to_le_bytes()); // frame count
        bytes.extend_from_slice(&CHILD_COUNT_NONE.to_le_bytes());

        let rig = RigFile::from_bytes(&bytes).unwrap();
        assert_eq!(rig.child_counts, vec![CHILD_COUNT_NONE]);
        assert!(rig.child_ids.is_empty());
    }
}
