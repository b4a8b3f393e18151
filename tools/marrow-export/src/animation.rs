//! Animation channel extraction and transform decomposition.
//!
//! Each bone contributes one channel: a keyframe time array and a matching
//! array of 4×4 transform matrices. Matrices are decomposed into a
//! translation and a unit quaternion for the engine; the 4×4 is assumed to
//! carry a pure rotation in its 3×3 block (no scale or shear).

use roxmltree::Node;

use crate::document;
use crate::error::ConvertError;
use crate::formats::RigKeyframe;
use crate::skin::BoneTable;

/// Keyframe track for one bone.
#[derive(Debug, Clone)]
pub struct BoneChannel {
    pub timestamps: Vec<f32>,
    pub keyframes: Vec<RigKeyframe>,
}

/// Extract one channel per bone, in bone-id order.
///
/// Channels are positional: the i-th `animation` element in document order
/// belongs to bone id i. A missing channel (count mismatch) or a channel
/// missing either array is fatal; this format cannot represent an
/// unanimated bone.
pub fn extract_animation(
    root: Node,
    bones: &BoneTable,
) -> Result<Vec<BoneChannel>, ConvertError> {
    let container = document::walk(root, &["library_animations", "animation"])?;

    let channels: Vec<Node> = container
        .children()
        .filter(|c| c.is_element() && c.tag_name().name() == "animation")
        .collect();
    if channels.len() != bones.len() {
        return Err(ConvertError::LengthMismatch {
            what: "animation channels vs bones".to_string(),
            expected: bones.len(),
            actual: channels.len(),
        });
    }

    let mut tracks = Vec::with_capacity(channels.len());
    for (bone_id, channel) in channels.iter().enumerate() {
        let bone = bones.name(bone_id as u32).unwrap_or("?");

        let timestamps =
            document::float_array(document::require_source(*channel, "matrix-input")?)?;
        let matrices =
            document::float_array(document::require_source(*channel, "matrix-output")?)?;

        if matrices.len() % 16 != 0 {
            return Err(ConvertError::LengthMismatch {
                what: format!("bone \"{bone}\" transform floats"),
                expected: matrices.len() / 16 * 16,
                actual: matrices.len(),
            });
        }
        let frame_count = matrices.len() / 16;
        if timestamps.len() != frame_count {
            return Err(ConvertError::LengthMismatch {
                what: format!("bone \"{bone}\" timestamps vs transforms"),
                expected: frame_count,
                actual: timestamps.len(),
            });
        }

        let keyframes = matrices
            .chunks_exact(16)
            .map(|m| decompose(m.try_into().expect("chunked above")))
            .collect();

        tracks.push(BoneChannel {
            timestamps,
            keyframes,
        });
    }

    Ok(tracks)
}

/// Split a 4×4 transform into translation and rotation.
pub fn decompose(mat: [f32; 16]) -> RigKeyframe {
    RigKeyframe {
        position: translation(&mat),
        rotation: quaternion(&mat),
    }
}

/// Translation lives at flat indices 3/7/11; emitted homogeneous as
/// (x, y, z, 1).
fn translation(mat: &[f32; 16]) -> [f32; 4] {
    [mat[3], mat[7], mat[11], 1.0]
}

/// Rotation-matrix → quaternion, returned (w, x, y, z).
///
/// The 3×3 block is indexed in the engine's column-first convention; four
/// branches keep the divisor away from zero regardless of which diagonal
/// entry dominates. The result is unit up to float error; q and −q encode
/// the same rotation, so callers must not rely on sign.
fn quaternion(mat: &[f32; 16]) -> [f32; 4] {
    let m = |r: usize, c: usize| mat[c * 4 + r];
    let trace = m(0, 0) + m(1, 1) + m(2, 2);

    if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        [
            s / 4.0,
            (m(2, 1) - m(1, 2)) / s,
            (m(0, 2) - m(2, 0)) / s,
            (m(1, 0) - m(0, 1)) / s,
        ]
    } else if m(0, 0) > m(1, 1) && m(0, 0) > m(2, 2) {
        let s = (1.0 + m(0, 0) - m(1, 1) - m(2, 2)).sqrt() * 2.0;
        [
            (m(2, 1) - m(1, 2)) / s,
            s / 4.0,
            (m(0, 1) + m(1, 0)) / s,
            (m(0, 2) + m(2, 0)) / s,
        ]
    } else if m(1, 1) > m(2, 2) {
        let s = (1.0 + m(1, 1) - m(0, 0) - m(2, 2)).sqrt() * 2.0;
        [
            (m(0, 2) - m(2, 0)) / s,
            (m(0, 1) + m(1, 0)) / s,
            s / 4.0,
            (m(1, 2) + m(2, 1)) / s,
        ]
    } else {
        let s = (1.0 + m(2, 2) - m(0, 0) - m(1, 1)).sqrt() * 2.0;
        [
            (m(1, 0) - m(0, 1)) / s,
            (m(0, 2) + m(2, 0)) / s,
            (m(1, 2) + m(2, 1)) / s,
            s / 4.0,
        ]
    }
}
