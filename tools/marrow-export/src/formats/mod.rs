//! Binary emitters for Marrow asset files.
//!
//! Layouts are defined in `marrow-common` (re-exported here); this module
//! turns extracted pipeline data into complete in-memory byte images.
//! Every emitter validates section lengths against the header counts before
//! producing a single byte, and callers only open the output file once the
//! image exists, so a length bug can never reach disk as a partial file.

pub use marrow_common::formats::*;

use crate::animation::BoneChannel;
use crate::error::ConvertError;
use crate::mesh::MeshData;
use crate::skeleton::FlatHierarchy;
use crate::skin::SkinData;

/// Encode a complete `.mrwrig` byte image in memory.
pub fn encode_rig(
    mesh: &MeshData,
    influences: &[RigInfluence],
    skin: &SkinData,
    channels: &[BoneChannel],
    hierarchy: &FlatHierarchy,
) -> Result<Vec<u8>, ConvertError> {
    let bone_count = skin.bones.len();

    check_len("influences vs vertices", mesh.vertices.len(), influences.len())?;
    check_len(
        "inverse bind matrices vs bones",
        bone_count,
        skin.inverse_bind_matrices.len(),
    )?;
    check_len("animation channels vs bones", bone_count, channels.len())?;
    check_len("child counts vs bones", bone_count, hierarchy.child_counts.len())?;
    for (i, channel) in channels.iter().enumerate() {
        check_len(
            &format!("channel {i} timestamps vs keyframes"),
            channel.keyframes.len(),
            channel.timestamps.len(),
        )?;
    }

    let header = MarrowRigHeader::new(
        mesh.vertices.len() as u32,
        mesh.indices.len() as u32,
        bone_count as u32,
    );
    let frame_counts: Vec<u32> = channels.iter().map(|c| c.timestamps.len() as u32).collect();
    let expected = RigFile::expected_size(&header, &frame_counts, hierarchy.child_ids.len());

    let mut bytes = Vec::with_capacity(expected);
    bytes.extend_from_slice(&header.to_bytes());

    for vertex in &mesh.vertices {
        put_f32s(&mut bytes, &vertex.position);
        put_f32s(&mut bytes, &vertex.normal);
        put_f32s(&mut bytes, &vertex.uv);
    }

    for &index in &mesh.indices {
        bytes.extend_from_slice(&index.to_le_bytes());
    }

    for influence in influences {
        for id in influence.bone_ids {
            bytes.extend_from_slice(&id.to_le_bytes());
        }
        put_f32s(&mut bytes, &influence.weights);
    }

    for matrix in &skin.inverse_bind_matrices {
        put_f32s(&mut bytes, matrix);
    }

    for &count in &frame_counts {
        bytes.extend_from_slice(&count.to_le_bytes());
    }

    for channel in channels {
        put_f32s(&mut bytes, &channel.timestamps);
    }

    for channel in channels {
        for keyframe in &channel.keyframes {
            put_f32s(&mut bytes, &keyframe.position);
            put_f32s(&mut bytes, &keyframe.rotation);
        }
    }

    for &count in &hierarchy.child_counts {
        bytes.extend_from_slice(&(count as u32).to_le_bytes());
    }

    for &id in &hierarchy.child_ids {
        bytes.extend_from_slice(&id.to_le_bytes());
    }

    debug_assert_eq!(bytes.len(), expected);
    Ok(bytes)
}

/// Encode a complete `.mrwmesh` (static model) byte image in memory.
pub fn encode_mesh(mesh: &MeshData) -> Vec<u8> {
    let header = MarrowMeshHeader::new(mesh.vertices.len() as u32, mesh.indices.len() as u32);
    let mut bytes = Vec::with_capacity(MeshFile::expected_size(&header));

    bytes.extend_from_slice(&header.to_bytes());
    for vertex in &mesh.vertices {
        put_f32s(&mut bytes, &vertex.position);
        put_f32s(&mut bytes, &vertex.normal);
        put_f32s(&mut bytes, &vertex.uv);
    }
    for &index in &mesh.indices {
        bytes.extend_from_slice(&index.to_le_bytes());
    }

    bytes
}

fn put_f32s(bytes: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
}

fn check_len(what: &str, expected: usize, actual: usize) -> Result<(), ConvertError> {
    if expected != actual {
        return Err(ConvertError::LengthMismatch {
            what: what.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Vertex;
    use crate::skin::BoneTable;

    fn one_vertex_mesh() -> MeshData {
        MeshData {
            vertices: vec![Vertex {
                position: [1.0, 2.0, 3.0],
                normal: [0.0, 1.0, 0.0],
                uv: [0.5, 0.25],
                source_position: 0,
            }],
            indices: vec![0, 0, 0],
        }
    }

    fn one_bone_skin() -> SkinData {
        let mut identity = [0.0f32; 16];
        for i in 0..4 {
            identity[i * 5] = 1.0;
        }
        SkinData {
            bind_shape_matrix: identity,
            bones: BoneTable::from_names(vec!["Root".into()]),
            inverse_bind_matrices: vec![identity],
            vertex_weights: vec![vec![(0, 1.0)]],
        }
    }

    fn one_influence() -> Vec<RigInfluence> {
        vec![RigInfluence {
            bone_ids: [0, 0, 0, 0],
            weights: [1.0, 0.0, 0.0, 0.0],
        }]
    }

    fn one_channel() -> Vec<BoneChannel> {
        vec![BoneChannel {
            timestamps: vec![0.0, 0.5],
            keyframes: vec![
                RigKeyframe {
                    position: [0.0, 0.0, 0.0, 1.0],
                    rotation: [1.0, 0.0, 0.0, 0.0],
                },
                RigKeyframe {
                    position: [0.0, 1.0, 0.0, 1.0],
                    rotation: [1.0, 0.0, 0.0, 0.0],
                },
            ],
        }]
    }

    fn root_only_hierarchy() -> FlatHierarchy {
        FlatHierarchy {
            child_counts: vec![0],
            child_ids: vec![],
        }
    }

    #[test]
    fn test_encode_rig_roundtrips_through_decoder() {
        let mesh = one_vertex_mesh();
        let skin = one_bone_skin();
        let bytes = encode_rig(
            &mesh,
            &one_influence(),
            &skin,
            &one_channel(),
            &root_only_hierarchy(),
        )
        .unwrap();

        let rig = RigFile::from_bytes(&bytes).unwrap();
        assert_eq!(rig.header.vertex_count, 1);
        assert_eq!(rig.header.index_count, 3);
        assert_eq!(rig.header.bone_count, 1);
        assert_eq!(rig.vertices[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(rig.vertices[0].uv, [0.5, 0.25]);
        assert_eq!(rig.indices, vec![0, 0, 0]);
        assert_eq!(rig.influences[0].weights, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(rig.frame_counts, vec![2]);
        assert_eq!(rig.timestamps[0], vec![0.0, 0.5]);
        assert_eq!(rig.keyframes[0][1].position, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(rig.child_counts, vec![0]);
        assert!(rig.child_ids.is_empty());
    }

    #[test]
    fn test_encode_rig_size_matches_closed_form() {
        let bytes = encode_rig(
            &one_vertex_mesh(),
            &one_influence(),
            &one_bone_skin(),
            &one_channel(),
            &root_only_hierarchy(),
        )
        .unwrap();

        let header = MarrowRigHeader::new(1, 3, 1);
        assert_eq!(bytes.len(), RigFile::expected_size(&header, &[2], 0));
    }

    #[test]
    fn test_encode_rig_sentinel_encoding() {
        let mesh = one_vertex_mesh();
        let mut skin = one_bone_skin();
        // second bone absent from the tree
        skin.bones = BoneTable::from_names(vec!["Root".into(), "Loose".into()]);
        skin.inverse_bind_matrices.push([0.0; 16]);

        let channels = vec![
            one_channel().remove(0),
            BoneChannel {
                timestamps: vec![],
                keyframes: vec![],
            },
        ];
        let hierarchy = FlatHierarchy {
            child_counts: vec![0, -1],
            child_ids: vec![],
        };

        let bytes = encode_rig(&mesh, &one_influence(), &skin, &channels, &hierarchy).unwrap();
        let rig = RigFile::from_bytes(&bytes).unwrap();
        assert_eq!(rig.child_counts, vec![0, CHILD_COUNT_NONE]);
    }

    #[test]
    fn test_encode_rig_rejects_influence_mismatch() {
        let err = encode_rig(
            &one_vertex_mesh(),
            &[],
            &one_bone_skin(),
            &one_channel(),
            &root_only_hierarchy(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::LengthMismatch { expected: 1, actual: 0, .. }
        ));
    }

    #[test]
    fn test_encode_rig_rejects_channel_mismatch() {
        let err = encode_rig(
            &one_vertex_mesh(),
            &one_influence(),
            &one_bone_skin(),
            &[],
            &root_only_hierarchy(),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::LengthMismatch { .. }));
    }

    #[test]
    fn test_encode_mesh_roundtrips_through_decoder() {
        let bytes = encode_mesh(&one_vertex_mesh());
        let file = MeshFile::from_bytes(&bytes).unwrap();

        assert_eq!(file.header.vertex_count, 1);
        assert_eq!(file.header.index_count, 3);
        assert_eq!(file.vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(file.indices, vec![0, 0, 0]);
        assert_eq!(bytes.len(), MeshFile::expected_size(&file.header));
    }
}
