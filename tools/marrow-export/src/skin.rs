//! Skin extraction: joint names, inverse bind matrices, vertex weights,
//! and per-vertex influence packing.
//!
//! Bone ids are positions in the joint-name source; the same id space is
//! shared by weights, inverse bind matrices, animation channels and the
//! skeleton tree.

use std::str::FromStr;

use hashbrown::HashMap;
use roxmltree::Node;

use crate::document;
use crate::error::ConvertError;
use crate::formats::RigInfluence;
use crate::mesh::MeshData;

/// Joint names in order of appearance; bone id = index.
#[derive(Debug, Clone, Default)]
pub struct BoneTable {
    names: Vec<String>,
    ids: HashMap<String, u32>,
}

impl BoneTable {
    pub fn from_names(names: Vec<String>) -> Self {
        let mut ids = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // first occurrence wins
            ids.entry(name.clone()).or_insert(i as u32);
        }
        Self { names, ids }
    }

    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Everything the first controller's skin provides.
#[derive(Debug, Clone)]
pub struct SkinData {
    /// Read from the document and carried along, but neither applied to
    /// vertex positions nor emitted; the engine loader never reads one.
    pub bind_shape_matrix: [f32; 16],
    pub bones: BoneTable,
    /// One 16-float matrix per bone, in bone-id order.
    pub inverse_bind_matrices: Vec<[f32; 16]>,
    /// Per *original* position index: (bone id, weight) pairs of arbitrary
    /// length. Deduplicated vertices join through their source position.
    pub vertex_weights: Vec<Vec<(u32, f32)>>,
}

/// Extract the first controller's skin from the document.
pub fn extract_skin(root: Node) -> Result<SkinData, ConvertError> {
    let controllers = document::require_child(root, "library_controllers")?;
    let controller = controllers
        .children()
        .find(|c| c.is_element())
        .ok_or_else(|| ConvertError::MissingNode {
            path: document::node_path(controllers),
            tag: "controller".to_string(),
        })?;
    let skin = document::require_child(controller, "skin")?;

    let bind_shape =
        document::parse_floats(document::require_child(skin, "bind_shape_matrix")?)?;
    let bind_shape_matrix: [f32; 16] =
        bind_shape
            .try_into()
            .map_err(|v: Vec<f32>| ConvertError::LengthMismatch {
                what: "bind shape matrix floats".to_string(),
                expected: 16,
                actual: v.len(),
            })?;

    let names = document::name_array(document::require_source(skin, "skin-joints")?)?;
    let bones = BoneTable::from_names(names);

    let bind_poses = document::float_array(document::require_source(skin, "skin-bind_poses")?)?;
    if bind_poses.len() != bones.len() * 16 {
        return Err(ConvertError::LengthMismatch {
            what: "inverse bind matrix floats".to_string(),
            expected: bones.len() * 16,
            actual: bind_poses.len(),
        });
    }
    let inverse_bind_matrices: Vec<[f32; 16]> = bind_poses
        .chunks_exact(16)
        .map(|m| m.try_into().expect("chunked above"))
        .collect();

    let weight_values = document::float_array(document::require_source(skin, "skin-weights")?)?;

    let vertex_weights_node = document::require_child(skin, "vertex_weights")?;
    let counts = document::parse_ints(document::require_child(vertex_weights_node, "vcount")?)?;
    let pairs = document::parse_ints(document::require_child(vertex_weights_node, "v")?)?;

    let total_pairs: usize = counts.iter().map(|&c| c as usize).sum();
    if total_pairs * 2 != pairs.len() {
        return Err(ConvertError::LengthMismatch {
            what: "vertex weight pair stream".to_string(),
            expected: total_pairs * 2,
            actual: pairs.len(),
        });
    }

    let mut vertex_weights = Vec::with_capacity(counts.len());
    let mut cursor = 0usize;
    for &count in &counts {
        let mut influences = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let bone = pairs[cursor];
            let weight_index = pairs[cursor + 1] as usize;
            cursor += 2;

            if bone as usize >= bones.len() {
                return Err(ConvertError::IndexOutOfBounds {
                    what: "bone",
                    index: bone as usize,
                    len: bones.len(),
                });
            }
            let weight =
                *weight_values
                    .get(weight_index)
                    .ok_or(ConvertError::IndexOutOfBounds {
                        what: "weight",
                        index: weight_index,
                        len: weight_values.len(),
                    })?;
            influences.push((bone, weight));
        }
        vertex_weights.push(influences);
    }

    tracing::debug!(
        "skin: {} bones, {} weighted vertices",
        bones.len(),
        vertex_weights.len()
    );

    Ok(SkinData {
        bind_shape_matrix,
        bones,
        inverse_bind_matrices,
        vertex_weights,
    })
}

/// How the packed 4-weight vector is renormalized.
///
/// `Euclidean` divides by the L2 norm, which is what shipped assets were
/// baked with and what the engine expects; conventional skinning uses
/// `SumToOne`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightNormalization {
    #[default]
    Euclidean,
    SumToOne,
}

impl FromStr for WeightNormalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "euclidean" => Ok(Self::Euclidean),
            "sum" => Ok(Self::SumToOne),
            other => Err(format!(
                "unknown weight normalization \"{other}\" (expected \"euclidean\" or \"sum\")"
            )),
        }
    }
}

/// Select the top-4 influences per deduplicated vertex, pad or truncate to
/// exactly 4 slots, and renormalize. Slots are ordered by descending weight;
/// padding uses bone id 0 with weight 0.
pub fn pack_influences(
    mesh: &MeshData,
    skin: &SkinData,
    normalization: WeightNormalization,
) -> Result<Vec<RigInfluence>, ConvertError> {
    let mut packed = Vec::with_capacity(mesh.vertices.len());
    let mut degenerate = 0usize;

    for vertex in &mesh.vertices {
        let influences = skin.vertex_weights.get(vertex.source_position).ok_or(
            ConvertError::IndexOutOfBounds {
                what: "vertex weight",
                index: vertex.source_position,
                len: skin.vertex_weights.len(),
            },
        )?;

        let mut pairs = influences.clone();
        // stable sort: equal weights keep document order
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pairs.truncate(4);
        while pairs.len() < 4 {
            pairs.push((0, 0.0));
        }

        let mut bone_ids = [0u32; 4];
        let mut weights = [0f32; 4];
        for (slot, (bone, weight)) in pairs.iter().enumerate() {
            bone_ids[slot] = *bone;
            weights[slot] = *weight;
        }

        let divisor = match normalization {
            WeightNormalization::Euclidean => {
                weights.iter().map(|w| w * w).sum::<f32>().sqrt()
            }
            WeightNormalization::SumToOne => weights.iter().sum::<f32>(),
        };
        if divisor > 0.0 {
            for w in &mut weights {
                *w /= divisor;
            }
        } else {
            degenerate += 1;
        }

        packed.push(RigInfluence { bone_ids, weights });
    }

    if degenerate > 0 {
        tracing::warn!(
            "{} of {} vertices have zero total bone weight; their weights stay zero",
            degenerate,
            packed.len()
        );
    }

    Ok(packed)
}
