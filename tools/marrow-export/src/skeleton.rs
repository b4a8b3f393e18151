//! Skeleton tree extraction and flattening.
//!
//! The visual scene carries one bone tree; each node joins the joint table
//! through its scoped identifier. Flattening produces two parallel arrays
//! that allow pointer-free reconstruction: per-bone child counts and a
//! pre-order concatenation of child-id groups.

use roxmltree::Node;

use crate::document;
use crate::error::ConvertError;
use crate::skin::BoneTable;

/// One node of the scene's bone tree.
#[derive(Debug, Clone)]
pub struct SkeletonNode {
    /// Scoped identifier, joining the joint table by exact match.
    pub name: String,
    /// Local bind transform, carried but not emitted.
    pub transform: [f32; 16],
    pub children: Vec<SkeletonNode>,
}

/// Flattened bone hierarchy.
///
/// `child_counts[id]` is the child count of the bone when it appears in the
/// tree, or −1 for a bone the tree walk never visits. `child_ids` is the
/// pre-order concatenation of sibling groups, starting with the root's
/// children; the root id itself is never emitted.
#[derive(Debug, Clone)]
pub struct FlatHierarchy {
    pub child_counts: Vec<i32>,
    pub child_ids: Vec<u32>,
}

/// Extract the bone tree root from the document's visual scene.
pub fn extract_skeleton(root: Node) -> Result<SkeletonNode, ConvertError> {
    let armature = document::walk(root, &["library_visual_scenes", "visual_scene", "node"])?;
    let root_bone = document::require_child(armature, "node")?;
    build_node(root_bone)
}

fn build_node(node: Node) -> Result<SkeletonNode, ConvertError> {
    let name = document::attribute(node, "sid")?.to_string();

    let matrix = document::parse_floats(document::require_child(node, "matrix")?)?;
    let transform: [f32; 16] =
        matrix
            .try_into()
            .map_err(|v: Vec<f32>| ConvertError::LengthMismatch {
                what: format!("bone \"{name}\" matrix floats"),
                expected: 16,
                actual: v.len(),
            })?;

    let children = node
        .children()
        .filter(|c| c.is_element() && c.tag_name().name() == "node")
        .map(build_node)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SkeletonNode {
        name,
        transform,
        children,
    })
}

/// Per-subtree flattening result, merged upward by the parent.
struct Flattened {
    /// (bone id, child count) for every node visited in this subtree.
    counts: Vec<(u32, u32)>,
    /// Child-id groups in visit order.
    ids: Vec<u32>,
}

/// Flatten the tree against the joint table.
///
/// A tree node naming an unknown bone is fatal; a bone absent from the tree
/// keeps the −1 sentinel in `child_counts`.
pub fn flatten(root: &SkeletonNode, bones: &BoneTable) -> Result<FlatHierarchy, ConvertError> {
    let flat = flatten_node(root, bones)?;

    let mut child_counts = vec![-1i32; bones.len()];
    for (id, count) in flat.counts {
        child_counts[id as usize] = count as i32;
    }

    Ok(FlatHierarchy {
        child_counts,
        child_ids: flat.ids,
    })
}

fn flatten_node(node: &SkeletonNode, bones: &BoneTable) -> Result<Flattened, ConvertError> {
    let id = bone_id(bones, &node.name)?;

    let mut counts = vec![(id, node.children.len() as u32)];
    let mut ids = node
        .children
        .iter()
        .map(|child| bone_id(bones, &child.name))
        .collect::<Result<Vec<_>, _>>()?;

    for child in &node.children {
        let sub = flatten_node(child, bones)?;
        counts.extend(sub.counts);
        ids.extend(sub.ids);
    }

    Ok(Flattened { counts, ids })
}

fn bone_id(bones: &BoneTable, name: &str) -> Result<u32, ConvertError> {
    bones.id_of(name).ok_or_else(|| ConvertError::UnknownBone {
        name: name.to_string(),
    })
}
