//! Mesh extraction (scene document -> deduplicated vertex/index data)
//!
//! The triangle stream indexes positions, normals and UVs independently; the
//! engine wants one index per corner. Corners sharing the exact
//! (position, normal, uv) index triple collapse to a single output vertex,
//! assigned in first-seen order.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use hashbrown::HashMap;
use roxmltree::Node;

use crate::document;
use crate::error::ConvertError;
use crate::formats::encode_mesh;

/// One deduplicated vertex. `source_position` is the index into the original
/// position array, kept so skin weights (keyed by original position index)
/// can be joined back after deduplication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub source_position: usize,
}

/// Deduplicated mesh: `indices` has one entry per original triangle corner.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Extract the first geometry's mesh from the document.
pub fn extract_mesh(root: Node) -> Result<MeshData, ConvertError> {
    let geometries = document::require_child(root, "library_geometries")?;
    let geometry = geometries
        .children()
        .find(|c| c.is_element())
        .ok_or_else(|| ConvertError::MissingNode {
            path: document::node_path(geometries),
            tag: "geometry".to_string(),
        })?;
    let mesh = document::require_child(geometry, "mesh")?;

    let positions = document::float_array(document::require_source(mesh, "positions")?)?;
    let normals = document::float_array(document::require_source(mesh, "normals")?)?;
    let uvs = document::float_array(document::require_source(mesh, "map-0")?)?;

    let triangles = document::require_child(mesh, "triangles")?;
    let stream = document::parse_ints(document::require_child(triangles, "p")?)?;
    if stream.len() % 3 != 0 {
        return Err(ConvertError::MalformedIndexStream { len: stream.len() });
    }

    let mut data = MeshData::default();
    let mut seen: HashMap<(u32, u32, u32), u32> = HashMap::new();
    let mut reused = 0usize;

    for corner in stream.chunks_exact(3) {
        let (p, n, t) = (corner[0], corner[1], corner[2]);
        if let Some(&index) = seen.get(&(p, n, t)) {
            reused += 1;
            data.indices.push(index);
            continue;
        }

        let position = slice3(&positions, p, "position")?;
        let normal = slice3(&normals, n, "normal")?;
        let uv = slice2(&uvs, t, "uv")?;

        let index = data.vertices.len() as u32;
        data.vertices.push(Vertex {
            position,
            normal,
            uv,
            source_position: p as usize,
        });
        data.indices.push(index);
        seen.insert((p, n, t), index);
    }

    tracing::debug!(
        "mesh: {} corners -> {} unique vertices ({} reused)",
        data.indices.len(),
        data.vertices.len(),
        reused
    );

    Ok(data)
}

fn slice3(values: &[f32], index: u32, what: &'static str) -> Result<[f32; 3], ConvertError> {
    let i = index as usize * 3;
    if i + 3 > values.len() {
        return Err(ConvertError::IndexOutOfBounds {
            what,
            index: index as usize,
            len: values.len() / 3,
        });
    }
    Ok([values[i], values[i + 1], values[i + 2]])
}

fn slice2(values: &[f32], index: u32, what: &'static str) -> Result<[f32; 2], ConvertError> {
    let i = index as usize * 2;
    if i + 2 > values.len() {
        return Err(ConvertError::IndexOutOfBounds {
            what,
            index: index as usize,
            len: values.len() / 2,
        });
    }
    Ok([values[i], values[i + 1]])
}

/// Convert a scene document to a static `.mrwmesh` model (geometry only).
pub fn convert_mesh(input: &Path, output: &Path) -> Result<()> {
    let text =
        fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))?;
    let doc = roxmltree::Document::parse(&text)
        .with_context(|| format!("Failed to parse {:?}", input))?;

    let mesh = extract_mesh(doc.root_element())?;
    let bytes = encode_mesh(&mesh);

    fs::write(output, &bytes).with_context(|| format!("Failed to write {:?}", output))?;

    tracing::info!(
        "Exported mesh: {} vertices, {} indices, {} bytes",
        mesh.vertices.len(),
        mesh.indices.len(),
        bytes.len()
    );

    Ok(())
}
