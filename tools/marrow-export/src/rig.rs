//! Rig conversion pipeline (scene document -> .mrwrig)
//!
//! The stages run strictly forward: mesh, skin, influence packing,
//! animation, skeleton flattening, then one encode. The output file is
//! created only after the complete byte image exists in memory, so a
//! failing stage never leaves a partial file behind.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::ConvertError;
use crate::formats::encode_rig;
use crate::skin::WeightNormalization;
use crate::{animation, mesh, skeleton, skin};

/// Conversion knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    pub weight_normalization: WeightNormalization,
}

/// Run the full pipeline over a parsed document and return the encoded
/// `.mrwrig` byte image.
pub fn build_rig(
    doc: &roxmltree::Document,
    options: &ExportOptions,
) -> Result<Vec<u8>, ConvertError> {
    let root = doc.root_element();

    let mesh = mesh::extract_mesh(root)?;
    let skin = skin::extract_skin(root)?;
    let influences = skin::pack_influences(&mesh, &skin, options.weight_normalization)?;
    let channels = animation::extract_animation(root, &skin.bones)?;
    let tree = skeleton::extract_skeleton(root)?;
    let hierarchy = skeleton::flatten(&tree, &skin.bones)?;

    encode_rig(&mesh, &influences, &skin, &channels, &hierarchy)
}

/// Convert a scene document file to a `.mrwrig` file.
pub fn convert_dae(input: &Path, output: &Path, options: &ExportOptions) -> Result<()> {
    let text =
        fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))?;
    let doc = roxmltree::Document::parse(&text)
        .with_context(|| format!("Failed to parse {:?}", input))?;

    let bytes = build_rig(&doc, options)
        .with_context(|| format!("Failed to convert {:?}", input))?;

    fs::write(output, &bytes).with_context(|| format!("Failed to write {:?}", output))?;

    // header is trustworthy here; build_rig validated every section
    let header = crate::formats::MarrowRigHeader::from_bytes(&bytes).expect("sized header");
    tracing::info!(
        "Exported rig: {} vertices, {} indices, {} bones, {} bytes",
        header.vertex_count,
        header.index_count,
        header.bone_count,
        bytes.len()
    );

    Ok(())
}

/// Print a summary of a scene document without converting it.
pub fn print_info(input: &Path) -> Result<()> {
    let text =
        fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))?;
    let doc = roxmltree::Document::parse(&text)
        .with_context(|| format!("Failed to parse {:?}", input))?;
    let root = doc.root_element();

    let mesh = mesh::extract_mesh(root)?;
    tracing::info!(
        "Mesh: {} unique vertices, {} corner indices",
        mesh.vertices.len(),
        mesh.indices.len()
    );

    let skin = skin::extract_skin(root)?;
    let channels = animation::extract_animation(root, &skin.bones)?;
    tracing::info!("Bones ({}):", skin.bones.len());
    for (id, name) in skin.bones.iter().enumerate() {
        tracing::info!("  [{}] '{}': {} keyframes", id, name, channels[id].timestamps.len());
    }

    Ok(())
}
