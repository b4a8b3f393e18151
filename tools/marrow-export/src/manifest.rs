//! Asset manifest (assets.toml) batch building.
//!
//! A manifest lists scene documents to convert in one run:
//!
//! ```toml
//! output_dir = "baked"
//!
//! [[rig]]
//! input = "models/worm.dae"
//!
//! [[rig]]
//! input = "models/crawler.dae"
//! output = "crawler_v2.mrwrig"
//! weight_normalization = "sum"
//!
//! [[mesh]]
//! input = "props/rock.dae"
//! ```
//!
//! Inputs are resolved relative to the manifest file; outputs default to the
//! input name with the format extension, under `output_dir` when set.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::formats::{MESH_EXT, RIG_EXT};
use crate::rig::ExportOptions;
use crate::skin::WeightNormalization;
use crate::{mesh, rig};

#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub rig: Vec<RigEntry>,
    #[serde(default)]
    pub mesh: Vec<MeshEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RigEntry {
    pub input: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub weight_normalization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MeshEntry {
    pub input: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Load and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {:?}", path))?;
    let manifest: Manifest =
        toml::from_str(&text).with_context(|| format!("Failed to parse manifest {:?}", path))?;
    Ok(manifest)
}

/// Check every entry without converting anything.
pub fn validate(manifest: &Manifest, base: &Path) -> Result<()> {
    for entry in &manifest.rig {
        let input = base.join(&entry.input);
        if !input.exists() {
            bail!("rig input {:?} does not exist", input);
        }
        if let Some(norm) = &entry.weight_normalization {
            norm.parse::<WeightNormalization>()
                .map_err(|e| anyhow::anyhow!(e))
                .with_context(|| format!("rig entry {:?}", entry.input))?;
        }
    }
    for entry in &manifest.mesh {
        let input = base.join(&entry.input);
        if !input.exists() {
            bail!("mesh input {:?} does not exist", input);
        }
    }
    Ok(())
}

/// Convert every entry. `output_override` replaces the manifest's
/// `output_dir` when given.
pub fn build_all(manifest: &Manifest, base: &Path, output_override: Option<&Path>) -> Result<()> {
    let out_dir = output_override
        .map(Path::to_path_buf)
        .or_else(|| manifest.output_dir.as_ref().map(|d| base.join(d)));
    if let Some(dir) = &out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output dir {:?}", dir))?;
    }

    for entry in &manifest.rig {
        let input = base.join(&entry.input);
        let output = resolve_output(&input, entry.output.as_deref(), out_dir.as_deref(), RIG_EXT);
        let options = ExportOptions {
            weight_normalization: match &entry.weight_normalization {
                Some(norm) => norm
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!(e))
                    .with_context(|| format!("rig entry {:?}", entry.input))?,
                None => WeightNormalization::default(),
            },
        };
        tracing::info!("Converting {:?} -> {:?}", input, output);
        rig::convert_dae(&input, &output, &options)?;
    }

    for entry in &manifest.mesh {
        let input = base.join(&entry.input);
        let output = resolve_output(&input, entry.output.as_deref(), out_dir.as_deref(), MESH_EXT);
        tracing::info!("Converting {:?} -> {:?}", input, output);
        mesh::convert_mesh(&input, &output)?;
    }

    Ok(())
}

/// Explicit output wins; otherwise the input name with the format extension.
/// Either lands under the output dir when one is set.
fn resolve_output(
    input: &Path,
    explicit: Option<&Path>,
    out_dir: Option<&Path>,
    ext: &str,
) -> PathBuf {
    let name = match explicit {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(input.with_extension(ext).file_name().expect("file input")),
    };
    match out_dir {
        Some(dir) if name.is_relative() => dir.join(name),
        _ => match explicit {
            Some(_) => name,
            None => input.with_extension(ext),
        },
    }
}
