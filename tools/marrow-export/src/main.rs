//! marrow-export - Marrow asset export tool
//!
//! Converts scene documents (.dae) to engine-ready binary formats
//! (.mrwrig, .mrwmesh)

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use marrow_export::formats::{MESH_EXT, RIG_EXT};
use marrow_export::rig::ExportOptions;
use marrow_export::skin::WeightNormalization;
use marrow_export::{manifest, mesh, rig};

#[derive(Parser)]
#[command(name = "marrow-export")]
#[command(about = "Marrow asset export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build assets from a manifest file
    Build {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without building
    Check {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,
    },

    /// Export a rigged model (mesh + skin + animation + skeleton)
    Rig {
        /// Input scene document (.dae)
        input: PathBuf,

        /// Output .mrwrig file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Weight renormalization: "euclidean" (engine default) or "sum"
        #[arg(short, long, default_value = "euclidean")]
        weight_normalization: String,
    },

    /// Export a static model (geometry only)
    Mesh {
        /// Input scene document (.dae)
        input: PathBuf,

        /// Output .mrwmesh file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print bone and mesh statistics for a scene document
    Info {
        /// Input scene document (.dae)
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { manifest, output } => {
            tracing::info!("Building assets from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            let base = manifest.parent().unwrap_or_else(|| std::path::Path::new("."));
            manifest::validate(&config, base)?;
            manifest::build_all(&config, base, output.as_deref())?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            let base = manifest.parent().unwrap_or_else(|| std::path::Path::new("."));
            manifest::validate(&config, base)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Rig {
            input,
            output,
            weight_normalization,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(RIG_EXT));
            let options = ExportOptions {
                weight_normalization: weight_normalization
                    .parse::<WeightNormalization>()
                    .map_err(|e| anyhow::anyhow!(e))?,
            };
            tracing::info!("Converting {:?} -> {:?}", input, output);
            rig::convert_dae(&input, &output, &options)?;
            tracing::info!("Done!");
        }

        Commands::Mesh { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension(MESH_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            mesh::convert_mesh(&input, &output)?;
            tracing::info!("Done!");
        }

        Commands::Info { input } => {
            rig::print_info(&input)?;
        }
    }

    Ok(())
}
