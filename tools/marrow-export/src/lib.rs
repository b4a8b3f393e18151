//! marrow-export library
//!
//! Converts hierarchical scene documents (mesh, skin, animation, skeleton)
//! into the engine-ready Marrow binary formats. The binary drives the same
//! functions; other tools can call them directly.

pub mod animation;
pub mod document;
pub mod error;
pub mod formats;
pub mod manifest;
pub mod mesh;
pub mod rig;
pub mod skeleton;
pub mod skin;

pub use error::ConvertError;

// Re-export key pipeline types
pub use animation::{extract_animation, BoneChannel};
pub use mesh::{extract_mesh, MeshData, Vertex};
pub use rig::{build_rig, convert_dae, ExportOptions};
pub use skeleton::{extract_skeleton, flatten, FlatHierarchy, SkeletonNode};
pub use skin::{extract_skin, pack_influences, BoneTable, SkinData, WeightNormalization};
