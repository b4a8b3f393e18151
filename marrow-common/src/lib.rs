//! Shared types and binary asset formats for the Marrow engine.
//!
//! This crate defines the on-disk formats produced by `marrow-export` and
//! consumed by the engine's resource loader. It is dependency-light so it
//! can be linked from both sides.

pub mod formats;

pub use formats::*;
