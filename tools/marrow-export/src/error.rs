//! Conversion error taxonomy.
//!
//! Every extraction stage reports contract violations here, at the stage
//! where they occur, with enough context to locate the offending tag or
//! index. There is no warn-and-return-empty path: a failed stage aborts the
//! whole conversion and no output file is written.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// A required tagged child is absent. `path` is the full tag path of the
    /// node that was expected to contain it.
    #[error("missing <{tag}> under {path}")]
    MissingNode { path: String, tag: String },

    /// No child of `path` has an id ending in `suffix`.
    #[error("no source with id ending \"{suffix}\" under {path}")]
    MissingSource { path: String, suffix: &'static str },

    #[error("missing attribute \"{attribute}\" on {path}")]
    MissingAttribute { path: String, attribute: &'static str },

    /// Two arrays that must agree in length do not.
    #[error("{what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// The triangle index stream does not group into (position, normal, uv)
    /// triples.
    #[error("triangle index stream length {len} is not a multiple of 3")]
    MalformedIndexStream { len: usize },

    #[error("{what} index {index} out of bounds (length {len})")]
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// A skeleton-tree node references a name missing from the joint table.
    #[error("skeleton node \"{name}\" does not match any joint name")]
    UnknownBone { name: String },

    #[error("invalid number \"{token}\" in {path}")]
    InvalidNumber { path: String, token: String },
}
