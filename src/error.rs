//! Non-fatal resolution diagnostics.
//!
//! Nothing in the resolution pipeline aborts a material: every anomaly is
//! absorbed locally, logged, and recorded as a [`ResolveIssue`] on the task
//! so hosts can surface import warnings. A partial material (missing
//! textures, disabled features) is always preferable to a failed import.

use thiserror::Error;

/// A condition that degraded a material during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveIssue {
    /// A texture reference pointed past the end of the texture collection.
    /// The slot resolves to no texture.
    #[error("texture index {index} is out of range ({available} textures exist)")]
    MissingTexture {
        /// The out-of-range index from the descriptor.
        index: usize,
        /// Number of textures the collection declares.
        available: usize,
    },

    /// A pixel operation needed a CPU-readable buffer but the image is
    /// GPU-resident. The dependent feature is disabled.
    #[error("image `{name}` is not CPU-readable; channel map disabled")]
    UnreadableImage {
        /// Image name, or a placeholder when unnamed.
        name: String,
    },

    /// No configured or registered shader program could be resolved for the
    /// material. A placeholder program with default parameters is used.
    #[error("no compatible shader program for material `{material}`; using default parameters")]
    NoCompatibleShader {
        /// The material's display name.
        material: String,
    },
}
