// src/error.rs
//! Error types for scene loading and node binding.

use thiserror::Error;

/// Errors surfaced while bringing the diorama model into the scene.
///
/// None of these are retried: a broken asset reference will not heal itself.
/// The application reports the error once and stays in the awaiting-assets
/// state.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The model file could not be opened or decoded.
    #[error("failed to load model '{path}': {source}")]
    AssetLoad {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    /// A node the scene expects by name is absent from the loaded hierarchy.
    #[error("named node '{0}' missing from loaded model")]
    NamedNodeMissing(&'static str),

    /// The loader thread went away before resolving its completion channel.
    #[error("model loader terminated before completing")]
    LoadInterrupted,
}
