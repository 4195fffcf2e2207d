//! Error Types
//!
//! The main error type [`CanopyError`] covers the failure modes of scene
//! construction and mesh registration. Failures split into two families:
//!
//! - Structural and capability violations (adding a second child to a
//!   transform node, registering a mesh without a required vertex attribute)
//!   are surfaced immediately as errors.
//! - Missing resources at traversal time (an unregistered mesh name, a light
//!   bound to nothing) degrade to no-ops so a partially built scene still
//!   renders; those paths never construct a `CanopyError`.
//!
//! All public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, CanopyError>`.

use thiserror::Error;

/// The main error type for the canopy scene graph.
#[derive(Error, Debug)]
pub enum CanopyError {
    // ========================================================================
    // Scene Structure Errors
    // ========================================================================
    /// A transform node can hold exactly one child.
    #[error("transform node '{0}' already has a child")]
    ChildOccupied(String),

    /// Leaf nodes hold geometry, never children.
    #[error("leaf node '{0}' cannot take children")]
    LeafChild(String),

    /// A light-map key that resolves to no node in the active tree.
    #[error("light bound to unknown node '{0}'")]
    DanglingLightBinding(String),

    // ========================================================================
    // Mesh Registration Errors
    // ========================================================================
    /// The mesh lacks a vertex attribute the shader bindings require.
    #[error("mesh '{mesh}' is missing required vertex attribute '{attribute}'")]
    MissingAttribute {
        /// Name the mesh was registered under
        mesh: String,
        /// The absent vertex attribute
        attribute: String,
    },

    /// A vertex attribute whose data length is not a multiple of its
    /// component count, or which disagrees with its mesh's vertex count.
    #[error("malformed vertex attribute '{attribute}' on mesh '{mesh}': {reason}")]
    MalformedAttribute {
        /// Name the mesh was registered under
        mesh: String,
        /// The offending vertex attribute
        attribute: String,
        /// What is wrong with it
        reason: String,
    },

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// The render backend rejected an upload or draw.
    #[error("render backend error: {0}")]
    Backend(String),
}

/// Alias for `Result<T, CanopyError>`.
pub type Result<T> = std::result::Result<T, CanopyError>;
