//! Rendering-facing output of the engine.
//!
//! The engine does not own a GPU. It produces per-chunk meshes in a flat vertex format
//! (`Vertex`), split into material groups, and hands them to whatever draws them.

pub use meshing::MeshManager;

pub mod meshing;
pub mod tasks;
mod vertex;

// Re-export commonly used types
pub use vertex::Vertex;
