//! # Voxel Task System
//!
//! Tasks that fill the world in the background.
//!
//! - `ChunkGenerationTask`: terrain plus overlay for one chunk coordinate
//! - `OverlayFetchTask`: geocoding and footprint download for the overlay

pub mod chunk_generation_task;
pub mod overlay_fetch_task;
