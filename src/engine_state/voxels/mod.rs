//! # Voxel World Core
//!
//! This module contains the world representation and everything that reads or writes it.
//!
//! ## Architecture
//!
//! * **Block**: Block types, their byte encoding and the static property registry
//! * **Chunk**: Dense column-shaped voxel arrays and coordinate conversions
//! * **World**: The chunk store, with voxel access and chunk-changed notification
//! * **Generation**: Deterministic terrain and the building/road overlay stamp
//! * **Raycast**: Voxel-grid traversal for picking
//! * **Tasks**: Background chunk generation and overlay fetching
//!
//! ## Data Flow
//!
//! 1. The orchestrator requests chunks around the viewer as generation tasks
//! 2. Results are stored with `World::put_chunk` on the main thread
//! 3. Edits go through `World::set_voxel`, which marks the chunk dirty
//! 4. Dirty chunks are remeshed in the background
//!
//! ## Thread Safety
//!
//! The world itself lives on the main thread. Background tasks only ever see owned
//! inputs or shared voxel snapshots, never the world.

pub mod block;
pub mod chunk;
pub mod generation;
pub mod raycast;
pub mod tasks;
pub mod world;
