//! Chunk content generation: the noise terrain and the building/road overlay stamped on
//! top of it.

pub mod overlay;
pub mod terrain;
