//! # Core Module
//!
//! Concurrency primitives shared across the engine.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking

pub mod mt_resource;

pub use mt_resource::MtResource;
