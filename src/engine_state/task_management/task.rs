//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which provides a framework for executing work off the main thread.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed asynchronously
//! - `TaskResult`: Represents the result of a completed task
//! - `TaskContext`: The main-thread state a result is applied to
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread (or inline)
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread with a `TaskContext`
//! 5. The result can mutate world state and spawn new tasks
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the main thread
//! - Tasks own snapshots of everything they read; only results touch the world

use crate::engine_state::{
    orchestrator::WorldOrchestrator, rendering::meshing::MeshManager, voxels::world::World,
};

/// Main-thread state handed to task results.
///
/// All world mutation caused by background work goes through here, so chunk mutations
/// stay serialised on the main thread.
pub struct TaskContext<'a> {
    pub world: &'a mut World,
    pub mesh_manager: &'a mut MeshManager,
    pub orchestrator: &'a mut WorldOrchestrator,
}

/// A trait representing a unit of work that can be executed asynchronously.
///
/// Tasks are the primary mechanism for offloading work from the main thread to
/// background workers. They should be self-contained and own all the data they need.
///
/// # Implementation Guidelines
/// - Must be `Send` to be transferred between threads
/// - Should be relatively coarse-grained to amortize task scheduling overhead
/// - Should hold snapshots, never references to data that might be modified elsewhere
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Runs on a background thread, or inline when the manager has no workers.
    /// Errors are handled internally and reported through the result.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be processed on the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// A trait representing the result of processing a `Task`.
///
/// Results run on the main thread and apply their outcome to the `TaskContext`. A
/// result that was overtaken by newer state (a chunk loaded meanwhile, a chunk
/// edited since its snapshot) discards itself.
pub trait TaskResult: Send {
    /// Applies the result on the main thread.
    ///
    /// # Arguments
    /// * `context` - Mutable access to world, mesh and residency state
    ///
    /// # Returns
    /// New tasks to schedule (can be empty).
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>>;
}
