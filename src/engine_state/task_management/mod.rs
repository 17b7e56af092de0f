//! # Task Management System
//!
//! This module provides a task management system for executing chunk generation,
//! overlay fetching and mesh building off the main thread.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the main thread and one worker thread
//!
//! ## Inline Mode
//!
//! A manager created with zero workers runs every task synchronously inside
//! `publish_task` and buffers the results until the next `process_completed_tasks`.
//! Ordering is then fully deterministic, which is what the tests and the headless
//! driver rely on.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and return results
//! 4. Results are applied on the main thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(num_workers);
//!
//! // Publish a task for background processing
//! task_manager.publish_task(Box::new(MyTask::new(...)));
//!
//! // In the tick loop:
//! task_manager.process_completed_tasks(&mut context);
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use task::{Task, TaskContext, TaskResult};

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker
/// - `result_receiver`: Receives task results from worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `_worker`: Handle to the worker thread (kept alive by this struct)
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and managing worker threads
/// - Distributing tasks across available workers
/// - Collecting and applying task results
/// - Queuing tasks when all workers are busy
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    /// Results of tasks run inline, waiting for `process_completed_tasks`.
    inline_results: VecDeque<Box<dyn TaskResult + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept at 1 so tasks are processed in order within each channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create; `0` runs tasks inline
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        if num_workers > 0 {
            info!(
                "Starting {} task workers (available parallelism: {:?})",
                num_workers,
                thread::available_parallelism()
            );
        } else {
            info!("Task manager running inline");
        }

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            inline_results: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// `true` when tasks run synchronously on the calling thread.
    pub fn is_inline(&self) -> bool {
        self.channels.is_empty()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the send failed (worker disconnected), handing the task back
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel using round-robin from the last used one.
    ///
    /// # Returns
    /// - `Some(usize)` index of a channel below `MAX_TASKS_IN_FLIGHT`
    /// - `None` if all channels are busy or there are none
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        let start_channel = self.current_channel;
        let mut current = start_channel;

        loop {
            if self.channels[current].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a new task for execution.
    ///
    /// The task runs as soon as a worker becomes available, or is queued if all
    /// workers are busy. In inline mode it runs immediately.
    ///
    /// # Returns
    /// - `true` if the task was scheduled (or run inline)
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        if self.is_inline() {
            self.inline_results.push_back(task.process());
            return true;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    warn!("Task worker {} disconnected, queuing task", channel_idx);
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Moves queued tasks onto workers that became free.
    ///
    /// Processes tasks in FIFO order and stops at the first task that can't be
    /// scheduled.
    pub fn process_queued_tasks(&mut self) {
        while !self.queued_tasks.is_empty() {
            let Some(channel_idx) = self.find_available_channel() else {
                break;
            };
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Applies every completed task result on the main thread.
    ///
    /// Results are handled in the order they were received; tasks they spawn are
    /// published afterwards, so in inline mode their results land in the next call.
    ///
    /// # Returns
    /// The number of results applied.
    pub fn process_completed_tasks(&mut self, context: &mut TaskContext<'_>) -> usize {
        let mut results: Vec<Box<dyn TaskResult + Send>> = self.inline_results.drain(..).collect();
        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                results.push(result);
            }
        }

        let handled = results.len();
        let mut tasks_to_queue = Vec::new();
        for result in results {
            tasks_to_queue.extend(result.handle_result(context));
        }
        if handled > 0 {
            debug!("Applied {} task results", handled);
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
        handled
    }

    /// Tasks queued, running, or finished but not yet applied.
    pub fn outstanding(&self) -> usize {
        self.queued_tasks.len()
            + self.inline_results.len()
            + self
                .channels
                .iter()
                .map(|channel| channel.num_tasks_in_flight)
                .sum::<usize>()
    }
}
