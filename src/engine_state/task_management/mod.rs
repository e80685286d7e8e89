//! # Task Management System
//!
//! A fixed pool of worker threads executing generation and meshing work off
//! the owning thread.
//!
//! ## Architecture Overview
//! - `TaskManager`: distributes tasks to workers and owns the result queues
//! - `Task`: a unit of work executed on a worker
//! - `TaskChannel`: the link between the owning thread and one worker
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`; this never blocks
//! 2. The manager hands them to idle workers round-robin, queueing the rest
//! 3. Workers run `Task::process`, which posts typed results
//! 4. Once per tick the owning thread calls `process_completed_tasks()` and
//!    then drains `drain_generated()` and `drain_meshed()`
//!
//! No ordering holds between tasks on different workers. Tasks are never
//! cancelled; dropping the manager lets in-flight work finish before the
//! workers are joined.
//!
//! ## Example Usage
//! ```no_run
//! use voxel_terrain::engine_state::task_management::TaskManager;
//!
//! let mut task_manager = TaskManager::new(4);
//!
//! // In the main loop:
//! task_manager.process_completed_tasks();
//! for generated in task_manager.drain_generated() {
//!     // schedule meshing
//! }
//! for meshed in task_manager.drain_meshed() {
//!     // upload
//! }
//! ```

pub mod task;

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, error, info};

use crate::engine_state::{
    rendering::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTaskResult,
    voxels::tasks::chunk_generation_task::ChunkGenerationTaskResult,
};

pub use task::{Task, TaskResultSenders};

/// Maximum number of tasks handed to one worker before it reports back.
///
/// Keeping this at 1 leaves the backlog in `queued_tasks`, where any worker
/// that frees up can take it.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

/// A communication channel between the owning thread and one worker.
struct TaskChannel {
    task_sender: Option<Sender<Box<dyn Task + Send>>>,
    completion_receiver: Receiver<()>,
    num_tasks_in_flight: usize,
    worker: Option<JoinHandle<()>>,
}

/// Manages a pool of worker threads and the typed result queues they feed.
///
/// Only the owning thread may call into it; the type is deliberately not
/// `Sync`, so draining from two threads cannot compile.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
    generated_receiver: Receiver<ChunkGenerationTaskResult>,
    meshed_receiver: Receiver<ChunkMeshGenerationTaskResult>,
}

impl TaskManager {
    /// Creates a manager with `num_workers` threads (at least one).
    pub fn new(num_workers: usize) -> Self {
        let num_workers = num_workers.max(1);
        let (generated_tx, generated_receiver) = channel();
        let (meshed_tx, meshed_receiver) = channel();
        let senders = TaskResultSenders {
            generated: generated_tx,
            meshed: meshed_tx,
        };

        let channels = (0..num_workers)
            .map(|index| Self::spawn_worker(index, senders.clone()))
            .collect();

        info!(
            "Task manager started {} workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            generated_receiver,
            meshed_receiver,
        }
    }

    fn spawn_worker(index: usize, senders: TaskResultSenders) -> TaskChannel {
        let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
        let (done_tx, done_rx) = channel::<()>();

        let task_closure = move || {
            while let Ok(task) = task_rx.recv() {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.process(&senders)));
                if outcome.is_err() {
                    error!("Worker {} recovered from a panicking task", index);
                }
                if done_tx.send(()).is_err() {
                    break;
                }
            }
            debug!("Worker {} shutting down", index);
        };

        let worker = thread::Builder::new()
            .name(format!("terrain-worker-{index}"))
            .spawn(task_closure);

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                error!("Failed to spawn worker {}: {}", index, err);
                None
            }
        };

        TaskChannel {
            task_sender: worker.as_ref().map(|_| task_tx),
            completion_receiver: done_rx,
            num_tasks_in_flight: 0,
            worker,
        }
    }

    /// Sends a task to a specific worker, returning it on failure.
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        let channel = &mut self.channels[channel_idx];
        let Some(sender) = channel.task_sender.as_ref() else {
            return Err(task);
        };
        match sender.send(task) {
            Ok(()) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(err) => {
                // the worker is gone; stop offering it work
                channel.task_sender = None;
                Err(err.0)
            }
        }
    }

    /// Finds a live worker below `MAX_TASKS_IN_FLIGHT`, round-robin from the
    /// last one used.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|step| (self.current_channel + step) % len)
            .find(|&idx| {
                let channel = &self.channels[idx];
                channel.task_sender.is_some() && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
            })
    }

    /// Publishes a task for execution.
    ///
    /// # Returns
    /// - `true` if a worker took the task immediately
    /// - `false` if it was queued until a worker frees up
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        if !self.queued_tasks.is_empty() {
            self.queued_tasks.push_back(task);
            return false;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(()) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
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

    /// Hands queued tasks to workers until the queue or the workers run out.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(()) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    self.queued_tasks.push_front(task);
                    if self.channels.iter().all(|c| c.task_sender.is_none()) {
                        error!("All workers are gone; {} tasks stranded", self.queued_tasks.len());
                        break;
                    }
                }
            }
        }
    }

    /// Collects worker completions and refills idle workers from the queue.
    ///
    /// Call once per tick before draining results.
    pub fn process_completed_tasks(&mut self) {
        for channel in &mut self.channels {
            while channel.completion_receiver.try_recv().is_ok() {
                channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
            }
        }
        self.process_queued_tasks();
    }

    /// Takes every generation result posted since the last drain.
    pub fn drain_generated(&self) -> Vec<ChunkGenerationTaskResult> {
        self.generated_receiver.try_iter().collect()
    }

    /// Takes every meshing result posted since the last drain.
    pub fn drain_meshed(&self) -> Vec<ChunkMeshGenerationTaskResult> {
        self.meshed_receiver.try_iter().collect()
    }

    /// Number of tasks waiting for a worker.
    pub fn queued_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Number of tasks handed to workers and not yet reported complete.
    pub fn in_flight_count(&self) -> usize {
        self.channels.iter().map(|c| c.num_tasks_in_flight).sum()
    }

    /// `true` when nothing is queued or running. Results may still be waiting
    /// to be drained.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.in_flight_count() == 0
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        for channel in &mut self.channels {
            channel.task_sender.take();
        }
        for channel in &mut self.channels {
            if let Some(worker) = channel.worker.take() {
                let _ = worker.join();
            }
        }
        if !self.queued_tasks.is_empty() {
            debug!("Dropped {} queued tasks on shutdown", self.queued_tasks.len());
        }
    }
}
