use crate::clock::Clock;
use crate::config::EngineConfig;
use hexspace_hex::{AxialHex, CubeHex};
use hexspace_kernel::{Chunk, WorldMap, GRID_BATCH, INDEX_BATCH};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Task-fatal queue errors, delivered to waiters through [`QueueEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("generation queue cleared")]
    Cleared,
    #[error("placeholder chunk missing from the world map")]
    PlaceholderMissing,
}

/// Live task status. Terminal states (completed, failed) remove the task and
/// emit an event instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Generating,
}

/// Per-task step pipeline. Grid and Index work in fixed-size batches and
/// yield back to the scheduler between batches; Neighbors is atomic.
#[derive(Debug)]
enum GenStep {
    Grid { cursor: usize },
    Neighbors,
    Index { cursor: usize },
    Done,
}

#[derive(Debug)]
struct GenerationTask {
    center: AxialHex,
    priority: i32,
    status: TaskStatus,
    step: GenStep,
    /// Full grid coordinate list, fixed at task creation.
    grid: Vec<AxialHex>,
}

/// Result of an [`GenerationQueue::enqueue`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The chunk is already initialized; nothing to do.
    AlreadyInitialized,
    /// A new task was attached (placeholder created if absent).
    Queued,
    /// An existing task absorbed the request; its priority may have risen.
    Merged { priority: i32 },
}

/// Result of one `process_one_frame` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No tasks remain.
    Idle,
    /// Work remains for future frames.
    MorePending,
}

/// Completion signals, drained by the caller each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEvent {
    Completed { center: AxialHex },
    Failed { center: AxialHex, error: QueueError },
}

/// Cooperative, frame-budgeted chunk construction scheduler.
///
/// Single-threaded by design: each frame it selects the highest-priority
/// task and drives its step pipeline (`Grid -> Neighbors -> Index`) until the
/// task completes or the frame budget elapses, then yields. Completion and
/// failure are reported through drained [`QueueEvent`]s.
pub struct GenerationQueue {
    rings: i32,
    hex_size: f64,
    budget: Duration,
    clock: Arc<dyn Clock>,
    tasks: HashMap<AxialHex, GenerationTask>,
    events: Vec<QueueEvent>,
}

impl GenerationQueue {
    pub fn new(config: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            rings: config.chunk_rings,
            hex_size: config.hex_size,
            budget: Duration::from_secs_f64(config.queue_frame_budget_ms / 1000.0),
            clock,
            tasks: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_queued(&self, center: AxialHex) -> bool {
        self.tasks.contains_key(&center)
    }

    /// Request construction of the chunk at `center`.
    ///
    /// Merges into an existing task (raising its priority), returns
    /// immediately for initialized chunks, attaches to a foreign placeholder,
    /// or creates the placeholder itself so concurrent proximity checks see
    /// the chunk.
    pub fn enqueue(
        &mut self,
        center: AxialHex,
        priority: i32,
        map: &mut WorldMap,
    ) -> EnqueueOutcome {
        if let Some(task) = self.tasks.get_mut(&center) {
            task.priority = task.priority.max(priority);
            return EnqueueOutcome::Merged {
                priority: task.priority,
            };
        }
        match map.get(center) {
            Some(chunk) if chunk.is_initialized() => return EnqueueOutcome::AlreadyInitialized,
            Some(_) => {}
            None => map.add_placeholder(Chunk::placeholder(center, self.hex_size)),
        }
        let grid = center
            .to_cube()
            .grid(self.rings)
            .into_iter()
            .map(CubeHex::to_axial)
            .collect();
        self.tasks.insert(
            center,
            GenerationTask {
                center,
                priority,
                status: TaskStatus::Pending,
                step: GenStep::Grid { cursor: 0 },
                grid,
            },
        );
        tracing::debug!(%center, priority, "chunk generation queued");
        EnqueueOutcome::Queued
    }

    /// Drive the highest-priority task for at most one frame budget.
    pub fn process_one_frame(&mut self, map: &mut WorldMap) -> FrameOutcome {
        let Some(center) = self.select_task() else {
            return FrameOutcome::Idle;
        };
        let start = self.clock.now();

        let task = self.tasks.get_mut(&center).expect("selected task exists");
        if task.status == TaskStatus::Pending {
            task.status = TaskStatus::Generating;
            if !map.contains(center) {
                self.fail(center, QueueError::PlaceholderMissing);
                return self.remaining_outcome();
            }
        }

        loop {
            match self.drive_step(center, map) {
                Err(error) => {
                    self.fail(center, error);
                    return self.remaining_outcome();
                }
                Ok(true) => {
                    if let Some(chunk) = map.get_mut(center) {
                        chunk.mark_initialized();
                    }
                    self.tasks.remove(&center);
                    self.events.push(QueueEvent::Completed { center });
                    tracing::debug!(%center, "chunk initialized");
                    return self.remaining_outcome();
                }
                Ok(false) => {
                    if self.clock.now() - start > self.budget {
                        return FrameOutcome::MorePending;
                    }
                }
            }
        }
    }

    /// Reject every non-terminal task with [`QueueError::Cleared`].
    pub fn clear(&mut self) {
        let mut centers: Vec<AxialHex> = self.tasks.keys().copied().collect();
        centers.sort();
        for center in centers {
            self.events.push(QueueEvent::Failed {
                center,
                error: QueueError::Cleared,
            });
        }
        self.tasks.clear();
    }

    /// Take all completion/failure events accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<QueueEvent> {
        std::mem::take(&mut self.events)
    }

    /// One batch of one step. `Ok(true)` once the pipeline has run dry.
    fn drive_step(&mut self, center: AxialHex, map: &mut WorldMap) -> Result<bool, QueueError> {
        let rings = self.rings;
        let task = self.tasks.get_mut(&center).expect("task exists while driven");
        match &mut task.step {
            GenStep::Grid { cursor } => {
                let chunk = map
                    .get_mut(center)
                    .ok_or(QueueError::PlaceholderMissing)?;
                let end = (*cursor + GRID_BATCH).min(task.grid.len());
                chunk.append_tiles(&task.grid[*cursor..end]);
                *cursor = end;
                if *cursor >= task.grid.len() {
                    task.step = GenStep::Neighbors;
                }
                Ok(false)
            }
            GenStep::Neighbors => {
                let chunk = map
                    .get_mut(center)
                    .ok_or(QueueError::PlaceholderMissing)?;
                chunk.compute_neighbors(rings);
                task.step = GenStep::Index { cursor: 0 };
                Ok(false)
            }
            GenStep::Index { cursor } => {
                if !map.contains(center) {
                    return Err(QueueError::PlaceholderMissing);
                }
                let published = map.index_chunk_tiles(center, *cursor, INDEX_BATCH);
                *cursor += published;
                if published < INDEX_BATCH {
                    task.step = GenStep::Done;
                }
                Ok(false)
            }
            GenStep::Done => Ok(true),
        }
    }

    /// Highest priority wins; within equal priority, Pending beats
    /// Generating; remaining ties resolve to the smallest center for
    /// determinism.
    fn select_task(&self) -> Option<AxialHex> {
        self.tasks
            .values()
            .max_by_key(|t| {
                (
                    t.priority,
                    t.status == TaskStatus::Pending,
                    std::cmp::Reverse(t.center),
                )
            })
            .map(|t| t.center)
    }

    fn fail(&mut self, center: AxialHex, error: QueueError) {
        self.tasks.remove(&center);
        tracing::warn!(%center, %error, "chunk generation failed");
        self.events.push(QueueEvent::Failed { center, error });
    }

    fn remaining_outcome(&self) -> FrameOutcome {
        if self.tasks.is_empty() {
            FrameOutcome::Idle
        } else {
            FrameOutcome::MorePending
        }
    }
}
