//! Undo/redo history over scene snapshots.

use super::codec::{self, Snapshot, SnapshotError};
use super::throttle::Throttle;
use crate::scene::{SceneEvent, SceneGraph};
use log::{debug, trace, warn};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default number of entries kept per stack.
pub const DEFAULT_CAPACITY: usize = 50;
/// Default capture window.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(100);

/// Tunables for a [`HistoryManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySettings {
    /// Maximum entries on each of the undo and redo stacks
    pub capacity: usize,
    /// Mutations closer together than this are captured once
    pub throttle: Duration,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            throttle: DEFAULT_THROTTLE,
        }
    }
}

/// Coarse activity of the history manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    /// Nothing pending.
    Idle,
    /// A capture is armed and waiting for its window to close.
    Capturing,
    /// A restore has been issued and the scene has not reported back yet.
    Restoring,
}

/// Bounded undo/redo stacks fed by scene mutation events.
///
/// The manager never owns the scene. Hosts route every [`SceneEvent`] through
/// [`HistoryManager::handle_event`] and call [`HistoryManager::poll`] from
/// their loop so throttled captures run once mutations settle.
#[derive(Debug)]
pub struct HistoryManager {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    /// State of the scene as of the last capture or restore
    next_state: Snapshot,
    capacity: usize,
    throttle: Throttle,
    paused: bool,
    /// Restores issued whose `Restored` event has not arrived yet
    pending_restores: usize,
}

impl HistoryManager {
    /// Creates a manager for `scene`, caching its current state.
    ///
    /// # Errors
    /// Returns an error if the initial state cannot be serialized.
    pub fn new<S: SceneGraph + ?Sized>(
        scene: &S,
        settings: HistorySettings,
    ) -> Result<Self, SnapshotError> {
        let capacity = if settings.capacity == 0 {
            warn!("History capacity 0 is not usable, using 1");
            1
        } else {
            settings.capacity
        };
        debug!(
            "History manager created (capacity {}, throttle {:?})",
            capacity, settings.throttle
        );
        Ok(Self {
            undo_stack: VecDeque::with_capacity(capacity),
            redo_stack: VecDeque::with_capacity(capacity),
            next_state: codec::capture(scene)?,
            capacity,
            throttle: Throttle::new(settings.throttle),
            paused: false,
            pending_restores: 0,
        })
    }

    /// Routes one scene event.
    ///
    /// Non-transient object mutations are recorded; `Restored` closes the
    /// oldest outstanding restore. Pointer events are ignored.
    pub fn handle_event(&mut self, event: &SceneEvent, now: Instant) {
        match event {
            SceneEvent::Restored => {
                self.pending_restores = self.pending_restores.saturating_sub(1);
                trace!("Restore settled ({} outstanding)", self.pending_restores);
            }
            other => {
                if other.object_change().is_some_and(|change| !change.transient) {
                    self.record_mutation(now);
                }
            }
        }
    }

    /// Notes that the scene changed at `now`.
    ///
    /// No-op while paused or while a restore is in flight. Otherwise arms the
    /// trailing capture; further calls inside the window are coalesced.
    pub fn record_mutation(&mut self, now: Instant) {
        if self.is_processing() {
            trace!("Mutation ignored while processing");
            return;
        }
        if self.throttle.call(now) {
            trace!("Capture armed for {:?}", self.throttle.window());
        }
    }

    /// Runs the pending capture if its window has closed.
    ///
    /// Returns `true` when a capture was taken.
    pub fn poll<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &S,
        now: Instant,
    ) -> Result<bool, SnapshotError> {
        if !self.throttle.fire_due(now) {
            return Ok(false);
        }
        self.commit(scene)?;
        Ok(true)
    }

    /// Runs the pending capture immediately, if any.
    pub fn flush<S: SceneGraph + ?Sized>(&mut self, scene: &S) -> Result<bool, SnapshotError> {
        if !self.throttle.take_pending() {
            return Ok(false);
        }
        self.commit(scene)?;
        Ok(true)
    }

    /// Rewinds the scene one step.
    ///
    /// A pending capture is flushed first so the latest edit is what gets
    /// undone. Returns `Ok(false)` when there is nothing to undo.
    ///
    /// # Errors
    /// Returns the codec error if the entry cannot be restored. The entry is
    /// put back and the scene is left as it was.
    pub fn undo<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) -> Result<bool, SnapshotError> {
        self.flush(scene)?;
        let Some(target) = self.undo_stack.pop_back() else {
            trace!("Nothing to undo");
            return Ok(false);
        };

        match self.apply(scene, &target) {
            Ok(()) => {
                let current = std::mem::replace(&mut self.next_state, target);
                push_bounded(&mut self.redo_stack, current, self.capacity);
                debug!(
                    "Undo applied (undo {}, redo {})",
                    self.undo_stack.len(),
                    self.redo_stack.len()
                );
                Ok(true)
            }
            Err(err) => {
                self.undo_stack.push_back(target);
                Err(err)
            }
        }
    }

    /// Re-applies the most recently undone step. Mirror of [`Self::undo`].
    pub fn redo<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) -> Result<bool, SnapshotError> {
        self.flush(scene)?;
        let Some(target) = self.redo_stack.pop_back() else {
            trace!("Nothing to redo");
            return Ok(false);
        };

        match self.apply(scene, &target) {
            Ok(()) => {
                let current = std::mem::replace(&mut self.next_state, target);
                push_bounded(&mut self.undo_stack, current, self.capacity);
                debug!(
                    "Redo applied (undo {}, redo {})",
                    self.undo_stack.len(),
                    self.redo_stack.len()
                );
                Ok(true)
            }
            Err(err) => {
                self.redo_stack.push_back(target);
                Err(err)
            }
        }
    }

    /// Stops recording until [`Self::resume`].
    ///
    /// An armed capture is taken first so earlier edits keep their own step.
    pub fn pause<S: SceneGraph + ?Sized>(&mut self, scene: &S) -> Result<(), SnapshotError> {
        self.flush(scene)?;
        self.paused = true;
        debug!("History paused");
        Ok(())
    }

    /// Resumes recording and captures the current state as one step.
    pub fn resume<S: SceneGraph + ?Sized>(&mut self, scene: &S) -> Result<(), SnapshotError> {
        self.paused = false;
        self.throttle.cancel();
        self.commit(scene)?;
        debug!("History resumed");
        Ok(())
    }

    /// Empties both stacks. The cached current state is kept.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        debug!("History cleared");
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether mutations are currently being ignored.
    pub fn is_processing(&self) -> bool {
        self.paused || self.pending_restores > 0
    }

    pub fn state(&self) -> HistoryState {
        if self.pending_restores > 0 {
            HistoryState::Restoring
        } else if self.throttle.is_pending() {
            HistoryState::Capturing
        } else {
            HistoryState::Idle
        }
    }

    /// When the armed capture is due, for hosts that schedule wakeups.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.throttle.deadline()
    }

    /// Snapshot of the state as of the last capture or restore.
    pub fn current(&self) -> &Snapshot {
        &self.next_state
    }

    fn commit<S: SceneGraph + ?Sized>(&mut self, scene: &S) -> Result<(), SnapshotError> {
        let captured = codec::capture(scene)?;
        let previous = std::mem::replace(&mut self.next_state, captured);
        push_bounded(&mut self.undo_stack, previous, self.capacity);
        if !self.redo_stack.is_empty() {
            debug!("New edit discards {} redo entries", self.redo_stack.len());
            self.redo_stack.clear();
        }
        trace!("Captured history step (undo {})", self.undo_stack.len());
        Ok(())
    }

    fn apply<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        snapshot: &Snapshot,
    ) -> Result<(), SnapshotError> {
        // Raised before the codec runs: restoring fires the same mutation
        // events the recorder listens to, up to and including `Restored`.
        self.pending_restores += 1;
        let result = codec::restore(scene, snapshot, |shape| {
            trace!("Restoring {} {}", shape.kind.name(), shape.id);
        });
        if let Err(err) = &result {
            self.pending_restores -= 1;
            warn!("Failed to restore history entry: {}", err);
        }
        result
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, capacity: usize) {
    stack.push_back(snapshot);
    while stack.len() > capacity {
        stack.pop_front();
    }
}
