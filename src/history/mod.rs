//! Undo/redo history for a scene.
//!
//! - [`codec`]: allow-listed snapshot capture and validated restore
//! - [`HistoryManager`]: bounded undo/redo stacks with throttled capture
//! - [`Throttle`]: the trailing-edge timer behind capture coalescing

pub mod codec;
mod manager;
mod throttle;


pub use codec::{Snapshot, SnapshotError};
pub use manager::{DEFAULT_CAPACITY, DEFAULT_THROTTLE, HistoryManager, HistorySettings, HistoryState};
pub use throttle::Throttle;
