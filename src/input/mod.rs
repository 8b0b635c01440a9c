//! Input handling and the shape drawing state machine.
//!
//! This module turns pointer events into shapes ([`DrawManager`]) and keeps
//! the key and modifier types hosts use to report keyboard input.

pub mod draw;
pub mod events;
pub mod modifiers;

#[cfg(test)]
mod tests;

// Re-export commonly used types at module level
pub use draw::{DrawEvent, DrawInput, DrawManager, DrawSettings, DrawState};
pub use events::{Key, MouseButton};
pub use modifiers::Modifiers;
