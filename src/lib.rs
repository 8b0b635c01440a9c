//! Interactive canvas editing core.
//!
//! Two managers share one scene graph: [`history::HistoryManager`] keeps
//! bounded undo/redo stacks of allow-listed scene snapshots, and
//! [`input::DrawManager`] builds shapes from pointer input. [`editor::Editor`]
//! wires both to a [`scene::Scene`] and routes its events; [`replay`] drives
//! an editor from a script.

pub mod config;
pub mod draw;
pub mod editor;
pub mod history;
pub mod input;
pub mod replay;
pub mod scene;
pub mod util;

pub use config::Config;
