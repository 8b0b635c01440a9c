//! Keybinding configuration types and parsing.
//!
//! This module defines the configurable keybinding system that maps keyboard
//! shortcuts to editor actions (undo/redo and the drawing tools).

use crate::draw::ShapeKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All possible actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // History
    Undo,
    Redo,

    // Drawing tools (arm the draw manager for one shape)
    DrawRectangle,
    DrawEllipse,
    DrawDiamond,
    DrawLine,
    DrawArrow,

    // Cancellation
    CancelDrawing,
}

impl Action {
    /// Shape kind armed by a drawing tool action.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Action::DrawRectangle => Some(ShapeKind::Rectangle),
            Action::DrawEllipse => Some(ShapeKind::Ellipse),
            Action::DrawDiamond => Some(ShapeKind::Diamond),
            Action::DrawLine => Some(ShapeKind::Line),
            Action::DrawArrow => Some(ShapeKind::Arrow),
            Action::Undo | Action::Redo | Action::CancelDrawing => None,
        }
    }
}

/// A single keybinding: a key with optional modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    /// Parse a keybinding string like "Ctrl+Shift+Z" or "Escape".
    /// Modifiers can appear in any order: "Shift+Ctrl+Z", "Alt+Shift+Ctrl+Z", etc.
    /// Supports spaces around '+' (e.g., "Ctrl + Shift + Z")
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty keybinding string".to_string());
        }

        // Normalize by removing spaces around '+'
        let s_normalized = s.replace(" + ", "+").replace("+ ", "+").replace(" +", "+");

        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        let mut key_parts = Vec::new();

        for part in s_normalized.split('+') {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "shift" => shift = true,
                "alt" => alt = true,
                _ => key_parts.push(part),
            }
        }

        if key_parts.is_empty() {
            return Err(format!("No key specified in: {}", s));
        }

        // "Ctrl++" splits into ["Ctrl", "", ""]: the key is '+'
        let key = key_parts.join("+");
        let key = if key.is_empty() { "+".to_string() } else { key };

        Ok(Self {
            key,
            ctrl,
            shift,
            alt,
        })
    }

    /// Check if this keybinding matches the current input state.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == ctrl
            && self.shift == shift
            && self.alt == alt
    }
}

/// Configuration for all keybindings.
///
/// Each action can have multiple keybindings. Users specify them in config.toml as:
/// ```toml
/// [keybindings]
/// undo = ["Ctrl+Z"]
/// redo = ["Ctrl+Y", "Ctrl+Shift+Z"]
/// draw_rectangle = ["R"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeybindingsConfig {
    #[serde(default = "default_undo")]
    pub undo: Vec<String>,

    #[serde(default = "default_redo")]
    pub redo: Vec<String>,

    #[serde(default = "default_draw_rectangle")]
    pub draw_rectangle: Vec<String>,

    #[serde(default = "default_draw_ellipse")]
    pub draw_ellipse: Vec<String>,

    #[serde(default = "default_draw_diamond")]
    pub draw_diamond: Vec<String>,

    #[serde(default = "default_draw_line")]
    pub draw_line: Vec<String>,

    #[serde(default = "default_draw_arrow")]
    pub draw_arrow: Vec<String>,

    #[serde(default = "default_cancel_drawing")]
    pub cancel_drawing: Vec<String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            undo: default_undo(),
            redo: default_redo(),
            draw_rectangle: default_draw_rectangle(),
            draw_ellipse: default_draw_ellipse(),
            draw_diamond: default_draw_diamond(),
            draw_line: default_draw_line(),
            draw_arrow: default_draw_arrow(),
            cancel_drawing: default_cancel_drawing(),
        }
    }
}

impl KeybindingsConfig {
    /// Build a lookup map from keybindings to actions for efficient matching.
    /// Returns an error if any keybinding string is invalid or if duplicates are detected.
    pub fn build_action_map(&self) -> Result<HashMap<KeyBinding, Action>, String> {
        let mut map = HashMap::new();

        let groups: [(&[String], Action); 8] = [
            (&self.undo, Action::Undo),
            (&self.redo, Action::Redo),
            (&self.draw_rectangle, Action::DrawRectangle),
            (&self.draw_ellipse, Action::DrawEllipse),
            (&self.draw_diamond, Action::DrawDiamond),
            (&self.draw_line, Action::DrawLine),
            (&self.draw_arrow, Action::DrawArrow),
            (&self.cancel_drawing, Action::CancelDrawing),
        ];

        for (bindings, action) in groups {
            for binding_str in bindings {
                let binding = KeyBinding::parse(binding_str)?;
                if let Some(existing_action) = map.insert(binding, action) {
                    return Err(format!(
                        "Duplicate keybinding '{}' assigned to both {:?} and {:?}",
                        binding_str, existing_action, action
                    ));
                }
            }
        }

        Ok(map)
    }
}

fn default_undo() -> Vec<String> {
    vec!["Ctrl+Z".to_string()]
}

fn default_redo() -> Vec<String> {
    vec!["Ctrl+Y".to_string(), "Ctrl+Shift+Z".to_string()]
}

fn default_draw_rectangle() -> Vec<String> {
    vec!["R".to_string()]
}

fn default_draw_ellipse() -> Vec<String> {
    vec!["O".to_string()]
}

fn default_draw_diamond() -> Vec<String> {
    vec!["D".to_string()]
}

fn default_draw_line() -> Vec<String> {
    vec!["L".to_string()]
}

fn default_draw_arrow() -> Vec<String> {
    vec!["A".to_string()]
}

fn default_cancel_drawing() -> Vec<String> {
    vec!["Escape".to_string()]
}
