//! Scripted input sessions.
//!
//! A replay script is a TOML file with a list of input steps. Steps run
//! against an [`Editor`] on a virtual clock that only moves on `wait`, so a
//! script produces the same history every time.
//!
//! ```toml
//! steps = [
//!     { tool = "rectangle" },
//!     { down = [50, 50] },
//!     { move = [20, 20] },
//!     { up = [20, 20] },
//!     { wait = 150 },
//!     { key = "Ctrl+Z" },
//! ]
//! ```

use crate::config::{Config, KeyBinding};
use crate::draw::{ObjectId, ShapeKind};
use crate::editor::Editor;
use crate::input::{Key, MouseButton};
use crate::scene::SceneGraph;
use crate::util::Point;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Arm the draw manager for one shape
    Tool(ShapeKind),
    /// Left button press at screen `[x, y]`
    Down([f64; 2]),
    Move([f64; 2]),
    Up([f64; 2]),
    /// Right button press (abandons a shape in progress)
    RightClick([f64; 2]),
    /// Pointer exits the canvas, optionally over a child element
    Leave {
        #[serde(default)]
        target: Option<ObjectId>,
    },
    /// Key combination such as `"Ctrl+Shift+Z"` or `"R"`
    Key(String),
    /// Advance the virtual clock by this many milliseconds
    Wait(u64),
    Undo,
    Redo,
    Pause,
    Resume,
}

/// A parsed replay script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl ReplayScript {
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse replay script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {}", path.display()))?;
        Self::from_toml(&source).with_context(|| format!("In {}", path.display()))
    }
}

/// Axis-aligned bounds of a shape in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportShape {
    pub id: ObjectId,
    pub kind: ShapeKind,
    pub bounds: ReportBounds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<[f64; 4]>,
}

/// Final state of a replayed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub shapes: Vec<ReportShape>,
    pub undo_depth: usize,
    pub redo_depth: usize,
    /// Draw notifications in the order they fired
    pub draw_events: Vec<String>,
}

/// Runs `script` against a fresh editor built from `config`.
///
/// After the last step the clock advances by one capture window so pending
/// edits settle into history before the report is taken.
///
/// # Errors
/// Returns an error if a key step cannot be parsed or an undo/redo fails.
pub fn run(script: &ReplayScript, config: &Config) -> Result<ReplayReport> {
    let mut editor = Editor::new(config).context("Failed to set up editor")?;
    let mut now = Instant::now();
    let mut draw_events = Vec::new();

    for (index, step) in script.steps.iter().enumerate() {
        debug!("Replay step {}: {:?}", index, step);
        apply_step(&mut editor, step, &mut now)
            .with_context(|| format!("Replay step {} ({:?}) failed", index, step))?;
        draw_events.extend(editor.take_draw_events());
    }

    now = advance(now, config.history.throttle_ms)?;
    editor.tick(now)?;
    draw_events.extend(editor.take_draw_events());

    let shapes = editor
        .scene()
        .objects()
        .iter()
        .map(|shape| {
            let rect = shape.bounding_rect();
            ReportShape {
                id: shape.id,
                kind: shape.kind,
                bounds: ReportBounds {
                    left: rect.left,
                    top: rect.top,
                    width: rect.width,
                    height: rect.height,
                },
                endpoints: shape.line().map(|line| [line.x1, line.y1, line.x2, line.y2]),
            }
        })
        .collect();

    let report = ReplayReport {
        shapes,
        undo_depth: editor.history().undo_len(),
        redo_depth: editor.history().redo_len(),
        draw_events: draw_events.iter().map(|e| e.name().to_string()).collect(),
    };
    info!(
        "Replayed {} steps: {} shapes, undo depth {}",
        script.steps.len(),
        report.shapes.len(),
        report.undo_depth
    );
    Ok(report)
}

fn apply_step(editor: &mut Editor, step: &Step, now: &mut Instant) -> Result<()> {
    let at = |[x, y]: [f64; 2]| Point::new(x, y);
    match step {
        Step::Tool(kind) => editor.arm(*kind),
        Step::Down(p) => editor.on_pointer_down(MouseButton::Left, at(*p), *now)?,
        Step::Move(p) => editor.on_pointer_move(at(*p), *now)?,
        Step::Up(p) => editor.on_pointer_up(MouseButton::Left, at(*p), *now)?,
        Step::RightClick(p) => editor.on_pointer_down(MouseButton::Right, at(*p), *now)?,
        Step::Leave { target } => editor.on_pointer_leave(*target, *now)?,
        Step::Key(combo) => press_combo(editor, combo, *now)?,
        Step::Wait(ms) => {
            *now = advance(*now, *ms)?;
            editor.tick(*now)?;
        }
        Step::Undo => {
            editor.undo(*now)?;
        }
        Step::Redo => {
            editor.redo(*now)?;
        }
        Step::Pause => editor.pause_history(*now)?,
        Step::Resume => editor.resume_history(*now)?,
    }
    Ok(())
}

/// Moves the virtual clock forward by `ms`.
fn advance(now: Instant, ms: u64) -> Result<Instant> {
    now.checked_add(Duration::from_millis(ms))
        .with_context(|| format!("Waiting {ms} ms overflows the replay clock"))
}

fn press_combo(editor: &mut Editor, combo: &str, now: Instant) -> Result<()> {
    let binding = KeyBinding::parse(combo).map_err(anyhow::Error::msg)?;
    let modifiers: Vec<Key> = [
        (binding.ctrl, Key::Ctrl),
        (binding.shift, Key::Shift),
        (binding.alt, Key::Alt),
    ]
    .into_iter()
    .filter_map(|(held, key)| held.then_some(key))
    .collect();

    for key in &modifiers {
        editor.on_key_press(*key, now)?;
    }
    let result = editor.on_key_press(Key::from_name(&binding.key), now);
    for key in &modifiers {
        editor.on_key_release(*key);
    }
    if result?.is_none() {
        debug!("Key combo '{}' is not bound", combo);
    }
    Ok(())
}
