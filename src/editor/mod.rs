//! Host-facing editor that wires a scene to its history and draw managers.
//!
//! The editor owns one [`Scene`] plus the [`HistoryManager`] and
//! [`DrawManager`] bound to it. Input methods queue the matching scene event
//! and then [`Editor::pump`] routes everything the scene reports, in order, to
//! both managers. Time is passed in so hosts (and the replay runner) control
//! when throttled captures fire.


use crate::config::{Action, Config, KeyBinding};
use crate::draw::{ObjectId, Shape, ShapeKind};
use crate::history::{HistoryManager, SnapshotError};
use crate::input::{DrawEvent, DrawManager, Key, Modifiers, MouseButton};
use crate::scene::{Scene, SceneGraph};
use crate::util::Point;
use log::{debug, info, trace};
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;

/// Errors surfaced by [`Editor`] operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("invalid keybindings: {0}")]
    Keybindings(String),
}

/// One canvas with its own history and draw managers.
#[derive(Debug)]
pub struct Editor {
    scene: Scene,
    history: HistoryManager,
    draw: DrawManager,
    /// Current modifier key state
    modifiers: Modifiers,
    /// Keybinding action map for lookup
    action_map: HashMap<KeyBinding, Action>,
    /// Draw notifications not yet taken by the host
    draw_events: Vec<DrawEvent>,
}

impl Editor {
    /// Creates an editor over an empty scene.
    ///
    /// # Errors
    /// Returns an error if the keybindings are invalid.
    pub fn new(config: &Config) -> Result<Self, EditorError> {
        Self::with_scene(Scene::new(), config)
    }

    /// Creates an editor over an existing scene. Its current state becomes
    /// the baseline that the first undo returns to.
    pub fn with_scene(mut scene: Scene, config: &Config) -> Result<Self, EditorError> {
        let action_map = config
            .keybindings
            .build_action_map()
            .map_err(EditorError::Keybindings)?;
        let history = HistoryManager::new(&scene, config.history.settings())?;
        let draw = DrawManager::init(&mut scene, config.drawing.settings());
        // Events queued before the managers existed are already in the baseline.
        scene.take_events();

        info!(
            "Editor ready ({} objects, {} keybindings)",
            scene.len(),
            action_map.len()
        );
        Ok(Self {
            scene,
            history,
            draw,
            modifiers: Modifiers::new(),
            action_map,
            draw_events: Vec::new(),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access for programmatic edits. Their events are routed on
    /// the next [`Self::pump`].
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn draw(&self) -> &DrawManager {
        &self.draw
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Routes queued scene events to the managers until the queue stays
    /// empty, then runs a capture if one is due.
    pub fn pump(&mut self, now: Instant) -> Result<(), EditorError> {
        loop {
            let events = self.scene.take_events();
            if events.is_empty() {
                break;
            }
            for event in &events {
                trace!("Routing {}", event.name());
                self.draw.handle_event(&mut self.scene, event);
                self.history.handle_event(event, now);
            }
        }
        self.draw_events.extend(self.draw.take_events());
        self.history.poll(&self.scene, now)?;
        Ok(())
    }

    /// Advances the clock without new input.
    pub fn tick(&mut self, now: Instant) -> Result<(), EditorError> {
        self.pump(now)
    }

    // --- Pointer input (screen coordinates) ---

    /// Processes a mouse button press.
    ///
    /// Left drives the draw manager, right abandons a shape in progress.
    pub fn on_pointer_down(
        &mut self,
        button: MouseButton,
        screen: Point,
        now: Instant,
    ) -> Result<(), EditorError> {
        match button {
            MouseButton::Left => self.scene.pointer_down(screen),
            MouseButton::Right => {
                self.draw.cancel(&mut self.scene);
            }
            MouseButton::Middle => {}
        }
        self.pump(now)
    }

    pub fn on_pointer_move(&mut self, screen: Point, now: Instant) -> Result<(), EditorError> {
        self.scene.pointer_move(screen);
        self.pump(now)
    }

    pub fn on_pointer_up(
        &mut self,
        button: MouseButton,
        screen: Point,
        now: Instant,
    ) -> Result<(), EditorError> {
        if button == MouseButton::Left {
            self.scene.pointer_up(screen);
        }
        self.pump(now)
    }

    /// The pointer left the canvas; `target` is the child element it was over.
    pub fn on_pointer_leave(
        &mut self,
        target: Option<ObjectId>,
        now: Instant,
    ) -> Result<(), EditorError> {
        self.scene.pointer_leave(target);
        self.pump(now)
    }

    // --- Keyboard input ---

    /// Processes a key press, running the bound action if any.
    ///
    /// Returns the action that ran.
    pub fn on_key_press(&mut self, key: Key, now: Instant) -> Result<Option<Action>, EditorError> {
        if self.modifiers.update(key, true) {
            return Ok(None);
        }
        let Some(key_str) = key.binding_name() else {
            return Ok(None);
        };
        let Some(action) = self.find_action(&key_str) else {
            trace!("No action bound to {:?} with {:?}", key, self.modifiers);
            return Ok(None);
        };
        self.handle_action(action, now)?;
        Ok(Some(action))
    }

    pub fn on_key_release(&mut self, key: Key) {
        self.modifiers.update(key, false);
    }

    /// Look up an action for the given key and the current modifiers.
    fn find_action(&self, key_str: &str) -> Option<Action> {
        for (binding, action) in &self.action_map {
            if binding.matches(
                key_str,
                self.modifiers.ctrl,
                self.modifiers.shift,
                self.modifiers.alt,
            ) {
                return Some(*action);
            }
        }
        None
    }

    /// Runs an action as if its keybinding had been pressed.
    pub fn handle_action(&mut self, action: Action, now: Instant) -> Result<(), EditorError> {
        debug!("Action {:?}", action);
        match action {
            Action::Undo => {
                self.undo(now)?;
            }
            Action::Redo => {
                self.redo(now)?;
            }
            Action::CancelDrawing => {
                self.draw.cancel(&mut self.scene);
                self.pump(now)?;
            }
            tool => {
                if let Some(kind) = tool.shape_kind() {
                    self.arm(kind);
                }
            }
        }
        Ok(())
    }

    // --- Drawing ---

    /// Arms the draw manager for one shape of `kind`.
    pub fn arm(&mut self, kind: ShapeKind) {
        self.draw.set_layer_type(kind);
        self.draw.set_enabled(&mut self.scene, true);
    }

    pub fn set_draw_complete(&mut self, callback: impl FnMut(&Shape) + 'static) {
        self.draw.set_draw_complete(callback);
    }

    /// Drains draw notifications collected by [`Self::pump`].
    pub fn take_draw_events(&mut self) -> Vec<DrawEvent> {
        std::mem::take(&mut self.draw_events)
    }

    // --- History ---

    /// Undoes the last step. A shape in progress is abandoned first.
    ///
    /// Returns `false` when there was nothing to undo.
    pub fn undo(&mut self, now: Instant) -> Result<bool, EditorError> {
        self.settle_for_history(now)?;
        let applied = self.history.undo(&mut self.scene)?;
        self.pump(now)?;
        Ok(applied)
    }

    /// Redoes the last undone step. A shape in progress is abandoned first.
    pub fn redo(&mut self, now: Instant) -> Result<bool, EditorError> {
        self.settle_for_history(now)?;
        let applied = self.history.redo(&mut self.scene)?;
        self.pump(now)?;
        Ok(applied)
    }

    /// Suspends recording for a bulk edit.
    pub fn pause_history(&mut self, now: Instant) -> Result<(), EditorError> {
        self.pump(now)?;
        self.history.pause(&self.scene)?;
        Ok(())
    }

    /// Ends a bulk edit, recording it as one step.
    pub fn resume_history(&mut self, now: Instant) -> Result<(), EditorError> {
        self.pump(now)?;
        self.history.resume(&self.scene)?;
        Ok(())
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn settle_for_history(&mut self, now: Instant) -> Result<(), EditorError> {
        if self.draw.is_drawing() {
            debug!("Abandoning shape in progress before history step");
        }
        self.draw.cancel(&mut self.scene);
        self.pump(now)
    }
}
