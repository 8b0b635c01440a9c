//! Interactive shape construction driven by pointer events.

use crate::draw::{ObjectId, Shape, ShapeFamily, ShapeKind, Style};
use crate::scene::{Cursor, SceneEvent, SceneGraph};
use crate::util::Point;
use log::{debug, trace, warn};
use std::fmt;

/// Draw manager state machine.
///
/// `Disabled → Armed → Drawing → Disabled`. Drawing is single-shot: the
/// manager disarms after each finished shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawState {
    /// Pointer input passes through untouched
    Disabled,
    /// Waiting for the pointer-down that starts a shape
    Armed,
    /// A provisional shape exists and follows the pointer
    Drawing {
        /// Provisional object in the scene
        id: ObjectId,
        kind: ShapeKind,
        /// Canvas point of the initial pointer-down
        anchor: Point,
        /// Whether any geometry update has been accepted yet
        grown: bool,
    },
}

/// Pointer input as seen by [`DrawManager::transition`], in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawInput {
    Down(Point),
    Move(Point),
    Up(Point),
    /// Pointer left the canvas; `target` is the child element it was over.
    Leave { target: Option<ObjectId> },
}

/// Notifications for listeners (dimension panels and the like).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawEvent {
    /// `draw:start`
    Start(ObjectId),
    /// `draw:scaling`
    Scaling(ObjectId),
    /// `draw:end`
    End(ObjectId),
}

impl DrawEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DrawEvent::Start(_) => "draw:start",
            DrawEvent::Scaling(_) => "draw:scaling",
            DrawEvent::End(_) => "draw:end",
        }
    }

    pub fn object(&self) -> ObjectId {
        match self {
            DrawEvent::Start(id) | DrawEvent::Scaling(id) | DrawEvent::End(id) => *id,
        }
    }
}

/// Style and sizing applied to new shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSettings {
    pub style: Style,
    /// Smallest width/height a finished solid shape may have
    pub min_shape_size: f64,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            style: Style::default(),
            min_shape_size: 1.0,
        }
    }
}

type DrawComplete = Box<dyn FnMut(&Shape)>;

/// Builds shapes from pointer input.
///
/// The scene is passed in per call. [`DrawManager::init`] is the only
/// constructor, so there is no way to drive a manager that was never bound.
pub struct DrawManager {
    state: DrawState,
    layer_type: Option<ShapeKind>,
    settings: DrawSettings,
    on_complete: Option<DrawComplete>,
    events: Vec<DrawEvent>,
}

impl fmt::Debug for DrawManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawManager")
            .field("state", &self.state)
            .field("layer_type", &self.layer_type)
            .field("settings", &self.settings)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl DrawManager {
    /// Binds a manager to `scene`. It starts out disabled.
    pub fn init<S: SceneGraph + ?Sized>(scene: &mut S, settings: DrawSettings) -> Self {
        scene.set_rubber_band_selection(true);
        debug!("Draw manager initialized (min shape size {})", settings.min_shape_size);
        Self {
            state: DrawState::Disabled,
            layer_type: None,
            settings,
            on_complete: None,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    /// Whether the manager is armed or drawing.
    pub fn enabled(&self) -> bool {
        !matches!(self.state, DrawState::Disabled)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    pub fn layer_type(&self) -> Option<ShapeKind> {
        self.layer_type
    }

    /// Picks the kind the next pointer-down creates. Does not arm.
    pub fn set_layer_type(&mut self, kind: ShapeKind) {
        self.layer_type = Some(kind);
    }

    pub fn style(&self) -> &Style {
        &self.settings.style
    }

    /// Style for shapes started from now on.
    pub fn set_style(&mut self, style: Style) {
        self.settings.style = style;
    }

    /// Registers a callback run with each finished shape.
    pub fn set_draw_complete(&mut self, callback: impl FnMut(&Shape) + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Arms or disarms the manager.
    ///
    /// Arming drops the selection and shows a crosshair. Disarming restores
    /// the default cursor unless pan mode owns it; a shape in progress is
    /// finished first.
    pub fn set_enabled<S: SceneGraph + ?Sized>(&mut self, scene: &mut S, enabled: bool) {
        match (enabled, self.state) {
            (true, DrawState::Drawing { .. }) => {}
            (true, _) => {
                self.state = DrawState::Armed;
                scene.discard_selection();
                scene.set_cursor(Cursor::Crosshair);
                scene.request_render();
                debug!("Draw armed ({:?})", self.layer_type);
            }
            (false, DrawState::Drawing { .. }) => self.finalize(scene),
            (false, _) => {
                self.state = DrawState::Disabled;
                Self::release_cursor(scene);
            }
        }
    }

    /// Abandons the shape in progress, removing it from the scene, and disarms.
    ///
    /// Returns `true` if the manager was enabled.
    pub fn cancel<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) -> bool {
        let previous = std::mem::replace(&mut self.state, DrawState::Disabled);
        match previous {
            DrawState::Disabled => return false,
            DrawState::Armed => {}
            DrawState::Drawing { id, .. } => {
                scene.remove(id);
                scene.set_rubber_band_selection(true);
                debug!("Drawing of object {} cancelled", id);
            }
        }
        Self::release_cursor(scene);
        scene.request_render();
        true
    }

    /// Feeds a scene event into the state machine.
    ///
    /// Returns `true` if the event was a pointer event.
    pub fn handle_event<S: SceneGraph + ?Sized>(&mut self, scene: &mut S, event: &SceneEvent) -> bool {
        let input = match *event {
            SceneEvent::PointerDown(screen) => DrawInput::Down(scene.pointer_position(screen)),
            SceneEvent::PointerMove(screen) => DrawInput::Move(scene.pointer_position(screen)),
            SceneEvent::PointerUp(screen) => DrawInput::Up(scene.pointer_position(screen)),
            SceneEvent::PointerLeave { target } => DrawInput::Leave { target },
            _ => return false,
        };
        self.transition(scene, input);
        true
    }

    /// The single transition function of the state machine.
    pub fn transition<S: SceneGraph + ?Sized>(&mut self, scene: &mut S, input: DrawInput) {
        match (self.state, input) {
            (DrawState::Armed, DrawInput::Down(at)) => self.start(scene, at),
            (DrawState::Drawing { .. }, DrawInput::Move(at)) => {
                self.update(scene, at);
            }
            (DrawState::Drawing { grown: true, .. }, DrawInput::Up(_)) => self.finalize(scene),
            (DrawState::Drawing { grown: false, .. }, DrawInput::Up(_)) => {
                trace!("Release without movement, waiting for second click");
            }
            (DrawState::Drawing { .. }, DrawInput::Down(at)) => {
                self.update(scene, at);
                self.finalize(scene);
            }
            (DrawState::Drawing { .. }, DrawInput::Leave { target: None }) => self.finalize(scene),
            (DrawState::Drawing { .. }, DrawInput::Leave { target: Some(target) }) => {
                trace!("Pointer left over child element {}, still drawing", target);
            }
            _ => {}
        }
    }

    /// Drains notifications queued since the last call.
    pub fn take_events(&mut self) -> Vec<DrawEvent> {
        std::mem::take(&mut self.events)
    }

    fn start<S: SceneGraph + ?Sized>(&mut self, scene: &mut S, at: Point) {
        let Some(kind) = self.layer_type else {
            warn!("Draw armed without a layer type; ignoring pointer-down");
            return;
        };
        let id = scene.next_object_id();
        let shape = Shape::provisional(id, kind, at, self.settings.style.clone());

        scene.set_rubber_band_selection(false);
        scene.add(shape);
        scene.request_render();

        self.state = DrawState::Drawing {
            id,
            kind,
            anchor: at,
            grown: false,
        };
        self.events.push(DrawEvent::Start(id));
        debug!("Started {} {} at ({}, {})", kind.name(), id, at.x, at.y);
    }

    fn update<S: SceneGraph + ?Sized>(&mut self, scene: &mut S, at: Point) -> bool {
        let DrawState::Drawing {
            id,
            kind,
            anchor,
            grown,
        } = self.state
        else {
            return false;
        };
        let Some(shape) = scene.object_mut(id) else {
            warn!("Provisional object {} vanished from the scene", id);
            self.state = DrawState::Disabled;
            scene.set_rubber_band_selection(true);
            Self::release_cursor(scene);
            return false;
        };

        let accepted = match kind.family() {
            ShapeFamily::Linear => shape.set_line_end(at),
            ShapeFamily::Solid => shape.resize_from_anchor(anchor, at),
        };
        if !accepted {
            return false;
        }

        if !grown {
            self.state = DrawState::Drawing {
                id,
                kind,
                anchor,
                grown: true,
            };
        }
        scene.request_render();
        self.events.push(DrawEvent::Scaling(id));
        true
    }

    fn finalize<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) {
        let DrawState::Drawing { id, .. } = self.state else {
            return;
        };
        self.state = DrawState::Disabled;
        scene.set_rubber_band_selection(true);
        Self::release_cursor(scene);

        let min_size = self.settings.min_shape_size;
        let Some(shape) = scene.object_mut(id) else {
            warn!("Provisional object {} vanished before it was finished", id);
            return;
        };
        shape.drawing = false;
        shape.ensure_min_size(min_size);
        shape.set_origin_center();
        let finished = shape.clone();

        scene.select(id);
        // Not transient any more: this is the one mutation history records.
        scene.mark_modified(id);
        scene.request_render();

        self.events.push(DrawEvent::End(id));
        debug!(
            "Finished {} {} ({}x{})",
            finished.kind.name(),
            id,
            finished.width,
            finished.height
        );
        if let Some(callback) = self.on_complete.as_mut() {
            callback(&finished);
        }
    }

    fn release_cursor<S: SceneGraph + ?Sized>(scene: &mut S) {
        if !scene.pan_mode_active() {
            scene.set_cursor(Cursor::Default);
        }
    }
}
