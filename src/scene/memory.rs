//! In-memory scene graph.

use super::{Cursor, ObjectChange, SceneEvent, SceneGraph};
use crate::draw::{ObjectId, Shape, Style};
use crate::util::Point;
use log::debug;

/// Pan/zoom mapping from screen to canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan_x: f64,
    pub pan_y: f64,
    /// Scale factor (1.0 = no zoom)
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        )
    }
}

/// Ordered collection of shapes plus the interaction state a canvas keeps
/// around them (selection, cursor, pending events).
#[derive(Debug)]
pub struct Scene {
    objects: Vec<Shape>,
    next_id: ObjectId,
    selection: Option<ObjectId>,
    rubber_band: bool,
    cursor: Cursor,
    pan_mode: bool,
    /// Screen to canvas mapping
    pub viewport: Viewport,
    /// Canvas size in screen pixels; never part of a snapshot
    pub width: f64,
    pub height: f64,
    events: Vec<SceneEvent>,
    renders: usize,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 1,
            selection: None,
            rubber_band: true,
            cursor: Cursor::Default,
            pan_mode: false,
            viewport: Viewport::default(),
            width: 0.0,
            height: 0.0,
            events: Vec::new(),
            renders: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn rubber_band_selection(&self) -> bool {
        self.rubber_band
    }

    /// Number of renders requested so far.
    pub fn render_requests(&self) -> usize {
        self.renders
    }

    pub fn set_pan_mode(&mut self, active: bool) {
        self.pan_mode = active;
        self.cursor = if active { Cursor::Grab } else { Cursor::Default };
    }

    // --- Pointer input (queued for the host to route) ---

    pub fn pointer_down(&mut self, screen: Point) {
        self.events.push(SceneEvent::PointerDown(screen));
    }

    pub fn pointer_move(&mut self, screen: Point) {
        self.events.push(SceneEvent::PointerMove(screen));
    }

    pub fn pointer_up(&mut self, screen: Point) {
        self.events.push(SceneEvent::PointerUp(screen));
    }

    pub fn pointer_leave(&mut self, target: Option<ObjectId>) {
        self.events.push(SceneEvent::PointerLeave { target });
    }

    // --- Object operations (each fires the matching event) ---

    pub fn translate(&mut self, id: ObjectId, dx: f64, dy: f64) -> bool {
        self.modify(id, |shape| shape.translate(dx, dy))
    }

    /// Multiplies the scale factors and fires `object:modified`.
    pub fn scale(&mut self, id: ObjectId, sx: f64, sy: f64) -> bool {
        self.modify(id, |shape| {
            shape.scale_x *= sx;
            shape.scale_y *= sy;
        })
    }

    /// Sets the scale factors for one frame of an interactive transform.
    ///
    /// Fires `object:skewing` instead of `object:modified`; a drag produces
    /// one of these per pointer frame.
    pub fn drag_scale(&mut self, id: ObjectId, sx: f64, sy: f64) -> bool {
        let Some(shape) = self.object_mut(id) else {
            return false;
        };
        shape.scale_x = sx;
        shape.scale_y = sy;
        let change = Self::change_for(shape);
        self.events.push(SceneEvent::ObjectSkewing(change));
        true
    }

    pub fn rotate(&mut self, id: ObjectId, degrees: f64) -> bool {
        self.modify(id, |shape| shape.angle = degrees)
    }

    pub fn set_style(&mut self, id: ObjectId, style: Style) -> bool {
        self.modify(id, |shape| shape.style = style)
    }

    pub fn set_text(&mut self, id: ObjectId, text: Option<String>) -> bool {
        self.modify(id, |shape| shape.text = text)
    }

    fn modify(&mut self, id: ObjectId, apply: impl FnOnce(&mut Shape)) -> bool {
        let Some(shape) = self.object_mut(id) else {
            return false;
        };
        apply(shape);
        self.mark_modified(id);
        true
    }

    fn change_for(shape: &Shape) -> ObjectChange {
        ObjectChange {
            id: shape.id,
            transient: shape.drawing,
        }
    }
}

impl SceneGraph for Scene {
    fn objects(&self) -> &[Shape] {
        &self.objects
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut Shape> {
        self.objects.iter_mut().find(|shape| shape.id == id)
    }

    fn next_object_id(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn add(&mut self, shape: Shape) {
        let change = Self::change_for(&shape);
        self.next_id = self.next_id.max(shape.id.saturating_add(1));
        self.objects.push(shape);
        self.events.push(SceneEvent::ObjectAdded(change));
    }

    fn remove(&mut self, id: ObjectId) -> Option<Shape> {
        let index = self.objects.iter().position(|shape| shape.id == id)?;
        let shape = self.objects.remove(index);
        if self.selection == Some(id) {
            self.selection = None;
        }
        self.events
            .push(SceneEvent::ObjectRemoved(Self::change_for(&shape)));
        Some(shape)
    }

    fn mark_modified(&mut self, id: ObjectId) {
        if let Some(shape) = self.object(id) {
            let change = Self::change_for(shape);
            self.events.push(SceneEvent::ObjectModified(change));
        }
    }

    fn load_objects(&mut self, objects: Vec<Shape>) {
        debug!(
            "Loading {} objects (replacing {})",
            objects.len(),
            self.objects.len()
        );
        for old in std::mem::take(&mut self.objects) {
            self.events
                .push(SceneEvent::ObjectRemoved(Self::change_for(&old)));
        }
        self.selection = None;
        for shape in objects {
            self.add(shape);
        }
        self.request_render();
        self.events.push(SceneEvent::Restored);
    }

    fn pointer_position(&self, screen: Point) -> Point {
        self.viewport.to_canvas(screen)
    }

    fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    fn select(&mut self, id: ObjectId) {
        if self.object(id).is_some() {
            self.selection = Some(id);
        }
    }

    fn discard_selection(&mut self) {
        self.selection = None;
    }

    fn set_rubber_band_selection(&mut self, enabled: bool) {
        self.rubber_band = enabled;
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn pan_mode_active(&self) -> bool {
        self.pan_mode
    }

    fn request_render(&mut self) {
        self.renders += 1;
    }

    fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}
