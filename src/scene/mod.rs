//! Scene graph interface and the in-memory scene.
//!
//! The history and draw managers never own the scene: hosts pass it in by
//! reference, and the managers talk to it only through [`SceneGraph`]. The
//! scene reports what happened through a queue of [`SceneEvent`]s that the
//! host drains and routes (see [`crate::editor::Editor::pump`]).

mod memory;

pub use memory::{Scene, Viewport};

use crate::draw::{ObjectId, Shape};
use crate::util::Point;

/// Pointer cursor shown over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
    Grab,
}

/// Affected object of a mutation event.
///
/// `transient` is set when the object was a provisional shape at the time the
/// event fired; such mutations are not worth an undo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectChange {
    pub id: ObjectId,
    pub transient: bool,
}

/// Events fired by a scene, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    ObjectAdded(ObjectChange),
    ObjectRemoved(ObjectChange),
    ObjectModified(ObjectChange),
    /// An interactive transform frame (drag-scaling, skewing) was applied.
    ObjectSkewing(ObjectChange),
    /// Pointer pressed, in screen coordinates.
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    /// Pointer left the canvas; `target` is the element it was over, if any.
    PointerLeave { target: Option<ObjectId> },
    /// A `load_objects` call finished and the scene has been re-rendered.
    Restored,
}

impl SceneEvent {
    /// Canonical event name as seen by listeners.
    pub fn name(&self) -> &'static str {
        match self {
            SceneEvent::ObjectAdded(_) => "object:added",
            SceneEvent::ObjectRemoved(_) => "object:removed",
            SceneEvent::ObjectModified(_) => "object:modified",
            SceneEvent::ObjectSkewing(_) => "object:skewing",
            SceneEvent::PointerDown(_) => "mouse:down",
            SceneEvent::PointerMove(_) => "mouse:move",
            SceneEvent::PointerUp(_) => "mouse:up",
            SceneEvent::PointerLeave { .. } => "mouse:out",
            SceneEvent::Restored => "scene:restored",
        }
    }

    /// The object touched by a mutation event.
    pub fn object_change(&self) -> Option<ObjectChange> {
        match self {
            SceneEvent::ObjectAdded(change)
            | SceneEvent::ObjectRemoved(change)
            | SceneEvent::ObjectModified(change)
            | SceneEvent::ObjectSkewing(change) => Some(*change),
            _ => None,
        }
    }
}

/// Operations the editing core needs from a scene graph.
///
/// Mutations through [`SceneGraph::object_mut`] are silent; everything else
/// that changes the object list queues the matching [`SceneEvent`].
pub trait SceneGraph {
    /// Objects in draw order (first = bottom).
    fn objects(&self) -> &[Shape];

    fn object(&self, id: ObjectId) -> Option<&Shape> {
        self.objects().iter().find(|shape| shape.id == id)
    }

    /// Mutable access without firing events.
    fn object_mut(&mut self, id: ObjectId) -> Option<&mut Shape>;

    /// Reserves an id for a new object.
    fn next_object_id(&mut self) -> ObjectId;

    /// Appends an object on top and fires `object:added`.
    fn add(&mut self, shape: Shape);

    /// Removes an object, firing `object:removed` when it existed.
    fn remove(&mut self, id: ObjectId) -> Option<Shape>;

    /// Fires `object:modified` for an object changed through `object_mut`.
    fn mark_modified(&mut self, id: ObjectId);

    /// Replaces every object.
    ///
    /// Fires `object:removed` for the old objects, `object:added` for the new
    /// ones, then [`SceneEvent::Restored`] once the scene has re-rendered.
    fn load_objects(&mut self, objects: Vec<Shape>);

    /// Converts a screen position to canvas coordinates.
    fn pointer_position(&self, screen: Point) -> Point;

    fn selection(&self) -> Option<ObjectId>;
    fn select(&mut self, id: ObjectId);
    fn discard_selection(&mut self);

    /// Enables or disables drag-to-select (rubber-band) selection.
    fn set_rubber_band_selection(&mut self, enabled: bool);

    fn set_cursor(&mut self, cursor: Cursor);

    /// Whether a pan mode currently owns the cursor.
    fn pan_mode_active(&self) -> bool;

    fn request_render(&mut self);

    /// Drains queued events.
    fn take_events(&mut self) -> Vec<SceneEvent>;
}
