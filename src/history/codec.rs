//! Snapshot codec: scene state to allow-listed JSON and back.
//!
//! Only the properties listed in [`SnapshotObject`] are written. Canvas size
//! and interaction state (selection, cursor, provisional shapes) never are, so
//! a snapshot replays identically whatever the viewport.

use crate::draw::{
    Arrowheads, Color, Geometry, LineGeometry, ObjectId, Origin, Shape, ShapeFamily, ShapeKind,
    Style,
};
use crate::scene::SceneGraph;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

const SNAPSHOT_VERSION: u32 = 1;

/// Errors raised while encoding or restoring a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("snapshot could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("unsupported snapshot version {0}")]
    Version(u32),

    #[error("object {0} appears more than once in the snapshot")]
    DuplicateId(ObjectId),

    #[error("object {id} has invalid geometry: {reason}")]
    InvalidGeometry { id: ObjectId, reason: String },
}

/// Immutable serialized scene state.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<str>);

impl Snapshot {
    /// Wraps externally produced snapshot text. Validation happens on restore.
    pub fn from_json(json: impl Into<Arc<str>>) -> Self {
        Self(json.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snapshot({} bytes)", self.0.len())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotDocument {
    version: u32,
    objects: Vec<SnapshotObject>,
}

/// The allow-listed properties of one object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotObject {
    id: ObjectId,
    kind: ShapeKind,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    angle: f64,
    #[serde(default)]
    origin: Origin,
    stroke: Color,
    stroke_width: f64,
    #[serde(default)]
    fill: Option<Color>,
    opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    endpoints: Option<[f64; 4]>,
    #[serde(default)]
    arrowheads: Arrowheads,
}

impl SnapshotObject {
    fn from_shape(shape: &Shape) -> Self {
        // Scale is folded into size and endpoints so restoring with unit
        // scale reproduces the same visual.
        let baked = shape.baked();
        Self {
            id: baked.id,
            kind: baked.kind,
            left: baked.left,
            top: baked.top,
            width: baked.width,
            height: baked.height,
            angle: baked.angle,
            origin: baked.origin,
            stroke: baked.style.stroke,
            stroke_width: baked.style.stroke_width,
            fill: baked.style.fill,
            opacity: baked.style.opacity,
            text: baked.text.clone(),
            endpoints: baked.line().map(|line| [line.x1, line.y1, line.x2, line.y2]),
            arrowheads: baked.arrowheads,
        }
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        let invalid = |reason: &str| SnapshotError::InvalidGeometry {
            id: self.id,
            reason: reason.to_string(),
        };

        let numbers = [
            self.left,
            self.top,
            self.width,
            self.height,
            self.angle,
            self.stroke_width,
            self.opacity,
        ];
        if self.id == ObjectId::MAX {
            return Err(invalid("reserved id"));
        }
        if numbers.iter().any(|n| !n.is_finite()) {
            return Err(invalid("non-finite number"));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(invalid("negative size"));
        }
        if self.stroke_width < 0.0 || !(0.0..=1.0).contains(&self.opacity) {
            return Err(invalid("style out of range"));
        }
        if !self.stroke.is_valid() || self.fill.is_some_and(|fill| !fill.is_valid()) {
            return Err(invalid("color out of range"));
        }
        match (self.kind.family(), &self.endpoints) {
            (ShapeFamily::Linear, None) => Err(invalid("linear shape without endpoints")),
            (ShapeFamily::Solid, Some(_)) => Err(invalid("solid shape with endpoints")),
            (ShapeFamily::Linear, Some(points)) if points.iter().any(|n| !n.is_finite()) => {
                Err(invalid("non-finite endpoint"))
            }
            _ => Ok(()),
        }
    }

    fn into_shape(self) -> Shape {
        let geometry = match self.endpoints {
            Some([x1, y1, x2, y2]) => Geometry::Linear(LineGeometry::new(x1, y1, x2, y2)),
            None => Geometry::Solid,
        };
        Shape {
            id: self.id,
            kind: self.kind,
            geometry,
            left: self.left,
            top: self.top,
            width: self.width,
            height: self.height,
            angle: self.angle,
            scale_x: 1.0,
            scale_y: 1.0,
            origin: self.origin,
            style: Style {
                stroke: self.stroke,
                stroke_width: self.stroke_width,
                fill: self.fill,
                opacity: self.opacity,
            },
            text: self.text,
            arrowheads: self.arrowheads,
            drawing: false,
        }
    }
}

/// Serializes every committed object in the scene.
///
/// Provisional shapes are skipped: a snapshot records settled state only.
///
/// # Errors
/// Objects are held to the same checks as [`decode`], so a state that could
/// not be restored is never captured.
pub fn capture<S: SceneGraph + ?Sized>(scene: &S) -> Result<Snapshot, SnapshotError> {
    let objects = scene
        .objects()
        .iter()
        .filter(|shape| !shape.drawing)
        .map(|shape| {
            let object = SnapshotObject::from_shape(shape);
            object.validate()?;
            Ok(object)
        })
        .collect::<Result<Vec<_>, SnapshotError>>()?;
    let count = objects.len();
    let document = SnapshotDocument {
        version: SNAPSHOT_VERSION,
        objects,
    };
    let json = serde_json::to_string(&document).map_err(SnapshotError::Encode)?;
    trace!("Captured snapshot with {count} objects ({} bytes)", json.len());
    Ok(Snapshot(json.into()))
}

/// Decodes and validates a snapshot into shapes without touching any scene.
pub fn decode(snapshot: &Snapshot) -> Result<Vec<Shape>, SnapshotError> {
    let document: SnapshotDocument =
        serde_json::from_str(snapshot.as_str()).map_err(SnapshotError::Decode)?;
    if document.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::Version(document.version));
    }

    let mut seen = HashSet::new();
    for object in &document.objects {
        object.validate()?;
        if !seen.insert(object.id) {
            return Err(SnapshotError::DuplicateId(object.id));
        }
    }

    Ok(document
        .objects
        .into_iter()
        .map(SnapshotObject::into_shape)
        .collect())
}

/// Rebuilds the scene from `snapshot`, calling `on_each` for every object
/// before it is handed to the scene.
///
/// The snapshot is fully validated first; on error the scene is untouched.
pub fn restore<S, F>(scene: &mut S, snapshot: &Snapshot, mut on_each: F) -> Result<(), SnapshotError>
where
    S: SceneGraph + ?Sized,
    F: FnMut(&mut Shape),
{
    let mut shapes = decode(snapshot)?;
    for shape in &mut shapes {
        reassign_geometry(shape);
        on_each(shape);
    }
    debug!("Restoring snapshot with {} objects", shapes.len());
    scene.load_objects(shapes);
    Ok(())
}

/// Resets scale and re-derives what a plain property copy would leave stale.
///
/// Linear shapes keep their endpoints and box verbatim and get their control
/// points recomputed from the endpoints; box values alone cannot tell which
/// diagonal a segment runs along.
fn reassign_geometry(shape: &mut Shape) {
    shape.scale_x = 1.0;
    shape.scale_y = 1.0;
    if let Geometry::Linear(line) = &mut shape.geometry {
        line.refresh_points();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, RED};
    use crate::scene::{Scene, SceneEvent};
    use crate::util::Point;

    fn add_committed(scene: &mut Scene, mut shape: Shape) -> ObjectId {
        shape.drawing = false;
        let id = shape.id;
        scene.add(shape);
        id
    }

    fn line_shape(id: ObjectId, from: Point, to: Point) -> Shape {
        let mut shape = Shape::provisional(id, ShapeKind::Arrow, from, Style::default());
        shape.set_line_end(to);
        shape.set_origin_center();
        shape
    }

    fn assert_same_scene(a: &Scene, b: &Scene) {
        assert_eq!(a.len(), b.len());
        for (left, right) in a.objects().iter().zip(b.objects()) {
            assert_eq!(left.id, right.id);
            assert_eq!(left.kind, right.kind);
            assert_eq!(left.style, right.style);
            assert_eq!(left.text, right.text);
            assert_eq!(left.arrowheads, right.arrowheads);
            assert!(
                left.visual().approx_eq(&right.visual()),
                "{:?} != {:?}",
                left.visual(),
                right.visual()
            );
        }
    }

    #[test]
    fn round_trip_reproduces_scaled_rotated_shapes() {
        let mut scene = Scene::new();
        let line = add_committed(
            &mut scene,
            line_shape(1, Point::new(0.0, 10.0), Point::new(10.0, 0.0)),
        );
        let mut rect = Shape::provisional(2, ShapeKind::Rectangle, Point::new(5.0, 5.0), Style::default());
        rect.resize_from_anchor(Point::new(5.0, 5.0), Point::new(45.0, 25.0));
        rect.text = Some("label".into());
        rect.style.fill = Some(BLUE);
        let rect = add_committed(&mut scene, rect);

        scene.scale(line, 3.0, 0.5);
        scene.rotate(line, 47.0);
        scene.scale(rect, 1.5, 2.0);

        let snapshot = capture(&scene).unwrap();
        let mut restored = Scene::new();
        restore(&mut restored, &snapshot, |_| {}).unwrap();

        assert_same_scene(&scene, &restored);
        assert!(
            restored
                .objects()
                .iter()
                .all(|shape| shape.scale_x == 1.0 && shape.scale_y == 1.0)
        );
    }

    #[test]
    fn restore_keeps_line_direction() {
        // Same box, opposite diagonals.
        let mut scene = Scene::new();
        add_committed(&mut scene, line_shape(1, Point::new(0.0, 0.0), Point::new(10.0, 10.0)));
        add_committed(&mut scene, line_shape(2, Point::new(0.0, 10.0), Point::new(10.0, 0.0)));

        let snapshot = capture(&scene).unwrap();
        let mut restored = Scene::new();
        restore(&mut restored, &snapshot, |_| {}).unwrap();

        assert_same_scene(&scene, &restored);
    }

    #[test]
    fn restore_undoes_later_scaling() {
        let mut scene = Scene::new();
        let id = add_committed(
            &mut scene,
            line_shape(1, Point::new(2.0, 3.0), Point::new(12.0, 9.0)),
        );
        let before: Vec<_> = scene.objects().iter().map(Shape::visual).collect();
        let snapshot = capture(&scene).unwrap();

        scene.scale(id, 4.0, 4.0);
        restore(&mut scene, &snapshot, |_| {}).unwrap();

        let after: Vec<_> = scene.objects().iter().map(Shape::visual).collect();
        assert!(before.iter().zip(&after).all(|(a, b)| a.approx_eq(b)));
    }

    #[test]
    fn capture_skips_provisional_and_canvas_size() {
        let mut scene = Scene::new();
        scene.width = 1920.0;
        scene.height = 1080.0;
        scene.add(Shape::provisional(
            1,
            ShapeKind::Ellipse,
            Point::new(0.0, 0.0),
            Style::default(),
        ));

        let snapshot = capture(&scene).unwrap();
        assert!(decode(&snapshot).unwrap().is_empty());
        assert!(!snapshot.as_str().contains("1920"));
    }

    #[test]
    fn on_each_sees_every_object() {
        let mut scene = Scene::new();
        add_committed(&mut scene, line_shape(1, Point::new(0.0, 0.0), Point::new(1.0, 1.0)));
        add_committed(&mut scene, line_shape(2, Point::new(0.0, 0.0), Point::new(2.0, 2.0)));
        let snapshot = capture(&scene).unwrap();

        let mut seen = Vec::new();
        let mut target = Scene::new();
        restore(&mut target, &snapshot, |shape| {
            shape.style.stroke = RED;
            seen.push(shape.id);
        })
        .unwrap();

        assert_eq!(seen, vec![1, 2]);
        assert!(target.objects().iter().all(|shape| shape.style.stroke == RED));
    }

    #[test]
    fn malformed_snapshot_leaves_scene_untouched() {
        let mut scene = Scene::new();
        add_committed(&mut scene, line_shape(1, Point::new(0.0, 0.0), Point::new(1.0, 1.0)));
        scene.take_events();

        let err = restore(&mut scene, &Snapshot::from_json("{\"version\":1"), |_| {}).unwrap_err();
        assert!(matches!(err, SnapshotError::Decode(_)));
        assert_eq!(scene.len(), 1);
        assert!(scene.take_events().is_empty());
    }

    #[test]
    fn foreign_fields_are_rejected() {
        let json = r#"{"version":1,"objects":[],"canvas_width":800}"#;
        assert!(matches!(
            decode(&Snapshot::from_json(json)),
            Err(SnapshotError::Decode(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut scene = Scene::new();
        add_committed(&mut scene, line_shape(3, Point::new(0.0, 0.0), Point::new(1.0, 1.0)));
        let one = capture(&scene).unwrap();

        let mut document: serde_json::Value = serde_json::from_str(one.as_str()).unwrap();
        let objects = document["objects"].as_array_mut().unwrap();
        let copy = objects[0].clone();
        objects.push(copy);

        assert!(matches!(
            decode(&Snapshot::from_json(document.to_string())),
            Err(SnapshotError::DuplicateId(3))
        ));
    }

    #[test]
    fn linear_without_endpoints_is_invalid() {
        let json = r#"{"version":1,"objects":[{"id":1,"kind":"line","left":0,"top":0,"width":1,"height":1,
            "stroke":{"r":0,"g":0,"b":0,"a":1},"stroke_width":1,"opacity":1}]}"#;
        assert!(matches!(
            decode(&Snapshot::from_json(json)),
            Err(SnapshotError::InvalidGeometry { id: 1, .. })
        ));
    }

    #[test]
    fn max_id_is_rejected_before_touching_scene() {
        let mut scene = Scene::new();
        add_committed(&mut scene, line_shape(1, Point::new(0.0, 0.0), Point::new(4.0, 4.0)));
        let mut document: serde_json::Value =
            serde_json::from_str(capture(&scene).unwrap().as_str()).unwrap();
        document["objects"][0]["id"] = serde_json::json!(ObjectId::MAX);
        scene.take_events();

        let snapshot = Snapshot::from_json(document.to_string());
        let err = restore(&mut scene, &snapshot, |_| {}).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::InvalidGeometry { id, .. } if id == ObjectId::MAX
        ));
        assert_eq!(scene.objects()[0].id, 1);
        assert!(scene.take_events().is_empty());
    }

    #[test]
    fn capture_refuses_state_it_could_not_restore() {
        let mut scene = Scene::new();
        let id = add_committed(
            &mut scene,
            line_shape(5, Point::new(0.0, 0.0), Point::new(4.0, 4.0)),
        );
        scene.rotate(id, f64::NAN);

        assert!(matches!(
            capture(&scene),
            Err(SnapshotError::InvalidGeometry { id: 5, .. })
        ));

        scene.rotate(id, 30.0);
        let snapshot = capture(&scene).unwrap();
        assert_eq!(decode(&snapshot).unwrap().len(), 1);
    }

    #[test]
    fn wrong_version_is_rejected() {
        let json = r#"{"version":7,"objects":[]}"#;
        assert!(matches!(
            decode(&Snapshot::from_json(json)),
            Err(SnapshotError::Version(7))
        ));
    }

    #[test]
    fn restore_fires_restored_after_object_events() {
        let mut scene = Scene::new();
        add_committed(&mut scene, line_shape(1, Point::new(0.0, 0.0), Point::new(1.0, 1.0)));
        let snapshot = capture(&scene).unwrap();
        scene.take_events();

        restore(&mut scene, &snapshot, |_| {}).unwrap();
        let events = scene.take_events();
        assert_eq!(events.last(), Some(&SceneEvent::Restored));
        assert_eq!(events.len(), 3);
    }
}
