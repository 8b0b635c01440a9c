use super::*;
use crate::draw::{Geometry, Origin, ShapeKind};
use crate::scene::{Cursor, Scene, SceneEvent, SceneGraph};
use crate::util::Point;
use std::cell::RefCell;
use std::rc::Rc;

fn create_test_draw_manager() -> (Scene, DrawManager) {
    let mut scene = Scene::new();
    let draw = DrawManager::init(&mut scene, DrawSettings::default());
    (scene, draw)
}

/// Routes queued scene events into the draw manager, returning every event
/// seen along the way.
fn feed(scene: &mut Scene, draw: &mut DrawManager) -> Vec<SceneEvent> {
    let mut seen = Vec::new();
    loop {
        let events = scene.take_events();
        if events.is_empty() {
            return seen;
        }
        for event in &events {
            draw.handle_event(scene, event);
        }
        seen.extend(events);
    }
}

fn arm(scene: &mut Scene, draw: &mut DrawManager, kind: ShapeKind) {
    draw.set_layer_type(kind);
    draw.set_enabled(scene, true);
}

fn click(scene: &mut Scene, draw: &mut DrawManager, x: f64, y: f64) {
    scene.pointer_down(Point::new(x, y));
    scene.pointer_up(Point::new(x, y));
    feed(scene, draw);
}

#[test]
fn test_drag_rectangle_up_and_left() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Rectangle);

    scene.pointer_down(Point::new(50.0, 50.0));
    scene.pointer_move(Point::new(35.0, 35.0));
    scene.pointer_move(Point::new(20.0, 20.0));
    scene.pointer_up(Point::new(20.0, 20.0));
    feed(&mut scene, &mut draw);

    assert_eq!(draw.state(), DrawState::Disabled);
    let shape = &scene.objects()[0];
    let rect = shape.bounding_rect();
    assert_eq!(
        (rect.left, rect.top, rect.width, rect.height),
        (20.0, 20.0, 30.0, 30.0)
    );
    assert_eq!(shape.origin, Origin::Center);
    assert_eq!((shape.left, shape.top), (35.0, 35.0));
    assert!(!shape.drawing);
}

#[test]
fn test_click_click_line() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Line);

    click(&mut scene, &mut draw, 0.0, 0.0);
    assert!(draw.is_drawing(), "release without movement keeps drawing");

    click(&mut scene, &mut draw, 10.0, 0.0);
    assert_eq!(draw.state(), DrawState::Disabled);

    scene.pointer_move(Point::new(40.0, 40.0));
    scene.pointer_down(Point::new(40.0, 40.0));
    let later = feed(&mut scene, &mut draw);
    assert!(later.iter().all(|event| event.object_change().is_none()));

    let shape = &scene.objects()[0];
    let line = match shape.geometry {
        Geometry::Linear(line) => line,
        Geometry::Solid => panic!("expected a linear shape"),
    };
    assert_eq!(
        (line.x1, line.y1, line.x2, line.y2),
        (0.0, 0.0, 10.0, 0.0)
    );
    assert_eq!(scene.len(), 1);
}

#[test]
fn test_zero_delta_move_is_ignored_for_solids() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Ellipse);

    scene.pointer_down(Point::new(10.0, 10.0));
    scene.pointer_move(Point::new(30.0, 25.0));
    scene.pointer_move(Point::new(10.0, 60.0));
    feed(&mut scene, &mut draw);

    let shape = &scene.objects()[0];
    assert_eq!((shape.width, shape.height), (20.0, 15.0));
    let scaling = draw
        .take_events()
        .iter()
        .filter(|event| matches!(event, DrawEvent::Scaling(_)))
        .count();
    assert_eq!(scaling, 1);
}

#[test]
fn test_leave_over_child_keeps_drawing() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Diamond);

    scene.pointer_down(Point::new(0.0, 0.0));
    scene.pointer_move(Point::new(8.0, 8.0));
    scene.pointer_leave(Some(99));
    feed(&mut scene, &mut draw);
    assert!(draw.is_drawing());

    scene.pointer_leave(None);
    feed(&mut scene, &mut draw);
    assert_eq!(draw.state(), DrawState::Disabled);
    assert!(!scene.objects()[0].drawing);
}

#[test]
fn test_single_shot_disarms() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Rectangle);

    scene.pointer_down(Point::new(0.0, 0.0));
    scene.pointer_move(Point::new(5.0, 5.0));
    scene.pointer_up(Point::new(5.0, 5.0));
    scene.pointer_down(Point::new(30.0, 30.0));
    scene.pointer_move(Point::new(50.0, 50.0));
    scene.pointer_up(Point::new(50.0, 50.0));
    feed(&mut scene, &mut draw);

    assert_eq!(scene.len(), 1);
    assert!(!draw.enabled());
    assert_eq!(draw.layer_type(), Some(ShapeKind::Rectangle));
}

#[test]
fn test_enable_discards_selection_and_sets_crosshair() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Rectangle);
    scene.pointer_down(Point::new(0.0, 0.0));
    scene.pointer_move(Point::new(5.0, 5.0));
    scene.pointer_up(Point::new(5.0, 5.0));
    feed(&mut scene, &mut draw);
    let id = scene.objects()[0].id;
    assert_eq!(scene.selection(), Some(id));

    draw.set_enabled(&mut scene, true);
    assert_eq!(scene.selection(), None);
    assert_eq!(scene.cursor(), Cursor::Crosshair);
    assert_eq!(draw.state(), DrawState::Armed);
}

#[test]
fn test_rubber_band_disabled_while_drawing() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Arrow);

    scene.pointer_down(Point::new(0.0, 0.0));
    feed(&mut scene, &mut draw);
    assert!(!scene.rubber_band_selection());
    assert!(scene.objects()[0].drawing);

    scene.pointer_move(Point::new(4.0, 9.0));
    scene.pointer_up(Point::new(4.0, 9.0));
    feed(&mut scene, &mut draw);
    assert!(scene.rubber_band_selection());
    assert_eq!(scene.cursor(), Cursor::Default);
}

#[test]
fn test_pan_mode_keeps_cursor_on_disable() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Rectangle);
    scene.set_pan_mode(true);

    draw.set_enabled(&mut scene, false);
    assert!(!draw.enabled());
    assert_eq!(scene.cursor(), Cursor::Grab);

    scene.set_pan_mode(false);
    arm(&mut scene, &mut draw, ShapeKind::Rectangle);
    draw.set_enabled(&mut scene, false);
    assert_eq!(scene.cursor(), Cursor::Default);
}

#[test]
fn test_draw_events_in_order() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Line);

    scene.pointer_down(Point::new(1.0, 1.0));
    scene.pointer_move(Point::new(2.0, 2.0));
    scene.pointer_move(Point::new(3.0, 3.0));
    scene.pointer_up(Point::new(3.0, 3.0));
    feed(&mut scene, &mut draw);

    let names: Vec<_> = draw.take_events().iter().map(DrawEvent::name).collect();
    assert_eq!(
        names,
        vec!["draw:start", "draw:scaling", "draw:scaling", "draw:end"]
    );
    assert!(draw.take_events().is_empty());
}

#[test]
fn test_finalize_fires_one_committed_mutation() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Rectangle);

    scene.pointer_down(Point::new(0.0, 0.0));
    scene.pointer_move(Point::new(10.0, 10.0));
    scene.pointer_move(Point::new(20.0, 20.0));
    scene.pointer_up(Point::new(20.0, 20.0));
    let events = feed(&mut scene, &mut draw);

    let committed: Vec<_> = events
        .iter()
        .filter_map(SceneEvent::object_change)
        .filter(|change| !change.transient)
        .collect();
    assert_eq!(committed.len(), 1);
}

#[test]
fn test_draw_complete_callback_receives_shape() {
    let (mut scene, mut draw) = create_test_draw_manager();
    let finished = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&finished);
    draw.set_draw_complete(move |shape| sink.borrow_mut().push((shape.id, shape.kind)));

    arm(&mut scene, &mut draw, ShapeKind::Ellipse);
    scene.pointer_down(Point::new(0.0, 0.0));
    scene.pointer_move(Point::new(6.0, 3.0));
    scene.pointer_up(Point::new(6.0, 3.0));
    feed(&mut scene, &mut draw);

    let id = scene.objects()[0].id;
    assert_eq!(*finished.borrow(), vec![(id, ShapeKind::Ellipse)]);
}

#[test]
fn test_degenerate_click_click_gets_min_size() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Rectangle);

    click(&mut scene, &mut draw, 7.0, 7.0);
    click(&mut scene, &mut draw, 7.0, 7.0);

    assert_eq!(draw.state(), DrawState::Disabled);
    let shape = &scene.objects()[0];
    assert_eq!((shape.width, shape.height), (1.0, 1.0));
    assert_eq!(scene.len(), 1);
}

#[test]
fn test_armed_without_layer_type_does_nothing() {
    let (mut scene, mut draw) = create_test_draw_manager();
    draw.set_enabled(&mut scene, true);

    click(&mut scene, &mut draw, 3.0, 3.0);
    assert!(scene.is_empty());
    assert_eq!(draw.state(), DrawState::Armed);
}

#[test]
fn test_cancel_removes_provisional_shape() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Line);
    scene.pointer_down(Point::new(0.0, 0.0));
    scene.pointer_move(Point::new(9.0, 9.0));
    feed(&mut scene, &mut draw);

    assert!(draw.cancel(&mut scene));
    assert!(scene.is_empty());
    assert!(scene.rubber_band_selection());
    assert_eq!(draw.state(), DrawState::Disabled);
    assert!(!draw.cancel(&mut scene));
}

#[test]
fn test_disable_while_drawing_finalizes() {
    let (mut scene, mut draw) = create_test_draw_manager();
    arm(&mut scene, &mut draw, ShapeKind::Rectangle);
    scene.pointer_down(Point::new(0.0, 0.0));
    scene.pointer_move(Point::new(12.0, 4.0));
    feed(&mut scene, &mut draw);

    draw.set_enabled(&mut scene, false);
    assert_eq!(draw.state(), DrawState::Disabled);
    assert!(!scene.objects()[0].drawing);
    assert_eq!(scene.selection(), Some(scene.objects()[0].id));
}

#[test]
fn test_pointer_position_goes_through_viewport() {
    let (mut scene, mut draw) = create_test_draw_manager();
    scene.viewport.zoom = 2.0;
    arm(&mut scene, &mut draw, ShapeKind::Line);

    scene.pointer_down(Point::new(20.0, 20.0));
    scene.pointer_move(Point::new(40.0, 20.0));
    scene.pointer_up(Point::new(40.0, 20.0));
    feed(&mut scene, &mut draw);

    let line = scene.objects()[0].line().copied();
    assert_eq!(line.map(|l| (l.x1, l.y1, l.x2, l.y2)), Some((10.0, 10.0, 20.0, 10.0)));
}

#[test]
fn test_modifiers_track_press_and_release() {
    let mut modifiers = Modifiers::new();
    assert!(modifiers.update(Key::Ctrl, true));
    assert!(modifiers.update(Key::Shift, true));
    assert!(!modifiers.update(Key::Char('z'), true));
    assert!(modifiers.ctrl && modifiers.shift && !modifiers.alt);
    modifiers.update(Key::Ctrl, false);
    assert!(!modifiers.ctrl);
}

#[test]
fn test_key_names() {
    assert_eq!(Key::from_name("Escape"), Key::Escape);
    assert_eq!(Key::from_name("z"), Key::Char('z'));
    assert_eq!(Key::from_name("F13"), Key::Unknown);
    assert_eq!(Key::Char('Z').binding_name().as_deref(), Some("Z"));
    assert_eq!(Key::Shift.binding_name(), None);
}
