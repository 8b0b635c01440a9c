//! Shape definitions for canvas objects.

use super::color::{BLACK, Color};
use crate::util::{self, Point};
use serde::{Deserialize, Serialize};

/// Identifier of a shape inside one scene.
pub type ObjectId = u64;

/// The shape families a user can draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle
    Rectangle,
    /// Ellipse inscribed in the bounding box
    Ellipse,
    /// Rhombus with vertices on the bounding box edge midpoints
    Diamond,
    /// Straight segment between two endpoints
    Line,
    /// Segment with an arrowhead at its end point
    Arrow,
}

/// Geometry representation used by a [`ShapeKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeFamily {
    /// Endpoint based; width/height are derived from the endpoints.
    Linear,
    /// Bounding-box based.
    Solid,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Rectangle,
        ShapeKind::Ellipse,
        ShapeKind::Diamond,
        ShapeKind::Line,
        ShapeKind::Arrow,
    ];

    pub fn family(self) -> ShapeFamily {
        match self {
            ShapeKind::Line | ShapeKind::Arrow => ShapeFamily::Linear,
            ShapeKind::Rectangle | ShapeKind::Ellipse | ShapeKind::Diamond => ShapeFamily::Solid,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Line => "line",
            ShapeKind::Arrow => "arrow",
        }
    }
}

/// Which point of the bounding box `left`/`top` refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    #[default]
    TopLeft,
    Center,
}

/// Paint style of a shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Outline color
    pub stroke: Color,
    /// Outline width in canvas units
    pub stroke_width: f64,
    /// Interior color; `None` leaves the interior unpainted
    pub fill: Option<Color>,
    /// Whole-object opacity (0.0 - 1.0)
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: BLACK,
            stroke_width: 2.0,
            fill: None,
            opacity: 1.0,
        }
    }
}

/// Arrowhead markers on the two ends of a linear shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Arrowheads {
    pub start: bool,
    pub end: bool,
}

/// Endpoints of a linear shape plus the control points derived from them.
///
/// The control points are stored relative to the segment midpoint; rendering
/// places them around the shape center and applies scale and rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineGeometry {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    points: [Point; 2],
}

impl LineGeometry {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let mut geometry = Self {
            x1,
            y1,
            x2,
            y2,
            points: [Point::default(); 2],
        };
        geometry.refresh_points();
        geometry
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Control points relative to the segment midpoint.
    pub fn points(&self) -> [Point; 2] {
        self.points
    }

    /// Re-derives the control points from the endpoints.
    pub fn refresh_points(&mut self) {
        let hx = (self.x1 - self.x2) / 2.0;
        let hy = (self.y1 - self.y2) / 2.0;
        self.points = [Point::new(hx, hy), Point::new(-hx, -hy)];
    }
}

/// Closed set of geometry representations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    Linear(LineGeometry),
    Solid,
}

/// Axis-aligned box of a shape in canvas coordinates, rotation not applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// What ends up on screen for a shape, independent of how it is parameterised.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Visual {
    Segment {
        start: Point,
        end: Point,
    },
    Body {
        center: Point,
        width: f64,
        height: f64,
        angle: f64,
    },
}

impl Visual {
    /// Tolerant comparison; geometry goes through trigonometry and scale folding.
    pub fn approx_eq(&self, other: &Visual) -> bool {
        let pt = |a: Point, b: Point| util::approx_eq(a.x, b.x) && util::approx_eq(a.y, b.y);
        match (self, other) {
            (Visual::Segment { start: s1, end: e1 }, Visual::Segment { start: s2, end: e2 }) => {
                pt(*s1, *s2) && pt(*e1, *e2)
            }
            (
                Visual::Body {
                    center: c1,
                    width: w1,
                    height: h1,
                    angle: a1,
                },
                Visual::Body {
                    center: c2,
                    width: w2,
                    height: h2,
                    angle: a2,
                },
            ) => {
                pt(*c1, *c2)
                    && util::approx_eq(*w1, *w2)
                    && util::approx_eq(*h1, *h2)
                    && util::approx_eq(*a1, *a2)
            }
            _ => false,
        }
    }
}

/// A shape object living in a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub id: ObjectId,
    pub kind: ShapeKind,
    pub geometry: Geometry,
    /// Position of the origin point (see [`Origin`])
    pub left: f64,
    pub top: f64,
    /// Unscaled box size
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the center
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub origin: Origin,
    pub style: Style,
    pub text: Option<String>,
    pub arrowheads: Arrowheads,
    /// Set while the shape is under interactive construction
    pub drawing: bool,
}

impl Shape {
    /// Creates a zero-size shape at `at`, flagged as under construction.
    pub fn provisional(id: ObjectId, kind: ShapeKind, at: Point, style: Style) -> Self {
        let geometry = match kind.family() {
            ShapeFamily::Linear => Geometry::Linear(LineGeometry::new(at.x, at.y, at.x, at.y)),
            ShapeFamily::Solid => Geometry::Solid,
        };
        Self {
            id,
            kind,
            geometry,
            left: at.x,
            top: at.y,
            width: 0.0,
            height: 0.0,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            origin: Origin::TopLeft,
            style,
            text: None,
            arrowheads: Arrowheads {
                start: false,
                end: kind == ShapeKind::Arrow,
            },
            drawing: true,
        }
    }

    pub fn family(&self) -> ShapeFamily {
        match self.geometry {
            Geometry::Linear(_) => ShapeFamily::Linear,
            Geometry::Solid => ShapeFamily::Solid,
        }
    }

    pub fn line(&self) -> Option<&LineGeometry> {
        match &self.geometry {
            Geometry::Linear(line) => Some(line),
            Geometry::Solid => None,
        }
    }

    /// Box size with scale applied.
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.width * self.scale_x.abs(), self.height * self.scale_y.abs())
    }

    pub fn center(&self) -> Point {
        match self.origin {
            Origin::Center => Point::new(self.left, self.top),
            Origin::TopLeft => {
                let (w, h) = self.scaled_size();
                Point::new(self.left + w / 2.0, self.top + h / 2.0)
            }
        }
    }

    pub fn bounding_rect(&self) -> BoundingRect {
        let center = self.center();
        let (width, height) = self.scaled_size();
        BoundingRect {
            left: center.x - width / 2.0,
            top: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn visual(&self) -> Visual {
        let center = self.center();
        match &self.geometry {
            Geometry::Linear(line) => {
                let place = |p: Point| {
                    let scaled = Point::new(p.x * self.scale_x, p.y * self.scale_y);
                    let rotated = util::rotate(scaled, self.angle);
                    center.offset(rotated.x, rotated.y)
                };
                let [a, b] = line.points();
                Visual::Segment {
                    start: place(a),
                    end: place(b),
                }
            }
            Geometry::Solid => {
                let (width, height) = self.scaled_size();
                Visual::Body {
                    center,
                    width,
                    height,
                    angle: self.angle,
                }
            }
        }
    }

    /// Moves the second endpoint of a linear shape and refits the box.
    ///
    /// Returns `false` for solid shapes.
    pub fn set_line_end(&mut self, p: Point) -> bool {
        let Geometry::Linear(line) = &mut self.geometry else {
            return false;
        };
        line.x2 = p.x;
        line.y2 = p.y;
        line.refresh_points();
        self.fit_box_to_line();
        true
    }

    fn fit_box_to_line(&mut self) {
        let Geometry::Linear(line) = &self.geometry else {
            return;
        };
        self.width = (line.x2 - line.x1).abs();
        self.height = (line.y2 - line.y1).abs();
        match self.origin {
            Origin::TopLeft => {
                self.left = line.x1.min(line.x2);
                self.top = line.y1.min(line.y2);
            }
            Origin::Center => {
                self.left = (line.x1 + line.x2) / 2.0;
                self.top = (line.y1 + line.y2) / 2.0;
            }
        }
    }

    /// Sizes a solid shape as the box spanned by `anchor` and `pointer`.
    ///
    /// A zero delta on either axis leaves the shape untouched and returns
    /// `false`, as does calling this on a linear shape.
    pub fn resize_from_anchor(&mut self, anchor: Point, pointer: Point) -> bool {
        if self.family() != ShapeFamily::Solid {
            return false;
        }
        if pointer.x == anchor.x || pointer.y == anchor.y {
            return false;
        }
        let (left, width) = util::normalize_span(anchor.x, pointer.x);
        let (top, height) = util::normalize_span(anchor.y, pointer.y);
        self.left = left;
        self.top = top;
        self.width = width;
        self.height = height;
        true
    }

    /// Grows a degenerate solid shape to at least `min` on each axis.
    pub fn ensure_min_size(&mut self, min: f64) {
        if self.family() == ShapeFamily::Solid {
            self.width = self.width.max(min);
            self.height = self.height.max(min);
        }
    }

    /// Re-anchors `left`/`top` on the center without moving the shape.
    pub fn set_origin_center(&mut self) {
        if self.origin == Origin::Center {
            return;
        }
        let center = self.center();
        self.origin = Origin::Center;
        self.left = center.x;
        self.top = center.y;
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.left += dx;
        self.top += dy;
        if let Geometry::Linear(line) = &mut self.geometry {
            line.x1 += dx;
            line.y1 += dy;
            line.x2 += dx;
            line.y2 += dy;
        }
    }

    /// Returns a copy with the scale factors folded into size and endpoints.
    ///
    /// The copy has `scale_x == scale_y == 1` and the same [`Visual`].
    pub fn baked(&self) -> Shape {
        let mut out = self.clone();
        let center = self.center();
        let (width, height) = self.scaled_size();

        if let Geometry::Linear(line) = &mut out.geometry {
            let [a, b] = line.points();
            let place =
                |p: Point| Point::new(center.x + p.x * self.scale_x, center.y + p.y * self.scale_y);
            let (start, end) = (place(a), place(b));
            *line = LineGeometry::new(start.x, start.y, end.x, end.y);
        }

        out.width = width;
        out.height = height;
        out.scale_x = 1.0;
        out.scale_y = 1.0;
        match out.origin {
            Origin::TopLeft => {
                out.left = center.x - width / 2.0;
                out.top = center.y - height / 2.0;
            }
            Origin::Center => {
                out.left = center.x;
                out.top = center.y;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Shape {
        let mut shape = Shape::provisional(1, ShapeKind::Line, Point::new(x1, y1), Style::default());
        shape.set_line_end(Point::new(x2, y2));
        shape
    }

    #[test]
    fn kind_families() {
        assert_eq!(ShapeKind::Line.family(), ShapeFamily::Linear);
        assert_eq!(ShapeKind::Arrow.family(), ShapeFamily::Linear);
        assert_eq!(ShapeKind::Rectangle.family(), ShapeFamily::Solid);
        assert_eq!(ShapeKind::Ellipse.family(), ShapeFamily::Solid);
        assert_eq!(ShapeKind::Diamond.family(), ShapeFamily::Solid);
    }

    #[test]
    fn provisional_arrow_has_end_marker() {
        let arrow = Shape::provisional(7, ShapeKind::Arrow, Point::new(1.0, 2.0), Style::default());
        assert!(arrow.drawing);
        assert!(arrow.arrowheads.end);
        assert!(!arrow.arrowheads.start);
        assert_eq!(arrow.width, 0.0);
        assert_eq!(arrow.line().map(|l| l.start()), Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn resize_from_anchor_up_and_left_keeps_positive_size() {
        let mut rect =
            Shape::provisional(1, ShapeKind::Rectangle, Point::new(50.0, 50.0), Style::default());
        assert!(rect.resize_from_anchor(Point::new(50.0, 50.0), Point::new(20.0, 20.0)));
        assert_eq!(
            (rect.left, rect.top, rect.width, rect.height),
            (20.0, 20.0, 30.0, 30.0)
        );
    }

    #[test]
    fn resize_from_anchor_ignores_zero_delta_axis() {
        let mut rect =
            Shape::provisional(1, ShapeKind::Rectangle, Point::new(10.0, 10.0), Style::default());
        assert!(rect.resize_from_anchor(Point::new(10.0, 10.0), Point::new(30.0, 40.0)));
        assert!(!rect.resize_from_anchor(Point::new(10.0, 10.0), Point::new(10.0, 60.0)));
        assert_eq!((rect.width, rect.height), (20.0, 30.0));
    }

    #[test]
    fn line_box_is_derived_from_endpoints() {
        let shape = line(30.0, 5.0, 10.0, 25.0);
        assert_eq!(
            (shape.left, shape.top, shape.width, shape.height),
            (10.0, 5.0, 20.0, 20.0)
        );
        match shape.visual() {
            Visual::Segment { start, end } => {
                assert!(util::approx_eq(start.x, 30.0) && util::approx_eq(start.y, 5.0));
                assert!(util::approx_eq(end.x, 10.0) && util::approx_eq(end.y, 25.0));
            }
            other => panic!("expected segment, got {other:?}"),
        }
    }

    #[test]
    fn set_origin_center_does_not_move_shape() {
        let mut rect =
            Shape::provisional(1, ShapeKind::Ellipse, Point::new(0.0, 0.0), Style::default());
        rect.resize_from_anchor(Point::new(0.0, 0.0), Point::new(40.0, 20.0));
        let before = rect.visual();
        rect.set_origin_center();
        assert_eq!(rect.origin, Origin::Center);
        assert_eq!((rect.left, rect.top), (20.0, 10.0));
        assert!(rect.visual().approx_eq(&before));
    }

    #[test]
    fn baked_preserves_visual_for_scaled_rotated_line() {
        let mut shape = line(0.0, 10.0, 10.0, 0.0);
        shape.set_origin_center();
        shape.scale_x = 2.5;
        shape.scale_y = 0.5;
        shape.angle = 33.0;
        let baked = shape.baked();
        assert_eq!((baked.scale_x, baked.scale_y), (1.0, 1.0));
        assert!(baked.visual().approx_eq(&shape.visual()));
    }

    #[test]
    fn baked_preserves_visual_for_top_left_solid() {
        let mut rect =
            Shape::provisional(1, ShapeKind::Diamond, Point::new(5.0, 5.0), Style::default());
        rect.resize_from_anchor(Point::new(5.0, 5.0), Point::new(25.0, 15.0));
        rect.scale_x = 3.0;
        rect.scale_y = 2.0;
        let baked = rect.baked();
        assert_eq!((baked.width, baked.height), (60.0, 20.0));
        assert!(baked.visual().approx_eq(&rect.visual()));
    }

    #[test]
    fn translate_moves_endpoints_with_box() {
        let mut shape = line(0.0, 0.0, 10.0, 0.0);
        shape.translate(5.0, 5.0);
        let geometry = shape.line().copied();
        assert_eq!(geometry.map(|l| (l.x1, l.y1, l.x2, l.y2)), Some((5.0, 5.0, 15.0, 5.0)));
        assert_eq!((shape.left, shape.top), (5.0, 5.0));
    }

    #[test]
    fn ensure_min_size_only_grows_solids() {
        let mut rect =
            Shape::provisional(1, ShapeKind::Rectangle, Point::new(0.0, 0.0), Style::default());
        rect.ensure_min_size(1.0);
        assert_eq!((rect.width, rect.height), (1.0, 1.0));

        let mut seg = line(0.0, 0.0, 0.0, 0.0);
        seg.ensure_min_size(1.0);
        assert_eq!((seg.width, seg.height), (0.0, 0.0));
    }
}
