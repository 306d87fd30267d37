use std::fmt;

use serde::{Serialize, Deserialize};
use kurbo::{BezPath, Point, Rect, Shape as _};

use crate::geometry::Transform;
use crate::types::ElementKind;

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Paint attributes carried explicitly by every element.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Style {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_cap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_join: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Style {
    pub fn new(fill: &str, stroke: &str, stroke_width: f64) -> Self {
        Style {
            fill: fill.to_string(),
            stroke: stroke.to_string(),
            stroke_width,
            line_cap: None,
            line_join: None,
            opacity: None,
        }
    }

    /// Style for open curves: no fill, rounded ends.
    pub fn for_path(base: &Style) -> Self {
        Style {
            fill: "none".to_string(),
            line_cap: Some("round".to_string()),
            line_join: Some("round".to_string()),
            ..base.clone()
        }
    }

    fn push_svg_attrs(&self, attrs: &mut Vec<String>) {
        attrs.push(format!(r#"fill="{}""#, escape_attr(&self.fill)));
        attrs.push(format!(r#"stroke="{}""#, escape_attr(&self.stroke)));
        attrs.push(format!(r#"stroke-width="{}""#, self.stroke_width));
        if let Some(cap) = &self.line_cap {
            attrs.push(format!(r#"stroke-linecap="{}""#, escape_attr(cap)));
        }
        if let Some(join) = &self.line_join {
            attrs.push(format!(r#"stroke-linejoin="{}""#, escape_attr(join)));
        }
        if let Some(opacity) = self.opacity {
            attrs.push(format!(r#"opacity="{}""#, opacity));
        }
    }
}

/// Intrinsic geometry of an element, in its local coordinates.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Circle { cx: f64, cy: f64, r: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// SVG path data; drawn paths hold one quadratic segment.
    Path { d: String },
}

impl Shape {
    pub fn kind(&self) -> ElementKind {
        match self {
            Shape::Rect { .. } => ElementKind::Rect,
            Shape::Circle { .. } => ElementKind::Circle,
            Shape::Ellipse { .. } => ElementKind::Ellipse,
            Shape::Line { .. } => ElementKind::Line,
            Shape::Path { .. } => ElementKind::Path,
        }
    }

    /// Zero-size shape of `kind` anchored at `p`.
    pub fn empty_at(kind: ElementKind, p: Point) -> Shape {
        match kind {
            ElementKind::Rect => Shape::Rect { x: p.x, y: p.y, width: 0.0, height: 0.0 },
            ElementKind::Circle => Shape::Circle { cx: p.x, cy: p.y, r: 0.0 },
            ElementKind::Ellipse => Shape::Ellipse { cx: p.x, cy: p.y, rx: 0.0, ry: 0.0 },
            ElementKind::Line => Shape::Line { x1: p.x, y1: p.y, x2: p.x, y2: p.y },
            ElementKind::Path => Shape::Path { d: format!("M {} {}", p.x, p.y) },
        }
    }

    pub fn quad_path(start: Point, control: Point, end: Point) -> Shape {
        Shape::Path {
            d: format!("M {} {} Q {} {} {} {}", start.x, start.y, control.x, control.y, end.x, end.y),
        }
    }

    /// Geometric bounds in local coordinates, stroke excluded.
    pub fn local_bounds(&self) -> Option<Rect> {
        match self {
            Shape::Rect { x, y, width, height } => Some(Rect::new(*x, *y, x + width, y + height)),
            Shape::Circle { cx, cy, r } => Some(Rect::new(cx - r, cy - r, cx + r, cy + r)),
            Shape::Ellipse { cx, cy, rx, ry } => Some(Rect::new(cx - rx, cy - ry, cx + rx, cy + ry)),
            Shape::Line { x1, y1, x2, y2 } => Some(Rect::from_points((*x1, *y1), (*x2, *y2))),
            Shape::Path { d } => {
                let path = BezPath::from_svg(d).ok()?;
                // a lone moveto has no extent
                path.segments().next()?;
                Some(path.bounding_box())
            }
        }
    }

    /// Rewrites a drag-to-draw shape so it spans from `start` to `current`.
    pub fn span(&mut self, start: Point, current: Point) {
        let dx = current.x - start.x;
        let dy = current.y - start.y;
        match self {
            Shape::Rect { x, y, width, height } => {
                *x = if dx > 0.0 { start.x } else { current.x };
                *y = if dy > 0.0 { start.y } else { current.y };
                *width = dx.abs();
                *height = dy.abs();
            }
            Shape::Ellipse { cx, cy, rx, ry } => {
                *cx = start.x + dx / 2.0;
                *cy = start.y + dy / 2.0;
                *rx = dx.abs() / 2.0;
                *ry = dy.abs() / 2.0;
            }
            Shape::Circle { cx, cy, r } => {
                *cx = start.x + dx / 2.0;
                *cy = start.y + dy / 2.0;
                *r = dx.abs().max(dy.abs()) / 2.0;
            }
            Shape::Line { x2, y2, .. } => {
                *x2 = current.x;
                *y2 = current.y;
            }
            Shape::Path { .. } => {}
        }
    }

    /// Folds `t` into primitive geometry. Circles become ellipses since a
    /// single radius cannot carry an uneven scale. Returns false for paths,
    /// which are left untouched.
    pub fn bake(&mut self, t: &Transform) -> bool {
        match self {
            Shape::Rect { x, y, width, height } => {
                let r = t.apply_rect(Rect::new(*x, *y, *x + *width, *y + *height));
                *x = r.x0;
                *y = r.y0;
                *width = r.width().max(1.0);
                *height = r.height().max(1.0);
            }
            Shape::Ellipse { cx, cy, rx, ry } => {
                let c = t.apply(Point::new(*cx, *cy));
                *cx = c.x;
                *cy = c.y;
                *rx = (*rx * t.sx.abs()).max(0.5);
                *ry = (*ry * t.sy.abs()).max(0.5);
            }
            Shape::Circle { cx, cy, r } => {
                let c = t.apply(Point::new(*cx, *cy));
                *self = Shape::Ellipse {
                    cx: c.x,
                    cy: c.y,
                    rx: (*r * t.sx.abs()).max(0.5),
                    ry: (*r * t.sy.abs()).max(0.5),
                };
            }
            Shape::Line { x1, y1, x2, y2 } => {
                let a = t.apply(Point::new(*x1, *y1));
                let b = t.apply(Point::new(*x2, *y2));
                *x1 = a.x;
                *y1 = a.y;
                *x2 = b.x;
                *y2 = b.y;
            }
            Shape::Path { .. } => return false,
        }
        true
    }

    fn push_svg_attrs(&self, attrs: &mut Vec<String>) {
        match self {
            Shape::Rect { x, y, width, height } => {
                attrs.push(format!(r#"x="{}" y="{}" width="{}" height="{}""#, x, y, width, height));
            }
            Shape::Circle { cx, cy, r } => {
                attrs.push(format!(r#"cx="{}" cy="{}" r="{}""#, cx, cy, r));
            }
            Shape::Ellipse { cx, cy, rx, ry } => {
                attrs.push(format!(r#"cx="{}" cy="{}" rx="{}" ry="{}""#, cx, cy, rx, ry));
            }
            Shape::Line { x1, y1, x2, y2 } => {
                attrs.push(format!(r#"x1="{}" y1="{}" x2="{}" y2="{}""#, x1, y1, x2, y2));
            }
            Shape::Path { d } => {
                attrs.push(format!(r#"d="{}""#, escape_attr(d)));
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Element {
    pub id: NodeId,
    pub shape: Shape,
    pub style: Style,
    #[serde(default)]
    pub transform: Transform,
}

impl Element {
    pub fn new(id: NodeId, shape: Shape, style: Style) -> Self {
        Element { id, shape, style, transform: Transform::IDENTITY }
    }

    pub fn kind(&self) -> ElementKind {
        self.shape.kind()
    }

    pub fn to_svg_element(&self) -> String {
        let mut attrs = Vec::new();
        self.shape.push_svg_attrs(&mut attrs);
        self.style.push_svg_attrs(&mut attrs);
        if !self.transform.is_identity() {
            attrs.push(format!(r#"transform="{}""#, self.transform.to_svg()));
        }
        format!("<{} {} />", self.kind().tag(), attrs.join(" "))
    }
}

/// Transform-bearing container around exactly one element.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Wrapper {
    pub id: NodeId,
    pub transform: Transform,
    pub child: Element,
}

/// Top-level entry of a layer.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Wrapper(Wrapper),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Element(e) => e.id,
            Node::Wrapper(w) => w.id,
        }
    }

    /// True for the node itself or the element it wraps.
    pub fn owns(&self, id: NodeId) -> bool {
        match self {
            Node::Element(e) => e.id == id,
            Node::Wrapper(w) => w.id == id || w.child.id == id,
        }
    }

    /// The element that carries geometry and style.
    pub fn element(&self) -> &Element {
        match self {
            Node::Element(e) => e,
            Node::Wrapper(w) => &w.child,
        }
    }

    pub fn element_mut(&mut self) -> &mut Element {
        match self {
            Node::Element(e) => e,
            Node::Wrapper(w) => &mut w.child,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.element().kind()
    }

    pub fn is_wrapper(&self) -> bool {
        matches!(self, Node::Wrapper(_))
    }

    /// Transform owned by the node itself, the one drags and resizes edit.
    pub fn transform(&self) -> Transform {
        match self {
            Node::Element(e) => e.transform,
            Node::Wrapper(w) => w.transform,
        }
    }

    pub fn set_transform(&mut self, transform: Transform) {
        match self {
            Node::Element(e) => e.transform = transform,
            Node::Wrapper(w) => w.transform = transform,
        }
    }

    /// Element transform followed by the wrapper transform.
    pub fn combined_transform(&self) -> Transform {
        match self {
            Node::Element(e) => e.transform,
            Node::Wrapper(w) => w.child.transform.then(w.transform),
        }
    }

    /// Bounds in layer (document) coordinates.
    pub fn bounds(&self) -> Option<Rect> {
        let local = self.element().shape.local_bounds()?;
        Some(self.combined_transform().apply_rect(local))
    }

    /// Moves the element's own transform up onto a new wrapper.
    pub fn wrap(self, wrapper_id: NodeId) -> Node {
        match self {
            Node::Element(mut child) => {
                let transform = std::mem::take(&mut child.transform);
                Node::Wrapper(Wrapper { id: wrapper_id, transform, child })
            }
            wrapped @ Node::Wrapper(_) => wrapped,
        }
    }

    /// The bare element with any wrapper transform folded into it.
    pub fn flattened(&self) -> Element {
        let mut element = self.element().clone();
        element.transform = self.combined_transform();
        element
    }
}

pub(crate) fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(id: u32) -> Element {
        Element::new(NodeId(id), Shape::Rect { x: 10.0, y: 10.0, width: 40.0, height: 40.0 }, Style::new("#ff0000", "#000000", 2.0))
    }

    #[test]
    fn span_normalises_rectangles_drawn_backwards() {
        let mut shape = Shape::empty_at(ElementKind::Rect, Point::new(50.0, 50.0));
        shape.span(Point::new(50.0, 50.0), Point::new(10.0, 20.0));
        assert_eq!(shape, Shape::Rect { x: 10.0, y: 20.0, width: 40.0, height: 30.0 });
    }

    #[test]
    fn wrapping_moves_transform_to_wrapper() {
        let mut element = rect(1);
        element.transform = Transform::translate(5.0, 5.0);
        let node = Node::Element(element).wrap(NodeId(2));
        match &node {
            Node::Wrapper(w) => {
                assert_eq!(w.transform, Transform::translate(5.0, 5.0));
                assert!(w.child.transform.is_identity());
            }
            Node::Element(_) => panic!("expected a wrapper"),
        }
        assert_eq!(node.bounds(), Some(Rect::new(15.0, 15.0, 55.0, 55.0)));
        // wrapping again is a no-op
        let again = node.clone().wrap(NodeId(3));
        assert_eq!(again, node);
    }

    #[test]
    fn baking_a_circle_turns_it_into_an_ellipse() {
        let mut shape = Shape::Circle { cx: 10.0, cy: 10.0, r: 5.0 };
        assert!(shape.bake(&Transform { tx: 0.0, ty: 0.0, sx: 2.0, sy: 1.0 }));
        assert_eq!(shape, Shape::Ellipse { cx: 20.0, cy: 10.0, rx: 10.0, ry: 5.0 });
    }

    #[test]
    fn path_bounds_cover_the_curve() {
        let shape = Shape::quad_path(Point::new(0.0, 0.0), Point::new(50.0, 100.0), Point::new(100.0, 0.0));
        let bounds = shape.local_bounds().unwrap();
        assert_eq!(bounds.x0, 0.0);
        assert_eq!(bounds.x1, 100.0);
        assert!((bounds.y1 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn svg_markup_includes_style_and_transform() {
        let mut element = rect(1);
        element.transform = Transform::translate(10.0, 10.0);
        let svg = element.to_svg_element();
        assert!(svg.starts_with("<rect "));
        assert!(svg.contains(r#"width="40""#));
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains(r#"transform="translate(10, 10)""#));
    }
}
