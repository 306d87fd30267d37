//! Coordinate spaces and the translate+scale transform record.
//!
//! Three spaces are involved while editing:
//! - screen: canvas pixels, origin at the canvas' top-left corner;
//! - document: the user space of the drawing, framed by the current [`ViewBox`];
//! - overlay: the user space of the transparent layer that carries selection
//!   outlines, handles and guides. Its view box is kept equal to the document's,
//!   so the two only diverge while a host is mid-update.
//!
//! View boxes are fitted into the canvas with `xMinYMin meet` semantics.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Serialize, Deserialize};

use crate::error::LoadError;

const EPSILON: f64 = 1e-9;

/// Element or wrapper transform limited to translation and axis scale.
///
/// Maps a local point `p` to `(tx + sx * p.x, ty + sy * p.y)`, which is what
/// `translate(tx, ty) scale(sx, sy)` means in SVG.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct Transform {
    pub tx: f64,
    pub ty: f64,
    pub sx: f64,
    pub sy: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform { tx: 0.0, ty: 0.0, sx: 1.0, sy: 1.0 };

    pub fn translate(tx: f64, ty: f64) -> Self {
        Transform { tx, ty, ..Self::IDENTITY }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Transform { sx, sy, ..Self::IDENTITY }
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.tx, self.ty)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// `self` followed by `outer`.
    pub fn then(self, outer: Transform) -> Transform {
        Transform {
            tx: outer.tx + outer.sx * self.tx,
            ty: outer.ty + outer.sy * self.ty,
            sx: outer.sx * self.sx,
            sy: outer.sy * self.sy,
        }
    }

    pub fn translated(self, delta: Vec2) -> Transform {
        Transform { tx: self.tx + delta.x, ty: self.ty + delta.y, ..self }
    }

    /// Scales about `anchor`, so points keep their offset to the anchor
    /// multiplied by `(kx, ky)`.
    pub fn scaled_about(self, anchor: Point, kx: f64, ky: f64) -> Transform {
        Transform {
            tx: anchor.x + (self.tx - anchor.x) * kx,
            ty: anchor.y + (self.ty - anchor.y) * ky,
            sx: self.sx * kx,
            sy: self.sy * ky,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.tx + self.sx * p.x, self.ty + self.sy * p.y)
    }

    pub fn apply_rect(&self, r: Rect) -> Rect {
        Rect::from_points(self.apply(Point::new(r.x0, r.y0)), self.apply(Point::new(r.x1, r.y1)))
    }

    pub fn inverse(&self) -> Option<Transform> {
        if self.sx.abs() < EPSILON || self.sy.abs() < EPSILON {
            return None;
        }
        Some(Transform {
            tx: -self.tx / self.sx,
            ty: -self.ty / self.sy,
            sx: 1.0 / self.sx,
            sy: 1.0 / self.sy,
        })
    }

    pub fn to_affine(&self) -> Affine {
        Affine::new([self.sx, 0.0, 0.0, self.sy, self.tx, self.ty])
    }

    /// Decomposes an affine map; `None` when it rotates or skews.
    pub fn from_affine(affine: Affine) -> Option<Transform> {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        if b.abs() > EPSILON || c.abs() > EPSILON {
            return None;
        }
        Some(Transform { tx: e, ty: f, sx: a, sy: d })
    }

    pub fn to_svg(&self) -> String {
        if self.sx == 1.0 && self.sy == 1.0 {
            format!("translate({}, {})", self.tx, self.ty)
        } else {
            format!("translate({}, {}) scale({}, {})", self.tx, self.ty, self.sx, self.sy)
        }
    }

    /// Reads an SVG transform list such as `translate(10 20) scale(2)`.
    ///
    /// Only translate, scale, zero-angle rotate and axis-aligned `matrix`
    /// entries are representable.
    pub fn parse_svg(list: &str) -> Result<Transform, LoadError> {
        let mut result = Transform::IDENTITY;
        for chunk in list.split(')') {
            let chunk = chunk.trim().trim_start_matches(',').trim();
            if chunk.is_empty() {
                continue;
            }
            let (name, args) = chunk
                .split_once('(')
                .ok_or_else(|| LoadError::UnsupportedTransform(list.to_string()))?;
            let args = parse_number_list(args)?;
            let step = match (name.trim(), args.as_slice()) {
                ("translate", [x]) => Transform::translate(*x, 0.0),
                ("translate", [x, y]) => Transform::translate(*x, *y),
                ("scale", [s]) => Transform::scale(*s, *s),
                ("scale", [x, y]) => Transform::scale(*x, *y),
                ("rotate", [angle, ..]) if angle.abs() < EPSILON => Transform::IDENTITY,
                ("matrix", [a, b, c, d, e, f]) => Transform::from_affine(Affine::new([*a, *b, *c, *d, *e, *f]))
                    .ok_or_else(|| LoadError::UnsupportedTransform(list.to_string()))?,
                _ => return Err(LoadError::UnsupportedTransform(list.to_string())),
            };
            // Entries apply right-to-left.
            result = step.then(result);
        }
        Ok(result)
    }
}

pub(crate) fn parse_number_list(text: &str) -> Result<Vec<f64>, LoadError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().map_err(|_| LoadError::InvalidNumber(s.to_string())))
        .collect()
}

/// Parses an SVG length, ignoring a trailing `px`.
pub(crate) fn parse_length(text: &str) -> Result<f64, LoadError> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed);
    trimmed.trim().parse::<f64>().map_err(|_| LoadError::InvalidNumber(text.to_string()))
}

/// Logical view rectangle of the drawing surface.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        ViewBox { x, y, width, height }
    }

    pub fn parse(text: &str) -> Result<Self, LoadError> {
        match parse_number_list(text)?.as_slice() {
            [x, y, w, h] if *w > 0.0 && *h > 0.0 => Ok(ViewBox::new(*x, *y, *w, *h)),
            _ => Err(LoadError::InvalidViewBox(text.to_string())),
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn to_attr(&self) -> String {
        format!("{} {} {} {}", self.x, self.y, self.width, self.height)
    }

    /// Screen pixels per user unit when fitted into `viewport`.
    pub fn pixel_scale(&self, viewport: Viewport) -> f64 {
        if !viewport.is_sized() || self.width <= 0.0 || self.height <= 0.0 {
            return 1.0;
        }
        (viewport.width / self.width).min(viewport.height / self.height)
    }

    pub fn to_screen(&self, viewport: Viewport) -> Affine {
        Affine::scale(self.pixel_scale(viewport)) * Affine::translate((-self.x, -self.y))
    }

    pub fn from_screen(&self, viewport: Viewport) -> Affine {
        self.to_screen(viewport).inverse()
    }
}

/// Pixel size of the canvas the view box is fitted into.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }

    pub fn is_sized(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Document space to overlay space through the screen.
pub fn document_to_overlay(document: &ViewBox, overlay: &ViewBox, viewport: Viewport) -> Affine {
    overlay.from_screen(viewport) * document.to_screen(viewport)
}

/// Rejects boxes that cannot take part in bounds or guide computations.
pub fn is_usable_bounds(rect: &Rect) -> bool {
    let finite = rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite();
    finite && (rect.width() > 0.0 || rect.height() > 0.0)
}

pub fn union_bounds<I: IntoIterator<Item = Rect>>(rects: I) -> Option<Rect> {
    rects
        .into_iter()
        .filter(is_usable_bounds)
        .reduce(|acc, r| acc.union(r))
}

/// The four corners of `rect` mapped through `affine`.
pub fn transformed_corners(affine: Affine, rect: Rect) -> [Point; 4] {
    [
        affine * Point::new(rect.x0, rect.y0),
        affine * Point::new(rect.x1, rect.y0),
        affine * Point::new(rect.x1, rect.y1),
        affine * Point::new(rect.x0, rect.y1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn composition_matches_sequential_application() {
        let inner = Transform { tx: 5.0, ty: -2.0, sx: 2.0, sy: 3.0 };
        let outer = Transform { tx: 1.0, ty: 1.0, sx: 0.5, sy: 2.0 };
        let p = Point::new(7.0, 11.0);
        let expected = outer.apply(inner.apply(p));
        let got = inner.then(outer).apply(p);
        assert!(close(got.x, expected.x) && close(got.y, expected.y));
    }

    #[test]
    fn affine_round_trip_rejects_rotation() {
        let t = Transform { tx: 3.0, ty: 4.0, sx: 2.0, sy: 0.5 };
        assert_eq!(Transform::from_affine(t.to_affine()), Some(t));
        assert_eq!(Transform::from_affine(Affine::rotate(0.3)), None);
    }

    #[test]
    fn scaled_about_keeps_anchor_fixed() {
        let t = Transform::translate(40.0, 10.0);
        let anchor = Point::new(10.0, 10.0);
        let scaled = t.scaled_about(anchor, 2.0, 3.0);
        // the local origin sat 30 units right of the anchor
        assert!(close(scaled.tx, 70.0));
        assert!(close(scaled.ty, 10.0));
        assert!(close(scaled.sx, 2.0) && close(scaled.sy, 3.0));
    }

    #[test]
    fn parses_transform_lists() {
        let t = Transform::parse_svg("translate(10, 20) scale(2)").unwrap();
        assert_eq!(t, Transform { tx: 10.0, ty: 20.0, sx: 2.0, sy: 2.0 });

        let t = Transform::parse_svg("scale(2) translate(10 20)").unwrap();
        assert_eq!(t, Transform { tx: 20.0, ty: 40.0, sx: 2.0, sy: 2.0 });

        let t = Transform::parse_svg("matrix(1 0 0 1 5 6)").unwrap();
        assert_eq!(t, Transform::translate(5.0, 6.0));

        assert!(Transform::parse_svg("rotate(45)").is_err());
        assert!(Transform::parse_svg("skewX(10)").is_err());
    }

    #[test]
    fn screen_round_trip_with_meet_fitting() {
        let view = ViewBox::new(100.0, 50.0, 200.0, 100.0);
        let viewport = Viewport::new(800.0, 800.0);
        // width limits: 4 px per unit
        assert!(close(view.pixel_scale(viewport), 4.0));
        let screen = view.to_screen(viewport) * Point::new(150.0, 75.0);
        assert!(close(screen.x, 200.0) && close(screen.y, 100.0));
        let back = view.from_screen(viewport) * screen;
        assert!(close(back.x, 150.0) && close(back.y, 75.0));
    }

    #[test]
    fn union_skips_degenerate_boxes() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(5.0, 5.0, 5.0, 5.0),
            Rect::new(f64::NAN, 0.0, 1.0, 1.0),
            Rect::new(20.0, 0.0, 30.0, 0.0),
        ];
        assert_eq!(union_bounds(rects), Some(Rect::new(0.0, 0.0, 30.0, 10.0)));
        assert_eq!(union_bounds([Rect::new(1.0, 1.0, 1.0, 1.0)]), None);
    }
}
