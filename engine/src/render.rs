use std::f64::consts::TAU;

use kurbo::{Affine, Point};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Path2d};

use crate::engine::CrosshairEditor;
use crate::geometry::document_to_overlay;
use crate::objects::{Element, Node, Shape, Style};

const SELECTION_COLOR: &str = "#4facfe";
const GUIDE_COLOR: &str = "#ff3b80";
const HANDLE_SIZE_PX: f64 = 8.0;

fn paints(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && v != "none" && v != "transparent"
}

fn set_affine(ctx: &CanvasRenderingContext2d, affine: Affine) -> Result<(), JsValue> {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    ctx.set_transform(a, b, c, d, e, f)
}

fn apply_style(ctx: &CanvasRenderingContext2d, style: &Style) {
    ctx.set_global_alpha(style.opacity.unwrap_or(1.0).clamp(0.0, 1.0));
    ctx.set_fill_style_str(&style.fill);
    ctx.set_stroke_style_str(&style.stroke);
    ctx.set_line_width(style.stroke_width);
    ctx.set_line_cap(style.line_cap.as_deref().unwrap_or("butt"));
    ctx.set_line_join(style.line_join.as_deref().unwrap_or("miter"));
}

fn render_element(ctx: &CanvasRenderingContext2d, element: &Element) -> Result<(), JsValue> {
    let style = &element.style;
    let fill = paints(&style.fill);
    let stroke = paints(&style.stroke) && style.stroke_width > 0.0;
    apply_style(ctx, style);
    match &element.shape {
        Shape::Path { d } => {
            let path = Path2d::new_with_path_string(d)?;
            if fill {
                ctx.fill_with_path_2d(&path);
            }
            if stroke {
                ctx.stroke_with_path(&path);
            }
            return Ok(());
        }
        Shape::Rect { x, y, width, height } => {
            ctx.begin_path();
            ctx.rect(*x, *y, *width, *height);
        }
        Shape::Circle { cx, cy, r } => {
            ctx.begin_path();
            ctx.ellipse(*cx, *cy, *r, *r, 0.0, 0.0, TAU)?;
        }
        Shape::Ellipse { cx, cy, rx, ry } => {
            ctx.begin_path();
            ctx.ellipse(*cx, *cy, *rx, *ry, 0.0, 0.0, TAU)?;
        }
        Shape::Line { x1, y1, x2, y2 } => {
            ctx.begin_path();
            ctx.move_to(*x1, *y1);
            ctx.line_to(*x2, *y2);
            if stroke {
                ctx.stroke();
            }
            return Ok(());
        }
    }
    if fill {
        ctx.fill();
    }
    if stroke {
        ctx.stroke();
    }
    Ok(())
}

#[wasm_bindgen]
impl CrosshairEditor {
    /// Draws visible layers bottom to top, then the selection overlay and
    /// any active snap guides.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        let viewport = self.core.viewport();
        ctx.save();
        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        ctx.clear_rect(0.0, 0.0, viewport.width, viewport.height);

        let to_screen = self.core.view().to_screen(viewport);
        for layer in self.core.document().layers().iter().filter(|l| l.visible) {
            for node in &layer.nodes {
                let element = node.element();
                set_affine(ctx, to_screen * combined_affine(node))?;
                if let Err(e) = render_element(ctx, element) {
                    log::warn!("could not draw {}: {:?}", element.id, e);
                }
            }
        }

        ctx.set_global_alpha(1.0);
        self.render_overlay(ctx)?;
        ctx.restore();
        Ok(())
    }

    fn render_overlay(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        let viewport = self.core.viewport();
        let overlay_view = self.core.overlay_view();
        let to_screen = overlay_view.to_screen(viewport);
        let scale = overlay_view.pixel_scale(viewport);
        set_affine(ctx, to_screen)?;

        if let Some(snap) = self.core.snap_indicators() {
            let to_overlay = document_to_overlay(&self.core.view(), &overlay_view, viewport);
            let area = overlay_view.to_rect();
            ctx.save();
            ctx.set_stroke_style_str(GUIDE_COLOR);
            ctx.set_line_width(1.0 / scale);
            ctx.begin_path();
            if let Some(x) = snap.vertical {
                let x = (to_overlay * Point::new(x, 0.0)).x;
                ctx.move_to(x, area.y0);
                ctx.line_to(x, area.y1);
            }
            if let Some(y) = snap.horizontal {
                let y = (to_overlay * Point::new(0.0, y)).y;
                ctx.move_to(area.x0, y);
                ctx.line_to(area.x1, y);
            }
            ctx.stroke();
            ctx.restore();
        }

        let Some(overlay) = self.core.selection_overlay() else { return Ok(()) };
        ctx.save();
        ctx.set_stroke_style_str(SELECTION_COLOR);
        ctx.set_line_width(1.5 / scale);
        let dash = js_sys::Array::new();
        dash.push(&JsValue::from_f64(4.0 / scale));
        dash.push(&JsValue::from_f64(4.0 / scale));
        ctx.set_line_dash(&dash)?;
        ctx.begin_path();
        let [first, rest @ ..] = overlay.outline;
        ctx.move_to(first.x, first.y);
        for p in rest {
            ctx.line_to(p.x, p.y);
        }
        ctx.close_path();
        ctx.stroke();

        ctx.set_line_dash(&js_sys::Array::new())?;
        ctx.set_fill_style_str("#ffffff");
        ctx.set_line_width(1.0 / scale);
        let size = HANDLE_SIZE_PX / scale;
        for (_, at) in overlay.handles {
            ctx.begin_path();
            ctx.rect(at.x - size / 2.0, at.y - size / 2.0, size, size);
            ctx.fill();
            ctx.stroke();
        }
        ctx.restore();
        Ok(())
    }
}

fn combined_affine(node: &Node) -> Affine {
    node.combined_transform().to_affine()
}
