use kurbo::Point;

use crate::editor::{EditorCore, Gesture, Notice};
use crate::geometry::{ViewBox, Viewport};
use crate::types::Cursor;

/// Pan gesture context.
#[derive(Clone, Copy, Debug)]
pub struct PanState {
    pub start_screen: Point,
    pub start_view: ViewBox,
}

/// Where a zoom step keeps the content still.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomFocus {
    /// A screen position, e.g. under the cursor.
    Screen(Point),
    ViewportCenter,
}

/// View box of `base` at `zoom`, positioned so `focal` keeps its relative
/// place inside `current`.
pub fn zoomed_view(base: &ViewBox, current: &ViewBox, focal: Point, zoom: f64) -> ViewBox {
    let rx = (focal.x - current.x) / current.width;
    let ry = (focal.y - current.y) / current.height;
    let width = base.width / zoom;
    let height = base.height / zoom;
    ViewBox::new(focal.x - rx * width, focal.y - ry * height, width, height)
}

impl EditorCore {
    pub fn view(&self) -> ViewBox {
        self.doc.view
    }

    pub fn overlay_view(&self) -> ViewBox {
        self.overlay
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        let viewport = Viewport::new(width, height);
        if viewport != self.viewport {
            self.viewport = viewport;
            self.request_render();
        }
    }

    /// Explicit pan mode, as an alternative to holding space.
    pub fn set_pan_mode(&mut self, enabled: bool) {
        self.pan_mode = enabled;
        self.refresh_cursor();
    }

    pub(crate) fn sync_overlay(&mut self) {
        self.overlay = self.doc.view;
    }

    pub(crate) fn begin_pan(&mut self, screen: Point) {
        self.gesture = Gesture::Pan(PanState { start_screen: screen, start_view: self.doc.view });
        self.set_cursor(Cursor::Grabbing);
    }

    /// Moves the view by the pointer travel, converted at the view's scale so
    /// content follows the pointer at any zoom.
    pub(crate) fn update_pan(&mut self, state: &PanState, screen: Point) {
        let scale = state.start_view.pixel_scale(self.viewport);
        let dx = (state.start_screen.x - screen.x) / scale;
        let dy = (state.start_screen.y - screen.y) / scale;
        self.doc.view = ViewBox { x: state.start_view.x + dx, y: state.start_view.y + dy, ..state.start_view };
        self.sync_overlay();
        self.request_render();
    }

    /// Sets the zoom factor, clamped, keeping `focus` stationary on screen.
    pub fn set_zoom(&mut self, zoom: f64, focus: ZoomFocus) -> bool {
        let zoom = self.config.clamp_zoom(zoom);
        if !zoom.is_finite() || (zoom - self.zoom).abs() < 1e-12 {
            return false;
        }
        let screen = match focus {
            ZoomFocus::Screen(p) => p,
            ZoomFocus::ViewportCenter => Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0),
        };
        let focal = self.screen_to_document(screen);
        self.doc.view = zoomed_view(&self.base_view, &self.doc.view, focal, zoom);
        self.zoom = zoom;
        self.sync_overlay();
        log::debug!("zoom {:.3}", zoom);
        self.emit(Notice::ZoomChanged { zoom });
        self.request_render();
        true
    }

    pub fn zoom_in(&mut self, focus: ZoomFocus) -> bool {
        self.set_zoom(self.zoom * self.config.zoom_step, focus)
    }

    pub fn zoom_out(&mut self, focus: ZoomFocus) -> bool {
        self.set_zoom(self.zoom / self.config.zoom_step, focus)
    }

    fn pointer_focus(&self) -> ZoomFocus {
        self.last_pointer.map(ZoomFocus::Screen).unwrap_or(ZoomFocus::ViewportCenter)
    }

    pub(crate) fn zoom_in_at_pointer(&mut self) -> bool {
        self.zoom_in(self.pointer_focus())
    }

    pub(crate) fn zoom_out_at_pointer(&mut self) -> bool {
        self.zoom_out(self.pointer_focus())
    }

    /// One wheel tick; negative `delta_y` zooms in.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) -> bool {
        self.last_pointer = Some(screen);
        if delta_y < 0.0 {
            self.zoom_in(ZoomFocus::Screen(screen))
        } else if delta_y > 0.0 {
            self.zoom_out(ZoomFocus::Screen(screen))
        } else {
            false
        }
    }

    pub fn reset_zoom(&mut self) {
        self.doc.view = self.base_view;
        self.zoom = 1.0;
        self.sync_overlay();
        self.emit(Notice::ZoomChanged { zoom: 1.0 });
        self.request_render();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Modifiers, PointerButton};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zoom_keeps_focal_point_in_place() {
        let mut editor = EditorCore::default();
        let focus = Point::new(128.0, 384.0);
        let before = editor.screen_to_document(focus);
        assert!(editor.zoom_in(ZoomFocus::Screen(focus)));
        let after = editor.screen_to_document(focus);
        assert!(close(before.x, after.x) && close(before.y, after.y));
        assert!(close(editor.view().width, 512.0 / 1.125));
        assert_eq!(editor.overlay_view(), editor.view());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut editor = EditorCore::default();
        for _ in 0..100 {
            editor.zoom_in(ZoomFocus::ViewportCenter);
        }
        assert_eq!(editor.zoom(), 10.0);
        assert!(!editor.zoom_in(ZoomFocus::ViewportCenter));
        for _ in 0..200 {
            editor.zoom_out(ZoomFocus::ViewportCenter);
        }
        assert_eq!(editor.zoom(), 0.1);
    }

    #[test]
    fn pan_follows_pointer_at_current_scale() {
        let mut editor = EditorCore::default();
        editor.set_zoom(2.0, ZoomFocus::Screen(Point::ZERO));
        editor.key_down(" ", Modifiers::NONE).unwrap();
        editor.pointer_down(Point::new(100.0, 100.0), PointerButton::Primary, Modifiers::NONE).unwrap();
        editor.pointer_move(Point::new(60.0, 120.0), Modifiers::NONE).unwrap();
        editor.pointer_up(Point::new(60.0, 120.0)).unwrap();
        editor.key_up(" ");
        // 2 px per unit: 40 px left is 20 units right, 20 px down is 10 units up
        assert!(close(editor.view().x, 20.0));
        assert!(close(editor.view().y, -10.0));
        assert_eq!(editor.overlay_view(), editor.view());
    }
}
