use std::mem;

use kurbo::{Point, Vec2};

use crate::editor::{EditorCore, Gesture, Notice};
use crate::error::{EditorError, EditorResult};
use crate::geometry::{is_usable_bounds, Transform};
use crate::objects::{Element, Node, NodeId, Shape, Style};
use crate::snapping::{GuideSet, SmartGuides, SnapResult};
use crate::types::{Cursor, ElementKind, Modifiers, PointerButton, Tool};

/// Move gesture context, captured on pointer-down.
#[derive(Clone, Debug)]
pub struct DragState {
    /// Pointer position at drag start, document space.
    pub start: Point,
    /// Pre-drag transform of every dragged node.
    pub originals: Vec<(NodeId, Transform)>,
    pub guides: Option<SmartGuides>,
    /// Set once the first real move has been recorded in history.
    pub recorded: bool,
}

/// Three-click quadratic curve construction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PathBuilder {
    #[default]
    Idle,
    /// Start point placed, waiting for the end point.
    Started { id: NodeId, start: Point },
    /// End point placed; the control point follows the cursor.
    Bending { id: NodeId, start: Point, end: Point },
}

impl PathBuilder {
    pub fn step(&self) -> u8 {
        match self {
            PathBuilder::Idle => 0,
            PathBuilder::Started { .. } => 1,
            PathBuilder::Bending { .. } => 2,
        }
    }

    pub(crate) fn node(&self) -> Option<NodeId> {
        match self {
            PathBuilder::Idle => None,
            PathBuilder::Started { id, .. } | PathBuilder::Bending { id, .. } => Some(*id),
        }
    }
}

/// Control point that mirrors the cursor through the chord midpoint.
pub fn mirrored_control(start: Point, end: Point, cursor: Point) -> Point {
    let mid = start.midpoint(end);
    Point::new(2.0 * mid.x - cursor.x, 2.0 * mid.y - cursor.y)
}

impl EditorCore {
    pub fn screen_to_document(&self, screen: Point) -> Point {
        self.doc.view.from_screen(self.viewport) * screen
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.tool {
            return;
        }
        self.abandon_in_progress();
        self.tool = tool;
        log::debug!("tool: {}", tool.name());
        self.emit(Notice::ToolChanged { tool });
        self.refresh_cursor();
    }

    pub fn path_step(&self) -> u8 {
        self.path.step()
    }

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton, modifiers: Modifiers) -> EditorResult<()> {
        self.last_pointer = Some(screen);
        if self.is_gesture_active() {
            return Ok(());
        }
        if button == PointerButton::Middle || self.space_held || self.pan_mode {
            self.begin_pan(screen);
            return Ok(());
        }
        if button != PointerButton::Primary {
            return Ok(());
        }
        let p = self.screen_to_document(screen);
        match self.tool {
            Tool::Select => self.select_at(screen, p, modifiers),
            Tool::Path => self.path_click(p),
            tool => match tool.shape_kind() {
                Some(kind) => self.begin_drawing(kind, p),
                None => Ok(()),
            },
        }
    }

    pub fn pointer_move(&mut self, screen: Point, modifiers: Modifiers) -> EditorResult<()> {
        self.last_pointer = Some(screen);
        let p = self.screen_to_document(screen);
        match mem::take(&mut self.gesture) {
            Gesture::Drag(mut state) => {
                let result = self.update_drag(&mut state, p, modifiers);
                self.gesture = Gesture::Drag(state);
                result
            }
            Gesture::Resize(mut state) => {
                let result = self.update_resize(&mut state, screen);
                self.gesture = Gesture::Resize(state);
                result
            }
            Gesture::Draw { id, start } => {
                if let Some(node) = self.doc.node_mut(id) {
                    node.element_mut().shape.span(start, p);
                }
                self.gesture = Gesture::Draw { id, start };
                self.request_render();
                Ok(())
            }
            Gesture::Pan(state) => {
                self.update_pan(&state, screen);
                self.gesture = Gesture::Pan(state);
                Ok(())
            }
            Gesture::Idle => {
                if let PathBuilder::Bending { id, start, end } = self.path {
                    self.bend_path(id, start, end, p);
                }
                self.refresh_cursor();
                Ok(())
            }
        }
    }

    /// Ends the active gesture; releasing the pointer commits it.
    pub fn pointer_up(&mut self, screen: Point) -> EditorResult<()> {
        self.last_pointer = Some(screen);
        self.end_gesture();
        self.refresh_cursor();
        Ok(())
    }

    fn select_at(&mut self, screen: Point, p: Point, modifiers: Modifiers) -> EditorResult<()> {
        if let Some(corner) = self.handle_at_screen(screen) {
            self.begin_resize(corner);
            return Ok(());
        }
        let slop = self.config.hit_slop_px / self.doc.view.pixel_scale(self.viewport);
        let Some(id) = self.doc.hit_test(p, slop) else {
            if !modifiers.toggles_selection() {
                self.deselect();
            }
            return Ok(());
        };
        let layer = self.doc.layer_of(id).ok_or(EditorError::UnknownNode(id))?;
        if modifiers.toggles_selection() {
            match self.selection.toggle(id, layer) {
                Ok(true) => self.selection_changed(),
                Ok(false) => {
                    self.selection_changed();
                    return Ok(());
                }
                Err(err) => {
                    log::warn!("{}", err);
                    return Err(err);
                }
            }
        } else if !self.selection.contains(id) {
            self.selection.set(id, layer);
            self.selection_changed();
        }
        self.begin_drag(p);
        Ok(())
    }

    fn begin_drag(&mut self, start: Point) {
        let originals: Vec<(NodeId, Transform)> = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| self.doc.node(*id).map(|n| (*id, n.transform())))
            .collect();
        if originals.is_empty() {
            return;
        }
        let guides = self.collect_guides();
        log::debug!("drag start with {} node(s)", originals.len());
        self.gesture = Gesture::Drag(DragState { start, originals, guides, recorded: false });
        self.set_cursor(Cursor::Grabbing);
    }

    /// Guides from every visible node outside the selection, plus the
    /// document center, in overlay space.
    fn collect_guides(&self) -> Option<SmartGuides> {
        let start_box = self.selection_bounds()?;
        let to_overlay = self.document_to_overlay();
        let boxes: Vec<_> = self
            .doc
            .nodes()
            .filter(|(layer, node)| layer.visible && !self.selection.contains(node.id()))
            .filter_map(|(_, node)| node.bounds())
            .map(|b| Self::map_rect(to_overlay, b))
            .collect();
        let center = to_overlay * self.base_view.center();
        Some(SmartGuides {
            guides: GuideSet::collect(boxes, center),
            start_box,
            tolerance: self.config.snap_tolerance_px / self.overlay.pixel_scale(self.viewport),
        })
    }

    fn update_drag(&mut self, state: &mut DragState, p: Point, modifiers: Modifiers) -> EditorResult<()> {
        let to_overlay = self.document_to_overlay();
        let start_overlay = to_overlay * state.start;
        let raw = (to_overlay * p) - start_overlay;
        let snapped = match &state.guides {
            Some(guides) => guides.snap(raw, modifiers.suspends_snapping()),
            None => SnapResult::raw(raw),
        };
        let delta: Vec2 = (self.overlay_to_document() * (start_overlay + snapped.delta)) - state.start;
        if !state.recorded {
            if delta.hypot2() == 0.0 {
                return Ok(());
            }
            self.record_state()?;
            state.recorded = true;
        }
        for (id, original) in &state.originals {
            if let Some(node) = self.doc.node_mut(*id) {
                node.set_transform(original.translated(delta));
            }
        }
        self.snap = Some(snapped);
        self.request_render();
        Ok(())
    }

    fn begin_drawing(&mut self, kind: ElementKind, p: Point) -> EditorResult<()> {
        self.record_state()?;
        let id = self.doc.alloc_node_id();
        let element = Element::new(id, Shape::empty_at(kind, p), self.default_style.clone());
        self.doc.add_node_to_active_layer(Node::Element(element));
        self.gesture = Gesture::Draw { id, start: p };
        self.request_render();
        Ok(())
    }

    /// Keeps the drawn shape unless it never got any extent.
    pub(crate) fn finish_drawing(&mut self, id: NodeId) {
        let usable = self.doc.node(id).and_then(Node::bounds).map(|b| is_usable_bounds(&b)).unwrap_or(false);
        if !usable {
            log::debug!("discarding empty shape {}", id);
            self.doc.remove_node(id);
            self.request_render();
            return;
        }
        if let Err(err) = self.select(id) {
            log::warn!("could not select drawn shape: {}", err);
        }
        self.structure_changed();
    }

    fn path_click(&mut self, p: Point) -> EditorResult<()> {
        match self.path {
            PathBuilder::Idle => {
                self.record_state()?;
                let id = self.doc.alloc_node_id();
                let style = Style::for_path(&self.default_style);
                let element = Element::new(id, Shape::empty_at(ElementKind::Path, p), style);
                self.doc.add_node_to_active_layer(Node::Element(element));
                self.path = PathBuilder::Started { id, start: p };
            }
            PathBuilder::Started { id, start } => {
                self.bend_path(id, start, p, p);
                self.path = PathBuilder::Bending { id, start, end: p };
            }
            PathBuilder::Bending { id, start, end } => {
                self.bend_path(id, start, end, p);
                self.path = PathBuilder::Idle;
                if let Err(err) = self.select(id) {
                    log::warn!("could not select finished path: {}", err);
                }
                log::debug!("finished path {}", id);
                self.structure_changed();
            }
        }
        self.request_render();
        Ok(())
    }

    fn bend_path(&mut self, id: NodeId, start: Point, end: Point, cursor: Point) {
        let control = mirrored_control(start, end, cursor);
        if let Some(node) = self.doc.node_mut(id) {
            node.element_mut().shape = Shape::quad_path(start, control, end);
        }
        self.request_render();
    }

    /// Discards an unfinished path. Returns false when none was underway.
    pub fn cancel_path(&mut self) -> bool {
        let Some(id) = self.path.node() else { return false };
        self.doc.remove_node(id);
        self.path = PathBuilder::Idle;
        self.request_render();
        true
    }

    /// Escape: unfinished shapes first, then the selection.
    pub fn escape(&mut self) {
        if self.cancel_path() {
            return;
        }
        if let Gesture::Draw { id, .. } = self.gesture {
            self.gesture = Gesture::Idle;
            self.doc.remove_node(id);
            self.request_render();
            return;
        }
        self.deselect();
    }

    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> EditorResult<bool> {
        if key == " " || key == "Space" {
            if !self.space_held {
                self.space_held = true;
                self.refresh_cursor();
            }
            return Ok(true);
        }
        if self.renaming.is_some() {
            return Ok(false);
        }
        if modifiers.is_command() {
            let handled = match key.to_ascii_lowercase().as_str() {
                "=" | "+" => self.zoom_in_at_pointer(),
                "-" | "_" => self.zoom_out_at_pointer(),
                "c" => self.copy()?,
                "x" => self.cut()?,
                "v" => self.paste()?,
                "z" if modifiers.shift => self.redo()?,
                "z" => self.undo()?,
                "y" => self.redo()?,
                _ => return Ok(false),
            };
            return Ok(handled);
        }
        if self.space_held {
            return Ok(false);
        }
        match key {
            "Delete" => return self.delete_selection(),
            "Escape" => {
                self.escape();
                return Ok(true);
            }
            _ => {}
        }
        if modifiers.any() {
            return Ok(false);
        }
        match Tool::from_hotkey(key) {
            Some(tool) => {
                self.set_tool(tool);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if (key == " " || key == "Space") && self.space_held {
            self.space_held = false;
            self.refresh_cursor();
        }
    }

    pub(crate) fn refresh_cursor(&mut self) {
        let cursor = match &self.gesture {
            Gesture::Pan(_) | Gesture::Drag(_) => Cursor::Grabbing,
            Gesture::Resize(state) => state.corner.cursor(),
            Gesture::Draw { .. } => Cursor::Crosshair,
            Gesture::Idle if self.space_held || self.pan_mode => Cursor::Grab,
            Gesture::Idle => match (self.tool, self.last_pointer) {
                (Tool::Select, Some(screen)) => {
                    self.handle_at_screen(screen).map(|c| c.cursor()).unwrap_or(Cursor::Default)
                }
                (tool, _) => tool.cursor(),
            },
        };
        self.set_cursor(cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn draw(editor: &mut EditorCore, tool: Tool, from: Point, to: Point) {
        editor.set_tool(tool);
        editor.pointer_down(from, PointerButton::Primary, Modifiers::NONE).unwrap();
        editor.pointer_move(to, Modifiers::NONE).unwrap();
        editor.pointer_up(to).unwrap();
    }

    #[test]
    fn control_point_mirrors_cursor() {
        let control = mirrored_control(pt(0.0, 0.0), pt(100.0, 0.0), pt(50.0, 40.0));
        assert_eq!(control, pt(50.0, -40.0));
    }

    #[test]
    fn drawn_rect_is_selected_and_normalised() {
        let mut editor = EditorCore::default();
        draw(&mut editor, Tool::Rect, pt(50.0, 60.0), pt(10.0, 20.0));
        let ids = editor.selected_ids();
        assert_eq!(ids.len(), 1);
        let node = editor.document().node(ids[0]).unwrap();
        assert_eq!(node.element().shape, Shape::Rect { x: 10.0, y: 20.0, width: 40.0, height: 40.0 });
        assert_eq!(node.element().style.fill, "#cccccc");
    }

    #[test]
    fn click_without_drag_leaves_nothing_behind() {
        let mut editor = EditorCore::default();
        draw(&mut editor, Tool::Ellipse, pt(30.0, 30.0), pt(30.0, 30.0));
        assert_eq!(editor.document().node_count(), 0);
        assert!(editor.selected_ids().is_empty());
    }

    #[test]
    fn three_clicks_build_a_quadratic_path() {
        let mut editor = EditorCore::default();
        editor.set_tool(Tool::Path);
        editor.pointer_down(pt(0.0, 0.0), PointerButton::Primary, Modifiers::NONE).unwrap();
        editor.pointer_up(pt(0.0, 0.0)).unwrap();
        assert_eq!(editor.path_step(), 1);
        editor.pointer_down(pt(100.0, 0.0), PointerButton::Primary, Modifiers::NONE).unwrap();
        assert_eq!(editor.path_step(), 2);
        editor.pointer_move(pt(50.0, -40.0), Modifiers::NONE).unwrap();
        editor.pointer_down(pt(50.0, -40.0), PointerButton::Primary, Modifiers::NONE).unwrap();
        assert_eq!(editor.path_step(), 0);
        let id = editor.selected_ids()[0];
        let element = editor.document().node(id).unwrap().element().clone();
        assert_eq!(element.shape, Shape::Path { d: "M 0 0 Q 50 40 100 0".into() });
        assert_eq!(element.style.fill, "none");
        assert_eq!(element.style.line_cap.as_deref(), Some("round"));
    }

    #[test]
    fn escape_discards_unfinished_path() {
        let mut editor = EditorCore::default();
        editor.set_tool(Tool::Path);
        editor.pointer_down(pt(0.0, 0.0), PointerButton::Primary, Modifiers::NONE).unwrap();
        editor.pointer_down(pt(100.0, 0.0), PointerButton::Primary, Modifiers::NONE).unwrap();
        assert!(editor.key_down("Escape", Modifiers::NONE).unwrap());
        assert_eq!(editor.path_step(), 0);
        assert_eq!(editor.document().node_count(), 0);
    }

    #[test]
    fn switching_tools_cancels_path() {
        let mut editor = EditorCore::default();
        editor.set_tool(Tool::Path);
        editor.pointer_down(pt(0.0, 0.0), PointerButton::Primary, Modifiers::NONE).unwrap();
        editor.set_tool(Tool::Rect);
        assert_eq!(editor.path_step(), 0);
        assert_eq!(editor.document().node_count(), 0);
    }

    #[test]
    fn hotkeys_need_no_modifiers() {
        let mut editor = EditorCore::default();
        assert!(editor.key_down("r", Modifiers::NONE).unwrap());
        assert_eq!(editor.tool(), Tool::Rect);
        assert!(!editor.key_down("e", Modifiers::shift()).unwrap());
        assert_eq!(editor.tool(), Tool::Rect);
    }

    #[test]
    fn dragging_moves_every_selected_node() {
        let mut editor = EditorCore::default();
        draw(&mut editor, Tool::Rect, pt(10.0, 10.0), pt(30.0, 30.0));
        let a = editor.selected_ids()[0];
        draw(&mut editor, Tool::Rect, pt(200.0, 200.0), pt(240.0, 260.0));
        let b = editor.selected_ids()[0];
        editor.set_tool(Tool::Select);
        editor.toggle_selection(a).unwrap();
        // alt suspends snapping so the raw delta applies
        editor.pointer_down(pt(20.0, 20.0), PointerButton::Primary, Modifiers::alt()).unwrap();
        editor.pointer_move(pt(33.0, 27.0), Modifiers::alt()).unwrap();
        editor.pointer_up(pt(33.0, 27.0)).unwrap();
        let moved_a = editor.document().node(a).unwrap().bounds().unwrap();
        let moved_b = editor.document().node(b).unwrap().bounds().unwrap();
        assert_eq!((moved_a.x0, moved_a.y0), (23.0, 17.0));
        assert_eq!((moved_b.x0, moved_b.y0), (213.0, 207.0));
    }

    #[test]
    fn background_click_clears_selection() {
        let mut editor = EditorCore::default();
        draw(&mut editor, Tool::Rect, pt(10.0, 10.0), pt(30.0, 30.0));
        editor.set_tool(Tool::Select);
        editor.pointer_down(pt(400.0, 400.0), PointerButton::Primary, Modifiers::shift()).unwrap();
        assert_eq!(editor.selected_ids().len(), 1);
        editor.pointer_down(pt(400.0, 400.0), PointerButton::Primary, Modifiers::NONE).unwrap();
        assert!(editor.selected_ids().is_empty());
    }
}
