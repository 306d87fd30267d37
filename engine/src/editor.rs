use std::mem;

use kurbo::Point;
use serde::Serialize;

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::EditorResult;
use crate::geometry::{ViewBox, Viewport};
use crate::history::History;
use crate::layers::LayerId;
use crate::objects::{NodeId, Style};
use crate::resize::ResizeState;
use crate::selection::Selection;
use crate::snapping::SnapResult;
use crate::tools::{DragState, PathBuilder};
use crate::types::{Cursor, Tool};
use crate::view::PanState;

/// Outbox entries the host drains after every call.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notice {
    Render,
    SelectionChanged { ids: Vec<NodeId> },
    LayersChanged,
    PaletteChanged { colors: Vec<String> },
    ClipboardChanged { has_content: bool },
    ConfirmLayerDeletion { layer: LayerId, name: String },
    CursorChanged { cursor: Cursor },
    ToolChanged { tool: Tool },
    ZoomChanged { zoom: f64 },
}

impl Notice {
    /// Notices whose newest payload supersedes any queued one.
    fn supersedes(&self, other: &Notice) -> bool {
        match self {
            Notice::ConfirmLayerDeletion { .. } => self == other,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

/// The pointer gesture in progress, if any. Global input only matters
/// while this is not `Idle`.
#[derive(Clone, Debug, Default)]
pub(crate) enum Gesture {
    #[default]
    Idle,
    Drag(DragState),
    Resize(ResizeState),
    Draw { id: NodeId, start: Point },
    Pan(PanState),
}

/// An editing session: the document plus everything needed to edit it.
pub struct EditorCore {
    pub(crate) config: EditorConfig,
    pub(crate) doc: Document,
    /// View box of the overlay, kept equal to the document view.
    pub(crate) overlay: ViewBox,
    pub(crate) viewport: Viewport,
    /// Unzoomed view; zooming divides its size by `zoom`.
    pub(crate) base_view: ViewBox,
    pub(crate) zoom: f64,
    pub(crate) selection: Selection,
    pub(crate) clipboard: Clipboard,
    pub(crate) history: History,
    pub(crate) tool: Tool,
    pub(crate) gesture: Gesture,
    pub(crate) path: PathBuilder,
    pub(crate) default_style: Style,
    pub(crate) renaming: Option<LayerId>,
    pub(crate) pending_deletion: Option<LayerId>,
    pub(crate) space_held: bool,
    pub(crate) pan_mode: bool,
    pub(crate) cursor: Cursor,
    /// Last pointer position in screen pixels, the focus of keyboard zoom.
    pub(crate) last_pointer: Option<Point>,
    pub(crate) snap: Option<SnapResult>,
    notices: Vec<Notice>,
}

impl Default for EditorCore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorCore {
    pub fn new(config: EditorConfig) -> Self {
        let doc = Document::new(config.base_view);
        let mut history = History::new(config.history_limit);
        history.reset(doc.snapshot().unwrap_or_default());
        EditorCore {
            overlay: config.base_view,
            viewport: Viewport::new(config.base_view.width, config.base_view.height),
            base_view: config.base_view,
            zoom: 1.0,
            selection: Selection::default(),
            clipboard: Clipboard::default(),
            history,
            tool: Tool::Select,
            gesture: Gesture::Idle,
            path: PathBuilder::default(),
            default_style: config.default_style.clone(),
            renaming: None,
            pending_deletion: None,
            space_held: false,
            pan_mode: false,
            cursor: Cursor::Default,
            last_pointer: None,
            snap: None,
            notices: Vec::new(),
            doc,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn default_style(&self) -> &Style {
        &self.default_style
    }

    /// Snap lines currently shown, if a drag is snapping.
    pub fn snap_indicators(&self) -> Option<SnapResult> {
        self.snap.filter(|s| s.vertical.is_some() || s.horizontal.is_some())
    }

    pub fn is_gesture_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    pub(crate) fn emit(&mut self, notice: Notice) {
        self.notices.retain(|queued| !notice.supersedes(queued));
        self.notices.push(notice);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        mem::take(&mut self.notices)
    }

    pub(crate) fn request_render(&mut self) {
        self.emit(Notice::Render);
    }

    pub(crate) fn selection_changed(&mut self) {
        self.emit(Notice::SelectionChanged { ids: self.selection.ids().to_vec() });
        self.request_render();
    }

    pub(crate) fn layers_changed(&mut self) {
        self.emit(Notice::LayersChanged);
        self.request_render();
    }

    /// Elements were added, removed or restyled.
    pub(crate) fn structure_changed(&mut self) {
        self.emit(Notice::PaletteChanged { colors: self.palette() });
        self.layers_changed();
    }

    pub(crate) fn set_cursor(&mut self, cursor: Cursor) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.emit(Notice::CursorChanged { cursor });
        }
    }

    /// Snapshots the scene ahead of a mutation.
    pub fn record_state(&mut self) -> EditorResult<()> {
        let state = self.scene_state()?;
        self.history.record(state);
        Ok(())
    }

    /// The document as history sees it: a path or shape still being drawn
    /// is left out.
    fn scene_state(&self) -> EditorResult<String> {
        let mut unfinished: Vec<NodeId> = self.path.node().into_iter().collect();
        if let Gesture::Draw { id, .. } = self.gesture {
            unfinished.push(id);
        }
        self.doc.snapshot_without(&unfinished)
    }

    pub fn history_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    pub fn can_undo(&self) -> bool {
        self.scene_state().map(|s| self.history.can_undo(&s)).unwrap_or(false)
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> EditorResult<bool> {
        self.abandon_in_progress();
        let current = self.scene_state()?;
        match self.history.undo(current) {
            Some(state) => {
                self.apply_state(&state)?;
                log::debug!("undo, {} state(s) left", self.history.undo_depth());
                Ok(true)
            }
            None => {
                log::debug!("nothing to undo");
                Ok(false)
            }
        }
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        self.abandon_in_progress();
        match self.history.redo() {
            Some(state) => {
                self.apply_state(&state)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Swaps in a history state. Selection does not survive this.
    fn apply_state(&mut self, state: &str) -> EditorResult<()> {
        self.doc.restore(state)?;
        self.selection.clear();
        self.gesture = Gesture::Idle;
        self.snap = None;
        self.renaming = None;
        if let Some(pending) = self.pending_deletion {
            if self.doc.layer(pending).is_none() {
                self.pending_deletion = None;
            }
        }
        self.selection_changed();
        self.structure_changed();
        Ok(())
    }

    /// Drops unfinished drawing so it never leaks into a snapshot.
    pub(crate) fn abandon_in_progress(&mut self) {
        self.cancel_path();
        match mem::take(&mut self.gesture) {
            Gesture::Draw { id, .. } => {
                self.doc.remove_node(id);
            }
            other => {
                self.gesture = other;
                self.end_gesture();
            }
        }
    }

    /// Releases whatever gesture is active, committing its current state.
    pub(crate) fn end_gesture(&mut self) {
        match mem::take(&mut self.gesture) {
            Gesture::Resize(state) => self.finish_resize(state),
            Gesture::Drag(_) => {
                if self.snap.take().is_some() {
                    self.request_render();
                }
            }
            Gesture::Draw { id, .. } => self.finish_drawing(id),
            Gesture::Pan(_) | Gesture::Idle => {}
        }
    }
}
