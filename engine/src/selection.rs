use kurbo::{Affine, Point, Rect};
use serde::Serialize;

use crate::editor::EditorCore;
use crate::error::{EditorError, EditorResult};
use crate::geometry::{document_to_overlay, transformed_corners, union_bounds};
use crate::layers::LayerId;
use crate::objects::{Node, NodeId};
use crate::types::Corner;

/// Ordered, duplicate-free set of selected nodes, all on one layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    ids: Vec<NodeId>,
    layer: Option<LayerId>,
}

impl Selection {
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn first(&self) -> Option<NodeId> {
        self.ids.first().copied()
    }

    /// Replaces the selection with `id` alone.
    pub fn set(&mut self, id: NodeId, layer: LayerId) {
        self.ids.clear();
        self.ids.push(id);
        self.layer = Some(layer);
    }

    /// Adds or removes `id`. Adding from another layer than the current
    /// members is rejected. Returns whether `id` is now selected.
    pub fn toggle(&mut self, id: NodeId, layer: LayerId) -> EditorResult<bool> {
        if let Some(pos) = self.ids.iter().position(|x| *x == id) {
            self.ids.remove(pos);
            if self.ids.is_empty() {
                self.layer = None;
            }
            return Ok(false);
        }
        match self.layer {
            Some(current) if !self.ids.is_empty() && current != layer => {
                Err(EditorError::CrossLayerSelection { node: id, layer, selection_layer: current })
            }
            _ => {
                self.ids.push(id);
                self.layer = Some(layer);
                Ok(true)
            }
        }
    }

    /// Returns true when something was deselected.
    pub fn clear(&mut self) -> bool {
        self.layer = None;
        !std::mem::take(&mut self.ids).is_empty()
    }

    pub fn remove_all(&mut self, ids: &[NodeId]) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| !ids.contains(id));
        if self.ids.is_empty() {
            self.layer = None;
        }
        self.ids.len() != before
    }

    pub(crate) fn replace_id(&mut self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        if self.ids.contains(&new) {
            self.ids.retain(|id| *id != old);
        } else if let Some(slot) = self.ids.iter_mut().find(|id| **id == old) {
            *slot = new;
        }
    }
}

/// Selection chrome in overlay coordinates: one box around every selected
/// node and a handle on each of its corners.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SelectionOverlay {
    #[serde(skip)]
    pub bounds: Rect,
    pub outline: [Point; 4],
    pub handles: [(Corner, Point); 4],
}

impl SelectionOverlay {
    pub fn new(bounds: Rect) -> Self {
        SelectionOverlay {
            bounds,
            outline: transformed_corners(Affine::IDENTITY, bounds),
            handles: Corner::ALL.map(|corner| (corner, corner.of(bounds))),
        }
    }

    /// Handle within `radius` of `p`, nearest first.
    pub fn handle_at(&self, p: Point, radius: f64) -> Option<Corner> {
        self.handles
            .iter()
            .map(|(corner, at)| (*corner, at.distance(p)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(corner, _)| corner)
    }
}

impl EditorCore {
    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.selection.ids().to_vec()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Top-level id of whatever node is or wraps `id`.
    pub(crate) fn canonical_id(&self, id: NodeId) -> Option<NodeId> {
        self.doc.node(id).map(Node::id)
    }

    pub fn select(&mut self, id: NodeId) -> EditorResult<()> {
        let id = self.canonical_id(id).ok_or(EditorError::UnknownNode(id))?;
        let layer = self.doc.layer_of(id).ok_or(EditorError::UnknownNode(id))?;
        if self.selection.ids() != [id] {
            self.selection.set(id, layer);
            self.selection_changed();
        }
        Ok(())
    }

    pub fn toggle_selection(&mut self, id: NodeId) -> EditorResult<bool> {
        let id = self.canonical_id(id).ok_or(EditorError::UnknownNode(id))?;
        let layer = self.doc.layer_of(id).ok_or(EditorError::UnknownNode(id))?;
        let selected = self.selection.toggle(id, layer)?;
        self.selection_changed();
        Ok(selected)
    }

    pub fn deselect(&mut self) {
        if self.selection.clear() {
            self.selection_changed();
        }
    }

    /// Union of the selected nodes' bounds in document space.
    pub fn selection_bounds_document(&self) -> Option<Rect> {
        union_bounds(self.doc.bounds_of(self.selection.ids()))
    }

    pub(crate) fn document_to_overlay(&self) -> Affine {
        document_to_overlay(&self.doc.view, &self.overlay, self.viewport)
    }

    pub(crate) fn overlay_to_document(&self) -> Affine {
        self.document_to_overlay().inverse()
    }

    pub(crate) fn map_rect(affine: Affine, rect: Rect) -> Rect {
        let [a, b, c, d] = transformed_corners(affine, rect);
        Rect::from_points(a, c).union_pt(b).union_pt(d)
    }

    /// Union box of the selection in overlay space.
    pub fn selection_bounds(&self) -> Option<Rect> {
        let to_overlay = self.document_to_overlay();
        let boxes = self.doc.bounds_of(self.selection.ids());
        if boxes.len() < self.selection.len() {
            log::warn!("{} selected node(s) have no usable bounds", self.selection.len() - boxes.len());
        }
        union_bounds(boxes.into_iter().map(|b| Self::map_rect(to_overlay, b)))
    }

    pub fn selection_overlay(&self) -> Option<SelectionOverlay> {
        self.selection_bounds().map(SelectionOverlay::new)
    }

    /// Corner handle under a screen point, if any.
    pub fn handle_at_screen(&self, screen: Point) -> Option<Corner> {
        let overlay = self.selection_overlay()?;
        let p = self.overlay.from_screen(self.viewport) * screen;
        let radius = self.config.handle_radius_px / self.overlay.pixel_scale(self.viewport);
        overlay.handle_at(p, radius)
    }
}
