use kurbo::{Point, Rect};

use crate::editor::{EditorCore, Gesture};
use crate::error::EditorResult;
use crate::geometry::Transform;
use crate::objects::NodeId;
use crate::types::Corner;

const MIN_SIZE: f64 = 1.0;

/// Corner-anchored resize context.
#[derive(Clone, Debug)]
pub struct ResizeState {
    pub corner: Corner,
    /// Corner opposite the grabbed handle, fixed in overlay space.
    pub anchor: Point,
    /// Union box at resize start, overlay space.
    pub start_box: Rect,
    /// Pre-resize transforms, captured once the nodes are wrapped.
    pub originals: Vec<(NodeId, Transform)>,
    pub prepared: bool,
}

/// Scale factors that carry `start_box` from its anchor to `pointer`,
/// never shrinking a side below one unit.
pub fn scale_factors(corner: Corner, start_box: Rect, pointer: Point) -> (f64, f64) {
    let anchor = corner.opposite().of(start_box);
    let new_w = (corner.x_sign() * (pointer.x - anchor.x)).max(MIN_SIZE);
    let new_h = (corner.y_sign() * (pointer.y - anchor.y)).max(MIN_SIZE);
    let kx = if start_box.width() > 0.0 { new_w / start_box.width() } else { 1.0 };
    let ky = if start_box.height() > 0.0 { new_h / start_box.height() } else { 1.0 };
    (kx, ky)
}

impl EditorCore {
    pub(crate) fn begin_resize(&mut self, corner: Corner) {
        let Some(start_box) = self.selection_bounds() else { return };
        log::debug!("resize start from {:?}", corner);
        self.gesture = Gesture::Resize(ResizeState {
            corner,
            anchor: corner.opposite().of(start_box),
            start_box,
            originals: Vec::new(),
            prepared: false,
        });
        self.set_cursor(corner.cursor());
    }

    /// Records history and wraps every selected node so it owns an
    /// independent transform.
    fn prepare_resize(&mut self, state: &mut ResizeState) -> EditorResult<()> {
        self.record_state()?;
        for id in self.selection.ids().to_vec() {
            if let Some(wrapper) = self.doc.ensure_wrapper(id) {
                self.selection.replace_id(id, wrapper);
            }
        }
        state.originals = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| self.doc.node(*id).map(|n| (*id, n.transform())))
            .collect();
        state.prepared = true;
        Ok(())
    }

    pub(crate) fn update_resize(&mut self, state: &mut ResizeState, screen: Point) -> EditorResult<()> {
        let pointer = self.overlay.from_screen(self.viewport) * screen;
        let (kx, ky) = scale_factors(state.corner, state.start_box, pointer);
        if !state.prepared {
            if kx == 1.0 && ky == 1.0 {
                return Ok(());
            }
            self.prepare_resize(state)?;
        }
        let anchor = self.overlay_to_document() * state.anchor;
        for (id, original) in &state.originals {
            if let Some(node) = self.doc.node_mut(*id) {
                node.set_transform(original.scaled_about(anchor, kx, ky));
            }
        }
        self.request_render();
        Ok(())
    }

    /// A lone primitive gets the final transform folded into its own
    /// geometry; group resizes keep the scale on their wrappers.
    pub(crate) fn finish_resize(&mut self, state: ResizeState) {
        if !state.prepared {
            return;
        }
        if let [id] = self.selection.ids() {
            let id = *id;
            if let Some(node) = self.doc.node_mut(id) {
                if node.kind().is_primitive() {
                    let combined = node.combined_transform();
                    let element = node.element_mut();
                    if element.shape.bake(&combined) {
                        element.transform = Transform::IDENTITY;
                        node.set_transform(Transform::IDENTITY);
                        log::debug!("baked resize into {}", id);
                    }
                }
            }
        }
        log::debug!("resize end");
        self.structure_changed();
    }
}
