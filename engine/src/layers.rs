use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::editor::{EditorCore, Notice};
use crate::error::{EditorError, EditorResult};
use crate::objects::Node;
use crate::types::{LayerDirection, LayerKind};

/// Layer handle, written `layer-{n}` wherever the host or a file sees it.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[serde(into = "String", try_from = "String")]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

impl FromStr for LayerId {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("layer-")
            .and_then(|n| n.parse::<u32>().ok())
            .map(LayerId)
            .ok_or_else(|| EditorError::InvalidCommand(format!("bad layer id {:?}", s)))
    }
}

impl From<LayerId> for String {
    fn from(id: LayerId) -> String {
        id.to_string()
    }
}

impl TryFrom<String> for LayerId {
    type Error = EditorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    /// Carried through files and history, not enforced.
    pub locked: bool,
    pub nodes: Vec<Node>,
}

impl Layer {
    pub fn new(id: LayerId, name: String) -> Self {
        Layer { id, name, visible: true, locked: false, nodes: Vec::new() }
    }

    pub fn kind(&self) -> LayerKind {
        let mut kinds = self.nodes.iter().map(Node::kind);
        let Some(first) = kinds.next() else { return LayerKind::Empty };
        if kinds.all(|k| k == first) {
            LayerKind::Single(first)
        } else {
            LayerKind::Mixed
        }
    }
}

/// Row of the host's layer panel.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct LayerSummary {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub active: bool,
    pub renaming: bool,
    pub kind: &'static str,
}

/// Trims and clips a proposed layer name; `None` when nothing is left.
pub fn sanitize_layer_name(raw: &str, max_len: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_len).collect::<String>().trim_end().to_string())
}

impl EditorCore {
    /// Layers top-most first, as the panel lists them.
    pub fn layer_summaries(&self) -> Vec<LayerSummary> {
        self.doc
            .layers()
            .iter()
            .rev()
            .map(|layer| LayerSummary {
                id: layer.id,
                name: layer.name.clone(),
                visible: layer.visible,
                locked: layer.locked,
                active: layer.id == self.doc.active_layer_id(),
                renaming: self.renaming == Some(layer.id),
                kind: layer.kind().tag(),
            })
            .collect()
    }

    pub fn classify_layer(&self, id: LayerId) -> EditorResult<LayerKind> {
        self.doc.layer(id).map(Layer::kind).ok_or(EditorError::UnknownLayer(id))
    }

    pub fn add_layer(&mut self, name: Option<&str>) -> EditorResult<LayerId> {
        self.ensure_not_renaming()?;
        self.record_state()?;
        let name = name.and_then(|n| sanitize_layer_name(n, self.config.max_layer_name_len));
        let id = self.doc.add_layer(name.as_deref());
        log::debug!("added {}", id);
        self.layers_changed();
        Ok(id)
    }

    /// Makes `id` the active layer. Ignored while a rename is open.
    pub fn select_layer(&mut self, id: LayerId) -> EditorResult<bool> {
        if self.renaming.is_some() {
            return Ok(false);
        }
        if !self.doc.set_active(id) {
            return Err(EditorError::UnknownLayer(id));
        }
        self.layers_changed();
        Ok(true)
    }

    pub fn begin_rename(&mut self, id: LayerId) -> EditorResult<()> {
        if let Some(current) = self.renaming {
            return Err(EditorError::RenameInProgress(current));
        }
        if self.doc.layer(id).is_none() {
            return Err(EditorError::UnknownLayer(id));
        }
        self.renaming = Some(id);
        self.layers_changed();
        Ok(())
    }

    /// Applies the edited text. An empty name cancels the rename instead.
    pub fn commit_rename(&mut self, text: &str) -> EditorResult<bool> {
        let Some(id) = self.renaming.take() else { return Ok(false) };
        let Some(name) = sanitize_layer_name(text, self.config.max_layer_name_len) else {
            log::debug!("empty name for {}, rename cancelled", id);
            self.layers_changed();
            return Ok(false);
        };
        let unchanged = self.doc.layer(id).map(|l| l.name == name).unwrap_or(true);
        if !unchanged {
            self.record_state()?;
            if let Some(layer) = self.doc.layer_mut(id) {
                layer.name = name;
            }
        }
        self.layers_changed();
        Ok(!unchanged)
    }

    pub fn cancel_rename(&mut self) {
        if self.renaming.take().is_some() {
            self.layers_changed();
        }
    }

    pub fn rename_layer(&mut self, id: LayerId, name: &str) -> EditorResult<bool> {
        self.begin_rename(id)?;
        self.commit_rename(name)
    }

    pub fn renaming_layer(&self) -> Option<LayerId> {
        self.renaming
    }

    /// First half of the deletion handshake: asks the host for confirmation.
    pub fn request_delete_layer(&mut self, id: LayerId) -> EditorResult<bool> {
        if self.renaming.is_some() {
            return Ok(false);
        }
        if self.pending_deletion.is_some() {
            return Err(EditorError::DeletionPending);
        }
        let layer = self.doc.layer(id).ok_or(EditorError::UnknownLayer(id))?;
        if self.doc.layers().len() <= 1 {
            return Err(EditorError::LastLayer);
        }
        let name = layer.name.clone();
        self.pending_deletion = Some(id);
        self.emit(Notice::ConfirmLayerDeletion { layer: id, name });
        Ok(true)
    }

    pub fn confirm_delete_layer(&mut self) -> EditorResult<LayerId> {
        let id = self.pending_deletion.take().ok_or(EditorError::NoPendingDeletion)?;
        if self.doc.layer(id).is_none() {
            return Err(EditorError::UnknownLayer(id));
        }
        if self.doc.layers().len() <= 1 {
            return Err(EditorError::LastLayer);
        }
        self.record_state()?;
        let removed = self.doc.remove_layer(id)?;
        let removed_ids: Vec<_> = removed.nodes.iter().map(Node::id).collect();
        if self.selection.remove_all(&removed_ids) {
            self.selection_changed();
        }
        log::info!("deleted {} with {} element(s)", id, removed.nodes.len());
        self.structure_changed();
        Ok(self.doc.active_layer_id())
    }

    pub fn cancel_delete_layer(&mut self) -> bool {
        self.pending_deletion.take().is_some()
    }

    pub fn pending_layer_deletion(&self) -> Option<LayerId> {
        self.pending_deletion
    }

    pub fn toggle_visibility(&mut self, id: LayerId) -> EditorResult<bool> {
        if self.renaming.is_some() {
            return Ok(false);
        }
        if self.doc.layer(id).is_none() {
            return Err(EditorError::UnknownLayer(id));
        }
        self.record_state()?;
        let mut visible = true;
        if let Some(layer) = self.doc.layer_mut(id) {
            layer.visible = !layer.visible;
            visible = layer.visible;
        }
        // hidden content cannot stay selected
        if !visible && self.selection.layer() == Some(id) && self.selection.clear() {
            self.selection_changed();
        }
        self.layers_changed();
        Ok(true)
    }

    pub fn move_layer(&mut self, id: LayerId, direction: LayerDirection) -> EditorResult<bool> {
        if self.renaming.is_some() {
            return Ok(false);
        }
        let index = self.doc.layer_index(id).ok_or(EditorError::UnknownLayer(id))?;
        let at_boundary = match direction {
            LayerDirection::Up => index + 1 >= self.doc.layers().len(),
            LayerDirection::Down => index == 0,
        };
        if at_boundary {
            return Ok(false);
        }
        self.record_state()?;
        self.doc.move_layer(id, direction == LayerDirection::Up);
        self.layers_changed();
        Ok(true)
    }

    fn ensure_not_renaming(&self) -> EditorResult<()> {
        match self.renaming {
            Some(id) => Err(EditorError::RenameInProgress(id)),
            None => Ok(()),
        }
    }
}
