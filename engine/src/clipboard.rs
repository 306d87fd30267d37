use kurbo::Vec2;

use crate::editor::{EditorCore, Notice};
use crate::error::EditorResult;
use crate::objects::{Node, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipboardMode {
    Copy,
    Cut,
}

/// Cloned selection waiting to be pasted.
#[derive(Clone, Debug, Default)]
pub struct Clipboard {
    content: Vec<Node>,
    mode: Option<ClipboardMode>,
    /// Translation applied to the next paste.
    offset: Vec2,
}

impl Clipboard {
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn mode(&self) -> Option<ClipboardMode> {
        self.mode
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// New content restarts the paste offset at one step.
    pub fn store(&mut self, content: Vec<Node>, mode: ClipboardMode, step: f64) {
        self.content = content;
        self.mode = Some(mode);
        self.offset = Vec2::new(step, step);
    }

    /// Content and offset for one paste; advances or empties the clipboard
    /// according to its mode.
    pub fn take_for_paste(&mut self, step: f64) -> Option<(Vec<Node>, Vec2)> {
        if self.content.is_empty() {
            return None;
        }
        let offset = self.offset;
        match self.mode {
            Some(ClipboardMode::Cut) => {
                self.mode = None;
                Some((std::mem::take(&mut self.content), offset))
            }
            _ => {
                self.offset += Vec2::new(step, step);
                Some((self.content.clone(), offset))
            }
        }
    }
}

impl EditorCore {
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Selected nodes in document order.
    fn selected_nodes(&self) -> Vec<Node> {
        self.doc
            .nodes()
            .filter(|(_, node)| self.selection.contains(node.id()))
            .map(|(_, node)| node.clone())
            .collect()
    }

    pub fn copy(&mut self) -> EditorResult<bool> {
        let nodes = self.selected_nodes();
        if nodes.is_empty() {
            return Ok(false);
        }
        log::debug!("copied {} node(s)", nodes.len());
        self.clipboard.store(nodes, ClipboardMode::Copy, self.config.paste_step);
        self.emit(Notice::ClipboardChanged { has_content: true });
        Ok(true)
    }

    pub fn cut(&mut self) -> EditorResult<bool> {
        let nodes = self.selected_nodes();
        if nodes.is_empty() {
            return Ok(false);
        }
        self.record_state()?;
        for node in &nodes {
            self.doc.remove_node(node.id());
        }
        self.selection.clear();
        log::debug!("cut {} node(s)", nodes.len());
        self.clipboard.store(nodes, ClipboardMode::Cut, self.config.paste_step);
        self.emit(Notice::ClipboardChanged { has_content: true });
        self.selection_changed();
        self.structure_changed();
        Ok(true)
    }

    /// Pastes into the active layer, flattening wrappers and shifting by the
    /// clipboard offset. An empty clipboard is ignored.
    pub fn paste(&mut self) -> EditorResult<bool> {
        if !self.clipboard.has_content() {
            log::debug!("paste with empty clipboard");
            return Ok(false);
        }
        self.record_state()?;
        let Some((nodes, offset)) = self.clipboard.take_for_paste(self.config.paste_step) else {
            return Ok(false);
        };
        let mut pasted: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let mut element = node.flattened();
            element.id = self.doc.alloc_node_id();
            element.transform = element.transform.translated(offset);
            pasted.push(self.doc.add_node_to_active_layer(Node::Element(element)));
        }
        let layer = self.doc.active_layer_id();
        self.selection.clear();
        for id in &pasted {
            self.selection.toggle(*id, layer)?;
        }
        log::info!("pasted {} node(s) at offset ({}, {})", pasted.len(), offset.x, offset.y);
        self.emit(Notice::ClipboardChanged { has_content: self.clipboard.has_content() });
        self.selection_changed();
        self.structure_changed();
        Ok(true)
    }
}
