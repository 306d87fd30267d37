use std::str::FromStr;

use crate::editor::EditorCore;
use crate::error::{EditorError, EditorResult};
use crate::objects::Style;
use crate::view::ZoomFocus;

/// Menu and toolbar actions the host forwards by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostCommand {
    Undo,
    Redo,
    Delete,
    Copy,
    Cut,
    Paste,
    BringToFront,
    SendToBack,
    ZoomIn,
    ZoomOut,
}

impl FromStr for HostCommand {
    type Err = EditorError;

    /// Accepts `undo`, `menu-undo`, `bring_to_front`, `bring-to-front` and
    /// similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('_', "-");
        let name = name.strip_prefix("menu-").unwrap_or(&name);
        let command = match name {
            "undo" => HostCommand::Undo,
            "redo" => HostCommand::Redo,
            "delete" => HostCommand::Delete,
            "copy" => HostCommand::Copy,
            "cut" => HostCommand::Cut,
            "paste" => HostCommand::Paste,
            "bring-to-front" => HostCommand::BringToFront,
            "send-to-back" => HostCommand::SendToBack,
            "zoom-in" => HostCommand::ZoomIn,
            "zoom-out" => HostCommand::ZoomOut,
            _ => return Err(EditorError::InvalidCommand(s.to_string())),
        };
        Ok(command)
    }
}

impl EditorCore {
    /// Runs a host command. Returns whether anything changed.
    pub fn execute(&mut self, command: HostCommand) -> EditorResult<bool> {
        log::debug!("command {:?}", command);
        match command {
            HostCommand::Undo => self.undo(),
            HostCommand::Redo => self.redo(),
            HostCommand::Delete => self.delete_selection(),
            HostCommand::Copy => self.copy(),
            HostCommand::Cut => self.cut(),
            HostCommand::Paste => self.paste(),
            HostCommand::BringToFront => self.restack_selection(true),
            HostCommand::SendToBack => self.restack_selection(false),
            HostCommand::ZoomIn => Ok(self.zoom_in(ZoomFocus::ViewportCenter)),
            HostCommand::ZoomOut => Ok(self.zoom_out(ZoomFocus::ViewportCenter)),
        }
    }

    pub fn delete_selection(&mut self) -> EditorResult<bool> {
        if self.selection.is_empty() {
            return Ok(false);
        }
        self.record_state()?;
        let ids = self.selected_ids();
        for id in &ids {
            self.doc.remove_node(*id);
        }
        self.selection.clear();
        log::debug!("deleted {} node(s)", ids.len());
        self.selection_changed();
        self.structure_changed();
        Ok(true)
    }

    pub fn bring_to_front(&mut self) -> EditorResult<bool> {
        self.restack_selection(true)
    }

    pub fn send_to_back(&mut self) -> EditorResult<bool> {
        self.restack_selection(false)
    }

    fn restack_selection(&mut self, front: bool) -> EditorResult<bool> {
        if self.selection.is_empty() {
            return Ok(false);
        }
        self.record_state()?;
        let ids = self.selected_ids();
        self.doc.restack(&ids, front);
        self.layers_changed();
        Ok(true)
    }

    /// Style shown in the properties panel: the first selected element's, or
    /// the style new shapes will get.
    pub fn selection_style(&self) -> Style {
        self.selection
            .first()
            .and_then(|id| self.doc.node(id))
            .map(|node| node.element().style.clone())
            .unwrap_or_else(|| self.default_style.clone())
    }

    pub fn set_fill(&mut self, color: &str) -> EditorResult<bool> {
        let color = color.trim().to_string();
        self.default_style.fill = color.clone();
        self.restyle_selection(|style| style.fill = color.clone())
    }

    pub fn set_stroke(&mut self, color: &str) -> EditorResult<bool> {
        let color = color.trim().to_string();
        self.default_style.stroke = color.clone();
        self.restyle_selection(|style| style.stroke = color.clone())
    }

    pub fn set_stroke_width(&mut self, width: f64) -> EditorResult<bool> {
        if !width.is_finite() || width < 0.0 {
            return Err(EditorError::InvalidCommand(format!("stroke width {}", width)));
        }
        self.default_style.stroke_width = width;
        self.restyle_selection(|style| style.stroke_width = width)
    }

    fn restyle_selection<F: Fn(&mut Style)>(&mut self, apply: F) -> EditorResult<bool> {
        if self.selection.is_empty() {
            return Ok(false);
        }
        self.record_state()?;
        for id in self.selected_ids() {
            if let Some(node) = self.doc.node_mut(id) {
                apply(&mut node.element_mut().style);
            }
        }
        self.structure_changed();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_parse_with_menu_prefix() {
        assert_eq!("undo".parse::<HostCommand>().unwrap(), HostCommand::Undo);
        assert_eq!("menu-bring-to-front".parse::<HostCommand>().unwrap(), HostCommand::BringToFront);
        assert_eq!("send_to_back".parse::<HostCommand>().unwrap(), HostCommand::SendToBack);
        assert!("explode".parse::<HostCommand>().is_err());
    }

    #[test]
    fn style_edits_without_selection_only_touch_defaults() {
        let mut editor = EditorCore::default();
        assert!(!editor.set_fill("#ff0000").unwrap());
        assert!(!editor.set_stroke_width(4.0).unwrap());
        assert_eq!(editor.selection_style().fill, "#ff0000");
        assert_eq!(editor.selection_style().stroke_width, 4.0);
        assert!(editor.set_stroke_width(f64::NAN).is_err());
        assert_eq!(editor.history_depth(), 1);
    }
}
