use std::fmt::Display;

use kurbo::Point;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::commands::HostCommand;
use crate::config::EditorConfig;
use crate::console_log;
use crate::editor::EditorCore;
use crate::error::{EditorError, EditorResult};
use crate::layers::LayerId;
use crate::objects::NodeId;
use crate::types::{LayerDirection, Modifiers, PointerButton, Tool};
use crate::view::ZoomFocus;

fn error_json(error: impl Display) -> String {
    serde_json::json!({ "error": error.to_string() }).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(error_json)
}

fn respond<T: Serialize>(result: EditorResult<T>) -> String {
    match result {
        Ok(value) => to_json(&value),
        Err(e) => {
            log::warn!("{}", e);
            error_json(e)
        }
    }
}

fn node_id(raw: u64) -> EditorResult<NodeId> {
    u32::try_from(raw).map(NodeId).map_err(|_| EditorError::InvalidCommand(format!("node id {}", raw)))
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers { shift, ctrl, alt, meta }
}

/// Browser-facing editing session. Every method is a thin shim over
/// [`EditorCore`]; results come back as JSON strings, failures as
/// `{"error": "..."}`.
#[wasm_bindgen]
pub struct CrosshairEditor {
    pub(crate) core: EditorCore,
}

#[wasm_bindgen]
impl CrosshairEditor {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<CrosshairEditor, JsValue> {
        console_error_panic_hook::set_once();
        console_log::init(LevelFilter::Info);

        let config = match config_json.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => {
                EditorConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            _ => EditorConfig::default(),
        };
        Ok(CrosshairEditor { core: EditorCore::new(config) })
    }

    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub fn set_log_level(&self, level: &str) -> bool {
        match level.parse::<LevelFilter>() {
            Ok(filter) => {
                log::set_max_level(filter);
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.core.set_viewport(width, height);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, button: u16, shift: bool, ctrl: bool, alt: bool, meta: bool) {
        let result = self.core.pointer_down(Point::new(x, y), PointerButton::from_dom(button), modifiers(shift, ctrl, alt, meta));
        if let Err(e) = result {
            log::warn!("pointer down: {}", e);
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) {
        if let Err(e) = self.core.pointer_move(Point::new(x, y), modifiers(shift, ctrl, alt, meta)) {
            log::warn!("pointer move: {}", e);
        }
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) {
        if let Err(e) = self.core.pointer_up(Point::new(x, y)) {
            log::warn!("pointer up: {}", e);
        }
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.core.wheel(Point::new(x, y), delta_y)
    }

    /// Returns whether the key was consumed, so the host can suppress the
    /// browser default.
    pub fn key_down(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        match self.core.key_down(key, modifiers(shift, ctrl, alt, meta)) {
            Ok(handled) => handled,
            Err(e) => {
                log::warn!("key {:?}: {}", key, e);
                true
            }
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.core.key_up(key);
    }

    pub fn set_tool(&mut self, name: &str) -> String {
        match Tool::from_name(name) {
            Some(tool) => {
                self.core.set_tool(tool);
                to_json(&tool)
            }
            None => error_json(EditorError::InvalidCommand(format!("tool {}", name))),
        }
    }

    pub fn tool(&self) -> String {
        self.core.tool().name().to_string()
    }

    pub fn cursor(&self) -> String {
        self.core.cursor().css().to_string()
    }

    pub fn set_pan_mode(&mut self, enabled: bool) {
        self.core.set_pan_mode(enabled);
    }

    pub fn zoom(&self) -> f64 {
        self.core.zoom()
    }

    /// Menu command by name, e.g. `menu-undo` or `bring-to-front`.
    pub fn command(&mut self, name: &str) -> String {
        respond(name.parse::<HostCommand>().and_then(|cmd| self.core.execute(cmd)))
    }

    pub fn can_undo(&self) -> bool {
        self.core.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.core.can_redo()
    }

    pub fn has_clipboard_content(&self) -> bool {
        self.core.clipboard().has_content()
    }

    /// Notices queued since the last call, as an array of tagged objects.
    pub fn drain_notices(&mut self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.core.drain_notices())?)
    }

    /// Layer panel rows, top-most first.
    pub fn layers(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.core.layer_summaries())?)
    }

    pub fn palette(&self) -> String {
        to_json(&self.core.palette())
    }

    pub fn selected_ids(&self) -> String {
        to_json(&self.core.selected_ids())
    }

    pub fn selection_style(&self) -> String {
        to_json(&self.core.selection_style())
    }

    pub fn selection_overlay(&self) -> String {
        to_json(&self.core.selection_overlay())
    }

    pub fn load_svg(&mut self, text: &str) -> String {
        respond(self.core.load_document(text).map(|()| true))
    }

    pub fn export_svg(&self) -> String {
        self.core.export_svg()
    }

    pub fn execute_command(&mut self, cmd_json: &str) -> String {
        #[derive(Deserialize)]
        struct Command {
            action: String,
            #[serde(default)]
            params: serde_json::Value,
        }

        let cmd: Command = match serde_json::from_str(cmd_json) {
            Ok(c) => c,
            Err(e) => return error_json(format!("Invalid JSON: {}", e)),
        };
        log::debug!("execute {}", cmd.action);
        let p = &cmd.params;
        let text = |key: &str| p[key].as_str().unwrap_or("").to_string();
        let layer = |key: &str| text(key).parse::<LayerId>();

        match cmd.action.as_str() {
            "command" => respond(text("name").parse::<HostCommand>().and_then(|c| self.core.execute(c))),
            "select" => match p["id"].as_u64() {
                Some(id) => respond(node_id(id).and_then(|id| self.core.select(id)).map(|()| true)),
                None => respond(Ok(self.core.deselect())),
            },
            "toggle_selection" => match p["id"].as_u64() {
                Some(id) => respond(node_id(id).and_then(|id| self.core.toggle_selection(id))),
                None => error_json("missing id"),
            },
            "add_layer" => respond(self.core.add_layer(p["name"].as_str())),
            "select_layer" => respond(layer("id").and_then(|id| self.core.select_layer(id))),
            "begin_rename" => respond(layer("id").and_then(|id| self.core.begin_rename(id)).map(|()| true)),
            "commit_rename" => respond(self.core.commit_rename(&text("text"))),
            "cancel_rename" => respond(Ok(self.core.cancel_rename())),
            "rename_layer" => respond(layer("id").and_then(|id| self.core.rename_layer(id, &text("name")))),
            "request_delete_layer" => respond(layer("id").and_then(|id| self.core.request_delete_layer(id))),
            "confirm_delete_layer" => respond(self.core.confirm_delete_layer()),
            "cancel_delete_layer" => respond(Ok(self.core.cancel_delete_layer())),
            "toggle_visibility" => respond(layer("id").and_then(|id| self.core.toggle_visibility(id))),
            "move_layer" => {
                let direction = serde_json::from_value::<LayerDirection>(p["direction"].clone())
                    .map_err(|_| EditorError::InvalidCommand(format!("direction {}", p["direction"])));
                respond(layer("id").and_then(|id| direction.and_then(|d| self.core.move_layer(id, d))))
            }
            "set_fill" => respond(self.core.set_fill(&text("color"))),
            "set_stroke" => respond(self.core.set_stroke(&text("color"))),
            "set_stroke_width" => match p["width"].as_f64() {
                Some(width) => respond(self.core.set_stroke_width(width)),
                None => error_json("missing width"),
            },
            "replace_color" => respond(self.core.replace_color(&text("old"), &text("new"))),
            "set_zoom" => match p["zoom"].as_f64() {
                Some(zoom) => respond(Ok(self.core.set_zoom(zoom, ZoomFocus::ViewportCenter))),
                None => error_json("missing zoom"),
            },
            "reset_zoom" => respond(Ok(self.core.reset_zoom())),
            "import_crosshair_code" => respond(self.core.import_crosshair_code(&text("code"))),
            _ => error_json(EditorError::InvalidCommand(cmd.action.clone())),
        }
    }
}
