pub mod types;
pub mod error;
pub mod config;
pub mod geometry;
pub mod objects;
pub mod layers;
pub mod document;
pub mod selection;
pub mod snapping;
pub mod history;
pub mod editor;
pub mod tools;
pub mod resize;
pub mod view;
pub mod clipboard;
pub mod palette;
pub mod commands;
pub mod svg;
pub mod crosshair_code;
pub mod console_log;
pub mod engine;
pub mod render;

pub use commands::HostCommand;
pub use config::EditorConfig;
pub use editor::{EditorCore, Notice};
pub use engine::CrosshairEditor;
pub use error::{EditorError, EditorResult, LoadError};
pub use types::*;
