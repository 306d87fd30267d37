#![allow(dead_code)]

use crosshair_engine::objects::NodeId;
use crosshair_engine::{EditorCore, Modifiers, PointerButton, Tool};
use kurbo::{Point, Rect};

pub fn editor() -> EditorCore {
    let _ = env_logger::builder().is_test(true).try_init();
    EditorCore::default()
}

/// Session with `body` loaded inside a 512x512 document.
pub fn editor_with(body: &str) -> EditorCore {
    let mut editor = editor();
    let text = format!(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512">{}</svg>"#, body);
    editor.load_document(&text).unwrap();
    editor.drain_notices();
    editor
}

pub fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

pub fn assert_rect(actual: Rect, expected: Rect) {
    assert!(
        close(actual.x0, expected.x0) && close(actual.y0, expected.y0) && close(actual.x1, expected.x1) && close(actual.y1, expected.y1),
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

pub fn click(editor: &mut EditorCore, p: Point, modifiers: Modifiers) {
    editor.pointer_down(p, PointerButton::Primary, modifiers).unwrap();
    editor.pointer_up(p).unwrap();
}

pub fn drag(editor: &mut EditorCore, from: Point, to: Point, modifiers: Modifiers) {
    editor.pointer_down(from, PointerButton::Primary, modifiers).unwrap();
    editor.pointer_move(to, modifiers).unwrap();
    editor.pointer_up(to).unwrap();
}

/// Draws a rectangle with the rect tool and returns its id.
pub fn draw_rect(editor: &mut EditorCore, from: Point, to: Point) -> NodeId {
    editor.set_tool(Tool::Rect);
    drag(editor, from, to, Modifiers::NONE);
    editor.set_tool(Tool::Select);
    editor.selected_ids()[0]
}

/// Ids of the nodes in the bottom-most layer, in paint order.
pub fn first_layer_ids(editor: &EditorCore) -> Vec<NodeId> {
    editor.document().layers()[0].nodes.iter().map(|n| n.id()).collect()
}

pub fn bounds(editor: &EditorCore, id: NodeId) -> Rect {
    editor.document().node(id).and_then(|n| n.bounds()).unwrap()
}
