mod common;

use common::*;
use crosshair_engine::geometry::ViewBox;
use crosshair_engine::view::ZoomFocus;
use crosshair_engine::{EditorError, HostCommand, Notice};

#[test]
fn loose_elements_migrate_into_the_first_layer() {
    let editor = editor_with(
        r##"<rect x="0" y="0" width="10" height="10" fill="#ff0000"/>
            <g data-layer="true" data-layer-id="layer-3" data-layer-name="Ink">
              <circle cx="5" cy="5" r="5" stroke="#0000ff"/>
            </g>
            <line x1="0" y1="0" x2="10" y2="10"/>"##,
    );
    let layers = editor.document().layers();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].name, "Ink");
    let kinds: Vec<&str> = layers[0].nodes.iter().map(|n| n.kind().tag()).collect();
    assert_eq!(kinds, vec!["circle", "rect", "line"]);
}

#[test]
fn documents_without_layers_get_a_default_one() {
    let editor = editor_with(r#"<rect x="0" y="0" width="10" height="10"/>"#);
    let layers = editor.document().layers();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].name, "Layer 1");
    assert_eq!(layers[0].nodes.len(), 1);
    assert!(!editor.can_undo());
}

#[test]
fn failed_loads_leave_the_document_alone() {
    let mut editor = editor();
    draw_rect(&mut editor, pt(10.0, 10.0), pt(50.0, 50.0));
    let before = editor.export_svg();
    assert!(matches!(editor.load_document("<svg><rect"), Err(EditorError::Load(_))));
    assert!(matches!(editor.load_document("<html/>"), Err(EditorError::Load(_))));
    assert_eq!(editor.export_svg(), before);
}

#[test]
fn loading_resets_view_and_history() {
    let mut editor = editor();
    draw_rect(&mut editor, pt(10.0, 10.0), pt(50.0, 50.0));
    editor.zoom_in(ZoomFocus::ViewportCenter);
    editor
        .load_document(r#"<svg viewBox="0 0 200 100"><rect x="0" y="0" width="10" height="10"/></svg>"#)
        .unwrap();
    assert_eq!(editor.view(), ViewBox::new(0.0, 0.0, 200.0, 100.0));
    assert_eq!(editor.overlay_view(), editor.view());
    assert_eq!(editor.zoom(), 1.0);
    assert!(!editor.can_undo());
    assert!(editor.selected_ids().is_empty());
}

#[test]
fn export_unwraps_resize_wrappers() {
    let mut editor = editor();
    draw_rect(&mut editor, pt(10.0, 10.0), pt(50.0, 50.0));
    let second = draw_rect(&mut editor, pt(100.0, 10.0), pt(140.0, 50.0));
    let first = first_layer_ids(&editor)[0];
    editor.select(first).unwrap();
    editor.toggle_selection(second).unwrap();
    // group resize leaves both shapes wrapped
    drag(&mut editor, pt(140.0, 50.0), pt(270.0, 90.0), crosshair_engine::Modifiers::NONE);
    assert!(editor.document().layers()[0].nodes.iter().all(|n| n.is_wrapper()));

    let svg = editor.export_svg();
    assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"));
    assert!(svg.contains(r#"viewBox="0 0 512 512""#));
    assert!(svg.contains(r#"data-layer="true""#));
    assert!(!svg.contains("data-resize-wrapper"));
    assert_eq!(svg.matches("<rect ").count(), 2);

    let mut reloaded = common::editor();
    reloaded.load_document(&svg).unwrap();
    let nodes = &reloaded.document().layers()[0].nodes;
    assert!(nodes.iter().all(|n| !n.is_wrapper()));
    assert_rect(nodes[1].bounds().unwrap(), kurbo::Rect::new(190.0, 10.0, 270.0, 90.0));
}

#[test]
fn palette_lists_and_replaces_colors() {
    let mut editor = editor_with(
        r##"<rect x="0" y="0" width="10" height="10" fill="#FF0000" stroke="#333"/>
            <circle cx="50" cy="50" r="5" fill="#ff0000"/>"##,
    );
    assert_eq!(editor.palette(), vec!["#ff0000", "#333333"]);
    assert_eq!(editor.replace_color("#ff0000", "#00ff00").unwrap(), 2);
    assert_eq!(editor.palette(), vec!["#00ff00", "#333333"]);
    let notices = editor.drain_notices();
    assert!(notices.contains(&Notice::PaletteChanged { colors: editor.palette() }));
    assert!(editor.undo().unwrap());
    assert_eq!(editor.palette()[0], "#ff0000");
    assert_eq!(editor.replace_color("#abcdef", "#000000").unwrap(), 0);
}

#[test]
fn crosshair_codes_land_in_their_own_layer() {
    let mut editor = editor();
    let layer = editor.import_crosshair_code("0;P;c;1;h;1;t;2;o;1;0l;4;0o;2;1b;0").unwrap();
    let imported = editor.document().layer(layer).unwrap();
    assert_eq!(imported.name, "Crosshair");
    // four inner arms, each with an outline behind it
    assert_eq!(imported.nodes.len(), 8);
    let center = editor.view().center();
    let bounds = imported.nodes.iter().filter_map(|n| n.bounds()).reduce(|a, b| a.union(b)).unwrap();
    assert!(close(bounds.center().x, center.x) && close(bounds.center().y, center.y));
    assert_eq!(editor.document().active_layer_id(), layer);
}

#[test]
fn zoom_commands_use_the_viewport_center() {
    let mut editor = editor();
    let center = editor.view().center();
    assert!(editor.execute("zoom-in".parse::<HostCommand>().unwrap()).unwrap());
    assert!(close(editor.zoom(), 1.125));
    assert!(close(editor.view().center().x, center.x) && close(editor.view().center().y, center.y));
    assert!(editor.execute(HostCommand::ZoomOut).unwrap());
    assert!(close(editor.zoom(), 1.0));
    assert!(close(editor.view().width, 512.0));
}

#[test]
fn wheel_zoom_keeps_the_cursor_point_still() {
    let mut editor = editor();
    let cursor = pt(100.0, 300.0);
    let before = editor.screen_to_document(cursor);
    assert!(editor.wheel(cursor, -1.0));
    assert!(editor.wheel(cursor, -1.0));
    let after = editor.screen_to_document(cursor);
    assert!(close(before.x, after.x) && close(before.y, after.y));
    assert!(close(editor.zoom(), 1.125 * 1.125));
}

#[test]
fn editing_still_lines_up_after_zooming() {
    let mut editor = editor();
    editor.set_zoom(2.0, ZoomFocus::Screen(pt(0.0, 0.0)));
    // two screen pixels per unit
    let id = draw_rect(&mut editor, pt(20.0, 20.0), pt(100.0, 60.0));
    assert_rect(bounds(&editor, id), kurbo::Rect::new(10.0, 10.0, 50.0, 30.0));
    drag(&mut editor, pt(40.0, 40.0), pt(60.0, 40.0), crosshair_engine::Modifiers::alt());
    assert_rect(bounds(&editor, id), kurbo::Rect::new(20.0, 10.0, 60.0, 30.0));
}
