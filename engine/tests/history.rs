mod common;

use common::*;
use crosshair_engine::{ElementKind, HostCommand, Modifiers, PointerButton, Tool};

#[test]
fn n_undos_return_to_the_start_and_n_redos_come_back() {
    let mut editor = editor();
    let initial = editor.export_svg();
    let n = 5;
    for i in 0..n {
        let x = 20.0 + 60.0 * i as f64;
        draw_rect(&mut editor, pt(x, 20.0), pt(x + 40.0, 60.0));
    }
    let last = editor.export_svg();
    assert_eq!(editor.document().node_count(), n);

    for _ in 0..n {
        assert!(editor.undo().unwrap());
    }
    assert_eq!(editor.export_svg(), initial);
    assert!(!editor.undo().unwrap());

    for _ in 0..n {
        assert!(editor.redo().unwrap());
    }
    assert_eq!(editor.export_svg(), last);
    assert!(!editor.redo().unwrap());
}

#[test]
fn recording_an_unchanged_scene_is_idempotent() {
    let mut editor = editor();
    draw_rect(&mut editor, pt(10.0, 10.0), pt(50.0, 50.0));
    editor.record_state().unwrap();
    let depth = editor.history_depth();
    editor.record_state().unwrap();
    assert_eq!(editor.history_depth(), depth);
}

#[test]
fn a_new_edit_discards_the_redo_branch() {
    let mut editor = editor();
    draw_rect(&mut editor, pt(10.0, 10.0), pt(50.0, 50.0));
    editor.undo().unwrap();
    assert!(editor.can_redo());
    draw_rect(&mut editor, pt(100.0, 100.0), pt(150.0, 150.0));
    assert!(!editor.can_redo());
}

#[test]
fn unfinished_paths_stay_out_of_history() {
    let mut editor = editor();
    draw_rect(&mut editor, pt(10.0, 10.0), pt(50.0, 50.0));
    editor.set_tool(Tool::Path);
    editor.pointer_down(pt(200.0, 200.0), PointerButton::Primary, Modifiers::NONE).unwrap();
    editor.pointer_up(pt(200.0, 200.0)).unwrap();
    assert_eq!(editor.path_step(), 1);

    // the rect is still selected while the path is being placed
    assert!(editor.key_down("Delete", Modifiers::NONE).unwrap());
    assert!(editor.key_down("Escape", Modifiers::NONE).unwrap());
    assert_eq!(editor.document().node_count(), 0);

    assert!(editor.undo().unwrap());
    assert_eq!(editor.path_step(), 0);
    assert_eq!(editor.document().node_count(), 1);
    let kinds: Vec<ElementKind> = editor.document().layers()[0].nodes.iter().map(|n| n.kind()).collect();
    assert_eq!(kinds, vec![ElementKind::Rect]);
    assert!(!editor.export_svg().contains("<path"));
}

#[test]
fn history_is_capped() {
    let mut editor = editor();
    for i in 0..60 {
        let x = (i % 10) as f64 * 50.0;
        let y = (i / 10) as f64 * 50.0;
        draw_rect(&mut editor, pt(x + 1.0, y + 1.0), pt(x + 30.0, y + 30.0));
    }
    assert_eq!(editor.history_depth(), editor.config().history_limit);
}

#[test]
fn keyboard_and_menu_routes_reach_history() {
    let mut editor = editor();
    draw_rect(&mut editor, pt(10.0, 10.0), pt(50.0, 50.0));
    assert!(editor.key_down("z", Modifiers::command()).unwrap());
    assert_eq!(editor.document().node_count(), 0);
    assert!(editor.execute("menu-redo".parse::<HostCommand>().unwrap()).unwrap());
    assert_eq!(editor.document().node_count(), 1);
}

#[test]
fn copy_pastes_step_away_from_the_original() {
    let mut editor = editor();
    let original = draw_rect(&mut editor, pt(10.0, 10.0), pt(50.0, 50.0));
    assert!(editor.copy().unwrap());
    assert!(editor.paste().unwrap());
    let first = editor.selected_ids()[0];
    assert!(editor.paste().unwrap());
    let second = editor.selected_ids()[0];

    let base = bounds(&editor, original);
    let a = bounds(&editor, first);
    let b = bounds(&editor, second);
    assert_eq!((a.x0 - base.x0, a.y0 - base.y0), (10.0, 10.0));
    assert_eq!((b.x0 - base.x0, b.y0 - base.y0), (20.0, 20.0));
    assert_eq!(editor.document().node_count(), 3);
}

#[test]
fn cut_content_pastes_once() {
    let mut editor = editor();
    draw_rect(&mut editor, pt(10.0, 10.0), pt(50.0, 50.0));
    assert!(editor.cut().unwrap());
    assert_eq!(editor.document().node_count(), 0);
    assert!(editor.selected_ids().is_empty());
    assert!(editor.paste().unwrap());
    assert_eq!(editor.document().node_count(), 1);
    assert!(!editor.clipboard().has_content());
    assert!(!editor.paste().unwrap());
    assert_eq!(editor.document().node_count(), 1);
}

#[test]
fn pasting_flattens_resize_wrappers() {
    let mut editor = editor_with(
        r#"<g data-resize-wrapper="1" transform="translate(10 10) scale(2)">
             <rect x="0" y="0" width="10" height="10"/>
           </g>"#,
    );
    let id = first_layer_ids(&editor)[0];
    editor.select(id).unwrap();
    editor.copy().unwrap();
    editor.paste().unwrap();
    let pasted = editor.document().node(editor.selected_ids()[0]).unwrap().clone();
    assert!(!pasted.is_wrapper());
    assert_rect(pasted.bounds().unwrap(), kurbo::Rect::new(20.0, 20.0, 40.0, 40.0));
}

#[test]
fn empty_paste_is_ignored() {
    let mut editor = editor();
    let depth = editor.history_depth();
    assert!(!editor.paste().unwrap());
    assert_eq!(editor.history_depth(), depth);
}
