mod common;

use common::*;
use crosshair_engine::layers::LayerId;
use crosshair_engine::{EditorError, LayerDirection, Notice};

#[test]
fn the_last_layer_cannot_be_deleted() {
    let mut editor = editor();
    let only = editor.document().active_layer_id();
    assert!(matches!(editor.request_delete_layer(only), Err(EditorError::LastLayer)));
    assert_eq!(editor.pending_layer_deletion(), None);
    assert_eq!(editor.document().layers().len(), 1);
}

#[test]
fn deleting_reassigns_the_active_layer_and_drops_its_elements() {
    let mut editor = editor();
    let bottom = editor.document().active_layer_id();
    let middle = editor.add_layer(None).unwrap();
    draw_rect(&mut editor, pt(10.0, 10.0), pt(50.0, 50.0));
    let top = editor.add_layer(Some("Top")).unwrap();
    editor.select_layer(middle).unwrap();
    editor.drain_notices();

    assert!(editor.request_delete_layer(middle).unwrap());
    let notices = editor.drain_notices();
    assert!(notices.contains(&Notice::ConfirmLayerDeletion { layer: middle, name: "Layer 2".into() }));
    // a second request waits for the first to resolve
    assert!(matches!(editor.request_delete_layer(top), Err(EditorError::DeletionPending)));

    let active = editor.confirm_delete_layer().unwrap();
    assert_eq!(active, top);
    assert_eq!(editor.document().active_layer_id(), top);
    let ids: Vec<LayerId> = editor.document().layers().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![bottom, top]);
    assert_eq!(editor.document().node_count(), 0);
    assert!(editor.selected_ids().is_empty());
}

#[test]
fn cancelled_deletion_keeps_the_layer() {
    let mut editor = editor();
    let second = editor.add_layer(None).unwrap();
    editor.request_delete_layer(second).unwrap();
    assert!(editor.cancel_delete_layer());
    assert_eq!(editor.document().layers().len(), 2);
    assert!(matches!(editor.confirm_delete_layer(), Err(EditorError::NoPendingDeletion)));
}

#[test]
fn default_names_keep_counting_after_deletions() {
    let mut editor = editor();
    let second = editor.add_layer(None).unwrap();
    editor.request_delete_layer(second).unwrap();
    editor.confirm_delete_layer().unwrap();
    let third = editor.add_layer(None).unwrap();
    assert_eq!(editor.document().layer(third).unwrap().name, "Layer 3");
}

#[test]
fn rename_trims_truncates_and_ignores_empty_text() {
    let mut editor = editor();
    let id = editor.document().active_layer_id();
    editor.begin_rename(id).unwrap();
    assert!(!editor.commit_rename("   ").unwrap());
    assert_eq!(editor.document().layer(id).unwrap().name, "Layer 1");
    assert_eq!(editor.renaming_layer(), None);

    assert!(editor.rename_layer(id, "  a name that is much longer than thirty characters  ").unwrap());
    let name = &editor.document().layer(id).unwrap().name;
    assert_eq!(name, "a name that is much longer tha");
    assert!(editor.undo().unwrap());
    assert_eq!(editor.document().layer(id).unwrap().name, "Layer 1");
}

#[test]
fn layer_panel_is_frozen_while_renaming() {
    let mut editor = editor();
    let first = editor.document().active_layer_id();
    let second = editor.add_layer(None).unwrap();
    editor.begin_rename(second).unwrap();
    assert!(!editor.select_layer(first).unwrap());
    assert!(!editor.toggle_visibility(second).unwrap());
    assert!(!editor.move_layer(second, LayerDirection::Down).unwrap());
    assert!(!editor.request_delete_layer(second).unwrap());
    editor.cancel_rename();
    assert!(editor.move_layer(second, LayerDirection::Down).unwrap());
    assert_eq!(editor.document().layers()[0].id, second);
    assert!(!editor.move_layer(second, LayerDirection::Down).unwrap());
}

#[test]
fn summaries_list_the_top_layer_first() {
    let mut editor = editor();
    draw_rect(&mut editor, pt(10.0, 10.0), pt(50.0, 50.0));
    let top = editor.add_layer(Some("Sky")).unwrap();
    let rows = editor.layer_summaries();
    assert_eq!(rows[0].id, top);
    assert_eq!(rows[0].name, "Sky");
    assert!(rows[0].active);
    assert_eq!(rows[0].kind, "empty");
    assert_eq!(rows[1].kind, "rect");
}

#[test]
fn hidden_layers_are_not_hit() {
    let mut editor = editor_with(
        r#"<g data-layer="true" data-layer-id="layer-1"><rect x="0" y="0" width="40" height="40"/></g>
           <g data-layer="true" data-layer-id="layer-2"><rect x="0" y="0" width="40" height="40"/></g>"#,
    );
    let below = first_layer_ids(&editor)[0];
    let top_layer = editor.document().layers()[1].id;
    click(&mut editor, pt(20.0, 20.0), crosshair_engine::Modifiers::NONE);
    assert_ne!(editor.selected_ids(), vec![below]);
    editor.toggle_visibility(top_layer).unwrap();
    assert!(editor.selected_ids().is_empty());
    click(&mut editor, pt(20.0, 20.0), crosshair_engine::Modifiers::NONE);
    assert_eq!(editor.selected_ids(), vec![below]);
}
