//! Pointer-driven editing through the editor facade.

use hexmap_core::config::{AppMode, EditorConfig};
use hexmap_core::editor::Editor;
use hexmap_core::events::Change;
use hexmap_core::hex::HexCoord;
use hexmap_core::interaction::{ArmedAsset, PointerButton, PressOutcome, Tool};
use hexmap_core::item::{Attribute, ItemId, ItemKind};
use hexmap_core::math::Point;
use hexmap_core::MapError;
use hexmap_test_utils::determinism::screen_of;
use hexmap_test_utils::fixtures::{scripted_editor, scripted_editor_with};

fn click(editor: &mut Editor, hex: HexCoord) -> PressOutcome {
    let screen = screen_of(editor, hex);
    let outcome = editor.pointer_down(screen, PointerButton::Primary);
    editor.pointer_up().unwrap();
    outcome
}

fn drag(editor: &mut Editor, from: HexCoord, to: HexCoord) -> hexmap_core::Result<u32> {
    let start = screen_of(editor, from);
    let end = screen_of(editor, to);
    editor.pointer_down(start, PointerButton::Primary);
    editor.pointer_drag(end);
    editor.pointer_up()
}

// =============================================================================
// Placement
// =============================================================================

#[test]
fn test_armed_token_places_on_click() {
    let mut editor = scripted_editor(&[]);
    editor.arm(ArmedAsset::token("tokens/Scout size 1_2.png"));

    assert_eq!(click(&mut editor, HexCoord::new(1, 1)), PressOutcome::Placed(ItemId(0)));
    assert_eq!(click(&mut editor, HexCoord::new(2, 1)), PressOutcome::Placed(ItemId(1)));

    let item = &editor.map().items[0];
    assert_eq!(item.position(), HexCoord::new(1, 1));
    assert!((item.footprint_scale - 1.0).abs() < f64::EPSILON);
    assert!(editor.router().armed().is_some());

    editor.escape();
    assert!(editor.router().armed().is_none());
}

#[test]
fn test_half_size_token_uses_display_scale() {
    let mut editor = scripted_editor(&[]);
    editor.arm(ArmedAsset::token("tokens/Drone size 0.5.png"));
    click(&mut editor, HexCoord::ORIGIN);
    assert!((editor.map().items[0].footprint_scale - 0.8).abs() < f64::EPSILON);
}

#[test]
fn test_background_fit_asks_for_size() {
    let config = EditorConfig {
        mode: AppMode::BackgroundFit,
        ..EditorConfig::default()
    };
    let mut editor = scripted_editor_with(config, &[]);
    editor.arm(ArmedAsset::tile("tiles/Ruin size 2.png"));

    assert_eq!(click(&mut editor, HexCoord::new(0, 2)), PressOutcome::PromptOpened);
    let prompt = editor.router().prompt().unwrap();
    assert!((prompt.suggested_size - 2.0).abs() < f64::EPSILON);
    assert!(editor.map().is_empty());

    assert!(matches!(editor.confirm_size(0.05), Err(MapError::InvalidSize(_))));
    assert!(editor.router().prompt().is_some());

    let id = editor.confirm_size(3.0).unwrap();
    let item = &editor.map().items[id.index()];
    assert_eq!(item.kind, ItemKind::Tile);
    assert_eq!(item.position(), HexCoord::new(0, 2));
    assert!((item.footprint_scale - 3.0).abs() < f64::EPSILON);
    assert!(editor.router().prompt().is_none());
}

#[test]
fn test_cancelled_prompt_places_nothing() {
    let config = EditorConfig {
        mode: AppMode::BackgroundFit,
        ..EditorConfig::default()
    };
    let mut editor = scripted_editor_with(config, &[]);
    editor.arm(ArmedAsset::token("tokens/ogre.png"));
    click(&mut editor, HexCoord::ORIGIN);

    assert!(editor.cancel_prompt());
    assert!(!editor.cancel_prompt());
    assert!(editor.map().is_empty());
}

// =============================================================================
// Selection and movement
// =============================================================================

#[test]
fn test_drag_moves_and_charges_the_acting_combatant() {
    let mut editor = scripted_editor(&[]);
    editor.arm(ArmedAsset::token("tokens/scout.png"));
    click(&mut editor, HexCoord::ORIGIN);
    editor.disarm();
    editor.set_attribute(ItemId(0), Attribute::Speed, Some(2)).unwrap();
    editor.start_turn(ItemId(0)).unwrap();

    let refused = drag(&mut editor, HexCoord::ORIGIN, HexCoord::new(3, 0));
    assert!(matches!(
        refused,
        Err(MapError::InsufficientMovement {
            needed: 3,
            available: 2
        })
    ));
    assert_eq!(editor.map().items[0].position(), HexCoord::ORIGIN);

    assert_eq!(drag(&mut editor, HexCoord::ORIGIN, HexCoord::new(2, 0)).unwrap(), 2);
    assert_eq!(editor.map().items[0].position(), HexCoord::new(2, 0));
    assert_eq!(editor.combat().session().budget().movement_remaining, 0);
    assert_eq!(editor.router().selected(), Some(ItemId(0)));
}

#[test]
fn test_bystanders_move_for_free() {
    let mut editor = scripted_editor(&[]);
    editor.arm(ArmedAsset::token("tokens/a.png"));
    click(&mut editor, HexCoord::ORIGIN);
    click(&mut editor, HexCoord::new(0, 3));
    editor.disarm();
    editor.start_turn(ItemId(0)).unwrap();

    assert_eq!(drag(&mut editor, HexCoord::new(0, 3), HexCoord::new(5, -2)).unwrap(), 0);
    assert_eq!(editor.map().items[1].position(), HexCoord::new(5, -2));
}

#[test]
fn test_click_on_empty_hex_deselects() {
    let mut editor = scripted_editor(&[]);
    editor.arm(ArmedAsset::token("tokens/a.png"));
    click(&mut editor, HexCoord::ORIGIN);
    editor.disarm();

    assert_eq!(click(&mut editor, HexCoord::ORIGIN), PressOutcome::Selected(ItemId(0)));
    assert_eq!(click(&mut editor, HexCoord::new(4, 4)), PressOutcome::Deselected);
    assert_eq!(editor.router().selected(), None);
}

#[test]
fn test_hover_ignores_scenery() {
    let mut editor = scripted_editor(&[]);
    editor.arm(ArmedAsset::tile("tiles/wall.png"));
    click(&mut editor, HexCoord::ORIGIN);
    editor.arm(ArmedAsset::token("tokens/a.png"));
    click(&mut editor, HexCoord::new(1, 0));
    editor.disarm();

    editor.pointer_move(screen_of(&editor, HexCoord::ORIGIN));
    assert_eq!(editor.router().hovered(), None);
    editor.pointer_move(screen_of(&editor, HexCoord::new(1, 0)));
    assert_eq!(editor.router().hovered(), Some(ItemId(1)));
    editor.pointer_leave();
    assert_eq!(editor.router().hovered(), None);
}

// =============================================================================
// Paint and erase
// =============================================================================

#[test]
fn test_paint_then_erase() {
    let mut editor = scripted_editor(&[]);
    editor.take_changes();
    editor.set_tool(Tool::Paint);

    let start = Point::new(300.0, 300.0);
    editor.pointer_down(start, PointerButton::Primary);
    editor.pointer_drag(Point::new(340.0, 300.0));
    editor.pointer_drag(Point::new(380.0, 320.0));
    editor.pointer_up().unwrap();

    assert_eq!(editor.map().drawings.len(), 1);
    assert_eq!(editor.map().drawings[0].points.len(), 3);
    assert_eq!(editor.map().drawings[0].color, "white");
    assert!(editor.take_changes().contains(&Change::Drawings));
    assert_eq!(editor.frame().strokes.len(), 1);

    editor.set_tool(Tool::Erase);
    let outcome = editor.pointer_down(Point::new(345.0, 305.0), PointerButton::Primary);
    editor.pointer_up().unwrap();
    assert_eq!(outcome, PressOutcome::Erased(1));
    assert!(editor.map().drawings.is_empty());
}

#[test]
fn test_middle_button_pans_without_editing() {
    let mut editor = scripted_editor(&[]);
    editor.set_tool(Tool::Paint);
    let before = editor.viewport().camera;

    let outcome = editor.pointer_down(Point::new(100.0, 100.0), PointerButton::Middle);
    editor.pointer_drag(Point::new(150.0, 80.0));
    editor.pointer_up().unwrap();

    assert_eq!(outcome, PressOutcome::PanStarted);
    assert!(editor.map().drawings.is_empty());
    assert_ne!(editor.viewport().camera, before);
}

// =============================================================================
// Frames
// =============================================================================

#[test]
fn test_frame_draws_tiles_under_tokens() {
    let mut editor = scripted_editor(&[]);
    editor.arm(ArmedAsset::token("tokens/a.png"));
    click(&mut editor, HexCoord::ORIGIN);
    editor.arm(ArmedAsset::tile("tiles/floor.png"));
    click(&mut editor, HexCoord::new(1, 0));
    editor.disarm();

    let frame = editor.frame();
    let kinds: Vec<ItemKind> = frame.sprites.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![ItemKind::Tile, ItemKind::Token]);
    assert!(!frame.cells.is_empty());
    assert_eq!(frame.sprite(ItemId(0)).unwrap().center, screen_of(&editor, HexCoord::ORIGIN));
}
