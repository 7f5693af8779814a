//! Test fixtures and helpers.
//!
//! Pre-built items, marker catalogs and editor sessions
//! for consistent testing.

use hexmap_core::config::EditorConfig;
use hexmap_core::dice::ScriptedRolls;
use hexmap_core::editor::Editor;
use hexmap_core::hex::HexCoord;
use hexmap_core::item::{Faction, PlacedItem};
use hexmap_core::markers::StaticMarkers;

/// Marker paths in [`standard_markers`].
pub const MARKER_PATHS: [&str; 4] = [
    "markers/Impaired.png",
    "markers/Stunned.png",
    "markers/Turn.png",
    "markers/Overheated.png",
];

/// Marker catalog with turn, impaired and stunned icons.
#[must_use]
pub fn standard_markers() -> StaticMarkers {
    StaticMarkers::new(MARKER_PATHS)
}

/// A token at `(q, r)` with no combat attributes.
#[must_use]
pub fn token(name: &str, q: i32, r: i32) -> PlacedItem {
    PlacedItem::new(format!("tokens/{name}.png"), HexCoord::new(q, r), 1.0)
}

/// A token with speed, HP and structure set.
#[must_use]
pub fn mech(name: &str, q: i32, r: i32, hp: i32, structure: i32, speed: i32) -> PlacedItem {
    let mut item = token(name, q, r);
    item.hp = Some(hp);
    item.max_hp = Some(hp);
    item.structure = Some(structure);
    item.speed = Some(speed);
    item
}

/// Builder method style helper to set a faction.
#[must_use]
pub fn with_faction(mut item: PlacedItem, faction: Faction) -> PlacedItem {
    item.faction = faction;
    item
}

/// Editor with default config, [`standard_markers`] and scripted dice.
#[must_use]
pub fn scripted_editor(rolls: &[u32]) -> Editor {
    scripted_editor_with(EditorConfig::default(), rolls)
}

/// Editor with the given config, [`standard_markers`] and scripted dice.
#[must_use]
pub fn scripted_editor_with(config: EditorConfig, rolls: &[u32]) -> Editor {
    Editor::new(
        config,
        Box::new(standard_markers()),
        Box::new(ScriptedRolls::new(rolls.iter().copied())),
    )
}
