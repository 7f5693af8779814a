//! Map document validation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use hexmap_core::map_state::MapState;
use hexmap_core::persistence::from_json;
use serde::Serialize;
use tracing::warn;

use crate::error::{HeadlessError, Result};

/// Summary of a map document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapReport {
    /// Placed items.
    pub items: usize,
    /// Items that take part in combat.
    pub combatants: usize,
    /// Combatants per faction.
    pub factions: BTreeMap<String, usize>,
    /// Paint strokes.
    pub strokes: usize,
    /// Image references that do not exist on disk, background included.
    pub missing_assets: Vec<String>,
}

impl MapReport {
    /// Summarise `map`, checking image references with `exists`.
    pub fn of(map: &MapState, exists: impl Fn(&str) -> bool) -> Self {
        let mut factions = BTreeMap::new();
        for (_, item) in map.combatants() {
            *factions.entry(item.faction.label().to_string()).or_insert(0) += 1;
        }

        let missing_assets: Vec<String> = map
            .background_image
            .iter()
            .chain(map.items.iter().map(|item| &item.image_path))
            .filter(|path| !path.is_empty() && !exists(path.as_str()))
            .cloned()
            .collect();

        Self {
            items: map.len(),
            combatants: map.combatants().count(),
            factions,
            strokes: map.drawings.len(),
            missing_assets,
        }
    }
}

/// Load the map document at `path` and summarise it.
pub fn validate_map(path: &Path) -> Result<MapReport> {
    if !path.exists() {
        return Err(HeadlessError::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    let map = from_json(&text)?;
    let report = MapReport::of(&map, |p| Path::new(p).exists());
    if !report.missing_assets.is_empty() {
        warn!(missing = report.missing_assets.len(), "map references missing images");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexmap_core::hex::HexCoord;
    use hexmap_core::item::{Faction, ItemKind, PlacedItem};

    fn sample() -> MapState {
        let mut map = MapState::new();
        let mut atlas = PlacedItem::new("tokens/Atlas.png", HexCoord::ORIGIN, 1.0);
        atlas.faction = Faction::Player;
        map.add_item(atlas);
        let mut drone = PlacedItem::new("tokens/Drone.png", HexCoord::new(1, 0), 1.0);
        drone.faction = Faction::Npc;
        map.add_item(drone);
        map.add_item(PlacedItem::new("tiles/grass.png", HexCoord::new(2, 0), 1.0).with_kind(ItemKind::Tile));
        map
    }

    #[test]
    fn test_report_counts() {
        let report = MapReport::of(&sample(), |p| p.starts_with("tokens/"));
        assert_eq!(report.items, 3);
        assert_eq!(report.combatants, 2);
        assert_eq!(report.factions.get("Player"), Some(&1));
        assert_eq!(report.factions.get("NPC"), Some(&1));
        assert_eq!(report.missing_assets, vec!["tiles/grass.png".to_string()]);
    }

    #[test]
    fn test_validate_rejects_bad_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(validate_map(&path), Err(HeadlessError::Core(_))));
        assert!(matches!(
            validate_map(&dir.path().join("absent.json")),
            Err(HeadlessError::FileNotFound(_))
        ));
    }
}
