//! Placed items: tokens and tiles on the map.
//!
//! Items are explicit records with optional combat attributes. Whether an
//! item takes part in combat is derived by [`PlacedItem::is_combatant`], never
//! stored.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::markers::is_turn_marker;

/// Slot of an item in the map's item list.
///
/// Slots are stable until an item is deleted; deleting shifts later slots down.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub usize);

impl ItemId {
    /// Slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Side an item fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Faction {
    /// Scenery and unaligned objects.
    #[default]
    Neutral,
    /// Player-controlled.
    Player,
    /// Controlled by the game master.
    #[serde(rename = "NPC")]
    Npc,
}

impl Faction {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Neutral => "Neutral",
            Self::Player => "Player",
            Self::Npc => "NPC",
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What kind of asset an item was placed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A unit or character token.
    #[default]
    Token,
    /// A terrain tile.
    Tile,
}

/// A numeric combat attribute that can be edited on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Current hit points.
    Hp,
    /// Hit point pool size.
    MaxHp,
    /// Structure boxes.
    Structure,
    /// Hexes of movement per turn.
    Speed,
    /// Defense against physical attacks.
    Evasion,
    /// Defense against electronic attacks.
    EDefense,
    /// Repair capacity.
    RepairCap,
    /// Heat capacity.
    HeatCap,
}

/// One visual entity on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    /// Collaborator-owned image reference.
    #[serde(rename = "path")]
    pub image_path: String,
    /// Anchor hex column.
    pub q: i32,
    /// Anchor hex row.
    pub r: i32,
    /// Asset kind.
    #[serde(rename = "type", default = "missing_kind")]
    pub kind: ItemKind,
    /// Visual scale class; drives the footprint.
    #[serde(rename = "scale", default = "default_scale")]
    pub footprint_scale: f64,
    /// Rotation in degrees, kept for renderers.
    #[serde(default)]
    pub rotation: i32,
    /// Side the item fights for.
    #[serde(default)]
    pub faction: Faction,
    /// Current hit points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    /// Hit point pool size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<i32>,
    /// Structure boxes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<i32>,
    /// Movement per turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<i32>,
    /// Evasion defense.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evasion: Option<i32>,
    /// E-Defense.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_defense: Option<i32>,
    /// Repair capacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repair_cap: Option<i32>,
    /// Heat capacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_cap: Option<i32>,
    /// Display-name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    /// Attached stat-block document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_file: Option<String>,
    /// Condition icons in application order. No duplicates.
    #[serde(default)]
    pub markers: Vec<String>,
    /// Whether a hex barrier is drawn around the item.
    #[serde(default)]
    pub hex_barrier: bool,
    /// Barrier thickness in hex rings.
    #[serde(default = "default_barrier_radius")]
    pub barrier_radius: u32,
}

/// Saved items without a `type` key never become tokens by kind alone.
fn missing_kind() -> ItemKind {
    ItemKind::Tile
}

fn default_scale() -> f64 {
    1.0
}

fn default_barrier_radius() -> u32 {
    1
}

/// Longest display name derived from a file stem.
pub const NAME_LIMIT: usize = 15;

impl PlacedItem {
    /// Create a token at `position` with no combat attributes.
    #[must_use]
    pub fn new(image_path: impl Into<String>, position: HexCoord, footprint_scale: f64) -> Self {
        Self {
            image_path: image_path.into(),
            q: position.q,
            r: position.r,
            kind: ItemKind::Token,
            footprint_scale,
            rotation: 0,
            faction: Faction::Neutral,
            hp: None,
            max_hp: None,
            structure: None,
            speed: None,
            evasion: None,
            e_defense: None,
            repair_cap: None,
            heat_cap: None,
            custom_name: None,
            linked_file: None,
            markers: Vec::new(),
            hex_barrier: false,
            barrier_radius: 1,
        }
    }

    /// Builder method to set the kind.
    #[must_use]
    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    /// Anchor hex.
    #[must_use]
    pub const fn position(&self) -> HexCoord {
        HexCoord::new(self.q, self.r)
    }

    /// Move the anchor hex.
    pub fn set_position(&mut self, hex: HexCoord) {
        self.q = hex.q;
        self.r = hex.r;
    }

    /// Read a combat attribute.
    #[must_use]
    pub const fn attribute(&self, attribute: Attribute) -> Option<i32> {
        match attribute {
            Attribute::Hp => self.hp,
            Attribute::MaxHp => self.max_hp,
            Attribute::Structure => self.structure,
            Attribute::Speed => self.speed,
            Attribute::Evasion => self.evasion,
            Attribute::EDefense => self.e_defense,
            Attribute::RepairCap => self.repair_cap,
            Attribute::HeatCap => self.heat_cap,
        }
    }

    /// Set or clear a combat attribute.
    pub fn set_attribute(&mut self, attribute: Attribute, value: Option<i32>) {
        let slot = match attribute {
            Attribute::Hp => &mut self.hp,
            Attribute::MaxHp => &mut self.max_hp,
            Attribute::Structure => &mut self.structure,
            Attribute::Speed => &mut self.speed,
            Attribute::Evasion => &mut self.evasion,
            Attribute::EDefense => &mut self.e_defense,
            Attribute::RepairCap => &mut self.repair_cap,
            Attribute::HeatCap => &mut self.heat_cap,
        };
        *slot = value;
    }

    /// Whether any combat attribute is present.
    #[must_use]
    pub fn has_combat_attributes(&self) -> bool {
        self.hp.is_some()
            || self.max_hp.is_some()
            || self.structure.is_some()
            || self.speed.is_some()
            || self.evasion.is_some()
            || self.e_defense.is_some()
            || self.repair_cap.is_some()
            || self.heat_cap.is_some()
    }

    /// Whether the image path names token or frame artwork.
    #[must_use]
    pub fn has_token_artwork(&self) -> bool {
        let path = self.image_path.to_lowercase();
        path.contains("token") || path.contains("frame")
    }

    /// Whether the item takes part in turn order and combat tools.
    #[must_use]
    pub fn is_combatant(&self) -> bool {
        self.kind == ItemKind::Token
            || self.has_token_artwork()
            || self.has_combat_attributes()
            || self.faction != Faction::Neutral
    }

    /// Name shown in logs and pickers.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self.custom_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let source = self.linked_file.as_deref().unwrap_or(&self.image_path);
        file_label(source)
    }

    /// Add a marker unless it is already present.
    pub fn add_marker(&mut self, marker: &str) -> bool {
        if self.markers.iter().any(|m| m == marker) {
            return false;
        }
        self.markers.push(marker.to_string());
        true
    }

    /// Add the marker if absent, remove it if present. Returns whether it is now attached.
    pub fn toggle_marker(&mut self, marker: &str) -> bool {
        if let Some(pos) = self.markers.iter().position(|m| m == marker) {
            self.markers.remove(pos);
            false
        } else {
            self.markers.push(marker.to_string());
            true
        }
    }

    /// Remove every turn marker. Returns how many were removed.
    pub fn strip_turn_markers(&mut self) -> usize {
        let before = self.markers.len();
        self.markers.retain(|m| !is_turn_marker(m));
        before - self.markers.len()
    }
}

/// File stem of `path`, truncated to [`NAME_LIMIT`] characters.
#[must_use]
pub fn file_label(path: &str) -> String {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    let stem = file_name.split('.').next().unwrap_or(file_name);
    stem.chars().take(NAME_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(path: &str) -> PlacedItem {
        PlacedItem::new(path, HexCoord::ORIGIN, 1.0).with_kind(ItemKind::Tile)
    }

    #[test]
    fn test_plain_tile_is_not_combatant() {
        assert!(!tile("maps/Tiles/rock.png").is_combatant());
    }

    #[test]
    fn test_token_kind_is_combatant() {
        assert!(PlacedItem::new("art/x.png", HexCoord::ORIGIN, 1.0).is_combatant());
    }

    #[test]
    fn test_artwork_path_makes_combatant() {
        assert!(tile("packs/Tokens/mech.png").is_combatant());
        assert!(tile("packs/FRAME_lancaster.png").is_combatant());
    }

    #[test]
    fn test_attribute_makes_combatant() {
        let mut item = tile("rock.png");
        item.speed = Some(4);
        assert!(item.is_combatant());
    }

    #[test]
    fn test_e_defense_makes_combatant() {
        let mut item = tile("rock.png");
        item.e_defense = Some(10);
        assert!(item.is_combatant());
    }

    #[test]
    fn test_faction_makes_combatant() {
        let mut item = tile("rock.png");
        item.faction = Faction::Npc;
        assert!(item.is_combatant());
    }

    #[test]
    fn test_display_name_priority() {
        let mut item = tile("art/Everest Size 1.png");
        assert_eq!(item.display_name(), "Everest Size 1");
        item.linked_file = Some("docs/pilot_sheet.txt".into());
        assert_eq!(item.display_name(), "pilot_sheet");
        item.custom_name = Some(String::new());
        assert_eq!(item.display_name(), "pilot_sheet");
        item.custom_name = Some("Vanguard".into());
        assert_eq!(item.display_name(), "Vanguard");
    }

    #[test]
    fn test_display_name_truncates() {
        let item = tile("a_really_long_file_name_here.png");
        assert_eq!(item.display_name(), "a_really_long_f");
    }

    #[test]
    fn test_markers_have_no_duplicates() {
        let mut item = tile("x.png");
        assert!(item.add_marker("m/Impaired.png"));
        assert!(!item.add_marker("m/Impaired.png"));
        assert!(item.toggle_marker("m/Stunned.png"));
        assert_eq!(item.markers, vec!["m/Impaired.png", "m/Stunned.png"]);
        assert!(!item.toggle_marker("m/Impaired.png"));
        assert_eq!(item.markers, vec!["m/Stunned.png"]);
    }

    #[test]
    fn test_strip_turn_markers() {
        let mut item = tile("x.png");
        item.markers = vec!["m/Turn.png".into(), "m/Stunned.png".into(), "other/turn.PNG".into()];
        assert_eq!(item.strip_turn_markers(), 2);
        assert_eq!(item.markers, vec!["m/Stunned.png"]);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let item: PlacedItem =
            serde_json::from_str(r#"{"path":"a.png","q":1,"r":-2}"#).expect("valid item");
        assert_eq!(item.position(), HexCoord::new(1, -2));
        assert_eq!(item.kind, ItemKind::Tile);
        assert!((item.footprint_scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(item.faction, Faction::Neutral);
        assert!(item.markers.is_empty());
        assert_eq!(item.barrier_radius, 1);
    }

    #[test]
    fn test_missing_type_is_not_a_token() {
        let item: PlacedItem =
            serde_json::from_str(r#"{"path":"tiles/rock.png","q":0,"r":0,"scale":3.0}"#)
                .expect("valid item");
        assert_ne!(item.kind, ItemKind::Token);
        assert!(!item.is_combatant());
    }
}
