//! Proptest strategies.
//!
//! These strategies generate random but reproducible inputs for
//! property-based testing of grid math, dice parsing and editor scripts.

use hexmap_core::camera::ZoomDirection;
use hexmap_core::dice::DiceExpr;
use hexmap_core::hex::{HexCoord, HexGrid, HexOrientation};
use hexmap_core::item::{Faction, ItemKind, PlacedItem};
use hexmap_core::math::Fixed;
use proptest::prelude::*;

use crate::determinism::EditorStep;

/// Generate an axial coordinate with both components in `-range..=range`.
pub fn arb_hex(range: i32) -> impl Strategy<Value = HexCoord> {
    (-range..=range, -range..=range).prop_map(|(q, r)| HexCoord::new(q, r))
}

/// Generate either grid orientation.
pub fn arb_orientation() -> impl Strategy<Value = HexOrientation> {
    prop_oneof![Just(HexOrientation::FlatTop), Just(HexOrientation::PointyTop)]
}

/// Generate a grid with a cell radius between 8 and 120 pixels.
pub fn arb_grid() -> impl Strategy<Value = HexGrid> {
    (8u32..=120, arb_orientation()).prop_map(|(size, orientation)| HexGrid::new(f64::from(size), orientation))
}

/// Generate a footprint scale in quarter steps from 0.25 to 4.
pub fn arb_footprint_scale() -> impl Strategy<Value = f64> {
    (1u32..=16).prop_map(|quarters| f64::from(quarters) / 4.0)
}

/// Generate dice notation with the expression it should parse to.
///
/// Covers an omitted count, upper-case `D`, spaces and signed modifiers.
pub fn arb_dice_expr() -> impl Strategy<Value = (String, DiceExpr)> {
    (
        1u32..=12,
        1u32..=20,
        -10i32..=10,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(count, sides, modifier, upper, spaced)| {
            let count_text = if count == 1 && upper {
                String::new()
            } else {
                count.to_string()
            };
            let d = if upper { "D" } else { "d" };
            let modifier_text = match modifier.signum() {
                1 => format!("+{modifier}"),
                -1 => format!("-{}", modifier.abs()),
                _ => String::new(),
            };
            let text = if spaced {
                format!("{count_text} {d}{sides} {modifier_text}")
            } else {
                format!("{count_text}{d}{sides}{modifier_text}")
            };
            (text, DiceExpr::new(count, sides, Fixed::from_num(modifier)))
        })
}

/// Generate a faction.
pub fn arb_faction() -> impl Strategy<Value = Faction> {
    prop_oneof![Just(Faction::Neutral), Just(Faction::Player), Just(Faction::Npc)]
}

/// Combat attributes of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestStats {
    /// Current and maximum HP.
    pub hp: i32,
    /// Structure points.
    pub structure: i32,
    /// Hexes per turn.
    pub speed: i32,
    /// Evasion defense.
    pub evasion: i32,
}

/// Generate combat attributes in tabletop ranges.
pub fn arb_stats() -> impl Strategy<Value = TestStats> {
    (1i32..=30, 0i32..=4, 0i32..=8, 5i32..=14).prop_map(|(hp, structure, speed, evasion)| TestStats {
        hp,
        structure,
        speed,
        evasion,
    })
}

/// Generate a placed item, with stats on roughly half of them.
pub fn arb_item() -> impl Strategy<Value = PlacedItem> {
    (
        "[a-z]{1,12}",
        arb_hex(20),
        arb_footprint_scale(),
        prop_oneof![Just(ItemKind::Token), Just(ItemKind::Tile)],
        arb_faction(),
        proptest::option::of(arb_stats()),
    )
        .prop_map(|(name, hex, scale, kind, faction, stats)| {
            let mut item = PlacedItem::new(format!("tokens/{name}.png"), hex, scale).with_kind(kind);
            item.faction = faction;
            if let Some(stats) = stats {
                item.hp = Some(stats.hp);
                item.max_hp = Some(stats.hp);
                item.structure = Some(stats.structure);
                item.speed = Some(stats.speed);
                item.evasion = Some(stats.evasion);
            }
            item
        })
}

/// Generate one editor script step over the first few item slots.
pub fn arb_editor_step() -> impl Strategy<Value = EditorStep> {
    prop_oneof![
        ("[a-z]{1,8}", arb_hex(4)).prop_map(|(name, hex)| EditorStep::Place {
            path: format!("tokens/{name}.png"),
            hex,
        }),
        (arb_hex(4), arb_hex(4)).prop_map(|(from, to)| EditorStep::Drag { from, to }),
        (0usize..4).prop_map(EditorStep::StartTurn),
        Just(EditorStep::EndTurn),
        Just(EditorStep::QuickAction),
        Just(EditorStep::FullAction),
        Just(EditorStep::Overcharge),
        (0usize..4, 0usize..4, arb_dice_expr()).prop_map(|(attacker, target, (damage, _))| {
            EditorStep::Attack {
                attacker,
                target,
                damage,
            }
        }),
        arb_dice_expr().prop_map(|(expr, _)| EditorStep::Roll(expr)),
        prop_oneof![Just(ZoomDirection::In), Just(ZoomDirection::Out)].prop_map(EditorStep::Zoom),
        (0u64..250).prop_map(EditorStep::Tick),
        (0usize..4).prop_map(EditorStep::Delete),
    ]
}

/// Generate a script of editor steps.
pub fn arb_editor_script(max_len: usize) -> impl Strategy<Value = Vec<EditorStep>> {
    proptest::collection::vec(arb_editor_step(), 0..max_len)
}
