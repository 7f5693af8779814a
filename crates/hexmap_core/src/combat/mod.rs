//! Combat tracking: rounds, turns, action economy and attack resolution.
//!
//! Each combatant is in one of three [`TurnState`]s per round. At most one is
//! acting; starting a new turn ends the current one first. The acting
//! combatant spends from an [`ActionBudget`] that resets at turn start.
//!
//! All operations narrate into an event buffer (see [`CombatEvent`]) that the
//! caller drains with [`CombatController::drain_events`]. Rejected operations
//! narrate the rejection, return an error and leave the session untouched.

mod damage;
mod log;
mod structure;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dice::{DiceSpec, RollOutcome, RollSource};
use crate::error::{MapError, Result};
use crate::hex::HexCoord;
use crate::item::{Faction, ItemId};
use crate::map_state::MapState;
use crate::markers::MarkerCatalog;

pub use damage::{AttackReport, AttackRequest, DamageReport};
pub use log::{ActionKind, AttackOutcome, CombatEvent, DefenseKind};
pub use structure::{roll_structure_damage, DirectHit, StructureCheck, StructureEffect, TraumaLoss};

/// Half-action units granted at turn start.
pub const ACTIONS_PER_TURN: u32 = 2;
/// Defense used when the target has no score for the chosen defense.
pub const DEFAULT_DEFENSE: i32 = 8;

/// Per-combatant state within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// Has not acted this round.
    Untouched,
    /// Currently acting.
    ActingNow,
    /// Finished acting this round.
    ActedThisRound,
}

/// Resources of the acting combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionBudget {
    /// Hexes of movement left.
    pub movement_remaining: u32,
    /// Half-action units left.
    pub actions_remaining: u32,
    /// Free actions taken this turn.
    pub free_actions_taken: u32,
    /// Whether overcharge was used this turn.
    pub overcharge_used: bool,
}

impl ActionBudget {
    /// Fresh budget for a combatant with the given speed.
    #[must_use]
    pub fn for_turn(speed: Option<i32>) -> Self {
        Self {
            movement_remaining: speed.map_or(0, |s| u32::try_from(s).unwrap_or(0)),
            actions_remaining: ACTIONS_PER_TURN,
            free_actions_taken: 0,
            overcharge_used: false,
        }
    }
}

/// Round and turn bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSession {
    round: u32,
    active: Option<ItemId>,
    acted: BTreeSet<ItemId>,
    budget: ActionBudget,
}

impl Default for CombatSession {
    fn default() -> Self {
        Self {
            round: 1,
            active: None,
            acted: BTreeSet::new(),
            budget: ActionBudget::default(),
        }
    }
}

impl CombatSession {
    /// Current round, starting at 1.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// The acting combatant.
    #[must_use]
    pub const fn active(&self) -> Option<ItemId> {
        self.active
    }

    /// Combatants that finished acting this round.
    #[must_use]
    pub const fn acted(&self) -> &BTreeSet<ItemId> {
        &self.acted
    }

    /// Budget of the acting combatant.
    #[must_use]
    pub const fn budget(&self) -> &ActionBudget {
        &self.budget
    }

    /// Turn state of `id`.
    #[must_use]
    pub fn state_of(&self, id: ItemId) -> TurnState {
        if self.active == Some(id) {
            TurnState::ActingNow
        } else if self.acted.contains(&id) {
            TurnState::ActedThisRound
        } else {
            TurnState::Untouched
        }
    }
}

/// Drives the combat session against the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatController {
    session: CombatSession,
    default_defense: i32,
    events: Vec<CombatEvent>,
}

impl Default for CombatController {
    fn default() -> Self {
        Self::new(DEFAULT_DEFENSE)
    }
}

impl CombatController {
    /// Controller for round 1 with nobody acting.
    #[must_use]
    pub fn new(default_defense: i32) -> Self {
        Self {
            session: CombatSession::default(),
            default_defense,
            events: Vec::new(),
        }
    }

    /// Session state.
    #[must_use]
    pub const fn session(&self) -> &CombatSession {
        &self.session
    }

    /// Defense used for targets with no score.
    #[must_use]
    pub const fn default_defense(&self) -> i32 {
        self.default_defense
    }

    /// Take every event narrated since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events not yet drained.
    #[must_use]
    pub fn pending_events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub(crate) fn emit(&mut self, event: CombatEvent) {
        info!(target: "combat", "{event}");
        self.events.push(event);
    }

    fn reject(&mut self, event: CombatEvent, error: MapError) -> MapError {
        warn!(target: "combat", %error, "combat operation rejected");
        self.events.push(event);
        error
    }

    // ========================================================================
    // Rounds and turns
    // ========================================================================

    /// Make `id` the acting combatant.
    ///
    /// Ends the current turn first (without auto-advance), resets the budget
    /// from the item's speed and attaches the turn marker when the catalog has
    /// one.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an item or not a combatant.
    pub fn start_turn(
        &mut self,
        map: &mut MapState,
        markers: &dyn MarkerCatalog,
        id: ItemId,
    ) -> Result<()> {
        let item = map.require(id)?;
        if !item.is_combatant() {
            return Err(MapError::NotCombatant(id));
        }

        if self.session.active.is_some() {
            self.end_turn(map);
        }

        let item = map.require_mut(id)?;
        if let Some(marker) = markers.turn_marker() {
            item.add_marker(&marker);
        }
        self.session.active = Some(id);
        self.session.budget = ActionBudget::for_turn(item.speed);
        let name = item.display_name();
        self.emit(CombatEvent::TurnStarted { name });
        Ok(())
    }

    /// End the acting combatant's turn.
    ///
    /// Returns true when the round is complete: nobody is waiting and at least
    /// one item has token artwork. The caller schedules [`Self::next_round`].
    /// Does nothing and returns false when nobody is acting.
    pub fn end_turn(&mut self, map: &mut MapState) -> bool {
        let Some(id) = self.session.active.take() else {
            return false;
        };
        let name = map.item(id).map_or_else(unknown_name, |item| item.display_name());
        if let Some(item) = map.item_mut(id) {
            item.strip_turn_markers();
        }
        self.session.acted.insert(id);
        self.emit(CombatEvent::TurnEnded { name });

        self.awaiting(map).is_empty() && map.items.iter().any(|item| item.has_token_artwork())
    }

    /// Advance to the next round.
    ///
    /// Everyone returns to [`TurnState::Untouched`], the acting pointer clears
    /// and every turn marker on the map is removed.
    pub fn next_round(&mut self, map: &mut MapState) {
        self.session.round += 1;
        self.session.acted.clear();
        self.session.active = None;
        self.session.budget = ActionBudget::default();
        for item in &mut map.items {
            item.strip_turn_markers();
        }
        self.emit(CombatEvent::RoundStarted {
            round: self.session.round,
        });
    }

    /// Back to round 1 with nobody acting.
    pub fn reset(&mut self) {
        self.session = CombatSession::default();
    }

    /// Combatants waiting to act this round, in item order.
    #[must_use]
    pub fn awaiting(&self, map: &MapState) -> Vec<ItemId> {
        map.combatants()
            .map(|(id, _)| id)
            .filter(|id| self.session.state_of(*id) == TurnState::Untouched)
            .collect()
    }

    /// Pick uniformly among the factions of combatants that have not acted.
    pub fn decide_first_faction(
        &mut self,
        map: &MapState,
        source: &mut dyn RollSource,
    ) -> Option<Faction> {
        let factions: Vec<Faction> = map
            .combatants()
            .filter(|(id, _)| !self.session.acted.contains(id))
            .map(|(_, item)| item.faction)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let count = u32::try_from(factions.len()).unwrap_or(u32::MAX);
        let chosen = if count == 0 {
            None
        } else {
            let pick = source.roll_die(count).saturating_sub(1) as usize;
            factions.get(pick).copied()
        };
        self.emit(CombatEvent::FirstFaction { faction: chosen });
        chosen
    }

    /// Keep the session consistent after item `removed` was deleted.
    pub fn on_item_removed(&mut self, removed: ItemId) {
        let shift = |id: ItemId| -> Option<ItemId> {
            match id.index().cmp(&removed.index()) {
                std::cmp::Ordering::Less => Some(id),
                std::cmp::Ordering::Equal => None,
                std::cmp::Ordering::Greater => Some(ItemId(id.index() - 1)),
            }
        };
        self.session.active = self.session.active.and_then(shift);
        self.session.acted = self.session.acted.iter().copied().filter_map(shift).collect();
    }

    // ========================================================================
    // Action economy
    // ========================================================================

    /// Spend one half-action unit.
    ///
    /// # Errors
    ///
    /// [`MapError::InsufficientActions`] if none are left.
    pub fn use_quick_action(&mut self) -> Result<()> {
        self.spend_action(ActionKind::Quick)
    }

    /// Spend two half-action units.
    ///
    /// # Errors
    ///
    /// [`MapError::InsufficientActions`] if fewer than two are left.
    pub fn use_full_action(&mut self) -> Result<()> {
        self.spend_action(ActionKind::Full)
    }

    fn spend_action(&mut self, kind: ActionKind) -> Result<()> {
        let available = self.session.budget.actions_remaining;
        let needed = kind.cost();
        if available < needed {
            return Err(self.reject(
                CombatEvent::ActionRejected { kind },
                MapError::InsufficientActions { needed, available },
            ));
        }
        self.session.budget.actions_remaining -= needed;
        self.emit(CombatEvent::ActionUsed {
            kind,
            remaining: self.session.budget.actions_remaining,
        });
        Ok(())
    }

    /// Record a free action. Free actions are unlimited.
    pub fn use_free_action(&mut self) {
        self.session.budget.free_actions_taken += 1;
        self.emit(CombatEvent::FreeActionUsed {
            taken: self.session.budget.free_actions_taken,
        });
    }

    /// Gain one half-action unit, once per turn.
    ///
    /// # Errors
    ///
    /// [`MapError::OverchargeSpent`] if already used this turn. Nothing is
    /// narrated in that case.
    pub fn use_overcharge(&mut self) -> Result<()> {
        if self.session.budget.overcharge_used {
            return Err(MapError::OverchargeSpent);
        }
        self.session.budget.overcharge_used = true;
        self.session.budget.actions_remaining += 1;
        self.emit(CombatEvent::Overcharged);
        Ok(())
    }

    /// Manually add or remove one hex of movement. Removal stops at zero.
    pub fn adjust_movement(&mut self, gain: bool) {
        let budget = &mut self.session.budget;
        if gain {
            budget.movement_remaining += 1;
        } else if budget.movement_remaining > 0 {
            budget.movement_remaining -= 1;
        } else {
            return;
        }
        let remaining = budget.movement_remaining;
        self.emit(CombatEvent::MovementAdjusted {
            gained: gain,
            remaining,
        });
    }

    /// Settle a finished drag of `id` from `from` to its current hex.
    ///
    /// Only the acting combatant pays movement; anyone else moves freely.
    /// Moves longer than the remaining movement snap the item back to `from`.
    /// Returns the hexes paid for.
    ///
    /// # Errors
    ///
    /// [`MapError::InsufficientMovement`] when the move was refused, or
    /// [`MapError::NoSuchItem`] for a stale id.
    pub fn settle_move(&mut self, map: &mut MapState, id: ItemId, from: HexCoord) -> Result<u32> {
        let item = map.require_mut(id)?;
        if self.session.active != Some(id) {
            return Ok(0);
        }
        let to = item.position();
        let distance = from.distance(to);
        if distance == 0 {
            return Ok(0);
        }

        let available = self.session.budget.movement_remaining;
        if distance > available {
            item.set_position(from);
            return Err(self.reject(
                CombatEvent::MoveRejected {
                    needed: distance,
                    available,
                },
                MapError::InsufficientMovement {
                    needed: distance,
                    available,
                },
            ));
        }

        let name = item.display_name();
        self.session.budget.movement_remaining -= distance;
        self.emit(CombatEvent::Moved {
            name,
            spaces: distance,
            remaining: self.session.budget.movement_remaining,
        });
        Ok(distance)
    }

    // ========================================================================
    // Dice
    // ========================================================================

    /// Roll an expression from the dice roller and narrate it.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidDice`] for malformed expressions.
    pub fn roll_dice(&mut self, expr: &str, source: &mut dyn RollSource) -> Result<RollOutcome> {
        let spec = match DiceSpec::parse(expr) {
            Ok(spec) => spec,
            Err(error) => {
                return Err(self.reject(
                    CombatEvent::InvalidDice {
                        expr: expr.to_string(),
                    },
                    error,
                ))
            }
        };
        let outcome = spec.evaluate(source);
        self.emit(CombatEvent::Rolled {
            expr: expr.to_string(),
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }
}

fn unknown_name() -> String {
    "Unknown".to_string()
}

/// Roster label used in pickers: `[id] Faction - Name`.
#[must_use]
pub fn roster_label(map: &MapState, id: ItemId) -> Option<String> {
    map.item(id)
        .map(|item| format!("{id} {} - {}", item.faction, item.display_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedRolls;
    use crate::item::{ItemKind, PlacedItem};
    use crate::markers::StaticMarkers;

    fn markers() -> StaticMarkers {
        StaticMarkers::new(["m/Impaired.png", "m/Turn.png", "m/Stunned.png"])
    }

    fn unit(map: &mut MapState, name: &str, speed: i32) -> ItemId {
        let mut item = PlacedItem::new(format!("tokens/{name}.png"), HexCoord::ORIGIN, 1.0);
        item.speed = Some(speed);
        map.add_item(item)
    }

    // ========================================================================
    // Turns
    // ========================================================================

    #[test]
    fn test_start_turn_resets_budget_and_marks() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 4);
        let mut combat = CombatController::default();

        combat.start_turn(&mut map, &markers(), a).expect("combatant");

        assert_eq!(combat.session().active(), Some(a));
        assert_eq!(
            *combat.session().budget(),
            ActionBudget {
                movement_remaining: 4,
                actions_remaining: 2,
                free_actions_taken: 0,
                overcharge_used: false
            }
        );
        assert_eq!(map.items[0].markers, vec!["m/Turn.png"]);
        assert_eq!(combat.session().state_of(a), TurnState::ActingNow);
    }

    #[test]
    fn test_start_turn_without_turn_marker() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 4);
        let mut combat = CombatController::default();
        combat.start_turn(&mut map, &StaticMarkers::empty(), a).expect("combatant");
        assert!(map.items[0].markers.is_empty());
    }

    #[test]
    fn test_start_turn_rejects_non_combatant_and_stale() {
        let mut map = MapState::new();
        let rock = map.add_item(PlacedItem::new("rock.png", HexCoord::ORIGIN, 1.0).with_kind(ItemKind::Tile));
        let mut combat = CombatController::default();
        assert!(matches!(
            combat.start_turn(&mut map, &markers(), rock),
            Err(MapError::NotCombatant(_))
        ));
        assert!(matches!(
            combat.start_turn(&mut map, &markers(), ItemId(9)),
            Err(MapError::NoSuchItem(_))
        ));
        assert_eq!(combat.session().active(), None);
    }

    #[test]
    fn test_starting_second_turn_ends_first() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 4);
        let b = unit(&mut map, "bravo", 2);
        let mut combat = CombatController::default();

        combat.start_turn(&mut map, &markers(), a).expect("a");
        combat.start_turn(&mut map, &markers(), b).expect("b");

        assert_eq!(combat.session().state_of(a), TurnState::ActedThisRound);
        assert_eq!(combat.session().state_of(b), TurnState::ActingNow);
        assert!(map.items[0].markers.is_empty());
        assert_eq!(combat.session().budget().movement_remaining, 2);
    }

    #[test]
    fn test_end_turn_signals_round_completion() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 4);
        let b = unit(&mut map, "bravo", 4);
        let mut combat = CombatController::default();

        combat.start_turn(&mut map, &markers(), a).expect("a");
        assert!(!combat.end_turn(&mut map));
        assert_eq!(combat.awaiting(&map), vec![b]);

        combat.start_turn(&mut map, &markers(), b).expect("b");
        assert!(combat.end_turn(&mut map));
        assert!(combat.awaiting(&map).is_empty());
    }

    #[test]
    fn test_end_turn_without_token_artwork_does_not_advance() {
        let mut map = MapState::new();
        let mut item = PlacedItem::new("art/knight.png", HexCoord::ORIGIN, 1.0);
        item.hp = Some(5);
        let a = map.add_item(item);
        let mut combat = CombatController::default();
        combat.start_turn(&mut map, &markers(), a).expect("a");
        assert!(!combat.end_turn(&mut map));
    }

    #[test]
    fn test_end_turn_when_idle_is_noop() {
        let mut map = MapState::new();
        let mut combat = CombatController::default();
        assert!(!combat.end_turn(&mut map));
        assert!(combat.drain_events().is_empty());
    }

    #[test]
    fn test_next_round_clears_acted_and_markers() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 4);
        let b = unit(&mut map, "bravo", 4);
        map.items[1].markers = vec!["stale/TURN.png".into(), "m/Stunned.png".into()];
        let mut combat = CombatController::default();
        combat.start_turn(&mut map, &markers(), a).expect("a");
        combat.end_turn(&mut map);

        combat.next_round(&mut map);

        assert_eq!(combat.session().round(), 2);
        assert!(combat.session().acted().is_empty());
        assert_eq!(combat.session().state_of(a), TurnState::Untouched);
        assert_eq!(map.items[b.index()].markers, vec!["m/Stunned.png"]);
    }

    #[test]
    fn test_item_removal_shifts_session() {
        let mut map = MapState::new();
        let ids: Vec<ItemId> = ["a", "b", "c", "d"].iter().map(|n| unit(&mut map, n, 1)).collect();
        let mut combat = CombatController::default();
        for &id in &ids[..3] {
            combat.start_turn(&mut map, &markers(), id).expect("turn");
        }
        // a, b acted; c acting
        combat.on_item_removed(ItemId(1));
        assert_eq!(combat.session().active(), Some(ItemId(1)));
        assert_eq!(combat.session().acted().iter().copied().collect::<Vec<_>>(), vec![ItemId(0)]);

        combat.on_item_removed(ItemId(1));
        assert_eq!(combat.session().active(), None);
    }

    #[test]
    fn test_reset() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 4);
        let mut combat = CombatController::default();
        combat.start_turn(&mut map, &markers(), a).expect("a");
        combat.next_round(&mut map);
        combat.reset();
        assert_eq!(*combat.session(), CombatSession::default());
    }

    // ========================================================================
    // Actions
    // ========================================================================

    #[test]
    fn test_action_spending() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 4);
        let mut combat = CombatController::default();
        combat.start_turn(&mut map, &markers(), a).expect("a");

        combat.use_quick_action().expect("1 of 2");
        assert_eq!(combat.session().budget().actions_remaining, 1);

        combat.drain_events();
        let err = combat.use_full_action().unwrap_err();
        assert!(matches!(err, MapError::InsufficientActions { needed: 2, available: 1 }));
        assert_eq!(combat.session().budget().actions_remaining, 1);
        assert_eq!(
            combat.drain_events(),
            vec![CombatEvent::ActionRejected { kind: ActionKind::Full }]
        );
    }

    #[test]
    fn test_overcharge_once_per_turn() {
        let mut combat = CombatController::default();
        combat.use_overcharge().expect("first");
        assert_eq!(combat.session().budget().actions_remaining, 1);
        assert!(matches!(combat.use_overcharge(), Err(MapError::OverchargeSpent)));
        assert_eq!(combat.session().budget().actions_remaining, 1);
    }

    #[test]
    fn test_free_actions_unbounded() {
        let mut combat = CombatController::default();
        for _ in 0..5 {
            combat.use_free_action();
        }
        assert_eq!(combat.session().budget().free_actions_taken, 5);
    }

    #[test]
    fn test_adjust_movement_floors_at_zero() {
        let mut combat = CombatController::default();
        combat.adjust_movement(false);
        assert_eq!(combat.session().budget().movement_remaining, 0);
        assert!(combat.drain_events().is_empty());
        combat.adjust_movement(true);
        combat.adjust_movement(true);
        combat.adjust_movement(false);
        assert_eq!(combat.session().budget().movement_remaining, 1);
    }

    // ========================================================================
    // Movement
    // ========================================================================

    #[test]
    fn test_move_within_budget() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 3);
        let mut combat = CombatController::default();
        combat.start_turn(&mut map, &markers(), a).expect("a");

        map.items[0].set_position(HexCoord::new(2, 0));
        assert_eq!(combat.settle_move(&mut map, a, HexCoord::ORIGIN).ok(), Some(2));
        assert_eq!(combat.session().budget().movement_remaining, 1);
    }

    #[test]
    fn test_move_over_budget_snaps_back() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 2);
        let mut combat = CombatController::default();
        combat.start_turn(&mut map, &markers(), a).expect("a");

        map.items[0].set_position(HexCoord::new(3, -3));
        let err = combat.settle_move(&mut map, a, HexCoord::ORIGIN).unwrap_err();
        assert!(matches!(err, MapError::InsufficientMovement { needed: 3, available: 2 }));
        assert_eq!(map.items[0].position(), HexCoord::ORIGIN);
        assert_eq!(combat.session().budget().movement_remaining, 2);
    }

    #[test]
    fn test_move_of_inactive_item_is_free() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 0);
        let b = unit(&mut map, "bravo", 0);
        let mut combat = CombatController::default();
        combat.start_turn(&mut map, &markers(), a).expect("a");

        map.items[1].set_position(HexCoord::new(5, 5));
        assert_eq!(combat.settle_move(&mut map, b, HexCoord::ORIGIN).ok(), Some(0));
        assert_eq!(map.items[1].position(), HexCoord::new(5, 5));
    }

    // ========================================================================
    // Initiative and dice
    // ========================================================================

    #[test]
    fn test_decide_first_faction() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 1);
        map.items[a.index()].faction = Faction::Player;
        let b = unit(&mut map, "bravo", 1);
        map.items[b.index()].faction = Faction::Npc;
        let mut combat = CombatController::default();

        // Factions are ordered Neutral < Player < NPC; roll 2 picks the second.
        let chosen = combat.decide_first_faction(&map, &mut ScriptedRolls::new([2]));
        assert_eq!(chosen, Some(Faction::Npc));
    }

    #[test]
    fn test_decide_first_faction_without_combatants() {
        let map = MapState::new();
        let mut combat = CombatController::default();
        assert_eq!(combat.decide_first_faction(&map, &mut ScriptedRolls::new([1])), None);
        assert_eq!(
            combat.drain_events(),
            vec![CombatEvent::FirstFaction { faction: None }]
        );
    }

    #[test]
    fn test_roll_dice_narrates() {
        let mut combat = CombatController::default();
        let outcome = combat
            .roll_dice("2d6+3", &mut ScriptedRolls::new([4, 5]))
            .expect("valid");
        assert_eq!(outcome.total, crate::math::Fixed::from_num(12));
        let lines: Vec<String> = combat.drain_events().iter().map(ToString::to_string).collect();
        assert_eq!(lines, vec!["> Rolled 2d6+3: [4, 5]+3 = 12"]);

        assert!(combat.roll_dice("2x6", &mut ScriptedRolls::default()).is_err());
        assert_eq!(
            combat.drain_events(),
            vec![CombatEvent::InvalidDice { expr: "2x6".into() }]
        );
    }

    #[test]
    fn test_roster_label() {
        let mut map = MapState::new();
        let a = unit(&mut map, "alpha", 1);
        map.items[0].faction = Faction::Player;
        assert_eq!(roster_label(&map, a).as_deref(), Some("[0] Player - alpha"));
        assert_eq!(roster_label(&map, ItemId(4)), None);
    }
}
