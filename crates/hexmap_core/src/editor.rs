//! Editor session: the map, camera, combat session and gesture router wired
//! together behind one owner.
//!
//! Every input runs to completion on the caller's thread. Mutations mark the
//! [`ChangeTracker`]; the host drains it once per frame with
//! [`Editor::take_changes`] and redraws from [`Editor::frame`]. Deferred work
//! (round auto-advance) runs from [`Editor::tick`].

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use tracing::{debug, info, warn};

use crate::assets::AssetIndex;
use crate::camera::{Viewport, ZoomDirection};
use crate::combat::{AttackReport, AttackRequest, CombatController, CombatEvent};
use crate::config::{AppMode, EditorConfig};
use crate::dice::{RollOutcome, RollSource};
use crate::error::Result;
use crate::events::{Change, ChangeTracker};
use crate::footprint::MAX_BARRIER_RADIUS;
use crate::hex::HexGrid;
use crate::interaction::{ArmedAsset, Canvas, InteractionRouter, PointerButton, PressOutcome, Tool};
use crate::item::{Attribute, Faction, ItemId, PlacedItem};
use crate::map_state::MapState;
use crate::markers::MarkerCatalog;
use crate::math::Point;
use crate::render::{FrameOptions, RenderFrame};
use crate::scheduler::{Deferred, Scheduler};
use crate::statblock::{is_stat_document, StatBlock};

/// One editing session.
pub struct Editor {
    config: EditorConfig,
    map: MapState,
    viewport: Viewport,
    combat: CombatController,
    router: InteractionRouter,
    changes: ChangeTracker,
    scheduler: Scheduler,
    markers: Box<dyn MarkerCatalog>,
    rolls: Box<dyn RollSource>,
    background_size: Option<(f64, f64)>,
}

impl Editor {
    /// Session over an empty map built from `config`.
    #[must_use]
    pub fn new(config: EditorConfig, markers: Box<dyn MarkerCatalog>, rolls: Box<dyn RollSource>) -> Self {
        let map = config.new_map();
        let combat = CombatController::new(config.default_defense);
        Self {
            config,
            map,
            viewport: Viewport::default(),
            combat,
            router: InteractionRouter::new(),
            changes: ChangeTracker::new(),
            scheduler: Scheduler::new(),
            markers,
            rolls,
            background_size: None,
        }
    }

    /// Settings.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Map document.
    #[must_use]
    pub const fn map(&self) -> &MapState {
        &self.map
    }

    /// Camera.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Combat controller.
    #[must_use]
    pub const fn combat(&self) -> &CombatController {
        &self.combat
    }

    /// Gesture state.
    #[must_use]
    pub const fn router(&self) -> &InteractionRouter {
        &self.router
    }

    /// Deferred work queue.
    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Grid geometry for the current map.
    #[must_use]
    pub fn grid(&self) -> HexGrid {
        self.config.grid_for(&self.map)
    }

    fn canvas(&mut self) -> (&mut InteractionRouter, Canvas<'_>) {
        (
            &mut self.router,
            Canvas {
                map: &mut self.map,
                viewport: &mut self.viewport,
                combat: &mut self.combat,
                changes: &mut self.changes,
                config: &self.config,
            },
        )
    }

    fn mark_everything(&mut self) {
        self.changes.mark_all([
            Change::Items,
            Change::Drawings,
            Change::Camera,
            Change::Selection,
            Change::Hover,
            Change::Combat,
            Change::Grid,
        ]);
    }

    // ------------------------------------------------------------------
    // Document
    // ------------------------------------------------------------------

    /// Replace the map. Combat and gestures start over.
    pub fn load_map(&mut self, map: MapState) {
        info!(items = map.len(), strokes = map.drawings.len(), "map loaded");
        self.map = map;
        self.combat.reset();
        self.router = InteractionRouter::new();
        self.scheduler.cancel_all();
        self.background_size = None;
        self.mark_everything();
    }

    /// Start over with an empty map.
    pub fn new_map(&mut self) {
        let map = self.config.new_map();
        self.load_map(map);
    }

    /// Re-point stale asset paths through `index`.
    pub fn resolve_assets(&mut self, index: &AssetIndex, exists: impl Fn(&str) -> bool) -> usize {
        let fixed = index.resolve_missing(&mut self.map, exists);
        if fixed > 0 {
            self.changes.mark_all([Change::Items, Change::Grid]);
        }
        fixed
    }

    /// Set the background image with its size in pixels.
    ///
    /// In background-fit mode the camera fits the image to the canvas.
    pub fn set_background(&mut self, path: impl Into<String>, size: Option<(f64, f64)>) {
        self.map.background_image = Some(path.into());
        self.background_size = size;
        if let (AppMode::BackgroundFit, Some((w, h))) = (self.config.mode, size) {
            self.viewport.fit_to_image(w, h);
            self.changes.mark(Change::Camera);
        }
        self.changes.mark(Change::Grid);
    }

    /// Move the grid origin.
    pub fn set_grid_offset(&mut self, offset: Point) {
        self.map.set_grid_offset(offset);
        self.changes.mark_all([Change::Grid, Change::Items]);
    }

    /// Resize the canvas.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
        self.changes.mark(Change::Camera);
    }

    /// Remove every stroke.
    pub fn clear_drawings(&mut self) {
        self.map.clear_drawings();
        self.changes.mark(Change::Drawings);
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Pointer pressed.
    pub fn pointer_down(&mut self, screen: Point, button: PointerButton) -> PressOutcome {
        let (router, mut canvas) = self.canvas();
        router.pointer_down(&mut canvas, screen, button)
    }

    /// Pointer moved with a button held.
    pub fn pointer_drag(&mut self, screen: Point) {
        let (router, mut canvas) = self.canvas();
        router.pointer_drag(&mut canvas, screen);
    }

    /// Pointer released. Returns the hexes paid for by the acting combatant.
    ///
    /// # Errors
    ///
    /// A refused move; the item is already back at its start hex.
    pub fn pointer_up(&mut self) -> Result<u32> {
        let (router, mut canvas) = self.canvas();
        router.pointer_up(&mut canvas)
    }

    /// Pointer moved with no button held.
    pub fn pointer_move(&mut self, screen: Point) {
        let (router, mut canvas) = self.canvas();
        router.pointer_move(&mut canvas, screen);
    }

    /// Pointer left the canvas.
    pub fn pointer_leave(&mut self) {
        self.router.pointer_leave(&mut self.changes);
    }

    /// One zoom step. Returns the new scale.
    pub fn zoom(&mut self, direction: ZoomDirection) -> f64 {
        let (router, mut canvas) = self.canvas();
        router.wheel(&mut canvas, direction)
    }

    /// Switch tool.
    pub fn set_tool(&mut self, tool: Tool) {
        self.router.set_tool(tool);
    }

    /// Arm an asset for placement.
    pub fn arm(&mut self, asset: ArmedAsset) {
        self.router.arm(asset, &mut self.changes);
    }

    /// Stop placing.
    pub fn disarm(&mut self) {
        self.router.disarm(&mut self.changes);
    }

    /// Select an item directly.
    pub fn select(&mut self, id: Option<ItemId>) {
        self.router.select(id, &mut self.changes);
    }

    /// Close the prompt, disarm and deselect.
    pub fn escape(&mut self) {
        self.router.escape(&mut self.changes);
    }

    /// Confirm the placement size prompt.
    ///
    /// # Errors
    ///
    /// No prompt is open, or the size is too small.
    pub fn confirm_size(&mut self, size: f64) -> Result<ItemId> {
        let (router, mut canvas) = self.canvas();
        router.confirm_size(&mut canvas, size)
    }

    /// Dismiss the placement size prompt.
    pub fn cancel_prompt(&mut self) -> bool {
        self.router.cancel_prompt()
    }

    // ------------------------------------------------------------------
    // Item editing
    // ------------------------------------------------------------------

    /// Delete an item. Combat and selection shift to the new slots.
    ///
    /// # Errors
    ///
    /// Stale id.
    pub fn delete_item(&mut self, id: ItemId) -> Result<PlacedItem> {
        let item = self.map.remove_item(id)?;
        self.combat.on_item_removed(id);
        self.router.on_item_removed(id);
        debug!(%id, path = %item.image_path, "item deleted");
        self.changes.mark_all([Change::Items, Change::Selection, Change::Combat]);
        Ok(item)
    }

    /// Delete the selected item, if any.
    pub fn delete_selected(&mut self) -> Option<PlacedItem> {
        let id = self.router.selected()?;
        self.delete_item(id).ok()
    }

    fn edit<T>(&mut self, id: ItemId, edit: impl FnOnce(&mut PlacedItem) -> T) -> Result<T> {
        let result = edit(self.map.require_mut(id)?);
        self.changes.mark(Change::Items);
        Ok(result)
    }

    /// Toggle the hex barrier. Returns whether it is now on.
    ///
    /// # Errors
    ///
    /// Stale id.
    pub fn toggle_barrier(&mut self, id: ItemId) -> Result<bool> {
        self.edit(id, |item| {
            item.hex_barrier = !item.hex_barrier;
            item.hex_barrier
        })
    }

    /// Set the barrier thickness, kept within `1..=MAX_BARRIER_RADIUS`.
    ///
    /// # Errors
    ///
    /// Stale id.
    pub fn set_barrier_radius(&mut self, id: ItemId, radius: u32) -> Result<()> {
        self.edit(id, |item| item.barrier_radius = radius.clamp(1, MAX_BARRIER_RADIUS))
    }

    /// Set the faction.
    ///
    /// # Errors
    ///
    /// Stale id.
    pub fn set_faction(&mut self, id: ItemId, faction: Faction) -> Result<()> {
        self.edit(id, |item| item.faction = faction)
    }

    /// Set or clear the display-name override. Empty names clear it.
    ///
    /// # Errors
    ///
    /// Stale id.
    pub fn set_custom_name(&mut self, id: ItemId, name: Option<String>) -> Result<()> {
        let name = name.filter(|n| !n.trim().is_empty());
        self.edit(id, |item| item.custom_name = name)
    }

    /// Toggle a marker. Returns whether it is now attached.
    ///
    /// # Errors
    ///
    /// Stale id.
    pub fn toggle_marker(&mut self, id: ItemId, marker: &str) -> Result<bool> {
        self.edit(id, |item| item.toggle_marker(marker))
    }

    /// Set or clear one combat attribute.
    ///
    /// # Errors
    ///
    /// Stale id.
    pub fn set_attribute(&mut self, id: ItemId, attribute: Attribute, value: Option<i32>) -> Result<()> {
        self.edit(id, |item| item.set_attribute(attribute, value))
    }

    /// Attach or detach a document.
    ///
    /// When the document is a stat block and its `text` is given, stats are
    /// imported. Returns the attributes that changed.
    ///
    /// # Errors
    ///
    /// Stale id.
    pub fn link_file(&mut self, id: ItemId, path: Option<String>, text: Option<&str>) -> Result<Vec<Attribute>> {
        self.edit(id, |item| {
            let import = path.as_deref().is_some_and(is_stat_document);
            item.linked_file = path;
            match text {
                Some(text) if import => StatBlock::parse(text).apply_to(item),
                _ => Vec::new(),
            }
        })
    }

    // ------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------

    fn after_combat<T>(&mut self, result: Result<T>) -> Result<T> {
        self.changes.mark(Change::Combat);
        if result.is_ok() {
            self.changes.mark(Change::Items);
        }
        result
    }

    /// Make `id` the acting combatant.
    ///
    /// # Errors
    ///
    /// Stale id or not a combatant.
    pub fn start_turn(&mut self, id: ItemId) -> Result<()> {
        let result = self.combat.start_turn(&mut self.map, self.markers.as_ref(), id);
        self.after_combat(result)
    }

    /// End the current turn. Schedules the next round when everyone has acted.
    pub fn end_turn(&mut self) -> bool {
        let complete = self.combat.end_turn(&mut self.map);
        if complete && !self.scheduler.is_pending(Deferred::AdvanceRound) {
            self.scheduler
                .schedule(Deferred::AdvanceRound, self.config.advance_delay_ms);
        }
        self.changes.mark_all([Change::Combat, Change::Items]);
        complete
    }

    /// Start the next round now.
    pub fn next_round(&mut self) {
        self.combat.next_round(&mut self.map);
        self.changes.mark_all([Change::Combat, Change::Items]);
    }

    /// Back to round 1 with nobody acting.
    pub fn reset_combat(&mut self) {
        self.combat.reset();
        self.scheduler.cancel_all();
        self.changes.mark(Change::Combat);
    }

    /// Roll which faction goes first.
    pub fn decide_first_faction(&mut self) -> Option<Faction> {
        self.changes.mark(Change::Combat);
        self.combat.decide_first_faction(&self.map, self.rolls.as_mut())
    }

    /// Spend one half-action unit.
    ///
    /// # Errors
    ///
    /// None left.
    pub fn use_quick_action(&mut self) -> Result<()> {
        let result = self.combat.use_quick_action();
        self.after_combat(result)
    }

    /// Spend two half-action units.
    ///
    /// # Errors
    ///
    /// Fewer than two left.
    pub fn use_full_action(&mut self) -> Result<()> {
        let result = self.combat.use_full_action();
        self.after_combat(result)
    }

    /// Record a free action.
    pub fn use_free_action(&mut self) {
        self.combat.use_free_action();
        self.changes.mark(Change::Combat);
    }

    /// Gain one half-action unit, once per turn.
    ///
    /// # Errors
    ///
    /// Already used this turn.
    pub fn use_overcharge(&mut self) -> Result<()> {
        let result = self.combat.use_overcharge();
        self.after_combat(result)
    }

    /// Adjust movement by one hex.
    pub fn adjust_movement(&mut self, gain: bool) {
        self.combat.adjust_movement(gain);
        self.changes.mark(Change::Combat);
    }

    /// Roll an attack.
    ///
    /// # Errors
    ///
    /// See [`CombatController::perform_attack`].
    pub fn attack(&mut self, request: &AttackRequest) -> Result<AttackReport> {
        let result = self.combat.perform_attack(
            &mut self.map,
            self.markers.as_ref(),
            self.rolls.as_mut(),
            request,
        );
        self.after_combat(result)
    }

    /// Roll a dice expression.
    ///
    /// # Errors
    ///
    /// Malformed expression.
    pub fn roll_dice(&mut self, expr: &str) -> Result<RollOutcome> {
        self.changes.mark(Change::Combat);
        self.combat.roll_dice(expr, self.rolls.as_mut())
    }

    /// Narrated combat events since the last call.
    pub fn drain_log(&mut self) -> Vec<CombatEvent> {
        self.combat.drain_events()
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// Advance the clock and run deferred work that came due.
    pub fn tick(&mut self, elapsed_ms: u64) {
        for task in self.scheduler.advance(elapsed_ms) {
            match task {
                Deferred::AdvanceRound => {
                    if self.combat.session().active().is_some() {
                        warn!("round advance skipped, a turn is in progress");
                        continue;
                    }
                    self.next_round();
                }
            }
        }
    }

    /// Changes since the last call.
    pub fn take_changes(&mut self) -> BTreeSet<Change> {
        self.changes.drain()
    }

    /// Screen-space snapshot for the renderer.
    #[must_use]
    pub fn frame(&self) -> RenderFrame {
        let options = FrameOptions {
            mode: self.config.mode,
            background_size: self.background_size,
            selected: self.router.selected(),
            hovered: self.router.hovered(),
        };
        RenderFrame::build(&self.map, &self.viewport, &self.grid(), &options)
    }

    /// Hash of the map and combat session, equal for equal states.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        let session = self.combat.session();
        session.round().hash(&mut hasher);
        session.active().hash(&mut hasher);
        session.acted().hash(&mut hasher);
        let budget = session.budget();
        budget.movement_remaining.hash(&mut hasher);
        budget.actions_remaining.hash(&mut hasher);
        budget.free_actions_taken.hash(&mut hasher);
        budget.overcharge_used.hash(&mut hasher);

        self.map.len().hash(&mut hasher);
        for item in &self.map.items {
            item.image_path.hash(&mut hasher);
            item.position().hash(&mut hasher);
            item.kind.hash(&mut hasher);
            item.footprint_scale.to_bits().hash(&mut hasher);
            item.faction.hash(&mut hasher);
            for attribute in ATTRIBUTES {
                item.attribute(attribute).hash(&mut hasher);
            }
            item.custom_name.hash(&mut hasher);
            item.linked_file.hash(&mut hasher);
            item.markers.hash(&mut hasher);
            item.hex_barrier.hash(&mut hasher);
            item.barrier_radius.hash(&mut hasher);
        }

        self.map.drawings.len().hash(&mut hasher);
        for stroke in &self.map.drawings {
            stroke.color.hash(&mut hasher);
            for point in &stroke.points {
                point.x.to_bits().hash(&mut hasher);
                point.y.to_bits().hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

const ATTRIBUTES: [Attribute; 8] = [
    Attribute::Hp,
    Attribute::MaxHp,
    Attribute::Structure,
    Attribute::Speed,
    Attribute::Evasion,
    Attribute::EDefense,
    Attribute::RepairCap,
    Attribute::HeatCap,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedRolls;
    use crate::hex::HexCoord;
    use crate::markers::StaticMarkers;

    fn editor(rolls: &[u32]) -> Editor {
        Editor::new(
            EditorConfig::default(),
            Box::new(StaticMarkers::new(["markers/Turn.png", "markers/Impaired.png"])),
            Box::new(ScriptedRolls::new(rolls.iter().copied())),
        )
    }

    fn token(editor: &mut Editor, name: &str, q: i32) -> ItemId {
        editor.arm(ArmedAsset::token(format!("tokens/{name}.png")));
        let grid = editor.grid();
        let world = editor.map().hex_to_world(&grid, HexCoord::new(q, 0));
        let screen = editor.viewport().world_to_screen(world);
        match editor.pointer_down(screen, PointerButton::Primary) {
            PressOutcome::Placed(id) => id,
            other => panic!("expected placement, got {other:?}"),
        }
    }

    #[test]
    fn test_round_advances_after_delay() {
        let mut ed = editor(&[]);
        let a = token(&mut ed, "alpha", 0);
        let b = token(&mut ed, "bravo", 2);

        ed.start_turn(a).expect("combatant");
        assert!(!ed.end_turn());
        ed.start_turn(b).expect("combatant");
        assert_eq!(ed.map().items[b.index()].markers, vec!["markers/Turn.png"]);
        assert!(ed.end_turn());
        assert!(ed.map().items[b.index()].markers.is_empty());

        ed.tick(50);
        assert_eq!(ed.combat().session().round(), 1);
        ed.tick(50);
        assert_eq!(ed.combat().session().round(), 2);
        assert!(ed.combat().session().acted().is_empty());
    }

    #[test]
    fn test_delete_keeps_session_consistent() {
        let mut ed = editor(&[]);
        let a = token(&mut ed, "alpha", 0);
        let b = token(&mut ed, "bravo", 1);
        let c = token(&mut ed, "charlie", 2);
        ed.start_turn(a).expect("combatant");
        ed.start_turn(c).expect("combatant");
        ed.select(Some(c));

        ed.delete_item(b).expect("exists");
        assert_eq!(ed.combat().session().active(), Some(ItemId(1)));
        assert_eq!(ed.router().selected(), Some(ItemId(1)));
        assert!(ed.delete_item(ItemId(5)).is_err());

        assert!(ed.delete_selected().is_some());
        assert_eq!(ed.combat().session().active(), None);
        assert_eq!(ed.map().len(), 1);
    }

    #[test]
    fn test_link_stat_block() {
        let mut ed = editor(&[]);
        let a = token(&mut ed, "alpha", 0);
        let changed = ed
            .link_file(a, Some("sheets/alpha.txt".into()), Some("HP: 9 Speed 3"))
            .expect("exists");
        assert_eq!(changed, vec![Attribute::MaxHp, Attribute::Hp, Attribute::Speed]);
        assert_eq!(ed.map().items[0].display_name(), "alpha");

        let changed = ed
            .link_file(a, Some("sheets/alpha.pdf".into()), Some("HP: 1"))
            .expect("exists");
        assert!(changed.is_empty());
        assert_eq!(ed.map().items[0].hp, Some(9));
    }

    #[test]
    fn test_barrier_radius_setter_caps() {
        let mut ed = editor(&[]);
        let a = token(&mut ed, "alpha", 0);
        ed.set_barrier_radius(a, 4_000_000_000).expect("exists");
        assert_eq!(ed.map().items[0].barrier_radius, MAX_BARRIER_RADIUS);
    }

    #[test]
    fn test_item_edits_mark_changes() {
        let mut ed = editor(&[]);
        let a = token(&mut ed, "alpha", 0);
        ed.take_changes();

        assert!(ed.toggle_barrier(a).expect("exists"));
        ed.set_barrier_radius(a, 0).expect("exists");
        ed.set_faction(a, Faction::Npc).expect("exists");
        ed.set_custom_name(a, Some("  ".into())).expect("exists");
        assert!(ed.toggle_marker(a, "markers/Impaired.png").expect("exists"));
        ed.set_attribute(a, Attribute::Evasion, Some(11)).expect("exists");

        let item = &ed.map().items[0];
        assert_eq!(item.barrier_radius, 1);
        assert_eq!(item.faction, Faction::Npc);
        assert_eq!(item.custom_name, None);
        assert_eq!(item.evasion, Some(11));
        assert!(ed.take_changes().contains(&Change::Items));
        assert!(ed.set_faction(ItemId(9), Faction::Player).is_err());
    }

    #[test]
    fn test_attack_through_editor() {
        let mut ed = editor(&[15, 4]);
        let a = token(&mut ed, "alpha", 0);
        let b = token(&mut ed, "bravo", 1);
        ed.set_attribute(b, Attribute::Hp, Some(10)).expect("exists");
        ed.start_turn(a).expect("combatant");
        ed.drain_log();

        let report = ed
            .attack(&AttackRequest::new(a, b, "1d6"))
            .expect("valid attack");
        assert!(report.outcome.lands());
        assert_eq!(ed.map().items[1].hp, Some(6));
        assert!(ed.drain_log().iter().any(|e| matches!(e, CombatEvent::DamageTaken { amount: 4, .. })));
    }

    #[test]
    fn test_state_hash_tracks_changes() {
        let mut ed = editor(&[]);
        let a = token(&mut ed, "alpha", 0);
        let before = ed.state_hash();
        assert_eq!(before, ed.state_hash());
        ed.set_attribute(a, Attribute::Hp, Some(3)).expect("exists");
        assert_ne!(before, ed.state_hash());
    }

    #[test]
    fn test_load_map_resets_session() {
        let mut ed = editor(&[]);
        let a = token(&mut ed, "alpha", 0);
        ed.start_turn(a).expect("combatant");
        ed.load_map(MapState::new());
        assert_eq!(ed.combat().session().active(), None);
        assert!(ed.map().is_empty());
        assert!(ed.take_changes().contains(&Change::Grid));
    }
}
