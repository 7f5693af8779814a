//! Pointer and keyboard routing.
//!
//! [`InteractionRouter`] owns gesture state only: what is selected, hovered,
//! armed for placement and being dragged. Each handler resolves the screen
//! point through the viewport and grid, then mutates the borrowed
//! [`Canvas`] and marks what changed.
//!
//! Placement and selection are exclusive: while an asset is armed, primary
//! clicks place it; otherwise they select. Paint and erase tools take
//! precedence over both.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assets::{default_size_from_filename, display_scale};
use crate::camera::{PanGesture, Viewport, ZoomDirection};
use crate::combat::CombatController;
use crate::config::{AppMode, EditorConfig};
use crate::error::{MapError, Result};
use crate::events::{Change, ChangeTracker};
use crate::hex::{HexCoord, HexGrid};
use crate::item::{ItemId, ItemKind, PlacedItem};
use crate::map_state::MapState;
use crate::math::Point;

/// Smallest size accepted by the placement prompt.
pub const MIN_PLACEMENT_SIZE: f64 = 0.1;

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Select, place, drag, paint or erase.
    #[default]
    Primary,
    /// Pan the camera.
    Middle,
}

/// Active canvas tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Select, drag and place.
    #[default]
    Select,
    /// Freehand strokes.
    Paint,
    /// Remove whole strokes under the cursor.
    Erase,
}

/// An asset waiting to be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmedAsset {
    /// Image reference.
    pub path: String,
    /// Token or tile.
    #[serde(default)]
    pub kind: ItemKind,
}

impl ArmedAsset {
    /// Arm `path` as a token.
    #[must_use]
    pub fn token(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ItemKind::Token,
        }
    }

    /// Arm `path` as a tile.
    #[must_use]
    pub fn tile(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ItemKind::Tile,
        }
    }
}

/// Open placement size prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizePrompt {
    /// Asset to place.
    pub asset: ArmedAsset,
    /// Hex that was clicked.
    pub hex: HexCoord,
    /// Size derived from the filename.
    pub suggested_size: f64,
}

/// Gesture in progress between pointer down and up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    Pan(PanGesture),
    Paint {
        stroke: usize,
    },
    Erase,
    DragItem {
        id: ItemId,
        from: HexCoord,
    },
}

/// Mutable editor state a handler works on.
pub struct Canvas<'a> {
    /// Map document.
    pub map: &'a mut MapState,
    /// Camera.
    pub viewport: &'a mut Viewport,
    /// Combat session, consulted when a drag settles.
    pub combat: &'a mut CombatController,
    /// Change notifications.
    pub changes: &'a mut ChangeTracker,
    /// Settings.
    pub config: &'a EditorConfig,
}

impl Canvas<'_> {
    /// Grid geometry for the current map.
    #[must_use]
    pub fn grid(&self) -> HexGrid {
        self.config.grid_for(self.map)
    }

    /// World point under a screen point.
    #[must_use]
    pub fn world_at(&self, screen: Point) -> Point {
        self.viewport.screen_to_world(screen)
    }

    /// Hex under a screen point.
    #[must_use]
    pub fn hex_at(&self, screen: Point) -> HexCoord {
        let grid = self.grid();
        self.map.world_to_hex(&grid, self.world_at(screen))
    }
}

/// What a primary pointer press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Nothing under the pointer.
    Nothing,
    /// An item was placed.
    Placed(ItemId),
    /// A size prompt opened instead of placing.
    PromptOpened,
    /// An item was selected and may be dragged.
    Selected(ItemId),
    /// Selection was cleared.
    Deselected,
    /// A stroke was started.
    StrokeStarted(usize),
    /// Strokes were erased.
    Erased(usize),
    /// A pan began.
    PanStarted,
}

/// Gesture state for one canvas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionRouter {
    tool: Tool,
    armed: Option<ArmedAsset>,
    selected: Option<ItemId>,
    hovered: Option<ItemId>,
    prompt: Option<SizePrompt>,
    gesture: Gesture,
}

impl InteractionRouter {
    /// Router in select mode with nothing armed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tool.
    #[must_use]
    pub const fn tool(&self) -> Tool {
        self.tool
    }

    /// Armed asset, if any.
    #[must_use]
    pub fn armed(&self) -> Option<&ArmedAsset> {
        self.armed.as_ref()
    }

    /// Selected item.
    #[must_use]
    pub const fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    /// Hovered combatant.
    #[must_use]
    pub const fn hovered(&self) -> Option<ItemId> {
        self.hovered
    }

    /// Open size prompt.
    #[must_use]
    pub fn prompt(&self) -> Option<&SizePrompt> {
        self.prompt.as_ref()
    }

    /// Whether a pointer gesture is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    /// Switch tool.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Arm an asset for placement. Clears the selection.
    pub fn arm(&mut self, asset: ArmedAsset, changes: &mut ChangeTracker) {
        debug!(path = %asset.path, "asset armed");
        self.armed = Some(asset);
        self.selected = None;
        changes.mark(Change::Selection);
    }

    /// Stop placing.
    pub fn disarm(&mut self, changes: &mut ChangeTracker) {
        if self.armed.take().is_some() {
            changes.mark(Change::Selection);
        }
    }

    /// Select an item directly, as from a roster list.
    pub fn select(&mut self, id: Option<ItemId>, changes: &mut ChangeTracker) {
        if self.selected != id {
            self.selected = id;
            changes.mark(Change::Selection);
        }
    }

    /// Escape: close the prompt, disarm and deselect.
    pub fn escape(&mut self, changes: &mut ChangeTracker) {
        self.prompt = None;
        self.disarm(changes);
        self.select(None, changes);
    }

    /// Keep ids valid after slot `removed` was deleted.
    pub fn on_item_removed(&mut self, removed: ItemId) {
        let shift = |id: ItemId| match id.index().cmp(&removed.index()) {
            std::cmp::Ordering::Less => Some(id),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(ItemId(id.index() - 1)),
        };
        self.selected = self.selected.and_then(shift);
        self.hovered = self.hovered.and_then(shift);
        if let Gesture::DragItem { id, from } = self.gesture {
            self.gesture = shift(id).map_or(Gesture::Idle, |id| Gesture::DragItem { id, from });
        }
    }

    // ------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------

    /// Pointer pressed at `screen`.
    pub fn pointer_down(
        &mut self,
        canvas: &mut Canvas<'_>,
        screen: Point,
        button: PointerButton,
    ) -> PressOutcome {
        if button == PointerButton::Middle {
            self.gesture = Gesture::Pan(canvas.viewport.begin_pan(screen));
            return PressOutcome::PanStarted;
        }

        let world = canvas.world_at(screen);
        match self.tool {
            Tool::Paint => {
                let stroke = canvas.map.begin_stroke(canvas.config.paint_color.clone(), world);
                self.gesture = Gesture::Paint { stroke };
                canvas.changes.mark(Change::Drawings);
                return PressOutcome::StrokeStarted(stroke);
            }
            Tool::Erase => {
                self.gesture = Gesture::Erase;
                return PressOutcome::Erased(erase(canvas, world));
            }
            Tool::Select => {}
        }

        let hex = canvas.hex_at(screen);
        if let Some(asset) = self.armed.clone() {
            return self.place(canvas, asset, hex);
        }

        match canvas.map.item_at(hex) {
            Some(id) => {
                self.select(Some(id), canvas.changes);
                self.gesture = Gesture::DragItem { id, from: hex };
                PressOutcome::Selected(id)
            }
            None if self.selected.is_some() => {
                self.select(None, canvas.changes);
                PressOutcome::Deselected
            }
            None => PressOutcome::Nothing,
        }
    }

    /// Pointer moved with a button held.
    pub fn pointer_drag(&mut self, canvas: &mut Canvas<'_>, screen: Point) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Pan(gesture) => {
                canvas.viewport.pan_to(&gesture, screen);
                canvas.changes.mark(Change::Camera);
            }
            Gesture::Paint { stroke } => {
                let world = canvas.world_at(screen);
                if canvas.map.extend_stroke(stroke, world) {
                    canvas.changes.mark(Change::Drawings);
                }
            }
            Gesture::Erase => {
                let world = canvas.world_at(screen);
                erase(canvas, world);
            }
            Gesture::DragItem { id, .. } => {
                let hex = canvas.hex_at(screen);
                if let Some(item) = canvas.map.item_mut(id) {
                    if item.position() != hex {
                        item.set_position(hex);
                        canvas.changes.mark(Change::Items);
                    }
                }
            }
        }
    }

    /// Pointer released.
    ///
    /// A finished item drag settles against the combat budget. Returns the
    /// hexes paid for.
    ///
    /// # Errors
    ///
    /// [`MapError::InsufficientMovement`] when the acting combatant could not
    /// afford the move; the item is back at its starting hex.
    pub fn pointer_up(&mut self, canvas: &mut Canvas<'_>) -> Result<u32> {
        let gesture = std::mem::take(&mut self.gesture);
        let Gesture::DragItem { id, from } = gesture else {
            return Ok(0);
        };
        let moved = canvas.map.item(id).is_some_and(|item| item.position() != from);
        if !moved {
            return Ok(0);
        }
        canvas.changes.mark_all([Change::Items, Change::Combat]);
        canvas.combat.settle_move(canvas.map, id, from)
    }

    /// Pointer moved with no button held. Only combatants hover.
    pub fn pointer_move(&mut self, canvas: &mut Canvas<'_>, screen: Point) {
        let hovered = canvas.map.combatant_at(canvas.hex_at(screen));
        if hovered != self.hovered {
            self.hovered = hovered;
            canvas.changes.mark(Change::Hover);
        }
    }

    /// Pointer left the canvas.
    pub fn pointer_leave(&mut self, changes: &mut ChangeTracker) {
        if self.hovered.take().is_some() {
            changes.mark(Change::Hover);
        }
    }

    /// One wheel step.
    pub fn wheel(&mut self, canvas: &mut Canvas<'_>, direction: ZoomDirection) -> f64 {
        let scale = canvas.viewport.zoom(direction, &canvas.config.camera);
        canvas.changes.mark(Change::Camera);
        scale
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Confirm the size prompt and place the item.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidSize`] below [`MIN_PLACEMENT_SIZE`]; the prompt
    /// stays open. [`MapError::MissingSelection`] if no prompt is open.
    pub fn confirm_size(&mut self, canvas: &mut Canvas<'_>, size: f64) -> Result<ItemId> {
        let Some(prompt) = self.prompt.take() else {
            return Err(MapError::MissingSelection("size prompt"));
        };
        if size.is_nan() || size < MIN_PLACEMENT_SIZE {
            self.prompt = Some(prompt);
            return Err(MapError::InvalidSize(size));
        }
        Ok(insert(canvas, prompt.asset, prompt.hex, size))
    }

    /// Dismiss the size prompt. Nothing is placed.
    pub fn cancel_prompt(&mut self) -> bool {
        self.prompt.take().is_some()
    }

    fn place(&mut self, canvas: &mut Canvas<'_>, asset: ArmedAsset, hex: HexCoord) -> PressOutcome {
        let size = default_size_from_filename(&asset.path);
        match canvas.config.mode {
            AppMode::Standard => PressOutcome::Placed(insert(canvas, asset, hex, size)),
            AppMode::BackgroundFit => {
                self.prompt = Some(SizePrompt {
                    asset,
                    hex,
                    suggested_size: size,
                });
                PressOutcome::PromptOpened
            }
        }
    }
}

fn insert(canvas: &mut Canvas<'_>, asset: ArmedAsset, hex: HexCoord, size: f64) -> ItemId {
    let item = PlacedItem::new(asset.path, hex, display_scale(size)).with_kind(asset.kind);
    let id = canvas.map.add_item(item);
    canvas.changes.mark(Change::Items);
    id
}

fn erase(canvas: &mut Canvas<'_>, world: Point) -> usize {
    let radius = canvas.config.erase_radius / canvas.viewport.scale;
    let removed = canvas.map.erase_at(world, radius);
    if removed > 0 {
        canvas.changes.mark(Change::Drawings);
    }
    removed
}
