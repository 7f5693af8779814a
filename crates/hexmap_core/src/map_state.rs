//! The map document: placed items, paint strokes and grid settings.
//!
//! `MapState` is plain data plus structural helpers. It never renders and
//! never talks to the filesystem; see [`crate::persistence`] for the
//! document port.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MapError, Result};
use crate::hex::{HexCoord, HexGrid, HexOrientation};
use crate::item::{ItemId, PlacedItem};
use crate::math::Point;

/// Default cell size in world pixels.
pub const DEFAULT_GRID_SIZE: f64 = 50.0;
/// Default grid line color.
pub const DEFAULT_GRID_COLOR: &str = "#39ff14";
/// Default canvas and panel background.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#000000";

/// A freehand paint stroke in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Color tag, passed through to renderers.
    #[serde(default = "default_stroke_color")]
    pub color: String,
    /// Points in drawing order.
    #[serde(default)]
    pub points: Vec<Point>,
}

fn default_stroke_color() -> String {
    "white".to_string()
}

impl Stroke {
    /// Start a stroke at `start`.
    #[must_use]
    pub fn new(color: impl Into<String>, start: Point) -> Self {
        Self {
            color: color.into(),
            points: vec![start],
        }
    }

    /// Whether any point lies strictly within `radius` of `center`.
    #[must_use]
    pub fn touches(&self, center: Point, radius: f64) -> bool {
        self.points.iter().any(|p| p.distance(center) < radius)
    }
}

/// The authoritative map document.
///
/// Field names match the saved JSON keys. Every key is optional on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapState {
    /// Background image reference.
    pub background_image: Option<String>,
    /// Canvas color behind everything.
    pub background_color: String,
    /// Hex outer radius in world pixels.
    pub grid_size: f64,
    /// Grid line color.
    pub grid_color: String,
    /// Panel background color.
    pub ui_bg_color: String,
    /// Panel text color.
    pub ui_fg_color: String,
    /// Directory scanned for token packs.
    pub tokens_directory: Option<String>,
    /// Directory scanned for marker icons.
    pub markers_directory: Option<String>,
    /// Grid origin x in world pixels.
    pub grid_offset_x: f64,
    /// Grid origin y in world pixels.
    pub grid_offset_y: f64,
    /// Placed items, bottom to top.
    pub items: Vec<PlacedItem>,
    /// Paint strokes, oldest first.
    pub drawings: Vec<Stroke>,
}

impl Default for MapState {
    fn default() -> Self {
        Self {
            background_image: None,
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            grid_size: DEFAULT_GRID_SIZE,
            grid_color: DEFAULT_GRID_COLOR.to_string(),
            ui_bg_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            ui_fg_color: DEFAULT_GRID_COLOR.to_string(),
            tokens_directory: None,
            markers_directory: None,
            grid_offset_x: 0.0,
            grid_offset_y: 0.0,
            items: Vec::new(),
            drawings: Vec::new(),
        }
    }
}

impl MapState {
    /// Empty map with default grid settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Grid
    // ------------------------------------------------------------------

    /// Grid geometry for this map's cell size.
    #[must_use]
    pub fn grid(&self, orientation: HexOrientation) -> HexGrid {
        HexGrid::new(self.grid_size, orientation)
    }

    /// Grid origin in world space.
    #[must_use]
    pub const fn grid_offset(&self) -> Point {
        Point::new(self.grid_offset_x, self.grid_offset_y)
    }

    /// Move the grid origin.
    pub fn set_grid_offset(&mut self, offset: Point) {
        self.grid_offset_x = offset.x;
        self.grid_offset_y = offset.y;
    }

    /// Hex under a world-space point.
    #[must_use]
    pub fn world_to_hex(&self, grid: &HexGrid, world: Point) -> HexCoord {
        grid.pixel_to_hex(world.x - self.grid_offset_x, world.y - self.grid_offset_y)
    }

    /// World-space center of a hex.
    #[must_use]
    pub fn hex_to_world(&self, grid: &HexGrid, hex: HexCoord) -> Point {
        grid.center(hex).offset(self.grid_offset_x, self.grid_offset_y)
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Append an item on top of the stack.
    pub fn add_item(&mut self, item: PlacedItem) -> ItemId {
        let id = ItemId(self.items.len());
        debug!(%id, path = %item.image_path, hex = %item.position(), "item placed");
        self.items.push(item);
        id
    }

    /// Item in slot `id`.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&PlacedItem> {
        self.items.get(id.index())
    }

    /// Mutable item in slot `id`.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut PlacedItem> {
        self.items.get_mut(id.index())
    }

    /// Item in slot `id`, or [`MapError::NoSuchItem`].
    ///
    /// # Errors
    ///
    /// Fails if the slot is empty.
    pub fn require(&self, id: ItemId) -> Result<&PlacedItem> {
        self.item(id).ok_or(MapError::NoSuchItem(id))
    }

    /// Mutable item in slot `id`, or [`MapError::NoSuchItem`].
    ///
    /// # Errors
    ///
    /// Fails if the slot is empty.
    pub fn require_mut(&mut self, id: ItemId) -> Result<&mut PlacedItem> {
        self.items.get_mut(id.index()).ok_or(MapError::NoSuchItem(id))
    }

    /// Delete the item in slot `id`. Later slots shift down by one.
    ///
    /// # Errors
    ///
    /// Fails if the slot is empty.
    pub fn remove_item(&mut self, id: ItemId) -> Result<PlacedItem> {
        if id.index() >= self.items.len() {
            return Err(MapError::NoSuchItem(id));
        }
        Ok(self.items.remove(id.index()))
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items with their slots, bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &PlacedItem)> {
        self.items.iter().enumerate().map(|(i, item)| (ItemId(i), item))
    }

    /// Combatants with their slots, in item order.
    pub fn combatants(&self) -> impl Iterator<Item = (ItemId, &PlacedItem)> {
        self.iter().filter(|(_, item)| item.is_combatant())
    }

    /// Topmost item anchored at `hex`.
    #[must_use]
    pub fn item_at(&self, hex: HexCoord) -> Option<ItemId> {
        self.topmost(hex, |_| true)
    }

    /// Topmost combatant anchored at `hex`.
    #[must_use]
    pub fn combatant_at(&self, hex: HexCoord) -> Option<ItemId> {
        self.topmost(hex, PlacedItem::is_combatant)
    }

    fn topmost(&self, hex: HexCoord, accept: impl Fn(&PlacedItem) -> bool) -> Option<ItemId> {
        self.items
            .iter()
            .rposition(|item| item.position() == hex && accept(item))
            .map(ItemId)
    }

    /// Delete the topmost item anchored at `hex`.
    pub fn remove_item_at(&mut self, hex: HexCoord) -> Option<PlacedItem> {
        let id = self.item_at(hex)?;
        self.remove_item(id).ok()
    }

    // ------------------------------------------------------------------
    // Drawings
    // ------------------------------------------------------------------

    /// Start a new stroke. Returns its index.
    pub fn begin_stroke(&mut self, color: impl Into<String>, start: Point) -> usize {
        self.drawings.push(Stroke::new(color, start));
        self.drawings.len() - 1
    }

    /// Append a point to stroke `index`. Returns false if the stroke is gone.
    pub fn extend_stroke(&mut self, index: usize, point: Point) -> bool {
        match self.drawings.get_mut(index) {
            Some(stroke) => {
                stroke.points.push(point);
                true
            }
            None => false,
        }
    }

    /// Remove every stroke with a point strictly within `radius` of `center`.
    ///
    /// Returns the number of strokes removed.
    pub fn erase_at(&mut self, center: Point, radius: f64) -> usize {
        let before = self.drawings.len();
        self.drawings.retain(|stroke| !stroke.touches(center, radius));
        let removed = before - self.drawings.len();
        if removed > 0 {
            debug!(removed, x = center.x, y = center.y, "strokes erased");
        }
        removed
    }

    /// Remove all strokes.
    pub fn clear_drawings(&mut self) {
        self.drawings.clear();
    }

    /// Remove items, strokes and the background image.
    pub fn clear(&mut self) {
        self.items.clear();
        self.drawings.clear();
        self.background_image = None;
    }
}
