//! Per-redraw snapshot handed to a renderer.
//!
//! Everything in a [`RenderFrame`] is already in screen space. The renderer
//! owns image decoding, resizing and compositing; it only has to draw grid
//! cells, then sprites in order, then strokes.

use serde::{Deserialize, Serialize};

use crate::camera::Viewport;
use crate::config::AppMode;
use crate::footprint::{barrier_hexes, centroid, item_footprint};
use crate::hex::{HexCoord, HexGrid};
use crate::item::{ItemId, ItemKind, PlacedItem};
use crate::map_state::MapState;
use crate::math::Point;

/// Half-width of the square of axial offsets scanned for grid cells.
pub const GRID_SCAN_RADIUS: i32 = 20;
/// Screen margin outside which cells are culled.
pub const CULL_MARGIN: f64 = 100.0;

/// Inputs that are not part of the map or camera.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameOptions {
    /// Placement mode; background-fit limits the grid to the image.
    pub mode: AppMode,
    /// Background image size in world pixels, when one is loaded.
    pub background_size: Option<(f64, f64)>,
    /// Selected item.
    pub selected: Option<ItemId>,
    /// Hovered item.
    pub hovered: Option<ItemId>,
}

/// One visible grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Cell coordinate.
    pub hex: HexCoord,
    /// Screen-space center.
    pub center: Point,
    /// Screen-space outline.
    pub corners: [Point; 6],
}

/// One item to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Source item.
    pub id: ItemId,
    /// Image reference.
    pub image_path: String,
    /// Token or tile.
    pub kind: ItemKind,
    /// Screen-space center of the footprint.
    pub center: Point,
    /// Target width in screen pixels.
    pub width: f64,
    /// Rotation in degrees.
    pub rotation: i32,
    /// Condition icons in application order.
    pub markers: Vec<String>,
    /// Screen-space centers of barrier hexes.
    pub barrier: Vec<Point>,
    /// Whether the item is selected.
    pub selected: bool,
    /// Whether the item is hovered.
    pub hovered: bool,
}

/// A stroke in screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenStroke {
    /// Color tag.
    pub color: String,
    /// Points in drawing order.
    pub points: Vec<Point>,
}

/// Everything needed for one redraw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    /// Canvas fill color.
    pub background_color: String,
    /// Grid line color.
    pub grid_color: String,
    /// Visible cells.
    pub cells: Vec<GridCell>,
    /// Tiles first, then tokens, each in placement order.
    pub sprites: Vec<Sprite>,
    /// Strokes with at least two points.
    pub strokes: Vec<ScreenStroke>,
}

impl RenderFrame {
    /// Snapshot the map as seen through `viewport`.
    #[must_use]
    pub fn build(map: &MapState, viewport: &Viewport, grid: &HexGrid, options: &FrameOptions) -> Self {
        let bounds = match (options.mode, options.background_size) {
            (AppMode::BackgroundFit, Some((w, h))) => Some(Bounds {
                min: Point::new(-grid.width(), -grid.height()),
                max: Point::new(w + grid.width(), h + grid.height()),
            }),
            _ => None,
        };

        let (tiles, tokens): (Vec<_>, Vec<_>) =
            map.iter().partition(|(_, item)| item.kind == ItemKind::Tile);
        let sprites = tiles
            .into_iter()
            .chain(tokens)
            .map(|(id, item)| sprite(map, viewport, grid, options, id, item))
            .collect();

        let strokes = map
            .drawings
            .iter()
            .filter(|stroke| stroke.points.len() >= 2)
            .map(|stroke| ScreenStroke {
                color: stroke.color.clone(),
                points: stroke.points.iter().map(|p| viewport.world_to_screen(*p)).collect(),
            })
            .collect();

        Self {
            background_color: map.background_color.clone(),
            grid_color: map.grid_color.clone(),
            cells: visible_cells(map, viewport, grid, bounds),
            sprites,
            strokes,
        }
    }

    /// Sprite for `id`, if it is in the frame.
    #[must_use]
    pub fn sprite(&self, id: ItemId) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y
    }
}

fn visible_cells(
    map: &MapState,
    viewport: &Viewport,
    grid: &HexGrid,
    bounds: Option<Bounds>,
) -> Vec<GridCell> {
    let around = map.world_to_hex(grid, viewport.camera);
    let radius = grid.size * viewport.scale;
    let mut cells = Vec::new();
    for dq in -GRID_SCAN_RADIUS..GRID_SCAN_RADIUS {
        for dr in -GRID_SCAN_RADIUS..GRID_SCAN_RADIUS {
            let hex = around.offset(dq, dr);
            let world = map.hex_to_world(grid, hex);
            if bounds.is_some_and(|b| !b.contains(world)) {
                continue;
            }
            let center = viewport.world_to_screen(world);
            if !viewport.is_on_screen(center, CULL_MARGIN) {
                continue;
            }
            cells.push(GridCell {
                hex,
                center,
                corners: grid.corners(center, radius),
            });
        }
    }
    cells
}

fn sprite(
    map: &MapState,
    viewport: &Viewport,
    grid: &HexGrid,
    options: &FrameOptions,
    id: ItemId,
    item: &PlacedItem,
) -> Sprite {
    let footprint = item_footprint(item);
    let offset = map.grid_offset();
    let center = viewport.world_to_screen(centroid(grid, &footprint).offset(offset.x, offset.y));
    let barrier = if item.hex_barrier {
        barrier_hexes(&footprint, item.barrier_radius)
            .into_iter()
            .map(|hex| viewport.world_to_screen(map.hex_to_world(grid, hex)))
            .collect()
    } else {
        Vec::new()
    };
    Sprite {
        id,
        image_path: item.image_path.clone(),
        kind: item.kind,
        center,
        width: grid.width() * viewport.scale * item.footprint_scale,
        rotation: item.rotation,
        markers: item.markers.clone(),
        barrier,
        selected: options.selected == Some(id),
        hovered: options.hovered == Some(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexOrientation;
    use crate::map_state::Stroke;

    fn setup() -> (MapState, Viewport, HexGrid) {
        let map = MapState::new();
        let grid = map.grid(HexOrientation::FlatTop);
        (map, Viewport::default(), grid)
    }

    #[test]
    fn test_tiles_draw_before_tokens() {
        let (mut map, view, grid) = setup();
        map.add_item(PlacedItem::new("tokens/a.png", HexCoord::ORIGIN, 1.0));
        map.add_item(PlacedItem::new("tiles/floor.png", HexCoord::ORIGIN, 1.0).with_kind(ItemKind::Tile));
        map.add_item(PlacedItem::new("tokens/b.png", HexCoord::ORIGIN, 1.0));

        let frame = RenderFrame::build(&map, &view, &grid, &FrameOptions::default());
        let order: Vec<_> = frame.sprites.iter().map(|s| s.id.index()).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn test_sprite_uses_footprint_centroid() {
        let (mut map, mut view, grid) = setup();
        view.scale = 2.0;
        map.set_grid_offset(Point::new(10.0, 0.0));
        let id = map.add_item(PlacedItem::new("tokens/big.png", HexCoord::ORIGIN, 3.0));

        let options = FrameOptions {
            selected: Some(id),
            ..FrameOptions::default()
        };
        let frame = RenderFrame::build(&map, &view, &grid, &options);
        let sprite = frame.sprite(id).expect("drawn");
        // The 7-hex ring is symmetric, so the centroid is the anchor.
        assert!((sprite.center.x - (400.0 + 20.0)).abs() < 1e-9);
        assert!((sprite.center.y - 300.0).abs() < 1e-9);
        assert!((sprite.width - 100.0 * 2.0 * 3.0).abs() < 1e-9);
        assert!(sprite.selected);
        assert!(!sprite.hovered);
    }

    #[test]
    fn test_barrier_ring() {
        let (mut map, view, grid) = setup();
        let mut item = PlacedItem::new("tokens/a.png", HexCoord::ORIGIN, 1.0);
        item.hex_barrier = true;
        item.barrier_radius = 2;
        let id = map.add_item(item);

        let frame = RenderFrame::build(&map, &view, &grid, &FrameOptions::default());
        assert_eq!(frame.sprite(id).map(|s| s.barrier.len()), Some(18));
    }

    #[test]
    fn test_loaded_barrier_radius_is_capped() {
        let (mut map, view, grid) = setup();
        let item: PlacedItem = serde_json::from_str(
            r#"{"path":"tokens/a.png","q":0,"r":0,"hex_barrier":true,"barrier_radius":4000000000}"#,
        )
        .expect("valid item");
        let id = map.add_item(item);

        let frame = RenderFrame::build(&map, &view, &grid, &FrameOptions::default());
        assert_eq!(frame.sprite(id).map(|s| s.barrier.len()), Some(3 * 20 * 21));
    }

    #[test]
    fn test_short_strokes_skipped() {
        let (mut map, view, grid) = setup();
        map.drawings.push(Stroke::new("red", Point::ZERO));
        let mut long = Stroke::new("blue", Point::ZERO);
        long.points.push(Point::new(10.0, 5.0));
        map.drawings.push(long);

        let frame = RenderFrame::build(&map, &view, &grid, &FrameOptions::default());
        assert_eq!(frame.strokes.len(), 1);
        assert_eq!(frame.strokes[0].points[1], Point::new(410.0, 305.0));
    }

    #[test]
    fn test_cells_are_culled_to_screen() {
        let (map, view, grid) = setup();
        let frame = RenderFrame::build(&map, &view, &grid, &FrameOptions::default());
        assert!(!frame.cells.is_empty());
        assert!(frame.cells.iter().any(|c| c.hex == HexCoord::ORIGIN));
        assert!(frame
            .cells
            .iter()
            .all(|c| view.is_on_screen(c.center, CULL_MARGIN)));
        assert!(frame.cells.len() < (2 * GRID_SCAN_RADIUS * 2 * GRID_SCAN_RADIUS) as usize);
    }

    #[test]
    fn test_background_fit_limits_cells() {
        let (map, mut view, grid) = setup();
        view.fit_to_image(200.0, 150.0);
        view.scale = 0.5;
        let options = FrameOptions {
            mode: AppMode::BackgroundFit,
            background_size: Some((200.0, 150.0)),
            ..FrameOptions::default()
        };
        let limited = RenderFrame::build(&map, &view, &grid, &options);
        let unlimited = RenderFrame::build(&map, &view, &grid, &FrameOptions::default());
        assert!(limited.cells.len() < unlimited.cells.len());
        assert!(limited.cells.iter().all(|c| {
            let world = view.screen_to_world(c.center);
            world.x >= -100.0 - 1e-6 && world.x <= 300.0 + 1e-6
        }));
    }
}
