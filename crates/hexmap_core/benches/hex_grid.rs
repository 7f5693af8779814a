//! Grid and frame benchmarks for hexmap_core.
//!
//! Run with: `cargo bench -p hexmap_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hexmap_core::camera::Viewport;
use hexmap_core::dice::DiceSpec;
use hexmap_core::footprint::occupied_hexes;
use hexmap_core::hex::{HexCoord, HexGrid, HexOrientation};
use hexmap_core::map_state::MapState;
use hexmap_core::math::Point;
use hexmap_core::render::{FrameOptions, RenderFrame};
use hexmap_test_utils::fixtures::mech;

/// Pixel conversion and footprint expansion.
pub fn grid_benchmark(c: &mut Criterion) {
    let grid = HexGrid::new(50.0, HexOrientation::FlatTop);

    c.bench_function("pixel_to_hex_1k", |b| {
        b.iter(|| {
            for i in 0..1000 {
                let x = f64::from(i) * 7.3 - 3000.0;
                let y = f64::from(i) * -4.1 + 1500.0;
                black_box(grid.pixel_to_hex(black_box(x), black_box(y)));
            }
        });
    });

    c.bench_function("footprint_scale_4", |b| {
        b.iter(|| black_box(occupied_hexes(black_box(HexCoord::new(12, -7)), 4.0)));
    });

    c.bench_function("dice_parse", |b| {
        b.iter(|| black_box(DiceSpec::parse(black_box(" 3D6 + 2.5 "))));
    });
}

/// Frame building for a crowded map.
pub fn frame_benchmark(c: &mut Criterion) {
    let grid = HexGrid::new(50.0, HexOrientation::FlatTop);
    let viewport = Viewport::new(1600.0, 900.0);
    let mut map = MapState::new();
    for i in 0..200 {
        map.add_item(mech(&format!("unit{i}"), i % 20 - 10, i / 20 - 5, 10, 2, 4));
    }
    for i in 0..50 {
        let stroke = map.begin_stroke("red", Point::new(f64::from(i), 0.0));
        for j in 1..40 {
            map.extend_stroke(stroke, Point::new(f64::from(i), f64::from(j)));
        }
    }
    let options = FrameOptions::default();

    c.bench_function("render_frame_200_items", |b| {
        b.iter(|| black_box(RenderFrame::build(&map, &viewport, &grid, &options)));
    });
}

criterion_group!(benches, grid_benchmark, frame_benchmark);
criterion_main!(benches);
