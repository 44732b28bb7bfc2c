//! Route planning and director tick costs on generated maps.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;
use std::sync::Arc;
use tacojiman::{
    generate_terrain, EnemyConfig, EnemyDirector, EnemyType, GenerationConfig, TerrainGrid,
    TerrainPathfinder, TilePos, WorldPoint,
};

fn make_grid(tiles: u32) -> TerrainGrid {
    let config = GenerationConfig {
        world_width: tiles * 30,
        world_height: tiles * 30,
        ..GenerationConfig::new(1234)
    };
    generate_terrain(&config).expect("benchmark map generates")
}

fn bench_find_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_path_ground");
    for &tiles in &[28u32, 56, 112] {
        let grid = make_grid(tiles);
        let house = grid.player_house();
        let start = TilePos::new(house.x - 1, 0);
        let pathfinder = TerrainPathfinder::with_search_limit(usize::MAX);
        group.bench_with_input(BenchmarkId::from_parameter(tiles), &tiles, |b, _| {
            b.iter(|| pathfinder.find_path(black_box(&grid), start, house, EnemyType::Ground));
        });
    }
    group.finish();
}

fn bench_reachable_from(c: &mut Criterion) {
    let grid = make_grid(28);
    let pathfinder = TerrainPathfinder::new();
    c.bench_function("reachable_from_water_28", |b| {
        b.iter(|| pathfinder.reachable_from(black_box(&grid), grid.player_house(), EnemyType::Water));
    });
}

fn bench_director_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("director_tick");
    for &count in &[10usize, 40, 70] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let grid = Arc::new(make_grid(28));
            let mut director = EnemyDirector::new(
                grid,
                EnemyConfig::default(),
                25.0,
                StdRng::seed_from_u64(7),
            )
            .expect("director builds");
            for _ in 0..count {
                director.spawn_at(EnemyType::Air, WorldPoint::new(0.0, 0.0));
            }
            b.iter(|| director.update(black_box(0.016)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_find_path, bench_reachable_from, bench_director_tick);
criterion_main!(benches);
