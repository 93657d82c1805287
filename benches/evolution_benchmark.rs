use criterion::{Criterion, criterion_group, criterion_main};
use mario_levelgen::config::{GaConfig, LevelConfig};
use mario_levelgen::evolution::GeneticAlgorithm;
use mario_levelgen::evolution::fitness::evaluate;
use mario_levelgen::level::LevelKind;
use mario_levelgen::level::generator::{LevelSource, TerrainGenerator};
use mario_levelgen::profile::PlayerProfile;
use std::hint::black_box;
use std::time::Duration;

// Helper to create a realistic engine setup
fn setup_engine(config: &GaConfig) -> GeneticAlgorithm<'_> {
    let level = LevelConfig {
        width: 160,
        height: 15,
        seed: 2024,
        kind: LevelKind::Overground,
    };
    GeneticAlgorithm::new(config, &level, PlayerProfile::new(5, 3, 2), &TerrainGenerator).unwrap()
}

fn benchmark_generation_step(c: &mut Criterion) {
    let config = GaConfig::default();
    let engine = setup_engine(&config);

    let mut group = c.benchmark_group("GeneticAlgorithm Performance");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("step", |b| {
        // `clone` resets the population so every iteration runs the same generation
        b.iter(|| {
            let mut cloned_engine = engine.clone();
            cloned_engine.step();
            cloned_engine
        })
    });

    group.finish();
}

fn benchmark_fitness(c: &mut Criterion) {
    let grid = TerrainGenerator
        .generate(160, 15, 7, LevelKind::Overground)
        .unwrap();
    let profile = PlayerProfile::new(5, 3, 2);
    c.bench_function("evaluate_160x15", |b| {
        b.iter(|| evaluate(black_box(&grid), black_box(&profile)))
    });
}

criterion_group!(benches, benchmark_generation_step, benchmark_fitness);
criterion_main!(benches);
