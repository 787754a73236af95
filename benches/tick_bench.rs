//! Throughput of the store and of whole ticks
//!
//! ```bash
//! cargo bench --bench tick_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use skirmish::core::config::{MobConfig, SimulationConfig, SpawnConfig};
use skirmish::ecs::component::Signature;
use skirmish::entity::body::{Health, Position};
use skirmish::physics::KinematicPhysics;
use skirmish::simulation::Simulation;

/// Two opposing warbands of `per_side` mobs each
fn scenario(per_side: u32) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.mobs.insert("grunt".into(), MobConfig::default());
    for (group, x) in [(1, 0.0), (2, 800.0)] {
        config.map.spawns.push(SpawnConfig::Mob {
            archetype: "grunt".into(),
            x,
            y: 0.0,
            group,
            allies: vec![],
            count: per_side,
        });
    }
    config
}

fn bench_query(c: &mut Criterion) {
    let sim = Simulation::new(scenario(500), KinematicPhysics::new()).unwrap();
    let signature = Signature::EMPTY.with::<Position>().with::<Health>();
    c.bench_function("query_position_health_1000", |b| {
        b.iter(|| black_box(sim.world().query(black_box(signature))))
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for per_side in [10u32, 100, 250] {
        group.bench_with_input(BenchmarkId::from_parameter(per_side * 2), &per_side, |b, &per_side| {
            let mut sim = Simulation::new(scenario(per_side), KinematicPhysics::new()).unwrap();
            b.iter(|| sim.tick(black_box(0.016)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_query, bench_tick);
criterion_main!(benches);
