//! End-to-end scenarios driven through the `Simulation` facade

use skirmish::ai::goap::action::GoapActionId;
use skirmish::ai::goap::agent::GoapAgent;
use skirmish::ai::goap::goal::GoalKind;
use skirmish::ai::utility::arbitrator::UtilityAgent;
use skirmish::ai::utility::behavior::BehaviorKind;
use skirmish::core::config::{DecisionConfig, MobConfig, SimulationConfig};
use skirmish::core::types::{EntityId, GroupId, Vec2};
use skirmish::entity::body::{EntityKind, Health, StatusFlags};
use skirmish::entity::sensing::{Senses, Targeting};
use skirmish::physics::KinematicPhysics;
use skirmish::simulation::Simulation;

fn idler() -> MobConfig {
    MobConfig {
        health: 1000.0,
        sensory_radius: 500.0,
        decision: DecisionConfig::Utility {
            behaviors: vec![BehaviorKind::Idle],
        },
        ..Default::default()
    }
}

fn hunter() -> MobConfig {
    MobConfig {
        sensory_radius: 500.0,
        decision: DecisionConfig::Goap {
            actions: vec![GoapActionId::GetTarget, GoapActionId::ChaseTarget, GoapActionId::AttackTarget],
            goals: vec![GoalKind::KillEnemies],
        },
        ..Default::default()
    }
}

fn simulation() -> Simulation<KinematicPhysics> {
    let mut config = SimulationConfig::default();
    config.mobs.insert("idler".into(), idler());
    config.mobs.insert("hunter".into(), hunter());
    Simulation::new(config, KinematicPhysics::new()).unwrap()
}

fn spawn(sim: &mut Simulation<KinematicPhysics>, archetype: &str, x: f32, group: u16) -> EntityId {
    sim.spawn_mob(archetype, Vec2::new(x, 0.0), GroupId(group), vec![]).unwrap()
}

#[test]
fn test_sensing_follows_physics_positions() {
    let mut sim = simulation();
    let watcher = spawn(&mut sim, "idler", 0.0, 1);
    let stranger = spawn(&mut sim, "idler", 600.0, 2);

    sim.tick(0.016);
    let senses = sim.world().get::<Senses>(watcher).unwrap();
    assert!(!senses.targetables_in_range.contains(&stranger));

    assert!(sim.physics_mut().set_position(stranger, Vec2::new(400.0, 0.0)));
    sim.tick(0.016);
    let senses = sim.world().get::<Senses>(watcher).unwrap();
    assert_eq!(senses.targetables_in_range, vec![stranger]);
}

#[test]
fn test_allies_are_not_sensed_as_targets() {
    let mut sim = simulation();
    let a = spawn(&mut sim, "idler", 0.0, 1);
    spawn(&mut sim, "idler", 50.0, 1);

    sim.tick(0.016);
    assert!(sim.world().get::<Senses>(a).unwrap().targetables_in_range.is_empty());
}

#[test]
fn test_planner_acquires_visible_enemy() {
    let mut sim = simulation();
    let hunter = spawn(&mut sim, "hunter", 0.0, 1);
    let prey = spawn(&mut sim, "idler", 300.0, 2);

    sim.tick(0.016);

    let agent = sim.world().get::<GoapAgent>(hunter).unwrap();
    assert_eq!(agent.goal, Some(GoalKind::KillEnemies));
    assert_eq!(sim.world().get::<Targeting>(hunter).unwrap().target, Some(prey));
}

#[test]
fn test_hunter_closes_distance() {
    let mut sim = simulation();
    let hunter = spawn(&mut sim, "hunter", 0.0, 1);
    spawn(&mut sim, "idler", 300.0, 2);

    for _ in 0..30 {
        sim.tick(0.016);
    }
    let position = sim.physics().position(hunter).unwrap();
    assert!(position.x > 0.0, "hunter stayed at {:?}", position);
}

#[test]
fn test_attacks_respect_weapon_cooldown() {
    let mut sim = simulation();
    spawn(&mut sim, "hunter", 0.0, 1);
    let prey = spawn(&mut sim, "idler", 30.0, 2);

    let dt = 0.05;
    let mut hits = Vec::new();
    for _ in 0..40 {
        sim.tick(dt);
        if sim.world().get::<StatusFlags>(prey).unwrap().damage_taken {
            hits.push(sim.world().elapsed());
        }
    }

    assert!(!hits.is_empty());
    assert!(sim.world().get::<Health>(prey).unwrap().current < 1000.0);
    // attack_duration 0.75 plus cooldown 0.1
    for pair in hits.windows(2) {
        assert!(pair[1] - pair[0] >= 0.85, "hits too close: {:?}", hits);
    }
    assert!(hits.len() <= 3);
}

#[test]
fn test_idle_utility_agent_keeps_behavior() {
    let mut sim = simulation();
    let idler = spawn(&mut sim, "idler", 0.0, 1);
    for _ in 0..5 {
        sim.tick(0.016);
    }
    let agent = sim.world().get::<UtilityAgent>(idler).unwrap();
    assert_eq!(agent.active_behavior(), Some(BehaviorKind::Idle));
    assert_eq!(sim.physics().position(idler), Some(Vec2::ZERO));
}

fn load_sample() -> SimulationConfig {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/skirmish.toml");
    SimulationConfig::load(path).unwrap()
}

#[test]
fn test_sample_scenario_runs() {
    let mut sim = Simulation::new(load_sample(), KinematicPhysics::new()).unwrap();
    let start = sim.population();
    assert_eq!(start.mobs, 6);
    assert_eq!(start.buildings, 2);
    assert_eq!(start.loot, 1);

    for _ in 0..600 {
        sim.tick(0.016);
    }

    let snapshot = sim.snapshot();
    assert!(snapshot.iter().all(|s| s.kind != EntityKind::Tile || s.health.is_none()));
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"kind\":\"building\""));
}

#[test]
fn test_same_seed_same_outcome() {
    let run = || {
        let mut sim = Simulation::new(load_sample(), KinematicPhysics::new()).unwrap();
        for _ in 0..300 {
            sim.tick(0.016);
        }
        sim.snapshot()
    };
    assert_eq!(run(), run());
}
