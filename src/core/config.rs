//! Simulation configuration with documented constants
//!
//! Configuration is read once at setup (usually from TOML) and is immutable
//! afterwards. The top-level [`Simulation`](crate::simulation::tick::Simulation)
//! owns it; systems that need it hold a clone of the same `Arc`.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::ai::goap::action::GoapActionId;
use crate::ai::goap::goal::GoalKind;
use crate::ai::utility::behavior::BehaviorKind;
use crate::core::error::{Result, SkirmishError};

/// Sensory radii wider than this many grid cells log a warning at validation
const SENSING_CELLS_WARNING: f32 = 64.0;

/// Configuration for the simulation systems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the world RNG (damage rolls, crits, patrol sampling)
    pub seed: u64,

    // === SPATIAL SYSTEM ===
    /// Size of each cell in the spatial hash grid (world units)
    ///
    /// Sensing queries walk every cell overlapping the sensing radius, so
    /// cells much smaller than the typical sensory radius waste lookups.
    pub grid_cell_size: f32,

    /// Seconds between sensing passes (0 = every tick)
    pub sensing_interval: f32,

    /// Seconds between nearest-target reselection passes
    ///
    /// Reselection is the expensive part of targeting; acquisition of a
    /// first target happens immediately through the active action.
    pub target_reselect_interval: f32,

    // === PLANNER ===
    /// Maximum greedy steps before planning is abandoned as a failure
    pub planner_max_iterations: usize,

    // === LIFECYCLE ===
    /// Seconds a corpse stays in the world before being removed
    pub corpse_lifetime: f32,

    /// Per-agent-type tables, keyed by archetype name
    pub mobs: AHashMap<String, MobConfig>,

    /// Building tables, keyed by archetype name
    pub buildings: AHashMap<String, BuildingConfig>,

    pub map: MapConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            grid_cell_size: 100.0,
            sensing_interval: 0.0,
            target_reselect_interval: 0.5,
            planner_max_iterations: 16,
            corpse_lifetime: 10.0,
            mobs: AHashMap::new(),
            buildings: AHashMap::new(),
            map: MapConfig::default(),
        }
    }
}

/// Per-mob-type numeric table supplied at agent creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MobConfig {
    pub health: f32,
    /// Movement speed in world units per second
    pub speed: f32,
    /// Physical body radius
    pub radius: f32,
    /// How far the mob notices targetables and loot
    pub sensory_radius: f32,
    /// Patrol points visited per second; the inverse is the linger time
    pub patrol_frequency: f32,
    /// Radius around home in which patrol points are sampled
    pub patrol_radius: f32,
    /// Distance from home that still counts as "close to home"
    pub home_radius: f32,
    /// Distance at which a move target counts as reached
    pub arrival_distance: f32,
    /// Distance at which loot can be picked up
    pub pickup_range: f32,
    /// Number of simultaneous attackers that make the mob feel overwhelmed
    pub overwhelm_attackers: usize,
    /// Health fraction below which the mob feels overwhelmed
    pub flee_health_fraction: f32,
    /// Gold dropped as loot on death (0 = nothing)
    pub loot_value: u32,
    pub weapon: WeaponConfig,
    pub decision: DecisionConfig,
}

impl Default for MobConfig {
    fn default() -> Self {
        Self {
            health: 100.0,
            speed: 120.0,
            radius: 16.0,
            sensory_radius: 500.0,
            patrol_frequency: 0.25,
            patrol_radius: 200.0,
            home_radius: 150.0,
            arrival_distance: 10.0,
            pickup_range: 24.0,
            overwhelm_attackers: 3,
            flee_health_fraction: 0.25,
            loot_value: 0,
            weapon: WeaponConfig::default(),
            decision: DecisionConfig::default(),
        }
    }
}

/// Weapon numbers copied into the `Weapon` component at spawn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub damage_min: f32,
    pub damage_max: f32,
    /// Reach beyond both body radii
    pub range: f32,
    /// Seconds after an attack finishes before the next may start
    pub cooldown: f32,
    /// Seconds an attack animation lasts
    pub attack_duration: f32,
    /// Chance in [0, 1] that a hit is critical
    pub crit_chance: f32,
    pub crit_multiplier: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            damage_min: 8.0,
            damage_max: 12.0,
            range: 20.0,
            cooldown: 0.1,
            attack_duration: 0.75,
            crit_chance: 0.1,
            crit_multiplier: 2.0,
        }
    }
}

/// Decision strategy of a mob type
///
/// Both strategies run over the same fact/component substrate; which one a
/// mob uses is purely a matter of configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DecisionConfig {
    Goap {
        actions: Vec<GoapActionId>,
        goals: Vec<GoalKind>,
    },
    Utility {
        behaviors: Vec<BehaviorKind>,
    },
}

impl Default for DecisionConfig {
    fn default() -> Self {
        DecisionConfig::Utility {
            behaviors: vec![
                BehaviorKind::Escape,
                BehaviorKind::Attack,
                BehaviorKind::Loot,
                BehaviorKind::ReturnHome,
                BehaviorKind::Patrol,
                BehaviorKind::Idle,
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    pub health: f32,
    pub radius: f32,
    /// Mob archetype spawned by this building, if any
    pub spawns: Option<String>,
    /// Seconds between spawns
    pub spawn_interval: f32,
    /// Maximum number of this building's spawns alive at once
    pub max_alive: usize,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            health: 500.0,
            radius: 48.0,
            spawns: None,
            spawn_interval: 10.0,
            max_alive: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    /// Tile edge length in world units
    pub tile_size: f32,
    pub spawns: Vec<SpawnConfig>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            tile_size: 64.0,
            spawns: Vec::new(),
        }
    }
}

/// Initial population entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnConfig {
    Mob {
        archetype: String,
        x: f32,
        y: f32,
        group: u16,
        #[serde(default)]
        allies: Vec<u16>,
        #[serde(default = "default_count")]
        count: u32,
    },
    Building {
        archetype: String,
        x: f32,
        y: f32,
        group: u16,
        #[serde(default)]
        allies: Vec<u16>,
    },
    Loot {
        x: f32,
        y: f32,
        value: u32,
        #[serde(default = "default_loot_time")]
        loot_time: f32,
    },
}

fn default_count() -> u32 {
    1
}

fn default_loot_time() -> f32 {
    1.0
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn mob(&self, archetype: &str) -> Result<&MobConfig> {
        self.mobs
            .get(archetype)
            .ok_or_else(|| SkirmishError::UnknownArchetype(archetype.to_string()))
    }

    pub fn building(&self, archetype: &str) -> Result<&BuildingConfig> {
        self.buildings
            .get(archetype)
            .ok_or_else(|| SkirmishError::UnknownArchetype(archetype.to_string()))
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let check = |ok: bool, message: String| -> Result<()> {
            if ok {
                Ok(())
            } else {
                tracing::warn!("rejecting configuration: {}", message);
                Err(SkirmishError::InvalidConfig(message))
            }
        };

        let finite = |scope: &str, values: &[(&str, f32)]| -> Result<()> {
            for (field, value) in values {
                check(value.is_finite(), format!("{}: {} ({}) must be finite", scope, field, value))?;
            }
            Ok(())
        };

        finite(
            "simulation",
            &[
                ("grid_cell_size", self.grid_cell_size),
                ("sensing_interval", self.sensing_interval),
                ("target_reselect_interval", self.target_reselect_interval),
                ("corpse_lifetime", self.corpse_lifetime),
                ("map.tile_size", self.map.tile_size),
            ],
        )?;
        check(self.grid_cell_size > 0.0, format!("grid_cell_size ({}) must be positive", self.grid_cell_size))?;
        check(self.planner_max_iterations > 0, "planner_max_iterations must be positive".into())?;
        check(
            self.sensing_interval >= 0.0 && self.target_reselect_interval >= 0.0,
            "intervals must not be negative".into(),
        )?;
        check(self.corpse_lifetime >= 0.0, "corpse_lifetime must not be negative".into())?;

        for (name, mob) in &self.mobs {
            let weapon = &mob.weapon;
            finite(
                &format!("mob '{}'", name),
                &[
                    ("health", mob.health),
                    ("speed", mob.speed),
                    ("radius", mob.radius),
                    ("sensory_radius", mob.sensory_radius),
                    ("patrol_frequency", mob.patrol_frequency),
                    ("patrol_radius", mob.patrol_radius),
                    ("home_radius", mob.home_radius),
                    ("arrival_distance", mob.arrival_distance),
                    ("pickup_range", mob.pickup_range),
                    ("flee_health_fraction", mob.flee_health_fraction),
                    ("weapon.damage_min", weapon.damage_min),
                    ("weapon.damage_max", weapon.damage_max),
                    ("weapon.range", weapon.range),
                    ("weapon.cooldown", weapon.cooldown),
                    ("weapon.attack_duration", weapon.attack_duration),
                    ("weapon.crit_chance", weapon.crit_chance),
                    ("weapon.crit_multiplier", weapon.crit_multiplier),
                ],
            )?;
            check(mob.health > 0.0, format!("mob '{}': health must be positive", name))?;
            check(mob.speed > 0.0, format!("mob '{}': speed must be positive", name))?;
            check(mob.radius > 0.0, format!("mob '{}': radius must be positive", name))?;
            check(mob.sensory_radius >= 0.0, format!("mob '{}': sensory_radius must not be negative", name))?;
            check(
                (0.0..=1.0).contains(&mob.flee_health_fraction),
                format!("mob '{}': flee_health_fraction must be within [0, 1]", name),
            )?;
            if mob.sensory_radius > self.grid_cell_size * SENSING_CELLS_WARNING {
                tracing::warn!(
                    mob = %name,
                    sensory_radius = mob.sensory_radius,
                    grid_cell_size = self.grid_cell_size,
                    "sensory radius spans many grid cells, consider a larger grid_cell_size"
                );
            }
            check(
                weapon.damage_min <= weapon.damage_max,
                format!("mob '{}': damage_min ({}) exceeds damage_max ({})", name, weapon.damage_min, weapon.damage_max),
            )?;
            check(
                (0.0..=1.0).contains(&weapon.crit_chance),
                format!("mob '{}': crit_chance must be within [0, 1]", name),
            )?;
            check(
                weapon.cooldown >= 0.0 && weapon.attack_duration >= 0.0,
                format!("mob '{}': weapon timings must not be negative", name),
            )?;
        }

        for (name, building) in &self.buildings {
            finite(
                &format!("building '{}'", name),
                &[
                    ("health", building.health),
                    ("radius", building.radius),
                    ("spawn_interval", building.spawn_interval),
                ],
            )?;
            check(building.health > 0.0, format!("building '{}': health must be positive", name))?;
            if let Some(spawns) = &building.spawns {
                check(
                    self.mobs.contains_key(spawns),
                    format!("building '{}' spawns unknown mob '{}'", name, spawns),
                )?;
            }
        }

        for spawn in &self.map.spawns {
            let (x, y) = match spawn {
                SpawnConfig::Mob { x, y, .. } | SpawnConfig::Building { x, y, .. } | SpawnConfig::Loot { x, y, .. } => (*x, *y),
            };
            finite("map spawn", &[("x", x), ("y", y)])?;
            match spawn {
                SpawnConfig::Mob { archetype, .. } => {
                    check(self.mobs.contains_key(archetype), format!("map spawns unknown mob '{}'", archetype))?;
                }
                SpawnConfig::Building { archetype, .. } => {
                    check(
                        self.buildings.contains_key(archetype),
                        format!("map spawns unknown building '{}'", archetype),
                    )?;
                }
                SpawnConfig::Loot { loot_time, .. } => {
                    finite("map spawn", &[("loot_time", *loot_time)])?;
                    check(*loot_time >= 0.0, "loot_time must not be negative".into())?;
                }
            }
        }

        Ok(())
    }
}
