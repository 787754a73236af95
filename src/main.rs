//! Headless skirmish runner
//!
//! Loads a TOML scenario, runs it for a fixed number of ticks and reports
//! the population as it changes.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use skirmish::core::config::SimulationConfig;
use skirmish::core::error::Result;
use skirmish::physics::KinematicPhysics;
use skirmish::simulation::Simulation;

/// Run a skirmish scenario without rendering
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run a skirmish scenario headless and report the outcome")]
struct Args {
    /// Scenario file
    #[arg(long, default_value = "data/skirmish.toml")]
    config: String,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.016)]
    dt: f32,

    /// Override the scenario's RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final entity snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Ticks between population reports
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skirmish=info")))
        .init();

    let args = Args::parse();
    let mut config = SimulationConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    info!(config = %args.config, seed = config.seed, "loading scenario");

    let mut sim = Simulation::new(config, KinematicPhysics::new())?;
    let mut last = sim.population();
    info!(?last, "initial population");

    for tick in 1..=args.ticks {
        sim.tick(args.dt);
        let population = sim.population();
        if population != last || (args.report_every > 0 && tick % args.report_every == 0) {
            info!(
                tick,
                mobs = population.mobs,
                buildings = population.buildings,
                loot = population.loot,
                corpses = population.corpses,
                "population"
            );
            last = population;
        }
    }

    info!(elapsed = sim.world().elapsed(), "run finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sim.snapshot())?);
    }
    Ok(())
}
