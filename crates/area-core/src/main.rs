//! Public Area Presence Simulator
//!
//! Walks a seeded population of agents through the configured areas,
//! entering, leaving, and interacting, then reports per-area statistics.

use area_core::{
    default_config_toml, AreaError, OpenDirectory, PresenceConfig, PresenceService,
    DEFAULT_NEARBY_RADIUS,
};
use area_events::{AgentId, AreaId, InteractionKind, Timestamp, MILLIS_PER_MINUTE};
use clap::Parser;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Simulated clock start (2024-01-01T08:00:00Z)
const START_MILLIS: u64 = 1_704_096_000_000;

/// Command line arguments for the simulator
#[derive(Parser, Debug)]
#[command(name = "area_sim")]
#[command(about = "Simulate agents moving through public areas")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of agents in the population
    #[arg(long, default_value_t = 60)]
    agents: usize,

    /// Number of simulated actions
    #[arg(long, default_value_t = 2000)]
    steps: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the default configuration and exit
    #[arg(long)]
    dump_config: bool,

    /// Write the final presence snapshot as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if args.dump_config {
        print!("{}", default_config_toml());
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = match &args.config {
        Some(path) => match PresenceConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: could not load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => PresenceConfig::default(),
    };

    println!("Public Area Presence Simulator");
    println!("==============================");
    println!("Seed: {}", args.seed);
    println!("Agents: {}", args.agents);
    println!("Steps: {}", args.steps);
    println!();

    let service = PresenceService::new(config, OpenDirectory);
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let agents: Vec<AgentId> = (0..args.agents)
        .map(|n| AgentId(format!("agent_{:03}", n)))
        .collect();

    let mut now = Timestamp::from_millis(START_MILLIS);
    let mut rejected = 0usize;
    for step in 0..args.steps {
        now = now.plus_millis(rng.gen_range(1..=5) * MILLIS_PER_MINUTE);
        let Some(agent) = agents.choose(&mut rng) else {
            break;
        };
        if let Err(e) = simulate_step(&service, agent, &mut rng, now) {
            rejected += 1;
            warn!(step, agent = %agent, reason = e.reason_code(), "action rejected");
        }
    }

    info!(rejected, "simulation finished");
    println!("Simulation complete ({} actions rejected).", rejected);
    println!();
    print_summary(&service);

    if let Some(path) = &args.output {
        let snapshot = service.snapshot_at(now);
        match snapshot.to_json() {
            Ok(json) => match fs::write(path, json) {
                Ok(()) => println!("Wrote {}", path.display()),
                Err(e) => eprintln!("Warning: Could not write {}: {}", path.display(), e),
            },
            Err(e) => eprintln!("Warning: Could not serialize snapshot: {}", e),
        }
    }

    service.shutdown();
}

/// One random action for `agent`.
fn simulate_step(
    service: &PresenceService,
    agent: &AgentId,
    rng: &mut SmallRng,
    now: Timestamp,
) -> Result<(), AreaError> {
    let Some(current) = service.current_area_of(agent) else {
        let areas = service.active_areas();
        if let Some(area) = areas.choose(rng) {
            service.enter_area_at(&area.id, agent, now)?;
        }
        return Ok(());
    };

    let roll: f64 = rng.gen();
    if roll < 0.5 {
        let visible = service.visible_agents_of(agent);
        if let Some(other) = visible.choose(rng) {
            let kind = InteractionKind::known()
                .choose(rng)
                .cloned()
                .unwrap_or(InteractionKind::Chat);
            service.record_interaction_at(agent, other, kind, now)?;
            if rng.gen_bool(0.2) {
                service.refresh_area_at(&current, now)?;
            }
        }
    } else if roll < 0.7 {
        service.leave_area_at(&current, agent, now)?;
    } else if roll < 0.9 {
        let here = service.area(&current).map(|a| a.position).unwrap_or_default();
        let targets: Vec<AreaId> = service
            .nearby_areas(&here, DEFAULT_NEARBY_RADIUS * 2)
            .into_iter()
            .map(|a| a.id)
            .filter(|id| id != &current)
            .collect();
        if let Some(target) = targets.choose(rng) {
            service.enter_area_at(target, agent, now)?;
        }
    } else {
        service.add_activity(agent, "looking around");
    }
    Ok(())
}

fn print_summary(service: &PresenceService) {
    println!("{:<16} {:>9} {:>7} {:>12}  peak hours", "area", "present", "visits", "avg stay");
    for area in service.all_areas() {
        let present = service.occupancy(&area.id).unwrap_or(0);
        let Ok(stats) = service.area_stats(&area.id) else {
            continue;
        };
        let peaks: Vec<String> = stats.peak_hours.iter().map(|h| format!("{:02}:00", h)).collect();
        println!(
            "{:<16} {:>4}/{:<4} {:>7} {:>9} min  {}",
            area.id.as_str(),
            present,
            area.capacity,
            stats.total_visits,
            stats.avg_duration_ms / MILLIS_PER_MINUTE,
            peaks.join(", ")
        );
    }
}
