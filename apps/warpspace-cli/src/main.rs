use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use warpspace_common::{ActorId, Coordinate, Direction, UniverseConfig};
use warpspace_explore::{ExplorationLedger, ExplorationSearch};
use warpspace_kernel::{HullClass, Race, SeedDigest, Universe, generate_attributes};
use warpspace_topology::{RouteOutcome, TopologyCoordinator, WarpRoutePathfinder};

#[derive(Parser)]
#[command(name = "warpspace-cli", about = "CLI tool for warpspace operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML universe config; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured seed
    #[arg(short, long)]
    seed: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and active configuration
    Info,
    /// Generate the system record at a coordinate
    Generate {
        /// Coordinate as "x,y,z"
        #[arg(value_parser = parse_coordinate, allow_hyphen_values = true)]
        at: Coordinate,
    },
    /// Derive ship or building attributes
    Attributes {
        race: Race,
        hull: HullClass,
        /// Tier, 1 to 5
        #[arg(short, long, default_value = "1")]
        tier: u8,
        /// Optional location seed (e.g. a system name)
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Realize and gate a scatter of systems, then check the network
    Link {
        /// Number of systems to scatter
        #[arg(short = 'n', long, default_value = "24")]
        count: usize,
        /// Scatter half-extent in lattice steps around the origin
        #[arg(short, long, default_value = "12")]
        extent: u32,
    },
    /// Route between two scattered systems over active gates
    Route {
        #[arg(short = 'n', long, default_value = "24")]
        count: usize,
        #[arg(short, long, default_value = "12")]
        extent: u32,
        /// Index of the start system in the scatter
        #[arg(long, default_value = "0")]
        from: usize,
        /// Index of the destination system in the scatter
        #[arg(long, default_value = "1")]
        to: usize,
    },
    /// Nearest unexplored coordinates for a fresh actor
    Scan {
        /// Actor position as "x,y,z"
        #[arg(
            value_parser = parse_coordinate,
            allow_hyphen_values = true,
            default_value = "0,0,0"
        )]
        at: Coordinate,
        /// Limit to one half-space: +x, -x, +y, -y, +z, -z
        #[arg(short, long)]
        direction: Option<Direction>,
        /// Mark every lattice point within this radius of the actor as explored
        #[arg(short, long, default_value = "0")]
        radius: u32,
    },
}

fn parse_coordinate(s: &str) -> Result<Coordinate, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z, got {s:?}"));
    };
    let axis = |v: &str| v.parse::<i32>().map_err(|e| format!("{v:?}: {e}"));
    Ok(Coordinate::new(axis(*x)?, axis(*y)?, axis(*z)?))
}

/// Deterministic, de-duplicated lattice points near the origin.
fn scatter(config: &UniverseConfig, count: usize, extent: u32) -> Vec<Coordinate> {
    let domain = config.domain;
    let center = [domain.axis_index(0); 3];
    let last = domain.points_per_axis() as i64 - 1;
    let extent = i64::from(extent);

    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    let mut i: u64 = 0;
    // bounded so a tiny domain cannot spin forever
    while out.len() < count && i < count as u64 * 64 {
        let digest = SeedDigest::of(&[config.seed.as_bytes(), b"scatter", &i.to_le_bytes()]);
        i += 1;
        let mut axis = [0i32; 3];
        for (k, slot) in axis.iter_mut().enumerate() {
            let offset = digest.span(k * 4..k * 4 + 4, 0, 2 * extent as u64) as i64 - extent;
            let index = (center[k] + offset).clamp(0, last);
            if let Some(v) = domain.axis_value(index) {
                *slot = v;
            }
        }
        let c = Coordinate::new(axis[0], axis[1], axis[2]);
        if seen.insert(c) {
            out.push(c);
        }
    }
    out
}

fn build_network(
    config: &UniverseConfig,
    count: usize,
    extent: u32,
) -> anyhow::Result<(Universe, TopologyCoordinator, Vec<Coordinate>)> {
    let systems = scatter(config, count, extent);
    let mut universe = Universe::new(config.seed.clone(), config.domain);
    let topology = TopologyCoordinator::new();
    for s in &systems {
        universe.realize(*s)?;
        topology.insert(&universe, *s)?;
    }
    Ok((universe, topology, systems))
}

fn load_config(cli: &Cli) -> anyhow::Result<UniverseConfig> {
    let mut config = match &cli.config {
        Some(path) => UniverseConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => UniverseConfig::default(),
    };
    if let Some(seed) = &cli.seed {
        config.seed = seed.clone();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Info => {
            println!("warpspace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("seed: {:?}", config.seed);
            let d = config.domain;
            println!(
                "domain: {}..={} step {} ({} points)",
                d.min,
                d.max,
                d.step,
                d.total_points()
            );
            println!(
                "search: exact rings up to r={}, {} samples beyond, tolerance {}",
                config.search.sampling_radius_threshold,
                config.search.sample_count,
                config.search.ring_tolerance
            );
            println!("routing: {} per hop", config.routing.cost_per_hop);
        }
        Commands::Generate { at } => {
            let universe = Universe::new(config.seed.clone(), config.domain);
            let record = universe.preview(at)?;
            println!("{} at {}", record.name, record.coordinate);
            println!(
                "  star: {}, planets: {}, hazard: {}",
                record.star_type, record.planet_count, record.hazard_level
            );
            println!("  minerals: {:?}", record.minerals);
            for (commodity, price) in &record.prices {
                println!("  {commodity:?}: {price}");
            }
        }
        Commands::Attributes {
            race,
            hull,
            tier,
            location,
        } => {
            let attrs = generate_attributes(race, hull, tier, location.as_deref())?;
            println!("{}", attrs.display_name);
            println!(
                "  capacity {}, efficiency {}, maneuverability {}, durability {}",
                attrs.capacity, attrs.efficiency, attrs.maneuverability, attrs.durability
            );
            println!(
                "  maintenance {}, sensors {}, hardpoints {}, crew {}-{}",
                attrs.maintenance_rate,
                attrs.sensor_range,
                attrs.hardpoints,
                attrs.crew_min,
                attrs.crew_max
            );
            println!("  cost {}", attrs.cost);
        }
        Commands::Link { count, extent } => {
            let (universe, topology, systems) = build_network(&config, count, extent)?;
            let graph = topology.snapshot();
            println!(
                "Linked {} systems ({} realized): {} gates, version {}",
                systems.len(),
                universe.system_count(),
                graph.gate_count(),
                graph.version()
            );
            for node in graph.nodes() {
                let buckets: Vec<String> = graph
                    .buckets_of(node)
                    .into_iter()
                    .map(|(d, n)| format!("{d}->{n}"))
                    .collect();
                println!("  {node}: {}", buckets.join(" "));
            }
            let violations = graph.verify_invariants();
            if violations.is_empty() {
                println!("Invariants: OK");
            } else {
                for v in &violations {
                    println!("  violation: {v}");
                }
                anyhow::bail!("{} invariant violations", violations.len());
            }
        }
        Commands::Route {
            count,
            extent,
            from,
            to,
        } => {
            let (_, topology, systems) = build_network(&config, count, extent)?;
            let start = *systems
                .get(from)
                .with_context(|| format!("no scattered system #{from}"))?;
            let end = *systems
                .get(to)
                .with_context(|| format!("no scattered system #{to}"))?;
            let pathfinder = WarpRoutePathfinder::new(config.routing.clone());
            match pathfinder.route(&topology.snapshot(), start, end)? {
                RouteOutcome::Found(route) => {
                    let path: Vec<String> = route.systems.iter().map(|c| c.to_string()).collect();
                    let path = path.join(" -> ");
                    println!("{} hops, cost {}: {path}", route.hops, route.cost);
                }
                RouteOutcome::Unreachable => println!("{start} -> {end}: unreachable"),
            }
        }
        Commands::Scan {
            at,
            direction,
            radius,
        } => {
            let actor = ActorId::new();
            let mut ledger = ExplorationLedger::new();
            let r_sq = i64::from(radius) * i64::from(radius);
            for p in config.domain.iter() {
                if p.distance_squared(at) <= r_sq {
                    ledger.mark(actor, p, false);
                }
            }
            let search = ExplorationSearch::new(
                config.domain,
                config.search.clone(),
                ledger.explored_set(actor, std::iter::empty()),
            )
            .at(at)?;
            println!(
                "Explored {}/{} ({:.4}%)",
                search.explored_count(),
                search.total(),
                search.progress_percentage()
            );
            match search.closest_unexplored(direction) {
                Some(p) => println!("closest unexplored: {p}"),
                None => println!("closest unexplored: none"),
            }
            match search.closest_unexplored_orbital() {
                Some(p) => println!("orbital: {p}"),
                None => println!("orbital: none"),
            }
        }
    }

    Ok(())
}
