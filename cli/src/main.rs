use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use parking_simulator_core_rs::chi_square::{critical_value, ChiSquareResult, SignificanceLevel};
use parking_simulator_core_rs::core::time::{format_clock, parse_clock};
use parking_simulator_core_rs::models::{event_digest, Event};
use parking_simulator_core_rs::orchestrator::{EngineState, ParkingSimulator, SimulationParameters};
use parking_simulator_core_rs::rng::PrngMethod;
use parking_simulator_core_rs::stats::{duration_histogram, OccupancyBreakdown, DEFAULT_BIN_MINUTES};
use parking_simulator_core_rs::SimulationStatistics;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    /// Platform generator (not reproducible)
    Default,
    /// Linear congruential generator
    Lcg,
    /// Mixed congruential generator (a/c/m from the params file)
    Mcg,
    /// Mersenne Twister MT19937
    Mt,
}

impl From<MethodArg> for PrngMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Default => PrngMethod::Default,
            MethodArg::Lcg => PrngMethod::Lcg,
            MethodArg::Mcg => PrngMethod::MixedCongruential,
            MethodArg::Mt => PrngMethod::MersenneTwister,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "parking-sim", version)]
#[command(about = "Discrete-event parking facility simulator")]
struct Cli {
    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate a whole day and print the final report
    Run(RunArgs),
    /// Run the chi-square uniformity test on a generator
    ChiSquare(ChiSquareArgs),
}

/// Options shared by both subcommands
#[derive(Debug, Args)]
struct GeneratorArgs {
    /// JSON file with simulation parameters (missing fields use defaults)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Generator seed
    #[arg(long)]
    seed: Option<i64>,

    /// Generator algorithm
    #[arg(long, value_enum)]
    method: Option<MethodArg>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    generator: GeneratorArgs,

    /// Enable the projected expansion zone
    #[arg(long)]
    projected: bool,

    /// Count reserved spaces as occupied
    #[arg(long)]
    reservations: bool,

    /// Opening time (HH:MM)
    #[arg(long)]
    start: Option<String>,

    /// Closing time (HH:MM)
    #[arg(long)]
    end: Option<String>,

    /// Pace ticks at the configured tick rate
    #[arg(long)]
    realtime: bool,

    /// Number of event-log entries to print
    #[arg(long, default_value_t = 10)]
    events: usize,
}

#[derive(Debug, Args)]
struct ChiSquareArgs {
    #[command(flatten)]
    generator: GeneratorArgs,

    /// Number of samples (N)
    #[arg(long)]
    samples: Option<usize>,

    /// Number of bins (K)
    #[arg(long)]
    bins: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Command::Run(args) => run_day(&args),
        Command::ChiSquare(args) => run_chi_square(&args),
    }
}

// ============================================================================
// Parameters
// ============================================================================

fn load_parameters(path: Option<&Path>) -> Result<SimulationParameters> {
    let Some(path) = path else {
        return Ok(SimulationParameters::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading parameters from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn apply_generator_args(params: &mut SimulationParameters, args: &GeneratorArgs) {
    if let Some(method) = args.method {
        params.prng.method = method.into();
    }
    if let Some(seed) = args.seed {
        params.prng.seed = seed;
    }
}

fn parse_time(label: &str, text: &str) -> Result<u32> {
    match parse_clock(text) {
        Some(minutes) => Ok(minutes),
        None => bail!("{} time '{}' is not HH:MM", label, text),
    }
}

// ============================================================================
// run
// ============================================================================

fn run_day(args: &RunArgs) -> Result<()> {
    let mut params = load_parameters(args.generator.params.as_deref())?;
    apply_generator_args(&mut params, &args.generator);
    params.enable_projected_zone |= args.projected;
    params.enable_reservations |= args.reservations;
    if let Some(start) = &args.start {
        params.simulation_start_time = parse_time("start", start)?;
    }
    if let Some(end) = &args.end {
        params.simulation_end_time = parse_time("end", end)?;
    }

    let mut sim = ParkingSimulator::new(params).context("invalid simulation parameters")?;
    info!(
        "simulating {}-{} with {} / {}",
        format_clock(sim.parameters().simulation_start_time),
        format_clock(sim.parameters().simulation_end_time),
        sim.prng().method(),
        sim.policy_name()
    );

    let events = if args.realtime {
        run_paced(&mut sim)?
    } else {
        sim.run_to_end()?
    };
    let digest = event_digest(&events).context("hashing event sequence")?;

    if args.generator.json {
        let report = serde_json::json!({
            "parameters": sim.parameters(),
            "statistics": sim.statistics(),
            "occupancy": OccupancyBreakdown::from_statistics(sim.statistics()),
            "duration_histogram": duration_histogram(
                &sim.statistics().parking_durations,
                DEFAULT_BIN_MINUTES,
            ),
            "event_digest": digest,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_statistics(sim.statistics());
    println!();
    print_histogram(sim.statistics());
    println!();
    print_timeline(sim.statistics());
    println!();
    println!("Latest events:");
    for entry in sim.event_log().entries().take(args.events) {
        println!("  [{}] {} {}", entry.id, entry.timestamp, entry.message);
    }
    println!();
    println!("Event digest: {}", digest);
    Ok(())
}

/// Tick at `tick_rate` ticks per second, printing arrivals as they happen
fn run_paced(sim: &mut ParkingSimulator) -> Result<Vec<Event>> {
    let interval = Duration::from_millis(1000 / u64::from(sim.parameters().tick_rate));
    let mut events = Vec::new();
    sim.start()?;
    while sim.engine_state() == EngineState::Running {
        let result = sim.tick()?;
        for event in &result.events {
            println!("{} {}", format_clock(event.minute()), event.message());
        }
        events.extend(result.events);
        thread::sleep(interval);
    }
    Ok(events)
}

fn print_statistics(stats: &SimulationStatistics) {
    println!("Simulation clock:   {}", format_clock(stats.simulation_clock));
    println!("Arrival attempts:   {}", stats.total_arrivals);
    println!("Rejections:         {} ({:.1}%)", stats.total_rejections, stats.rejection_rate);
    println!("Departures:         {}", stats.total_departures);
    println!("Avg parking time:   {:.1} min", stats.avg_parking_time);
    println!("Overall occupancy:  {:.1}%", stats.overall_occupancy_rate);
    for zone in [&stats.internal, &stats.external, &stats.projected] {
        if zone.active {
            println!(
                "  {:<10} {:>3}/{:<3} ({:.1}%)",
                zone.zone_id, zone.occupied, zone.capacity, zone.occupancy_rate
            );
        } else {
            println!("  {:<10} n/a", zone.zone_id);
        }
    }
    let breakdown = OccupancyBreakdown::from_statistics(stats);
    println!("Occupied / free:    {} / {}", breakdown.occupied, breakdown.free);
}

fn print_histogram(stats: &SimulationStatistics) {
    println!("Parking durations:");
    for bin in duration_histogram(&stats.parking_durations, DEFAULT_BIN_MINUTES) {
        println!("  {:>12} {}", bin.label, "#".repeat(bin.count as usize));
    }
}

fn print_timeline(stats: &SimulationStatistics) {
    println!("Hourly arrivals / rejections:");
    for bucket in stats.timeline.buckets() {
        println!(
            "  {} {:>4} {:>4}",
            bucket.label, bucket.arrivals, bucket.rejections
        );
    }
}

// ============================================================================
// chi-square
// ============================================================================

fn run_chi_square(args: &ChiSquareArgs) -> Result<()> {
    let mut params = load_parameters(args.generator.params.as_deref())?;
    apply_generator_args(&mut params, &args.generator);
    if let Some(samples) = args.samples {
        params.chi_square_sample_size = samples;
    }
    if let Some(bins) = args.bins {
        params.chi_square_num_bins = bins;
    }

    let mut sim = ParkingSimulator::new(params).context("invalid chi-square parameters")?;
    let result = sim.run_configured_chi_square_test()?;

    if args.generator.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_chi_square(&result);
    }
    Ok(())
}

fn print_chi_square(result: &ChiSquareResult) {
    println!("{}", result.interpretation);
    if !result.is_computed() {
        return;
    }
    println!();
    println!("  bin   observed   expected");
    for (i, (observed, expected)) in result
        .observed_frequencies
        .iter()
        .zip(&result.expected_frequencies)
        .enumerate()
    {
        println!("  {:>3}   {:>8}   {:>8.1}", i, observed, expected);
    }
    println!();
    for level in [SignificanceLevel::P10, SignificanceLevel::P05, SignificanceLevel::P01] {
        println!(
            "  alpha={:.2}  critical={:.3}  {}",
            level.alpha(),
            critical_value(result.degrees_of_freedom, level),
            if result.passes(level) { "pass" } else { "fail" }
        );
    }
}
