#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for the crowd wave simulation.

mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crowd_wave_system_orchestrator::{PathTopology, WaveConfig};
use tracing_subscriber::EnvFilter;

use session::{run_session, SessionPlan, SessionReport};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "crowd-wave", version, about = "Simulates a stadium crowd wave", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Runs a fixed-step session and prints the archived waves.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Simulated session length in seconds.
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Fixed simulation step in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Seed for seat population and wave draws.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Number of seating sections.
    #[arg(long, default_value_t = 6)]
    sections: u32,

    /// Seat rows per section.
    #[arg(long, default_value_t = 8)]
    rows: u32,

    /// Seat columns per section.
    #[arg(long, default_value_t = 8)]
    columns: u32,

    /// Overrides the configured path topology.
    #[arg(long, value_enum)]
    topology: Option<TopologyArg>,

    /// TOML file with wave tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Log filter, e.g. `crowd_wave=debug`. Defaults to `RUST_LOG`.
    #[arg(long)]
    log: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TopologyArg {
    Linear,
    Wrap,
}

impl From<TopologyArg> for PathTopology {
    fn from(value: TopologyArg) -> Self {
        match value {
            TopologyArg::Linear => PathTopology::Linear,
            TopologyArg::Wrap => PathTopology::Wrap,
        }
    }
}

/// Entry point for the crowd wave command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        CliCommand::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    install_logging(args.log.as_deref())?;

    let mut config = match &args.config {
        Some(path) => WaveConfig::from_file(path)
            .with_context(|| format!("failed to load wave config {}", path.display()))?,
        None => WaveConfig::default(),
    };
    if let Some(topology) = args.topology {
        config.path.topology = topology.into();
    }

    let plan = session_plan(&args)?;
    tracing::info!(
        target: "crowd_wave::cli",
        seconds = args.seconds,
        tick_ms = args.tick_ms,
        seed = args.seed,
        sections = args.sections,
        topology = config.path.topology.as_str(),
        "session.start"
    );
    let report = run_session(&plan, config);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialise report")?
        );
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn session_plan(args: &RunArgs) -> Result<SessionPlan> {
    if args.tick_ms == 0 {
        bail!("--tick-ms must be positive");
    }
    let duration = Duration::try_from_secs_f32(args.seconds)
        .map_err(|error| anyhow!("--seconds {}: {error}", args.seconds))?;
    Ok(SessionPlan {
        duration,
        tick: Duration::from_millis(args.tick_ms),
        seed: args.seed,
        sections: args.sections,
        rows: args.rows,
        columns: args.columns,
    })
}

fn install_logging(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter {directives:?}"))?,
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|error| anyhow!("failed to install logger: {error}"))
}

fn print_summary(report: &SessionReport) {
    for wave in &report.waves {
        let outcomes: Vec<&str> = wave
            .results()
            .iter()
            .map(|result| result.outcome.as_str())
            .collect();
        println!(
            "{} {:<11} origin {} {:?}: {} [{}]",
            wave.id(),
            wave.kind().as_str(),
            wave.origin(),
            wave.direction(),
            if wave.succeeded() { "success" } else { "failed" },
            outcomes.join(", ")
        );
    }
    let board = &report.scoreboard;
    println!(
        "score {:.0} / {:.0} possible, multiplier {:.2}, waves {}/{} successful, {} events over {:.1}s",
        board.total_points,
        board.max_possible_score,
        board.multiplier,
        board.waves_succeeded,
        board.waves_completed,
        report.events_published,
        report.simulated_secs
    );
}
