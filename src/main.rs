//! Command-line front end: load a workload, run the fair share engine,
//! print the averages and optionally write a Gantt chart.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use fairshare::report::{render_process_table, render_summary};
use fairshare::verify::{check_all, standard_properties};
use fairshare::workload::load_processes;
use fairshare::{GanttChart, GroupAssignment, SchedulerApi, SimulationConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fair share CPU scheduling simulator")]
struct Args {
    /// Workload file, one `pid arrival burst [group]` per line
    #[arg(short = 'p', long = "processes")]
    processes: PathBuf,

    /// Global quantum shared by the active groups each turn
    #[arg(short, long)]
    quantum: u64,

    /// Number of groups for random or round-robin assignment
    #[arg(short, long)]
    groups: Option<u64>,

    /// Seed for random group assignment (defaults to the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// How processes get their group; random when --groups is set,
    /// otherwise taken from the fourth column
    #[arg(long, value_enum)]
    assign: Option<AssignMode>,

    /// Order Gantt rows by process id
    #[arg(short, long)]
    sort: bool,

    /// Write the Gantt chart as SVG
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export the execution timeline as text
    #[arg(long)]
    timeline: Option<PathBuf>,

    /// Print a JSON snapshot instead of the text report
    #[arg(long)]
    json: bool,

    /// Check scheduling invariants and fail on any violation
    #[arg(long)]
    verify: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AssignMode {
    Random,
    RoundRobin,
    Input,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = SimulationConfig::new(args.quantum, assignment(&args)?);
    let mut engine = config.engine().context("invalid configuration")?;

    let processes = load_processes(&args.processes, &config.assignment)
        .with_context(|| format!("failed to load {}", args.processes.display()))?;
    if processes.is_empty() {
        eprintln!("No valid processes found in {}.", args.processes.display());
        return Ok(ExitCode::FAILURE);
    }

    engine.load(processes);
    let mut api = SchedulerApi::new(engine);
    let turns = api.run();
    info!(turns, time = api.current_time(), "simulation complete");

    let engine = api.engine();
    if args.json {
        println!("{}", api.snapshot_json());
    } else {
        print!("{}", render_summary(engine.summary().as_ref()));
        if args.verbose {
            println!();
            print!("{}", render_process_table(&engine.completed_metrics()));
        }
    }

    if let Some(path) = &args.timeline {
        engine
            .timeline()
            .export_to_file(path)
            .with_context(|| format!("failed to write timeline to {}", path.display()))?;
        info!(path = %path.display(), "timeline exported");
    }

    if let Some(path) = &args.output {
        let chart = GanttChart::from_engine(engine).sort_by_pid(args.sort);
        match chart.render_svg() {
            Some(svg) => {
                std::fs::write(path, svg)
                    .with_context(|| format!("failed to write chart to {}", path.display()))?;
                if !args.json {
                    println!("Gantt chart written to {}", path.display());
                }
            }
            None => warn!("empty timeline, no chart written"),
        }
    }

    if args.verify {
        let violations = check_all(engine, &standard_properties());
        if !violations.is_empty() {
            for v in &violations {
                eprintln!("violation: {v}");
            }
            return Ok(ExitCode::FAILURE);
        }
        if !args.json {
            println!("All scheduling invariants hold.");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn assignment(args: &Args) -> Result<GroupAssignment> {
    let mode = args.assign.unwrap_or(if args.groups.is_some() {
        AssignMode::Random
    } else {
        AssignMode::Input
    });

    Ok(match mode {
        AssignMode::Input => GroupAssignment::FromInput,
        AssignMode::RoundRobin => {
            let Some(groups) = args.groups else {
                bail!("--assign round-robin requires --groups");
            };
            GroupAssignment::round_robin(groups)
        }
        AssignMode::Random => {
            let Some(groups) = args.groups else {
                bail!("--assign random requires --groups");
            };
            let seed = args.seed.unwrap_or_else(clock_seed);
            info!(seed, groups, "random group assignment");
            GroupAssignment::random(groups, seed)
        }
    })
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Ignore error if already set.
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
