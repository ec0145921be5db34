use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use line_percolation::{
    is_prime, Experiment, PercolationEngine, ProjectivePlane, SearchConfig, SeedRecord, SeedSet,
    TextLogObserver, TracingObserver,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "line-percolation",
    about = "Line percolation on the projective plane PG(2,q)",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search random seed sets for the slowest percolation.
    Search {
        /// Plane order q (prime).
        order: usize,
        /// Number of infected points a line needs to become infected.
        rate: usize,
        /// Number of random seed sets to try.
        trials: usize,
        /// Fixed RNG seed for a reproducible search.
        #[arg(long)]
        seed: Option<u64>,
        /// Round log of the slowest seed.
        #[arg(long, default_value = "test.log")]
        log: PathBuf,
        /// Directory receiving the seed record.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Replay a seed record written by `search`.
    Replay {
        /// Seed record file.
        record: PathBuf,
        /// Write the round log here.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Run a single explicit seed set.
    Run {
        /// Plane order q (prime).
        order: usize,
        /// Number of infected points a line needs to become infected.
        rate: usize,
        /// Initially infected point indices.
        #[arg(required = true)]
        points: Vec<usize>,
    },
    /// Print the points of a plane and their incident lines.
    Info {
        /// Plane order q (prime).
        order: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            order,
            rate,
            trials,
            seed,
            log,
            output_dir,
        } => run_search(order, rate, trials, seed, log, output_dir)?,
        Commands::Replay { record, log } => run_replay(record, log)?,
        Commands::Run {
            order,
            rate,
            points,
        } => run_single(order, rate, points)?,
        Commands::Info { order } => show_info(order)?,
    }

    Ok(())
}

fn warn_if_composite(order: usize) {
    if !is_prime(order) {
        tracing::warn!(order, "order is not prime; the incidence structure is not a projective plane");
    }
}

fn run_search(
    order: usize,
    rate: usize,
    trials: usize,
    seed: Option<u64>,
    log_path: PathBuf,
    output_dir: PathBuf,
) -> Result<()> {
    warn_if_composite(order);

    let mut config = SearchConfig::new(order, rate, trials);
    if let Some(seed) = seed {
        config = config.with_rng_seed(seed);
    }
    let experiment = Experiment::new(config).context("invalid search parameters")?;
    tracing::info!(
        order,
        rate,
        trials,
        seed_sizes = ?experiment.config().seed_sizes,
        "starting search"
    );

    let result = experiment.search().context("search failed")?;

    let log_file = File::create(&log_path)
        .with_context(|| format!("failed to create log file {}", log_path.display()))?;
    experiment
        .replay_logged(&result.best_seed, BufWriter::new(log_file))
        .with_context(|| format!("failed to write log file {}", log_path.display()))?;

    let record_path = experiment
        .seed_record(&result)
        .save_in(&output_dir)
        .with_context(|| format!("failed to write seed record in {}", output_dir.display()))?;

    println!(
        "slowest seed: trial {} of {}, {} points, {}",
        result.best_trial + 1,
        result.trials,
        result.best_seed.len(),
        result.best_outcome
    );
    println!(
        "percolating trials: {}/{}",
        result.percolated_trials, result.trials
    );
    println!("seed record: {}", record_path.display());
    println!("round log: {}", log_path.display());

    Ok(())
}

fn run_replay(record_path: PathBuf, log_path: Option<PathBuf>) -> Result<()> {
    let record = SeedRecord::read(&record_path)
        .with_context(|| format!("failed to read seed record {}", record_path.display()))?;
    warn_if_composite(record.order);

    let plane = ProjectivePlane::new(record.order).context("invalid plane order")?;
    let engine =
        PercolationEngine::new(&plane, record.infection_rate).context("invalid infection rate")?;
    let outcome = match log_path {
        Some(log_path) => {
            let file = File::create(&log_path)
                .with_context(|| format!("failed to create log file {}", log_path.display()))?;
            let mut log = TextLogObserver::new(BufWriter::new(file));
            let outcome = engine
                .run_observed(&record.points, &mut log)
                .context("replay failed")?;
            log.finish()
                .with_context(|| format!("failed to write log file {}", log_path.display()))?;
            outcome
        }
        None => engine
            .run_observed(&record.points, &mut TracingObserver)
            .context("replay failed")?,
    };

    println!(
        "PG(2,{}) rate {} with {} seed points: {}",
        record.order,
        record.infection_rate,
        record.points.len(),
        outcome
    );
    Ok(())
}

fn run_single(order: usize, rate: usize, points: Vec<usize>) -> Result<()> {
    warn_if_composite(order);

    let plane = ProjectivePlane::new(order).context("invalid plane order")?;
    let engine = PercolationEngine::new(&plane, rate).context("invalid infection rate")?;
    let seed: SeedSet = points.into_iter().collect();

    let mut log = TextLogObserver::new(std::io::stdout().lock());
    engine
        .run_observed(&seed, &mut log)
        .context("percolation failed")?;
    // finish flushes; the returned lock only needs releasing
    drop(log.finish().context("failed to write round log")?);
    Ok(())
}

fn show_info(order: usize) -> Result<()> {
    if order == 0 {
        bail!("plane order must be at least 1");
    }
    warn_if_composite(order);

    let plane = ProjectivePlane::new(order).context("invalid plane order")?;
    println!(
        "PG(2,{}): {} points, {} lines, {} points per line",
        plane.order(),
        plane.size(),
        plane.size(),
        plane.line_size()
    );
    for index in 0..plane.size() {
        let incident: Vec<String> = plane
            .incident(index)
            .iter()
            .map(|line| line.to_string())
            .collect();
        println!("{}\t{}\t{}", index, plane.triple(index), incident.join(" "));
    }
    Ok(())
}
