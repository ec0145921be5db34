//! # Line Percolation on Finite Projective Planes
//!
//! This library simulates bootstrap (line) percolation on the incidence
//! structure of PG(2,q) for prime `q`, and searches for the slowest
//! percolating initial sets by Monte-Carlo sampling.
//!
//! ## Core Algorithm
//!
//! 1. **Plane construction**: enumerate the `q² + q + 1` points and lines and
//!    their incidence relation
//! 2. **Round-based propagation**: a line becomes infected once it carries
//!    `rate` infected points; an infected line infects all of its points
//! 3. **Fixed point detection**: stop when every point is reached or when a
//!    round reaches no new point
//! 4. **Slowest-seed search**: sample random seed sets and keep the one that
//!    needs the most rounds
//!
//! ## Usage Example
//!
//! ```no_run
//! use line_percolation::{Experiment, SearchConfig};
//!
//! let config = SearchConfig::new(7, 3, 1_000).with_rng_seed(42);
//! let experiment = Experiment::new(config)?;
//! let result = experiment.search()?;
//! println!("slowest seed: {:?} -> {}", result.best_seed, result.best_outcome);
//! # Ok::<(), line_percolation::PercolationError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod percolation; // Round-based spreading engine
pub mod persist; // Seed record text format and replay
pub mod plane; // Projective plane incidence structure
pub mod search; // Slowest-seed Monte-Carlo search

// Re-exports for convenience
pub use percolation::{
    NoopObserver, Outcome, PercolationEngine, PercolationReport, RecordingObserver,
    RoundObserver, RoundSummary, SeedSet, TextLogObserver, TracingObserver,
};
pub use persist::SeedRecord;
pub use plane::{index_to_triple, is_prime, plane_size, ProjectivePlane, Triple};
pub use search::{default_seed_sizes, random_seed_set, SearchResult, SlowestSeedSearch};

use std::io::Write;
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

/// Errors that can occur while building planes, running percolation or
/// reading seed records
#[derive(Error, Debug)]
pub enum PercolationError {
    /// Plane order must be positive and small enough that q² + q + 1 fits
    /// in `usize`
    #[error("invalid plane order {0}: order must be at least 1 and q²+q+1 must fit in usize")]
    InvalidOrder(usize),

    /// A seed record was replayed on a plane of another order
    #[error("seed record for PG(2,{record}) cannot run on PG(2,{plane})")]
    OrderMismatch {
        /// Order stored in the record
        record: usize,
        /// Order of the plane it was replayed on
        plane: usize,
    },

    /// Infection threshold must be at least 1
    #[error("invalid infection rate {0}: rate must be at least 1")]
    InvalidInfectionRate(usize),

    /// A seed point lies outside the plane
    #[error("point index {index} out of range for plane of size {size}")]
    PointIndexOutOfRange {
        /// Offending point index
        index: usize,
        /// Number of points in the plane
        size: usize,
    },

    /// A persisted seed record could not be parsed
    #[error("malformed seed record at line {line}: {message}")]
    MalformedPersistedSet {
        /// 1-indexed line number where parsing failed
        line: usize,
        /// What was wrong with it
        message: String,
    },

    /// The search needs at least one trial
    #[error("number of trials must be at least 1")]
    InvalidTrialCount,

    /// Seed sizes must form a non-empty range that fits in the plane
    #[error("invalid seed size range {min}..={max} for plane of size {size}")]
    InvalidSeedSizeRange {
        /// Smallest seed size requested
        min: usize,
        /// Largest seed size requested
        max: usize,
        /// Number of points in the plane
        size: usize,
    },

    /// Reading or writing a record or log failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration parameters for a slowest-seed search
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Plane order q (intended prime)
    pub order: usize,

    /// Number of infected points a line needs before it becomes infected
    pub infection_rate: usize,

    /// Number of random seed sets to try
    pub trials: usize,

    /// Inclusive range of seed set sizes
    pub seed_sizes: RangeInclusive<usize>,

    /// Fixed RNG seed; `None` draws one from the operating system
    pub rng_seed: Option<u64>,
}

impl SearchConfig {
    /// Create a configuration using the default seed size policy
    /// `[rate·(rate+1)/2, rate·(rate+1)]`, clamped to the plane size.
    pub fn new(order: usize, infection_rate: usize, trials: usize) -> Self {
        // an invalid order leaves an empty policy range; validate() reports it
        let size = plane_size(order).unwrap_or_default();
        Self {
            order,
            infection_rate,
            trials,
            seed_sizes: default_seed_sizes(infection_rate, size),
            rng_seed: None,
        }
    }

    /// Override the seed size range
    pub fn with_seed_sizes(mut self, seed_sizes: RangeInclusive<usize>) -> Self {
        self.seed_sizes = seed_sizes;
        self
    }

    /// Fix the RNG seed so the search is reproducible
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Number of points in the configured plane
    pub fn plane_size(&self) -> Result<usize, PercolationError> {
        plane_size(self.order)
    }

    /// Check every parameter before any work is done
    pub fn validate(&self) -> Result<(), PercolationError> {
        let size = self.plane_size()?;
        if self.infection_rate == 0 {
            return Err(PercolationError::InvalidInfectionRate(self.infection_rate));
        }
        if self.trials == 0 {
            return Err(PercolationError::InvalidTrialCount);
        }
        search::check_seed_sizes(&self.seed_sizes, size)
    }
}

/// Main experiment orchestrator
///
/// Owns the plane for one configuration and wires the search, the round log
/// and seed record persistence together.
#[derive(Debug)]
pub struct Experiment {
    plane: ProjectivePlane,
    config: SearchConfig,
}

impl Experiment {
    /// Validate the configuration and build the plane
    pub fn new(config: SearchConfig) -> Result<Self, PercolationError> {
        config.validate()?;
        let plane = ProjectivePlane::new(config.order)?;
        Ok(Self { plane, config })
    }

    /// The plane this experiment runs on
    pub fn plane(&self) -> &ProjectivePlane {
        &self.plane
    }

    /// The validated configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the slowest-seed search with a fresh random source
    pub fn search(&self) -> Result<SearchResult, PercolationError> {
        let mut rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.search_with(&mut rng)
    }

    /// Run the slowest-seed search with a caller-owned random source
    pub fn search_with<R: rand::Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<SearchResult, PercolationError> {
        SlowestSeedSearch::new(
            &self.plane,
            self.config.infection_rate,
            self.config.seed_sizes.clone(),
        )?
        .run(self.config.trials, rng)
    }

    /// Package a search result as a persistable seed record
    pub fn seed_record(&self, result: &SearchResult) -> SeedRecord {
        SeedRecord::new(
            self.config.order,
            self.config.infection_rate,
            result.best_seed.clone(),
        )
        .with_outcome(result.best_outcome)
        .with_trials(result.trials)
    }

    /// Rerun one seed set, writing the round log to `writer`
    pub fn replay_logged<W: Write>(
        &self,
        seed: &SeedSet,
        writer: W,
    ) -> Result<(Outcome, W), PercolationError> {
        let engine = PercolationEngine::new(&self.plane, self.config.infection_rate)?;
        let mut log = TextLogObserver::new(writer);
        let outcome = engine.run_observed(seed, &mut log)?;
        Ok((outcome, log.finish()?))
    }
}
