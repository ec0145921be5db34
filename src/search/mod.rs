//! Monte-Carlo search for slowly percolating seed sets
//!
//! Every trial draws a random seed set, runs the engine on it and keeps the
//! trial with the longest percolation time. A stalled trial ranks below any
//! percolating one; ties keep the earliest trial.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::percolation::{Outcome, PercolationEngine, SeedSet};
use crate::plane::ProjectivePlane;
use crate::PercolationError;

/// Default seed size range `[rate·(rate+1)/2, rate·(rate+1)]`, clamped to the
/// number of points so that a set of unique points can always be drawn
pub fn default_seed_sizes(infection_rate: usize, size: usize) -> RangeInclusive<usize> {
    let product = infection_rate.saturating_mul(infection_rate.saturating_add(1));
    let max = product.min(size);
    let min = (product / 2).min(max);
    min..=max
}

pub(crate) fn check_seed_sizes(
    seed_sizes: &RangeInclusive<usize>,
    size: usize,
) -> Result<(), PercolationError> {
    if seed_sizes.is_empty() || *seed_sizes.end() > size {
        return Err(PercolationError::InvalidSeedSizeRange {
            min: *seed_sizes.start(),
            max: *seed_sizes.end(),
            size,
        });
    }
    Ok(())
}

/// Draw a random seed set.
///
/// The set size is uniform over `seed_sizes`; points are drawn uniformly
/// from `0..universe`, redrawing duplicates until the set is full. The range
/// must be non-empty and end at or below `universe`.
pub fn random_seed_set<R: Rng + ?Sized>(
    rng: &mut R,
    seed_sizes: RangeInclusive<usize>,
    universe: usize,
) -> Result<SeedSet, PercolationError> {
    check_seed_sizes(&seed_sizes, universe)?;
    let target = rng.random_range(seed_sizes);
    let mut points = SeedSet::new();
    while points.len() < target {
        points.insert(rng.random_range(0..universe));
    }
    Ok(points)
}

/// Best trial found by a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Outcome of the slowest trial
    pub best_outcome: Outcome,
    /// Seed set of the slowest trial
    pub best_seed: SeedSet,
    /// 0-indexed trial that produced the best seed
    pub best_trial: usize,
    /// Number of trials run
    pub trials: usize,
    /// Number of trials whose seed percolated
    pub percolated_trials: usize,
}

/// Slowest-seed search driver
#[derive(Debug, Clone)]
pub struct SlowestSeedSearch<'a> {
    engine: PercolationEngine<'a>,
    seed_sizes: RangeInclusive<usize>,
}

impl<'a> SlowestSeedSearch<'a> {
    /// Create a search over seed sets whose sizes lie in `seed_sizes`
    pub fn new(
        plane: &'a ProjectivePlane,
        infection_rate: usize,
        seed_sizes: RangeInclusive<usize>,
    ) -> Result<Self, PercolationError> {
        let engine = PercolationEngine::new(plane, infection_rate)?;
        check_seed_sizes(&seed_sizes, plane.size())?;
        Ok(Self { engine, seed_sizes })
    }

    /// Create a search using [`default_seed_sizes`]
    pub fn with_default_sizes(
        plane: &'a ProjectivePlane,
        infection_rate: usize,
    ) -> Result<Self, PercolationError> {
        Self::new(
            plane,
            infection_rate,
            default_seed_sizes(infection_rate, plane.size()),
        )
    }

    /// Seed size range in use
    pub fn seed_sizes(&self) -> &RangeInclusive<usize> {
        &self.seed_sizes
    }

    /// Run `trials` random trials drawing from `rng`
    pub fn run<R: Rng + ?Sized>(
        &self,
        trials: usize,
        rng: &mut R,
    ) -> Result<SearchResult, PercolationError> {
        if trials == 0 {
            return Err(PercolationError::InvalidTrialCount);
        }

        let universe = self.engine.plane().size();
        let mut best: Option<(Outcome, SeedSet, usize)> = None;
        let mut percolated_trials = 0;

        for trial in 0..trials {
            let seed = random_seed_set(rng, self.seed_sizes.clone(), universe)?;
            let outcome = self.engine.run(&seed)?;
            if outcome.percolated() {
                percolated_trials += 1;
            }
            tracing::debug!(trial, seed_size = seed.len(), %outcome, "trial finished");

            let improves = match &best {
                Some((current, _, _)) => {
                    outcome.percolation_length() > current.percolation_length()
                }
                None => true,
            };
            if improves {
                if best.is_some() {
                    tracing::info!(trial, %outcome, "new slowest seed");
                }
                best = Some((outcome, seed, trial));
            }
        }

        let (best_outcome, best_seed, best_trial) =
            best.ok_or(PercolationError::InvalidTrialCount)?;
        Ok(SearchResult {
            best_outcome,
            best_seed,
            best_trial,
            trials,
            percolated_trials,
        })
    }
}
