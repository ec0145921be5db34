//! Round-based line percolation engine
//!
//! Each round alternates two synchronous half-steps:
//! - newly reached points are marked infected and bump the counters of
//!   their lines; lines reaching the threshold join the line frontier
//! - newly infected lines reach every point on them that is still healthy
//!
//! Infection is irreversible, so the process reaches a fixed point within
//! `size` rounds.

mod observer;

pub use observer::{
    NoopObserver, RecordingObserver, RoundObserver, RoundSummary, TextLogObserver,
    TracingObserver,
};

use std::collections::BTreeSet;
use std::fmt;

use bitvec::prelude::*;

use crate::plane::ProjectivePlane;
use crate::PercolationError;

/// Initial infected point set, kept in canonical (ascending) order
pub type SeedSet = BTreeSet<usize>;

/// Terminal state of a percolation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Every point was reached after `rounds` rounds
    Percolated {
        /// Number of completed rounds
        rounds: usize,
    },
    /// A round reached no new point before the plane was covered
    Stalled {
        /// Number of completed rounds
        rounds: usize,
    },
}

impl Outcome {
    /// Number of completed rounds, whichever way the run ended
    pub fn rounds(&self) -> usize {
        match *self {
            Outcome::Percolated { rounds } | Outcome::Stalled { rounds } => rounds,
        }
    }

    /// Whether the whole plane was infected
    pub fn percolated(&self) -> bool {
        matches!(self, Outcome::Percolated { .. })
    }

    /// Percolation time, or `None` for a stalled run.
    ///
    /// `None` orders below every `Some`, so comparing these values ranks a
    /// stalled run below any percolating one.
    pub fn percolation_length(&self) -> Option<usize> {
        match *self {
            Outcome::Percolated { rounds } => Some(rounds),
            Outcome::Stalled { .. } => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Percolated { rounds } => write!(f, "percolated in {} rounds", rounds),
            Outcome::Stalled { rounds } => write!(f, "stalled in round {}", rounds),
        }
    }
}

/// Outcome together with the final infection state
#[derive(Debug, Clone)]
pub struct PercolationReport {
    /// How the run ended
    pub outcome: Outcome,

    /// Points infected (or reached in the last round) at termination
    pub infected_points: BitVec,

    /// Lines infected at termination
    pub infected_lines: BitVec,
}

impl PercolationReport {
    /// Number of infected points
    pub fn infected_point_count(&self) -> usize {
        self.infected_points.count_ones()
    }

    /// Number of infected lines
    pub fn infected_line_count(&self) -> usize {
        self.infected_lines.count_ones()
    }
}

/// Percolation engine bound to one plane and one infection threshold
///
/// The engine only borrows the plane; every run allocates its own state.
#[derive(Debug, Clone, Copy)]
pub struct PercolationEngine<'a> {
    plane: &'a ProjectivePlane,
    infection_rate: usize,
}

impl<'a> PercolationEngine<'a> {
    /// Create an engine; the threshold must be at least 1
    pub fn new(plane: &'a ProjectivePlane, infection_rate: usize) -> Result<Self, PercolationError> {
        if infection_rate == 0 {
            return Err(PercolationError::InvalidInfectionRate(infection_rate));
        }
        Ok(Self {
            plane,
            infection_rate,
        })
    }

    /// Plane the engine runs on
    pub fn plane(&self) -> &'a ProjectivePlane {
        self.plane
    }

    /// Infection threshold
    pub fn infection_rate(&self) -> usize {
        self.infection_rate
    }

    /// Run to a fixed point and report how it ended
    pub fn run(&self, seed: &SeedSet) -> Result<Outcome, PercolationError> {
        self.run_observed(seed, &mut NoopObserver)
    }

    /// Run while reporting every round to `observer`
    pub fn run_observed(
        &self,
        seed: &SeedSet,
        observer: &mut dyn RoundObserver,
    ) -> Result<Outcome, PercolationError> {
        self.run_detailed(seed, observer).map(|report| report.outcome)
    }

    /// Run while reporting every round, returning the final state as well
    pub fn run_detailed(
        &self,
        seed: &SeedSet,
        observer: &mut dyn RoundObserver,
    ) -> Result<PercolationReport, PercolationError> {
        for &point in seed {
            self.plane.check_point(point)?;
        }

        let mut state = InfectionState::new(self.plane.size(), seed.clone());
        observer.on_start(self.plane.order(), self.infection_rate);

        let outcome = loop {
            if state.frontier_points.is_empty() {
                break Outcome::Stalled {
                    rounds: state.round,
                };
            }

            let summary = state.step(self.plane, self.infection_rate);
            observer.on_round(&summary);
            observer.on_state(&state.point_reached, &state.line_infected);

            if summary.infected_points == self.plane.size() {
                break Outcome::Percolated {
                    rounds: state.round,
                };
            }
        };

        observer.on_finish(&outcome);
        Ok(state.into_report(outcome))
    }
}

/// Mutable state of one run
#[derive(Debug)]
struct InfectionState {
    round: usize,
    infected_point_count: usize,
    point_infected: BitVec,
    // infected or waiting in the frontier
    point_reached: BitVec,
    line_infected: BitVec,
    infected_points_on_line: Vec<usize>,
    frontier_points: BTreeSet<usize>,
    frontier_lines: BTreeSet<usize>,
}

impl InfectionState {
    fn new(size: usize, seed: SeedSet) -> Self {
        let mut point_reached = bitvec![0; size];
        for &point in &seed {
            point_reached.set(point, true);
        }
        Self {
            round: 0,
            infected_point_count: 0,
            point_infected: bitvec![0; size],
            point_reached,
            line_infected: bitvec![0; size],
            infected_points_on_line: vec![0; size],
            frontier_points: seed,
            frontier_lines: BTreeSet::new(),
        }
    }

    /// Execute one round; the point frontier is replaced by the points
    /// reached through newly infected lines
    fn step(&mut self, plane: &ProjectivePlane, infection_rate: usize) -> RoundSummary {
        self.round += 1;

        for point in std::mem::take(&mut self.frontier_points) {
            if self.point_infected[point] {
                continue;
            }
            self.point_infected.set(point, true);
            self.infected_point_count += 1;

            for &line in plane.incident(point) {
                self.infected_points_on_line[line] += 1;
                if self.infected_points_on_line[line] >= infection_rate && !self.line_infected[line]
                {
                    self.frontier_lines.insert(line);
                }
            }
        }

        for line in std::mem::take(&mut self.frontier_lines) {
            self.line_infected.set(line, true);
            for &point in plane.incident(line) {
                if !self.point_infected[point] {
                    self.frontier_points.insert(point);
                    self.point_reached.set(point, true);
                }
            }
        }

        RoundSummary {
            round: self.round,
            infected_points: self.infected_point_count + self.frontier_points.len(),
            newly_infected_points: self.frontier_points.len(),
            infected_lines: self.line_infected.count_ones(),
        }
    }

    // points reached in the final round count as infected
    fn into_report(self, outcome: Outcome) -> PercolationReport {
        PercolationReport {
            outcome,
            infected_points: self.point_reached,
            infected_lines: self.line_infected,
        }
    }
}
