//! Seed record text format
//!
//! A record stores the plane order, the infection rate and the seed points
//! of a run so that it can be replayed later:
//!
//! ```text
//! # order: 3
//! # rate: 2
//! # length of the slowest percolation: 4
//! # size of initial infected set: 3
//! # trials: 1000
//! 3
//! 2
//! 0 (0,0,1)
//! 5 (1,2,1)
//! 11 (2,1,0)
//! ```
//!
//! Empty lines and lines starting with `#` are ignored when reading. The
//! first two remaining lines are the order and the rate; every further line
//! holds a point index, and anything after the index is ignored.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::percolation::{Outcome, PercolationEngine, SeedSet};
use crate::plane::{index_to_triple, ProjectivePlane};
use crate::PercolationError;

/// Persistable description of one seed set
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeedRecord {
    /// Plane order q
    pub order: usize,
    /// Infection threshold
    pub infection_rate: usize,
    /// Seed points
    pub points: SeedSet,
    /// Percolation time of the recorded run, `None` if it stalled or is
    /// unknown
    pub rounds: Option<usize>,
    /// Number of search trials behind this record, if it came from a search
    pub trials: Option<usize>,
}

impl SeedRecord {
    /// Create a record without run metadata
    pub fn new(order: usize, infection_rate: usize, points: SeedSet) -> Self {
        Self {
            order,
            infection_rate,
            points,
            rounds: None,
            trials: None,
        }
    }

    /// Attach the outcome of the run that produced this seed
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.rounds = outcome.percolation_length();
        self
    }

    /// Attach the number of search trials
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = Some(trials);
        self
    }

    /// Conventional file name, `order_<q>_rate_<r>_length_<rounds>.txt`, with
    /// `-1` as the length of a stalled seed
    pub fn file_name(&self) -> String {
        format!(
            "order_{}_rate_{}_length_{}.txt",
            self.order,
            self.infection_rate,
            length_label(self.rounds)
        )
    }

    /// Write the record in text form
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), PercolationError> {
        writeln!(writer, "# order: {}", self.order)?;
        writeln!(writer, "# rate: {}", self.infection_rate)?;
        writeln!(
            writer,
            "# length of the slowest percolation: {}",
            length_label(self.rounds)
        )?;
        writeln!(writer, "# size of initial infected set: {}", self.points.len())?;
        if let Some(trials) = self.trials {
            writeln!(writer, "# trials: {}", trials)?;
        }
        writeln!(writer, "{}", self.order)?;
        writeln!(writer, "{}", self.infection_rate)?;
        for &point in &self.points {
            writeln!(writer, "{} {}", point, index_to_triple(self.order, point))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Render the record into a string
    pub fn to_text(&self) -> Result<String, PercolationError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|err| {
            PercolationError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
        })
    }

    /// Parse a record from its text form
    pub fn parse(text: &str) -> Result<Self, PercolationError> {
        let mut content = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let order = parse_header(content.next(), "order", text)?;
        let infection_rate = parse_header(content.next(), "infection rate", text)?;

        let mut points = SeedSet::new();
        for (line_no, line) in content {
            points.insert(parse_index(line_no, line, "point index")?);
        }

        Ok(Self::new(order, infection_rate, points))
    }

    /// Read and parse a record file
    pub fn read(path: impl AsRef<Path>) -> Result<Self, PercolationError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Write the record to `dir` under [`SeedRecord::file_name`], returning
    /// the full path
    pub fn save_in(&self, dir: impl AsRef<Path>) -> Result<std::path::PathBuf, PercolationError> {
        let path = dir.as_ref().join(self.file_name());
        let mut file = std::io::BufWriter::new(fs::File::create(&path)?);
        self.write_to(&mut file)?;
        Ok(path)
    }

    /// Rebuild the plane and rerun the seed
    pub fn replay(&self) -> Result<Outcome, PercolationError> {
        let plane = ProjectivePlane::new(self.order)?;
        self.replay_on(&plane)
    }

    /// Rerun the seed on an already built plane of the same order
    pub fn replay_on(&self, plane: &ProjectivePlane) -> Result<Outcome, PercolationError> {
        if plane.order() != self.order {
            return Err(PercolationError::OrderMismatch {
                record: self.order,
                plane: plane.order(),
            });
        }
        PercolationEngine::new(plane, self.infection_rate)?.run(&self.points)
    }
}

fn length_label(rounds: Option<usize>) -> String {
    match rounds {
        Some(rounds) => rounds.to_string(),
        None => "-1".to_string(),
    }
}

fn parse_header(
    entry: Option<(usize, &str)>,
    what: &str,
    text: &str,
) -> Result<usize, PercolationError> {
    match entry {
        Some((line_no, line)) => parse_index(line_no, line, what),
        None => Err(PercolationError::MalformedPersistedSet {
            line: text.lines().count() + 1,
            message: format!("missing {} header", what),
        }),
    }
}

/// Parse the leading token of a line as a non-negative integer
fn parse_index(line_no: usize, line: &str, what: &str) -> Result<usize, PercolationError> {
    let token = line.split_whitespace().next().unwrap_or_default();
    token
        .parse()
        .map_err(|_| PercolationError::MalformedPersistedSet {
            line: line_no,
            message: format!("invalid {} '{}'", what, token),
        })
}
