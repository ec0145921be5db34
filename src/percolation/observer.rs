use std::io::{self, Write};

use bitvec::prelude::*;

use super::Outcome;

/// Per-round progress reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundSummary {
    /// 1-indexed round number
    pub round: usize,
    /// Points infected so far, including those reached this round
    pub infected_points: usize,
    /// Points reached for the first time this round
    pub newly_infected_points: usize,
    /// Lines infected so far
    pub infected_lines: usize,
}

/// Side channel for round-by-round progress.
///
/// The engine never depends on what an observer does; all methods default
/// to no-ops.
pub trait RoundObserver {
    /// Called once before the first round
    fn on_start(&mut self, _order: usize, _infection_rate: usize) {}

    /// Called after every completed round
    fn on_round(&mut self, _summary: &RoundSummary) {}

    /// Called after [`RoundObserver::on_round`] with the points reached so
    /// far (including this round's) and the lines infected so far
    fn on_state(&mut self, _reached_points: &BitSlice, _infected_lines: &BitSlice) {}

    /// Called once with the terminal outcome
    fn on_finish(&mut self, _outcome: &Outcome) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RoundObserver for NoopObserver {}

/// Observer that keeps every summary in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    /// Summaries in round order
    pub rounds: Vec<RoundSummary>,
    /// Terminal outcome, once the run has finished
    pub outcome: Option<Outcome>,
}

impl RoundObserver for RecordingObserver {
    fn on_start(&mut self, _order: usize, _infection_rate: usize) {
        self.rounds.clear();
        self.outcome = None;
    }

    fn on_round(&mut self, summary: &RoundSummary) {
        self.rounds.push(*summary);
    }

    fn on_finish(&mut self, outcome: &Outcome) {
        self.outcome = Some(*outcome);
    }
}

/// Observer that forwards progress to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RoundObserver for TracingObserver {
    fn on_start(&mut self, order: usize, infection_rate: usize) {
        tracing::debug!(order, infection_rate, "percolation started");
    }

    fn on_round(&mut self, summary: &RoundSummary) {
        tracing::trace!(
            round = summary.round,
            infected_points = summary.infected_points,
            newly_infected_points = summary.newly_infected_points,
            infected_lines = summary.infected_lines,
            "round ended"
        );
    }

    fn on_finish(&mut self, outcome: &Outcome) {
        tracing::debug!(%outcome, "percolation finished");
    }
}

/// Observer that writes the human-readable round log.
///
/// Write errors cannot interrupt the run, so the first one is kept and
/// returned by [`TextLogObserver::finish`].
#[derive(Debug)]
pub struct TextLogObserver<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> TextLogObserver<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Flush and hand back the writer, or the first write error
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn emit(&mut self, text: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.writer.write_fmt(text) {
            self.error = Some(err);
        }
    }
}

impl<W: Write> RoundObserver for TextLogObserver<W> {
    fn on_start(&mut self, order: usize, infection_rate: usize) {
        self.emit(format_args!(
            "Percolation on the PG(2,{}) with infection rate {}\n",
            order, infection_rate
        ));
    }

    fn on_round(&mut self, summary: &RoundSummary) {
        self.emit(format_args!(
            "Round {} ends:\n  # of infected points: {}\n  # of newly infected points: {}\n",
            summary.round, summary.infected_points, summary.newly_infected_points
        ));
    }

    fn on_finish(&mut self, outcome: &Outcome) {
        match *outcome {
            Outcome::Percolated { rounds } => {
                self.emit(format_args!("Percolation ended in {} rounds\n", rounds))
            }
            Outcome::Stalled { rounds } => self.emit(format_args!(
                "Percolation stopped in round {}, the initial set does not percolate\n",
                rounds
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_log_format() {
        let mut log = TextLogObserver::new(Vec::new());
        log.on_start(2, 1);
        log.on_round(&RoundSummary {
            round: 1,
            infected_points: 7,
            newly_infected_points: 6,
            infected_lines: 3,
        });
        log.on_finish(&Outcome::Percolated { rounds: 1 });

        let text = String::from_utf8(log.finish().unwrap()).unwrap();
        assert_eq!(
            text,
            "Percolation on the PG(2,2) with infection rate 1\n\
             Round 1 ends:\n  # of infected points: 7\n  # of newly infected points: 6\n\
             Percolation ended in 1 rounds\n"
        );
    }

    #[test]
    fn test_text_log_stall_line() {
        let mut log = TextLogObserver::new(Vec::new());
        log.on_finish(&Outcome::Stalled { rounds: 3 });
        let text = String::from_utf8(log.finish().unwrap()).unwrap();
        assert_eq!(
            text,
            "Percolation stopped in round 3, the initial set does not percolate\n"
        );
    }

    #[derive(Debug)]
    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_text_log_latches_first_error() {
        let mut log = TextLogObserver::new(FailingWriter);
        log.on_start(3, 2);
        log.on_finish(&Outcome::Stalled { rounds: 0 });
        let err = log.finish().unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_recording_observer_resets_on_start() {
        let mut recorder = RecordingObserver::default();
        recorder.on_finish(&Outcome::Stalled { rounds: 1 });
        recorder.on_start(2, 1);
        assert!(recorder.outcome.is_none());
        assert!(recorder.rounds.is_empty());
    }
}
