use std::fs;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use line_percolation::{
    Experiment, Outcome, PercolationError, SearchConfig, SeedRecord, SlowestSeedSearch,
};

mod common;
use common::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "line-percolation-{}-{}",
        name,
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create scratch directory");
    dir
}

#[test]
fn replayed_record_matches_search_outcome() {
    for (order, rate) in [(3, 2), (5, 2), (5, 3), (7, 3)] {
        let plane = plane(order);
        let search = SlowestSeedSearch::with_default_sizes(&plane, rate).expect("valid search");
        let result = search
            .run(60, &mut StdRng::seed_from_u64(order as u64 * 31 + rate as u64))
            .expect("search succeeds");

        let record = SeedRecord::new(order, rate, result.best_seed.clone())
            .with_outcome(result.best_outcome)
            .with_trials(result.trials);
        let text = record.to_text().expect("record renders");
        let parsed = SeedRecord::parse(&text).expect("record parses");

        assert_eq!(parsed.points, result.best_seed);
        assert_eq!(
            parsed.replay().expect("replay succeeds"),
            result.best_outcome,
            "PG(2,{order}) rate {rate}"
        );
    }
}

#[test]
fn saved_record_round_trips_through_disk() {
    let dir = scratch_dir("save");
    let experiment =
        Experiment::new(SearchConfig::new(5, 2, 40).with_rng_seed(8)).expect("valid config");
    let result = experiment.search().expect("search succeeds");
    let record = experiment.seed_record(&result);

    let path = record.save_in(&dir).expect("record saved");
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some(record.file_name().as_str())
    );

    let loaded = SeedRecord::read(&path).expect("record loads");
    assert_eq!(loaded.order, 5);
    assert_eq!(loaded.infection_rate, 2);
    assert_eq!(loaded.points, result.best_seed);
    assert_eq!(loaded.replay().expect("replay succeeds"), result.best_outcome);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn stalled_record_is_labelled_and_replays() {
    let record = SeedRecord::new(2, 2, seed(&[0, 1])).with_outcome(Outcome::Stalled { rounds: 2 });
    assert_eq!(record.file_name(), "order_2_rate_2_length_-1.txt");

    let parsed = SeedRecord::parse(&record.to_text().expect("record renders")).expect("parses");
    assert_eq!(
        parsed.replay().expect("replay succeeds"),
        Outcome::Stalled { rounds: 2 }
    );
}

#[test]
fn hand_written_record_replays() {
    let text = "\
# written by hand
2
1

0 (0,0,1)
";
    let record = SeedRecord::parse(text).expect("record parses");
    assert_eq!(
        record.replay().expect("replay succeeds"),
        Outcome::Percolated { rounds: 1 }
    );
}

#[test]
fn malformed_records_are_rejected() {
    for text in ["", "# nothing\n", "3\n", "x\n2\n", "3\n2\n1\nfive\n"] {
        assert!(
            matches!(
                SeedRecord::parse(text),
                Err(PercolationError::MalformedPersistedSet { .. })
            ),
            "accepted {text:?}"
        );
    }
}

#[test]
fn out_of_range_record_point_is_reported() {
    let record = SeedRecord::parse("3\n2\n0\n13\n").expect("record parses");
    assert!(matches!(
        record.replay(),
        Err(PercolationError::PointIndexOutOfRange { index: 13, size: 13 })
    ));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn oversized_record_order_is_an_error() {
    // 2^32 squared overflows a 64-bit usize
    let record = SeedRecord::parse("4294967296\n2\n0\n").expect("record parses");
    assert!(matches!(
        record.replay(),
        Err(PercolationError::InvalidOrder(order)) if order == 1 << 32
    ));
}

#[test]
fn record_replayed_on_other_plane_reports_both_orders() {
    let record = SeedRecord::parse("2\n1\n0\n").expect("record parses");
    let plane = plane(3);
    let err = record.replay_on(&plane).unwrap_err();
    assert!(matches!(
        err,
        PercolationError::OrderMismatch { record: 2, plane: 3 }
    ));
    assert_eq!(
        err.to_string(),
        "seed record for PG(2,2) cannot run on PG(2,3)"
    );
}

#[test]
fn logged_replay_writes_round_lines() {
    let experiment =
        Experiment::new(SearchConfig::new(2, 2, 1).with_rng_seed(0)).expect("valid config");
    let (outcome, log) = experiment
        .replay_logged(&seed(&[0, 1, 2]), Vec::new())
        .expect("replay succeeds");
    assert_eq!(outcome, Outcome::Percolated { rounds: 2 });

    let text = String::from_utf8(log).expect("log is utf-8");
    assert_eq!(
        text,
        "Percolation on the PG(2,2) with infection rate 2\n\
         Round 1 ends:\n  # of infected points: 6\n  # of newly infected points: 3\n\
         Round 2 ends:\n  # of infected points: 7\n  # of newly infected points: 1\n\
         Percolation ended in 2 rounds\n"
    );
}
