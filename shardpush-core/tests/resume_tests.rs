// Interrupting a run at any batch boundary and re-running must end in the
// same remote state as one uninterrupted run.

mod common;

use common::{ScriptedSpace, ScriptedUploader, Workspace};
use shardpush_core::batcher::Batcher;
use shardpush_core::inventory::scan;
use shardpush_core::{Driver, NoopObserver, RunOutcome, SpaceGuard};

const SIZES: &[u64] = &[7, 12, 3, 30, 9, 9, 1, 0, 14, 20, 2, 45, 6];
const CEILING: u64 = 20;

fn batch_count(ws: &Workspace) -> usize {
    let inv = scan(&ws.source).unwrap();
    Batcher::new(inv.into_iter(), CEILING).count()
}

fn run_once(ws: &Workspace, uploader: &ScriptedUploader, space: ScriptedSpace) -> RunOutcome {
    Driver::new(ws.config(CEILING), uploader, SpaceGuard::new(Box::new(space)))
        .run(&mut NoopObserver)
        .unwrap()
        .outcome
}

/// Archive names in the order a clean run delivers them.
fn uninterrupted() -> Vec<String> {
    let ws = Workspace::with_sizes(SIZES);
    let up = ScriptedUploader::new(&ws.remote);
    assert_eq!(run_once(&ws, &up, ScriptedSpace::plenty()), RunOutcome::Done);
    let delivered = up.delivered.borrow().clone();
    delivered
}

fn assert_complete(ws: &Workspace, expected_names: &[String]) {
    let mut sorted = expected_names.to_vec();
    sorted.sort();
    assert_eq!(ws.remote_names(), sorted);
    let counts = ws.remote_file_counts();
    assert_eq!(counts.len(), SIZES.len());
    assert!(counts.values().all(|&n| n == 1), "{counts:?}");
    assert!(ws.staging_names().is_empty());
}

#[test]
fn upload_failure_at_any_batch_resumes_to_same_result() {
    let expected = uninterrupted();
    let n = batch_count(&Workspace::with_sizes(SIZES));
    assert_eq!(expected.len(), n);
    // an oversized file splits the sequence, so delivery order differs from name order
    assert!(expected.iter().any(|name| name.contains("_bigfile_")));

    for k in 1..=n {
        let ws = Workspace::with_sizes(SIZES);
        let failing = ScriptedUploader::new(&ws.remote).failing_on(&[k]);
        let outcome = run_once(&ws, &failing, ScriptedSpace::plenty());
        assert!(matches!(outcome, RunOutcome::Failed { .. }), "batch {k}");
        assert_eq!(ws.remote_names().len(), k - 1);

        let retry = ScriptedUploader::new(&ws.remote);
        assert_eq!(run_once(&ws, &retry, ScriptedSpace::plenty()), RunOutcome::Done);
        // the failed archive is retried under the same name
        assert_eq!(retry.attempts.borrow()[0], expected[k - 1]);
        assert_complete(&ws, &expected);
    }
}

#[test]
fn pause_at_any_batch_resumes_to_same_result() {
    let expected = uninterrupted();
    let n = expected.len();

    for k in 1..=n {
        let ws = Workspace::with_sizes(SIZES);
        let mut answers = vec![u64::MAX; k - 1];
        answers.push(0);
        let up = ScriptedUploader::new(&ws.remote);
        let outcome = run_once(&ws, &up, ScriptedSpace::new(&answers));
        assert!(matches!(outcome, RunOutcome::Paused { .. }), "batch {k}");
        assert_eq!(up.attempts.borrow().len(), k - 1);

        let up2 = ScriptedUploader::new(&ws.remote);
        assert_eq!(run_once(&ws, &up2, ScriptedSpace::plenty()), RunOutcome::Done);
        assert_complete(&ws, &expected);
    }
}

#[test]
fn repeated_failures_do_not_advance_the_ledger() {
    let expected = uninterrupted();
    let ws = Workspace::with_sizes(SIZES);

    for _ in 0..3 {
        let up = ScriptedUploader::new(&ws.remote).failing_on(&[1]);
        let outcome = run_once(&ws, &up, ScriptedSpace::plenty());
        assert!(matches!(outcome, RunOutcome::Failed { .. }));
        assert_eq!(*up.attempts.borrow(), vec![expected[0].clone()]);
    }

    let up = ScriptedUploader::new(&ws.remote);
    assert_eq!(run_once(&ws, &up, ScriptedSpace::plenty()), RunOutcome::Done);
    assert_complete(&ws, &expected);
}

#[test]
fn files_added_between_runs_are_picked_up() {
    let ws = Workspace::with_sizes(&[10, 10, 10]);
    let up = ScriptedUploader::new(&ws.remote).failing_on(&[2]);
    assert!(matches!(
        run_once(&ws, &up, ScriptedSpace::plenty()),
        RunOutcome::Failed { .. }
    ));

    common::write_file(&ws.source, "late/new.bin", 4);
    let up = ScriptedUploader::new(&ws.remote);
    assert_eq!(run_once(&ws, &up, ScriptedSpace::plenty()), RunOutcome::Done);
    let counts = ws.remote_file_counts();
    assert_eq!(counts.len(), 4);
    assert!(counts.values().all(|&n| n == 1));
}
