use crate::domain::Batch;
use crate::driver::{RunOutcome, RunReport};
use crate::stats::{ScanSummary, format_elapsed, gib, mib_per_sec};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// Phase notifications from the driver and pipeline.
///
/// All methods default to no-ops; display code implements only what it needs.
#[allow(unused_variables)]
pub trait RunObserver {
    fn scan_complete(&mut self, summary: &ScanSummary) {}
    fn batch_started(&mut self, seq: u32, batch: &Batch, archive: &Path) {}
    fn compressed(&mut self, seq: u32, archive: &Path, archive_bytes: u64, took: Duration) {}
    fn uploaded(&mut self, seq: u32, archive: &Path, archive_bytes: u64, took: Duration) {}
    fn batch_failed(&mut self, seq: u32, archive: &Path, diagnostic: &str) {}
    fn committed(&mut self, seq: u32, batch: &Batch) {}
    fn halted(&mut self, report: &RunReport) {}
}

pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Logs every phase through `tracing`.
#[derive(Default)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn scan_complete(&mut self, s: &ScanSummary) {
        info!(
            files = s.total_files,
            total_gb = %format!("{:.2}", gib(s.total_bytes)),
            estimated_archives = s.estimated_archives,
            already_processed = s.already_processed_files,
            "inventory complete"
        );
    }

    fn batch_started(&mut self, seq: u32, batch: &Batch, archive: &Path) {
        if batch.kind == crate::domain::BatchKind::OversizedSingleton {
            warn!(
                seq,
                file = %batch.files[0].path,
                size_gb = %format!("{:.2}", gib(batch.total_size_bytes)),
                "file exceeds the size ceiling, archiving it alone"
            );
        }
        info!(
            seq,
            archive = %archive.display(),
            files = batch.len(),
            bytes = batch.total_size_bytes,
            "creating archive"
        );
    }

    fn compressed(&mut self, seq: u32, archive: &Path, archive_bytes: u64, took: Duration) {
        info!(
            seq,
            archive = %archive.display(),
            size_mb = %format!("{:.2}", archive_bytes as f64 / (1024.0 * 1024.0)),
            elapsed_s = took.as_secs(),
            "archive written, uploading"
        );
    }

    fn uploaded(&mut self, seq: u32, archive: &Path, archive_bytes: u64, took: Duration) {
        info!(
            seq,
            archive = %archive.display(),
            speed_mb_s = %format!("{:.2}", mib_per_sec(archive_bytes, took)),
            "upload succeeded"
        );
    }

    fn batch_failed(&mut self, seq: u32, archive: &Path, diagnostic: &str) {
        error!(
            seq,
            archive = %archive.display(),
            diagnostic,
            "upload failed, archive kept for retry"
        );
    }

    fn halted(&mut self, report: &RunReport) {
        let elapsed = format_elapsed(report.elapsed);
        let done_files = report.ledger.processed_paths.len();
        match &report.outcome {
            RunOutcome::Done => info!(
                elapsed = %elapsed,
                archives = report.stats.archives_uploaded,
                "all files uploaded"
            ),
            outcome => {
                warn!(
                    reason = %outcome,
                    elapsed = %elapsed,
                    processed_files = done_files,
                    processed_gb = %format!("{:.2}", gib(report.processed_bytes())),
                    uploaded_this_run_gb = %format!("{:.2}", gib(report.stats.bytes_uploaded)),
                    next_seq = report.ledger.next_archive_sequence,
                    "run halted"
                );
                info!("re-run with the same source, staging dir, size ceiling and repo to resume");
            }
        }
    }
}
