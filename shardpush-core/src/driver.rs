//! Top-level run loop.
//!
//! `START -> INVENTORY -> (ADMIT -> COMPRESS -> UPLOAD -> COMMIT)* -> DONE`,
//! leaving early as `PAUSED` (low disk space), `FAILED` (upload or fatal
//! error) or `INTERRUPTED` (cancel flag). `DONE` clears the ledger, every
//! other exit persists it.

use crate::archive::partial_archives;
use crate::batcher;
use crate::config::RunConfig;
use crate::domain::{Batch, FileRecord};
use crate::error::Result;
use crate::inventory;
use crate::ledger::{LedgerState, ProgressLedger};
use crate::observer::RunObserver;
use crate::pipeline::{ArchivePipeline, BatchOutcome, RunState};
use crate::space::SpaceGuard;
use crate::stats::{RunStats, ScanSummary, estimated_archives, gib};
use crate::upload::Uploader;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Done,
    Paused { required_bytes: u64 },
    Failed { reason: String, retryable: bool },
    Interrupted,
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Done => 0,
            RunOutcome::Paused { .. } => 2,
            RunOutcome::Failed { .. } => 3,
            RunOutcome::Interrupted => 130,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Done => write!(f, "completed"),
            RunOutcome::Paused { required_bytes } => write!(
                f,
                "paused: staging needs at least {:.2} GB free",
                gib(*required_bytes)
            ),
            RunOutcome::Failed { reason, .. } => write!(f, "failed: {reason}"),
            RunOutcome::Interrupted => write!(f, "interrupted"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub elapsed: Duration,
    pub summary: ScanSummary,
    pub stats: RunStats,
    /// Ledger state as persisted (or cleared) at exit.
    pub ledger: LedgerState,
}

impl RunReport {
    /// Bytes safely processed overall: carried in from earlier runs plus this one.
    pub fn processed_bytes(&self) -> u64 {
        self.summary.already_processed_bytes + self.stats.bytes_uploaded
    }
}

pub struct Driver<'a> {
    config: RunConfig,
    uploader: &'a dyn Uploader,
    space: SpaceGuard,
    cancel: Arc<AtomicBool>,
}

impl<'a> Driver<'a> {
    pub fn new(config: RunConfig, uploader: &'a dyn Uploader, space: SpaceGuard) -> Self {
        Self {
            config,
            uploader,
            space,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a flag that, once set, stops the run before the next batch.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// `Err` only for startup problems (bad config, unreadable source tree).
    /// Every terminal state after the inventory is reported through `RunReport`.
    pub fn run(&self, observer: &mut dyn RunObserver) -> Result<RunReport> {
        let started = Instant::now();
        let cfg = &self.config;
        cfg.validate()?;
        std::fs::create_dir_all(&cfg.staging_dir)?;
        for stale in partial_archives(&cfg.staging_dir)? {
            warn!(file = %stale.display(), "removing unfinished archive from an earlier run");
            std::fs::remove_file(&stale)?;
        }

        let ledger = ProgressLedger::in_staging(&cfg.staging_dir);
        let mut state = RunState::default();
        if cfg.resume {
            state.ledger = ledger.load();
            state.ledger.rebase(&cfg.source_dir);
        } else if ledger.exists() {
            warn!(ledger = %ledger.path().display(), "resume disabled, existing ledger ignored");
        }

        info!(source = %cfg.source_dir.display(), "scanning source tree");
        let inventory = inventory::scan(&cfg.source_dir)?;
        let summary = summarize(&inventory, &state.ledger.processed_paths, cfg.ceiling_bytes);
        observer.scan_complete(&summary);

        let done_at_start = state.ledger.processed_paths.clone();
        let pipeline = ArchivePipeline::new(cfg, self.uploader, &ledger);
        let batches = batcher::unprocessed(&inventory, &done_at_start, cfg.ceiling_bytes);
        let outcome = self.drive(batches, &pipeline, &mut state, observer);

        match &outcome {
            RunOutcome::Done => {
                if let Err(e) = ledger.clear() {
                    warn!(error = %e, "could not remove ledger after completion");
                }
            }
            _ => {
                if let Err(e) = ledger.save(&state.ledger) {
                    error!(error = %e, "could not persist ledger on exit");
                }
            }
        }

        let report = RunReport {
            outcome,
            elapsed: started.elapsed(),
            summary,
            stats: state.stats,
            ledger: state.ledger,
        };
        observer.halted(&report);
        Ok(report)
    }

    fn drive(
        &self,
        batches: impl Iterator<Item = Batch>,
        pipeline: &ArchivePipeline<'_>,
        state: &mut RunState,
        observer: &mut dyn RunObserver,
    ) -> RunOutcome {
        let staging = &self.config.staging_dir;
        for batch in batches {
            if self.cancelled() {
                warn!("interrupt received, stopping before next archive");
                return RunOutcome::Interrupted;
            }

            let required_bytes = self.config.required_free_bytes(batch.total_size_bytes);
            match self.space.has_enough_space(staging, required_bytes) {
                Ok(true) => {}
                Ok(false) => {
                    warn!(
                        required_gb = %format!("{:.2}", gib(required_bytes)),
                        "not enough free space in staging dir, pausing; free up space and re-run"
                    );
                    return RunOutcome::Paused { required_bytes };
                }
                Err(e) => {
                    return RunOutcome::Failed {
                        reason: format!("free space query failed: {e}"),
                        retryable: true,
                    };
                }
            }

            match pipeline.process(&batch, state, observer) {
                Ok(BatchOutcome::Uploaded { .. }) => {}
                Ok(BatchOutcome::UploadFailed {
                    archive,
                    diagnostic,
                }) => {
                    if self.cancelled() {
                        return RunOutcome::Interrupted;
                    }
                    return RunOutcome::Failed {
                        reason: format!("upload of {} failed: {diagnostic}", archive.display()),
                        retryable: true,
                    };
                }
                Err(e) => {
                    error!(error = %e, "fatal error, stopping");
                    return RunOutcome::Failed {
                        reason: e.to_string(),
                        retryable: false,
                    };
                }
            }
        }
        RunOutcome::Done
    }
}

pub fn summarize(
    inventory: &[FileRecord],
    processed: &BTreeSet<String>,
    ceiling_bytes: u64,
) -> ScanSummary {
    let total_bytes = inventory::total_bytes(inventory);
    let (done_files, done_bytes) = inventory
        .iter()
        .filter(|f| processed.contains(&f.path))
        .fold((0u64, 0u64), |(n, b), f| (n + 1, b + f.size_bytes));
    ScanSummary {
        total_files: inventory.len() as u64,
        total_bytes,
        already_processed_files: done_files,
        already_processed_bytes: done_bytes,
        estimated_archives: estimated_archives(total_bytes, ceiling_bytes),
    }
}
