use crate::archive::{ArchiveWriter, archive_file_name};
use crate::config::RunConfig;
use crate::domain::Batch;
use crate::error::Result;
use crate::ledger::{LedgerState, ProgressLedger};
use crate::observer::RunObserver;
use crate::stats::RunStats;
use crate::upload::{UploadOutcome, Uploader};
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

/// Mutable progress of one run, threaded through the driver and pipeline.
#[derive(Clone, Debug, Default)]
pub struct RunState {
    pub ledger: LedgerState,
    pub stats: RunStats,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Uploaded, archive deleted, ledger committed.
    Uploaded { archive: PathBuf, archive_bytes: u64 },
    /// Upload failed; archive kept on disk, ledger untouched.
    UploadFailed { archive: PathBuf, diagnostic: String },
}

/// Compress, upload and commit one batch.
pub struct ArchivePipeline<'a> {
    config: &'a RunConfig,
    uploader: &'a dyn Uploader,
    ledger: &'a ProgressLedger,
}

impl<'a> ArchivePipeline<'a> {
    pub fn new(
        config: &'a RunConfig,
        uploader: &'a dyn Uploader,
        ledger: &'a ProgressLedger,
    ) -> Self {
        Self {
            config,
            uploader,
            ledger,
        }
    }

    pub fn archive_path(&self, seq: u32, batch: &Batch) -> PathBuf {
        self.config.staging_dir.join(archive_file_name(
            &self.config.prefix,
            batch.kind,
            seq,
            self.config.codec,
        ))
    }

    /// `Err` is fatal for the run (archive could not be built, ledger could not
    /// be written). Upload failure is an ordinary outcome.
    pub fn process(
        &self,
        batch: &Batch,
        state: &mut RunState,
        observer: &mut dyn RunObserver,
    ) -> Result<BatchOutcome> {
        let seq = state.ledger.next_archive_sequence;
        let archive = self.archive_path(seq, batch);
        observer.batch_started(seq, batch, &archive);
        if archive.exists() {
            warn!(archive = %archive.display(), "replacing archive left by an earlier run");
        }

        let t0 = Instant::now();
        let writer = ArchiveWriter::new(
            &self.config.source_dir,
            self.config.codec,
            self.config.effective_level(),
        );
        let archive_bytes = writer.write(&batch.files, &archive)?;
        observer.compressed(seq, &archive, archive_bytes, t0.elapsed());

        let t1 = Instant::now();
        match self.uploader.upload(&archive) {
            UploadOutcome::Success { .. } => {
                observer.uploaded(seq, &archive, archive_bytes, t1.elapsed());
            }
            UploadOutcome::Failure { diagnostic } => {
                observer.batch_failed(seq, &archive, &diagnostic);
                return Ok(BatchOutcome::UploadFailed {
                    archive,
                    diagnostic,
                });
            }
        }

        if let Err(e) = std::fs::remove_file(&archive) {
            warn!(archive = %archive.display(), error = %e, "uploaded archive could not be deleted");
        }

        // The upload is confirmed, so memory is updated even if persisting fails;
        // the driver saves again on its way out.
        state
            .ledger
            .processed_paths
            .extend(batch.files.iter().map(|f| f.path.clone()));
        state.ledger.next_archive_sequence = seq + 1;
        state.stats.archives_uploaded += 1;
        state.stats.files_uploaded += batch.len() as u64;
        state.stats.bytes_uploaded += batch.total_size_bytes;
        state.stats.archive_bytes_uploaded += archive_bytes;
        self.ledger.save(&state.ledger)?;
        observer.committed(seq, batch);

        Ok(BatchOutcome::Uploaded {
            archive,
            archive_bytes,
        })
    }
}
