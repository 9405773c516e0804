use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use shardpush_core::domain::Batch;
use shardpush_core::driver::RunReport;
use shardpush_core::stats::ScanSummary;
use shardpush_core::{LogObserver, RunObserver};
use std::path::Path;
use std::time::Duration;

/// Logs every phase and, when enabled, keeps a file-count progress bar.
pub struct ProgressObserver {
    log: LogObserver,
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new(enabled: bool) -> Self {
        Self {
            log: LogObserver,
            enabled,
            bar: None,
        }
    }

    fn message(&self, msg: String) {
        if let Some(pb) = &self.bar {
            pb.set_message(msg);
        }
    }
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl RunObserver for ProgressObserver {
    fn scan_complete(&mut self, summary: &ScanSummary) {
        self.log.scan_complete(summary);
        if !self.enabled {
            return;
        }
        let pb = ProgressBar::with_draw_target(
            Some(summary.total_files),
            ProgressDrawTarget::stderr(),
        );
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}",
        ) {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_position(summary.already_processed_files);
        pb.enable_steady_tick(Duration::from_millis(250));
        self.bar = Some(pb);
    }

    fn batch_started(&mut self, seq: u32, batch: &Batch, archive: &Path) {
        self.log.batch_started(seq, batch, archive);
        self.message(format!("compressing {}", file_name(archive)));
    }

    fn compressed(&mut self, seq: u32, archive: &Path, archive_bytes: u64, took: Duration) {
        self.log.compressed(seq, archive, archive_bytes, took);
        self.message(format!("uploading {}", file_name(archive)));
    }

    fn uploaded(&mut self, seq: u32, archive: &Path, archive_bytes: u64, took: Duration) {
        self.log.uploaded(seq, archive, archive_bytes, took);
    }

    fn batch_failed(&mut self, seq: u32, archive: &Path, diagnostic: &str) {
        self.log.batch_failed(seq, archive, diagnostic);
    }

    fn committed(&mut self, seq: u32, batch: &Batch) {
        self.log.committed(seq, batch);
        if let Some(pb) = &self.bar {
            pb.inc(batch.len() as u64);
            pb.set_message(String::new());
        }
    }

    fn halted(&mut self, report: &RunReport) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
        self.log.halted(report);
    }
}
