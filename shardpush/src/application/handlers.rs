use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use shardpush_core::archive::{archive_file_name, list_entries, partial_archives};
use shardpush_core::batcher;
use shardpush_core::codec::CodecId;
use shardpush_core::config::GIB;
use shardpush_core::driver::summarize;
use shardpush_core::error::{Result, ShardError};
use shardpush_core::inventory::scan;
use shardpush_core::stats::gib;
use shardpush_core::{CommandUploader, Driver, LedgerState, ProgressLedger, RunConfig, SpaceGuard};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

use crate::presentation::cli::TreeArgs;
use crate::presentation::progress::ProgressObserver;

fn config_from_tree(tree: TreeArgs) -> RunConfig {
    let ceiling = tree
        .max_size_bytes
        .unwrap_or_else(|| tree.max_size_gb.saturating_mul(GIB));
    let mut cfg = RunConfig::new(tree.source, tree.staging, ceiling);
    cfg.prefix = tree.prefix;
    cfg.codec = tree.codec;
    cfg.resume = !tree.no_resume;
    cfg
}

/// First Ctrl-C asks the driver to stop at the next archive boundary; a
/// second one exits immediately, leaving the last saved ledger in place.
fn install_interrupt_handler(flag: Arc<AtomicBool>) {
    let res = ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            warn!("second interrupt, exiting without waiting");
            std::process::exit(130);
        }
        warn!("interrupt received, stopping after the current archive (Ctrl-C again to abort)");
    });
    if let Err(e) = res {
        warn!(error = %e, "could not install interrupt handler");
    }
}

pub fn handle_run(
    tree: TreeArgs,
    repo: String,
    headroom_gb: u64,
    level: Option<i32>,
    upload_cmd: String,
    no_progress: bool,
) -> Result<u8> {
    let mut cfg = config_from_tree(tree);
    cfg.repo = repo;
    cfg.headroom_bytes = headroom_gb.saturating_mul(GIB);
    cfg.level = level;
    cfg.upload_command = upload_cmd;

    let uploader = CommandUploader::new(&cfg.repo, &cfg.upload_command)?;
    let cancel = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(Arc::clone(&cancel));

    info!(
        source = %cfg.source_dir.display(),
        staging = %cfg.staging_dir.display(),
        ceiling_gb = %format!("{:.2}", gib(cfg.ceiling_bytes)),
        repo = %cfg.repo,
        "starting compress and upload"
    );
    let driver = Driver::new(cfg, &uploader, SpaceGuard::os()).with_cancel_flag(cancel);
    let mut observer = ProgressObserver::new(!no_progress);
    let report = driver.run(&mut observer)?;
    Ok(report.outcome.exit_code())
}

pub fn handle_plan(tree: TreeArgs) -> Result<u8> {
    let cfg = config_from_tree(tree);
    cfg.validate()?;
    let state = if cfg.resume && cfg.staging_dir.is_dir() {
        let mut s = ProgressLedger::in_staging(&cfg.staging_dir).load();
        s.rebase(&cfg.source_dir);
        s
    } else {
        LedgerState::default()
    };

    let inventory = scan(&cfg.source_dir)?;
    let summary = summarize(&inventory, &state.processed_paths, cfg.ceiling_bytes);
    println!(
        "{} files, {:.2} GB total, {} already uploaded",
        summary.total_files,
        gib(summary.total_bytes),
        summary.already_processed_files
    );

    let mut seq = state.next_archive_sequence;
    let mut count = 0u64;
    for batch in batcher::unprocessed(&inventory, &state.processed_paths, cfg.ceiling_bytes) {
        let name = archive_file_name(&cfg.prefix, batch.kind, seq, cfg.codec);
        println!(
            "{name}  files={}  size={:.2} GB",
            batch.len(),
            gib(batch.total_size_bytes)
        );
        seq += 1;
        count += 1;
    }
    println!("{count} archives to build");
    Ok(0)
}

pub fn handle_status(staging: PathBuf) -> Result<u8> {
    let ledger = ProgressLedger::in_staging(&staging);
    if !ledger.exists() {
        println!(
            "no ledger at {}: nothing in progress (fresh start or completed run)",
            ledger.path().display()
        );
    } else {
        let state = ledger.load();
        let updated = std::fs::metadata(ledger.path())?
            .modified()
            .ok()
            .map(OffsetDateTime::from)
            .and_then(|t| t.format(&Rfc3339).ok())
            .unwrap_or_else(|| "unknown".to_string());
        println!("ledger:          {}", ledger.path().display());
        println!("updated:         {updated}");
        println!("next archive:    {:03}", state.next_archive_sequence);
        println!("files uploaded:  {}", state.processed_paths.len());
    }

    if staging.is_dir() {
        let mut leftovers: Vec<_> = std::fs::read_dir(&staging)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| CodecId::from_file_name(p).is_some())
            .collect();
        leftovers.sort();
        for p in leftovers {
            let len = std::fs::metadata(&p)?.len();
            println!("pending archive: {}  {:.2} GB", p.display(), gib(len));
        }
        for p in partial_archives(&staging)? {
            let len = std::fs::metadata(&p)?.len();
            println!(
                "unfinished:      {}  {:.2} GB (removed by the next run)",
                p.display(),
                gib(len)
            );
        }
    }
    Ok(0)
}

pub fn handle_ls(archive: PathBuf) -> Result<u8> {
    let codec = CodecId::from_file_name(&archive).ok_or_else(|| {
        ShardError::Config(format!(
            "cannot tell the codec of {} from its name",
            archive.display()
        ))
    })?;
    for e in list_entries(&archive, codec)? {
        println!("{}  {} bytes", e.path, e.size);
    }
    Ok(0)
}
