//! Durable upload progress kept in the staging directory.
//!
//! The ledger is a small JSON document holding the next archive sequence
//! number and every source path already confirmed uploaded. It is replaced
//! atomically (temp file + rename) so a crash mid-write leaves the previous
//! version intact.

use crate::error::{Result, ShardError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

pub const LEDGER_FILE_NAME: &str = "upload_progress.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    #[serde(alias = "current_archive")]
    pub next_archive_sequence: u32,
    #[serde(alias = "processed_files")]
    pub processed_paths: BTreeSet<String>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            next_archive_sequence: 1,
            processed_paths: BTreeSet::new(),
        }
    }
}

impl LedgerState {
    /// Rewrite absolute entries under `root` into root-relative keys.
    ///
    /// Ledgers written by older tooling stored absolute paths.
    pub fn rebase(&mut self, root: &Path) {
        let root = root.to_string_lossy();
        let root = root.trim_end_matches('/');
        let prefix = format!("{root}/");
        let legacy: Vec<String> = self
            .processed_paths
            .iter()
            .filter(|p| p.starts_with(&prefix))
            .cloned()
            .collect();
        if legacy.is_empty() {
            return;
        }
        info!(count = legacy.len(), "rebasing absolute ledger entries");
        for p in legacy {
            self.processed_paths.remove(&p);
            self.processed_paths.insert(p[prefix.len()..].to_string());
        }
    }
}

pub struct ProgressLedger {
    path: PathBuf,
}

impl ProgressLedger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_staging(staging_dir: &Path) -> Self {
        Self::new(staging_dir.join(LEDGER_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Never fails: a missing or unreadable ledger yields a fresh state.
    pub fn load(&self) -> LedgerState {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(ledger = %self.path.display(), "no ledger found, starting fresh");
                return LedgerState::default();
            }
            Err(e) => {
                warn!(ledger = %self.path.display(), error = %e, "ledger unreadable, starting fresh");
                return LedgerState::default();
            }
        };
        match serde_json::from_slice::<LedgerState>(&bytes) {
            Ok(state) if state.next_archive_sequence >= 1 => {
                info!(
                    ledger = %self.path.display(),
                    next_seq = state.next_archive_sequence,
                    processed = state.processed_paths.len(),
                    "resuming from ledger"
                );
                state
            }
            Ok(_) => {
                warn!(ledger = %self.path.display(), "ledger has sequence 0, starting fresh");
                LedgerState::default()
            }
            Err(e) => {
                warn!(ledger = %self.path.display(), error = %e, "ledger corrupt, starting fresh");
                LedgerState::default()
            }
        }
    }

    pub fn save(&self, state: &LedgerState) -> Result<()> {
        let body =
            serde_json::to_vec_pretty(state).map_err(|e| ShardError::Ledger(e.to_string()))?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        info!(
            next_seq = state.next_archive_sequence,
            processed = state.processed_paths.len(),
            "ledger saved"
        );
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(ledger = %self.path.display(), "all files uploaded, ledger removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
