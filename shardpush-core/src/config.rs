use crate::codec::CodecId;
use crate::error::{Result, ShardError};
use crate::upload::DEFAULT_UPLOAD_COMMAND;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const GIB: u64 = 1024 * 1024 * 1024;

/// Free space kept on top of one archive before a new archive may be started.
pub const DEFAULT_HEADROOM_BYTES: u64 = 10 * GIB;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    pub source_dir: PathBuf,
    pub staging_dir: PathBuf,
    /// Maximum uncompressed bytes per normal archive.
    pub ceiling_bytes: u64,
    pub headroom_bytes: u64,
    /// Archive name prefix, e.g. `dataset` in `dataset_part_001.tar.gz`.
    pub prefix: String,
    pub codec: CodecId,
    /// Compression level; `None` uses the codec default.
    pub level: Option<i32>,
    /// Continue from the ledger in the staging dir. When false the ledger is ignored.
    pub resume: bool,
    /// Destination repository identifier handed to the upload command.
    pub repo: String,
    /// Upload command template with `{repo}` and `{file}` placeholders.
    pub upload_command: String,
}

impl RunConfig {
    pub fn new(source_dir: PathBuf, staging_dir: PathBuf, ceiling_bytes: u64) -> Self {
        Self {
            source_dir,
            staging_dir,
            ceiling_bytes,
            headroom_bytes: DEFAULT_HEADROOM_BYTES,
            prefix: "archive".to_string(),
            codec: CodecId::Gzip,
            level: None,
            resume: true,
            repo: String::new(),
            upload_command: DEFAULT_UPLOAD_COMMAND.to_string(),
        }
    }

    pub fn effective_level(&self) -> i32 {
        self.level.unwrap_or_else(|| self.codec.default_level())
    }

    /// Free bytes the staging dir must have before building an archive for a
    /// batch of `batch_bytes` uncompressed bytes.
    pub fn required_free_bytes(&self, batch_bytes: u64) -> u64 {
        batch_bytes
            .max(self.ceiling_bytes)
            .saturating_add(self.headroom_bytes)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ceiling_bytes == 0 {
            return Err(ShardError::Config("size ceiling must be positive".into()));
        }
        if self.prefix.is_empty() || self.prefix.contains(['/', '\\']) {
            return Err(ShardError::Config(format!(
                "invalid archive prefix '{}'",
                self.prefix
            )));
        }
        if !self.source_dir.is_dir() {
            return Err(ShardError::Config(format!(
                "source directory {} does not exist",
                self.source_dir.display()
            )));
        }
        let src = self.source_dir.canonicalize()?;
        if resolve(&self.staging_dir)?.starts_with(&src) {
            return Err(ShardError::Config(format!(
                "staging directory {} lies inside the source tree",
                self.staging_dir.display()
            )));
        }
        Ok(())
    }
}

/// Canonical form of a path that may not exist yet: the deepest existing
/// ancestor is canonicalized and the missing tail appended as-is.
fn resolve(path: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(path)?;
    let mut tail = Vec::new();
    let mut cur = abs.as_path();
    while !cur.exists() {
        match (cur.file_name(), cur.parent()) {
            (Some(name), Some(parent)) => {
                tail.push(name.to_os_string());
                cur = parent;
            }
            _ => return Ok(abs),
        }
    }
    let mut out = cur.canonicalize()?;
    out.extend(tail.iter().rev());
    Ok(out)
}
