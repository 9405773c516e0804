use crate::error::Result;
use crate::stats::gib;
use std::path::Path;
use tracing::info;

/// Free-space query for the filesystem holding a path.
pub trait FreeSpace: Send + Sync {
    fn free_bytes(&self, path: &Path) -> Result<u64>;
}

/// Bytes available to unprivileged users, as reported by the OS.
pub struct FsFreeSpace;

impl FreeSpace for FsFreeSpace {
    fn free_bytes(&self, path: &Path) -> Result<u64> {
        Ok(fs2::available_space(path)?)
    }
}

/// Admission check run before each archive is built.
pub struct SpaceGuard {
    probe: Box<dyn FreeSpace>,
}

impl SpaceGuard {
    pub fn new(probe: Box<dyn FreeSpace>) -> Self {
        Self { probe }
    }

    pub fn os() -> Self {
        Self::new(Box::new(FsFreeSpace))
    }

    pub fn has_enough_space(&self, path: &Path, required_bytes: u64) -> Result<bool> {
        let free = self.probe.free_bytes(path)?;
        info!(
            free_gb = %format!("{:.2}", gib(free)),
            required_gb = %format!("{:.2}", gib(required_bytes)),
            "staging free space"
        );
        Ok(free >= required_bytes)
    }
}
