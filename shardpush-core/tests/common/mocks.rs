use shardpush_core::error::Result;
use shardpush_core::space::FreeSpace;
use shardpush_core::{UploadOutcome, Uploader};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Uploader that copies archives into a local "remote" directory.
///
/// Calls are numbered from 1; calls listed in `fail_on` report failure, and
/// `cancel_on` raises the cancel flag during that call.
#[allow(dead_code)]
pub struct ScriptedUploader {
    remote: PathBuf,
    fail_on: Vec<usize>,
    cancel_on: Option<(usize, Arc<AtomicBool>)>,
    calls: RefCell<usize>,
    pub attempts: RefCell<Vec<String>>,
    pub delivered: RefCell<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedUploader {
    pub fn new(remote: &Path) -> Self {
        Self {
            remote: remote.to_path_buf(),
            fail_on: Vec::new(),
            cancel_on: None,
            calls: RefCell::new(0),
            attempts: RefCell::new(Vec::new()),
            delivered: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.fail_on = calls.to_vec();
        self
    }

    pub fn cancelling_on(mut self, call: usize, flag: Arc<AtomicBool>) -> Self {
        self.cancel_on = Some((call, flag));
        self
    }
}

impl Uploader for ScriptedUploader {
    fn upload(&self, archive: &Path) -> UploadOutcome {
        let n = {
            let mut c = self.calls.borrow_mut();
            *c += 1;
            *c
        };
        let name = archive.file_name().unwrap().to_string_lossy().into_owned();
        self.attempts.borrow_mut().push(name.clone());
        if let Some((at, flag)) = &self.cancel_on {
            if *at == n {
                flag.store(true, Ordering::SeqCst);
            }
        }
        if self.fail_on.contains(&n) {
            return UploadOutcome::Failure {
                diagnostic: format!("scripted failure on call {n}"),
            };
        }
        let dest = self.remote.join(&name);
        // Delivered archives are unique per name; a second delivery would be a duplicate upload.
        assert!(!dest.exists(), "{name} uploaded twice");
        std::fs::copy(archive, dest).unwrap();
        self.delivered.borrow_mut().push(name);
        UploadOutcome::Success {
            diagnostic: String::new(),
        }
    }
}

/// Free-space probe answering from a script; the last answer repeats.
#[allow(dead_code)]
pub struct ScriptedSpace {
    answers: Vec<u64>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedSpace {
    pub fn new(answers: &[u64]) -> Self {
        Self {
            answers: answers.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn plenty() -> Self {
        Self::new(&[u64::MAX])
    }
}

impl FreeSpace for ScriptedSpace {
    fn free_bytes(&self, _path: &Path) -> Result<u64> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answers[i.min(self.answers.len() - 1)])
    }
}
