use crate::error::{Result, ShardError};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

pub const DEFAULT_UPLOAD_COMMAND: &str = "modelscope upload {repo} {file} --repo-type dataset";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    Success { diagnostic: String },
    Failure { diagnostic: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }
}

/// Remote transport. One blocking, all-or-nothing call per archive; no retries.
pub trait Uploader {
    fn upload(&self, archive: &Path) -> UploadOutcome;
}

/// Runs an external program per archive, e.g. a hub CLI.
pub struct CommandUploader {
    program: String,
    args: Vec<String>,
    repo: String,
}

impl CommandUploader {
    /// `template` is split on whitespace; `{repo}` and `{file}` are substituted
    /// per argument, so paths containing spaces stay a single argument.
    pub fn new(repo: &str, template: &str) -> Result<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| ShardError::Config("upload command is empty".into()))?;
        let args: Vec<String> = parts.collect();
        if !args.iter().any(|a| a.contains("{file}")) {
            return Err(ShardError::Config(
                "upload command must reference {file}".into(),
            ));
        }
        if repo.is_empty() && args.iter().any(|a| a.contains("{repo}")) {
            return Err(ShardError::Config(
                "upload command references {repo} but no repository was given".into(),
            ));
        }
        Ok(Self {
            program,
            args,
            repo: repo.to_string(),
        })
    }

    pub fn argv(&self, archive: &Path) -> Vec<String> {
        let file = archive.to_string_lossy();
        std::iter::once(self.program.clone())
            .chain(
                self.args
                    .iter()
                    .map(|a| a.replace("{repo}", &self.repo).replace("{file}", &file)),
            )
            .collect()
    }
}

impl Uploader for CommandUploader {
    fn upload(&self, archive: &Path) -> UploadOutcome {
        let argv = self.argv(archive);
        info!(command = %argv.join(" "), "running upload command");
        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .output();
        match output {
            Ok(out) => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                let stderr = String::from_utf8_lossy(&out.stderr);
                debug!(stdout = %stdout.trim_end(), "upload command output");
                if out.status.success() {
                    UploadOutcome::Success {
                        diagnostic: stdout.trim_end().to_string(),
                    }
                } else {
                    UploadOutcome::Failure {
                        diagnostic: format!("{}: {}", out.status, stderr.trim_end()),
                    }
                }
            }
            Err(e) => UploadOutcome::Failure {
                diagnostic: format!("failed to start {}: {e}", argv[0]),
            },
        }
    }
}
