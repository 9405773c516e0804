use shardpush_core::RunConfig;
use shardpush_core::archive::list_entries;
use shardpush_core::codec::CodecId;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Source tree, staging dir and a fake remote, all under one tempdir.
#[allow(dead_code)]
pub struct Workspace {
    _tmp: TempDir,
    pub source: PathBuf,
    pub staging: PathBuf,
    pub remote: PathBuf,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("source");
        let staging = tmp.path().join("staging");
        let remote = tmp.path().join("remote");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&remote).unwrap();
        Self {
            _tmp: tmp,
            source,
            staging,
            remote,
        }
    }

    /// Files `f00.bin`, `f01.bin`, ... with the given sizes.
    pub fn with_sizes(sizes: &[u64]) -> Self {
        let ws = Self::new();
        for (i, &s) in sizes.iter().enumerate() {
            write_file(&ws.source, &format!("f{i:02}.bin"), s);
        }
        ws
    }

    pub fn config(&self, ceiling_bytes: u64) -> RunConfig {
        let mut cfg = RunConfig::new(self.source.clone(), self.staging.clone(), ceiling_bytes);
        cfg.headroom_bytes = 0;
        cfg.prefix = "test".into();
        cfg.codec = CodecId::Gzip;
        cfg.repo = "someone/dataset".into();
        cfg
    }

    /// Source path -> number of archives in the remote that contain it.
    pub fn remote_file_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in fs::read_dir(&self.remote).unwrap() {
            let archive = entry.unwrap().path();
            let codec = CodecId::from_file_name(&archive).unwrap();
            for e in list_entries(&archive, codec).unwrap() {
                *counts.entry(e.path).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn remote_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.remote)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    pub fn staging_names(&self) -> Vec<String> {
        let mut names: Vec<String> = match fs::read_dir(&self.staging) {
            Ok(rd) => rd
                .map(|e| e.unwrap().file_name().into_string().unwrap())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

pub fn write_file(root: &Path, rel: &str, size: u64) {
    let p = root.join(rel);
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let body: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    fs::write(p, body).unwrap();
}
