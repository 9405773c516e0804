use serde::{Deserialize, Serialize};

/// One regular file found by the inventory walk.
///
/// `path` is relative to the scan root, `/`-separated, and is the ledger key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub size_bytes: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchKind {
    /// One or more files whose sizes sum to at most the ceiling.
    Normal,
    /// Exactly one file that alone exceeds the ceiling.
    OversizedSingleton,
}

impl BatchKind {
    /// Infix used in archive names.
    pub fn label(self) -> &'static str {
        match self {
            BatchKind::Normal => "part",
            BatchKind::OversizedSingleton => "bigfile",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    pub kind: BatchKind,
    pub files: Vec<FileRecord>,
    pub total_size_bytes: u64,
}

impl Batch {
    pub fn normal(files: Vec<FileRecord>) -> Self {
        let total_size_bytes = files.iter().map(|f| f.size_bytes).sum();
        Self {
            kind: BatchKind::Normal,
            files,
            total_size_bytes,
        }
    }

    pub fn oversized(file: FileRecord) -> Self {
        Self {
            kind: BatchKind::OversizedSingleton,
            total_size_bytes: file.size_bytes,
            files: vec![file],
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
