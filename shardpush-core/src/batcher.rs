//! Greedy, single-pass grouping of files into size-bounded batches.
//!
//! Files are taken in inventory order with no reordering or lookahead. A
//! normal batch never exceeds the ceiling (the boundary is inclusive); a file
//! that alone exceeds it is emitted as its own oversized batch after the
//! pending accumulator has been flushed.

use crate::domain::{Batch, FileRecord};
use std::collections::BTreeSet;

pub struct Batcher<I> {
    files: I,
    ceiling_bytes: u64,
    acc: Vec<FileRecord>,
    acc_bytes: u64,
    pending: Option<Batch>,
}

impl<I: Iterator<Item = FileRecord>> Batcher<I> {
    pub fn new(files: I, ceiling_bytes: u64) -> Self {
        Self {
            files,
            ceiling_bytes,
            acc: Vec::new(),
            acc_bytes: 0,
            pending: None,
        }
    }

    fn push(&mut self, file: FileRecord) {
        self.acc_bytes = self.acc_bytes.saturating_add(file.size_bytes);
        self.acc.push(file);
    }

    fn flush(&mut self) -> Batch {
        self.acc_bytes = 0;
        Batch::normal(std::mem::take(&mut self.acc))
    }
}

impl<I: Iterator<Item = FileRecord>> Iterator for Batcher<I> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if let Some(b) = self.pending.take() {
            return Some(b);
        }
        while let Some(file) = self.files.next() {
            if file.size_bytes > self.ceiling_bytes {
                let big = Batch::oversized(file);
                if self.acc.is_empty() {
                    return Some(big);
                }
                self.pending = Some(big);
                return Some(self.flush());
            }
            if !self.acc.is_empty()
                && self.acc_bytes.saturating_add(file.size_bytes) > self.ceiling_bytes
            {
                let full = self.flush();
                self.push(file);
                return Some(full);
            }
            self.push(file);
        }
        if self.acc.is_empty() {
            None
        } else {
            Some(self.flush())
        }
    }
}

/// Batches over the inventory entries not yet recorded in `processed`.
pub fn unprocessed<'a>(
    inventory: &'a [FileRecord],
    processed: &'a BTreeSet<String>,
    ceiling_bytes: u64,
) -> Batcher<impl Iterator<Item = FileRecord> + 'a> {
    let files = inventory
        .iter()
        .filter(move |f| !processed.contains(&f.path))
        .cloned();
    Batcher::new(files, ceiling_bytes)
}
