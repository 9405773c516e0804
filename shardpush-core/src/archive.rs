use crate::codec::CodecId;
use crate::domain::{BatchKind, FileRecord};
use crate::error::{Result, ShardError};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Suffix of archives still being written; any such file is an abandoned build.
pub const PARTIAL_SUFFIX: &str = ".partial";

/// `<prefix>_part_NNN.<ext>` or `<prefix>_bigfile_NNN.<ext>`.
pub fn archive_file_name(prefix: &str, kind: BatchKind, seq: u32, codec: CodecId) -> String {
    format!("{prefix}_{}_{seq:03}.{}", kind.label(), codec.extension())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub size: u64,
}

/// Writes one batch as a compressed tarball.
pub struct ArchiveWriter<'a> {
    pub root: &'a Path,
    pub codec: CodecId,
    pub level: i32,
}

impl<'a> ArchiveWriter<'a> {
    pub fn new(root: &'a Path, codec: CodecId, level: i32) -> Self {
        Self { root, codec, level }
    }

    /// Build the archive at `out` and return its size on disk.
    ///
    /// Data goes to a temp file next to `out`, renamed into place only once the
    /// codec trailer is written; on error nothing is left at `out`.
    pub fn write(&self, files: &[FileRecord], out: &Path) -> Result<u64> {
        self.write_inner(files, out)
            .map_err(|source| ShardError::Compress {
                archive: out.to_path_buf(),
                source,
            })
    }

    fn write_inner(&self, files: &[FileRecord], out: &Path) -> std::io::Result<u64> {
        let dir = out
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let stem = out.file_name().unwrap_or_default().to_string_lossy();
        let tmp = tempfile::Builder::new()
            .prefix(&format!("{stem}."))
            .suffix(PARTIAL_SUFFIX)
            .tempfile_in(dir)?;
        let sink = BufWriter::with_capacity(1 << 20, tmp.as_file().try_clone()?);

        let compressor = self.codec.compressor();
        let enc = compressor
            .encoder(Box::new(sink), self.level)
            .map_err(into_io)?;
        let mut builder = tar::Builder::new(enc);
        for f in files {
            let src = self.source_path(&f.path);
            let mut fh = File::open(&src)?;
            builder.append_file(&f.path, &mut fh)?;
        }
        let enc = builder.into_inner()?;
        enc.finish()?;
        tmp.as_file().sync_all()?;

        let len = tmp.as_file().metadata()?.len();
        tmp.persist(out).map_err(|e| e.error)?;
        Ok(len)
    }

    fn source_path(&self, rel: &str) -> PathBuf {
        rel.split('/').fold(self.root.to_path_buf(), |p, part| p.join(part))
    }
}

/// Unfinished archives left in `dir` by an earlier process that died mid-write.
pub fn partial_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().ends_with(PARTIAL_SUFFIX))
        })
        .collect();
    found.sort();
    Ok(found)
}

/// Entries stored in a local archive, in archive order.
pub fn list_entries(archive: &Path, codec: CodecId) -> Result<Vec<ArchiveEntry>> {
    let f = File::open(archive)?;
    let compressor = codec.compressor();
    let dec = compressor.decoder(Box::new(std::io::BufReader::new(f)))?;
    let mut ar = tar::Archive::new(dec);
    let mut out = Vec::new();
    for entry in ar.entries()? {
        let entry = entry?;
        out.push(ArchiveEntry {
            path: entry.path()?.to_string_lossy().into_owned(),
            size: entry.header().size()?,
        });
    }
    Ok(out)
}

fn into_io(e: ShardError) -> std::io::Error {
    match e {
        ShardError::Io(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
    }
}
