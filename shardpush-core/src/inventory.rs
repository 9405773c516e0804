use crate::domain::FileRecord;
use crate::error::Result;
use std::path::{Component, Path};
use walkdir::WalkDir;

/// Walk `root` depth-first, lexicographic within each directory.
///
/// Only regular files are returned; symlinks are neither followed nor listed.
/// Paths are relative to `root` and `/`-separated.
pub fn scan(root: &Path) -> Result<Vec<FileRecord>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let size_bytes = entry.metadata()?.len();
        files.push(FileRecord {
            path: relative_key(root, entry.path())?,
            size_bytes,
        });
    }
    Ok(files)
}

pub fn total_bytes(files: &[FileRecord]) -> u64 {
    files.iter().map(|f| f.size_bytes).sum()
}

fn relative_key(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let mut parts = Vec::new();
    for c in rel.components() {
        if let Component::Normal(os) = c {
            let s = os.to_str().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("non UTF-8 file name under {}", root.display()),
                )
            })?;
            parts.push(s);
        }
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scan_is_sorted_and_relative() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("b/inner/z.bin"), vec![0u8; 7]).unwrap();
        fs::write(root.join("b/c.txt"), b"abc").unwrap();
        fs::write(root.join("a/x"), b"").unwrap();
        fs::write(root.join("top"), b"12345").unwrap();

        let files = scan(root).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["a/x", "b/c.txt", "b/inner/z.bin", "top"]);
        assert_eq!(total_bytes(&files), 15);

        // unchanged tree, same order
        assert_eq!(scan(root).unwrap(), files);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("real"), b"data").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();
        fs::create_dir(root.join("dir")).unwrap();
        std::os::unix::fs::symlink(root.join("dir"), root.join("dirlink")).unwrap();

        let files = scan(root).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "real");
        assert_eq!(files[0].size_bytes, 4);
    }
}
