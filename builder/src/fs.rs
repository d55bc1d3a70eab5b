// Licensed under the Apache-2.0 license

//! Filesystem helpers whose failures carry the path they failed on.

use crate::error::{PackError, Result};
use std::path::Path;
use walkdir::WalkDir;

pub fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(PackError::io("create directory", path))
}

pub fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(PackError::io("read", path))
}

pub fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(PackError::io("write", path))
}

pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    std::fs::copy(src, dst).map_err(PackError::io("copy", src))?;
    Ok(())
}

/// Recursively copies `src` into `dst`, creating `dst` as needed.
/// Returns the number of files copied.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Err(PackError::Io {
            action: "copy directory",
            path: src.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|err| PackError::Io {
            action: "walk",
            path: err.path().unwrap_or(src).to_path_buf(),
            source: err.into(),
        })?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
