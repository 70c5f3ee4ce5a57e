//! Loading signals from the file system
//!
//! A submission directory holds individual `.json` signals and `.zip`
//! bundles side by side; only the top level is scanned.

use std::fs;
use std::path::{Path, PathBuf};

use sigpost_core::{parse_signal, Signal};

use crate::communication::ClientError;

const SUPPORTED_EXTENSIONS: &[&str] = &["json", "zip"];

/// All submittable files in `dir`, sorted by path. Errors if the directory
/// does not exist or contains nothing submittable.
pub fn signal_files(dir: &Path) -> Result<Vec<PathBuf>, ClientError> {
    if !dir.is_dir() {
        return Err(ClientError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(ClientError::EmptyDirectory(dir.to_path_buf()));
    }
    Ok(files)
}

/// Read and decode one `.json` signal file.
pub fn load_signal(path: &Path) -> Result<Signal, ClientError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_signal(&text)?)
}
