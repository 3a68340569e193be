//! Input scanner.
//!
//! Expands the command line's files and directories into the list of images
//! to split.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::manifest::Manifest;

/// Whether a path looks like an image pxsplit can split.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}

/// Recursively collect PNG files under `root`, skipping excluded paths.
pub fn scan_directory(root: &Path, manifest: &Manifest) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file() && is_image_file(path) && !manifest.is_excluded(path))
        .collect();

    files.sort();
    files
}

/// Expand inputs: files are kept as given, directories are scanned.
///
/// Paths that do not exist are returned unchanged so the caller can report them.
pub fn scan_inputs(inputs: &[PathBuf], manifest: &Manifest) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            files.extend(scan_directory(input, manifest));
        } else {
            files.push(input.clone());
        }
    }

    files
}
