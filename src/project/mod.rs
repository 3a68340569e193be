//! Project configuration and input discovery.
//!
//! A project directory may carry a `pxsplit.yaml` manifest; without one the
//! defaults apply.

mod manifest;
mod scanner;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use manifest::Manifest;
pub use scanner::{is_image_file, scan_directory, scan_inputs};

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "pxsplit.yaml";

/// Path of the manifest in `dir`, if there is one.
pub fn find_manifest(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(MANIFEST_FILENAME);
    path.is_file().then_some(path)
}

/// Load the manifest from `dir`, falling back to defaults.
pub fn load_manifest(dir: &Path) -> Result<Manifest> {
    match find_manifest(dir) {
        Some(path) => Manifest::load(&path),
        None => Ok(Manifest::default()),
    }
}
