use miette::Diagnostic;
use thiserror::Error;

use crate::host::HostError;

/// Main error type for pxsplit operations
#[derive(Error, Diagnostic, Debug)]
pub enum SplitError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(pxsplit::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(pxsplit::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Config error: {message}")]
    #[diagnostic(code(pxsplit::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Validation error: {message}")]
    #[diagnostic(
        code(pxsplit::validate),
        help("Select a single pixel or smart object layer (not the background) and try again")
    )]
    Validation { message: String },

    #[error("Selection error: {message}")]
    #[diagnostic(
        code(pxsplit::selection),
        help("The layer has no opaque pixels to split")
    )]
    Selection { message: String },

    #[error("No regions found in layer '{layer}'")]
    #[diagnostic(
        code(pxsplit::empty),
        help("Nothing to split; the source layer was left untouched")
    )]
    EmptyRegionSet { layer: String },

    #[error("Failed to create layer for region at ({x}, {y}): {message}")]
    #[diagnostic(code(pxsplit::region))]
    RegionCreation { x: u32, y: u32, message: String },

    #[error("Host error: {0}")]
    #[diagnostic(code(pxsplit::host))]
    Host(#[from] HostError),
}

pub type Result<T> = std::result::Result<T, SplitError>;

impl SplitError {
    /// Fatal errors abort the whole split; region failures are counted and skipped.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SplitError::RegionCreation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_creation_is_not_fatal() {
        let err = SplitError::RegionCreation {
            x: 4,
            y: 8,
            message: "selection has no bounds".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Failed to create layer for region at (4, 8): selection has no bounds"
        );
    }

    #[test]
    fn test_host_error_converts_and_is_fatal() {
        let err: SplitError = HostError::NoActiveDocument.into();
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("Host error:"));
    }

    #[test]
    fn test_empty_region_set_message() {
        let err = SplitError::EmptyRegionSet {
            layer: "Art".to_string(),
        };
        assert_eq!(err.to_string(), "No regions found in layer 'Art'");
    }
}
