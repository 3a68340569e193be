//! pxsplit - Split a sprite layer into one layer per opaque region
//!
//! Discovers the disjoint non-transparent regions of a layer, computes their
//! bounding boxes and materializes each as a new layer through a
//! [`HostSession`]. [`RasterHost`] is the in-memory host used by the CLI.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod host;
pub mod output;
pub mod project;
pub mod split;

pub use config::{Config, ConfigOverrides};
pub use error::{Result, SplitError};
pub use export::{export_report, write_split_json, SplitMeta};
pub use host::{HostError, HostSession, LayerId, LayerInfo, LayerKind, RasterHost, Rect};
pub use output::Printer;
pub use project::{load_manifest, Manifest};
pub use split::{
    build_transparency_selection, compute_bounds, create_layer_from_bounds, discover_subpaths,
    preview_regions, split_layer, OutputLayer, RegionBounds, RegionFailure, SplitPhase,
    SplitReport, Subpath,
};
