//! Layer splitting pipeline.
//!
//! Decomposes one layer into one layer per visually disjoint opaque region:
//!
//! 1. [`selection`] selects the layer's opaque pixels.
//! 2. [`discover`] traces that selection on a supersampled working copy and
//!    returns one [`Subpath`] per region.
//! 3. [`bounds`] maps each subpath back to a padded [`RegionBounds`].
//! 4. [`materialize`] turns each bounds into a named, clipped layer.
//! 5. [`orchestrator`] drives the whole run as one undo step.

pub mod bounds;
pub mod discover;
pub mod materialize;
pub mod orchestrator;
pub mod selection;

use serde::Serialize;

use crate::error::SplitError;
use crate::host::{LayerId, Rect};

pub use bounds::compute_bounds;
pub use discover::discover_subpaths;
pub use materialize::{create_layer_from_bounds, output_layer_name};
pub use orchestrator::{preview_regions, split_layer, SplitPhase, SplitReport};
pub use selection::build_transparency_selection;

/// Factor by which the working copy is enlarged before tracing.
pub const SUPERSAMPLE_FACTOR: u32 = 2;

/// The same factor as a resize percentage.
pub const SUPERSAMPLE_PERCENT: u32 = 200;

/// Tracing tolerance handed to the host's path engine, in working-copy units.
pub const TRACE_TOLERANCE: f64 = 0.5;

// Discovery upscales by SUPERSAMPLE_PERCENT and extraction divides by
// SUPERSAMPLE_FACTOR; they must describe the same scale.
const _: () = assert!(SUPERSAMPLE_PERCENT == SUPERSAMPLE_FACTOR * 100);

/// A traced anchor in working-copy (supersampled) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPoint {
    pub x: f64,
    pub y: f64,
}

impl RawPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Outline of one region, tagged with its position in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    pub index: usize,
    pub points: Vec<RawPoint>,
}

/// Region rectangle in original-canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub original_index: usize,
}

impl RegionBounds {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A layer created for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayer {
    pub id: LayerId,
    pub name: String,
    pub bounds: RegionBounds,
}

/// A region that could not be materialized.
#[derive(Debug)]
pub struct RegionFailure {
    /// 1-based index the region's layer would have carried.
    pub index: usize,
    pub bounds: RegionBounds,
    pub error: SplitError,
}

#[cfg(test)]
pub(crate) mod testing;
