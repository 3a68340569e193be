//! Region discovery.
//!
//! Outline tracing runs on a disposable working copy enlarged by
//! [`SUPERSAMPLE_PERCENT`] with nearest-neighbour resampling, so the traced
//! edges fall on whole working-copy units and no soft edge pixels are added.

use crate::error::{Result, SplitError};
use crate::host::{HostSession, PathComponent, Resample};
use crate::output::{plural, Printer};

use super::selection::build_transparency_selection;
use super::{RawPoint, Subpath, SUPERSAMPLE_PERCENT, TRACE_TOLERANCE};

/// Trace the active layer on a supersampled working copy.
///
/// Returns one subpath per disjoint opaque region, in the host's order. An
/// empty list means nothing was traced. The working copy is closed before
/// returning, on success and on error.
pub fn discover_subpaths<H: HostSession + ?Sized>(
    host: &mut H,
    printer: &Printer,
) -> Result<Vec<Subpath>> {
    let temp = host.duplicate_canvas_as_temp_document()?;

    let traced = trace_working_copy(host);
    let closed = host.close_temp_document(temp);

    let components = traced?;
    closed?;

    let subpaths = collect_subpaths(&components);
    printer.verbose(
        "Traced",
        &format!(
            "{} in {}",
            plural(subpaths.len(), "outline", "outlines"),
            plural(components.len(), "path component", "path components")
        ),
    );
    Ok(subpaths)
}

fn trace_working_copy<H: HostSession + ?Sized>(host: &mut H) -> Result<Vec<PathComponent>> {
    host.resize_content(SUPERSAMPLE_PERCENT, Resample::NearestNeighbor)?;

    // An empty working copy means there is nothing to trace, not a failure.
    match build_transparency_selection(host, 0) {
        Ok(_) => {}
        Err(SplitError::Selection { .. }) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    }

    Ok(host.trace_selection_to_path(TRACE_TOLERANCE)?)
}

/// Flatten path components into subpaths, dropping empty ones.
fn collect_subpaths(components: &[PathComponent]) -> Vec<Subpath> {
    components
        .iter()
        .flat_map(|component| component.subpaths.iter())
        .filter(|subpath| !subpath.points.is_empty())
        .enumerate()
        .map(|(index, subpath)| Subpath {
            index,
            points: subpath
                .points
                .iter()
                .map(|p| RawPoint::new(p.horizontal, p.vertical))
                .collect(),
        })
        .collect()
}
