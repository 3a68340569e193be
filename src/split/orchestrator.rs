//! Split orchestration.
//!
//! Runs the pipeline as a linear state machine:
//!
//! ```text
//! Idle -> Validating -> SelectingSource -> BuildingSelection -> DiscoveringRegions
//!      -> ExtractingBounds -> MaterializingLayers -> HidingSource -> Done
//! ```
//!
//! Fatal errors move to `Aborted`. A region that fails to materialize is
//! counted and skipped; it never aborts the run.

use std::fmt;

use crate::config::Config;
use crate::error::{Result, SplitError};
use crate::host::{HostSession, LayerInfo};
use crate::output::{plural, Printer};

use super::bounds::compute_bounds;
use super::discover::discover_subpaths;
use super::materialize::create_layer_from_bounds;
use super::selection::build_transparency_selection;
use super::{OutputLayer, RegionBounds, RegionFailure, Subpath};

/// Label of the undo step wrapping a split.
pub const HISTORY_LABEL: &str = "Split Layer by Regions";

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPhase {
    Idle,
    Validating,
    SelectingSource,
    BuildingSelection,
    DiscoveringRegions,
    ExtractingBounds,
    MaterializingLayers,
    HidingSource,
    Done,
    Aborted,
}

impl fmt::Display for SplitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplitPhase::Idle => "idle",
            SplitPhase::Validating => "validating",
            SplitPhase::SelectingSource => "selecting source",
            SplitPhase::BuildingSelection => "building selection",
            SplitPhase::DiscoveringRegions => "discovering regions",
            SplitPhase::ExtractingBounds => "extracting bounds",
            SplitPhase::MaterializingLayers => "materializing layers",
            SplitPhase::HidingSource => "hiding source",
            SplitPhase::Done => "done",
            SplitPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed split.
#[derive(Debug)]
pub struct SplitReport {
    pub source: LayerInfo,
    /// Regions found by discovery.
    pub discovered: usize,
    pub created: Vec<OutputLayer>,
    pub failures: Vec<RegionFailure>,
}

impl SplitReport {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

/// Tracks the current phase and logs transitions.
struct PhaseTracker<'a> {
    phase: SplitPhase,
    printer: &'a Printer,
}

impl<'a> PhaseTracker<'a> {
    fn new(printer: &'a Printer) -> Self {
        Self {
            phase: SplitPhase::Idle,
            printer,
        }
    }

    fn enter(&mut self, phase: SplitPhase) {
        self.printer.verbose("Phase", &format!("{} -> {}", self.phase, phase));
        self.phase = phase;
    }

    fn abort(&mut self, err: SplitError) -> SplitError {
        self.printer.verbose("Aborted", &format!("while {}: {}", self.phase, err));
        self.phase = SplitPhase::Aborted;
        err
    }
}

/// Split the first selected layer into one layer per opaque region.
///
/// The whole run is a single history group. On success the source layer is
/// hidden, never deleted.
pub fn split_layer<H: HostSession + ?Sized>(
    host: &mut H,
    config: &Config,
    printer: &Printer,
) -> Result<SplitReport> {
    let mut tracker = PhaseTracker::new(printer);

    tracker.enter(SplitPhase::Validating);
    let source = validate_source(host).map_err(|e| tracker.abort(e))?;

    host.begin_history_group(HISTORY_LABEL)
        .map_err(|e| tracker.abort(e.into()))?;
    let result = run(host, &source, config, &mut tracker);
    let ended = host.end_history_group();

    let report = result.map_err(|e| tracker.abort(e))?;
    ended?;
    tracker.enter(SplitPhase::Done);

    printer.success(
        "Finished",
        &format!(
            "{}: {} discovered, {} created",
            source.name,
            plural(report.discovered, "region", "regions"),
            plural(report.created_count(), "layer", "layers")
        ),
    );
    if report.failed_count() > 0 {
        printer.warning(
            "Warning",
            &format!(
                "{} could not be created",
                plural(report.failed_count(), "region", "regions")
            ),
        );
    }

    Ok(report)
}

fn run<H: HostSession + ?Sized>(
    host: &mut H,
    source: &LayerInfo,
    config: &Config,
    tracker: &mut PhaseTracker<'_>,
) -> Result<SplitReport> {
    let printer = tracker.printer;
    let regions = discover_regions(host, source, config, tracker)?;
    let discovered = regions.len();

    tracker.enter(SplitPhase::MaterializingLayers);
    let mut created = Vec::new();
    let mut failures = Vec::new();
    for (i, bounds) in regions.iter().enumerate() {
        let index = i + 1;
        match create_layer_from_bounds(host, source, bounds, config, index, printer) {
            Ok(layer) => {
                printer.verbose(
                    "Created",
                    &format!("{} ({})", layer.name, bounds.rect()),
                );
                created.push(layer);
            }
            Err(error) => failures.push(RegionFailure {
                index,
                bounds: *bounds,
                error,
            }),
        }
    }

    tracker.enter(SplitPhase::HidingSource);
    host.set_layer_visible(source.id, false)?;

    Ok(SplitReport {
        source: source.clone(),
        discovered,
        created,
        failures,
    })
}

/// Discover region bounds without creating any layers.
///
/// Validates and selects the source like [`split_layer`], then clears the
/// selection it built. Useful for previews and confirmation prompts.
pub fn preview_regions<H: HostSession + ?Sized>(
    host: &mut H,
    config: &Config,
    printer: &Printer,
) -> Result<Vec<RegionBounds>> {
    let mut tracker = PhaseTracker::new(printer);

    tracker.enter(SplitPhase::Validating);
    let source = validate_source(host).map_err(|e| tracker.abort(e))?;

    let regions = discover_regions(host, &source, config, &mut tracker);
    let cleared = host.clear_selection();

    let regions = regions.map_err(|e| tracker.abort(e))?;
    cleared?;
    tracker.enter(SplitPhase::Done);
    Ok(regions)
}

/// Steps shared by split and preview: select, build selection, trace, extract.
fn discover_regions<H: HostSession + ?Sized>(
    host: &mut H,
    source: &LayerInfo,
    config: &Config,
    tracker: &mut PhaseTracker<'_>,
) -> Result<Vec<RegionBounds>> {
    tracker.enter(SplitPhase::SelectingSource);
    host.select_layer(source.id)?;

    tracker.enter(SplitPhase::BuildingSelection);
    let selected = build_transparency_selection(host, config.tolerance)?;
    tracker.printer.verbose("Selected", &format!("opaque pixels in {}", selected));

    tracker.enter(SplitPhase::DiscoveringRegions);
    let subpaths = discover_subpaths(host, tracker.printer)?;
    if subpaths.is_empty() {
        return Err(SplitError::EmptyRegionSet {
            layer: source.name.clone(),
        });
    }

    tracker.enter(SplitPhase::ExtractingBounds);
    Ok(extract_bounds(&subpaths, config.padding))
}

/// Bounds of every subpath, in discovery order.
pub fn extract_bounds(subpaths: &[Subpath], padding: u32) -> Vec<RegionBounds> {
    subpaths
        .iter()
        .filter_map(|subpath| compute_bounds(subpath, padding))
        .collect()
}

/// The first selected layer, if it can be split.
fn validate_source<H: HostSession + ?Sized>(host: &H) -> Result<LayerInfo> {
    let source = host
        .selected_layers()
        .into_iter()
        .next()
        .ok_or_else(|| SplitError::Validation {
            message: "no layer selected".to_string(),
        })?;

    if !source.kind.is_splittable() {
        return Err(SplitError::Validation {
            message: format!(
                "layer '{}' is a {} layer and cannot be split",
                source.name,
                source.kind.name()
            ),
        });
    }

    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LayerKind, RasterHost, Rect};
    use crate::split::testing::{sheet, FakeHost};
    use image::RgbaImage;
    use pretty_assertions::assert_eq;

    fn padded(padding: u32) -> Config {
        Config {
            padding,
            ..Default::default()
        }
    }

    #[test]
    fn test_two_squares_become_two_layers() {
        let img = sheet(300, 80, &[Rect::new(10, 10, 50, 50), Rect::new(200, 10, 50, 50)]);
        let mut host = RasterHost::from_image("Art", img);

        let report = split_layer(&mut host, &padded(1), &Printer::new()).unwrap();

        assert_eq!(report.discovered, 2);
        assert_eq!(report.created_count(), 2);
        assert_eq!(report.failed_count(), 0);

        let names: Vec<&str> = report.created.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Art_01", "Art_02"]);
        assert_eq!(report.created[0].bounds.rect(), Rect::new(9, 9, 52, 52));
        assert_eq!(report.created[1].bounds.rect(), Rect::new(199, 9, 52, 52));

        // Each layer holds only its own square
        let first = host.layer_pixels(report.created[0].id).unwrap();
        assert_eq!(first.get_pixel(10, 10)[3], 255);
        assert_eq!(first.get_pixel(200, 10)[3], 0);
        let second = host.layer_pixels(report.created[1].id).unwrap();
        assert_eq!(second.get_pixel(10, 10)[3], 0);
        assert_eq!(second.get_pixel(249, 59)[3], 255);

        assert!(!host.layer(report.source.id).unwrap().visible);
        assert_eq!(host.layers().len(), 3);
        assert_eq!(host.document_count(), 1);
    }

    #[test]
    fn test_transparent_layer_aborts_with_selection_error() {
        let mut host = RasterHost::from_image("Empty", RgbaImage::new(32, 32));
        let source = host.selected_layers()[0].id;

        let err = split_layer(&mut host, &Config::default(), &Printer::new()).unwrap_err();

        assert!(matches!(err, SplitError::Selection { .. }));
        assert_eq!(host.layers().len(), 1);
        assert!(host.layer(source).unwrap().visible);
    }

    #[test]
    fn test_middle_region_failure_is_skipped() {
        let mut host = FakeHost::new(vec![
            Rect::new(0, 0, 4, 4),
            Rect::new(10, 0, 4, 4),
            Rect::new(20, 0, 4, 4),
        ]);
        host.empty_rect_selections = vec![1];

        let report = split_layer(&mut host, &Config::default(), &Printer::new()).unwrap();

        assert_eq!(report.discovered, 3);
        assert_eq!(report.created_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failures[0].index, 2);
        assert!(!report.failures[0].error.is_fatal());
        let names: Vec<&str> = report.created.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Art_01", "Art_03"]);
        assert!(!host.source_visible());
    }

    #[test]
    fn test_single_pixel_dot() {
        let img = sheet(8, 8, &[Rect::new(3, 4, 1, 1)]);
        let mut host = RasterHost::from_image("Dot", img);

        let report = split_layer(&mut host, &padded(0), &Printer::new()).unwrap();

        assert_eq!(report.created_count(), 1);
        assert_eq!(report.created[0].bounds.rect(), Rect::new(3, 4, 1, 1));
    }

    #[test]
    fn test_empty_discovery_leaves_source_visible() {
        let mut host = FakeHost::new(vec![Rect::new(0, 0, 4, 4)]);
        host.trace_nothing = true;

        let err = split_layer(&mut host, &Config::default(), &Printer::new()).unwrap_err();

        assert!(matches!(err, SplitError::EmptyRegionSet { .. }));
        assert!(host.source_visible());
        assert_eq!(host.layers_created, 0);
    }

    #[test]
    fn test_background_layer_rejected() {
        let mut host = RasterHost::new();
        let mut base = RasterHost::from_image("Art", sheet(8, 8, &[Rect::new(1, 1, 2, 2)]));
        let bg = base
            .add_layer("Background", LayerKind::Background, RgbaImage::new(8, 8))
            .unwrap();
        base.select_layer(bg).unwrap();

        let err = split_layer(&mut base, &Config::default(), &Printer::new()).unwrap_err();
        assert!(matches!(err, SplitError::Validation { .. }));

        let err = split_layer(&mut host, &Config::default(), &Printer::new()).unwrap_err();
        assert!(matches!(err, SplitError::Validation { .. }));
    }

    #[test]
    fn test_only_first_selected_layer_is_split() {
        let mut host = RasterHost::from_image("Art", sheet(30, 10, &[Rect::new(1, 1, 2, 2)]));
        let art = host.selected_layers()[0].id;
        let other = host
            .add_layer("Other", LayerKind::Pixel, sheet(30, 10, &[Rect::new(20, 1, 2, 2)]))
            .unwrap();
        host.select_layers(&[art, other]).unwrap();

        let report = split_layer(&mut host, &Config::default(), &Printer::new()).unwrap();

        assert_eq!(report.source.id, art);
        assert_eq!(report.created_count(), 1);
        assert!(host.layer(other).unwrap().visible);
    }

    #[test]
    fn test_split_is_one_undo_step() {
        let img = sheet(40, 10, &[Rect::new(1, 1, 3, 3), Rect::new(20, 1, 3, 3)]);
        let mut host = RasterHost::from_image("Art", img);

        split_layer(&mut host, &Config::default(), &Printer::new()).unwrap();
        assert_eq!(host.layers().len(), 3);

        assert_eq!(host.undo_last_group(), Some(HISTORY_LABEL.to_string()));
        let layers = host.layers();
        assert_eq!(layers.len(), 1);
        assert!(layers[0].visible);
    }

    #[test]
    fn test_history_group_closed_on_fatal_error() {
        let mut host = FakeHost::new(vec![Rect::new(0, 0, 4, 4)]);
        host.trace_nothing = true;

        let _ = split_layer(&mut host, &Config::default(), &Printer::new());
        assert_eq!(host.open_history_groups, 0);
    }

    #[test]
    fn test_count_bound_holds() {
        let mut host = FakeHost::new(vec![
            Rect::new(0, 0, 2, 2),
            Rect::new(5, 0, 2, 2),
            Rect::new(10, 0, 2, 2),
            Rect::new(15, 0, 2, 2),
        ]);
        host.empty_rect_selections = vec![0, 3];

        let report = split_layer(&mut host, &Config::default(), &Printer::new()).unwrap();

        assert!(report.created_count() <= report.discovered);
        assert_eq!(report.created_count() + report.failed_count(), report.discovered);
        assert_eq!(report.created_count(), host.layers_created);
    }

    #[test]
    fn test_preview_creates_no_layers() {
        let img = sheet(300, 80, &[Rect::new(10, 10, 50, 50), Rect::new(200, 10, 50, 50)]);
        let mut host = RasterHost::from_image("Art", img);

        let regions = preview_regions(&mut host, &padded(2), &Printer::new()).unwrap();

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].rect(), Rect::new(198, 8, 54, 54));
        assert_eq!(host.layers().len(), 1);
        assert!(host.layers()[0].visible);
        assert_eq!(host.selection_bounds().unwrap(), None);
    }

    #[test]
    fn test_tolerance_does_not_merge_traced_regions() {
        // Growth applies to the precondition selection only; tracing uses exact alpha.
        let img = sheet(40, 10, &[Rect::new(1, 1, 4, 4), Rect::new(7, 1, 4, 4)]);
        let mut host = RasterHost::from_image("Art", img);
        let config = Config {
            tolerance: 4,
            ..Default::default()
        };

        let regions = preview_regions(&mut host, &config, &Printer::new()).unwrap();
        assert_eq!(regions.len(), 2);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(SplitPhase::MaterializingLayers.to_string(), "materializing layers");
    }
}
