//! Layer materializer.
//!
//! Turns one [`RegionBounds`] into an independent layer: duplicate the source,
//! mask it to the rectangle, flatten the mask away and name the result.

use crate::config::Config;
use crate::error::{Result, SplitError};
use crate::host::{HostSession, LayerId, LayerInfo, MaskMode};
use crate::output::Printer;

use super::{OutputLayer, RegionBounds};

/// Output name: source name, suffix, and (with `add_count`) the index
/// zero-padded to two digits.
pub fn output_layer_name(source_name: &str, config: &Config, index: usize) -> String {
    if config.add_count {
        format!("{}{}{:02}", source_name, config.suffix, index)
    } else {
        format!("{}{}", source_name, config.suffix)
    }
}

/// Create the output layer for one region.
///
/// Any host failure, or a rectangle that selects nothing, is reported as
/// [`SplitError::RegionCreation`]. The selection is cleared before returning
/// in every case.
pub fn create_layer_from_bounds<H: HostSession + ?Sized>(
    host: &mut H,
    source: &LayerInfo,
    bounds: &RegionBounds,
    config: &Config,
    index: usize,
    printer: &Printer,
) -> Result<OutputLayer> {
    let name = output_layer_name(&source.name, config, index);

    match isolate_region(host, source, bounds, &name) {
        Ok(id) => Ok(OutputLayer {
            id,
            name,
            bounds: *bounds,
        }),
        Err(e) => {
            let _ = host.clear_selection();
            let message = match e {
                SplitError::RegionCreation { message, .. } => message,
                SplitError::Host(host_error) => host_error.to_string(),
                other => other.to_string(),
            };
            printer.warning(
                "Skipped",
                &format!("region at ({}, {}): {}", bounds.x, bounds.y, message),
            );
            Err(SplitError::RegionCreation {
                x: bounds.x,
                y: bounds.y,
                message,
            })
        }
    }
}

fn isolate_region<H: HostSession + ?Sized>(
    host: &mut H,
    source: &LayerInfo,
    bounds: &RegionBounds,
    name: &str,
) -> Result<LayerId> {
    host.select_layer(source.id)?;
    host.duplicate_layer()?;

    host.set_rectangular_selection(bounds.rect())?;
    if host.selection_bounds()?.is_none() {
        return Err(SplitError::RegionCreation {
            x: bounds.x,
            y: bounds.y,
            message: "rectangle selects nothing".to_string(),
        });
    }

    host.mask_from_selection(MaskMode::RevealSelection)?;
    host.clear_selection()?;

    host.create_empty_layer()?;
    let merged = host.merge_down()?;

    host.rename_active_layer(name)?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostError, RasterHost, Rect};
    use crate::split::testing::{sheet, FakeHost};
    use pretty_assertions::assert_eq;

    fn bounds(x: u32, y: u32, width: u32, height: u32) -> RegionBounds {
        RegionBounds {
            x,
            y,
            width,
            height,
            original_index: 0,
        }
    }

    #[test]
    fn test_name_with_count() {
        let config = Config::default();
        assert_eq!(output_layer_name("Art", &config, 3), "Art_03");
    }

    #[test]
    fn test_name_wide_index_not_truncated() {
        let config = Config::default();
        assert_eq!(output_layer_name("Art", &config, 123), "Art_123");
    }

    #[test]
    fn test_name_without_count() {
        let config = Config {
            add_count: false,
            suffix: " part".to_string(),
            ..Default::default()
        };
        assert_eq!(output_layer_name("Art", &config, 3), "Art part");
    }

    #[test]
    fn test_creates_clipped_named_layer() {
        let img = sheet(40, 10, &[Rect::new(2, 2, 4, 4), Rect::new(20, 2, 4, 4)]);
        let mut host = RasterHost::from_image("Art", img);
        let source = host.selected_layers()[0].clone();

        let layer = create_layer_from_bounds(
            &mut host,
            &source,
            &bounds(1, 1, 6, 6),
            &Config::default(),
            1,
            &Printer::new(),
        )
        .unwrap();

        assert_eq!(layer.name, "Art_01");
        assert_eq!(host.layer(layer.id).unwrap().name, "Art_01");
        assert_eq!(host.layers().len(), 2);

        let pixels = host.layer_pixels(layer.id).unwrap();
        assert_eq!(pixels.get_pixel(2, 2)[3], 255);
        assert_eq!(pixels.get_pixel(20, 2)[3], 0);
        assert_eq!(host.selection_bounds().unwrap(), None);
    }

    #[test]
    fn test_rectangle_outside_canvas_is_region_failure() {
        let img = sheet(10, 10, &[Rect::new(2, 2, 4, 4)]);
        let mut host = RasterHost::from_image("Art", img);
        let source = host.selected_layers()[0].clone();

        let err = create_layer_from_bounds(
            &mut host,
            &source,
            &bounds(30, 30, 4, 4),
            &Config::default(),
            1,
            &Printer::new(),
        )
        .unwrap_err();

        assert!(matches!(err, SplitError::RegionCreation { x: 30, y: 30, .. }));
        assert_eq!(host.selection_bounds().unwrap(), None);
    }

    #[test]
    fn test_host_failure_clears_selection() {
        let mut host = FakeHost::new(vec![Rect::new(0, 0, 4, 4)]);
        host.fail_merge = Some(HostError::Operation("merge refused".to_string()));
        let source = host.source();

        let err = create_layer_from_bounds(
            &mut host,
            &source,
            &bounds(0, 0, 4, 4),
            &Config::default(),
            1,
            &Printer::new(),
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to create layer for region at (0, 0): merge refused"
        );
        assert!(!host.has_selection());
    }
}
