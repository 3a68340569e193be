//! Bounding box extraction.
//!
//! Pure geometry: maps a traced subpath from working-copy coordinates back to
//! the original canvas and pads it.

use super::{RegionBounds, Subpath, SUPERSAMPLE_FACTOR};

/// Map one working-copy coordinate back to the original canvas.
pub fn downscale(value: f64) -> i64 {
    (value / SUPERSAMPLE_FACTOR as f64).round() as i64
}

/// Compute the padded, clamped bounds of a subpath.
///
/// Returns `None` for a subpath without points. `x`/`y` never go below zero;
/// `width`/`height` are at least 1, so a single-point outline still yields a
/// 1x1 region.
pub fn compute_bounds(subpath: &Subpath, padding: u32) -> Option<RegionBounds> {
    let (first, rest) = subpath.points.split_first()?;

    let start = (downscale(first.x), downscale(first.y));
    let (min_x, max_x, min_y, max_y) = rest.iter().fold(
        (start.0, start.0, start.1, start.1),
        |(min_x, max_x, min_y, max_y), p| {
            let (x, y) = (downscale(p.x), downscale(p.y));
            (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
        },
    );

    let padding = padding as i64;
    let x = (min_x - padding).max(0);
    let y = (min_y - padding).max(0);
    let width = ((max_x - min_x) + 2 * padding).max(1);
    let height = ((max_y - min_y) + 2 * padding).max(1);

    Some(RegionBounds {
        x: to_u32(x),
        y: to_u32(y),
        width: to_u32(width),
        height: to_u32(height),
        original_index: subpath.index,
    })
}

fn to_u32(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::RawPoint;

    fn subpath(index: usize, points: &[(f64, f64)]) -> Subpath {
        Subpath {
            index,
            points: points.iter().map(|&(x, y)| RawPoint::new(x, y)).collect(),
        }
    }

    #[test]
    fn test_empty_subpath_has_no_bounds() {
        assert_eq!(compute_bounds(&subpath(0, &[]), 4), None);
    }

    #[test]
    fn test_downscale_rounds_to_nearest() {
        assert_eq!(downscale(20.0), 10);
        assert_eq!(downscale(21.0), 11);
        assert_eq!(downscale(20.9), 10);
        assert_eq!(downscale(19.0), 10);
        assert_eq!(downscale(0.4), 0);
    }

    #[test]
    fn test_square_with_padding() {
        let sp = subpath(0, &[(20.0, 20.0), (120.0, 20.0), (120.0, 120.0), (20.0, 120.0)]);
        let bounds = compute_bounds(&sp, 1).unwrap();
        assert_eq!(
            bounds,
            RegionBounds {
                x: 9,
                y: 9,
                width: 52,
                height: 52,
                original_index: 0,
            }
        );
    }

    #[test]
    fn test_padding_formula_before_clamping() {
        let sp = subpath(3, &[(10.0, 30.0), (50.0, 90.0)]);
        for padding in [0, 1, 5] {
            let b = compute_bounds(&sp, padding).unwrap();
            assert_eq!(b.width, (25 - 5) + 2 * padding);
            assert_eq!(b.height, (45 - 15) + 2 * padding);
            assert_eq!(b.original_index, 3);
        }
    }

    #[test]
    fn test_origin_clamped_at_zero() {
        let sp = subpath(0, &[(2.0, 4.0), (10.0, 10.0)]);
        let bounds = compute_bounds(&sp, 8).unwrap();
        assert_eq!((bounds.x, bounds.y), (0, 0));
        // Width still grows by the full padding on both sides
        assert_eq!(bounds.width, 4 + 16);
    }

    #[test]
    fn test_negative_coordinates_clamped() {
        let sp = subpath(0, &[(-10.0, -6.0), (4.0, 4.0)]);
        let bounds = compute_bounds(&sp, 0).unwrap();
        assert_eq!((bounds.x, bounds.y), (0, 0));
        assert_eq!((bounds.width, bounds.height), (7, 5));
    }

    #[test]
    fn test_single_point_clamps_to_one_pixel() {
        let bounds = compute_bounds(&subpath(0, &[(7.0, 7.0)]), 0).unwrap();
        assert_eq!((bounds.width, bounds.height), (1, 1));
    }

    #[test]
    fn test_bounds_serialize_camel_case() {
        let sp = subpath(1, &[(20.0, 20.0), (120.0, 120.0)]);
        let bounds = compute_bounds(&sp, 1).unwrap();
        insta::assert_json_snapshot!(bounds, @r###"
        {
          "x": 9,
          "y": 9,
          "width": 52,
          "height": 52,
          "originalIndex": 1
        }
        "###);
    }
}
