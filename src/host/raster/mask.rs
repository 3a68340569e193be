//! 8-bit selection and layer masks.
//!
//! A mask is a `GrayImage` the size of the canvas: 0 = unselected/hidden,
//! anything else = selected/visible.

use image::{GrayImage, Luma, RgbaImage};

use crate::host::Rect;

/// Mask of every pixel whose effective alpha is non-zero.
///
/// When the layer carries its own mask, pixels hidden by it count as
/// transparent.
pub fn alpha_mask(pixels: &RgbaImage, layer_mask: Option<&GrayImage>) -> GrayImage {
    GrayImage::from_fn(pixels.width(), pixels.height(), |x, y| {
        let visible = pixels.get_pixel(x, y)[3] > 0
            && layer_mask.map_or(true, |m| m.get_pixel(x, y)[0] > 0);
        Luma([if visible { 255 } else { 0 }])
    })
}

/// Grow a mask outward by `radius` pixels using a square structuring element.
///
/// Runs as two separable max passes (rows then columns).
pub fn grow_mask(mask: &GrayImage, radius: u32) -> GrayImage {
    if radius == 0 {
        return mask.clone();
    }

    let (width, height) = mask.dimensions();
    let r = radius as i64;

    let mut horizontal = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let lo = (x as i64 - r).max(0) as u32;
            let hi = (x as i64 + r).min(width as i64 - 1) as u32;
            let max = (lo..=hi).map(|sx| mask.get_pixel(sx, y)[0]).max().unwrap_or(0);
            horizontal.put_pixel(x, y, Luma([max]));
        }
    }

    let mut grown = GrayImage::new(width, height);
    for y in 0..height {
        let lo = (y as i64 - r).max(0) as u32;
        let hi = (y as i64 + r).min(height as i64 - 1) as u32;
        for x in 0..width {
            let max = (lo..=hi)
                .map(|sy| horizontal.get_pixel(x, sy)[0])
                .max()
                .unwrap_or(0);
            grown.put_pixel(x, y, Luma([max]));
        }
    }

    grown
}

/// Tight bounds of the selected pixels, `None` if nothing is selected.
pub fn mask_bounds(mask: &GrayImage) -> Option<Rect> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut any = false;

    for (x, y, p) in mask.enumerate_pixels() {
        if p[0] > 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    any.then(|| Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Mask selecting `rect` clipped to a `width` x `height` canvas.
pub fn rect_mask(width: u32, height: u32, rect: Rect) -> GrayImage {
    let canvas = Rect::new(0, 0, width, height);
    let mut mask = GrayImage::new(width, height);

    if let Some(clipped) = canvas.intersect(&rect) {
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }

    mask
}

/// Invert a mask (selected becomes unselected).
pub fn invert_mask(mask: &GrayImage) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([255 - mask.get_pixel(x, y)[0]])
    })
}

/// Per-pixel minimum of two masks of equal size.
pub fn intersect_masks(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y)[0].min(b.get_pixel(x, y)[0])])
    })
}
