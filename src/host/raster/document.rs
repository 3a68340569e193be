//! Documents and layers held by the raster host.

use image::{imageops, GrayImage, ImageBuffer, Pixel, Rgba, RgbaImage};

use crate::host::{DocumentId, LayerId, LayerInfo, LayerKind, Resample};

/// A raster layer: full-canvas pixels plus an optional mask.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    pub id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    pub visible: bool,
    pub pixels: RgbaImage,
    pub mask: Option<GrayImage>,
}

impl RasterLayer {
    pub fn info(&self) -> LayerInfo {
        LayerInfo {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            visible: self.visible,
        }
    }

    /// Pixels with the mask baked into alpha.
    pub fn masked_pixels(&self) -> RgbaImage {
        let mut out = self.pixels.clone();
        if let Some(mask) = &self.mask {
            for (x, y, px) in out.enumerate_pixels_mut() {
                let m = mask.get_pixel(x, y)[0] as u32;
                px[3] = ((px[3] as u32 * m + 127) / 255) as u8;
            }
        }
        out
    }
}

/// Snapshot of a document's layer stack, restored by undo.
#[derive(Debug, Clone)]
pub(crate) struct HistoryState {
    pub label: String,
    pub layers: Vec<RasterLayer>,
    pub selected: Vec<LayerId>,
}

/// An open document: canvas, layers (bottom to top), selection.
#[derive(Debug, Clone)]
pub struct RasterDocument {
    pub id: DocumentId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub(crate) layers: Vec<RasterLayer>,
    /// Selected layers; the first one is the active layer.
    pub(crate) selected: Vec<LayerId>,
    pub(crate) selection: Option<GrayImage>,
    /// Document to reactivate when this temporary document closes.
    pub(crate) return_to: Option<DocumentId>,
    pub(crate) history: Vec<HistoryState>,
}

impl RasterDocument {
    pub fn new(id: DocumentId, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            name: name.into(),
            width,
            height,
            layers: Vec::new(),
            selected: Vec::new(),
            selection: None,
            return_to: None,
            history: Vec::new(),
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.return_to.is_some()
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.selected.first().copied()
    }

    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&RasterLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut RasterLayer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn layers(&self) -> &[RasterLayer] {
        &self.layers
    }

    /// Resize the canvas and every layer by `percent`.
    pub fn resize(&mut self, percent: u32, resample: Resample) {
        let new_w = scaled_dimension(self.width, percent);
        let new_h = scaled_dimension(self.height, percent);

        for layer in &mut self.layers {
            layer.pixels = resize_image(&layer.pixels, new_w, new_h, percent, resample);
            layer.mask = layer
                .mask
                .as_ref()
                .map(|m| resize_image(m, new_w, new_h, percent, resample));
        }

        self.width = new_w;
        self.height = new_h;
        self.selection = None;
    }
}

fn scaled_dimension(size: u32, percent: u32) -> u32 {
    ((size as u64 * percent as u64 + 50) / 100).max(1) as u32
}

fn resize_image<P>(
    img: &ImageBuffer<P, Vec<u8>>,
    width: u32,
    height: u32,
    percent: u32,
    resample: Resample,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    match resample {
        Resample::NearestNeighbor if percent % 100 == 0 => replicate(img, percent / 100),
        Resample::NearestNeighbor => imageops::resize(img, width, height, imageops::FilterType::Nearest),
        Resample::Bilinear => imageops::resize(img, width, height, imageops::FilterType::Triangle),
    }
}

/// Integer upscale by pixel replication.
fn replicate<P>(img: &ImageBuffer<P, Vec<u8>>, factor: u32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let factor = factor.max(1);
    ImageBuffer::from_fn(img.width() * factor, img.height() * factor, |x, y| {
        *img.get_pixel(x / factor, y / factor)
    })
}

/// Source-over composite `top` onto `bottom` (straight alpha).
pub fn composite_over(bottom: &RgbaImage, top: &RgbaImage) -> RgbaImage {
    let mut out = bottom.clone();
    for (x, y, dst) in out.enumerate_pixels_mut() {
        *dst = blend_pixel(*dst, *top.get_pixel(x, y));
    }
    out
}

fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    if sa >= 1.0 {
        return src;
    }

    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
