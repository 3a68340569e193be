//! Export of split results.
//!
//! Each created layer is written as a PNG cropped to its region, and the run is
//! described in a JSON sidecar next to them.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, RgbaImage};
use serde::Serialize;

use crate::error::{Result, SplitError};
use crate::host::{RasterHost, Rect};
use crate::split::SplitReport;

/// Crop `pixels` to `rect`, clipped to the image. `None` if they do not overlap.
pub fn crop_to_bounds(pixels: &RgbaImage, rect: Rect) -> Option<(Rect, RgbaImage)> {
    let canvas = Rect::new(0, 0, pixels.width(), pixels.height());
    let clipped = canvas.intersect(&rect)?;
    let cropped = imageops::crop_imm(pixels, clipped.x, clipped.y, clipped.width, clipped.height);
    Some((clipped, cropped.to_image()))
}

/// Write the part of `pixels` inside `rect` to a PNG file.
///
/// Returns the rectangle actually written (clipped to the canvas).
pub fn write_layer_png(pixels: &RgbaImage, rect: Rect, path: &Path) -> Result<Rect> {
    let (clipped, cropped) = crop_to_bounds(pixels, rect).ok_or_else(|| SplitError::Io {
        path: path.to_path_buf(),
        message: format!("Region {} lies outside the canvas", rect),
    })?;

    cropped.save(path).map_err(|e| SplitError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write PNG: {}", e),
    })?;

    Ok(clipped)
}

/// JSON description of one split image.
#[derive(Debug, Clone, Serialize)]
pub struct SplitMeta {
    pub source: String,
    pub canvas: Size,
    pub discovered: usize,
    pub regions: Vec<ExportedRegion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedRegion>,
    pub meta: AppMeta,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// A layer written to disk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedRegion {
    pub name: String,
    pub file: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub original_index: usize,
}

/// A region that produced no layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRegion {
    pub index: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub original_index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppMeta {
    pub app: String,
    pub version: String,
}

impl Default for AppMeta {
    fn default() -> Self {
        Self {
            app: "pxsplit".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Write every created layer of `report` into `output` and return the metadata.
pub fn export_report(host: &RasterHost, report: &SplitReport, output: &Path) -> Result<SplitMeta> {
    if !output.exists() {
        fs::create_dir_all(output).map_err(|e| SplitError::Io {
            path: output.to_path_buf(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    let (width, height) = host
        .active_document()
        .map(|d| (d.width, d.height))
        .unwrap_or((0, 0));

    let mut regions = Vec::with_capacity(report.created.len());
    let mut used = HashSet::new();
    for layer in &report.created {
        let pixels = host.layer_pixels(layer.id).ok_or_else(|| SplitError::Io {
            path: output.to_path_buf(),
            message: format!("Layer '{}' disappeared before export", layer.name),
        })?;

        let file = unique_file_name(&layer.name, &mut used);
        let written = write_layer_png(&pixels, layer.bounds.rect(), &output.join(&file))?;

        regions.push(ExportedRegion {
            name: layer.name.clone(),
            file,
            x: written.x,
            y: written.y,
            width: written.width,
            height: written.height,
            original_index: layer.bounds.original_index,
        });
    }

    let failed = report
        .failures
        .iter()
        .map(|f| FailedRegion {
            index: f.index,
            x: f.bounds.x,
            y: f.bounds.y,
            width: f.bounds.width,
            height: f.bounds.height,
            original_index: f.bounds.original_index,
            reason: f.error.to_string(),
        })
        .collect();

    Ok(SplitMeta {
        source: report.source.name.clone(),
        canvas: Size { w: width, h: height },
        discovered: report.discovered,
        regions,
        failed,
        meta: AppMeta::default(),
    })
}

/// `<name>.png`, or `<name>-<n>.png` when layers share a name (e.g. without counts).
fn unique_file_name(name: &str, used: &mut HashSet<String>) -> String {
    let mut file = format!("{}.png", name);
    let mut n = 2;
    while !used.insert(file.clone()) {
        file = format!("{}-{}.png", name, n);
        n += 1;
    }
    file
}

/// Path of the JSON sidecar for a source layer.
pub fn meta_path(output: &Path, source: &str) -> PathBuf {
    output.join(format!("{}.json", source))
}

/// Write split metadata as pretty JSON.
pub fn write_split_json(meta: &SplitMeta, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(meta).map_err(|e| SplitError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to serialize split metadata: {}", e),
    })?;
    fs::write(path, json).map_err(|e| SplitError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write split metadata: {}", e),
    })?;
    Ok(())
}
