//! In-memory raster host.
//!
//! Implements [`HostSession`] over plain RGBA buffers so the split pipeline can
//! run as a standalone tool on PNG files. Layers are full-canvas images; the
//! selection is an 8-bit mask; history groups snapshot the layer stack.

pub mod document;
pub mod mask;
pub mod trace;

use std::path::Path;

use image::RgbaImage;

use crate::error::{Result, SplitError};

pub use document::{RasterDocument, RasterLayer};

use super::{
    DocumentId, HostError, HostResult, HostSession, LayerId, LayerInfo, LayerKind, MaskMode,
    PathComponent, PathPoint, PathSubpath, Rect, Resample,
};

/// An editor session holding one or more open documents.
#[derive(Debug, Default)]
pub struct RasterHost {
    documents: Vec<RasterDocument>,
    active: Option<DocumentId>,
    open_groups: Vec<(DocumentId, String)>,
    next_document: u32,
    next_layer: u32,
}

impl RasterHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a document holding `image` as a single selected pixel layer.
    pub fn from_image(name: impl Into<String>, image: RgbaImage) -> Self {
        let mut host = Self::new();
        let name = name.into();
        let doc = host.create_document(&name, image.width(), image.height());
        host.active = Some(doc);
        // Cannot fail: the document was just created and activated.
        if let Ok(id) = host.add_layer(&name, LayerKind::Pixel, image) {
            let _ = host.select_layer(id);
        }
        host
    }

    /// Load a PNG (or any format `image` decodes) as a one-layer document.
    ///
    /// The layer is named after the file stem.
    pub fn open(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .map_err(|e| SplitError::Io {
                path: path.to_path_buf(),
                message: format!("Failed to load image: {}", e),
            })?
            .to_rgba8();

        if img.width() == 0 || img.height() == 0 {
            return Err(SplitError::Parse {
                message: format!("Image has zero dimensions ({}x{})", img.width(), img.height()),
                help: Some("Input image must have non-zero width and height".to_string()),
            });
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("layer")
            .to_string();

        Ok(Self::from_image(name, img))
    }

    /// Add a layer on top of the active document's stack.
    pub fn add_layer(&mut self, name: &str, kind: LayerKind, pixels: RgbaImage) -> HostResult<LayerId> {
        let id = self.allocate_layer_id();
        let doc = self.active_doc_mut()?;
        if pixels.dimensions() != (doc.width, doc.height) {
            return Err(HostError::Operation(format!(
                "layer size {}x{} does not match canvas {}x{}",
                pixels.width(),
                pixels.height(),
                doc.width,
                doc.height
            )));
        }
        doc.layers.push(RasterLayer {
            id,
            name: name.to_string(),
            kind,
            visible: true,
            pixels,
            mask: None,
        });
        Ok(id)
    }

    /// Select several layers at once; the first becomes active.
    pub fn select_layers(&mut self, ids: &[LayerId]) -> HostResult<()> {
        let doc = self.active_doc_mut()?;
        if let Some(missing) = ids.iter().find(|id| doc.layer(**id).is_none()) {
            return Err(HostError::LayerNotFound(*missing));
        }
        doc.selected = ids.to_vec();
        Ok(())
    }

    pub fn active_document(&self) -> Option<&RasterDocument> {
        self.active.and_then(|id| self.document(id))
    }

    pub fn document(&self, id: DocumentId) -> Option<&RasterDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Layers of the active document, bottom to top.
    pub fn layers(&self) -> Vec<LayerInfo> {
        self.active_document()
            .map(|d| d.layers().iter().map(RasterLayer::info).collect())
            .unwrap_or_default()
    }

    /// Layer pixels with any mask applied.
    pub fn layer_pixels(&self, id: LayerId) -> Option<RgbaImage> {
        self.active_document()?.layer(id).map(RasterLayer::masked_pixels)
    }

    /// Revert the most recent completed history group of the active document.
    ///
    /// Returns the group's label, or `None` when there is nothing to undo.
    pub fn undo_last_group(&mut self) -> Option<String> {
        let doc = self.active_doc_mut().ok()?;
        let state = doc.history.pop()?;
        doc.layers = state.layers;
        doc.selected = state.selected;
        doc.selection = None;
        Some(state.label)
    }

    fn create_document(&mut self, name: &str, width: u32, height: u32) -> DocumentId {
        self.next_document += 1;
        let id = DocumentId(self.next_document);
        self.documents.push(RasterDocument::new(id, name, width, height));
        id
    }

    fn allocate_layer_id(&mut self) -> LayerId {
        self.next_layer += 1;
        LayerId(self.next_layer)
    }

    fn active_doc(&self) -> HostResult<&RasterDocument> {
        self.active_document().ok_or(HostError::NoActiveDocument)
    }

    fn active_doc_mut(&mut self) -> HostResult<&mut RasterDocument> {
        let id = self.active.ok_or(HostError::NoActiveDocument)?;
        self.documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(HostError::DocumentNotFound(id))
    }

    fn active_layer_index(&self) -> HostResult<usize> {
        let doc = self.active_doc()?;
        let id = doc.active_layer_id().ok_or(HostError::NoActiveLayer)?;
        doc.layer_index(id).ok_or(HostError::LayerNotFound(id))
    }

    /// Insert `layer` directly above index `below` and make it active.
    fn insert_above(&mut self, below: usize, layer: RasterLayer) -> HostResult<LayerId> {
        let id = layer.id;
        let doc = self.active_doc_mut()?;
        doc.layers.insert(below + 1, layer);
        doc.selected = vec![id];
        Ok(id)
    }
}

impl HostSession for RasterHost {
    fn selected_layers(&self) -> Vec<LayerInfo> {
        self.active_document()
            .map(|doc| {
                doc.selected
                    .iter()
                    .filter_map(|id| doc.layer(*id))
                    .map(RasterLayer::info)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn layer(&self, id: LayerId) -> HostResult<LayerInfo> {
        self.active_doc()?
            .layer(id)
            .map(RasterLayer::info)
            .ok_or(HostError::LayerNotFound(id))
    }

    fn select_layer(&mut self, id: LayerId) -> HostResult<()> {
        self.select_layers(&[id])
    }

    fn select_transparency(&mut self, expand: Option<u32>) -> HostResult<()> {
        let index = self.active_layer_index()?;
        let doc = self.active_doc_mut()?;
        let layer = &doc.layers[index];

        let mut selection = mask::alpha_mask(&layer.pixels, layer.mask.as_ref());
        if let Some(radius) = expand.filter(|r| *r > 0) {
            selection = mask::grow_mask(&selection, radius);
        }
        doc.selection = Some(selection);
        Ok(())
    }

    fn selection_bounds(&self) -> HostResult<Option<Rect>> {
        let doc = self.active_doc()?;
        Ok(doc.selection.as_ref().and_then(mask::mask_bounds))
    }

    fn duplicate_canvas_as_temp_document(&mut self) -> HostResult<DocumentId> {
        let index = self.active_layer_index()?;
        let source = self.active_doc()?;
        let source_id = source.id;
        let (width, height) = (source.width, source.height);
        let name = format!("{} (working copy)", source.name);
        let mut layer = source.layers[index].clone();

        layer.id = self.allocate_layer_id();
        let layer_id = layer.id;
        let doc_id = self.create_document(&name, width, height);
        if let Some(doc) = self.documents.iter_mut().find(|d| d.id == doc_id) {
            doc.layers.push(layer);
            doc.selected = vec![layer_id];
            doc.return_to = Some(source_id);
        }
        self.active = Some(doc_id);
        Ok(doc_id)
    }

    fn resize_content(&mut self, scale_percent: u32, resample: Resample) -> HostResult<()> {
        if scale_percent == 0 {
            return Err(HostError::Operation("resize to 0%".to_string()));
        }
        self.active_doc_mut()?.resize(scale_percent, resample);
        Ok(())
    }

    fn close_temp_document(&mut self, id: DocumentId) -> HostResult<()> {
        let pos = self
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or(HostError::DocumentNotFound(id))?;

        let doc = &self.documents[pos];
        if !doc.is_temporary() {
            return Err(HostError::Unsupported(format!(
                "document '{}' is not a temporary document",
                doc.name
            )));
        }

        let return_to = doc.return_to;
        self.documents.remove(pos);
        self.open_groups.retain(|(doc_id, _)| *doc_id != id);
        if self.active == Some(id) {
            self.active = return_to;
        }
        Ok(())
    }

    fn trace_selection_to_path(&mut self, tolerance: f64) -> HostResult<Vec<PathComponent>> {
        let doc = self.active_doc()?;
        let selection = doc.selection.as_ref().ok_or(HostError::NoSelection)?;

        let subpaths: Vec<PathSubpath> = trace::trace_outlines(selection, tolerance)
            .into_iter()
            .map(|outline| PathSubpath {
                points: outline
                    .into_iter()
                    .map(|(x, y)| PathPoint::new(x, y))
                    .collect(),
            })
            .collect();

        if subpaths.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![PathComponent { subpaths }])
    }

    fn set_rectangular_selection(&mut self, rect: Rect) -> HostResult<()> {
        let doc = self.active_doc_mut()?;
        doc.selection = Some(mask::rect_mask(doc.width, doc.height, rect));
        Ok(())
    }

    fn clear_selection(&mut self) -> HostResult<()> {
        self.active_doc_mut()?.selection = None;
        Ok(())
    }

    fn duplicate_layer(&mut self) -> HostResult<LayerId> {
        let index = self.active_layer_index()?;
        let id = self.allocate_layer_id();
        let mut copy = self.active_doc()?.layers[index].clone();
        copy.id = id;
        copy.name = format!("{} copy", copy.name);
        if copy.kind == LayerKind::Background {
            copy.kind = LayerKind::Pixel;
        }
        self.insert_above(index, copy)
    }

    fn mask_from_selection(&mut self, mode: MaskMode) -> HostResult<()> {
        let index = self.active_layer_index()?;
        let doc = self.active_doc_mut()?;
        let selection = doc.selection.as_ref().ok_or(HostError::NoSelection)?;

        let new_mask = match mode {
            MaskMode::RevealSelection => selection.clone(),
            MaskMode::HideSelection => mask::invert_mask(selection),
        };

        let layer = &mut doc.layers[index];
        if layer.kind == LayerKind::Background {
            return Err(HostError::Unsupported(
                "background layers cannot have masks".to_string(),
            ));
        }
        layer.mask = Some(match &layer.mask {
            Some(existing) => mask::intersect_masks(existing, &new_mask),
            None => new_mask,
        });
        Ok(())
    }

    fn create_empty_layer(&mut self) -> HostResult<LayerId> {
        let index = self.active_layer_index()?;
        let id = self.allocate_layer_id();
        let doc = self.active_doc()?;
        let layer = RasterLayer {
            id,
            name: format!("Layer {}", doc.layers.len() + 1),
            kind: LayerKind::Pixel,
            visible: true,
            pixels: RgbaImage::new(doc.width, doc.height),
            mask: None,
        };
        self.insert_above(index, layer)
    }

    fn merge_down(&mut self) -> HostResult<LayerId> {
        let index = self.active_layer_index()?;
        if index == 0 {
            return Err(HostError::Operation("no layer below to merge into".to_string()));
        }

        let doc = self.active_doc_mut()?;
        let top = doc.layers.remove(index);
        let bottom = &mut doc.layers[index - 1];

        let mut merged = bottom.masked_pixels();
        if top.visible {
            merged = document::composite_over(&merged, &top.masked_pixels());
        }
        bottom.pixels = merged;
        bottom.mask = None;

        let id = bottom.id;
        doc.selected = vec![id];
        Ok(id)
    }

    fn rename_active_layer(&mut self, name: &str) -> HostResult<()> {
        let index = self.active_layer_index()?;
        self.active_doc_mut()?.layers[index].name = name.to_string();
        Ok(())
    }

    fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> HostResult<()> {
        let layer = self
            .active_doc_mut()?
            .layer_mut(id)
            .ok_or(HostError::LayerNotFound(id))?;
        layer.visible = visible;
        Ok(())
    }

    fn begin_history_group(&mut self, label: &str) -> HostResult<()> {
        let doc = self.active_doc_mut()?;
        let doc_id = doc.id;
        // Nested groups fold into the outermost one.
        if !self.open_groups.iter().any(|(id, _)| *id == doc_id) {
            let doc = self.active_doc_mut()?;
            let state = document::HistoryState {
                label: label.to_string(),
                layers: doc.layers.clone(),
                selected: doc.selected.clone(),
            };
            doc.history.push(state);
        }
        self.open_groups.push((doc_id, label.to_string()));
        Ok(())
    }

    fn end_history_group(&mut self) -> HostResult<()> {
        self.open_groups
            .pop()
            .map(|_| ())
            .ok_or_else(|| HostError::Operation("no open history group".to_string()))
    }
}
