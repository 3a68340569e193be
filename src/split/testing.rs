//! Test doubles for the split pipeline.

use image::{Rgba, RgbaImage};

use crate::host::{
    DocumentId, HostError, HostResult, HostSession, LayerId, LayerInfo, LayerKind, MaskMode,
    PathComponent, PathPoint, PathSubpath, Rect, Resample,
};

/// Transparent canvas with opaque rectangles painted on it.
pub fn sheet(width: u32, height: u32, rects: &[Rect]) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for rect in rects {
        for y in rect.y..rect.bottom().min(height) {
            for x in rect.x..rect.right().min(width) {
                img.put_pixel(x, y, Rgba([180, 90, 30, 255]));
            }
        }
    }
    img
}

/// Scripted host: reports fixed regions and records every call.
///
/// Regions are traced as their supersampled corner outlines. Individual steps
/// can be made to fail to exercise error paths.
#[derive(Debug)]
pub struct FakeHost {
    regions: Vec<Rect>,
    layers: Vec<LayerInfo>,
    active: usize,
    selection: Option<Rect>,
    next_id: u32,
    rect_selection_calls: usize,

    pub fail_trace: Option<HostError>,
    pub fail_merge: Option<HostError>,
    pub trace_nothing: bool,
    /// Rectangle selection calls (0-based) that end up selecting nothing.
    pub empty_rect_selections: Vec<usize>,

    pub transparency_expansions: Vec<Option<u32>>,
    pub resizes: Vec<(u32, Resample)>,
    pub trace_tolerances: Vec<f64>,
    pub open_temp_documents: usize,
    pub closed_temp_documents: usize,
    pub open_history_groups: usize,
    pub layers_created: usize,
}

impl FakeHost {
    pub fn new(regions: Vec<Rect>) -> Self {
        Self {
            regions,
            layers: vec![LayerInfo {
                id: LayerId(1),
                name: "Art".to_string(),
                kind: LayerKind::Pixel,
                visible: true,
            }],
            active: 0,
            selection: None,
            next_id: 1,
            rect_selection_calls: 0,
            fail_trace: None,
            fail_merge: None,
            trace_nothing: false,
            empty_rect_selections: Vec::new(),
            transparency_expansions: Vec::new(),
            resizes: Vec::new(),
            trace_tolerances: Vec::new(),
            open_temp_documents: 0,
            closed_temp_documents: 0,
            open_history_groups: 0,
            layers_created: 0,
        }
    }

    pub fn source(&self) -> LayerInfo {
        self.layers[0].clone()
    }

    pub fn source_visible(&self) -> bool {
        self.layers[0].visible
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    fn push_layer(&mut self, name: String) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(
            self.active + 1,
            LayerInfo {
                id,
                name,
                kind: LayerKind::Pixel,
                visible: true,
            },
        );
        self.active += 1;
        id
    }
}

impl HostSession for FakeHost {
    fn selected_layers(&self) -> Vec<LayerInfo> {
        vec![self.layers[self.active].clone()]
    }

    fn layer(&self, id: LayerId) -> HostResult<LayerInfo> {
        self.layers
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or(HostError::LayerNotFound(id))
    }

    fn select_layer(&mut self, id: LayerId) -> HostResult<()> {
        self.active = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(HostError::LayerNotFound(id))?;
        Ok(())
    }

    fn select_transparency(&mut self, expand: Option<u32>) -> HostResult<()> {
        self.transparency_expansions.push(expand);
        self.selection = self.regions.first().copied();
        Ok(())
    }

    fn selection_bounds(&self) -> HostResult<Option<Rect>> {
        Ok(self.selection)
    }

    fn duplicate_canvas_as_temp_document(&mut self) -> HostResult<DocumentId> {
        self.open_temp_documents += 1;
        Ok(DocumentId(99))
    }

    fn resize_content(&mut self, scale_percent: u32, resample: Resample) -> HostResult<()> {
        self.resizes.push((scale_percent, resample));
        Ok(())
    }

    fn close_temp_document(&mut self, _id: DocumentId) -> HostResult<()> {
        self.open_temp_documents -= 1;
        self.closed_temp_documents += 1;
        Ok(())
    }

    fn trace_selection_to_path(&mut self, tolerance: f64) -> HostResult<Vec<PathComponent>> {
        self.trace_tolerances.push(tolerance);
        if let Some(err) = self.fail_trace.clone() {
            return Err(err);
        }
        if self.trace_nothing {
            return Ok(Vec::new());
        }

        let subpaths = self
            .regions
            .iter()
            .map(|r| {
                let (x0, y0) = (r.x as f64 * 2.0, r.y as f64 * 2.0);
                let (x1, y1) = (r.right() as f64 * 2.0, r.bottom() as f64 * 2.0);
                PathSubpath {
                    points: vec![
                        PathPoint::new(x0, y0),
                        PathPoint::new(x1, y0),
                        PathPoint::new(x1, y1),
                        PathPoint::new(x0, y1),
                    ],
                }
            })
            .collect();
        Ok(vec![PathComponent { subpaths }])
    }

    fn set_rectangular_selection(&mut self, rect: Rect) -> HostResult<()> {
        let call = self.rect_selection_calls;
        self.rect_selection_calls += 1;
        self.selection = if self.empty_rect_selections.contains(&call) {
            None
        } else {
            Some(rect)
        };
        Ok(())
    }

    fn clear_selection(&mut self) -> HostResult<()> {
        self.selection = None;
        Ok(())
    }

    fn duplicate_layer(&mut self) -> HostResult<LayerId> {
        let name = format!("{} copy", self.layers[self.active].name);
        Ok(self.push_layer(name))
    }

    fn mask_from_selection(&mut self, _mode: MaskMode) -> HostResult<()> {
        self.selection.map(|_| ()).ok_or(HostError::NoSelection)
    }

    fn create_empty_layer(&mut self) -> HostResult<LayerId> {
        Ok(self.push_layer("Layer".to_string()))
    }

    fn merge_down(&mut self) -> HostResult<LayerId> {
        if let Some(err) = self.fail_merge.clone() {
            return Err(err);
        }
        self.layers.remove(self.active);
        self.active -= 1;
        Ok(self.layers[self.active].id)
    }

    fn rename_active_layer(&mut self, name: &str) -> HostResult<()> {
        self.layers[self.active].name = name.to_string();
        self.layers_created += 1;
        Ok(())
    }

    fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> HostResult<()> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(HostError::LayerNotFound(id))?;
        layer.visible = visible;
        Ok(())
    }

    fn begin_history_group(&mut self, _label: &str) -> HostResult<()> {
        self.open_history_groups += 1;
        Ok(())
    }

    fn end_history_group(&mut self) -> HostResult<()> {
        self.open_history_groups -= 1;
        Ok(())
    }
}
