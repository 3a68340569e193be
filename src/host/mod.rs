//! Host session abstraction.
//!
//! The split pipeline never touches pixels directly. Everything it needs from
//! an image editor (alpha selections, a disposable working copy, path tracing,
//! layer duplication and masking) goes through the [`HostSession`] trait, so
//! the active document/layer/selection state is an explicit value threaded
//! through every call instead of ambient global state.

pub mod raster;

use std::fmt;

use thiserror::Error;

pub use raster::RasterHost;

/// Stable identifier of a layer within a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of an open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u32);

/// The kind of content a layer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Pixel,
    SmartObject,
    Text,
    Shape,
    Group,
    Adjustment,
    Background,
}

impl LayerKind {
    /// Whether a layer of this kind can be split into region layers.
    ///
    /// Only paintable rasters qualify: background layers cannot carry masks
    /// and vector/text/group layers have no alpha of their own to select.
    pub fn is_splittable(self) -> bool {
        matches!(self, LayerKind::Pixel | LayerKind::SmartObject)
    }

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Pixel => "pixel",
            LayerKind::SmartObject => "smart object",
            LayerKind::Text => "text",
            LayerKind::Shape => "shape",
            LayerKind::Group => "group",
            LayerKind::Adjustment => "adjustment",
            LayerKind::Background => "background",
        }
    }
}

/// Snapshot of a layer's identity as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    pub id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    pub visible: bool,
}

/// Axis-aligned pixel rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlap of two rectangles, or `None` if they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

/// Resampling used when resizing document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resample {
    /// Replicates pixels; never introduces partially transparent edges.
    NearestNeighbor,
    Bilinear,
}

/// How a selection is turned into a layer mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskMode {
    /// Pixels inside the selection stay visible.
    RevealSelection,
    /// Pixels inside the selection are hidden.
    HideSelection,
}

/// A traced anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub horizontal: f64,
    pub vertical: f64,
}

impl PathPoint {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// One closed outline within a path component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSubpath {
    pub points: Vec<PathPoint>,
}

/// One component of a traced work path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathComponent {
    pub subpaths: Vec<PathSubpath>,
}

/// Errors raised by a host while executing a command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("no active document")]
    NoActiveDocument,

    #[error("no active layer")]
    NoActiveLayer,

    #[error("layer {0} not found")]
    LayerNotFound(LayerId),

    #[error("document {0:?} not found")]
    DocumentNotFound(DocumentId),

    #[error("no active selection")]
    NoSelection,

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Operation(String),
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// The editor capabilities consumed by the split pipeline.
///
/// Calls operate on the host's active document and active layer, exactly one
/// call in flight at a time.
pub trait HostSession {
    /// Layers currently selected in the active document, topmost first.
    fn selected_layers(&self) -> Vec<LayerInfo>;

    /// Look up a layer in the active document.
    fn layer(&self, id: LayerId) -> HostResult<LayerInfo>;

    /// Make `id` the active (and only selected) layer.
    fn select_layer(&mut self, id: LayerId) -> HostResult<()>;

    /// Replace the selection with the non-transparent pixels of the active
    /// layer, optionally grown outward by `expand` pixels.
    fn select_transparency(&mut self, expand: Option<u32>) -> HostResult<()>;

    /// Bounds of the active selection, `None` when nothing is selected.
    fn selection_bounds(&self) -> HostResult<Option<Rect>>;

    /// Copy the active layer into a new temporary document and activate it.
    fn duplicate_canvas_as_temp_document(&mut self) -> HostResult<DocumentId>;

    /// Resize the active document's content by `scale_percent` on both axes.
    fn resize_content(&mut self, scale_percent: u32, resample: Resample) -> HostResult<()>;

    /// Close a temporary document without saving and reactivate the previous one.
    fn close_temp_document(&mut self, id: DocumentId) -> HostResult<()>;

    /// Convert the active selection into a work path and read back its structure.
    fn trace_selection_to_path(&mut self, tolerance: f64) -> HostResult<Vec<PathComponent>>;

    /// Replace the selection with a rectangle.
    fn set_rectangular_selection(&mut self, rect: Rect) -> HostResult<()>;

    fn clear_selection(&mut self) -> HostResult<()>;

    /// Duplicate the active layer; the copy becomes active.
    fn duplicate_layer(&mut self) -> HostResult<LayerId>;

    /// Add a layer mask built from the active selection to the active layer.
    fn mask_from_selection(&mut self, mode: MaskMode) -> HostResult<()>;

    /// Create an empty layer above the active layer; it becomes active.
    fn create_empty_layer(&mut self) -> HostResult<LayerId>;

    /// Merge the active layer into the one below it, returning the result.
    fn merge_down(&mut self) -> HostResult<LayerId>;

    fn rename_active_layer(&mut self, name: &str) -> HostResult<()>;

    fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> HostResult<()>;

    /// Start grouping subsequent edits into a single undo step.
    fn begin_history_group(&mut self, label: &str) -> HostResult<()>;

    fn end_history_group(&mut self) -> HostResult<()>;
}
