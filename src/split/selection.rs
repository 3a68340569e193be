//! Transparency selection builder.

use crate::error::{Result, SplitError};
use crate::host::{HostSession, Rect};

/// Select the active layer's non-transparent pixels.
///
/// With `tolerance >= 2` the selection is grown by `tolerance / 2` pixels.
/// Fails with [`SplitError::Selection`] when nothing ends up selected.
pub fn build_transparency_selection<H: HostSession + ?Sized>(
    host: &mut H,
    tolerance: u32,
) -> Result<Rect> {
    let expand = (tolerance >= 2).then_some(tolerance / 2);
    host.select_transparency(expand)?;

    host.selection_bounds()?.ok_or_else(|| SplitError::Selection {
        message: "layer is fully transparent".to_string(),
    })
}
