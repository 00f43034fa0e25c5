//! Copies a window's pixels out of a device context into an owned surface.

use crate::backend::scoped::{MemoryDc, OwnedBitmap, SourceDc};
use crate::backend::{CaptureBackend, WindowHandle};
use crate::error::CaptureError;

use super::geometry::Rect;
use super::strategy::CaptureStrategy;
use super::surface::Surface;

/// Captures `rect` of `window` into a new 32-bit surface.
///
/// With [`CaptureStrategy::ScreenSurface`] the pixels come from the desktop
/// at `rect`'s screen position, and the window is first raised to the top of
/// the z-order so nothing covers it. Callers must tolerate that z-order
/// change. With [`CaptureStrategy::WindowSurface`] the pixels come from the
/// window's own DC starting at its top-left corner.
///
/// Every DC and bitmap acquired here is released before returning, whether
/// or not the capture succeeds.
pub fn capture_surface<B: CaptureBackend + ?Sized>(
    backend: &B,
    window: WindowHandle,
    rect: Rect,
    strategy: CaptureStrategy,
) -> Result<Surface, CaptureError> {
    if rect.is_empty() {
        return Err(CaptureError::EmptyRegion(rect));
    }

    let (width, height) = (rect.width(), rect.height());

    let (source, (src_x, src_y)) = match strategy {
        CaptureStrategy::ScreenSurface => {
            let source = SourceDc::screen(backend)?;
            backend.bring_to_top(window);
            (source, (rect.left, rect.top))
        }
        CaptureStrategy::WindowSurface => (SourceDc::window(backend, window)?, (0, 0)),
    };

    let memory = MemoryDc::compatible(backend, source.handle())?;
    let bitmap = OwnedBitmap::compatible(backend, source.handle(), width, height)?;

    backend.blit(
        memory.handle(),
        bitmap.handle(),
        source.handle(),
        src_x,
        src_y,
        width,
        height,
    )?;

    let surface = backend.read_bitmap(memory.handle(), bitmap.handle(), width, height)?;
    log::debug!(
        "Captured {}x{} from {:?} at ({}, {}) via {:?}",
        width,
        height,
        window,
        src_x,
        src_y,
        strategy
    );

    Ok(surface)
}
