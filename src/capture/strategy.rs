//! Chooses how a window's pixels are read.

use super::geometry::Rect;

/// Where the capturer copies pixels from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureStrategy {
    /// Copy from the composited desktop. Shows translucency and blur applied
    /// by the compositor, but only works while the window is fully on screen.
    ScreenSurface,
    /// Copy from the window's own device context. Works for windows hanging
    /// off the screen edge, without compositor effects.
    WindowSurface,
}

/// Picks the capture strategy for a (corrected) window rect.
///
/// The window is on screen when adding it to the virtual screen rect does not
/// grow that rect.
pub fn select_strategy(window: &Rect, virtual_screen: &Rect) -> CaptureStrategy {
    if window.union(virtual_screen) == *virtual_screen {
        CaptureStrategy::ScreenSurface
    } else {
        CaptureStrategy::WindowSurface
    }
}
