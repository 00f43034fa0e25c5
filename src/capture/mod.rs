//! Window and cursor capture.
//!
//! This module provides:
//! - Maximized-window rect correction (`geometry`)
//! - Capture strategy selection (`strategy`)
//! - Device-context copies into owned surfaces (`screenshot`)
//! - Cursor decoding (`cursor`)
//! - [`Capturer`], which ties them together

pub mod cursor;
pub mod geometry;
pub mod screenshot;
pub mod strategy;
pub mod surface;

pub use cursor::{decode_cursor, split_monochrome};
pub use geometry::{correct, maximized_deltas, CompositorTier, EdgeDeltas, Rect};
pub use screenshot::capture_surface;
pub use strategy::{select_strategy, CaptureStrategy};
pub use surface::{mono_stride, CursorImage, Mask, PixelFormat, Surface};

use crate::backend::{CaptureBackend, CursorBackend, WindowHandle};
use crate::error::{CaptureError, DecodeError, SnapError};

/// The region and strategy a window capture will use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapturePlan {
    pub rect: Rect,
    pub strategy: CaptureStrategy,
    /// Window rect as reported by the OS, before correction.
    pub window_rect: Rect,
}

impl CapturePlan {
    /// Screen position of the captured surface's pixel (0, 0).
    ///
    /// Window-surface copies start at the window's own origin, which differs
    /// from the corrected rect for maximized windows.
    pub fn surface_origin(&self) -> (i32, i32) {
        match self.strategy {
            CaptureStrategy::ScreenSurface => (self.rect.left, self.rect.top),
            CaptureStrategy::WindowSurface => (self.window_rect.left, self.window_rect.top),
        }
    }
}

/// A cursor image together with where it sits on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorSnapshot {
    pub image: CursorImage,
    /// Screen position of the hotspot.
    pub position: (i32, i32),
    pub showing: bool,
}

impl CursorSnapshot {
    /// Screen position of the cursor image's top-left corner.
    pub fn top_left(&self) -> (i32, i32) {
        let (hx, hy) = self.image.hotspot();
        (self.position.0 - hx as i32, self.position.1 - hy as i32)
    }
}

/// Entry point for window and cursor captures.
///
/// Holds no state between calls apart from the backend and the compositor
/// tier. Calls must not overlap.
pub struct Capturer<B> {
    backend: B,
    tier: CompositorTier,
}

impl<B: CaptureBackend> Capturer<B> {
    /// Creates a capturer using the compositor tier reported by `backend`.
    pub fn new(backend: B) -> Self {
        let tier = backend.compositor_tier();
        Self { backend, tier }
    }

    /// Computes the corrected rect and strategy for `window` without
    /// touching any device context.
    pub fn plan(&self, window: WindowHandle) -> Result<CapturePlan, CaptureError> {
        let window_rect = self.backend.window_rect(window)?;
        let maximized = self.backend.is_maximized(window);
        let rect = correct(window_rect, maximized, self.tier);
        let strategy = select_strategy(&rect, &self.backend.virtual_screen_rect());

        log::debug!(
            "Window {:?}: rect {:?} maximized={} -> {:?} via {:?}",
            window,
            window_rect,
            maximized,
            rect,
            strategy
        );

        Ok(CapturePlan {
            rect,
            strategy,
            window_rect,
        })
    }

    /// Captures the visible contents of `window`.
    ///
    /// May raise the window to the top of the z-order; see
    /// [`capture_surface`].
    pub fn capture_window(&self, window: WindowHandle) -> Result<Surface, CaptureError> {
        let plan = self.plan(window)?;
        capture_surface(&self.backend, window, plan.rect, plan.strategy)
    }
}

impl<B> Capturer<B> {
    /// Overrides the compositor tier used for maximized windows.
    pub fn with_tier(mut self, tier: CompositorTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn tier(&self) -> CompositorTier {
        self.tier
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: CursorBackend> Capturer<B> {
    /// Decodes the current system cursor.
    pub fn capture_cursor(&self) -> Result<CursorImage, DecodeError> {
        Ok(self.capture_cursor_at()?.image)
    }

    /// Decodes the current system cursor and reports its screen position.
    pub fn capture_cursor_at(&self) -> Result<CursorSnapshot, DecodeError> {
        let info = self.backend.current_cursor()?;
        let image = decode_cursor(&self.backend, info.handle)?;
        Ok(CursorSnapshot {
            image,
            position: info.position,
            showing: info.showing,
        })
    }
}

impl<B: CaptureBackend + CursorBackend> Capturer<B> {
    /// Captures `window` and draws the cursor on top when it is visible.
    ///
    /// The cursor is read after the window pixels, so both reflect the same
    /// moment as closely as the OS allows.
    pub fn capture_window_with_cursor(&self, window: WindowHandle) -> Result<Surface, SnapError> {
        let plan = self.plan(window)?;
        let mut surface = capture_surface(&self.backend, window, plan.rect, plan.strategy)?;

        let cursor = self.capture_cursor_at()?;
        if cursor.showing {
            let (x, y) = cursor.top_left();
            let (ox, oy) = plan.surface_origin();
            surface.overlay_cursor(&cursor.image, x - ox, y - oy);
        } else {
            log::debug!("Cursor hidden, skipping overlay");
        }

        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{screen_pixel, window_pixel, FailAt, FakeBackend};

    fn assert_clean(backend: &FakeBackend) {
        assert_eq!(backend.outstanding_dcs(), 0);
        assert_eq!(backend.outstanding_bitmaps(), 0);
        assert_eq!(backend.double_releases(), 0);
    }

    #[test]
    fn test_maximized_window_on_modern_tier() {
        let mut backend = FakeBackend::new();
        backend.window_rect = Rect::new(0, 0, 800, 600);
        backend.screen_rect = Rect::new(0, 0, 1920, 1080);
        backend.maximized = true;
        let capturer = Capturer::new(backend);

        let plan = capturer.plan(capturer.backend().window).unwrap();
        assert_eq!(plan.rect, Rect::new(8, 8, 792, 592));
        assert_eq!(plan.strategy, CaptureStrategy::ScreenSurface);

        let surface = capturer.capture_window(capturer.backend().window).unwrap();
        assert_eq!(surface.dimensions(), (784, 584));
        assert_eq!(surface.bgra_at(0, 0), screen_pixel(8, 8));
        assert_clean(capturer.backend());
    }

    #[test]
    fn test_on_screen_window_uses_screen_surface() {
        let mut backend = FakeBackend::new();
        backend.window_rect = Rect::new(100, 100, 300, 300);
        backend.screen_rect = Rect::new(0, 0, 1920, 1080);
        let capturer = Capturer::new(backend);

        let plan = capturer.plan(capturer.backend().window).unwrap();
        assert_eq!(plan.strategy, CaptureStrategy::ScreenSurface);
        assert_eq!(plan.rect, Rect::new(100, 100, 300, 300));
    }

    #[test]
    fn test_off_screen_window_uses_window_surface() {
        let mut backend = FakeBackend::new();
        backend.window_rect = Rect::new(-50, 0, 300, 300);
        backend.screen_rect = Rect::new(0, 0, 1920, 1080);
        let capturer = Capturer::new(backend);

        let surface = capturer.capture_window(capturer.backend().window).unwrap();
        assert_eq!(surface.dimensions(), (350, 300));
        assert_eq!(surface.bgra_at(1, 2), window_pixel(1, 2));
        assert!(capturer.backend().raised().is_empty());
        assert_clean(capturer.backend());
    }

    #[test]
    fn test_tier_override() {
        let mut backend = FakeBackend::new();
        backend.window_rect = Rect::new(-4, -4, 1028, 772);
        backend.screen_rect = Rect::new(0, 0, 1024, 768);
        backend.maximized = true;
        let capturer = Capturer::new(backend).with_tier(CompositorTier::Legacy);

        assert_eq!(capturer.tier(), CompositorTier::Legacy);
        let plan = capturer.plan(capturer.backend().window).unwrap();
        assert_eq!(plan.rect, Rect::new(-8, 0, 1032, 768));
        // The legacy correction widens the rect past the screen.
        assert_eq!(plan.strategy, CaptureStrategy::WindowSurface);
    }

    #[test]
    fn test_invalid_window_fails_without_acquiring() {
        let mut backend = FakeBackend::new();
        backend.fail_at = Some(FailAt::WindowRect);
        let capturer = Capturer::new(backend);

        let err = capturer
            .capture_window(capturer.backend().window)
            .unwrap_err();
        assert!(matches!(err, CaptureError::InvalidWindow(_)));
        assert_eq!(capturer.backend().acquired(), 0);
    }

    #[test]
    fn test_capture_cursor_reports_position() {
        let capturer = Capturer::new(FakeBackend::new());
        let snapshot = capturer.capture_cursor_at().unwrap();
        assert_eq!(snapshot.position, (30, 40));
        assert_eq!(snapshot.image.dimensions(), (2, 2));
        assert_eq!(capturer.capture_cursor().unwrap(), snapshot.image);
        assert_clean(capturer.backend());
    }

    #[test]
    fn test_capture_cursor_propagates_errors() {
        let mut backend = FakeBackend::new();
        backend.fail_at = Some(FailAt::CurrentCursor);
        let capturer = Capturer::new(backend);
        assert!(matches!(capturer.capture_cursor(), Err(DecodeError::NoCursor)));
    }

    #[test]
    fn test_capture_window_with_cursor_draws_at_hotspot() {
        let mut backend = FakeBackend::new();
        backend.window_rect = Rect::new(10, 20, 60, 50);
        // A 2x2 opaque white monochrome cursor with its hotspot at (1, 1).
        let mut plane = Surface::new(2, 4, PixelFormat::Mono1);
        plane.row_mut(2)[0] = 0b1100_0000;
        plane.row_mut(3)[0] = 0b1100_0000;
        backend.cursor.mask = Some(plane);
        backend.cursor.hotspot = (1, 1);
        backend.cursor.info.position = (31, 41);
        let capturer = Capturer::new(backend);

        let surface = capturer
            .capture_window_with_cursor(capturer.backend().window)
            .unwrap();

        // Top-left of the cursor lands at screen (30, 40) = surface (20, 20).
        assert_eq!(surface.bgra_at(20, 20)[..3], [255, 255, 255]);
        assert_eq!(surface.bgra_at(21, 21)[..3], [255, 255, 255]);
        assert_eq!(surface.bgra_at(19, 20), screen_pixel(29, 40));
        assert_eq!(surface.bgra_at(22, 21), screen_pixel(32, 41));
        assert_clean(capturer.backend());
    }

    #[test]
    fn test_cursor_on_window_surface_is_window_relative() {
        let mut backend = FakeBackend::new();
        backend.window_rect = Rect::new(-10, 20, 110, 100);
        backend.screen_rect = Rect::new(0, 0, 1024, 768);
        backend.maximized = true;
        // A 1x1 opaque white monochrome cursor.
        let mut plane = Surface::new(1, 2, PixelFormat::Mono1);
        plane.row_mut(1)[0] = 0b1000_0000;
        backend.cursor.mask = Some(plane);
        backend.cursor.hotspot = (0, 0);
        backend.cursor.info.position = (0, 30);
        let capturer = Capturer::new(backend).with_tier(CompositorTier::Legacy);

        let plan = capturer.plan(capturer.backend().window).unwrap();
        assert_eq!(plan.rect, Rect::new(-14, 24, 114, 96));
        assert_eq!(plan.strategy, CaptureStrategy::WindowSurface);
        assert_eq!(plan.surface_origin(), (-10, 20));

        let surface = capturer
            .capture_window_with_cursor(capturer.backend().window)
            .unwrap();

        // Screen (0, 30) is window-local (10, 10).
        let (width, height) = surface.dimensions();
        let white: Vec<(u32, u32)> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|&(x, y)| surface.bgra_at(x, y)[..3] == [255, 255, 255])
            .collect();
        assert_eq!(white, vec![(10, 10)]);
        assert_clean(capturer.backend());
    }

    #[test]
    fn test_hidden_cursor_is_not_drawn() {
        let mut backend = FakeBackend::new();
        let mut plane = Surface::new(2, 4, PixelFormat::Mono1);
        plane.row_mut(2)[0] = 0b1100_0000;
        backend.cursor.mask = Some(plane);
        backend.cursor.info.showing = false;
        let capturer = Capturer::new(backend);

        let with_cursor = capturer
            .capture_window_with_cursor(capturer.backend().window)
            .unwrap();
        let without = capturer.capture_window(capturer.backend().window).unwrap();
        assert_eq!(with_cursor, without);
    }

    #[test]
    fn test_cursor_failure_surfaces_as_snap_error() {
        let mut backend = FakeBackend::new();
        backend.fail_at = Some(FailAt::IconInfo);
        let capturer = Capturer::new(backend);

        let err = capturer
            .capture_window_with_cursor(capturer.backend().window)
            .unwrap_err();
        assert!(matches!(err, SnapError::Decode(DecodeError::IconInfo(_))));
        assert_clean(capturer.backend());
    }
}
