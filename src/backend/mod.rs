//! The native drawing API seen by the capture engine.
//!
//! The engine only talks to the OS through [`CaptureBackend`] and
//! [`CursorBackend`]. Every method that hands out a handle has a matching
//! release method, and the engine wraps each handle in a guard from
//! [`scoped`] as soon as it is acquired.

#[cfg(test)]
pub mod fake;
#[cfg(windows)]
pub mod gdi;
pub mod scoped;

#[cfg(windows)]
pub use gdi::GdiBackend;

use crate::capture::{CompositorTier, Rect, Surface};
use crate::error::{CaptureError, DecodeError};

/// A native window. Owned by the OS; never closed by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// A native cursor. Owned by the OS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CursorHandle(pub isize);

/// A device context (screen, window or memory).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DcHandle(pub isize);

/// A GDI bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitmapHandle(pub isize);

/// State of the system cursor at the time of the query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorInfo {
    pub handle: CursorHandle,
    /// Screen position of the cursor's hotspot.
    pub position: (i32, i32),
    pub showing: bool,
}

/// Bitmaps making up a cursor. The caller owns both bitmaps and must delete
/// them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IconInfo {
    /// Absent for monochrome cursors.
    pub color: Option<BitmapHandle>,
    pub mask: Option<BitmapHandle>,
    pub hotspot: (u32, u32),
}

/// Bitmap disposal shared by both backends.
pub trait GdiObjects {
    fn delete_bitmap(&self, bitmap: BitmapHandle);
}

/// Window geometry and device-context operations used by window capture.
pub trait CaptureBackend: GdiObjects {
    fn window_rect(&self, window: WindowHandle) -> Result<Rect, CaptureError>;

    fn is_maximized(&self, window: WindowHandle) -> bool;

    /// Bounding rect of all monitors.
    fn virtual_screen_rect(&self) -> Rect;

    fn compositor_tier(&self) -> CompositorTier;

    /// Raises `window` to the top of the z-order.
    fn bring_to_top(&self, window: WindowHandle);

    /// DC for the whole desktop. Release with `release_dc(None, ..)`.
    fn screen_dc(&self) -> Result<DcHandle, CaptureError>;

    /// DC covering the full window including its frame. Release with
    /// `release_dc(Some(window), ..)`.
    fn window_dc(&self, window: WindowHandle) -> Result<DcHandle, CaptureError>;

    fn release_dc(&self, owner: Option<WindowHandle>, dc: DcHandle);

    /// Memory DC compatible with `source`. Release with `delete_dc`.
    fn create_memory_dc(&self, source: DcHandle) -> Result<DcHandle, CaptureError>;

    fn delete_dc(&self, dc: DcHandle);

    /// Bitmap compatible with `source`. Release with `delete_bitmap`.
    fn create_bitmap(
        &self,
        source: DcHandle,
        width: i32,
        height: i32,
    ) -> Result<BitmapHandle, CaptureError>;

    /// Opaque copy of a `width` x `height` block at `(src_x, src_y)` in
    /// `source` into `bitmap`, using `memory_dc` as the destination DC. The
    /// DC's previous selection is restored before returning.
    #[allow(clippy::too_many_arguments)]
    fn blit(
        &self,
        memory_dc: DcHandle,
        bitmap: BitmapHandle,
        source: DcHandle,
        src_x: i32,
        src_y: i32,
        width: i32,
        height: i32,
    ) -> Result<(), CaptureError>;

    /// Reads `bitmap` back as a 32-bit surface.
    fn read_bitmap(
        &self,
        dc: DcHandle,
        bitmap: BitmapHandle,
        width: i32,
        height: i32,
    ) -> Result<Surface, CaptureError>;
}

/// Cursor queries used by the cursor decoder.
pub trait CursorBackend: GdiObjects {
    fn current_cursor(&self) -> Result<CursorInfo, DecodeError>;

    /// Looks up the bitmaps behind `cursor`. Both returned bitmaps belong to
    /// the caller.
    fn icon_info(&self, cursor: CursorHandle) -> Result<IconInfo, DecodeError>;

    /// Reads a color bitmap as a [`PixelFormat::Bgra32`](crate::capture::PixelFormat) surface.
    fn read_color_bitmap(&self, bitmap: BitmapHandle) -> Result<Surface, DecodeError>;

    /// Reads a bitmap as a [`PixelFormat::Mono1`](crate::capture::PixelFormat) surface.
    fn read_mono_bitmap(&self, bitmap: BitmapHandle) -> Result<Surface, DecodeError>;
}
