//! Guards that give native handles back to the backend when dropped.

use super::{BitmapHandle, CaptureBackend, DcHandle, GdiObjects, WindowHandle};
use crate::error::CaptureError;

/// A screen or window DC obtained with `GetDC`/`GetWindowDC`.
pub struct SourceDc<'a, B: CaptureBackend + ?Sized> {
    backend: &'a B,
    owner: Option<WindowHandle>,
    dc: DcHandle,
}

impl<'a, B: CaptureBackend + ?Sized> SourceDc<'a, B> {
    pub fn screen(backend: &'a B) -> Result<Self, CaptureError> {
        let dc = backend.screen_dc()?;
        Ok(Self {
            backend,
            owner: None,
            dc,
        })
    }

    pub fn window(backend: &'a B, window: WindowHandle) -> Result<Self, CaptureError> {
        let dc = backend.window_dc(window)?;
        Ok(Self {
            backend,
            owner: Some(window),
            dc,
        })
    }

    pub fn handle(&self) -> DcHandle {
        self.dc
    }
}

impl<B: CaptureBackend + ?Sized> Drop for SourceDc<'_, B> {
    fn drop(&mut self) {
        self.backend.release_dc(self.owner, self.dc);
    }
}

/// A memory DC created with `CreateCompatibleDC`.
pub struct MemoryDc<'a, B: CaptureBackend + ?Sized> {
    backend: &'a B,
    dc: DcHandle,
}

impl<'a, B: CaptureBackend + ?Sized> MemoryDc<'a, B> {
    pub fn compatible(backend: &'a B, source: DcHandle) -> Result<Self, CaptureError> {
        let dc = backend.create_memory_dc(source)?;
        Ok(Self { backend, dc })
    }

    pub fn handle(&self) -> DcHandle {
        self.dc
    }
}

impl<B: CaptureBackend + ?Sized> Drop for MemoryDc<'_, B> {
    fn drop(&mut self) {
        self.backend.delete_dc(self.dc);
    }
}

/// A bitmap this crate is responsible for deleting.
pub struct OwnedBitmap<'a, B: GdiObjects + ?Sized> {
    backend: &'a B,
    bitmap: BitmapHandle,
}

impl<'a, B: GdiObjects + ?Sized> OwnedBitmap<'a, B> {
    /// Takes ownership of a bitmap handed out by the backend.
    pub fn adopt(backend: &'a B, bitmap: BitmapHandle) -> Self {
        Self { backend, bitmap }
    }

    pub fn handle(&self) -> BitmapHandle {
        self.bitmap
    }
}

impl<'a, B: CaptureBackend + ?Sized> OwnedBitmap<'a, B> {
    pub fn compatible(
        backend: &'a B,
        source: DcHandle,
        width: i32,
        height: i32,
    ) -> Result<Self, CaptureError> {
        let bitmap = backend.create_bitmap(source, width, height)?;
        Ok(Self::adopt(backend, bitmap))
    }
}

impl<B: GdiObjects + ?Sized> Drop for OwnedBitmap<'_, B> {
    fn drop(&mut self) {
        self.backend.delete_bitmap(self.bitmap);
    }
}
