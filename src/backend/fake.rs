//! In-memory backend for tests. Tracks every handle it hands out so tests can
//! check that the engine gives all of them back.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{
    BitmapHandle, CaptureBackend, CursorBackend, CursorHandle, CursorInfo, DcHandle, GdiObjects,
    IconInfo, WindowHandle,
};
use crate::capture::{CompositorTier, PixelFormat, Rect, Surface};
use crate::error::{CaptureError, DecodeError};

/// Which backend call should fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailAt {
    WindowRect,
    ScreenDc,
    WindowDc,
    MemoryDc,
    Bitmap,
    Blit,
    Read,
    CurrentCursor,
    IconInfo,
    CursorBitmap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DcKind {
    Screen,
    Window(WindowHandle),
    Memory,
}

#[derive(Default)]
struct Ledger {
    next_handle: isize,
    dcs: HashMap<DcHandle, DcKind>,
    bitmaps: HashMap<BitmapHandle, Option<Surface>>,
    acquired: usize,
    double_releases: usize,
    raised: Vec<WindowHandle>,
    blits: Vec<(i32, i32, i32, i32)>,
}

impl Ledger {
    fn next(&mut self) -> isize {
        self.next_handle += 1;
        self.acquired += 1;
        self.next_handle
    }
}

/// Bitmaps the fake OS reports for its one cursor.
#[derive(Clone, Debug)]
pub struct FakeCursor {
    pub info: CursorInfo,
    pub color: Option<Surface>,
    pub mask: Option<Surface>,
    pub hotspot: (u32, u32),
}

pub struct FakeBackend {
    pub window: WindowHandle,
    pub window_rect: Rect,
    pub maximized: bool,
    pub screen_rect: Rect,
    pub tier: CompositorTier,
    pub cursor: FakeCursor,
    pub fail_at: Option<FailAt>,
    ledger: RefCell<Ledger>,
}

/// Desktop pixel at virtual-screen coordinates.
pub fn screen_pixel(x: i32, y: i32) -> [u8; 4] {
    [x as u8, y as u8, 0xAA, 0]
}

/// Window pixel at window-local coordinates.
pub fn window_pixel(x: i32, y: i32) -> [u8; 4] {
    [x as u8, y as u8, 0x55, 0]
}

impl FakeBackend {
    pub fn new() -> Self {
        let mask = Surface::new(2, 4, PixelFormat::Mono1);
        Self {
            window: WindowHandle(42),
            window_rect: Rect::new(10, 20, 60, 50),
            maximized: false,
            screen_rect: Rect::new(0, 0, 200, 150),
            tier: CompositorTier::Modern,
            cursor: FakeCursor {
                info: CursorInfo {
                    handle: CursorHandle(7),
                    position: (30, 40),
                    showing: true,
                },
                color: None,
                mask: Some(mask),
                hotspot: (0, 0),
            },
            fail_at: None,
            ledger: RefCell::new(Ledger::default()),
        }
    }

    fn fails(&self, at: FailAt) -> bool {
        self.fail_at == Some(at)
    }

    /// Device contexts handed out and not yet released.
    pub fn outstanding_dcs(&self) -> usize {
        self.ledger.borrow().dcs.len()
    }

    /// Bitmaps handed out and not yet deleted.
    pub fn outstanding_bitmaps(&self) -> usize {
        self.ledger.borrow().bitmaps.len()
    }

    /// Total number of handles ever handed out.
    pub fn acquired(&self) -> usize {
        self.ledger.borrow().acquired
    }

    /// Releases of handles that were unknown or already released.
    pub fn double_releases(&self) -> usize {
        self.ledger.borrow().double_releases
    }

    pub fn raised(&self) -> Vec<WindowHandle> {
        self.ledger.borrow().raised.clone()
    }

    /// `(src_x, src_y, width, height)` of every blit.
    pub fn blits(&self) -> Vec<(i32, i32, i32, i32)> {
        self.ledger.borrow().blits.clone()
    }

    fn new_dc(&self, kind: DcKind) -> DcHandle {
        let mut ledger = self.ledger.borrow_mut();
        let dc = DcHandle(ledger.next());
        ledger.dcs.insert(dc, kind);
        dc
    }

    fn new_bitmap(&self, contents: Option<Surface>) -> BitmapHandle {
        let mut ledger = self.ledger.borrow_mut();
        let bitmap = BitmapHandle(ledger.next());
        ledger.bitmaps.insert(bitmap, contents);
        bitmap
    }

    fn bitmap_contents(&self, bitmap: BitmapHandle) -> Option<Option<Surface>> {
        self.ledger.borrow().bitmaps.get(&bitmap).cloned()
    }
}

impl GdiObjects for FakeBackend {
    fn delete_bitmap(&self, bitmap: BitmapHandle) {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.bitmaps.remove(&bitmap).is_none() {
            ledger.double_releases += 1;
        }
    }
}

impl CaptureBackend for FakeBackend {
    fn window_rect(&self, window: WindowHandle) -> Result<Rect, CaptureError> {
        if window != self.window || self.fails(FailAt::WindowRect) {
            return Err(CaptureError::InvalidWindow(window));
        }
        Ok(self.window_rect)
    }

    fn is_maximized(&self, _window: WindowHandle) -> bool {
        self.maximized
    }

    fn virtual_screen_rect(&self) -> Rect {
        self.screen_rect
    }

    fn compositor_tier(&self) -> CompositorTier {
        self.tier
    }

    fn bring_to_top(&self, window: WindowHandle) {
        self.ledger.borrow_mut().raised.push(window);
    }

    fn screen_dc(&self) -> Result<DcHandle, CaptureError> {
        if self.fails(FailAt::ScreenDc) {
            return Err(CaptureError::DeviceContext("screen"));
        }
        Ok(self.new_dc(DcKind::Screen))
    }

    fn window_dc(&self, window: WindowHandle) -> Result<DcHandle, CaptureError> {
        if window != self.window || self.fails(FailAt::WindowDc) {
            return Err(CaptureError::DeviceContext("window"));
        }
        Ok(self.new_dc(DcKind::Window(window)))
    }

    fn release_dc(&self, owner: Option<WindowHandle>, dc: DcHandle) {
        let mut ledger = self.ledger.borrow_mut();
        match ledger.dcs.remove(&dc) {
            Some(DcKind::Screen) if owner.is_none() => {}
            Some(DcKind::Window(w)) if owner == Some(w) => {}
            _ => ledger.double_releases += 1,
        }
    }

    fn create_memory_dc(&self, source: DcHandle) -> Result<DcHandle, CaptureError> {
        if self.fails(FailAt::MemoryDc) || !self.ledger.borrow().dcs.contains_key(&source) {
            return Err(CaptureError::DeviceContext("memory"));
        }
        Ok(self.new_dc(DcKind::Memory))
    }

    fn delete_dc(&self, dc: DcHandle) {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.dcs.remove(&dc) != Some(DcKind::Memory) {
            ledger.double_releases += 1;
        }
    }

    fn create_bitmap(
        &self,
        _source: DcHandle,
        width: i32,
        height: i32,
    ) -> Result<BitmapHandle, CaptureError> {
        if self.fails(FailAt::Bitmap) {
            return Err(CaptureError::Allocation { width, height });
        }
        Ok(self.new_bitmap(None))
    }

    fn blit(
        &self,
        memory_dc: DcHandle,
        bitmap: BitmapHandle,
        source: DcHandle,
        src_x: i32,
        src_y: i32,
        width: i32,
        height: i32,
    ) -> Result<(), CaptureError> {
        if self.fails(FailAt::Blit) {
            return Err(CaptureError::Copy("BitBlt failed".into()));
        }

        let source_kind = {
            let ledger = self.ledger.borrow();
            if ledger.dcs.get(&memory_dc) != Some(&DcKind::Memory)
                || !ledger.bitmaps.contains_key(&bitmap)
            {
                return Err(CaptureError::Copy("blit target was released".into()));
            }
            ledger
                .dcs
                .get(&source)
                .copied()
                .ok_or_else(|| CaptureError::Copy("blit source was released".into()))?
        };

        let mut surface = Surface::new(width as u32, height as u32, PixelFormat::Bgra32);
        for y in 0..height {
            let row = surface.row_mut(y as u32);
            for x in 0..width {
                let (sx, sy) = (src_x + x, src_y + y);
                let px = match source_kind {
                    DcKind::Screen => screen_pixel(sx, sy),
                    DcKind::Window(_) => window_pixel(sx, sy),
                    DcKind::Memory => [0; 4],
                };
                row[x as usize * 4..x as usize * 4 + 4].copy_from_slice(&px);
            }
        }

        let mut ledger = self.ledger.borrow_mut();
        ledger.bitmaps.insert(bitmap, Some(surface));
        ledger.blits.push((src_x, src_y, width, height));
        Ok(())
    }

    fn read_bitmap(
        &self,
        _dc: DcHandle,
        bitmap: BitmapHandle,
        width: i32,
        height: i32,
    ) -> Result<Surface, CaptureError> {
        if self.fails(FailAt::Read) {
            return Err(CaptureError::Copy("GetDIBits failed".into()));
        }
        match self.bitmap_contents(bitmap) {
            Some(Some(surface)) => Ok(surface),
            Some(None) => Ok(Surface::new(
                width as u32,
                height as u32,
                PixelFormat::Bgra32,
            )),
            None => Err(CaptureError::Copy("bitmap was released".into())),
        }
    }
}

impl CursorBackend for FakeBackend {
    fn current_cursor(&self) -> Result<CursorInfo, DecodeError> {
        if self.fails(FailAt::CurrentCursor) {
            return Err(DecodeError::NoCursor);
        }
        Ok(self.cursor.info)
    }

    fn icon_info(&self, cursor: CursorHandle) -> Result<IconInfo, DecodeError> {
        if cursor != self.cursor.info.handle {
            return Err(DecodeError::InvalidHandle(cursor));
        }
        if self.fails(FailAt::IconInfo) {
            return Err(DecodeError::IconInfo("GetIconInfo failed".into()));
        }
        Ok(IconInfo {
            color: self
                .cursor
                .color
                .clone()
                .map(|surface| self.new_bitmap(Some(surface))),
            mask: self
                .cursor
                .mask
                .clone()
                .map(|surface| self.new_bitmap(Some(surface))),
            hotspot: self.cursor.hotspot,
        })
    }

    fn read_color_bitmap(&self, bitmap: BitmapHandle) -> Result<Surface, DecodeError> {
        if self.fails(FailAt::CursorBitmap) {
            return Err(DecodeError::Bitmap("GetDIBits failed".into()));
        }
        self.bitmap_contents(bitmap)
            .flatten()
            .ok_or_else(|| DecodeError::Bitmap("unknown bitmap".into()))
    }

    fn read_mono_bitmap(&self, bitmap: BitmapHandle) -> Result<Surface, DecodeError> {
        self.read_color_bitmap(bitmap)
    }
}
