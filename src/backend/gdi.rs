//! Win32 GDI implementation of the capture backends.

use std::ffi::c_void;
use std::mem::size_of;

use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC, GetDIBits,
    GetObjectW, GetWindowDC, ReleaseDC, SelectObject, BITMAP, BITMAPINFO, BITMAPINFOHEADER,
    BI_RGB, DIB_RGB_COLORS, HBITMAP, HDC, HGDIOBJ, RGBQUAD, SRCCOPY,
};
use windows::Win32::System::SystemInformation::{GetVersionExW, OSVERSIONINFOW};
use windows::Win32::UI::WindowsAndMessaging::{
    BringWindowToTop, GetCursorInfo, GetIconInfo, GetSystemMetrics, GetWindowRect, IsZoomed,
    CURSORINFO, CURSOR_SHOWING, HICON, ICONINFO, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN,
    SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN,
};

use super::scoped::SourceDc;
use super::{
    BitmapHandle, CaptureBackend, CursorBackend, CursorHandle, CursorInfo, DcHandle, GdiObjects,
    IconInfo, WindowHandle,
};
use crate::capture::{CompositorTier, PixelFormat, Rect, Surface};
use crate::error::{CaptureError, DecodeError};

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

fn hdc(dc: DcHandle) -> HDC {
    HDC(dc.0 as *mut c_void)
}

fn hbitmap(bitmap: BitmapHandle) -> HBITMAP {
    HBITMAP(bitmap.0 as *mut c_void)
}

fn gdiobj(bitmap: BitmapHandle) -> HGDIOBJ {
    HGDIOBJ(bitmap.0 as *mut c_void)
}

/// `BITMAPINFO` with room for the two-entry palette of a 1-bit DIB.
#[repr(C)]
struct MonoBitmapInfo {
    header: BITMAPINFOHEADER,
    colors: [RGBQUAD; 2],
}

/// Top-down DIB header for `width` x `height` at `bit_count` bits per pixel.
fn dib_header(width: i32, height: i32, bit_count: u16) -> BITMAPINFOHEADER {
    BITMAPINFOHEADER {
        biSize: size_of::<BITMAPINFOHEADER>() as u32,
        biWidth: width,
        biHeight: -height,
        biPlanes: 1,
        biBitCount: bit_count,
        biCompression: BI_RGB.0,
        ..Default::default()
    }
}

/// Native window capture through GDI.
#[derive(Clone, Copy, Debug, Default)]
pub struct GdiBackend;

impl GdiBackend {
    pub fn new() -> Self {
        Self
    }

    /// Width and height of `bitmap` as reported by `GetObjectW`.
    fn bitmap_size(&self, bitmap: BitmapHandle) -> Result<(i32, i32), DecodeError> {
        let mut bm = BITMAP::default();
        let written = unsafe {
            GetObjectW(
                gdiobj(bitmap),
                size_of::<BITMAP>() as i32,
                Some(&mut bm as *mut BITMAP as *mut c_void),
            )
        };
        if written == 0 {
            return Err(DecodeError::Bitmap(format!(
                "GetObjectW failed for {:?}",
                bitmap
            )));
        }
        Ok((bm.bmWidth, bm.bmHeight.abs()))
    }

    /// Runs `GetDIBits` for the whole bitmap into a buffer of `len` bytes.
    fn read_dib(
        &self,
        bitmap: BitmapHandle,
        height: i32,
        len: usize,
        info: *mut BITMAPINFO,
    ) -> Result<Vec<u8>, DecodeError> {
        let screen = SourceDc::screen(self).map_err(|e| DecodeError::Bitmap(e.to_string()))?;
        let mut data = vec![0u8; len];
        let lines = unsafe {
            GetDIBits(
                hdc(screen.handle()),
                hbitmap(bitmap),
                0,
                height as u32,
                Some(data.as_mut_ptr() as *mut c_void),
                info,
                DIB_RGB_COLORS,
            )
        };
        if lines == 0 {
            return Err(DecodeError::Bitmap(format!(
                "GetDIBits failed for {:?}",
                bitmap
            )));
        }
        Ok(data)
    }
}

/// Maps the reported Windows version to a compositor tier. Vista (6.0) and
/// later draw the wide invisible borders.
fn detect_tier() -> CompositorTier {
    let mut info = OSVERSIONINFOW {
        dwOSVersionInfoSize: size_of::<OSVERSIONINFOW>() as u32,
        ..Default::default()
    };
    match unsafe { GetVersionExW(&mut info) } {
        Ok(()) if info.dwMajorVersion < 6 => CompositorTier::Legacy,
        Ok(()) => CompositorTier::Modern,
        Err(e) => {
            log::warn!("GetVersionExW failed ({}), assuming modern compositor", e);
            CompositorTier::Modern
        }
    }
}

impl GdiObjects for GdiBackend {
    fn delete_bitmap(&self, bitmap: BitmapHandle) {
        let deleted = unsafe { DeleteObject(gdiobj(bitmap)) };
        if !deleted.as_bool() {
            log::warn!("DeleteObject failed for {:?}", bitmap);
        }
    }
}

impl CaptureBackend for GdiBackend {
    fn window_rect(&self, window: WindowHandle) -> Result<Rect, CaptureError> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(hwnd(window), &mut rect) }
            .map_err(|_| CaptureError::InvalidWindow(window))?;
        Ok(Rect::new(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn is_maximized(&self, window: WindowHandle) -> bool {
        unsafe { IsZoomed(hwnd(window)) }.as_bool()
    }

    fn virtual_screen_rect(&self) -> Rect {
        unsafe {
            let left = GetSystemMetrics(SM_XVIRTUALSCREEN);
            let top = GetSystemMetrics(SM_YVIRTUALSCREEN);
            let width = GetSystemMetrics(SM_CXVIRTUALSCREEN);
            let height = GetSystemMetrics(SM_CYVIRTUALSCREEN);
            Rect::new(left, top, left + width, top + height)
        }
    }

    fn compositor_tier(&self) -> CompositorTier {
        detect_tier()
    }

    fn bring_to_top(&self, window: WindowHandle) {
        if let Err(e) = unsafe { BringWindowToTop(hwnd(window)) } {
            log::warn!("BringWindowToTop failed for {:?}: {}", window, e);
        }
    }

    fn screen_dc(&self) -> Result<DcHandle, CaptureError> {
        let dc = unsafe { GetDC(HWND::default()) };
        if dc.is_invalid() {
            return Err(CaptureError::DeviceContext("screen"));
        }
        Ok(DcHandle(dc.0 as isize))
    }

    fn window_dc(&self, window: WindowHandle) -> Result<DcHandle, CaptureError> {
        let dc = unsafe { GetWindowDC(hwnd(window)) };
        if dc.is_invalid() {
            return Err(CaptureError::DeviceContext("window"));
        }
        Ok(DcHandle(dc.0 as isize))
    }

    fn release_dc(&self, owner: Option<WindowHandle>, dc: DcHandle) {
        let owner = owner.map(hwnd).unwrap_or_default();
        if unsafe { ReleaseDC(owner, hdc(dc)) } == 0 {
            log::warn!("ReleaseDC failed for {:?}", dc);
        }
    }

    fn create_memory_dc(&self, source: DcHandle) -> Result<DcHandle, CaptureError> {
        let dc = unsafe { CreateCompatibleDC(hdc(source)) };
        if dc.is_invalid() {
            return Err(CaptureError::DeviceContext("memory"));
        }
        Ok(DcHandle(dc.0 as isize))
    }

    fn delete_dc(&self, dc: DcHandle) {
        if !unsafe { DeleteDC(hdc(dc)) }.as_bool() {
            log::warn!("DeleteDC failed for {:?}", dc);
        }
    }

    fn create_bitmap(
        &self,
        source: DcHandle,
        width: i32,
        height: i32,
    ) -> Result<BitmapHandle, CaptureError> {
        let bitmap = unsafe { CreateCompatibleBitmap(hdc(source), width, height) };
        if bitmap.is_invalid() {
            return Err(CaptureError::Allocation { width, height });
        }
        Ok(BitmapHandle(bitmap.0 as isize))
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
        unsafe {
            let previous = SelectObject(hdc(memory_dc), gdiobj(bitmap));
            if previous.is_invalid() {
                return Err(CaptureError::Copy("SelectObject failed".into()));
            }
            let result = BitBlt(
                hdc(memory_dc),
                0,
                0,
                width,
                height,
                hdc(source),
                src_x,
                src_y,
                SRCCOPY,
            );
            let _ = SelectObject(hdc(memory_dc), previous);
            result.map_err(|e| CaptureError::Copy(format!("BitBlt failed: {}", e)))
        }
    }

    fn read_bitmap(
        &self,
        dc: DcHandle,
        bitmap: BitmapHandle,
        width: i32,
        height: i32,
    ) -> Result<Surface, CaptureError> {
        let mut info = BITMAPINFO {
            bmiHeader: dib_header(width, height, 32),
            ..Default::default()
        };
        let len = PixelFormat::Bgra32.stride(width as u32) * height as usize;
        let mut data = vec![0u8; len];

        let lines = unsafe {
            GetDIBits(
                hdc(dc),
                hbitmap(bitmap),
                0,
                height as u32,
                Some(data.as_mut_ptr() as *mut c_void),
                &mut info,
                DIB_RGB_COLORS,
            )
        };
        if lines == 0 {
            return Err(CaptureError::Copy("GetDIBits failed".into()));
        }

        Surface::from_raw(width as u32, height as u32, PixelFormat::Bgra32, data)
            .ok_or_else(|| CaptureError::Copy("unexpected DIB size".into()))
    }
}

impl CursorBackend for GdiBackend {
    fn current_cursor(&self) -> Result<CursorInfo, DecodeError> {
        let mut info = CURSORINFO {
            cbSize: size_of::<CURSORINFO>() as u32,
            ..Default::default()
        };
        unsafe { GetCursorInfo(&mut info) }.map_err(|e| {
            log::warn!("GetCursorInfo failed: {}", e);
            DecodeError::NoCursor
        })?;
        if info.hCursor.is_invalid() {
            return Err(DecodeError::NoCursor);
        }
        Ok(CursorInfo {
            handle: CursorHandle(info.hCursor.0 as isize),
            position: (info.ptScreenPos.x, info.ptScreenPos.y),
            showing: info.flags.0 & CURSOR_SHOWING.0 != 0,
        })
    }

    fn icon_info(&self, cursor: CursorHandle) -> Result<IconInfo, DecodeError> {
        let mut info = ICONINFO::default();
        unsafe { GetIconInfo(HICON(cursor.0 as *mut c_void), &mut info) }
            .map_err(|e| DecodeError::IconInfo(e.to_string()))?;

        let handle = |bitmap: HBITMAP| {
            (!bitmap.is_invalid()).then(|| BitmapHandle(bitmap.0 as isize))
        };
        Ok(IconInfo {
            color: handle(info.hbmColor),
            mask: handle(info.hbmMask),
            hotspot: (info.xHotspot, info.yHotspot),
        })
    }

    fn read_color_bitmap(&self, bitmap: BitmapHandle) -> Result<Surface, DecodeError> {
        let (width, height) = self.bitmap_size(bitmap)?;
        let mut info = BITMAPINFO {
            bmiHeader: dib_header(width, height, 32),
            ..Default::default()
        };
        let len = PixelFormat::Bgra32.stride(width as u32) * height as usize;
        let data = self.read_dib(bitmap, height, len, &mut info)?;

        Surface::from_raw(width as u32, height as u32, PixelFormat::Bgra32, data)
            .ok_or_else(|| DecodeError::Bitmap("unexpected DIB size".into()))
    }

    fn read_mono_bitmap(&self, bitmap: BitmapHandle) -> Result<Surface, DecodeError> {
        let (width, height) = self.bitmap_size(bitmap)?;
        let mut info = MonoBitmapInfo {
            header: dib_header(width, height, 1),
            colors: [RGBQUAD::default(); 2],
        };
        let len = PixelFormat::Mono1.stride(width as u32) * height as usize;
        let data = self.read_dib(
            bitmap,
            height,
            len,
            &mut info as *mut MonoBitmapInfo as *mut BITMAPINFO,
        )?;

        Surface::from_raw(width as u32, height as u32, PixelFormat::Mono1, data)
            .ok_or_else(|| DecodeError::Bitmap("unexpected DIB size".into()))
    }
}
