//! Owned pixel buffers produced by window and cursor capture.
//!
//! Surfaces use the layouts GDI hands back from `GetDIBits` with a top-down
//! header: 32-bit BGRA rows with no padding, or 1-bit rows (most significant
//! bit = leftmost pixel) padded to a multiple of 32 bits.

use image::{ImageBuffer, Rgba};

use crate::error::DecodeError;

/// Row size in bytes of a 1-bit-per-pixel bitmap of the given width.
pub const fn mono_stride(width: u32) -> usize {
    (width as usize).div_ceil(32) * 4
}

fn mono_bit(row: &[u8], x: u32) -> bool {
    row[(x / 8) as usize] & (0x80 >> (x % 8)) != 0
}

fn set_mono_bit(row: &mut [u8], x: u32, value: bool) {
    let bit = 0x80 >> (x % 8);
    if value {
        row[(x / 8) as usize] |= bit;
    } else {
        row[(x / 8) as usize] &= !bit;
    }
}

/// How the bytes of a [`Surface`] encode pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 4 bytes per pixel in B, G, R, A order.
    Bgra32,
    /// 1 bit per pixel, set = white.
    Mono1,
}

impl PixelFormat {
    pub const fn stride(self, width: u32) -> usize {
        match self {
            PixelFormat::Bgra32 => width as usize * 4,
            PixelFormat::Mono1 => mono_stride(width),
        }
    }
}

/// An owned in-memory image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Surface {
    /// Creates a zero-filled surface.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            data: vec![0; format.stride(width) * height as usize],
        }
    }

    /// Wraps existing pixel data. Returns `None` if `data` is not exactly
    /// `stride * height` bytes long.
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Option<Self> {
        if data.len() != format.stride(width) * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn stride(&self) -> usize {
        self.format.stride(self.width)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Pixel at `(x, y)` as `[b, g, r, a]`. Mono pixels are opaque black or white.
    pub fn bgra_at(&self, x: u32, y: u32) -> [u8; 4] {
        let row = self.row(y);
        match self.format {
            PixelFormat::Bgra32 => {
                let i = x as usize * 4;
                [row[i], row[i + 1], row[i + 2], row[i + 3]]
            }
            PixelFormat::Mono1 => {
                if mono_bit(row, x) {
                    [255, 255, 255, 255]
                } else {
                    [0, 0, 0, 255]
                }
            }
        }
    }

    /// True for a 32-bit surface where at least one pixel has a non-zero
    /// alpha byte. GDI leaves alpha at zero for plain color bitmaps.
    pub fn has_alpha(&self) -> bool {
        self.format == PixelFormat::Bgra32 && self.data.chunks_exact(4).any(|px| px[3] != 0)
    }

    /// Converts to an opaque RGBA image for encoding.
    ///
    /// The alpha byte of captured screen pixels is undefined, so it is
    /// always replaced with 255.
    pub fn to_rgba_image(&self) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let [b, g, r, _] = self.bgra_at(x, y);
            Rgba([r, g, b, 255])
        })
    }

    /// Draws `cursor` with its top-left corner at `(x, y)`.
    ///
    /// Follows the AND/XOR rules GDI uses for cursors: where the mask bit is
    /// clear the cursor color replaces the destination; where it is set the
    /// destination is kept and XORed with the cursor color, which inverts it
    /// for a white monochrome pixel. Cursors carrying per-pixel alpha are
    /// alpha blended instead. Pixels falling outside the surface are clipped.
    /// Mono destination surfaces are left untouched.
    pub fn overlay_cursor(&mut self, cursor: &CursorImage, x: i32, y: i32) {
        if self.format != PixelFormat::Bgra32 {
            return;
        }

        let color = cursor.surface();
        let mask = cursor.mask();
        let blend = color.has_alpha();

        for cy in 0..color.height() {
            let dy = y + cy as i32;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for cx in 0..color.width() {
                let dx = x + cx as i32;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }

                let [sb, sg, sr, sa] = color.bgra_at(cx, cy);
                let transparent = mask.is_transparent(cx, cy);
                let i = dy as usize * self.stride() + dx as usize * 4;
                let dst = &mut self.data[i..i + 3];

                if blend {
                    let a = sa as u32;
                    for (d, s) in dst.iter_mut().zip([sb, sg, sr]) {
                        *d = ((s as u32 * a + *d as u32 * (255 - a)) / 255) as u8;
                    }
                } else if transparent {
                    dst[0] ^= sb;
                    dst[1] ^= sg;
                    dst[2] ^= sr;
                } else {
                    dst.copy_from_slice(&[sb, sg, sr]);
                }
            }
        }
    }
}

/// A 1-bit-per-pixel transparency map; a set bit marks a transparent pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Mask {
    /// Creates a fully opaque mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; mono_stride(width) * height as usize],
        }
    }

    /// Wraps existing mask rows. Returns `None` on a length mismatch.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != mono_stride(width) * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn stride(&self) -> usize {
        mono_stride(self.width)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    pub fn is_transparent(&self, x: u32, y: u32) -> bool {
        mono_bit(self.row(y), x)
    }

    pub fn set_transparent(&mut self, x: u32, y: u32, transparent: bool) {
        set_mono_bit(self.row_mut(y), x, transparent);
    }
}

/// A decoded cursor: color plane, transparency mask and hotspot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorImage {
    surface: Surface,
    mask: Mask,
    hotspot: (u32, u32),
}

impl CursorImage {
    /// Pairs a color plane with its mask. Both must have the same size.
    pub fn new(surface: Surface, mask: Mask, hotspot: (u32, u32)) -> Result<Self, DecodeError> {
        if surface.dimensions() != mask.dimensions() {
            return Err(DecodeError::MaskMismatch {
                surface: surface.dimensions(),
                mask: mask.dimensions(),
            });
        }
        Ok(Self {
            surface,
            mask,
            hotspot,
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Offset of the click point from the cursor's top-left corner.
    pub fn hotspot(&self) -> (u32, u32) {
        self.hotspot
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    /// Converts to an RGBA image with transparency taken from the mask, or
    /// from the color plane's own alpha when it has one.
    ///
    /// Inverting pixels (mask set, color set) cannot be represented in RGBA
    /// and come out transparent.
    pub fn to_rgba_image(&self) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
        let use_alpha = self.surface.has_alpha();
        ImageBuffer::from_fn(self.surface.width(), self.surface.height(), |x, y| {
            let [b, g, r, a] = self.surface.bgra_at(x, y);
            if use_alpha {
                Rgba([r, g, b, a])
            } else if self.mask.is_transparent(x, y) {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([r, g, b, 255])
            }
        })
    }
}
