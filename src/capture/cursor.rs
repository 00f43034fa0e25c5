//! Turns a native cursor into a color plane plus transparency mask.
//!
//! Color cursors come with a separate color bitmap and mask bitmap. Old-style
//! monochrome cursors have only one bitmap, twice as tall as the cursor: the
//! AND mask on top and the XOR (color) plane below.

use crate::backend::scoped::OwnedBitmap;
use crate::backend::{CursorBackend, CursorHandle, GdiObjects};
use crate::error::DecodeError;

use super::surface::{CursorImage, Mask, PixelFormat, Surface};

/// The two cursor layouts, decided once from the icon info.
enum CursorKind<'a, B: GdiObjects + ?Sized> {
    Color {
        color: OwnedBitmap<'a, B>,
        mask: OwnedBitmap<'a, B>,
    },
    Monochrome {
        combined: OwnedBitmap<'a, B>,
    },
}

/// Decodes `cursor` into a [`CursorImage`].
///
/// The bitmaps returned by the icon info query are deleted exactly once
/// before this returns, on success and on error.
pub fn decode_cursor<B: CursorBackend + ?Sized>(
    backend: &B,
    cursor: CursorHandle,
) -> Result<CursorImage, DecodeError> {
    if cursor.0 == 0 {
        return Err(DecodeError::InvalidHandle(cursor));
    }

    let info = backend.icon_info(cursor)?;
    let color = info.color.map(|bitmap| OwnedBitmap::adopt(backend, bitmap));
    let mask = info.mask.map(|bitmap| OwnedBitmap::adopt(backend, bitmap));

    let kind = match (color, mask) {
        (Some(color), Some(mask)) => CursorKind::Color { color, mask },
        (None, Some(combined)) => CursorKind::Monochrome { combined },
        (_, None) => {
            return Err(DecodeError::Malformed("cursor has no mask bitmap".into()));
        }
    };

    match kind {
        CursorKind::Color { color, mask } => {
            let surface = backend.read_color_bitmap(color.handle())?;
            let plane = backend.read_mono_bitmap(mask.handle())?;
            let mask = mask_from_plane(plane)?;
            log::debug!("Decoded color cursor {:?}: {:?}", cursor, surface.dimensions());
            CursorImage::new(surface, mask, info.hotspot)
        }
        CursorKind::Monochrome { combined } => {
            let plane = backend.read_mono_bitmap(combined.handle())?;
            let (mask, surface) = split_monochrome(&plane)?;
            log::debug!(
                "Decoded monochrome cursor {:?}: {:?}",
                cursor,
                surface.dimensions()
            );
            CursorImage::new(surface, mask, info.hotspot)
        }
    }
}

fn mask_from_plane(plane: Surface) -> Result<Mask, DecodeError> {
    if plane.format() != PixelFormat::Mono1 {
        return Err(DecodeError::Malformed("mask bitmap is not 1 bit per pixel".into()));
    }
    let (width, height) = plane.dimensions();
    Mask::from_raw(width, height, plane.into_data())
        .ok_or_else(|| DecodeError::Malformed("mask bitmap has the wrong length".into()))
}

/// Splits a monochrome cursor bitmap of height `2h` into its AND mask (rows
/// `0..h`) and XOR color plane (rows `h..2h`). An odd trailing row is ignored.
///
/// Rows are copied as 32-bit words across the full padded stride, so padding
/// bits travel with their row.
pub fn split_monochrome(combined: &Surface) -> Result<(Mask, Surface), DecodeError> {
    if combined.format() != PixelFormat::Mono1 {
        return Err(DecodeError::Malformed(
            "monochrome cursor bitmap is not 1 bit per pixel".into(),
        ));
    }
    let h = combined.height() / 2;
    if h == 0 {
        return Err(DecodeError::Malformed(format!(
            "monochrome cursor bitmap height {} has no rows to split",
            combined.height()
        )));
    }

    let width = combined.width();
    let mut mask = Mask::new(width, h);
    let mut color = Surface::new(width, h, PixelFormat::Mono1);

    for i in 0..h {
        copy_words(mask.row_mut(i), combined.row(i));
        copy_words(color.row_mut(i), combined.row(i + h));
    }

    Ok((mask, color))
}

fn copy_words(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        d.copy_from_slice(s);
    }
}
