//! Error types for window capture and cursor decoding.

use crate::backend::{CursorHandle, WindowHandle};
use crate::capture::Rect;

/// A window capture failed. Nothing was returned and every handle acquired
/// during the attempt has been released.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("window {0:?} is not a valid window")]
    InvalidWindow(WindowHandle),

    #[error("could not acquire the {0} device context")]
    DeviceContext(&'static str),

    #[error("could not allocate a {width}x{height} capture bitmap")]
    Allocation { width: i32, height: i32 },

    #[error("capture region {0:?} has no area")]
    EmptyRegion(Rect),

    #[error("pixel copy failed: {0}")]
    Copy(String),
}

/// A cursor could not be turned into an image.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("no cursor is currently set")]
    NoCursor,

    #[error("cursor handle {0:?} is not valid")]
    InvalidHandle(CursorHandle),

    #[error("icon info query failed: {0}")]
    IconInfo(String),

    #[error("could not read cursor bitmap: {0}")]
    Bitmap(String),

    #[error("malformed cursor bitmap: {0}")]
    Malformed(String),

    #[error(
        "cursor mask is {}x{} but the color plane is {}x{}",
        mask.0, mask.1, surface.0, surface.1
    )]
    MaskMismatch {
        surface: (u32, u32),
        mask: (u32, u32),
    },
}

/// Either stage of a window capture that also draws the cursor failed.
#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
