//! winsnap
//!
//! Captures windows and the mouse cursor as images. Window captures correct
//! for the invisible border of maximized windows and read either from the
//! composited desktop or from the window's own surface, depending on whether
//! the window is fully on screen.

pub mod backend;
pub mod capture;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod paths;
#[cfg(windows)]
pub mod shell;

pub use backend::{CaptureBackend, CursorBackend, WindowHandle};
pub use capture::{Capturer, CompositorTier, CursorImage, Mask, Rect, Surface};
pub use error::{CaptureError, DecodeError, SnapError};
