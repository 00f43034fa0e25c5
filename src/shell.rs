//! Small shell integrations used after a capture.

use std::ffi::c_void;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use windows::Win32::UI::Shell::{SHAddToRecentDocs, SHARD_PATHW};
use windows::Win32::UI::WindowsAndMessaging::GetForegroundWindow;

use crate::backend::WindowHandle;

/// Returns the window the user is currently working in, if any.
pub fn foreground_window() -> Option<WindowHandle> {
    let hwnd = unsafe { GetForegroundWindow() };
    (!hwnd.is_invalid()).then(|| WindowHandle(hwnd.0 as isize))
}

/// Adds `path` to the shell's recent documents list.
pub fn add_to_recent_documents(path: &Path) {
    let wide: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();
    unsafe {
        SHAddToRecentDocs(SHARD_PATHW.0 as u32, Some(wide.as_ptr() as *const c_void));
    }
    log::debug!("Added {} to recent documents", path.display());
}
