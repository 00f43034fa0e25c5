use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Name of the folder created under Documents for screenshots.
const DOCUMENTS_SUBDIR: &str = "winsnap";

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the default screenshots directory: `<Documents>/winsnap/`, or
/// `<exe_dir>/screenshots/` when there is no Documents folder.
pub fn get_screenshots_dir() -> PathBuf {
    dirs::document_dir()
        .map(|docs| docs.join(DOCUMENTS_SUBDIR))
        .unwrap_or_else(|| get_exe_dir().join("screenshots"))
}

/// Returns the config file path: `<exe_dir>/config.json`
pub fn get_config_path() -> PathBuf {
    get_exe_dir().join("config.json")
}

/// Ensures the logs directory and `screenshots_dir` exist. Call at startup.
pub fn ensure_directories(screenshots_dir: &std::path::Path) -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    std::fs::create_dir_all(screenshots_dir)?;
    Ok(())
}
