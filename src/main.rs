//! winsnap command line tool
//!
//! Captures the foreground window (or a given window) or the current mouse
//! cursor and saves it as a PNG file.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use winsnap::config::{self, SnapConfig};
use winsnap::{logging, paths};

#[derive(Parser)]
#[command(name = "winsnap", version, about = "Capture a window or the mouse cursor to PNG")]
struct Cli {
    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory to save into, overriding config.json
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture a window (the foreground window by default)
    Window {
        /// Native window handle to capture
        #[arg(long)]
        hwnd: Option<isize>,

        /// Draw the mouse cursor onto the capture
        #[arg(long)]
        cursor: bool,
    },
    /// Capture the current mouse cursor image
    Cursor,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    std::fs::create_dir_all(paths::get_logs_dir()).context("Failed to create logs directory")?;
    logging::init(cli.verbose)?;

    config::init_config();
    let config = config::get_config();

    let dir = cli
        .output
        .clone()
        .unwrap_or_else(|| config.screenshots_dir());
    paths::ensure_directories(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    match run(&cli.command, config, &dir) {
        Ok(path) => {
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            log::error!("Capture failed: {:#}", e);
            Err(e)
        }
    }
}

#[cfg(windows)]
fn run(command: &Command, config: &SnapConfig, dir: &Path) -> Result<PathBuf> {
    use winsnap::backend::GdiBackend;
    use winsnap::{output, shell, Capturer, WindowHandle};

    let mut capturer = Capturer::new(GdiBackend::new());
    if let Some(tier) = config.compositor_tier {
        log::info!("Using configured compositor tier {:?}", tier);
        capturer = capturer.with_tier(tier);
    }

    let path = match command {
        Command::Window { hwnd, cursor } => {
            let window = match hwnd {
                Some(h) => WindowHandle(*h),
                None => shell::foreground_window()
                    .ok_or_else(|| anyhow!("There is no foreground window to capture"))?,
            };
            log::info!("Capturing window {:?}...", window);

            let surface = if *cursor || config.include_cursor {
                capturer
                    .capture_window_with_cursor(window)
                    .context("Window capture failed")?
            } else {
                capturer
                    .capture_window(window)
                    .context("Window capture failed")?
            };
            output::save_png(&surface, dir, &config.file_prefix)?
        }
        Command::Cursor => {
            log::info!("Capturing cursor...");
            let cursor = capturer.capture_cursor().context("Cursor capture failed")?;
            output::save_cursor_png(&cursor, dir, &format!("{}_cursor", config.file_prefix))?
        }
    };

    if config.add_to_recent_documents {
        shell::add_to_recent_documents(&path);
    }

    Ok(path)
}

#[cfg(not(windows))]
fn run(_command: &Command, _config: &SnapConfig, _dir: &Path) -> Result<PathBuf> {
    Err(anyhow!("Native window capture is only available on Windows"))
}
