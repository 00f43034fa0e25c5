//! Console and file logging.
//!
//! Every record is written to stdout and appended to `<logs>/winsnap.log` as
//! `[HH:MM:SS.mmm] LEVEL message`.

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::paths;

const LOG_FILE_NAME: &str = "winsnap.log";

/// A `log` backend that mirrors records to the console and a log file.
pub struct FileLogger {
    path: PathBuf,
    level: LevelFilter,
}

impl FileLogger {
    pub fn new(path: PathBuf, level: LevelFilter) -> Self {
        Self { path, level }
    }

    fn append(&self, line: &str) {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

/// Formats one log line.
pub fn format_line(level: Level, msg: &str) -> String {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    format!("[{}] {:<5} {}\n", timestamp, level, msg)
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), &record.args().to_string());
        print!("{}", line);
        self.append(&line);
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

/// Installs [`FileLogger`] writing to the logs directory, plus a panic hook
/// that records panics in the same file.
pub fn init(verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let path = paths::get_logs_dir().join(LOG_FILE_NAME);

    let panic_path = path.clone();
    std::panic::set_hook(Box::new(move |panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        let log_msg = format!("[PANIC]{} {}\n", location, msg);
        eprint!("{}", log_msg);
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&panic_path)
        {
            let _ = file.write_all(log_msg.as_bytes());
        }
    }));

    log::set_boxed_logger(Box::new(FileLogger::new(path, level)))?;
    log::set_max_level(level);
    Ok(())
}
