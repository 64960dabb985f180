//! `log` sink for the binary.
//!
//! Headless commands log to stderr. Terminal play owns the screen, so it logs
//! to a file or not at all.

use std::{
    fs::File,
    io::{self, BufWriter, Write as _},
    path::Path,
    sync::Mutex,
};

use anyhow::Context as _;
use chrono::{DateTime, Local};
use log::{LevelFilter, Log, Metadata, Record};

#[derive(Debug)]
enum Sink {
    Stderr,
    File(BufWriter<File>),
}

impl Sink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        match self {
            Sink::Stderr => writeln!(io::stderr().lock(), "{line}"),
            Sink::File(writer) => writeln!(writer, "{line}"),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stderr => io::stderr().flush(),
            Sink::File(writer) => writer.flush(),
        }
    }
}

#[derive(Debug)]
struct Logger {
    level: LevelFilter,
    sink: Mutex<Sink>,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record, Local::now());
        if let Ok(mut sink) = self.sink.lock() {
            // Nowhere left to report a failing log sink.
            let _ = sink.write_line(&line);
        }
    }

    fn flush(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.flush();
        }
    }
}

fn format_line(record: &Record<'_>, time: DateTime<Local>) -> String {
    format!(
        "{} {:<5} {}: {}",
        time.format("%H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.args()
    )
}

fn install(level: LevelFilter, sink: Sink) -> anyhow::Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }
    log::set_boxed_logger(Box::new(Logger {
        level,
        sink: Mutex::new(sink),
    }))
    .context("Failed to install logger")?;
    log::set_max_level(level);
    Ok(())
}

pub fn init_stderr(level: LevelFilter) -> anyhow::Result<()> {
    install(level, Sink::Stderr)
}

/// Logs to `path`, or disables logging when there is no path.
pub fn init_file(level: LevelFilter, path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    install(level, Sink::File(BufWriter::new(file)))
}

/// Flushes the installed logger, if any.
pub fn flush() {
    log::logger().flush();
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use log::Level;

    use super::*;

    #[test]
    fn test_line_format() {
        let time = Local.with_ymd_and_hms(2024, 5, 1, 13, 4, 5).unwrap();
        let line = format_line(
            &Record::builder()
                .args(format_args!("card in slot {} not applied", 2))
                .level(Level::Warn)
                .target("cardtris_engine::engine")
                .build(),
            time,
        );
        assert_eq!(
            line,
            "13:04:05.000 WARN  cardtris_engine::engine: card in slot 2 not applied"
        );
    }
}
