// Copyright 2023 Remi Bernotavicius

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt as _;

fn tracing_level(level: log::LevelFilter) -> LevelFilter {
    match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    }
}

/// Opened for appending so earlier runs stay in the file.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Logs to stderr. With a `log_file`, every record is also appended there.
pub fn init(level: log::LevelFilter, log_file: Option<&Path>) -> crate::Result<()> {
    let Some(path) = log_file else {
        simple_logger::SimpleLogger::new().with_level(level).init()?;
        return Ok(());
    };

    let file = open_log_file(path)?;
    tracing_subscriber::fmt()
        .with_max_level(tracing_level(level))
        .with_ansi(false)
        .with_writer(std::io::stderr.and(Mutex::new(file)))
        .try_init()?;
    log::debug!("logging to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn levels_match() {
        assert_eq!(tracing_level(log::LevelFilter::Off), LevelFilter::OFF);
        assert_eq!(tracing_level(log::LevelFilter::Warn), LevelFilter::WARN);
        assert_eq!(tracing_level(log::LevelFilter::Trace), LevelFilter::TRACE);
    }

    #[test]
    fn log_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("CuisineCraft.log");

        writeln!(open_log_file(&path).unwrap(), "first run").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second run").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "first run\nsecond run\n"
        );
    }
}
