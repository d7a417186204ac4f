// Copyright 2023 Remi Bernotavicius

use derive_more::{Display, Error};
use std::path::PathBuf;

const APP_DIR: &str = "cuisinecraft";

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("couldn't find the user's home directory, pass --data-dir")]
    NoHomeDirectory,
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() && !b.is_ascii_alphanumeric() => Ok(*b),
            _ => Err(format!(
                "expected a single punctuation character or \"tab\", got {s:?}"
            )),
        },
    }
}

/// Settings shared by every subcommand. Each one can also come from the environment.
#[derive(clap::Args, Clone, Debug)]
pub struct Config {
    /// Where the database and other user-data lives. Defaults to the platform data directory,
    /// on Linux `~/.local/share/cuisinecraft/`.
    #[arg(long, global = true, env = "CUISINECRAFT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Database file. Defaults to `data.sqlite` in the data directory.
    #[arg(long, global = true, env = "CUISINECRAFT_DB_PATH")]
    database: Option<PathBuf>,

    /// Field separator for CSV exports.
    #[arg(
        long,
        global = true,
        env = "CUISINECRAFT_CSV_DELIMITER",
        default_value = ",",
        value_parser = parse_delimiter
    )]
    pub csv_delimiter: u8,

    /// The tesseract executable used to read receipts.
    #[arg(long, global = true, env = "CUISINECRAFT_TESSERACT", default_value = "tesseract")]
    pub tesseract: PathBuf,

    #[arg(long, global = true, env = "CUISINECRAFT_LOG_LEVEL", default_value_t = log::LevelFilter::Info)]
    pub log_level: log::LevelFilter,

    /// Also append log messages to this file, for example `CuisineCraft.log`.
    #[arg(long, global = true, env = "CUISINECRAFT_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let dirs = directories::BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(dirs.data_dir().join(APP_DIR))
    }

    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join("data.sqlite")),
        }
    }

    pub fn export_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join("exports"))
    }

    /// Text files of imported recipes.
    pub fn recipes_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join("recipes"))
    }
}

/// Paths and options resolved from [`Config`], handed to the GUI and commands.
#[derive(Clone, Debug)]
pub struct Settings {
    pub database_path: PathBuf,
    pub export_dir: PathBuf,
    pub recipes_dir: PathBuf,
    pub csv_delimiter: u8,
    pub tesseract: PathBuf,
}

impl Settings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            database_path: config.database_path()?,
            export_dir: config.export_dir()?,
            recipes_dir: config.recipes_dir()?,
            csv_delimiter: config.csv_delimiter,
            tesseract: config.tesseract.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestArgs {
        #[command(flatten)]
        config: Config,
    }

    fn parse(args: &[&str]) -> Config {
        TestArgs::parse_from(std::iter::once("cuisinecraft").chain(args.iter().copied())).config
    }

    #[test]
    fn explicit_paths() {
        let config = parse(&["--data-dir", "/srv/cc"]);
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/srv/cc"));
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/srv/cc/data.sqlite")
        );
        assert_eq!(
            config.export_dir().unwrap(),
            PathBuf::from("/srv/cc/exports")
        );

        let config = parse(&["--data-dir", "/srv/cc", "--database", "/tmp/other.sqlite"]);
        let settings = Settings::from_config(&config).unwrap();
        assert_eq!(settings.database_path, PathBuf::from("/tmp/other.sqlite"));
        assert_eq!(settings.recipes_dir, PathBuf::from("/srv/cc/recipes"));
    }

    #[test]
    fn delimiters() {
        assert_eq!(parse(&["--csv-delimiter", ";"]).csv_delimiter, b';');
        assert_eq!(parse(&["--csv-delimiter", "tab"]).csv_delimiter, b'\t');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("x").is_err());
    }

    #[test]
    fn log_level() {
        assert_eq!(
            parse(&["--log-level", "debug"]).log_level,
            log::LevelFilter::Debug
        );
    }

    #[test]
    fn log_file() {
        assert_eq!(
            parse(&["--log-file", "/srv/cc/CuisineCraft.log"]).log_file,
            Some(PathBuf::from("/srv/cc/CuisineCraft.log"))
        );
    }
}
