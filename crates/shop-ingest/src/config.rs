//! Ingestion configuration
//!
//! Read from the environment (after `.env` has been loaded):
//!
//! - `SHOP_DATA_DIR`: directory holding the CSV exports (default `./data`)
//! - `SHOP_CSV_DELIMITER`: single ASCII character or `tab` (default `,`)
//! - `DATABASE_URL`, `DB_MAX_CONNECTIONS`, `DB_CONNECT_TIMEOUT`

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::store::DatabaseConfig;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_DELIMITER: u8 = b',';

/// Where the source files live and how they are delimited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub data_dir: PathBuf,
    pub delimiter: u8,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl SourceConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("SHOP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        let delimiter = match std::env::var("SHOP_CSV_DELIMITER") {
            Ok(value) => parse_delimiter(&value)?,
            Err(_) => DEFAULT_DELIMITER,
        };

        Ok(Self {
            data_dir,
            delimiter,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.data_dir.is_dir() {
            bail!("Data directory {} does not exist", self.data_dir.display());
        }
        if matches!(self.delimiter, b'"' | b'\n' | b'\r') {
            bail!("Delimiter {:?} cannot be used", self.delimiter as char);
        }
        Ok(())
    }
}

/// Accept one ASCII character, or `tab` / `\t`
pub fn parse_delimiter(value: &str) -> Result<u8> {
    if matches!(value, "tab" | "\\t" | "\t") {
        return Ok(b'\t');
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => bail!("SHOP_CSV_DELIMITER must be a single ASCII character, got '{}'", value),
    }
}

/// Everything the `shop-ingest` binary needs
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub sources: SourceConfig,
    pub database: DatabaseConfig,
}

impl IngestConfig {
    pub fn load() -> Result<Self> {
        let config = Self {
            sources: SourceConfig::from_env()?,
            database: DatabaseConfig::from_env().context("Failed to load database configuration")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.sources.validate()?;
        if self.database.url.is_empty() {
            bail!("DATABASE_URL cannot be empty");
        }
        if self.database.max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be greater than 0");
        }
        Ok(())
    }
}
