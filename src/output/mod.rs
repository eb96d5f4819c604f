//! Tabular output writers

use std::path::{Path, PathBuf};

pub mod csv;

/// File name of the filtered price list
pub const PRICE_LIST_FILE: &str = "waxpeer_prices.csv";
/// File name of the remote prices (sentinel rows removed)
pub const REMOTE_PRICES_FILE: &str = "youpin_prices.csv";
/// File name of the joined report
pub const REPORT_FILE: &str = "final.csv";
/// File name of the per-identifier outcome dump
pub const OUTCOMES_FILE: &str = "outcomes.csv";

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Generic output writer trait
pub trait OutputWriter {
    /// Flush any buffered data to disk
    fn flush(&mut self) -> OutputResult<()>;

    /// Close the writer and finalize output
    fn close(self) -> OutputResult<()>;
}

/// Output file locations under one directory
#[derive(Debug, Clone)]
pub struct OutputPaths {
    root: PathBuf,
}

impl OutputPaths {
    /// Place all outputs under `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Filtered price list
    pub fn price_list(&self) -> PathBuf {
        self.root.join(PRICE_LIST_FILE)
    }

    /// Remote prices
    pub fn remote_prices(&self) -> PathBuf {
        self.root.join(REMOTE_PRICES_FILE)
    }

    /// Joined report
    pub fn report(&self) -> PathBuf {
        self.root.join(REPORT_FILE)
    }

    /// Per-identifier outcomes
    pub fn outcomes(&self) -> PathBuf {
        self.root.join(OUTCOMES_FILE)
    }

    /// Output directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}
