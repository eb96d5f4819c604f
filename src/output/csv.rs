//! CSV output writer implementation

use csv::{Reader, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::fs::File;
use std::io::BufWriter;
use std::marker::PhantomData;
use std::path::Path;
use tracing::{debug, info};

use super::{OutputError, OutputResult, OutputWriter};
use crate::downloader::ResultSet;
use crate::identifier::TemplateId;
use crate::report::{ArbitrageRow, PriceRow, RemotePriceRow};
use crate::FetchOutcome;

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Rows between periodic flushes
const FLUSH_INTERVAL: u64 = 1_000;

/// CSV record for the filtered price list
#[derive(Debug, Serialize, Deserialize)]
pub struct PriceRowRecord {
    name: String,
    usd_price: String,
    id: String,
}

impl From<&PriceRow> for PriceRowRecord {
    fn from(row: &PriceRow) -> Self {
        Self {
            name: row.name.clone(),
            usd_price: row.usd_price.to_string(),
            id: row.id.to_string(),
        }
    }
}

impl TryFrom<PriceRowRecord> for PriceRow {
    type Error = OutputError;

    fn try_from(record: PriceRowRecord) -> Result<Self, Self::Error> {
        let usd_price = Decimal::from_str(&record.usd_price).map_err(|e| {
            OutputError::CsvError(format!("Invalid usd_price '{}': {}", record.usd_price, e))
        })?;
        let id = TemplateId::parse(&record.id)
            .map_err(|e| OutputError::CsvError(format!("Invalid id '{}': {}", record.id, e)))?;
        Ok(PriceRow {
            name: record.name,
            usd_price,
            id,
        })
    }
}

/// CSV record for remote prices
#[derive(Debug, Serialize)]
pub struct RemotePriceRecord {
    id: String,
    rmb_price: String,
}

impl From<&RemotePriceRow> for RemotePriceRecord {
    fn from(row: &RemotePriceRow) -> Self {
        Self {
            id: row.id.to_string(),
            rmb_price: row.rmb_price.to_string(),
        }
    }
}

/// CSV record for the joined report
///
/// `local_price` is only emitted when an exchange rate was configured, which
/// holds for every row of one report.
#[derive(Debug, Serialize)]
pub struct ArbitrageRecord {
    name: String,
    usd_price: String,
    id: String,
    rmb_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_price: Option<String>,
}

impl From<&ArbitrageRow> for ArbitrageRecord {
    fn from(row: &ArbitrageRow) -> Self {
        Self {
            name: row.name.clone(),
            usd_price: row.usd_price.to_string(),
            id: row.id.to_string(),
            rmb_price: row.rmb_price.to_string(),
            local_price: row.local_price.map(|p| p.to_string()),
        }
    }
}

/// CSV record for one fetch outcome, sentinel rows included
#[derive(Debug, Serialize)]
pub struct OutcomeRecord {
    id: String,
    status: &'static str,
    name: Option<String>,
    price: String,
    seller: Option<String>,
    attempts: u32,
    reason: Option<String>,
}

impl From<&FetchOutcome> for OutcomeRecord {
    fn from(outcome: &FetchOutcome) -> Self {
        let listing = outcome.listing();
        Self {
            id: outcome.identifier().to_string(),
            status: if outcome.is_success() { "success" } else { "failure" },
            name: listing.map(|l| l.name.clone()),
            price: outcome.price().to_string(),
            seller: listing.map(|l| l.seller.clone()),
            attempts: outcome.attempts(),
            reason: outcome.failure_reason().map(|r| r.to_string()),
        }
    }
}

/// Buffered CSV writer for one record type
pub struct CsvRecordWriter<R> {
    writer: Writer<BufWriter<File>>,
    records_written: u64,
    _record: PhantomData<R>,
}

impl<R: Serialize> CsvRecordWriter<R> {
    /// Create a writer with the default buffer size
    ///
    /// Parent directories are created as needed; an existing file is
    /// truncated.
    pub fn new<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        Self::new_with_buffer_size(path, DEFAULT_BUFFER_SIZE)
    }

    /// Create a writer with a custom buffer size
    pub fn new_with_buffer_size<P: AsRef<Path>>(path: P, buffer_size: usize) -> OutputResult<Self> {
        let path = path.as_ref();
        debug!("Creating CSV writer: path={}", path.display());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    OutputError::IoError(format!("Failed to create directory: {}", e))
                })?;
            }
        }

        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {}", e)))?;

        Ok(Self {
            writer: Writer::from_writer(BufWriter::with_capacity(buffer_size, file)),
            records_written: 0,
            _record: PhantomData,
        })
    }

    /// Write one record; the header row is emitted before the first one
    pub fn write_record(&mut self, record: &R) -> OutputResult<()> {
        self.writer
            .serialize(record)
            .map_err(|e| OutputError::CsvError(format!("Failed to write record: {}", e)))?;

        self.records_written += 1;
        if self.records_written % FLUSH_INTERVAL == 0 {
            self.flush()?;
        }
        Ok(())
    }

    /// Number of records written so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

impl<R> OutputWriter for CsvRecordWriter<R> {
    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {}", e)))
    }

    fn close(mut self) -> OutputResult<()> {
        self.flush()?;

        let buf_writer = self
            .writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get inner writer: {}", e)))?;
        let file = buf_writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get file handle: {}", e)))?;
        file.sync_all()
            .map_err(|e| OutputError::IoError(format!("Failed to sync file: {}", e)))?;

        debug!(records = self.records_written, "CSV writer closed");
        Ok(())
    }
}

/// Write every record converted from `rows` to `path`
fn write_all<'a, T, R, P>(path: P, rows: impl IntoIterator<Item = &'a T>) -> OutputResult<u64>
where
    T: 'a,
    R: Serialize + From<&'a T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut writer = CsvRecordWriter::<R>::new(path)?;
    for row in rows {
        writer.write_record(&R::from(row))?;
    }
    let written = writer.records_written();
    writer.close()?;

    info!(path = %path.display(), rows = written, "CSV written");
    Ok(written)
}

/// Write the filtered price list (`name,usd_price,id`)
pub fn write_price_rows<P: AsRef<Path>>(path: P, rows: &[PriceRow]) -> OutputResult<u64> {
    write_all::<PriceRow, PriceRowRecord, _>(path, rows)
}

/// Read a price list previously written by [`write_price_rows`]
pub fn read_price_rows<P: AsRef<Path>>(path: P) -> OutputResult<Vec<PriceRow>> {
    let path = path.as_ref();
    let mut reader = Reader::from_path(path)
        .map_err(|e| OutputError::IoError(format!("Failed to open {}: {}", path.display(), e)))?;

    let rows = reader
        .deserialize::<PriceRowRecord>()
        .map(|record| {
            let record = record
                .map_err(|e| OutputError::CsvError(format!("Failed to read record: {}", e)))?;
            PriceRow::try_from(record)
        })
        .collect::<OutputResult<Vec<_>>>()?;

    info!(path = %path.display(), rows = rows.len(), "Price list loaded from CSV");
    Ok(rows)
}

/// Write remote prices (`id,rmb_price`)
pub fn write_remote_prices<P: AsRef<Path>>(path: P, rows: &[RemotePriceRow]) -> OutputResult<u64> {
    write_all::<RemotePriceRow, RemotePriceRecord, _>(path, rows)
}

/// Write the joined report (`name,usd_price,id,rmb_price[,local_price]`)
pub fn write_report<P: AsRef<Path>>(path: P, rows: &[ArbitrageRow]) -> OutputResult<u64> {
    write_all::<ArbitrageRow, ArbitrageRecord, _>(path, rows)
}

/// Write every outcome including failures
pub fn write_outcomes<P: AsRef<Path>>(path: P, results: &ResultSet) -> OutputResult<u64> {
    write_all::<FetchOutcome, OutcomeRecord, _>(path, results)
}
