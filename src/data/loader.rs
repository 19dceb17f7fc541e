//! CSV Data Loader Module
//! Parses the population CSV into an immutable, region-indexed table.

use crate::data::series::SeriesKind;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Every record (header included) carries region, total, male, female.
pub const FIELD_COUNT: usize = 4;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed input: expected a header and at least one data row, found {found} row(s)")]
    NotEnoughRows { found: usize },
    #[error("Malformed input: line {line} has {found} fields, expected {expected}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Malformed input: row {row} has an empty region name")]
    EmptyRegion { row: usize },
    #[error("Malformed input: region '{region}' appears more than once")]
    DuplicateRegion { region: String },
    #[error("No data loaded")]
    NoData,
}

/// One region's record, fields kept exactly as read (trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub region: String,
    pub total: String,
    pub male: String,
    pub female: String,
}

impl Row {
    pub fn new(
        region: impl Into<String>,
        total: impl Into<String>,
        male: impl Into<String>,
        female: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            total: total.into(),
            male: male.into(),
            female: female.into(),
        }
    }

    fn from_record(record: &StringRecord) -> Self {
        Self::new(&record[0], &record[1], &record[2], &record[3])
    }

    /// Raw cell for a numeric column.
    pub fn value(&self, kind: SeriesKind) -> &str {
        match kind {
            SeriesKind::Total => &self.total,
            SeriesKind::Male => &self.male,
            SeriesKind::Female => &self.female,
        }
    }
}

/// Parsed dataset for one session. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Row>,
    index: HashMap<String, usize>,
}

impl Table {
    /// Parse raw CSV text. The first record is the header and is not a data row.
    pub fn parse(raw: &str) -> Result<Self, LoaderError> {
        let raw = raw.trim_start_matches('\u{feff}');
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(raw.as_bytes());

        let mut records: Vec<StringRecord> = Vec::new();
        for result in reader.records() {
            let record = result?;
            // Blank or whitespace-only line. `,,,` is a row and is validated below.
            if record.len() == 1 && record[0].is_empty() {
                continue;
            }
            if record.len() != FIELD_COUNT {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                return Err(LoaderError::FieldCount {
                    line,
                    expected: FIELD_COUNT,
                    found: record.len(),
                });
            }
            records.push(record);
        }

        if records.len() < 2 {
            return Err(LoaderError::NotEnoughRows {
                found: records.len(),
            });
        }

        let header = records[0].iter().map(str::to_string).collect();
        let rows = records[1..].iter().map(Row::from_record).collect();
        let table = Self::from_rows(header, rows)?;
        debug!(rows = table.row_count(), "parsed population table");
        Ok(table)
    }

    /// Build a table from already split rows, validating region names.
    pub fn from_rows(header: Vec<String>, rows: Vec<Row>) -> Result<Self, LoaderError> {
        if rows.is_empty() {
            return Err(LoaderError::NotEnoughRows {
                found: usize::from(!header.is_empty()),
            });
        }

        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.region.is_empty() {
                return Err(LoaderError::EmptyRegion { row: i });
            }
            if index.insert(row.region.clone(), i).is_some() {
                return Err(LoaderError::DuplicateRegion {
                    region: row.region.clone(),
                });
            }
        }

        Ok(Self {
            header,
            rows,
            index,
        })
    }

    /// Header fields as read from the first record.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows, never zero.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Region names in source order.
    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.region.as_str())
    }

    /// Row position for an exact, case-sensitive region name.
    pub fn position(&self, region: &str) -> Option<usize> {
        self.index.get(region).copied()
    }

    pub fn contains_region(&self, region: &str) -> bool {
        self.index.contains_key(region)
    }
}

/// Where the current table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Remote(String),
    File(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Holds the loaded table and where it was loaded from.
#[derive(Default)]
pub struct DataLoader {
    table: Option<Table>,
    source: Option<DataSource>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a local CSV file. Invalid UTF-8 is replaced, not rejected.
    pub fn read_file(path: &Path) -> Result<Table, LoaderError> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        Table::parse(&text)
    }

    /// Replace the current table (used after background loading).
    pub fn set_table(&mut self, table: Table, source: DataSource) {
        info!(rows = table.row_count(), source = %source, "table loaded");
        self.table = Some(table);
        self.source = Some(source);
    }

    pub fn get_table(&self) -> Result<&Table, LoaderError> {
        self.table.as_ref().ok_or(LoaderError::NoData)
    }

    pub fn get_source(&self) -> Option<&DataSource> {
        self.source.as_ref()
    }

    pub fn get_row_count(&self) -> usize {
        self.table.as_ref().map(Table::row_count).unwrap_or(0)
    }
}
