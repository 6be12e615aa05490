//! CSV upload ingest.
//!
//! Parses an uploaded byte buffer into a fresh [`LocationCollection`].
//! Validation order: parse failure, then missing required columns, then
//! per-row coordinate checks. A failed ingest returns an error and leaves
//! the caller's active dataset untouched; replacement is all-or-nothing.
//!
//! Expected header: `nama,lat,lon,kategori`. The `kategori` column is
//! optional; rows without it get an empty category so the category filter
//! still works. English spellings `name`/`category` are accepted as aliases.

use std::io::Cursor;

use log::warn;
use thiserror::Error;

use crate::{Location, LocationCollection};

/// What to do with a row whose `lat`/`lon` does not parse as a usable
/// coordinate (non-numeric, non-finite, or out of WGS84 range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidRowPolicy {
    /// Refuse the whole file, naming the offending row. Keeps dataset
    /// replacement all-or-nothing. This is the default.
    #[default]
    Reject,
    /// Drop the row, log a warning, and keep the rest of the file.
    Skip,
}

/// Ingest configuration.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub invalid_rows: InvalidRowPolicy,
}

/// Why an upload was refused. All variants are recoverable: the previous
/// dataset stays active and the user re-uploads.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Not parseable as UTF-8 delimited text with a header row.
    #[error("file is not readable as CSV: {0}")]
    Malformed(String),

    /// Parsed, but one or more required columns are absent.
    #[error("file is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A data row carries an unusable coordinate (only under
    /// [`InvalidRowPolicy::Reject`]).
    #[error("row {row}: column `{column}` is not a usable coordinate: {value:?}")]
    InvalidRow {
        /// 1-based line number, counting the header as line 1
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Column indices resolved from the header row.
struct ColumnMap {
    name: usize,
    lat: usize,
    lon: usize,
    category: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let mut name = None;
        let mut lat = None;
        let mut lon = None;
        let mut category = None;

        for (idx, raw) in headers.iter().enumerate() {
            match raw.trim().to_ascii_lowercase().as_str() {
                "nama" | "name" => name = name.or(Some(idx)),
                "lat" => lat = lat.or(Some(idx)),
                "lon" => lon = lon.or(Some(idx)),
                "kategori" | "category" => category = category.or(Some(idx)),
                _ => {}
            }
        }

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("nama".to_string());
        }
        if lat.is_none() {
            missing.push("lat".to_string());
        }
        if lon.is_none() {
            missing.push("lon".to_string());
        }
        if !missing.is_empty() {
            return Err(IngestError::MissingColumns(missing));
        }

        Ok(Self {
            // Presence checked above
            name: name.unwrap(),
            lat: lat.unwrap(),
            lon: lon.unwrap(),
            category,
        })
    }
}

/// Parse a coordinate field, requiring a finite value within `[min, max]`.
fn parse_coord(raw: &str, min: f64, max: f64) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (value.is_finite() && value >= min && value <= max).then_some(value)
}

/// Parse and validate an uploaded CSV buffer into a new collection.
///
/// On success the returned collection fully replaces the active one; on any
/// error nothing is replaced.
///
/// # Example
/// ```
/// use campus_map::{ingest, IngestOptions};
///
/// let csv = b"nama,lat,lon,kategori\nRektorat,-5.147665,119.432731,Administrasi\n";
/// let records = ingest(csv, &IngestOptions::default()).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].name, "Rektorat");
/// ```
pub fn ingest(bytes: &[u8], options: &IngestOptions) -> Result<LocationCollection, IngestError> {
    let mut reader = csv::Reader::from_reader(Cursor::new(bytes));

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Malformed(e.to_string()))?
        .clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut records = Vec::new();

    for (i, result) in reader.records().enumerate() {
        // Header is line 1
        let row = i + 2;
        let record = result.map_err(|e| IngestError::Malformed(e.to_string()))?;

        let name = record.get(columns.name).unwrap_or("").trim();
        let raw_lat = record.get(columns.lat).unwrap_or("");
        let raw_lon = record.get(columns.lon).unwrap_or("");
        let category = columns
            .category
            .and_then(|idx| record.get(idx))
            .unwrap_or("")
            .trim();

        let lat = parse_coord(raw_lat, -90.0, 90.0);
        let lon = parse_coord(raw_lon, -180.0, 180.0);

        let (lat, lon) = match (lat, lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            (bad_lat, _) => {
                let (column, value) = if bad_lat.is_none() {
                    ("lat", raw_lat)
                } else {
                    ("lon", raw_lon)
                };
                match options.invalid_rows {
                    InvalidRowPolicy::Reject => {
                        return Err(IngestError::InvalidRow {
                            row,
                            column,
                            value: value.to_string(),
                        });
                    }
                    InvalidRowPolicy::Skip => {
                        warn!("skipping row {row}: `{column}` is not a usable coordinate: {value:?}");
                        continue;
                    }
                }
            }
        };

        records.push(Location::new(name, lat, lon, category));
    }

    Ok(records)
}
