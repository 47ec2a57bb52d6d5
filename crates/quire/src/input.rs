//! Input data loading.
//!
//! An input descriptor is either an inline JSON object (anything starting
//! with `{`) or a path to a data file. Files are parsed by extension:
//!
//! | Extension | Parser | Result |
//! |-----------|--------|--------|
//! | `.yml`, `.yaml` | YAML | object |
//! | `.json` | JSON | object |
//! | `.csv` | CSV with header row | array of objects with string values |
//!
//! Any other extension yields an empty object. CSV cells are never converted
//! to numbers or booleans.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{BoxError, Error};

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Yaml,
    Json,
    Csv,
}

impl InputFormat {
    /// Selects the format from a path's (case-insensitive) extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yml" | "yaml" => Some(InputFormat::Yaml),
            "json" => Some(InputFormat::Json),
            "csv" => Some(InputFormat::Csv),
            _ => None,
        }
    }

    /// Parses file content into a data tree.
    pub fn parse(self, content: &str) -> Result<Value, BoxError> {
        match self {
            InputFormat::Yaml => {
                // An empty document is an empty object, not an error.
                if content.trim().is_empty() {
                    return Ok(Value::Object(Map::new()));
                }
                let map: Option<Map<String, Value>> = serde_yaml::from_str(content)?;
                Ok(Value::Object(map.unwrap_or_default()))
            }
            InputFormat::Json => {
                let map: Map<String, Value> = serde_json::from_str(content)?;
                Ok(Value::Object(map))
            }
            InputFormat::Csv => parse_csv(content),
        }
    }
}

/// Reads the data tree named by `descriptor`.
///
/// # Errors
///
/// [`Error::Input`] if the inline JSON is malformed, or the file cannot be
/// read or parsed.
pub fn read_input(descriptor: &str) -> Result<Value, Error> {
    if descriptor.starts_with('{') {
        let map: Map<String, Value> =
            serde_json::from_str(descriptor).map_err(|e| Error::input(descriptor, e))?;
        return Ok(Value::Object(map));
    }

    let path = Path::new(descriptor);
    let Some(format) = InputFormat::from_path(path) else {
        warn!(input = descriptor, "unrecognized input extension, using empty data");
        return Ok(Value::Object(Map::new()));
    };

    debug!(input = descriptor, ?format, "reading input file");
    let content = std::fs::read_to_string(path).map_err(|e| Error::input(descriptor, e))?;
    format
        .parse(&content)
        .map_err(|e| Error::input(descriptor, e))
}

/// Zips each record against the header row.
fn parse_csv(content: &str) -> Result<Value, BoxError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(key, cell)| (key.to_string(), Value::String(cell.to_string())))
            .collect();
        rows.push(Value::Object(row));
    }
    Ok(Value::Array(rows))
}
