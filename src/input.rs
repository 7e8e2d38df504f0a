use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::normalize::{parse_envelope, Envelope};

/// Reads the JSON envelope from `path`, or from stdin when no path is given.
pub fn read_envelope(path: Option<&Path>) -> Result<Envelope> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            raw
        }
    };
    debug!(bytes = raw.len(), "read input envelope");
    parse_envelope(&raw)
}

/// Builds an envelope from one CSV file per period.
pub fn csv_envelope(current: &Path, previous: Option<&Path>) -> Result<Envelope> {
    let current = csv_records(std::fs::File::open(current)?)?;
    let previous = match previous {
        Some(path) => Some(csv_records(std::fs::File::open(path)?)?),
        None => None,
    };
    Ok(Envelope { current, previous })
}

/// Each row becomes a record keyed by column name. Blank cells are absent
/// values; everything else stays text for the normalizer to coerce.
pub fn csv_records<R: Read>(source: R) -> Result<Vec<Value>> {
    let mut reader = csv::Reader::from_reader(source);
    let mut records = Vec::new();

    for row in reader.deserialize::<HashMap<String, String>>() {
        let row = row?;
        let fields: Map<String, Value> = row
            .into_iter()
            .map(|(column, cell)| {
                let value = if cell.trim().is_empty() {
                    Value::Null
                } else {
                    Value::String(cell)
                };
                (column, value)
            })
            .collect();
        records.push(Value::Object(fields));
    }

    debug!(rows = records.len(), "read CSV records");
    Ok(records)
}
