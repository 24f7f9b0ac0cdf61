//! Column-oriented JSON dataset to a flat CSV.
//!
//! The input is an object of fields, each an object keyed by the row index
//! as a string: `{ "Age": { "0": 23, "1": 40 }, "CITY": { "0": "Rewa", ... } }`.
//! Cells are written as their JSON text, so strings keep their quotes.
use crate::error::{Result, RiskError};
use log::{info, warn};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Field dropped from the output.
pub const ID_FIELD: &str = "Id";

/// Flattened table: headers in sorted field order and one row of JSON text
/// per record.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FlatTable {
    /// Flatten a parsed column-oriented object. The row count is taken from
    /// the first field; missing cells become `null`.
    pub fn from_columns(columns: &Map<String, Value>) -> std::result::Result<Self, String> {
        let mut fields: Vec<(&String, &Map<String, Value>)> = Vec::new();
        for (name, column) in columns {
            if name == ID_FIELD {
                continue;
            }
            let column = column
                .as_object()
                .ok_or_else(|| format!("field {name:?} is not an object of rows"))?;
            fields.push((name, column));
        }
        // serde_json keeps object keys sorted unless preserve_order is on
        fields.sort_by(|a, b| a.0.cmp(b.0));

        let row_count = fields.first().map_or(0, |(_, c)| c.len());
        let headers = fields.iter().map(|(n, _)| n.to_string()).collect();
        let rows = (0..row_count)
            .map(|row| {
                let key = row.to_string();
                fields
                    .iter()
                    .map(|(_, column)| column.get(&key).unwrap_or(&Value::Null).to_string())
                    .collect()
            })
            .collect();
        Ok(Self { headers, rows })
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| RiskError::io(path, e))?;
        let mut out = BufWriter::new(file);
        let io_err = |e: std::io::Error| RiskError::io(path, e);
        writeln!(out, "{}", self.headers.join(",")).map_err(io_err)?;
        for row in &self.rows {
            writeln!(out, "{}", row.join(",")).map_err(io_err)?;
        }
        out.flush().map_err(io_err)?;
        Ok(())
    }
}

/// Read the JSON dataset at `input` and write it flattened to `output`.
pub fn transform_json_to_csv(input: &Path, output: &Path) -> Result<FlatTable> {
    let file = File::open(input).map_err(|e| RiskError::io(input, e))?;
    let value: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| RiskError::Json {
            path: input.to_path_buf(),
            source,
        })?;
    let format_err = |reason: String| RiskError::Format {
        path: input.to_path_buf(),
        reason,
    };
    let columns = value
        .as_object()
        .ok_or_else(|| format_err("top level is not an object".into()))?;
    let table = FlatTable::from_columns(columns).map_err(format_err)?;
    if table.rows.is_empty() {
        warn!("{} holds no records", input.display());
    }
    table.write_csv(output)?;
    info!(
        "flattened {} records with {} fields into {}",
        table.rows.len(),
        table.headers.len(),
        output.display()
    );
    Ok(table)
}
