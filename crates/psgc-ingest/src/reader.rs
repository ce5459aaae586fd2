//! Source-file readers — CSV, JSON, and Excel to [`RawRecord`] batches.
//!
//! Readers are deliberately tolerant: header spellings are left to the
//! record's alias resolution, blank rows are dropped, and numeric cells
//! (codes frequently arrive as spreadsheet floats) are rendered back to
//! their integer text.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use calamine::{Data, Reader as _};
use psgc_core::record::RawRecord;
use serde_json::Value;

use crate::{Error, Result};

/// Read any supported source file into raw records, dispatching on the
/// file extension.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
  let extension = path
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_lowercase)
    .unwrap_or_default();

  match extension.as_str() {
    "csv" => read_csv(BufReader::new(File::open(path)?)),
    "json" => read_json(BufReader::new(File::open(path)?), path),
    "xlsx" | "xls" | "xlsm" => read_xlsx(path),
    _ => Err(Error::UnsupportedFormat { path: path.to_path_buf() }),
  }
}

// ─── CSV ─────────────────────────────────────────────────────────────────────

/// Read CSV content. The first row is taken as headers; short rows are
/// tolerated.
pub fn read_csv(input: impl Read) -> Result<Vec<RawRecord>> {
  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(input);

  let headers = reader.headers()?.clone();
  let mut records = Vec::new();
  for row in reader.records() {
    let row = row?;
    let mut record = RawRecord::new();
    for (header, value) in headers.iter().zip(row.iter()) {
      record.insert(header, value);
    }
    if !record.is_empty() {
      records.push(record);
    }
  }
  Ok(records)
}

// ─── JSON ────────────────────────────────────────────────────────────────────

/// Read a JSON array of flat objects, or an object wrapping one under a
/// `data` key. Nested values are skipped; scalars become field text.
pub fn read_json(input: impl Read, path: &Path) -> Result<Vec<RawRecord>> {
  let value: Value = serde_json::from_reader(input)?;

  let items = match value {
    Value::Array(items) => items,
    Value::Object(mut map) => match map.remove("data") {
      Some(Value::Array(items)) => items,
      _ => {
        return Err(Error::MalformedJson { path: path.to_path_buf() });
      }
    },
    _ => return Err(Error::MalformedJson { path: path.to_path_buf() }),
  };

  let mut records = Vec::new();
  for item in items {
    let Value::Object(map) = item else { continue };
    let mut record = RawRecord::new();
    for (key, value) in map {
      if let Some(text) = scalar_text(&value) {
        record.insert(&key, &text);
      }
    }
    if !record.is_empty() {
      records.push(record);
    }
  }
  Ok(records)
}

fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

// ─── Excel ───────────────────────────────────────────────────────────────────

/// Read the first worksheet of an Excel workbook. Row one is taken as
/// headers.
pub fn read_xlsx(path: &Path) -> Result<Vec<RawRecord>> {
  let mut workbook = calamine::open_workbook_auto(path)?;
  let sheet_name = workbook
    .sheet_names()
    .first()
    .cloned()
    .ok_or_else(|| Error::EmptyWorkbook { path: path.to_path_buf() })?;
  let range = workbook.worksheet_range(&sheet_name)?;

  let mut rows = range.rows();
  let Some(header_row) = rows.next() else {
    return Ok(Vec::new());
  };
  let headers: Vec<String> = header_row
    .iter()
    .map(|cell| cell_text(cell).unwrap_or_default())
    .collect();

  let mut records = Vec::new();
  for row in rows {
    let mut record = RawRecord::new();
    for (header, cell) in headers.iter().zip(row.iter()) {
      if header.is_empty() {
        continue;
      }
      if let Some(text) = cell_text(cell) {
        record.insert(header, &text);
      }
    }
    if !record.is_empty() {
      records.push(record);
    }
  }
  Ok(records)
}

/// Render a cell to field text. Whole-number floats come back as integer
/// text so codes survive the spreadsheet round-trip.
fn cell_text(cell: &Data) -> Option<String> {
  match cell {
    Data::String(s) => {
      let trimmed = s.trim();
      (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
    Data::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
    Data::Float(f) => Some(f.to_string()),
    Data::Int(i) => Some(i.to_string()),
    Data::Bool(b) => Some(b.to_string()),
    Data::DateTimeIso(s) => Some(s.clone()),
    _ => None,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use psgc_core::record::Field;

  #[test]
  fn csv_rows_become_records_with_source_headers() {
    let input = "\
10-digit PSGC,Name,Level
0137401000,City of Manila,City
0137401001,Barangay 1,Bgy
";
    let records = read_csv(input.as_bytes()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get(Field::Code), Some("0137401000"));
    assert_eq!(records[0].get(Field::Name), Some("City of Manila"));
    assert_eq!(records[1].get(Field::LevelHint), Some("Bgy"));
  }

  #[test]
  fn csv_blank_rows_are_dropped() {
    let input = "code,name\n130000000,NCR\n,\n";
    let records = read_csv(input.as_bytes()).unwrap();
    assert_eq!(records.len(), 1);
  }

  #[test]
  fn json_array_of_objects_parses() {
    let input = r#"[
      {"code": 137401000, "name": "City of Manila", "is_capital": true},
      {"psgc": "042111001", "name": "Poblacion", "ignored": {"nested": 1}}
    ]"#;
    let records =
      read_json(input.as_bytes(), Path::new("test.json")).unwrap();
    assert_eq!(records.len(), 2);
    // Numbers and booleans become field text.
    assert_eq!(records[0].get(Field::Code), Some("137401000"));
    assert_eq!(records[0].get(Field::IsCapital), Some("true"));
    assert_eq!(records[1].get(Field::Code), Some("042111001"));
  }

  #[test]
  fn json_data_envelope_is_unwrapped() {
    let input = r#"{"data": [{"code": "130000000", "name": "NCR"}], "count": 1}"#;
    let records =
      read_json(input.as_bytes(), Path::new("test.json")).unwrap();
    assert_eq!(records.len(), 1);
  }

  #[test]
  fn json_without_records_is_malformed() {
    let result = read_json(br#"{"rows": []}"#.as_slice(), Path::new("x.json"));
    assert!(matches!(result, Err(Error::MalformedJson { .. })));
  }

  #[test]
  fn unknown_extension_is_unsupported() {
    let result = read_records(Path::new("dataset.parquet"));
    assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
  }
}
