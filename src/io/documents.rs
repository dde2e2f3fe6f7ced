//! Raw document reading.
//!
//! Walks an input directory and turns every supported document into
//! `RawRecord`s with their original keys and loosely-typed values:
//! - `.json`: a top-level array of objects; nested values are dropped
//! - `.yaml` / `.yml`: a top-level list of mappings, same rules as JSON
//! - `.csv`: one record per row, keyed by header
//!
//! Other files count as unsupported, and files that fail to parse count as
//! unreadable. Neither stops the walk.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{RawRecord, RawValue, SkipReason};
use crate::error::AppError;
use crate::report::SkipTally;

/// Everything read from one input directory.
#[derive(Debug, Clone, Default)]
pub struct DocumentBatch {
    pub records: Vec<RawRecord>,
    /// Documents that parsed successfully.
    pub documents_read: usize,
    pub skips: SkipTally,
}

/// Read every document below `root`, in sorted path order.
pub fn read_documents(root: &Path) -> Result<DocumentBatch, AppError> {
    if !root.is_dir() {
        return Err(AppError::new(
            2,
            format!("Input directory '{}' does not exist", root.display()),
        ));
    }

    let mut batch = DocumentBatch::default();
    for path in collect_document_paths(root)? {
        let parsed = match extension(&path).as_deref() {
            Some("json") => fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| parse_json_records(&text)),
            Some("yaml" | "yml") => fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| parse_yaml_records(&text)),
            Some("csv") => fs::File::open(&path)
                .map_err(|e| e.to_string())
                .and_then(parse_csv_records),
            _ => {
                debug!(path = %path.display(), "unsupported document");
                batch.skips.add(SkipReason::UnsupportedDocument);
                continue;
            }
        };

        match parsed {
            Ok(records) => {
                debug!(path = %path.display(), records = records.len(), "read document");
                batch.documents_read += 1;
                batch.records.extend(records);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable document");
                batch.skips.add(SkipReason::UnreadableDocument);
            }
        }
    }
    Ok(batch)
}

/// All regular files below `root`, recursively, sorted by path.
pub fn collect_document_paths(root: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut out = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| {
            AppError::new(2, format!("Failed to list '{}': {e}", dir.display()))
        })?;
        for entry in entries {
            let path = entry
                .map_err(|e| AppError::new(2, format!("Failed to list '{}': {e}", dir.display())))?
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Parse a JSON document: an array of objects, scalar members only.
///
/// Array items that are not objects are ignored.
pub fn parse_json_records(text: &str) -> Result<Vec<RawRecord>, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;
    let Value::Array(items) = value else {
        return Err("expected a top-level array of records".to_string());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(
                map.into_iter()
                    .filter_map(|(k, v)| json_scalar(v).map(|v| (k, v)))
                    .collect::<RawRecord>(),
            ),
            _ => None,
        })
        .collect())
}

fn json_scalar(value: Value) -> Option<RawValue> {
    match value {
        Value::Null => Some(RawValue::Null),
        Value::Bool(b) => Some(RawValue::Bool(b)),
        Value::Number(n) => n
            .as_i64()
            .map(RawValue::Integer)
            .or_else(|| n.as_f64().map(RawValue::Float)),
        Value::String(s) => Some(RawValue::Text(s)),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parse a YAML document: a list of mappings, scalar members only.
///
/// List items that are not mappings are ignored, as are non-string keys.
pub fn parse_yaml_records(text: &str) -> Result<Vec<RawRecord>, String> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| format!("invalid YAML: {e}"))?;
    let serde_yaml::Value::Sequence(items) = value else {
        return Err("expected a top-level list of records".to_string());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_yaml::Value::Mapping(map) => Some(
                map.into_iter()
                    .filter_map(|(k, v)| match k {
                        serde_yaml::Value::String(k) => yaml_scalar(v).map(|v| (k, v)),
                        _ => None,
                    })
                    .collect::<RawRecord>(),
            ),
            _ => None,
        })
        .collect())
}

fn yaml_scalar(value: serde_yaml::Value) -> Option<RawValue> {
    use serde_yaml::Value as Y;
    match value {
        Y::Null => Some(RawValue::Null),
        Y::Bool(b) => Some(RawValue::Bool(b)),
        Y::Number(n) => n
            .as_i64()
            .map(RawValue::Integer)
            .or_else(|| n.as_f64().map(RawValue::Float)),
        Y::String(s) => Some(RawValue::Text(s)),
        Y::Sequence(_) | Y::Mapping(_) | Y::Tagged(_) => None,
    }
}

/// Parse a CSV document; cells are typed with `RawValue::infer`.
pub fn parse_csv_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| format!("failed to read CSV headers: {e}"))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut out = Vec::new();
    for (idx, rec) in rdr.records().enumerate() {
        // +2: 1-based lines, after the header line
        let rec = rec.map_err(|e| format!("CSV parse error on line {}: {e}", idx + 2))?;
        out.push(
            headers
                .iter()
                .zip(rec.iter())
                .map(|(h, cell)| (h.clone(), RawValue::infer(cell)))
                .collect::<RawRecord>(),
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keeps_scalars_in_document_order() {
        let text = r#"[
            {"tradingsymbol": "SBIN", "date": "2024-01-02", "close": 612.5, "volume": 1200, "tags": ["x"]},
            7,
            {"Symbol": "TCS", "Close": null}
        ]"#;
        let records = parse_json_records(text).unwrap();
        assert_eq!(records.len(), 2);

        let keys: Vec<&str> = records[0].iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["tradingsymbol", "date", "close", "volume"]);
        assert_eq!(records[0].get("volume"), Some(&RawValue::Integer(1200)));
        assert_eq!(records[0].get("close"), Some(&RawValue::Float(612.5)));
        assert_eq!(records[1].get("Close"), Some(&RawValue::Null));
    }

    #[test]
    fn json_object_at_top_level_is_rejected() {
        assert!(parse_json_records(r#"{"symbol": "SBIN"}"#).is_err());
        assert!(parse_json_records("not json").is_err());
    }

    #[test]
    fn yaml_keeps_scalars_in_document_order() {
        let text = "\
- tradingsymbol: SBIN
  date: 2024-01-02
  close: 612.5
  volume: 1200
  tags: [x]
- plain
- Symbol: TCS
  Close: ~
  7: seven
";
        let records = parse_yaml_records(text).unwrap();
        assert_eq!(records.len(), 2);

        let keys: Vec<&str> = records[0].iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["tradingsymbol", "date", "close", "volume"]);
        assert_eq!(records[0].get("date"), Some(&RawValue::Text("2024-01-02".into())));
        assert_eq!(records[0].get("volume"), Some(&RawValue::Integer(1200)));
        assert_eq!(records[0].get("close"), Some(&RawValue::Float(612.5)));
        assert_eq!(records[1].get("Close"), Some(&RawValue::Null));
        assert_eq!(records[1].iter().count(), 2);
    }

    #[test]
    fn yaml_mapping_at_top_level_is_rejected() {
        assert!(parse_yaml_records("symbol: SBIN\n").is_err());
        assert!(parse_yaml_records("- [unclosed\n").is_err());
    }

    #[test]
    fn csv_rows_become_records() {
        let data = "\u{feff}Symbol,Date,Close\nINFY,2024-01-02,1500.5\nINFY,2024-01-03,\n";
        let records = parse_csv_records(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Symbol"), Some(&RawValue::Text("INFY".into())));
        assert_eq!(records[0].get("Close"), Some(&RawValue::Float(1500.5)));
        assert_eq!(records[1].get("Close"), Some(&RawValue::Null));
    }

    #[test]
    fn directory_walk_counts_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024").join("jan");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("b.json"), r#"[{"symbol":"TCS","date":"2024-01-02"}]"#).unwrap();
        fs::write(nested.join("a.csv"), "symbol,date\nSBIN,2024-01-02\nSBIN,2024-01-03\n").unwrap();
        fs::write(dir.path().join("broken.json"), "[{").unwrap();
        fs::write(dir.path().join("c.yaml"), "- symbol: INFY\n  date: 2024-01-02\n").unwrap();
        fs::write(dir.path().join("d.yml"), "symbol: ITC\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "- symbol: X\n").unwrap();

        let batch = read_documents(dir.path()).unwrap();
        assert_eq!(batch.documents_read, 3);
        assert_eq!(batch.records.len(), 4);
        // 2024/jan/a.csv sorts before b.json, c.yaml comes last
        assert_eq!(batch.records[0].get("symbol"), Some(&RawValue::Text("SBIN".into())));
        assert_eq!(batch.records[3].get("symbol"), Some(&RawValue::Text("INFY".into())));
        assert_eq!(batch.records[3].get("date"), Some(&RawValue::Text("2024-01-02".into())));
        // broken.json and the non-list d.yml
        assert_eq!(batch.skips.get(SkipReason::UnreadableDocument), 2);
        assert_eq!(batch.skips.get(SkipReason::UnsupportedDocument), 1);
    }

    #[test]
    fn missing_root_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_documents(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
