//! Reads catalog files into a [`Table`]. The index itself never touches disk.

use crate::catalog::Table;
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Load a `.json` / `.jsonl` catalog file, or every such file under a directory.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        bail!("catalog not found: {}", path.display());
    }

    let mut records = Vec::new();
    for file in files {
        let read = if extension(&file) == Some("jsonl") { read_jsonl(&file) } else { read_json(&file) };
        records.extend(read.with_context(|| format!("reading catalog file {}", file.display()))?);
    }
    tracing::debug!(path = %path.display(), records = records.len(), "loaded catalog");
    Ok(Table::from_records(records))
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

fn read_jsonl(file: &Path) -> Result<Vec<Map<String, Value>>> {
    let reader = BufReader::new(File::open(file)?);
    let mut records = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let value: Value = serde_json::from_str(&line).with_context(|| format!("line {}", lineno + 1))?;
        records.push(into_record(value)?);
    }
    Ok(records)
}

fn read_json(file: &Path) -> Result<Vec<Map<String, Value>>> {
    let reader = BufReader::new(File::open(file)?);
    let json: Value = serde_json::from_reader(reader)?;
    match json {
        Value::Array(arr) => arr.into_iter().map(into_record).collect(),
        other => Ok(vec![into_record(other)?]),
    }
}

fn into_record(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("expected a JSON object per catalog row, found {other}"),
    }
}
