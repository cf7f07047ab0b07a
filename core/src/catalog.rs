use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub const COURSE_NO: &str = "Course No";
pub const COURSE_TITLE: &str = "Course Title";
pub const COURSE_DESCRIPTION: &str = "Course Description";
pub const RELEASED_LANGUAGES: &str = "Released Languages";
pub const AUDIENCE: &str = "Who This Course is For";

pub const REQUIRED_COLUMNS: &[&str] = &[COURSE_TITLE, COURSE_DESCRIPTION, RELEASED_LANGUAGES, AUDIENCE];

/// Loosely typed table as handed over by a catalog loader: named columns and
/// one JSON object per row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub records: Vec<Map<String, Value>>,
}

impl Table {
    /// Columns are the union of record keys, in first-seen order.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, records }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Check the required columns once, then convert every record.
    pub fn to_courses(&self) -> Result<Vec<RawCourse>, SchemaError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError { missing });
        }
        Ok(self.records.iter().map(RawCourse::from_record).collect())
    }
}

/// A catalog row before language normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCourse {
    pub course_no: Option<String>,
    pub title: String,
    pub about: String,
    pub audience: String,
    pub languages_raw: Option<String>,
}

impl RawCourse {
    fn from_record(record: &Map<String, Value>) -> Self {
        let text = |key: &str| record.get(key).and_then(cell_text).unwrap_or_default();
        Self {
            course_no: record.get(COURSE_NO).and_then(cell_text),
            title: text(COURSE_TITLE),
            about: text(COURSE_DESCRIPTION),
            audience: text(AUDIENCE),
            languages_raw: record.get(RELEASED_LANGUAGES).and_then(cell_text),
        }
    }
}

/// Render a cell as text; `null` is an empty cell.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// An indexed catalog row with its canonical language set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub course_no: Option<String>,
    pub title: String,
    pub about: String,
    pub audience: String,
    pub languages: BTreeSet<String>,
}

impl CatalogRow {
    /// Text the row is indexed under.
    pub fn searchable_text(&self) -> String {
        format!("{} \n{} \n{}", self.title, self.about, self.audience)
    }
}
