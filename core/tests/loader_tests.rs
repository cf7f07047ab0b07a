use coursebot_core::loader::load_table;
use coursebot_core::{IndexError, RetrievalIndex};
use std::fs;
use tempfile::tempdir;

const ROW_A: &str = r#"{"Course No": 1, "Course Title": "Honey Bee Farming", "Course Description": "Beekeeping", "Released Languages": "20,24", "Who This Course is For": "Farmers"}"#;
const ROW_B: &str = r#"{"Course No": 2, "Course Title": "Dairy Farming", "Course Description": "Cows", "Released Languages": 7, "Who This Course is For": "Farmers"}"#;

#[test]
fn loads_json_array() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("courses.json");
    fs::write(&file, format!("[{ROW_A},{ROW_B}]")).unwrap();
    let table = load_table(&file).unwrap();
    assert_eq!(table.records.len(), 2);
    let index = RetrievalIndex::from_table(&table).unwrap();
    assert_eq!(index.filter_by_language("Kannada", 10)[0].title, "Dairy Farming");
    assert_eq!(index.rows()[0].course_no.as_deref(), Some("1"));
}

#[test]
fn loads_jsonl_and_directories_in_name_order() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.jsonl"), format!("{ROW_B}\n\n")).unwrap();
    fs::write(dir.path().join("a.jsonl"), format!("{ROW_A}\n")).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    let table = load_table(dir.path()).unwrap();
    let index = RetrievalIndex::from_table(&table).unwrap();
    let titles: Vec<&str> = index.rows().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Honey Bee Farming", "Dairy Farming"]);
}

#[test]
fn missing_column_is_named() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("courses.jsonl");
    fs::write(&file, "{\"Course Title\": \"A\", \"Course Description\": \"x\", \"Released Languages\": \"24\"}\n").unwrap();
    let table = load_table(&file).unwrap();
    match RetrievalIndex::from_table(&table).unwrap_err() {
        IndexError::Schema(e) => assert_eq!(e.missing, vec!["Who This Course is For".to_string()]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejects_non_object_rows_and_missing_paths() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("bad.json");
    fs::write(&file, "[1, 2]").unwrap();
    assert!(load_table(&file).is_err());
    assert!(load_table(dir.path().join("nope.json")).is_err());
}
