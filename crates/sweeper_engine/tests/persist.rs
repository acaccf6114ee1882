use std::fs;

use pretty_assertions::assert_eq;
use sweeper_engine::{ensure_output_dir, render_report, write_report, AtomicFileWriter, FileRecord};
use tempfile::TempDir;

fn record(id: u64, name: Option<&str>) -> FileRecord {
    FileRecord {
        id,
        url: format!("https://h/files/{id}"),
        display_name: name.map(str::to_string),
        created_at: None,
        download_url: Some(format!("https://h/files/{id}/download?download_frd=1")),
    }
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("output");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("report.json", b"[]").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "[]");

    let second = writer.write("report.json", b"[1]").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "[1]");
}

#[test]
fn report_is_indented_json_with_nulls() {
    let rendered = String::from_utf8(render_report(&[record(9, None)]).unwrap()).unwrap();
    let expected = r#"[
    {
        "id": 9,
        "url": "https://h/files/9",
        "display_name": null,
        "created_at": null,
        "download_url": "https://h/files/9/download?download_frd=1"
    }
]"#;
    assert_eq!(rendered, expected);
}

#[test]
fn write_report_uses_timestamped_name() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("output");
    let records = vec![record(12, Some("a.pdf")), record(3, Some("b.pdf"))];

    let path = write_report(&dir, &records, "20240501-093000").unwrap();
    assert_eq!(path, dir.join("20240501-093000-canvas-files.json"));

    let parsed: Vec<FileRecord> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, records);
}

#[test]
fn write_report_fails_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    assert!(write_report(&file_path, &[], "20240501-093000").is_err());
}
