use county_report::output::{parse_csv, serialize, write_to, Format};
use county_report::{Table, Value};
use tempfile::TempDir;

fn summary() -> Table {
    Table::from_rows(
        "rezumat",
        &["Judet", "Populație 2024", "Rată Șomaj 2023 (%)"],
        vec![
            vec!["Timiș".into(), Value::Number(650_533.0), Value::Number(1.2)],
            vec!["Constanța".into(), Value::Number(655_997.0), Value::Null],
            vec!["Argeș".into(), Value::Number(0.1 + 0.2), Value::Number(-3.75)],
            vec!["Bistrița-Năsăud".into(), Value::Null, Value::Number(2.0)],
        ],
    )
}

#[test]
fn csv_round_trip_is_exact() {
    let table = summary();
    let bytes = serialize(&table, Format::Csv).unwrap();
    let back = parse_csv(&bytes, "rezumat", "Judet").unwrap();
    assert_eq!(back, table);
}

#[test]
fn excel_csv_round_trip_is_exact() {
    let table = summary();
    let bytes = serialize(&table, Format::CsvExcel).unwrap();
    assert_eq!(parse_csv(&bytes, "rezumat", "Judet").unwrap(), table);
}

#[test]
fn write_to_file_then_read_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tabel_rezumativ.csv");
    write_to(&path, &summary(), Format::Csv).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(parse_csv(&bytes, "rezumat", "Judet").unwrap(), summary());
}

#[test]
fn json_export_lists_every_row() {
    let bytes = serialize(&summary(), Format::Json).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1]["Judet"], "Constanța");
    assert!(rows[3]["Populație 2024"].is_null());
}

#[test]
fn xlsx_file_is_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tabel_rezumativ_economic.xlsx");
    write_to(&path, &summary(), Format::Xlsx).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(&bytes[..4], b"PK\x03\x04");
}

#[test]
fn non_key_cells_are_retyped_on_parse() {
    let table = Table::from_rows(
        "rezumat",
        &["Judet", "Cod", "Regiune"],
        vec![vec!["Cluj".into(), Value::from("012"), Value::from("Nord-Vest")]],
    );
    let bytes = serialize(&table, Format::Csv).unwrap();
    let back = parse_csv(&bytes, "rezumat", "Judet").unwrap();
    assert_eq!(back.get(0, "Cod"), Some(&Value::Number(12.0)));
    assert_eq!(back.get(0, "Regiune"), Some(&Value::from("Nord-Vest")));
}
