//! End-to-end runs of the load → validate → report pipeline on temp files.

use std::path::{Path, PathBuf};

use assert_matches::assert_matches;
use tempfile::TempDir;

use gridval_cli::{execute, load_dataset, CliConfig, LoadError};
use gridval_core::schema::limitation::*;
use gridval_core::validation::ValidationStatus;
use gridval_core::CellValue;

const COLUMNS: [&str; 17] = [
    COL_CENTRALISATION_DATE,
    COL_REGION,
    COL_LIMITATION_NUMBER,
    COL_SITE_ID,
    COL_REQUEST_TYPE,
    COL_STATUS,
    COL_LIMIT_MW,
    COL_REQUESTED_START,
    COL_PLANNED_START,
    COL_PLANNED_END,
    COL_REALIZED_START,
    COL_REALIZED_END,
    COL_PLANNED_HOURS,
    COL_REQUESTED_HOURS,
    COL_REALIZED_HOURS,
    COL_NAZA_REQUEST,
    COL_COMPENSABLE,
];

fn clean_row(number: &str, site: &str) -> Vec<String> {
    [
        "2024-01-01 08:00:00",
        "NORD",
        number,
        site,
        REQUEST_MANUAL,
        STATUS_PLANNED_EXECUTED,
        "12",
        "2024-01-01",
        "02/01/2024",
        "2024-01-03",
        "2024-01-03",
        "2024-01-04",
        "2",
        "2",
        "2.5",
        NEGATIVE,
        AFFIRMATIVE,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn set(mut row: Vec<String>, column: &str, value: &str) -> Vec<String> {
    let pos = COLUMNS.iter().position(|c| *c == column).unwrap();
    row[pos] = value.to_string();
    row
}

fn write_csv(dir: &Path, rows: &[Vec<String>]) -> PathBuf {
    let mut lines = vec![COLUMNS
        .iter()
        .map(|c| if *c == COL_REGION { format!(" {c} ") } else { c.to_string() })
        .collect::<Vec<_>>()
        .join(",")];
    lines.extend(rows.iter().map(|r| r.join(",")));
    let path = dir.join("export.csv");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn config(input: PathBuf, report_dir: PathBuf) -> CliConfig {
    CliConfig {
        input,
        report_dir,
        parallel: true,
    }
}

#[test]
fn csv_run_writes_every_report() {
    let tmp = TempDir::new().unwrap();
    let blank = vec![String::new(); COLUMNS.len()];
    let automatic = set(clean_row("ALZ - 2", "P2"), COL_NAZA_REQUEST, AFFIRMATIVE);
    let no_region = set(clean_row("MAN - 3", "P3"), COL_REGION, "");
    let input = write_csv(
        tmp.path(),
        &[clean_row("MAN - 1", "P1"), blank, automatic, no_region],
    );
    let report_dir = tmp.path().join("out").join("rapports");

    let outcome = execute(&config(input, report_dir.clone())).unwrap();
    assert_eq!(outcome.summary.total_rows, 3);
    assert_eq!(outcome.summary.total_errors, 2);
    assert_eq!(outcome.summary.status, ValidationStatus::Warnings);
    assert_eq!(outcome.reports.json, report_dir.join("validation_results.json"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&outcome.reports.json).unwrap()).unwrap();
    assert_eq!(json["summary"]["status"], "warnings");
    // 2 findings over 3 rows x 3 passes.
    assert_eq!(json["metadata"]["quality_score"], 77.78);
    assert_eq!(outcome.quality_score, 77.78);
    assert!(json["metadata"]["duration_seconds"].as_f64().unwrap() >= 0.0);
    assert_eq!(json["summary"]["by_kind"]["null_value"], 1);
    assert_eq!(json["summary"]["by_kind"]["invalid_enum_value"], 1);

    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors[0]["kind"], "null_value");
    assert_eq!(errors[0]["column"], COL_REGION);
    assert_eq!(errors[0]["row"], 2);
    assert_eq!(errors[1]["kind"], "invalid_enum_value");
    assert_eq!(errors[1]["column"], COL_REQUEST_TYPE);
    assert_eq!(errors[1]["row"], 1);

    let nulls = json["null_summary"].as_array().unwrap();
    assert_eq!(nulls.len(), COLUMNS.len());
    assert_eq!(nulls[0]["column"], COL_REGION);
    assert_eq!(nulls[0]["null_percentage"], 33.33);

    let md = std::fs::read_to_string(&outcome.reports.markdown).unwrap();
    assert!(md.contains("- Rows analysed: 3"));
    assert!(md.contains("## Business rules (1)"));

    assert_eq!(outcome.reports.html, report_dir.join("summary.html"));
    let html = std::fs::read_to_string(&outcome.reports.html).unwrap();
    assert!(html.contains("<h2>Business rules (1)</h2>"));
}

#[test]
fn sequential_run_matches_parallel() {
    let tmp = TempDir::new().unwrap();
    let rows: Vec<_> = (0..50)
        .map(|i| {
            let row = clean_row(&format!("MAN - {i}"), &format!("P{}", i % 10));
            if i % 4 == 0 {
                set(row, COL_LIMIT_MW, "n/a")
            } else {
                row
            }
        })
        .collect();
    let input = write_csv(tmp.path(), &rows);

    let parallel = execute(&config(input.clone(), tmp.path().join("a"))).unwrap();
    let mut sequential_cfg = config(input, tmp.path().join("b"));
    sequential_cfg.parallel = false;
    let sequential = execute(&sequential_cfg).unwrap();

    assert_eq!(parallel.summary, sequential.summary);
    let read = |p: &Path| -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(p).unwrap()).unwrap()
    };
    assert_eq!(
        read(&parallel.reports.json)["errors"],
        read(&sequential.reports.json)["errors"]
    );
}

#[test]
fn json_input_is_loaded() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("export.json");
    std::fs::write(
        &path,
        r#"[{"N° LIMITATION": "ALZ - 1", "DATE CENTRALISATION": "01/02/2024"}]"#,
    )
    .unwrap();

    let ds = load_dataset(&path).unwrap();
    assert_eq!(ds.len(), 1);
    let row = ds.row(0).unwrap();
    assert_matches!(row.get(COL_CENTRALISATION_DATE), Some(CellValue::Timestamp(_)));
    assert_eq!(row.get(COL_LIMITATION_NUMBER), Some(&CellValue::text("ALZ - 1")));
}

#[test]
fn input_failures_are_fatal() {
    let tmp = TempDir::new().unwrap();

    let missing = execute(&config(tmp.path().join("nope.csv"), tmp.path().join("r")));
    let err = missing.unwrap_err();
    assert_matches!(err.downcast_ref::<LoadError>(), Some(LoadError::NotFound(_)));

    let txt = tmp.path().join("export.txt");
    std::fs::write(&txt, COLUMNS.join(",")).unwrap();
    let err = execute(&config(txt, tmp.path().join("r"))).unwrap_err();
    assert_matches!(
        err.downcast_ref::<LoadError>(),
        Some(LoadError::UnsupportedFormat { .. })
    );
    assert!(!tmp.path().join("r").exists());

    let xlsx = tmp.path().join("export.xlsx");
    std::fs::write(&xlsx, b"PK").unwrap();
    let err = execute(&config(xlsx, tmp.path().join("r"))).unwrap_err();
    assert_matches!(err.downcast_ref::<LoadError>(), Some(LoadError::Spreadsheet(_)));
    assert!(!tmp.path().join("r").exists());

    let empty = tmp.path().join("empty.csv");
    std::fs::write(&empty, COLUMNS.join(",")).unwrap();
    let err = execute(&config(empty, tmp.path().join("r"))).unwrap_err();
    assert_matches!(err.downcast_ref::<LoadError>(), Some(LoadError::Empty));
}
