use std::path::PathBuf;

use rugby_dashboard::dataset::load;
use rugby_dashboard::export::{export_player_report, report_file_name};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn exports_player_workbook() {
    let ds = load(&fixture("two_players.csv")).expect("fixture should load");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join(report_file_name("Ana Paz"));

    let report = export_player_report(&path, &ds, "Ana Paz").expect("export should succeed");

    assert_eq!(report.player, "Ana Paz");
    assert_eq!(report.history_rows, 2);
    assert_eq!(report.team_rows, 2);
    let size = std::fs::metadata(&path).expect("workbook written").len();
    assert!(size > 0);
}

#[test]
fn unknown_player_is_an_error() {
    let ds = load(&fixture("two_players.csv")).expect("fixture should load");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nobody.xlsx");

    assert!(export_player_report(&path, &ds, "Nadie").is_err());
    assert!(!path.exists());
}
