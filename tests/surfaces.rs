use serde_json::json;

use scorigami_terminal::export::export_workbook;
use scorigami_terminal::grid::ScoreGrid;
use scorigami_terminal::html::render_html;
use scorigami_terminal::record::GameRecord;
use scorigami_terminal::render::write_text_table;

fn sample_grid() -> ScoreGrid {
    let records = vec![
        GameRecord::new(json!(13), json!(34), "1990-09-01", "Western Carolina", "W"),
        GameRecord::new(json!(12), json!(28), "1990-09-08", "Georgia Tech", "L"),
        GameRecord::new(json!(34), json!(13), "1994-10-22", "Duke", "W"),
    ];
    ScoreGrid::build(&records).unwrap()
}

#[test]
fn text_table_shows_counts_and_categories() {
    let grid = sample_grid();
    let mut buf = Vec::new();
    write_text_table(&grid, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    // Header plus one line per score in 12..=34.
    assert_eq!(text.lines().count(), 24);
    assert!(text.contains(" 2"));
    assert!(text.contains('='));
    assert!(text.contains('.'));
}

#[test]
fn html_report_carries_tooltips_and_summary() {
    let grid = sample_grid();
    let html = render_html(&grid);
    assert!(html.contains("3 games plotted"));
    assert!(html.contains("2 distinct scores"));
    assert!(html.contains("title=\"34-13: 1994-10-22 - vs Duke (W)\""));
    assert!(html.contains("<td class=\"tie\">"));
}

#[test]
fn workbook_export_reports_written_rows() {
    let grid = sample_grid();
    let path = std::env::temp_dir().join("scorigami_export_test.xlsx");
    let report = export_workbook(&path, &grid).unwrap();
    assert_eq!(report.grid_rows, 24);
    assert_eq!(report.scores_listed, 2);
    assert!(path.exists());
    let _ = std::fs::remove_file(&path);
}
