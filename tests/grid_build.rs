use serde_json::json;

use scorigami_terminal::grid::{CellClass, IMPOSSIBLE_PAIRS, ScoreGrid, classify, compute_score_range};
use scorigami_terminal::record::GameRecord;
use scorigami_terminal::render::{header_labels, view_rows};

fn game(a: i64, b: i64, date: &str, opponent: &str, result: &str) -> GameRecord {
    GameRecord::new(json!(a), json!(b), date, opponent, result)
}

#[test]
fn range_excludes_malformed_records() {
    let records = vec![
        game(5, 10, "", "", ""),
        GameRecord::new(json!("x"), json!(3), "", "", ""),
        game(2, 2, "", "", ""),
    ];
    let range = compute_score_range(&records).unwrap();
    assert_eq!((range.min, range.max), (2, 10));
}

#[test]
fn duplicate_scores_keep_last_note_and_full_count() {
    let records = vec![
        game(3, 7, "2021-01-01", "A", "W"),
        game(3, 7, "2022-01-01", "B", "L"),
    ];
    let grid = ScoreGrid::build(&records).unwrap();
    let cell = grid.cell(3, 7).unwrap();
    assert_eq!(cell.count, 2);
    assert_eq!(cell.note.as_deref(), Some("7-3: 2022-01-01 - vs B (L)"));
}

#[test]
fn swapped_scores_land_on_the_same_cell() {
    let records = vec![
        game(3, 7, "2021-01-01", "A", "W"),
        game(7, 3, "2021-10-01", "B", "L"),
    ];
    let grid = ScoreGrid::build(&records).unwrap();
    assert_eq!(grid.cell(3, 7).unwrap().count, 2);
    assert_eq!(grid.cell(7, 3).unwrap().count, 0);
    assert_eq!(grid.cell(7, 3).unwrap().class, CellClass::Impossible);
}

#[test]
fn classification_follows_the_scoring_rules() {
    assert_eq!(classify(0, 1), CellClass::Impossible);
    assert_eq!(classify(1, 2), CellClass::Impossible);
    assert_eq!(classify(1, 6), CellClass::Open);
    assert_eq!(classify(4, 4), CellClass::Tie);
    assert!(IMPOSSIBLE_PAIRS.iter().all(|(low, high)| low != high));
}

#[test]
fn grid_dimensions_match_the_range() {
    let records = vec![game(2, 10, "", "", ""), game(5, 9, "", "", "")];
    let grid = ScoreGrid::build(&records).unwrap();
    assert_eq!(grid.range.span(), 9);

    let rows = view_rows(&grid);
    assert_eq!(rows.len(), 9);
    assert!(rows.iter().all(|(_, cells)| cells.len() == 9));
    assert_eq!(header_labels(&grid).len(), 10);
    assert!(grid.cell(1, 1).is_none());
    assert!(grid.cell(11, 11).is_none());
}

#[test]
fn build_is_idempotent() {
    let records = vec![
        game(3, 7, "2021-01-01", "A", "W"),
        game(0, 24, "2021-09-11", "B", "L"),
        GameRecord::new(json!("n/a"), json!(10), "2021-10-02", "C", "L"),
    ];
    let first = ScoreGrid::build(&records).unwrap();
    let second = ScoreGrid::build(&records).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.skipped, 1);
    assert_eq!(first.games_plotted, 2);
}

#[test]
fn impossible_cell_hits_are_surfaced_not_hidden() {
    let records = vec![game(0, 1, "1905-11-30", "Unknown", "L"), game(0, 6, "", "A", "W")];
    let grid = ScoreGrid::build(&records).unwrap();
    assert_eq!(grid.conflicts.len(), 1);
    assert!(grid.conflicts[0].contains("1-0"));

    // The game still shows; the report carries the inconsistency.
    let cell = grid.cell(0, 1).unwrap();
    assert_eq!(cell.class, CellClass::Occurred);
    assert_eq!(cell.count, 1);
}

#[test]
fn no_valid_scores_is_a_build_error() {
    let records = vec![GameRecord::new(json!("x"), json!("y"), "", "", "")];
    assert!(ScoreGrid::build(&records).is_err());
}
