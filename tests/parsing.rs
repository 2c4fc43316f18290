use std::fs;
use std::path::PathBuf;

use scorigami_terminal::record::{ScorePair, parse_games_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_mapping_fixture() {
    let raw = read_fixture("games.json");
    let records = parse_games_json(&raw).expect("fixture should parse");
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].opponent, "Western Carolina");
    assert_eq!(records[0].result, "W");
    assert_eq!(records[0].score_pair(), Some(ScorePair { low: 13, high: 34 }));
    // String and numeric score fields parse the same way.
    assert_eq!(records[1].score_pair(), Some(ScorePair { low: 12, high: 28 }));
    // Non-integer scores leave the record without a grid coordinate.
    assert_eq!(records[2].score_pair(), None);
}

#[test]
fn parses_list_fixture() {
    let raw = read_fixture("games_list.json");
    let records = parse_games_json(&raw).expect("fixture should parse");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].score_pair(), Some(ScorePair { low: 17, high: 21 }));
    // Missing score fields are carried but invalid.
    assert_eq!(records[1].score_pair(), None);
    assert_eq!(records[1].opponent, "Clemson");
    assert_eq!(records[1].date, "");
}

#[test]
fn document_without_games_key_fails() {
    assert!(parse_games_json("{\"matches\": []}").is_err());
    assert!(parse_games_json("not json").is_err());
    assert!(parse_games_json("{\"games\": \"x\"}").is_err());
}
