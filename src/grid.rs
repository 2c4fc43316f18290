use anyhow::{Result, anyhow};

use crate::record::{GameRecord, parse_score};

/// Score pairs that football scoring increments can never produce. Domain
/// knowledge, not derived from data; every entry has `low != high` so ties
/// are always classified by the `row == col` rule instead.
pub const IMPOSSIBLE_PAIRS: [(u32, u32); 6] = [(0, 1), (1, 2), (1, 3), (1, 4), (1, 5), (1, 7)];

/// Visual category of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    /// Unreachable under the sport's scoring rules (or below the diagonal).
    Impossible,
    /// `row == col`; no longer possible once the losing/winning split exists.
    Tie,
    /// Possible but never observed.
    Open,
    /// At least one recorded game ended with this score.
    Occurred,
}

impl CellClass {
    pub fn label(self) -> &'static str {
        match self {
            CellClass::Impossible => "impossible",
            CellClass::Tie => "tie",
            CellClass::Open => "open",
            CellClass::Occurred => "occurred",
        }
    }
}

/// Static classification of `(row, col)`, a pure function of the coordinates.
/// `col < row` is unreachable through `ScorePair` but classified defensively.
pub fn classify(row: u32, col: u32) -> CellClass {
    if col < row || IMPOSSIBLE_PAIRS.contains(&(row, col)) {
        CellClass::Impossible
    } else if row == col {
        CellClass::Tie
    } else {
        CellClass::Open
    }
}

/// Inclusive bounds over every valid score seen in the data, winner or loser.
/// Rows and columns of the grid both run over this same range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRange {
    pub min: u32,
    pub max: u32,
}

impl ScoreRange {
    /// Number of distinct score values covered.
    pub fn span(&self) -> u32 {
        self.max - self.min + 1
    }

    pub fn scores(&self) -> impl Iterator<Item = u32> + '_ {
        self.min..=self.max
    }
}

/// Min/max over all valid scores in `records`. An input with no valid score
/// at all has no defined range and is an explicit error, never sentinel
/// bounds.
pub fn compute_score_range(records: &[GameRecord]) -> Result<ScoreRange> {
    let mut range: Option<ScoreRange> = None;
    for record in records {
        // Both fields must be valid for either to count toward the range.
        let (Some(a), Some(b)) = (
            parse_score(&record.team_score),
            parse_score(&record.opp_score),
        ) else {
            continue;
        };
        let lo = a.min(b);
        let hi = a.max(b);
        range = Some(match range {
            None => ScoreRange { min: lo, max: hi },
            Some(r) => ScoreRange {
                min: r.min.min(lo),
                max: r.max.max(hi),
            },
        });
    }
    range.ok_or_else(|| anyhow!("no valid scores in dataset"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub class: CellClass,
    pub count: u32,
    /// Human-readable note for the most recently processed game at this
    /// score, `"{high}-{low}: {date} - vs {opponent} ({result})"`.
    pub note: Option<String>,
}

/// The fully classified, annotated grid. Built fresh from the record set on
/// every call; two builds over the same input are identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreGrid {
    pub range: ScoreRange,
    cells: Vec<Cell>,
    /// Valid records plotted onto the grid.
    pub games_plotted: usize,
    /// Records dropped by the score-validity rule.
    pub skipped: usize,
    /// One message per record that landed on a structurally impossible cell.
    /// The game is still counted and shown; the inconsistency is reported
    /// rather than silently overwritten or discarded.
    pub conflicts: Vec<String>,
}

impl ScoreGrid {
    pub fn build(records: &[GameRecord]) -> Result<Self> {
        let range = compute_score_range(records)?;
        let side = range.span() as usize;

        let mut cells = Vec::with_capacity(side * side);
        for row in range.scores() {
            for col in range.scores() {
                cells.push(Cell {
                    class: classify(row, col),
                    count: 0,
                    note: None,
                });
            }
        }

        let mut grid = Self {
            range,
            cells,
            games_plotted: 0,
            skipped: 0,
            conflicts: Vec::new(),
        };
        grid.overlay(records);
        Ok(grid)
    }

    /// Overlays observed games onto the classified cells. Duplicate score
    /// pairs are fine: the count accumulates and the note is last-write-wins
    /// over input order (pre-sort the records for first-occurrence notes).
    fn overlay(&mut self, records: &[GameRecord]) {
        for record in records {
            let Some(pair) = record.score_pair() else {
                self.skipped += 1;
                continue;
            };
            let note = format!(
                "{}-{}: {} - vs {} ({})",
                pair.high, pair.low, record.date, record.opponent, record.result
            );
            let idx = self.index(pair.low, pair.high);
            let cell = &mut self.cells[idx];
            if cell.class == CellClass::Impossible {
                self.conflicts.push(format!(
                    "score {}-{} recorded but marked impossible ({})",
                    pair.high, pair.low, note
                ));
            }
            cell.class = CellClass::Occurred;
            cell.count += 1;
            cell.note = Some(note);
            self.games_plotted += 1;
        }
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        if row < self.range.min || row > self.range.max {
            return None;
        }
        if col < self.range.min || col > self.range.max {
            return None;
        }
        Some(&self.cells[self.index(row, col)])
    }

    fn index(&self, row: u32, col: u32) -> usize {
        let side = self.range.span() as usize;
        (row - self.range.min) as usize * side + (col - self.range.min) as usize
    }

    /// Distinct score pairs observed at least once.
    pub fn distinct_scores(&self) -> usize {
        self.cells.iter().filter(|c| c.count > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_matches_scoring_rules() {
        assert_eq!(classify(0, 1), CellClass::Impossible);
        assert_eq!(classify(1, 2), CellClass::Impossible);
        assert_eq!(classify(1, 6), CellClass::Open);
        assert_eq!(classify(4, 4), CellClass::Tie);
        assert_eq!(classify(7, 3), CellClass::Impossible);
    }

    #[test]
    fn impossible_table_never_contains_a_tie() {
        assert!(IMPOSSIBLE_PAIRS.iter().all(|(low, high)| low != high));
        // (1,1) in particular is a tie, not an impossible score.
        assert_eq!(classify(1, 1), CellClass::Tie);
    }

    #[test]
    fn range_skips_malformed_records() {
        let records = vec![
            GameRecord::new(json!(5), json!(10), "", "", ""),
            GameRecord::new(json!("x"), json!(3), "", "", ""),
            GameRecord::new(json!(2), json!(2), "", "", ""),
        ];
        let range = compute_score_range(&records).unwrap();
        assert_eq!(range, ScoreRange { min: 2, max: 10 });
    }

    #[test]
    fn empty_valid_set_is_an_error() {
        let records = vec![GameRecord::new(json!("x"), json!("y"), "", "", "")];
        assert!(compute_score_range(&records).is_err());
        assert!(compute_score_range(&[]).is_err());
    }
}
