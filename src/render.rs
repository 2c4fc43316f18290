use std::io::Write;

use anyhow::{Context, Result};

use crate::grid::{CellClass, ScoreGrid};

/// One cell as a render surface sees it: a text label, a category for
/// styling, and an optional tooltip. Render surfaces depend on this view,
/// never on the grid internals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub label: String,
    pub class: CellClass,
    pub note: Option<String>,
}

/// Column labels: an empty corner cell, then every score in range order.
pub fn header_labels(grid: &ScoreGrid) -> Vec<String> {
    let mut labels = vec![String::new()];
    labels.extend(grid.range.scores().map(|s| s.to_string()));
    labels
}

/// Body rows, one per losing score: the row label plus a [`CellView`] per
/// column. Occurred cells are labeled with their occurrence count.
pub fn view_rows(grid: &ScoreGrid) -> Vec<(String, Vec<CellView>)> {
    grid.range
        .scores()
        .map(|row| {
            let cells = grid
                .range
                .scores()
                .map(|col| {
                    let cell = grid.cell(row, col).expect("coordinate is in range");
                    let label = if cell.count > 0 {
                        cell.count.to_string()
                    } else {
                        String::new()
                    };
                    CellView {
                        label,
                        class: cell.class,
                        note: cell.note.clone(),
                    }
                })
                .collect();
            (row.to_string(), cells)
        })
        .collect()
}

/// Writes the grid as an aligned plain-text table. Occurred cells show their
/// count; the other categories get one glyph each.
pub fn write_text_table(grid: &ScoreGrid, out: &mut impl Write) -> Result<()> {
    let header = header_labels(grid);
    let rows = view_rows(grid);
    let width = header
        .iter()
        .map(String::len)
        .chain(
            rows.iter()
                .flat_map(|(_, cells)| cells.iter().map(|c| c.label.len())),
        )
        .max()
        .unwrap_or(1)
        .max(1);

    let mut line = String::new();
    for label in &header {
        line.push_str(&format!("{label:>width$} "));
    }
    writeln!(out, "{}", line.trim_end()).context("write header row")?;

    for (label, cells) in rows {
        let mut line = format!("{label:>width$} ");
        for cell in cells {
            let text = match cell.class {
                CellClass::Occurred => cell.label,
                CellClass::Impossible => "#".to_string(),
                CellClass::Tie => "=".to_string(),
                CellClass::Open => ".".to_string(),
            };
            line.push_str(&format!("{text:>width$} "));
        }
        writeln!(out, "{}", line.trim_end()).context("write grid row")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GameRecord;
    use serde_json::json;

    fn sample_grid() -> ScoreGrid {
        let records = vec![
            GameRecord::new(json!(3), json!(7), "2021-01-01", "A", "W"),
            GameRecord::new(json!(7), json!(3), "2022-01-01", "B", "L"),
        ];
        ScoreGrid::build(&records).unwrap()
    }

    #[test]
    fn header_starts_with_empty_corner() {
        let grid = sample_grid();
        let header = header_labels(&grid);
        assert_eq!(header[0], "");
        assert_eq!(header[1], "3");
        assert_eq!(header.last().unwrap(), "7");
    }

    #[test]
    fn occurred_cells_are_labeled_with_counts() {
        let grid = sample_grid();
        let rows = view_rows(&grid);
        assert_eq!(rows.len(), 5);
        let (label, cells) = &rows[0];
        assert_eq!(label, "3");
        let hit = &cells[4];
        assert_eq!(hit.class, CellClass::Occurred);
        assert_eq!(hit.label, "2");
        assert!(hit.note.as_deref().unwrap().contains("vs B"));
    }

    #[test]
    fn text_table_has_one_line_per_row_plus_header() {
        let grid = sample_grid();
        let mut buf = Vec::new();
        write_text_table(&grid, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains('#'));
        assert!(text.contains('='));
    }
}
