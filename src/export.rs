use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::grid::{CellClass, ScoreGrid};
use crate::render::{header_labels, view_rows};

pub struct ExportReport {
    pub grid_rows: usize,
    pub scores_listed: usize,
}

/// Writes the grid to an XLSX workbook: a `Grid` sheet mirroring the table
/// (counts for occurred cells, markers for the rest) and a `Scores` sheet
/// listing each observed score pair with its count and latest note.
pub fn export_workbook(path: &Path, grid: &ScoreGrid) -> Result<ExportReport> {
    let grid_rows = grid_sheet_rows(grid);
    let scores_rows = scores_sheet_rows(grid);
    let scores_listed = scores_rows.len() - 1;

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Grid")?;
        write_rows(sheet, &grid_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Scores")?;
        write_rows(sheet, &scores_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        grid_rows: grid_rows.len(),
        scores_listed,
    })
}

fn grid_sheet_rows(grid: &ScoreGrid) -> Vec<Vec<String>> {
    let mut rows = vec![header_labels(grid)];
    for (label, cells) in view_rows(grid) {
        let mut row = vec![label];
        for cell in cells {
            row.push(match cell.class {
                CellClass::Occurred => cell.label,
                CellClass::Impossible => "#".to_string(),
                CellClass::Tie => "=".to_string(),
                CellClass::Open => String::new(),
            });
        }
        rows.push(row);
    }
    rows
}

fn scores_sheet_rows(grid: &ScoreGrid) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Low".to_string(),
        "High".to_string(),
        "Count".to_string(),
        "Last Game".to_string(),
    ]];
    for row in grid.range.scores() {
        for col in grid.range.scores() {
            let Some(cell) = grid.cell(row, col) else {
                continue;
            };
            if cell.count == 0 {
                continue;
            }
            rows.push(vec![
                row.to_string(),
                col.to_string(),
                cell.count.to_string(),
                cell.note.clone().unwrap_or_default(),
            ]);
        }
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GameRecord;
    use serde_json::json;

    #[test]
    fn sheet_rows_cover_grid_and_observed_scores() {
        let records = vec![
            GameRecord::new(json!(3), json!(7), "2021-01-01", "A", "W"),
            GameRecord::new(json!(6), json!(4), "2021-10-01", "C", "W"),
        ];
        let grid = ScoreGrid::build(&records).unwrap();

        let grid_rows = grid_sheet_rows(&grid);
        assert_eq!(grid_rows.len(), 6);
        assert_eq!(grid_rows[0].len(), 6);

        let scores = scores_sheet_rows(&grid);
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[1], vec!["3", "7", "1", "7-3: 2021-01-01 - vs A (W)"]);
    }
}
