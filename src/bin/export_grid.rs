use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use scorigami_terminal::export::export_workbook;
use scorigami_terminal::fetch;
use scorigami_terminal::grid::ScoreGrid;
use scorigami_terminal::html::render_html;
use scorigami_terminal::record::parse_games_json;
use scorigami_terminal::render::write_text_table;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let source = fetch::resolve_data_source(parse_flag("--data").as_deref());
    let format = parse_flag("--format").unwrap_or_else(|| "text".to_string());
    let out = parse_flag("--out").map(PathBuf::from);

    let raw = fetch::load_games_document(&source)?;
    let records = parse_games_json(&raw)?;
    let grid = ScoreGrid::build(&records)?;

    match format.as_str() {
        "text" => {
            let mut buf = Vec::new();
            write_text_table(&grid, &mut buf)?;
            match out {
                Some(path) => {
                    fs::write(&path, &buf)
                        .with_context(|| format!("write {}", path.display()))?;
                    println!("Text grid written to {}", path.display());
                }
                None => std::io::stdout()
                    .write_all(&buf)
                    .context("write grid to stdout")?,
            }
        }
        "html" => {
            let path = out.unwrap_or_else(|| PathBuf::from("scorigami.html"));
            fs::write(&path, render_html(&grid))
                .with_context(|| format!("write {}", path.display()))?;
            println!("HTML report written to {}", path.display());
        }
        "xlsx" => {
            let path = out.unwrap_or_else(|| PathBuf::from("scorigami.xlsx"));
            let report = export_workbook(&path, &grid)?;
            println!(
                "Workbook written to {} ({} grid rows, {} scores)",
                path.display(),
                report.grid_rows,
                report.scores_listed
            );
        }
        other => return Err(anyhow!("unknown --format {other} (text|html|xlsx)")),
    }

    println!(
        "Games: {} plotted, {} skipped, scores {}..{}",
        grid.games_plotted, grid.skipped, grid.range.min, grid.range.max
    );
    if !grid.conflicts.is_empty() {
        println!("Conflicts: {}", grid.conflicts.len());
        for conflict in grid.conflicts.iter().take(6) {
            println!(" - {conflict}");
        }
    }

    Ok(())
}

fn parse_flag(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
