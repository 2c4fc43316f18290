use chrono::Utc;

use crate::grid::{CellClass, ScoreGrid};
use crate::render::{header_labels, view_rows};

/// Renders the grid as a self-contained HTML document: inline CSS, one table
/// cell per grid cell, category as a CSS class, annotation as the tooltip.
pub fn render_html(grid: &ScoreGrid) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Scorigami</title>
<style>{css}</style>
</head>
<body>
<div class="container">
<h1>Scorigami</h1>
{summary}
{table}
<p class="footer">generated {stamp}</p>
</div>
</body>
</html>"#,
        css = INLINE_CSS,
        summary = render_summary(grid),
        table = render_table(grid),
        stamp = Utc::now().format("%Y-%m-%d %H:%M UTC"),
    )
}

fn render_summary(grid: &ScoreGrid) -> String {
    let mut html = format!(
        "<p class=\"summary\">{} games plotted, {} distinct scores, scores {}..{}, {} skipped</p>\n",
        grid.games_plotted,
        grid.distinct_scores(),
        grid.range.min,
        grid.range.max,
        grid.skipped,
    );
    if !grid.conflicts.is_empty() {
        html.push_str("<ul class=\"conflicts\">\n");
        for conflict in &grid.conflicts {
            html.push_str(&format!("<li>{}</li>\n", escape(conflict)));
        }
        html.push_str("</ul>\n");
    }
    html
}

fn render_table(grid: &ScoreGrid) -> String {
    let mut html = String::from("<table class=\"grid\">\n<tr>");
    for label in header_labels(grid) {
        html.push_str(&format!("<th>{}</th>", escape(&label)));
    }
    html.push_str("</tr>\n");

    for (label, cells) in view_rows(grid) {
        html.push_str("<tr>");
        html.push_str(&format!("<th>{}</th>", escape(&label)));
        for cell in cells {
            let class = cell_css_class(cell.class);
            match cell.note {
                Some(note) => html.push_str(&format!(
                    "<td class=\"{class}\" title=\"{}\">{}</td>",
                    escape(&note),
                    escape(&cell.label)
                )),
                None => {
                    html.push_str(&format!("<td class=\"{class}\">{}</td>", escape(&cell.label)))
                }
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
    html
}

fn cell_css_class(class: CellClass) -> &'static str {
    match class {
        CellClass::Impossible => "imp",
        CellClass::Tie => "tie",
        CellClass::Open => "open",
        CellClass::Occurred => "hit",
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INLINE_CSS: &str = r#"
body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    color: #111827;
    background: #ffffff;
}
.container { max-width: 1200px; margin: 0 auto; padding: 16px; }
.summary { color: #374151; }
.conflicts { color: #b91c1c; }
table.grid { border-collapse: collapse; }
table.grid th, table.grid td {
    border: 1px solid #9ca3af;
    width: 26px;
    height: 22px;
    text-align: center;
    font-size: 12px;
}
td.imp { background: #111827; }
td.tie { background: #f59e0b; }
td.open { background: #ffffff; }
td.hit { background: #16a34a; color: #ffffff; cursor: help; }
.footer { color: #6b7280; font-size: 12px; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GameRecord;
    use serde_json::json;

    #[test]
    fn html_carries_classes_and_tooltips() {
        let records = vec![GameRecord::new(
            json!(3),
            json!(7),
            "2021-01-01",
            "A&M",
            "W",
        )];
        let grid = ScoreGrid::build(&records).unwrap();
        let html = render_html(&grid);
        assert!(html.contains("<td class=\"hit\" title=\"7-3: 2021-01-01 - vs A&amp;M (W)\">1</td>"));
        assert!(html.contains("td.imp"));
        assert!(html.contains("1 games plotted"));
    }

    #[test]
    fn escape_covers_html_metacharacters() {
        assert_eq!(escape("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#39;");
    }
}
