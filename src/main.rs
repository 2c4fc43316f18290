use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use scorigami_terminal::fetch;
use scorigami_terminal::grid::{CellClass, ScoreGrid};
use scorigami_terminal::record::parse_games_json;

struct App {
    source: String,
    grid: ScoreGrid,
    cursor: (u32, u32),
    help_overlay: bool,
    logs: Vec<String>,
    should_quit: bool,
}

impl App {
    fn new(source: String, grid: ScoreGrid) -> Self {
        let cursor = (grid.range.min, grid.range.min);
        let mut app = Self {
            source,
            grid,
            cursor,
            help_overlay: false,
            logs: Vec::new(),
            should_quit: false,
        };
        app.report_data_quality();
        app
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('h') | KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Char('l') | KeyCode::Right => self.move_cursor(0, 1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Char('g') => self.cursor = (self.grid.range.min, self.grid.range.min),
            KeyCode::Char('G') => self.cursor = (self.grid.range.max, self.grid.range.max),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            _ => {}
        }
    }

    fn move_cursor(&mut self, dr: i64, dc: i64) {
        let range = self.grid.range;
        let clamp = |v: i64| v.clamp(i64::from(range.min), i64::from(range.max)) as u32;
        self.cursor = (
            clamp(i64::from(self.cursor.0) + dr),
            clamp(i64::from(self.cursor.1) + dc),
        );
    }

    /// Rebuilds the whole grid from the source. A failed reload keeps the
    /// grid already on screen and logs the error instead.
    fn reload(&mut self) {
        match load_grid(&self.source) {
            Ok(grid) => {
                self.grid = grid;
                self.move_cursor(0, 0);
                self.push_log("[INFO] Reloaded data".to_string());
                self.report_data_quality();
            }
            Err(err) => self.push_log(format!("[WARN] Reload failed: {err}")),
        }
    }

    fn report_data_quality(&mut self) {
        if self.grid.skipped > 0 {
            self.push_log(format!(
                "[WARN] {} records skipped (non-integer scores)",
                self.grid.skipped
            ));
        }
        for conflict in self.grid.conflicts.clone() {
            self.push_log(format!("[WARN] {conflict}"));
        }
    }

    fn push_log(&mut self, line: String) {
        self.logs.push(line);
        if self.logs.len() > 50 {
            self.logs.remove(0);
        }
    }
}

fn load_grid(source: &str) -> Result<ScoreGrid> {
    let raw = fetch::load_games_document(source)?;
    let records = parse_games_json(&raw)?;
    ScoreGrid::build(&records)
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let source = fetch::resolve_data_source(parse_data_arg().as_deref());
    // Load before raw mode so a dead source fails as an ordinary error
    // instead of a mangled terminal.
    let grid = load_grid(&source)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(source, grid);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn parse_data_arg() -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix("--data=") {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == "--data" {
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

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_grid(frame, chunks[1], app);

    let detail = Paragraph::new(detail_text(app))
        .block(Block::default().title("Game").borders(Borders::ALL));
    frame.render_widget(detail, chunks[2]);

    let footer = Paragraph::new(footer_text(app)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    format!(
        "SCORIGAMI | {} games | {} distinct scores | range {}..{} | {} skipped",
        app.grid.games_plotted,
        app.grid.distinct_scores(),
        app.grid.range.min,
        app.grid.range.max,
        app.grid.skipped,
    )
}

fn footer_text(app: &App) -> String {
    match app.logs.last() {
        Some(line) => line.clone(),
        None => "h/j/k/l or arrows Move | g/G Corners | r Reload | ? Help | q Quit".to_string(),
    }
}

fn detail_text(app: &App) -> String {
    let (row, col) = app.cursor;
    let Some(cell) = app.grid.cell(row, col) else {
        return "No cell selected".to_string();
    };
    match cell.class {
        CellClass::Occurred => {
            let note = cell.note.as_deref().unwrap_or("");
            format!("{}-{} | {} game(s) | {}", col, row, cell.count, note)
        }
        class => format!("{}-{} | {}", col, row, class.label()),
    }
}

fn render_grid(frame: &mut Frame, area: Rect, app: &App) {
    let range = app.grid.range;
    let label_width = range.max.to_string().len();
    let cell_width = max_count_digits(&app.grid).max(2) + 1;

    if area.height < 2 || (area.width as usize) < label_width + cell_width + 1 {
        let empty =
            Paragraph::new("Grid needs more room").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let visible_rows = (area.height - 1) as usize;
    let visible_cols = (area.width as usize - label_width - 1) / cell_width;

    let (row_start, row_end) = visible_window(
        (app.cursor.0 - range.min) as usize,
        range.span() as usize,
        visible_rows,
    );
    let (col_start, col_end) = visible_window(
        (app.cursor.1 - range.min) as usize,
        range.span() as usize,
        visible_cols,
    );

    let mut lines: Vec<Line> = Vec::with_capacity(row_end - row_start + 1);

    let mut header_spans = vec![Span::raw(" ".repeat(label_width + 1))];
    for col_idx in col_start..col_end {
        let col = range.min + col_idx as u32;
        header_spans.push(Span::styled(
            format!("{col:>width$} ", width = cell_width - 1),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    lines.push(Line::from(header_spans));

    for row_idx in row_start..row_end {
        let row = range.min + row_idx as u32;
        let mut spans = vec![Span::styled(
            format!("{row:>label_width$} "),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        for col_idx in col_start..col_end {
            let col = range.min + col_idx as u32;
            let Some(cell) = app.grid.cell(row, col) else {
                continue;
            };
            let text = match cell.class {
                CellClass::Occurred => format!("{:>width$} ", cell.count, width = cell_width - 1),
                CellClass::Impossible => format!("{:>width$} ", "#", width = cell_width - 1),
                CellClass::Tie => format!("{:>width$} ", "=", width = cell_width - 1),
                CellClass::Open => format!("{:>width$} ", "·", width = cell_width - 1),
            };
            let mut style = cell_style(cell.class);
            if (row, col) == app.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(text, style));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn cell_style(class: CellClass) -> Style {
    match class {
        CellClass::Impossible => Style::default().fg(Color::DarkGray),
        CellClass::Tie => Style::default().fg(Color::Yellow),
        CellClass::Open => Style::default().fg(Color::White),
        CellClass::Occurred => Style::default().fg(Color::Black).bg(Color::Green),
    }
}

fn max_count_digits(grid: &ScoreGrid) -> usize {
    let mut digits = 1;
    for row in grid.range.scores() {
        for col in grid.range.scores() {
            if let Some(cell) = grid.cell(row, col) {
                digits = digits.max(cell.count.to_string().len());
            }
        }
    }
    digits
}

fn visible_window(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Scorigami Terminal - Help",
        "",
        "Rows are the losing score, columns the winning score.",
        "Green cells show how many games ended with that score;",
        "# cells are impossible, = cells are ties, · cells are open.",
        "",
        "  h/j/k/l or arrows   Move cursor",
        "  g / G               Jump to corners",
        "  r                   Reload data",
        "  ?                   Toggle help",
        "  q                   Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
