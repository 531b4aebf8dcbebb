use crate::app::{App, AppMode};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

pub fn draw(f: &mut Frame, app: &App) {
    let show_columns = app.config.features.column_selection && app.session.is_some();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(if show_columns { 3 } else { 0 }),
                Constraint::Min(1),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(f.size());

    if show_columns {
        draw_column_bar(f, chunks[0], app);
    }
    draw_data(f, chunks[1], app);
    draw_status(f, chunks[2], app);

    if let AppMode::Editing { row, col } = app.mode {
        draw_editor(f, f.size(), app, row, col);
    }
}

/// One entry per header column; disabled columns are dimmed.
fn draw_column_bar(f: &mut Frame, area: Rect, app: &App) {
    let Some(session) = &app.session else {
        return;
    };
    let mut spans = Vec::with_capacity(session.columns.len() * 2);
    for (idx, entry) in session.columns.entries().iter().enumerate() {
        let mut style = if session.columns.is_enabled_at(idx) {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT)
        };
        if idx == app.sel_col {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(format!(" {} ", capitalize(&entry.name)), style));
        spans.push(Span::raw(" "));
    }
    let p = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Columns (c toggle, R restore)"));
    f.render_widget(p, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let mode = match app.mode {
        AppMode::Normal => "NORMAL",
        AppMode::Editing { .. } => "EDIT",
        AppMode::OpenPrompt => "OPEN",
    };
    let page = if app.page_count() > 0 {
        format!(" page {}/{} ", app.page.index + 1, app.page_count())
    } else {
        String::new()
    };
    let text = Line::from(vec![
        Span::styled(
            format!("[{mode}]"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(page, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::raw(&app.status),
        match app.mode {
            AppMode::OpenPrompt => Span::raw(format!(" | {}_", app.prompt_buffer)),
            _ => Span::raw(""),
        },
    ]);
    let p = Paragraph::new(text).block(Block::default().borders(Borders::TOP));
    f.render_widget(p, area);
}

fn draw_data(f: &mut Frame, area: Rect, app: &App) {
    let title = app
        .session
        .as_ref()
        .map_or_else(|| "Data".to_string(), |s| format!("Data: {}", s.source));
    let block = Block::default().borders(Borders::ALL).title(title);
    let Some(session) = &app.session else {
        let p = Paragraph::new(
            "Press o to open a CSV file.\n\n\
             e edit | Space [ADD] flag | x collapse row | t cycle kind | c toggle column\n\
             R restore columns | E export CSV | Y export YAML | PgUp/PgDn page | q quit",
        )
        .block(block);
        f.render_widget(p, area);
        return;
    };

    let show_flags = app.config.features.flag_toggle;
    let header_cells = session.table.header().iter().enumerate().map(|(idx, name)| {
        let style = if session.columns.is_enabled_at(idx) {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Cell::from(capitalize(name)).style(style)
    });
    let mut header_cells: Vec<Cell> = header_cells.collect();
    if show_flags {
        header_cells.push(Cell::from("Add comment").style(Style::default().fg(Color::Cyan)));
    }
    let header = Row::new(header_cells);

    let first = app.visible_range().start;
    let mut rows = Vec::with_capacity(app.page_rows().len());
    for (r_idx, row) in app.page_rows().iter().enumerate() {
        let abs = first + r_idx;
        let stripe = if abs % 2 == 0 {
            Style::default()
        } else {
            Style::default().bg(Color::Rgb(0x36, 0x35, 0x35))
        };

        if session.table.is_row_hidden(abs) {
            let title = row.cells.first().map(|c| first_line(c)).unwrap_or_default();
            let mut cell = Cell::from(format!("▸ {title}"));
            if r_idx == app.sel_row {
                cell = cell.style(Style::default().bg(Color::Blue).fg(Color::Black));
            }
            rows.push(Row::new(vec![cell]).style(stripe.fg(Color::DarkGray)));
            continue;
        }

        let mut cells = Vec::with_capacity(row.width());
        for (c_idx, val) in row.cells.iter().enumerate() {
            let mut cell = Cell::from(first_line(val));
            if !session.columns.is_enabled_at(c_idx) {
                cell = cell.style(Style::default().fg(Color::DarkGray));
            }
            if r_idx == app.sel_row && c_idx == app.sel_col {
                cell = cell.style(Style::default().bg(Color::Blue).fg(Color::Black));
            }
            cells.push(cell);
        }
        if show_flags {
            let mark = match session.table.flag(abs) {
                Some(true) => "[x]",
                _ if row.flag.is_some() => "[ ]",
                _ => "",
            };
            cells.push(Cell::from(mark));
        }
        rows.push(Row::new(cells).style(stripe));
    }

    let ncols = session.table.header().len() + usize::from(show_flags);
    let widths = column_widths(area.width, ncols);
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1);

    f.render_widget(table, area);
}

fn draw_editor(f: &mut Frame, screen: Rect, app: &App, row: usize, col: usize) {
    let area = centered(screen, 70, 60);
    let column = app
        .session
        .as_ref()
        .and_then(|s| s.table.header().get(col).cloned())
        .unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Edit row {} / {} (Ctrl-S save, Esc cancel)", row + 1, column));
    let inner = block.inner(area);
    let p = Paragraph::new(app.editor.text())
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(p, area);

    let (line, col) = app.editor.cursor_line_col();
    let x = inner.x.saturating_add(col as u16).min(inner.right().saturating_sub(1));
    let y = inner.y.saturating_add(line as u16).min(inner.bottom().saturating_sub(1));
    f.set_cursor(x, y);
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y) / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn column_widths(total_width: u16, cols: usize) -> Vec<Constraint> {
    if cols == 0 {
        return vec![];
    }
    // Evenly divide; borders and spacing come off first.
    let w = total_width.saturating_sub(2 + (cols as u16 - 1));
    let per = (w / cols as u16).max(1);
    (0..cols).map(|_| Constraint::Length(per)).collect()
}

fn first_line(s: &str) -> String {
    match s.split_once('\n') {
        Some((head, _)) => format!("{head} …"),
        None => s.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_labels_are_capitalized() {
        assert_eq!(capitalize("devRemote"), "DevRemote");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn multiline_cells_preview_first_line() {
        assert_eq!(first_line("#a\n#b"), "#a …");
        assert_eq!(first_line("plain"), "plain");
    }

    #[test]
    fn widths_split_evenly() {
        assert_eq!(column_widths(42, 4), vec![Constraint::Length(9); 4]);
        assert!(column_widths(10, 0).is_empty());
    }
}
