//! Scanner table widget - draws only the rows inside the viewport

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::application::dashboard::columns;
use crate::application::sync::{LoadStatus, ScannerTable, SortDirection};
use crate::domain::DexRegistry;

pub fn draw(frame: &mut Frame, table: &ScannerTable, dexes: &DexRegistry, now: DateTime<Utc>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(title(table));

    match table.status() {
        LoadStatus::Error(message) => {
            let error = Paragraph::new(format!(" {}", message))
                .style(Style::default().fg(Color::Red))
                .block(block);
            frame.render_widget(error, area);
            return;
        }
        LoadStatus::Loading if table.is_empty() => {
            let loading = Paragraph::new("Loading...")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(loading, area);
            return;
        }
        _ => {}
    }

    let range = table.viewport().visible_range(table.len());
    let offset = range.start;
    let rows: Vec<Row> = table.rows()[range]
        .iter()
        .map(|row| Row::new(columns::cells(row, dexes, now)))
        .collect();

    let header = Row::new(columns::COLUMNS.iter().map(|(name, _)| *name))
        .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow));

    let widget = Table::new(rows, columns::widths())
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = TableState::default();
    if !table.is_empty() {
        state.select(Some(table.cursor().saturating_sub(offset)));
    }

    frame.render_stateful_widget(widget, area, &mut state);
}

/// `Title [Volume ▼] 40/1234 (loading more)`
fn title(table: &ScannerTable) -> String {
    let sort = match table.sort() {
        Some(sort) => {
            let arrow = match sort.direction {
                SortDirection::Desc => "▼",
                SortDirection::Asc => "▲",
            };
            format!(" [{:?} {}]", sort.column, arrow)
        }
        None => String::new(),
    };
    let more = if table.is_fetching_more() {
        " (loading more)"
    } else {
        ""
    };
    format!(
        " {}{} {}/{}{} ",
        table.title(),
        sort,
        table.len(),
        table.total_rows(),
        more
    )
}
