//! UI widgets for the dashboard

pub mod table;

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::App;
use crate::infrastructure::ConnectionState;

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;
/// Table borders plus the column header row
const TABLE_CHROME: u16 = 3;

/// Rows of data the table can show in a terminal this tall
pub fn table_body_height(terminal_height: u16) -> usize {
    terminal_height.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT + TABLE_CHROME) as usize
}

/// Draw the main UI layout
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_main(frame, app, chunks[1]);
    draw_footer(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.connection_state();
    let status_color = match state {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Connecting | ConnectionState::Reconnecting => Color::Yellow,
        ConnectionState::Disconnected | ConnectionState::ShuttingDown => Color::Red,
    };

    let board = app.board().read();
    let mut spans = vec![
        Span::styled(format!(" WS: {} ", state), Style::default().fg(status_color)),
        Span::raw("| "),
    ];
    for (i, table) in board.tables().iter().enumerate() {
        let style = if i == board.active() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(
            format!(" {} ({}) ", table.title(), table.len()),
            style,
        ));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(format!(
        "| Pairs subscribed: {} | Updates: {}",
        board.subscriptions().len(),
        app.live_updates()
    )));

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" DEX Scanner "));

    frame.render_widget(header, area);
}

fn draw_main(frame: &mut Frame, app: &App, area: Rect) {
    let board = app.board().read();
    match board.active_table() {
        Some(t) => table::draw(frame, t, app.dexes(), Utc::now(), area),
        None => {
            let empty = Paragraph::new(" No tables configured.")
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, area);
        }
    }
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let keys = "q=quit Tab=table j/k=nav PgUp/PgDn g/G=home/end s=sort r=reload";
    let footer_text = match app.status_message.as_deref() {
        Some(status) if !status.is_empty() => format!(" {} | {}", status, keys),
        _ => format!(" {}", keys),
    };

    let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_body_height() {
        assert_eq!(table_body_height(40), 31);
        assert_eq!(table_body_height(5), 0);
    }
}
