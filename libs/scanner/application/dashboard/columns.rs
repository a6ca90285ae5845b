//! Column definitions for the scanner table
//!
//! Each column maps a row to the text and colour of one cell. The widths are
//! fixed so that scrolling never reflows the table.

use crate::domain::{
    format_age, format_count, format_percent, format_usd, DexRegistry, PriceFlash,
    ScannerTableRow,
};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Cell,
};

/// Header title and width of every column, in display order
pub const COLUMNS: [(&str, u16); 14] = [
    ("Token & Chain", 22),
    ("Exchange", 14),
    ("Price", 12),
    ("Marketcap", 16),
    ("Volume", 10),
    ("5m", 7),
    ("1h", 7),
    ("6h", 7),
    ("24h", 7),
    ("Age", 5),
    ("Buys/Sells", 16),
    ("Liquidity", 16),
    ("Audit", 8),
    ("Social", 8),
];

pub fn widths() -> Vec<Constraint> {
    COLUMNS.iter().map(|(_, w)| Constraint::Length(*w)).collect()
}

fn change_color(value: f64) -> Color {
    if value >= 0.0 {
        Color::Green
    } else {
        Color::Red
    }
}

fn change_span(value: f64) -> Span<'static> {
    Span::styled(format_percent(value), Style::default().fg(change_color(value)))
}

/// `SYMBOL/BASE CHAIN`
pub fn token_text(row: &ScannerTableRow) -> String {
    match &row.token_base_symbol {
        Some(base) => format!("{}/{} {}", row.token_symbol, base, row.chain),
        None => format!("{} {}", row.token_symbol, row.chain),
    }
}

/// `total (buys/sells)`
pub fn transactions_text(row: &ScannerTableRow) -> String {
    let tx = row.transactions;
    format!(
        "{} ({}/{})",
        format_count(tx.total() as f64),
        format_count(tx.buys as f64),
        format_count(tx.sells as f64)
    )
}

/// One letter per flag that is set: Verified, Mintable, Freezable, Honeypot
pub fn audit_text(row: &ScannerTableRow) -> String {
    let a = &row.audit;
    [
        (a.contract_verified, 'V'),
        (a.mintable, 'M'),
        (a.freezable, 'F'),
        (a.honeypot, 'H'),
    ]
    .iter()
    .map(|(on, c)| if *on { *c } else { '·' })
    .collect()
}

/// One letter per social link present: Twitter, Website, Telegram, Discord
pub fn social_text(row: &ScannerTableRow) -> String {
    let a = &row.audit;
    [
        (&a.link_twitter, 'X'),
        (&a.link_website, 'W'),
        (&a.link_telegram, 'T'),
        (&a.link_discord, 'D'),
    ]
    .iter()
    .map(|(link, c)| if link.is_some() { *c } else { '·' })
    .collect()
}

/// Background for the price cell while a flash is active
pub fn flash_style(row: &ScannerTableRow, now: DateTime<Utc>) -> Style {
    match row.active_flash(now) {
        Some(PriceFlash::Up) => Style::default().bg(Color::Green).fg(Color::Black),
        Some(PriceFlash::Down) => Style::default().bg(Color::Red).fg(Color::Black),
        None => Style::default(),
    }
}

/// All cells of one row, matching [`COLUMNS`]
pub fn cells(row: &ScannerTableRow, dexes: &DexRegistry, now: DateTime<Utc>) -> Vec<Cell<'static>> {
    let honeypot = if row.audit.honeypot {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mcap_change = row.mcap_change_pc.unwrap_or(0.0);
    let pcs = row.price_change_pcs;

    vec![
        Cell::from(token_text(row)),
        Cell::from(dexes.display_name(row.chain_id, &row.exchange)),
        Cell::from(format_usd(row.price_usd)).style(flash_style(row, now)),
        Cell::from(Line::from(vec![
            Span::raw(format_usd(row.mcap)),
            Span::raw(" "),
            change_span(mcap_change),
        ])),
        Cell::from(format_usd(row.volume_usd)),
        Cell::from(change_span(pcs.m5)),
        Cell::from(change_span(pcs.h1)),
        Cell::from(change_span(pcs.h6)),
        Cell::from(change_span(pcs.h24)),
        Cell::from(format_age(row.token_created_at, now))
            .style(Style::default().fg(Color::DarkGray)),
        Cell::from(transactions_text(row)),
        Cell::from(Line::from(vec![
            Span::raw(format_usd(row.liquidity.current)),
            Span::raw(" "),
            change_span(row.liquidity.change_pc),
        ])),
        Cell::from(audit_text(row)).style(honeypot),
        Cell::from(social_text(row)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::row::tests::sample_result;
    use chrono::Duration;

    fn row() -> ScannerTableRow {
        ScannerTableRow::from(&sample_result("p1"))
    }

    #[test]
    fn test_every_column_has_a_cell() {
        let cells = cells(&row(), &DexRegistry::new(), Utc::now());
        assert_eq!(cells.len(), COLUMNS.len());
        assert_eq!(widths().len(), COLUMNS.len());
    }

    #[test]
    fn test_transactions_text() {
        assert_eq!(transactions_text(&row()), "14 (10/4)");
    }

    #[test]
    fn test_audit_and_social_flags() {
        let mut row = row();
        assert_eq!(audit_text(&row), "V·F·");
        row.audit.honeypot = true;
        row.audit.freezable = false;
        assert_eq!(audit_text(&row), "V··H");
        assert_eq!(social_text(&row), "X···");
    }

    #[test]
    fn test_flash_style_expires() {
        let mut row = row();
        let now = Utc::now();
        row.price_flash = Some(PriceFlash::Up);
        row.price_flash_at = Some(now);

        assert_eq!(flash_style(&row, now).bg, Some(Color::Green));
        assert_eq!(flash_style(&row, now + Duration::milliseconds(900)).bg, None);
    }
}
