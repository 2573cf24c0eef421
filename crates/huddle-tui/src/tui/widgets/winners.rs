// Winner history widget, most recent first.
//
// Each row: "{n}. {name}  {prize}  {HH:MM:SS}"

use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use huddle_core::model::Winner;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let winners = &state.snapshot.winners;
    let title = format!("Winners ({})", winners.len());

    if winners.is_empty() {
        let paragraph = Paragraph::new("  No winners yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        return;
    }

    // Visible row count: subtract 2 for borders
    let visible_rows = (area.height as usize).saturating_sub(2);
    let max_offset = winners.len().saturating_sub(visible_rows);
    let offset = state.scroll("winners").min(max_offset);

    let total = winners.len();
    let items: Vec<ListItem> = winners
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_rows.max(1))
        .map(|(i, w)| ListItem::new(winner_line(total - i, w)))
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

/// One history row. `number` counts draws from the first one.
fn winner_line(number: usize, winner: &Winner) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{number:>3}. "), Style::default().fg(Color::DarkGray)),
        Span::styled(winner.name.clone(), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(winner.prize.clone(), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(format_time(winner.timestamp), Style::default().fg(Color::DarkGray)),
    ])
}

/// Local wall-clock time of a millisecond timestamp.
pub fn format_time(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
