// Draw panel: prize, eligibility, the rolling name and the announced winner.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let snap = &state.snapshot;
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Prize: ", Style::default().fg(Color::Gray)),
            Span::styled(prize_label(&snap.prize), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Eligible: ", Style::default().fg(Color::Gray)),
            Span::raw(snap.eligible_count.to_string()),
            Span::styled("   Repeat winners: ", Style::default().fg(Color::Gray)),
            Span::raw(if snap.allow_repeat { "allowed" } else { "no" }),
        ]),
        Line::from(""),
    ];

    let name_style = if snap.spinning {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else if state.last_winner.is_some() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(
        Line::from(Span::styled(centre_text(state), name_style)).alignment(Alignment::Center),
    );
    lines.push(Line::from(""));

    if let Some(winner) = &state.last_winner {
        if !snap.spinning {
            lines.push(
                Line::from(Span::styled(
                    format!("{} wins {}", winner.name, winner.prize),
                    Style::default().fg(Color::Green),
                ))
                .alignment(Alignment::Center),
            );
            let announcement = state.announcement.as_deref().unwrap_or("...");
            lines.push(
                Line::from(Span::styled(
                    announcement.to_string(),
                    Style::default().add_modifier(Modifier::ITALIC),
                ))
                .alignment(Alignment::Center),
            );
        }
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Lucky Draw"));
    frame.render_widget(paragraph, area);
}

/// The prize shown before a draw. A blank prize falls back to the default
/// when the draw settles, so say so.
pub fn prize_label(prize: &str) -> String {
    if prize.trim().is_empty() {
        "(default)".to_string()
    } else {
        prize.to_string()
    }
}

/// Text for the large centre line: the rolling name while spinning, the
/// winner once settled, otherwise a hint.
pub fn centre_text(state: &ViewState) -> String {
    if let Some(name) = state.highlighted_name() {
        return format!(">>  {name}  <<");
    }
    if state.snapshot.eligible_count == 0 {
        "No eligible participants".to_string()
    } else {
        "Press Enter to draw".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
