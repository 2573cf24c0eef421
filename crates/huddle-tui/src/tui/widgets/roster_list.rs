// Roster widget: the participant list with selection and duplicate markers.
//
// Names that occur more than once are drawn in yellow with a "(dup)" tag so
// the organiser can decide whether to remove duplicates.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let participants = &state.snapshot.participants;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title(participants.len(), state.snapshot.has_duplicates()));

    if participants.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from("  No participants yet."),
            Line::from("  a: add names   i: import file   s: sample names"),
        ])
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = participants
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let duplicate = state.snapshot.is_duplicate(&p.name);
            let style = if duplicate {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            let mut spans = vec![
                Span::styled(format!("{:>4}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(p.name.clone(), style),
            ];
            if duplicate {
                spans.push(Span::styled(" (dup)", Style::default().fg(Color::Yellow)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn title(count: usize, duplicates: bool) -> String {
    if duplicates {
        format!("Roster ({count}) - duplicates found, d to remove")
    } else {
        format!("Roster ({count})")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
