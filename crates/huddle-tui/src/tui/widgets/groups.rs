// Groups widget: grouping settings header and the current batch.
//
// Each group renders as a bold name line followed by its members on one
// wrapped line.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::protocol::AppSnapshot;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let snap = &state.snapshot;
    let mut lines = vec![settings_line(snap), Line::from("")];

    if snap.groups.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No groups yet. Press g to group the roster.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for group in &snap.groups {
            lines.push(Line::from(vec![
                Span::styled(
                    group.name.clone(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" ({})", group.members.len()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            let members: Vec<&str> = group.members.iter().map(|p| p.name.as_str()).collect();
            lines.push(Line::from(format!("  {}", members.join(", "))));
        }
    }

    let scroll = u16::try_from(state.scroll("groups")).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Groups ({})", snap.groups.len())),
        );
    frame.render_widget(paragraph, area);
}

/// "Size: 3  Theme: Animals (叢林猛獸)" plus a naming indicator.
fn settings_line(snap: &AppSnapshot) -> Line<'static> {
    let mut spans = vec![
        Span::styled("Size: ", Style::default().fg(Color::Gray)),
        Span::raw(snap.group_size.to_string()),
        Span::styled("  Theme: ", Style::default().fg(Color::Gray)),
        Span::raw(format!("{} ({})", snap.theme.label(), snap.theme.local_label())),
    ];
    if snap.naming_in_progress {
        spans.push(Span::styled(
            "  naming teams...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ));
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
