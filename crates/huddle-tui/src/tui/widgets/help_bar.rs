// Help bar: key hints for the active tab.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::TabId;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = if state.input.is_some() {
        " Enter:Submit | Esc:Cancel"
    } else {
        hints(state.active_tab)
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn hints(tab: TabId) -> &'static str {
    match tab {
        TabId::Roster => {
            " a:Add | i:Import | s:Sample | d:Dedupe | x:Remove | C:Clear all | 1-3:Tabs | q:Quit"
        }
        TabId::Draw => " Enter:Draw | p:Prize | r:Repeat winners | c:Clear winners | 1-3:Tabs | q:Quit",
        TabId::Groups => " +/-:Size | t:Theme | g:Group | e:Export CSV | 1-3:Tabs | q:Quit",
    }
}
