// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Main Panel                                        |
// |   Draw tab only: spin (60%) | winners (40%)       |
// +--------------------------------------------------+
// | Input / Notice Bar (1 row)                        |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::protocol::TabId;

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: app name, counters, tab bar.
    pub status_bar: Rect,
    /// Tab-switched content area.
    pub main_panel: Rect,
    /// Right-hand column, present on the Draw tab only.
    pub side_panel: Option<Rect>,
    /// Text prompt or the latest notice.
    pub input_bar: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the dashboard layout for `tab` from the available terminal area.
pub fn build_layout(area: Rect, tab: TabId) -> AppLayout {
    // Vertical: status(1) | middle(fill) | input(1) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(5),    // middle section
            Constraint::Length(1), // input / notice
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let middle = vertical[1];
    let (main_panel, side_panel) = if tab == TabId::Draw {
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(middle);
        (horizontal[0], Some(horizontal[1]))
    } else {
        (middle, None)
    };

    AppLayout {
        status_bar: vertical[0],
        main_panel,
        side_panel,
        input_bar: vertical[2],
        help_bar: vertical[3],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
