// TUI widget modules for each dashboard panel.

pub mod confirm;
pub mod draw_panel;
pub mod groups;
pub mod help_bar;
pub mod input_bar;
pub mod roster_list;
pub mod status_bar;
pub mod winners;
