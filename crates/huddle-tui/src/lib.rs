// Library root: exposes the orchestrator, protocol and TUI so integration
// tests can drive the application without a terminal.

pub mod app;
pub mod protocol;
pub mod tui;
