// Messages exchanged between the app orchestrator and the TUI.
//
// The TUI sends `UserCommand`s; the orchestrator answers with `UiUpdate`s.
// Snapshots are owned copies, so the TUI never touches application state.

use std::collections::HashMap;
use std::path::PathBuf;

use huddle_core::grouping::Theme;
use huddle_core::model::{Group, Participant, Winner};

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabId {
    #[default]
    Roster,
    Draw,
    Groups,
}

/// Commands from the TUI to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    SwitchTab(TabId),

    // Roster
    AddNames(String),
    ImportFile(PathBuf),
    AddSampleNames,
    RemoveDuplicates,
    RemoveParticipant(String),
    /// Sent only after the user confirmed.
    ClearRoster,

    // Draw
    StartDraw,
    SetPrize(String),
    ToggleAllowRepeat,
    ClearWinners,

    // Groups
    IncreaseGroupSize,
    DecreaseGroupSize,
    CycleTheme,
    GenerateGroups,
    ExportGroups,

    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// One-line message shown at the bottom of the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Read-only copy of everything the dashboard renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppSnapshot {
    pub participants: Vec<Participant>,
    /// Occurrence count per name; entries above one mark duplicates.
    pub name_counts: HashMap<String, usize>,
    /// Most recent first.
    pub winners: Vec<Winner>,
    pub eligible_count: usize,
    pub allow_repeat: bool,
    pub prize: String,
    pub spinning: bool,
    pub group_size: usize,
    pub theme: Theme,
    pub groups: Vec<Group>,
    /// Themed team names have been requested and not yet applied.
    pub naming_in_progress: bool,
    pub active_tab: Option<TabId>,
}

impl AppSnapshot {
    pub fn has_duplicates(&self) -> bool {
        self.name_counts.values().any(|&n| n > 1)
    }

    pub fn is_duplicate(&self, name: &str) -> bool {
        self.name_counts.get(name).is_some_and(|&n| n > 1)
    }
}

/// Updates from the orchestrator to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    StateSnapshot(Box<AppSnapshot>),
    /// A spin began over `names`, highlighted from `start_index`.
    SpinStarted { names: Vec<String>, start_index: usize },
    /// The highlight moved to pool index `index`.
    SpinStep { index: usize },
    SpinSettled(Winner),
    Announcement(String),
    Notice(Notice),
}
