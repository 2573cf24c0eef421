// Keyboard and paste input handling and command dispatch.
//
// Translates crossterm key and paste events into UserCommand messages sent
// to the app orchestrator, or into local ViewState mutations (tab switching,
// selection, scrolling, text prompts and confirmation dialogs). Action keys
// only act on the tab whose help bar lists them.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::protocol::{TabId, UserCommand};
use super::{ConfirmKind, InputKind, InputPrompt, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator. Returns `None` when the key press was handled locally by
/// mutating `ViewState`.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress; ignoring
    // non-Press events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    if let Some(kind) = view_state.confirm {
        return handle_confirm(key_event, view_state, kind);
    }

    if view_state.input.is_some() {
        return handle_input_mode(key_event, view_state);
    }

    match key_event.code {
        // Tab switching
        KeyCode::Char('1') => switch_tab(view_state, TabId::Roster),
        KeyCode::Char('2') => switch_tab(view_state, TabId::Draw),
        KeyCode::Char('3') => switch_tab(view_state, TabId::Groups),
        KeyCode::Tab => {
            let next = match view_state.active_tab {
                TabId::Roster => TabId::Draw,
                TabId::Draw => TabId::Groups,
                TabId::Groups => TabId::Roster,
            };
            switch_tab(view_state, next)
        }

        // Selection / scrolling
        KeyCode::Up | KeyCode::Char('k') => {
            move_cursor(view_state, -1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_cursor(view_state, 1);
            None
        }

        KeyCode::Esc => {
            view_state.notice = None;
            None
        }

        // Quit: enter confirmation mode instead of quitting immediately
        KeyCode::Char('q') => {
            view_state.confirm = Some(ConfirmKind::Quit);
            None
        }

        code => match view_state.active_tab {
            TabId::Roster => handle_roster_key(code, view_state),
            TabId::Draw => handle_draw_key(code, view_state),
            TabId::Groups => handle_groups_key(code),
        },
    }
}

fn handle_roster_key(code: KeyCode, view_state: &mut ViewState) -> Option<UserCommand> {
    match code {
        KeyCode::Char('a') => open_prompt(view_state, InputKind::AddNames, String::new()),
        KeyCode::Char('i') => open_prompt(view_state, InputKind::ImportPath, String::new()),
        KeyCode::Char('s') => Some(UserCommand::AddSampleNames),
        KeyCode::Char('d') => Some(UserCommand::RemoveDuplicates),
        KeyCode::Char('x') | KeyCode::Delete => view_state
            .snapshot
            .participants
            .get(view_state.selected)
            .map(|p| UserCommand::RemoveParticipant(p.id.clone())),
        KeyCode::Char('C') => {
            if !view_state.snapshot.participants.is_empty() {
                view_state.confirm = Some(ConfirmKind::ClearRoster);
            }
            None
        }
        _ => None,
    }
}

fn handle_draw_key(code: KeyCode, view_state: &mut ViewState) -> Option<UserCommand> {
    match code {
        KeyCode::Enter | KeyCode::Char(' ') => {
            if view_state.snapshot.spinning {
                None
            } else {
                Some(UserCommand::StartDraw)
            }
        }
        // The prize is fixed once a spin starts.
        KeyCode::Char('p') if !view_state.snapshot.spinning => {
            let current = view_state.snapshot.prize.clone();
            open_prompt(view_state, InputKind::Prize, current)
        }
        KeyCode::Char('r') => Some(UserCommand::ToggleAllowRepeat),
        KeyCode::Char('c') => Some(UserCommand::ClearWinners),
        _ => None,
    }
}

fn handle_groups_key(code: KeyCode) -> Option<UserCommand> {
    match code {
        KeyCode::Char('+') | KeyCode::Char('=') => Some(UserCommand::IncreaseGroupSize),
        KeyCode::Char('-') => Some(UserCommand::DecreaseGroupSize),
        KeyCode::Char('t') => Some(UserCommand::CycleTheme),
        KeyCode::Char('g') => Some(UserCommand::GenerateGroups),
        KeyCode::Char('e') => Some(UserCommand::ExportGroups),
        _ => None,
    }
}

/// Handle a bracketed paste.
///
/// With a prompt open the text is appended to it; line breaks become comma
/// separators for names and are dropped elsewhere. With nothing open, a paste
/// adds its names directly. Pastes are ignored while a dialog is showing.
pub fn handle_paste(text: String, view_state: &mut ViewState) -> Option<UserCommand> {
    if view_state.confirm.is_some() {
        return None;
    }
    match view_state.input.as_mut() {
        Some(prompt) => {
            match prompt.kind {
                InputKind::AddNames => {
                    let joined = text.lines().collect::<Vec<_>>().join(", ");
                    if !prompt.text.trim().is_empty() && !joined.is_empty() {
                        prompt.text.push_str(", ");
                    }
                    prompt.text.push_str(&joined);
                }
                InputKind::ImportPath | InputKind::Prize => {
                    prompt.text.extend(text.chars().filter(|c| !c.is_control()));
                }
            }
            None
        }
        None if text.trim().is_empty() => None,
        None => Some(UserCommand::AddNames(text)),
    }
}

fn switch_tab(view_state: &mut ViewState, tab: TabId) -> Option<UserCommand> {
    view_state.active_tab = tab;
    Some(UserCommand::SwitchTab(tab))
}

fn open_prompt(view_state: &mut ViewState, kind: InputKind, text: String) -> Option<UserCommand> {
    view_state.input = Some(InputPrompt { kind, text });
    view_state.notice = None;
    None
}

/// Handle key events while a confirmation dialog is open.
///
/// - `y` confirms (`q` also confirms a quit)
/// - `n` or `Esc` cancels
/// - All other keys are blocked
fn handle_confirm(key_event: KeyEvent, view_state: &mut ViewState, kind: ConfirmKind) -> Option<UserCommand> {
    let confirmed = match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => true,
        KeyCode::Char('q') | KeyCode::Char('Q') => kind == ConfirmKind::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm = None;
            return None;
        }
        _ => false,
    };
    if !confirmed {
        return None;
    }

    view_state.confirm = None;
    Some(match kind {
        ConfirmKind::Quit => UserCommand::Quit,
        ConfirmKind::ClearRoster => UserCommand::ClearRoster,
    })
}

/// Handle key events while the input bar is collecting text.
///
/// - Printable characters are appended
/// - Backspace removes the last character
/// - Enter submits, Esc discards
fn handle_input_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let prompt = view_state.input.as_mut()?;
    match key_event.code {
        KeyCode::Esc => {
            view_state.input = None;
            None
        }
        KeyCode::Backspace => {
            prompt.text.pop();
            None
        }
        KeyCode::Char(c) => {
            prompt.text.push(c);
            None
        }
        KeyCode::Enter => {
            let InputPrompt { kind, text } = view_state.input.take()?;
            match kind {
                InputKind::AddNames => Some(UserCommand::AddNames(text)),
                InputKind::ImportPath => {
                    let path = text.trim();
                    if path.is_empty() {
                        None
                    } else {
                        Some(UserCommand::ImportFile(PathBuf::from(path)))
                    }
                }
                InputKind::Prize => Some(UserCommand::SetPrize(text)),
            }
        }
        _ => None,
    }
}

/// Move the roster selection, or scroll the active list on other tabs.
fn move_cursor(view_state: &mut ViewState, delta: isize) {
    match view_state.active_tab {
        TabId::Roster => {
            let last = view_state.snapshot.participants.len().saturating_sub(1);
            view_state.selected = view_state.selected.saturating_add_signed(delta).min(last);
        }
        TabId::Draw => scroll(view_state, "winners", delta),
        TabId::Groups => scroll(view_state, "groups", delta),
    }
}

fn scroll(view_state: &mut ViewState, key: &str, delta: isize) {
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_add_signed(delta);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::sample_snapshot;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_text(state: &mut ViewState, text: &str) {
        for c in text.chars() {
            assert_eq!(handle_key(press(KeyCode::Char(c)), state), None);
        }
    }

    fn loaded_state() -> ViewState {
        let mut state = ViewState::default();
        state.apply_snapshot(sample_snapshot());
        state
    }

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewState::default();
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert_eq!(handle_key(key, &mut state), None);
        assert!(state.confirm.is_none());
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut state = ViewState::default();
        state.input = Some(InputPrompt {
            kind: InputKind::AddNames,
            text: String::new(),
        });
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(key, &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn number_keys_switch_tabs() {
        let mut state = ViewState::default();
        assert_eq!(
            handle_key(press(KeyCode::Char('3')), &mut state),
            Some(UserCommand::SwitchTab(TabId::Groups))
        );
        assert_eq!(state.active_tab, TabId::Groups);
        handle_key(press(KeyCode::Tab), &mut state);
        assert_eq!(state.active_tab, TabId::Roster);
    }

    #[test]
    fn q_asks_before_quitting() {
        let mut state = ViewState::default();
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut state), None);
        assert_eq!(state.confirm, Some(ConfirmKind::Quit));

        // Other keys are blocked while the dialog is open.
        assert_eq!(handle_key(press(KeyCode::Char('g')), &mut state), None);
        assert_eq!(state.confirm, Some(ConfirmKind::Quit));

        assert_eq!(handle_key(press(KeyCode::Char('n')), &mut state), None);
        assert!(state.confirm.is_none());

        handle_key(press(KeyCode::Char('q')), &mut state);
        assert_eq!(
            handle_key(press(KeyCode::Char('q')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn clear_all_needs_confirmation() {
        let mut state = loaded_state();
        assert_eq!(handle_key(press(KeyCode::Char('C')), &mut state), None);
        assert_eq!(state.confirm, Some(ConfirmKind::ClearRoster));
        // `q` does not confirm a clear.
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut state), None);
        assert_eq!(
            handle_key(press(KeyCode::Char('y')), &mut state),
            Some(UserCommand::ClearRoster)
        );
        assert!(state.confirm.is_none());
    }

    #[test]
    fn clear_all_on_empty_roster_does_nothing() {
        let mut state = ViewState::default();
        handle_key(press(KeyCode::Char('C')), &mut state);
        assert!(state.confirm.is_none());
    }

    #[test]
    fn add_names_prompt_collects_text() {
        let mut state = ViewState::default();
        handle_key(press(KeyCode::Char('a')), &mut state);
        assert_eq!(state.input.as_ref().unwrap().kind, InputKind::AddNames);

        // Command keys are plain text while typing.
        type_text(&mut state, "Ann, Bqx");
        handle_key(press(KeyCode::Backspace), &mut state);
        type_text(&mut state, "o");

        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut state),
            Some(UserCommand::AddNames("Ann, Bqo".into()))
        );
        assert!(state.input.is_none());
    }

    #[test]
    fn blank_import_path_is_dropped() {
        let mut state = ViewState::default();
        handle_key(press(KeyCode::Char('i')), &mut state);
        type_text(&mut state, "  ");
        assert_eq!(handle_key(press(KeyCode::Enter), &mut state), None);
        assert!(state.input.is_none());

        handle_key(press(KeyCode::Char('i')), &mut state);
        type_text(&mut state, "names.txt ");
        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut state),
            Some(UserCommand::ImportFile(PathBuf::from("names.txt")))
        );
    }

    #[test]
    fn prize_prompt_starts_from_current_prize() {
        let mut state = loaded_state();
        state.active_tab = TabId::Draw;
        state.snapshot.prize = "TV".into();
        handle_key(press(KeyCode::Char('p')), &mut state);
        type_text(&mut state, "!");
        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut state),
            Some(UserCommand::SetPrize("TV!".into()))
        );
    }

    #[test]
    fn esc_discards_prompt() {
        let mut state = ViewState::default();
        handle_key(press(KeyCode::Char('a')), &mut state);
        type_text(&mut state, "Zed");
        assert_eq!(handle_key(press(KeyCode::Esc), &mut state), None);
        assert!(state.input.is_none());
    }

    #[test]
    fn enter_draws_unless_spinning() {
        let mut state = loaded_state();
        state.active_tab = TabId::Draw;
        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut state),
            Some(UserCommand::StartDraw)
        );
        state.snapshot.spinning = true;
        assert_eq!(handle_key(press(KeyCode::Char(' ')), &mut state), None);
    }

    #[test]
    fn selection_is_clamped_and_removes_selected() {
        let mut state = loaded_state();
        for _ in 0..5 {
            handle_key(press(KeyCode::Down), &mut state);
        }
        assert_eq!(state.selected, 2);
        handle_key(press(KeyCode::Up), &mut state);
        assert_eq!(
            handle_key(press(KeyCode::Char('x')), &mut state),
            Some(UserCommand::RemoveParticipant("b2".into()))
        );

        // Removal is only bound on the roster tab.
        state.active_tab = TabId::Draw;
        assert_eq!(handle_key(press(KeyCode::Char('x')), &mut state), None);
    }

    #[test]
    fn arrows_scroll_lists_on_other_tabs() {
        let mut state = loaded_state();
        state.active_tab = TabId::Groups;
        handle_key(press(KeyCode::Down), &mut state);
        handle_key(press(KeyCode::Down), &mut state);
        handle_key(press(KeyCode::Up), &mut state);
        assert_eq!(state.scroll("groups"), 1);
        handle_key(press(KeyCode::Up), &mut state);
        handle_key(press(KeyCode::Up), &mut state);
        assert_eq!(state.scroll("groups"), 0);
    }

    #[test]
    fn action_keys_map_to_commands_on_their_tab() {
        let cases = [
            (TabId::Roster, 's', UserCommand::AddSampleNames),
            (TabId::Roster, 'd', UserCommand::RemoveDuplicates),
            (TabId::Draw, 'r', UserCommand::ToggleAllowRepeat),
            (TabId::Draw, 'c', UserCommand::ClearWinners),
            (TabId::Groups, '+', UserCommand::IncreaseGroupSize),
            (TabId::Groups, '-', UserCommand::DecreaseGroupSize),
            (TabId::Groups, 't', UserCommand::CycleTheme),
            (TabId::Groups, 'g', UserCommand::GenerateGroups),
            (TabId::Groups, 'e', UserCommand::ExportGroups),
        ];
        for (tab, c, expected) in cases {
            let mut state = loaded_state();
            state.active_tab = tab;
            assert_eq!(handle_key(press(KeyCode::Char(c)), &mut state), Some(expected));
        }
    }

    #[test]
    fn action_keys_do_nothing_on_other_tabs() {
        let mut state = loaded_state();
        state.active_tab = TabId::Roster;
        for c in ['g', 'e', 'c', 'r', 'p', ' '] {
            assert_eq!(handle_key(press(KeyCode::Char(c)), &mut state), None, "key {c:?}");
        }
        assert_eq!(handle_key(press(KeyCode::Enter), &mut state), None);
        assert!(state.input.is_none());

        state.active_tab = TabId::Draw;
        for c in ['s', 'd', 'x', 'a', 'g'] {
            assert_eq!(handle_key(press(KeyCode::Char(c)), &mut state), None, "key {c:?}");
        }
        assert!(state.input.is_none());
    }

    #[test]
    fn prize_prompt_is_locked_while_spinning() {
        let mut state = loaded_state();
        state.active_tab = TabId::Draw;
        state.snapshot.spinning = true;
        assert_eq!(handle_key(press(KeyCode::Char('p')), &mut state), None);
        assert!(state.input.is_none());
    }

    #[test]
    fn pasted_lines_stay_in_the_names_prompt() {
        let mut state = loaded_state();
        handle_key(press(KeyCode::Char('a')), &mut state);
        type_text(&mut state, "Zed");

        assert_eq!(handle_paste("Ann\nxavier\r\n".into(), &mut state), None);
        assert_eq!(state.input.as_ref().unwrap().text, "Zed, Ann, xavier");
        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut state),
            Some(UserCommand::AddNames("Zed, Ann, xavier".into()))
        );
        assert!(state.input.is_none());
    }

    #[test]
    fn paste_without_prompt_adds_names_once() {
        let mut state = loaded_state();
        assert_eq!(
            handle_paste("A\nB".into(), &mut state),
            Some(UserCommand::AddNames("A\nB".into()))
        );
        assert_eq!(handle_paste(" \n ".into(), &mut state), None);
    }

    #[test]
    fn paste_into_path_prompt_drops_line_breaks() {
        let mut state = ViewState::default();
        handle_key(press(KeyCode::Char('i')), &mut state);
        handle_paste("names.txt\n".into(), &mut state);
        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut state),
            Some(UserCommand::ImportFile(PathBuf::from("names.txt")))
        );
    }

    #[test]
    fn paste_is_ignored_under_a_dialog() {
        let mut state = loaded_state();
        state.confirm = Some(ConfirmKind::ClearRoster);
        assert_eq!(handle_paste("A".into(), &mut state), None);
        assert_eq!(state.confirm, Some(ConfirmKind::ClearRoster));
    }
}
