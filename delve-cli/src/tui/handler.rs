use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{Action, AppMode};

/// Map key events to actions based on current mode
pub fn handle_key(key: KeyEvent, mode: AppMode) -> Action {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match mode {
        AppMode::Help => handle_key_help(key),
        AppMode::Scanning => handle_key_scanning(key),
        AppMode::Browsing => handle_key_browsing(key),
        AppMode::ConfirmRemove => handle_key_confirm(key),
        AppMode::Removing => handle_key_removing(key),
    }
}

fn handle_key_help(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Action::HideHelp,
        _ => Action::Tick,
    }
}

/// Cursor movement shared by the list modes
fn navigation(key: KeyEvent) -> Option<Action> {
    Some(match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Home | KeyCode::Char('g') => Action::GoToFirst,
        KeyCode::End | KeyCode::Char('G') => Action::GoToLast,
        _ => return None,
    })
}

fn handle_key_scanning(key: KeyEvent) -> Action {
    if let Some(action) = navigation(key) {
        return action;
    }
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc | KeyCode::Char('s') => Action::StopScan,
        KeyCode::Char('?') => Action::ShowHelp,
        _ => Action::Tick,
    }
}

fn handle_key_browsing(key: KeyEvent) -> Action {
    if let Some(action) = navigation(key) {
        return action;
    }
    match key.code {
        KeyCode::Char('q') => Action::Quit,

        // Marking
        KeyCode::Char(' ') => Action::ToggleMark,
        KeyCode::Char('a') => Action::MarkAll,
        KeyCode::Esc => Action::ClearMarks,

        // Removal
        KeyCode::Char('d') | KeyCode::Delete => Action::RemoveUnlimited,
        KeyCode::Char('D') => Action::RemoveLimited,

        KeyCode::Char('r') => Action::Rescan,
        KeyCode::Char('?') => Action::ShowHelp,

        _ => Action::Tick,
    }
}

fn handle_key_confirm(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => Action::ConfirmRemove,
        KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => Action::CancelRemove,
        _ => Action::Tick,
    }
}

fn handle_key_removing(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc | KeyCode::Char('s') => Action::StopRemoval,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::Tick,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for mode in [
            AppMode::Scanning,
            AppMode::Browsing,
            AppMode::Help,
            AppMode::ConfirmRemove,
            AppMode::Removing,
        ] {
            assert_eq!(handle_key(key, mode), Action::Quit);
        }
    }

    #[test]
    fn test_removal_keys_only_while_browsing() {
        assert_eq!(
            handle_key(press(KeyCode::Char('d')), AppMode::Browsing),
            Action::RemoveUnlimited
        );
        assert_eq!(
            handle_key(press(KeyCode::Char('D')), AppMode::Browsing),
            Action::RemoveLimited
        );
        assert_eq!(
            handle_key(press(KeyCode::Char('d')), AppMode::Scanning),
            Action::Tick
        );
    }

    #[test]
    fn test_escape_depends_on_mode() {
        assert_eq!(handle_key(press(KeyCode::Esc), AppMode::Scanning), Action::StopScan);
        assert_eq!(handle_key(press(KeyCode::Esc), AppMode::Browsing), Action::ClearMarks);
        assert_eq!(
            handle_key(press(KeyCode::Esc), AppMode::ConfirmRemove),
            Action::CancelRemove
        );
        assert_eq!(handle_key(press(KeyCode::Esc), AppMode::Removing), Action::StopRemoval);
        assert_eq!(handle_key(press(KeyCode::Esc), AppMode::Help), Action::HideHelp);
    }

    #[test]
    fn test_navigation_while_scanning() {
        assert_eq!(handle_key(press(KeyCode::Down), AppMode::Scanning), Action::MoveDown);
        assert_eq!(handle_key(press(KeyCode::Char('G')), AppMode::Browsing), Action::GoToLast);
    }
}
