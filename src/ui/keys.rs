use log::{error, info};
use xkbcommon::xkb::keysyms;
use crate::executor;
use crate::model::Entry;
use crate::state::AppState;

/// What the shell should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Redraw,
    Launch(Entry),
    Exit,
    None,
}

/// Applies a key press to the state. `utf8` is the text the key produced, if any.
pub fn handle_key(state: &mut AppState, keysym: u32, utf8: Option<&str>) -> KeyAction {
    let delta = state.params().delta;
    let changed = match keysym {
        keysyms::KEY_Escape => return KeyAction::Exit,
        keysyms::KEY_Return | keysyms::KEY_KP_Enter => {
            return match state.get_selected() {
                Some(entry) => KeyAction::Launch(entry.clone()),
                None => KeyAction::None,
            };
        }
        keysyms::KEY_Up => state.move_selection(-delta),
        keysyms::KEY_Down => state.move_selection(delta),
        keysyms::KEY_BackSpace => state.pop_char(),
        _ => match utf8 {
            Some(text) if !text.is_empty() && !text.chars().any(|c| c.is_control()) => {
                state.push_str(text);
                true
            }
            _ => false,
        },
    };

    if changed { KeyAction::Redraw } else { KeyAction::None }
}

/// Runs the entry to completion. Returns whether the launcher should close,
/// which it does whatever the command's outcome.
pub fn launch(entry: &Entry) -> bool {
    info!("Launching '{}' from group '{}'", entry.name, entry.group);
    match executor::execute(entry) {
        Ok(output) if !output.status.success() => info!("'{}' exited with {}", entry.name, output.status),
        Ok(_) => {}
        Err(e) => error!("{:#}", e),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ListParams;

    fn state(names: &[&str]) -> AppState {
        let entries = names
            .iter()
            .map(|n| Entry::new(n.to_string(), format!("echo {n}"), "test".to_string()))
            .collect();
        AppState::new(entries, ListParams { visible_count: 3, delta: 1, fuzzy_limit: 30 }, 0, 0)
    }

    #[test]
    fn enter_launches_the_selection() {
        let mut s = state(&["alpha", "beta"]);
        handle_key(&mut s, keysyms::KEY_Down, None);
        match handle_key(&mut s, keysyms::KEY_Return, None) {
            KeyAction::Launch(entry) => assert_eq!(entry.command, "echo beta"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(handle_key(&mut s, keysyms::KEY_KP_Enter, None), KeyAction::Launch(_)));
    }

    #[test]
    fn enter_on_empty_list_keeps_launcher_open() {
        let mut s = state(&[]);
        assert_eq!(handle_key(&mut s, keysyms::KEY_Return, None), KeyAction::None);
    }

    #[test]
    fn escape_exits() {
        let mut s = state(&["alpha"]);
        assert_eq!(handle_key(&mut s, keysyms::KEY_Escape, None), KeyAction::Exit);
    }

    #[test]
    fn arrows_move_by_delta() {
        let entries = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| Entry::new(n.to_string(), n.to_string(), "test".to_string()))
            .collect();
        let mut s = AppState::new(entries, ListParams { visible_count: 3, delta: 2, fuzzy_limit: 30 }, 0, 0);

        assert_eq!(handle_key(&mut s, keysyms::KEY_Down, None), KeyAction::Redraw);
        assert_eq!(s.current_index(), Some(2));
        assert_eq!(handle_key(&mut s, keysyms::KEY_Up, None), KeyAction::Redraw);
        assert_eq!(s.current_index(), Some(0));
        assert_eq!(handle_key(&mut s, keysyms::KEY_Up, None), KeyAction::None);
    }

    #[test]
    fn typing_and_backspace_edit_the_query() {
        let mut s = state(&["alpha", "beta"]);
        assert_eq!(handle_key(&mut s, keysyms::KEY_b, Some("b")), KeyAction::Redraw);
        assert_eq!(s.query(), "b");
        assert_eq!(s.get_selected().map(|e| e.name.as_str()), Some("beta"));

        assert_eq!(handle_key(&mut s, keysyms::KEY_BackSpace, None), KeyAction::Redraw);
        assert_eq!(s.query(), "");
        assert_eq!(handle_key(&mut s, keysyms::KEY_BackSpace, None), KeyAction::None);
    }

    #[test]
    fn control_characters_are_ignored() {
        let mut s = state(&["alpha"]);
        assert_eq!(handle_key(&mut s, keysyms::KEY_Tab, Some("\t")), KeyAction::None);
        assert_eq!(handle_key(&mut s, keysyms::KEY_Shift_L, None), KeyAction::None);
        assert_eq!(handle_key(&mut s, keysyms::KEY_a, Some("")), KeyAction::None);
        assert_eq!(s.query(), "");
    }

    #[test]
    fn failing_command_still_closes() {
        let entry = Entry::new("broken".to_string(), "exit 7".to_string(), "test".to_string());
        assert!(launch(&entry));

        let entry = Entry::new("fine".to_string(), "true".to_string(), "test".to_string());
        assert!(launch(&entry));
    }
}
