use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::app::Action;

pub async fn run_event_loop(tx: mpsc::UnboundedSender<Action>) {
    let mut reader = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = tick.tick() => {
                if tx.send(Action::Tick).is_err() {
                    break;
                }
            }
            maybe_event = reader.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = key_to_action(key) {
                            if tx.send(action).is_err() {
                                break;
                            }
                        }
                    }
                    Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }
}

fn key_to_action(key: KeyEvent) -> Option<Action> {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    let key_action = match key.code {
        KeyCode::Up | KeyCode::Char('k') => KeyAction::Up,
        KeyCode::Down | KeyCode::Char('j') => KeyAction::Down,
        KeyCode::Left | KeyCode::Char('h') => KeyAction::Left,
        KeyCode::Right | KeyCode::Char('l') => KeyAction::Right,
        KeyCode::Char('[') | KeyCode::Char('<') => KeyAction::MoveLeft,
        KeyCode::Char(']') | KeyCode::Char('>') => KeyAction::MoveRight,
        KeyCode::Char(c @ '1'..='4') => KeyAction::DropOn(c as usize - '1' as usize),
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Char('r') => KeyAction::Refresh,
        KeyCode::Char('x') => KeyAction::Delete,
        KeyCode::Char('y') => KeyAction::Confirm,
        KeyCode::Enter => KeyAction::Select,
        KeyCode::Esc => KeyAction::Escape,
        _ => return None,
    };
    Some(Action::Key(key_action))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    Left,
    Right,
    /// Drop the selected card on the column to its left.
    MoveLeft,
    MoveRight,
    /// Drop the selected card on the column with this index.
    DropOn(usize),
    Select,
    Escape,
    Refresh,
    Delete,
    Confirm,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Option<KeyAction> {
        match key_to_action(KeyEvent::new(code, KeyModifiers::NONE)) {
            Some(Action::Key(k)) => Some(k),
            _ => None,
        }
    }

    #[test]
    fn digits_drop_on_columns() {
        assert_eq!(press(KeyCode::Char('1')), Some(KeyAction::DropOn(0)));
        assert_eq!(press(KeyCode::Char('4')), Some(KeyAction::DropOn(3)));
        assert_eq!(press(KeyCode::Char('5')), None);
    }

    #[test]
    fn brackets_move_cards() {
        assert_eq!(press(KeyCode::Char('[')), Some(KeyAction::MoveLeft));
        assert_eq!(press(KeyCode::Char(']')), Some(KeyAction::MoveRight));
    }

    #[test]
    fn ctrl_c_quits() {
        let action = key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(action, Some(Action::Quit)));
    }
}
