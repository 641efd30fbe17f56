use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::maze::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    Reset,
    Quit,
}

/// Translate a key press into a game command. Releases and unbound keys
/// map to nothing.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => {}
        KeyEventKind::Release => return None,
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    let command = match key.code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Command::Steer(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Command::Steer(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Command::Steer(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => {
            Command::Steer(Direction::Right)
        }
        KeyCode::Char('r') | KeyCode::Enter => Command::Reset,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(command)
}
