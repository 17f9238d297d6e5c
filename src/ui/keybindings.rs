//! Key mapping for the interactive screen.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    LoadModel,
    Generate,
    ToggleTranscript,
    DeleteBackward,
    ClearTopic,
    Insert(char),
    Ignore,
}

pub fn map_key(key: &KeyEvent) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Char('l') if ctrl => KeyAction::LoadModel,
        KeyCode::Char('p') if ctrl => KeyAction::ToggleTranscript,
        KeyCode::Char('u') if ctrl => KeyAction::ClearTopic,
        KeyCode::Char(_) if ctrl => KeyAction::Ignore,
        KeyCode::Char(c) => KeyAction::Insert(c),
        KeyCode::Enter => KeyAction::Generate,
        KeyCode::Backspace => KeyAction::DeleteBackward,
        _ => KeyAction::Ignore,
    }
}
