//! Keyboard shortcuts
//!
//! Maps a raw key press to a session `Intent`. Arrow, Enter and Backspace keys
//! belong to a text field while one has focus, and so do the undo and redo
//! chords.

use crate::error::ApiError;
use crate::navigator::Direction;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Escape,
    Backspace,
}

/// One key press with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// Focus is inside a text-editing field
    pub in_text_field: bool,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            shift: false,
            in_text_field: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn in_text_field(mut self) -> Self {
        self.in_text_field = true;
        self
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Parses chords such as `ctrl+shift+z`, `cmd+k`, `left` or `enter`
impl FromStr for KeyInput {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut input = KeyInput::new(Key::Escape);
        let mut key = None;
        for part in s.split('+').map(|p| p.trim().to_ascii_lowercase()) {
            match part.as_str() {
                "ctrl" | "control" => input.ctrl = true,
                "cmd" | "meta" | "super" => input.meta = true,
                "shift" => input.shift = true,
                "up" => key = Some(Key::ArrowUp),
                "down" => key = Some(Key::ArrowDown),
                "left" => key = Some(Key::ArrowLeft),
                "right" => key = Some(Key::ArrowRight),
                "enter" | "return" => key = Some(Key::Enter),
                "esc" | "escape" => key = Some(Key::Escape),
                "backspace" => key = Some(Key::Backspace),
                other => {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => key = Some(Key::Char(c)),
                        _ => {
                            return Err(ApiError::InvalidCommand(format!("Unknown key: {}", other)));
                        }
                    }
                }
            }
        }
        input.key = key.ok_or_else(|| ApiError::InvalidCommand(format!("No key in chord: {}", s)))?;
        Ok(input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Undo,
    Redo,
    FocusSearch,
    ClearSearch,
    Navigate(Direction),
    Activate,
    Back,
}

/// Resolve a key press, or `None` when the key is not a shortcut here
pub fn resolve(input: &KeyInput) -> Option<Intent> {
    if input.command() {
        return match input.key {
            Key::Char(c) => match c.to_ascii_lowercase() {
                'z' if input.in_text_field => None,
                'z' if input.shift => Some(Intent::Redo),
                'z' => Some(Intent::Undo),
                'y' if input.in_text_field => None,
                'y' => Some(Intent::Redo),
                'k' => Some(Intent::FocusSearch),
                _ => None,
            },
            _ => None,
        };
    }
    if input.key == Key::Escape {
        return Some(Intent::ClearSearch);
    }
    if input.in_text_field {
        return None;
    }
    match input.key {
        Key::ArrowUp => Some(Intent::Navigate(Direction::Up)),
        Key::ArrowDown => Some(Intent::Navigate(Direction::Down)),
        Key::ArrowLeft => Some(Intent::Navigate(Direction::Left)),
        Key::ArrowRight => Some(Intent::Navigate(Direction::Right)),
        Key::Enter => Some(Intent::Activate),
        Key::Backspace => Some(Intent::Back),
        _ => None,
    }
}
