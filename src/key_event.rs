//! Keyboard input as delivered by the editing surface.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held down while a key was pressed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT   = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT     = 1 << 2;
        const META    = 1 << 3;
    }
}

impl Modifiers {
    /// Returns `true` if a command modifier (Control or Meta) is held,
    /// meaning the key is a shortcut rather than text input.
    pub fn is_command(self) -> bool {
        self.intersects(Modifiers::CONTROL | Modifiers::META)
    }
}

/// The logical key that was pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A single printable character.
    Char(char),
    Backspace,
    Enter,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Tab,
    /// Any other named key, e.g., `"PageDown"` or `"F5"`.
    Other(String),
}

/// A single key-down event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key, modifiers: Modifiers::empty() }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c))
    }

    /// Returns the character this event would type as text, if any.
    ///
    /// Shift and Alt still produce text; Control and Meta do not.
    pub fn printable_char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !c.is_control() && !self.modifiers.is_command() => Some(c),
            _ => None,
        }
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}
