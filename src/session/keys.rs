/// Editor-agnostic key identifier. The shell translates its native key events
/// into this before handing them to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Esc,
    /// A bare Ctrl/Alt/Shift/Meta press.
    Modifier,
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn ctrl(ch: char) -> Self {
        Self::new(Key::Char(ch), Modifiers::CTRL)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hotkey {
    Reset,
    Skip,
}

/// What the session did with a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Hotkey(Hotkey),
    Counted,
    Ignored,
}

/// Ctrl+R resets, Ctrl+S skips. Checked before stroke counting so a hotkey
/// never adds to the stroke total.
pub fn hotkey(press: &KeyPress) -> Option<Hotkey> {
    if !press.modifiers.ctrl {
        return None;
    }
    match press.key {
        Key::Char(ch) if ch.eq_ignore_ascii_case(&'r') => Some(Hotkey::Reset),
        Key::Char(ch) if ch.eq_ignore_ascii_case(&'s') => Some(Hotkey::Skip),
        _ => None,
    }
}

/// A modifier on its own is not a stroke; a modifier held with another key
/// is reported as a single press of that key.
pub fn counts_as_stroke(press: &KeyPress) -> bool {
    !matches!(press.key, Key::Modifier)
}
