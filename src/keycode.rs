//! USB HID keyboard usage ids (HID Usage Tables, page 0x07) for every key this keyboard can
//! produce, plus the bits those modifier keys occupy in the report's modifier byte.

/// Raw keycode lane value as it appears in a HID report
pub type HidKeyCode = u8;
/// Modifier byte of a HID report
pub type Modifiers = u8;
/// A keycode together with the modifiers that must be held while it is typed
pub type Key = (HidKeyCode, Modifiers);

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyCode {
    A = 0x04, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Kc1 = 0x1E, Kc2, Kc3, Kc4, Kc5, Kc6, Kc7, Kc8, Kc9, Kc0,
    Enter = 0x28,
    Escape,
    Backspace,
    Tab,
    Space,
    Minus,
    Equal,
    LeftBracket,
    RightBracket,
    Backslash,
    Semicolon = 0x33,
    Quote,
    Grave,
    Comma,
    Dot,
    Slash,
    F1 = 0x3A, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Insert = 0x49,
    Home,
    PageUp,
    Delete,
    End,
    PageDown,
    Right,
    Left,
    Down,
    Up,
    KpEnter = 0x58,
    LCtrl = 0xE0,
    LShift,
    LAlt,
    LGui,
    RCtrl,
    RShift,
    RAlt,
    RGui,
}

use KeyCode::*;

/// Letter keys in alphabetical order
pub const LETTERS: [KeyCode; 26] = [
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
];

/// Digit keys, indexed by the digit they type
pub const DIGITS: [KeyCode; 10] = [Kc0, Kc1, Kc2, Kc3, Kc4, Kc5, Kc6, Kc7, Kc8, Kc9];

/// Function keys F1 to F12, indexed from zero
pub const FUNCTION_KEYS: [KeyCode; 12] = [F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12];

/// Maps a modifier [KeyCode] to the equivalent flag bit for the USB HID modifier byte, or returns
/// 0 for any non-modifier [KeyCode].
pub const fn modifier_bit(code: KeyCode) -> Modifiers {
    match code {
        LCtrl => 0x01,
        LShift => 0x02,
        LAlt => 0x04,
        LGui => 0x08,
        RCtrl => 0x10,
        RShift => 0x20,
        RAlt => 0x40,
        RGui => 0x80,
        _ => 0,
    }
}

impl KeyCode {
    pub const fn hid(self) -> HidKeyCode {
        self as u8
    }

    #[cfg(test)]
    pub const fn is_modifier(self) -> bool {
        modifier_bit(self) != 0
    }
}

/// A [KeyCode] typed on its own
pub const fn plain(code: KeyCode) -> Key {
    (code.hid(), 0)
}

/// A [KeyCode] typed while holding left-shift
pub const fn shifted(code: KeyCode) -> Key {
    (code.hid(), modifier_bit(LShift))
}
