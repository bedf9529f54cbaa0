//! Turns [OutputCode]s into [PackedReport]s.
//!
//! Ctrl, Alt, Alt+Ctrl and GUI are chorded as "start" codes: they produce nothing themselves, but
//! are held over and combined with whatever key the next chord produces.

use crate::keycode::{modifier_bit, plain, shifted, HidKeyCode, Key, KeyCode, KeyCode::*, DIGITS, FUNCTION_KEYS, LETTERS};
use crate::keymap::{Control, OutputCode};
use crate::report::PackedReport;

/// A modifier waiting for the next key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PendingModifier {
    Ctrl,
    Alt,
    AltCtrl,
    Gui,
}

impl PendingModifier {
    /// Combines the held modifier with the next keycode. The modifier keys themselves are sent as
    /// keycodes ahead of the key, as well as being set in the modifier byte. Any shift the key
    /// would have carried on its own is dropped.
    fn chain(self, code: HidKeyCode) -> PackedReport {
        let (primary, secondary, tertiary) = match self {
            PendingModifier::Ctrl => (LCtrl.hid(), code, 0),
            PendingModifier::Alt => (LAlt.hid(), code, 0),
            PendingModifier::Gui => (LGui.hid(), code, 0),
            PendingModifier::AltCtrl => (LCtrl.hid(), LAlt.hid(), code),
        };
        PackedReport {
            primary,
            secondary,
            tertiary,
            modifier: self.modifier_bits(),
        }
    }

    const fn modifier_bits(self) -> u8 {
        match self {
            PendingModifier::Ctrl => modifier_bit(LCtrl),
            PendingModifier::Alt => modifier_bit(LAlt),
            PendingModifier::Gui => modifier_bit(LGui),
            PendingModifier::AltCtrl => modifier_bit(LCtrl) | modifier_bit(LAlt),
        }
    }
}

/// What a single [OutputCode] amounts to, before any pending modifier is applied
enum Stroke {
    Key(Key),
    Start(PendingModifier),
}

const NO_KEY: Key = (0, 0);

/// The keycode and shift needed to type a character on a US layout, or no key for characters that
/// can't be typed.
pub const fn ascii_key(ch: u8) -> Key {
    match ch {
        b'a'..=b'z' => plain(LETTERS[(ch - b'a') as usize]),
        b'A'..=b'Z' => shifted(LETTERS[(ch - b'A') as usize]),
        b'0'..=b'9' => plain(DIGITS[(ch - b'0') as usize]),
        0x08 => plain(Backspace),
        b'\t' => plain(Tab),
        b'\n' | b'\r' => plain(Enter),
        0x1B => plain(Escape),
        b' ' => plain(Space),
        b'!' => shifted(Kc1),
        b'"' => shifted(Quote),
        b'#' => shifted(Kc3),
        b'$' => shifted(Kc4),
        b'%' => shifted(Kc5),
        b'&' => shifted(Kc7),
        b'\'' => plain(Quote),
        b'(' => shifted(Kc9),
        b')' => shifted(Kc0),
        b'*' => shifted(Kc8),
        b'+' => shifted(Equal),
        b',' => plain(Comma),
        b'-' => plain(Minus),
        b'.' => plain(Dot),
        b'/' => plain(Slash),
        b':' => shifted(Semicolon),
        b';' => plain(Semicolon),
        b'<' => shifted(Comma),
        b'=' => plain(Equal),
        b'>' => shifted(Dot),
        b'?' => shifted(Slash),
        b'@' => shifted(Kc2),
        b'[' => plain(LeftBracket),
        b'\\' => plain(Backslash),
        b']' => plain(RightBracket),
        b'^' => shifted(Kc6),
        b'_' => shifted(Minus),
        b'`' => plain(Grave),
        b'{' => shifted(LeftBracket),
        b'|' => shifted(Backslash),
        b'}' => shifted(RightBracket),
        b'~' => shifted(Grave),
        0x7F => plain(Delete),
        _ => NO_KEY,
    }
}

/// The key a [Control] sends. Modifier starts have no key of their own.
const fn control_key(control: Control) -> Option<KeyCode> {
    Some(match control {
        Control::Delete => Delete,
        Control::Up => Up,
        Control::Right => Right,
        Control::PageUp => PageUp,
        Control::Insert => Insert,
        Control::KeypadEnter => KpEnter,
        Control::Tab => Tab,
        Control::Enter => Enter,
        Control::Function(n @ 1..=12) => FUNCTION_KEYS[(n - 1) as usize],
        Control::Function(_) => return None,
        Control::Home => Home,
        Control::Left => Left,
        Control::End => End,
        Control::Down => Down,
        Control::PageDown => PageDown,
        Control::Escape => Escape,
        Control::Backspace => Backspace,
        Control::GuiKey => LGui,
        Control::Ctrl | Control::Alt | Control::AltCtrl | Control::Gui => return None,
    })
}

fn stroke(code: OutputCode) -> Stroke {
    match code {
        OutputCode::None => Stroke::Key(NO_KEY),
        OutputCode::Char(ch) => Stroke::Key(ascii_key(ch)),
        // AltGr+4 on UK layouts
        OutputCode::Euro => Stroke::Key((Kc4.hid(), modifier_bit(RAlt))),
        // Shift+3 on UK layouts
        OutputCode::Pound => Stroke::Key(shifted(Kc3)),
        OutputCode::Control(Control::Ctrl) => Stroke::Start(PendingModifier::Ctrl),
        OutputCode::Control(Control::Alt) => Stroke::Start(PendingModifier::Alt),
        OutputCode::Control(Control::AltCtrl) => Stroke::Start(PendingModifier::AltCtrl),
        OutputCode::Control(Control::Gui) => Stroke::Start(PendingModifier::Gui),
        OutputCode::Control(Control::GuiKey) => Stroke::Key((LGui.hid(), modifier_bit(LGui))),
        OutputCode::Control(control) => match control_key(control) {
            Some(key) => Stroke::Key(plain(key)),
            None => Stroke::Key(NO_KEY),
        },
    }
}

/// Composes reports, carrying at most one [PendingModifier] from one code to the next.
#[derive(Default)]
pub struct Composer {
    pending: Option<PendingModifier>,
}

impl Composer {
    pub const fn new() -> Self {
        Composer { pending: None }
    }

    #[cfg(test)]
    pub fn pending(&self) -> Option<PendingModifier> {
        self.pending
    }

    /// Returns a report to send, or `None` when the code is absorbed: a modifier start, or a code
    /// with no key. A pending modifier is used up by the next code whether or not it has a key.
    pub fn compose(&mut self, code: OutputCode) -> Option<PackedReport> {
        let key = match stroke(code) {
            Stroke::Start(modifier) => {
                trace!("holding {} for the next key", modifier);
                self.pending = Some(modifier);
                return None;
            }
            Stroke::Key(key) => key,
        };

        let pending = self.pending.take();
        if key.0 == 0 {
            return None;
        }
        Some(match pending {
            Some(modifier) => modifier.chain(key.0),
            None => PackedReport::key(key),
        })
    }
}
