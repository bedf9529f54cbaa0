//! Defines what a decoded chord produces (an [OutputCode]) and the tables of [OutputCode]s that
//! each finger pattern maps to, one table per shift tier.
//!
//! Intimately related to [crate::decode], which picks the table for a chord, and
//! [crate::compose], which turns the resulting [OutputCode] into keycodes.

/// The non-printing keys and key sequences a chord can ask for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    Delete,
    Up,
    Right,
    PageUp,
    Insert,
    KeypadEnter,
    Tab,
    Enter,
    /// F1 to F12
    Function(u8),
    Home,
    Left,
    End,
    Down,
    PageDown,
    Escape,
    Backspace,
    /// Hold Ctrl for the next key
    Ctrl,
    /// Hold Alt for the next key
    Alt,
    /// Hold Alt and Ctrl together for the next key
    AltCtrl,
    /// Hold the GUI ("Windows") key for the next key
    Gui,
    /// Tap the GUI key by itself
    GuiKey,
}

/// What a chord produces
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputCode {
    /// The chord only changed shift state, or maps to nothing
    #[default]
    None,
    /// A printable ASCII character
    Char(u8),
    Control(Control),
    /// £
    Pound,
    /// €
    Euro,
}

impl OutputCode {
    /// Upper-cases lowercase letters and leaves everything else alone
    pub const fn to_upper(self) -> Self {
        match self {
            OutputCode::Char(c) => OutputCode::Char(c.to_ascii_uppercase()),
            other => other,
        }
    }

    pub const fn is_none(self) -> bool {
        matches!(self, OutputCode::None)
    }
}

/// One code per finger pattern
pub type Codes = [OutputCode; 16];

/// The table families a chord can be looked up in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Table {
    /// Fingers alone
    Basic,
    /// Fingers with the thumb
    Thumb,
    /// Fingers with Num, or with the thumb under Num lock
    Number,
    /// Fingers alone under Num lock
    NumShift,
    /// Fingers alone after an extended shift
    EShift,
    /// Fingers with the thumb after an extended shift
    EShiftThumb,
    /// Fingers with Caps
    Command,
    /// Fingers with Num and Caps, or with Num after an extended shift
    Countermand,
}

impl Table {
    pub const fn codes(self) -> &'static Codes {
        match self {
            Table::Basic => &BASIC,
            Table::Thumb => &THUMB,
            Table::Number => &NUMBER,
            Table::NumShift => &NUM_SHIFT,
            Table::EShift => &E_SHIFT,
            Table::EShiftThumb => &E_SHIFT_THUMB,
            Table::Command => &COMMAND,
            Table::Countermand => &COUNTERMAND,
        }
    }

    /// Looks up a finger pattern. Only the low four bits of `fingers` are used.
    pub const fn get(self, fingers: u8) -> OutputCode {
        self.codes()[(fingers & 0x0F) as usize]
    }
}

/// Translate a printable character into an [OutputCode]
const fn c(ch: char) -> OutputCode {
    assert!(ch.is_ascii() && !ch.is_ascii_control());
    OutputCode::Char(ch as u8)
}

/// Translate a [Control] into an [OutputCode]
const fn ctl(control: Control) -> OutputCode {
    OutputCode::Control(control)
}

/// Translate a function key number into an [OutputCode]
const fn f(n: u8) -> OutputCode {
    assert!(n >= 1 && n <= 12);
    OutputCode::Control(Control::Function(n))
}

const NON: OutputCode = OutputCode::None;
const RTN: OutputCode = ctl(Control::Enter);
const TAB: OutputCode = ctl(Control::Tab);
const KPE: OutputCode = ctl(Control::KeypadEnter);
const A_C: OutputCode = ctl(Control::AltCtrl);
const GBP: OutputCode = OutputCode::Pound;
const EUR: OutputCode = OutputCode::Euro;

// Finger patterns, as the index into each table, run pinky = 1, ring = 2, middle = 4, index = 8.

pub const BASIC: Codes = [
    NON,    c('u'), c('s'), c('g'),
    c('o'), c('q'), c('n'), c('b'),
    c('e'), c('v'), c('t'), c(','),
    c('a'), RTN,    c('.'), c('m'),
];

pub const THUMB: Codes = [
    c(' '), c('h'), c('k'), c('j'),
    c('c'), c('z'), c('y'), c('x'),
    c('i'), c('l'), c('r'), c('w'),
    c('d'), c('\''), c('f'), c('p'),
];

pub const NUMBER: Codes = [
    c('1'), c('6'), c('$'), c('7'),
    c('0'), KPE,    c('#'), c('8'),
    c('2'), GBP,    c('+'), c('9'),
    c('3'), c('-'), c('4'), c('5'),
];

pub const NUM_SHIFT: Codes = [
    NON,    c('_'), c('['), c('>'),
    c('('), c('/'), c('-'), c('{'),
    c('='), c('!'), TAB,    c(','),
    c('+'), RTN,    c('.'), c('*'),
];

pub const E_SHIFT: Codes = [
    NON,    c('^'), c(']'), c('<'),
    c(')'), c('\\'), c('~'), c('}'),
    f(11),  c('|'), f(12),  c(';'),
    c('@'), RTN,    c(':'), A_C,
];

pub const E_SHIFT_THUMB: Codes = [
    f(1),   f(6),   c('&'), f(7),
    f(10),  c('%'), c('?'), f(8),
    f(2),   EUR,    c('-'), f(9),
    f(3),   c('"'), f(4),   f(5),
];

pub const COMMAND: Codes = [
    NON,                     ctl(Control::Home),      ctl(Control::Left),     ctl(Control::End),
    KPE,                     ctl(Control::Down),      ctl(Control::PageDown), ctl(Control::Escape),
    ctl(Control::Backspace), ctl(Control::Alt),       TAB,                    ctl(Control::Delete),
    ctl(Control::Backspace), ctl(Control::Up),        ctl(Control::Right),    ctl(Control::PageUp),
];

pub const COUNTERMAND: Codes = [
    NON,                     NON,                     NON,                    ctl(Control::Home),
    NON,                     ctl(Control::Up),        ctl(Control::PageUp),   ctl(Control::GuiKey),
    ctl(Control::Insert),    ctl(Control::Ctrl),      NON,                    ctl(Control::Gui),
    ctl(Control::Delete),    NON,                     ctl(Control::Left),     NON,
];
