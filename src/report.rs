//! The packed key report passed from the scanner to the USB side, and the sequencing of key-down
//! and key-up HID reports on the way out.

use crate::keycode::{HidKeyCode, Key, Modifiers};
use crate::transport::OutputQueue;
use usbd_hid::descriptor::KeyboardReport;

/// Up to three keycodes and a modifier byte, which is all a single chord can ever ask for.
///
/// Packs into one word as lane 0 = `primary` (least significant byte), lane 1 = `secondary`,
/// lane 2 = `tertiary`, lane 3 = `modifier`. The keycodes go out in the HID report in that order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PackedReport {
    pub primary: HidKeyCode,
    pub secondary: HidKeyCode,
    pub tertiary: HidKeyCode,
    pub modifier: Modifiers,
}

impl PackedReport {
    /// "No key" sentinel; packs to zero
    pub const EMPTY: PackedReport = PackedReport {
        primary: 0,
        secondary: 0,
        tertiary: 0,
        modifier: 0,
    };

    /// A single key with its modifiers
    pub const fn key((code, modifier): Key) -> Self {
        PackedReport {
            primary: code,
            secondary: 0,
            tertiary: 0,
            modifier,
        }
    }

    pub const fn to_word(self) -> u32 {
        u32::from_le_bytes([self.primary, self.secondary, self.tertiary, self.modifier])
    }

    #[cfg(test)]
    pub const fn from_word(word: u32) -> Self {
        let [primary, secondary, tertiary, modifier] = word.to_le_bytes();
        PackedReport {
            primary,
            secondary,
            tertiary,
            modifier,
        }
    }

    /// Whether any keycode lane is set. Reports with only modifiers are never sent.
    #[cfg(test)]
    pub const fn has_key(&self) -> bool {
        self.primary != 0 || self.secondary != 0 || self.tertiary != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.to_word() == 0
    }
}

impl From<PackedReport> for KeyboardReport {
    fn from(packed: PackedReport) -> Self {
        let mut report = KeyboardReport::default();
        report.modifier = packed.modifier;
        report.keycodes[0] = packed.primary;
        report.keycodes[1] = packed.secondary;
        report.keycodes[2] = packed.tertiary;
        report
    }
}

/// Decides what HID report, if any, to write on each poll tick.
///
/// Every key-down is followed by a key-up on the next tick, even when more keys are queued, so
/// that typing the same chord twice gives the host two separate presses.
#[derive(Default)]
pub struct KeyReporter {
    key_down: bool,
}

impl KeyReporter {
    pub const fn new() -> Self {
        KeyReporter { key_down: false }
    }

    pub fn next_report(&mut self, queue: &mut OutputQueue) -> Option<KeyboardReport> {
        if self.key_down {
            self.key_down = false;
            return Some(KeyboardReport::default());
        }
        let next = queue.pop();
        if next.is_empty() {
            None
        } else {
            self.key_down = true;
            Some(next.into())
        }
    }
}
