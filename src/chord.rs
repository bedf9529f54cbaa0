//! The 8-bit chord mask and the press-and-release accumulator that produces one mask per chord.
//!
//! The switches are mapped into the mask as follows:
//!
//! ```text
//!   bit:  7       6     5     4       3      2       1     0
//!         Repeat  Num   Caps  Thumb   Index  Middle  Ring  Pinky
//! ```
//!
//! The low nibble holds the finger switches and the high nibble the modifier switches.

use core::mem::take;
use core::ops::{BitOr, BitOrAssign};

pub const THUMB: u8 = 0x10;
pub const CAPS: u8 = 0x20;
pub const NUM: u8 = 0x40;
pub const REPEAT: u8 = 0x80;

pub const MODIFIERS_MASK: u8 = 0xF0;
pub const FINGERS_MASK: u8 = 0x0F;

/// GPIO line wired to bit 0 of the mask. The eight switches occupy this line and the seven above
/// it (lines 0 and 1 are left for the UART).
pub const FIRST_SWITCH_GPIO: u32 = 2;

/// Which switches are (or were, during a chord) held down, active-high.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChordMask(pub u8);

impl ChordMask {
    pub const RELEASED: ChordMask = ChordMask(0);

    /// Normalise a raw read of the GPIO bank. The switches pull their lines low when pressed.
    pub const fn from_gpio_bank(bank: u32) -> Self {
        ChordMask(((!bank >> FIRST_SWITCH_GPIO) & 0xFF) as u8)
    }

    /// The finger switch pattern (0 to 15)
    pub const fn fingers(self) -> u8 {
        self.0 & FINGERS_MASK
    }

    /// The modifier switch pattern, still in place in the high nibble
    pub const fn modifiers(self) -> u8 {
        self.0 & MODIFIERS_MASK
    }

    pub const fn is_released(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ChordMask {
    type Output = ChordMask;

    fn bitor(self, rhs: ChordMask) -> ChordMask {
        ChordMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChordMask {
    fn bitor_assign(&mut self, rhs: ChordMask) {
        self.0 |= rhs.0;
    }
}

/// ORs together every sample taken while any switch is down, and hands back the combined mask
/// once everything has been let go.
///
/// Press and release order within a chord doesn't matter, so switch bounce during a chord is
/// harmless. A switch stuck down means the chord never completes.
#[derive(Default)]
pub struct Accumulator {
    held: ChordMask,
}

impl Accumulator {
    pub const fn new() -> Self {
        Accumulator { held: ChordMask::RELEASED }
    }

    /// Record one sample. Returns the completed chord on the first all-released sample after a
    /// press, and `None` otherwise.
    pub fn feed(&mut self, sample: ChordMask) -> Option<ChordMask> {
        if !sample.is_released() {
            self.held |= sample;
            None
        } else if !self.held.is_released() {
            Some(take(&mut self.held))
        } else {
            None
        }
    }

    /// Whether a chord is currently being built
    #[cfg(test)]
    pub fn in_progress(&self) -> bool {
        !self.held.is_released()
    }
}
