//! Everything the scanning core does with a switch sample: accumulate the chord, decode it against
//! the shift state, and compose the resulting report.

use crate::chord::{Accumulator, ChordMask};
use crate::compose::Composer;
use crate::decode::{decode, ShiftState};
use crate::report::PackedReport;

/// Owns all of the scanner's state. There is exactly one of these, living in the scanner task.
#[derive(Default)]
pub struct ChordEngine {
    accumulator: Accumulator,
    shift: ShiftState,
    composer: Composer,
}

impl ChordEngine {
    pub const fn new() -> Self {
        ChordEngine {
            accumulator: Accumulator::new(),
            shift: ShiftState::OFF,
            composer: Composer::new(),
        }
    }

    #[cfg(test)]
    pub fn shift_state(&self) -> ShiftState {
        self.shift
    }

    /// Takes one sample, returning a report when it completes a chord that types something.
    pub fn poll(&mut self, sample: ChordMask) -> Option<PackedReport> {
        let chord = self.accumulator.feed(sample)?;
        let (code, shift) = decode(chord, self.shift);
        debug!("chord {=u8:#x} -> {}", chord.0, code);
        if shift != self.shift {
            trace!("shift state {} -> {}", self.shift, shift);
            self.shift = shift;
        }
        if code.is_none() {
            return None;
        }
        self.composer.compose(code)
    }
}
