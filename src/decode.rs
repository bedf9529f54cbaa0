//! Decodes a completed chord, together with the persistent shift state, into an [OutputCode].
//!
//! Fingers alone and fingers with the thumb are ordinary characters, looked up through a cascade
//! of shift tiers: an extended shift beats Num lock, which beats Caps. The remaining modifier
//! combinations either select a dedicated table (Caps for commands, Num for numbers, Num+Caps for
//! countermands) or, pressed without fingers, change the shift state.

use crate::chord::{ChordMask, CAPS, NUM, THUMB};
use crate::keymap::{OutputCode, Table};

const THUMB_NUM: u8 = THUMB | NUM;
const THUMB_CAPS: u8 = THUMB | CAPS;
const NUM_CAPS: u8 = NUM | CAPS;

/// A shift that can apply to the next chord only, or stay on until toggled off
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Latch {
    #[default]
    Off,
    Transient,
    Locked,
}

impl Latch {
    /// One press arms the shift, a second locks it, a third clears it.
    pub const fn toggled(self) -> Self {
        match self {
            Latch::Off => Latch::Transient,
            Latch::Transient => Latch::Locked,
            Latch::Locked => Latch::Off,
        }
    }

    /// Returns whether the shift applies to this chord, clearing it if it was transient.
    pub fn consume(&mut self) -> bool {
        match *self {
            Latch::Off => false,
            Latch::Transient => {
                *self = Latch::Off;
                true
            }
            Latch::Locked => true,
        }
    }
}

/// A shift that only ever applies to the next chord
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OneShot {
    #[default]
    Off,
    Transient,
}

impl OneShot {
    /// Returns whether the shift was set, clearing it.
    pub fn consume(&mut self) -> bool {
        core::mem::take(self) == OneShot::Transient
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShiftState {
    pub caps: Latch,
    pub num_lock: Latch,
    pub e_shift: OneShot,
}

/// The tables consulted by each tier of the character cascade
struct Cascade {
    e_shift: Table,
    num_lock: Table,
    base: Table,
}

const FINGER_CASCADE: Cascade = Cascade {
    e_shift: Table::EShift,
    num_lock: Table::NumShift,
    base: Table::Basic,
};

const THUMB_CASCADE: Cascade = Cascade {
    e_shift: Table::EShiftThumb,
    num_lock: Table::Number,
    base: Table::Thumb,
};

impl ShiftState {
    pub const OFF: ShiftState = ShiftState {
        caps: Latch::Off,
        num_lock: Latch::Off,
        e_shift: OneShot::Off,
    };

    fn cascade(&mut self, tables: &Cascade, fingers: u8) -> OutputCode {
        if self.e_shift.consume() {
            tables.e_shift.get(fingers)
        } else if self.num_lock.consume() {
            tables.num_lock.get(fingers)
        } else if self.caps.consume() {
            tables.base.get(fingers).to_upper()
        } else {
            tables.base.get(fingers)
        }
    }
}

/// Decode one chord. Total over every mask and state; chords with no meaning leave the state
/// alone and produce [OutputCode::None].
pub fn decode(chord: ChordMask, mut state: ShiftState) -> (OutputCode, ShiftState) {
    let fingers = chord.fingers();
    let code = match (chord.modifiers(), fingers) {
        (0, 0) => OutputCode::None,
        (0, _) => state.cascade(&FINGER_CASCADE, fingers),
        (THUMB, _) => state.cascade(&THUMB_CASCADE, fingers),
        (NUM, 0) => OutputCode::None,
        (NUM, _) => {
            if state.e_shift.consume() {
                Table::Countermand.get(fingers)
            } else {
                Table::Number.get(fingers)
            }
        }
        (CAPS, 0) => {
            state.caps = state.caps.toggled();
            OutputCode::None
        }
        (CAPS, _) => Table::Command.get(fingers),
        (THUMB_NUM, 0) => {
            state.num_lock = state.num_lock.toggled();
            OutputCode::None
        }
        (THUMB_CAPS, 0) => {
            state = ShiftState::OFF;
            OutputCode::None
        }
        (NUM_CAPS, 0) => {
            state.e_shift = OneShot::Transient;
            OutputCode::None
        }
        (NUM_CAPS, _) => Table::Countermand.get(fingers),
        _ => OutputCode::None,
    };
    (code, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::REPEAT;
    use crate::keymap::Control;

    const CAPS_ALONE: ChordMask = ChordMask(CAPS);
    const CLEAR_SHIFTS: ChordMask = ChordMask(THUMB_CAPS);
    const E_SHIFT_SET: ChordMask = ChordMask(NUM_CAPS);

    const ALL_LATCHES: [Latch; 3] = [Latch::Off, Latch::Transient, Latch::Locked];
    const ALL_ONE_SHOTS: [OneShot; 2] = [OneShot::Off, OneShot::Transient];

    fn all_states() -> impl Iterator<Item = ShiftState> {
        ALL_LATCHES.into_iter().flat_map(|caps| {
            ALL_LATCHES.into_iter().flat_map(move |num_lock| {
                ALL_ONE_SHOTS.into_iter().map(move |e_shift| ShiftState { caps, num_lock, e_shift })
            })
        })
    }

    fn ch(c: char) -> OutputCode {
        OutputCode::Char(c as u8)
    }

    /// Feeds chords through the decoder from a clean state, returning the codes produced.
    fn run(chords: &[u8]) -> ([OutputCode; 8], ShiftState) {
        let mut codes = [OutputCode::None; 8];
        let mut state = ShiftState::default();
        for (slot, chord) in codes.iter_mut().zip(chords) {
            let (code, next) = decode(ChordMask(*chord), state);
            *slot = code;
            state = next;
        }
        (codes, state)
    }

    /// Which row of the case table a chord falls in, worked out bit by bit
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Row {
        Nothing,
        Fingers,
        Thumb,
        Number,
        CapsToggle,
        Command,
        NumLockToggle,
        Clear,
        EShiftSet,
        Countermand,
    }

    fn row(mask: u8) -> Row {
        let thumb = mask & 0x10 != 0;
        let caps = mask & 0x20 != 0;
        let num = mask & 0x40 != 0;
        let repeat = mask & 0x80 != 0;
        let fingers = mask & 0x0F != 0;
        if repeat {
            return Row::Nothing;
        }
        match (thumb, num, caps, fingers) {
            (false, false, false, false) => Row::Nothing,
            (false, false, false, true) => Row::Fingers,
            (true, false, false, _) => Row::Thumb,
            (false, true, false, false) => Row::Nothing,
            (false, true, false, true) => Row::Number,
            (false, false, true, false) => Row::CapsToggle,
            (false, false, true, true) => Row::Command,
            (true, true, false, false) => Row::NumLockToggle,
            (true, false, true, false) => Row::Clear,
            (false, true, true, false) => Row::EShiftSet,
            (false, true, true, true) => Row::Countermand,
            _ => Row::Nothing,
        }
    }

    fn next_latch(latch: Latch) -> Latch {
        match latch {
            Latch::Off => Latch::Transient,
            Latch::Transient => Latch::Locked,
            Latch::Locked => Latch::Off,
        }
    }

    fn spent(latch: Latch) -> Latch {
        if latch == Latch::Transient {
            Latch::Off
        } else {
            latch
        }
    }

    /// What a character chord should give, with the tables for e-shift, num lock and plain.
    fn character(state: ShiftState, tables: [Table; 3], fingers: u8) -> (OutputCode, ShiftState) {
        let [e_shift, num_lock, base] = tables;
        if state.e_shift == OneShot::Transient {
            (e_shift.get(fingers), ShiftState { e_shift: OneShot::Off, ..state })
        } else if state.num_lock != Latch::Off {
            (num_lock.get(fingers), ShiftState { num_lock: spent(state.num_lock), ..state })
        } else if state.caps != Latch::Off {
            (base.get(fingers).to_upper(), ShiftState { caps: spent(state.caps), ..state })
        } else {
            (base.get(fingers), state)
        }
    }

    fn expected(mask: u8, state: ShiftState) -> (OutputCode, ShiftState) {
        let fingers = mask & 0x0F;
        match row(mask) {
            Row::Nothing => (OutputCode::None, state),
            Row::Fingers => character(state, [Table::EShift, Table::NumShift, Table::Basic], fingers),
            Row::Thumb => character(state, [Table::EShiftThumb, Table::Number, Table::Thumb], fingers),
            Row::Number if state.e_shift == OneShot::Transient => {
                (Table::Countermand.get(fingers), ShiftState { e_shift: OneShot::Off, ..state })
            }
            Row::Number => (Table::Number.get(fingers), state),
            Row::CapsToggle => (OutputCode::None, ShiftState { caps: next_latch(state.caps), ..state }),
            Row::Command => (Table::Command.get(fingers), state),
            Row::NumLockToggle => (OutputCode::None, ShiftState { num_lock: next_latch(state.num_lock), ..state }),
            Row::Clear => (OutputCode::None, ShiftState::OFF),
            Row::EShiftSet => (OutputCode::None, ShiftState { e_shift: OneShot::Transient, ..state }),
            Row::Countermand => (Table::Countermand.get(fingers), state),
        }
    }

    #[test]
    fn every_mask_in_every_state_follows_the_case_table() {
        let mut counts = [0usize; 10];
        for mask in 0..=255u8 {
            counts[row(mask) as usize] += 1;
            for state in all_states() {
                assert_eq!(decode(ChordMask(mask), state), expected(mask, state), "mask {:#04x} in {:?}", mask, state);
            }
        }
        // Nothing, Fingers, Thumb, Number, CapsToggle, Command, NumLockToggle, Clear, EShiftSet, Countermand
        assert_eq!(counts, [176, 15, 16, 15, 1, 15, 1, 1, 1, 15]);
    }

    #[test]
    fn meaningless_chords_leave_every_state_alone() {
        let meaningless = (0..=255u8).filter(|m| m & REPEAT != 0 || m & (THUMB | NUM) == THUMB | NUM || m & (THUMB | CAPS) == THUMB | CAPS);
        for mask in meaningless {
            if mask == THUMB_NUM || mask == THUMB_CAPS {
                continue;
            }
            for state in all_states() {
                assert_eq!(decode(ChordMask(mask), state), (OutputCode::None, state), "mask {:#04x}", mask);
            }
        }
    }

    #[test]
    fn plain_fingers_use_the_basic_table() {
        let (code, state) = decode(ChordMask(0x0C), ShiftState::default());
        assert_eq!(code, ch('a'));
        assert_eq!(state, ShiftState::default());
    }

    #[test]
    fn caps_toggle_cycles_off_transient_locked_off() {
        let mut state = ShiftState::default();
        let mut seen = [Latch::Off; 3];
        for latch in &mut seen {
            let (code, next) = decode(CAPS_ALONE, state);
            assert_eq!(code, OutputCode::None);
            *latch = next.caps;
            state = next;
        }
        assert_eq!(seen, [Latch::Transient, Latch::Locked, Latch::Off]);
    }

    #[test]
    fn transient_caps_is_consumed_and_locked_caps_is_kept() {
        let (codes, state) = run(&[CAPS, 0x0C, 0x0C]);
        assert_eq!(codes[1], ch('A'));
        assert_eq!(codes[2], ch('a'));
        assert_eq!(state.caps, Latch::Off);

        let (codes, state) = run(&[CAPS, CAPS, 0x0C, 0x0C]);
        assert_eq!(codes[2], ch('A'));
        assert_eq!(codes[3], ch('A'));
        assert_eq!(state.caps, Latch::Locked);
    }

    #[test]
    fn caps_upper_cases_the_thumb_table_too() {
        let (codes, _) = run(&[CAPS, THUMB | 0x01]);
        assert_eq!(codes[1], ch('H'));
    }

    #[test]
    fn num_lock_follows_the_two_press_lock_law() {
        let (_, state) = run(&[THUMB_NUM]);
        assert_eq!(state.num_lock, Latch::Transient);
        let (_, state) = run(&[THUMB_NUM, THUMB_NUM]);
        assert_eq!(state.num_lock, Latch::Locked);
        let (_, state) = run(&[THUMB_NUM, THUMB_NUM, THUMB_NUM]);
        assert_eq!(state.num_lock, Latch::Off);

        let (codes, state) = run(&[THUMB_NUM, 0x09, 0x09]);
        assert_eq!(codes[1], ch('!'));
        assert_eq!(codes[2], ch('v'));
        assert_eq!(state.num_lock, Latch::Off);

        let (codes, state) = run(&[THUMB_NUM, THUMB_NUM, THUMB | 0x01, THUMB | 0x01]);
        assert_eq!(codes[2], ch('6'));
        assert_eq!(codes[3], ch('6'));
        assert_eq!(state.num_lock, Latch::Locked);
    }

    #[test]
    fn num_lock_beats_caps() {
        let (codes, state) = run(&[CAPS, THUMB_NUM, 0x01]);
        assert_eq!(codes[2], ch('_'));
        assert_eq!(state.caps, Latch::Transient);
        assert_eq!(state.num_lock, Latch::Off);
    }

    #[test]
    fn e_shift_is_single_shot_and_beats_everything() {
        let (codes, state) = run(&[CAPS, CAPS, THUMB_NUM, NUM_CAPS, 0x01, 0x01]);
        assert_eq!(codes[4], ch('^'));
        assert_eq!(codes[5], ch('_'));
        assert_eq!(state.e_shift, OneShot::Off);
        assert_eq!(state.caps, Latch::Locked);
    }

    #[test]
    fn e_shift_is_consumed_by_any_character_chord() {
        for mask in 1..=0x1Fu8 {
            let state = ShiftState { e_shift: OneShot::Transient, ..ShiftState::default() };
            let (_, next) = decode(ChordMask(mask), state);
            assert_eq!(next.e_shift, OneShot::Off, "mask {:#04x}", mask);
        }
    }

    #[test]
    fn e_shift_thumb_table_holds_function_keys() {
        let (codes, _) = run(&[NUM_CAPS, THUMB]);
        assert_eq!(codes[1], OutputCode::Control(Control::Function(1)));
    }

    #[test]
    fn num_with_fingers_uses_the_number_table_regardless_of_num_lock() {
        for state in all_states().filter(|s| s.e_shift == OneShot::Off) {
            let (code, next) = decode(ChordMask(NUM | 0x08), state);
            assert_eq!(code, ch('2'));
            assert_eq!(next, state);
        }
    }

    #[test]
    fn both_countermand_routes_use_the_countermand_table() {
        for fingers in 1..16u8 {
            let expected = Table::Countermand.get(fingers);

            let (direct, _) = decode(ChordMask(NUM_CAPS | fingers), ShiftState::default());
            assert_eq!(direct, expected);

            let (codes, state) = run(&[NUM_CAPS, NUM | fingers]);
            assert_eq!(codes[1], expected);
            assert_eq!(state.e_shift, OneShot::Off);
        }
        let (codes, _) = run(&[NUM_CAPS, NUM | 0x09]);
        assert_eq!(codes[1], OutputCode::Control(Control::Ctrl));
        assert_ne!(codes[1], Table::Number.get(0x09));
    }

    #[test]
    fn caps_with_fingers_is_a_command_and_leaves_shifts_alone() {
        let state = ShiftState { caps: Latch::Transient, num_lock: Latch::Locked, e_shift: OneShot::Transient };
        let (code, next) = decode(ChordMask(CAPS | 0x07), state);
        assert_eq!(code, OutputCode::Control(Control::Escape));
        assert_eq!(next, state);
    }

    #[test]
    fn thumb_and_caps_clears_every_shift() {
        for state in all_states() {
            let (code, next) = decode(CLEAR_SHIFTS, state);
            assert_eq!(code, OutputCode::None);
            assert_eq!(next, ShiftState::default());
        }
    }

    #[test]
    fn num_and_caps_alone_arms_e_shift() {
        let (code, state) = decode(E_SHIFT_SET, ShiftState::default());
        assert_eq!(code, OutputCode::None);
        assert_eq!(state.e_shift, OneShot::Transient);
    }

    #[test]
    fn unmapped_combinations_are_no_ops() {
        let unmapped = [
            0x00,
            NUM,
            REPEAT,
            REPEAT | 0x0C,
            THUMB_NUM | 0x01,
            THUMB_CAPS | 0x01,
            THUMB | NUM | CAPS,
            THUMB | NUM | CAPS | 0x0F,
            0xFF,
        ];
        for state in all_states() {
            for mask in unmapped {
                assert_eq!(decode(ChordMask(mask), state), (OutputCode::None, state), "mask {:#04x}", mask);
            }
        }
    }
}
