//! USB link state and host Caps Lock, as reported by the USB handlers and shown on the board LED.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Link {
    NotMounted = 0,
    Mounted = 1,
    Suspended = 2,
}

impl Link {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Link::Mounted,
            2 => Link::Suspended,
            _ => Link::NotMounted,
        }
    }
}

/// Durations in milliseconds of alternating LED phases, starting with the LED on
pub type BlinkPattern = [u16; 4];

/// Short, long, short, long
const NOT_MOUNTED: BlinkPattern = [80, 500, 80, 500];
/// Short, short, short, long
const MOUNTED: BlinkPattern = [80, 80, 80, 1900];
/// Short, very long, short, very long
const SUSPENDED: BlinkPattern = [80, 1700, 80, 1700];

pub const fn blink_pattern(link: Link) -> &'static BlinkPattern {
    match link {
        Link::NotMounted => &NOT_MOUNTED,
        Link::Mounted => &MOUNTED,
        Link::Suspended => &SUSPENDED,
    }
}

/// The LED is lit in the even phases of a [BlinkPattern], which are the short flashes.
pub const fn led_on_in_phase(phase: usize) -> bool {
    phase % 2 == 0
}

/// What the status LED should be doing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indication {
    /// Host has Caps Lock on
    Solid,
    Blink(&'static BlinkPattern),
}

/// Shared between the USB handlers, which write it, and the LED task, which reads it.
pub struct Status {
    link: AtomicU8,
    host_caps_lock: AtomicBool,
}

impl Status {
    pub const fn new() -> Self {
        Status {
            link: AtomicU8::new(Link::NotMounted as u8),
            host_caps_lock: AtomicBool::new(false),
        }
    }

    /// Only the USB device handler calls this, so a plain load and store is enough (thumbv6m has
    /// no atomic read-modify-write).
    pub fn set_link(&self, link: Link) {
        if self.link() != link {
            info!("usb link {}", link);
            self.link.store(link as u8, Ordering::Relaxed);
        }
    }

    pub fn link(&self) -> Link {
        Link::from_u8(self.link.load(Ordering::Relaxed))
    }

    pub fn set_host_caps_lock(&self, on: bool) {
        self.host_caps_lock.store(on, Ordering::Relaxed);
    }

    pub fn indication(&self) -> Indication {
        if self.host_caps_lock.load(Ordering::Relaxed) && self.link() != Link::Suspended {
            Indication::Solid
        } else {
            Indication::Blink(blink_pattern(self.link()))
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}
