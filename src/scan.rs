//! Reads the eight chord switches on a fixed tick and feeds them through the [ChordEngine], handing
//! each finished report to [crate::usb] via [crate::RELAY]. Runs on its own core.

use crate::chord::{ChordMask, FIRST_SWITCH_GPIO};
use crate::engine::ChordEngine;
use crate::RELAY;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Ticker};

/// How often the switches are sampled. Faster costs more scanning for less latency.
pub const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How many switches there are
pub const SWITCHES: usize = 8;

/// The switch inputs, in mask bit order (pinky first), on consecutive GPIO lines from
/// [FIRST_SWITCH_GPIO].
pub struct Switches<'a> {
    pins: [Input<'a>; SWITCHES],
}

impl<'a> Switches<'a> {
    pub fn new(mut pins: [Input<'a>; SWITCHES]) -> Self {
        for pin in &mut pins {
            pin.set_schmitt(true);
        }
        Switches { pins }
    }

    /// Reads the switch lines into their places in the GPIO bank. Lines outside the switch bank
    /// read as high (released).
    fn read_bank(&self) -> u32 {
        self.pins.iter().enumerate().fold(!0, |bank, (idx, pin)| {
            if pin.is_low() {
                bank & !(1 << (FIRST_SWITCH_GPIO as usize + idx))
            } else {
                bank
            }
        })
    }

    pub fn sample(&self) -> ChordMask {
        ChordMask::from_gpio_bank(self.read_bank())
    }
}

#[embassy_executor::task]
pub async fn run(switches: Switches<'static>) {
    info!("scanner running");
    let mut engine = ChordEngine::new();
    let mut ticker = Ticker::every(POLL_INTERVAL);
    loop {
        if let Some(report) = engine.poll(switches.sample()) {
            RELAY.push(report).await;
        }
        ticker.next().await;
    }
}
