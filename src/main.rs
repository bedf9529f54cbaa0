//! Firmware for an eight-switch chord keyboard based on the Raspberry Pi Pico, using the
//! [embassy_rp] framework.
//!
//! Core 1 scans the switches and decodes chords; core 0 runs the USB device. The two only meet at
//! [RELAY].

#![no_main]
#![no_std]

#[macro_use]
mod fmt;

mod chord;
mod compose;
mod decode;
mod engine;
mod keycode;
mod keymap;
mod report;
mod scan;
mod status;
mod transport;
mod usb;

use embassy_executor::Executor;
use embassy_rp::{
    gpio::{Input, Level, Output, Pull},
    multicore::{spawn_core1, Stack},
};
use embassy_time::Timer;
use static_cell::StaticCell;

#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_reset as _;

macro_rules! switch_pins {
    ($dev:ident; $($pin:ident),*) => {[ $(Input::new($dev.$pin, Pull::Up)),* ]}
}

/// Single-slot handoff from [scan] on core 1 to [usb] on core 0.
pub(crate) static RELAY: transport::Relay<RawMutex> = transport::Relay::new();
/// USB link state for the status LED.
pub(crate) static STATUS: status::Status = status::Status::new();
type RawMutex = embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

static mut CORE1_STACK: Stack<4096> = Stack::new();
static EXECUTOR0: StaticCell<Executor> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

#[cortex_m_rt::entry]
fn main() -> ! {
    let p = embassy_rp::init(Default::default());
    info!("starting");

    let status_led = Output::new(p.PIN_25, Level::Low);

    // GPIO 0 and 1 are left for the UART
    let switches = scan::Switches::new(switch_pins!(p;
        PIN_2, PIN_3, PIN_4, PIN_5, PIN_6, PIN_7, PIN_8, PIN_9
    ));

    spawn_core1(
        p.CORE1,
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        move || {
            let executor1 = EXECUTOR1.init(Executor::new());
            executor1.run(|spawner| spawner.spawn(scan::run(switches)).expect("spawn scanner"));
        },
    );

    let usb_driver = embassy_rp::usb::Driver::new(p.USB, usb::Irqs);
    let (usb_device, hid) = usb::get_device(usb_driver);

    let executor0 = EXECUTOR0.init(Executor::new());
    executor0.run(|spawner| {
        spawner.spawn(usb::run(usb_device, hid)).expect("spawn usb");
        spawner.spawn(blink_status(status_led)).expect("spawn status");
    })
}

#[embassy_executor::task]
async fn blink_status(mut led: Output<'static>) {
    let mut phase = 0;
    loop {
        match STATUS.indication() {
            status::Indication::Solid => {
                phase = 0;
                led.set_high();
                Timer::after_millis(100).await;
            }
            status::Indication::Blink(pattern) => {
                phase %= pattern.len();
                led.set_level(status::led_on_in_phase(phase).into());
                Timer::after_millis(pattern[phase].into()).await;
                phase += 1;
            }
        }
    }
}
