//! Implements the USB HID keyboard device and the reporting task, which collects
//! [crate::report::PackedReport]s from [crate::RELAY] and turns them into key-down/key-up reports.
//! Mostly lifted from [embassy_usb] examples.

use crate::report::KeyReporter;
use crate::status::Link;
use crate::transport::OutputQueue;
use crate::{RELAY, STATUS};

use embassy_futures::join::join;
use embassy_futures::select::{select, Either};
use embassy_rp::{
    bind_interrupts,
    peripherals::USB,
    usb::{Driver, InterruptHandler},
};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Ticker};
use embassy_usb::{
    class::hid::{HidReaderWriter, ReportId, RequestHandler, State as HidState},
    control::OutResponse,
    Builder, Handler, UsbDevice,
};
use usbd_hid::descriptor::{KeyboardReport, SerializedDescriptor};

use static_cell::StaticCell;

type MyDriver = Driver<'static, USB>;
type MyUsbDevice = UsbDevice<'static, MyDriver>;
type MyHidReaderWriter = HidReaderWriter<'static, MyDriver, 1, 8>;

/// How often the reporting task sends a report, when it has one
pub const REPORT_INTERVAL: Duration = Duration::from_millis(10);

/// Caps Lock bit of the LED output report
const LED_CAPS_LOCK: u8 = 0x02;

/// Raised by the reporting loop when a key is waiting while the bus is suspended
static REMOTE_WAKEUP: Signal<CriticalSectionRawMutex, ()> = Signal::new();

bind_interrupts!(pub(crate) struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

pub fn get_device(driver: MyDriver) -> (MyUsbDevice, MyHidReaderWriter) {
    let mut config = embassy_usb::Config::new(0xfeed, 0x3062);
    config.manufacturer = Some("Chordwright");
    config.product = Some("Eight Switch Chord Keyboard");
    config.serial_number = Some("001");
    config.max_power = 100;
    config.max_packet_size_0 = 64;
    config.supports_remote_wakeup = true;

    static DEVICE_HANDLER: StaticCell<MyDeviceHandler> = StaticCell::new();

    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    let mut builder = Builder::new(
        driver,
        config,
        &mut CONFIG_DESC.init([0; 256])[..],
        &mut BOS_DESC.init([0; 256])[..],
        &mut [], // no msos descriptors
        &mut CONTROL_BUF.init([0; 64])[..],
    );

    static STATE: StaticCell<HidState> = StaticCell::new();

    builder.handler(DEVICE_HANDLER.init(MyDeviceHandler::new()));

    let config = embassy_usb::class::hid::Config {
        report_descriptor: KeyboardReport::desc(),
        request_handler: None,
        poll_ms: 10,
        max_packet_size: 8,
    };
    let hid = HidReaderWriter::<_, 1, 8>::new(&mut builder, STATE.init(HidState::new()), config);

    (builder.build(), hid)
}

#[embassy_executor::task]
pub async fn run(mut usb: MyUsbDevice, hid: MyHidReaderWriter) {
    let usb_fut = async {
        loop {
            usb.run_until_suspend().await;
            match select(usb.wait_resume(), REMOTE_WAKEUP.wait()).await {
                Either::First(()) => REMOTE_WAKEUP.reset(),
                Either::Second(()) => {
                    info!("waking the host");
                    if let Err(e) = usb.remote_wakeup().await {
                        warn!("remote wakeup failed: {}", e);
                    }
                }
            }
        }
    };

    let (reader, mut writer) = hid.split();

    // Empties the relay as soon as the scanner fills it, and sends at most one report per tick.
    // Nothing is written while suspended, since the host won't poll until it resumes.
    let in_fut = async {
        let mut queue = OutputQueue::new();
        let mut reporter = KeyReporter::new();
        let mut ticker = Ticker::every(REPORT_INTERVAL);
        loop {
            match select(RELAY.pop(), ticker.next()).await {
                Either::First(report) => {
                    queue.push(report);
                }
                Either::Second(()) => {
                    if STATUS.link() == Link::Suspended {
                        if queue.has_waiting(&RELAY) {
                            REMOTE_WAKEUP.signal(());
                        }
                        continue;
                    }
                    queue.drain_from(&RELAY);
                    if let Some(report) = reporter.next_report(&mut queue) {
                        if let Err(e) = writer.write_serialize(&report).await {
                            warn!("failed to send report: {}", e);
                        }
                    }
                }
            }
        }
    };

    let out_fut = async {
        static REQUEST_HANDLER: StaticCell<MyRequestHandler> = StaticCell::new();
        reader.run(false, REQUEST_HANDLER.init(MyRequestHandler {})).await;
    };

    join(usb_fut, join(in_fut, out_fut)).await;
}

struct MyRequestHandler;

impl RequestHandler for MyRequestHandler {
    fn get_report(&mut self, _id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        None
    }

    /// The host's keyboard LED state arrives here; only Caps Lock is shown.
    fn set_report(&mut self, _id: ReportId, data: &[u8]) -> OutResponse {
        if let Some(leds) = data.first() {
            STATUS.set_host_caps_lock(leds & LED_CAPS_LOCK != 0);
        }
        OutResponse::Accepted
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, _dur: u32) {}

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        None
    }
}

struct MyDeviceHandler {
    configured: bool,
}

impl MyDeviceHandler {
    fn new() -> Self {
        MyDeviceHandler { configured: false }
    }
}

impl Handler for MyDeviceHandler {
    fn enabled(&mut self, _enabled: bool) {
        self.configured = false;
        STATUS.set_link(Link::NotMounted);
    }

    fn reset(&mut self) {
        self.configured = false;
        STATUS.set_link(Link::NotMounted);
    }

    fn addressed(&mut self, _addr: u8) {
        self.configured = false;
    }

    fn configured(&mut self, configured: bool) {
        self.configured = configured;
        STATUS.set_link(if configured { Link::Mounted } else { Link::NotMounted });
    }

    fn remote_wakeup_enabled(&mut self, enabled: bool) {
        debug!("remote wakeup enabled: {}", enabled);
    }

    fn suspended(&mut self, suspended: bool) {
        if suspended {
            STATUS.set_link(Link::Suspended);
        } else if self.configured {
            STATUS.set_link(Link::Mounted);
        } else {
            STATUS.set_link(Link::NotMounted);
        }
    }
}
