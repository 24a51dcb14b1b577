use core::cell::RefCell;
use core::fmt::Write as _;
use core::task::Poll;

use cortex_m::interrupt::{free, Mutex};
use dual_rtouch::{
    link::{self, HostLink},
    report::Frame,
    schedule::Instant,
};
use fugit::MillisDurationU32;
use heapless::{Deque, String};
use usb_device::{class_prelude::UsbBus, device::UsbDevice, UsbError};
use usbd_hid::hid_class::HIDClass;
use usbd_serial::CdcAcmClass;

use super::clock::Clock;

pub const MAX_PACKET: usize = 64;
pub const TX_CAPACITY: usize = 512;

/// Text waiting for the CDC endpoint. Shared by coordinate lines and the logger.
pub static USB_TX_BUFFER: Mutex<RefCell<Deque<u8, TX_CAPACITY>>> =
    Mutex::new(RefCell::new(Deque::new()));

/// Vendor-defined page 0xFFAB, usage 0x0200: 64-byte in and out reports.
#[rustfmt::skip]
pub const RAW_HID_DESCRIPTOR: &[u8] = &[
    0x06, 0xAB, 0xFF,   // Usage Page (Vendor 0xFFAB)
    0x0A, 0x00, 0x02,   // Usage (0x0200)
    0xA1, 0x01,         // Collection (Application)
    0x75, 0x08,         //   Report Size (8)
    0x15, 0x00,         //   Logical Minimum (0)
    0x26, 0xFF, 0x00,   //   Logical Maximum (255)
    0x95, 0x40,         //   Report Count (64)
    0x09, 0x01,         //   Usage (0x01)
    0x81, 0x02,         //   Input (Data, Var, Abs)
    0x95, 0x40,         //   Report Count (64)
    0x09, 0x02,         //   Usage (0x02)
    0x91, 0x02,         //   Output (Data, Var, Abs)
    0xC0,               // End Collection
];

pub type LinkError = link::LinkError<UsbError>;

pub fn queue_text(bytes: &[u8]) -> Result<(), LinkError> {
    free(|cs| {
        let mut txbuf = USB_TX_BUFFER.borrow(cs).borrow_mut();
        link::queue_whole(&mut *txbuf, bytes)
    })
}

pub struct UsbLink<'a, B: UsbBus> {
    device: UsbDevice<'a, B>,
    serial: CdcAcmClass<'a, B>,
    hid: HIDClass<'a, B>,
    clock: Clock,
}

impl<'a, B: UsbBus> UsbLink<'a, B> {
    pub fn new(
        device: UsbDevice<'a, B>,
        serial: CdcAcmClass<'a, B>,
        hid: HIDClass<'a, B>,
        clock: Clock,
    ) -> Self {
        UsbLink {
            device,
            serial,
            hid,
            clock,
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    fn poll(&mut self) -> bool {
        self.device.poll(&mut [&mut self.serial, &mut self.hid])
    }

    /// Keeps the device enumerated and moves queued text onto the wire.
    pub fn service(&mut self) {
        self.poll();
        self.write_packets();
        self.poll();
    }

    fn write_packets(&mut self) {
        let serial = &mut self.serial;
        free(|cs| {
            let mut txbuf = USB_TX_BUFFER.borrow(cs).borrow_mut();
            while !txbuf.is_empty() {
                let (head, _) = txbuf.as_slices();
                let len = head.len().min(MAX_PACKET);
                let written = match serial.write_packet(&head[..len]) {
                    Ok(written) => written,
                    Err(_) => break,
                };
                for _ in 0..written {
                    txbuf.pop_front();
                }
            }
        });
    }
}

impl<'a, B: UsbBus> HostLink for UsbLink<'a, B> {
    type Error = LinkError;

    fn send_frame(&mut self, frame: &Frame, timeout: MillisDurationU32) -> Result<(), LinkError> {
        let UsbLink {
            device,
            serial,
            hid,
            clock,
        } = self;
        link::send_within(
            timeout,
            || clock.now(),
            || match hid.push_raw_input(frame) {
                Ok(_) => Poll::Ready(Ok(())),
                Err(UsbError::WouldBlock) => {
                    device.poll(&mut [&mut *serial, &mut *hid]);
                    Poll::Pending
                }
                Err(err) => Poll::Ready(Err(err)),
            },
        )
    }

    fn send_line(&mut self, line: &str) -> Result<(), LinkError> {
        queue_text(line.as_bytes())
    }
}

pub struct SerialLogger;

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut line: String<128> = String::new();
        // overlong records are cut, but always end the line
        write!(line, "{}", record.args()).ok();
        if line.push('\n').is_err() {
            line.pop();
            line.push('\n').ok();
        }
        queue_text(line.as_bytes()).ok();
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger;

pub fn init_logger(level: log::LevelFilter) {
    // thumbv6m has no compare-and-swap; this runs before anything can log.
    unsafe {
        log::set_logger_racy(&LOGGER).ok();
        log::set_max_level_racy(level);
    }
}
