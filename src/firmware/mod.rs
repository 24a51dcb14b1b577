mod clock;
mod usb;

use core::cell::RefCell;

use rp_pico as bsp;

use panic_halt as _;

use bsp::{
    entry,
    hal::{clocks::init_clocks_and_plls, pac, sio::Sio, usb::UsbBus, watchdog::Watchdog},
};
use embedded_hal::spi::MODE_0;

use rp2040_hal::{
    gpio::{DynPin, FunctionSpi, Pins},
    spi::Spi,
    Clock as _,
};

use usb_device::{class_prelude::UsbBusAllocator, prelude::*};
use usbd_hid::hid_class::HIDClass;
use usbd_serial::CdcAcmClass;

use dual_rtouch::{
    bus::SharedSpi,
    config::{Config, USB_IDENTITY},
    panel::DualPanels,
    schedule::Scheduler,
    stmpe610::Stmpe610,
};

use usb::UsbLink;

#[entry]
fn main() -> ! {
    usb::init_logger(log::LevelFilter::Warn);

    let config = Config::DEFAULT;

    let mut pac = pac::Peripherals::take().unwrap();
    let core = pac::CorePeripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    let sio = Sio::new(pac.SIO);

    let pins = Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // External high-speed crystal on the pico board is 12Mhz
    let external_xtal_freq_hz = bsp::XOSC_CRYSTAL_FREQ;
    let clocks = init_clocks_and_plls(
        external_xtal_freq_hz,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let mut delay = cortex_m::delay::Delay::new(core.SYST, clocks.system_clock.freq().to_Hz());
    let clock = clock::Clock::new(pac.TIMER, &mut pac.RESETS);

    // USB
    let usb_allocator = UsbBusAllocator::new(UsbBus::new(
        pac.USBCTRL_REGS,
        pac.USBCTRL_DPRAM,
        clocks.usb_clock,
        true,
        &mut pac.RESETS,
    ));

    // Serial and raw HID
    let serial = CdcAcmClass::new(&usb_allocator, 64);
    let hid = HIDClass::new(&usb_allocator, usb::RAW_HID_DESCRIPTOR, 1);
    let bus = UsbDeviceBuilder::new(
        &usb_allocator,
        UsbVidPid(USB_IDENTITY.vid, USB_IDENTITY.pid),
    )
    .composite_with_iads()
    .manufacturer(USB_IDENTITY.manufacturer)
    .product(USB_IDENTITY.product)
    .serial_number(USB_IDENTITY.serial_number)
    .build();

    let mut link = UsbLink::new(bus, serial, hid, clock);

    // SPI, one bus with a chip select per panel
    #[cfg(feature = "pico-spi0")]
    let (spi, front_cs, rear_cs) = {
        let _sclk = pins.gpio18.into_mode::<FunctionSpi>();
        let _mosi = pins.gpio19.into_mode::<FunctionSpi>();
        let _miso = pins.gpio16.into_mode::<FunctionSpi>();
        let front_cs: DynPin = pins.gpio17.into_push_pull_output().into();
        let rear_cs: DynPin = pins.gpio20.into_push_pull_output().into();

        let spi = Spi::<_, _, 8>::new(pac.SPI0).init(
            &mut pac.RESETS,
            clocks.peripheral_clock.freq(),
            config.spi_rate,
            &MODE_0,
        );

        (spi, front_cs, rear_cs)
    };

    #[cfg(feature = "pico-spi1")]
    let (spi, front_cs, rear_cs) = {
        let _sclk = pins.gpio10.into_mode::<FunctionSpi>();
        let _mosi = pins.gpio11.into_mode::<FunctionSpi>();
        let _miso = pins.gpio12.into_mode::<FunctionSpi>();
        let front_cs: DynPin = pins.gpio13.into_push_pull_output().into();
        let rear_cs: DynPin = pins.gpio9.into_push_pull_output().into();

        let spi = Spi::<_, _, 8>::new(pac.SPI1).init(
            &mut pac.RESETS,
            clocks.peripheral_clock.freq(),
            config.spi_rate,
            &MODE_0,
        );

        (spi, front_cs, rear_cs)
    };

    let spi_bus = RefCell::new(spi);
    let front = Stmpe610::new(SharedSpi::new(&spi_bus), front_cs);
    let rear = Stmpe610::new(SharedSpi::new(&spi_bus), rear_cs);

    let mut panels = match DualPanels::new(front, rear, &mut delay) {
        Ok(panels) => panels,
        Err(err) => {
            log::error!("{}", err);
            halt(&mut link);
        }
    };

    let mut scheduler = Scheduler::new(link.now(), config);

    // Run Forever
    loop {
        let now = link.now();
        scheduler.run_once(&mut panels, &mut link, now);
        link.service();
    }
}

/// Fail-stop: never touch the panels again, but keep USB alive so the
/// diagnostic line reaches the host.
fn halt<B: usb_device::bus::UsbBus>(link: &mut UsbLink<'_, B>) -> ! {
    loop {
        link.service();
    }
}
