use fugit::{HertzU32, MicrosDurationU32, MillisDurationU32};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Time between emit attempts. Polling is unthrottled.
    pub emit_interval: MicrosDurationU32,
    /// Upper bound on how long a binary frame may wait for the endpoint.
    pub send_timeout: MillisDurationU32,
    /// Append the pressure field to each side of the text line.
    pub report_pressure: bool,
    pub spi_rate: HertzU32,
}

impl Config {
    pub const DEFAULT: Config = Config {
        emit_interval: MicrosDurationU32::micros(10_000),
        send_timeout: MillisDurationU32::millis(10),
        report_pressure: cfg!(feature = "pressure"),
        spi_rate: HertzU32::MHz(1),
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub struct UsbIdentity {
    pub vid: u16,
    pub pid: u16,
    pub manufacturer: &'static str,
    pub product: &'static str,
    pub serial_number: &'static str,
}

// Raw HID + serial identity host tools for the panels already look for.
pub const USB_IDENTITY: UsbIdentity = UsbIdentity {
    vid: 0x16c0,
    pid: 0x0486,
    manufacturer: "DualRTouch",
    product: "Dual Resistive Touch Panels",
    serial_number: "0001",
};
