use core::fmt;

use crate::panel::{Sample, TouchController, CLEAR_ALL_INTERRUPTS};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::spi::{Transfer, Write};
use embedded_hal::digital::v2::OutputPin;

struct RegAddr;

impl RegAddr {
    const CHIP_ID: u8 = 0x00;
    const SYS_CTRL1: u8 = 0x03;
    const SYS_CTRL2: u8 = 0x04;
    const INT_CTRL: u8 = 0x09;
    const INT_EN: u8 = 0x0A;
    const INT_STA: u8 = 0x0B;
    const ADC_CTRL1: u8 = 0x20;
    const ADC_CTRL2: u8 = 0x21;
    const TSC_CTRL: u8 = 0x40;
    const TSC_CFG: u8 = 0x41;
    const FIFO_TH: u8 = 0x4A;
    const FIFO_STA: u8 = 0x4B;
    const TSC_FRACTION_Z: u8 = 0x56;
    const TSC_I_DRIVE: u8 = 0x58;
    const TSC_DATA_XYZ: u8 = 0xD7;

    const AF_READ: u8 = 0x80;
}

struct Bits;

impl Bits {
    const SYS_CTRL1_RESET: u8 = 0x02;
    const TSC_CTRL_EN: u8 = 0x01;
    const TSC_CTRL_XYZ: u8 = 0x00;
    const TSC_CTRL_TOUCHED: u8 = 0x80;
    const INT_EN_TOUCHDET: u8 = 0x01;
    const INT_CTRL_POL_HIGH: u8 = 0x04;
    const INT_CTRL_ENABLE: u8 = 0x01;
    const ADC_CTRL1_10BIT: u8 = 0x00;
    const ADC_CTRL1_96_CLOCKS: u8 = 0x60;
    const ADC_CTRL2_6_5MHZ: u8 = 0x02;
    const TSC_CFG_4SAMPLE: u8 = 0x80;
    const TSC_CFG_DELAY_1MS: u8 = 0x20;
    const TSC_CFG_SETTLE_5MS: u8 = 0x04;
    const FIFO_STA_RESET: u8 = 0x01;
    const FIFO_STA_EMPTY: u8 = 0x20;
    const TSC_I_DRIVE_50MA: u8 = 0x01;
}

pub const CHIP_ID: u16 = 0x0811;
pub const FIFO_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    Spi(E),
    ChipSelect,
    NotFound { id: u16 },
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spi(err) => write!(f, "STMPE610 bus error: {err:?}"),
            Error::ChipSelect => f.write_str("STMPE610 chip select fault"),
            Error::NotFound { id } => write!(f, "STMPE610 not found (id 0x{id:04x})"),
        }
    }
}

pub struct Stmpe610<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS, E> Stmpe610<SPI, CS>
where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin,
{
    pub fn new(spi: SPI, mut cs: CS) -> Self {
        cs.set_high().ok();
        Stmpe610 { spi, cs }
    }

    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    pub fn chip_id(&mut self) -> Result<u16, Error<E>> {
        let hi = self.read_register(RegAddr::CHIP_ID)?;
        let lo = self.read_register(RegAddr::CHIP_ID + 1)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn read_register(&mut self, reg: u8) -> Result<u8, Error<E>> {
        let mut msgo = [RegAddr::AF_READ | reg, 0];
        self.select()?;
        let value = self.spi.transfer(&mut msgo).map(|msgi| msgi[1]);
        self.deselect()?;
        value.map_err(Error::Spi)
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Error<E>> {
        self.select()?;
        let result = self.spi.write(&[reg, value]);
        self.deselect()?;
        result.map_err(Error::Spi)
    }

    fn select(&mut self) -> Result<(), Error<E>> {
        self.cs.set_low().map_err(|_| Error::ChipSelect)
    }

    fn deselect(&mut self) -> Result<(), Error<E>> {
        self.cs.set_high().map_err(|_| Error::ChipSelect)
    }
}

impl<SPI, CS, E> TouchController for Stmpe610<SPI, CS>
where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin,
    E: core::fmt::Debug,
{
    type Error = Error<E>;

    const FIFO_DEPTH: usize = FIFO_DEPTH;

    fn begin<D: DelayMs<u32>>(&mut self, delay: &mut D) -> Result<(), Self::Error> {
        let id = self.chip_id()?;
        if id != CHIP_ID {
            return Err(Error::NotFound { id });
        }

        self.write_register(RegAddr::SYS_CTRL1, Bits::SYS_CTRL1_RESET)?;
        delay.delay_ms(10);

        // clocks on
        self.write_register(RegAddr::SYS_CTRL2, 0x00)?;
        self.write_register(RegAddr::TSC_CTRL, Bits::TSC_CTRL_XYZ | Bits::TSC_CTRL_EN)?;
        self.write_register(RegAddr::INT_EN, Bits::INT_EN_TOUCHDET)?;
        self.write_register(
            RegAddr::ADC_CTRL1,
            Bits::ADC_CTRL1_10BIT | Bits::ADC_CTRL1_96_CLOCKS,
        )?;
        self.write_register(RegAddr::ADC_CTRL2, Bits::ADC_CTRL2_6_5MHZ)?;
        self.write_register(
            RegAddr::TSC_CFG,
            Bits::TSC_CFG_4SAMPLE | Bits::TSC_CFG_DELAY_1MS | Bits::TSC_CFG_SETTLE_5MS,
        )?;
        self.write_register(RegAddr::TSC_FRACTION_Z, 0x06)?;
        self.write_register(RegAddr::FIFO_TH, 1)?;
        self.write_register(RegAddr::FIFO_STA, Bits::FIFO_STA_RESET)?;
        self.write_register(RegAddr::FIFO_STA, 0)?;
        self.write_register(RegAddr::TSC_I_DRIVE, Bits::TSC_I_DRIVE_50MA)?;
        self.write_status(CLEAR_ALL_INTERRUPTS)?;
        self.write_register(
            RegAddr::INT_CTRL,
            Bits::INT_CTRL_POL_HIGH | Bits::INT_CTRL_ENABLE,
        )?;

        Ok(())
    }

    fn touched(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read_register(RegAddr::TSC_CTRL)? & Bits::TSC_CTRL_TOUCHED != 0)
    }

    fn buffer_empty(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read_register(RegAddr::FIFO_STA)? & Bits::FIFO_STA_EMPTY != 0)
    }

    /// Pops one packed 12/12/8-bit sample. Clears interrupts once the queue
    /// runs dry.
    fn read_data(&mut self) -> Result<Sample, Self::Error> {
        let mut data = [0u8; 4];
        for byte in data.iter_mut() {
            *byte = self.read_register(RegAddr::TSC_DATA_XYZ)?;
        }

        let x = (u16::from(data[0]) << 4) | u16::from(data[1] >> 4);
        let y = (u16::from(data[1] & 0x0F) << 8) | u16::from(data[2]);

        if self.buffer_empty()? {
            self.write_status(CLEAR_ALL_INTERRUPTS)?;
        }

        Ok(Sample::new(x, y, data[3]))
    }

    fn write_status(&mut self, value: u8) -> Result<(), Self::Error> {
        self.write_register(RegAddr::INT_STA, value)
    }
}
