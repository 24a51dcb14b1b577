//! One SPI peripheral shared by both touch controllers.
//!
//! Each controller owns its own chip select, so a `SharedSpi` only has to hand
//! out the bus for the duration of a single transfer. Everything runs on one
//! thread, so a `RefCell` is enough.

use core::cell::RefCell;

use embedded_hal::blocking::spi::{Transfer, Write};

pub struct SharedSpi<'a, SPI> {
    bus: &'a RefCell<SPI>,
}

impl<'a, SPI> SharedSpi<'a, SPI> {
    pub fn new(bus: &'a RefCell<SPI>) -> Self {
        SharedSpi { bus }
    }
}

impl<'a, SPI> Transfer<u8> for SharedSpi<'a, SPI>
where
    SPI: Transfer<u8>,
{
    type Error = SPI::Error;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Self::Error> {
        let mut bus = self.bus.borrow_mut();
        bus.transfer(words)
    }
}

impl<'a, SPI> Write<u8> for SharedSpi<'a, SPI>
where
    SPI: Write<u8>,
{
    type Error = SPI::Error;

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.bus.borrow_mut().write(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<u8>,
    }

    impl Transfer<u8> for Recorder {
        type Error = Infallible;

        fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Infallible> {
            self.sent.extend_from_slice(words);
            for word in words.iter_mut() {
                *word = !*word;
            }
            Ok(words)
        }
    }

    impl Write<u8> for Recorder {
        type Error = Infallible;

        fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
            self.sent.extend_from_slice(words);
            Ok(())
        }
    }

    #[test]
    fn devices_interleave_on_one_bus() {
        let bus = RefCell::new(Recorder::default());
        let mut front = SharedSpi::new(&bus);
        let mut rear = SharedSpi::new(&bus);

        front.write(&[0x01, 0x02]).ok();
        let mut buf = [0x0F];
        assert_eq!(rear.transfer(&mut buf).ok(), Some(&[0xF0][..]));
        front.write(&[0x03]).ok();

        assert_eq!(bus.borrow().sent, [0x01, 0x02, 0x0F, 0x03]);
    }
}
