//! Wire encodings of one emit: the 64-byte binary frame and the text line.
//!
//! Frame layout, big-endian, untouched sides zeroed:
//!
//! | bytes  | content                                   |
//! |--------|-------------------------------------------|
//! | 0..5   | front x hi, x lo, y hi, y lo, pressure    |
//! | 5..10  | rear, same layout                         |
//! | 10..64 | zero                                      |

use core::fmt::{self, Write};

use heapless::String;

use crate::panel::{DualPanels, Sample, Side, TouchController};

pub const FRAME_LEN: usize = 64;
pub const SIDE_LEN: usize = 5;

pub type Frame = [u8; FRAME_LEN];

// "65535 65535 255 " twice plus the newline is 33 bytes.
pub const LINE_CAPACITY: usize = 40;

pub type Line = String<LINE_CAPACITY>;

/// Both sides as the host sees them at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    sides: [Sample; 2],
}

impl Report {
    pub fn capture<C: TouchController>(panels: &DualPanels<C>) -> Self {
        Report {
            sides: Side::ALL.map(|side| panels.reported(side)),
        }
    }

    pub const fn new(front: Sample, rear: Sample) -> Self {
        Report {
            sides: [front, rear],
        }
    }

    pub fn side(&self, side: Side) -> Sample {
        self.sides[side.index()]
    }

    pub fn to_frame(&self) -> Frame {
        let mut frame = [0; FRAME_LEN];
        for (chunk, sample) in frame.chunks_exact_mut(SIDE_LEN).zip(&self.sides) {
            chunk[0..2].copy_from_slice(&sample.x.to_be_bytes());
            chunk[2..4].copy_from_slice(&sample.y.to_be_bytes());
            chunk[4] = sample.pressure;
        }
        frame
    }

    /// `x y [z ]` per side, front first, then a newline. The trailing space
    /// before the newline is part of the format.
    pub fn write_line<W: Write>(&self, out: &mut W, with_pressure: bool) -> fmt::Result {
        for sample in &self.sides {
            write!(out, "{} {} ", sample.x, sample.y)?;
            if with_pressure {
                write!(out, "{} ", sample.pressure)?;
            }
        }
        out.write_char('\n')
    }

    pub fn to_line(&self, with_pressure: bool) -> Line {
        let mut line = Line::new();
        // Cannot overflow, see LINE_CAPACITY.
        self.write_line(&mut line, with_pressure).ok();
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_carries_front_then_rear_big_endian() {
        let report = Report::new(Sample::new(0x1234, 0x5678, 0x9a), Sample::new(0xbcde, 0x0f01, 0x23));
        let frame = report.to_frame();
        assert_eq!(
            frame[..10],
            [0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0x0f, 0x01, 0x23]
        );
        assert!(frame[10..].iter().all(|&b| b == 0));
    }

    #[test]
    fn front_only_touch_frame() {
        let report = Report::new(Sample::new(100, 200, 50), Sample::ZERO);
        let frame = report.to_frame();
        assert_eq!(frame[0..5], [0x00, 0x64, 0x00, 0xC8, 0x32]);
        assert_eq!(frame[5..10], [0; 5]);
    }

    #[test]
    fn line_with_pressure_has_three_fields_per_side() {
        let report = Report::new(Sample::new(100, 200, 50), Sample::ZERO);
        assert_eq!(report.to_line(true).as_str(), "100 200 50 0 0 0 \n");
    }

    #[test]
    fn line_without_pressure_has_two_fields_per_side() {
        let report = Report::new(Sample::new(100, 200, 50), Sample::new(1, 2, 3));
        let line = report.to_line(false);
        assert_eq!(line.as_str(), "100 200 1 2 \n");
        assert_eq!(line.split_whitespace().count(), 4);
    }

    #[test]
    fn widest_line_fits() {
        let max = Sample::new(u16::MAX, u16::MAX, u8::MAX);
        let line = Report::new(max, max).to_line(true);
        assert_eq!(line.as_str(), "65535 65535 255 65535 65535 255 \n");
    }
}
