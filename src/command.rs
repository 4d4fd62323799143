//! Serial framing and instruction encodings for the ST7920.
//!
//! In serial mode every transfer starts with a synchronization byte carrying
//! the RS and RW flags, followed by each payload byte split into two bytes with
//! the nibble in the upper four bits.

/// Longest payload sent in one frame: a full row burst of 8 word-cells.
pub const MAX_PAYLOAD: usize = 16;
const FRAME_CAPACITY: usize = 1 + 2 * MAX_PAYLOAD;

const SYNC: u8 = 0b1111_1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterSelect {
    Instruction = 0,
    Data = 1,
}

/// RW flag of the sync byte. The driver only ever writes; `Read` is the
/// protocol's busy-flag/data read, kept so every sync byte can be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadWrite {
    Write = 0,
    Read = 1,
}

/// An encoded transfer, ready to be written to the bus in one call.
#[derive(Debug, Clone)]
pub struct Frame {
    bytes: [u8; FRAME_CAPACITY],
    len: usize,
}

impl Frame {
    /// Frames `data` for the wire. Returns `None` if `data` is longer than
    /// [`MAX_PAYLOAD`].
    pub fn encode(rs: RegisterSelect, rw: ReadWrite, data: &[u8]) -> Option<Self> {
        if data.len() > MAX_PAYLOAD {
            return None;
        }

        let mut bytes = [0u8; FRAME_CAPACITY];
        bytes[0] = sync_byte(rs, rw);

        for (pair, b) in bytes[1..].chunks_exact_mut(2).zip(data) {
            pair[0] = b & 0xF0;
            pair[1] = (b & 0x0F) << 4;
        }

        Some(Self {
            bytes,
            len: 1 + 2 * data.len(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

pub const fn sync_byte(rs: RegisterSelect, rw: ReadWrite) -> u8 {
    SYNC | ((rw as u8 & 0x01) << 2) | ((rs as u8 & 0x01) << 1)
}

/// Function set. Graphics mode only exists in the extended instruction set,
/// so `graphics` is ignored unless `extended` is set.
pub const fn function_set(extended: bool, graphics: bool) -> u8 {
    let mut v = 0b0011_0000;
    if extended {
        v |= 0b0000_0100;
        if graphics {
            v |= 0b0000_0010;
        }
    }
    v
}

pub const fn display_control(display_on: bool, cursor_on: bool, blink_on: bool) -> u8 {
    let mut v = 0b0000_1000;
    if display_on {
        v |= 0b0000_0100;
    }
    if cursor_on {
        v |= 0b0000_0010;
    }
    if blink_on {
        v |= 0b0000_0001;
    }
    v
}

pub const fn shift_control(shift: bool, right: bool) -> u8 {
    let mut v = 0b0001_0000;
    if shift {
        v |= 0b0000_1000;
    }
    if right {
        v |= 0b0000_0100;
    }
    v
}

pub const fn entry_mode(increase: bool, shift: bool) -> u8 {
    let mut v = 0b0000_0100;
    if increase {
        v |= 0b0000_0010;
    }
    if shift {
        v |= 0b0000_0001;
    }
    v
}

/// GRAM address set, sent as a single two-byte instruction.
pub const fn gram_address(row: u8, column: u8) -> [u8; 2] {
    [0x80 | (row & 0x3F), 0x80 | (column & 0x0F)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_frame_splits_nibbles() {
        let f = Frame::encode(RegisterSelect::Data, ReadWrite::Write, &[0xAB]).unwrap();
        assert_eq!(f.as_bytes(), &[0xFA, 0xA0, 0xB0]);
    }

    #[test]
    fn sync_byte_flags() {
        assert_eq!(sync_byte(RegisterSelect::Instruction, ReadWrite::Write), 0xF8);
        assert_eq!(sync_byte(RegisterSelect::Data, ReadWrite::Write), 0xFA);
        assert_eq!(sync_byte(RegisterSelect::Instruction, ReadWrite::Read), 0xFC);
        assert_eq!(sync_byte(RegisterSelect::Data, ReadWrite::Read), 0xFE);
    }

    #[test]
    fn empty_payload_is_sync_only() {
        let f = Frame::encode(RegisterSelect::Instruction, ReadWrite::Write, &[]).unwrap();
        assert_eq!(f.as_bytes(), &[0xF8]);
    }

    #[test]
    fn full_row_burst_fits() {
        let data = [0x12u8; MAX_PAYLOAD];
        let f = Frame::encode(RegisterSelect::Data, ReadWrite::Write, &data).unwrap();
        assert_eq!(f.as_bytes().len(), 33);
        assert!(f.as_bytes()[1..].chunks(2).all(|p| p == [0x10, 0x20]));

        let long = [0u8; MAX_PAYLOAD + 1];
        assert!(Frame::encode(RegisterSelect::Data, ReadWrite::Write, &long).is_none());
    }

    #[test]
    fn instruction_encodings() {
        assert_eq!(function_set(false, false), 0x30);
        assert_eq!(function_set(false, true), 0x30);
        assert_eq!(function_set(true, false), 0x34);
        assert_eq!(function_set(true, true), 0x36);

        assert_eq!(display_control(false, false, false), 0x08);
        assert_eq!(display_control(true, false, false), 0x0C);
        assert_eq!(display_control(true, true, true), 0x0F);

        assert_eq!(shift_control(false, false), 0x10);
        assert_eq!(shift_control(true, true), 0x1C);

        assert_eq!(entry_mode(false, false), 0x04);
        assert_eq!(entry_mode(true, false), 0x06);
        assert_eq!(entry_mode(true, true), 0x07);
    }

    #[test]
    fn gram_address_masks() {
        assert_eq!(gram_address(31, 8), [0x9F, 0x88]);
        assert_eq!(gram_address(0xFF, 0xFF), [0xBF, 0x8F]);
    }
}
