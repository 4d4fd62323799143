//! Packed 1-bpp artwork for the status screen, MSB-first, 8 pixels wide.

/// Fermenter icon, 8x12.
pub const LOGO: [u8; 12] = [
    0b00010100, 0b00111111, 0b00111111, 0b00111011, 0b00100011, 0b11100001, 0b10100001,
    0b10100001, 0b10100001, 0b11100001, 0b00100001, 0b00111111,
];

/// Right-pointing selection marker, 8x9.
pub const ARROW: [u8; 9] = [
    0b11000000, 0b01100000, 0b00110000, 0b00011000, 0b00001100, 0b00011000, 0b00110000,
    0b01100000, 0b11000000,
];

pub const BITMAP_WIDTH: u8 = 8;
