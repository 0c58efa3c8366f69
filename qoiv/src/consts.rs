//! Opcode tag bytes and masks.
//!
//! Tags live in the top bits of an opcode's first byte and form a
//! prefix-free code: the two full-byte tags `0xFE`/`0xFF` are carved out of
//! the `0b11` run space, everything else is decided by the top two bits.

/// Mask selecting the 2-bit tag of a first byte.
pub const QOIV_MASK_TAG: u8 = 0b1100_0000;
/// Mask selecting the 6 payload bits of a first byte.
pub const QOIV_MASK_PAYLOAD: u8 = 0b0011_1111;

/// Tag `0b00`: 6-bit pixel table index.
pub const QOIV_OP_INDEX: u8 = 0b0000_0000;
/// Tag `0b01`: three 2-bit differences from the previous pixel.
pub const QOIV_OP_DIFF: u8 = 0b0100_0000;
/// Tag `0b10`: 2-byte reference key frame predictor.
pub const QOIV_OP_DIFFFRAME: u8 = 0b1000_0000;
/// Tag `0b11`: 6-bit run length, bias -1.
pub const QOIV_OP_RUN: u8 = 0b1100_0000;
/// Full-byte tag: literal RGB pixel.
pub const QOIV_OP_RGB: u8 = 0xFE;
/// Full-byte tag reserved for frame runs; no payload layout is defined.
pub const QOIV_OP_FRAMERUN: u8 = 0xFF;

/// `use_index` bit of a DIFFFRAME first byte.
pub const QOIV_DIFFFRAME_USE_INDEX: u8 = 0b0010_0000;
/// `key_frame` bit of a DIFFFRAME first byte.
pub const QOIV_DIFFFRAME_KEY_FRAME: u8 = 0b0001_0000;

/// Longest run a single RUN opcode can carry. 63 and 64 would collide with
/// the `0xFE`/`0xFF` tags.
pub const QOIV_MAX_RUN: u8 = 62;
