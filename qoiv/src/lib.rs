//! QOIV reference implementation.
//!
//! QOIV ("Quite OK Image Video") is a lossless RGB video codec: the QOI
//! still-image scheme extended with keyframes, predicted frames, and a
//! reference-frame predictor opcode. It targets video with large flat
//! regions and strong inter-frame similarity (screencasts, UI captures,
//! synthetic animations).
//!
//! # Format
//!
//! ## File header
//!
//! - 4-byte magic: `qoiv`
//! - u32le width
//! - u32le height
//! - u8 colourspace: 0 = sRGB, 1 = linear
//! - 3 zero padding bytes, aligning the header to 16 bytes
//!
//! The header is followed by frame records until end of file. There is no
//! trailer.
//!
//! ## Frame record
//!
//! - u8 frame type: 0 = key frame, 1 = predicted frame
//! - opcode stream; a frame ends once `width * height` pixels have been
//!   produced. There is no end marker.
//!
//! Key frames reference nothing. Predicted frames may additionally predict
//! from the most recent key frame and from the snapshot of the pixel table
//! taken at the end of that key frame's encoding. The pixel table itself is
//! cleared at the start of every frame.
//!
//! ## Opcode stream
//!
//! ```plain
//! .- QOIV_OP_INDEX ---------.
//! |         Byte[0]         |
//! |  7  6  5  4  3  2  1  0 |
//! |-------+-----------------|
//! |  0  0 |     index       |
//! `-------------------------`
//! ```
//!
//! - 2-bit tag b00
//! - 6-bit index into the pixel table: 0..63
//!
//!
//! ```plain
//! .- QOIV_OP_DIFF ----------.
//! |         Byte[0]         |
//! |  7  6  5  4  3  2  1  0 |
//! |-------+-----+-----+-----|
//! |  0  1 |  dr |  dg |  db |
//! `-------------------------`
//! ```
//!
//! - 2-bit tag b01
//! - 2-bit   red channel difference from the previous pixel between -2..1
//! - 2-bit green channel difference from the previous pixel between -2..1
//! - 2-bit  blue channel difference from the previous pixel between -2..1
//!
//! Differences are stored with a bias of +2 and wrap around in 8-bit
//! unsigned space.
//!
//!
//! ```plain
//! .- QOIV_OP_DIFFFRAME -------------------------------.
//! |         Byte[0]         |         Byte[1]         |
//! |  7  6  5  4  3  2  1  0 |  7  6  5  4  3  2  1  0 |
//! |-------+----+----+---+---+-------+-----------------|
//! |  1  0 | ui | kf | dr| dg|   db  |      index      |
//! `---------------------------------------------------`
//! ```
//!
//! - 2-bit tag b10
//! - 1-bit `use_index`: 1 = the base pixel is the reference key frame's
//!   table snapshot at `index`; 0 = the base pixel is the reference key
//!   frame at the current output position (`index` is written as 0)
//! - 1-bit `key_frame`: must be 1 (0 is reserved for prediction from the
//!   immediately previous frame)
//! - three 2-bit channel differences from the base pixel, bias +2, same
//!   range and wrap-around as `QOIV_OP_DIFF`
//! - 6-bit index into the snapshot table: 0..63
//!
//!
//! ```plain
//! .- QOIV_OP_RUN -----------.
//! |         Byte[0]         |
//! |  7  6  5  4  3  2  1  0 |
//! |-------+-----------------|
//! |  1  1 |       run       |
//! `-------------------------`
//! ```
//!
//! - 2-bit tag b11
//! - 6-bit run-length repeating the previous pixel: 1..62
//! - The run-length is stored with a bias of -1. The run-lengths 63 and 64
//!   (b111110 and b111111) are illegal as they are occupied by the
//!   QOIV_OP_RGB and QOIV_OP_FRAMERUN tags.
//!
//!
//! ```plain
//! .- QOIV_OP_RGB ---------------------------------.
//! |         Byte[0]         | B[1]  | B[2]  | B[3] |
//! |  7  6  5  4  3  2  1  0 | 7..0  | 7..0  | 7..0 |
//! |-------------------------+-------+-------+------|
//! |  1  1  1  1  1  1  1  0 | red   | green | blue |
//! `------------------------------------------------`
//! ```
//!
//! - 8-bit tag b11111110
//! - 8-bit red, green, and blue channel values
//!
//!
//! ```plain
//! .- QOIV_OP_FRAMERUN (reserved) ---------------------.
//! |         Byte[0]         |         Byte[1]         |
//! |  7  6  5  4  3  2  1  0 |  7  6  5  4  3  2  1  0 |
//! |-------------------------+-------------------------|
//! |  1  1  1  1  1  1  1  1 |        reserved         |
//! `---------------------------------------------------`
//! ```
//!
//! Reserved for runs of frames identical to the prior frame. The tag is
//! fixed; the payload layout is not, so decoders currently reject the tag
//! as an invalid opcode.

pub mod consts;
pub mod decode;
pub mod encode;
pub mod frame;
pub mod header;
pub mod opcodes;
pub mod pixels;
pub mod utils;

use snafu::Snafu;

/// Everything that can go wrong while encoding or decoding a QOIV stream.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// The 16-byte file header is malformed.
    #[snafu(display("Invalid file header: {reason}"))]
    InvalidHeader { reason: &'static str },

    /// A frame record starts with an unknown frame type byte, or a predicted
    /// frame appears before any key frame.
    #[snafu(display("Invalid frame type: {value:#04x}"))]
    InvalidFrameType { value: u8 },

    /// An opcode tag byte has no defined layout at this position in the
    /// stream.
    #[snafu(display("Invalid opcode: {byte:#04x}"))]
    InvalidOpcode { byte: u8 },

    /// An opcode field violates its wire-format bounds. Caught at opcode
    /// construction, before anything is written.
    #[snafu(display("Opcode field out of range: {field} = {value}"))]
    OpcodeOutOfRange { field: &'static str, value: i32 },

    /// The stream ended in the middle of an opcode or a frame.
    #[snafu(display("Unexpected end of stream"))]
    UnexpectedEof,

    /// An opcode would produce pixels beyond the end of the frame.
    #[snafu(display(
        "Run of {run} at pixel {position} overflows a frame of {pixel_count} pixels"
    ))]
    Overflow {
        position: usize,
        run: usize,
        pixel_count: usize,
    },

    /// A pixel buffer does not match the declared frame dimensions.
    #[snafu(display(
        "Invalid dimensions: a {width}x{height} frame holds {} bytes, but {byte_count} bytes were given",
        width * height * 3
    ))]
    InvalidDimensions {
        width: u32,
        height: u32,
        byte_count: usize,
    },

    /// Failure of the underlying byte stream.
    #[snafu(display("I/O error: {source}"))]
    Io { source: std::io::Error },
}
