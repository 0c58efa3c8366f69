//! The 16-byte file preamble and the 1-byte per-frame header.

use crate::{utils::read_error, Error, InvalidFrameTypeSnafu, InvalidHeaderSnafu, IoSnafu};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use snafu::{ensure, ResultExt};
use std::io::{Read, Write};

pub(crate) const MAGIC: [u8; 4] = *b"qoiv";
pub(crate) const HEADER_SIZE: usize = 16;

/// Colour space declared in the file header. Metadata only; it does not
/// affect coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColourSpace {
    Srgb = 0,
    Linear = 1,
}

/// Frame record types. Key frames reference nothing; predicted frames may
/// predict from the most recent key frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    Key = 0,
    Predicted = 1,
}

impl TryFrom<u8> for FrameType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(FrameType::Key),
            1 => Ok(FrameType::Predicted),
            _ => InvalidFrameTypeSnafu { value }.fail(),
        }
    }
}

/// The file header: magic, fixed stream dimensions, colour space, and three
/// zero padding bytes aligning the whole structure to 16 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QovHeader {
    pub width: u32,
    pub height: u32,
    pub colourspace: ColourSpace,
}

impl QovHeader {
    /// Reads and validates a file header.
    pub fn read<R: Read>(r: &mut R) -> Result<Self, Error> {
        let mut buf = [0u8; HEADER_SIZE];
        r.read_exact(&mut buf).map_err(|source| {
            if source.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::InvalidHeader {
                    reason: "wrong header size",
                }
            } else {
                Error::Io { source }
            }
        })?;

        ensure!(
            buf[0..4] == MAGIC,
            InvalidHeaderSnafu {
                reason: "magic mismatch",
            }
        );

        let width = LittleEndian::read_u32(&buf[4..8]);
        let height = LittleEndian::read_u32(&buf[8..12]);
        let colourspace = match buf[12] {
            0 => ColourSpace::Srgb,
            1 => ColourSpace::Linear,
            _ => {
                return InvalidHeaderSnafu {
                    reason: "bad colourspace value",
                }
                .fail()
            }
        };

        Ok(Self {
            width,
            height,
            colourspace,
        })
    }

    /// Writes the 16-byte header.
    pub fn write<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        w.write_all(&MAGIC).context(IoSnafu)?;
        w.write_u32::<LittleEndian>(self.width).context(IoSnafu)?;
        w.write_u32::<LittleEndian>(self.height).context(IoSnafu)?;
        w.write_u8(self.colourspace as u8).context(IoSnafu)?;
        w.write_all(&[0; 3]).context(IoSnafu)
    }
}

/// The one-byte header preceding each frame's opcode stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QovFrameHeader {
    pub frame_type: FrameType,
}

impl QovFrameHeader {
    pub fn read<R: Read>(r: &mut R) -> Result<Self, Error> {
        let mut byte = [0u8; 1];
        r.read_exact(&mut byte).map_err(read_error)?;
        Ok(Self {
            frame_type: FrameType::try_from(byte[0])?,
        })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        w.write_u8(self.frame_type as u8).context(IoSnafu)
    }
}
