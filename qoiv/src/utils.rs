//! Pixel arithmetic shared by the encoder and decoder.

use crate::{pixels::Pixel, Error, UnexpectedEofSnafu};

/// Computes the pixel table slot of a pixel: `(3r + 5g + 7b) mod 64`.
///
/// The products are summed in 16-bit space before the reduction. The
/// function is part of the wire format and must not change.
#[inline]
pub const fn hash(pixel: Pixel) -> u8 {
    let [r, g, b] = pixel;
    ((r as u16 * 3 + g as u16 * 5 + b as u16 * 7) % 64) as u8
}

/// Computes the wrapping per-channel difference between two pixels,
/// reinterpreted as signed 8-bit values.
#[inline]
pub(crate) const fn diff(pixel: Pixel, prev: Pixel) -> [i8; 3] {
    [
        pixel[0].wrapping_sub(prev[0]) as i8,
        pixel[1].wrapping_sub(prev[1]) as i8,
        pixel[2].wrapping_sub(prev[2]) as i8,
    ]
}

/// Applies a signed per-channel difference to a base pixel, wrapping in
/// 8-bit unsigned space.
#[inline]
pub(crate) const fn apply_diff(base: Pixel, dr: i8, dg: i8, db: i8) -> Pixel {
    [
        base[0].wrapping_add(dr as u8),
        base[1].wrapping_add(dg as u8),
        base[2].wrapping_add(db as u8),
    ]
}

/// Maps a failed read onto the codec error surface: a short read is
/// [`Error::UnexpectedEof`], everything else passes through as
/// [`Error::Io`].
pub(crate) fn read_error(source: std::io::Error) -> Error {
    if source.kind() == std::io::ErrorKind::UnexpectedEof {
        UnexpectedEofSnafu.build()
    } else {
        Error::Io { source }
    }
}
