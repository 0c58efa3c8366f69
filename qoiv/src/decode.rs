//! Stream-driven frame reconstruction.

use crate::{
    consts::QOIV_OP_DIFFFRAME,
    frame::{Frame, Reference},
    header::{ColourSpace, FrameType, QovHeader},
    opcodes::Opcode,
    pixels::{Pixel, PixelHashMap},
    utils, Error, InvalidFrameTypeSnafu, InvalidOpcodeSnafu, IoSnafu, OverflowSnafu,
};
use snafu::{ensure, ResultExt};
use std::io::Read;

/// Streaming QOIV decoder.
///
/// Reads the file header on construction, then reconstructs one frame per
/// [`next_frame`](Decoder::next_frame) call. After each key frame the
/// decoder retains the frame and the pixel table snapshot, mirroring the
/// encoder's reference management for the predicted frames that follow.
pub struct Decoder<R> {
    source: R,
    header: QovHeader,
    pixels: PixelHashMap,
    reference: Option<Reference>,
}

impl<R: Read> Decoder<R> {
    /// Reads and validates the file header.
    pub fn new(mut source: R) -> Result<Self, Error> {
        let header = QovHeader::read(&mut source)?;
        Ok(Self {
            source,
            header,
            pixels: PixelHashMap::new(),
            reference: None,
        })
    }

    pub fn header(&self) -> &QovHeader {
        &self.header
    }

    pub fn width(&self) -> u32 {
        self.header.width
    }

    pub fn height(&self) -> u32 {
        self.header.height
    }

    pub fn colourspace(&self) -> ColourSpace {
        self.header.colourspace
    }

    /// Decodes the next frame, or returns `None` at a clean end of stream.
    ///
    /// End of file is only clean between frame records; running out of
    /// bytes mid-frame is an [`Error::UnexpectedEof`].
    pub fn next_frame(&mut self) -> Result<Option<Frame>, Error> {
        let mut type_byte = [0u8; 1];
        let n = self.source.read(&mut type_byte).context(IoSnafu)?;
        if n == 0 {
            return Ok(None);
        }
        let frame_type = FrameType::try_from(type_byte[0])?;

        self.read_frame(frame_type).map(Some)
    }

    fn read_frame(&mut self, frame_type: FrameType) -> Result<Frame, Error> {
        // A predicted frame is meaningless until a key frame has landed.
        ensure!(
            frame_type == FrameType::Key || self.reference.is_some(),
            InvalidFrameTypeSnafu {
                value: frame_type as u8,
            }
        );

        let pixel_count = self.header.width as usize * self.header.height as usize;
        let mut frame = Frame::new(self.header.width, self.header.height);

        self.pixels.clear();
        let mut prev: Pixel = [0, 0, 0];
        let mut position = 0usize;

        while position < pixel_count {
            match Opcode::parse_next(&mut self.source)? {
                Opcode::Rgb { pixel } => {
                    frame.set_pixel(position, pixel);
                    self.pixels.push(pixel);
                    prev = pixel;
                    position += 1;
                }
                Opcode::Index { index } => {
                    let pixel = self.pixels.get(index);
                    frame.set_pixel(position, pixel);
                    prev = pixel;
                    position += 1;
                }
                Opcode::Diff { dr, dg, db } => {
                    let pixel = utils::apply_diff(prev, dr, dg, db);
                    frame.set_pixel(position, pixel);
                    self.pixels.push(pixel);
                    prev = pixel;
                    position += 1;
                }
                Opcode::Run { run } => {
                    let run = usize::from(run);
                    ensure!(
                        position + run <= pixel_count,
                        OverflowSnafu {
                            position,
                            run,
                            pixel_count,
                        }
                    );
                    frame.fill_pixels(position, run, prev);
                    position += run;
                }
                Opcode::DiffFrame {
                    use_index,
                    key_frame: _,
                    index,
                    dr,
                    dg,
                    db,
                } => {
                    // Key frames are reference-free by definition.
                    let reference = match (frame_type, self.reference.as_ref()) {
                        (FrameType::Predicted, Some(reference)) => reference,
                        _ => {
                            return InvalidOpcodeSnafu {
                                byte: QOIV_OP_DIFFFRAME,
                            }
                            .fail()
                        }
                    };

                    let base = if use_index {
                        reference.snapshot.get(index)
                    } else {
                        reference.frame.pixel(position)
                    };
                    let pixel = utils::apply_diff(base, dr, dg, db);
                    frame.set_pixel(position, pixel);
                    self.pixels.push(pixel);
                    prev = pixel;
                    position += 1;
                }
            }
        }

        if frame_type == FrameType::Key {
            self.reference = Some(Reference {
                frame: frame.clone(),
                snapshot: self.pixels.clone(),
            });
        }

        Ok(frame)
    }
}

impl<R: Read> Iterator for Decoder<R> {
    type Item = Result<Frame, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}
