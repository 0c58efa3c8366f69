//! Frame encoding: the per-pixel decision engine and the session encoder.

use crate::{
    consts::QOIV_MAX_RUN,
    frame::{Frame, Reference},
    header::{ColourSpace, FrameType, QovFrameHeader, QovHeader},
    opcodes::Opcode,
    pixels::{Pixel, PixelHashMap},
    utils, Error, InvalidDimensionsSnafu, IoSnafu,
};
use itertools::Itertools;
use snafu::{ensure, ResultExt};
use std::io::Write;

/// A frame rendered down to its header and opcode sequence, ready to be
/// measured or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    pub header: QovFrameHeader,
    pub opcodes: Vec<Opcode>,
}

impl EncodedFrame {
    /// Size of the whole frame record in bytes, frame header included.
    pub fn encoded_len(&self) -> usize {
        1 + self.opcodes.iter().map(Opcode::encoded_len).sum::<usize>()
    }

    /// Writes the frame header followed by every opcode.
    pub fn write<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        self.header.write(w)?;
        for opcode in &self.opcodes {
            opcode.serialize(w)?;
        }
        Ok(())
    }
}

/// Encodes one frame as a key frame. `pixels` must be freshly cleared; at
/// return it holds the table state the format defines as the key frame's
/// snapshot.
pub fn encode_keyframe(frame: &Frame, pixels: &mut PixelHashMap) -> Result<EncodedFrame, Error> {
    encode_frame(frame, pixels, FrameType::Key, None)
}

/// Encodes one frame as a predicted frame against the reference key frame.
/// `pixels` must be freshly cleared.
pub fn encode_predicted(
    frame: &Frame,
    pixels: &mut PixelHashMap,
    reference: &Reference,
) -> Result<EncodedFrame, Error> {
    encode_frame(frame, pixels, FrameType::Predicted, Some(reference))
}

fn encode_frame(
    frame: &Frame,
    pixels: &mut PixelHashMap,
    frame_type: FrameType,
    reference: Option<&Reference>,
) -> Result<EncodedFrame, Error> {
    let mut opcodes = Vec::new();
    let mut prev: Option<Pixel> = None;
    let mut position = 0usize;

    for (count, pixel) in frame.pixels().dedup_with_count() {
        // Consecutive groups always differ, so the group head is never a
        // run continuation; the remaining repeats fold into runs.
        opcodes.push(choose_opcode(pixel, position, prev, pixels, reference)?);
        pixels.push(pixel);
        prev = Some(pixel);

        let run = count - 1;
        for _ in 0..run / usize::from(QOIV_MAX_RUN) {
            opcodes.push(Opcode::run(QOIV_MAX_RUN)?);
        }
        let rest = run % usize::from(QOIV_MAX_RUN);
        if rest > 0 {
            opcodes.push(Opcode::run(rest as u8)?);
        }

        position += count;
    }

    Ok(EncodedFrame {
        header: QovFrameHeader { frame_type },
        opcodes,
    })
}

// Candidate priority: reference snapshot hit, reference position hit, pixel
// table hit, small difference from the previous pixel, literal RGB.
fn choose_opcode(
    pixel: Pixel,
    position: usize,
    prev: Option<Pixel>,
    pixels: &PixelHashMap,
    reference: Option<&Reference>,
) -> Result<Opcode, Error> {
    if let Some(reference) = reference {
        if reference.snapshot.contains(pixel) {
            return Opcode::diff_frame(true, reference.snapshot.index_of(pixel), 0, 0, 0);
        }
        if reference.frame.pixel(position) == pixel {
            return Opcode::diff_frame(false, 0, 0, 0, 0);
        }
    }

    if pixels.contains(pixel) {
        return Opcode::index(pixels.index_of(pixel));
    }

    if let Some(prev) = prev {
        let [dr, dg, db] = utils::diff(pixel, prev);
        if matches!((dr, dg, db), (-2..=1, -2..=1, -2..=1)) {
            return Opcode::diff(dr, dg, db);
        }
    }

    Ok(Opcode::rgb(pixel))
}

/// Whether the next frame must, may, or must not be a key frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyframeNow {
    No,
    Maybe,
    Yes,
}

/// Streaming QOIV encoder.
///
/// Writes the file header on construction and one frame record per
/// [`push`](Encoder::push). A key frame lands every `keyframe_interval`
/// frames; with a `max_keyframe_interval` the frames in between are encoded
/// both as predicted and as key frame, and the smaller record is emitted.
/// The reference key frame and its table snapshot are replaced whenever a
/// key frame is committed.
pub struct Encoder<W: Write> {
    sink: W,
    header: QovHeader,
    keyframe_interval: u32,
    max_keyframe_interval: Option<u32>,
    /// `None` forces the next frame to be a key frame.
    frames_since_last_keyframe: Option<u32>,
    reference: Option<Reference>,
}

impl<W: Write> Encoder<W> {
    /// Creates an encoder and writes the file header to `sink`.
    pub fn new(
        mut sink: W,
        width: u32,
        height: u32,
        colourspace: ColourSpace,
        keyframe_interval: u32,
        max_keyframe_interval: Option<u32>,
    ) -> Result<Self, Error> {
        let header = QovHeader {
            width,
            height,
            colourspace,
        };
        header.write(&mut sink)?;

        Ok(Self {
            sink,
            header,
            keyframe_interval,
            max_keyframe_interval,
            frames_since_last_keyframe: None,
            reference: None,
        })
    }

    pub fn header(&self) -> &QovHeader {
        &self.header
    }

    /// Forces the next pushed frame to be a key frame.
    pub fn trigger_keyframe(&mut self) {
        self.frames_since_last_keyframe = None;
    }

    /// Encodes `frame` and writes its record to the sink.
    pub fn push(&mut self, frame: &Frame) -> Result<(), Error> {
        ensure!(
            frame.width() == self.header.width && frame.height() == self.header.height,
            InvalidDimensionsSnafu {
                width: self.header.width,
                height: self.header.height,
                byte_count: frame.as_bytes().len(),
            }
        );

        match self.next_frame_now() {
            KeyframeNow::Yes => self.push_keyframe(frame),
            KeyframeNow::No => self.push_predicted(frame),
            KeyframeNow::Maybe => self.push_adaptive(frame),
        }
    }

    /// Flushes the underlying byte sink.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.sink.flush().context(IoSnafu)
    }

    /// Consumes the encoder, returning the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn next_frame_now(&self) -> KeyframeNow {
        let Some(since) = self.frames_since_last_keyframe else {
            return KeyframeNow::Yes;
        };
        if self.reference.is_none() {
            return KeyframeNow::Yes;
        }
        if since < self.keyframe_interval {
            return KeyframeNow::No;
        }
        match self.max_keyframe_interval {
            None => KeyframeNow::Yes,
            Some(max) if since >= max => KeyframeNow::Yes,
            Some(_) => KeyframeNow::Maybe,
        }
    }

    fn push_keyframe(&mut self, frame: &Frame) -> Result<(), Error> {
        let mut pixels = PixelHashMap::new();
        let encoded = encode_keyframe(frame, &mut pixels)?;
        encoded.write(&mut self.sink)?;

        self.reference = Some(Reference {
            frame: frame.clone(),
            snapshot: pixels,
        });
        self.frames_since_last_keyframe = Some(0);
        Ok(())
    }

    fn push_predicted(&mut self, frame: &Frame) -> Result<(), Error> {
        // next_frame_now only says No when a reference exists
        let Some(reference) = self.reference.as_ref() else {
            return self.push_keyframe(frame);
        };

        let mut pixels = PixelHashMap::new();
        let encoded = encode_predicted(frame, &mut pixels, reference)?;
        encoded.write(&mut self.sink)?;

        self.frames_since_last_keyframe = self.frames_since_last_keyframe.map(|n| n + 1);
        Ok(())
    }

    // The interval window has elapsed but the hard max has not: encode the
    // frame both ways and commit whichever record is smaller. Ties go to
    // the key frame, refreshing the reference.
    fn push_adaptive(&mut self, frame: &Frame) -> Result<(), Error> {
        let Some(reference) = self.reference.as_ref() else {
            return self.push_keyframe(frame);
        };

        let mut predicted_pixels = PixelHashMap::new();
        let predicted = encode_predicted(frame, &mut predicted_pixels, reference)?;

        let mut keyframe_pixels = PixelHashMap::new();
        let keyframe = encode_keyframe(frame, &mut keyframe_pixels)?;

        if predicted.encoded_len() < keyframe.encoded_len() {
            predicted.write(&mut self.sink)?;
            self.frames_since_last_keyframe = self.frames_since_last_keyframe.map(|n| n + 1);
        } else {
            keyframe.write(&mut self.sink)?;
            self.reference = Some(Reference {
                frame: frame.clone(),
                snapshot: keyframe_pixels,
            });
            self.frames_since_last_keyframe = Some(0);
        }
        Ok(())
    }
}
