//! The QOIV instruction set: a tagged sum with validating construction,
//! byte-exact serialization, and prefix-classified parsing.

use crate::{
    consts::*, pixels::Pixel, utils::read_error, Error, InvalidOpcodeSnafu, IoSnafu,
    OpcodeOutOfRangeSnafu,
};
use snafu::{ensure, ResultExt};
use std::io::{Read, Write};

/// One wire-level instruction in a frame's opcode stream.
///
/// Fields are public for matching; use the constructors to build validated
/// values. [`Opcode::serialize`] re-checks the bounds before writing, so an
/// out-of-range literal never reaches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// A literal pixel.
    Rgb { pixel: Pixel },
    /// The pixel currently stored in the given table slot.
    Index { index: u8 },
    /// A small per-channel difference from the previous pixel.
    Diff { dr: i8, dg: i8, db: i8 },
    /// `run` repetitions of the previous pixel.
    Run { run: u8 },
    /// A small per-channel difference from a reference key frame pixel:
    /// the snapshot table slot `index` when `use_index` is set, the
    /// reference pixel at the current output position otherwise.
    DiffFrame {
        use_index: bool,
        /// Must be set; clear is reserved for previous-frame prediction.
        key_frame: bool,
        index: u8,
        dr: i8,
        dg: i8,
        db: i8,
    },
}

/// The opcode family a first byte belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeKind {
    Rgb,
    Index,
    Diff,
    Run,
    DiffFrame,
    /// Reserved frame-run tag; recognized but not parseable.
    FrameRun,
}

impl OpcodeKind {
    /// Classifies a first byte by its tag prefix. Every byte value
    /// classifies: the two full-byte tags win over the 2-bit tags, and
    /// `0b00` makes INDEX the catch-all for `0x00..=0x3F`.
    pub fn classify(byte: u8) -> OpcodeKind {
        match byte {
            QOIV_OP_RGB => OpcodeKind::Rgb,
            QOIV_OP_FRAMERUN => OpcodeKind::FrameRun,
            _ => match byte & QOIV_MASK_TAG {
                QOIV_OP_INDEX => OpcodeKind::Index,
                QOIV_OP_DIFF => OpcodeKind::Diff,
                QOIV_OP_DIFFFRAME => OpcodeKind::DiffFrame,
                _ => OpcodeKind::Run,
            },
        }
    }
}

fn check_index(index: u8) -> Result<(), Error> {
    ensure!(
        index < 64,
        OpcodeOutOfRangeSnafu {
            field: "index",
            value: i32::from(index),
        }
    );
    Ok(())
}

fn check_delta(field: &'static str, value: i8) -> Result<(), Error> {
    ensure!(
        (-2..=1).contains(&value),
        OpcodeOutOfRangeSnafu {
            field,
            value: i32::from(value),
        }
    );
    Ok(())
}

impl Opcode {
    /// A literal pixel.
    pub fn rgb(pixel: Pixel) -> Opcode {
        Opcode::Rgb { pixel }
    }

    /// A pixel table lookup; `index` must be in `0..64`.
    pub fn index(index: u8) -> Result<Opcode, Error> {
        check_index(index)?;
        Ok(Opcode::Index { index })
    }

    /// A difference from the previous pixel; each delta must be in
    /// `-2..=1`.
    pub fn diff(dr: i8, dg: i8, db: i8) -> Result<Opcode, Error> {
        check_delta("dr", dr)?;
        check_delta("dg", dg)?;
        check_delta("db", db)?;
        Ok(Opcode::Diff { dr, dg, db })
    }

    /// A run of the previous pixel; `run` must be in `1..=62`.
    pub fn run(run: u8) -> Result<Opcode, Error> {
        ensure!(
            (1..=QOIV_MAX_RUN).contains(&run),
            OpcodeOutOfRangeSnafu {
                field: "run",
                value: i32::from(run),
            }
        );
        Ok(Opcode::Run { run })
    }

    /// A reference key frame predictor. `index` is only consulted when
    /// `use_index` is set but is validated either way.
    pub fn diff_frame(use_index: bool, index: u8, dr: i8, dg: i8, db: i8) -> Result<Opcode, Error> {
        check_index(index)?;
        check_delta("dr", dr)?;
        check_delta("dg", dg)?;
        check_delta("db", db)?;
        Ok(Opcode::DiffFrame {
            use_index,
            key_frame: true,
            index,
            dr,
            dg,
            db,
        })
    }

    /// The opcode's family.
    pub fn kind(&self) -> OpcodeKind {
        match self {
            Opcode::Rgb { .. } => OpcodeKind::Rgb,
            Opcode::Index { .. } => OpcodeKind::Index,
            Opcode::Diff { .. } => OpcodeKind::Diff,
            Opcode::Run { .. } => OpcodeKind::Run,
            Opcode::DiffFrame { .. } => OpcodeKind::DiffFrame,
        }
    }

    /// True if `first_byte` starts an opcode of this opcode's family.
    pub fn is_next(&self, first_byte: u8) -> bool {
        OpcodeKind::classify(first_byte) == self.kind()
    }

    /// Size of the opcode on the wire, in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Opcode::Rgb { .. } => 4,
            Opcode::Index { .. } | Opcode::Diff { .. } | Opcode::Run { .. } => 1,
            Opcode::DiffFrame { .. } => 2,
        }
    }

    /// Validates the opcode's fields and writes its wire form.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        match *self {
            Opcode::Rgb { pixel: [r, g, b] } => {
                w.write_all(&[QOIV_OP_RGB, r, g, b]).context(IoSnafu)
            }
            Opcode::Index { index } => {
                check_index(index)?;
                w.write_all(&[QOIV_OP_INDEX | index]).context(IoSnafu)
            }
            Opcode::Diff { dr, dg, db } => {
                check_delta("dr", dr)?;
                check_delta("dg", dg)?;
                check_delta("db", db)?;
                let byte = QOIV_OP_DIFF
                    | ((dr + 2) as u8) << 4
                    | ((dg + 2) as u8) << 2
                    | (db + 2) as u8;
                w.write_all(&[byte]).context(IoSnafu)
            }
            Opcode::Run { run } => {
                ensure!(
                    (1..=QOIV_MAX_RUN).contains(&run),
                    OpcodeOutOfRangeSnafu {
                        field: "run",
                        value: i32::from(run),
                    }
                );
                w.write_all(&[QOIV_OP_RUN | (run - 1)]).context(IoSnafu)
            }
            Opcode::DiffFrame {
                use_index,
                key_frame,
                index,
                dr,
                dg,
                db,
            } => {
                ensure!(
                    key_frame,
                    OpcodeOutOfRangeSnafu {
                        field: "key_frame",
                        value: 0_i32,
                    }
                );
                check_index(index)?;
                check_delta("dr", dr)?;
                check_delta("dg", dg)?;
                check_delta("db", db)?;
                let use_index_bit = if use_index { QOIV_DIFFFRAME_USE_INDEX } else { 0 };
                let first = QOIV_OP_DIFFFRAME
                    | use_index_bit
                    | QOIV_DIFFFRAME_KEY_FRAME
                    | ((dr + 2) as u8) << 2
                    | (dg + 2) as u8;
                let second = ((db + 2) as u8) << 6 | index;
                w.write_all(&[first, second]).context(IoSnafu)
            }
        }
    }

    /// Reads the next opcode from the stream.
    ///
    /// The first byte selects the opcode family by prefix; the remaining
    /// bytes of multi-byte opcodes are then read in full. A truncated
    /// opcode is [`Error::UnexpectedEof`], the reserved frame-run tag is
    /// [`Error::InvalidOpcode`].
    pub fn parse_next<R: Read>(r: &mut R) -> Result<Opcode, Error> {
        let mut first = [0u8; 1];
        r.read_exact(&mut first).map_err(read_error)?;
        let byte = first[0];

        match OpcodeKind::classify(byte) {
            OpcodeKind::Rgb => {
                let mut pixel = [0u8; 3];
                r.read_exact(&mut pixel).map_err(read_error)?;
                Ok(Opcode::Rgb { pixel })
            }
            OpcodeKind::Index => Ok(Opcode::Index {
                index: byte & QOIV_MASK_PAYLOAD,
            }),
            OpcodeKind::Diff => Ok(Opcode::Diff {
                dr: ((byte >> 4) & 0b11) as i8 - 2,
                dg: ((byte >> 2) & 0b11) as i8 - 2,
                db: (byte & 0b11) as i8 - 2,
            }),
            OpcodeKind::Run => Ok(Opcode::Run {
                run: (byte & QOIV_MASK_PAYLOAD) + 1,
            }),
            OpcodeKind::DiffFrame => {
                let mut second = [0u8; 1];
                r.read_exact(&mut second).map_err(read_error)?;
                let second = second[0];

                // key_frame = 0 has no defined semantics yet
                ensure!(
                    byte & QOIV_DIFFFRAME_KEY_FRAME != 0,
                    InvalidOpcodeSnafu { byte }
                );

                Ok(Opcode::DiffFrame {
                    use_index: byte & QOIV_DIFFFRAME_USE_INDEX != 0,
                    key_frame: true,
                    index: second & QOIV_MASK_PAYLOAD,
                    dr: ((byte >> 2) & 0b11) as i8 - 2,
                    dg: (byte & 0b11) as i8 - 2,
                    db: ((second >> 6) & 0b11) as i8 - 2,
                })
            }
            OpcodeKind::FrameRun => InvalidOpcodeSnafu { byte }.fail(),
        }
    }
}
