use argh::FromArgs;
use image::RgbImage;
use qoiv::{decode::Decoder, encode::Encoder, frame::Frame, header::ColourSpace};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    num::NonZeroU32,
    path::PathBuf,
    str::FromStr,
};

/// QOIV cli encoder and decoder.
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Encode(Encode),
    EncodeRaw(EncodeRaw),
    Decode(Decode),
    DecodeRaw(DecodeRaw),
}

#[derive(Debug)]
enum Colour {
    Srgb,
    Linear,
}

impl FromStr for Colour {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[rustfmt::skip]
        let Some(colour) = s.eq_ignore_ascii_case("srgb").then_some(Colour::Srgb)
               .or_else(|| s.eq_ignore_ascii_case("linear").then_some(Colour::Linear))
        else { return Err("invalid string"); };

        Ok(colour)
    }
}

impl From<Colour> for ColourSpace {
    fn from(colour: Colour) -> ColourSpace {
        match colour {
            Colour::Srgb => ColourSpace::Srgb,
            Colour::Linear => ColourSpace::Linear,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli { command } = argh::from_env();

    match command {
        Command::Encode(options) => encode(options),
        Command::EncodeRaw(options) => encode_raw(options),
        Command::Decode(options) => decode(options),
        Command::DecodeRaw(options) => decode_raw(options),
    }
}

/// Encodes a directory of PNG frames as QOIV.
#[derive(FromArgs)]
#[argh(subcommand, name = "encode")]
struct Encode {
    /// frames between key frames
    #[argh(option, default = "30")]
    keyframe_interval: u32,
    /// hard upper bound on the key frame distance
    #[argh(option, default = "600")]
    max_keyframe_interval: u32,
    /// colour space metadata, srgb (default) or linear
    #[argh(option, default = "Colour::Srgb")]
    colourspace: Colour,

    /// directory holding the PNG frames, encoded in filename order
    #[argh(positional)]
    input: PathBuf,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn encode(options: Encode) -> Result<(), Box<dyn std::error::Error>> {
    let Encode {
        keyframe_interval,
        max_keyframe_interval,
        colourspace,
        input,
        output,
    } = options;

    let mut paths: Vec<PathBuf> = std::fs::read_dir(&input)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    paths.retain(|p| {
        p.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    });
    paths.sort();

    if paths.is_empty() {
        return Err(format!("no PNG frames found in `{}`", input.display()).into());
    }

    let mut frames = Vec::with_capacity(paths.len());
    for path in &paths {
        let image = image::io::Reader::open(path)?.decode()?.into_rgb8();
        let (width, height) = image.dimensions();
        frames.push(Frame::from_raw(width, height, image.into_raw())?);
    }

    let (width, height) = (frames[0].width(), frames[0].height());
    println!("Encoding {width}x{height} video, {} frames", frames.len());

    let mut encoder = Encoder::new(
        BufWriter::new(File::create(&output)?),
        width,
        height,
        colourspace.into(),
        keyframe_interval,
        Some(max_keyframe_interval),
    )?;
    for frame in &frames {
        encoder.push(frame)?;
    }
    encoder.flush()?;

    println!("Written {} frames to `{output}`", frames.len());

    Ok(())
}

/// Encodes a raw RGB24 frame stream as QOIV.
#[derive(FromArgs)]
#[argh(subcommand, name = "encode-raw")]
struct EncodeRaw {
    /// frame width
    #[argh(option)]
    width: NonZeroU32,
    /// frame height
    #[argh(option)]
    height: NonZeroU32,
    /// frames between key frames
    #[argh(option, default = "30")]
    keyframe_interval: u32,
    /// hard upper bound on the key frame distance
    #[argh(option, default = "600")]
    max_keyframe_interval: u32,

    /// the input file: concatenated row-major RGB24 frames
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn encode_raw(options: EncodeRaw) -> Result<(), Box<dyn std::error::Error>> {
    let EncodeRaw {
        width,
        height,
        keyframe_interval,
        max_keyframe_interval,
        input,
        output,
    } = options;

    let raw = std::fs::read(&input)?;
    let frame_size = width.get() as usize * height.get() as usize * 3;
    if raw.is_empty() || raw.len() % frame_size != 0 {
        return Err(format!(
            "input file size is not a multiple of the {frame_size}-byte frame size, got {}",
            raw.len()
        )
        .into());
    }

    println!(
        "Encoding {width}x{height} video, {} frames",
        raw.len() / frame_size
    );

    let mut encoder = Encoder::new(
        BufWriter::new(File::create(&output)?),
        width.get(),
        height.get(),
        ColourSpace::Srgb,
        keyframe_interval,
        Some(max_keyframe_interval),
    )?;

    for chunk in raw.chunks_exact(frame_size) {
        let frame = Frame::from_raw(width.get(), height.get(), chunk.to_vec())?;
        encoder.push(&frame)?;
    }
    encoder.flush()?;

    println!("Written {} frames to `{output}`", raw.len() / frame_size);

    Ok(())
}

/// Decodes a QOIV file into numbered PNG frames.
#[derive(FromArgs)]
#[argh(subcommand, name = "decode")]
struct Decode {
    /// the input file
    #[argh(positional)]
    input: String,
    /// the output directory
    #[argh(positional)]
    output: PathBuf,
}

fn decode(options: Decode) -> Result<(), Box<dyn std::error::Error>> {
    let Decode { input, output } = options;

    let mut decoder = Decoder::new(BufReader::new(File::open(&input)?))?;
    let (width, height) = (decoder.width(), decoder.height());

    println!("Decoding {width}x{height} video from `{input}`");
    std::fs::create_dir_all(&output)?;

    let mut count = 0usize;
    while let Some(frame) = decoder.next_frame()? {
        let image = RgbImage::from_vec(width, height, frame.into_raw())
            .ok_or("failed to create image")?;
        image.save(output.join(format!("{count:06}.png")))?;
        count += 1;
    }

    println!("Written {count} frames to `{}`", output.display());

    Ok(())
}

/// Decodes a QOIV file into a raw RGB24 frame stream.
#[derive(FromArgs)]
#[argh(subcommand, name = "decode-raw")]
struct DecodeRaw {
    /// the input file
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn decode_raw(options: DecodeRaw) -> Result<(), Box<dyn std::error::Error>> {
    let DecodeRaw { input, output } = options;

    let mut decoder = Decoder::new(BufReader::new(File::open(&input)?))?;

    println!(
        "Decoding {}x{} video from `{input}`",
        decoder.width(),
        decoder.height()
    );

    let mut sink = BufWriter::new(File::create(&output)?);
    let mut count = 0usize;
    while let Some(frame) = decoder.next_frame()? {
        sink.write_all(frame.as_bytes())?;
        count += 1;
    }
    sink.flush()?;

    println!("Written {count} frames to `{output}`");

    Ok(())
}
