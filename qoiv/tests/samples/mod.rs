//! Synthetic video sequences shared by the integration tests.

use qoiv::{decode::Decoder, encode::Encoder, frame::Frame, header::ColourSpace};

/// A grey frame repeated `frames` times.
pub fn static_video(width: u32, height: u32, frames: usize) -> Vec<Frame> {
    (0..frames)
        .map(|_| Frame::filled(width, height, [128, 128, 128]))
        .collect()
}

/// A single white pixel scanning across a one-row frame.
pub fn scanning_line(width: u32, frames: usize) -> Vec<Frame> {
    (0..frames)
        .map(|i| {
            let mut data = vec![0u8; width as usize * 3];
            let x = i % width as usize;
            data[x * 3..x * 3 + 3].copy_from_slice(&[255, 255, 255]);
            Frame::from_raw(width, 1, data).unwrap()
        })
        .collect()
}

/// A white square orbiting the frame center on black.
pub fn ball_video(width: u32, height: u32, frames: usize) -> Vec<Frame> {
    (0..frames)
        .map(|i| {
            let x = (width as f64 * 0.5 + (width as f64 / 3.0) * (i as f64 / 10.0).sin()) as i64;
            let y = (height as f64 * 0.5 + (height as f64 / 3.0) * (i as f64 / 10.0).cos()) as i64;
            let radius = i64::from(width / 10);

            let mut data = vec![0u8; width as usize * height as usize * 3];
            for yy in (y - radius).max(0)..(y + radius).min(i64::from(height)) {
                for xx in (x - radius).max(0)..(x + radius).min(i64::from(width)) {
                    let offset = (yy * i64::from(width) + xx) as usize * 3;
                    data[offset..offset + 3].copy_from_slice(&[255, 255, 255]);
                }
            }
            Frame::from_raw(width, height, data).unwrap()
        })
        .collect()
}

/// Encodes a whole sequence into an in-memory stream.
pub fn encode_sequence(
    frames: &[Frame],
    keyframe_interval: u32,
    max_keyframe_interval: Option<u32>,
) -> Vec<u8> {
    let first = frames.first().expect("empty sequence");
    let mut encoder = Encoder::new(
        Vec::new(),
        first.width(),
        first.height(),
        ColourSpace::Srgb,
        keyframe_interval,
        max_keyframe_interval,
    )
    .unwrap();

    for frame in frames {
        encoder.push(frame).unwrap();
    }
    encoder.flush().unwrap();
    encoder.into_inner()
}

/// Decodes every frame of an in-memory stream.
pub fn decode_all(bytes: &[u8]) -> Vec<Frame> {
    Decoder::new(bytes)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}
