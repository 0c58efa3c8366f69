use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use qoiv::{decode::Decoder, encode::Encoder, frame::Frame, header::ColourSpace};

fn static_video(width: u32, height: u32, frames: usize) -> Vec<Frame> {
    (0..frames)
        .map(|_| Frame::filled(width, height, [128, 128, 128]))
        .collect()
}

fn ball_video(width: u32, height: u32, frames: usize) -> Vec<Frame> {
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

fn encode_sequence(frames: &[Frame], keyframe_interval: u32) -> Vec<u8> {
    let mut encoder = Encoder::new(
        Vec::new(),
        frames[0].width(),
        frames[0].height(),
        ColourSpace::Srgb,
        keyframe_interval,
        None,
    )
    .unwrap();
    for frame in frames {
        encoder.push(frame).unwrap();
    }
    encoder.into_inner()
}

fn sequences() -> Vec<(&'static str, Vec<Frame>)> {
    vec![
        ("static 128x128x30", static_video(128, 128, 30)),
        ("ball 128x128x30", ball_video(128, 128, 30)),
    ]
}

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthetic encode");

    for (name, frames) in sequences() {
        let pixel_count = frames.len() * frames[0].pixel_count();
        group.throughput(criterion::Throughput::Elements(pixel_count as u64));

        group.bench_with_input(
            BenchmarkId::new("keyframes only", name),
            &frames,
            |b, frames| b.iter(|| encode_sequence(frames, 0)),
        );
        group.bench_with_input(
            BenchmarkId::new("keyframe interval 6", name),
            &frames,
            |b, frames| b.iter(|| encode_sequence(frames, 6)),
        );
    }
}

fn decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthetic decode");

    for (name, frames) in sequences() {
        let pixel_count = frames.len() * frames[0].pixel_count();
        let encoded = encode_sequence(&frames, 6);

        group.throughput(criterion::Throughput::Elements(pixel_count as u64));
        group.bench_with_input(BenchmarkId::new("interval 6", name), &encoded, |b, input| {
            b.iter(|| {
                let decoder = Decoder::new(&input[..]).unwrap();
                decoder.map(Result::unwrap).count()
            })
        });
    }
}

criterion_group!(benches, decode, encode);
criterion_main!(benches);
