//! Benchmarks for timeline composition primitives and a full compose run.
//!
//! Run with: `cargo bench --bench compose_bench`

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use srtdub::audio::normalize_peak;
use srtdub::audio::wav::{decode_wav, encode_wav};
use srtdub::subtitle::parse_srt;
use srtdub::{
    Clip, Compositor, Fader, RenderConfig, SampleEncoding, SpeechSynthesizer, SubtitleSegment,
    SynthesisRequest, TimelineBuffer,
};

const RATE: u32 = 22_050;

/// Generate an SRT document with `cues` entries, one every 2 seconds.
fn generate_srt(cues: usize) -> String {
    let mut srt = String::with_capacity(cues * 64);
    for i in 0..cues {
        let start = i as f64 * 2.0;
        srt.push_str(&format!(
            "{}\n{} --> {}\n<i>Line number {i}</i>\n\n",
            i + 1,
            srtdub::subtitle::format_srt_time(start),
            srtdub::subtitle::format_srt_time(start + 1.5)
        ));
    }
    srt
}

fn tone(secs: f64) -> Clip {
    let frames = (secs * f64::from(RATE)) as usize;
    let samples = (0..frames)
        .map(|i| (i as f32 * 0.05).sin() * 0.6)
        .collect();
    Clip::mono(samples, RATE)
}

/// Returns the same pre-encoded clip for every request
struct FixedVoice(Bytes);

#[async_trait]
impl SpeechSynthesizer for FixedVoice {
    async fn synthesize(&self, _request: &SynthesisRequest) -> srtdub::tts::Result<Bytes> {
        Ok(self.0.clone())
    }
}

fn bench_parse_srt(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_srt");

    for &cues in &[10usize, 100, 1_000] {
        let srt = generate_srt(cues);
        group.throughput(Throughput::Bytes(srt.len() as u64));
        group.bench_with_input(BenchmarkId::new("cues", cues), &srt, |b, srt| {
            b.iter(|| black_box(parse_srt(black_box(srt))));
        });
    }

    group.finish();
}

fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives");
    let clip = tone(2.0);

    group.bench_function("fade_2s", |b| {
        let fader = Fader::default();
        b.iter(|| {
            let mut clip = clip.clone();
            black_box(fader.apply(&mut clip));
        });
    });

    group.bench_function("mix_2s_into_60s", |b| {
        b.iter(|| {
            let mut buffer = TimelineBuffer::new(RATE, 1, 60 * RATE as usize);
            buffer.write(black_box(30 * RATE as usize), &clip);
            black_box(buffer);
        });
    });

    group.bench_function("normalize_60s", |b| {
        let loud: Vec<f32> = (0..60 * RATE as usize).map(|i| (i % 7) as f32 * 0.4).collect();
        b.iter(|| {
            let mut samples = loud.clone();
            black_box(normalize_peak(&mut samples));
        });
    });

    let wav = encode_wav(&clip, SampleEncoding::Pcm16).unwrap();
    group.throughput(Throughput::Bytes(wav.len() as u64));
    group.bench_function("decode_wav_2s", |b| {
        b.iter(|| black_box(decode_wav(black_box(&wav)).unwrap()));
    });

    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");
    group.measurement_time(Duration::from_secs(10));

    let voice = FixedVoice(Bytes::from(encode_wav(&tone(1.8), SampleEncoding::Float32).unwrap()));

    for &cues in &[10usize, 100] {
        let segments: Vec<SubtitleSegment> = parse_srt(&generate_srt(cues));

        for config in [RenderConfig::compact(), RenderConfig::timed()] {
            let id = BenchmarkId::new(config.mode.to_string(), cues);
            let compositor = Compositor::new(&voice, "ref", config);
            group.bench_with_input(id, &segments, |b, segments| {
                b.iter(|| {
                    black_box(tokio_test::block_on(compositor.compose(segments)).unwrap());
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_parse_srt, bench_primitives, bench_compose);
criterion_main!(benches);
