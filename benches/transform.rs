//! Benchmarks for container parsing and the keyframe-suppressing rewrite
//!
//! Inputs are synthesized in memory: a keyframe every 12 frames, roughly
//! 4 KiB per delta frame and 24 KiB per keyframe.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use datamosh_avi::{transform, AviBuilder, AviFile, EditRequest, FrameKind};

const GOP: usize = 12;

fn synthesize(frames: usize) -> Vec<u8> {
    (0..frames)
        .fold(AviBuilder::new(), |builder, i| {
            if i % GOP == 0 {
                builder.frame(FrameKind::Sync, 24 * 1024)
            } else {
                builder.frame(FrameKind::Delta, 4 * 1024)
            }
        })
        .build()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for frames in [240, 2400] {
        let data = synthesize(frames);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(frames), &data, |b, data| {
            b.iter(|| AviFile::parse(black_box(data)))
        });
    }

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let data = synthesize(2400);
    let avi = match AviFile::parse(&data) {
        Ok(avi) => avi,
        Err(e) => panic!("synthesized input does not parse: {}", e),
    };
    group.throughput(Throughput::Bytes(data.len() as u64));

    let requests = [
        ("identity", EditRequest::new()),
        ("one_window", EditRequest::new().window(100, 400).transition(99)),
        (
            "many_windows_dup2",
            (1..20)
                .fold(EditRequest::new(), |r, i| {
                    r.window(i * 120 - 10, i * 120 + 60).transition(i * 120 - 1)
                })
                .duplication_count(2),
        ),
    ];

    for (name, request) in &requests {
        group.bench_with_input(BenchmarkId::from_parameter(name), request, |b, request| {
            b.iter(|| transform(black_box(&data), &avi, request))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_transform);
criterion_main!(benches);
