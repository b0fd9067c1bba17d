use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use img_sweep::scanner::{list_dir, scan, MatchMode, ScanOptions};
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

/// A flat directory of small assets plus one index file referencing every
/// second asset.
fn build_tree(files: usize) -> TempDir {
    let temp = TempDir::new().unwrap();

    for i in 0..files {
        File::create(temp.path().join(format!("asset{:03}.png", i)))
            .unwrap()
            .write_all(b"0123456789")
            .unwrap();
    }

    let mut html = String::new();
    for i in (0..files).step_by(2) {
        html.push_str(&format!("<img src=\"asset{:03}.png\">\n", i));
    }
    File::create(temp.path().join("index.html"))
        .unwrap()
        .write_all(html.as_bytes())
        .unwrap();

    temp
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for &size in &[16usize, 64, 256] {
        let temp = build_tree(size);
        let names = list_dir(temp.path()).unwrap();

        for mode in [MatchMode::Pattern, MatchMode::Literal] {
            let options = ScanOptions::new(&[], mode);
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", mode), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        let mut candidates = names.clone();
                        scan(black_box(&mut candidates), temp.path(), &options).unwrap();
                        candidates.len()
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
