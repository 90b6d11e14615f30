use std::hint::black_box;

use arbor_interner::Interner;
use codspeed_criterion_compat::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};

fn identifiers(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("ident_{}", i.wrapping_mul(40_503) % 100_003)).collect()
}

fn benchmark_interner(c: &mut Criterion) {
    let mut group = c.benchmark_group("Interner Benchmark");

    for count in [100, 10_000] {
        let words = identifiers(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("insert", count), &words, |b, words| {
            b.iter(|| {
                let mut interner = Interner::new();
                for word in words {
                    black_box(interner.insert(word));
                }
                interner
            });
        });

        let mut interner = Interner::new();
        for word in &words {
            interner.insert(word);
        }
        group.bench_with_input(BenchmarkId::new("lookup", count), &words, |b, words| {
            b.iter(|| {
                for word in words {
                    black_box(interner.lookup(word));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("insert_delete", count), &words, |b, words| {
            b.iter(|| {
                let mut interner = Interner::new();
                for word in words {
                    interner.insert(word);
                }
                for word in words {
                    interner.delete(word);
                }
                black_box(interner.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_interner);
criterion_main!(benches);
