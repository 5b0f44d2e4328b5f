//! Benchmarks for palette context derivation and context snapshots.
//!
//! Run with: cargo bench -p framestate-entropy

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use framestate_core::AllocBudget;
use framestate_entropy::{resolve_context, ContextSlot, EntropyContextStore};

fn bench_palette_block(c: &mut Criterion) {
    // 64x64 block with a diagonal 8-color pattern
    let size = 64;
    let map: Vec<u8> = (0..size * size)
        .map(|i| (((i / size) + (i % size)) % 8) as u8)
        .collect();

    c.bench_function("palette_context_64x64", |bencher| {
        bencher.iter(|| {
            let mut sum = 0;
            for row in 0..size {
                for col in 0..size {
                    if row == 0 && col == 0 {
                        continue;
                    }
                    sum += resolve_context(black_box(&map), size, row, col, 8).context;
                }
            }
            sum
        });
    });
}

fn bench_context_snapshots(c: &mut Criterion) {
    let mut store = EntropyContextStore::new(8, 128, &AllocBudget::default()).unwrap();

    c.bench_function("entropy_reset_to_defaults", |bencher| {
        bencher.iter(|| store.reset_to_defaults());
    });

    c.bench_function("entropy_fan_out_8_slots", |bencher| {
        bencher.iter(|| store.fan_out_to_all_slots());
    });

    c.bench_function("entropy_load_slot", |bencher| {
        bencher.iter(|| store.load_working_from(black_box(ContextSlot::Frame(3))));
    });
}

criterion_group!(benches, bench_palette_block, bench_context_snapshots);
criterion_main!(benches);
