use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use towdesk_charges::{ChargeSheet, InvoiceId, ItemId, PersistedItem, derive_totals};
use towdesk_core::{EntityId, TaxRate};

fn persisted_items(count: usize) -> Vec<PersistedItem> {
    (0..count)
        .map(|i| PersistedItem {
            id: ItemId::new(format!("item-{i}")),
            description: format!("Charge {i}"),
            quantity: (i as i64 % 9) + 1,
            price: 1_000 + (i as i64 * 25),
            extended: None,
        })
        .collect()
}

fn synced_sheet(items: &[PersistedItem]) -> ChargeSheet {
    let mut sheet = ChargeSheet::new(
        InvoiceId::new(EntityId::new()),
        "towing",
        TaxRate::from_percent(8.25),
    );
    sheet.sync_persisted(items);
    sheet
}

fn bench_totals_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("totals_derivation");
    for size in [10usize, 100, 1_000] {
        let sheet = synced_sheet(&persisted_items(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &sheet, |b, sheet| {
            b.iter(|| {
                derive_totals(
                    black_box(sheet.rows()),
                    black_box(1_500),
                    TaxRate::from_percent(8.25),
                )
            });
        });
    }
    group.finish();
}

fn bench_resynchronize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resynchronize");
    for size in [10usize, 100, 1_000] {
        let items = persisted_items(size);
        let sheet = synced_sheet(&items);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(sheet, items),
            |b, (sheet, items)| {
                b.iter_batched(
                    || sheet.clone(),
                    |mut sheet| {
                        sheet.sync_persisted(black_box(items));
                        sheet
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_totals_derivation, bench_resynchronize);
criterion_main!(benches);
