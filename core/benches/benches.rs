
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use serde_schematic::{SchemaClass, SchemaInstance, Value};
use types::*;

fn randomizer() -> StdRng {
    StdRng::seed_from_u64(0)
}

fn accounts(rng: &mut StdRng, count: usize) -> Vec<Account> {
    (0..count).map(|_| Account::generate(rng)).collect()
}

fn serialize(c: &mut Criterion) {
    let mut rng = randomizer();
    let input = &accounts(&mut rng, 100);
    let source = &serde_schematic::to_value(input).unwrap();
    SchemaClass::<AccountSchema>::of().unwrap();

    c.bench_function("Serialize JSON value", |b| {
        b.iter(|| {
            let _ = serde_json::to_value(black_box(input)).unwrap();
        })
    });
    c.bench_function("Convert to value", |b| {
        b.iter(|| {
            let _ = serde_schematic::to_value(black_box(input)).unwrap();
        })
    });
    c.bench_function("Serialize schema", |b| {
        b.iter(|| {
            let _ = SchemaInstance::new(AccountSchema)
                .source(black_box(source).clone())
                .many(true)
                .into_serialized()
                .unwrap();
        })
    });
    c.bench_function("Serialize schema to JSON", |b| {
        b.iter(|| {
            let instance = SchemaInstance::new(AccountSchema)
                .source_of(black_box(input))
                .unwrap()
                .many(true);
            let _ = serde_json::to_string(instance.serialized().unwrap()).unwrap();
        })
    });
}

fn reconstruct(c: &mut Criterion) {
    let mut rng = randomizer();
    let input = &accounts(&mut rng, 100);
    let data: &Value = &SchemaInstance::new(AccountSchema)
        .source_of(input)
        .unwrap()
        .many(true)
        .into_serialized()
        .unwrap();

    c.bench_function("Deserialize JSON value", |b| {
        let input = &serde_json::to_value(input).unwrap();
        b.iter(|| {
            let _ = serde_json::from_value::<Vec<Account>>(black_box(input).clone()).unwrap();
        })
    });
    c.bench_function("Reconstruct schema", |b| {
        b.iter(|| {
            let instance = SchemaInstance::new(AccountSchema)
                .input(black_box(data).clone())
                .many(true);
            let _ = instance.reconstructed().unwrap();
        })
    });
}

criterion_group!(benches, serialize, reconstruct);
criterion_main!(benches);
