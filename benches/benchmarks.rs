//! Performance benchmarks for the outfit workflow.
//!
//! This module contains benchmarks for the pure parts of a cycle:
//! - Classifier reply decoding (clean, fenced, malformed)
//! - Consistency evaluation
//! - Item name cleanup
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use outfit_workflow::workflow::{decode_or_default, evaluate, first_line};
use outfit_workflow::{Gender, GenderMap};

// ============================================================================
// Fixtures
// ============================================================================

mod fixtures {
    pub const CLEAN: &str = r#"{"head": "male", "torso": "male", "legs": "male"}"#;

    pub const FENCED: &str = "Here you go:\n```json\n{\n  \"head\": \"female\",\n  \"torso\": \"Female\",\n  \"legs\": \"female\"\n}\n```\n";

    pub const MALFORMED: &str = "I'd say the hat is masculine and the rest is neutral.";

    pub const VERBOSE_ITEM: &str =
        "  Wide-brim felt fedora\n\nA classic choice that pairs with almost anything.\nIt works in every season.\n";
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_genders");

    for (name, reply) in [
        ("clean", fixtures::CLEAN),
        ("fenced", fixtures::FENCED),
        ("malformed", fixtures::MALFORMED),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), reply, |b, reply| {
            b.iter(|| decode_or_default(black_box(reply)));
        });
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let maps: Vec<GenderMap> = Gender::ALL
        .iter()
        .flat_map(|head| {
            Gender::ALL.iter().flat_map(move |torso| {
                Gender::ALL.iter().map(move |legs| GenderMap::new(*head, *torso, *legs))
            })
        })
        .collect();

    c.bench_function("evaluate_all_combinations", |b| {
        b.iter(|| {
            for (i, map) in maps.iter().enumerate() {
                black_box(evaluate(*map, black_box(i as u32)));
            }
        });
    });
}

fn bench_first_line(c: &mut Criterion) {
    c.bench_function("first_line", |b| {
        b.iter(|| first_line(black_box(fixtures::VERBOSE_ITEM)));
    });
}

criterion_group!(benches, bench_decode, bench_evaluate, bench_first_line);
criterion_main!(benches);
