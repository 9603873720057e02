//! Criterion benchmarks for intent-cascade.
//!
//! Covers the hot paths of a single recognition:
//! - Text analysis and bag-of-words encoding
//! - Network inference
//! - The full cascade for pattern hits, classifier answers and fallbacks

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use intent_cascade::analysis::analyzer::analyzer::Analyzer;
use intent_cascade::analysis::analyzer::intent::IntentAnalyzer;
use intent_cascade::config::EngineConfig;
use intent_cascade::engine::IntentEngine;
use intent_cascade::intent::IntentArbiter;
use intent_cascade::ml::intent_classifier::{Corpus, FeatureBuilder, TrainingConfig, train_model};

/// Utterances that exercise every stage of the cascade.
const UTTERANCES: &[&str] = &[
    "open chrome",
    "weather in paris",
    "move test.txt to documents",
    "remind me to call mom tomorrow at 5pm",
    "hello there",
    "thank you so much",
    "tell me a joke",
    "how are you doing today",
];

fn bench_config() -> TrainingConfig {
    TrainingConfig {
        epochs: 200,
        seed: Some(1),
        ..TrainingConfig::default()
    }
}

/// Benchmark text analysis and feature encoding.
fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");

    let analyzer = IntentAnalyzer::new();
    let builder = FeatureBuilder::default();
    let corpus = Corpus::builtin().unwrap();
    let set = builder.build(&corpus).unwrap();

    group.bench_function("analyze_utterance", |b| {
        b.iter(|| black_box(analyzer.analyze(black_box(UTTERANCES[3])).unwrap().count()))
    });

    group.throughput(Throughput::Elements(UTTERANCES.len() as u64));
    group.bench_function("encode_batch", |b| {
        b.iter(|| {
            for text in UTTERANCES {
                black_box(builder.encode(black_box(text), &set.vocabulary).unwrap());
            }
        })
    });

    group.bench_function("build_training_set", |b| {
        b.iter(|| black_box(builder.build(black_box(&corpus)).unwrap()))
    });

    group.finish();
}

/// Benchmark inference on a trained model.
fn bench_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("inference");

    let builder = FeatureBuilder::default();
    let corpus = Corpus::builtin().unwrap();
    let (model, _) = train_model(&builder, &corpus, &bench_config()).unwrap();

    group.bench_function("predict", |b| {
        b.iter(|| black_box(model.predict(&builder, black_box("hello there")).unwrap()))
    });

    group.bench_function("model_to_bytes", |b| {
        b.iter(|| black_box(model.to_bytes().unwrap()))
    });

    group.finish();
}

/// Benchmark the whole cascade.
fn bench_recognition(c: &mut Criterion) {
    let mut group = c.benchmark_group("recognition");

    let arbiter = IntentArbiter::default();
    group.bench_function("pattern_hit", |b| {
        b.iter(|| black_box(arbiter.recognize(black_box("open chrome"))))
    });
    group.bench_function("pattern_miss_untrained", |b| {
        b.iter(|| black_box(arbiter.recognize(black_box("tell me a joke"))))
    });

    let mut config = EngineConfig::default();
    config.training = bench_config();
    let engine = IntentEngine::new(config).unwrap();
    engine.train(&Corpus::builtin().unwrap()).unwrap();

    group.throughput(Throughput::Elements(UTTERANCES.len() as u64));
    group.bench_function("mixed_batch_trained", |b| {
        b.iter(|| {
            for text in UTTERANCES {
                black_box(engine.recognize(black_box(text)));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_encoding, bench_inference, bench_recognition);
criterion_main!(benches);
