use std::sync::Arc;

use intent_cascade::config::EngineConfig;
use intent_cascade::engine::IntentEngine;
use intent_cascade::error::Result;
use intent_cascade::intent::{Action, EntityValue, Intent, IntentSource};
use intent_cascade::ml::intent_classifier::Corpus;
use intent_cascade::storage::MemoryStorage;

const CORPUS: &str = include_str!("common_corpus.json");

fn text<'a>(intent: &'a Intent, key: &str) -> Option<&'a str> {
    intent.entity(key).and_then(EntityValue::as_text)
}

fn trained_engine() -> Result<IntentEngine> {
    let mut config = EngineConfig::default();
    config.training.epochs = 400;
    config.training.hidden_size = 8;
    config.training.learning_rate = 0.5;
    config.training.seed = Some(11);

    let engine = IntentEngine::with_storage(config, Arc::new(MemoryStorage::new()))?;
    engine.train(&Corpus::from_json_str(CORPUS)?)?;
    Ok(engine)
}

#[test]
fn test_open_chrome() -> Result<()> {
    let engine = IntentEngine::new(EngineConfig::default())?;
    let intent = engine.recognize("open chrome");

    assert_eq!(intent.action(), &Action::OpenApp);
    assert_eq!(text(&intent, "app_name"), Some("chrome"));
    assert_eq!(intent.confidence(), 1.0);
    Ok(())
}

#[test]
fn test_weather_in_paris() -> Result<()> {
    let engine = IntentEngine::new(EngineConfig::default())?;
    let intent = engine.recognize("Weather in Paris");

    assert_eq!(intent.action(), &Action::Weather);
    assert_eq!(text(&intent, "location"), Some("paris"));
    assert_eq!(intent.raw_text(), "weather in paris");
    Ok(())
}

#[test]
fn test_move_file() -> Result<()> {
    let engine = IntentEngine::new(EngineConfig::default())?;
    let intent = engine.recognize("move test.txt to documents");

    assert_eq!(intent.action(), &Action::FileMove);
    assert_eq!(text(&intent, "source"), Some("test.txt"));
    assert_eq!(text(&intent, "destination"), Some("documents"));
    Ok(())
}

#[test]
fn test_volume_level_is_numeric() -> Result<()> {
    let engine = IntentEngine::new(EngineConfig::default())?;
    let intent = engine.recognize("set volume to 40");

    assert_eq!(intent.action(), &Action::VolumeControl);
    assert_eq!(intent.entity("level"), Some(&EntityValue::Number(40)));

    let json = serde_json::to_value(&intent)?;
    assert_eq!(json["entities"]["level"], 40);
    Ok(())
}

#[test]
fn test_untrained_engine_falls_back() -> Result<()> {
    let engine = IntentEngine::new(EngineConfig::default())?;
    let intent = engine.recognize("tell me a joke");

    assert_eq!(intent.action(), &Action::Query);
    assert_eq!(text(&intent, "query"), Some("tell me a joke"));
    assert_eq!(intent.confidence(), 0.5);
    Ok(())
}

#[test]
fn test_trained_classifier_answers() -> Result<()> {
    let engine = trained_engine()?;

    let intent = engine.recognize("hello friend");
    assert_eq!(intent.action().as_str(), "greeting");
    assert_eq!(intent.source(), IntentSource::Classifier);
    assert!(intent.confidence() > 0.7);
    assert_eq!(text(&intent, "query"), Some("hello friend"));
    assert!(!intent.is_handled());

    let intent = engine.recognize("goodbye");
    assert_eq!(intent.action().as_str(), "goodbye");
    Ok(())
}

#[test]
fn test_pattern_beats_trained_classifier() -> Result<()> {
    let engine = trained_engine()?;
    let intent = engine.recognize("hello, open chrome");

    assert_eq!(intent.action(), &Action::OpenApp);
    assert_eq!(intent.source(), IntentSource::Pattern);
    assert_eq!(intent.confidence(), 1.0);
    Ok(())
}

#[test]
fn test_unknown_words_yield_well_formed_intent() -> Result<()> {
    let engine = trained_engine()?;

    let model = engine.model().expect("trained");
    let prediction = model.predict(engine.classifier().builder(), "zxqv blorp")?;
    assert!(prediction.confidence.is_finite());
    assert!((0.0..=1.0).contains(&prediction.confidence));

    let intent = engine.recognize("zxqv blorp");
    assert!((0.0..=1.0).contains(&intent.confidence()));
    assert_eq!(intent.raw_text(), "zxqv blorp");
    Ok(())
}

#[test]
fn test_confidence_is_bounded() -> Result<()> {
    let engine = trained_engine()?;
    let inputs = [
        "",
        "   ",
        "?!.,",
        "hello",
        "bye bye",
        "open https://example.com",
        "remind me to call mom tomorrow",
        "play lofi beats on youtube",
        "set brightness to 250",
        "put the pc to sleep",
        "what is on my screen",
        "ünïcödé wörds everywhere",
        "1234567890",
    ];

    for input in inputs {
        let intent = engine.recognize(input);
        let confidence = intent.confidence();
        assert!(
            (0.0..=1.0).contains(&confidence),
            "{input:?} gave confidence {confidence}"
        );
    }
    Ok(())
}

#[test]
fn test_strict_threshold() -> Result<()> {
    let mut config = EngineConfig::default();
    config.arbiter.confidence_threshold = 1.0;
    config.training.epochs = 400;
    config.training.hidden_size = 8;
    config.training.learning_rate = 0.5;
    config.training.seed = Some(11);

    let engine = IntentEngine::with_storage(config, Arc::new(MemoryStorage::new()))?;
    engine.train(&Corpus::from_json_str(CORPUS)?)?;

    let intent = engine.recognize("hello friend");
    assert_eq!(intent.action(), &Action::Query);
    assert_eq!(intent.source(), IntentSource::Fallback);
    Ok(())
}
