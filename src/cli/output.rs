//! Output formatting for CLI commands.

use std::fmt::Write;

use serde::Serialize;

use crate::cli::args::{CascadeArgs, OutputFormat};
use crate::error::Result;
use crate::intent::arbiter::Intent;
use crate::intent::pattern::PatternMatcher;
use crate::ml::intent_classifier::{MODEL_FORMAT_VERSION, Model, TrainingReport};

/// Result structure for a training run.
#[derive(Debug, Serialize)]
pub struct TrainingSummary {
    pub model_path: String,
    pub model_id: String,
    pub vocabulary_size: usize,
    pub classes: usize,
    pub hidden_size: usize,
    pub epochs: usize,
    pub initial_error: f64,
    pub final_error: f64,
    pub duration_ms: u64,
    pub checkpoints: Vec<(usize, f64)>,
}

impl TrainingSummary {
    pub fn new(model_path: String, model: &Model, report: &TrainingReport) -> Self {
        TrainingSummary {
            model_path,
            model_id: model.metadata().model_id.to_string(),
            vocabulary_size: model.vocabulary().len(),
            classes: model.classes().len(),
            hidden_size: model.hidden_size(),
            epochs: report.epochs(),
            initial_error: report.initial_error().unwrap_or_default(),
            final_error: report.final_error().unwrap_or_default(),
            duration_ms: report.duration.as_millis() as u64,
            checkpoints: report.checkpoints(),
        }
    }
}

/// Result structure for classification. Serialises as the bare intent.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ClassificationResult {
    pub intent: Intent,
}

/// Model metadata and dimensions.
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub path: String,
    pub size_bytes: u64,
    pub format_version: u16,
    pub model_id: String,
    pub trained_at: String,
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vec<String>>,
}

impl ModelInfo {
    pub fn new(path: String, size_bytes: u64, model: &Model, detailed: bool) -> Self {
        let network = model.network();
        ModelInfo {
            path,
            size_bytes,
            format_version: MODEL_FORMAT_VERSION,
            model_id: model.metadata().model_id.to_string(),
            trained_at: model.metadata().trained_at.to_rfc3339(),
            input_size: network.input_size(),
            hidden_size: network.hidden_size(),
            output_size: network.output_size(),
            classes: model.classes().iter().map(str::to_string).collect(),
            vocabulary: detailed.then(|| model.vocabulary().iter().map(str::to_string).collect()),
        }
    }
}

/// One row of the pattern table.
#[derive(Debug, Serialize)]
pub struct PatternEntry {
    pub priority: usize,
    pub action: String,
    pub patterns: Vec<String>,
}

/// The pattern table in priority order.
#[derive(Debug, Serialize)]
pub struct PatternTable {
    pub rules: Vec<PatternEntry>,
}

impl PatternTable {
    pub fn from_matcher(matcher: &PatternMatcher) -> Self {
        let rules = matcher
            .rules()
            .iter()
            .enumerate()
            .map(|(i, rule)| PatternEntry {
                priority: i + 1,
                action: rule.action().to_string(),
                patterns: rule.patterns().map(str::to_string).collect(),
            })
            .collect();
        PatternTable { rules }
    }
}

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn render_human(&self, verbosity: u8) -> String;
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &CascadeArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    if args.output_format == OutputFormat::Human && args.verbosity() > 1 {
        println!("{message}");
        println!();
    }
    print!("{}", render(result, args)?);
    Ok(())
}

/// Render a result without printing it.
pub fn render<T>(result: &T, args: &CascadeArgs) -> Result<String>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => Ok(result.render_human(args.verbosity())),
        OutputFormat::Json => {
            let mut json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            json.push('\n');
            Ok(json)
        }
    }
}

impl HumanOutput for TrainingSummary {
    fn render_human(&self, verbosity: u8) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Training Summary:");
        let _ = writeln!(out, "═════════════════");
        let _ = writeln!(out, "Model: {}", self.model_path);
        let _ = writeln!(out, "Model id: {}", self.model_id);
        let _ = writeln!(
            out,
            "Network: {} → {} → {}",
            self.vocabulary_size, self.hidden_size, self.classes
        );
        let _ = writeln!(out, "Epochs: {}", self.epochs);
        let _ = writeln!(out, "Error: {:.6} → {:.6}", self.initial_error, self.final_error);
        let _ = writeln!(out, "Training time: {}", format_duration(self.duration_ms));

        if verbosity > 1 && !self.checkpoints.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Checkpoints:");
            let _ = writeln!(out, "────────────");
            for (epoch, error) in &self.checkpoints {
                let _ = writeln!(out, "  epoch {epoch:>6}: {error:.6}");
            }
        }
        out
    }
}

impl HumanOutput for ClassificationResult {
    fn render_human(&self, verbosity: u8) -> String {
        let intent = &self.intent;
        let mut out = String::new();
        let _ = writeln!(out, "Action: {}", intent.action());
        let _ = writeln!(out, "Confidence: {:.3}", intent.confidence());
        if verbosity > 1 {
            let _ = writeln!(out, "Source: {}", intent.source().as_str());
            let _ = writeln!(out, "Text: {}", intent.raw_text());
        }
        if !intent.entities().is_empty() {
            let _ = writeln!(out, "Entities:");
            for (name, value) in intent.entities() {
                let _ = writeln!(out, "  {name}: {value}");
            }
        }
        if !intent.is_handled() {
            let _ = writeln!(out, "(no handler for this action)");
        }
        out
    }
}

impl HumanOutput for ModelInfo {
    fn render_human(&self, _verbosity: u8) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Model Information:");
        let _ = writeln!(out, "══════════════════");
        let _ = writeln!(out, "Path: {}", self.path);
        let _ = writeln!(out, "Size: {}", format_bytes(self.size_bytes));
        let _ = writeln!(out, "Format version: {}", self.format_version);
        let _ = writeln!(out, "Model id: {}", self.model_id);
        let _ = writeln!(out, "Trained at: {}", self.trained_at);
        let _ = writeln!(
            out,
            "Layers: {} inputs, {} hidden, {} outputs",
            self.input_size, self.hidden_size, self.output_size
        );
        let _ = writeln!(out, "Classes: {}", self.classes.join(", "));
        if let Some(vocabulary) = &self.vocabulary {
            let _ = writeln!(out, "Vocabulary: {}", vocabulary.join(" "));
        }
        out
    }
}

impl HumanOutput for PatternTable {
    fn render_human(&self, _verbosity: u8) -> String {
        let mut out = String::new();
        for rule in &self.rules {
            let _ = writeln!(out, "{:>2}. {}", rule.priority, rule.action);
            for pattern in &rule.patterns {
                let _ = writeln!(out, "      {pattern}");
            }
        }
        out
    }
}

/// Format bytes in human-readable format.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Format duration in human-readable format.
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) as f64 / 1000.0;
        format!("{minutes}m {seconds:.1}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::arbiter::IntentArbiter;
    use clap::Parser;

    fn args(extra: &[&str]) -> CascadeArgs {
        let mut argv = vec!["intent-cascade"];
        argv.extend_from_slice(extra);
        argv.push("patterns");
        CascadeArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(500), "500ms");
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(65000), "1m 5.0s");
    }

    #[test]
    fn test_classification_json_is_the_intent() {
        let intent = IntentArbiter::default().recognize("open chrome");
        let result = ClassificationResult { intent };

        let json = render(&result, &args(&["--format", "json"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["action"], "open_app");
        assert_eq!(value["entities"]["app_name"], "chrome");
        assert_eq!(value["confidence"], 1.0);
    }

    #[test]
    fn test_classification_human() {
        let intent = IntentArbiter::default().recognize("weather in paris");
        let text = render(&ClassificationResult { intent }, &args(&["-vv"])).unwrap();

        assert!(text.contains("Action: weather"));
        assert!(text.contains("location: paris"));
        assert!(text.contains("Source: pattern"));
    }

    #[test]
    fn test_pattern_table_order() {
        let table = PatternTable::from_matcher(&PatternMatcher::new());
        assert_eq!(table.rules[0].priority, 1);
        assert_eq!(table.rules[0].action, "open_app");
        assert_eq!(table.rules.len(), PatternMatcher::new().len());

        let text = render(&table, &args(&[])).unwrap();
        assert!(text.starts_with(" 1. open_app"));
    }
}
