//! Parameter extraction for recognised intents.
//!
//! Two modes:
//!
//! - **structured**: a pattern matched, so parameters come from its capture
//!   groups ([`EntityExtractor::structured`]);
//! - **heuristic**: the classifier picked the action, so parameters are
//!   scraped from the text ([`EntityExtractor::heuristic`]).
//!
//! Neither mode fails. Anything that cannot be found is left out.

use std::sync::LazyLock;

use regex::Regex;

use crate::intent::action::{Action, ActionParams, Entities, EntityValue, LevelChange, SleepMode};
use crate::intent::pattern::{PatternMatch, compile_pattern};

const DATETIME_PATTERNS: &[&str] = &[
    r"(?:at\s+)?(\d{1,2}:\d{2}(?:\s*[ap]m)?)",
    r"(?:on\s+)?(\w+day)",
    r"(?:in\s+)?(\d+)\s+(minute|hour|day)s?",
    r"(tomorrow|today|tonight)",
];

/// Level used for a bare "dim" request.
pub const DIM_LEVEL: i64 = 30;

struct Scanners {
    datetime: Vec<Regex>,
    minutes: Regex,
    location: Regex,
    file_move: Regex,
    number: Regex,
}

static SCANNERS: LazyLock<Option<Scanners>> = LazyLock::new(|| {
    Some(Scanners {
        datetime: DATETIME_PATTERNS
            .iter()
            .map(|p| compile_pattern(p).ok())
            .collect::<Option<Vec<_>>>()?,
        minutes: compile_pattern(r"(\d+)\s*min").ok()?,
        location: compile_pattern(r"\bin\s+([a-z\s]+)").ok()?,
        file_move: compile_pattern(r"move\s+(.+)\s+to\s+(.+)").ok()?,
        number: compile_pattern(r"(\d+)").ok()?,
    })
});

fn first_group(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Lowercased alphanumeric words of `text`.
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn has_word(text: &str, candidates: &[&str]) -> bool {
    words(text).any(|w| candidates.contains(&w.as_str()))
}

/// Parse digits as a level, saturating instead of overflowing.
fn parse_level(digits: &str) -> Option<LevelChange> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(LevelChange::set(digits.parse::<i64>().unwrap_or(i64::MAX)))
}

fn level_or_keyword(group: &str) -> Option<LevelChange> {
    parse_level(group).or_else(|| LevelChange::from_keyword(&group.to_lowercase()))
}

/// First date or time expression in `text`, as written.
pub fn extract_datetime(text: &str) -> Option<String> {
    let scanners = SCANNERS.as_ref()?;
    scanners
        .datetime
        .iter()
        .find_map(|regex| first_group(regex, text))
}

/// Whether `text` talks about volume.
pub fn has_volume_evidence(text: &str) -> bool {
    let text = text.to_lowercase();
    ["volume", "turn it", "louder", "quieter"]
        .iter()
        .any(|cue| text.contains(cue))
}

/// Map a classifier label to an action, folding `complex_media` into
/// `volume_control` when the text is about volume.
pub fn resolve_label(label: &str, text: &str) -> Action {
    match Action::from_label(label) {
        Action::ComplexMedia if has_volume_evidence(text) => Action::VolumeControl,
        action => action,
    }
}

/// Extracts [`ActionParams`] for both recognition paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        EntityExtractor
    }

    /// Parameters from the capture groups of a table hit.
    pub fn structured(&self, hit: &PatternMatch, text: &str) -> ActionParams {
        let g1 = || hit.group(1).map(str::to_string);
        let g2 = || hit.group(2).map(str::to_string);
        let trimmed = |i: usize| hit.group(i).and_then(non_empty);

        match &hit.action {
            Action::OpenApp | Action::CloseApp => ActionParams::App { app_name: g1() },
            Action::OpenWebsite => ActionParams::Website {
                url: hit.group(1).map(normalize_url),
            },
            Action::SearchWeb => ActionParams::Query { query: g1() },
            Action::CreateFile | Action::CreateFolder | Action::DeleteFile => {
                ActionParams::FileName { name: g1() }
            }
            Action::CreateTask | Action::CompleteTask => ActionParams::Task {
                task_name: g1(),
                due_date: extract_datetime(text),
            },
            Action::ScheduleEvent => ActionParams::Event {
                event_name: g1(),
                datetime: extract_datetime(text),
            },
            Action::SetReminder => ActionParams::Reminder {
                reminder_text: g1(),
                datetime: extract_datetime(text),
            },
            Action::CreateNote | Action::SearchNotes => ActionParams::Note { content: g1() },
            Action::VolumeControl => ActionParams::Level(hit.group(1).and_then(level_or_keyword)),
            Action::SetBrightness => {
                let change = if text.to_lowercase().contains("dim") {
                    Some(LevelChange::set(DIM_LEVEL))
                } else {
                    hit.group(1).and_then(level_or_keyword)
                };
                ActionParams::Level(change)
            }
            Action::SleepPc => ActionParams::Sleep(SleepMode::detect(text)),
            Action::AnalyzeScreen => ActionParams::Query {
                query: Some(text.to_string()),
            },
            Action::MediaControl => ActionParams::Media { action: g1() },
            Action::PlayMediaOnline => ActionParams::OnlineMedia {
                content: g1(),
                platform: g2(),
            },
            Action::Weather => ActionParams::Weather { location: trimmed(1) },
            Action::Timer | Action::Alarm => ActionParams::Schedule {
                datetime: extract_datetime(text),
                duration: None,
            },
            Action::FileMove => ActionParams::FileMove {
                source: trimmed(1),
                destination: trimmed(2),
            },
            Action::Download => ActionParams::Download { url: g1() },
            Action::Query => ActionParams::Query {
                query: if hit.has_groups() {
                    g1()
                } else {
                    Some(text.to_string())
                },
            },
            Action::ListTasks
            | Action::LockPc
            | Action::EmptyBin
            | Action::CheckBattery
            | Action::TakeScreenshot
            | Action::ComplexMedia
            | Action::Custom(_) => ActionParams::None,
        }
    }

    /// Parameters scraped from text for a classifier-chosen action.
    pub fn heuristic(&self, action: &Action, text: &str) -> ActionParams {
        let Some(scanners) = SCANNERS.as_ref() else {
            return ActionParams::None;
        };

        match action {
            Action::Timer | Action::Alarm => ActionParams::Schedule {
                datetime: extract_datetime(text),
                duration: first_group(&scanners.minutes, text).and_then(|m| m.parse().ok()),
            },
            Action::Weather => ActionParams::Weather {
                location: first_group(&scanners.location, text).and_then(|l| non_empty(&l)),
            },
            Action::FileMove => match scanners.file_move.captures(text) {
                Some(c) => ActionParams::FileMove {
                    source: c.get(1).and_then(|m| non_empty(m.as_str())),
                    destination: c.get(2).and_then(|m| non_empty(m.as_str())),
                },
                None => ActionParams::FileMove {
                    source: None,
                    destination: None,
                },
            },
            Action::VolumeControl => ActionParams::Level(if has_word(text, &["up", "louder"]) {
                Some(LevelChange::Up)
            } else if has_word(text, &["down", "quieter"]) {
                Some(LevelChange::Down)
            } else if has_word(text, &["unmute"]) {
                Some(LevelChange::Unmute)
            } else if has_word(text, &["mute"]) {
                Some(LevelChange::Mute)
            } else {
                None
            }),
            Action::SetBrightness => ActionParams::Level(if has_word(text, &["dim"]) {
                Some(LevelChange::set(DIM_LEVEL))
            } else if let Some(level) =
                first_group(&scanners.number, text).and_then(|n| parse_level(&n))
            {
                Some(level)
            } else if has_word(text, &["up"]) {
                Some(LevelChange::Up)
            } else if has_word(text, &["down"]) {
                Some(LevelChange::Down)
            } else {
                None
            }),
            Action::SleepPc => ActionParams::Sleep(SleepMode::detect(text)),
            Action::CreateTask | Action::CompleteTask => ActionParams::Task {
                task_name: None,
                due_date: extract_datetime(text),
            },
            Action::ScheduleEvent => ActionParams::Event {
                event_name: None,
                datetime: extract_datetime(text),
            },
            Action::SetReminder => ActionParams::Reminder {
                reminder_text: None,
                datetime: extract_datetime(text),
            },
            _ => ActionParams::None,
        }
    }

    /// Heuristic parameters flattened, with the raw text added as `query`.
    pub fn heuristic_entities(&self, action: &Action, text: &str) -> (ActionParams, Entities) {
        let params = self.heuristic(action, text);
        let mut entities = params.to_entities();
        entities.insert("query".to_string(), EntityValue::Text(text.to_string()));
        (params, entities)
    }
}

/// Prefix `https://` unless the URL already names a scheme starting with `http`.
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}
