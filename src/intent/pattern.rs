//! Ordered regex table mapping utterances to actions.
//!
//! Rules are tried in table order and patterns in rule order. The first
//! pattern that matches anywhere in the text wins, even if a later rule would
//! capture more.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::error::{IntentError, Result};
use crate::intent::action::Action;

/// The built-in table, highest priority first.
pub const DEFAULT_PATTERNS: &[(Action, &[&str])] = &[
    (
        Action::OpenApp,
        &[r"open\s+(\w+)", r"launch\s+(\w+)", r"start\s+(\w+)", r"run\s+(\w+)"],
    ),
    (
        Action::CloseApp,
        &[r"close\s+(\w+)", r"quit\s+(\w+)", r"exit\s+(\w+)", r"stop\s+(\w+)"],
    ),
    (
        Action::OpenWebsite,
        &[
            r"open\s+(https?://\S+)",
            r"go\s+to\s+(\S+\.\S+)",
            r"browse\s+(\S+)",
            r"visit\s+(\S+)",
        ],
    ),
    (
        Action::SearchWeb,
        &[
            r"search\s+(?:for\s+)?(.+)",
            r"google\s+(.+)",
            r"look\s+up\s+(.+)",
            r"find\s+(.+)",
        ],
    ),
    (
        Action::CreateFile,
        &[
            r"create\s+(?:a\s+)?file\s+(?:named\s+)?(.+)",
            r"make\s+(?:a\s+)?file\s+(.+)",
            r"new\s+file\s+(.+)",
        ],
    ),
    (
        Action::CreateFolder,
        &[
            r"create\s+(?:a\s+)?folder\s+(?:named\s+)?(.+)",
            r"make\s+(?:a\s+)?(?:directory|folder)\s+(.+)",
            r"new\s+folder\s+(.+)",
        ],
    ),
    (
        Action::DeleteFile,
        &[
            r"delete\s+(?:the\s+)?file\s+(.+)",
            r"remove\s+(?:the\s+)?file\s+(.+)",
        ],
    ),
    (
        Action::CreateTask,
        &[
            r"create\s+(?:a\s+)?task\s+(.+)",
            r"add\s+(?:a\s+)?task\s+(.+)",
            r"new\s+task\s+(.+)",
            r"remind\s+me\s+to\s+(.+)",
        ],
    ),
    (
        Action::ListTasks,
        &[
            r"(?:show|list|what\s+are)\s+(?:my\s+)?tasks",
            r"what\s+do\s+i\s+need\s+to\s+do",
            r"show\s+(?:my\s+)?to-?do",
        ],
    ),
    (
        Action::CompleteTask,
        &[
            r"complete\s+task\s+(.+)",
            r"mark\s+(.+)\s+as\s+done",
            r"finish\s+task\s+(.+)",
        ],
    ),
    (
        Action::ScheduleEvent,
        &[
            r"schedule\s+(.+)",
            r"add\s+(?:to\s+)?(?:my\s+)?calendar\s+(.+)",
            r"create\s+(?:an\s+)?event\s+(.+)",
        ],
    ),
    (
        Action::SetReminder,
        &[
            r"remind\s+me\s+(?:to\s+)?(.+)",
            r"set\s+(?:a\s+)?reminder\s+(.+)",
        ],
    ),
    (
        Action::CreateNote,
        &[
            r"(?:take|create|make)\s+(?:a\s+)?note\s+(.+)",
            r"note\s+(?:that\s+)?(.+)",
            r"write\s+down\s+(.+)",
        ],
    ),
    (
        Action::SearchNotes,
        &[
            r"find\s+(?:my\s+)?notes?\s+(?:about\s+)?(.+)",
            r"search\s+notes?\s+(?:for\s+)?(.+)",
        ],
    ),
    (
        Action::VolumeControl,
        &[
            r"(?:set\s+)?volume\s+(?:to\s+)?(\d+)",
            r"(?:turn\s+)?volume\s+(up|down)",
            r"(mute|unmute)",
        ],
    ),
    (
        Action::SetBrightness,
        &[
            r"(?:set\s+)?brightness\s+(?:to\s+)?(\d+)",
            r"(?:turn\s+)?brightness\s+(up|down)",
            r"dim\s+(?:the\s+)?screen",
        ],
    ),
    (
        Action::LockPc,
        &[
            r"lock\s+(?:the\s+)?(pc|computer|screen|workstation)",
            r"secure\s+(?:the\s+)?(pc|computer)",
        ],
    ),
    (
        Action::SleepPc,
        &[
            r"(?:put\s+)?(?:the\s+)?(pc|computer)\s+to\s+sleep",
            r"sleep\s+(?:the\s+)?(pc|computer)",
            r"hibernate\s+(?:the\s+)?(pc|computer)",
        ],
    ),
    (
        Action::EmptyBin,
        &[
            r"empty\s+(?:the\s+)?(?:recycle\s+)?bin",
            r"empty\s+trash",
            r"clear\s+(?:recycle\s+)?bin",
        ],
    ),
    (
        Action::CheckBattery,
        &[
            r"(?:check\s+)?battery\s+(?:status|level|percentage)",
            r"how\s+is\s+(?:my\s+)?battery",
            r"how\s+much\s+battery\s+(?:do\s+i\s+have)?",
        ],
    ),
    (
        Action::MediaControl,
        &[r"(play|pause|stop|next|previous)", r"(play|pause)\s+music"],
    ),
    (
        Action::TakeScreenshot,
        &[
            r"take\s+(?:a\s+)?screenshot",
            r"capture\s+(?:the\s+)?screen",
            r"snapshot",
        ],
    ),
    (
        Action::AnalyzeScreen,
        &[
            r"(?:analyze|read|describe)\s+(?:the\s+)?screen",
            r"what\s+is\s+on\s+(?:my\s+)?screen",
            r"what\s+am\s+i\s+looking\s+at",
        ],
    ),
    (
        Action::PlayMediaOnline,
        &[
            r"play\s+(.+)\s+on\s+(youtube|spotify)",
            r"search\s+(?:for\s+)?(.+)\s+on\s+(youtube|spotify)",
        ],
    ),
    (
        Action::Weather,
        &[
            r"weather\s+(?:in\s+)?(.+)",
            r"what\s+is\s+the\s+weather",
            r"is\s+it\s+raining",
        ],
    ),
    (
        Action::Timer,
        &[
            r"set\s+(?:a\s+)?timer\s+(?:for\s+)?(.+)",
            r"timer\s+for\s+(.+)",
        ],
    ),
    (
        Action::Alarm,
        &[
            r"set\s+(?:an\s+)?alarm\s+(?:for\s+)?(.+)",
            r"wake\s+me\s+up\s+(?:at\s+)?(.+)",
        ],
    ),
    (
        Action::FileMove,
        &[r"move\s+(.+)\s+to\s+(.+)", r"transfer\s+(.+)\s+to\s+(.+)"],
    ),
    (
        Action::Download,
        &[r"download\s+(.+)", r"get\s+(.+)\s+from\s+(.+)"],
    ),
];

static DEFAULT_MATCHER: LazyLock<PatternMatcher> = LazyLock::new(|| {
    // The built-in table is covered by tests; it always compiles.
    PatternMatcher::from_table(DEFAULT_PATTERNS).unwrap_or_default()
});

/// Compile one case-insensitive, unanchored pattern.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| IntentError::pattern(format!("Invalid regex pattern {pattern:?}: {e}")))
}

/// An action and the patterns that select it.
#[derive(Debug, Clone)]
pub struct PatternRule {
    action: Action,
    patterns: Vec<Regex>,
}

impl PatternRule {
    pub fn new(action: Action, patterns: &[&str]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(PatternRule { action, patterns })
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Source text of each pattern, in order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}

/// A successful table lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub action: Action,
    /// The pattern that fired.
    pub pattern: String,
    /// Capture groups 1..n; `None` for groups that did not participate.
    pub groups: Vec<Option<String>>,
}

impl PatternMatch {
    /// Capture group `index`, counting from 1 like regex groups.
    pub fn group(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.groups.get(i))
            .and_then(|g| g.as_deref())
    }

    /// Whether the pattern declared any capture groups.
    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// First-hit-wins matcher over an ordered list of rules.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    rules: Vec<PatternRule>,
}

impl PatternMatcher {
    /// The built-in table.
    pub fn new() -> Self {
        DEFAULT_MATCHER.clone()
    }

    /// A matcher over caller-supplied rules, in the given priority order.
    pub fn with_rules(rules: Vec<PatternRule>) -> Self {
        PatternMatcher { rules }
    }

    /// Compile a `(action, patterns)` table.
    pub fn from_table(table: &[(Action, &[&str])]) -> Result<Self> {
        let rules = table
            .iter()
            .map(|(action, patterns)| PatternRule::new(action.clone(), patterns))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_rules(rules))
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the first rule with a pattern occurring in `text`.
    pub fn find(&self, text: &str) -> Option<PatternMatch> {
        for rule in &self.rules {
            for regex in &rule.patterns {
                if let Some(captures) = regex.captures(text) {
                    let groups = captures
                        .iter()
                        .skip(1)
                        .map(|m| m.map(|m| m.as_str().to_string()))
                        .collect();
                    return Some(PatternMatch {
                        action: rule.action.clone(),
                        pattern: regex.as_str().to_string(),
                        groups,
                    });
                }
            }
        }
        None
    }
}
