//! Intent recognition: actions, the pattern table, entity extraction and
//! the arbiter that ties them to a classifier.

pub mod action;
pub mod arbiter;
pub mod entity;
pub mod pattern;

pub use action::{Action, ActionParams, Entities, EntityValue, LevelChange, SleepMode};
pub use arbiter::{ArbiterConfig, Intent, IntentArbiter, IntentSource, PATTERN_CONFIDENCE};
pub use entity::{EntityExtractor, extract_datetime, resolve_label};
pub use pattern::{DEFAULT_PATTERNS, PatternMatch, PatternMatcher, PatternRule};
