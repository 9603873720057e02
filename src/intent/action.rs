//! Actions and their typed parameters.
//!
//! [`Action`] is the closed set of things downstream automation knows how to
//! do, plus [`Action::Custom`] for classifier labels outside that set.
//! [`ActionParams`] carries the extracted arguments for each action family
//! and flattens into the string-keyed [`Entities`] map of the wire format.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Extracted parameters keyed by name, in sorted order.
pub type Entities = BTreeMap<String, EntityValue>;

/// One extracted parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityValue {
    Number(i64),
    Text(String),
}

impl EntityValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EntityValue::Text(s) => Some(s),
            EntityValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            EntityValue::Number(n) => Some(*n),
            EntityValue::Text(_) => None,
        }
    }
}

impl From<String> for EntityValue {
    fn from(value: String) -> Self {
        EntityValue::Text(value)
    }
}

impl From<&str> for EntityValue {
    fn from(value: &str) -> Self {
        EntityValue::Text(value.to_string())
    }
}

impl From<i64> for EntityValue {
    fn from(value: i64) -> Self {
        EntityValue::Number(value)
    }
}

impl fmt::Display for EntityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityValue::Number(n) => write!(f, "{n}"),
            EntityValue::Text(s) => write!(f, "{s}"),
        }
    }
}

macro_rules! actions {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// What the user asked for.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum Action {
            $($variant,)*
            /// A classifier label with no built-in meaning.
            Custom(String),
        }

        impl Action {
            /// Every built-in action.
            pub const BUILTIN: &'static [Action] = &[$(Action::$variant,)*];

            /// Stable wire name.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Action::$variant => $name,)*
                    Action::Custom(label) => label.as_str(),
                }
            }

            /// Map a label to an action. Unknown labels become [`Action::Custom`].
            pub fn from_label(label: &str) -> Action {
                match label {
                    $($name => Action::$variant,)*
                    other => Action::Custom(other.to_string()),
                }
            }
        }
    };
}

actions! {
    OpenApp => "open_app",
    CloseApp => "close_app",
    OpenWebsite => "open_website",
    SearchWeb => "search_web",
    CreateFile => "create_file",
    CreateFolder => "create_folder",
    DeleteFile => "delete_file",
    CreateTask => "create_task",
    ListTasks => "list_tasks",
    CompleteTask => "complete_task",
    ScheduleEvent => "schedule_event",
    SetReminder => "set_reminder",
    CreateNote => "create_note",
    SearchNotes => "search_notes",
    VolumeControl => "volume_control",
    SetBrightness => "set_brightness",
    LockPc => "lock_pc",
    SleepPc => "sleep_pc",
    EmptyBin => "empty_bin",
    CheckBattery => "check_battery",
    MediaControl => "media_control",
    TakeScreenshot => "take_screenshot",
    AnalyzeScreen => "analyze_screen",
    PlayMediaOnline => "play_media_online",
    Weather => "weather",
    Timer => "timer",
    Alarm => "alarm",
    FileMove => "file_move",
    Download => "download",
    ComplexMedia => "complex_media",
    Query => "query",
}

impl Action {
    pub fn is_custom(&self) -> bool {
        matches!(self, Action::Custom(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Action::from_label(s))
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Action::from_label(&label))
    }
}

/// Volume or brightness change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelChange {
    /// Absolute level, 0 to 100.
    Set(u8),
    Up,
    Down,
    Mute,
    Unmute,
}

impl LevelChange {
    /// Absolute level, clamped to 0..=100.
    pub fn set(level: i64) -> Self {
        LevelChange::Set(level.clamp(0, 100) as u8)
    }

    /// Parse a relative keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "up" => Some(LevelChange::Up),
            "down" => Some(LevelChange::Down),
            "mute" => Some(LevelChange::Mute),
            "unmute" => Some(LevelChange::Unmute),
            _ => None,
        }
    }

    fn keyword(&self) -> Option<&'static str> {
        match self {
            LevelChange::Set(_) => None,
            LevelChange::Up => Some("up"),
            LevelChange::Down => Some("down"),
            LevelChange::Mute => Some("mute"),
            LevelChange::Unmute => Some("unmute"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepMode {
    Suspend,
    Hibernate,
}

impl SleepMode {
    pub fn detect(text: &str) -> Self {
        if text.to_lowercase().contains("hibernate") {
            SleepMode::Hibernate
        } else {
            SleepMode::Suspend
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SleepMode::Suspend => "suspend",
            SleepMode::Hibernate => "hibernate",
        }
    }
}

/// Typed arguments of an intent, one variant per action family.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionParams {
    #[default]
    None,
    App {
        app_name: Option<String>,
    },
    Website {
        url: Option<String>,
    },
    Query {
        query: Option<String>,
    },
    FileName {
        name: Option<String>,
    },
    Task {
        task_name: Option<String>,
        due_date: Option<String>,
    },
    Event {
        event_name: Option<String>,
        datetime: Option<String>,
    },
    Reminder {
        reminder_text: Option<String>,
        datetime: Option<String>,
    },
    Note {
        content: Option<String>,
    },
    Level(Option<LevelChange>),
    Sleep(SleepMode),
    Media {
        action: Option<String>,
    },
    OnlineMedia {
        content: Option<String>,
        platform: Option<String>,
    },
    Weather {
        location: Option<String>,
    },
    Schedule {
        datetime: Option<String>,
        duration: Option<i64>,
    },
    FileMove {
        source: Option<String>,
        destination: Option<String>,
    },
    Download {
        url: Option<String>,
    },
}

fn put(entities: &mut Entities, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        entities.insert(key.to_string(), EntityValue::Text(value.clone()));
    }
}

impl ActionParams {
    /// Flatten into the wire map. Absent values are omitted.
    pub fn to_entities(&self) -> Entities {
        let mut entities = Entities::new();
        match self {
            ActionParams::None => {}
            ActionParams::App { app_name } => put(&mut entities, "app_name", app_name),
            ActionParams::Website { url } | ActionParams::Download { url } => {
                put(&mut entities, "url", url)
            }
            ActionParams::Query { query } => put(&mut entities, "query", query),
            ActionParams::FileName { name } => put(&mut entities, "name", name),
            ActionParams::Task {
                task_name,
                due_date,
            } => {
                put(&mut entities, "task_name", task_name);
                put(&mut entities, "due_date", due_date);
            }
            ActionParams::Event {
                event_name,
                datetime,
            } => {
                put(&mut entities, "event_name", event_name);
                put(&mut entities, "datetime", datetime);
            }
            ActionParams::Reminder {
                reminder_text,
                datetime,
            } => {
                put(&mut entities, "reminder_text", reminder_text);
                put(&mut entities, "datetime", datetime);
            }
            ActionParams::Note { content } => put(&mut entities, "content", content),
            ActionParams::Level(Some(LevelChange::Set(level))) => {
                entities.insert("level".to_string(), EntityValue::Number(*level as i64));
            }
            ActionParams::Level(change) => {
                if let Some(keyword) = change.and_then(|c| c.keyword()) {
                    entities.insert("action".to_string(), keyword.into());
                }
            }
            ActionParams::Sleep(mode) => {
                entities.insert("mode".to_string(), mode.as_str().into());
            }
            ActionParams::Media { action } => put(&mut entities, "action", action),
            ActionParams::OnlineMedia { content, platform } => {
                put(&mut entities, "content", content);
                put(&mut entities, "platform", platform);
            }
            ActionParams::Weather { location } => put(&mut entities, "location", location),
            ActionParams::Schedule { datetime, duration } => {
                put(&mut entities, "datetime", datetime);
                if let Some(minutes) = duration {
                    entities.insert("duration".to_string(), EntityValue::Number(*minutes));
                }
            }
            ActionParams::FileMove {
                source,
                destination,
            } => {
                put(&mut entities, "source", source);
                put(&mut entities, "destination", destination);
            }
        }
        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_round_trip() {
        for action in Action::BUILTIN {
            assert_eq!(&Action::from_label(action.as_str()), action);
            assert!(!action.is_custom());
        }
        assert_eq!(Action::BUILTIN.len(), 31);
    }

    #[test]
    fn test_unknown_label_is_custom() {
        let action = Action::from_label("greeting");
        assert_eq!(action, Action::Custom("greeting".to_string()));
        assert_eq!(action.as_str(), "greeting");
        assert_eq!("weather".parse::<Action>().unwrap(), Action::Weather);
    }

    #[test]
    fn test_action_serializes_as_name() {
        assert_eq!(
            serde_json::to_string(&Action::OpenApp).unwrap(),
            "\"open_app\""
        );
        let action: Action = serde_json::from_str("\"thanks\"").unwrap();
        assert_eq!(action, Action::Custom("thanks".to_string()));
    }

    #[test]
    fn test_entity_value_untagged() {
        let mut entities = Entities::new();
        entities.insert("level".to_string(), 50.into());
        entities.insert("app_name".to_string(), "chrome".into());

        let json = serde_json::to_string(&entities).unwrap();
        assert_eq!(json, r#"{"app_name":"chrome","level":50}"#);

        let back: Entities = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entities);
    }

    #[test]
    fn test_level_change() {
        assert_eq!(LevelChange::set(150), LevelChange::Set(100));
        assert_eq!(LevelChange::set(-3), LevelChange::Set(0));
        assert_eq!(LevelChange::from_keyword("mute"), Some(LevelChange::Mute));
        assert_eq!(LevelChange::from_keyword("sideways"), None);
    }

    #[test]
    fn test_to_entities_omits_absent_values() {
        let params = ActionParams::Task {
            task_name: Some("buy milk".to_string()),
            due_date: None,
        };
        let entities = params.to_entities();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities["task_name"].as_text(), Some("buy milk"));

        assert!(ActionParams::None.to_entities().is_empty());
        assert!(ActionParams::Level(None).to_entities().is_empty());
    }

    #[test]
    fn test_level_entities() {
        let set = ActionParams::Level(Some(LevelChange::Set(30))).to_entities();
        assert_eq!(set["level"].as_number(), Some(30));

        let up = ActionParams::Level(Some(LevelChange::Up)).to_entities();
        assert_eq!(up["action"].as_text(), Some("up"));

        let sleep = ActionParams::Sleep(SleepMode::detect("Hibernate the PC")).to_entities();
        assert_eq!(sleep["mode"].as_text(), Some("hibernate"));
    }
}
