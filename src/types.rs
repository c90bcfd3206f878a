use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use uuid::Uuid;

/// Title given to every chat when it is created.
pub const NEW_CHAT_TITLE: &str = "New Chat";

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(ChatId);
define_id!(MessageId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of a conversation. Never mutated after it has been appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
}

/// A message as handed to the store, before it gets an id and a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub content: String,
    pub role: Role,
}

impl NewMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::User,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::Assistant,
        }
    }

    pub(crate) fn stamp(self, timestamp: DateTime<Utc>) -> Message {
        Message {
            id: MessageId::new_v4(),
            content: self.content,
            role: self.role,
            timestamp,
        }
    }
}

/// A conversation thread and the messages it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Chat {
    pub id: ChatId,
    pub title: String,
    pub messages: Vec<Message>,
    pub pinned: bool,
    pub last_updated: DateTime<Utc>,
}

impl Chat {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            id: ChatId::new_v4(),
            title: NEW_CHAT_TITLE.to_string(),
            messages: Vec::new(),
            pinned: false,
            last_updated: timestamp,
        }
    }

    /// First question asked in this chat, used as a preview in the sidebar.
    pub fn first_question(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub theme: Theme,
    pub ai_model: String,
    /// Sampling temperature, kept within `[0, 1]` by the store.
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            ai_model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Partial update of [`Settings`]; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub ai_model: Option<String>,
    pub temperature: Option<f32>,
}

impl SettingsPatch {
    pub fn theme(theme: Theme) -> Self {
        Self {
            theme: Some(theme),
            ..Self::default()
        }
    }

    pub fn ai_model(model: impl Into<String>) -> Self {
        Self {
            ai_model: Some(model.into()),
            ..Self::default()
        }
    }

    pub fn temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chat_starts_empty_and_unpinned() {
        let now = Utc::now();
        let chat = Chat::new(now);
        assert_eq!(chat.title, NEW_CHAT_TITLE);
        assert!(chat.messages.is_empty());
        assert!(!chat.pinned);
        assert_eq!(chat.last_updated, now);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(ChatId::new_v4(), ChatId::new_v4());
        assert_ne!(MessageId::new_v4(), MessageId::new_v4());
    }

    #[test]
    fn first_question_skips_assistant_turns() {
        let now = Utc::now();
        let mut chat = Chat::new(now);
        chat.messages.push(NewMessage::assistant("hello").stamp(now));
        chat.messages.push(NewMessage::user("What is aspirin?").stamp(now));
        assert_eq!(chat.first_question(), Some("What is aspirin?"));
    }

    #[test]
    fn theme_toggles_back_and_forth() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Light.toggled().toggled(), Theme::Light);
    }
}
