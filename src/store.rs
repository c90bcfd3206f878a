use chrono::Utc;

use crate::types::{Chat, ChatId, MessageId, NewMessage, Settings, SettingsPatch, Theme};

/// Part of the state a mutation touched. Observers subscribe to slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Chats,
    ActiveChat,
    Settings,
    Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("temperature {0} is outside the range [0, 1]")]
    TemperatureOutOfRange(f32),
    #[error("model name must not be empty")]
    EmptyModel,
}

/// Snapshot of everything the views render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub chats: Vec<Chat>,
    pub active_chat: Option<ChatId>,
    pub settings: Settings,
}

type Callback = Box<dyn FnMut(&[Slice], &StoreState)>;

struct Subscriber {
    id: SubscriptionId,
    slices: Vec<Slice>,
    callback: Callback,
}

/// Owner of the chats, the active selection and the settings.
///
/// Every mutation goes through one of the methods below, which notify the
/// subscribers whose slices were touched once the new state is in place.
#[derive(Default)]
pub struct Store {
    state: StoreState,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl Store {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: StoreState {
                settings,
                ..StoreState::default()
            },
            ..Self::default()
        }
    }

    /// Registers `callback` for changes to any of `slices`.
    pub fn subscribe<F>(&mut self, slices: &[Slice], callback: F) -> SubscriptionId
    where
        F: FnMut(&[Slice], &StoreState) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            slices: slices.to_vec(),
            callback: Box::new(callback),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn chats(&self) -> &[Chat] {
        &self.state.chats
    }

    pub fn chat(&self, id: ChatId) -> Option<&Chat> {
        self.state.chats.iter().find(|c| c.id == id)
    }

    pub fn active_chat_id(&self) -> Option<ChatId> {
        self.state.active_chat
    }

    /// The active chat, if the selection points at a chat that exists.
    pub fn active_chat(&self) -> Option<&Chat> {
        self.state.active_chat.and_then(|id| self.chat(id))
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn is_dark(&self) -> bool {
        self.state.settings.theme == Theme::Dark
    }

    /// Creates an empty chat, appends it and makes it the active one.
    pub fn add_chat(&mut self) -> ChatId {
        let chat = Chat::new(Utc::now());
        let id = chat.id;
        self.state.chats.push(chat);
        self.state.active_chat = Some(id);
        tracing::debug!(chat_id = %id, "chat created");
        self.notify(&[Slice::Chats, Slice::ActiveChat]);
        id
    }

    /// Selects `id` without checking that such a chat exists.
    pub fn set_active_chat(&mut self, id: ChatId) {
        self.state.active_chat = Some(id);
        self.notify(&[Slice::ActiveChat]);
    }

    /// Appends a message to the chat `chat_id`. Unknown ids are ignored.
    pub fn add_message(&mut self, chat_id: ChatId, message: NewMessage) -> Option<MessageId> {
        let Some(chat) = self.state.chats.iter_mut().find(|c| c.id == chat_id) else {
            tracing::debug!(chat_id = %chat_id, "message dropped, no such chat");
            return None;
        };
        let now = Utc::now();
        let message = message.stamp(now);
        let id = message.id;
        chat.messages.push(message);
        chat.last_updated = now;
        self.notify(&[Slice::Chats]);
        Some(id)
    }

    /// Flips the pinned flag and returns its new value.
    pub fn toggle_pin(&mut self, chat_id: ChatId) -> Option<bool> {
        let chat = self.state.chats.iter_mut().find(|c| c.id == chat_id)?;
        chat.pinned = !chat.pinned;
        let pinned = chat.pinned;
        self.notify(&[Slice::Chats]);
        Some(pinned)
    }

    pub fn clear_chats(&mut self) {
        let cleared = self.state.chats.len();
        self.state.chats.clear();
        self.state.active_chat = None;
        tracing::info!(cleared, "all chats cleared");
        self.notify(&[Slice::Chats, Slice::ActiveChat]);
    }

    pub fn toggle_theme(&mut self) {
        self.state.settings.theme = self.state.settings.theme.toggled();
        self.notify(&[Slice::Theme, Slice::Settings]);
    }

    /// Merges `patch` into the settings after validating all of it.
    ///
    /// Nothing is applied when any field is rejected.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<(), StoreError> {
        if let Some(temperature) = patch.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err(StoreError::TemperatureOutOfRange(temperature));
            }
        }
        if let Some(model) = &patch.ai_model {
            if model.trim().is_empty() {
                return Err(StoreError::EmptyModel);
            }
        }
        if patch == SettingsPatch::default() {
            return Ok(());
        }

        let settings = &mut self.state.settings;
        let theme_changed = patch.theme.is_some_and(|t| t != settings.theme);
        if let Some(theme) = patch.theme {
            settings.theme = theme;
        }
        if let Some(model) = patch.ai_model {
            settings.ai_model = model;
        }
        if let Some(temperature) = patch.temperature {
            settings.temperature = temperature;
        }

        if theme_changed {
            self.notify(&[Slice::Settings, Slice::Theme]);
        } else {
            self.notify(&[Slice::Settings]);
        }
        Ok(())
    }

    fn notify(&mut self, touched: &[Slice]) {
        let Self {
            state, subscribers, ..
        } = self;
        for subscriber in subscribers.iter_mut() {
            let relevant: Vec<Slice> = touched
                .iter()
                .copied()
                .filter(|slice| subscriber.slices.contains(slice))
                .collect();
            if !relevant.is_empty() {
                (subscriber.callback)(&relevant, state);
            }
        }
    }
}
