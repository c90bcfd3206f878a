use ratatui::widgets::ListState;

use crate::types::{Chat, ChatId};

/// Sidebar rows: pinned chats first, then the rest, each in creation order.
#[derive(Debug, Default)]
pub struct ChatList {
    pub items: Vec<ChatItem>,
    pub state: ListState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatItem {
    pub chat_id: ChatId,
    pub pinned: bool,
}

impl FromIterator<(ChatId, bool)> for ChatList {
    fn from_iter<I: IntoIterator<Item = (ChatId, bool)>>(iter: I) -> Self {
        let mut items: Vec<ChatItem> = iter
            .into_iter()
            .map(|(id, pinned)| ChatItem::new(id, pinned))
            .collect();
        // Stable sort keeps creation order inside each section.
        items.sort_by_key(|item| !item.pinned);
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select_first();
        }
        Self { items, state }
    }
}

impl ChatItem {
    pub fn new(chat_id: ChatId, pinned: bool) -> Self {
        Self { chat_id, pinned }
    }
}

impl ChatList {
    pub fn from_chats(chats: &[Chat]) -> Self {
        chats.iter().map(|c| (c.id, c.pinned)).collect()
    }

    /// Rebuilds the rows from `chats`, keeping the cursor on the same chat.
    pub fn sync(&mut self, chats: &[Chat]) {
        let selected = self.selected_id();
        let mut rebuilt = Self::from_chats(chats);
        if let Some(index) = selected.and_then(|id| rebuilt.position(id)) {
            rebuilt.state.select(Some(index));
        }
        *self = rebuilt;
    }

    pub fn selected_id(&self) -> Option<ChatId> {
        self.state
            .selected()
            .and_then(|i| self.items.get(i))
            .map(|item| item.chat_id)
    }

    pub fn select_chat(&mut self, id: ChatId) {
        if let Some(index) = self.position(id) {
            self.state.select(Some(index));
        }
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let index = match self.state.selected() {
            Some(i) if i + 1 < self.items.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.state.select(Some(index));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let index = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(index));
    }

    pub fn pinned(&self) -> impl Iterator<Item = &ChatItem> {
        self.items.iter().filter(|item| item.pinned)
    }

    pub fn unpinned(&self) -> impl Iterator<Item = &ChatItem> {
        self.items.iter().filter(|item| !item.pinned)
    }

    fn position(&self, id: ChatId) -> Option<usize> {
        self.items.iter().position(|item| item.chat_id == id)
    }
}
