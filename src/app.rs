use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use ratatui::{
    style::{Color, Modifier, Style},
    widgets::Block,
};
use ratatui_textarea::TextArea;
use tokio_util::sync::CancellationToken;

use crate::chats::ChatList;
use crate::client::{AskError, ServiceStatus};
use crate::models::{step_temperature, ModelList, SettingsRow};
use crate::store::{Slice, Store};
use crate::submit::{Reply, Submission};
use crate::types::{ChatId, NewMessage, Settings, SettingsPatch};

/// Application result type.
pub type AppResult<T> = anyhow::Result<T>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Parts of the screen that can be redrawn on their own account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Root,
    Sidebar,
    ChatArea,
    Input,
    Settings,
}

impl View {
    /// Store slices each view renders.
    pub fn slices(self) -> &'static [Slice] {
        match self {
            View::Root => &[Slice::Theme],
            View::Sidebar => &[Slice::Chats, Slice::ActiveChat],
            View::ChatArea => &[Slice::Chats, Slice::ActiveChat],
            View::Input => &[],
            View::Settings => &[Slice::Settings, Slice::Theme],
        }
    }
}

const VIEWS: [View; 5] = [
    View::Root,
    View::Sidebar,
    View::ChatArea,
    View::Input,
    View::Settings,
];

/// Views waiting for a redraw, shared with the store subscriptions.
#[derive(Clone, Debug, Default)]
pub struct DirtyViews(Rc<RefCell<HashSet<View>>>);

impl DirtyViews {
    pub fn mark(&self, view: View) {
        self.0.borrow_mut().insert(view);
    }

    pub fn is_dirty(&self, view: View) -> bool {
        self.0.borrow().contains(&view)
    }

    /// Clears the set, returning whether anything was in it.
    pub fn take_any(&self) -> bool {
        let mut views = self.0.borrow_mut();
        let any = !views.is_empty();
        views.clear();
        any
    }
}

/// What the status line says about the answering service.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ServiceHealth {
    #[default]
    Unknown,
    Ready,
    NotReady(String),
    Unreachable(String),
}

/// The submission whose reply is still outstanding.
#[derive(Debug)]
struct InFlight {
    chat_id: ChatId,
    cancel: CancellationToken,
}

/// App holds the state of the application
pub struct App<'a> {
    /// Chats, active selection and settings
    pub store: Store,
    /// Input text area
    pub input_textarea: TextArea<'a>,
    /// Whether keys go to the input or to the navigation bindings
    pub input_mode: InputMode,
    /// Sidebar rows and cursor
    pub chat_list: ChatList,
    /// Models listed in the settings panel
    pub model_list: ModelList,
    /// Is the settings panel shown?
    pub settings_open: bool,
    /// Highlighted row of the settings panel
    pub settings_row: SettingsRow,
    /// Vertical scroll of the message view
    pub vertical_scroll: usize,
    /// Largest scroll the last drawn message view allowed
    scroll_limit: usize,
    /// Keep the newest message in view on the next draw
    follow_bottom: bool,
    /// Last service status probe
    pub service_health: ServiceHealth,
    /// Last rejected settings change
    pub notice: Option<String>,
    /// Spinner frame counter
    pub spinner_tick: usize,
    /// Is the application running?
    pub running: bool,
    loading: bool,
    in_flight: Option<InFlight>,
    pending: Option<Submission>,
    dirty: DirtyViews,
}

fn styled_input_textarea(loading: bool) -> TextArea<'static> {
    let mut input_textarea = TextArea::default();
    if loading {
        input_textarea.set_block(Block::bordered().title("Waiting for the answer..."));
        input_textarea.set_style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
        );
    } else {
        input_textarea.set_block(Block::bordered().title("Ask a question"));
        input_textarea.set_style(Style::default().fg(Color::Yellow));
    }
    input_textarea
}

impl Default for App<'_> {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl App<'_> {
    pub fn new(settings: Settings) -> Self {
        let mut store = Store::new(settings);
        let dirty = DirtyViews::default();
        for view in VIEWS.into_iter().filter(|v| !v.slices().is_empty()) {
            let dirty = dirty.clone();
            store.subscribe(view.slices(), move |_, _| dirty.mark(view));
        }
        let mut model_list = ModelList::default();
        model_list.select_name(&store.settings().ai_model);
        // First frame draws everything.
        VIEWS.into_iter().for_each(|view| dirty.mark(view));

        Self {
            store,
            input_textarea: styled_input_textarea(false),
            input_mode: InputMode::Normal,
            chat_list: ChatList::default(),
            model_list,
            settings_open: false,
            settings_row: SettingsRow::default(),
            vertical_scroll: 0,
            scroll_limit: 0,
            follow_bottom: true,
            service_health: ServiceHealth::default(),
            notice: None,
            spinner_tick: 0,
            running: true,
            loading: false,
            in_flight: None,
            pending: None,
            dirty,
        }
    }

    /// Handles the tick event of the terminal.
    pub fn tick(&mut self) {
        if self.loading {
            self.spinner_tick = self.spinner_tick.wrapping_add(1);
            self.dirty.mark(View::ChatArea);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_dirty(&self, view: View) -> bool {
        self.dirty.is_dirty(view)
    }

    pub fn invalidate(&self, view: View) {
        self.dirty.mark(view);
    }

    /// Whether a redraw is due; clears the pending invalidations.
    pub fn take_redraw(&mut self) -> bool {
        self.dirty.take_any()
    }

    pub fn set_input_mode(&mut self, new_input_mode: InputMode) {
        self.input_mode = new_input_mode;
        self.dirty.mark(View::Input);
    }

    pub fn scroll_limit(&self) -> usize {
        self.scroll_limit
    }

    /// Records the size of the message view as last laid out.
    ///
    /// `content_lines` counts rows after wrapping. The scroll is clamped to
    /// the new limit, or moved onto it while following the newest message.
    pub fn fit_scroll(&mut self, content_lines: usize, pane_height: usize) {
        self.scroll_limit = content_lines.saturating_sub(pane_height);
        if self.follow_bottom || self.vertical_scroll > self.scroll_limit {
            self.vertical_scroll = self.scroll_limit;
        }
    }

    pub fn increment_vertical_scroll(&mut self) {
        if self.vertical_scroll < self.scroll_limit {
            self.vertical_scroll += 1;
            self.dirty.mark(View::ChatArea);
        }
        self.follow_bottom = self.vertical_scroll >= self.scroll_limit;
    }

    pub fn decrement_vertical_scroll(&mut self) {
        if self.vertical_scroll > 0 {
            self.vertical_scroll -= 1;
            self.follow_bottom = false;
            self.dirty.mark(View::ChatArea);
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.dirty.mark(View::ChatArea);
    }

    pub fn new_chat(&mut self) -> ChatId {
        self.cancel_in_flight();
        let id = self.store.add_chat();
        self.chat_list.sync(self.store.chats());
        self.chat_list.select_chat(id);
        self.vertical_scroll = 0;
        self.scroll_to_bottom();
        id
    }

    /// Makes `id` the active chat, cancelling a request made from another one.
    pub fn select_chat(&mut self, id: ChatId) {
        if self.in_flight.as_ref().is_some_and(|f| f.chat_id != id) {
            self.cancel_in_flight();
        }
        if self.store.active_chat_id() != Some(id) {
            self.vertical_scroll = 0;
            self.scroll_to_bottom();
        }
        self.store.set_active_chat(id);
        self.chat_list.select_chat(id);
    }

    pub fn open_selected_chat(&mut self) {
        if let Some(id) = self.chat_list.selected_id() {
            self.select_chat(id);
        }
    }

    pub fn select_next_chat(&mut self) {
        self.chat_list.next();
        self.dirty.mark(View::Sidebar);
    }

    pub fn select_previous_chat(&mut self) {
        self.chat_list.previous();
        self.dirty.mark(View::Sidebar);
    }

    pub fn toggle_pin_selected(&mut self) {
        if let Some(id) = self.chat_list.selected_id() {
            self.store.toggle_pin(id);
            self.chat_list.sync(self.store.chats());
        }
    }

    pub fn clear_chats(&mut self) {
        self.cancel_in_flight();
        self.store.clear_chats();
        self.chat_list.sync(self.store.chats());
        self.vertical_scroll = 0;
        self.scroll_to_bottom();
    }

    pub fn toggle_theme(&mut self) {
        self.store.toggle_theme();
    }

    /// Applies a settings change, keeping the rejection for the status line.
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        match self.store.update_settings(patch) {
            Ok(()) => {
                self.notice = None;
                self.model_list.select_name(&self.store.settings().ai_model);
            }
            Err(err) => {
                tracing::warn!(error = %err, "settings change rejected");
                self.notice = Some(err.to_string());
            }
        }
        self.dirty.mark(View::Root);
    }

    pub fn open_settings(&mut self) {
        self.settings_open = true;
        self.settings_row = SettingsRow::default();
        self.dirty.mark(View::Settings);
    }

    pub fn close_settings(&mut self) {
        self.settings_open = false;
        self.dirty.mark(View::Root);
    }

    pub fn settings_next_row(&mut self) {
        self.settings_row = self.settings_row.next();
        self.dirty.mark(View::Settings);
    }

    pub fn settings_previous_row(&mut self) {
        self.settings_row = self.settings_row.previous();
        self.dirty.mark(View::Settings);
    }

    /// Changes the highlighted setting by `steps` control steps.
    pub fn adjust_setting(&mut self, steps: i32) {
        match self.settings_row {
            SettingsRow::Theme => self.toggle_theme(),
            SettingsRow::Model => {
                if let Some(model) = self.model_list.cycle(steps) {
                    let patch = SettingsPatch::ai_model(model.name.clone());
                    self.update_settings(patch);
                }
            }
            SettingsRow::Temperature => {
                let temperature = step_temperature(self.store.settings().temperature, steps);
                self.update_settings(SettingsPatch::temperature(temperature));
            }
        }
    }

    /// Turns the input into a user message and queues its submission.
    ///
    /// Returns `false` without touching anything when a request is already
    /// in flight, the input is blank or no chat is active.
    pub fn submit_input(&mut self) -> bool {
        if self.loading {
            return false;
        }
        let text = self.input_textarea.lines().join("\n");
        let question = text.trim();
        if question.is_empty() {
            return false;
        }
        let Some(chat_id) = self.store.active_chat_id() else {
            return false;
        };
        let question = question.to_string();

        self.store
            .add_message(chat_id, NewMessage::user(question.clone()));
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight {
            chat_id,
            cancel: cancel.clone(),
        });
        self.pending = Some(Submission::new(chat_id, question, cancel));
        self.scroll_to_bottom();
        self.set_loading(true);
        true
    }

    /// Hands out the submission queued by [`App::submit_input`].
    pub fn take_submission(&mut self) -> Option<Submission> {
        self.pending.take()
    }

    /// Appends the assistant message for `reply` and re-enables the input.
    pub fn receive_reply(&mut self, reply: Reply) {
        if let Err(err) = &reply.outcome {
            tracing::error!(chat_id = %reply.chat_id, error = %err, "question failed");
        }
        let content = reply.content();
        if self
            .store
            .add_message(reply.chat_id, NewMessage::assistant(content))
            .is_some()
        {
            tracing::info!(chat_id = %reply.chat_id, "answer appended");
            if self.store.active_chat_id() == Some(reply.chat_id) {
                self.scroll_to_bottom();
            }
        }
        self.in_flight = None;
        self.set_loading(false);
    }

    pub fn set_service_status(&mut self, status: Result<ServiceStatus, AskError>) {
        self.service_health = match status {
            Ok(report) if report.is_ready() => ServiceHealth::Ready,
            Ok(report) => ServiceHealth::NotReady(report.message),
            Err(err) => ServiceHealth::Unreachable(err.to_string()),
        };
        tracing::info!(health = ?self.service_health, "service status");
        self.dirty.mark(View::Root);
    }

    /// Cancels the outstanding request, if any. Its reply still arrives.
    pub fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = &self.in_flight {
            if !in_flight.cancel.is_cancelled() {
                tracing::info!(chat_id = %in_flight.chat_id, "cancelling request");
                in_flight.cancel.cancel();
            }
        }
        // A submission that was never spawned has nothing to wait for.
        if let Some(submission) = self.pending.take() {
            self.receive_reply(Reply {
                chat_id: submission.chat_id,
                outcome: Err(AskError::Cancelled),
            });
        }
    }

    pub fn quit(&mut self) {
        self.cancel_in_flight();
        self.running = false;
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.input_textarea = styled_input_textarea(loading);
        self.dirty.mark(View::ChatArea);
        self.dirty.mark(View::Input);
    }
}
