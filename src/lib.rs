/// Application.
pub mod app;

/// Chats, messages and settings.
pub mod types;

/// State container with change subscriptions.
pub mod store;

/// Answering service client.
pub mod client;

/// Question submission flow.
pub mod submit;

/// Command line options.
pub mod cli;

/// Log file setup.
pub mod logging;

/// Terminal events handler.
pub mod event;

/// Widget renderer.
pub mod ui;

/// Terminal user interface.
pub mod tui;

/// Event handler.
pub mod handler;

/// Sidebar chat list.
pub mod chats;

/// Settings panel choices.
pub mod models;
