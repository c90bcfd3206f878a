use crate::app::{App, AppResult};
use crate::event::EventHandler;
use crate::ui;
use anyhow::Context;
#[cfg(not(target_os = "windows"))]
use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::Backend;
use ratatui::Terminal;
use std::io;
use std::panic;

/// The chat client's hold on the terminal.
///
/// The screen lives on stderr's alternate buffer, so nothing the client
/// draws is left in the shell's scrollback. Frames are only produced when
/// some view of the [`App`] was invalidated since the last one.
#[derive(Debug)]
pub struct Tui<B: Backend> {
    terminal: Terminal<B>,
    /// Keys, resizes and spinner ticks.
    pub events: EventHandler,
}

impl<B: Backend> Tui<B>
where
    B::Error: Send + Sync + 'static,
{
    pub fn new(terminal: Terminal<B>, events: EventHandler) -> Self {
        Self { terminal, events }
    }

    /// Takes over the terminal: raw mode, alternate screen, hidden cursor.
    ///
    /// Escape is reported as its own key (keyboard enhancement), which the
    /// editing mode needs to tell `Esc` apart from `Alt` chords. The mouse
    /// is left to the terminal so text in the chat can still be selected.
    pub fn init(&mut self) -> AppResult<()> {
        terminal::enable_raw_mode().context("Could not enable raw mode")?;
        enter_screen().context("Could not switch to the alternate screen")?;

        // A panic message printed in raw mode on the alternate screen is lost.
        let panic_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic| {
            if let Err(err) = Self::reset() {
                eprintln!("failed to reset the terminal: {err:#}");
            }
            panic_hook(panic);
        }));

        self.terminal
            .hide_cursor()
            .context("Error when hiding terminal cursor")?;
        self.terminal.clear().context("Could not clear terminal")?;
        tracing::debug!("terminal taken over");
        Ok(())
    }

    /// Draws a frame if the app has invalidated views, returning whether it did.
    pub fn draw(&mut self, app: &mut App) -> AppResult<bool> {
        draw_pending(&mut self.terminal, app)
    }

    fn reset() -> AppResult<()> {
        terminal::disable_raw_mode().context("Failed to disable raw mode")?;
        leave_screen().context("Could not leave the alternate screen")?;
        Ok(())
    }

    /// Stops reading terminal events and hands the terminal back to the shell.
    ///
    /// The event task is aborted first so no read races the restored
    /// cooked mode.
    pub fn exit(&mut self) -> AppResult<()> {
        self.events.stop();
        Self::reset().context("Failed to reset terminal")?;
        self.terminal
            .show_cursor()
            .context("Failed to show cursor")?;
        tracing::debug!("terminal restored");
        Ok(())
    }
}

/// Renders one frame when a redraw is due; invalidations are consumed.
fn draw_pending<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> AppResult<bool>
where
    B::Error: Send + Sync + 'static,
{
    if !app.take_redraw() {
        return Ok(false);
    }
    terminal
        .draw(|frame| ui::render(frame, app))
        .context("Failed to render the user interface")?;
    Ok(true)
}

#[cfg(not(target_os = "windows"))]
fn enter_screen() -> io::Result<()> {
    crossterm::execute!(
        io::stderr(),
        EnterAlternateScreen,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
    )
}

#[cfg(target_os = "windows")]
fn enter_screen() -> io::Result<()> {
    crossterm::execute!(io::stderr(), EnterAlternateScreen)
}

#[cfg(not(target_os = "windows"))]
fn leave_screen() -> io::Result<()> {
    crossterm::execute!(io::stderr(), LeaveAlternateScreen, PopKeyboardEnhancementFlags)
}

#[cfg(target_os = "windows")]
fn leave_screen() -> io::Result<()> {
    crossterm::execute!(io::stderr(), LeaveAlternateScreen)
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::handler::handle_key_events;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_events(KeyEvent::new(code, KeyModifiers::NONE), app).expect("key handled");
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn frames_are_drawn_only_after_invalidation() {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("test terminal");
        let mut app = App::default();

        assert!(draw_pending(&mut terminal, &mut app).expect("first frame"));
        assert!(!draw_pending(&mut terminal, &mut app).expect("idle"));

        app.tick();
        assert!(!draw_pending(&mut terminal, &mut app).expect("idle tick"));
    }

    #[test]
    fn typed_text_reaches_the_screen() {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("test terminal");
        let mut app = App::default();
        press(&mut app, KeyCode::Char('n'));
        draw_pending(&mut terminal, &mut app).expect("frame");

        for c in "zebra".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        app.tick();

        assert!(draw_pending(&mut terminal, &mut app).expect("frame after typing"));
        assert!(screen(&terminal).contains("zebra"));
    }
}
