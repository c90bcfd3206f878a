use crate::app::{App, AppResult, InputMode, View};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handles the key events and updates the state of [`App`].
pub fn handle_key_events(key_event: KeyEvent, app: &mut App) -> AppResult<()> {
    if app.settings_open {
        handle_settings_keys(key_event, app);
        return Ok(());
    }
    match app.input_mode {
        InputMode::Normal => match key_event.code {
            // Exit application on `ESC` or `q`
            KeyCode::Esc | KeyCode::Char('q') => app.quit(),
            KeyCode::Char('c') if key_event.modifiers == KeyModifiers::CONTROL => app.quit(),
            KeyCode::Char('i') => app.set_input_mode(InputMode::Editing),
            KeyCode::Char('n') => {
                app.new_chat();
                app.set_input_mode(InputMode::Editing);
            }
            KeyCode::Char('p') => app.toggle_pin_selected(),
            KeyCode::Char('D') => app.clear_chats(),
            KeyCode::Char('s') => app.open_settings(),
            KeyCode::Char('t') => app.toggle_theme(),
            KeyCode::Enter => app.open_selected_chat(),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_chat(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next_chat(),
            KeyCode::PageUp | KeyCode::Char('K') => app.decrement_vertical_scroll(),
            KeyCode::PageDown | KeyCode::Char('J') => app.increment_vertical_scroll(),
            _ => {}
        },
        InputMode::Editing => match key_event.code {
            // Exit editing mode on `ESC`
            KeyCode::Esc => app.set_input_mode(InputMode::Normal),
            KeyCode::Enter => {
                app.submit_input();
            }
            // The input is disabled until the answer arrives.
            _ if app.is_loading() => {}
            // Cursor moves show too, not only edits.
            _ => {
                app.input_textarea.input(key_event);
                app.invalidate(View::Input);
            }
        },
    }
    Ok(())
}

fn handle_settings_keys(key_event: KeyEvent, app: &mut App) {
    match key_event.code {
        KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q') => app.close_settings(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Up | KeyCode::Char('k') => app.settings_previous_row(),
        KeyCode::Down | KeyCode::Char('j') => app.settings_next_row(),
        KeyCode::Left | KeyCode::Char('h') => app.adjust_setting(-1),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => app.adjust_setting(1),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Theme;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_events(KeyEvent::new(code, KeyModifiers::NONE), app).expect("key handled");
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_and_enter_submits_to_new_chat() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "hi there");
        press(&mut app, KeyCode::Enter);

        let submission = app.take_submission().expect("submission queued");
        assert_eq!(submission.question, "hi there");
        assert!(app.is_loading());
    }

    #[test]
    fn typing_schedules_a_redraw() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('n'));
        app.take_redraw();

        press(&mut app, KeyCode::Char('h'));
        app.tick();
        assert!(app.is_dirty(View::Input));
        assert!(app.take_redraw());

        press(&mut app, KeyCode::Backspace);
        assert!(app.take_redraw());
        assert!(app.input_textarea.lines().join("").is_empty());
    }

    #[test]
    fn moving_the_cursor_schedules_a_redraw() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "hi");
        app.take_redraw();

        press(&mut app, KeyCode::Left);
        assert!(app.take_redraw());
        assert_eq!(app.input_textarea.cursor(), (0, 1));
    }

    #[test]
    fn ignored_keys_while_loading_do_not_redraw() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "q1");
        press(&mut app, KeyCode::Enter);
        app.take_redraw();

        type_str(&mut app, "x");
        assert!(!app.is_dirty(View::Input));
    }

    #[test]
    fn keys_are_ignored_while_loading() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "q1");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "more");
        assert!(app.input_textarea.lines().join("").is_empty());
    }

    #[test]
    fn settings_panel_captures_keys() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('s'));
        assert!(app.settings_open);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.store.settings().theme, Theme::Dark);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.settings_open);
        assert!(app.running);
    }

    #[test]
    fn clear_and_quit() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('D'));
        assert!(app.store.chats().is_empty());
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }
}
