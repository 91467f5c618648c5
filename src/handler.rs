use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key)?,
        AppEvent::Resize(_, _) => app.scroll_to_bottom(),
        AppEvent::Tick => app.on_tick().await,
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global: Ctrl+C quits from anywhere
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    match app.screen {
        Screen::Cover => handle_cover_key(app, key),
        Screen::Chat => handle_chat_key(app, key)?,
    }
    Ok(())
}

fn handle_cover_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.enter_chat(),
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            // Flip the audio-playback preference
            KeyCode::Char('t') => app.toggle_tts(),
            // Full reset: clear transcript, back to Idle, re-seed greeting
            KeyCode::Char('r') => app.reset_chat(),
            _ => {}
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Up => {
            app.chat_scroll = app.chat_scroll.saturating_sub(1);
        }
        KeyCode::Down => {
            app.chat_scroll = app.chat_scroll.saturating_add(1);
        }
        KeyCode::PageUp => {
            app.chat_scroll = app.chat_scroll.saturating_sub(app.chat_height.max(1));
        }
        KeyCode::PageDown => {
            app.chat_scroll = app.chat_scroll.saturating_add(app.chat_height.max(1));
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_on_cover_enters_chat() {
        let mut app = App::new(Config::new());
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Enter)))
            .await
            .unwrap();
        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(app.transcript.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_respects_cursor_position() {
        let mut app = App::new(Config::new());
        app.enter_chat();

        for c in "helo".chars() {
            handle_event(&mut app, AppEvent::Key(key(KeyCode::Char(c))))
                .await
                .unwrap();
        }
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Left)))
            .await
            .unwrap();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('l'))))
            .await
            .unwrap();

        assert_eq!(app.input, "hello");
        assert_eq!(app.input_cursor, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backspace_is_utf8_safe() {
        let mut app = App::new(Config::new());
        app.enter_chat();
        app.input = "héllo".to_string();
        app.input_cursor = 2;

        handle_event(&mut app, AppEvent::Key(key(KeyCode::Backspace)))
            .await
            .unwrap();
        assert_eq!(app.input, "hllo");
        assert_eq!(app.input_cursor, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_c_quits() {
        let mut app = App::new(Config::new());
        handle_event(&mut app, AppEvent::Key(ctrl('c')))
            .await
            .unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_t_flips_tts_even_when_config_unwritable() {
        // Point the config dir at a plain file so saving cannot succeed
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        std::env::set_var("XDG_CONFIG_HOME", &blocker);

        let mut app = App::new(Config::new());
        app.enter_chat();
        let original = app.tts_enabled;

        handle_event(&mut app, AppEvent::Key(ctrl('t')))
            .await
            .unwrap();
        assert_eq!(app.tts_enabled, !original);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_r_resets_chat() {
        let mut app = App::new(Config::new());
        app.enter_chat();
        app.input = "half-typed".to_string();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Enter)))
            .await
            .unwrap();
        handle_event(&mut app, AppEvent::Key(ctrl('r')))
            .await
            .unwrap();
        assert_eq!(app.transcript.len(), 1);
    }
}
