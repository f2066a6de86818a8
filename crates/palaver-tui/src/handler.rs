use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => app.scroll_chat_to_bottom(),
        AppEvent::Tick => {
            app.tick();
        }
    }
}

fn is_panel_toggle(key: &KeyEvent) -> bool {
    key.code == KeyCode::F(2)
        || (key.code == KeyCode::Char(' ') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work whether or not the panel is open
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    if is_panel_toggle(&key) {
        app.toggle_panel();
        return;
    }

    if app.panel_open {
        handle_panel_key(app, key);
    } else {
        match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Enter | KeyCode::Char('i') => app.toggle_panel(),
            _ => {}
        }
    }
}

fn handle_panel_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.toggle_panel(),
        KeyCode::Enter => {
            app.submit();
        }
        KeyCode::PageUp => {
            let page = app.chat_height.max(1);
            app.scroll_chat_up(page);
        }
        KeyCode::PageDown => {
            let page = app.chat_height.max(1);
            app.scroll_chat_down(page);
        }
        // The input is disabled while a reply is outstanding
        _ if app.is_busy() => {}
        KeyCode::Backspace => app.controller.draft_mut().backspace(),
        KeyCode::Delete => app.controller.draft_mut().delete(),
        KeyCode::Left => app.controller.draft_mut().move_left(),
        KeyCode::Right => app.controller.draft_mut().move_right(),
        KeyCode::Home => app.controller.draft_mut().move_home(),
        KeyCode::End => app.controller.draft_mut().move_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.controller.draft_mut().insert(c);
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_panel = app.panel_open
        && app
            .panel_area
            .map(|r| point_in_rect(mouse.column, mouse.row, r))
            .unwrap_or(false);
    if !in_panel {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_chat_down(3),
        MouseEventKind::ScrollUp => app.scroll_chat_up(3),
        _ => {}
    }
}
