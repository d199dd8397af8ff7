use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, InputMode};
use crate::tab::Tab;
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::Store(outcome) => app.on_store_outcome(outcome),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Tab switching
        KeyCode::Char('1') => app.select_tab(Tab::Ai),
        KeyCode::Char('2') => app.select_tab(Tab::External),
        KeyCode::Char('3') => app.select_tab(Tab::Community),
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.prev_tab(),

        _ if app.active_tab() != Tab::Ai => {}

        // Everything below only applies to the message list
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            app.cursor_end();
        }
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(app.list_height / 2);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(app.list_height / 2);
        }
        KeyCode::Char('g') => app.list_scroll = 0,
        KeyCode::Char('G') => app.scroll_list_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        // Input stays in editing mode; a failed send leaves the text in place
        KeyCode::Enter => app.send(),
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_list = app.list_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked = app
                .tab_areas
                .iter()
                .find(|(_, rect)| point_in_rect(x, y, *rect))
                .map(|(tab, _)| *tab);
            if let Some(tab) = clicked {
                app.select_tab(tab);
            }
        }
        MouseEventKind::ScrollDown if in_list => app.scroll_down(3),
        MouseEventKind::ScrollUp if in_list => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, MessageStore};
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn click(column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).await.unwrap();
        }
    }

    /// Apply store outcomes until nothing is in flight
    async fn settle(app: &mut App, rx: &mut mpsc::UnboundedReceiver<AppEvent>) {
        while app.pending > 0 {
            let event = rx.recv().await.unwrap();
            handle_event(app, event).await.unwrap();
        }
    }

    fn new_app(store: &MemoryStore) -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store: Arc<dyn MessageStore> = Arc::new(store.clone());
        (App::new(store, tx), rx)
    }

    #[tokio::test]
    async fn test_type_and_send() {
        let store = MemoryStore::new();
        let (mut app, mut rx) = new_app(&store);

        handle_event(&mut app, key(KeyCode::Char('i'))).await.unwrap();
        assert_eq!(app.input_mode, InputMode::Editing);

        type_text(&mut app, "hello").await;
        assert_eq!(app.input(), "hello");

        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        settle(&mut app, &mut rx).await;

        assert_eq!(app.input(), "");
        assert_eq!(app.messages().len(), 1);
        assert_eq!(app.messages()[0].text, "hello");
    }

    #[tokio::test]
    async fn test_enter_on_blank_input_does_nothing() {
        let store = MemoryStore::new();
        let (mut app, _rx) = new_app(&store);

        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        type_text(&mut app, "   ").await;
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.pending, 0);
        assert_eq!(app.input(), "   ");
    }

    #[tokio::test]
    async fn test_failed_send_keeps_typed_text() {
        let store = MemoryStore::new();
        store.set_fail_append(true);
        let (mut app, mut rx) = new_app(&store);

        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        type_text(&mut app, "retry me").await;
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        settle(&mut app, &mut rx).await;

        assert_eq!(app.input(), "retry me");
        assert_eq!(store.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_number_keys_switch_tabs() {
        let store = MemoryStore::new();
        let (mut app, mut rx) = new_app(&store);

        handle_event(&mut app, key(KeyCode::Char('2'))).await.unwrap();
        assert_eq!(app.active_tab(), Tab::External);
        assert_eq!(app.pending, 0);

        handle_event(&mut app, key(KeyCode::Char('1'))).await.unwrap();
        assert_eq!(app.active_tab(), Tab::Ai);
        settle(&mut app, &mut rx).await;
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_placeholder_tab_ignores_editing_keys() {
        let store = MemoryStore::new();
        let (mut app, _rx) = new_app(&store);

        handle_event(&mut app, key(KeyCode::Char('3'))).await.unwrap();
        handle_event(&mut app, key(KeyCode::Char('i'))).await.unwrap();
        handle_event(&mut app, key(KeyCode::Char('r'))).await.unwrap();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_q_types_while_editing() {
        let store = MemoryStore::new();
        let (mut app, _rx) = new_app(&store);

        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        type_text(&mut app, "q").await;
        assert!(!app.should_quit);
        assert_eq!(app.input(), "q");

        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();
        handle_event(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_click_on_tab_bar() {
        let store = MemoryStore::new();
        let (mut app, _rx) = new_app(&store);
        app.tab_areas = vec![
            (Tab::Ai, Rect::new(0, 1, 10, 1)),
            (Tab::External, Rect::new(10, 1, 10, 1)),
            (Tab::Community, Rect::new(20, 1, 10, 1)),
        ];

        handle_event(&mut app, click(25, 1)).await.unwrap();
        assert_eq!(app.active_tab(), Tab::Community);

        handle_event(&mut app, click(25, 5)).await.unwrap();
        assert_eq!(app.active_tab(), Tab::Community);
    }
}
