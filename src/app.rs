use std::sync::Arc;

use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Wrap};
use tokio::sync::mpsc;
use tracing::debug;

use crate::controller::{ChatController, StoreOutcome, StoreRequest};
use crate::message::Message;
use crate::store::MessageStore;
use crate::tab::Tab;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub controller: ChatController,

    // Input editing
    pub input_cursor: usize, // cursor position in the input buffer, in chars

    // Message list state
    pub list_scroll: u16,
    pub list_height: u16, // Height of list area for scroll calculations
    pub list_width: u16,  // Width of list area for wrap calculations

    // Store requests spawned and not yet reported back
    pub pending: usize,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Areas for mouse hit-testing (updated during render)
    pub tab_areas: Vec<(Tab, Rect)>,
    pub list_area: Option<Rect>,

    store: Arc<dyn MessageStore>,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(store: Arc<dyn MessageStore>, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            controller: ChatController::new(),

            input_cursor: 0,

            list_scroll: 0,
            list_height: 0,
            list_width: 0,

            pending: 0,
            animation_frame: 0,

            tab_areas: Vec::new(),
            list_area: None,

            store,
            events,
        }
    }

    /// Kick off the first load. The app opens on the AI tab, which fetches
    /// on activation.
    pub fn start(&mut self) {
        let tab = self.controller.active_tab();
        let request = self.controller.select_tab(tab);
        self.dispatch(request);
    }

    pub fn active_tab(&self) -> Tab {
        self.controller.active_tab()
    }

    pub fn input(&self) -> &str {
        self.controller.input()
    }

    pub fn messages(&self) -> &[Message] {
        self.controller.messages()
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// Run a store request in the background. Its outcome comes back as
    /// [`AppEvent::Store`] and is applied in arrival order.
    pub fn dispatch(&mut self, request: Option<StoreRequest>) {
        let Some(request) = request else { return };
        debug!(?request, "dispatching store request");

        self.pending += 1;
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = request.run(store.as_ref()).await;
            // The loop may already be gone on quit
            let _ = events.send(AppEvent::Store(outcome));
        });
    }

    pub fn on_store_outcome(&mut self, outcome: StoreOutcome) {
        self.pending = self.pending.saturating_sub(1);
        let listed = matches!(outcome, StoreOutcome::Listed(Ok(_)));

        let follow_up = self.controller.apply(outcome);

        self.input_cursor = self.input_cursor.min(self.input().chars().count());
        if listed {
            self.scroll_list_to_bottom();
        }
        self.dispatch(follow_up);
    }

    // Tabs
    pub fn select_tab(&mut self, tab: Tab) {
        debug!(tab = tab.as_str(), "selected tab");
        if tab != Tab::Ai {
            self.input_mode = InputMode::Normal;
        }
        let request = self.controller.select_tab(tab);
        self.dispatch(request);
    }

    pub fn next_tab(&mut self) {
        self.select_tab(self.active_tab().next());
    }

    pub fn prev_tab(&mut self) {
        self.select_tab(self.active_tab().prev());
    }

    pub fn refresh(&mut self) {
        let request = self.controller.refresh();
        self.dispatch(Some(request));
    }

    pub fn send(&mut self) {
        let request = self.controller.send();
        self.dispatch(request);
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        let mut input = self.input().to_string();
        let byte_pos = char_to_byte_index(&input, self.input_cursor);
        input.insert(byte_pos, c);
        self.controller.on_input_change(input);
        self.input_cursor += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let mut input = self.input().to_string();
            let byte_pos = char_to_byte_index(&input, self.input_cursor);
            input.remove(byte_pos);
            self.controller.on_input_change(input);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        let char_count = self.input().chars().count();
        if self.input_cursor < char_count {
            let mut input = self.input().to_string();
            let byte_pos = char_to_byte_index(&input, self.input_cursor);
            input.remove(byte_pos);
            self.controller.on_input_change(input);
        }
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input().chars().count();
        self.input_cursor = (self.input_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.input().chars().count();
    }

    // Message list scrolling
    pub fn scroll_down(&mut self, lines: u16) {
        let max_scroll = self.total_list_lines().saturating_sub(self.list_height);
        self.list_scroll = self.list_scroll.saturating_add(lines).min(max_scroll);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.list_scroll = self.list_scroll.saturating_sub(lines);
    }

    /// Scroll so the newest message is visible
    pub fn scroll_list_to_bottom(&mut self) {
        let visible_height = if self.list_height > 0 { self.list_height } else { 20 };
        self.list_scroll = self.total_list_lines().saturating_sub(visible_height);
    }

    /// The message list body, one `💬` line per message, wrapped like the widget
    pub fn list_paragraph(&self) -> Paragraph<'static> {
        let lines: Vec<Line<'static>> = self
            .messages()
            .iter()
            .map(|msg| Line::from(format!("💬 {}", msg.text)))
            .collect();
        Paragraph::new(lines).wrap(Wrap { trim: false })
    }

    /// Wrapped line count of the rendered list, in terminal rows
    pub fn total_list_lines(&self) -> u16 {
        // Use actual list width for wrap calculation, default to 50 if not set
        let wrap_width = if self.list_width > 0 { self.list_width } else { 50 };
        let lines = self.list_paragraph().line_count(wrap_width);
        u16::try_from(lines).unwrap_or(u16::MAX)
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
