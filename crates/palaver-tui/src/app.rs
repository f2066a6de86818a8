use palaver_core::{ExchangeController, ExchangeOutcome, Provider};
use ratatui::layout::Rect;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub panel_open: bool,
    pub provider: Provider,
    pub controller: ExchangeController,

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel area for mouse hit-testing (updated during render)
    pub panel_area: Option<Rect>,

    // What the chat view last scrolled for
    seen_revision: u64,
    seen_busy: bool,
}

impl App {
    pub fn new(provider: Provider, controller: ExchangeController) -> Self {
        Self {
            should_quit: false,
            panel_open: true,
            provider,
            controller,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            panel_area: None,
            seen_revision: 0,
            seen_busy: false,
        }
    }

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
        if self.panel_open {
            self.scroll_chat_to_bottom();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.controller.is_busy()
    }

    /// Send the draft. Dropped silently when blank or while waiting on a reply.
    pub fn submit(&mut self) -> bool {
        let accepted = self.controller.submit_draft();
        self.follow_transcript();
        accepted
    }

    /// Called on every tick: advance the animation and pick up a finished reply
    pub fn tick(&mut self) -> Option<ExchangeOutcome> {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        let outcome = self.controller.poll();
        self.follow_transcript();
        outcome
    }

    /// Jump to the newest turn whenever a message lands or the busy state flips
    fn follow_transcript(&mut self) {
        let revision = self.controller.transcript().revision();
        let busy = self.is_busy();
        if revision != self.seen_revision || busy != self.seen_busy {
            self.seen_revision = revision;
            self.seen_busy = busy;
            self.scroll_chat_to_bottom();
        }
    }

    /// Lines the chat view needs at the current wrap width
    pub fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.controller.transcript().iter() {
            total_lines = total_lines.saturating_add(1); // Role line ("You:" or "AI:")
            for line in msg.content().lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 {
                    1
                } else {
                    char_count.div_ceil(wrap_width)
                };
                total_lines = total_lines.saturating_add(wrapped as u16);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.is_busy() {
            total_lines = total_lines.saturating_add(2); // "AI:" + "Thinking..."
        }

        total_lines
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = self.chat_line_count().saturating_sub(visible_height);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max_scroll = self.chat_line_count().saturating_sub(self.chat_height);
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use palaver_core::{ChatOptions, ChatProvider, ProviderReply};
    use std::sync::Arc;

    /// Answers every prompt with the same text, straight away
    pub(crate) struct CannedProvider(pub &'static str);

    #[async_trait]
    impl ChatProvider for CannedProvider {
        async fn chat(&self, _prompt: &str, _options: &ChatOptions) -> Result<ProviderReply> {
            Ok(ProviderReply::Text(self.0.to_string()))
        }
    }

    pub(crate) fn test_app(reply: &'static str) -> App {
        let controller = ExchangeController::new(Arc::new(CannedProvider(reply)), "test-model");
        let mut app = App::new(Provider::Ollama, controller);
        app.chat_width = 20;
        app.chat_height = 4;
        app
    }

    pub(crate) async fn wait_for_reply(app: &mut App) -> Option<ExchangeOutcome> {
        for _ in 0..1000 {
            if let Some(outcome) = app.tick() {
                return Some(outcome);
            }
            tokio::task::yield_now().await;
        }
        None
    }

    #[tokio::test]
    async fn test_tick_settles_reply_and_scrolls() {
        let mut app = test_app("line one\nline two\nline three");
        for c in "hello".chars() {
            app.controller.draft_mut().insert(c);
        }

        assert!(app.submit());
        // "You:", "hello", blank, "AI:", "Thinking..." = 5 lines in a 4 line view
        assert_eq!(app.chat_line_count(), 5);
        assert_eq!(app.chat_scroll, 1);

        assert_eq!(wait_for_reply(&mut app).await, Some(ExchangeOutcome::Fulfilled));
        assert!(!app.is_busy());
        // 3 user lines + "AI:" + 3 reply lines + blank
        assert_eq!(app.chat_line_count(), 8);
        assert_eq!(app.chat_scroll, 4);
    }

    #[tokio::test]
    async fn test_wrapped_lines_are_counted() {
        let mut app = test_app("ñññññññññññññññññññññññññ");
        app.chat_width = 10;
        assert_eq!(app.chat_line_count(), 0);

        app.controller.draft_mut().insert('q');
        app.submit();
        wait_for_reply(&mut app).await;

        // 25 chars at width 10 wrap onto 3 lines
        assert_eq!(app.chat_line_count(), 3 + 1 + 3 + 1);
    }

    #[tokio::test]
    async fn test_manual_scroll_is_clamped() {
        let mut app = test_app("a\nb\nc\nd\ne\nf");
        app.controller.draft_mut().insert('q');
        app.submit();
        wait_for_reply(&mut app).await;

        // 3 user lines + "AI:" + 6 reply lines + blank = 11
        assert_eq!(app.chat_scroll, 7);
        app.scroll_chat_down(10);
        assert_eq!(app.chat_scroll, 7);
        app.scroll_chat_up(3);
        assert_eq!(app.chat_scroll, 4);
        app.scroll_chat_up(10);
        assert_eq!(app.chat_scroll, 0);
    }

    #[test]
    fn test_toggle_panel() {
        let mut app = test_app("unused");
        assert!(app.panel_open);
        app.toggle_panel();
        assert!(!app.panel_open);
        app.toggle_panel();
        assert!(app.panel_open);
    }
}
