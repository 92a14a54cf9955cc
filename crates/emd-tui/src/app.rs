use ratatui::layout::Rect;
use ratatui::widgets::ListState;

use emd_core::{ChatController, QuickQuestion, Sender, Theme, TurnPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    QuickReplies,
}

pub struct App {
    pub should_quit: bool,
    pub focus: Focus,
    pub controller: ChatController,

    // Input line
    pub input: String,
    pub cursor: usize, // in characters, not bytes

    // Chat view
    pub chat_scroll: u16,
    pub chat_height: u16, // updated during render
    pub chat_width: u16,

    // Quick replies
    pub quick_state: ListState,

    pub theme: Theme,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub quick_area: Option<Rect>,
}

impl App {
    /// `theme_override` applies for this session only and is not persisted.
    pub fn new(controller: ChatController, theme_override: Option<Theme>) -> Self {
        let theme = theme_override.unwrap_or_else(|| controller.theme());
        let mut quick_state = ListState::default();
        quick_state.select(Some(0));

        Self {
            should_quit: false,
            focus: Focus::Input,
            controller,
            input: String::new(),
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            quick_state,
            theme,
            animation_frame: 0,
            chat_area: None,
            quick_area: None,
        }
    }

    pub fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.controller.submit(&text);
    }

    pub fn selected_quick_reply(&self) -> Option<QuickQuestion> {
        let questions = self.controller.navigator().questions();
        self.quick_state
            .selected()
            .and_then(|i| questions.get(i))
            .cloned()
    }

    pub fn select_quick_reply(&mut self) {
        if let Some(question) = self.selected_quick_reply() {
            self.controller.select_quick_reply(&question);
            self.clamp_quick_selection();
        }
    }

    pub fn quick_nav_down(&mut self) {
        let len = self.controller.navigator().questions().len();
        if len > 0 {
            let i = self.quick_state.selected().unwrap_or(0);
            self.quick_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn quick_nav_up(&mut self) {
        let i = self.quick_state.selected().unwrap_or(0);
        self.quick_state.select(Some(i.saturating_sub(1)));
    }

    /// Flip whatever is on screen, including a one-shot `--dark`/`--light`,
    /// and persist the result.
    pub fn toggle_theme(&mut self) {
        self.theme = self.controller.set_theme(self.theme.toggled());
    }

    pub fn start_voice(&mut self) {
        self.controller.start_voice();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.controller.phase() == TurnPhase::Sending {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max = self.total_chat_lines().saturating_sub(self.visible_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    /// Keep derived view state in step with the controller after any event.
    pub fn sync(&mut self) {
        if self.controller.take_scroll_request() {
            self.scroll_chat_to_bottom();
        }
        self.clamp_quick_selection();
    }

    fn clamp_quick_selection(&mut self) {
        let len = self.controller.navigator().questions().len();
        match self.quick_state.selected() {
            _ if len == 0 => self.quick_state.select(None),
            Some(i) if i < len => {}
            _ => self.quick_state.select(Some(0)),
        }
    }

    fn wrap_width(&self) -> u16 {
        // Default to 50 until the first render has measured the panel
        if self.chat_width > 0 {
            self.chat_width
        } else {
            50
        }
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Rendered row count of the thread at the current chat width.
    pub fn total_chat_lines(&self) -> u16 {
        crate::ui::chat_line_count(self, self.wrap_width())
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.total_chat_lines().saturating_sub(self.visible_height());
    }

    pub fn sender_label(sender: Sender) -> &'static str {
        match sender {
            Sender::User => "Та",
            Sender::Bot => "ЭМД бот",
        }
    }
}
