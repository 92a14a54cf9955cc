//! Message thread controller.
//!
//! Owns the thread and drives each turn: validate, append the user
//! message, call the backend, then reveal the answer one character at a
//! time. All state changes happen on the task that owns the controller;
//! transport completions and timers come back as [`ChatEvent`]s.
//!
//! Submissions made while a turn is still in flight are queued and sent in
//! order once the controller is idle again.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{TransportError, VoiceError};
use crate::events::{self, ChatEvent, EventReceiver, EventSender};
use crate::navigator::{PendingSwitch, QuickQuestion, QuickReplyNavigator, Selection};
use crate::preference::{PreferenceStore, Theme};
use crate::replies;
use crate::scheduler::{ScheduledTask, Scheduler, TokioScheduler};
use crate::state::{Message, TurnPhase};
use crate::transport::{ChatReply, ChatTransport};
use crate::validator;
use crate::voice::VoiceCapture;

/// Bot text currently being typed into `messages[index]`.
struct Reveal {
    index: usize,
    chars: Vec<char>,
    next: usize,
    tick: ScheduledTask,
}

pub struct ChatController {
    transport: Arc<dyn ChatTransport>,
    scheduler: Arc<dyn Scheduler>,
    navigator: QuickReplyNavigator,
    preferences: PreferenceStore,
    voice: VoiceCapture,

    tx: EventSender,
    rx: EventReceiver,

    messages: Vec<Message>,
    phase: TurnPhase,
    loading: bool,
    last_bot_message: String,
    turn: u64,

    queued: VecDeque<String>,
    reveals: VecDeque<String>,
    reveal: Option<Reveal>,
    /// Generation of the switch the timer will deliver, and the timer.
    pending_switch: Option<(u64, ScheduledTask)>,
    scroll_requested: bool,

    typing_interval: Duration,
    switch_delay: Duration,
}

impl ChatController {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        preferences: PreferenceStore,
        voice: VoiceCapture,
        config: &Config,
    ) -> Self {
        Self::with_scheduler(transport, Arc::new(TokioScheduler), preferences, voice, config)
    }

    pub fn with_scheduler(
        transport: Arc<dyn ChatTransport>,
        scheduler: Arc<dyn Scheduler>,
        mut preferences: PreferenceStore,
        voice: VoiceCapture,
        config: &Config,
    ) -> Self {
        let (tx, rx) = events::channel();
        let dark_mode = preferences.load();
        debug!(dark_mode, "display preference loaded");

        Self {
            transport,
            scheduler,
            navigator: QuickReplyNavigator::new(),
            preferences,
            voice,
            tx,
            rx,
            messages: vec![Message::bot(replies::WELCOME)],
            phase: TurnPhase::Idle,
            loading: false,
            last_bot_message: String::new(),
            turn: 0,
            queued: VecDeque::new(),
            reveals: VecDeque::new(),
            reveal: None,
            pending_switch: None,
            scroll_requested: true,
            typing_interval: config.typing_interval(),
            switch_delay: config.category_switch_delay(),
        }
    }

    // Accessors

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn navigator(&self) -> &QuickReplyNavigator {
        &self.navigator
    }

    pub fn theme(&self) -> Theme {
        self.preferences.theme()
    }

    pub fn last_bot_message(&self) -> &str {
        &self.last_bot_message
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_listening(&self) -> bool {
        self.voice.is_active()
    }

    pub fn has_pending_switch(&self) -> bool {
        self.pending_switch.is_some()
    }

    /// No turn in flight and nothing being typed.
    pub fn is_idle(&self) -> bool {
        self.phase == TurnPhase::Idle && self.reveal.is_none() && self.reveals.is_empty()
    }

    /// Idle with no queued submissions either.
    pub fn is_settled(&self) -> bool {
        self.is_idle() && self.queued.is_empty()
    }

    /// True once after any change the view should follow to the bottom.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    // User actions

    /// Send typed (or recognized) text. Blank input is ignored.
    pub fn submit(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        if !self.is_idle() {
            debug!(queued = self.queued.len() + 1, "turn in progress, queueing submission");
            self.queued.push_back(text.to_string());
            return;
        }

        self.dispatch(text.to_string());
    }

    pub fn select_quick_reply(&mut self, question: &QuickQuestion) {
        match self.navigator.select(question) {
            Selection::Back => {
                self.cancel_pending_switch();
                debug!("quick replies back to main");
            }
            Selection::Send { text, switch } => {
                self.submit(&text);
                if let Some(switch) = switch {
                    self.cancel_pending_switch();
                    let task = self.scheduler.schedule(
                        self.switch_delay,
                        self.tx.clone(),
                        ChatEvent::SwitchCategory(switch),
                    );
                    self.pending_switch = Some((switch.generation, task));
                }
            }
        }
    }

    pub fn start_voice(&mut self) {
        match self.voice.start_capture(self.tx.clone()) {
            Ok(true) => {
                info!("voice capture started");
                self.enqueue_reveal(replies::VOICE_ACTIVE.to_string());
            }
            Ok(false) => {}
            Err(VoiceError::CapabilityUnavailable) => {
                self.enqueue_reveal(replies::VOICE_UNAVAILABLE.to_string());
            }
            Err(e) => {
                warn!(error = %e, "voice capture failed to start");
                self.enqueue_reveal(replies::VOICE_ERROR.to_string());
            }
        }
    }

    /// Flip and persist the display preference.
    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme().toggled())
    }

    /// Persist `theme` as the display preference. A failed write is logged
    /// and the theme still applies for this session.
    pub fn set_theme(&mut self, theme: Theme) -> Theme {
        match self.preferences.set(theme == Theme::Dark) {
            Ok(theme) => theme,
            Err(e) => {
                warn!(error = %e, "could not persist display preference");
                self.preferences.theme()
            }
        }
    }

    // Event loop

    /// Wait for the next completion. Never returns `None` while the
    /// controller is alive since it holds a sender.
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        self.rx.recv().await
    }

    pub async fn step(&mut self) {
        if let Some(event) = self.next_event().await {
            self.handle(event);
        }
    }

    /// Process events until every submitted turn has finished rendering.
    pub async fn run_until_settled(&mut self) {
        while !self.is_settled() {
            self.step().await;
        }
    }

    pub fn handle(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Reply {
                turn,
                question,
                result,
            } => self.on_reply(turn, question, result),
            ChatEvent::RevealTick => self.on_reveal_tick(),
            ChatEvent::SwitchCategory(switch) => self.on_switch(switch),
            ChatEvent::Voice(result) => self.on_voice(result),
        }
    }

    // Turn lifecycle

    fn dispatch(&mut self, text: String) {
        if let Err(e) = validator::check(&text) {
            debug!(error = %e, "rejecting input outside supported script");
            self.push(Message::user(text));
            self.enqueue_reveal(replies::CYRILLIC_ONLY.to_string());
            return;
        }

        self.push(Message::user(text.clone()));
        self.loading = true;
        self.phase = TurnPhase::Sending;
        self.turn += 1;

        info!(turn = self.turn, "sending chat message");
        let transport = Arc::clone(&self.transport);
        let tx = self.tx.clone();
        let turn = self.turn;
        tokio::spawn(async move {
            let result = transport.send_message(&text).await;
            let _ = tx.send(ChatEvent::Reply {
                turn,
                question: text,
                result,
            });
        });
    }

    fn on_reply(&mut self, turn: u64, question: String, result: Result<ChatReply, TransportError>) {
        if turn != self.turn || self.phase != TurnPhase::Sending {
            warn!(turn, current = self.turn, "dropping stale reply");
            return;
        }

        let text = match result {
            Ok(reply) => reply.text,
            Err(e) => {
                warn!(turn, error = %e, "chat request failed");
                self.report_unanswered(question);
                self.loading = false;
                self.phase = TurnPhase::Rendering;
                self.enqueue_reveal(replies::for_transport_error(&e));
                self.finish_turn_if_rendered();
                return;
            }
        };

        let answer = match text {
            None => {
                warn!(turn, "reply without text field");
                replies::NO_REPLY.to_string()
            }
            Some(text) if text.trim().is_empty() => {
                warn!(turn, "empty reply, using fallback");
                self.report_unanswered(question);
                replies::FALLBACK.to_string()
            }
            Some(text) => text,
        };

        if answer == self.last_bot_message {
            warn!(turn, "duplicate bot reply suppressed");
            self.loading = false;
            self.phase = TurnPhase::Idle;
            self.pump_queue();
            return;
        }

        debug!(turn, chars = answer.chars().count(), "rendering reply");
        self.last_bot_message = answer.clone();
        self.phase = TurnPhase::Rendering;
        self.enqueue_reveal(answer);
        self.finish_turn_if_rendered();
    }

    /// Fire-and-forget; failures are only logged.
    fn report_unanswered(&self, question: String) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            if let Err(e) = transport.report_unanswered(&question).await {
                warn!(error = %e, "could not save unanswered question");
            }
        });
    }

    fn finish_turn_if_rendered(&mut self) {
        if self.phase == TurnPhase::Rendering && self.reveal.is_none() && self.reveals.is_empty() {
            self.loading = false;
            self.phase = TurnPhase::Idle;
        }
        self.pump_queue();
    }

    fn pump_queue(&mut self) {
        while self.is_idle() {
            let Some(text) = self.queued.pop_front() else {
                break;
            };
            self.dispatch(text);
        }
    }

    // Typewriter

    fn enqueue_reveal(&mut self, text: String) {
        if text.trim().is_empty() || text == "-" {
            return;
        }
        self.reveals.push_back(text);
        if self.reveal.is_none() {
            self.start_next_reveal();
        }
    }

    fn start_next_reveal(&mut self) {
        let Some(text) = self.reveals.pop_front() else {
            return;
        };
        self.push(Message::bot(String::new()));
        self.reveal = Some(Reveal {
            index: self.messages.len() - 1,
            chars: text.chars().collect(),
            next: 0,
            tick: ScheduledTask::detached(),
        });
        // First character shows right away
        self.on_reveal_tick();
    }

    fn on_reveal_tick(&mut self) {
        let Some(reveal) = self.reveal.as_mut() else {
            return;
        };

        if let Some(c) = reveal.chars.get(reveal.next) {
            self.messages[reveal.index].text.push(*c);
            reveal.next += 1;
            self.scroll_requested = true;
        }

        if reveal.next < reveal.chars.len() {
            reveal.tick = self.scheduler.schedule(
                self.typing_interval,
                self.tx.clone(),
                ChatEvent::RevealTick,
            );
            return;
        }

        self.reveal = None;
        if self.reveals.is_empty() {
            self.finish_turn_if_rendered();
        } else {
            self.start_next_reveal();
        }
    }

    // Navigation and voice

    fn on_switch(&mut self, switch: PendingSwitch) {
        if matches!(self.pending_switch, Some((generation, _)) if generation == switch.generation) {
            self.pending_switch = None;
        }
        if self.navigator.apply(switch) {
            debug!(category = switch.category.as_str(), "quick replies switched");
        } else {
            debug!(category = switch.category.as_str(), "superseded category switch dropped");
        }
    }

    fn cancel_pending_switch(&mut self) {
        if let Some((_, task)) = self.pending_switch.take() {
            task.cancel();
        }
    }

    fn on_voice(&mut self, result: Result<String, VoiceError>) {
        self.voice.finish();
        match result {
            Ok(transcript) => {
                info!("voice transcript received");
                self.submit(&transcript);
            }
            Err(e) => {
                warn!(error = %e, "voice recognition error");
                self.enqueue_reveal(replies::VOICE_ERROR.to_string());
            }
        }
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.scroll_requested = true;
    }
}
