//! Completions delivered back to the controller's owner task.

use tokio::sync::mpsc;

use crate::error::{TransportError, VoiceError};
use crate::navigator::PendingSwitch;
use crate::transport::ChatReply;

pub type EventSender = mpsc::UnboundedSender<ChatEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ChatEvent>;

#[derive(Debug)]
pub enum ChatEvent {
    /// A `/chat` call resolved.
    Reply {
        turn: u64,
        question: String,
        result: Result<ChatReply, TransportError>,
    },
    /// Time to reveal the next character of the trailing bot message.
    RevealTick,
    /// A delayed quick-reply menu change is due.
    SwitchCategory(PendingSwitch),
    /// Speech recognition finished.
    Voice(Result<String, VoiceError>),
}

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
