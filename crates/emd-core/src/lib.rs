pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod navigator;
pub mod preference;
pub mod replies;
pub mod scheduler;
pub mod state;
pub mod transport;
pub mod validator;
pub mod voice;

// Re-export main types for convenience
pub use config::Config;
pub use controller::ChatController;
pub use error::{ConfigError, PreferenceError, TransportError, ValidationError, VoiceError};
pub use events::ChatEvent;
pub use navigator::{Category, QuickQuestion, QuickReplyNavigator, Selection, BACK};
pub use preference::{PreferenceStore, Theme};
pub use scheduler::{ScheduledTask, Scheduler, TokioScheduler};
pub use state::{Message, Sender, TurnPhase};
pub use transport::{ChatReply, ChatTransport, Hospital, HttpTransport, Medicine, MedicineFilter};
pub use voice::{CommandRecognizer, RecognitionOptions, SpeechRecognizer, VoiceCapture};
