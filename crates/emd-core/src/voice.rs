//! Single-shot speech capture feeding the controller.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::VoiceError;
use crate::events::{ChatEvent, EventSender};

/// How recognition is configured for every capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub lang: String,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            lang: "mn-MN".to_string(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

/// Platform speech-to-text capability.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Listen for one utterance and return its transcript.
    async fn recognize(&self, options: &RecognitionOptions) -> Result<String, VoiceError>;
}

/// Runs an external speech-to-text program and takes the first non-empty
/// line of its stdout as the transcript.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    /// `command[0]` is the program, the rest are its arguments.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn recognize(&self, options: &RecognitionOptions) -> Result<String, VoiceError> {
        debug!(program = %self.program, lang = %options.lang, "starting speech recognition");
        let output = Command::new(&self.program)
            .args(&self.args)
            .env("STT_LANG", &options.lang)
            .env("STT_INTERIM", options.interim_results.to_string())
            .env("STT_MAX_ALTERNATIVES", options.max_alternatives.to_string())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| VoiceError::Recognition(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Recognition(stderr.trim().to_string()));
        }

        parse_transcript(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_transcript(stdout: &str) -> Result<String, VoiceError> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| VoiceError::Recognition("no speech recognized".to_string()))
}

/// Wraps an optional recognizer. At most one capture runs at a time.
pub struct VoiceCapture {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    options: RecognitionOptions,
    active: bool,
}

impl VoiceCapture {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            recognizer: Some(recognizer),
            options: RecognitionOptions::default(),
            active: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            recognizer: None,
            options: RecognitionOptions::default(),
            active: false,
        }
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn options(&self) -> &RecognitionOptions {
        &self.options
    }

    /// Start listening; the result arrives as [`ChatEvent::Voice`].
    /// Returns `Ok(false)` if a capture is already running.
    pub fn start_capture(&mut self, tx: EventSender) -> Result<bool, VoiceError> {
        let recognizer = self
            .recognizer
            .clone()
            .ok_or(VoiceError::CapabilityUnavailable)?;
        if self.active {
            debug!("voice capture already running");
            return Ok(false);
        }

        self.active = true;
        let options = self.options.clone();
        tokio::spawn(async move {
            let result = recognizer.recognize(&options).await;
            if tx.send(ChatEvent::Voice(result)).is_err() {
                warn!("controller gone before voice result");
            }
        });
        Ok(true)
    }

    /// Mark the running capture as done.
    pub fn finish(&mut self) {
        self.active = false;
    }
}
