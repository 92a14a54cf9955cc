//! Script check for user input.
//!
//! The backend only understands Mongolian Cyrillic, so anything else is
//! answered locally without a network round trip.

use regex::Regex;
use std::sync::OnceLock;
use tracing::error;

use crate::error::ValidationError;

/// Characters the backend accepts: Mongolian Cyrillic, digits, whitespace
/// and a fixed punctuation set.
const UNSUPPORTED_CHAR: &str = r#"[^а-яА-ЯөӨүҮёЁ0-9\s.,!?@#$%^&*()_+=<>:;"'{}\[\]\\/-]"#;

fn unsupported_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| match Regex::new(UNSUPPORTED_CHAR) {
        Ok(re) => Some(re),
        Err(e) => {
            error!(error = %e, "script pattern failed to compile");
            None
        }
    })
    .as_ref()
}

/// First character outside the supported set, if any. Without a usable
/// pattern every input is rejected rather than sent unchecked.
pub fn check(text: &str) -> Result<(), ValidationError> {
    let Some(re) = unsupported_re() else {
        return Err(ValidationError {
            offending: text.chars().next().unwrap_or_default(),
        });
    };
    match re.find(text) {
        Some(m) => Err(ValidationError {
            offending: m.as_str().chars().next().unwrap_or_default(),
        }),
        None => Ok(()),
    }
}

/// True when `text` is non-empty and every character is supported.
pub fn validate(text: &str) -> bool {
    !text.is_empty() && check(text).is_ok()
}
