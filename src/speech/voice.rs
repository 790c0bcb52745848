//! Voices offered by the speech device and default voice selection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Display name, also used to look up a configured voice.
    pub name: String,
    /// BCP-47 language tag, e.g. `en-US`.
    pub lang: String,
    /// Whether the device marks this as its default voice.
    pub is_default: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>, is_default: bool) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            is_default,
        }
    }

    fn is_english(&self) -> bool {
        self.lang.to_ascii_lowercase().starts_with("en")
    }
}

/// Pick the voice to narrate with.
///
/// A voice named `preferred` wins when present; otherwise the first English
/// default voice, then the first English voice, then the first voice.
pub fn select_default_voice(voices: &[Voice], preferred: Option<&str>) -> Option<Voice> {
    preferred
        .and_then(|name| voices.iter().find(|v| v.name == name))
        .or_else(|| voices.iter().find(|v| v.is_english() && v.is_default))
        .or_else(|| voices.iter().find(|v| v.is_english()))
        .or_else(|| voices.first())
        .cloned()
}
