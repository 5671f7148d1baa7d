//! Static voice configuration.
//!
//! Two independent selection policies: sentiment-driven (monolingual mode,
//! tone follows the discussion) and language-driven (multilingual mode,
//! one voice per target language). The catalog is built once at startup
//! from built-in defaults merged with config overrides and is read-only
//! afterwards.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use crate::summary::SentimentLabel;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Unsupported target language: {code} (supported: {supported})")]
    UnsupportedLanguage { code: String, supported: String },
}

/// Identifier + speaking style pair consumed by the speech provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoiceSelector {
    pub voice_id: String,
    pub style: String,
}

impl VoiceSelector {
    fn new(voice_id: &str, style: &str) -> Self {
        Self {
            voice_id: voice_id.to_string(),
            style: style.to_string(),
        }
    }
}

/// A language the service can narrate in: display name for the translation
/// prompt plus the voice that speaks it.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageVoice {
    pub name: String,
    pub voice_id: String,
    pub style: String,
}

impl LanguageVoice {
    fn new(name: &str, voice_id: &str, style: &str) -> Self {
        Self {
            name: name.to_string(),
            voice_id: voice_id.to_string(),
            style: style.to_string(),
        }
    }

    pub fn selector(&self) -> VoiceSelector {
        VoiceSelector {
            voice_id: self.voice_id.clone(),
            style: self.style.clone(),
        }
    }
}

fn neutral_voice() -> VoiceSelector {
    VoiceSelector::new("en-IN-aarav", "Conversational")
}

pub struct VoiceCatalog {
    sentiment: HashMap<SentimentLabel, VoiceSelector>,
    language: HashMap<String, LanguageVoice>,
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        let mut sentiment = HashMap::new();
        sentiment.insert(SentimentLabel::Positive, VoiceSelector::new("en-US-natalie", "Cheerful"));
        sentiment.insert(SentimentLabel::Negative, VoiceSelector::new("en-US-terrell", "Sad"));
        sentiment.insert(SentimentLabel::Neutral, neutral_voice());
        // Mixed deliberately shares the Neutral voice
        sentiment.insert(SentimentLabel::Mixed, neutral_voice());

        let mut language = HashMap::new();
        language.insert("en".to_string(), LanguageVoice::new("English", "en-IN-aarav", "Conversational"));
        language.insert("hi".to_string(), LanguageVoice::new("Hindi", "hi-IN-ayushi", "Conversational"));
        language.insert("es".to_string(), LanguageVoice::new("Spanish", "es-ES-elvira", "Conversational"));
        language.insert("fr".to_string(), LanguageVoice::new("French", "fr-FR-adélie", "Conversational"));
        language.insert("de".to_string(), LanguageVoice::new("German", "de-DE-matthias", "Conversational"));

        Self { sentiment, language }
    }
}

impl VoiceCatalog {
    /// Defaults merged with config overrides. Unknown sentiment keys are
    /// logged and skipped rather than failing startup.
    pub fn with_overrides(
        sentiment_overrides: &HashMap<String, VoiceSelector>,
        language_overrides: &HashMap<String, LanguageVoice>,
    ) -> Self {
        let mut catalog = Self::default();

        for (key, voice) in sentiment_overrides {
            match SentimentLabel::parse(key) {
                Some(label) => {
                    catalog.sentiment.insert(label, voice.clone());
                }
                None => warn!(key = %key, "ignoring voice override for unknown sentiment"),
            }
        }
        for (code, voice) in language_overrides {
            catalog.language.insert(code.clone(), voice.clone());
        }

        catalog
    }

    /// Voice for a sentiment label. Total: unknown entries fall back to the
    /// Neutral voice, since sentiment is inferred rather than user-supplied.
    pub fn for_sentiment(&self, label: SentimentLabel) -> VoiceSelector {
        self.sentiment
            .get(&label)
            .or_else(|| self.sentiment.get(&SentimentLabel::Neutral))
            .cloned()
            .unwrap_or_else(neutral_voice)
    }

    /// Voice for a target language. Fallible: the language is user-specified
    /// and must be validated before the pipeline spends any network calls.
    pub fn for_language(&self, code: &str) -> Result<&LanguageVoice, VoiceError> {
        self.language.get(code).ok_or_else(|| {
            let mut supported: Vec<&str> = self.language.keys().map(String::as_str).collect();
            supported.sort_unstable();
            VoiceError::UnsupportedLanguage {
                code: code.to_string(),
                supported: supported.join(", "),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_lookup_covers_all_labels() {
        let catalog = VoiceCatalog::default();
        assert_eq!(catalog.for_sentiment(SentimentLabel::Positive).voice_id, "en-US-natalie");
        assert_eq!(catalog.for_sentiment(SentimentLabel::Negative).voice_id, "en-US-terrell");
        assert_eq!(catalog.for_sentiment(SentimentLabel::Neutral).voice_id, "en-IN-aarav");
    }

    #[test]
    fn test_mixed_aliases_neutral_voice() {
        let catalog = VoiceCatalog::default();
        assert_eq!(
            catalog.for_sentiment(SentimentLabel::Mixed),
            catalog.for_sentiment(SentimentLabel::Neutral)
        );
    }

    #[test]
    fn test_language_lookup() {
        let catalog = VoiceCatalog::default();
        let hindi = catalog.for_language("hi").unwrap();
        assert_eq!(hindi.name, "Hindi");
        assert_eq!(hindi.voice_id, "hi-IN-ayushi");
        assert_eq!(hindi.selector().style, "Conversational");
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        let catalog = VoiceCatalog::default();
        let err = catalog.for_language("xx").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("xx"));
        assert!(message.contains("hi"));
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let mut sentiment_overrides = HashMap::new();
        sentiment_overrides.insert(
            "positive".to_string(),
            VoiceSelector::new("en-UK-ruby", "Promo"),
        );
        let mut language_overrides = HashMap::new();
        language_overrides.insert(
            "it".to_string(),
            LanguageVoice::new("Italian", "it-IT-lorenzo", "Conversational"),
        );

        let catalog = VoiceCatalog::with_overrides(&sentiment_overrides, &language_overrides);
        assert_eq!(catalog.for_sentiment(SentimentLabel::Positive).voice_id, "en-UK-ruby");
        assert_eq!(catalog.for_language("it").unwrap().name, "Italian");
        // untouched defaults survive the merge
        assert!(catalog.for_language("hi").is_ok());
    }

    #[test]
    fn test_unknown_sentiment_override_is_ignored() {
        let mut sentiment_overrides = HashMap::new();
        sentiment_overrides.insert("ecstatic".to_string(), VoiceSelector::new("x", "y"));
        let catalog = VoiceCatalog::with_overrides(&sentiment_overrides, &HashMap::new());
        assert_eq!(catalog.for_sentiment(SentimentLabel::Neutral).voice_id, "en-IN-aarav");
    }
}
