use std::fmt;
use tracing::{debug, warn};

use crate::model::{PromptSet, TextModel};

/// Overall tone of a PR discussion. Drives voice selection in monolingual
/// mode; never load-bearing for correctness, so classification failures
/// degrade to [`SentimentLabel::Neutral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
    Mixed,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Mixed => "Mixed",
        }
    }

    /// Map raw model output onto a label. Lenient: the model is asked for a
    /// single word but may quote it, change case, or wrap it in prose, so we
    /// take the first recognizable word. `None` when nothing matches.
    pub fn parse(raw: &str) -> Option<Self> {
        let first_word = raw
            .split_whitespace()
            .next()?
            .trim_matches(|c: char| !c.is_alphabetic());

        match first_word.to_ascii_lowercase().as_str() {
            "positive" => Some(SentimentLabel::Positive),
            "negative" => Some(SentimentLabel::Negative),
            "neutral" => Some(SentimentLabel::Neutral),
            "mixed" => Some(SentimentLabel::Mixed),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the tone of the discussion text.
///
/// Total: every failure path (no comments, model error, unparseable
/// output) lands on Neutral rather than surfacing an error.
pub async fn classify(
    model: &dyn TextModel,
    prompts: &PromptSet,
    comments_text: &str,
) -> SentimentLabel {
    if comments_text.trim().is_empty() {
        debug!("no discussion to classify, defaulting to neutral");
        return SentimentLabel::Neutral;
    }

    let prompt = prompts.render_sentiment(comments_text);
    match model.generate(&prompt).await {
        Ok(raw) => SentimentLabel::parse(&raw).unwrap_or_else(|| {
            debug!(raw = %raw.trim(), "unrecognized sentiment label, defaulting to neutral");
            SentimentLabel::Neutral
        }),
        Err(err) => {
            warn!(error = %err, "sentiment classification failed, defaulting to neutral");
            SentimentLabel::Neutral
        }
    }
}
