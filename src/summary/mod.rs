pub mod sentiment;

pub use sentiment::SentimentLabel;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::model::{ModelError, PromptSet, TextModel};

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summarization failed: {0}")]
    Model(#[from] ModelError),

    #[error("model returned an empty summary")]
    Empty,
}

/// Voice-ready summary text in the requested language.
#[derive(Debug, Clone)]
pub struct SummaryResult {
    pub text: String,
    /// Language code of the text (e.g. "en", "hi")
    pub language: String,
}

/// Summarize the PR bundle into spoken-word prose, translated when
/// `language_code` is not English.
///
/// Fatal on model failure or empty output: without a summary there is
/// nothing to synthesize and nothing useful to return.
#[instrument(skip(model, prompts, bundle_text), fields(language = language_code))]
pub async fn summarize(
    model: &dyn TextModel,
    prompts: &PromptSet,
    bundle_text: &str,
    language_name: &str,
    language_code: &str,
) -> Result<SummaryResult, SummaryError> {
    let prompt = prompts.render_summarize(bundle_text, language_name);
    let raw = model.generate(&prompt).await?;

    // The model is instructed to emit plain prose but is not a trusted
    // formatter; strip residual markup before it reaches the TTS engine.
    let text = strip_markup(&raw);
    if text.trim().is_empty() {
        return Err(SummaryError::Empty);
    }

    debug!(summary_chars = text.len(), "summary ready");
    Ok(SummaryResult {
        text,
        language: language_code.to_string(),
    })
}

/// Remove markdown control characters the TTS engine would read aloud
/// or choke on.
pub fn strip_markup(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '`' | '#'))
        .collect::<String>()
        .trim()
        .to_string()
}
