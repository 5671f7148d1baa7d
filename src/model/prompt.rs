//! Prompt templates with named slots.
//!
//! Templates live in configuration so prompt tuning never requires a code
//! change; the built-in defaults below are used when the config file does
//! not override them. Slots: `{bundle}`, `{language}`, `{terms}`,
//! `{comments}`.

/// Default summarize/translate instruction. Asks for voice-ready prose:
/// the output goes straight to a text-to-speech engine.
const DEFAULT_SUMMARIZE_TEMPLATE: &str = "\
You are preparing a spoken briefing about a GitHub pull request.
Read the pull request content below and describe its purpose, the notable
changes, and any concerns raised by reviewers.
Write plain conversational prose suitable for reading aloud: no markdown,
no bullet points, no code blocks, no headings.
Write the briefing in {language}. If that is not English, keep common
English technical terms such as {terms} in their original English form.

Pull request content:
{bundle}";

/// Default sentiment instruction. Constrained to a single word so the
/// response can be mapped onto the fixed label set.
const DEFAULT_SENTIMENT_TEMPLATE: &str = "\
Classify the overall tone of the following pull request discussion.
Respond with exactly one word: Positive, Negative, Neutral, or Mixed.

Discussion:
{comments}";

/// Technical terms kept untranslated when the briefing is rendered in a
/// non-English language.
const DEFAULT_TECHNICAL_TERMS: &[&str] = &[
    "component",
    "API",
    "bug fix",
    "UI",
    "test",
    "cache",
    "server",
    "variable",
    "function",
];

/// Resolved prompt configuration: templates plus the term allow-list,
/// read-only after startup.
#[derive(Debug, Clone)]
pub struct PromptSet {
    summarize: String,
    sentiment: String,
    technical_terms: Vec<String>,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            summarize: DEFAULT_SUMMARIZE_TEMPLATE.to_string(),
            sentiment: DEFAULT_SENTIMENT_TEMPLATE.to_string(),
            technical_terms: DEFAULT_TECHNICAL_TERMS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl PromptSet {
    /// Build from optional config overrides, falling back to the defaults
    /// per field.
    pub fn from_overrides(
        summarize: Option<String>,
        sentiment: Option<String>,
        technical_terms: Option<Vec<String>>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            summarize: summarize.unwrap_or(defaults.summarize),
            sentiment: sentiment.unwrap_or(defaults.sentiment),
            technical_terms: technical_terms.unwrap_or(defaults.technical_terms),
        }
    }

    pub fn render_summarize(&self, bundle_text: &str, language_name: &str) -> String {
        self.summarize
            .replace("{language}", language_name)
            .replace("{terms}", &self.technical_terms.join(", "))
            .replace("{bundle}", bundle_text)
    }

    pub fn render_sentiment(&self, comments_text: &str) -> String {
        self.sentiment.replace("{comments}", comments_text)
    }
}
