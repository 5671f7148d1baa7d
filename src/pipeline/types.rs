use std::fmt;

use crate::summary::{SentimentLabel, SummaryResult};

/// Pipeline stages, in execution order. Fatal-stage failures surface the
/// stage tag to the caller; non-fatal stages (sentiment, synthesis)
/// degrade the outcome instead of aborting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParsingReference,
    FetchingPr,
    ClassifyingSentiment,
    Summarizing,
    SynthesizingAudio,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ParsingReference => "ParsingReference",
            Stage::FetchingPr => "FetchingPr",
            Stage::ClassifyingSentiment => "ClassifyingSentiment",
            Stage::Summarizing => "Summarizing",
            Stage::SynthesizingAudio => "SynthesizingAudio",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal artifact of one summarize request, built once after the last
/// stage and never mutated. `audio_url` is None when synthesis failed;
/// `sentiment` is None in language-driven (multilingual) mode.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub summary: SummaryResult,
    pub audio_url: Option<String>,
    pub sentiment: Option<SentimentLabel>,
}
