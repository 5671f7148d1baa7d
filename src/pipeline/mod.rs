pub mod types;

pub use types::{RequestOutcome, Stage};

use std::sync::Arc;
use thiserror::Error;
use tracing::{info_span, instrument, warn, Instrument};

use crate::config::{Config, Credentials};
use crate::model::{GeminiClient, PromptSet, TextModel};
use crate::pr::{self, GithubClient, PrError, PrProvider};
use crate::speech::{MurfClient, SpeechBackend, VoiceCatalog, VoiceError};
use crate::summary::{self, sentiment, SummaryError};

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_LANGUAGE_NAME: &str = "English";

/// A fatal pipeline failure. Non-fatal stages (sentiment classification,
/// speech synthesis) never produce one of these; they degrade the outcome
/// instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidReference(PrError),

    #[error(transparent)]
    UnsupportedLanguage(#[from] VoiceError),

    #[error(transparent)]
    UpstreamFetch(PrError),

    #[error(transparent)]
    Summarization(#[from] SummaryError),
}

impl PipelineError {
    /// The stage this error aborted in, surfaced to the caller.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::InvalidReference(_) | PipelineError::UnsupportedLanguage(_) => {
                Stage::ParsingReference
            }
            PipelineError::UpstreamFetch(_) => Stage::FetchingPr,
            PipelineError::Summarization(_) => Stage::Summarizing,
        }
    }
}

/// Sequences the providers for one summarize request: parse, fetch,
/// classify and summarize together, then synthesize.
///
/// Holds no per-request state; one instance serves all concurrent requests.
pub struct Orchestrator {
    github: Arc<dyn PrProvider>,
    model: Arc<dyn TextModel>,
    speech: Arc<dyn SpeechBackend>,
    voices: VoiceCatalog,
    prompts: PromptSet,
    bundle_max_chars: usize,
}

impl Orchestrator {
    pub fn new(
        github: Arc<dyn PrProvider>,
        model: Arc<dyn TextModel>,
        speech: Arc<dyn SpeechBackend>,
        voices: VoiceCatalog,
        prompts: PromptSet,
        bundle_max_chars: usize,
    ) -> Self {
        Self {
            github,
            model,
            speech,
            voices,
            prompts,
            bundle_max_chars,
        }
    }

    /// Wire up the real provider clients from validated configuration.
    pub fn from_config(config: &Config, credentials: Credentials) -> Result<Self, reqwest::Error> {
        let github = GithubClient::new(credentials.github_token, config.limits.fetch_timeout())?;
        let model = GeminiClient::new(
            credentials.model_api_key,
            config.model.model.clone(),
            config.model.base_url.clone(),
            config.limits.model_timeout(),
        )?;
        let speech = MurfClient::new(
            credentials.speech_api_key,
            config.speech.endpoint.clone(),
            config.limits.speech_timeout(),
        )?;
        let voices = VoiceCatalog::with_overrides(&config.voices.sentiment, &config.voices.language);
        let prompts = PromptSet::from_overrides(
            config.prompts.summarize.clone(),
            config.prompts.sentiment.clone(),
            config.prompts.technical_terms.clone(),
        );

        Ok(Self::new(
            Arc::new(github),
            Arc::new(model),
            Arc::new(speech),
            voices,
            prompts,
            config.limits.bundle_max_chars,
        ))
    }

    /// Run the full pipeline for one request.
    ///
    /// Mode follows the target language: the default language selects the
    /// voice by discussion sentiment, anything else selects it by language
    /// and skips classification. Unknown language codes are rejected before
    /// the first network call.
    #[instrument(skip(self), fields(pr_url = %pr_url, language = %target_language))]
    pub async fn run(
        &self,
        pr_url: &str,
        target_language: &str,
    ) -> Result<RequestOutcome, PipelineError> {
        let pr = pr::parse_pr_url(pr_url).map_err(PipelineError::InvalidReference)?;

        let language = if target_language == DEFAULT_LANGUAGE {
            None
        } else {
            Some(self.voices.for_language(target_language)?)
        };

        let bundle = self
            .github
            .fetch(&pr)
            .await
            .map_err(PipelineError::UpstreamFetch)?;
        let bundle_text = bundle.bundle_text(self.bundle_max_chars);

        let (summary, sentiment_label) = match language {
            Some(lang) => {
                let summary = summary::summarize(
                    self.model.as_ref(),
                    &self.prompts,
                    &bundle_text,
                    &lang.name,
                    target_language,
                )
                .await?;
                (summary, None)
            }
            None => {
                // Both calls only read the bundle, so they run together.
                let comments_text = bundle.comments_text();
                let (summary, label) = tokio::join!(
                    summary::summarize(
                        self.model.as_ref(),
                        &self.prompts,
                        &bundle_text,
                        DEFAULT_LANGUAGE_NAME,
                        DEFAULT_LANGUAGE,
                    )
                    .instrument(info_span!("stage", name = %Stage::Summarizing)),
                    sentiment::classify(self.model.as_ref(), &self.prompts, &comments_text)
                        .instrument(info_span!("stage", name = %Stage::ClassifyingSentiment)),
                );
                (summary?, Some(label))
            }
        };

        let voice = match (language, sentiment_label) {
            (Some(lang), _) => lang.selector(),
            (None, label) => self.voices.for_sentiment(label.unwrap_or_default()),
        };

        // Synthesis is non-fatal: the text summary is still worth returning
        // when audio generation fails.
        let audio_url = match self
            .speech
            .synthesize(&summary.text, &voice)
            .instrument(info_span!("stage", name = %Stage::SynthesizingAudio))
            .await
        {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(error = %err, "speech synthesis failed, returning summary without audio");
                None
            }
        };

        Ok(RequestOutcome {
            summary,
            audio_url,
            sentiment: sentiment_label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use crate::pr::{Comment, PrUrl, PullRequestBundle};
    use crate::speech::{SpeechError, VoiceSelector};
    use crate::summary::SentimentLabel;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const PR_URL: &str = "https://github.com/acme/widget/pull/42";

    fn sample_bundle() -> PullRequestBundle {
        PullRequestBundle {
            title: "Add caching layer".to_string(),
            description: "Adds a read-through cache to the API server.".to_string(),
            comments: vec![Comment {
                author: "alice".to_string(),
                body: "Great improvement!".to_string(),
            }],
            diff: "diff --git a/src/cache.rs b/src/cache.rs\n+pub struct Cache;\n".to_string(),
        }
    }

    struct StubProvider {
        bundle: Option<PullRequestBundle>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn ok(bundle: PullRequestBundle) -> Self {
            Self {
                bundle: Some(bundle),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                bundle: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PrProvider for StubProvider {
        async fn fetch(&self, _pr: &PrUrl) -> Result<PullRequestBundle, PrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.bundle {
                Some(bundle) => Ok(bundle.clone()),
                None => Err(PrError::Upstream {
                    status: Some(502),
                    message: "metadata unavailable".to_string(),
                }),
            }
        }
    }

    struct StubModel {
        summary_reply: Result<String, ()>,
        sentiment_reply: String,
        calls: AtomicUsize,
    }

    impl StubModel {
        fn new(summary: &str, sentiment: &str) -> Self {
            Self {
                summary_reply: Ok(summary.to_string()),
                sentiment_reply: sentiment.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                summary_reply: Err(()),
                sentiment_reply: "Neutral".to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextModel for StubModel {
        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("exactly one word") {
                return Ok(self.sentiment_reply.clone());
            }
            self.summary_reply
                .clone()
                .map_err(|_| ModelError::Request("model down".to_string()))
        }
    }

    struct StubSpeech {
        url: Option<String>,
        calls: AtomicUsize,
        last_voice: Mutex<Option<VoiceSelector>>,
    }

    impl StubSpeech {
        fn ok() -> Self {
            Self {
                url: Some("https://cdn/audio.mp3".to_string()),
                calls: AtomicUsize::new(0),
                last_voice: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                url: None,
                calls: AtomicUsize::new(0),
                last_voice: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl SpeechBackend for StubSpeech {
        async fn synthesize(
            &self,
            _text: &str,
            voice: &VoiceSelector,
        ) -> Result<String, SpeechError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_voice.lock().unwrap() = Some(voice.clone());
            self.url.clone().ok_or(SpeechError::Api {
                status: 500,
                message: "synthesis unavailable".to_string(),
            })
        }
    }

    fn orchestrator(
        github: Arc<StubProvider>,
        model: Arc<StubModel>,
        speech: Arc<StubSpeech>,
    ) -> Orchestrator {
        Orchestrator::new(
            github,
            model,
            speech,
            VoiceCatalog::default(),
            PromptSet::default(),
            24_000,
        )
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_any_provider_call() {
        let github = Arc::new(StubProvider::ok(sample_bundle()));
        let model = Arc::new(StubModel::new("summary", "Neutral"));
        let speech = Arc::new(StubSpeech::ok());
        let orch = orchestrator(github.clone(), model.clone(), speech.clone());

        let err = orch.run("not-a-url", "en").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidReference(_)));
        assert_eq!(err.stage(), Stage::ParsingReference);
        assert_eq!(github.calls.load(Ordering::SeqCst), 0);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unsupported_language_fails_before_any_provider_call() {
        let github = Arc::new(StubProvider::ok(sample_bundle()));
        let model = Arc::new(StubModel::new("summary", "Neutral"));
        let speech = Arc::new(StubSpeech::ok());
        let orch = orchestrator(github.clone(), model.clone(), speech.clone());

        let err = orch.run(PR_URL, "xx").await.unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedLanguage(_)));
        assert_eq!(github.calls.load(Ordering::SeqCst), 0);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_metadata_failure_stops_before_model_and_speech() {
        let github = Arc::new(StubProvider::failing());
        let model = Arc::new(StubModel::new("summary", "Neutral"));
        let speech = Arc::new(StubSpeech::ok());
        let orch = orchestrator(github.clone(), model.clone(), speech.clone());

        let err = orch.run(PR_URL, "en").await.unwrap_err();
        assert_eq!(err.stage(), Stage::FetchingPr);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_monolingual_mode_reports_sentiment_and_matching_voice() {
        let github = Arc::new(StubProvider::ok(sample_bundle()));
        let model = Arc::new(StubModel::new("A solid caching improvement.", "Positive"));
        let speech = Arc::new(StubSpeech::ok());
        let orch = orchestrator(github.clone(), model.clone(), speech.clone());

        let outcome = orch.run(PR_URL, "en").await.unwrap();
        assert_eq!(outcome.summary.text, "A solid caching improvement.");
        assert_eq!(outcome.summary.language, "en");
        assert_eq!(outcome.sentiment, Some(SentimentLabel::Positive));
        assert_eq!(outcome.audio_url.as_deref(), Some("https://cdn/audio.mp3"));
        // one summarize call plus one classify call
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);

        let voice = speech.last_voice.lock().unwrap().clone().unwrap();
        assert_eq!(voice.voice_id, "en-US-natalie");
        assert_eq!(voice.style, "Cheerful");
    }

    #[tokio::test]
    async fn test_multilingual_mode_skips_sentiment_and_uses_language_voice() {
        let github = Arc::new(StubProvider::ok(sample_bundle()));
        let model = Arc::new(StubModel::new("कैश परत जोड़ी गई", "Positive"));
        let speech = Arc::new(StubSpeech::ok());
        let orch = orchestrator(github.clone(), model.clone(), speech.clone());

        let outcome = orch.run(PR_URL, "hi").await.unwrap();
        assert_eq!(outcome.sentiment, None);
        assert_eq!(outcome.summary.language, "hi");
        // classification skipped, only the summarize call
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);

        let voice = speech.last_voice.lock().unwrap().clone().unwrap();
        assert_eq!(voice.voice_id, "hi-IN-ayushi");
    }

    #[tokio::test]
    async fn test_synthesis_failure_degrades_to_text_only() {
        let github = Arc::new(StubProvider::ok(sample_bundle()));
        let model = Arc::new(StubModel::new("A solid caching improvement.", "Neutral"));
        let speech = Arc::new(StubSpeech::failing());
        let orch = orchestrator(github.clone(), model.clone(), speech.clone());

        let outcome = orch.run(PR_URL, "en").await.unwrap();
        assert_eq!(outcome.audio_url, None);
        assert!(!outcome.summary.text.is_empty());
        assert_eq!(speech.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_summary_is_fatal_and_skips_synthesis() {
        let github = Arc::new(StubProvider::ok(sample_bundle()));
        let model = Arc::new(StubModel::failing());
        let speech = Arc::new(StubSpeech::ok());
        let orch = orchestrator(github.clone(), model.clone(), speech.clone());

        let err = orch.run(PR_URL, "en").await.unwrap_err();
        assert_eq!(err.stage(), Stage::Summarizing);
        assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bundle_without_discussion_defaults_to_neutral_voice() {
        let bundle = PullRequestBundle {
            title: "Fix typo".to_string(),
            description: String::new(),
            comments: vec![],
            diff: String::new(),
        };
        let github = Arc::new(StubProvider::ok(bundle));
        let model = Arc::new(StubModel::new("Fixes a typo in the docs.", "Positive"));
        let speech = Arc::new(StubSpeech::ok());
        let orch = orchestrator(github.clone(), model.clone(), speech.clone());

        let outcome = orch.run(PR_URL, "en").await.unwrap();
        // no comments: classifier short-circuits to Neutral without a model call
        assert_eq!(outcome.sentiment, Some(SentimentLabel::Neutral));
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert!(!outcome.summary.text.is_empty());

        let voice = speech.last_voice.lock().unwrap().clone().unwrap();
        assert_eq!(voice.voice_id, "en-IN-aarav");
    }

    #[tokio::test]
    async fn test_repeated_runs_stay_markup_free() {
        let github = Arc::new(StubProvider::ok(sample_bundle()));
        let model = Arc::new(StubModel::new("The PR adds a `cache` **layer**.", "Neutral"));
        let speech = Arc::new(StubSpeech::ok());
        let orch = orchestrator(github.clone(), model.clone(), speech.clone());

        for _ in 0..2 {
            let outcome = orch.run(PR_URL, "en").await.unwrap();
            assert!(!outcome.summary.text.is_empty());
            assert!(!outcome.summary.text.contains(['*', '`', '#']));
        }
    }
}
