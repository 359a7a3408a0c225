//! The per-request pipeline.
//!
//! ```text
//! Idle → Requesting → Extracting → Reconciling → Done
//!                         └→ Synthesizing ┘
//! Requesting → Failed   (completion service error only)
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::extractor::extract;
use super::prompts::{build_user_statement, SYSTEM_PROMPT};
use super::reconciler::{reconcile_with, MatchStrategy, Reconciliation, ResponseSource};
use super::synthesizer::synthesize;
use crate::knowledge::KnowledgeBase;
use crate::llms::base_llm::CompletionService;

/// Shown when the user submits nothing.
pub const EMPTY_INPUT_MESSAGE: &str = "Please provide some input";

/// Pipeline states for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Requesting,
    Extracting,
    Synthesizing,
    Reconciling,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// What the caller renders. On error `emotion` is `None` and `verse`
/// carries a readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MotivatorResponse {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    pub verse: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ResponseSource>,
}

impl MotivatorResponse {
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            emotion: None,
            verse: description.into(),
            message: String::new(),
            source: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }

    /// Plain-text rendering for terminal output.
    pub fn render(&self) -> String {
        match (&self.status, &self.emotion) {
            (ResponseStatus::Ok, Some(emotion)) => format!(
                "Detected emotion: {}\nHere's a Bible verse for you: {}\n\n{}",
                capitalize(emotion),
                self.verse,
                self.message
            ),
            _ => self.verse.clone(),
        }
    }
}

impl From<Reconciliation> for MotivatorResponse {
    fn from(r: Reconciliation) -> Self {
        Self {
            status: ResponseStatus::Ok,
            emotion: Some(r.emotion),
            verse: r.verse,
            message: r.message,
            source: Some(r.source),
        }
    }
}

/// Response plus the states visited while producing it.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub response: MotivatorResponse,
    pub states: Vec<PipelineState>,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Records state transitions for one request and logs them.
struct Trace {
    request_id: Uuid,
    states: Vec<PipelineState>,
}

impl Trace {
    fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            states: vec![PipelineState::Idle],
        }
    }

    fn enter(&mut self, state: PipelineState) {
        log::debug!("[{}] {:?}", self.request_id, state);
        self.states.push(state);
    }
}

/// Entry point used by the server and terminal front ends.
///
/// Holds the injected completion client and the shared read-only knowledge
/// base; cheap to clone and safe to share across sessions.
#[derive(Debug, Clone)]
pub struct Motivator {
    service: Arc<dyn CompletionService>,
    knowledge: Arc<KnowledgeBase>,
    match_strategy: MatchStrategy,
}

impl Motivator {
    pub fn new(service: Arc<dyn CompletionService>, knowledge: Arc<KnowledgeBase>) -> Self {
        Self {
            service,
            knowledge,
            match_strategy: MatchStrategy::default(),
        }
    }

    pub fn with_match_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.match_strategy = strategy;
        self
    }

    pub fn service(&self) -> &dyn CompletionService {
        self.service.as_ref()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Extract (or synthesize) and reconcile a raw completion. Never fails.
    pub fn interpret(&self, raw: &str) -> Reconciliation {
        let mut trace = Trace::new();
        self.interpret_traced(raw, &mut trace)
    }

    fn interpret_traced(&self, raw: &str, trace: &mut Trace) -> Reconciliation {
        trace.enter(PipelineState::Extracting);
        let parsed = match extract(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!(
                    "[{}] Extraction failed ({}); synthesizing from raw text",
                    trace.request_id,
                    e
                );
                trace.enter(PipelineState::Synthesizing);
                synthesize(raw)
            }
        };

        trace.enter(PipelineState::Reconciling);
        reconcile_with(&parsed, &self.knowledge, self.match_strategy)
    }

    /// Run the full pipeline for one user submission.
    pub async fn run(&self, user_text: &str) -> PipelineOutcome {
        let mut trace = Trace::new();
        let input = user_text.trim();

        if input.is_empty() {
            log::info!("[{}] Rejected empty input", trace.request_id);
            return PipelineOutcome {
                response: MotivatorResponse::error(EMPTY_INPUT_MESSAGE),
                states: trace.states,
            };
        }

        trace.enter(PipelineState::Requesting);
        let completion = match self
            .service
            .request(SYSTEM_PROMPT, &build_user_statement(input))
            .await
        {
            Ok(completion) => completion,
            Err(e) => {
                log::error!("[{}] Completion request failed: {}", trace.request_id, e);
                trace.enter(PipelineState::Failed);
                return PipelineOutcome {
                    response: MotivatorResponse::error(e.user_message()),
                    states: trace.states,
                };
            }
        };

        let reconciliation = self.interpret_traced(&completion.text, &mut trace);
        log::info!(
            "[{}] Responding with emotion '{}' ({:?} content)",
            trace.request_id,
            reconciliation.emotion,
            reconciliation.source
        );
        trace.enter(PipelineState::Done);

        PipelineOutcome {
            response: reconciliation.into(),
            states: trace.states,
        }
    }

    /// Run the pipeline and return only the response.
    pub async fn get_response(&self, user_text: &str) -> MotivatorResponse {
        self.run(user_text).await.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ServiceError, ServiceErrorKind};
    use crate::knowledge::{DEFAULT_ENCOURAGEMENT, DEFAULT_VERSE};
    use crate::llms::base_llm::testing::ScriptedCompletion;
    use PipelineState::*;

    fn motivator(service: Arc<ScriptedCompletion>) -> Motivator {
        Motivator::new(service, Arc::new(KnowledgeBase::curated()))
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_service() {
        let service = Arc::new(ScriptedCompletion::replying("unused"));
        let m = motivator(service.clone());

        for input in ["", "   \n\t"] {
            let outcome = m.run(input).await;
            assert_eq!(outcome.response, MotivatorResponse::error(EMPTY_INPUT_MESSAGE));
            assert_eq!(outcome.states, vec![Idle]);
        }
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_model_path_for_uncurated_emotion() {
        let raw = "```json\n{\"anxious\": {\"Bible\": [\"Psalm 55:22 - Cast your cares...\"], \"Message\": \"Trust Him.\"}}\n```";
        let service = Arc::new(ScriptedCompletion::replying(raw));
        let outcome = motivator(service.clone()).run("I can't stop worrying").await;

        assert_eq!(service.calls(), 1);
        assert_eq!(outcome.states, vec![Idle, Requesting, Extracting, Reconciling, Done]);
        let response = outcome.response;
        assert!(response.is_ok());
        assert_eq!(response.emotion.as_deref(), Some("anxious"));
        assert_eq!(response.verse, "Psalm 55:22 - Cast your cares...");
        assert_eq!(response.message, "Trust Him.");
        assert_eq!(response.source, Some(ResponseSource::Model));
    }

    #[tokio::test]
    async fn test_curated_path() {
        let raw = r#"{"excited": {"Bible": ["Model verse"], "Message": "Model message"}}"#;
        let service = Arc::new(ScriptedCompletion::replying(raw));
        let m = motivator(service);
        let response = m.get_response("New job tomorrow!").await;

        let curated = m.knowledge().get("excited").unwrap();
        assert_eq!(response.emotion.as_deref(), Some("excited"));
        assert_eq!(response.verse, curated.verses[0]);
        assert_eq!(response.message, curated.message);
        assert_eq!(response.source, Some(ResponseSource::Curated));
    }

    #[tokio::test]
    async fn test_synthesis_path() {
        let raw = "I feel so anxious today but also hopeful.";
        let service = Arc::new(ScriptedCompletion::replying(raw));
        let outcome = motivator(service).run("mixed feelings").await;

        assert_eq!(
            outcome.states,
            vec![Idle, Requesting, Extracting, Synthesizing, Reconciling, Done]
        );
        let response = outcome.response;
        assert_eq!(response.emotion.as_deref(), Some("anxious"));
        assert_eq!(response.verse, DEFAULT_VERSE);
        assert_eq!(response.message, raw);
    }

    #[tokio::test]
    async fn test_reasoning_only_reply_degrades_to_default_encouragement() {
        let service = Arc::new(ScriptedCompletion::replying(""));
        let outcome = motivator(service).run("I don't know how I feel").await;

        assert_eq!(
            outcome.states,
            vec![Idle, Requesting, Extracting, Synthesizing, Reconciling, Done]
        );
        let response = outcome.response;
        assert!(response.is_ok());
        assert_eq!(response.emotion.as_deref(), Some("unspecified"));
        assert_eq!(response.verse, DEFAULT_VERSE);
        assert_eq!(response.message, DEFAULT_ENCOURAGEMENT);
        assert_eq!(response.source, Some(ResponseSource::Model));
    }

    #[tokio::test]
    async fn test_malformed_record_is_synthesized() {
        let raw = r#"You seem frustrated. {"frustrated": {"Bible": "Romans 8:28"}}"#;
        let service = Arc::new(ScriptedCompletion::replying(raw));
        let m = motivator(service);
        let outcome = m.run("Nothing works").await;

        assert!(outcome.states.contains(&Synthesizing));
        // The synthesized label still reconciles to the curated entry.
        assert_eq!(outcome.response.emotion.as_deref(), Some("frustrated"));
        assert_eq!(outcome.response.source, Some(ResponseSource::Curated));
    }

    #[tokio::test]
    async fn test_service_error_is_terminal() {
        let error = ServiceError::new(ServiceErrorKind::Upstream, "HTTP 503");
        let service = Arc::new(ScriptedCompletion::failing(error));
        let outcome = motivator(service).run("hello").await;

        assert_eq!(outcome.states, vec![Idle, Requesting, Failed]);
        let response = outcome.response;
        assert_eq!(response.status, ResponseStatus::Error);
        assert!(response.emotion.is_none());
        assert_eq!(response.verse, "Error in processing: HTTP 503");
    }

    #[tokio::test]
    async fn test_exact_strategy_is_applied() {
        let raw = r#"{"overexcited": {"Bible": ["Model verse"], "Message": "Model message"}}"#;
        let service = Arc::new(ScriptedCompletion::replying(raw));
        let m = motivator(service).with_match_strategy(MatchStrategy::Exact);
        let response = m.get_response("I can't sit still").await;
        assert_eq!(response.emotion.as_deref(), Some("overexcited"));
        assert_eq!(response.source, Some(ResponseSource::Model));
    }

    #[test]
    fn test_interpret_without_network() {
        let m = motivator(Arc::new(ScriptedCompletion::replying("unused")));
        let result = m.interpret("no json, just sad words");
        assert_eq!(result.emotion, "sad");
        assert_eq!(result.source, ResponseSource::Model);
    }

    #[test]
    fn test_render() {
        let ok = MotivatorResponse {
            status: ResponseStatus::Ok,
            emotion: Some("joyful".to_string()),
            verse: "Philippians 4:4 - Rejoice!".to_string(),
            message: "Celebrate.".to_string(),
            source: Some(ResponseSource::Curated),
        };
        assert_eq!(
            ok.render(),
            "Detected emotion: Joyful\nHere's a Bible verse for you: Philippians 4:4 - Rejoice!\n\nCelebrate."
        );
        assert_eq!(MotivatorResponse::error("boom").render(), "boom");
    }

    #[test]
    fn test_response_serialization() {
        let json = serde_json::to_value(MotivatorResponse::error("boom")).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json.get("emotion").is_none());
        assert_eq!(json["verse"], "boom");
    }
}
