//! Emotion-to-scripture pipeline.
//!
//! ```text
//! User statement
//!   → Completion request (fixed instruction + statement)
//!   → Extraction cascade (fenced block → structural object → greedy braces)
//!   → Fallback synthesis when no well-formed record is found
//!   → Reconciliation against the curated knowledge base
//!   → { status, emotion, verse, message }
//! ```

pub mod extractor;
pub mod pipeline;
pub mod prompts;
pub mod reconciler;
pub mod synthesizer;

pub use pipeline::{Motivator, MotivatorResponse, PipelineOutcome, PipelineState, ResponseStatus};
pub use reconciler::{reconcile, MatchStrategy, Reconciliation, ResponseSource};
