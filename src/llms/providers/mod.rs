//! Completion provider implementations.
//!
//! Each provider implements [`CompletionService`](crate::llms::base_llm::CompletionService)
//! and owns its authentication, request formatting, retry policy and error
//! classification.
//!
//! | Provider | Module | Endpoint |
//! |----------|--------|----------|
//! | AWS Bedrock | [`bedrock`] | Bedrock Runtime Converse API |

pub mod bedrock;
