//! Error types for the fact-checking pipeline.
//!
//! Every collaborator returns these instead of panicking. The pipeline
//! absorbs all of them and degrades to an empty or default result, so none
//! of these ever reach a caller of [`crate::pipeline::FactChecker::run`].
//! Messages never carry API keys.

/// Errors that can occur while gathering evidence or judging a claim.
#[derive(Debug, thiserror::Error)]
pub enum FactCheckError {
    /// The search collaborator failed or returned nothing usable.
    #[error("search unavailable: {0}")]
    SearchUnavailable(String),

    /// Fetching or reading a single result page failed.
    #[error("scrape failed: {0}")]
    ScrapeFailed(String),

    /// The reasoning collaborator call itself failed.
    #[error("reasoning call failed: {0}")]
    ReasoningCallFailed(String),

    /// The reasoning collaborator answered with text that is not a valid judgment.
    #[error("malformed judgment: {0}")]
    MalformedJudgment(String),

    /// Invalid or missing configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, FactCheckError>;
