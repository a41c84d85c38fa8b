use thiserror::Error;

/// Failure kinds at a provider boundary. Routine network/shape problems map to
/// `Unavailable`/`Malformed`; handlers absorb these to a missing context rather
/// than aborting the chat turn.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Unexpected provider failure: {0}")]
    Unexpected(String),
}

#[derive(Error, Debug)]
pub enum TripError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, TripError>;
