use thiserror::Error;

#[derive(Debug, Error)]
pub enum RollError {
    #[error("invalid dice format: {0}")]
    InvalidFormat(String),

    #[error(
        "dice limit exceeded: {count}d{faces} (at most {max_count} dice with at most {max_faces} faces)"
    )]
    LimitExceeded {
        count: u32,
        faces: u32,
        max_count: u32,
        max_faces: u32,
    },

    #[error("entropy source unavailable: {0}")]
    EntropySourceUnavailable(#[from] EntropyError),

    #[error("roll engine invariant violated: {0}")]
    InvariantViolation(String),
}

impl RollError {
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, RollError::LimitExceeded { .. })
    }
}

/// Failures of the external block-hash fetch. None of these are fatal; the
/// entropy cache keeps serving its last known hash.
#[derive(Debug, Error)]
pub enum EntropyError {
    #[error("no entropy source configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("field `{0}` missing from response")]
    MissingField(&'static str),
}
