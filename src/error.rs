// src/error.rs
use thiserror::Error;

/// Failure of a single assessment fetch. None of these leave state behind,
/// so the ticker stays eligible for another activation.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("no API key configured for the advisory service")]
    MissingApiKey,

    #[error("invalid advisory base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("advisory transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("advisory service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("advisory service returned no text content")]
    EmptyResponse,

    #[error("malformed assessment JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("invalid assessment field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("unknown ticker {0}")]
    UnknownTicker(String),
}
