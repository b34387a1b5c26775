use cartao_core::{CardError, RejectReason};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("not authenticated or session expired, log in again")]
    Unauthorized,
    #[error("{message}")]
    Conflict {
        status: u16,
        message: String,
        /// Field-level messages from the backend, when it sent any.
        fields: BTreeMap<String, Vec<String>>,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(serde_json::Error),
    #[error("dose not allowed: {0}")]
    DoseSequence(RejectReason),
    #[error("vaccine '{0}' is not in the catalog")]
    UnknownVaccine(String),
    #[error("unknown dose slot '{0}'")]
    UnknownSlot(String),
    #[error("view load superseded by a newer request")]
    Superseded,
    #[error("no person selected")]
    NoView,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("token storage error: {0}")]
    TokenStore(std::io::Error),
    #[error(transparent)]
    Core(#[from] CardError),
}

impl ClientError {
    /// Whether the operator has to log in again before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }

    /// Human-readable field messages, `field: message` per entry.
    pub fn field_messages(&self) -> Vec<String> {
        match self {
            ClientError::Conflict { fields, .. } => fields
                .iter()
                .flat_map(|(field, messages)| {
                    messages.iter().map(move |m| format!("{field}: {m}"))
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
