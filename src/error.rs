//! Error types.
use thiserror::Error;

/// Failure to decode an action from its JSON form.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("action is not a JSON object")]
    NotAnObject,

    #[error("action has no string `type`")]
    MissingType,

    #[error("action `{action_type}` is missing `{field}`")]
    MissingField {
        action_type: String,
        field: &'static str,
    },

    #[error("unknown API action `{action_type}` with apiCallType {api_call_type}")]
    UnknownApiCallType {
        action_type: String,
        api_call_type: String,
    },

    #[error("invalid call in action `{action_type}`: {source}")]
    InvalidCall {
        action_type: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure below the HTTP layer. The display text is what ends up in `ERROR` actions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
