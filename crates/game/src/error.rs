use crate::render::Anchor;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[from] serde_json::Error),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("missing render anchor {0:?}")]
    MissingRenderAnchor(Anchor),
    #[error("transport failure: {0}")]
    TransportFailure(String),
    #[error("invalid local action: {0}")]
    InvalidLocalAction(LocalActionRejection),
}

/// Why a click was swallowed before it reached the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalActionRejection {
    NotAwaitingStackChoice,
    CardAlreadyPlayed,
    StackChoicePending,
}

impl LocalActionRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalActionRejection::NotAwaitingStackChoice => "no stack choice is pending",
            LocalActionRejection::CardAlreadyPlayed => "a card was already played this turn",
            LocalActionRejection::StackChoicePending => "a stack must be chosen first",
        }
    }
}

impl std::fmt::Display for LocalActionRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
