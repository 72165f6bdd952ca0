use crate::runner::RunConfigBuilderError;

#[derive(thiserror::Error, Debug)]
pub enum PetriError {
    #[error("Place '{0}' already exists")]
    DuplicatePlace(String),
    #[error("Transition '{0}' already exists")]
    DuplicateTransition(String),
    #[error("Place '{0}' not found")]
    PlaceNotFound(String),
    #[error("No rule registered for transition '{0}'")]
    RuleNotFound(String),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] RunConfigBuilderError),
    #[error("Inappropriate value: {0}")]
    ValueError(String),
    #[error("State is inconsistent: {0}")]
    InconsistentState(String),
    #[error("Firing failed: {0}")]
    Fire(#[from] FireError),
    #[error("Run task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Reasons a firing attempt did not commit.
///
/// Every variant except [`FireError::InconsistentState`] is raised before the marking is touched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FireError {
    #[error("transition '{0}' is not registered")]
    UnknownTransition(String),
    #[error("transition '{transition}' declares place '{place}' which does not exist")]
    MissingPlace { transition: String, place: String },
    #[error("transition '{0}' is not enabled")]
    NotEnabled(String),
    #[error("action of transition '{0}' failed")]
    ActionFailed(String),
    #[error("transition '{transition}' refers to unknown place '{place}'")]
    UnknownPlace { transition: String, place: String },
    #[error("transition '{transition}' consumes {token} from '{place}', which does not hold it")]
    MissingToken { transition: String, place: String, token: String },
    #[error("transition '{transition}' produces into '{place}', which is not a declared output")]
    UndeclaredOutput { transition: String, place: String },
    #[error("transition '{transition}' left the net partially modified: {msg}")]
    InconsistentState { transition: String, msg: String },
}

/// Failure reported by a guard or an action.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{msg}")]
pub struct RuleError {
    msg: String,
}

impl RuleError {
    pub fn new(msg: impl Into<String>) -> Self {
        RuleError { msg: msg.into() }
    }
}

pub type Result<T> = std::result::Result<T, PetriError>;
