use crate::events::NodeId;

/// Failures that are system errors rather than gameplay outcomes.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("node {node} cannot be selected: {reason}")]
    InvalidLevelSelection { node: NodeId, reason: String },

    #[error("failed to load asset {path}: {reason}")]
    AssetLoad { path: String, reason: String },

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
