//! Cluster error types

use crate::node::NodeId;

/// Result type for cluster operations
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Cluster-specific error types
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("No leader is currently known")]
    NoLeader,

    #[error("Consensus engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Not the leader (current leader: {})", display_leader(.leader))]
    NotLeader { leader: Option<NodeId> },

    #[error("Leader {0} is not a configured cluster member")]
    UnknownMember(NodeId),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl ClusterError {
    pub fn engine_unavailable<T: Into<String>>(msg: T) -> Self {
        Self::EngineUnavailable(msg.into())
    }

    pub fn not_leader(leader: Option<NodeId>) -> Self {
        Self::NotLeader { leader }
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn backend<T: Into<String>>(msg: T) -> Self {
        Self::Backend(anyhow::anyhow!(msg.into()))
    }

    /// Whether asking again later may succeed without outside intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoLeader | Self::Timeout(_))
    }
}

fn display_leader(leader: &Option<NodeId>) -> String {
    match leader {
        Some(id) => id.to_string(),
        None => "unknown".to_string(),
    }
}
