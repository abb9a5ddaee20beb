//! [`LeaderQuery`] backed by an embedded raft server

use crate::consensus::{RaftServer, ServerStatus, NO_LEADER};
use crate::error::{ClusterError, Result};
use crate::leader::LeaderQuery;
use crate::node::NodeId;
use std::fmt;
use std::sync::{Arc, Weak};

/// Answers leader queries from an embedded raft server's cached leader.
///
/// The adapter only borrows the server: it holds a [`Weak`] handle, so it
/// never keeps the server alive and never starts, stops or drops it. Whoever
/// constructed the server owns its lifecycle.
pub struct EmbeddedConsensusAdapter<S: RaftServer> {
    server: Weak<S>,
}

impl<S: RaftServer> EmbeddedConsensusAdapter<S> {
    /// Wrap an already running server. Performs no validation.
    pub fn new(server: &Arc<S>) -> Self {
        Self {
            server: Arc::downgrade(server),
        }
    }
}

impl<S: RaftServer> LeaderQuery for EmbeddedConsensusAdapter<S> {
    fn current_leader_id(&self) -> Result<NodeId> {
        let Some(server) = self.server.upgrade() else {
            tracing::debug!("Leader query against a dropped raft server");
            return Err(ClusterError::engine_unavailable("raft server dropped"));
        };

        if server.status() == ServerStatus::Stopped {
            tracing::debug!("Leader query against a stopped raft server");
            return Err(ClusterError::engine_unavailable("raft server stopped"));
        }

        match server.lead() {
            NO_LEADER => {
                tracing::debug!("Raft server reports no leader");
                Err(ClusterError::NoLeader)
            }
            lead => Ok(NodeId::new(lead)),
        }
    }
}

impl<S: RaftServer> Clone for EmbeddedConsensusAdapter<S> {
    fn clone(&self) -> Self {
        Self {
            server: self.server.clone(),
        }
    }
}

impl<S: RaftServer> fmt::Debug for EmbeddedConsensusAdapter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedConsensusAdapter")
            .field("server_alive", &(self.server.strong_count() > 0))
            .finish()
    }
}
