//! Leader identity queries
//!
//! [`LeaderQuery`] is the only thing code that routes writes, reports cluster
//! status or gates leader-only work should depend on. Which consensus engine
//! answers the question stays an implementation detail of the value behind it.

use crate::error::{ClusterError, Result};
use crate::node::NodeId;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

/// Source of the current leader's identity.
#[cfg_attr(test, automock)]
pub trait LeaderQuery: Send + Sync {
    /// The node the backing engine currently believes is leader.
    ///
    /// Answers from the engine's in-memory state: never performs I/O and never
    /// triggers an election. The answer may already be stale while an
    /// election is in progress.
    ///
    /// # Errors
    /// * [`ClusterError::NoLeader`] if the engine knows no leader.
    /// * [`ClusterError::EngineUnavailable`] if the engine cannot be queried.
    /// * Any other condition the backend reports, unchanged.
    fn current_leader_id(&self) -> Result<NodeId>;
}

impl<T: LeaderQuery + ?Sized> LeaderQuery for &T {
    fn current_leader_id(&self) -> Result<NodeId> {
        (**self).current_leader_id()
    }
}

impl<T: LeaderQuery + ?Sized> LeaderQuery for Box<T> {
    fn current_leader_id(&self) -> Result<NodeId> {
        (**self).current_leader_id()
    }
}

impl<T: LeaderQuery + ?Sized> LeaderQuery for Arc<T> {
    fn current_leader_id(&self) -> Result<NodeId> {
        (**self).current_leader_id()
    }
}

/// A leader that never changes.
///
/// Useful for single-node deployments and as a test double.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLeader {
    leader: Option<NodeId>,
}

impl FixedLeader {
    pub fn new(leader: NodeId) -> Self {
        Self {
            leader: Some(leader),
        }
    }

    pub fn none() -> Self {
        Self { leader: None }
    }
}

impl LeaderQuery for FixedLeader {
    fn current_leader_id(&self) -> Result<NodeId> {
        self.leader.ok_or(ClusterError::NoLeader)
    }
}
