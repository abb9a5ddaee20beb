//! Leader-aware request routing and cluster status

use crate::config::{ClusterConfig, LeaderWaitConfig};
use crate::error::{ClusterError, Result};
use crate::leader::LeaderQuery;
use crate::node::NodeId;
use serde::Serialize;
use std::net::SocketAddr;
use tokio::time::{sleep, Instant};

/// Where a write should be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// This node leads; handle the request here
    Local,

    /// Forward to the leader
    Forward { leader: NodeId, address: SocketAddr },
}

/// Point-in-time view of the cluster as seen by this node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterStatus {
    pub cluster_name: String,
    pub node_id: NodeId,
    pub leader_id: Option<NodeId>,
    pub is_leader: bool,
    pub member_count: usize,

    /// Why the leader is unknown, if it is
    pub error: Option<String>,
}

impl ClusterStatus {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Routes requests and gates leader-only operations using a [`LeaderQuery`].
pub struct LeaderRouter<Q> {
    query: Q,
    config: ClusterConfig,
}

impl<Q: LeaderQuery> LeaderRouter<Q> {
    pub fn new(query: Q, config: ClusterConfig) -> Self {
        Self { query, config }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Check if this node is the leader
    pub fn is_leader(&self) -> Result<bool> {
        Ok(self.query.current_leader_id()? == self.config.node_id)
    }

    /// Fail unless this node is the leader.
    ///
    /// Followers get [`ClusterError::NotLeader`] naming the leader when one is
    /// known. Engine failures are returned as they are.
    pub fn ensure_leader(&self) -> Result<()> {
        match self.query.current_leader_id() {
            Ok(leader) if leader == self.config.node_id => Ok(()),
            Ok(leader) => Err(ClusterError::not_leader(Some(leader))),
            Err(ClusterError::NoLeader) => Err(ClusterError::not_leader(None)),
            Err(e) => Err(e),
        }
    }

    /// Decide where a write should go
    pub fn route(&self) -> Result<Route> {
        let leader = self.query.current_leader_id()?;
        if leader == self.config.node_id {
            return Ok(Route::Local);
        }

        match self.config.member(leader) {
            Some(member) => Ok(Route::Forward {
                leader,
                address: member.peer_address,
            }),
            None => {
                tracing::warn!(
                    "Leader {} is not a member of cluster {}",
                    leader,
                    self.config.cluster_name
                );
                Err(ClusterError::UnknownMember(leader))
            }
        }
    }

    /// Snapshot the cluster status; query failures are recorded, not returned.
    pub fn status(&self) -> ClusterStatus {
        let (leader_id, error) = match self.query.current_leader_id() {
            Ok(leader) => (Some(leader), None),
            Err(e) => (None, Some(e.to_string())),
        };

        ClusterStatus {
            cluster_name: self.config.cluster_name.clone(),
            node_id: self.config.node_id,
            leader_id,
            is_leader: leader_id == Some(self.config.node_id),
            member_count: self.config.members.len(),
            error,
        }
    }

    /// Wait until some node leads, using the configured limits
    pub async fn wait_for_leader(&self) -> Result<NodeId> {
        wait_for_leader(&self.query, &self.config.leader_wait).await
    }
}

/// Poll `query` until a leader is known.
///
/// Retryable failures are retried every `poll_interval` until `timeout`
/// elapses; anything else is returned immediately.
pub async fn wait_for_leader<Q: LeaderQuery + ?Sized>(
    query: &Q,
    config: &LeaderWaitConfig,
) -> Result<NodeId> {
    let deadline = Instant::now() + config.timeout;

    loop {
        match query.current_leader_id() {
            Ok(leader) => return Ok(leader),
            Err(e) if e.is_retryable() => {
                if Instant::now() + config.poll_interval > deadline {
                    return Err(ClusterError::timeout(format!(
                        "no leader after {:?}: {}",
                        config.timeout, e
                    )));
                }
                tracing::trace!("Still waiting for a leader: {}", e);
                sleep(config.poll_interval).await;
            }
            Err(e) => return Err(e),
        }
    }
}
