//! Embedded consensus server interface

use crate::node::NodeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Raw leader value reported by a raft server that knows no leader.
pub const NO_LEADER: u64 = 0;

/// Lifecycle status of an embedded consensus server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// Constructed but not yet serving raft traffic
    Starting,

    /// Participating in the cluster
    Running,

    /// Shut down; its state must no longer be trusted
    Stopped,
}

impl ServerStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Starting,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Running => 1,
            Self::Stopped => 2,
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Read access to the leadership state an embedded raft server maintains.
///
/// Implementations must be safe to call concurrently and must answer from
/// memory: no network I/O, no waiting on the raft loop.
pub trait RaftServer: Send + Sync {
    /// The locally cached leader id, or [`NO_LEADER`].
    fn lead(&self) -> u64;

    /// Current lifecycle status
    fn status(&self) -> ServerStatus {
        ServerStatus::Running
    }
}

/// In-process raft server whose leader field is driven by its host.
///
/// Holds nothing but atomics so reads never contend with the host's raft
/// loop publishing leader changes.
#[derive(Debug)]
pub struct LocalRaftServer {
    id: NodeId,
    lead: AtomicU64,
    status: AtomicU8,
    lead_changes: AtomicU64,
}

impl LocalRaftServer {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            lead: AtomicU64::new(NO_LEADER),
            status: AtomicU8::new(ServerStatus::Starting.as_u8()),
            lead_changes: AtomicU64::new(0),
        }
    }

    /// Local node id
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn start(&self) {
        self.status
            .store(ServerStatus::Running.as_u8(), Ordering::Release);
        tracing::info!("Started raft server for node {}", self.id);
    }

    pub fn stop(&self) {
        self.status
            .store(ServerStatus::Stopped.as_u8(), Ordering::Release);
        tracing::info!("Stopped raft server for node {}", self.id);
    }

    /// Publish the leader observed by the raft loop.
    pub fn set_lead(&self, lead: u64) {
        let previous = self.lead.swap(lead, Ordering::AcqRel);
        self.lead_changes.fetch_add(1, Ordering::AcqRel);

        if previous != lead {
            if lead == NO_LEADER {
                tracing::info!("Node {} lost track of leader {}", self.id, previous);
            } else {
                tracing::info!(
                    "Node {} observed leader change {} -> {}",
                    self.id,
                    previous,
                    lead
                );
            }
        }
    }

    pub fn clear_lead(&self) {
        self.set_lead(NO_LEADER);
    }

    /// Number of leader updates applied so far
    pub fn lead_changes(&self) -> u64 {
        self.lead_changes.load(Ordering::Acquire)
    }
}

impl RaftServer for LocalRaftServer {
    fn lead(&self) -> u64 {
        self.lead.load(Ordering::Acquire)
    }

    fn status(&self) -> ServerStatus {
        ServerStatus::from_u8(self.status.load(Ordering::Acquire))
    }
}
