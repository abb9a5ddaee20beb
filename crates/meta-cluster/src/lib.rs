//! Meta Cluster Leadership
//!
//! This crate answers one question for the rest of a meta node: which cluster
//! member currently leads, according to the consensus server embedded in this
//! process. Callers depend on [`LeaderQuery`]; the embedded server sits behind
//! [`EmbeddedConsensusAdapter`] and can be swapped for any other backend.

pub mod adapter;
pub mod config;
pub mod consensus;
pub mod error;
pub mod leader;
pub mod node;
pub mod routing;

pub use adapter::EmbeddedConsensusAdapter;
pub use config::{ClusterConfig, LeaderWaitConfig, MemberConfig};
pub use consensus::{LocalRaftServer, RaftServer, ServerStatus, NO_LEADER};
pub use error::{ClusterError, Result};
pub use leader::{FixedLeader, LeaderQuery};
pub use node::NodeId;
pub use routing::{wait_for_leader, ClusterStatus, LeaderRouter, Route};
