//! Cluster configuration management

use crate::consensus::NO_LEADER;
use crate::error::{ClusterError, Result};
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Main cluster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Id of this node in the raft membership
    pub node_id: NodeId,

    /// Name of the cluster
    pub cluster_name: String,

    /// Every voting member, this node included
    pub members: Vec<MemberConfig>,

    /// How long callers wait for a leader to emerge
    #[serde(default)]
    pub leader_wait: LeaderWaitConfig,
}

/// A single cluster member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberConfig {
    pub id: NodeId,

    /// Human-readable member name
    pub name: String,

    /// Address peers use to reach this member
    pub peer_address: SocketAddr,
}

/// Waiting for a leader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderWaitConfig {
    /// Give up after this long
    pub timeout: Duration,

    /// Delay between two leader queries
    pub poll_interval: Duration,
}

impl Default for LeaderWaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        let node_id = NodeId::new(1);
        Self {
            node_id,
            cluster_name: "meta-cluster".to_string(),
            members: vec![MemberConfig {
                id: node_id,
                name: "meta-1".to_string(),
                peer_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 2380)),
            }],
            leader_wait: LeaderWaitConfig::default(),
        }
    }
}

impl ClusterConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClusterError::configuration(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ClusterError::configuration(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ClusterError::configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ClusterError::configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.cluster_name.is_empty() {
            return Err(ClusterError::configuration("Cluster name cannot be empty"));
        }

        if self.members.is_empty() {
            return Err(ClusterError::configuration(
                "At least one cluster member must be configured",
            ));
        }

        let mut seen = HashSet::new();
        for member in &self.members {
            // 0 is what the raft server reports when it knows no leader
            if member.id.get() == NO_LEADER {
                return Err(ClusterError::configuration(format!(
                    "Member '{}' uses reserved node id 0",
                    member.name
                )));
            }

            if !seen.insert(member.id) {
                return Err(ClusterError::configuration(format!(
                    "Duplicate member id {}",
                    member.id
                )));
            }
        }

        if self.local_member().is_none() {
            return Err(ClusterError::configuration(format!(
                "Local node {} is not among the configured members",
                self.node_id
            )));
        }

        if self.leader_wait.poll_interval < Duration::from_millis(10) {
            return Err(ClusterError::configuration(
                "Leader poll interval must be at least 10ms",
            ));
        }

        if self.leader_wait.timeout < self.leader_wait.poll_interval {
            return Err(ClusterError::configuration(
                "Leader wait timeout must not be shorter than the poll interval",
            ));
        }

        Ok(())
    }

    /// Look up a member by id
    pub fn member(&self, id: NodeId) -> Option<&MemberConfig> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn local_member(&self) -> Option<&MemberConfig> {
        self.member(self.node_id)
    }
}
