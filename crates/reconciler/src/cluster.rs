//! Member cluster discovery and selection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// A registered downstream cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberCluster {
    pub name: String,
}

impl MemberCluster {
    /// Create a member cluster descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Source of the currently registered member clusters.
///
/// Implementations report a fresh view on every call and keep a stable order
/// for a given membership, so "first" is deterministic.
#[async_trait]
pub trait ClusterSelector: Send + Sync {
    /// Registered member clusters, in a stable order.
    async fn member_clusters(&self) -> Vec<MemberCluster>;

    /// Pick a cluster for a new account. `None` when none are registered.
    async fn select(&self) -> Option<MemberCluster> {
        self.member_clusters().await.into_iter().next()
    }
}

/// A fixed list of clusters, typically from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticClusterSelector {
    clusters: Vec<MemberCluster>,
}

impl StaticClusterSelector {
    /// Create a selector over `names`, in order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            clusters: names.into_iter().map(MemberCluster::new).collect(),
        }
    }
}

#[async_trait]
impl ClusterSelector for StaticClusterSelector {
    async fn member_clusters(&self) -> Vec<MemberCluster> {
        self.clusters.clone()
    }
}

/// Clusters that register and deregister while the process runs.
#[derive(Debug, Default)]
pub struct ClusterRegistry {
    clusters: RwLock<Vec<MemberCluster>>,
}

impl ClusterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cluster. Returns `false` when it was already registered.
    pub async fn add(&self, name: impl Into<String>) -> bool {
        let cluster = MemberCluster::new(name);
        let mut clusters = self.clusters.write().await;
        if clusters.contains(&cluster) {
            return false;
        }
        tracing::info!(cluster = %cluster.name, "Member cluster registered");
        clusters.push(cluster);
        true
    }

    /// Deregister a cluster. Returns `false` when it was not registered.
    pub async fn remove(&self, name: &str) -> bool {
        let mut clusters = self.clusters.write().await;
        let before = clusters.len();
        clusters.retain(|c| c.name != name);
        let removed = clusters.len() != before;
        if removed {
            tracing::info!(cluster = name, "Member cluster deregistered");
        }
        removed
    }
}

#[async_trait]
impl ClusterSelector for ClusterRegistry {
    async fn member_clusters(&self) -> Vec<MemberCluster> {
        self.clusters.read().await.clone()
    }
}
