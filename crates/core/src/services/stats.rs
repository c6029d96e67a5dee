//! Per-issue vote statistics and their cache.
//!
//! Statistics are derived from an issue's full vote connection set. The cache
//! only ever drops entries; it never recomputes on its own. Callers must
//! invalidate an issue's entry before they add or remove one of its vote
//! connections, so no reader can observe stats for a set that is changing.

use std::collections::HashMap;
use std::sync::Arc;

use hdo_db::entities::vote_connection;
use serde::Serialize;
use tokio::sync::RwLock;

/// Statistics derived from an issue's vote connections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteStats {
    /// Number of connected votes.
    pub total: usize,
    /// Votes that support the issue.
    pub for_count: usize,
    /// Votes that oppose the issue.
    pub against_count: usize,
    /// Share of supporting votes in percent, `None` without any votes.
    pub score: Option<f64>,
}

/// Computes [`VoteStats`] from a connection set.
pub trait VoteScorer: Send + Sync {
    /// Compute stats for one issue's complete connection set.
    fn score(&self, connections: &[vote_connection::Model]) -> VoteStats;
}

/// Default scorer: plain for/against tally.
#[derive(Debug, Clone, Copy, Default)]
pub struct TallyScorer;

impl VoteScorer for TallyScorer {
    fn score(&self, connections: &[vote_connection::Model]) -> VoteStats {
        let total = connections.len();
        let for_count = connections.iter().filter(|c| c.matches).count();

        VoteStats {
            total,
            for_count,
            against_count: total - for_count,
            score: (total > 0).then(|| for_count as f64 * 100.0 / total as f64),
        }
    }
}

/// Memoized [`VoteStats`] keyed by issue id.
#[derive(Clone)]
pub struct StatsCache {
    entries: Arc<RwLock<HashMap<i32, Arc<VoteStats>>>>,
    scorer: Arc<dyn VoteScorer>,
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new(Arc::new(TallyScorer))
    }
}

impl StatsCache {
    /// Create an empty cache using the given scorer.
    #[must_use]
    pub fn new(scorer: Arc<dyn VoteScorer>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            scorer,
        }
    }

    /// Cached stats for an issue, if present.
    pub async fn get(&self, issue_id: i32) -> Option<Arc<VoteStats>> {
        self.entries.read().await.get(&issue_id).cloned()
    }

    /// Return cached stats, or compute them from `connections` and store them.
    pub async fn get_or_compute(
        &self,
        issue_id: i32,
        connections: &[vote_connection::Model],
    ) -> Arc<VoteStats> {
        if let Some(stats) = self.get(issue_id).await {
            return stats;
        }

        let stats = Arc::new(self.scorer.score(connections));
        self.entries
            .write()
            .await
            .entry(issue_id)
            .or_insert(stats)
            .clone()
    }

    /// Drop the cached stats for an issue.
    pub async fn invalidate(&self, issue_id: i32) {
        if self.entries.write().await.remove(&issue_id).is_some() {
            tracing::debug!(issue_id, "Invalidated vote stats");
        }
    }

    /// Number of cached issues.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
