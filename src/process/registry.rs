//! Pool/Lane Registry
//!
//! Deduplicates pools and lanes as steps arrive and keeps everything in
//! first-seen order. Pools get ids `P1, P2, ...` and lanes `L1, L2, ...`
//! across the whole process, so ids are stable for a given input.

use std::collections::HashMap;

use log::debug;

use super::model::Step;

/// A horizontal track inside a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    pub id: String,
    /// Name of the owning pool
    pub pool: String,
    pub name: String,
    /// Member step ids in insertion order
    pub steps: Vec<String>,
}

/// A top-level container of lanes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub id: String,
    pub name: String,
    pub lanes: Vec<Lane>,
}

/// Ordered, deduplicated pools and lanes.
///
/// Purely additive: there is no removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneRegistry {
    pools: Vec<Pool>,
    /// (pool name, lane name) -> (pool index, lane index)
    index: HashMap<(String, String), (usize, usize)>,
    lane_count: usize,
}

/// Splits a lane token on its first `/` into (pool, lane).
///
/// A bare token belongs to `default_pool`. Both parts are trimmed.
pub fn split_lane_token<'a>(token: &'a str, default_pool: &'a str) -> (&'a str, &'a str) {
    match token.split_once('/') {
        Some((pool, lane)) => (pool.trim(), lane.trim()),
        None => (default_pool, token.trim()),
    }
}

/// Resolves the final (pool, lane) names for a step.
///
/// An explicit pool replaces the process-wide default for bare tokens; a
/// compound `pool/lane` token always wins. Empty parts fall back to the
/// defaults.
pub fn resolve_lane(
    token: &str,
    explicit_pool: Option<&str>,
    default_pool: &str,
    default_lane: &str,
) -> (String, String) {
    let fallback_pool = explicit_pool
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(default_pool);

    let (pool, lane) = split_lane_token(token, fallback_pool);
    let pool = if pool.is_empty() { fallback_pool } else { pool };
    let lane = if lane.is_empty() { default_lane } else { lane };

    (pool.to_string(), lane.to_string())
}

impl LaneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from steps whose pool and lane are already resolved.
    pub fn from_steps(steps: &[Step]) -> Self {
        let mut registry = Self::new();
        for step in steps {
            registry.register(&step.id, &step.pool, &step.lane);
        }
        debug!(
            "Registered {} pools, {} lanes",
            registry.pools.len(),
            registry.lane_count
        );
        registry
    }

    /// Appends a step to its (pool, lane), creating either on first mention.
    pub fn register(&mut self, step_id: &str, pool: &str, lane: &str) -> &Lane {
        let key = (pool.to_string(), lane.to_string());

        let (pool_idx, lane_idx) = match self.index.get(&key).copied() {
            Some(position) => position,
            None => {
                let pool_idx = self.pool_index_or_insert(pool);
                self.lane_count += 1;
                let lanes = &mut self.pools[pool_idx].lanes;
                lanes.push(Lane {
                    id: format!("L{}", self.lane_count),
                    pool: pool.to_string(),
                    name: lane.to_string(),
                    steps: Vec::new(),
                });
                let position = (pool_idx, lanes.len() - 1);
                self.index.insert(key, position);
                position
            }
        };

        let lane = &mut self.pools[pool_idx].lanes[lane_idx];
        lane.steps.push(step_id.to_string());
        lane
    }

    fn pool_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(idx) = self.pools.iter().position(|p| p.name == name) {
            return idx;
        }
        self.pools.push(Pool {
            id: format!("P{}", self.pools.len() + 1),
            name: name.to_string(),
            lanes: Vec::new(),
        });
        self.pools.len() - 1
    }

    /// Pools in first-seen order.
    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    /// All lanes, pool by pool, in first-seen order.
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.pools.iter().flat_map(|p| p.lanes.iter())
    }

    /// Looks up a lane by its (pool, lane) names.
    pub fn lane(&self, pool: &str, lane: &str) -> Option<&Lane> {
        self.index
            .get(&(pool.to_string(), lane.to_string()))
            .map(|&(p, l)| &self.pools[p].lanes[l])
    }

    /// Finds the lane holding a step.
    pub fn lane_of(&self, step_id: &str) -> Option<&Lane> {
        self.lanes().find(|lane| lane.steps.iter().any(|s| s == step_id))
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
