//! Grid-bucketed snapshot of live agents.
//!
//! [`SpatialAgentCache::refresh`] is the only O(n) pass; afterwards the
//! cluster center and per-agent separation vectors are precomputed lookups
//! and `nearby_count` only scans the cells overlapping its radius. Agents read
//! a cache that may be one refresh old.

use std::collections::HashMap;

use glam::{IVec2, Vec2};

use crate::config::CacheConfig;
use crate::env::{AgentId, AgentSnapshot};

#[derive(Clone, Copy, Debug, PartialEq)]
struct CachedAgent {
    id: AgentId,
    position: Vec2,
    cell: IVec2,
}

#[derive(Clone, Debug)]
pub struct SpatialAgentCache {
    config: CacheConfig,
    agents: Vec<CachedAgent>,
    lookup: HashMap<AgentId, usize>,
    cells: HashMap<IVec2, Vec<usize>>,
    separations: Vec<Vec2>,
    cluster_center: Vec2,
    anchor: Vec2,
}

impl SpatialAgentCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            agents: Vec::new(),
            lookup: HashMap::new(),
            cells: HashMap::new(),
            separations: Vec::new(),
            cluster_center: Vec2::ZERO,
            anchor: Vec2::ZERO,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn cell_of(&self, position: Vec2) -> IVec2 {
        (position / self.config.cell_size).floor().as_ivec2()
    }

    /// Rebuilds the grid from `agents`, skipping dead ones, and recomputes the
    /// cluster center against `anchor` (usually the player position).
    pub fn refresh(&mut self, agents: &[AgentSnapshot], anchor: Vec2) {
        self.agents.clear();
        self.lookup.clear();
        self.cells.clear();
        self.anchor = anchor;

        for snapshot in agents.iter().filter(|s| s.alive) {
            if self.lookup.contains_key(&snapshot.id) {
                continue;
            }
            let index = self.agents.len();
            let cell = self.cell_of(snapshot.position);
            self.agents.push(CachedAgent {
                id: snapshot.id,
                position: snapshot.position,
                cell,
            });
            self.lookup.insert(snapshot.id, index);
            self.cells.entry(cell).or_default().push(index);
        }

        self.separations = (0..self.agents.len())
            .map(|index| self.compute_separation(index))
            .collect();
        self.cluster_center = self.compute_cluster_center();

        tracing::debug!(
            "SpatialAgentCache: refreshed {} agents in {} cells, cluster at {}",
            self.agents.len(),
            self.cells.len(),
            self.cluster_center
        );
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.lookup.contains_key(&id)
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Centroid of the densest cell, pulled toward the anchor. Equal counts
    /// resolve to the smallest cell coordinates. With no agents this is the
    /// anchor itself.
    pub fn cluster_center(&self) -> Vec2 {
        self.cluster_center
    }

    /// Unit vector pointing away from crowded neighbors; zero when the agent
    /// is unknown or alone.
    pub fn separation_vector(&self, id: AgentId) -> Vec2 {
        self.lookup
            .get(&id)
            .and_then(|&index| self.separations.get(index).copied())
            .unwrap_or(Vec2::ZERO)
    }

    /// Live agents strictly within `radius` of `id`, excluding itself.
    ///
    /// Counting stops at the configured cap, so the result is exact only below
    /// it.
    pub fn nearby_count(&self, id: AgentId, radius: f32) -> usize {
        match self.lookup.get(&id) {
            Some(&index) => self.count_near(self.agents[index].position, radius, Some(index)),
            None => 0,
        }
    }

    /// Same as [`nearby_count`](Self::nearby_count) around an arbitrary point.
    pub fn nearby_count_at(&self, center: Vec2, radius: f32) -> usize {
        self.count_near(center, radius, None)
    }

    fn count_near(&self, center: Vec2, radius: f32, exclude: Option<usize>) -> usize {
        let cap = self.config.nearby_cap;
        if !(radius > 0.0) || cap == 0 {
            return 0;
        }

        let radius_sq = radius * radius;
        let reach = (radius / self.config.cell_size).ceil() as i32;
        let origin = self.cell_of(center);
        let mut count = 0;

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let Some(bucket) = self.cells.get(&(origin + IVec2::new(dx, dy))) else {
                    continue;
                };
                for &other in bucket {
                    if Some(other) == exclude {
                        continue;
                    }
                    if self.agents[other].position.distance_squared(center) < radius_sq {
                        count += 1;
                        if count >= cap {
                            return count;
                        }
                    }
                }
            }
        }
        count
    }

    /// Scans the 3x3 cells around the agent; `CacheConfig::validate` keeps
    /// the separation radius within one cell.
    fn compute_separation(&self, index: usize) -> Vec2 {
        let agent = self.agents[index];
        let radius = self.config.separation_radius;
        let mut separation = Vec2::ZERO;

        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(bucket) = self.cells.get(&(agent.cell + IVec2::new(dx, dy))) else {
                    continue;
                };
                for &other in bucket {
                    if other == index {
                        continue;
                    }
                    let away = agent.position - self.agents[other].position;
                    let distance = away.length();
                    if distance < radius {
                        separation +=
                            away.normalize_or_zero() / distance.max(self.config.min_distance);
                    }
                }
            }
        }
        separation.normalize_or_zero()
    }

    fn compute_cluster_center(&self) -> Vec2 {
        let mut densest: Option<(IVec2, usize)> = None;
        for (&cell, bucket) in &self.cells {
            let better = match densest {
                None => true,
                Some((best, count)) => {
                    bucket.len() > count
                        || (bucket.len() == count && (cell.x, cell.y) < (best.x, best.y))
                }
            };
            if better {
                densest = Some((cell, bucket.len()));
            }
        }

        let Some((cell, count)) = densest.filter(|(_, count)| *count > 0) else {
            return self.anchor;
        };
        let centroid = self.cells[&cell]
            .iter()
            .map(|&i| self.agents[i].position)
            .sum::<Vec2>()
            / count as f32;
        centroid.lerp(self.anchor, self.config.anchor_pull)
    }
}

impl Default for SpatialAgentCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
