//! Per-frame marker geometry cache and pointer hit-testing

use crate::node::Node;
use std::collections::{HashMap, HashSet};

/// Pointer must be closer than this many marker radii to count as a hit
const HIT_RADIUS_FACTOR: f32 = 2.0;

/// Where a node's marker was drawn in the last pass that showed it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedPosition {
    pub x: f32,
    pub y: f32,
    pub marker_radius: f32,
}

impl ProjectedPosition {
    fn contains(&self, px: f32, py: f32) -> bool {
        let (dx, dy) = (px - self.x, py - self.y);
        (dx * dx + dy * dy).sqrt() < self.marker_radius * HIT_RADIUS_FACTOR
    }
}

/// Marker geometry keyed by node id, kept apart from the node records
#[derive(Debug, Default)]
pub struct ProjectionCache {
    positions: HashMap<String, ProjectedPosition>,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, pos: ProjectedPosition) {
        match self.positions.get_mut(id) {
            Some(slot) => *slot = pos,
            None => {
                self.positions.insert(id.to_string(), pos);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ProjectedPosition> {
        self.positions.get(id)
    }

    pub fn remove(&mut self, id: &str) {
        self.positions.remove(id);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Drop entries whose id is not in `nodes`. Returns how many were evicted.
    pub fn retain_nodes(&mut self, nodes: &[Node]) -> usize {
        let before = self.positions.len();
        if nodes.is_empty() {
            self.positions.clear();
            return before;
        }
        let live: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        self.positions.retain(|id, _| live.contains(id.as_str()));
        before - self.positions.len()
    }
}

/// First node, in list order, whose cached marker is within the hit radius.
///
/// Nodes without a cached position are skipped. Only ids present in `nodes`
/// are ever looked up, so stale entries for removed nodes can't match.
pub fn hit_test<'a>(nodes: &'a [Node], cache: &ProjectionCache, px: f32, py: f32) -> Option<&'a Node> {
    nodes
        .iter()
        .find(|node| cache.get(&node.id).is_some_and(|pos| pos.contains(px, py)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn pos(x: f32, y: f32, r: f32) -> ProjectedPosition {
        ProjectedPosition { x, y, marker_radius: r }
    }

    #[test]
    fn threshold_is_two_marker_radii() {
        let nodes = vec![Node::new("a", NodeKind::Need, 0.0, 0.0)];
        let mut cache = ProjectionCache::new();
        cache.insert("a", pos(10.0, 10.0, 4.0));

        assert!(hit_test(&nodes, &cache, 10.0 + 4.0 * 1.99, 10.0).is_some());
        assert!(hit_test(&nodes, &cache, 10.0 + 4.0 * 2.01, 10.0).is_none());
    }

    #[test]
    fn first_match_wins_over_nearest() {
        let nodes = vec![
            Node::new("far", NodeKind::Need, 0.0, 0.0),
            Node::new("near", NodeKind::Help, 0.0, 0.0),
        ];
        let mut cache = ProjectionCache::new();
        cache.insert("far", pos(5.0, 0.0, 4.0));
        cache.insert("near", pos(0.5, 0.0, 4.0));

        assert_eq!(hit_test(&nodes, &cache, 0.0, 0.0).map(|n| n.id.as_str()), Some("far"));
    }

    #[test]
    fn uncached_nodes_are_skipped() {
        let nodes = vec![
            Node::new("hidden", NodeKind::Need, 0.0, 0.0),
            Node::new("shown", NodeKind::Help, 0.0, 0.0),
        ];
        let mut cache = ProjectionCache::new();
        cache.insert("shown", pos(0.0, 0.0, 4.0));

        assert_eq!(hit_test(&nodes, &cache, 0.0, 0.0).map(|n| n.id.as_str()), Some("shown"));
    }

    #[test]
    fn removed_node_never_matches() {
        let mut cache = ProjectionCache::new();
        cache.insert("gone", pos(0.0, 0.0, 4.0));
        let current = vec![Node::new("other", NodeKind::Help, 80.0, 80.0)];

        // Even before eviction the stale entry is unreachable
        assert!(hit_test(&current, &cache, 0.0, 0.0).is_none());
        assert_eq!(cache.retain_nodes(&current), 1);
        assert!(cache.get("gone").is_none());
    }

    #[test]
    fn retain_with_empty_list_clears() {
        let mut cache = ProjectionCache::new();
        cache.insert("a", pos(0.0, 0.0, 1.0));
        cache.insert("b", pos(0.0, 0.0, 1.0));
        assert_eq!(cache.retain_nodes(&[]), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_overwrites() {
        let mut cache = ProjectionCache::new();
        cache.insert("a", pos(0.0, 0.0, 1.0));
        cache.insert("a", pos(3.0, 4.0, 2.0));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), Some(&pos(3.0, 4.0, 2.0)));
    }
}
