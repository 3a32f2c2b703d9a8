//! Registry of nodes that are spawned and visible right now.
//!
//! Entries live from a spawn packet to the matching despawn, and the whole
//! registry is dropped on every zone load. It is the bridge between where the
//! cache says a node should be and what the server actually has spawned.

use std::collections::BTreeMap;

use crate::types::{GameId, Location};

#[derive(Debug, Default)]
pub struct LiveNodeRegistry {
    nodes: BTreeMap<GameId, Location>,
}

impl LiveNodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, id: GameId, location: Location) {
        self.nodes.insert(id, location);
    }

    pub fn remove(&mut self, id: GameId) -> Option<Location> {
        self.nodes.remove(&id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the lowest-id live node within tolerance of `target` on all
    /// three axes.
    pub fn find_matching(&self, target: &Location) -> Option<GameId> {
        self.nodes
            .iter()
            .find(|(_, loc)| loc.approx_eq(target, true))
            .map(|(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matching_compares_height() {
        let mut registry = LiveNodeRegistry::new();
        registry.upsert(GameId(1), Location::new(0.0, 0.0, 300.0));
        registry.upsert(GameId(2), Location::new(1000.0, 0.0, 0.0));

        assert_eq!(registry.find_matching(&Location::new(10.0, 0.0, 0.0)), None);
        assert_eq!(
            registry.find_matching(&Location::new(10.0, 0.0, 290.0)),
            Some(GameId(1))
        );
    }

    #[test]
    fn test_despawn_and_clear() {
        let mut registry = LiveNodeRegistry::new();
        registry.upsert(GameId(1), Location::new(0.0, 0.0, 0.0));
        registry.upsert(GameId(2), Location::new(500.0, 0.0, 0.0));

        assert!(registry.remove(GameId(1)).is_some());
        assert!(registry.remove(GameId(1)).is_none());
        assert_eq!(registry.len(), 1);

        registry.clear();
        assert!(registry.is_empty());
    }
}
