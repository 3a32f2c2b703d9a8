//! Nearby hostile entity tracking.
//!
//! The only consumer is the damage interrupt: it asks whether the source of an
//! incoming hit is a known entity standing close to the player.

use std::collections::HashMap;

use crate::types::{GameId, Location};

/// Last known state of a spawned NPC.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreatEntity {
    pub id: GameId,
    pub template_id: u32,
    pub relation: u32,
    pub hunting_zone_id: u32,
    pub location: Location,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct ThreatTracker {
    entities: HashMap<GameId, ThreatEntity>,
}

impl ThreatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, entity: ThreatEntity) {
        self.entities.insert(entity.id, entity);
    }

    /// Moves a tracked entity. Unknown ids are ignored.
    pub fn update_location(&mut self, id: GameId, location: Location) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.location = location;
        }
    }

    pub fn remove(&mut self, id: GameId) -> Option<ThreatEntity> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: GameId) -> Option<&ThreatEntity> {
        self.entities.get(&id)
    }

    /// Forgets every entity; nothing survives a zone load.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// `true` when `id` is tracked and closer than `radius` to `reference` on
    /// the ground plane.
    pub fn is_near(&self, id: GameId, reference: &Location, radius: f64) -> bool {
        self.entities
            .get(&id)
            .is_some_and(|e| e.location.planar_distance(reference) < radius)
    }
}
