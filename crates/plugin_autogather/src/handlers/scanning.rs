//! # Scanning Handler
//!
//! Everything between arriving at a cached location and finishing a gather:
//! recording node sightings, matching the target against live spawns,
//! starting the gather interaction, and reading its result. Inventory
//! listings are tallied here too since they only matter for progress output.

use tracing::{debug, info, trace};

use crate::events::{InventoryItem, OutboundCommand, IGNORED_CONTAINER};
use crate::link::ProxyLink;
use crate::session::{GatherSession, GatherState};
use crate::timers::Timer;
use crate::types::{BucketKey, GameId, Location, ResourceTypeId};

/// Gather result code the client uses for an interrupted gather.
const GATHER_RESULT_INTERRUPTED: u32 = 0;

impl<L: ProxyLink> GatherSession<L> {
    /// Grows the cache from a node sighting and tracks the spawn if it is the
    /// resource being gathered.
    pub(crate) fn on_node_spawn(
        &mut self,
        node_type: ResourceTypeId,
        location: Location,
        game_id: GameId,
        extractor: bool,
    ) {
        let Some(zone) = self.cursor.zone else {
            trace!("🌿 Node {} spawned before any zone load, ignoring", game_id);
            return;
        };
        self.cache.record_sighting(BucketKey::new(zone, node_type), location);

        if !extractor && self.cursor.resource == Some(node_type) {
            self.live_nodes.upsert(game_id, location);
        }
    }

    pub(crate) fn on_node_despawn(&mut self, game_id: GameId) {
        self.live_nodes.remove(game_id);
    }

    /// Looks for a live node at the cursor's cached location.
    pub(crate) fn scan_for_node(&mut self) {
        if !self.cursor.enabled {
            return;
        }
        self.state = GatherState::Scanning;
        let index = self.cursor.seek_index;
        let found = self
            .target_location()
            .and_then(|target| self.live_nodes.find_matching(&target));

        match found {
            Some(node) => {
                self.notify(format!(
                    "{} found at position {}! Begin gathering!",
                    self.resource_name(),
                    index
                ));
                self.schedule(self.settings.harvest_delay(), Timer::Harvest(node));
            }
            None => {
                self.notify(format!(
                    "No node found at position {}. Move to next position in {} seconds!",
                    index,
                    self.settings.seek_delay().as_secs_f64()
                ));
                self.prepare_next(self.settings.seek_delay());
            }
        }
    }

    pub(crate) fn harvest_node(&mut self, node: GameId) {
        if !self.cursor.enabled {
            return;
        }
        self.state = GatherState::Harvesting;
        debug!("🌿 Starting gather on node {}", node);
        self.link.to_server(OutboundCommand::GatherStart { target: node });
    }

    /// Reads the outcome of a gather started by this session.
    pub(crate) fn on_gather_finish(&mut self, user: GameId, result: u32, fatigability: u32) {
        if self.player.game_id != Some(user) || !self.cursor.enabled {
            return;
        }

        if result == GATHER_RESULT_INTERRUPTED {
            self.notify("Gathering interrupted!!");
            self.pause();
            return;
        }
        debug!("🌿 Gather finished with result code {}", result);

        self.notify("Node harvested! Moving to next position!");
        if fatigability < self.settings.fatigue_threshold {
            info!("🌿 Remaining fatigue {} below threshold, stopping", fatigability);
            self.notify("Out of production points now!!");
            self.pause();
            return;
        }
        self.prepare_next(self.settings.next_node_delay());
    }

    /// Tallies the targeted item across a (possibly multi-page) inventory listing.
    pub(crate) fn on_inventory_list(&mut self, container: u32, pocket: u32, first: bool, items: &[InventoryItem]) {
        if pocket != 0 || container == IGNORED_CONTAINER {
            return;
        }
        if first {
            self.player.gathered_in_inventory = 0;
        }
        let Some(item_id) = self.cursor.item_id else {
            return;
        };
        self.player.gathered_in_inventory = items
            .iter()
            .filter(|item| item.id == item_id)
            .fold(self.player.gathered_in_inventory, |total, item| total.saturating_add(item.amount));
    }
}
