//! # Gathering Session
//!
//! The single context object that owns every piece of mutable state: the node
//! cache, the live node and threat registries, the seek cursor, player state,
//! the timer queue and the link to the proxy.
//!
//! ## Scheduling Model
//!
//! All entry points ([`GatherSession::handle_event`],
//! [`GatherSession::handle_command`], [`GatherSession::advance`]) take `&mut
//! self`, so no two callbacks ever run at the same time. Delayed steps are
//! one-shot timers in a [`TimerQueue`]; each step re-checks `enabled` when it
//! fires, and disabling the session cancels the pending gather step outright.
//!
//! ## Gather Loop
//!
//! ```text
//! Idle -> Seeking -> Moving -> Scanning -> Harvesting -> Seeking ...
//!            |                    |
//!            |                    +-- no live node: next index -> Seeking
//!            +-- index == bucket length -> ChannelSwitching -> Idle
//!                                      (resumes on the next player spawn)
//! ```
//!
//! Damage and death are handled in [`crate::handlers::combat`], channel
//! changes in [`crate::handlers::channel`].

use std::time::Duration;
use tracing::{debug, info, trace};

use crate::cache::SpatialCache;
use crate::clock::PositionClock;
use crate::error::AutogatherError;
use crate::events::{InboundEvent, Verdict};
use crate::handlers::channel::{ChannelRotator, ChannelTarget};
use crate::link::ProxyLink;
use crate::live_nodes::LiveNodeRegistry;
use crate::names::NameTable;
use crate::settings::GatherSettings;
use crate::threats::ThreatTracker;
use crate::timers::{Timer, TimerQueue, TimerSlot};
use crate::types::{BucketKey, GameId, Location, ResourceTypeId, ZoneId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptReason {
    Damage,
    Death,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherState {
    Idle,
    Seeking,
    Moving,
    Scanning,
    Harvesting,
    Interrupted(InterruptReason),
    ChannelSwitching,
}

/// Where the automation currently is in the cache.
#[derive(Debug, Default, Clone)]
pub struct Cursor {
    pub zone: Option<ZoneId>,
    pub resource: Option<ResourceTypeId>,
    /// Inventory item produced by `resource`.
    pub item_id: Option<u32>,
    /// Next candidate index in the active bucket. Only bounded when a seek
    /// step runs; a value equal to the bucket length means "exhausted".
    pub seek_index: usize,
    pub enabled: bool,
}

impl Cursor {
    pub fn bucket(&self) -> Option<BucketKey> {
        Some(BucketKey::new(self.zone?, self.resource?))
    }
}

#[derive(Debug, Default, Clone)]
pub struct PlayerState {
    pub player_id: Option<u32>,
    pub game_id: Option<GameId>,
    pub location: Location,
    pub channel: Option<u32>,
    /// Count of the targeted resource's item across the inventory listing.
    pub gathered_in_inventory: u32,
}

/// Bookkeeping for damage, death and zone-load resumption.
#[derive(Debug, Default, Clone)]
pub(crate) struct Recovery {
    pub damaged_while_enabled: bool,
    pub just_died: bool,
    pub channel_on_death: Option<u32>,
    pub resume_on_load: bool,
}

pub struct GatherSession<L: ProxyLink> {
    pub(crate) settings: GatherSettings,
    pub(crate) names: NameTable,
    pub(crate) cache: SpatialCache,
    pub(crate) live_nodes: LiveNodeRegistry,
    pub(crate) threats: ThreatTracker,
    pub(crate) cursor: Cursor,
    pub(crate) player: PlayerState,
    pub(crate) recovery: Recovery,
    pub(crate) rotator: ChannelRotator,
    pub(crate) timers: TimerQueue,
    pub(crate) clock: PositionClock,
    pub(crate) state: GatherState,
    pub(crate) now: Duration,
    pub(crate) link: L,
}

impl<L: ProxyLink> GatherSession<L> {
    pub fn new(
        settings: GatherSettings,
        names: NameTable,
        cache: SpatialCache,
        clock: PositionClock,
        link: L,
    ) -> Self {
        debug!("🌿 GatherSession: Creating new session, cache at {}", cache.path().display());
        Self {
            settings,
            names,
            cache,
            live_nodes: LiveNodeRegistry::new(),
            threats: ThreatTracker::new(),
            cursor: Cursor::default(),
            player: PlayerState::default(),
            recovery: Recovery::default(),
            rotator: ChannelRotator::default(),
            timers: TimerQueue::new(),
            clock,
            state: GatherState::Idle,
            now: Duration::ZERO,
            link,
        }
    }

    pub fn state(&self) -> GatherState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.cursor.enabled
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn cache(&self) -> &SpatialCache {
        &self.cache
    }

    pub fn live_nodes(&self) -> &LiveNodeRegistry {
        &self.live_nodes
    }

    pub fn threats(&self) -> &ThreatTracker {
        &self.threats
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn is_timer_pending(&self, slot: TimerSlot) -> bool {
        self.timers.is_pending(slot)
    }

    /// Earliest time at which [`GatherSession::advance`] has work to do.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Persists the node cache; used on shutdown.
    pub fn save_cache(&self) {
        self.cache.save();
    }

    /// Fires every timer due at or before `now`, in deadline order.
    ///
    /// Each timer runs with the session clock set to its own deadline, so a
    /// late wake-up replays a chain of steps exactly as if it had been on time.
    pub fn advance(&mut self, now: Duration) {
        while let Some(deadline) = self.timers.next_deadline() {
            if deadline > now {
                break;
            }
            self.now = self.now.max(deadline);
            match self.timers.pop_due(deadline) {
                Some(timer) => self.fire(timer),
                None => break,
            }
        }
        self.now = self.now.max(now);
    }

    /// Feeds one inbound packet to the session.
    pub fn handle_event(&mut self, now: Duration, event: InboundEvent) -> Verdict {
        self.advance(now);
        trace!("🌿 Inbound event: {:?}", event);
        match event {
            InboundEvent::Login { player_id, game_id } => self.on_login(player_id, game_id),
            InboundEvent::NodeSpawn { node_type, location, game_id, extractor } => {
                self.on_node_spawn(node_type, location, game_id, extractor)
            }
            InboundEvent::NodeDespawn { game_id } => self.on_node_despawn(game_id),
            InboundEvent::ZoneLoad { zone } => self.on_zone_load(zone),
            InboundEvent::PlayerSpawn => self.on_player_spawn(),
            InboundEvent::ChannelUpdate { channel } => self.on_channel_update(channel),
            InboundEvent::HealthChange { target, source, diff, current_hp } => {
                self.on_health_change(target, source, diff, current_hp)
            }
            InboundEvent::GatherFinish { user, result, fatigability } => {
                self.on_gather_finish(user, result, fatigability)
            }
            InboundEvent::InventoryList { container, pocket, first, items } => {
                self.on_inventory_list(container, pocket, first, &items)
            }
            InboundEvent::HostileSpawn { game_id, template_id, relation, hunting_zone_id, location, name } => {
                self.on_hostile_spawn(game_id, template_id, relation, hunting_zone_id, location, name)
            }
            InboundEvent::HostileLocation { game_id, destination } => {
                self.threats.update_location(game_id, destination)
            }
            InboundEvent::HostileDespawn { game_id } => {
                self.threats.remove(game_id);
            }
            InboundEvent::ChannelList { zone, channels } => self.on_channel_list(zone, &channels),
            InboundEvent::ClientPosition(report) => return self.on_client_position(report),
        }
        Verdict::Forward
    }

    fn fire(&mut self, timer: Timer) {
        trace!("🌿 Timer fired at {:?}: {:?}", self.now, timer);
        match timer {
            Timer::PreciseTeleport => self.settle_on_node(),
            Timer::Scan => self.scan_for_node(),
            Timer::Harvest(node) => self.harvest_node(node),
            Timer::Seek => self.seek(),
            Timer::Resume => self.attempt_resume(),
            Timer::Revive => self.revive(),
            Timer::RequestChannels { target } => self.request_channels(target),
            Timer::SelectChannel { channel } => self.select_channel(channel),
            Timer::ChannelReplyTimeout => self.on_channel_reply_timeout(),
        }
    }

    pub(crate) fn schedule(&mut self, delay: Duration, timer: Timer) {
        self.timers.schedule(self.now + delay, timer);
    }

    pub(crate) fn notify(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        debug!("🌿 {}", text);
        self.link.message(text);
    }

    pub(crate) fn resource_name(&self) -> String {
        match self.cursor.resource {
            Some(id) => self.names.resource_name(id),
            None => "nothing".to_string(),
        }
    }

    pub(crate) fn zone_name(&self) -> String {
        match self.cursor.zone {
            Some(id) => self.names.zone_name(id),
            None => "an unknown zone".to_string(),
        }
    }

    /// Checks that a resource is selected and the current zone has recorded
    /// locations for it.
    pub(crate) fn validate_area_and_resource(&self) -> Result<BucketKey, AutogatherError> {
        let Some(resource) = self.cursor.resource else {
            return Err(AutogatherError::InvalidArgument("Set a gatherable resource first.".to_string()));
        };
        let Some(zone) = self.cursor.zone else {
            return Err(AutogatherError::InvalidArgument("No zone loaded yet.".to_string()));
        };
        let key = BucketKey::new(zone, resource);
        if self.cache.len(key) == 0 {
            return Err(AutogatherError::NoCachedLocations(key));
        }
        Ok(key)
    }

    /// Renders a recovered error as an operator status line.
    pub(crate) fn explain(&self, error: &AutogatherError) -> String {
        match error {
            AutogatherError::InvalidArgument(reason) => reason.clone(),
            AutogatherError::IndexOutOfRange { .. } => "Invalid index specified.".to_string(),
            AutogatherError::NoCachedLocations(key) => format!(
                "No spawn locations available for {} in {}",
                self.names.resource_name(key.resource),
                self.names.zone_name(key.zone)
            ),
            other => other.to_string(),
        }
    }

    /// Operator toggle: starts automation if it is off, stops it otherwise.
    pub(crate) fn toggle(&mut self) {
        if self.cursor.enabled {
            self.stop();
            self.notify("Stopping auto-gather.");
            return;
        }

        let key = match self.validate_area_and_resource() {
            Ok(key) => key,
            Err(e) => {
                debug!("🌿 Toggle rejected: {}", e);
                let text = self.explain(&e);
                self.notify(text);
                return;
            }
        };

        self.timers.cancel(TimerSlot::Resume);
        self.cursor.enabled = true;
        self.recovery.damaged_while_enabled = false;
        info!("🌿 Auto-gather enabled for resource {} in zone {}", key.resource, key.zone);
        self.notify(format!(
            "Begin auto-gathering {} in {}",
            self.resource_name(),
            self.zone_name()
        ));
        self.seek();
    }

    /// Operator stop: drops every pending automation step.
    pub(crate) fn stop(&mut self) {
        self.pause();
        self.timers.cancel(TimerSlot::Resume);
        self.timers.cancel(TimerSlot::Channel);
        self.rotator.clear();
        self.recovery.damaged_while_enabled = false;
        self.recovery.resume_on_load = false;
        self.recovery.just_died = false;
        info!("🌿 Auto-gather disabled by operator");
    }

    /// Disables automation and cancels the pending gather step.
    pub(crate) fn pause(&mut self) {
        self.cursor.enabled = false;
        self.timers.cancel(TimerSlot::Gather);
        self.state = GatherState::Idle;
    }

    /// Picks the next safe cached location and moves there, or starts a
    /// channel change once the bucket is exhausted.
    pub(crate) fn seek(&mut self) {
        if !self.cursor.enabled {
            debug!("🌿 Seek step skipped: automation disabled");
            self.state = GatherState::Idle;
            return;
        }
        self.state = GatherState::Seeking;
        self.notify(format!(
            "Currently {} of {} in inventory",
            self.player.gathered_in_inventory,
            self.resource_name()
        ));

        let key = self.cursor.bucket();
        let len = key.map_or(0, |key| self.cache.len(key));
        let Some(key) = key.filter(|_| len > 0) else {
            self.pause();
            self.notify(format!(
                "No nodes found for {} in {}",
                self.resource_name(),
                self.zone_name()
            ));
            return;
        };

        let start = self.cursor.seek_index.min(len);
        let target = self
            .cache
            .get(key)
            .unwrap_or_default()
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, record)| record.safe)
            .map_or(len, |(index, _)| index);
        let last = len - 1;
        match target.saturating_sub(start) {
            0 => {}
            1 => self.notify(format!("Position {} of {} is unsafe. Skipping.", start, last)),
            _ => self.notify(format!(
                "Positions {} to {} of {} are unsafe. Skipping.",
                start,
                target - 1,
                last
            )),
        }
        self.cursor.seek_index = target;

        if target >= len {
            self.notify("All nodes in this channel checked!");
            self.cursor.seek_index = 0;
            let next = self.player.channel.map(ChannelTarget::After);
            self.change_channel(next);
        } else {
            self.move_to_node(key, target, len);
        }
    }

    fn move_to_node(&mut self, key: BucketKey, index: usize, len: usize) {
        let Some(location) = self.cache.get(key).and_then(|b| b.get(index)).map(|r| r.location) else {
            return;
        };
        self.state = GatherState::Moving;
        self.notify(format!("Teleport to node position {} of {}.", index, len - 1));
        let (jitter, lift) = (self.settings.coarse_jitter, self.settings.vertical_offset);
        self.teleport(location, jitter, lift);
        self.schedule(self.settings.precise_teleport_delay(), Timer::PreciseTeleport);
    }

    /// Second half of the move: land exactly on the node, then wait for the
    /// character to settle before scanning.
    fn settle_on_node(&mut self) {
        if !self.cursor.enabled {
            return;
        }
        let Some(location) = self.target_location() else {
            // The cursor left the bucket mid-move; the seek step bounds it.
            debug!("🌿 Seek index {} no longer in the bucket, seeking again", self.cursor.seek_index);
            self.schedule(Duration::ZERO, Timer::Seek);
            return;
        };
        let lift = self.settings.vertical_offset;
        self.teleport(location, 0.0, lift);
        self.schedule(self.settings.settle_delay(), Timer::Scan);
    }

    /// Location of the record under the seek cursor.
    pub(crate) fn target_location(&self) -> Option<Location> {
        let key = self.cursor.bucket()?;
        self.cache
            .get(key)?
            .get(self.cursor.seek_index)
            .map(|record| record.location)
    }

    /// Advances the cursor and schedules the next seek step.
    pub(crate) fn prepare_next(&mut self, delay: Duration) {
        if !self.cursor.enabled {
            debug!("🌿 Prepare to check aborted: automation disabled");
            return;
        }
        self.cursor.seek_index += 1;
        self.schedule(delay, Timer::Seek);
    }
}
