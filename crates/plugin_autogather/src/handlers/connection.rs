//! # Connection Handler
//!
//! Session lifecycle events: login, zone load, the player spawning into a
//! loaded zone, and channel updates.
//!
//! A player spawn is the point where a pending resume (after a channel change
//! or a revive) picks the gather loop back up.

use tracing::{debug, info};

use crate::handlers::channel::ChannelTarget;
use crate::link::ProxyLink;
use crate::session::{GatherSession, GatherState};
use crate::timers::Timer;
use crate::types::{GameId, ZoneId};

impl<L: ProxyLink> GatherSession<L> {
    pub(crate) fn on_login(&mut self, player_id: u32, game_id: GameId) {
        info!("🌿 Logged in as player {} (game id {})", player_id, game_id);
        self.player.player_id = Some(player_id);
        self.player.game_id = Some(game_id);
    }

    /// Handles a finished zone load.
    ///
    /// Every load drops all live spawns and tracked hostiles. An actual zone
    /// change additionally rewinds the cursor and sorts and persists the
    /// bucket being gathered.
    pub(crate) fn on_zone_load(&mut self, zone: ZoneId) {
        self.live_nodes.clear();
        self.threats.clear();

        let changed = self.cursor.zone != Some(zone);
        self.cursor.zone = Some(zone);
        if changed {
            info!("🌿 Entered zone {}", self.names.zone_name(zone));
            self.cursor.seek_index = 0;
            if let Some(key) = self.cursor.bucket() {
                self.cache.sort(key);
            }
            self.cache.save();
        } else {
            debug!("🌿 Reloaded zone {}", zone);
        }
        self.cache.ensure_zone(zone);
    }

    pub(crate) fn on_player_spawn(&mut self) {
        if !self.recovery.resume_on_load {
            return;
        }

        if self.recovery.just_died {
            self.recovery.just_died = false;
            match self.recovery.channel_on_death {
                Some(channel) if self.player.channel != Some(channel) => {
                    self.notify(format!("Revived! Changing back to channel {}", channel));
                    self.cursor.enabled = true;
                    self.change_channel(Some(ChannelTarget::Exact(channel)));
                    return;
                }
                _ => {
                    self.notify(format!(
                        "Revived! Resuming gathering in {} seconds!",
                        self.settings.seek_delay().as_secs_f64()
                    ));
                }
            }
        }

        self.recovery.resume_on_load = false;
        self.cursor.enabled = true;
        self.state = GatherState::Seeking;
        self.schedule(self.settings.seek_delay(), Timer::Seek);
    }

    pub(crate) fn on_channel_update(&mut self, channel: u32) {
        debug!("🌿 Current channel is now {}", channel);
        self.player.channel = Some(channel);
    }
}
