//! # Combat Handler
//!
//! Damage and death interrupts, plus the hostile tracking they rely on.
//!
//! ## Damage Classification
//!
//! | Source                          | Node marked unsafe | Outcome                     |
//! |---------------------------------|--------------------|-----------------------------|
//! | Tracked hostile within radius   | yes, saved at once | pause, resume after a delay |
//! | Unknown or distant source       | no                 | pause, resume after a delay |
//! | Any source, hit points reach 0  | only if near       | disable, revive after delay |
//!
//! Every new hit reschedules the pending resume, so the loop only picks up
//! again after a quiet period.

use tracing::{info, warn};

use crate::events::{OutboundCommand, REVIVE_TARGET_SELF, REVIVE_TYPE_NEAREST};
use crate::link::ProxyLink;
use crate::session::{GatherSession, GatherState, InterruptReason};
use crate::threats::ThreatEntity;
use crate::timers::{Timer, TimerSlot};
use crate::types::{GameId, Location};

impl<L: ProxyLink> GatherSession<L> {
    pub(crate) fn on_hostile_spawn(
        &mut self,
        id: GameId,
        template_id: u32,
        relation: u32,
        hunting_zone_id: u32,
        location: Location,
        name: String,
    ) {
        self.threats.upsert(ThreatEntity {
            id,
            template_id,
            relation,
            hunting_zone_id,
            location,
            name,
        });
    }

    /// Reacts to a hit point change on the player character.
    ///
    /// # Parameters
    ///
    /// - `target`: entity whose hit points changed
    /// - `source`: entity that caused the change
    /// - `diff`: signed change; only negative values are damage
    /// - `current_hp`: hit points after the change
    pub(crate) fn on_health_change(&mut self, target: GameId, source: GameId, diff: i64, current_hp: i64) {
        if self.player.game_id != Some(target) || diff >= 0 {
            return;
        }
        let fatal = current_hp <= 0;

        if self.cursor.enabled {
            let near = self
                .threats
                .is_near(source, &self.player.location, self.settings.threat_radius);
            if near {
                self.mark_current_unsafe();
            } else {
                self.notify("Took damage while gathering, from unknown / faraway source? Resuming in a bit.");
            }
            self.pause();
            self.state = GatherState::Interrupted(InterruptReason::Damage);
            if fatal {
                self.on_death();
            } else {
                self.recovery.damaged_while_enabled = true;
                self.schedule(self.settings.resume_delay(), Timer::Resume);
            }
        } else if self.recovery.damaged_while_enabled {
            if fatal {
                self.on_death();
            } else {
                self.notify("Taking damage!");
                self.schedule(self.settings.resume_delay(), Timer::Resume);
            }
        }
    }

    /// Flags the record under the cursor unsafe and persists the cache.
    fn mark_current_unsafe(&mut self) {
        let index = self.cursor.seek_index;
        let Some(key) = self.cursor.bucket() else {
            return;
        };
        match self.cache.set_safety(key, index, false) {
            Ok(()) => {
                self.notify(format!("Took damage from mob!! Node index {} marked as unsafe.", index));
                self.cache.save();
            }
            Err(e) => warn!("🌿 Could not mark node unsafe: {}", e),
        }
    }

    fn on_death(&mut self) {
        self.pause();
        self.timers.cancel(TimerSlot::Resume);
        self.state = GatherState::Interrupted(InterruptReason::Death);
        self.recovery.damaged_while_enabled = false;
        self.recovery.resume_on_load = true;
        self.recovery.just_died = true;
        self.notify(format!(
            "You have died! Reviving in {} seconds!",
            self.settings.revive_delay().as_secs_f64()
        ));
        self.schedule(self.settings.revive_delay(), Timer::Revive);
        self.state = GatherState::Idle;
    }

    pub(crate) fn revive(&mut self) {
        self.recovery.channel_on_death = self.player.channel;
        match self.player.channel {
            Some(channel) => self.notify(format!("Died in channel {} while gathering...", channel)),
            None => self.notify("Died while gathering..."),
        }
        self.link.to_server(OutboundCommand::Revive {
            revive_type: REVIVE_TYPE_NEAREST,
            target: REVIVE_TARGET_SELF,
        });
    }

    /// Fires after a quiet period following damage.
    pub(crate) fn attempt_resume(&mut self) {
        info!("🌿 No damage taken recently, resuming");
        self.cursor.enabled = true;
        self.recovery.damaged_while_enabled = false;
        self.state = GatherState::Seeking;
        self.notify("Attempting to resume gathering (no dmg taken in the past bit)");
        self.schedule(self.settings.resume_grace(), Timer::Seek);
    }
}
