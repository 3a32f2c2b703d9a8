//! Timing and threshold settings for the gathering session.
//!
//! Deserialized from the `[gather]` table of the host configuration file.
//! Every field has a default so a partial table is always accepted.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_seek_delay_ms() -> u64 { 1500 }
fn default_resume_delay_ms() -> u64 { 5000 }
fn default_revive_delay_ms() -> u64 { 5000 }
fn default_resume_grace_ms() -> u64 { 750 }
fn default_harvest_delay_ms() -> u64 { 250 }
fn default_next_node_delay_ms() -> u64 { 100 }
fn default_precise_teleport_delay_ms() -> u64 { 500 }
fn default_settle_delay_ms() -> u64 { 500 }
fn default_channel_step_delay_ms() -> u64 { 1000 }
fn default_channel_reply_timeout_ms() -> u64 { 10_000 }
fn default_coarse_jitter() -> f64 { 25.0 }
fn default_vertical_offset() -> f64 { 5.0 }
fn default_threat_radius() -> f64 { 600.0 }
fn default_fatigue_threshold() -> u32 { 20 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatherSettings {
    /// Wait before moving on when no node is found at a location, and before
    /// resuming after a zone load.
    #[serde(default = "default_seek_delay_ms")]
    pub seek_delay_ms: u64,
    /// Quiet period after damage before gathering resumes.
    #[serde(default = "default_resume_delay_ms")]
    pub resume_delay_ms: u64,
    /// Wait after death before the revive request is sent.
    #[serde(default = "default_revive_delay_ms")]
    pub revive_delay_ms: u64,
    #[serde(default = "default_resume_grace_ms")]
    pub resume_grace_ms: u64,
    /// Delay between spotting a live node and starting the interaction.
    #[serde(default = "default_harvest_delay_ms")]
    pub harvest_delay_ms: u64,
    #[serde(default = "default_next_node_delay_ms")]
    pub next_node_delay_ms: u64,
    #[serde(default = "default_precise_teleport_delay_ms")]
    pub precise_teleport_delay_ms: u64,
    /// Wait after the precise teleport before scanning, so falling ends first.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Delay before each step of the channel change protocol.
    #[serde(default = "default_channel_step_delay_ms")]
    pub channel_step_delay_ms: u64,
    #[serde(default = "default_channel_reply_timeout_ms")]
    pub channel_reply_timeout_ms: u64,
    /// Maximum random XY offset of the first, coarse teleport.
    #[serde(default = "default_coarse_jitter")]
    pub coarse_jitter: f64,
    /// Height added to every automated teleport.
    #[serde(default = "default_vertical_offset")]
    pub vertical_offset: f64,
    /// Damage from a tracked hostile closer than this marks the node unsafe.
    #[serde(default = "default_threat_radius")]
    pub threat_radius: f64,
    /// Remaining fatigue below which gathering stops.
    #[serde(default = "default_fatigue_threshold")]
    pub fatigue_threshold: u32,
}

impl Default for GatherSettings {
    fn default() -> Self {
        Self {
            seek_delay_ms: default_seek_delay_ms(),
            resume_delay_ms: default_resume_delay_ms(),
            revive_delay_ms: default_revive_delay_ms(),
            resume_grace_ms: default_resume_grace_ms(),
            harvest_delay_ms: default_harvest_delay_ms(),
            next_node_delay_ms: default_next_node_delay_ms(),
            precise_teleport_delay_ms: default_precise_teleport_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            channel_step_delay_ms: default_channel_step_delay_ms(),
            channel_reply_timeout_ms: default_channel_reply_timeout_ms(),
            coarse_jitter: default_coarse_jitter(),
            vertical_offset: default_vertical_offset(),
            threat_radius: default_threat_radius(),
            fatigue_threshold: default_fatigue_threshold(),
        }
    }
}

impl GatherSettings {
    pub fn seek_delay(&self) -> Duration {
        Duration::from_millis(self.seek_delay_ms)
    }

    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }

    pub fn revive_delay(&self) -> Duration {
        Duration::from_millis(self.revive_delay_ms)
    }

    pub fn resume_grace(&self) -> Duration {
        Duration::from_millis(self.resume_grace_ms)
    }

    pub fn harvest_delay(&self) -> Duration {
        Duration::from_millis(self.harvest_delay_ms)
    }

    pub fn next_node_delay(&self) -> Duration {
        Duration::from_millis(self.next_node_delay_ms)
    }

    pub fn precise_teleport_delay(&self) -> Duration {
        Duration::from_millis(self.precise_teleport_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn channel_step_delay(&self) -> Duration {
        Duration::from_millis(self.channel_step_delay_ms)
    }

    pub fn channel_reply_timeout(&self) -> Duration {
        Duration::from_millis(self.channel_reply_timeout_ms)
    }
}
