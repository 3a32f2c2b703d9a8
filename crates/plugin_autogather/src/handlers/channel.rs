//! # Channel Handler
//!
//! Moves the player to another channel once every cached location of the
//! current one has been visited, and back to the pre-death channel after a
//! revive.
//!
//! ## Sequence
//!
//! 1. wait `channel_step_delay`, then request the channel list for the zone
//! 2. on the reply, resolve the [`ChannelTarget`] against the channel count
//!    and flag a resume for the next player spawn
//! 3. wait `channel_step_delay`, then send the channel select
//!
//! Only one request is ever outstanding and a reply is consumed at most once.
//! A request left unanswered for `channel_reply_timeout` disables automation;
//! it is not retried.

use tracing::{debug, warn};

use crate::error::AutogatherError;
use crate::events::OutboundCommand;
use crate::link::ProxyLink;
use crate::session::{GatherSession, GatherState};
use crate::timers::{Timer, TimerSlot};
use crate::types::ZoneId;

/// Where a channel change is heading. Channel numbers are one-based and come
/// straight from the server, so they are only trusted once the channel count
/// is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelTarget {
    /// The channel after this one, wrapping past the last.
    After(u32),
    /// This exact channel, or channel 1 if it does not exist.
    Exact(u32),
}

/// An outstanding channel list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingChannelRequest {
    pub zone: ZoneId,
    pub target: ChannelTarget,
}

#[derive(Debug, Default)]
pub struct ChannelRotator {
    pending: Option<PendingChannelRequest>,
}

impl ChannelRotator {
    pub fn pending(&self) -> Option<PendingChannelRequest> {
        self.pending
    }

    pub fn begin(&mut self, request: PendingChannelRequest) {
        self.pending = Some(request);
    }

    /// Takes the pending request if `zone` answers it.
    pub fn take_reply(&mut self, zone: ZoneId) -> Option<PendingChannelRequest> {
        match self.pending {
            Some(request) if request.zone == zone => self.pending.take(),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Resolves the one-based channel to select out of `count` available.
    ///
    /// `None` when the zone reports no channels at all.
    pub fn pick_channel(target: ChannelTarget, count: usize) -> Option<u32> {
        if count == 0 {
            return None;
        }
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        match target {
            ChannelTarget::After(current) => Some(current % count + 1),
            ChannelTarget::Exact(channel) if channel == 0 || channel > count => Some(1),
            ChannelTarget::Exact(channel) => Some(channel),
        }
    }
}

impl<L: ProxyLink> GatherSession<L> {
    /// Starts a channel switch. `None` means the current channel is unknown.
    pub(crate) fn change_channel(&mut self, target: Option<ChannelTarget>) {
        let Some(target) = target else {
            warn!("🌿 Channel change requested with no known current channel");
            self.notify("Invalid target channel! Aborting!");
            self.pause();
            return;
        };
        self.state = GatherState::ChannelSwitching;
        self.timers.cancel(TimerSlot::Gather);
        self.schedule(self.settings.channel_step_delay(), Timer::RequestChannels { target });
    }

    pub(crate) fn request_channels(&mut self, target: ChannelTarget) {
        let Some(zone) = self.cursor.zone else {
            self.notify("Invalid target channel! Aborting!");
            self.pause();
            return;
        };
        debug!("🌿 Requesting channel list for zone {} (target {:?})", zone, target);
        self.rotator.begin(PendingChannelRequest { zone, target });
        self.link.to_server(OutboundCommand::ChannelListRequest { zone });
        self.schedule(self.settings.channel_reply_timeout(), Timer::ChannelReplyTimeout);
    }

    pub(crate) fn on_channel_list(&mut self, zone: ZoneId, channels: &[u32]) {
        let Some(request) = self.rotator.take_reply(zone) else {
            debug!("🌿 Unsolicited channel list for zone {}", zone);
            return;
        };
        self.timers.cancel(TimerSlot::Channel);

        let Some(channel) = ChannelRotator::pick_channel(request.target, channels.len()) else {
            self.notify("No channels available! Aborting!");
            self.pause();
            return;
        };
        self.notify(format!("Prepare to change to channel {} of {}", channel, channels.len()));
        self.recovery.resume_on_load = true;
        self.schedule(self.settings.channel_step_delay(), Timer::SelectChannel { channel });
    }

    pub(crate) fn select_channel(&mut self, channel: u32) {
        let Some(zone) = self.cursor.zone else {
            return;
        };
        self.link.to_server(OutboundCommand::ChannelSelect {
            zone,
            channel: channel.saturating_sub(1),
        });
        self.state = GatherState::Idle;
    }

    pub(crate) fn on_channel_reply_timeout(&mut self) {
        let zone = self.rotator.pending().map(|request| request.zone);
        self.rotator.clear();
        self.pause();
        if let Some(zone) = zone {
            warn!("🌿 {}", AutogatherError::ChannelReplyMissing(zone));
        }
        self.notify("No channel list received. Stopping auto-gather.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_next_channel_wraps_past_the_last_channel() {
        use ChannelTarget::After;
        assert_eq!(ChannelRotator::pick_channel(After(1), 3), Some(2));
        assert_eq!(ChannelRotator::pick_channel(After(2), 3), Some(3));
        assert_eq!(ChannelRotator::pick_channel(After(3), 3), Some(1));
        assert_eq!(ChannelRotator::pick_channel(After(0), 3), Some(1));
        assert_eq!(ChannelRotator::pick_channel(After(7), 3), Some(2));
        assert_eq!(ChannelRotator::pick_channel(After(1), 0), None);
    }

    #[test]
    fn test_pick_next_channel_handles_extreme_current_channel() {
        use ChannelTarget::After;
        assert_eq!(ChannelRotator::pick_channel(After(u32::MAX), 3), Some(1));
        assert_eq!(ChannelRotator::pick_channel(After(u32::MAX), 2), Some(2));
        assert_eq!(ChannelRotator::pick_channel(After(u32::MAX), 1), Some(1));
    }

    #[test]
    fn test_pick_exact_channel_falls_back_to_first() {
        use ChannelTarget::Exact;
        assert_eq!(ChannelRotator::pick_channel(Exact(2), 3), Some(2));
        assert_eq!(ChannelRotator::pick_channel(Exact(4), 3), Some(1));
        assert_eq!(ChannelRotator::pick_channel(Exact(0), 3), Some(1));
        assert_eq!(ChannelRotator::pick_channel(Exact(u32::MAX), 3), Some(1));
    }

    #[test]
    fn test_reply_is_consumed_once_and_only_for_its_zone() {
        let mut rotator = ChannelRotator::default();
        rotator.begin(PendingChannelRequest { zone: ZoneId(7004), target: ChannelTarget::After(1) });

        assert_eq!(rotator.take_reply(ZoneId(1)), None);
        assert!(rotator.take_reply(ZoneId(7004)).is_some());
        assert_eq!(rotator.take_reply(ZoneId(7004)), None);
    }
}
