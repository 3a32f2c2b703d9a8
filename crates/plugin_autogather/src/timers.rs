//! One-shot timer queue for the session's delayed steps.
//!
//! Every timer belongs to a [`TimerSlot`] and a slot holds at most one pending
//! timer: scheduling into an occupied slot invalidates the previous timer
//! first. This is how a fresh damage event supersedes a pending resume, and how
//! stopping automation drops whatever gather step was queued.
//!
//! Time is a [`Duration`] measured from an arbitrary session epoch. The queue
//! never reads a clock itself; callers pass `now` in.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::handlers::channel::ChannelTarget;
use crate::types::GameId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// The move, scan, harvest and seek chain.
    Gather,
    Resume,
    Revive,
    Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    PreciseTeleport,
    Scan,
    Harvest(GameId),
    Seek,
    Resume,
    Revive,
    RequestChannels { target: ChannelTarget },
    SelectChannel { channel: u32 },
    ChannelReplyTimeout,
}

impl Timer {
    pub fn slot(&self) -> TimerSlot {
        match self {
            Timer::PreciseTeleport | Timer::Scan | Timer::Harvest(_) | Timer::Seek => TimerSlot::Gather,
            Timer::Resume => TimerSlot::Resume,
            Timer::Revive => TimerSlot::Revive,
            Timer::RequestChannels { .. } | Timer::SelectChannel { .. } | Timer::ChannelReplyTimeout => {
                TimerSlot::Channel
            }
        }
    }
}

/// Ordered by deadline, then by scheduling order.
type TimerKey = (Duration, u64);

#[derive(Debug, Default)]
pub struct TimerQueue {
    queue: BTreeMap<TimerKey, Timer>,
    slots: HashMap<TimerSlot, TimerKey>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `timer` to fire at `at`, replacing any timer pending in its slot.
    pub fn schedule(&mut self, at: Duration, timer: Timer) {
        let slot = timer.slot();
        self.cancel(slot);
        let key = (at, self.next_seq);
        self.next_seq += 1;
        self.queue.insert(key, timer);
        self.slots.insert(slot, key);
    }

    /// Drops the timer pending in `slot`. Returns `true` if one was pending.
    pub fn cancel(&mut self, slot: TimerSlot) -> bool {
        match self.slots.remove(&slot) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, slot: TimerSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(at, _)| *at)
    }

    /// Removes and returns the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<Timer> {
        let key = *self.queue.keys().next()?;
        if key.0 > now {
            return None;
        }
        let timer = self.queue.remove(&key)?;
        self.slots.remove(&timer.slot());
        Some(timer)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(300), Timer::Revive);
        timers.schedule(ms(100), Timer::Scan);
        timers.schedule(ms(200), Timer::Resume);

        assert_eq!(timers.next_deadline(), Some(ms(100)));
        assert_eq!(timers.pop_due(ms(50)), None);
        assert_eq!(timers.pop_due(ms(250)), Some(Timer::Scan));
        assert_eq!(timers.pop_due(ms(250)), Some(Timer::Resume));
        assert_eq!(timers.pop_due(ms(250)), None);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_rescheduling_a_slot_replaces_the_pending_timer() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(100), Timer::Resume);
        timers.schedule(ms(900), Timer::Resume);

        assert_eq!(timers.len(), 1);
        assert_eq!(timers.pop_due(ms(500)), None);
        assert_eq!(timers.pop_due(ms(900)), Some(Timer::Resume));
        assert!(!timers.is_pending(TimerSlot::Resume));
    }

    #[test]
    fn test_gather_steps_share_one_slot() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(100), Timer::Scan);
        timers.schedule(ms(100), Timer::Harvest(GameId(4)));

        assert_eq!(timers.pop_due(ms(100)), Some(Timer::Harvest(GameId(4))));
        assert!(timers.is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(100), Timer::Seek);

        assert!(timers.cancel(TimerSlot::Gather));
        assert!(!timers.cancel(TimerSlot::Gather));
        assert_eq!(timers.next_deadline(), None);
    }
}
