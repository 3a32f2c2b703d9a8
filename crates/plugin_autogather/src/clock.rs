//! Timestamps for outbound position updates.
//!
//! The server timestamps movement with the client's system uptime and drops
//! the session if a packet arrives with a timestamp earlier than the previous
//! one. Uptime can only be approximated from outside the client, so every
//! stamp handed out by [`PositionClock`] is clamped to be strictly later than
//! the last one sent.

use std::time::{SystemTime, UNIX_EPOCH};
use sysinfo::System;

/// Added to the uptime estimate to stay slightly ahead of the client.
const UPTIME_LEAD_MS: u64 = 150;
/// Step used when an automated update would not move time forward.
const UPDATE_CLAMP_STEP_MS: u64 = 50;
/// Step used when rewriting a client report that fell behind.
const REPORT_CLAMP_STEP_MS: u64 = 75;

/// Source of "milliseconds since boot" readings.
pub trait UptimeSource: Send {
    fn uptime_ms(&self) -> u64;
}

/// Uptime read from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemUptime;

impl UptimeSource for SystemUptime {
    fn uptime_ms(&self) -> u64 {
        let subsec_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::from(d.subsec_millis()))
            .unwrap_or(0);
        System::uptime() * 1000 + subsec_ms + UPTIME_LEAD_MS
    }
}

pub struct PositionClock {
    source: Box<dyn UptimeSource>,
    last_sent: u64,
}

impl PositionClock {
    pub fn new(source: Box<dyn UptimeSource>) -> Self {
        Self { source, last_sent: 0 }
    }

    pub fn last_sent(&self) -> u64 {
        self.last_sent
    }

    /// Returns the timestamp for the next automated position update.
    pub fn next_timestamp(&mut self) -> u64 {
        let reading = self.source.uptime_ms();
        let stamp = if reading <= self.last_sent {
            self.last_sent + UPDATE_CLAMP_STEP_MS
        } else {
            reading
        };
        self.last_sent = stamp;
        stamp
    }

    /// Checks a timestamp the client is about to send.
    ///
    /// Returns the corrected timestamp if the report would travel back in time
    /// relative to what was already sent, or `None` if it can pass unchanged.
    pub fn correct_report(&mut self, reported: u64) -> Option<u64> {
        if reported < self.last_sent {
            self.last_sent += REPORT_CLAMP_STEP_MS;
            Some(self.last_sent)
        } else {
            self.last_sent = reported;
            None
        }
    }
}

impl std::fmt::Debug for PositionClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionClock")
            .field("last_sent", &self.last_sent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Scripted(Arc<Mutex<Vec<u64>>>);

    impl UptimeSource for Scripted {
        fn uptime_ms(&self) -> u64 {
            self.0.lock().unwrap().remove(0)
        }
    }

    fn clock(readings: &[u64]) -> PositionClock {
        PositionClock::new(Box::new(Scripted(Arc::new(Mutex::new(readings.to_vec())))))
    }

    #[test]
    fn test_timestamps_strictly_increase_when_uptime_regresses() {
        let mut clock = clock(&[1000, 900, 1000, 1200]);
        let stamps: Vec<u64> = (0..4).map(|_| clock.next_timestamp()).collect();

        assert_eq!(stamps, vec![1000, 1050, 1100, 1200]);
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_client_report_behind_last_sent_is_rewritten() {
        let mut clock = clock(&[5000]);
        clock.next_timestamp();

        assert_eq!(clock.correct_report(4000), Some(5075));
        assert_eq!(clock.correct_report(6000), None);
        assert_eq!(clock.last_sent(), 6000);
    }

    #[test]
    fn test_system_uptime_is_positive() {
        assert!(SystemUptime.uptime_ms() >= UPTIME_LEAD_MS);
    }
}
