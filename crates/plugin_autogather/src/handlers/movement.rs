//! # Movement Handler
//!
//! Outbound teleports and the client's own position reports.
//!
//! ## Timestamp Ordering
//!
//! The server disconnects a client whose movement timestamps go backwards.
//! Both paths that put a timestamp on the wire go through the session's
//! [`PositionClock`](crate::clock::PositionClock): automated teleports take a
//! fresh stamp, and client reports that fell behind are rewritten before they
//! are forwarded.

use rand::Rng;
use tracing::{trace, warn};

use crate::events::{ClientPositionReport, OutboundCommand, PositionUpdate, Verdict, MOVEMENT_TYPE_TELEPORT};
use crate::link::ProxyLink;
use crate::session::GatherSession;
use crate::types::Location;

/// Offsets `base` by a uniform amount in `[-variance, variance]`.
fn jitter(rng: &mut impl Rng, base: f64, variance: f64) -> f64 {
    if variance <= 0.0 {
        return base;
    }
    base + rng.gen_range(-variance..=variance)
}

impl<L: ProxyLink> GatherSession<L> {
    /// Sends a teleport-style position update towards `target`.
    ///
    /// # Parameters
    ///
    /// - `target`: destination before adjustment
    /// - `xy_jitter`: maximum random offset applied to `x` and `y`
    /// - `lift`: added to `z` so the character lands above the terrain
    ///
    /// # Returns
    ///
    /// `false` if `target` is not a usable location and nothing was sent.
    pub(crate) fn teleport(&mut self, target: Location, xy_jitter: f64, lift: f64) -> bool {
        if !target.is_finite() {
            warn!("🌿 Refusing to teleport to invalid location {:?}", target);
            self.notify("Invalid location!");
            return false;
        }

        let mut rng = rand::thread_rng();
        let destination = Location::new(
            jitter(&mut rng, target.x, xy_jitter),
            jitter(&mut rng, target.y, xy_jitter),
            target.z + lift,
        );
        let heading = self.player.location.heading_to(&destination);
        let timestamp = self.clock.next_timestamp();
        self.player.location = destination;

        trace!("🌿 Teleport to {} at t={}", destination, timestamp);
        self.link.to_server(OutboundCommand::PositionUpdate(PositionUpdate {
            location: destination,
            heading,
            destination,
            movement_type: MOVEMENT_TYPE_TELEPORT,
            timestamp,
        }));
        true
    }

    /// Inspects a position report from the client while automation runs.
    ///
    /// Reports are left alone while automation is off.
    pub(crate) fn on_client_position(&mut self, mut report: ClientPositionReport) -> Verdict {
        if !self.cursor.enabled {
            return Verdict::Forward;
        }

        let corrected = self.clock.correct_report(report.timestamp);
        self.player.location = report.destination;
        match corrected {
            Some(timestamp) => {
                trace!("🌿 Client report at t={} rewritten to t={}", report.timestamp, timestamp);
                report.timestamp = timestamp;
                Verdict::Replace(report)
            }
            None => Verdict::Forward,
        }
    }
}
