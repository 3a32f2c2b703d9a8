//! # Event Handler Modules
//!
//! Each module adds one `impl` block to [`GatherSession`](crate::GatherSession),
//! grouping the inbound events and timer steps of a single concern.
//!
//! ## Handler Organization
//!
//! - [`connection`] - login, zone load, player spawn and channel updates
//! - [`movement`] - outbound teleports and client position reports
//! - [`scanning`] - live node sightings, matching and harvesting
//! - [`combat`] - damage, death, revive and resume, hostile tracking
//! - [`channel`] - channel list request and channel select
//!
//! Handlers never block. Delayed work is scheduled on the session's timer
//! queue and re-validated when it fires.

pub mod channel;
pub mod combat;
pub mod connection;
pub mod movement;
pub mod scanning;
