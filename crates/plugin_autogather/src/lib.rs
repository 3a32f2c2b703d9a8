//! # Auto-Gather Plugin
//!
//! Client-side gathering automation for an MMO game proxy. The plugin walks a
//! character through every cached resource node location of a zone, starts a
//! gather wherever a live node is found, backs off when attacked, and rotates
//! to the next channel once the zone's locations are exhausted.
//!
//! ## Overview
//!
//! - **Spatial cache**: every node location ever seen, per zone and resource
//!   type, persisted to a JSON side-file and grown from live spawn packets
//! - **Live registry**: nodes currently spawned around the player
//! - **Threat tracker**: hostiles around the player, used to attribute damage
//! - **State machine**: seek, move, scan and harvest, with damage and death
//!   interrupts
//! - **Channel rotation**: list request and channel select once a zone is done
//!
//! ## Driving a Session
//!
//! The transport owns a [`GatherSession`] and feeds it three kinds of input,
//! each stamped with a monotonic `now`:
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use plugin_autogather::{
//!     GatherSession, GatherSettings, InboundEvent, NameTable, PositionClock,
//!     RecordingLink, SpatialCache, SystemUptime, ZoneId,
//! };
//!
//! let mut session = GatherSession::new(
//!     GatherSettings::default(),
//!     NameTable::default(),
//!     SpatialCache::load("resources.json"),
//!     PositionClock::new(Box::new(SystemUptime)),
//!     RecordingLink::new(),
//! );
//! session.handle_event(Duration::ZERO, InboundEvent::ZoneLoad { zone: ZoneId(7004) });
//! session.handle_command(Duration::from_millis(10), "setid 301");
//! session.handle_command(Duration::from_millis(20), "");
//! if let Some(deadline) = session.next_deadline() {
//!     session.advance(deadline);
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`session`] - the session object and the seek/move core
//! - [`handlers`] - inbound events and timer steps, one module per concern
//! - [`commands`] - operator command parsing and execution
//! - [`cache`], [`live_nodes`], [`threats`] - the three registries
//! - [`timers`], [`clock`] - timer queue and outbound timestamp clamping
//! - [`events`], [`link`] - wire types and the transport seam

pub mod cache;
pub mod clock;
pub mod commands;
pub mod error;
pub mod events;
pub mod handlers;
pub mod link;
pub mod live_nodes;
pub mod names;
pub mod session;
pub mod settings;
pub mod threats;
pub mod timers;
pub mod types;

pub use cache::{NodeRecord, SpatialCache};
pub use clock::{PositionClock, SystemUptime, UptimeSource};
pub use commands::OperatorCommand;
pub use error::AutogatherError;
pub use events::{ClientPositionReport, InboundEvent, OutboundCommand, PositionUpdate, Verdict};
pub use link::{ProxyLink, RecordingLink};
pub use names::NameTable;
pub use session::{GatherSession, GatherState, InterruptReason};
pub use settings::GatherSettings;
pub use timers::TimerSlot;
pub use types::{BucketKey, GameId, Location, ResourceTypeId, ZoneId};
