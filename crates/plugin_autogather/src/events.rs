//! # Session Event Data Structures
//!
//! Typed messages crossing the boundary between the proxy transport and the
//! gathering session.
//!
//! ## Directions
//!
//! - [`InboundEvent`] - packets observed by the proxy (server to client, plus
//!   the client's own position reports)
//! - [`OutboundCommand`] - packets the session asks the proxy to inject
//!   towards the server
//!
//! ## Serialization
//!
//! Both enums are internally tagged with a kebab-case `"type"` field so a
//! transport can carry them as JSON lines:
//!
//! ```json
//! { "type": "zone-load", "zone": 7004 }
//! { "type": "gather-start", "target": 1234 }
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{GameId, Location, ResourceTypeId, ZoneId};

/// Movement type the server expects for a teleport-style position update.
pub const MOVEMENT_TYPE_TELEPORT: u32 = 7;
/// Revive type for "revive at the nearest village".
pub const REVIVE_TYPE_NEAREST: u32 = 0;
/// Target id sent with a self-revive request.
pub const REVIVE_TARGET_SELF: u32 = 0xFFFF_FFFF;
/// Inventory container id whose listings never hold gathered items.
pub const IGNORED_CONTAINER: u32 = 14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: u32,
    pub amount: u32,
}

/// Position report sent by the game client itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientPositionReport {
    pub location: Location,
    pub destination: Location,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InboundEvent {
    /// Character entered the world.
    Login { player_id: u32, game_id: GameId },
    /// A gatherable node became visible.
    NodeSpawn {
        node_type: ResourceTypeId,
        location: Location,
        game_id: GameId,
        #[serde(default)]
        extractor: bool,
    },
    NodeDespawn { game_id: GameId },
    /// A zone finished loading; all spawns from the previous zone are gone.
    ZoneLoad { zone: ZoneId },
    /// The player character spawned into the loaded zone.
    PlayerSpawn,
    ChannelUpdate { channel: u32 },
    HealthChange {
        target: GameId,
        source: GameId,
        diff: i64,
        current_hp: i64,
    },
    GatherFinish {
        user: GameId,
        result: u32,
        fatigability: u32,
    },
    InventoryList {
        container: u32,
        pocket: u32,
        first: bool,
        items: Vec<InventoryItem>,
    },
    HostileSpawn {
        game_id: GameId,
        template_id: u32,
        relation: u32,
        hunting_zone_id: u32,
        location: Location,
        #[serde(default)]
        name: String,
    },
    HostileLocation { game_id: GameId, destination: Location },
    HostileDespawn { game_id: GameId },
    /// Reply to [`OutboundCommand::ChannelListRequest`].
    ChannelList { zone: ZoneId, channels: Vec<u32> },
    ClientPosition(ClientPositionReport),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub location: Location,
    /// Facing angle in radians.
    pub heading: f64,
    pub destination: Location,
    pub movement_type: u32,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutboundCommand {
    Revive { revive_type: u32, target: u32 },
    PositionUpdate(PositionUpdate),
    ChannelListRequest { zone: ZoneId },
    /// `channel` is zero-based on the wire.
    ChannelSelect { zone: ZoneId, channel: u32 },
    GatherStart { target: GameId },
}

/// What the transport should do with the inbound packet after the session saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Forward,
    /// Forward this corrected report instead of the original.
    Replace(ClientPositionReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_events_parse_from_tagged_json() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"type":"node-spawn","node_type":301,"game_id":55,
                "location":{"x":1.0,"y":2.0,"z":3.0}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            InboundEvent::NodeSpawn {
                node_type: ResourceTypeId(301),
                location: Location::new(1.0, 2.0, 3.0),
                game_id: GameId(55),
                extractor: false,
            }
        );

        let spawn: InboundEvent = serde_json::from_str(r#"{"type":"player-spawn"}"#).unwrap();
        assert_eq!(spawn, InboundEvent::PlayerSpawn);
    }

    #[test]
    fn test_outbound_command_tagging() {
        let json = serde_json::to_value(OutboundCommand::GatherStart { target: GameId(9) }).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "gather-start", "target": 9 }));
    }
}
