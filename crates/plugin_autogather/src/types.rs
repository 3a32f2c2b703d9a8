//! # Core Type Definitions
//!
//! Identifier wrappers and the world-space [`Location`] shared by every part of
//! the gathering session.
//!
//! ## Key Types
//!
//! - [`ZoneId`] / [`ResourceTypeId`] - together they form a [`BucketKey`]
//! - [`GameId`] - volatile network instance id of a spawned entity
//! - [`Location`] - world coordinates with tolerance-based comparison
//!
//! Ids are plain integers on the wire; the wrappers keep a zone id from being
//! passed where a resource id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-axis tolerance used when two locations are considered the same spot.
pub const LOCATION_TOLERANCE: f64 = 50.0;

/// Identifier of a zone (map) in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u32);

/// Identifier of a gatherable resource type (node template).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceTypeId(pub u32);

/// Network-assigned instance id of a spawned entity (player, node or NPC).
///
/// These ids are only valid for the lifetime of the spawn they were handed
/// out with and must never be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ResourceTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite key of one bucket in the spatial cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub zone: ZoneId,
    pub resource: ResourceTypeId,
}

impl BucketKey {
    pub fn new(zone: ZoneId, resource: ResourceTypeId) -> Self {
        Self { zone, resource }
    }
}

/// A point in world space.
///
/// The game uses `x`/`y` for the ground plane and `z` for height, so planar
/// distances ignore `z`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns `true` if both points lie within [`LOCATION_TOLERANCE`] of each
    /// other on every compared axis. `z` is only compared when `compare_z` is set.
    ///
    /// The check is per axis (a box, not a sphere), so two points 50 units
    /// apart on both `x` and `y` still match.
    pub fn approx_eq(&self, other: &Location, compare_z: bool) -> bool {
        if (self.x - other.x).abs() > LOCATION_TOLERANCE
            || (self.y - other.y).abs() > LOCATION_TOLERANCE
        {
            return false;
        }
        !compare_z || (self.z - other.z).abs() <= LOCATION_TOLERANCE
    }

    /// Euclidean distance on the ground plane.
    pub fn planar_distance(&self, other: &Location) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Facing angle (radians) of a character at `self` looking towards `target`.
    pub fn heading_to(&self, target: &Location) -> f64 {
        (target.y - self.y).atan2(target.x - self.x)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_uses_per_axis_box() {
        let a = Location::new(0.0, 0.0, 0.0);
        assert!(a.approx_eq(&Location::new(50.0, -50.0, 0.0), true));
        assert!(!a.approx_eq(&Location::new(50.5, 0.0, 0.0), true));
        assert!(!a.approx_eq(&Location::new(0.0, 0.0, 80.0), true));
        assert!(a.approx_eq(&Location::new(0.0, 0.0, 80.0), false));
    }

    #[test]
    fn planar_distance_ignores_height() {
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(3.0, 4.0, 1000.0);
        assert_eq!(a.planar_distance(&b), 5.0);
    }

    #[test]
    fn heading_points_along_positive_y() {
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(0.0, 10.0, 0.0);
        assert!((a.heading_to(&b) - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&ZoneId(7004)).unwrap();
        assert_eq!(json, "7004");
    }
}
