//! Error types for the gathering session.
//!
//! Only [`AutogatherError::ConfigLoad`] is fatal. Every other variant is
//! recovered at the session boundary: it is reported to the operator and/or
//! the console log and the session keeps running.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{BucketKey, ZoneId};

#[derive(Error, Debug)]
pub enum AutogatherError {
    #[error("Failed to load configuration from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("Failed to load node cache from {path}: {reason}")]
    CacheLoad { path: PathBuf, reason: String },

    #[error("Failed to write node cache to {path}: {reason}")]
    CacheWrite { path: PathBuf, reason: String },

    #[error("Failed to load name table from {path}: {reason}")]
    NamesLoad { path: PathBuf, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Index {index} is out of range for {len} cached locations")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No cached locations for resource {} in zone {}", .0.resource, .0.zone)]
    NoCachedLocations(BucketKey),

    #[error("No channel list reply for zone {0} within the timeout")]
    ChannelReplyMissing(ZoneId),
}
