//! Static display-name tables for resource types and zones.
//!
//! Read once at startup from a JSON resource. Lookups never fail: unknown ids
//! render as `"<id> (unknown ID)"` so operator messages stay readable.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info};

use crate::error::AutogatherError;
use crate::types::{ResourceTypeId, ZoneId};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatherableInfo {
    pub name: String,
    /// Inventory item produced by harvesting this resource.
    pub item_id: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameTable {
    #[serde(default)]
    gatherables: HashMap<ResourceTypeId, GatherableInfo>,
    #[serde(default)]
    zones: HashMap<ZoneId, String>,
}

impl NameTable {
    /// Loads the table, falling back to an empty one if the file is unusable.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(table) => {
                info!(
                    "🌿 Loaded {} resource and {} zone names from {}",
                    table.gatherables.len(),
                    table.zones.len(),
                    path.display()
                );
                table
            }
            Err(e) => {
                error!("🌿 {e}");
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, AutogatherError> {
        let err = |reason: String| AutogatherError::NamesLoad {
            path: path.to_path_buf(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| err(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| err(e.to_string()))
    }

    pub fn resource_name(&self, id: ResourceTypeId) -> String {
        match self.gatherables.get(&id) {
            Some(info) => format!("{} (id {})", info.name, id),
            None => format!("{id} (unknown ID)"),
        }
    }

    pub fn resource_item_id(&self, id: ResourceTypeId) -> Option<u32> {
        self.gatherables.get(&id).map(|info| info.item_id)
    }

    pub fn zone_name(&self, id: ZoneId) -> String {
        match self.zones.get(&id) {
            Some(name) => format!("{name} (id {id})"),
            None => format!("{id} (unknown ZoneID)"),
        }
    }
}
