//! # Operator Commands
//!
//! The text command surface. A command line is the subcommand and its
//! arguments separated by whitespace; an empty line toggles automation.
//!
//! | Command           | Effect                                               |
//! |-------------------|------------------------------------------------------|
//! | *(empty)*         | toggle automation on or off                          |
//! | `tp <i>`          | teleport to cached location `i`                      |
//! | `safe <i>`        | mark location `i` safe (index clamped to the bucket) |
//! | `unsafe <i>`      | mark location `i` unsafe (index clamped)             |
//! | `unsafereset`     | mark every location safe, then sort and save         |
//! | `delete <i>`      | remove location `i`, keeping the cursor in place     |
//! | `sort`            | sort the active bucket and save                      |
//! | `reset`           | rewind the seek cursor to 0                          |
//! | `seek <i>`        | move the seek cursor to `i`                          |
//! | `setid <id>`      | select the resource type to gather                   |
//! | `save`, `reload`  | write or re-read the cache file                      |
//! | `print [zone]`    | list recorded resource types and their counts        |
//! | `printunsafe`     | list unsafe indices per resource in the current zone |
//!
//! Every command answers with status lines through the operator message
//! channel; a rejected command leaves the session untouched.

use std::fmt::Write as _;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::AutogatherError;
use crate::link::ProxyLink;
use crate::session::GatherSession;
use crate::types::{BucketKey, ResourceTypeId, ZoneId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Toggle,
    Teleport(usize),
    Safe(usize),
    Unsafe(usize),
    UnsafeReset,
    Delete(usize),
    Sort,
    Reset,
    Seek(usize),
    SetId(ResourceTypeId),
    Save,
    Reload,
    Print(Option<ZoneId>),
    PrintUnsafe,
}

fn number<T: FromStr>(arg: Option<&str>) -> Result<T, AutogatherError> {
    let arg = arg.unwrap_or("");
    arg.parse().map_err(|_| {
        AutogatherError::InvalidArgument(format!("Argument 2 must be a number. {} is not a number.", arg))
    })
}

impl FromStr for OperatorCommand {
    type Err = AutogatherError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(subcommand) = words.next() else {
            return Ok(OperatorCommand::Toggle);
        };
        let arg = words.next();

        let command = match subcommand.to_lowercase().as_str() {
            "tp" => OperatorCommand::Teleport(number(arg)?),
            "safe" => OperatorCommand::Safe(number(arg)?),
            "unsafe" => OperatorCommand::Unsafe(number(arg)?),
            "unsafereset" => OperatorCommand::UnsafeReset,
            "delete" => OperatorCommand::Delete(number(arg)?),
            "sort" => OperatorCommand::Sort,
            "reset" => OperatorCommand::Reset,
            "seek" => OperatorCommand::Seek(number(arg)?),
            "setid" => OperatorCommand::SetId(ResourceTypeId(number(arg)?)),
            "save" => OperatorCommand::Save,
            "reload" => OperatorCommand::Reload,
            "print" => OperatorCommand::Print(arg.and_then(|zone| zone.parse().ok()).map(ZoneId)),
            "printunsafe" => OperatorCommand::PrintUnsafe,
            other => {
                return Err(AutogatherError::InvalidArgument(format!("Unknown command '{}'.", other)));
            }
        };
        Ok(command)
    }
}

impl<L: ProxyLink> GatherSession<L> {
    /// Parses and runs one operator command line.
    pub fn handle_command(&mut self, now: Duration, line: &str) {
        self.advance(now);
        debug!("🌿 Operator command: '{}'", line.trim());
        let result = line.parse::<OperatorCommand>().and_then(|command| self.execute(command));
        if let Err(e) = result {
            let text = self.explain(&e);
            self.notify(text);
        }
    }

    pub fn execute(&mut self, command: OperatorCommand) -> Result<(), AutogatherError> {
        match command {
            OperatorCommand::Toggle => self.toggle(),
            OperatorCommand::Teleport(index) => {
                let key = self.validate_area_and_resource()?;
                let location = self
                    .cache
                    .get(key)
                    .and_then(|bucket| bucket.get(index))
                    .map(|record| record.location)
                    .ok_or(AutogatherError::IndexOutOfRange { index, len: self.cache.len(key) })?;
                self.notify(format!("Teleporting to index {}", index));
                self.teleport(location, 0.0, 0.0);
            }
            OperatorCommand::Safe(index) | OperatorCommand::Unsafe(index) => {
                let safe = matches!(command, OperatorCommand::Safe(_));
                let key = self.validate_area_and_resource()?;
                let index = index.min(self.cache.len(key) - 1);
                self.cache.set_safety(key, index, safe)?;
                self.cache.save();
                self.notify(format!(
                    "Index {} of {} has been set as {}",
                    index,
                    self.resource_name(),
                    if safe { "safe" } else { "unsafe" }
                ));
            }
            OperatorCommand::UnsafeReset => {
                let key = match self.validate_area_and_resource() {
                    Ok(key) => key,
                    Err(e) => {
                        let text = self.explain(&e);
                        self.notify(text);
                        self.notify("Nothing to reset.");
                        return Ok(());
                    }
                };
                self.cache.reset_safety(key);
                self.sort_bucket(key);
                self.cache.save();
                self.notify(format!(
                    "Safety status of all {} in {} has been reset.",
                    self.resource_name(),
                    self.zone_name()
                ));
            }
            OperatorCommand::Delete(index) => {
                let key = self.validate_area_and_resource()?;
                self.cache.delete_at(key, index)?;
                self.cache.save();
                if index <= self.cursor.seek_index {
                    self.cursor.seek_index = self.cursor.seek_index.saturating_sub(1);
                }
                self.notify(format!("Index {} of {} has been removed.", index, self.resource_name()));
            }
            OperatorCommand::Sort => {
                if let Some(key) = self.cursor.bucket() {
                    self.sort_bucket(key);
                }
                self.cache.save();
            }
            OperatorCommand::Reset => {
                self.cursor.seek_index = 0;
                self.notify("Reset seek position.");
            }
            OperatorCommand::Seek(index) => {
                self.validate_area_and_resource()?;
                self.cursor.seek_index = index;
                self.notify(format!("Seek position set to {}", index));
            }
            OperatorCommand::SetId(resource) => {
                self.cursor.resource = Some(resource);
                self.cursor.item_id = self.names.resource_item_id(resource);
                self.live_nodes.clear();
                info!("🌿 Target resource set to {}", resource);
                self.notify(format!("Set to gather {}", self.names.resource_name(resource)));
            }
            OperatorCommand::Save => self.cache.save(),
            OperatorCommand::Reload => {
                self.cache.reload();
                if let Some(zone) = self.cursor.zone {
                    self.cache.ensure_zone(zone);
                }
            }
            OperatorCommand::Print(zone) => self.print_zone(zone),
            OperatorCommand::PrintUnsafe => self.print_unsafe(),
        }
        Ok(())
    }

    fn sort_bucket(&mut self, key: BucketKey) {
        if self.cache.sort(key) {
            self.notify(format!(
                "Sorted locations of {} in {}",
                self.names.resource_name(key.resource),
                self.names.zone_name(key.zone)
            ));
        } else {
            debug!("🌿 No locations of resource {} in zone {} to sort", key.resource, key.zone);
        }
    }

    /// Lists recorded resource types of `zone`, or of the current zone when
    /// `zone` is absent or has no data.
    fn print_zone(&mut self, zone: Option<ZoneId>) {
        let zone = zone
            .filter(|zone| self.cache.zone(*zone).is_some())
            .or(self.cursor.zone);
        let message = match zone {
            Some(zone) => self.describe_zone(zone),
            None => "No zone loaded yet.".to_string(),
        };
        self.notify(message);
    }

    fn describe_zone(&self, zone: ZoneId) -> String {
        let zone_name = self.names.zone_name(zone);
        let Some(buckets) = self.cache.zone(zone).filter(|buckets| !buckets.is_empty()) else {
            return format!("No data logged in {}. Gather some data and come back later!", zone_name);
        };

        let mut message = format!("{} resource types recorded in {}:", buckets.len(), zone_name);
        for (resource, records) in buckets {
            let _ = write!(
                message,
                "\n\t{}: {} locations.",
                self.names.resource_name(*resource),
                records.len()
            );
        }
        message
    }

    fn print_unsafe(&mut self) {
        let Some(zone) = self.cursor.zone else {
            return;
        };
        let Some(buckets) = self.cache.zone(zone) else {
            return;
        };

        let mut message = format!("Unsafe spawn indices in {}:", self.names.zone_name(zone));
        for (resource, records) in buckets {
            let unsafe_indices: Vec<String> = records
                .iter()
                .enumerate()
                .filter(|(_, record)| !record.safe)
                .map(|(index, _)| index.to_string())
                .collect();
            let _ = write!(
                message,
                "\n\t{}: {} of {} are unsafe: {}",
                self.names.resource_name(*resource),
                unsafe_indices.len(),
                records.len(),
                unsafe_indices.join(", ")
            );
        }
        self.notify(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        assert_eq!("".parse::<OperatorCommand>().unwrap(), OperatorCommand::Toggle);
        assert_eq!("  ".parse::<OperatorCommand>().unwrap(), OperatorCommand::Toggle);
        assert_eq!("TP 3".parse::<OperatorCommand>().unwrap(), OperatorCommand::Teleport(3));
        assert_eq!(
            "setid 301".parse::<OperatorCommand>().unwrap(),
            OperatorCommand::SetId(ResourceTypeId(301))
        );
        assert_eq!("print".parse::<OperatorCommand>().unwrap(), OperatorCommand::Print(None));
        assert_eq!(
            "print 7004".parse::<OperatorCommand>().unwrap(),
            OperatorCommand::Print(Some(ZoneId(7004)))
        );
        assert_eq!("printunsafe".parse::<OperatorCommand>().unwrap(), OperatorCommand::PrintUnsafe);
    }

    #[test]
    fn test_parse_rejects_bad_arguments() {
        for line in ["seek", "seek abc", "delete -1", "safe 1.5", "bogus"] {
            let result = line.parse::<OperatorCommand>();
            assert!(
                matches!(result, Err(AutogatherError::InvalidArgument(_))),
                "expected '{}' to be rejected",
                line
            );
        }
    }
}
