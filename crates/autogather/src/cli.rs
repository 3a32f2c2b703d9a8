//! Command-line interface handling for the autogather host.
//!
//! Every option except `--config` overrides the matching configuration file
//! value when given.

use clap::{Arg, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the node cache file
    pub cache_file: Option<PathBuf>,
    /// Optional override for the name table file
    pub names_file: Option<PathBuf>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
}

impl CliArgs {
    fn command() -> Command {
        Command::new("autogather")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Resource gathering automation driven over line-delimited JSON")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("autogather.toml"),
            )
            .arg(
                Arg::new("cache")
                    .long("cache")
                    .value_name("FILE")
                    .help("Node location cache file"),
            )
            .arg(
                Arg::new("names")
                    .long("names")
                    .value_name("FILE")
                    .help("Resource and zone name table"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
    }

    /// Parses the process arguments; exits with usage on invalid input.
    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    /// Parses an explicit argument list.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&Self::command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("autogather.toml")),
            cache_file: matches.get_one::<String>("cache").map(PathBuf::from),
            names_file: matches.get_one::<String>("names").map(PathBuf::from),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["autogather"]).unwrap();
        assert_eq!(args.config_path, PathBuf::from("autogather.toml"));
        assert!(args.cache_file.is_none());
        assert!(args.log_level.is_none());
        assert!(!args.json_logs);
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::try_parse_from([
            "autogather", "-c", "my.toml", "--cache", "nodes.json", "--names", "n.json", "-l", "debug",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(args.config_path, PathBuf::from("my.toml"));
        assert_eq!(args.cache_file, Some(PathBuf::from("nodes.json")));
        assert_eq!(args.names_file, Some(PathBuf::from("n.json")));
        assert_eq!(args.log_level, Some("debug".to_string()));
        assert!(args.json_logs);
    }
}
