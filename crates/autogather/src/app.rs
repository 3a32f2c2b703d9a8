//! Main application logic and lifecycle management.
//!
//! The `Application` owns the gathering session and runs the single event
//! loop that feeds it. One tokio task selects between three sources:
//!
//! * **Input**: one JSON object per stdin line, an inbound event or an
//!   operator command
//! * **Timers**: the session's earliest pending deadline
//! * **Shutdown**: SIGINT/SIGTERM
//!
//! Only one branch runs at a time, so the session never sees two callbacks
//! at once. End of input and shutdown both save the cache before returning.

use plugin_autogather::{
    ClientPositionReport, GatherSession, InboundEvent, NameTable, OutboundCommand, PositionClock, ProxyLink,
    SpatialCache, SystemUptime, Verdict,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{config::AppConfig, logging::display_banner, signals::shutdown_signal};

/// One line of input from the proxy.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostInput {
    Event(InboundEvent),
    Command(String),
}

/// One line of output to the proxy.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum HostOutput {
    /// Inject a packet towards the server.
    Send(OutboundCommand),
    /// Show a status line to the operator.
    Message(String),
    /// Forward this corrected client report instead of the original.
    Forward(ClientPositionReport),
}

/// [`ProxyLink`] that writes every output as a JSON line.
pub struct JsonLineLink<W: Write> {
    out: W,
}

impl<W: Write> JsonLineLink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn emit(&mut self, output: &HostOutput) {
        let result = serde_json::to_writer(&mut self.out, output)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            error!("❌ Failed to write output line: {}", e);
        }
    }
}

impl<W: Write> ProxyLink for JsonLineLink<W> {
    fn to_server(&mut self, command: OutboundCommand) {
        self.emit(&HostOutput::Send(command));
    }

    fn message(&mut self, text: &str) {
        self.emit(&HostOutput::Message(text.to_string()));
    }
}

/// Dispatches one input line to the session.
pub fn handle_line<W: Write>(session: &mut GatherSession<JsonLineLink<W>>, now: std::time::Duration, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match serde_json::from_str::<HostInput>(line) {
        Ok(HostInput::Event(event)) => {
            if let Verdict::Replace(report) = session.handle_event(now, event) {
                session.link_mut().emit(&HostOutput::Forward(report));
            }
        }
        Ok(HostInput::Command(command)) => session.handle_command(now, &command),
        Err(e) => warn!("⚠️ Ignoring malformed input line: {}", e),
    }
}

/// Sleeps until `deadline`, or forever when there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Feeds `reader` and the session's timers into the session until input
/// ends or `shutdown` completes, then saves the cache.
pub async fn run_loop<R, W, S>(session: &mut GatherSession<JsonLineLink<W>>, reader: R, shutdown: S)
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: Future<Output = Result<(), std::io::Error>>,
{
    let start = Instant::now();
    let mut lines = reader.lines();
    tokio::pin!(shutdown);

    loop {
        let deadline = session.next_deadline().map(|at| start + at);
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    error!("❌ Signal handling failed: {}", e);
                }
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => handle_line(session, start.elapsed(), &line),
                Ok(None) => {
                    info!("📭 Input closed");
                    break;
                }
                Err(e) => {
                    error!("❌ Failed to read input: {}", e);
                    break;
                }
            },
            _ = wait_until(deadline) => session.advance(start.elapsed()),
        }
    }

    debug!("💾 Saving node cache before exit");
    session.save_cache();
}

/// Main application struct.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    session: GatherSession<JsonLineLink<std::io::Stdout>>,
}

impl Application {
    /// Creates the application from a loaded configuration.
    ///
    /// # Process
    ///
    /// 1. Validate the configuration
    /// 2. Load the name table and node cache (both fall back to empty)
    /// 3. Build the session on a stdout link and the system uptime clock
    pub fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration validated successfully");

        display_banner();

        let names = NameTable::load(&config.paths.names_file);
        let cache = SpatialCache::load(config.paths.cache_file.clone());
        let session = GatherSession::new(
            config.gather.clone(),
            names,
            cache,
            PositionClock::new(Box::new(SystemUptime)),
            JsonLineLink::new(std::io::stdout()),
        );

        Ok(Self { config, session })
    }

    /// Runs the event loop until stdin closes or a shutdown signal arrives.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.log_configuration_summary();
        info!("✅ Ready - reading events from stdin");

        let reader = BufReader::new(tokio::io::stdin());
        run_loop(&mut self.session, reader, shutdown_signal()).await;

        info!("✅ Shutdown complete");
        Ok(())
    }

    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  💾 Cache file: {}", self.config.paths.cache_file.display());
        info!("  🏷️ Names file: {}", self.config.paths.names_file.display());
        info!("  ⏱️ Seek delay: {}ms", self.config.gather.seek_delay_ms);
        info!("  ⚔️ Threat radius: {}", self.config.gather.threat_radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_autogather::{GatherSettings, UptimeSource};
    use tempfile::tempdir;

    struct FixedUptime;

    impl UptimeSource for FixedUptime {
        fn uptime_ms(&self) -> u64 {
            5_000
        }
    }

    fn session(cache: SpatialCache) -> GatherSession<JsonLineLink<Vec<u8>>> {
        GatherSession::new(
            GatherSettings::default(),
            NameTable::default(),
            cache,
            PositionClock::new(Box::new(FixedUptime)),
            JsonLineLink::new(Vec::new()),
        )
    }

    fn outputs(session: &GatherSession<JsonLineLink<Vec<u8>>>) -> Vec<HostOutput> {
        String::from_utf8_lossy(session.link().get_ref())
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_run_loop_dispatches_lines_and_saves_on_eof() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("resources.json");
        let mut session = session(SpatialCache::new(&cache_path));

        let input = concat!(
            r#"{"event":{"type":"login","player_id":1,"game_id":100}}"#, "\n",
            r#"{"event":{"type":"zone-load","zone":7004}}"#, "\n",
            "not json\n",
            "\n",
            r#"{"event":{"type":"node-spawn","node_type":301,"game_id":9,"location":{"x":1.0,"y":2.0,"z":3.0}}}"#, "\n",
            r#"{"command":"setid 301"}"#, "\n",
            r#"{"command":"tp 0"}"#, "\n",
        );
        run_loop(&mut session, BufReader::new(input.as_bytes()), std::future::pending()).await;

        let out = outputs(&session);
        assert!(out.contains(&HostOutput::Message("Set to gather 301 (unknown ID)".to_string())));
        assert!(out.iter().any(|o| matches!(o, HostOutput::Send(OutboundCommand::PositionUpdate(u)) if u.timestamp == 5_000)));

        let saved = SpatialCache::try_load(&cache_path).unwrap();
        assert_eq!(saved.len(plugin_autogather::BucketKey::new(
            plugin_autogather::ZoneId(7004),
            plugin_autogather::ResourceTypeId(301),
        )), 1);
    }

    #[tokio::test]
    async fn test_run_loop_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("resources.json");
        let mut session = session(SpatialCache::new(&cache_path));

        // Input never ends; the shutdown future completes immediately.
        let (_writer, reader) = tokio::io::duplex(64);
        run_loop(&mut session, BufReader::new(reader), async { Ok::<(), std::io::Error>(()) }).await;

        assert!(cache_path.exists());
    }

    #[test]
    fn test_stale_client_report_is_forwarded_rewritten() {
        let dir = tempdir().unwrap();
        let mut session = session(SpatialCache::new(dir.path().join("resources.json")));
        let now = std::time::Duration::ZERO;
        handle_line(&mut session, now, r#"{"event":{"type":"login","player_id":1,"game_id":100}}"#);
        handle_line(&mut session, now, r#"{"event":{"type":"zone-load","zone":7004}}"#);
        handle_line(&mut session, now, r#"{"event":{"type":"node-spawn","node_type":301,"game_id":9,"location":{"x":1.0,"y":2.0,"z":3.0}}}"#);
        handle_line(&mut session, now, r#"{"command":"setid 301"}"#);
        handle_line(&mut session, now, r#"{"command":""}"#);
        handle_line(
            &mut session,
            now,
            r#"{"event":{"type":"client-position","location":{"x":0.0,"y":0.0,"z":0.0},"destination":{"x":1.0,"y":1.0,"z":1.0},"timestamp":10}}"#,
        );

        let forwarded: Vec<u64> = outputs(&session)
            .into_iter()
            .filter_map(|o| match o {
                HostOutput::Forward(report) => Some(report.timestamp),
                _ => None,
            })
            .collect();
        assert_eq!(forwarded, vec![5_075]);
    }
}
