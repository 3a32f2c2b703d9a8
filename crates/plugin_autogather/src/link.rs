//! The seam between the session and whatever carries packets.
//!
//! Sends are fire-and-forget: the session never waits on a result, results
//! come back later as separate inbound events.

use crate::events::OutboundCommand;

pub trait ProxyLink {
    /// Injects a packet towards the game server.
    fn to_server(&mut self, command: OutboundCommand);

    /// Shows a status line to the operator.
    fn message(&mut self, text: &str);
}

/// A link that records everything sent through it.
#[derive(Debug, Default, Clone)]
pub struct RecordingLink {
    pub sent: Vec<OutboundCommand>,
    pub messages: Vec<String>,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if any operator message contains `needle`.
    pub fn saw_message(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }

    pub fn clear(&mut self) {
        self.sent.clear();
        self.messages.clear();
    }
}

impl ProxyLink for RecordingLink {
    fn to_server(&mut self, command: OutboundCommand) {
        self.sent.push(command);
    }

    fn message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }
}
