//! Wire messages exchanged with the host over newline-delimited JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sv_app::{Ack, EngineCommand};
use sv_core::settings::SettingKey;
use sv_platform::HostRequest;

/// One parsed inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// Echoed back on the matching ack.
    pub request_id: Option<u64>,
    pub message: InboundMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// The host's answer to its notification permission check.
    NotificationPermission { granted: bool },
    Command(EngineCommand),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ControlMessage {
    NotificationPermission { granted: bool },
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid json: {0}")]
    Json(#[source] serde_json::Error),

    #[error("unknown message: {0}")]
    Unknown(#[source] serde_json::Error),
}

impl Inbound {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(line).map_err(ParseError::Json)?;
        let request_id = value.get("request_id").and_then(Value::as_u64);

        if let Ok(ControlMessage::NotificationPermission { granted }) =
            serde_json::from_value::<ControlMessage>(value.clone())
        {
            return Ok(Self {
                request_id,
                message: InboundMessage::NotificationPermission { granted },
            });
        }

        let command = serde_json::from_value::<EngineCommand>(value).map_err(ParseError::Unknown)?;
        Ok(Self {
            request_id,
            message: InboundMessage::Command(command),
        })
    }
}

/// Engine-originated events other than host requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEvent {
    Ack {
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
        result: Ack,
    },
    SettingsChanged {
        key: SettingKey,
    },
    SnippetsChanged {
        count: usize,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
        message: String,
    },
}

/// Anything written to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Host(HostRequest),
    Event(BridgeEvent),
}

impl Outbound {
    pub fn to_line(&self) -> serde_json::Result<String> {
        match self {
            Outbound::Host(request) => serde_json::to_string(request),
            Outbound::Event(event) => serde_json::to_string(event),
        }
    }
}
