//! Control vocabulary shared by the dashboard and whatever answers it.
//!
//! Two kinds of traffic exist per device address:
//! - one-way commands (`pause`, `unpause`, `light`, `unlight`)
//! - request/reply checks (`check_pause`, `check_light`) answered with a boolean

use serde::{Deserialize, Serialize};

/// A per-device switch exposed on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    /// Pause mining on the device.
    Pause,
    /// Turn on the locate/fault LED.
    Light,
}

impl Toggle {
    /// The check query that reports this toggle's current state.
    pub fn query(self) -> ControlQuery {
        match self {
            Toggle::Pause => ControlQuery::CheckPause,
            Toggle::Light => ControlQuery::CheckLight,
        }
    }

    /// The command that moves the toggle into the requested state.
    pub fn command(self, checked: bool) -> ControlCommand {
        match (self, checked) {
            (Toggle::Pause, true) => ControlCommand::Pause,
            (Toggle::Pause, false) => ControlCommand::Unpause,
            (Toggle::Light, true) => ControlCommand::Light,
            (Toggle::Light, false) => ControlCommand::Unlight,
        }
    }

    /// Label shown next to the switch.
    pub fn label(self) -> &'static str {
        match self {
            Toggle::Pause => "Pause",
            Toggle::Light => "Light",
        }
    }

    /// Key chunk used in check key expressions.
    pub fn as_str(self) -> &'static str {
        match self {
            Toggle::Pause => "pause",
            Toggle::Light => "light",
        }
    }

    /// Parse from a key chunk.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pause" => Some(Toggle::Pause),
            "light" => Some(Toggle::Light),
            _ => None,
        }
    }
}

impl std::fmt::Display for Toggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One-way command addressed to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlCommand {
    Pause,
    Unpause,
    Light,
    Unlight,
}

impl ControlCommand {
    /// Wire name of the command.
    pub fn as_str(self) -> &'static str {
        match self {
            ControlCommand::Pause => "pause",
            ControlCommand::Unpause => "unpause",
            ControlCommand::Light => "light",
            ControlCommand::Unlight => "unlight",
        }
    }

    /// Parse a wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pause" => Some(ControlCommand::Pause),
            "unpause" => Some(ControlCommand::Unpause),
            "light" => Some(ControlCommand::Light),
            "unlight" => Some(ControlCommand::Unlight),
            _ => None,
        }
    }

    /// The toggle this command drives and the state it requests.
    pub fn target(self) -> (Toggle, bool) {
        match self {
            ControlCommand::Pause => (Toggle::Pause, true),
            ControlCommand::Unpause => (Toggle::Pause, false),
            ControlCommand::Light => (Toggle::Light, true),
            ControlCommand::Unlight => (Toggle::Light, false),
        }
    }
}

impl std::fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request/reply query answered with the toggle's current boolean state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlQuery {
    CheckPause,
    CheckLight,
}

impl ControlQuery {
    /// Wire name of the query.
    pub fn as_str(self) -> &'static str {
        match self {
            ControlQuery::CheckPause => "check_pause",
            ControlQuery::CheckLight => "check_light",
        }
    }

    /// The toggle whose state this query reports.
    pub fn toggle(self) -> Toggle {
        match self {
            ControlQuery::CheckPause => Toggle::Pause,
            ControlQuery::CheckLight => Toggle::Light,
        }
    }
}

impl std::fmt::Display for ControlQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload carried by commands and checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    /// Device address the request targets.
    pub address: String,
}

impl ControlRequest {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}
