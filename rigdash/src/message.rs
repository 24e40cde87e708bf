use rigdash_common::{ControlCommand, DeviceSnapshot, Toggle};

use crate::control::{ControlError, ControlHandle};

/// Messages for the rigdash application.
#[derive(Debug, Clone)]
pub enum Message {
    /// Transport connected; control traffic now goes through this channel.
    Connected(ControlHandle),

    /// Transport connection lost or failed.
    Disconnected(String),

    /// A full snapshot batch arrived.
    SnapshotReceived(Vec<DeviceSnapshot>),

    /// Reply to a toggle state check issued during a render.
    CheckReplied {
        generation: u64,
        address: String,
        toggle: Toggle,
        result: Result<bool, ControlError>,
    },

    /// User flipped a toggle on a panel.
    ToggleChanged {
        address: String,
        toggle: Toggle,
        checked: bool,
    },

    /// Outcome of sending a control command.
    CommandDelivered {
        generation: u64,
        address: String,
        toggle: Toggle,
        command: ControlCommand,
        result: Result<(), ControlError>,
    },

    /// User activated a panel header.
    OpenManagementPage(String),

    /// The system browser was (or failed to be) launched.
    ManagementPageOpened { url: String, result: Result<(), String> },

    /// Tick for periodic UI updates (snapshot age).
    Tick,
}
