//! Mock devices and control doubles for testing.
//!
//! Provides realistic snapshots and a control channel that records every
//! call, without a transport.

use std::collections::HashMap;
use std::sync::Mutex;

use rigdash_common::{
    BoardSlot, ControlCommand, ControlQuery, DeviceSnapshot, FanPair, SensorReadings, Toggle,
};

use crate::control::{ControlChannel, ControlError, ControlFuture};
use crate::graphs::{ChartSpec, Surface};

/// A healthy miner with all three hashboards.
pub fn sensor(address: &str) -> DeviceSnapshot {
    DeviceSnapshot::sensor(
        address,
        SensorReadings::new(FanPair::new(5280, 5160))
            .with_hashrate(BoardSlot::Six, 2.51)
            .with_hashrate(BoardSlot::Seven, 2.47)
            .with_hashrate(BoardSlot::Eight, 2.55)
            .with_temperature(BoardSlot::Six, 72.0, 58.5)
            .with_temperature(BoardSlot::Seven, 71.0, 57.0)
            .with_temperature(BoardSlot::Eight, 74.5, 60.0),
    )
}

/// Installer output shown by [`installing`].
pub const INSTALL_LOG: &str =
    "Miner needs unlock, unlocking.\nUnlocked miner, installing.\nInstalling BraiinsOS+...\n";

/// A miner still going through install, showing its log.
pub fn installing(address: &str) -> DeviceSnapshot {
    DeviceSnapshot::diagnostic(address, INSTALL_LOG)
}

/// One miner with a dead left fan and a missing hashboard.
pub fn faulted(address: &str) -> DeviceSnapshot {
    DeviceSnapshot::sensor(
        address,
        SensorReadings::new(FanPair::new(0, 3200))
            .with_hashrate(BoardSlot::Six, 1.1)
            .with_hashrate(BoardSlot::Eight, 1.3)
            .with_temperature(BoardSlot::Six, 61.0, 55.0),
    )
    .with_light(true)
}

/// A small mixed fleet.
pub fn fleet() -> Vec<DeviceSnapshot> {
    vec![
        installing("192.168.1.31").with_light(true),
        sensor("192.168.1.32").with_light(true),
        faulted("192.168.1.33"),
    ]
}

/// A call seen by [`RecordingControl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCall {
    Send {
        command: ControlCommand,
        address: String,
    },
    Check {
        query: ControlQuery,
        address: String,
    },
}

/// Control channel that records calls and answers checks from a table.
#[derive(Debug, Default)]
pub struct RecordingControl {
    calls: Mutex<Vec<ControlCall>>,
    states: Mutex<HashMap<(String, Toggle), bool>>,
    fail_sends: bool,
}

impl RecordingControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel whose sends all fail with a transport error.
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    /// Set the state reported for a toggle.
    pub fn with_state(self, address: &str, toggle: Toggle, checked: bool) -> Self {
        self.states
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert((address.to_string(), toggle), checked);
        self
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<ControlCall> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Commands sent so far, in order.
    pub fn sent(&self) -> Vec<(ControlCommand, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ControlCall::Send { command, address } => Some((command, address)),
                ControlCall::Check { .. } => None,
            })
            .collect()
    }

    fn record(&self, call: ControlCall) {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(call);
    }
}

impl ControlChannel for RecordingControl {
    fn send(&self, command: ControlCommand, address: &str) -> ControlFuture<()> {
        self.record(ControlCall::Send {
            command,
            address: address.to_string(),
        });

        let result = if self.fail_sends {
            Err(ControlError::Transport("link down".to_string()))
        } else {
            Ok(())
        };
        Box::pin(std::future::ready(result))
    }

    fn check(&self, query: ControlQuery, address: &str) -> ControlFuture<bool> {
        self.record(ControlCall::Check {
            query,
            address: address.to_string(),
        });

        let state = self
            .states
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&(address.to_string(), query.toggle()))
            .copied()
            .unwrap_or(false);
        Box::pin(std::future::ready(Ok(state)))
    }
}

/// Surface that keeps every spec it was given.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub rendered: Vec<ChartSpec>,
}

impl RecordingSurface {
    /// The spec currently shown.
    pub fn current(&self) -> Option<&ChartSpec> {
        self.rendered.last()
    }
}

impl Surface for RecordingSurface {
    fn render(&mut self, spec: ChartSpec) {
        self.rendered.push(spec);
    }
}
