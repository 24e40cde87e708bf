//! Layout builder: turns each snapshot batch into the dashboard's panels.
//!
//! Every batch fully replaces the previous panels. Toggle state checks issued
//! while building are tagged with the render generation, so replies that
//! arrive after a newer batch was rendered are dropped.

use rigdash_common::{ControlCommand, DeviceKind, DeviceSnapshot, SensorReadings, Toggle};

use crate::control::{ControlChannel, ControlError, ControlFuture};
use crate::graphs::{FAN_LEFT_LABEL, FAN_RIGHT_LABEL, SensorSurfaces, Surface, render_graphs};

/// State of a light or pause toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleState {
    pub toggle: Toggle,
    pub checked: bool,
    /// Last delivery or check failure, cleared by the next success.
    pub delivery_failed: Option<String>,
}

impl ToggleState {
    fn new(toggle: Toggle) -> Self {
        Self {
            toggle,
            checked: false,
            delivery_failed: None,
        }
    }
}

/// The four chart surfaces of a sensor panel.
#[derive(Debug, Default)]
pub struct SensorCharts<S> {
    pub hashrate: S,
    pub temperature: S,
    pub fan_left: S,
    pub fan_right: S,
}

impl<S> SensorCharts<S> {
    fn surfaces(&mut self) -> SensorSurfaces<'_, S> {
        SensorSurfaces {
            hashrate: &mut self.hashrate,
            temperature: &mut self.temperature,
            fan_left: &mut self.fan_left,
            fan_right: &mut self.fan_right,
        }
    }
}

/// Kind-specific content of a panel.
#[derive(Debug)]
pub enum PanelBody<S> {
    /// Read-only text area with a pause toggle.
    Diagnostic { text: String, pause: ToggleState },
    /// Charts plus `"Fan L: <rpm> RPM"` / `"Fan R: <rpm> RPM"` captions.
    Sensor {
        charts: SensorCharts<S>,
        fan_captions: [String; 2],
    },
}

/// One device's panel.
#[derive(Debug)]
pub struct Panel<S> {
    pub address: String,
    /// Present only when the device offers its light.
    pub light: Option<ToggleState>,
    pub body: PanelBody<S>,
}

impl<S: Surface + Default> Panel<S> {
    fn build(device: DeviceSnapshot) -> Self {
        let light = device
            .light_visible
            .then(|| ToggleState::new(Toggle::Light));

        let body = match device.kind {
            DeviceKind::Diagnostic { text } => PanelBody::Diagnostic {
                text,
                pause: ToggleState::new(Toggle::Pause),
            },
            DeviceKind::Sensor(readings) => sensor_body(&readings),
        };

        Self {
            address: device.address,
            light,
            body,
        }
    }
}

fn sensor_body<S: Surface + Default>(readings: &SensorReadings) -> PanelBody<S> {
    let mut charts = SensorCharts::<S>::default();
    render_graphs(readings, charts.surfaces());

    PanelBody::Sensor {
        charts,
        fan_captions: [
            fan_caption(FAN_LEFT_LABEL, readings.fans.left.rpm),
            fan_caption(FAN_RIGHT_LABEL, readings.fans.right.rpm),
        ],
    }
}

fn fan_caption(label: &str, rpm: u32) -> String {
    format!("{}: {} RPM", label, rpm)
}

impl<S> Panel<S> {
    /// The toggle of the given kind, if this panel has one.
    pub fn toggle(&self, toggle: Toggle) -> Option<&ToggleState> {
        match toggle {
            Toggle::Light => self.light.as_ref(),
            Toggle::Pause => match &self.body {
                PanelBody::Diagnostic { pause, .. } => Some(pause),
                PanelBody::Sensor { .. } => None,
            },
        }
    }

    fn toggle_mut(&mut self, toggle: Toggle) -> Option<&mut ToggleState> {
        match toggle {
            Toggle::Light => self.light.as_mut(),
            Toggle::Pause => match &mut self.body {
                PanelBody::Diagnostic { pause, .. } => Some(pause),
                PanelBody::Sensor { .. } => None,
            },
        }
    }

    /// Toggles present on this panel, in display order.
    pub fn toggles(&self) -> impl Iterator<Item = &ToggleState> {
        [Toggle::Pause, Toggle::Light]
            .into_iter()
            .filter_map(|toggle| self.toggle(toggle))
    }

    /// Contents of the diagnostic text area.
    pub fn text_area(&self) -> Option<&str> {
        match &self.body {
            PanelBody::Diagnostic { text, .. } => Some(text),
            PanelBody::Sensor { .. } => None,
        }
    }

    pub fn charts(&self) -> Option<&SensorCharts<S>> {
        match &self.body {
            PanelBody::Sensor { charts, .. } => Some(charts),
            PanelBody::Diagnostic { .. } => None,
        }
    }
}

/// A toggle state check issued while building a panel.
pub struct PendingCheck {
    pub generation: u64,
    pub address: String,
    pub toggle: Toggle,
    pub reply: ControlFuture<bool>,
}

/// A command emitted by a user toggle.
pub struct PendingCommand {
    pub generation: u64,
    pub address: String,
    pub toggle: Toggle,
    pub command: ControlCommand,
    pub delivery: ControlFuture<()>,
}

/// All panels of the current render.
#[derive(Debug)]
pub struct Dashboard<S> {
    generation: u64,
    panels: Vec<Panel<S>>,
}

impl<S> Default for Dashboard<S> {
    fn default() -> Self {
        Self {
            generation: 0,
            panels: Vec::new(),
        }
    }
}

impl<S> Dashboard<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the current render (0 before the first one).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn panels(&self) -> &[Panel<S>] {
        &self.panels
    }

    pub fn panel(&self, address: &str) -> Option<&Panel<S>> {
        self.panels.iter().find(|p| p.address == address)
    }

    fn toggle_state_mut(&mut self, address: &str, toggle: Toggle) -> Option<&mut ToggleState> {
        self.panels
            .iter_mut()
            .find(|p| p.address == address)
            .and_then(|p| p.toggle_mut(toggle))
    }

    /// Replace all panels with one per device, in order.
    ///
    /// Returns the toggle state checks to run; their replies go through
    /// [`Dashboard::apply_check`].
    pub fn render(
        &mut self,
        devices: Vec<DeviceSnapshot>,
        channel: &dyn ControlChannel,
    ) -> Vec<PendingCheck>
    where
        S: Surface + Default,
    {
        self.generation += 1;
        self.panels.clear();

        let generation = self.generation;
        let mut checks = Vec::new();

        for device in devices {
            let panel = Panel::<S>::build(device);

            for state in panel.toggles() {
                checks.push(PendingCheck {
                    generation,
                    address: panel.address.clone(),
                    toggle: state.toggle,
                    reply: channel.check(state.toggle.query(), &panel.address),
                });
            }

            self.panels.push(panel);
        }

        tracing::debug!(
            generation,
            panels = self.panels.len(),
            checks = checks.len(),
            "Rendered dashboard"
        );

        checks
    }

    /// Record a user toggle and emit the matching command.
    ///
    /// Returns `None` when the panel or toggle no longer exists.
    pub fn toggle(
        &mut self,
        address: &str,
        toggle: Toggle,
        checked: bool,
        channel: &dyn ControlChannel,
    ) -> Option<PendingCommand> {
        let generation = self.generation;
        let state = self.toggle_state_mut(address, toggle)?;
        state.checked = checked;

        let command = toggle.command(checked);
        tracing::info!(address = %address, command = %command, "Sending control command");

        Some(PendingCommand {
            generation,
            address: address.to_string(),
            toggle,
            command,
            delivery: channel.send(command, address),
        })
    }

    /// Apply a toggle state reply. Returns `false` for stale or orphaned replies.
    pub fn apply_check(
        &mut self,
        generation: u64,
        address: &str,
        toggle: Toggle,
        result: Result<bool, ControlError>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(
                address = %address,
                toggle = %toggle,
                reply_generation = generation,
                current_generation = self.generation,
                "Dropping stale toggle check reply"
            );
            return false;
        }

        let Some(state) = self.toggle_state_mut(address, toggle) else {
            return false;
        };

        match result {
            Ok(checked) => {
                state.checked = checked;
                state.delivery_failed = None;
            }
            Err(e) => {
                tracing::warn!(address = %address, toggle = %toggle, error = %e, "Toggle check failed");
                state.delivery_failed = Some(e.to_string());
            }
        }
        true
    }

    /// Apply the delivery outcome of a command. Returns `false` for stale or orphaned outcomes.
    pub fn apply_delivery(
        &mut self,
        generation: u64,
        address: &str,
        toggle: Toggle,
        result: Result<(), ControlError>,
    ) -> bool {
        if let Err(e) = &result {
            tracing::warn!(address = %address, toggle = %toggle, error = %e, "Command delivery failed");
        }

        if generation != self.generation {
            return false;
        }
        let Some(state) = self.toggle_state_mut(address, toggle) else {
            return false;
        };

        state.delivery_failed = result.err().map(|e| e.to_string());
        true
    }
}
