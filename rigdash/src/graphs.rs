//! Chart specifications derived from one sensor reading.
//!
//! Every call to [`render_graphs`] fully re-specifies the four surfaces of a
//! sensor panel; nothing is carried over from the previous snapshot.

use rigdash_common::{BoardSlot, FanReading, SensorReadings};

/// Assumed maximum fan speed, used as the full scale of the fan gauges.
pub const FAN_MAX_RPM: u32 = 6000;

/// Category label of the hashrate chart.
pub const HASHRATE_CATEGORY: &str = "Hashrate";
/// Category label of the temperature chart.
pub const TEMPERATURE_CATEGORY: &str = "Temps";
pub const FAN_LEFT_LABEL: &str = "Fan L";
pub const FAN_RIGHT_LABEL: &str = "Fan R";

/// An RGBA color as used in chart specifications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Fixed chart palette.
pub mod palette {
    use super::Rgba;

    pub const SLOT_6: Rgba = Rgba::opaque(0, 19, 97);
    pub const SLOT_7: Rgba = Rgba::opaque(0, 84, 219);
    pub const SLOT_8: Rgba = Rgba::opaque(36, 180, 224);

    pub const CHIP: Rgba = Rgba::opaque(6, 92, 39);
    pub const BOARD: Rgba = Rgba::opaque(255, 15, 58);

    pub const FAN_SPEED: Rgba = Rgba::opaque(103, 0, 221);
    pub const FAN_FAULT: Rgba = Rgba::opaque(97, 4, 4);
    pub const FAN_HEADROOM: Rgba = Rgba::opaque(199, 199, 199);

    pub const GRID_ABOVE: Rgba = Rgba::opaque(103, 221, 0);
    pub const GRID_BELOW: Rgba = Rgba::opaque(221, 0, 103);
    pub const GRID_AT: Rgba = Rgba::opaque(0, 0, 0);
}

/// Bar color of a hashboard slot.
pub fn slot_color(slot: BoardSlot) -> Rgba {
    match slot {
        BoardSlot::Six => palette::SLOT_6,
        BoardSlot::Seven => palette::SLOT_7,
        BoardSlot::Eight => palette::SLOT_8,
    }
}

/// Chart type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Doughnut,
}

/// One data series; `colors` has one entry per value.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
    pub colors: Vec<Rgba>,
}

impl Series {
    fn single(label: impl Into<String>, value: f64, color: Rgba) -> Self {
        Self {
            label: label.into(),
            values: vec![value],
            colors: vec![color],
        }
    }
}

/// Grid line colors around a reference value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    pub value: f64,
    pub above: Rgba,
    pub below: Rgba,
    pub at: Rgba,
}

impl ReferenceLine {
    /// Grid color of a tick at `value`.
    pub fn color_for(&self, value: f64) -> Rgba {
        if (value - self.value).abs() < 1e-9 {
            self.at
        } else if value > self.value {
            self.above
        } else {
            self.below
        }
    }
}

/// Value axis of a bar chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAxis {
    pub min: f64,
    /// Upper bound used unless the data exceeds it.
    pub suggested_max: f64,
    pub step: f64,
    pub reference: Option<ReferenceLine>,
}

impl ValueAxis {
    /// Axis maximum for data peaking at `peak`, rounded up to a whole step.
    pub fn max_for(&self, peak: f64) -> f64 {
        let max = self.suggested_max.max(peak);
        if self.step > 0.0 {
            let steps = ((max - self.min) / self.step - 1e-9).ceil();
            self.min + steps * self.step
        } else {
            max
        }
    }

    /// Tick values from `min` to `max_for(peak)`.
    pub fn ticks(&self, peak: f64) -> Vec<f64> {
        if self.step <= 0.0 {
            return vec![self.min, self.max_for(peak)];
        }
        let count = ((self.max_for(peak) - self.min) / self.step).round() as usize;
        (0..=count)
            .map(|i| self.min + i as f64 * self.step)
            .collect()
    }
}

/// Display options shared by all charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub animation: bool,
    pub legend: bool,
    pub interactive: bool,
    /// Width divided by height.
    pub aspect_ratio: f32,
    pub value_axis: Option<ValueAxis>,
}

impl ChartOptions {
    fn bar(value_axis: Option<ValueAxis>) -> Self {
        Self {
            animation: false,
            legend: false,
            interactive: true,
            aspect_ratio: 0.75,
            value_axis,
        }
    }

    fn gauge() -> Self {
        Self {
            animation: false,
            legend: false,
            interactive: false,
            aspect_ratio: 1.5,
            value_axis: None,
        }
    }
}

/// Everything a surface needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub options: ChartOptions,
}

impl ChartSpec {
    /// Largest value across all series (0 when empty).
    pub fn peak(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

/// A drawing target for one chart.
pub trait Surface {
    /// Replace whatever the surface currently shows.
    fn render(&mut self, spec: ChartSpec);
}

/// The four surfaces of a sensor panel.
pub struct SensorSurfaces<'a, S> {
    pub hashrate: &'a mut S,
    pub temperature: &'a mut S,
    pub fan_left: &'a mut S,
    pub fan_right: &'a mut S,
}

/// Hashrate bar chart: one series per present slot, colored by slot.
pub fn hashrate_chart(readings: &SensorReadings) -> ChartSpec {
    let series = readings
        .hashrate
        .iter()
        .map(|(slot, reading)| Series::single(slot.to_string(), reading.value, slot_color(*slot)))
        .collect();

    ChartSpec {
        kind: ChartKind::Bar,
        labels: vec![HASHRATE_CATEGORY.to_string()],
        series,
        options: ChartOptions::bar(Some(ValueAxis {
            min: 0.0,
            suggested_max: 3.6,
            step: 0.6,
            reference: Some(ReferenceLine {
                value: 2.4,
                above: palette::GRID_ABOVE,
                below: palette::GRID_BELOW,
                at: palette::GRID_AT,
            }),
        })),
    }
}

/// Temperature bar chart: chip then board series for each present slot.
pub fn temperature_chart(readings: &SensorReadings) -> ChartSpec {
    let series = readings
        .temperature
        .iter()
        .flat_map(|(slot, reading)| {
            [
                Series::single(format!("{} Chip", slot), reading.chip, palette::CHIP),
                Series::single(format!("{} Board", slot), reading.board, palette::BOARD),
            ]
        })
        .collect();

    ChartSpec {
        kind: ChartKind::Bar,
        labels: vec![TEMPERATURE_CATEGORY.to_string()],
        series,
        options: ChartOptions::bar(None),
    }
}

/// Fan gauge: `[rpm, FAN_MAX_RPM - rpm]`; the remainder may be negative.
pub fn fan_gauge(label: &str, fan: FanReading) -> ChartSpec {
    let rpm = f64::from(fan.rpm);
    let remainder = f64::from(FAN_MAX_RPM) - rpm;
    let remainder_color = if fan.is_faulted() {
        palette::FAN_FAULT
    } else {
        palette::FAN_HEADROOM
    };

    ChartSpec {
        kind: ChartKind::Doughnut,
        labels: vec![label.to_string()],
        series: vec![Series {
            label: label.to_string(),
            values: vec![rpm, remainder],
            colors: vec![palette::FAN_SPEED, remainder_color],
        }],
        options: ChartOptions::gauge(),
    }
}

/// Render all charts of one sensor panel onto its surfaces.
pub fn render_graphs<S: Surface>(readings: &SensorReadings, surfaces: SensorSurfaces<'_, S>) {
    surfaces.hashrate.render(hashrate_chart(readings));
    surfaces.temperature.render(temperature_chart(readings));
    surfaces
        .fan_left
        .render(fan_gauge(FAN_LEFT_LABEL, readings.fans.left));
    surfaces
        .fan_right
        .render(fan_gauge(FAN_RIGHT_LABEL, readings.fans.right));
}
