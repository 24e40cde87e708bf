//! Device snapshot model and the transport-boundary decoder.
//!
//! A feed message carries the latest state of every device. Each record is
//! decoded into a [`DeviceSnapshot`] whose [`DeviceKind`] is fixed here, once;
//! nothing downstream looks at the record's shape again.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, RecordError, Result};
use crate::serialization::decode_auto;

/// Value of the `light` field that makes the light toggle visible.
pub const LIGHT_SHOW: &str = "show";

/// Hashboard position in the chassis. Only slots 6, 7 and 8 exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoardSlot {
    Six,
    Seven,
    Eight,
}

impl BoardSlot {
    /// All slots, in display order.
    pub const ALL: [BoardSlot; 3] = [BoardSlot::Six, BoardSlot::Seven, BoardSlot::Eight];

    /// The slot number as printed on the chassis.
    pub fn number(self) -> u8 {
        match self {
            BoardSlot::Six => 6,
            BoardSlot::Seven => 7,
            BoardSlot::Eight => 8,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            6 => Some(BoardSlot::Six),
            7 => Some(BoardSlot::Seven),
            8 => Some(BoardSlot::Eight),
            _ => None,
        }
    }

    /// Parse a wire map key: either `"6"` or `"board_6"`.
    pub fn parse_key(key: &str) -> Option<Self> {
        let digits = key.strip_prefix("board_").unwrap_or(key);
        digits.parse::<u8>().ok().and_then(Self::from_number)
    }
}

impl std::fmt::Display for BoardSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Hashrate of one board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashrateReading {
    pub value: f64,
}

/// Temperatures of one board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub chip: f64,
    pub board: f64,
}

/// A single fan. `rpm == 0` means the fan has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanReading {
    pub rpm: u32,
}

impl FanReading {
    pub fn new(rpm: u32) -> Self {
        Self { rpm }
    }

    pub fn is_faulted(&self) -> bool {
        self.rpm == 0
    }
}

/// The two chassis fans, in fixed positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanPair {
    pub left: FanReading,
    pub right: FanReading,
}

impl FanPair {
    pub fn new(left_rpm: u32, right_rpm: u32) -> Self {
        Self {
            left: FanReading::new(left_rpm),
            right: FanReading::new(right_rpm),
        }
    }
}

/// Telemetry of a device that is up and hashing.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReadings {
    /// Present boards only; a missing slot is not a zero reading.
    pub hashrate: BTreeMap<BoardSlot, HashrateReading>,
    /// Present boards only.
    pub temperature: BTreeMap<BoardSlot, TemperatureReading>,
    pub fans: FanPair,
}

impl SensorReadings {
    /// Create readings with the given fans and no boards.
    pub fn new(fans: FanPair) -> Self {
        Self {
            hashrate: BTreeMap::new(),
            temperature: BTreeMap::new(),
            fans,
        }
    }

    /// Add a board hashrate.
    pub fn with_hashrate(mut self, slot: BoardSlot, value: f64) -> Self {
        self.hashrate.insert(slot, HashrateReading { value });
        self
    }

    /// Add board temperatures.
    pub fn with_temperature(mut self, slot: BoardSlot, chip: f64, board: f64) -> Self {
        self.temperature
            .insert(slot, TemperatureReading { chip, board });
        self
    }
}

/// What a device panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceKind {
    /// Free-form status dump (e.g. installer output).
    Diagnostic { text: String },
    /// Live telemetry.
    Sensor(SensorReadings),
}

/// Latest state of one device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    /// Network identity; unique within a batch.
    pub address: String,
    /// Whether the light toggle is offered for this device.
    pub light_visible: bool,
    pub kind: DeviceKind,
}

impl DeviceSnapshot {
    pub fn diagnostic(address: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            light_visible: false,
            kind: DeviceKind::Diagnostic { text: text.into() },
        }
    }

    pub fn sensor(address: impl Into<String>, readings: SensorReadings) -> Self {
        Self {
            address: address.into(),
            light_visible: false,
            kind: DeviceKind::Sensor(readings),
        }
    }

    /// Set whether the light toggle is offered.
    pub fn with_light(mut self, visible: bool) -> Self {
        self.light_visible = visible;
        self
    }

    /// Sensor readings, if this is a sensor device.
    pub fn readings(&self) -> Option<&SensorReadings> {
        match &self.kind {
            DeviceKind::Sensor(readings) => Some(readings),
            DeviceKind::Diagnostic { .. } => None,
        }
    }
}

/// A record that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Position in the incoming message.
    pub index: usize,
    /// Address, when the record carried a readable one.
    pub address: Option<String>,
    pub error: RecordError,
}

/// Result of decoding one feed message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBatch {
    /// Valid devices, in message order.
    pub devices: Vec<DeviceSnapshot>,
    /// Records that were skipped.
    pub rejected: Vec<RejectedRecord>,
}

/// Decode a feed payload (JSON or CBOR, auto-detected).
pub fn decode_batch(payload: &[u8]) -> Result<DecodedBatch> {
    let envelope: Value = decode_auto(payload)?;
    batch_from_value(envelope)
}

/// Split an already-parsed payload into validated devices and rejections.
///
/// The payload is either an array of records or a single record object.
pub fn batch_from_value(envelope: Value) -> Result<DecodedBatch> {
    let records = match envelope {
        Value::Array(items) => items,
        record @ Value::Object(_) => vec![record],
        other => {
            return Err(Error::Envelope(format!(
                "expected an array or an object, got {}",
                value_kind(&other)
            )));
        }
    };

    let mut batch = DecodedBatch::default();
    let mut seen = HashSet::new();

    for (index, record) in records.into_iter().enumerate() {
        let address = record_address(&record);
        let outcome = parse_record(record).and_then(|device| {
            if seen.insert(device.address.clone()) {
                Ok(device)
            } else {
                Err(RecordError::DuplicateAddress(device.address))
            }
        });

        match outcome {
            Ok(device) => batch.devices.push(device),
            Err(error) => batch.rejected.push(RejectedRecord {
                index,
                address,
                error,
            }),
        }
    }

    Ok(batch)
}

/// Validate a single wire record.
pub fn parse_record(record: Value) -> std::result::Result<DeviceSnapshot, RecordError> {
    let raw: RawRecord =
        serde_json::from_value(record).map_err(|e| RecordError::Schema(e.to_string()))?;
    raw.validate()
}

fn record_address(record: &Value) -> Option<String> {
    ["address", "IP"]
        .iter()
        .find_map(|key| record.get(*key)?.as_str())
        .map(str::to_string)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Wire shape of a record, accepting both the current and the legacy field names.
///
/// Slot maps stay untyped until their key is known to be a board slot.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default, alias = "IP")]
    address: Option<String>,
    #[serde(default, alias = "Light")]
    light: Option<String>,
    #[serde(default, deserialize_with = "present")]
    text: Option<Option<String>>,
    #[serde(default, alias = "HR")]
    hashrate: Option<BTreeMap<String, Value>>,
    #[serde(default, alias = "Temps")]
    temperature: Option<BTreeMap<String, Value>>,
    #[serde(default, alias = "Fans")]
    fans: Option<RawFans>,
}

/// Readings are nullable: a non-finite CBOR float reaches us as `null`.
#[derive(Debug, Deserialize)]
struct RawHashrate {
    #[serde(alias = "HR", deserialize_with = "nullable")]
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTemperature {
    #[serde(rename = "chipTemp", alias = "Chip", deserialize_with = "nullable")]
    chip: Option<f64>,
    #[serde(rename = "boardTemp", alias = "Board", deserialize_with = "nullable")]
    board: Option<f64>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A required field that may be `null`.
fn nullable<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFans {
    List(Vec<RawFan>),
    Keyed { fan_0: RawFan, fan_1: RawFan },
}

#[derive(Debug, Deserialize)]
struct RawFan {
    #[serde(alias = "RPM")]
    rpm: f64,
}

impl RawRecord {
    fn validate(self) -> std::result::Result<DeviceSnapshot, RecordError> {
        let address = self
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or(RecordError::MissingAddress)?;

        let light_visible = self.light.as_deref() == Some(LIGHT_SHOW);

        let kind = match self.text {
            Some(text) => DeviceKind::Diagnostic {
                text: text.unwrap_or_default(),
            },
            None => {
                let fans = self.fans.ok_or(RecordError::MissingFans)?.validate()?;
                let hashrate = collect_slots(self.hashrate, |slot, raw: RawHashrate| {
                    Ok(HashrateReading {
                        value: finite(slot, "hashrate", raw.value)?,
                    })
                })?;
                let temperature = collect_slots(self.temperature, |slot, raw: RawTemperature| {
                    Ok(TemperatureReading {
                        chip: finite(slot, "chip temperature", raw.chip)?,
                        board: finite(slot, "board temperature", raw.board)?,
                    })
                })?;

                DeviceKind::Sensor(SensorReadings {
                    hashrate,
                    temperature,
                    fans,
                })
            }
        };

        Ok(DeviceSnapshot {
            address,
            light_visible,
            kind,
        })
    }
}

impl RawFans {
    fn validate(self) -> std::result::Result<FanPair, RecordError> {
        let (left, right) = match self {
            RawFans::Keyed { fan_0, fan_1 } => (fan_0, fan_1),
            RawFans::List(fans) => {
                let count = fans.len();
                let mut fans = fans.into_iter();
                match (fans.next(), fans.next(), fans.next()) {
                    (Some(left), Some(right), None) => (left, right),
                    _ => return Err(RecordError::FanCount(count)),
                }
            }
        };

        Ok(FanPair {
            left: FanReading::new(rpm_from_wire(0, left.rpm)?),
            right: FanReading::new(rpm_from_wire(1, right.rpm)?),
        })
    }
}

fn rpm_from_wire(fan: usize, rpm: f64) -> std::result::Result<u32, RecordError> {
    if rpm.is_finite() && rpm >= 0.0 && rpm.fract() == 0.0 && rpm <= f64::from(u32::MAX) {
        Ok(rpm as u32)
    } else {
        Err(RecordError::InvalidRpm { fan, rpm })
    }
}

fn finite(
    slot: BoardSlot,
    metric: &'static str,
    value: Option<f64>,
) -> std::result::Result<f64, RecordError> {
    match value {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(RecordError::NonFinite {
            slot: slot.number(),
            metric,
        }),
    }
}

/// Keep the known slots of a wire map; unknown keys are dropped unread.
fn collect_slots<R, T>(
    raw: Option<BTreeMap<String, Value>>,
    mut convert: impl FnMut(BoardSlot, R) -> std::result::Result<T, RecordError>,
) -> std::result::Result<BTreeMap<BoardSlot, T>, RecordError>
where
    R: serde::de::DeserializeOwned,
{
    let mut slots = BTreeMap::new();
    for (key, value) in raw.unwrap_or_default() {
        match BoardSlot::parse_key(&key) {
            Some(slot) => {
                let reading: R = serde_json::from_value(value)
                    .map_err(|e| RecordError::Schema(format!("board {}: {}", slot.number(), e)))?;
                slots.insert(slot, convert(slot, reading)?);
            }
            None => tracing::debug!(key = %key, "Ignoring unknown board slot"),
        }
    }
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_board_slot_keys() {
        assert_eq!(BoardSlot::parse_key("6"), Some(BoardSlot::Six));
        assert_eq!(BoardSlot::parse_key("board_7"), Some(BoardSlot::Seven));
        assert_eq!(BoardSlot::parse_key("8"), Some(BoardSlot::Eight));
        assert_eq!(BoardSlot::parse_key("5"), None);
        assert_eq!(BoardSlot::parse_key("board_x"), None);
    }

    #[test]
    fn test_sensor_record() {
        let device = parse_record(json!({
            "address": "10.0.0.5",
            "fans": [{"rpm": 0}, {"rpm": 3200}],
            "hashrate": {"6": {"value": 1.1}, "8": {"value": 1.3}},
            "temperature": {"6": {"chipTemp": 61, "boardTemp": 55}},
            "light": "show"
        }))
        .unwrap();

        assert_eq!(device.address, "10.0.0.5");
        assert!(device.light_visible);
        let readings = device.readings().unwrap();
        assert_eq!(
            readings.hashrate.keys().copied().collect::<Vec<_>>(),
            vec![BoardSlot::Six, BoardSlot::Eight]
        );
        assert_eq!(readings.hashrate[&BoardSlot::Eight].value, 1.3);
        assert_eq!(
            readings.temperature[&BoardSlot::Six],
            TemperatureReading {
                chip: 61.0,
                board: 55.0
            }
        );
        assert_eq!(readings.fans, FanPair::new(0, 3200));
        assert!(readings.fans.left.is_faulted());
    }

    #[test]
    fn test_legacy_field_names() {
        let device = parse_record(json!({
            "IP": "192.168.1.20",
            "Light": "show",
            "HR": {"board_7": {"HR": 4.2}},
            "Temps": {"board_7": {"Chip": 70.5, "Board": 58.0}},
            "Fans": {"fan_0": {"RPM": 4800}, "fan_1": {"RPM": 4920}}
        }))
        .unwrap();

        assert_eq!(device.address, "192.168.1.20");
        assert!(device.light_visible);
        let readings = device.readings().unwrap();
        assert_eq!(readings.hashrate[&BoardSlot::Seven].value, 4.2);
        assert_eq!(readings.temperature[&BoardSlot::Seven].chip, 70.5);
        assert_eq!(readings.fans, FanPair::new(4800, 4920));
    }

    #[test]
    fn test_text_field_selects_diagnostic() {
        let device = parse_record(json!({
            "IP": "10.0.0.9",
            "text": "Waiting for miner connection...\n",
            "Light": "hide"
        }))
        .unwrap();

        assert!(!device.light_visible);
        assert_eq!(
            device.kind,
            DeviceKind::Diagnostic {
                text: "Waiting for miner connection...\n".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_slots_are_ignored() {
        let device = parse_record(json!({
            "address": "a",
            "fans": [{"rpm": 1}, {"rpm": 2}],
            "hashrate": {"5": {"value": 9.9}, "7": {"value": 1.0}, "chain": {"value": 2.0}}
        }))
        .unwrap();

        let readings = device.readings().unwrap();
        assert_eq!(readings.hashrate.len(), 1);
        assert!(readings.hashrate.contains_key(&BoardSlot::Seven));
        assert!(readings.temperature.is_empty());
    }

    #[test]
    fn test_unknown_slot_values_are_not_read() {
        let device = parse_record(json!({
            "address": "a",
            "fans": [{"rpm": 1}, {"rpm": 2}],
            "hashrate": {"6": {"value": 1.0}, "total": 3.0},
            "temperature": {"6": {"chipTemp": 60, "boardTemp": 50}, "ambient": "warm"}
        }))
        .unwrap();

        let readings = device.readings().unwrap();
        assert_eq!(readings.hashrate.len(), 1);
        assert_eq!(readings.hashrate[&BoardSlot::Six].value, 1.0);
        assert_eq!(readings.temperature.len(), 1);
    }

    #[test]
    fn test_malformed_known_slot_is_rejected() {
        assert!(matches!(
            parse_record(json!({
                "address": "a",
                "fans": [{"rpm": 1}, {"rpm": 2}],
                "hashrate": {"6": 1.0}
            })),
            Err(RecordError::Schema(_))
        ));
    }

    #[test]
    fn test_null_text_is_still_diagnostic() {
        let device = parse_record(json!({"address": "a", "text": null})).unwrap();
        assert_eq!(
            device.kind,
            DeviceKind::Diagnostic {
                text: String::new()
            }
        );
    }

    #[test]
    fn test_null_reading_is_non_finite() {
        assert_eq!(
            parse_record(json!({
                "address": "a",
                "fans": [{"rpm": 1}, {"rpm": 2}],
                "temperature": {"7": {"chipTemp": 60, "boardTemp": null}}
            })),
            Err(RecordError::NonFinite {
                slot: 7,
                metric: "board temperature"
            })
        );
    }

    #[test]
    fn test_cbor_nan_hashrate_is_rejected() {
        use ciborium::value::Value as Cbor;

        let text = |s: &str| Cbor::Text(s.to_string());
        let fan = |rpm: i64| Cbor::Map(vec![(text("rpm"), Cbor::Integer(rpm.into()))]);
        let record = Cbor::Map(vec![
            (text("address"), text("10.0.0.5")),
            (text("fans"), Cbor::Array(vec![fan(4800), fan(4900)])),
            (
                text("hashrate"),
                Cbor::Map(vec![
                    (
                        text("6"),
                        Cbor::Map(vec![(text("value"), Cbor::Float(f64::NAN))]),
                    ),
                    (
                        text("7"),
                        Cbor::Map(vec![(text("value"), Cbor::Float(2.4))]),
                    ),
                ]),
            ),
        ]);
        let mut payload = Vec::new();
        ciborium::into_writer(&Cbor::Array(vec![record]), &mut payload).unwrap();

        let batch = decode_batch(&payload).unwrap();
        assert!(batch.devices.is_empty());
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].address.as_deref(), Some("10.0.0.5"));
        assert_eq!(
            batch.rejected[0].error,
            RecordError::NonFinite {
                slot: 6,
                metric: "hashrate"
            }
        );
    }

    #[test]
    fn test_malformed_records() {
        assert_eq!(
            parse_record(json!({"fans": [{"rpm": 1}, {"rpm": 2}]})),
            Err(RecordError::MissingAddress)
        );
        assert_eq!(
            parse_record(json!({"address": "  "})),
            Err(RecordError::MissingAddress)
        );
        assert_eq!(
            parse_record(json!({"address": "a"})),
            Err(RecordError::MissingFans)
        );
        assert_eq!(
            parse_record(json!({"address": "a", "fans": [{"rpm": 1}]})),
            Err(RecordError::FanCount(1))
        );
        assert_eq!(
            parse_record(json!({"address": "a", "fans": [{"rpm": -5}, {"rpm": 1}]})),
            Err(RecordError::InvalidRpm { fan: 0, rpm: -5.0 })
        );
        assert_eq!(
            parse_record(json!({"address": "a", "fans": [{"rpm": 1}, {"rpm": 2.5}]})),
            Err(RecordError::InvalidRpm { fan: 1, rpm: 2.5 })
        );
        assert!(matches!(
            parse_record(json!("not a record")),
            Err(RecordError::Schema(_))
        ));
    }

    #[test]
    fn test_batch_skips_bad_records() {
        let batch = batch_from_value(json!([
            {"address": "a", "fans": [{"rpm": 1}, {"rpm": 2}]},
            {"address": "b"},
            {"address": "c", "text": "ok"},
            {"address": "a", "text": "dup"}
        ]))
        .unwrap();

        let addresses: Vec<_> = batch.devices.iter().map(|d| d.address.as_str()).collect();
        assert_eq!(addresses, vec!["a", "c"]);
        assert_eq!(batch.rejected.len(), 2);
        assert_eq!(batch.rejected[0].index, 1);
        assert_eq!(batch.rejected[0].address.as_deref(), Some("b"));
        assert_eq!(batch.rejected[0].error, RecordError::MissingFans);
        assert_eq!(
            batch.rejected[1].error,
            RecordError::DuplicateAddress("a".to_string())
        );
    }

    #[test]
    fn test_single_record_envelope() {
        let batch = batch_from_value(json!({"IP": "10.1.1.1", "text": "Installing"})).unwrap();
        assert_eq!(batch.devices.len(), 1);

        assert!(matches!(
            batch_from_value(json!(42)),
            Err(Error::Envelope(_))
        ));
    }

    #[test]
    fn test_empty_batch() {
        let batch = decode_batch(b"[]").unwrap();
        assert!(batch.devices.is_empty());
        assert!(batch.rejected.is_empty());
    }
}
