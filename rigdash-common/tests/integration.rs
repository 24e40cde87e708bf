//! Integration tests for rigdash-common library.

use rigdash_common::{
    BoardSlot, ControlCommand, DeviceKind, FanPair, Format, KeyExprBuilder, ParsedKeyExpr,
    RecordError, Toggle, decode_batch, encode,
};
use serde_json::json;

/// A testbench feed message mixing an installer log and a running miner.
fn testbench_message() -> serde_json::Value {
    json!([
        {
            "IP": "192.168.1.31",
            "text": "Miner needs unlock, unlocking.\nUnlocked miner, installing.\n",
            "Light": "show"
        },
        {
            "IP": "192.168.1.32",
            "Light": "show",
            "HR": {
                "board_6": {"HR": 2.51},
                "board_7": {"HR": 2.47},
                "board_8": {"HR": 2.55}
            },
            "Temps": {
                "board_6": {"Chip": 72.0, "Board": 58.5},
                "board_7": {"Chip": 71.0, "Board": 57.0},
                "board_8": {"Chip": 74.5, "Board": 60.0}
            },
            "Fans": {"fan_0": {"RPM": 5280}, "fan_1": {"RPM": 5160}}
        },
        {
            "IP": "192.168.1.33",
            "HR": {"board_6": {"HR": 1.9}}
        }
    ])
}

#[test]
fn test_full_snapshot_workflow() {
    let message = testbench_message();

    for format in [Format::Json, Format::Cbor] {
        let payload = encode(&message, format).expect("encode failed");
        let batch = decode_batch(&payload).expect("decode failed");

        assert_eq!(batch.devices.len(), 2);
        assert_eq!(batch.rejected.len(), 1);

        let diagnostic = &batch.devices[0];
        assert_eq!(diagnostic.address, "192.168.1.31");
        assert!(diagnostic.light_visible);
        assert!(matches!(diagnostic.kind, DeviceKind::Diagnostic { .. }));

        let miner = &batch.devices[1];
        let readings = miner.readings().expect("sensor readings");
        assert_eq!(readings.hashrate.len(), 3);
        assert_eq!(readings.temperature[&BoardSlot::Eight].chip, 74.5);
        assert_eq!(readings.fans, FanPair::new(5280, 5160));

        let rejected = &batch.rejected[0];
        assert_eq!(rejected.index, 2);
        assert_eq!(rejected.address.as_deref(), Some("192.168.1.33"));
        assert_eq!(rejected.error, RecordError::MissingFans);
    }
}

#[test]
fn test_device_order_is_preserved() {
    let message = json!([
        {"address": "c", "text": "3"},
        {"address": "a", "text": "1"},
        {"address": "b", "fans": [{"rpm": 10}, {"rpm": 20}]}
    ]);
    let payload = encode(&message, Format::Json).unwrap();
    let batch = decode_batch(&payload).unwrap();

    let order: Vec<_> = batch.devices.iter().map(|d| d.address.as_str()).collect();
    assert_eq!(order, vec!["c", "a", "b"]);
}

#[test]
fn test_garbage_payload_is_an_error() {
    assert!(decode_batch(b"[not json").is_err());
    assert!(decode_batch(b"\"just a string\"").is_err());
}

#[test]
fn test_key_expression_building_and_parsing() {
    let keys = KeyExprBuilder::with_prefix("bench");

    for toggle in [Toggle::Pause, Toggle::Light] {
        for checked in [true, false] {
            let command = toggle.command(checked);
            let key = keys.command(command, "10.0.0.5");
            assert_eq!(
                keys.parse(&key).unwrap(),
                ParsedKeyExpr::Command {
                    command,
                    address: "10.0.0.5"
                }
            );
        }

        let key = keys.check(toggle, "10.0.0.5");
        assert_eq!(
            keys.parse(&key).unwrap(),
            ParsedKeyExpr::Check {
                toggle,
                address: "10.0.0.5"
            }
        );
    }

    assert_eq!(
        keys.parse(&keys.command(ControlCommand::Light, "fe80::1")).unwrap(),
        ParsedKeyExpr::Command {
            command: ControlCommand::Light,
            address: "fe80::1"
        }
    );
}
