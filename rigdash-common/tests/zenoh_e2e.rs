//! End-to-end tests with Zenoh.
//!
//! These tests verify that snapshot batches and control traffic travel through
//! Zenoh using the rigdash key space.
//!
//! Note: Zenoh requires multi-thread tokio runtime.
//! Each test uses a unique key prefix to avoid interference.

use std::time::Duration;

use rigdash_common::{
    ControlCommand, ControlRequest, Format, KeyExprBuilder, ParsedKeyExpr, Toggle, decode_auto,
    decode_batch, encode,
};
use serde_json::json;

/// Generate a unique test prefix to avoid test interference.
fn unique_prefix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test_{}", nanos)
}

/// A snapshot published on the feed key arrives as one decodable batch.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_zenoh_snapshot_feed() {
    let keys = KeyExprBuilder::with_prefix(unique_prefix());

    let session = zenoh::open(zenoh::Config::default())
        .await
        .expect("Failed to open Zenoh session");

    let subscriber = session
        .declare_subscriber(keys.snapshot())
        .await
        .expect("Failed to create subscriber");

    // Give subscriber time to set up
    tokio::time::sleep(Duration::from_millis(100)).await;

    let message = json!([
        {
            "address": "10.0.0.5",
            "fans": [{"rpm": 0}, {"rpm": 3200}],
            "hashrate": {"6": {"value": 1.1}, "8": {"value": 1.3}},
            "temperature": {"6": {"chipTemp": 61, "boardTemp": 55}},
            "light": "show"
        },
        {"address": "10.0.0.6", "text": "Install complete, configuring.\n"}
    ]);
    let encoded = encode(&message, Format::Cbor).expect("Failed to encode");

    session
        .put(keys.snapshot(), encoded)
        .await
        .expect("Failed to publish");

    let received = tokio::time::timeout(Duration::from_secs(5), subscriber.recv_async())
        .await
        .expect("Timeout waiting for snapshot")
        .expect("Failed to receive snapshot");

    let payload = received.payload().to_bytes();
    let batch = decode_batch(&payload).expect("Failed to decode batch");

    assert_eq!(batch.devices.len(), 2);
    assert!(batch.rejected.is_empty());
    assert_eq!(batch.devices[0].address, "10.0.0.5");
    assert!(batch.devices[0].light_visible);
    assert_eq!(batch.devices[1].address, "10.0.0.6");

    drop(subscriber);
    session.close().await.expect("Failed to close session");
}

/// A command put on the control key reaches a subscriber with its address.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_zenoh_control_command() {
    let keys = KeyExprBuilder::with_prefix(unique_prefix());

    let session = zenoh::open(zenoh::Config::default())
        .await
        .expect("Failed to open Zenoh session");

    let subscriber = session
        .declare_subscriber(keys.control_wildcard())
        .await
        .expect("Failed to create subscriber");

    tokio::time::sleep(Duration::from_millis(100)).await;

    let request = ControlRequest::new("10.0.0.5");
    session
        .put(
            keys.command(ControlCommand::Unlight, &request.address),
            encode(&request, Format::Json).unwrap(),
        )
        .await
        .expect("Failed to publish");

    let received = tokio::time::timeout(Duration::from_secs(5), subscriber.recv_async())
        .await
        .expect("Timeout waiting for command")
        .expect("Failed to receive command");

    let key = received.key_expr().as_str().to_string();
    assert_eq!(
        keys.parse(&key).unwrap(),
        ParsedKeyExpr::Command {
            command: ControlCommand::Unlight,
            address: "10.0.0.5"
        }
    );
    let decoded: ControlRequest = decode_auto(&received.payload().to_bytes()).unwrap();
    assert_eq!(decoded, request);

    drop(subscriber);
    session.close().await.expect("Failed to close session");
}

/// A check query is answered by a queryable with a boolean state.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_zenoh_check_query() {
    let keys = KeyExprBuilder::with_prefix(unique_prefix());

    let session = zenoh::open(zenoh::Config::default())
        .await
        .expect("Failed to open Zenoh session");

    let queryable = session
        .declare_queryable(keys.check_wildcard())
        .await
        .expect("Failed to declare queryable");

    let responder_keys = keys.clone();
    let responder = tokio::spawn(async move {
        if let Ok(query) = queryable.recv_async().await {
            let key = query.key_expr().as_str().to_string();
            let lit = matches!(
                responder_keys.parse(&key),
                Ok(ParsedKeyExpr::Check {
                    toggle: Toggle::Light,
                    ..
                })
            );
            query
                .reply(query.key_expr().clone(), encode(&lit, Format::Json).unwrap())
                .await
                .expect("Failed to reply");
        }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    let replies = session
        .get(keys.check(Toggle::Light, "10.0.0.5"))
        .await
        .expect("Failed to send query");

    let reply = tokio::time::timeout(Duration::from_secs(5), replies.recv_async())
        .await
        .expect("Timeout waiting for reply")
        .expect("Failed to receive reply");

    let sample = reply.result().expect("Queryable replied with an error");
    let lit: bool = decode_auto(&sample.payload().to_bytes()).unwrap();
    assert!(lit);

    responder.await.unwrap();
    session.close().await.expect("Failed to close session");
}
