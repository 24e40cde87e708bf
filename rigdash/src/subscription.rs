use std::sync::Arc;
use std::time::Duration;

use iced::Subscription;

use rigdash_common::{DashboardConfig, ZenohConfig, connect, decode_batch};

use crate::control::{DemoControl, ZenohControl};
use crate::message::Message;

/// Everything the feed subscription needs; a change restarts it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedSettings {
    pub zenoh: ZenohConfig,
    pub dashboard: DashboardConfig,
}

/// Create a subscription that connects to Zenoh and receives snapshot batches.
pub fn zenoh_subscription(settings: FeedSettings) -> Subscription<Message> {
    Subscription::run_with(settings, |settings| {
        let settings = settings.clone();
        async_stream::stream! {
            let session = match connect(&settings.zenoh).await {
                Ok(session) => session,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to connect to Zenoh");
                    yield Message::Disconnected(e.to_string());
                    // Wait before the stream ends (subscription will restart)
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    return;
                }
            };

            let keys = settings.dashboard.keys();
            let subscriber = match session.declare_subscriber(keys.snapshot()).await {
                Ok(sub) => sub,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create subscriber");
                    yield Message::Disconnected(e.to_string());
                    return;
                }
            };

            let control = ZenohControl::new(
                session.clone(),
                keys.clone(),
                settings.dashboard.serialization,
                settings.dashboard.check_timeout(),
            );
            tracing::info!(key = %keys.snapshot(), "Subscribed to snapshot feed");
            yield Message::Connected(Arc::new(control));

            loop {
                match subscriber.recv_async().await {
                    Ok(sample) => {
                        let payload = sample.payload().to_bytes();
                        match decode_batch(&payload) {
                            Ok(batch) => {
                                for rejected in &batch.rejected {
                                    tracing::warn!(
                                        index = rejected.index,
                                        address = ?rejected.address,
                                        error = %rejected.error,
                                        "Skipping malformed device record"
                                    );
                                }
                                yield Message::SnapshotReceived(batch.devices);
                            }
                            Err(e) => {
                                tracing::warn!(
                                    error = %e,
                                    key = %sample.key_expr(),
                                    "Failed to decode snapshot"
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Subscriber error");
                        yield Message::Disconnected(e.to_string());
                        return;
                    }
                }
            }
        }
    })
}

/// Create a tick subscription for periodic UI updates.
pub fn tick_subscription() -> Subscription<Message> {
    iced::time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

/// Create a demo subscription that generates simulated snapshot batches.
pub fn demo_subscription() -> Subscription<Message> {
    Subscription::run(|| {
        async_stream::stream! {
            use crate::demo::DemoSimulator;
            use rand::{Rng, SeedableRng};

            yield Message::Connected(Arc::new(DemoControl::new()));

            let mut simulator = DemoSimulator::new();
            // Use a Send-compatible RNG (seeded from system entropy)
            let mut rng = rand::rngs::SmallRng::from_os_rng();

            loop {
                yield Message::SnapshotReceived(simulator.next_batch());

                let delay = 1000 + rng.random_range(0u64..1000u64);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }
    })
}
