//! Control channel used by panels to check and drive device toggles.
//!
//! Panels never talk to the transport directly. The application hands the
//! [`Dashboard`](crate::layout::Dashboard) a [`ControlChannel`] and swaps it
//! when the transport connects or drops.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use zenoh::Session;

use rigdash_common::{
    ControlCommand, ControlQuery, ControlRequest, Format, KeyExprBuilder, Toggle, decode_auto,
    encode,
};

/// Boxed future returned by control channel operations.
pub type ControlFuture<T> = Pin<Box<dyn Future<Output = Result<T, ControlError>> + Send + 'static>>;

/// Shared handle to the active control channel.
pub type ControlHandle = Arc<dyn ControlChannel>;

/// Errors raised while delivering a command or checking a toggle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("Not connected to the control transport")]
    NotConnected,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("No reply received for '{0}'")]
    NoReply(String),

    #[error("Invalid reply: {0}")]
    InvalidReply(String),

    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Port for the per-device control protocol.
///
/// `send` is fire-and-forget from the caller's point of view: the returned
/// future only reports whether the command left this process.
pub trait ControlChannel: fmt::Debug + Send + Sync {
    /// Deliver a command addressed to one device.
    fn send(&self, command: ControlCommand, address: &str) -> ControlFuture<()>;

    /// Ask for the current state of a device toggle.
    fn check(&self, query: ControlQuery, address: &str) -> ControlFuture<bool>;
}

/// Control channel backed by a Zenoh session.
///
/// Commands are `put` on `<prefix>/control/<command>/<address>`, checks are
/// `get` on `<prefix>/check/<toggle>/<address>` and expect a boolean reply.
#[derive(Clone)]
pub struct ZenohControl {
    session: Session,
    keys: KeyExprBuilder,
    format: Format,
    timeout: Duration,
}

impl ZenohControl {
    pub fn new(session: Session, keys: KeyExprBuilder, format: Format, timeout: Duration) -> Self {
        Self {
            session,
            keys,
            format,
            timeout,
        }
    }
}

impl fmt::Debug for ZenohControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZenohControl")
            .field("zid", &self.session.zid().to_string())
            .field("prefix", &self.keys.prefix())
            .field("format", &self.format)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ControlChannel for ZenohControl {
    fn send(&self, command: ControlCommand, address: &str) -> ControlFuture<()> {
        let session = self.session.clone();
        let key = self.keys.command(command, address);
        let request = ControlRequest::new(address);
        let format = self.format;

        Box::pin(async move {
            let payload =
                encode(&request, format).map_err(|e| ControlError::Transport(e.to_string()))?;
            session
                .put(key.clone(), payload)
                .await
                .map_err(|e| ControlError::Transport(e.to_string()))?;

            tracing::debug!(key = %key, "Sent control command");
            Ok(())
        })
    }

    fn check(&self, query: ControlQuery, address: &str) -> ControlFuture<bool> {
        let session = self.session.clone();
        let key = self.keys.check(query.toggle(), address);
        let timeout = self.timeout;

        Box::pin(async move {
            let replies = session
                .get(key.clone())
                .timeout(timeout)
                .await
                .map_err(|e| ControlError::Transport(e.to_string()))?;

            let reply = tokio::time::timeout(timeout, replies.recv_async())
                .await
                .map_err(|_| ControlError::Timeout(timeout))?
                .map_err(|_| ControlError::NoReply(key.clone()))?;

            let sample = reply
                .result()
                .map_err(|_| ControlError::InvalidReply(format!("error reply on '{}'", key)))?;

            let state: bool = decode_auto(&sample.payload().to_bytes())
                .map_err(|e| ControlError::InvalidReply(e.to_string()))?;

            tracing::debug!(key = %key, state, "Received toggle state");
            Ok(state)
        })
    }
}

/// Control channel used while no transport is connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineControl;

impl ControlChannel for OfflineControl {
    fn send(&self, _command: ControlCommand, _address: &str) -> ControlFuture<()> {
        Box::pin(std::future::ready(Err(ControlError::NotConnected)))
    }

    fn check(&self, _query: ControlQuery, _address: &str) -> ControlFuture<bool> {
        Box::pin(std::future::ready(Err(ControlError::NotConnected)))
    }
}

/// In-memory toggle state per device, used by demo mode.
#[derive(Debug, Default)]
pub struct DemoControl {
    state: Mutex<HashMap<(String, Toggle), bool>>,
}

impl DemoControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a toggle (unset toggles are off).
    pub fn state(&self, address: &str, toggle: Toggle) -> bool {
        let state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state
            .get(&(address.to_string(), toggle))
            .copied()
            .unwrap_or(false)
    }
}

impl ControlChannel for DemoControl {
    fn send(&self, command: ControlCommand, address: &str) -> ControlFuture<()> {
        let (toggle, checked) = command.target();
        self.state
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert((address.to_string(), toggle), checked);

        tracing::debug!(command = %command, address = %address, "Demo command applied");
        Box::pin(std::future::ready(Ok(())))
    }

    fn check(&self, query: ControlQuery, address: &str) -> ControlFuture<bool> {
        let state = self.state(address, query.toggle());
        Box::pin(std::future::ready(Ok(state)))
    }
}
