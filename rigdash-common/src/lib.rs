//! rigdash common library
//!
//! Shared types for the rigdash miner dashboard and the feeds that drive it:
//!
//! - [`snapshot`] - Device snapshot model and boundary validation (`DeviceSnapshot`, `DeviceKind`)
//! - [`control`] - Pause/light command and check vocabulary
//! - [`serialization`] - JSON/CBOR encoding and decoding
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`session`] - Zenoh session management
//! - [`keyexpr`] - Key expression builder and parser
//! - [`error`] - Error types

pub mod config;
pub mod control;
pub mod error;
pub mod keyexpr;
pub mod serialization;
pub mod session;
pub mod snapshot;

// Re-export commonly used types at the crate root
pub use config::{
    DashboardConfig, LogFormat, LoggingConfig, RigdashConfig, ZenohConfig, load_config,
    parse_config,
};
pub use control::{ControlCommand, ControlQuery, ControlRequest, Toggle};
pub use error::{Error, RecordError, Result};
pub use keyexpr::{KEY_PREFIX, KeyExprBuilder, ParsedKeyExpr};
pub use serialization::{Format, decode, decode_auto, encode};
pub use session::connect;
pub use snapshot::{
    BoardSlot, DecodedBatch, DeviceKind, DeviceSnapshot, FanPair, FanReading, HashrateReading,
    RejectedRecord, SensorReadings, TemperatureReading, decode_batch,
};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level` when set.
///
/// # Example
///
/// ```ignore
/// use rigdash_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "debug".to_string(),
///     format: LogFormat::Json,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init(),
    };

    result.map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))
}
