use thiserror::Error;

/// Common error type for rigdash components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Zenoh error: {0}")]
    Zenoh(#[from] zenoh::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CBOR serialization error: {0}")]
    Cbor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key expression: {0}")]
    KeyExpr(String),

    /// The payload decoded, but is neither a record nor a list of records.
    #[error("Unrecognized snapshot envelope: {0}")]
    Envelope(String),
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(e: ciborium::ser::Error<std::io::Error>) -> Self {
        Error::Cbor(e.to_string())
    }
}

impl From<ciborium::de::Error<std::io::Error>> for Error {
    fn from(e: ciborium::de::Error<std::io::Error>) -> Self {
        Error::Cbor(e.to_string())
    }
}

/// Reasons a single device record is rejected at the transport boundary.
///
/// A rejected record is skipped; the rest of the batch still renders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("record does not match the device schema: {0}")]
    Schema(String),

    #[error("record has no address")]
    MissingAddress,

    #[error("sensor record has no fans")]
    MissingFans,

    #[error("expected exactly 2 fans, found {0}")]
    FanCount(usize),

    #[error("fan {fan} reports an invalid RPM ({rpm})")]
    InvalidRpm { fan: usize, rpm: f64 },

    /// Also raised for a `null` reading, which is how a CBOR NaN or infinity decodes.
    #[error("board {slot} reports a non-finite {metric}")]
    NonFinite { slot: u8, metric: &'static str },

    #[error("address {0} appears more than once in the batch")]
    DuplicateAddress(String),
}

/// Result type alias using rigdash's Error.
pub type Result<T> = std::result::Result<T, Error>;
