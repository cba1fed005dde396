use thiserror::Error;

/// Errors raised while loading or training on transition samples.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("malformed training sample #{index}: {reason}")]
    MalformedSample { index: usize, reason: String },
    #[error("dataset I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while decoding or persisting a probability table.
///
/// Every decode failure is fatal; no partially decoded table is returned.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown mood '{0}' in model")]
    UnknownMood(String),
    #[error("undecodable transition key '{key}' under mood '{mood}'")]
    UndecodableKey { mood: String, key: String },
    #[error("unknown harmonic function '{function}' under '{mood}' / '{key}'")]
    UnknownFunction {
        mood: String,
        key: String,
        function: String,
    },
    #[error("invalid weight {weight} for '{function}' under '{mood}' / '{key}'")]
    InvalidWeight {
        mood: String,
        key: String,
        function: String,
        weight: f64,
    },
    #[error("model mixes order-1 and order-2 transition keys")]
    MixedOrders,
    #[error("model I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("model JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected interactive input. The session state is unchanged when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no suggestion at position {position} (1..={available})")]
    InvalidPosition { position: usize, available: usize },
    #[error("unknown chord '{0}'")]
    UnknownChord(String),
}
