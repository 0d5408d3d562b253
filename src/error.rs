use thiserror::Error;

/// Failures of the key-value persistence adapter. The engine itself never
/// propagates these to callers; a failed load falls back to default state
/// and a failed save is logged and dropped.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
