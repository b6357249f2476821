//! Error types shared by the engine, streamer and output devices

use thiserror::Error;

/// Recoverable failures surfaced by the library.
///
/// Buffer size mismatches between the engine, encoder and streamer are not
/// represented here: those are configuration bugs and panic at the call site.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The output device refused a buffer or reported an unrecoverable state.
    #[error("output device fault: {0}")]
    DeviceFault(String),

    #[error("output device unavailable: {0}")]
    DeviceUnavailable(String),
}

pub type Result<T> = std::result::Result<T, SynthError>;
