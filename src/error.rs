use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("notification interval must be greater than zero")]
    ZeroInterval,

    #[error("minimum notification spacing must be greater than zero")]
    ZeroMinSpacing,

    #[error("invalid value range: min {min} is greater than max {max}")]
    InvalidRange { min: i64, max: i64 },

    /// Timers are driven by tokio and need a runtime to spawn onto.
    #[error("no tokio runtime is available to drive notification timers")]
    NoRuntime,

    #[error("no client is listening for notifications")]
    NoListeners,

    #[error("control point payload must be exactly one byte, got {0}")]
    InvalidControlPoint(usize),

    #[error("unsupported control point opcode {0:#04x}")]
    UnsupportedOpcode(u8),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
