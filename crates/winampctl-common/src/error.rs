//! Error types for winampctl

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Target window not found, is the target running? (step {step}: ({class}, {title}))")]
    TargetNotFound {
        step: usize,
        class: String,
        title: String,
    },

    #[error("Failed to attach to target process: {0}")]
    AttachFailed(String),

    #[error("Remote free at {address:#x} failed: {reason}")]
    FreeFailed { address: usize, reason: String },

    #[error("Remote allocation of {size} bytes failed")]
    AllocationFailed { size: usize },

    #[error("Remote write at {address:#x} failed: wrote {written} of {expected} bytes")]
    WriteFailed {
        address: usize,
        expected: usize,
        written: usize,
    },

    #[error("Remote read of {len} bytes at {address:#x} failed")]
    ReadFailed { address: usize, len: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Marshaling error: {0}")]
    Marshal(String),

    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, Error>;
