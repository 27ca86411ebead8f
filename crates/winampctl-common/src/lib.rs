//! winampctl Common Types
//!
//! Shared types, errors and logging configuration used by all winampctl
//! components.

pub mod error;
pub mod logging;
pub mod types;

pub use error::{Error, Result};
pub use logging::{init_debug_logging, init_logging, init_logging_from_file, LogConfig};
pub use types::*;

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, trace, warn};
