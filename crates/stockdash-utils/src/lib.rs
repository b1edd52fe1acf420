//! Shared utilities for stockdash
//!
//! Logging setup and application-level configuration used by the binary.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::{LogFormat, init_tracing};
