//! # TSW Logger
//!
//! Named loggers over a handle-based trace backend.
//!
//! Each [`Logger`] owns one backend client (a sink configuration) and one
//! trace channel on that client. Loggers are looked up by name in a
//! [`LoggerRegistry`], which creates them on first use and keeps them for its
//! whole lifetime.
//!
//! ```no_run
//! use tsw_logger::{log, log_module, log_to, set_log_level, LogLevel};
//!
//! set_log_level!(LogLevel::Info);
//! log!(LogLevel::Info, "listening on port {}", 8080);
//! log_module!(LogLevel::Warning, "dns", "slow resolver: {} ms", 1200);
//! log_to!("audit", LogLevel::Notice, "user {} logged in", "alice");
//! ```
//!
//! ## Backend parameters
//!
//! Clients are configured with a command line of `/Key=Value` tokens, for
//! instance `/Sink=File /Dir=logs /Name=app.log /Verb=2`. See
//! [`backend::parameters`].
//!
//! ## Configuration file
//!
//! The process-wide [`registry()`] reads the TOML file designated by the
//! `TSW_LOGGER_CONF` environment variable, if any. See [`LoggerConfig`].
//!
//! ## Features
//!
//! - `syslog`: enables the `/Sink=Syslog` sink on non-Windows targets
pub mod backend;
mod config;
mod error;
mod level;
mod log_utils;
mod logger;
mod macros;
mod registry;
pub mod testing;

pub use config::{LoggerConfig, LoggerSettings, CONF_ENV_VAR};
pub use error::{result::LoggerResult, LoggerError};
pub use level::LogLevel;
pub use log_utils::log_init;
pub use logger::{CallSite, Logger};
pub use registry::{init_registry, registry, LoggerRegistry, DEFAULT_LOGGER};

#[cfg(test)]
mod tests;
