//! The trace backend seam.
//!
//! A backend hands out a [`TraceClient`] per sink configuration, and each
//! client hands out [`TraceChannel`]s that share its sink. Handles are owned:
//! releasing a client invalidates its channels, and releasing an already
//! invalidated channel does nothing.

use std::fmt;

use thiserror::Error;

pub mod parameters;
mod sink;
mod tracing_backend;

pub use parameters::{ClientParameters, SinkKind};
pub use tracing_backend::TracingBackend;

/// Label of the single channel a [`crate::Logger`] opens on its client.
pub const CHANNEL_LABEL: &str = "Log channel";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("sink error: {0}")]
    Sink(String),

    #[error("client already released")]
    Released,
}

/// The backend's own ordered severity scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Severity for a `/Verb=` digit.
    pub fn from_digit(digit: u8) -> Option<Self> {
        Some(match digit {
            0 => Self::Trace,
            1 => Self::Debug,
            2 => Self::Info,
            3 => Self::Warning,
            4 => Self::Error,
            5 => Self::Critical,
            _ => return None,
        })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// Opaque identifier of a module registered on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleHandle(u32);

impl ModuleHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

/// One trace record handed to [`TraceChannel::trace`].
#[derive(Debug, Clone, Copy)]
pub struct TraceRecord<'a> {
    pub severity: Severity,
    pub module: Option<ModuleHandle>,
    pub line: u32,
    pub file: &'a str,
    pub function: &'a str,
    pub message: fmt::Arguments<'a>,
}

pub trait TraceBackend: Send + Sync {
    /// Create a client from a backend command line such as
    /// `/Sink=Console /Verb=3`.
    fn create_client(&self, parameters: &str) -> Result<Box<dyn TraceClient>, BackendError>;
}

pub trait TraceClient: Send + Sync {
    fn create_channel(&self, label: &str) -> Result<Box<dyn TraceChannel>, BackendError>;

    /// Publish the client under `name`. Returns `false` if the name is taken.
    fn share(&self, name: &str) -> bool;

    /// May block until buffered records are written.
    fn flush(&self);

    /// Idempotent. Invalidates every channel created from this client.
    fn release(&mut self);
}

pub trait TraceChannel: Send + Sync {
    /// Publish the channel under `name`. Returns `false` if the name is taken.
    fn share(&self, name: &str) -> bool;

    /// Registering the same name twice yields the same handle.
    fn register_module(&self, name: &str) -> ModuleHandle;

    fn set_verbosity(&self, module: Option<ModuleHandle>, severity: Severity);

    /// An unset module reports the channel's global verbosity.
    fn verbosity(&self, module: Option<ModuleHandle>) -> Severity;

    fn trace(&self, record: &TraceRecord<'_>);

    /// Idempotent, and a no-op once the owning client has been released.
    fn release(&mut self);
}
