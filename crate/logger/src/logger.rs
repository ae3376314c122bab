use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use tracing::{debug, trace, warn};

use crate::{
    backend::{
        parameters::default_parameters, ModuleHandle, TraceBackend, TraceChannel, TraceClient,
        TraceRecord, CHANNEL_LABEL,
    },
    LogLevel, LoggerError,
};

/// Source location of a logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite<'a> {
    pub file: &'a str,
    pub line: u32,
    pub function: &'a str,
}

impl<'a> CallSite<'a> {
    pub const fn new(file: &'a str, line: u32, function: &'a str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }
}

/// A named logging stream owning one backend client and one trace channel.
///
/// Dropping the logger releases the channel, then the client.
pub struct Logger {
    name: String,
    enabled: AtomicBool,
    // declared before `client`: the channel is a child of the client
    channel: Box<dyn TraceChannel>,
    client: Box<dyn TraceClient>,
}

impl Logger {
    /// Create a logger whose client is configured by `parameters`, a backend
    /// command line such as `/Sink=Console /Verb=3`.
    ///
    /// # Errors
    /// Returns [`LoggerError::ClientCreation`] if the backend rejects the
    /// parameters and [`LoggerError::ChannelCreation`] if the trace channel
    /// cannot be opened; in the latter case the client is released first.
    pub fn new(
        backend: &dyn TraceBackend,
        name: &str,
        parameters: &str,
    ) -> Result<Self, LoggerError> {
        debug!("creating logger {name:?} with parameters {parameters:?}");
        let mut client = backend
            .create_client(parameters)
            .map_err(|e| LoggerError::client_creation(&e))?;
        let channel = match client.create_channel(CHANNEL_LABEL) {
            Ok(channel) => channel,
            Err(e) => {
                client.release();
                return Err(LoggerError::channel_creation(&e));
            }
        };

        if !client.share(name) {
            warn!("a trace client is already shared under {name:?}");
        }
        if !channel.share(name) {
            warn!("a trace channel is already shared under {name:?}");
        }

        Ok(Self {
            name: name.to_owned(),
            enabled: AtomicBool::new(true),
            channel,
            client,
        })
    }

    /// Create a logger on the console sink at the build's default verbosity.
    ///
    /// # Errors
    /// See [`Logger::new`].
    pub fn with_default_parameters(
        backend: &dyn TraceBackend,
        name: &str,
    ) -> Result<Self, LoggerError> {
        Self::new(backend, name, &default_parameters())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the verbosity outside of any module.
    pub fn set_level(&self, level: LogLevel) {
        self.channel.set_verbosity(None, level.into());
    }

    /// Set the verbosity of `module_name`, registering the module if needed.
    pub fn set_module_level(&self, module_name: &str, level: LogLevel) {
        let module = self.module(Some(module_name));
        self.channel.set_verbosity(module, level.into());
    }

    /// Read back the verbosity of a module, or the global one for `None`.
    ///
    /// Lossy: `Notice` reads back as `Info` and `Panic` as `Critical`.
    pub fn get_level(&self, module_name: Option<&str>) -> LogLevel {
        self.channel.verbosity(self.module(module_name)).into()
    }

    pub fn log_module_message(
        &self,
        level: LogLevel,
        site: CallSite<'_>,
        module_name: Option<&str>,
        args: fmt::Arguments<'_>,
    ) {
        if !self.is_enabled() {
            return;
        }
        self.channel.trace(&TraceRecord {
            severity: level.into(),
            module: self.module(module_name),
            line: site.line,
            file: site.file,
            function: site.function,
            message: args,
        });
    }

    pub fn log_message(&self, level: LogLevel, site: CallSite<'_>, args: fmt::Arguments<'_>) {
        self.log_module_message(level, site, None, args);
    }

    /// Log an already formatted message.
    pub fn log_literal(&self, level: LogLevel, site: CallSite<'_>, message: &str) {
        self.log_module_message(level, site, None, format_args!("{message}"));
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn flush(&self) {
        self.client.flush();
    }

    fn module(&self, module_name: Option<&str>) -> Option<ModuleHandle> {
        module_name.map(|name| self.channel.register_module(name))
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        trace!("dropping logger {:?}", self.name);
        self.channel.release();
        self.client.release();
    }
}
