use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use tracing::{debug, trace};

use crate::{
    backend::{TraceBackend, TracingBackend},
    config::LoggerConfig,
    Logger, LoggerError,
};

/// Name of the logger used by the call-site macros that take no name.
pub const DEFAULT_LOGGER: &str = "default";

static REGISTRY: OnceLock<LoggerRegistry> = OnceLock::new();

/// Name to [`Logger`] mapping with create-once semantics.
///
/// A logger is created on the first lookup of its name and lives as long as
/// the registry; later lookups return the same instance.
pub struct LoggerRegistry {
    backend: Arc<dyn TraceBackend>,
    config: LoggerConfig,
    loggers: Mutex<HashMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    pub fn new(backend: Arc<dyn TraceBackend>) -> Self {
        Self::with_config(backend, LoggerConfig::default())
    }

    pub fn with_config(backend: Arc<dyn TraceBackend>, config: LoggerConfig) -> Self {
        Self {
            backend,
            config,
            loggers: Mutex::new(HashMap::new()),
        }
    }

    /// Return the logger `name`, creating it with the configured parameters
    /// on first use.
    ///
    /// # Errors
    /// Returns the construction error if the logger has to be created and
    /// the backend fails; nothing is registered in that case.
    pub fn get_logger(&self, name: &str) -> Result<Arc<Logger>, LoggerError> {
        self.get_or_create(name, None)
    }

    /// Like [`LoggerRegistry::get_logger`], but creates the logger with
    /// `parameters`. The parameters are ignored if the logger already exists.
    ///
    /// # Errors
    /// See [`LoggerRegistry::get_logger`].
    pub fn get_logger_with(
        &self,
        name: &str,
        parameters: &str,
    ) -> Result<Arc<Logger>, LoggerError> {
        self.get_or_create(name, Some(parameters))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.loggers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers().is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers().keys().cloned().collect();
        names.sort();
        names
    }

    fn get_or_create(
        &self,
        name: &str,
        parameters: Option<&str>,
    ) -> Result<Arc<Logger>, LoggerError> {
        // creation happens under the lock so that one caller wins a race
        let mut loggers = self.loggers();
        if let Some(logger) = loggers.get(name) {
            if parameters.is_some() {
                trace!("logger {name:?} already exists, ignoring the given parameters");
            }
            return Ok(Arc::clone(logger));
        }
        let parameters = parameters.map_or_else(|| self.config.parameters_for(name), str::to_owned);
        let logger = Arc::new(Logger::new(self.backend.as_ref(), name, &parameters)?);
        self.config.apply(&logger);
        loggers.insert(name.to_owned(), Arc::clone(&logger));
        debug!("registered logger {name:?}");
        Ok(logger)
    }

    fn loggers(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Logger>>> {
        self.loggers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("loggers", &self.names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The process-wide registry.
///
/// Unless [`init_registry`] installed one first, it is built on the
/// [`TracingBackend`] with the configuration file designated by
/// [`crate::CONF_ENV_VAR`], if any.
pub fn registry() -> &'static LoggerRegistry {
    REGISTRY.get_or_init(|| {
        let config = LoggerConfig::load(None).unwrap_or_else(|err| {
            // keep going with the defaults
            eprintln!("Failed to load the loggers configuration: {err}");
            LoggerConfig::default()
        });
        LoggerRegistry::with_config(Arc::new(TracingBackend::new()), config)
    })
}

/// Install `registry` as the process-wide registry.
///
/// # Errors
/// Gives `registry` back if the process-wide registry is already set.
pub fn init_registry(registry: LoggerRegistry) -> Result<(), LoggerRegistry> {
    REGISTRY.set(registry)
}
