use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    backend::parameters::default_parameters,
    error::result::{LoggerResult, LoggerResultHelper},
    LogLevel, Logger, LoggerError,
};

/// Environment variable holding the path of the loggers configuration file.
pub const CONF_ENV_VAR: &str = "TSW_LOGGER_CONF";

/// Loggers configuration, usually read from a TOML file:
///
/// ```toml
/// default_parameters = "/Sink=Console /Verb=3"
///
/// [loggers.net]
/// parameters = "/Sink=File /Dir=logs /Name=net.log"
/// level = "debug"
///
/// [loggers.net.modules]
/// dns = "warning"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    /// Backend parameters of loggers without their own.
    pub default_parameters: Option<String>,

    pub loggers: HashMap<String, LoggerSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerSettings {
    pub parameters: Option<String>,
    pub level: Option<LogLevel>,
    pub enabled: bool,
    pub modules: HashMap<String, LogLevel>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            parameters: None,
            level: None,
            enabled: true,
            modules: HashMap::new(),
        }
    }
}

impl LoggerConfig {
    /// Resolve the configuration file from `conf`, else from the
    /// [`CONF_ENV_VAR`] environment variable.
    ///
    /// Returns `Ok(None)` when neither is set.
    ///
    /// # Errors
    /// Fails if the designated file does not exist.
    pub fn location(conf: Option<PathBuf>) -> LoggerResult<Option<PathBuf>> {
        trace!("Getting loggers configuration file location");
        let (conf_path, origin) = if let Some(conf_path) = conf {
            (conf_path, "given".to_owned())
        } else if let Some(conf_path) = env::var_os(CONF_ENV_VAR) {
            (
                PathBuf::from(conf_path),
                format!("specified in {CONF_ENV_VAR} environment variable"),
            )
        } else {
            return Ok(None);
        };
        if !conf_path.exists() {
            return Err(LoggerError::Config(format!(
                "Configuration file {conf_path:?} {origin} does not exist"
            )));
        }
        Ok(Some(conf_path))
    }

    /// # Errors
    /// Returns [`LoggerError::IOError`] if the file cannot be read and
    /// [`LoggerError::Config`] if it cannot be parsed.
    pub fn from_toml(conf_path: &Path) -> LoggerResult<Self> {
        let content = fs::read_to_string(conf_path)?;
        trace!("Configuration file contents: {content}");
        Self::from_toml_str(&content)
    }

    /// # Errors
    /// Fails if `content` is not a valid configuration.
    pub fn from_toml_str(content: &str) -> LoggerResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the file found by [`LoggerConfig::location`], or the default
    /// configuration if there is none.
    ///
    /// # Errors
    /// Fails if the designated file is missing or invalid.
    pub fn load(conf: Option<PathBuf>) -> LoggerResult<Self> {
        match Self::location(conf)? {
            Some(conf_path) => Self::from_toml(&conf_path),
            None => Ok(Self::default()),
        }
    }

    /// # Errors
    /// Fails if the configuration cannot be serialized.
    pub fn to_toml_string(&self) -> LoggerResult<String> {
        toml::to_string_pretty(self).context("Unable to serialize loggers configuration")
    }

    /// Creation parameters of the logger `name` when the caller gave none.
    pub fn parameters_for(&self, name: &str) -> String {
        self.loggers
            .get(name)
            .and_then(|settings| settings.parameters.clone())
            .or_else(|| self.default_parameters.clone())
            .unwrap_or_else(default_parameters)
    }

    /// Apply the configured levels and enabled state to a freshly created
    /// logger.
    pub fn apply(&self, logger: &Logger) {
        let Some(settings) = self.loggers.get(logger.name()) else {
            return;
        };
        if let Some(level) = settings.level {
            logger.set_level(level);
        }
        for (module, level) in &settings.modules {
            logger.set_module_level(module, *level);
        }
        if !settings.enabled {
            logger.disable();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;

    const CONF: &str = r#"
default_parameters = "/Sink=Stderr /Verb=2"

[loggers.net]
parameters = "/Sink=Null"
level = "notice"
enabled = false

[loggers.net.modules]
dns = "error"

[loggers.db]
level = "panic"
"#;

    #[test]
    fn test_parse_config() {
        let config = LoggerConfig::from_toml_str(CONF).unwrap();
        assert_eq!(config.default_parameters.as_deref(), Some("/Sink=Stderr /Verb=2"));
        let net = &config.loggers["net"];
        assert_eq!(net.level, Some(LogLevel::Notice));
        assert!(!net.enabled);
        assert_eq!(net.modules["dns"], LogLevel::Error);
        assert!(config.loggers["db"].enabled);
    }

    #[test]
    fn test_parameters_precedence() {
        let config = LoggerConfig::from_toml_str(CONF).unwrap();
        assert_eq!(config.parameters_for("net"), "/Sink=Null");
        assert_eq!(config.parameters_for("db"), "/Sink=Stderr /Verb=2");
        assert_eq!(
            LoggerConfig::default().parameters_for("db"),
            default_parameters()
        );
    }

    #[test]
    fn test_apply() {
        let config = LoggerConfig::from_toml_str(CONF).unwrap();
        let backend = RecordingBackend::new();
        let logger = Logger::new(&backend, "net", "/Sink=Null").unwrap();
        config.apply(&logger);
        assert_eq!(logger.get_level(None), LogLevel::Info);
        assert_eq!(logger.get_level(Some("dns")), LogLevel::Error);
        assert!(!logger.is_enabled());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            LoggerConfig::from_toml_str("[loggers.net]\nlevel = \"loud\"\n"),
            Err(LoggerError::Config(_))
        ));
        assert!(LoggerConfig::from_toml_str("verbosity = 3\n").is_err());
    }

    #[test]
    fn test_unreadable_config() {
        let missing = std::env::temp_dir().join("tsw_logger_unreadable_conf.toml");
        assert!(matches!(
            LoggerConfig::from_toml(&missing),
            Err(LoggerError::IOError(_))
        ));
    }

    #[test]
    fn test_location_and_round_trip() {
        let missing = std::env::temp_dir().join("tsw_logger_missing_conf.toml");
        assert!(LoggerConfig::location(Some(missing)).is_err());

        let conf_path =
            std::env::temp_dir().join(format!("tsw_logger_conf_{}.toml", std::process::id()));
        let config = LoggerConfig::from_toml_str(CONF).unwrap();
        fs::write(&conf_path, config.to_toml_string().unwrap()).unwrap();
        let loaded = LoggerConfig::load(Some(conf_path.clone())).unwrap();
        assert_eq!(loaded, config);
        fs::remove_file(conf_path).unwrap();
    }
}
