use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{backend::Severity, LoggerError};

/// Verbosity of a [`crate::Logger`], from the least to the most severe.
///
/// The backend has fewer severities: `Info` and `Notice` are traced as
/// [`Severity::Info`], `Critical` and `Panic` as [`Severity::Critical`].
/// Reading a level back is therefore lossy, and never yields `Notice` or
/// `Panic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Panic,
}

impl LogLevel {
    pub const ALL: [Self; 7] = [
        Self::Debug,
        Self::Info,
        Self::Notice,
        Self::Warning,
        Self::Error,
        Self::Critical,
        Self::Panic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
            Self::Panic => "panic",
        }
    }
}

impl From<LogLevel> for Severity {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Self::Debug,
            LogLevel::Info | LogLevel::Notice => Self::Info,
            LogLevel::Warning => Self::Warning,
            LogLevel::Error => Self::Error,
            LogLevel::Critical | LogLevel::Panic => Self::Critical,
        }
    }
}

impl From<Severity> for LogLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Trace | Severity::Debug => Self::Debug,
            Severity::Info => Self::Info,
            Severity::Warning => Self::Warning,
            Severity::Error => Self::Error,
            Severity::Critical => Self::Critical,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| LoggerError::Parsing(format!("unknown log level: {s:?}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_levels() {
        assert_eq!(Severity::from(LogLevel::Info), Severity::from(LogLevel::Notice));
        assert_eq!(
            Severity::from(LogLevel::Critical),
            Severity::from(LogLevel::Panic)
        );
    }

    #[test]
    fn test_reverse_translation_is_lossy() {
        for level in LogLevel::ALL {
            let back = LogLevel::from(Severity::from(level));
            match level {
                LogLevel::Notice => assert_eq!(back, LogLevel::Info),
                LogLevel::Panic => assert_eq!(back, LogLevel::Critical),
                _ => assert_eq!(back, level),
            }
        }
        assert_eq!(LogLevel::from(Severity::Trace), LogLevel::Debug);
    }

    #[test]
    fn test_parse() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("panic".parse::<LogLevel>().unwrap(), LogLevel::Panic);
        assert!("verbose".parse::<LogLevel>().is_err());
        // same spelling as the configuration file
        assert!("Warning".parse::<LogLevel>().is_err());
        for level in LogLevel::ALL {
            let parsed: LogLevel = toml::Value::String(level.to_string()).try_into().unwrap();
            assert_eq!(parsed, level);
            assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
        }
    }
}
