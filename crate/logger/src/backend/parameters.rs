//! Backend command line: whitespace separated `/Key=Value` tokens.
//!
//! ```text
//! /Sink=File /Dir=logs /Name=app.log /Verb=2
//! ```

use std::{path::PathBuf, str::FromStr};

use super::{BackendError, Severity};

pub const SINK_SELECTOR: &str = "/Sink=";
pub const VERBOSITY_SELECTOR: &str = "/Verb=";

#[cfg(debug_assertions)]
pub const DEFAULT_VERBOSITY: &str = "0";
#[cfg(not(debug_assertions))]
pub const DEFAULT_VERBOSITY: &str = "3";

const DEFAULT_DIR: &str = "logs";
const DEFAULT_FILE_NAME: &str = "trace.log";

/// `/Sink=Console /Verb=0` in debug builds, `/Sink=Console /Verb=3` otherwise.
pub fn default_parameters() -> String {
    format!("{SINK_SELECTOR}Console {VERBOSITY_SELECTOR}{DEFAULT_VERBOSITY}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Console,
    Stderr,
    File,
    Null,
    Syslog,
}

impl FromStr for SinkKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Console" => Ok(Self::Console),
            "Stderr" => Ok(Self::Stderr),
            "File" => Ok(Self::File),
            "Null" => Ok(Self::Null),
            "Syslog" => Ok(Self::Syslog),
            other => Err(BackendError::InvalidParameters(format!(
                "unknown sink: {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientParameters {
    pub sink: SinkKind,
    pub verbosity: Severity,
    pub dir: PathBuf,
    pub file_name: String,
    pub ansi: bool,
}

impl Default for ClientParameters {
    fn default() -> Self {
        Self {
            sink: SinkKind::Console,
            verbosity: if cfg!(debug_assertions) {
                Severity::Trace
            } else {
                Severity::Warning
            },
            dir: PathBuf::from(DEFAULT_DIR),
            file_name: DEFAULT_FILE_NAME.to_owned(),
            ansi: false,
        }
    }
}

impl FromStr for ClientParameters {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parameters = Self::default();
        for token in s.split_whitespace() {
            let (key, value) = token
                .strip_prefix('/')
                .and_then(|t| t.split_once('='))
                .ok_or_else(|| {
                    BackendError::InvalidParameters(format!("malformed token: {token:?}"))
                })?;
            match key {
                "Sink" => parameters.sink = value.parse()?,
                "Verb" => parameters.verbosity = parse_verbosity(value)?,
                "Dir" => parameters.dir = PathBuf::from(value),
                "Name" => {
                    if value.is_empty() {
                        return Err(BackendError::InvalidParameters(
                            "empty file name".to_owned(),
                        ));
                    }
                    parameters.file_name = value.to_owned();
                }
                "Ansi" => {
                    parameters.ansi = match value {
                        "0" => false,
                        "1" => true,
                        other => {
                            return Err(BackendError::InvalidParameters(format!(
                                "invalid ansi flag: {other:?}"
                            )))
                        }
                    }
                }
                other => {
                    return Err(BackendError::InvalidParameters(format!(
                        "unknown key: {other:?}"
                    )))
                }
            }
        }
        Ok(parameters)
    }
}

fn parse_verbosity(value: &str) -> Result<Severity, BackendError> {
    value
        .parse::<u8>()
        .ok()
        .and_then(Severity::from_digit)
        .ok_or_else(|| BackendError::InvalidParameters(format!("invalid verbosity: {value:?}")))
}
