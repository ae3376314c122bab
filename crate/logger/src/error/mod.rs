use thiserror::Error;

use crate::backend::BackendError;

pub(crate) mod result;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("client can not be created: {0}")]
    ClientCreation(String),

    #[error("trace can not be created: {0}")]
    ChannelCreation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parsing error: {0}")]
    Parsing(String),

    #[error("Tracing subscriber error: {0}")]
    TracingSubscriber(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("{0}")]
    Default(String),
}

impl LoggerError {
    pub(crate) fn client_creation(e: &BackendError) -> Self {
        Self::ClientCreation(e.to_string())
    }

    pub(crate) fn channel_creation(e: &BackendError) -> Self {
        Self::ChannelCreation(e.to_string())
    }
}

impl From<toml::de::Error> for LoggerError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<std::io::Error> for LoggerError {
    fn from(e: std::io::Error) -> Self {
        Self::IOError(e.to_string())
    }
}

impl From<tracing_subscriber::filter::ParseError> for LoggerError {
    fn from(e: tracing_subscriber::filter::ParseError) -> Self {
        Self::Parsing(e.to_string())
    }
}

impl From<tracing_subscriber::util::TryInitError> for LoggerError {
    fn from(value: tracing_subscriber::util::TryInitError) -> Self {
        Self::TracingSubscriber(value.to_string())
    }
}
