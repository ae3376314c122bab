#![allow(clippy::unwrap_used)]

use std::{sync::Arc, thread};

use crate::{
    backend::{Severity, TracingBackend, CHANNEL_LABEL},
    testing::{BackendCall, RecordingBackend},
    CallSite, LogLevel, Logger, LoggerConfig, LoggerError, LoggerRegistry,
};

const SITE: CallSite<'static> = CallSite::new("src/server.rs", 12, "server::run");

fn recording_registry() -> (RecordingBackend, LoggerRegistry) {
    let backend = RecordingBackend::new();
    let registry = LoggerRegistry::new(Arc::new(backend.clone()));
    (backend, registry)
}

#[test]
fn test_same_name_same_instance() {
    let (backend, registry) = recording_registry();
    let first = registry.get_logger("net").unwrap();
    let second = registry.get_logger("net").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);

    let other = registry.get_logger("db").unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(registry.names(), vec!["db".to_owned(), "net".to_owned()]);
    assert_eq!(
        backend
            .calls()
            .iter()
            .filter(|call| matches!(call, BackendCall::CreateClient(_)))
            .count(),
        2
    );
}

#[test]
fn test_parameters_only_apply_on_creation() {
    let (backend, registry) = recording_registry();
    let first = registry.get_logger_with("net", "/Sink=Null /Verb=1").unwrap();
    let second = registry.get_logger_with("net", "/Sink=Stderr /Verb=5").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        backend.count(&BackendCall::CreateClient("/Sink=Null /Verb=1".to_owned())),
        1
    );
    assert_eq!(
        backend.count(&BackendCall::CreateClient("/Sink=Stderr /Verb=5".to_owned())),
        0
    );
}

#[test]
fn test_construction_publishes_the_logger() {
    let backend = RecordingBackend::new();
    let _logger = Logger::new(&backend, "net", "/Sink=Null").unwrap();
    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::CreateClient("/Sink=Null".to_owned()),
            BackendCall::CreateChannel(CHANNEL_LABEL.to_owned()),
            BackendCall::ShareClient("net".to_owned()),
            BackendCall::ShareChannel("net".to_owned()),
        ]
    );
}

#[test]
fn test_release_order_and_idempotence() {
    let backend = RecordingBackend::new();
    let logger = Logger::new(&backend, "net", "/Sink=Null").unwrap();
    logger.flush();
    drop(logger);
    let calls = backend.calls();
    assert_eq!(
        &calls[calls.len() - 3..],
        &[
            BackendCall::Flush,
            BackendCall::ReleaseChannel,
            BackendCall::ReleaseClient
        ]
    );
    assert_eq!(backend.count(&BackendCall::ReleaseChannel), 1);
    assert_eq!(backend.count(&BackendCall::ReleaseClient), 1);
}

#[test]
fn test_rejected_client() {
    let backend = RecordingBackend::new().reject_parameters("/Sink=Nowhere");
    let err = Logger::new(&backend, "net", "/Sink=Nowhere").unwrap_err();
    assert!(matches!(err, LoggerError::ClientCreation(_)));
    assert!(err.to_string().starts_with("client can not be created"));
    assert!(backend.calls().is_empty());
}

#[test]
fn test_failed_channel_releases_the_client() {
    let backend = RecordingBackend::new().fail_channels();
    let err = Logger::new(&backend, "net", "/Sink=Null").unwrap_err();
    assert!(matches!(err, LoggerError::ChannelCreation(_)));
    assert!(err.to_string().starts_with("trace can not be created"));
    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::CreateClient("/Sink=Null".to_owned()),
            BackendCall::ReleaseClient
        ]
    );
}

#[test]
fn test_failed_creation_registers_nothing() {
    let backend = RecordingBackend::new().reject_parameters("/Sink=Nowhere");
    let registry = LoggerRegistry::new(Arc::new(backend));
    assert!(registry.get_logger_with("net", "/Sink=Nowhere").is_err());
    assert!(!registry.contains("net"));
    assert!(registry.is_empty());
    assert!(registry.get_logger_with("net", "/Sink=Null").is_ok());
}

#[test]
fn test_lossy_levels() {
    let backend = RecordingBackend::new();
    let logger = Logger::new(&backend, "net", "/Sink=Null").unwrap();
    logger.set_level(LogLevel::Notice);
    assert_eq!(logger.get_level(None), LogLevel::Info);
    logger.set_level(LogLevel::Panic);
    assert_eq!(logger.get_level(None), LogLevel::Critical);
    assert_eq!(
        backend.count(&BackendCall::SetVerbosity {
            module: None,
            severity: Severity::Critical
        }),
        1
    );
}

#[test]
fn test_module_levels() {
    let backend = RecordingBackend::new().with_verbosity(Severity::Warning);
    let logger = Logger::new(&backend, "net", "/Sink=Null").unwrap();
    logger.set_module_level("dns", LogLevel::Notice);
    assert_eq!(logger.get_level(Some("dns")), LogLevel::Info);
    // a module never given a level reports the global scope
    assert_eq!(logger.get_level(Some("tcp")), LogLevel::Warning);
    assert_eq!(logger.get_level(None), LogLevel::Warning);
}

#[test]
fn test_disable_and_enable() {
    let backend = RecordingBackend::new();
    let logger = Logger::new(&backend, "net", "/Sink=Null").unwrap();
    logger.disable();
    assert!(!logger.is_enabled());
    logger.log_message(LogLevel::Error, SITE, format_args!("dropped {}", 1));
    logger.log_module_message(LogLevel::Error, SITE, Some("dns"), format_args!("dropped"));
    logger.log_literal(LogLevel::Error, SITE, "dropped");
    assert!(backend.traces().is_empty());
    // a disabled logger does not even resolve modules
    assert_eq!(
        backend.count(&BackendCall::RegisterModule("dns".to_owned())),
        0
    );

    logger.enable();
    logger.log_literal(LogLevel::Notice, SITE, "back {}");
    let traces = backend.traces();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].message, "back {}");
    assert_eq!(traces[0].severity, Severity::Info);
    assert_eq!(traces[0].file, "src/server.rs");
    assert_eq!(traces[0].line, 12);
    assert_eq!(traces[0].function, "server::run");
}

#[test]
fn test_flush_any_time() {
    let backend = RecordingBackend::new();
    let logger = Logger::new(&backend, "net", "/Sink=Null").unwrap();
    logger.flush();
    logger.disable();
    logger.flush();
    drop(logger);
    assert_eq!(backend.count(&BackendCall::Flush), 2);

    let logger = Logger::with_default_parameters(&TracingBackend::new(), "console").unwrap();
    logger.flush();
}

#[test]
fn test_concurrent_first_creation_has_one_winner() {
    let (backend, registry) = recording_registry();
    let registry = Arc::new(registry);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.get_logger("shared").unwrap())
        })
        .collect();
    let loggers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(loggers.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(
        backend.count(&BackendCall::ShareClient("shared".to_owned())),
        1
    );
}

#[test]
fn test_registry_applies_config() {
    let config = LoggerConfig::from_toml_str(
        r#"
default_parameters = "/Sink=Null /Verb=3"

[loggers.audit]
level = "error"
"#,
    )
    .unwrap();
    let backend = RecordingBackend::new();
    let registry = LoggerRegistry::with_config(Arc::new(backend.clone()), config);
    let audit = registry.get_logger("audit").unwrap();
    assert_eq!(audit.get_level(None), LogLevel::Error);
    assert_eq!(
        backend.count(&BackendCall::CreateClient("/Sink=Null /Verb=3".to_owned())),
        1
    );
    // explicit parameters win over the configuration
    registry.get_logger_with("db", "/Sink=Stderr").unwrap();
    assert_eq!(
        backend.count(&BackendCall::CreateClient("/Sink=Stderr".to_owned())),
        1
    );
}

#[test]
fn test_registry_on_tracing_backend() {
    let backend = Arc::new(TracingBackend::new());
    let registry = LoggerRegistry::new(backend.clone());
    let logger = registry.get_logger_with("net", "/Sink=Null /Verb=4").unwrap();
    assert!(backend.is_shared("net"));
    assert!(backend.is_channel_shared("net"));
    assert_eq!(logger.get_level(None), LogLevel::Error);
    logger.log_message(LogLevel::Critical, SITE, format_args!("nowhere"));

    assert!(matches!(
        registry.get_logger_with("bad", "/Verb=7"),
        Err(LoggerError::ClientCreation(_))
    ));
    drop(logger);
    drop(registry);
    assert!(!backend.is_shared("net"));
}

#[test]
fn test_global_macros() {
    crate::log!(LogLevel::Debug, "global {}", "default logger");
    crate::log_module!(LogLevel::Info, "dns", "module {}", 1);
    crate::log_to!("global_macros", LogLevel::Notice, "named");
    crate::log_module_to!("global_macros", LogLevel::Error, "dns", "named module");
    crate::set_log_level!(LogLevel::Warning);
    let default = crate::registry().get_logger(crate::DEFAULT_LOGGER).unwrap();
    assert_eq!(default.get_level(None), LogLevel::Warning);
    assert!(crate::registry().contains("global_macros"));
}
