use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::LoggerError;

/// Initialize a stdout subscriber for the diagnostics of this crate itself
/// (logger creation, release, configuration loading).
///
/// # Arguments
/// * `rust_log` - The filter directives, such as `tsw_logger=debug`
///
/// # Notes
/// - calling `log_init(None)` uses the `RUST_LOG` environment variable
/// - calling it again once a global subscriber is set has no effect
pub fn log_init(rust_log: Option<&str>) {
    if let Err(err) = log_init_(rust_log) {
        // the global subscriber is already set, most likely by a previous call
        tracing::trace!("log_init: {err}");
    }
}

fn log_init_(rust_log: Option<&str>) -> Result<(), LoggerError> {
    let filter = match rust_log {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::from_default_env(),
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_level(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .compact();
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}
