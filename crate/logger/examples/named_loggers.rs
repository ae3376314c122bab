//! Example of named loggers and per-module verbosity
//! cargo run --example named_loggers -p tsw_logger

use tsw_logger::{log, log_module, log_module_to, log_to, registry, set_log_level, LogLevel};

fn main() {
    tsw_logger::log_init(Some("tsw_logger=debug"));

    set_log_level!(LogLevel::Debug);
    log!(LogLevel::Info, "starting {}", env!("CARGO_PKG_NAME"));

    let Ok(net) = registry().get_logger_with("net", "/Sink=Stderr /Verb=2") else {
        eprintln!("unable to create the net logger");
        return;
    };
    net.set_module_level("dns", LogLevel::Error);

    log_module_to!("net", LogLevel::Warning, "dns", "this one is filtered out");
    log_module_to!("net", LogLevel::Panic, "dns", "no resolver left");
    log_to!("net", LogLevel::Notice, "listening on {}:{}", "0.0.0.0", 8080);

    net.disable();
    log_to!("net", LogLevel::Error, "dropped while disabled");
    net.enable();

    log_module!(LogLevel::Debug, "main", "net level is now {}", net.get_level(None));
    net.flush();
}
