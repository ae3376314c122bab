/// Helper macro to extract the enclosing function path from the call site
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        let type_name = ::std::any::type_name_of_val(&|| {});
        type_name.trim_end_matches("::{{closure}}")
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __call_site {
    () => {
        $crate::CallSite::new(file!(), line!(), $crate::__function_name!())
    };
}

/// Log a formatted message to the given [`Logger`](crate::Logger).
#[macro_export]
macro_rules! log_to_logger {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_message($level, $crate::__call_site!(), ::core::format_args!($($arg)+))
    };
}

/// Log a formatted message to the registered logger `name`, creating it if
/// needed. The message is dropped if the logger cannot be created.
#[macro_export]
macro_rules! log_to {
    ($name:expr, $level:expr, $($arg:tt)+) => {
        if let ::core::result::Result::Ok(logger) = $crate::registry().get_logger($name) {
            $crate::log_to_logger!(logger, $level, $($arg)+);
        }
    };
}

/// Log a formatted message to the default logger.
#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)+) => {
        $crate::log_to!($crate::DEFAULT_LOGGER, $level, $($arg)+)
    };
}

/// Log a formatted message in the scope of a module.
#[macro_export]
macro_rules! log_module_to_logger {
    ($logger:expr, $level:expr, $module:expr, $($arg:tt)+) => {
        $logger.log_module_message(
            $level,
            $crate::__call_site!(),
            ::core::option::Option::Some($module),
            ::core::format_args!($($arg)+),
        )
    };
}

#[macro_export]
macro_rules! log_module_to {
    ($name:expr, $level:expr, $module:expr, $($arg:tt)+) => {
        if let ::core::result::Result::Ok(logger) = $crate::registry().get_logger($name) {
            $crate::log_module_to_logger!(logger, $level, $module, $($arg)+);
        }
    };
}

#[macro_export]
macro_rules! log_module {
    ($level:expr, $module:expr, $($arg:tt)+) => {
        $crate::log_module_to!($crate::DEFAULT_LOGGER, $level, $module, $($arg)+)
    };
}

/// Set the global level of the default logger.
#[macro_export]
macro_rules! set_log_level {
    ($level:expr) => {
        if let ::core::result::Result::Ok(logger) =
            $crate::registry().get_logger($crate::DEFAULT_LOGGER)
        {
            logger.set_level($level);
        }
    };
}
