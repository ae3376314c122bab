use std::{
    fs,
    io::{self, Write},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;

use super::{BackendError, ClientParameters, SinkKind};

/// Output of one client. Cloned into the client's fmt layer.
#[derive(Clone)]
pub(crate) enum Sink {
    Stdout,
    Stderr,
    File(Arc<Mutex<RollingFileAppender>>),
    Null,
    #[cfg(all(feature = "syslog", not(target_os = "windows")))]
    Syslog(Arc<syslog_tracing::Syslog>),
}

impl Sink {
    pub(crate) fn open(parameters: &ClientParameters) -> Result<Self, BackendError> {
        Ok(match parameters.sink {
            SinkKind::Console => Self::Stdout,
            SinkKind::Stderr => Self::Stderr,
            SinkKind::Null => Self::Null,
            SinkKind::File => {
                let dir = &parameters.dir;
                if !dir.exists() {
                    fs::create_dir_all(dir).map_err(|err| {
                        BackendError::Sink(format!(
                            "Failed to create logs directory: {dir:?}: {err}"
                        ))
                    })?;
                }
                // single file, never rotated
                let appender = RollingFileAppender::builder()
                    .rotation(Rotation::NEVER)
                    .filename_prefix(&parameters.file_name)
                    .build(dir)
                    .map_err(|err| BackendError::Sink(err.to_string()))?;
                Self::File(Arc::new(Mutex::new(appender)))
            }
            SinkKind::Syslog => Self::open_syslog()?,
        })
    }

    #[cfg(all(feature = "syslog", not(target_os = "windows")))]
    fn open_syslog() -> Result<Self, BackendError> {
        let identity = std::borrow::Cow::Owned(
            std::ffi::CString::new("tsw_logger").map_err(|e| BackendError::Sink(e.to_string()))?,
        );
        let (options, facility) = Default::default();
        syslog_tracing::Syslog::new(identity, options, facility)
            .map(|syslog| Self::Syslog(Arc::new(syslog)))
            .ok_or_else(|| BackendError::Sink("syslog is already in use".to_owned()))
    }

    #[cfg(not(all(feature = "syslog", not(target_os = "windows"))))]
    fn open_syslog() -> Result<Self, BackendError> {
        Err(BackendError::Sink(
            "syslog sink requires the `syslog` feature".to_owned(),
        ))
    }

    pub(crate) fn flush(&self) -> io::Result<()> {
        match self {
            Self::Stdout => io::stdout().flush(),
            Self::Stderr => io::stderr().flush(),
            Self::File(file) => lock_file(file).flush(),
            Self::Null => Ok(()),
            #[cfg(all(feature = "syslog", not(target_os = "windows")))]
            Self::Syslog(_) => Ok(()),
        }
    }
}

fn lock_file(file: &Mutex<RollingFileAppender>) -> MutexGuard<'_, RollingFileAppender> {
    file.lock().unwrap_or_else(PoisonError::into_inner)
}

struct LockedFile<'a>(MutexGuard<'a, RollingFileAppender>);

impl Write for LockedFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> MakeWriter<'a> for Sink {
    type Writer = Box<dyn Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        match self {
            Self::Stdout => Box::new(io::stdout()),
            Self::Stderr => Box::new(io::stderr()),
            Self::File(file) => Box::new(LockedFile(lock_file(file))),
            Self::Null => Box::new(io::sink()),
            #[cfg(all(feature = "syslog", not(target_os = "windows")))]
            Self::Syslog(syslog) => Box::new(syslog.as_ref().make_writer()),
        }
    }
}
