//! A backend that records every call made to it, for testing code built on
//! [`crate::Logger`] without producing any output.
//!
//! ```
//! use tsw_logger::{
//!     testing::{BackendCall, RecordingBackend},
//!     Logger,
//! };
//!
//! let backend = RecordingBackend::new();
//! let logger = Logger::with_default_parameters(&backend, "net").unwrap();
//! drop(logger);
//! assert_eq!(
//!     backend.calls().last(),
//!     Some(&BackendCall::ReleaseClient)
//! );
//! ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};

use crate::backend::{
    BackendError, ModuleHandle, Severity, TraceBackend, TraceChannel, TraceClient, TraceRecord,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    CreateClient(String),
    CreateChannel(String),
    ShareClient(String),
    ShareChannel(String),
    RegisterModule(String),
    SetVerbosity {
        module: Option<String>,
        severity: Severity,
    },
    Trace(RecordedTrace),
    Flush,
    ReleaseChannel,
    ReleaseClient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTrace {
    pub severity: Severity,
    pub module: Option<String>,
    pub line: u32,
    pub file: String,
    pub function: String,
    pub message: String,
}

type Journal = Arc<Mutex<Vec<BackendCall>>>;

fn record(journal: &Journal, call: BackendCall) {
    journal
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(call);
}

/// Clones share the same journal.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    journal: Journal,
    rejected: Vec<String>,
    fail_channels: bool,
    verbosity: Severity,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            journal: Arc::default(),
            rejected: Vec::new(),
            fail_channels: false,
            verbosity: Severity::Trace,
        }
    }

    /// Fail client creation for exactly these parameters.
    #[must_use]
    pub fn reject_parameters(mut self, parameters: &str) -> Self {
        self.rejected.push(parameters.to_owned());
        self
    }

    /// Fail every channel creation.
    #[must_use]
    pub fn fail_channels(mut self) -> Self {
        self.fail_channels = true;
        self
    }

    /// Initial global verbosity of new channels.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Severity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn traces(&self) -> Vec<RecordedTrace> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Trace(trace) => Some(trace),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &BackendCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

impl TraceBackend for RecordingBackend {
    fn create_client(&self, parameters: &str) -> Result<Box<dyn TraceClient>, BackendError> {
        if self.rejected.iter().any(|rejected| rejected == parameters) {
            return Err(BackendError::InvalidParameters(parameters.to_owned()));
        }
        record(&self.journal, BackendCall::CreateClient(parameters.to_owned()));
        Ok(Box::new(RecordingClient {
            journal: Arc::clone(&self.journal),
            released: Arc::new(AtomicBool::new(false)),
            fail_channels: self.fail_channels,
            verbosity: self.verbosity,
        }))
    }
}

struct RecordingClient {
    journal: Journal,
    released: Arc<AtomicBool>,
    fail_channels: bool,
    verbosity: Severity,
}

impl TraceClient for RecordingClient {
    fn create_channel(&self, label: &str) -> Result<Box<dyn TraceChannel>, BackendError> {
        if self.fail_channels {
            return Err(BackendError::Sink("simulated channel failure".to_owned()));
        }
        record(&self.journal, BackendCall::CreateChannel(label.to_owned()));
        Ok(Box::new(RecordingChannel {
            journal: Arc::clone(&self.journal),
            client_released: Arc::clone(&self.released),
            released: false,
            state: Mutex::new(ChannelState {
                global: self.verbosity,
                modules: Vec::new(),
            }),
        }))
    }

    fn share(&self, name: &str) -> bool {
        record(&self.journal, BackendCall::ShareClient(name.to_owned()));
        true
    }

    fn flush(&self) {
        record(&self.journal, BackendCall::Flush);
    }

    fn release(&mut self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            record(&self.journal, BackendCall::ReleaseClient);
        }
    }
}

impl Drop for RecordingClient {
    fn drop(&mut self) {
        self.release();
    }
}

struct ChannelState {
    global: Severity,
    modules: Vec<(String, Option<Severity>)>,
}

impl ChannelState {
    fn name(&self, handle: ModuleHandle) -> Option<String> {
        let index = usize::try_from(handle.id()).ok()?;
        self.modules.get(index).map(|(name, _)| name.clone())
    }
}

struct RecordingChannel {
    journal: Journal,
    client_released: Arc<AtomicBool>,
    released: bool,
    state: Mutex<ChannelState>,
}

impl RecordingChannel {
    fn state(&self) -> std::sync::MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TraceChannel for RecordingChannel {
    fn share(&self, name: &str) -> bool {
        record(&self.journal, BackendCall::ShareChannel(name.to_owned()));
        true
    }

    fn register_module(&self, name: &str) -> ModuleHandle {
        record(&self.journal, BackendCall::RegisterModule(name.to_owned()));
        let mut state = self.state();
        let index = state
            .modules
            .iter()
            .position(|(module, _)| module == name)
            .unwrap_or_else(|| {
                state.modules.push((name.to_owned(), None));
                state.modules.len() - 1
            });
        ModuleHandle::new(u32::try_from(index).unwrap_or(u32::MAX))
    }

    fn set_verbosity(&self, module: Option<ModuleHandle>, severity: Severity) {
        let mut state = self.state();
        let name = match module {
            None => {
                state.global = severity;
                None
            }
            Some(handle) => {
                let index = usize::try_from(handle.id()).unwrap_or(usize::MAX);
                state.modules.get_mut(index).map(|(name, verbosity)| {
                    *verbosity = Some(severity);
                    name.clone()
                })
            }
        };
        drop(state);
        record(
            &self.journal,
            BackendCall::SetVerbosity {
                module: name,
                severity,
            },
        );
    }

    fn verbosity(&self, module: Option<ModuleHandle>) -> Severity {
        let state = self.state();
        module
            .and_then(|handle| usize::try_from(handle.id()).ok())
            .and_then(|index| state.modules.get(index))
            .and_then(|(_, verbosity)| *verbosity)
            .unwrap_or(state.global)
    }

    fn trace(&self, trace_record: &TraceRecord<'_>) {
        let module = trace_record.module.and_then(|handle| self.state().name(handle));
        record(
            &self.journal,
            BackendCall::Trace(RecordedTrace {
                severity: trace_record.severity,
                module,
                line: trace_record.line,
                file: trace_record.file.to_owned(),
                function: trace_record.function.to_owned(),
                message: trace_record.message.to_string(),
            }),
        );
    }

    fn release(&mut self) {
        if self.released || self.client_released.load(Ordering::Acquire) {
            self.released = true;
            return;
        }
        self.released = true;
        record(&self.journal, BackendCall::ReleaseChannel);
    }
}

impl Drop for RecordingChannel {
    fn drop(&mut self) {
        self.release();
    }
}
