//! Trace backend on top of `tracing`: every client owns its own
//! [`Dispatch`] writing to the client's sink, and channels emit their records
//! through that dispatcher.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, OnceLock, PoisonError, RwLock, Weak,
    },
};

use tracing::{debug, dispatcher, trace, Dispatch, Level};
use tracing_subscriber::layer::SubscriberExt;

use super::{
    sink::Sink, BackendError, ClientParameters, ModuleHandle, Severity, TraceBackend,
    TraceChannel, TraceClient, TraceRecord,
};

/// Target of every event emitted for a trace record.
pub const RECORD_TARGET: &str = "tsw_logger::record";

#[derive(Default)]
struct SharedNames {
    clients: HashMap<String, Weak<ClientState>>,
    channels: HashMap<String, Weak<ChannelState>>,
}

/// The production backend.
#[derive(Clone, Default)]
pub struct TracingBackend {
    shared: Arc<Mutex<SharedNames>>,
}

impl TracingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a live client is published under `name`.
    pub fn is_shared(&self, name: &str) -> bool {
        lock(&self.shared)
            .clients
            .get(name)
            .and_then(Weak::upgrade)
            .is_some_and(|client| !client.is_released())
    }

    /// Whether a live channel is published under `name`.
    pub fn is_channel_shared(&self, name: &str) -> bool {
        lock(&self.shared)
            .channels
            .get(name)
            .and_then(Weak::upgrade)
            .is_some_and(|channel| channel.is_live())
    }
}

impl TraceBackend for TracingBackend {
    fn create_client(&self, parameters: &str) -> Result<Box<dyn TraceClient>, BackendError> {
        let parameters: ClientParameters = parameters.parse()?;
        let sink = Sink::open(&parameters)?;
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(sink.clone())
            .with_ansi(parameters.ansi)
            .with_level(true)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .compact();
        let dispatch = Dispatch::new(tracing_subscriber::registry().with(layer));
        trace!("created trace client with {parameters:?}");
        Ok(Box::new(TracingClient {
            state: Arc::new(ClientState {
                dispatch,
                sink,
                verbosity: parameters.verbosity,
                released: AtomicBool::new(false),
                shared: Arc::clone(&self.shared),
            }),
        }))
    }
}

struct ClientState {
    dispatch: Dispatch,
    sink: Sink,
    verbosity: Severity,
    released: AtomicBool,
    shared: Arc<Mutex<SharedNames>>,
}

impl ClientState {
    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    fn flush(&self) {
        if let Err(_err) = self.sink.flush() {
            // ignore the error
        }
    }
}

struct TracingClient {
    state: Arc<ClientState>,
}

impl TraceClient for TracingClient {
    fn create_channel(&self, label: &str) -> Result<Box<dyn TraceChannel>, BackendError> {
        if self.state.is_released() {
            return Err(BackendError::Released);
        }
        Ok(Box::new(TracingChannel {
            state: Arc::new(ChannelState {
                client: Arc::clone(&self.state),
                label: label.to_owned(),
                name: OnceLock::new(),
                verbosity: RwLock::new(Verbosity {
                    global: self.state.verbosity,
                    modules: Vec::new(),
                }),
                released: AtomicBool::new(false),
            }),
        }))
    }

    fn share(&self, name: &str) -> bool {
        let mut shared = lock(&self.state.shared);
        let taken = shared
            .clients
            .get(name)
            .and_then(Weak::upgrade)
            .is_some_and(|client| !client.is_released());
        if taken {
            return false;
        }
        shared
            .clients
            .insert(name.to_owned(), Arc::downgrade(&self.state));
        true
    }

    fn flush(&self) {
        if !self.state.is_released() {
            self.state.flush();
        }
    }

    fn release(&mut self) {
        if self.state.released.swap(true, Ordering::AcqRel) {
            return;
        }
        self.state.flush();
        let mut shared = lock(&self.state.shared);
        shared
            .clients
            .retain(|_, client| !ptr_eq(client, &self.state));
        // the channels of this client are invalidated with it
        shared.channels.retain(|_, channel| {
            channel
                .upgrade()
                .is_some_and(|channel| !Arc::ptr_eq(&channel.client, &self.state))
        });
        drop(shared);
        debug!("trace client released");
    }
}

impl Drop for TracingClient {
    fn drop(&mut self) {
        self.release();
    }
}

struct Module {
    name: String,
    verbosity: Option<Severity>,
}

struct Verbosity {
    global: Severity,
    modules: Vec<Module>,
}

impl Verbosity {
    fn module(&self, handle: ModuleHandle) -> Option<&Module> {
        usize::try_from(handle.id())
            .ok()
            .and_then(|index| self.modules.get(index))
    }

    fn effective(&self, handle: Option<ModuleHandle>) -> Severity {
        handle
            .and_then(|handle| self.module(handle))
            .and_then(|module| module.verbosity)
            .unwrap_or(self.global)
    }
}

struct ChannelState {
    client: Arc<ClientState>,
    label: String,
    name: OnceLock<String>,
    verbosity: RwLock<Verbosity>,
    released: AtomicBool,
}

impl ChannelState {
    fn is_live(&self) -> bool {
        !self.released.load(Ordering::Acquire) && !self.client.is_released()
    }
}

struct TracingChannel {
    state: Arc<ChannelState>,
}

impl TraceChannel for TracingChannel {
    fn share(&self, name: &str) -> bool {
        let mut shared = lock(&self.state.client.shared);
        let taken = shared
            .channels
            .get(name)
            .and_then(Weak::upgrade)
            .is_some_and(|channel| channel.is_live());
        if taken {
            return false;
        }
        shared
            .channels
            .insert(name.to_owned(), Arc::downgrade(&self.state));
        // the first published name labels the records
        let _ = self.state.name.set(name.to_owned());
        true
    }

    fn register_module(&self, name: &str) -> ModuleHandle {
        let mut verbosity = self
            .state
            .verbosity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let index = verbosity
            .modules
            .iter()
            .position(|module| module.name == name)
            .unwrap_or_else(|| {
                verbosity.modules.push(Module {
                    name: name.to_owned(),
                    verbosity: None,
                });
                verbosity.modules.len() - 1
            });
        ModuleHandle::new(u32::try_from(index).unwrap_or(u32::MAX))
    }

    fn set_verbosity(&self, module: Option<ModuleHandle>, severity: Severity) {
        let mut verbosity = self
            .state
            .verbosity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match module {
            None => verbosity.global = severity,
            Some(handle) => {
                let slot = usize::try_from(handle.id())
                    .ok()
                    .and_then(|index| verbosity.modules.get_mut(index));
                if let Some(module) = slot {
                    module.verbosity = Some(severity);
                }
            }
        }
    }

    fn verbosity(&self, module: Option<ModuleHandle>) -> Severity {
        self.state
            .verbosity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .effective(module)
    }

    fn trace(&self, record: &TraceRecord<'_>) {
        if !self.state.is_live() {
            return;
        }
        let module = {
            let verbosity = self
                .state
                .verbosity
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if record.severity < verbosity.effective(record.module) {
                return;
            }
            record
                .module
                .and_then(|handle| verbosity.module(handle))
                .map(|module| module.name.clone())
        };
        let channel = self
            .state
            .name
            .get()
            .map_or(self.state.label.as_str(), String::as_str);
        dispatcher::with_default(&self.state.client.dispatch, || {
            emit(record, channel, module.as_deref());
        });
    }

    fn release(&mut self) {
        if self.state.released.swap(true, Ordering::AcqRel) {
            return;
        }
        lock(&self.state.client.shared)
            .channels
            .retain(|_, channel| !ptr_eq(channel, &self.state));
        if !self.state.client.is_released() {
            debug!("trace channel {:?} released", self.state.label);
        }
    }
}

impl Drop for TracingChannel {
    fn drop(&mut self) {
        self.release();
    }
}

fn emit(record: &TraceRecord<'_>, channel: &str, module: Option<&str>) {
    macro_rules! emit_at {
        ($level:expr $(, $marker:ident = $value:expr)?) => {
            tracing::event!(
                target: RECORD_TARGET,
                $level,
                channel,
                module,
                file = record.file,
                line = record.line,
                function = record.function,
                $($marker = $value,)?
                "{}",
                record.message
            )
        };
    }

    match record.severity {
        Severity::Trace => emit_at!(Level::TRACE),
        Severity::Debug => emit_at!(Level::DEBUG),
        Severity::Info => emit_at!(Level::INFO),
        Severity::Warning => emit_at!(Level::WARN),
        Severity::Error => emit_at!(Level::ERROR),
        Severity::Critical => emit_at!(Level::ERROR, critical = true),
    }
}

fn lock(shared: &Mutex<SharedNames>) -> std::sync::MutexGuard<'_, SharedNames> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn ptr_eq<T>(weak: &Weak<T>, strong: &Arc<T>) -> bool {
    std::ptr::eq(weak.as_ptr(), Arc::as_ptr(strong))
}
