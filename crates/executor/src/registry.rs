//! Command registry and dispatcher.
//!
//! A [`Registry`] collects operations by command name at startup and is
//! consumed by [`Registry::build`], which creates one request bridge per
//! command. The resulting [`Dispatcher`] is immutable: lookups need no
//! locking and it can be shared freely between transport threads.
//!
//! ## Process-global installation
//!
//! Hosts that expose a single entry point (a plugin callback, an FFI shim)
//! can install one dispatcher for the whole process:
//!
//! ```ignore
//! let dispatcher = Registry::new()
//!     .register("query_elements", QueryElements)?
//!     .build(scheduler, transactions, config)?;
//! hostbridge_executor::install(dispatcher)?;
//!
//! // later, from any thread
//! let dispatcher = hostbridge_executor::global().expect("installed at startup");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hostbridge_concurrency::{
    BridgeStats, CorrelatedResult, CycleState, ExecutionFailure, HostContext, HostOperation,
    HostScheduler, HostThread, RequestBridge, TransactionProvider,
};
use hostbridge_core::Payload;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::command::{CommandRequest, CommandResponse};
use crate::config::BridgeConfig;
use crate::typed::{ErasedCommand, RequestValidation, TypedCommand};
use crate::Error;

type CommandFactory =
    Box<dyn FnOnce(Arc<dyn HostScheduler>, Arc<dyn TransactionProvider>) -> Box<dyn ErasedCommand>>;

struct Registration {
    factory: CommandFactory,
}

/// Runs an operation under the name it was registered with.
struct Named<O> {
    name: String,
    inner: O,
}

impl<O: HostOperation> HostOperation for Named<O> {
    type Request = O::Request;

    fn name(&self) -> &str {
        &self.name
    }

    fn transaction_name(&self) -> Option<&str> {
        self.inner.transaction_name()
    }

    fn execute(
        &self,
        request: Self::Request,
        ctx: &mut HostContext,
    ) -> Result<Payload, ExecutionFailure> {
        self.inner.execute(request, ctx)
    }
}

/// Builder collecting operations by command name.
#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<String, Registration>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `operation` under `name` with the configured default timeout.
    pub fn register<O>(self, name: impl Into<String>, operation: O) -> Result<Self, Error>
    where
        O: HostOperation,
        O::Request: DeserializeOwned + RequestValidation,
    {
        self.insert(name.into(), operation, None)
    }

    /// Register `operation` under `name` with its own default timeout.
    ///
    /// A per-command entry in the config file still takes precedence.
    pub fn register_with_timeout<O>(
        self,
        name: impl Into<String>,
        operation: O,
        timeout: Duration,
    ) -> Result<Self, Error>
    where
        O: HostOperation,
        O::Request: DeserializeOwned + RequestValidation,
    {
        let name = name.into();
        if timeout.is_zero() {
            return Err(Error::config(format!(
                "default timeout for '{}' must be greater than zero",
                name
            )));
        }
        self.insert(name, operation, Some(timeout))
    }

    fn insert<O>(mut self, name: String, operation: O, timeout: Option<Duration>) -> Result<Self, Error>
    where
        O: HostOperation,
        O::Request: DeserializeOwned + RequestValidation,
    {
        if name.trim().is_empty() {
            return Err(Error::config("command name must not be empty"));
        }
        if self.entries.contains_key(&name) {
            return Err(Error::DuplicateCommand { command: name });
        }
        let operation = Named {
            name: name.clone(),
            inner: operation,
        };
        let factory: CommandFactory = Box::new(
            move |scheduler: Arc<dyn HostScheduler>, transactions: Arc<dyn TransactionProvider>| {
                Box::new(TypedCommand::new(
                    RequestBridge::new(operation, scheduler, transactions),
                    timeout,
                )) as Box<dyn ErasedCommand>
            },
        );
        self.entries.insert(name, Registration { factory });
        Ok(self)
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Create one bridge per command, all scheduling through `scheduler`.
    pub fn build(
        self,
        scheduler: Arc<dyn HostScheduler>,
        transactions: Arc<dyn TransactionProvider>,
        config: BridgeConfig,
    ) -> Result<Dispatcher, Error> {
        config.validate()?;
        let commands: BTreeMap<String, Box<dyn ErasedCommand>> = self
            .entries
            .into_iter()
            .map(|(name, registration)| {
                let command =
                    (registration.factory)(Arc::clone(&scheduler), Arc::clone(&transactions));
                (name, command)
            })
            .collect();
        info!(
            target: "hostbridge::dispatch",
            commands = commands.len(),
            default_timeout_ms = config.default_timeout_ms,
            "Dispatcher ready"
        );
        Ok(Dispatcher { commands, config })
    }

    /// Like [`build`](Self::build), scheduling onto a freshly started
    /// [`HostThread`] sized by `host_queue_capacity`.
    pub fn build_on_host_thread(
        self,
        transactions: Arc<dyn TransactionProvider>,
        config: BridgeConfig,
    ) -> Result<(Dispatcher, Arc<HostThread>), Error> {
        config.validate()?;
        let host = HostThread::new(config.host_queue_capacity).map_err(|e| Error::Internal {
            reason: format!("failed to start host thread: {}", e),
        })?;
        let host = Arc::new(host);
        let scheduler: Arc<dyn HostScheduler> = host.clone();
        let dispatcher = self.build(scheduler, transactions, config)?;
        Ok((dispatcher, host))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Maps command names to their request bridges.
pub struct Dispatcher {
    commands: BTreeMap<String, Box<dyn ErasedCommand>>,
    config: BridgeConfig,
}

impl Dispatcher {
    /// Run `command` with `params` and wait for its payload.
    ///
    /// `timeout_ms` overrides the command's configured timeout for this call.
    pub fn dispatch(
        &self,
        command: &str,
        params: Payload,
        timeout_ms: Option<u64>,
    ) -> Result<Payload, Error> {
        let result = self.dispatch_correlated(command, params, timeout_ms)?;
        result
            .outcome
            .map_err(|failure| Error::from_failure(command.to_string(), failure))
    }

    /// Transport entry point: never fails, errors are carried in the response.
    pub fn dispatch_request(&self, request: CommandRequest) -> CommandResponse {
        let CommandRequest {
            command,
            params,
            timeout_ms,
        } = request;
        match self.dispatch_correlated(&command, params, timeout_ms) {
            Ok(result) => CommandResponse::from_result(&command, result),
            Err(error) => CommandResponse::rejected(error),
        }
    }

    /// Like [`dispatch`](Self::dispatch), returning the correlated result.
    pub fn dispatch_correlated(
        &self,
        command: &str,
        params: Payload,
        timeout_ms: Option<u64>,
    ) -> Result<CorrelatedResult, Error> {
        let Some(entry) = self.commands.get(command) else {
            debug!(target: "hostbridge::dispatch", command, "Unknown command");
            return Err(Error::UnknownCommand {
                command: command.to_string(),
            });
        };
        let timeout = self
            .config
            .resolve_timeout(command, timeout_ms, entry.default_timeout())?;
        debug!(
            target: "hostbridge::dispatch",
            command,
            timeout_ms = timeout.as_millis() as u64,
            "Dispatching"
        );
        entry.invoke(params, timeout)
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Whether `command` is registered.
    pub fn contains(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }

    /// Counters for one command.
    pub fn stats(&self, command: &str) -> Option<BridgeStats> {
        self.commands.get(command).map(|entry| entry.stats())
    }

    /// Cycle state of one command.
    pub fn state(&self, command: &str) -> Option<CycleState> {
        self.commands.get(command).map(|entry| entry.state())
    }

    /// Configuration the dispatcher was built with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.commands())
            .field("config", &self.config)
            .finish()
    }
}

static GLOBAL: OnceCell<Dispatcher> = OnceCell::new();

/// Install the process-global dispatcher. Fails if one is already installed.
pub fn install(dispatcher: Dispatcher) -> Result<&'static Dispatcher, Error> {
    GLOBAL
        .set(dispatcher)
        .map_err(|_| Error::AlreadyInstalled)?;
    let installed = GLOBAL.get().ok_or_else(|| Error::Internal {
        reason: "global dispatcher missing after install".to_string(),
    })?;
    info!(
        target: "hostbridge::dispatch",
        commands = installed.commands.len(),
        "Installed global dispatcher"
    );
    Ok(installed)
}

/// The process-global dispatcher, if installed.
pub fn global() -> Option<&'static Dispatcher> {
    GLOBAL.get()
}
