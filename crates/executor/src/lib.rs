//! # Hostbridge Executor
//!
//! Command dispatch onto a host application's single privileged thread.
//!
//! This is the crate transports and embedding applications import. It
//! provides:
//! - [`Registry`] / [`Dispatcher`] - name → command lookup, built once at startup
//! - [`CommandRequest`] / [`CommandResponse`] - serde types for the wire
//! - [`BridgeConfig`] - timeouts and host sizing from `hostbridge.toml`
//! - [`Error`] - the structured, serializable error for every failure
//!
//! ## Quick Start
//!
//! ```text
//! use hostbridge_executor::{BridgeConfig, Registry};
//!
//! let (dispatcher, host) = Registry::new()
//!     .register("query_elements", QueryElements)?
//!     .register_with_timeout("export_report", ExportReport, Duration::from_secs(120))?
//!     .build_on_host_thread(Arc::new(NoTransactions), BridgeConfig::default())?;
//!
//! // From any thread:
//! let payload = dispatcher.dispatch("query_elements", params, None)?;
//! ```
//!
//! ## Failure semantics
//!
//! | Error | Host thread ran? |
//! |-------|------------------|
//! | `UnknownCommand`, `Validation`, `Busy`, `Scheduler` | no |
//! | `Timeout` | unknown; a late result is discarded |
//! | `Execution`, `Cancelled` | yes |

#![warn(missing_docs)]

mod command;
mod config;
mod convert;
mod error;
mod registry;
mod typed;

#[cfg(test)]
mod tests;

pub use command::{CommandRequest, CommandResponse};
pub use config::{BridgeConfig, CONFIG_FILE_NAME};
pub use error::Error;
pub use registry::{global, install, Dispatcher, Registry};
pub use typed::RequestValidation;

// Re-export the bridge types operations are written against
pub use hostbridge_concurrency::{
    BridgeStats, CorrelatedResult, CycleState, ExecutionFailure, FailureKind, HostContext,
    HostOperation, HostScheduler, HostThread, ManualHost, NoTransactions, TransactionProvider,
};
pub use hostbridge_core::Payload;

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
