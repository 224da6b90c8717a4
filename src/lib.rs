//! Hostbridge - synchronous command bridge onto a host application's thread
//!
//! Many host applications allow mutating calls only from their own
//! privileged thread, inside a callback the host itself dispatches.
//! Hostbridge lets any other thread (an automation agent, a socket server)
//! run registered commands there and get a correlated result back within a
//! bounded time, as if it were an ordinary function call.
//!
//! # Quick Start
//!
//! ```ignore
//! use hostbridge::{BridgeConfig, NoTransactions, Registry};
//!
//! let (dispatcher, _host) = Registry::new()
//!     .register("query_elements", QueryElements)?
//!     .build_on_host_thread(Arc::new(NoTransactions), BridgeConfig::default())?;
//!
//! let payload = dispatcher.dispatch("query_elements", params, Some(5_000))?;
//! ```
//!
//! # Architecture
//!
//! All commands go through the [`Dispatcher`], which owns one request bridge
//! per command. Lower layers are re-exported under their own modules for
//! hosts that write operations against them directly.

// Re-export the public API from hostbridge-executor
pub use hostbridge_executor::*;

/// Geometry value types and units.
pub mod geometry {
    pub use hostbridge_core::*;
}

/// Filter specifications and their validator.
pub mod filter {
    pub use hostbridge_filter::*;
}

/// Host-thread bridge primitives.
pub mod bridge {
    pub use hostbridge_concurrency::*;
}
