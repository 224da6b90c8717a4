//! Host-thread synchronization for hostbridge
//!
//! This crate moves work from arbitrary caller threads onto a host
//! application's single privileged thread and carries the result back:
//! - [`ResultSlot`]: ticketed single-assignment result handoff
//! - [`CycleCell`]: the per-adapter Idle → Armed → Executing → Completed machine
//! - [`ExecutorAdapter`]: one command kind's reusable host-thread executor
//! - [`RequestBridge`]: the synchronous `invoke` façade with busy/timeout handling
//! - [`HostScheduler`]: the seam to the host's dispatch mechanism
//! - [`TransactionScope`]: scoped host transactions with rollback on every
//!   failing path
//!
//! The crate never starts a host thread on its own. [`HostThread`] and
//! [`ManualHost`] are reference environments for embedders and tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod bridge;
pub mod cancel;
pub mod cycle;
pub mod error;
pub mod host;
pub mod slot;
pub mod transaction;

pub use adapter::{ArmedCycle, BridgeStats, CorrelatedResult, ExecutorAdapter, HostContext, HostOperation};
pub use bridge::RequestBridge;
pub use cancel::CancellationToken;
pub use cycle::{CycleCell, CycleSnapshot, CycleState, Release};
pub use error::{BridgeError, ExecutionFailure, FailureKind, ScheduleError, TransactionError};
pub use host::{HostScheduler, HostTask, HostThread, HostThreadStats, ManualHost, HOST_THREAD_NAME};
pub use slot::{ResultSlot, Ticket};
pub use transaction::{HostTransaction, NoTransactions, TransactionProvider, TransactionScope};
