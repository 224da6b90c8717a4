//! Bridge Integration Tests
//!
//! End-to-end behaviour of the request bridge through the dispatcher:
//! result correlation, transactions, and timeout/cancellation handling.

#[path = "../common/mod.rs"]
mod common;

mod cancellation;
mod correlation;
mod transactions;
