//! Kernel-side tickless modules
//!
//! Contains configuration, the tick source, the low-power timer abstraction,
//! and the sleep controller with its classifier and reconciliation.

pub mod config;
pub mod critical;
pub mod error;
pub mod types;
pub mod sched;
pub mod time;
pub mod lptim;
pub mod classify;
pub mod reconcile;
pub mod idle;
