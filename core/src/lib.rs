//! Synchronization and fault-tolerant delivery core for measurement records
//! travelling over a degraded RF link.
//!
//! Records land in lock-guarded ledgers, carrier and Doppler passes run over
//! them, and delivery goes through a staged retry pipeline and a reconnecting
//! link monitor. Background loops share one cancellable periodic task type.

pub mod ledger;
pub mod link;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod records;
pub mod retry;
pub mod runtime;
pub mod telemetry;

pub use ledger::Ledger;
pub use prelude::{CarrierConfig, LedgerError, LinkError, RetryPolicy, TriageConfig};
