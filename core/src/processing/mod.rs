pub mod carrier;
pub mod triage;

pub use carrier::{CarrierSynchronizer, SnrReading, SyncSummary};
pub use triage::{DopplerTriage, SortMode, TrendReport, TrendSummary};
