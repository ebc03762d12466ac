pub mod driver;
pub mod task;

pub use driver::{
    CarrierWorkload, DopplerWorkload, DriverReport, RealTimeDriver, RecordSource, Workload,
};
pub use task::PeriodicTask;
