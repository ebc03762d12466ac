pub mod carrier;
pub mod diagnostic;
pub mod doppler;

pub use carrier::CarrierRecord;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use doppler::DopplerRecord;
