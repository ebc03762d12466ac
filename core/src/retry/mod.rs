pub mod backoff;
pub mod pipeline;

pub use backoff::{retry_with_backoff, RetryObserver, SilentObserver};
pub use pipeline::{check_fn, FnCheck, IntegrityCheck, PipelineOutcome, StageKind, StagePipeline};
