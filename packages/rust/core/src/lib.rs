//! Pipeline orchestration for the prospect brief generator.
//!
//! The three generation stages live in [`stages`], the single-company
//! orchestrator in [`pipeline`], and the failure-isolating roster loop in
//! [`batch`]. Pacing between stages is an injected [`rate_limit::RateLimiter`].

pub mod batch;
pub mod pipeline;
pub mod rate_limit;
pub mod stages;

#[cfg(test)]
mod testing;

pub use batch::BatchSummary;
pub use pipeline::{BriefPipeline, PipelineContext, PipelineState, ProgressReporter, SilentProgress};
pub use rate_limit::{FixedDelay, NoDelay, RateLimiter};
