pub mod config;
pub mod replay;
pub mod trace;

pub use replay::{ReplayError, ReplayOutcome, replay};
pub use trace::{Trace, TraceElement, TraceEvent, TraceStep};
