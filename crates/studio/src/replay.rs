use crate::trace::{Trace, TraceElement, TraceStep};
use studio_core::{
    CommandEntry, ListenerSet, LogSink, Recorder, RecorderConfig, RecorderError, RecorderState,
};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Failed to read trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse trace: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Step {step} failed: {source}")]
    Step {
        step: usize,
        #[source]
        source: RecorderError,
    },
}

/// Final state of a replayed session.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReplayOutcome {
    pub state: RecorderState,
    pub test_id: Option<String>,
    pub log: Vec<CommandEntry>,
    /// Events the listeners never saw because nothing was attached.
    pub undelivered: usize,
}

fn selector_of(element: &TraceElement) -> String {
    element.selector.clone()
}

/// Drive a recorder through `trace`, forwarding every published snapshot.
///
/// Events reach the recorder only while a capture listener for their type is
/// attached to the trace root.
pub fn replay<P: LogSink>(
    trace: &Trace,
    config: &RecorderConfig,
    sink: P,
) -> Result<ReplayOutcome, ReplayError> {
    let mut recorder = Recorder::new(
        ListenerSet::<String>::new(),
        selector_of as fn(&TraceElement) -> String,
        sink,
        config.clone(),
    );
    let mut undelivered = 0;

    for (step, op) in trace.steps.iter().enumerate() {
        match op {
            TraceStep::SetTestId { id } => recorder.set_test_id(id.clone()),
            TraceStep::StartLoading => recorder.start_loading(),
            TraceStep::Start => recorder
                .start(trace.root.clone())
                .map_err(|source| ReplayError::Step { step, source })?,
            TraceStep::Stop => recorder.stop(),
            TraceStep::Cancel => recorder.cancel(),
            TraceStep::Reset => recorder.reset(),
            TraceStep::Save => recorder.save(),
            TraceStep::Remove { index } => {
                recorder
                    .remove_command(*index)
                    .map_err(|source| ReplayError::Step { step, source })?;
            }
            TraceStep::Event(event) => {
                if !recorder.source().is_listening(&trace.root, event.kind) {
                    debug!(step, kind = %event.kind, "No listener attached, event not delivered");
                    undelivered += 1;
                    continue;
                }
                recorder.record_event(&event.to_raw());
            }
        }
    }

    info!(
        steps = trace.steps.len(),
        entries = recorder.log().len(),
        undelivered,
        "Replay finished"
    );

    Ok(ReplayOutcome {
        state: recorder.state(),
        test_id: recorder.test_id().map(str::to_string),
        log: recorder.log().to_vec(),
        undelivered,
    })
}
