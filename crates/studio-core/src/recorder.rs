use crate::classifier::{classify, extract_value, should_record};
use crate::element::{Element, SelectorService};
use crate::error::RecorderError;
use crate::event::{EventKind, RawEvent};
use crate::log::{CommandEntry, CommandLog, Consolidation};
use crate::source::{EventSource, ListenerOptions, LogSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Prefix of generated entry ids.
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    /// Hide typed and selected values in log output.
    #[serde(default = "default_redact_values_in_logs")]
    pub redact_values_in_logs: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
            redact_values_in_logs: default_redact_values_in_logs(),
        }
    }
}

fn default_id_prefix() -> String {
    "s".to_string()
}

fn default_redact_values_in_logs() -> bool {
    true
}

/// Lifecycle state derived from the recorder flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderState {
    Idle,
    Loading,
    Recording,
    Finished,
    Saving,
}

/// A recording session: owns the listener subscriptions and the command log.
///
/// Events are handled synchronously in [`Recorder::record_event`]; every change to
/// the log is followed by a full snapshot sent to the sink.
pub struct Recorder<S: EventSource, Sel, P> {
    source: S,
    selectors: Sel,
    sink: P,
    config: RecorderConfig,
    log: CommandLog,
    root: Option<S::Node>,
    test_id: Option<String>,
    is_loading: bool,
    is_active: bool,
    is_saving: bool,
    has_started: bool,
}

impl<S, Sel, P> Recorder<S, Sel, P>
where
    S: EventSource,
    P: LogSink,
{
    pub fn new(source: S, selectors: Sel, sink: P, config: RecorderConfig) -> Self {
        let log = CommandLog::new(config.id_prefix.clone());
        Self {
            source,
            selectors,
            sink,
            config,
            log,
            root: None,
            test_id: None,
            is_loading: false,
            is_active: false,
            is_saving: false,
            has_started: false,
        }
    }

    pub fn set_test_id(&mut self, test_id: Option<String>) {
        self.test_id = test_id;
    }

    pub fn start_loading(&mut self) {
        self.is_loading = true;
    }

    /// Begin a fresh session on `root`.
    ///
    /// Any previous subscription is detached first. If the source rejects a
    /// subscription, the ones already made are rolled back and the recorder is left
    /// idle with an empty log.
    pub fn start(&mut self, root: S::Node) -> Result<(), RecorderError> {
        self.detach();

        self.is_active = true;
        self.is_loading = false;
        self.is_saving = false;
        self.log.restart();
        self.has_started = true;

        for (attached, kind) in EventKind::CAPTURED.into_iter().enumerate() {
            if let Err(e) = self.source.subscribe(&root, kind, &ListenerOptions::CAPTURE) {
                warn!("Failed to attach '{}' listener: {}", kind, e);
                for kind in &EventKind::CAPTURED[..attached] {
                    self.source.unsubscribe(&root, *kind, &ListenerOptions::CAPTURE);
                }
                self.is_active = false;
                self.has_started = false;
                return Err(e);
            }
        }
        self.root = Some(root);

        debug!(test_id = ?self.test_id, "Recording started");
        Ok(())
    }

    /// Detach all listeners. The log and `has_started` are kept.
    pub fn stop(&mut self) {
        self.detach();
        if self.is_active {
            debug!(entries = self.log.len(), "Recording stopped");
        }
        self.is_active = false;
    }

    pub fn cancel(&mut self) {
        self.stop();
        self.test_id = None;
        self.has_started = false;
        self.is_saving = false;
    }

    pub fn reset(&mut self) {
        self.stop();
        self.log.clear();
        self.has_started = false;
        self.is_saving = false;
    }

    pub fn save(&mut self) {
        self.stop();
        self.is_saving = true;
    }

    /// Delete one entry by position and republish. Out-of-range indexes fail
    /// without touching the log.
    pub fn remove_command(&mut self, index: usize) -> Result<CommandEntry, RecorderError> {
        let removed = self.log.remove(index)?;
        debug!(id = %removed.id, "Removed command");
        self.publish();
        Ok(removed)
    }

    /// Handle one raw event delivered by the event source.
    ///
    /// Returns `None` when the event is dropped before reaching the log.
    pub fn record_event<E>(&mut self, event: &RawEvent<E>) -> Option<Consolidation>
    where
        E: Element,
        Sel: SelectorService<E>,
    {
        if !event.trusted {
            trace!(kind = %event.kind, "Ignoring untrusted event");
            return None;
        }
        if !self.is_active {
            trace!(kind = %event.kind, "Ignoring event while not recording");
            return None;
        }
        if !should_record(event.kind, &event.target) {
            trace!(kind = %event.kind, "Ignoring keystroke outside an input");
            return None;
        }

        let selector = self.selectors.selector_for(&event.target);
        let command = classify(event.kind, &event.target);
        let value = extract_value(event);

        debug!(
            %selector,
            %command,
            value = %self.display_value(value.as_deref()),
            "Recording command"
        );

        let outcome = self.log.record(selector, command, value);
        self.publish();
        Some(outcome)
    }

    pub fn log(&self) -> &[CommandEntry] {
        self.log.entries()
    }

    pub fn test_id(&self) -> Option<&str> {
        self.test_id.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    pub fn is_finished(&self) -> bool {
        self.has_started && !self.is_active
    }

    pub fn is_open(&self) -> bool {
        self.is_active || self.is_loading || self.is_finished()
    }

    pub fn state(&self) -> RecorderState {
        if self.is_active {
            RecorderState::Recording
        } else if self.is_loading {
            RecorderState::Loading
        } else if self.is_saving {
            RecorderState::Saving
        } else if self.has_started {
            RecorderState::Finished
        } else {
            RecorderState::Idle
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn root(&self) -> Option<&S::Node> {
        self.root.as_ref()
    }

    fn detach(&mut self) {
        if let Some(root) = self.root.take() {
            for kind in EventKind::CAPTURED {
                self.source.unsubscribe(&root, kind, &ListenerOptions::CAPTURE);
            }
        }
    }

    fn publish(&mut self) {
        self.sink.publish(self.log.entries());
    }

    fn display_value<'a>(&self, value: Option<&'a str>) -> &'a str {
        match value {
            Some(_) if self.config.redact_values_in_logs => "<redacted>",
            Some(v) => v,
            None => "",
        }
    }
}
