use crate::error::RecorderError;
use crate::event::EventKind;
use crate::log::CommandEntry;

/// Listener configuration passed to an [`EventSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
}

impl ListenerOptions {
    /// Capturing, passive listeners. Used for both attach and detach.
    pub const CAPTURE: ListenerOptions = ListenerOptions {
        capture: true,
        passive: true,
    };
}

/// Attaches the recorder's event handler to a document-like node.
///
/// A source is bound to a single handler; `subscribe` and `unsubscribe` name only
/// the node, the event type and the listener options. Detaching must be given the
/// same `capture` flag used to attach or the listener stays in place.
pub trait EventSource {
    type Node;

    fn subscribe(
        &mut self,
        node: &Self::Node,
        kind: EventKind,
        options: &ListenerOptions,
    ) -> Result<(), RecorderError>;

    fn unsubscribe(&mut self, node: &Self::Node, kind: EventKind, options: &ListenerOptions);
}

/// In-memory event source that tracks which listeners are attached.
///
/// Mirrors DOM semantics: attaching the same listener twice is a no-op, and
/// detaching only matches a listener registered with the same capture flag.
#[derive(Debug, Clone)]
pub struct ListenerSet<N> {
    listeners: Vec<(N, EventKind, bool)>,
}

impl<N> Default for ListenerSet<N> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<N: PartialEq> ListenerSet<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a capture-phase listener for `kind` is attached to `node`.
    pub fn is_listening(&self, node: &N, kind: EventKind) -> bool {
        self.listeners
            .iter()
            .any(|(n, k, capture)| n == node && *k == kind && *capture)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<N: PartialEq + Clone> EventSource for ListenerSet<N> {
    type Node = N;

    fn subscribe(
        &mut self,
        node: &N,
        kind: EventKind,
        options: &ListenerOptions,
    ) -> Result<(), RecorderError> {
        let exists = self
            .listeners
            .iter()
            .any(|(n, k, capture)| n == node && *k == kind && *capture == options.capture);
        if !exists {
            self.listeners.push((node.clone(), kind, options.capture));
        }
        Ok(())
    }

    fn unsubscribe(&mut self, node: &N, kind: EventKind, options: &ListenerOptions) {
        self.listeners
            .retain(|(n, k, capture)| !(n == node && *k == kind && *capture == options.capture));
    }
}

/// Receives the full command log after every mutation.
pub trait LogSink {
    fn publish(&mut self, log: &[CommandEntry]);
}

impl<F> LogSink for F
where
    F: FnMut(&[CommandEntry]),
{
    fn publish(&mut self, log: &[CommandEntry]) {
        self(log)
    }
}
