//! Turns a stream of trusted UI interaction events into a compact, deduplicated
//! log of test commands.
//!
//! The pipeline is: [`Recorder`] receives a [`RawEvent`] from an [`EventSource`],
//! the classifier maps it to a [`CommandKind`] (keystrokes go through
//! [`encode_key`]), and [`CommandLog`] appends and consolidates the entry before the
//! full log is handed to a [`LogSink`].

pub mod classifier;
pub mod element;
pub mod error;
pub mod event;
pub mod keys;
pub mod log;
pub mod recorder;
pub mod source;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use classifier::{classify, extract_value, should_record, CommandKind};
pub use element::{Element, SelectorService};
pub use error::RecorderError;
pub use event::{EventKind, Modifiers, RawEvent};
pub use keys::encode_key;
pub use log::{CommandEntry, CommandLog, Consolidation};
pub use recorder::{Recorder, RecorderConfig, RecorderState};
pub use source::{EventSource, ListenerOptions, ListenerSet, LogSink};

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
