use crate::error::RecorderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DOM event types the recorder listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
    #[serde(rename = "dblclick")]
    DblClick,
    Change,
    #[serde(rename = "keydown")]
    KeyDown,
}

impl EventKind {
    /// Every event type subscribed on `start`, in attach order.
    pub const CAPTURED: [EventKind; 4] = [
        EventKind::Click,
        EventKind::DblClick,
        EventKind::Change,
        EventKind::KeyDown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::DblClick => "dblclick",
            EventKind::Change => "change",
            EventKind::KeyDown => "keydown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = RecorderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "click" => Ok(EventKind::Click),
            "dblclick" => Ok(EventKind::DblClick),
            "change" => Ok(EventKind::Change),
            "keydown" => Ok(EventKind::KeyDown),
            other => Err(RecorderError::UnknownEvent(other.to_string())),
        }
    }
}

/// Modifier keys held while an event fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        alt: false,
        ctrl: false,
        meta: false,
        shift: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Alt, ctrl or meta held. Shift alone does not count.
    pub fn has_command_modifier(&self) -> bool {
        self.alt || self.ctrl || self.meta
    }
}

/// A raw interaction event as delivered by the event source.
///
/// `key` is only meaningful for `keydown`; other event types leave it empty.
#[derive(Debug, Clone)]
pub struct RawEvent<E> {
    pub kind: EventKind,
    pub trusted: bool,
    pub target: E,
    pub key: String,
    pub modifiers: Modifiers,
}

impl<E> RawEvent<E> {
    /// A trusted, non-keyboard event.
    pub fn new(kind: EventKind, target: E) -> Self {
        Self {
            kind,
            trusted: true,
            target,
            key: String::new(),
            modifiers: Modifiers::NONE,
        }
    }

    /// A trusted `keydown` event.
    pub fn key_down(target: E, key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            kind: EventKind::KeyDown,
            trusted: true,
            target,
            key: key.into(),
            modifiers,
        }
    }

    /// Mark the event as programmatically generated.
    pub fn untrusted(mut self) -> Self {
        self.trusted = false;
        self
    }
}
