use crate::element::Element;
use crate::event::{EventKind, RawEvent};
use crate::keys::encode_key;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a recorded command.
///
/// `Change` is transient: the consolidator removes it before the log is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Click,
    #[serde(rename = "dblclick")]
    DblClick,
    Check,
    Uncheck,
    Type,
    Select,
    Change,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Click => "click",
            CommandKind::DblClick => "dblclick",
            CommandKind::Check => "check",
            CommandKind::Uncheck => "uncheck",
            CommandKind::Type => "type",
            CommandKind::Select => "select",
            CommandKind::Change => "change",
        }
    }

    /// Commands derived from value-bearing events.
    pub fn carries_value(&self) -> bool {
        matches!(
            self,
            CommandKind::Type | CommandKind::Select | CommandKind::Change
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EventKind> for CommandKind {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Click => CommandKind::Click,
            EventKind::DblClick => CommandKind::DblClick,
            EventKind::Change => CommandKind::Change,
            EventKind::KeyDown => CommandKind::Type,
        }
    }
}

/// Keystrokes only count as typing into an `INPUT`.
pub fn should_record<E: Element + ?Sized>(kind: EventKind, target: &E) -> bool {
    !(kind == EventKind::KeyDown && !target.is_tag("INPUT"))
}

/// First matching rule wins.
pub fn classify<E: Element + ?Sized>(kind: EventKind, target: &E) -> CommandKind {
    if kind == EventKind::Change && target.is_tag("SELECT") {
        return CommandKind::Select;
    }

    if kind == EventKind::KeyDown {
        return CommandKind::Type;
    }

    if kind == EventKind::Click && target.is_tag("INPUT") {
        let input_type = target.input_type().unwrap_or_default();
        let is_radio = input_type.eq_ignore_ascii_case("radio");
        let is_checkbox = input_type.eq_ignore_ascii_case("checkbox");

        if is_radio || (is_checkbox && target.checked()) {
            return CommandKind::Check;
        }
        if is_checkbox {
            return CommandKind::Uncheck;
        }
    }

    kind.into()
}

/// Value carried by the entry: the key token for `keydown`, the element value for
/// `change`, nothing otherwise.
pub fn extract_value<E: Element>(event: &RawEvent<E>) -> Option<String> {
    match event.kind {
        EventKind::KeyDown => Some(encode_key(&event.key, event.modifiers)),
        EventKind::Change => Some(event.target.value().unwrap_or_default()),
        EventKind::Click | EventKind::DblClick => None,
    }
}
