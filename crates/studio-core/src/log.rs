use crate::classifier::CommandKind;
use crate::error::RecorderError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One consolidated action in the recording log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    pub id: String,
    pub selector: String,
    pub command: CommandKind,
    pub value: Option<String>,
}

/// What a consolidation pass did with the newest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consolidation {
    /// Kept as a new tail entry.
    Appended,
    /// A bare `change` entry was discarded.
    DroppedChange,
    /// Keystrokes merged into the preceding `type` entry.
    CoalescedKeystrokes,
    /// The `click` that opened a `select` was removed.
    CollapsedSelectClick,
    /// `click, click, dblclick` collapsed to the `dblclick`.
    SynthesizedDblClick,
}

/// Ordered command log with tail consolidation.
#[derive(Debug, Clone)]
pub struct CommandLog {
    entries: Vec<CommandEntry>,
    id_prefix: String,
    next_id: u64,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new("s")
    }
}

impl CommandLog {
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            id_prefix: id_prefix.into(),
            next_id: 1,
        }
    }

    /// Drop every entry and restart ids at 1.
    pub fn restart(&mut self) {
        self.entries.clear();
        self.next_id = 1;
    }

    /// Drop every entry. Ids keep counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allocate the next session-unique id (`s1`, `s2`, ...).
    pub fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.id_prefix, self.next_id);
        self.next_id += 1;
        id
    }

    /// Build an entry with a fresh id and append it.
    pub fn record(
        &mut self,
        selector: String,
        command: CommandKind,
        value: Option<String>,
    ) -> Consolidation {
        debug_assert_eq!(
            value.is_some(),
            command.carries_value(),
            "'{command}' entries {} a value",
            if command.carries_value() { "require" } else { "never carry" }
        );
        let id = self.next_id();
        self.push(CommandEntry {
            id,
            selector,
            command,
            value,
        })
    }

    /// Append `entry` and consolidate the tail.
    pub fn push(&mut self, entry: CommandEntry) -> Consolidation {
        self.entries.push(entry);
        let outcome = self.consolidate();
        debug!(?outcome, len = self.entries.len(), "Consolidated command log");
        outcome
    }

    /// Remove the entry at `index`, bypassing consolidation.
    pub fn remove(&mut self, index: usize) -> Result<CommandEntry, RecorderError> {
        let len = self.entries.len();
        if index >= len {
            return Err(RecorderError::OutOfRange { index, len });
        }
        Ok(self.entries.remove(index))
    }

    /// Applies at most one rule to the trailing window. Never recurses.
    fn consolidate(&mut self) -> Consolidation {
        let len = self.entries.len();
        let Some(last) = self.entries.last() else {
            return Consolidation::Appended;
        };

        if last.command == CommandKind::Change {
            self.entries.pop();
            return Consolidation::DroppedChange;
        }

        if len < 2 {
            return Consolidation::Appended;
        }

        let second_last = &self.entries[len - 2];
        if last.selector != second_last.selector {
            return Consolidation::Appended;
        }

        match (second_last.command, last.command) {
            (CommandKind::Type, CommandKind::Type) => {
                if let Some(last) = self.entries.pop() {
                    let merged = &mut self.entries[len - 2];
                    merged
                        .value
                        .get_or_insert_with(String::new)
                        .push_str(last.value.as_deref().unwrap_or_default());
                }
                Consolidation::CoalescedKeystrokes
            }
            (CommandKind::Click, CommandKind::Select) => {
                self.entries.remove(len - 2);
                Consolidation::CollapsedSelectClick
            }
            (CommandKind::Click, CommandKind::DblClick) if len > 2 => {
                let third_last = &self.entries[len - 3];
                if third_last.command == CommandKind::Click && third_last.selector == last.selector
                {
                    self.entries.drain(len - 3..len - 1);
                    Consolidation::SynthesizedDblClick
                } else {
                    Consolidation::Appended
                }
            }
            _ => Consolidation::Appended,
        }
    }
}
