//! Recorded interaction traces used to drive a session without a browser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use studio_core::{Element, EventKind, Modifiers, RawEvent};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Node the listeners are attached to.
    #[serde(default = "default_root")]
    pub root: String,
    pub steps: Vec<TraceStep>,
}

fn default_root() -> String {
    "body".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TraceStep {
    SetTestId {
        #[serde(default)]
        id: Option<String>,
    },
    StartLoading,
    Start,
    Stop,
    Cancel,
    Reset,
    Save,
    Remove {
        index: usize,
    },
    Event(TraceEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default = "default_trusted")]
    pub trusted: bool,
    pub target: TraceElement,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
}

fn default_trusted() -> bool {
    true
}

impl TraceEvent {
    pub fn to_raw(&self) -> RawEvent<TraceElement> {
        RawEvent {
            kind: self.kind,
            trusted: self.trusted,
            target: self.target.clone(),
            key: self.key.clone(),
            modifiers: self.modifiers,
        }
    }
}

/// Snapshot of an event target, including the selector the page would generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceElement {
    pub selector: String,
    pub tag_name: String,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub value: Option<String>,
}

impl Element for TraceElement {
    fn tag_name(&self) -> String {
        self.tag_name.clone()
    }

    fn input_type(&self) -> Option<String> {
        self.input_type.clone()
    }

    fn checked(&self) -> bool {
        self.checked
    }

    fn value(&self) -> Option<String> {
        self.value.clone()
    }
}

impl Trace {
    /// Parse a YAML or JSON trace.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub async fn load(path: &Path) -> Result<Self, crate::replay::ReplayError> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(Self::parse(&content)?)
    }
}
