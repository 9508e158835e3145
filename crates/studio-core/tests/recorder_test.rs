use std::cell::RefCell;
use std::rc::Rc;
use studio_core::{
    CommandEntry, CommandKind, Consolidation, Element, EventKind, EventSource, ListenerOptions,
    ListenerSet, Modifiers, RawEvent, Recorder, RecorderConfig, RecorderError, RecorderState,
};

#[derive(Debug, Clone)]
struct Node {
    selector: &'static str,
    tag: &'static str,
    input_type: Option<&'static str>,
    checked: bool,
    value: Option<&'static str>,
}

impl Element for Node {
    fn tag_name(&self) -> String {
        self.tag.to_string()
    }
    fn input_type(&self) -> Option<String> {
        self.input_type.map(str::to_string)
    }
    fn checked(&self) -> bool {
        self.checked
    }
    fn value(&self) -> Option<String> {
        self.value.map(str::to_string)
    }
}

fn text_input(selector: &'static str) -> Node {
    Node {
        selector,
        tag: "INPUT",
        input_type: Some("text"),
        checked: false,
        value: Some(""),
    }
}

fn checkbox(selector: &'static str, checked: bool) -> Node {
    Node {
        selector,
        tag: "INPUT",
        input_type: Some("checkbox"),
        checked,
        value: Some("on"),
    }
}

fn element(selector: &'static str, tag: &'static str) -> Node {
    Node {
        selector,
        tag,
        input_type: None,
        checked: false,
        value: None,
    }
}

fn selector_of(node: &Node) -> String {
    node.selector.to_string()
}

type Snapshots = Rc<RefCell<Vec<Vec<CommandEntry>>>>;
type TestSink = Box<dyn FnMut(&[CommandEntry])>;
type TestRecorder = Recorder<ListenerSet<&'static str>, fn(&Node) -> String, TestSink>;

fn recorder() -> (TestRecorder, Snapshots) {
    let snapshots: Snapshots = Rc::new(RefCell::new(Vec::new()));
    let published = Rc::clone(&snapshots);
    let sink: TestSink = Box::new(move |log: &[CommandEntry]| {
        published.borrow_mut().push(log.to_vec());
    });
    let recorder = Recorder::new(
        ListenerSet::new(),
        selector_of as fn(&Node) -> String,
        sink,
        RecorderConfig::default(),
    );
    (recorder, snapshots)
}

fn type_keys(recorder: &mut TestRecorder, target: &Node, keys: &[(&str, Modifiers)]) {
    for (key, modifiers) in keys {
        recorder.record_event(&RawEvent::key_down(target.clone(), *key, *modifiers));
    }
}

#[test]
fn test_start_attaches_capture_listeners() {
    let (mut recorder, _) = recorder();
    recorder.start("body").expect("start");

    for kind in EventKind::CAPTURED {
        assert!(recorder.source().is_listening(&"body", kind), "{kind}");
    }
    assert_eq!(recorder.source().len(), 4);
    assert_eq!(recorder.state(), RecorderState::Recording);
    assert!(recorder.is_active());
    assert!(recorder.is_open());
    assert!(!recorder.is_finished());
}

#[test]
fn test_stop_detaches_and_keeps_log() {
    let (mut recorder, _) = recorder();
    recorder.start("body").expect("start");
    recorder.record_event(&RawEvent::new(EventKind::Click, element("#go", "BUTTON")));
    recorder.stop();

    assert!(recorder.source().is_empty());
    assert_eq!(recorder.log().len(), 1);
    assert!(recorder.is_finished());
    assert!(recorder.is_open());
    assert_eq!(recorder.state(), RecorderState::Finished);

    // Stopping again is harmless.
    recorder.stop();
    assert!(recorder.source().is_empty());
}

#[test]
fn test_restart_moves_listeners_to_new_root() {
    let (mut recorder, _) = recorder();
    recorder.start("body").expect("start");
    recorder.start("iframe-body").expect("restart");

    let listeners = recorder.source();
    assert!(!listeners.is_listening(&"body", EventKind::Click));
    assert!(listeners.is_listening(&"iframe-body", EventKind::Click));
    assert_eq!(listeners.len(), 4);
    assert_eq!(recorder.root(), Some(&"iframe-body"));
}

#[test]
fn test_typing_coalesces_into_one_entry() {
    let (mut recorder, snapshots) = recorder();
    recorder.start("body").expect("start");

    let name = text_input("#name");
    type_keys(
        &mut recorder,
        &name,
        &[
            ("a", Modifiers::NONE),
            ("B", Modifiers::shift()),
            ("Enter", Modifiers::NONE),
        ],
    );

    assert_eq!(recorder.log().len(), 1);
    assert_eq!(recorder.log()[0].command, CommandKind::Type);
    assert_eq!(recorder.log()[0].value.as_deref(), Some("aB{enter}"));
    assert_eq!(snapshots.borrow().len(), 3);
}

#[test]
fn test_modified_keystrokes_are_wrapped() {
    let (mut recorder, _) = recorder();
    recorder.start("body").expect("start");

    let ctrl_shift = Modifiers {
        ctrl: true,
        shift: true,
        ..Modifiers::NONE
    };
    type_keys(
        &mut recorder,
        &text_input("#q"),
        &[("a", Modifiers::NONE), ("B", ctrl_shift)],
    );
    assert_eq!(recorder.log()[0].value.as_deref(), Some("a{ctrl+shift+b}"));
}

#[test]
fn test_keydown_outside_input_is_ignored() {
    let (mut recorder, snapshots) = recorder();
    recorder.start("body").expect("start");

    let outcome = recorder.record_event(&RawEvent::key_down(
        element("#notes", "TEXTAREA"),
        "a",
        Modifiers::NONE,
    ));
    assert_eq!(outcome, None);
    assert!(recorder.log().is_empty());
    assert!(snapshots.borrow().is_empty());
}

#[test]
fn test_untrusted_events_never_recorded() {
    let (mut recorder, snapshots) = recorder();
    recorder.start("body").expect("start");

    let events = [
        RawEvent::new(EventKind::Click, element("#go", "BUTTON")).untrusted(),
        RawEvent::new(EventKind::DblClick, element("#go", "BUTTON")).untrusted(),
        RawEvent::new(EventKind::Change, element("#fruit", "SELECT")).untrusted(),
        RawEvent::key_down(text_input("#q"), "a", Modifiers::NONE).untrusted(),
    ];
    for event in &events {
        assert_eq!(recorder.record_event(event), None);
    }
    assert!(recorder.log().is_empty());
    assert!(snapshots.borrow().is_empty());
}

#[test]
fn test_events_ignored_when_not_recording() {
    let (mut recorder, _) = recorder();
    let click = RawEvent::new(EventKind::Click, element("#go", "BUTTON"));
    assert_eq!(recorder.record_event(&click), None);

    recorder.start("body").expect("start");
    recorder.save();
    assert_eq!(recorder.record_event(&click), None);
    assert!(recorder.log().is_empty());
}

#[test]
fn test_checkbox_clicks() {
    let (mut recorder, _) = recorder();
    recorder.start("body").expect("start");

    // The click handler observes the state after the toggle.
    recorder.record_event(&RawEvent::new(EventKind::Click, checkbox("#agree", true)));
    recorder.record_event(&RawEvent::new(EventKind::Change, checkbox("#agree", true)));
    recorder.record_event(&RawEvent::new(EventKind::Click, checkbox("#agree", false)));
    recorder.record_event(&RawEvent::new(EventKind::Change, checkbox("#agree", false)));

    let kinds: Vec<CommandKind> = recorder.log().iter().map(|e| e.command).collect();
    assert_eq!(kinds, vec![CommandKind::Check, CommandKind::Uncheck]);
    assert!(recorder.log().iter().all(|e| e.value.is_none()));
}

#[test]
fn test_select_drops_opening_click() {
    let (mut recorder, snapshots) = recorder();
    recorder.start("body").expect("start");

    let mut fruit = element("#fruit", "SELECT");
    recorder.record_event(&RawEvent::new(EventKind::Click, fruit.clone()));
    fruit.value = Some("pear");
    let outcome = recorder.record_event(&RawEvent::new(EventKind::Change, fruit));

    assert_eq!(outcome, Some(Consolidation::CollapsedSelectClick));
    assert_eq!(recorder.log().len(), 1);
    assert_eq!(recorder.log()[0].command, CommandKind::Select);
    assert_eq!(recorder.log()[0].value.as_deref(), Some("pear"));
    assert!(snapshots
        .borrow()
        .iter()
        .all(|s| s.iter().all(|e| e.command != CommandKind::Change)));
}

#[test]
fn test_native_double_click_sequence() {
    let (mut recorder, _) = recorder();
    recorder.start("body").expect("start");

    let row = element("#row", "TD");
    recorder.record_event(&RawEvent::new(EventKind::Click, row.clone()));
    recorder.record_event(&RawEvent::new(EventKind::Click, row.clone()));
    recorder.record_event(&RawEvent::new(EventKind::DblClick, row));

    assert_eq!(recorder.log().len(), 1);
    assert_eq!(recorder.log()[0].command, CommandKind::DblClick);
}

#[test]
fn test_text_change_is_suppressed() {
    let (mut recorder, snapshots) = recorder();
    recorder.start("body").expect("start");

    let mut name = text_input("#name");
    type_keys(
        &mut recorder,
        &name,
        &[("h", Modifiers::NONE), ("i", Modifiers::NONE)],
    );
    name.value = Some("hi");
    let outcome = recorder.record_event(&RawEvent::new(EventKind::Change, name));

    assert_eq!(outcome, Some(Consolidation::DroppedChange));
    assert_eq!(recorder.log().len(), 1);
    // The change still triggers a publication of the unchanged log.
    assert_eq!(snapshots.borrow().len(), 3);
}

#[test]
fn test_reset_empties_log() {
    let (mut recorder, _) = recorder();
    recorder.set_test_id(Some("r7".into()));
    recorder.start("body").expect("start");
    recorder.record_event(&RawEvent::new(EventKind::Click, element("#go", "BUTTON")));
    recorder.reset();

    assert!(recorder.log().is_empty());
    assert!(!recorder.has_started());
    assert_eq!(recorder.test_id(), Some("r7"));
    assert!(recorder.source().is_empty());
    assert_eq!(recorder.state(), RecorderState::Idle);
}

#[test]
fn test_cancel_clears_test_id_but_not_log() {
    let (mut recorder, _) = recorder();
    recorder.set_test_id(Some("r7".into()));
    recorder.start("body").expect("start");
    recorder.record_event(&RawEvent::new(EventKind::Click, element("#go", "BUTTON")));
    recorder.cancel();

    assert_eq!(recorder.test_id(), None);
    assert!(!recorder.has_started());
    assert!(!recorder.is_open());
    assert_eq!(recorder.log().len(), 1);

    recorder.start("body").expect("start");
    assert!(recorder.log().is_empty());
    recorder.record_event(&RawEvent::new(EventKind::Click, element("#go", "BUTTON")));
    assert_eq!(recorder.log()[0].id, "s1");
}

#[test]
fn test_save_marks_saving_and_keeps_log() {
    let (mut recorder, _) = recorder();
    recorder.start("body").expect("start");
    recorder.record_event(&RawEvent::new(EventKind::Click, element("#go", "BUTTON")));
    recorder.save();

    assert!(recorder.is_saving());
    assert!(recorder.is_finished());
    assert_eq!(recorder.state(), RecorderState::Saving);
    assert_eq!(recorder.log().len(), 1);
    assert!(recorder.source().is_empty());

    recorder.start("body").expect("start");
    assert!(!recorder.is_saving());
}

#[test]
fn test_loading_flags() {
    let (mut recorder, _) = recorder();
    assert_eq!(recorder.state(), RecorderState::Idle);
    assert!(!recorder.is_open());

    recorder.start_loading();
    assert!(recorder.is_loading());
    assert!(recorder.is_open());
    assert_eq!(recorder.state(), RecorderState::Loading);

    recorder.start("body").expect("start");
    assert!(!recorder.is_loading());
}

#[test]
fn test_remove_command_republishes() {
    let (mut recorder, snapshots) = recorder();
    recorder.start("body").expect("start");
    recorder.record_event(&RawEvent::new(EventKind::Click, element("#a", "BUTTON")));
    recorder.record_event(&RawEvent::new(EventKind::Click, element("#b", "BUTTON")));

    let removed = recorder.remove_command(0).expect("in range");
    assert_eq!(removed.selector, "#a");
    assert_eq!(recorder.log().len(), 1);
    assert_eq!(snapshots.borrow().len(), 3);
    assert_eq!(snapshots.borrow()[2], recorder.log().to_vec());
}

#[test]
fn test_remove_command_out_of_range() {
    let (mut recorder, snapshots) = recorder();
    recorder.start("body").expect("start");

    assert_eq!(
        recorder.remove_command(0),
        Err(RecorderError::OutOfRange { index: 0, len: 0 })
    );
    assert!(snapshots.borrow().is_empty());
}

#[derive(Default)]
struct FlakySource {
    inner: ListenerSet<&'static str>,
    reject: Option<EventKind>,
}

impl EventSource for FlakySource {
    type Node = &'static str;

    fn subscribe(
        &mut self,
        node: &&'static str,
        kind: EventKind,
        options: &ListenerOptions,
    ) -> Result<(), RecorderError> {
        if self.reject == Some(kind) {
            return Err(RecorderError::Subscribe {
                event: kind,
                reason: "detached node".into(),
            });
        }
        self.inner.subscribe(node, kind, options)
    }

    fn unsubscribe(&mut self, node: &&'static str, kind: EventKind, options: &ListenerOptions) {
        self.inner.unsubscribe(node, kind, options)
    }
}

#[test]
fn test_failed_start_rolls_back() {
    let source = FlakySource {
        reject: Some(EventKind::Change),
        ..FlakySource::default()
    };
    let mut recorder = Recorder::new(
        source,
        selector_of as fn(&Node) -> String,
        |_: &[CommandEntry]| {},
        RecorderConfig::default(),
    );

    let err = recorder.start("body").expect_err("change listener rejected");
    assert!(matches!(
        err,
        RecorderError::Subscribe {
            event: EventKind::Change,
            ..
        }
    ));
    assert!(recorder.source().inner.is_empty());
    assert!(!recorder.is_active());
    assert_eq!(recorder.state(), RecorderState::Idle);
}

#[test]
fn test_listener_set_requires_matching_capture_flag() {
    let mut set = ListenerSet::new();
    set.subscribe(&"body", EventKind::Click, &ListenerOptions::CAPTURE)
        .expect("subscribe");
    set.subscribe(&"body", EventKind::Click, &ListenerOptions::CAPTURE)
        .expect("duplicate subscribe");
    assert_eq!(set.len(), 1);

    let bubbling = ListenerOptions {
        capture: false,
        passive: true,
    };
    set.unsubscribe(&"body", EventKind::Click, &bubbling);
    assert!(set.is_listening(&"body", EventKind::Click));

    set.unsubscribe(&"body", EventKind::Click, &ListenerOptions::CAPTURE);
    assert!(set.is_empty());
}

#[test]
fn test_custom_id_prefix() {
    let config = RecorderConfig {
        id_prefix: "step".into(),
        ..RecorderConfig::default()
    };
    let mut recorder = Recorder::new(
        ListenerSet::new(),
        selector_of as fn(&Node) -> String,
        |_: &[CommandEntry]| {},
        config,
    );
    recorder.start("body").expect("start");
    recorder.record_event(&RawEvent::new(EventKind::Click, element("#go", "BUTTON")));
    assert_eq!(recorder.log()[0].id, "step1");
}
