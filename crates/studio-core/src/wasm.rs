use crate::element::{Element, SelectorService};
use crate::error::RecorderError;
use crate::event::{EventKind, Modifiers, RawEvent};
use crate::log::CommandEntry;
use crate::recorder::{Recorder, RecorderConfig};
use crate::source::{EventSource, ListenerOptions, LogSink};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{
    AddEventListenerOptions, EventListenerOptions, EventTarget, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, KeyboardEvent,
};

impl Element for web_sys::Element {
    fn tag_name(&self) -> String {
        web_sys::Element::tag_name(self)
    }

    fn input_type(&self) -> Option<String> {
        self.dyn_ref::<HtmlInputElement>().map(|input| input.type_())
    }

    fn checked(&self) -> bool {
        self.dyn_ref::<HtmlInputElement>().is_some_and(|input| input.checked())
    }

    fn value(&self) -> Option<String> {
        if let Some(input) = self.dyn_ref::<HtmlInputElement>() {
            return Some(input.value());
        }
        if let Some(select) = self.dyn_ref::<HtmlSelectElement>() {
            return Some(select.value());
        }
        self.dyn_ref::<HtmlTextAreaElement>().map(|area| area.value())
    }
}

/// DOM listener registration backed by a single JS closure.
pub struct DomEventSource {
    handler: Closure<dyn FnMut(web_sys::Event)>,
}

impl EventSource for DomEventSource {
    type Node = EventTarget;

    fn subscribe(
        &mut self,
        node: &EventTarget,
        kind: EventKind,
        options: &ListenerOptions,
    ) -> Result<(), RecorderError> {
        let js_options = AddEventListenerOptions::new();
        js_options.set_capture(options.capture);
        js_options.set_passive(options.passive);
        node.add_event_listener_with_callback_and_add_event_listener_options(
            kind.as_str(),
            self.handler.as_ref().unchecked_ref(),
            &js_options,
        )
        .map_err(|e| RecorderError::Subscribe {
            event: kind,
            reason: format!("{:?}", e),
        })
    }

    fn unsubscribe(&mut self, node: &EventTarget, kind: EventKind, options: &ListenerOptions) {
        let js_options = EventListenerOptions::new();
        js_options.set_capture(options.capture);
        // removeEventListener does not throw for unknown listeners
        let _ = node.remove_event_listener_with_callback_and_event_listener_options(
            kind.as_str(),
            self.handler.as_ref().unchecked_ref(),
            &js_options,
        );
    }
}

/// Selector generation delegated to a JS function `(element) => string`.
pub struct JsSelectorService(js_sys::Function);

impl SelectorService<web_sys::Element> for JsSelectorService {
    fn selector_for(&self, element: &web_sys::Element) -> String {
        self.0
            .call1(&JsValue::NULL, element)
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    }
}

/// Publishes each snapshot as a JSON string to a JS function.
pub struct JsLogSink(js_sys::Function);

impl LogSink for JsLogSink {
    fn publish(&mut self, log: &[CommandEntry]) {
        match serde_json::to_string(log) {
            Ok(json) => {
                if let Err(e) = self.0.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    tracing::warn!("Log subscriber threw: {:?}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize command log: {}", e),
        }
    }
}

type DomRecorder = Recorder<DomEventSource, JsSelectorService, JsLogSink>;

fn raw_event(event: &web_sys::Event) -> Option<RawEvent<web_sys::Element>> {
    let kind: EventKind = event.type_().parse().ok()?;
    let target = event.target()?.dyn_into::<web_sys::Element>().ok()?;

    let (key, modifiers) = match event.dyn_ref::<KeyboardEvent>() {
        Some(k) => (
            k.key(),
            Modifiers {
                alt: k.alt_key(),
                ctrl: k.ctrl_key(),
                meta: k.meta_key(),
                shift: k.shift_key(),
            },
        ),
        None => (String::new(), Modifiers::NONE),
    };

    Some(RawEvent {
        kind,
        trusted: event.is_trusted(),
        target,
        key,
        modifiers,
    })
}

/// Browser-facing recorder handle.
///
/// The publish callback runs while the recorder is borrowed; calls made back into
/// this object from inside it are rejected.
#[wasm_bindgen]
pub struct StudioRecorder {
    inner: Rc<RefCell<Option<DomRecorder>>>,
}

impl StudioRecorder {
    fn with<T>(&self, f: impl FnOnce(&mut DomRecorder) -> T) -> Result<T, JsValue> {
        let mut guard = self
            .inner
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Recorder is busy"))?;
        let recorder = guard
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Recorder is not initialized"))?;
        Ok(f(recorder))
    }
}

#[wasm_bindgen]
impl StudioRecorder {
    #[wasm_bindgen(constructor)]
    pub fn new(selector_for: js_sys::Function, publish: js_sys::Function) -> Self {
        console_error_panic_hook::set_once();

        let inner: Rc<RefCell<Option<DomRecorder>>> = Rc::new(RefCell::new(None));
        let weak = Rc::downgrade(&inner);
        let handler = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let Some(slot) = weak.upgrade() else {
                return;
            };
            let Ok(mut guard) = slot.try_borrow_mut() else {
                return;
            };
            if let (Some(recorder), Some(raw)) = (guard.as_mut(), raw_event(&event)) {
                recorder.record_event(&raw);
            }
        });

        let recorder = Recorder::new(
            DomEventSource { handler },
            JsSelectorService(selector_for),
            JsLogSink(publish),
            RecorderConfig::default(),
        );
        *inner.borrow_mut() = Some(recorder);

        Self { inner }
    }

    #[wasm_bindgen(js_name = setTestId)]
    pub fn set_test_id(&self, test_id: Option<String>) -> Result<(), JsValue> {
        self.with(|r| r.set_test_id(test_id))
    }

    #[wasm_bindgen(js_name = startLoading)]
    pub fn start_loading(&self) -> Result<(), JsValue> {
        self.with(|r| r.start_loading())
    }

    pub fn start(&self, root: EventTarget) -> Result<(), JsValue> {
        self.with(|r| r.start(root))?
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn stop(&self) -> Result<(), JsValue> {
        self.with(|r| r.stop())
    }

    pub fn cancel(&self) -> Result<(), JsValue> {
        self.with(|r| r.cancel())
    }

    pub fn reset(&self) -> Result<(), JsValue> {
        self.with(|r| r.reset())
    }

    pub fn save(&self) -> Result<(), JsValue> {
        self.with(|r| r.save())
    }

    #[wasm_bindgen(js_name = removeCommand)]
    pub fn remove_command(&self, index: usize) -> Result<(), JsValue> {
        self.with(|r| r.remove_command(index).map(|_| ()))?
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter, js_name = isLoading)]
    pub fn is_loading(&self) -> Result<bool, JsValue> {
        self.with(|r| r.is_loading())
    }

    #[wasm_bindgen(getter, js_name = isActive)]
    pub fn is_active(&self) -> Result<bool, JsValue> {
        self.with(|r| r.is_active())
    }

    #[wasm_bindgen(getter, js_name = isFinished)]
    pub fn is_finished(&self) -> Result<bool, JsValue> {
        self.with(|r| r.is_finished())
    }

    #[wasm_bindgen(getter, js_name = isOpen)]
    pub fn is_open(&self) -> Result<bool, JsValue> {
        self.with(|r| r.is_open())
    }

    #[wasm_bindgen(getter, js_name = testId)]
    pub fn test_id(&self) -> Result<Option<String>, JsValue> {
        self.with(|r| r.test_id().map(str::to_string))
    }

    /// Current log as a JSON string.
    pub fn log(&self) -> Result<String, JsValue> {
        self.with(|r| serde_json::to_string(r.log()))?
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize log: {}", e)))
    }
}
