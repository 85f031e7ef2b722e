//! WebAssembly bindings for Personal Blocklist
//!
//! The content script owns the DOM and the timer. On every call it hands
//! over a snapshot of the result elements and applies the returned writes,
//! so the engine never holds on to page objects.

pub mod markers;

use pb_core::{
    AddPatternResponse, BlocklistResponse, Control, HostMessage, ItemId, MemorySurface, Mutation,
    PageContext, RemovePatternResponse, ResultItem, Session, SessionConfig,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Result element as reported by the content script.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsResult {
    id: u32,
    link: Option<String>,
    #[serde(default)]
    host_marker: bool,
    #[serde(default)]
    is_book_result: bool,
    #[serde(default)]
    host_revealed: bool,
    #[serde(default)]
    class_name: String,
    #[serde(default)]
    control: Option<Control>,
    #[serde(default = "default_true")]
    has_control_slot: bool,
}

fn default_true() -> bool {
    true
}

impl JsResult {
    fn into_item(self) -> ResultItem {
        ResultItem {
            id: ItemId(self.id),
            link: self.link,
            host_marker: self.host_marker,
            is_book_result: self.is_book_result,
            host_revealed: self.host_revealed,
            state: markers::state_from_classes(&self.class_name),
            processed: markers::is_processed(&self.class_name),
            control: self.control,
        }
    }
}

#[wasm_bindgen]
pub struct OverlaySession {
    session: Session,
}

#[wasm_bindgen]
impl OverlaySession {
    #[wasm_bindgen(constructor)]
    pub fn new(page_url: &str, event_id: Option<String>, config: JsValue) -> Result<OverlaySession, JsValue> {
        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            from_js(&config)?
        };

        let mut page = PageContext::from_url(page_url);
        page.event_id = event_id.filter(|id| !id.is_empty());

        Ok(Self { session: Session::new(config, page) })
    }

    #[wasm_bindgen(js_name = passIntervalMs)]
    pub fn pass_interval_ms(&self) -> u32 {
        u32::try_from(self.session.pass_interval().as_millis()).unwrap_or(u32::MAX)
    }

    #[wasm_bindgen(js_name = blocklistSize)]
    pub fn blocklist_size(&self) -> u32 {
        self.session.blocklist().len() as u32
    }

    #[wasm_bindgen(js_name = blocklistRequest)]
    pub fn blocklist_request(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.blocklist_request())
    }

    #[wasm_bindgen(js_name = blockRequest)]
    pub fn block_request(&self, pattern: &str) -> Result<JsValue, JsValue> {
        to_js(&self.session.block_request(pattern))
    }

    #[wasm_bindgen(js_name = unblockRequest)]
    pub fn unblock_request(&self, pattern: &str) -> Result<JsValue, JsValue> {
        to_js(&self.session.unblock_request(pattern))
    }

    /// Run one pass. Returns `{report, mutations}`.
    pub fn reconcile(&mut self, results: &JsValue, notification: &str) -> Result<JsValue, JsValue> {
        let mut surface = load_surface(results, notification)?;
        let report = self.session.reconcile(&mut surface);

        let js_result = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&js_result, &"report".into(), &to_js(&report)?);
        let _ = js_sys::Reflect::set(&js_result, &"mutations".into(), &mutations_to_js(surface.take_log()));
        Ok(js_result.into())
    }

    /// Show all hidden results. Returns the mutations to apply.
    #[wasm_bindgen(js_name = revealHidden)]
    pub fn reveal_hidden(&mut self, results: &JsValue, notification: &str) -> Result<JsValue, JsValue> {
        let mut surface = load_surface(results, notification)?;
        self.session.reveal_hidden(&mut surface);
        Ok(mutations_to_js(surface.take_log()).into())
    }

    /// Apply an add response. Returns the follow-up request, or null when the
    /// store rejected the pattern.
    #[wasm_bindgen(js_name = onPatternAdded)]
    pub fn on_pattern_added(&mut self, pattern: &str, response: &JsValue) -> Result<JsValue, JsValue> {
        let response: AddPatternResponse = from_js(response)?;
        match self.session.on_pattern_added(pattern, response) {
            Ok(follow_up) => to_js(&follow_up),
            Err(e) => {
                web_sys::console::debug_1(&JsValue::from_str(&e.to_string()));
                Ok(JsValue::NULL)
            }
        }
    }

    /// Apply a remove response. Returns `{followUp, mutations}`.
    #[wasm_bindgen(js_name = onPatternRemoved)]
    pub fn on_pattern_removed(
        &mut self,
        response: &JsValue,
        results: &JsValue,
        notification: &str,
    ) -> Result<JsValue, JsValue> {
        let response: RemovePatternResponse = from_js(response)?;
        let mut surface = load_surface(results, notification)?;

        let follow_up = match self.session.on_pattern_removed(response, &mut surface) {
            Ok(follow_up) => to_js(&follow_up)?,
            Err(e) => {
                web_sys::console::debug_1(&JsValue::from_str(&e.to_string()));
                JsValue::NULL
            }
        };

        let js_result = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&js_result, &"followUp".into(), &follow_up);
        let _ = js_sys::Reflect::set(&js_result, &"mutations".into(), &mutations_to_js(surface.take_log()));
        Ok(js_result.into())
    }

    #[wasm_bindgen(js_name = onBlocklist)]
    pub fn on_blocklist(&mut self, response: &JsValue) -> Result<(), JsValue> {
        let response: BlocklistResponse = from_js(response)?;
        self.session.on_blocklist(response);
        Ok(())
    }

    /// Handle a pushed message. Unknown message types are ignored.
    #[wasm_bindgen(js_name = onHostMessage)]
    pub fn on_host_message(&mut self, message: &JsValue) -> Result<JsValue, JsValue> {
        let Ok(message) = from_js::<HostMessage>(message) else {
            return Ok(JsValue::NULL);
        };
        match self.session.on_host_message(message) {
            Some(request) => to_js(&request),
            None => Ok(JsValue::NULL),
        }
    }
}

#[wasm_bindgen]
pub fn resolve_domain_js(link: &str) -> Option<String> {
    pb_core::resolve_domain(link).ok()
}

#[wasm_bindgen]
pub fn event_id_from_script(script: &str) -> Option<String> {
    pb_core::page::extract_event_id(script).map(|id| id.to_string())
}

#[wasm_bindgen]
pub fn state_from_classes_js(class_name: &str) -> String {
    markers::state_from_classes(class_name).as_str().to_string()
}

fn load_surface(results: &JsValue, notification: &str) -> Result<MemorySurface, JsValue> {
    let results: Vec<JsResult> = from_js(results)?;
    let mut surface = MemorySurface::new().with_notification(markers::parse_notification(notification));

    for result in results {
        let id = ItemId(result.id);
        if !result.has_control_slot {
            surface.remove_control_slot(id);
        }
        surface.push(result.into_item());
    }

    Ok(surface)
}

fn mutations_to_js(mutations: Vec<Mutation>) -> js_sys::Array {
    let ops = js_sys::Array::new();
    for mutation in &mutations {
        ops.push(&mutation_to_js(mutation));
    }
    ops
}

fn mutation_to_js(mutation: &Mutation) -> JsValue {
    let op = js_sys::Object::new();

    match mutation {
        Mutation::SetState { id, state } => {
            let state_markers = markers::state_markers(*state);
            let remove_classes = js_sys::Array::new();
            for class in markers::STATE_CLASSES {
                remove_classes.push(&JsValue::from_str(class));
            }
            let _ = js_sys::Reflect::set(&op, &"op".into(), &JsValue::from_str("setState"));
            let _ = js_sys::Reflect::set(&op, &"id".into(), &JsValue::from(id.0));
            let _ = js_sys::Reflect::set(&op, &"state".into(), &JsValue::from_str(state.as_str()));
            let _ = js_sys::Reflect::set(&op, &"removeClasses".into(), &remove_classes);
            let _ = js_sys::Reflect::set(&op, &"addClass".into(), &optional_str(state_markers.class_name));
            let _ = js_sys::Reflect::set(&op, &"style".into(), &optional_str(state_markers.style));
        }
        Mutation::MarkProcessed { id } => {
            let _ = js_sys::Reflect::set(&op, &"op".into(), &JsValue::from_str("markProcessed"));
            let _ = js_sys::Reflect::set(&op, &"id".into(), &JsValue::from(id.0));
            let _ = js_sys::Reflect::set(&op, &"addClass".into(), &JsValue::from_str(markers::PROCESSED_CLASS));
        }
        Mutation::PutControl { id, control } => {
            let _ = js_sys::Reflect::set(&op, &"op".into(), &JsValue::from_str("putControl"));
            let _ = js_sys::Reflect::set(&op, &"id".into(), &JsValue::from(id.0));
            let _ = js_sys::Reflect::set(&op, &"kind".into(), &JsValue::from_str(control.kind()));
            let _ = js_sys::Reflect::set(&op, &"pattern".into(), &JsValue::from_str(control.pattern()));
            let _ = js_sys::Reflect::set(&op, &"className".into(), &JsValue::from_str(markers::control_class(control)));
        }
        Mutation::SetNotification { status } => {
            let _ = js_sys::Reflect::set(&op, &"op".into(), &JsValue::from_str("setNotification"));
            let _ = js_sys::Reflect::set(&op, &"status".into(), &JsValue::from_str(markers::notification_name(*status)));
            let _ = js_sys::Reflect::set(&op, &"style".into(), &optional_str(markers::notification_style(*status)));
        }
    }

    op.into()
}

fn optional_str(value: Option<&str>) -> JsValue {
    value.map_or(JsValue::NULL, JsValue::from_str)
}

fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, JsValue> {
    let json: String = js_sys::JSON::stringify(value)?.into();
    serde_json::from_str(&json).map_err(|e| JsValue::from_str(&format!("Invalid input: {}", e)))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize: {}", e)))?;
    js_sys::JSON::parse(&json)
}
