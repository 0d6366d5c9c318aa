// File: src/dom.rs
// Purpose: Submit listeners and error slots for mounted forms

use crate::registry::ClientForms;
use form_xn::{ClientErrors, FieldValue, FormState, SubmitDecision, INTENT_FIELD};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    console, Document, Event, HtmlElement, HtmlFormElement, MutationObserver, MutationObserverInit,
};

/// Set on forms that already have a listener
const MOUNTED_ATTR: &str = "data-form-xn-mounted";

/// Attach a submit listener to every validated form not mounted before.
///
/// Returns how many forms were mounted.
pub fn mount(document: &Document, forms: Rc<ClientForms>) -> Result<usize, JsValue> {
    let nodes = document.query_selector_all("form[data-form-xn][data-validated]")?;
    let mut mounted = 0;
    for index in 0..nodes.length() {
        let Some(form) = nodes
            .item(index)
            .and_then(|node| node.dyn_into::<HtmlFormElement>().ok())
        else {
            continue;
        };
        if form.has_attribute(MOUNTED_ATTR) {
            continue;
        }
        mount_form(form, forms.clone())?;
        mounted += 1;
    }
    Ok(mounted)
}

fn mount_form(form: HtmlFormElement, forms: Rc<ClientForms>) -> Result<(), JsValue> {
    let state = Rc::new(RefCell::new(FormState::new()));
    state.borrow_mut().sync_records(&records_attr(&form));

    let on_submit = {
        let form = form.clone();
        let state = state.clone();
        Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let intent = form.get_attribute("data-intent").unwrap_or_default();
            let fields = match collect_fields(&form) {
                Ok(fields) => fields,
                Err(error) => {
                    console::error_2(&"form-xn: could not read form".into(), &error);
                    return;
                }
            };

            let mut state = state.borrow_mut();
            if forms.submit(&intent, &mut state, fields) == SubmitDecision::Prevent {
                event.prevent_default();
            }
            if let Err(error) = show_errors(&form, state.errors()) {
                console::error_2(&"form-xn: could not show errors".into(), &error);
            }
        })
    };
    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();

    // Errors belong to the record set they were raised for
    let on_records = {
        let form = form.clone();
        Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |_mutations: js_sys::Array, _observer: MutationObserver| {
                let mut state = state.borrow_mut();
                if state.sync_records(&records_attr(&form)) {
                    if let Err(error) = show_errors(&form, state.errors()) {
                        console::error_2(&"form-xn: could not clear errors".into(), &error);
                    }
                }
            },
        )
    };
    let observer = MutationObserver::new(on_records.as_ref().unchecked_ref())?;
    let options = MutationObserverInit::new();
    options.set_attributes(true);
    options.set_attribute_filter(&js_sys::Array::of1(&JsValue::from_str("data-records")));
    observer.observe_with_options(&form, &options)?;
    on_records.forget();

    form.set_attribute(MOUNTED_ATTR, "")?;
    Ok(())
}

fn records_attr(form: &HtmlFormElement) -> String {
    form.get_attribute("data-records").unwrap_or_default()
}

/// Every submitted control except the intent, files marked as such.
fn collect_fields(form: &HtmlFormElement) -> Result<Vec<(String, FieldValue)>, JsValue> {
    let data = web_sys::FormData::new_with_form(form)?;
    let mut fields = Vec::new();
    let Some(entries) = js_sys::try_iter(&data)? else {
        return Ok(fields);
    };

    for entry in entries {
        let entry: js_sys::Array = entry?.dyn_into()?;
        let Some(name) = entry.get(0).as_string() else {
            continue;
        };
        if name == INTENT_FIELD {
            continue;
        }
        let value = match entry.get(1).dyn_into::<web_sys::File>() {
            Ok(file) => FieldValue::File { name: file.name() },
            Err(value) => FieldValue::Text(value.as_string().unwrap_or_default()),
        };
        fields.push((name, value));
    }
    Ok(fields)
}

/// Fill or hide the `[data-field]` message slots inside the form.
fn show_errors(form: &HtmlFormElement, errors: &ClientErrors) -> Result<(), JsValue> {
    let slots = form.query_selector_all(".field-error[data-field]")?;
    for index in 0..slots.length() {
        let Some(slot) = slots
            .item(index)
            .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        let field = slot.get_attribute("data-field").unwrap_or_default();
        match errors.get(&field) {
            Some(message) => {
                slot.set_text_content(Some(message));
                slot.set_hidden(false);
            }
            None => {
                slot.set_text_content(None);
                slot.set_hidden(true);
            }
        }
    }
    Ok(())
}
