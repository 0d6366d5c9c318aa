//! Browser tests: `wasm-pack test --headless --firefox crates/form-xn-wasm`
#![cfg(target_arch = "wasm32")]

use form_xn::{field_error, ActionForm, FormState};
use form_xn_wasm::mount_forms;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Event, EventInit, HtmlElement, HtmlFormElement, HtmlTextAreaElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Render the add form into the page and mount it
fn add_form(id: &str) -> HtmlFormElement {
    let markup = ActionForm::new("addTodo")
        .validator(form_xn::garde_validator::<form_xn_wasm::todo::TodoInput>())
        .render(&FormState::new(), |errors| form_xn::html! {
            textarea name="title" {}
            (field_error(errors, "title"))
        });

    let host = document().create_element("div").unwrap();
    host.set_id(id);
    host.set_inner_html(&markup.into_string());
    document().body().unwrap().append_child(&host).unwrap();
    mount_forms().unwrap();

    host.query_selector("form").unwrap().unwrap().dyn_into().unwrap()
}

fn submit(form: &HtmlFormElement) -> Event {
    let init = EventInit::new();
    init.set_cancelable(true);
    let event = Event::new_with_event_init_dict("submit", &init).unwrap();
    form.dispatch_event(&event).unwrap();
    event
}

fn slot(form: &HtmlFormElement) -> HtmlElement {
    form.query_selector("[data-field=title]").unwrap().unwrap().dyn_into().unwrap()
}

#[wasm_bindgen_test]
fn blank_title_prevents_submit_and_shows_message() {
    let form = add_form("blank");

    let event = submit(&form);

    assert!(event.default_prevented());
    assert!(!slot(&form).hidden());
    assert_eq!(slot(&form).text_content().as_deref(), Some("Title is required"));
}

#[wasm_bindgen_test]
fn fixed_title_hides_message() {
    let form = add_form("fixed");
    submit(&form);

    let title: HtmlTextAreaElement = form
        .query_selector("textarea")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    title.set_value("Buy milk");
    // Synthetic submit events never navigate
    let event = submit(&form);

    assert!(!event.default_prevented());
    assert!(slot(&form).hidden());
}

#[wasm_bindgen_test]
fn forms_are_mounted_once() {
    add_form("once");
    assert_eq!(mount_forms().unwrap(), 0);
}
