//! form-xn browser bindings
//!
//! Compiled to WebAssembly and loaded by the demo page. Every form rendered
//! with `data-form-xn data-validated` is validated on submit with the same
//! garde schema the server runs, and the submission is prevented while it
//! fails. The schemas live here so the server and the browser share one copy.

pub mod registry;
pub mod todo;

#[cfg(target_arch = "wasm32")]
mod dom;

pub use registry::ClientForms;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Mount every validated form on the page
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("form-xn: no document to mount on"))?;

    let mounted = dom::mount(&document, std::rc::Rc::new(todo::client_forms()))?;
    web_sys::console::debug_1(&format!("form-xn: {} form(s) mounted", mounted).into());
    Ok(())
}

/// Mount forms again after the page swapped in new markup
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = mountForms)]
pub fn mount_forms() -> Result<usize, JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("form-xn: no document to mount on"))?;
    dom::mount(&document, std::rc::Rc::new(todo::client_forms()))
}
