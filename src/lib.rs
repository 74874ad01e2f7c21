#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod components;
pub mod geom;
pub mod graph;

use std::fmt;

use components::{ComponentError, ComponentRegistry, OutputMap};
use graph::meta::MetaMap;
use graph::value::Value;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // een tweede initialisatie laat de bestaande logger staan
    let _ = log::set_logger(&DEFAULT_LOGGER);
    log::set_max_level(LevelFilter::Debug);
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("kon rayon threadpool niet initialiseren: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Fouten die de engine aan de rand teruggeeft.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("onbekende component: {0}")]
    UnknownComponent(String),
    #[error(transparent)]
    Component(#[from] ComponentError),
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    registry: ComponentRegistry,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            registry: ComponentRegistry::default(),
        }
    }

    /// Geeft terug of de engine de minimale initialisatie heeft doorlopen.
    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Namen van alle componenten die de engine kan evalueren.
    #[wasm_bindgen]
    pub fn component_names(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.registry.component_names())
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Evalueert één component op GUID of naam met de gegeven invoerwaarden en
    /// metadata, en geeft de outputs terug als object `pin → waarde`.
    #[wasm_bindgen]
    pub fn evaluate(
        &self,
        component: &str,
        inputs: JsValue,
        meta: JsValue,
    ) -> Result<JsValue, JsValue> {
        let inputs: Vec<Value> = serde_wasm_bindgen::from_value(inputs).map_err(to_js_error)?;
        let meta: MetaMap = if meta.is_undefined() || meta.is_null() {
            MetaMap::new()
        } else {
            serde_wasm_bindgen::from_value(meta).map_err(to_js_error)?
        };

        let outputs = self
            .evaluate_component(component, &inputs, &meta)
            .map_err(to_js_error)?;
        debug_log!("{component}: {} outputs", outputs.len());

        serde_wasm_bindgen::to_value(&outputs).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl Engine {
    /// Native variant van [`Engine::evaluate`] zonder JS-conversies.
    ///
    /// # Errors
    ///
    /// Geeft [`EngineError::UnknownComponent`] wanneer `id_or_name` geen bekende
    /// GUID of naam is, en [`EngineError::Component`] wanneer de component de
    /// invoer weigert.
    pub fn evaluate_component(
        &self,
        id_or_name: &str,
        inputs: &[Value],
        meta: &MetaMap,
    ) -> Result<OutputMap, EngineError> {
        let kind = self
            .registry
            .lookup(id_or_name)
            .ok_or_else(|| EngineError::UnknownComponent(id_or_name.trim().to_owned()))?;
        log::debug!("evalueer {} ({} invoerwaarden)", kind.name(), inputs.len());
        Ok(kind.evaluate(inputs, meta)?)
    }

    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::{Engine, EngineError};
    use crate::graph::meta::MetaMap;
    use crate::graph::value::Value;

    #[test]
    fn unknown_component_is_reported_by_name() {
        let engine = Engine::new();
        let err = engine
            .evaluate_component("  Extrude ", &[], &MetaMap::new())
            .expect_err("unknown");
        assert!(matches!(err, EngineError::UnknownComponent(ref name) if name == "Extrude"));
    }

    #[test]
    fn component_errors_pass_through() {
        let engine = Engine::default();
        let err = engine
            .evaluate_component("Quad Subdivide", &[Value::Null], &MetaMap::new())
            .expect_err("missing surface");
        assert!(matches!(err, EngineError::Component(_)));
        assert!(err.to_string().contains("vereist een surface"));
    }
}
