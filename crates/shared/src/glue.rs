//! The worker script the browser registers. It loads the no-modules
//! wasm-bindgen output and forwards the lifecycle events to the wasm exports.

use crate::request::RETRIEVAL_METHODS;

static PRELUDE_TEMPLATE: &str = "importScripts('WASM.js');
const { worker_install, worker_activate, worker_fetch } = wasm_bindgen;
const ready = wasm_bindgen('WASM_bg.wasm');
const RETRIEVAL_METHODS = [METHOD_LIST];
";
static LISTENER_TEMPLATE: &str = "self.addEventListener('NAME', event => LISTENER);\n";
static LISTENERS: [(&str, &str); 3] = [
    (
        "install",
        "event.waitUntil(ready.then(() => worker_install(self)))",
    ),
    (
        "activate",
        "event.waitUntil(ready.then(() => worker_activate(self)))",
    ),
    // Returning without respondWith leaves the request to the browser
    (
        "fetch",
        "{ if (RETRIEVAL_METHODS.includes(event.request.method)) event.respondWith(ready.then(() => worker_fetch(self, event.request))); }",
    ),
];

/// Builds the worker script for wasm-bindgen output at `wasm_path`, given
/// without extension (`/wasm/service_worker` loads `/wasm/service_worker.js`
/// and `/wasm/service_worker_bg.wasm`)
pub fn worker_script(wasm_path: &str) -> String {
    let methods = RETRIEVAL_METHODS
        .iter()
        .map(|m| format!("'{m}'"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut script = PRELUDE_TEMPLATE
        .replace("WASM", wasm_path)
        .replace("METHOD_LIST", &methods);

    for (name, listener) in LISTENERS {
        script += LISTENER_TEMPLATE
            .replace("NAME", name)
            .replace("LISTENER", listener)
            .as_str();
    }
    script
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_registers_every_listener() {
        let script = worker_script("/wasm/service_worker");

        assert!(script.starts_with("importScripts('/wasm/service_worker.js');"));
        assert!(script.contains("wasm_bindgen('/wasm/service_worker_bg.wasm')"));
        for name in ["install", "activate", "fetch"] {
            assert!(
                script.contains(&format!("self.addEventListener('{name}', event => ")),
                "no {name} listener in:\n{script}"
            );
        }
    }

    #[test]
    fn test_only_retrieval_methods_are_intercepted() {
        let script = worker_script("/sw");
        assert!(script.contains("const RETRIEVAL_METHODS = ['GET'];"));
    }
}
