use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::JsValue;

use crate::components::route_graph::{GraphConfig, GraphPayload, RouteGraphCanvas};
use crate::error::GraphError;

/// Global the server-rendered dashboard page stores the payload under.
const PAGE_PAYLOAD_KEY: &str = "routeGraphData";

/// Read the payload the page embedded. Anything unusable becomes an
/// invalid payload, shown as the empty-state placeholder with the reason.
fn page_payload() -> GraphPayload {
	let read = || -> Result<GraphPayload, GraphError> {
		let window = web_sys::window().ok_or_else(|| GraphError::Setup("no window".into()))?;
		let value = js_sys::Reflect::get(&window, &JsValue::from_str(PAGE_PAYLOAD_KEY))?;
		if value.is_undefined() || value.is_null() {
			return Err(GraphError::Payload(format!("window.{} is not set", PAGE_PAYLOAD_KEY)));
		}
		let text: String = js_sys::JSON::stringify(&value)?.into();
		GraphPayload::from_json_str(&text)
	};
	match read() {
		Ok(payload) => {
			debug!("loaded graph payload from window.{}", PAGE_PAYLOAD_KEY);
			payload
		}
		Err(err) => {
			warn!("{}", err);
			GraphPayload::Invalid(err)
		}
	}
}

/// Dashboard view of the latest routing optimization.
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(page_payload);

	view! {
		<div class="fullscreen-graph">
			<RouteGraphCanvas data=graph_data config=GraphConfig::default() fullscreen=true />
			<div class="graph-overlay">
				<h1>"Delivery routes"</h1>
				<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
			</div>
		</div>
	}
}
