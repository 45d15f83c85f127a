//! JavaScript entry points for embedding the graph in a server-rendered
//! page.

use std::any::Any;

use leptos::prelude::*;
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use super::component::{GraphContext, RouteGraphCanvas};
use super::config::GraphConfig;
use super::export;
use super::normalize::GraphPayload;
use crate::error::GraphError;

/// Accepts a JSON string or any JSON-compatible JS value. Input that
/// cannot be read becomes an invalid payload carrying the reason.
fn payload_from_js(value: &JsValue) -> GraphPayload {
	if let Some(text) = value.as_string() {
		return GraphPayload::parse(&text);
	}
	if value.is_undefined() || value.is_null() {
		return GraphPayload::default();
	}
	match js_sys::JSON::stringify(value).ok().and_then(|s| s.as_string()) {
		Some(text) => GraphPayload::parse(&text),
		None => {
			let err = GraphError::Payload("value cannot be converted to JSON".into());
			warn!("{}", err);
			GraphPayload::Invalid(err)
		}
	}
}

fn config_from_js(value: &JsValue) -> GraphConfig {
	if value.is_undefined() || value.is_null() {
		return GraphConfig::default();
	}
	let parsed = match value.as_string() {
		Some(text) => GraphConfig::from_json_str(&text),
		None => js_sys::JSON::stringify(value)
			.map_err(GraphError::from)
			.and_then(|text| GraphConfig::from_json_str(&String::from(text))),
	};
	parsed.unwrap_or_else(|err| {
		warn!("ignoring graph config: {}", err);
		GraphConfig::default()
	})
}

/// A mounted graph view, as seen from JavaScript.
#[wasm_bindgen]
pub struct RouteGraphHandle {
	payload: RwSignal<GraphPayload>,
	context: GraphContext,
	config: GraphConfig,
	mount: Option<Box<dyn Any>>,
}

#[wasm_bindgen]
impl RouteGraphHandle {
	/// Replace the graph with a new payload. An unreadable payload shows
	/// the empty state with the reason instead of throwing.
	pub fn load(&self, payload: JsValue) {
		self.payload.set(payload_from_js(&payload));
	}

	/// Download the current graph and return the exported JSON.
	#[wasm_bindgen(js_name = exportGraph)]
	pub fn export_graph(&self) -> Result<String, JsValue> {
		let json = self
			.context
			.with_state(|s| s.export_json())
			.ok_or_else(|| GraphError::Export("graph is not mounted".into()))??;
		export::download_json(&json, &self.config.export_filename)?;
		Ok(json)
	}

	/// Replay a search trace, the first one when no key is given. Returns
	/// the status line.
	pub fn replay(&self, trace_key: Option<String>) -> Option<String> {
		self.context.with_state(|s| {
			s.start_replay(trace_key.as_deref());
			s.status().to_string()
		})
	}

	/// Unmount the view. The animation loop stops on its next frame.
	pub fn dispose(&mut self) {
		if self.mount.take().is_some() {
			info!("route graph disposed");
		}
	}
}

/// Mount a graph view into the element with id `container_id`. Returns
/// `undefined` when the element does not exist.
#[wasm_bindgen(js_name = initRouteGraph)]
pub fn init_route_graph(
	container_id: &str,
	payload: JsValue,
	config: JsValue,
) -> Option<RouteGraphHandle> {
	crate::init_logging();

	let container = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(container_id));
	let Some(container) = container else {
		error!("{}", GraphError::MissingContainer(container_id.to_string()));
		return None;
	};

	let config = config_from_js(&config);
	let payload = RwSignal::new(payload_from_js(&payload));
	let context = GraphContext::new();

	let (context_view, config_view) = (context.clone(), config.clone());
	let mount = leptos::mount::mount_to(container.unchecked_into::<HtmlElement>(), move || {
		view! { <RouteGraphCanvas data=payload config=config_view context=context_view /> }
	});
	info!("route graph mounted into #{}", container_id);

	Some(RouteGraphHandle {
		payload,
		context,
		config,
		mount: Some(Box::new(mount)),
	})
}
