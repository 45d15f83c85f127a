use log::info;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use super::types::GraphData;
use crate::error::GraphError;

/// Pretty-printed snapshot of the current nodes and edges.
pub fn export_json(graph: &GraphData) -> Result<String, GraphError> {
	serde_json::to_string_pretty(graph).map_err(|e| GraphError::Export(e.to_string()))
}

/// Hand `json` to the browser as a file download.
pub fn download_json(json: &str, filename: &str) -> Result<(), GraphError> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| GraphError::Export("no document".into()))?;

	let parts = js_sys::Array::of1(&json.into());
	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into().map_err(|_| {
		GraphError::Export("anchor element has an unexpected type".into())
	})?;
	anchor.set_href(&url);
	anchor.set_download(filename);
	anchor.click();
	Url::revoke_object_url(&url)?;

	info!("exported graph as {}", filename);
	Ok(())
}

#[cfg(test)]
mod tests {
	use serde_json::Value;

	use super::*;
	use crate::components::route_graph::normalize::{GraphPayload, normalize};
	use crate::components::route_graph::theme::GraphTheme;
	use crate::components::route_graph::types::{Bounds, Edge, EdgeKind, Node, NodeKind, Vec2};

	#[test]
	fn export_contains_nodes_and_edges() {
		let mut stop = Node::new("d", NodeKind::DeliveryStop, Vec2::new(1.0, 2.0));
		stop.cluster = Some("3".into());
		let graph = GraphData::new(
			vec![Node::new("r", NodeKind::Restaurant, Vec2::ZERO), stop],
			vec![Edge::new("r", "d", EdgeKind::OptimizedRoute)],
		);
		let json: Value = serde_json::from_str(&export_json(&graph).expect("export")).expect("json");
		assert_eq!(json["nodes"].as_array().map(Vec::len), Some(2));
		assert_eq!(json["nodes"][1]["cluster"], "3");
		assert_eq!(json["nodes"][1]["position"]["x"], 1.0);
		assert_eq!(json["edges"][0]["kind"], "optimized-route");
		assert!(json.get("index").is_none());
		assert!(json["nodes"][0].get("velocity").is_none());
	}

	#[test]
	fn export_reloads_into_the_same_graph() {
		let home = Vec2::new(100.0, 120.0);
		let mut restaurant = Node::new("r", NodeKind::Restaurant, home);
		restaurant.pinned = Some(home);
		restaurant.anchor = Some(home);
		restaurant.name = Some("Cozinha".into());
		let mut stop = Node::new("d", NodeKind::DeliveryStop, Vec2::new(300.0, 310.0));
		stop.cluster = Some("2".into());
		stop.details.order_id = Some("17".into());
		stop.details.address = Some("Rua A".into());
		stop.details.value = Some(42.5);
		let mut route = Edge::new("r", "d", EdgeKind::OptimizedRoute);
		route.weight = 900.0;
		let graph = GraphData::new(vec![restaurant, stop], vec![route]);

		let json = export_json(&graph).expect("export");
		let mut unit = || 0.5;
		let out = normalize(
			&GraphPayload::parse(&json),
			Bounds::new(800.0, 600.0),
			&GraphTheme::classic(),
			&mut unit,
		);
		assert!(out.problem.is_none());
		assert_eq!(out.graph.nodes, graph.nodes);
		assert_eq!(out.graph.edges, graph.edges);
	}
}
