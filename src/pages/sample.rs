use leptos::prelude::*;
use serde_json::{Value, json};

use crate::components::route_graph::{GraphConfig, GraphPayload, RouteGraphCanvas};

const STREETS: [&str; 6] = [
	"Rua Augusta",
	"Av. Paulista",
	"Rua da Consolacao",
	"Rua Oscar Freire",
	"Av. Reboucas",
	"Rua Haddock Lobo",
];
const ORDER_VALUES: [f64; 12] = [
	45.90, 32.50, 28.75, 55.00, 42.30, 38.90, 49.99, 36.75, 52.40, 41.20, 34.90, 47.60,
];

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// A restaurant, `clusters` cluster centers (at least one) and `stops` delivery stops,
/// wired the way the routing optimizer reports them, with one search
/// trace per cluster.
pub fn generate_sample_payload(clusters: usize, stops: usize) -> GraphPayload {
	let clusters = clusters.max(1);
	let mut nodes = vec![json!({
		"id": "restaurant",
		"name": "Sabor Express - Centro",
		"kind": "restaurant",
		"x": 400,
		"y": 300,
		"cluster": 0
	})];
	let mut edges = Vec::new();
	let mut traces = serde_json::Map::new();

	for c in 1..=clusters {
		let center = format!("center_{}", c);
		nodes.push(json!({
			"id": center,
			"name": format!("Cluster {}", c),
			"kind": "cluster-center",
			"cluster": c
		}));
		edges.push(json!({"source": "restaurant", "target": center, "kind": "cluster-link"}));

		let members: Vec<usize> = (0..stops).filter(|i| i % clusters + 1 == c).collect();
		let mut previous = "restaurant".to_string();
		let mut steps = Vec::new();
		for (step, &i) in members.iter().enumerate() {
			let id = format!("stop_{}", i + 1);
			nodes.push(json!({
				"id": id,
				"name": format!("Delivery #{}", i + 1),
				"kind": "delivery-stop",
				"cluster": c,
				"payload": {
					"id": i + 1,
					"address": format!("{}, {}", STREETS[i % STREETS.len()], 100 + i * 37),
					"value": ORDER_VALUES[i % ORDER_VALUES.len()],
					"courier": format!("Courier {}", c)
				}
			}));
			edges.push(json!({"source": center, "target": id, "kind": "cluster-member"}));
			let meters = (800.0 + rand_simple(i) * 2400.0).round();
			edges.push(json!({
				"source": previous,
				"target": id,
				"kind": "optimized-route",
				"weight": meters
			}));
			let kind = if step + 1 == members.len() { "goal" } else { "expand" };
			let (g, h) = (step as f64 * 1.5, meters / 1000.0);
			let closed: Vec<String> = members[..step].iter().map(|j| format!("stop_{}", j + 1)).collect();
			steps.push(json!({
				"kind": kind,
				"currentNode": previous,
				"open": [[id, g, g + h]],
				"closed": closed
			}));
			previous = id;
		}
		traces.insert(format!("cluster_{}", c), Value::Array(steps));
	}

	GraphPayload::Json(json!({
		"nodes": nodes,
		"edges": edges,
		"animations": traces
	}))
}

/// Test-data view: the dashboard graph fed with generated deliveries.
#[component]
pub fn Sample() -> impl IntoView {
	let graph_data = Signal::derive(move || generate_sample_payload(3, 12));

	view! {
		<div class="fullscreen-graph">
			<RouteGraphCanvas data=graph_data config=GraphConfig::default() fullscreen=true />
			<div class="graph-overlay">
				<h1>"Route graph (test data)"</h1>
				<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
			</div>
		</div>
	}
}
