//! Adapter from the routing payload to the canonical [`GraphData`].
//!
//! The optimizer has shipped two naming schemes for the same document
//! (`nodes`/`edges` and `nos`/`arestas`). Both are folded into one shape
//! here; nothing downstream sees the raw keys.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde_json::{Map, Value};

use super::theme::GraphTheme;
use super::types::{Bounds, Edge, EdgeKind, GraphData, Node, NodeDetails, NodeKind, SearchStep, Vec2};
use crate::error::GraphError;

const NODE_KEYS: &[&str] = &["nodes", "nos"];
const EDGE_KEYS: &[&str] = &["edges", "links", "arestas"];
const TRACE_KEYS: &[&str] = &["animations", "animacoes"];

/// Margin kept free when scattering nodes without coordinates.
const SCATTER_MARGIN: f64 = 50.0;

/// Raw routing document as received from the page or a JS caller.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphPayload {
	Json(Value),
	/// Input that could not be read at all. Normalizes to an empty graph
	/// that reports this error.
	Invalid(GraphError),
}

impl Default for GraphPayload {
	fn default() -> Self {
		GraphPayload::Json(Value::Null)
	}
}

impl GraphPayload {
	pub fn from_json_str(raw: &str) -> Result<Self, GraphError> {
		Ok(GraphPayload::Json(serde_json::from_str(raw)?))
	}

	/// Like [`GraphPayload::from_json_str`], but keeps a parse failure as
	/// an [`GraphPayload::Invalid`] payload instead of returning it.
	pub fn parse(raw: &str) -> Self {
		Self::from_json_str(raw).unwrap_or_else(|err| {
			warn!("{}", err);
			GraphPayload::Invalid(err)
		})
	}
}

impl From<Value> for GraphPayload {
	fn from(value: Value) -> Self {
		GraphPayload::Json(value)
	}
}

impl From<GraphError> for GraphPayload {
	fn from(err: GraphError) -> Self {
		GraphPayload::Invalid(err)
	}
}

pub type Traces = BTreeMap<String, Vec<SearchStep>>;

/// Output of [`normalize`]. `problem` is set when the payload was unusable
/// and the graph was replaced by an empty one.
#[derive(Clone, Debug, Default)]
pub struct Normalized {
	pub graph: GraphData,
	pub traces: Option<Traces>,
	pub problem: Option<GraphError>,
}

fn first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
	keys.iter()
		.filter_map(|k| obj.get(*k))
		.find(|v| !v.is_null())
}

fn id_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}

fn text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
	first(obj, keys).and_then(id_string)
}

fn number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
	first(obj, keys).and_then(Value::as_f64)
}

/// Top-level `x`/`y`, or the `position` object written by the exporter.
fn coordinates(obj: &Map<String, Value>) -> Option<Vec2> {
	let point = |o: &Map<String, Value>| Some(Vec2::new(number(o, &["x"])?, number(o, &["y"])?));
	point(obj).or_else(|| first(obj, &["position"]).and_then(Value::as_object).and_then(point))
}

fn details(raw: Option<&Value>) -> NodeDetails {
	let Some(obj) = raw.and_then(Value::as_object) else {
		return NodeDetails::default();
	};
	NodeDetails {
		order_id: text(obj, &["id", "order_id"]),
		address: text(obj, &["address", "endereco"]),
		value: number(obj, &["value", "valor"]),
		courier: text(obj, &["courier", "entregador"]),
	}
}

fn node(
	i: usize,
	raw: &Value,
	bounds: Bounds,
	unit: &mut impl FnMut() -> f64,
) -> Node {
	let empty = Map::new();
	let obj = raw.as_object().unwrap_or(&empty);

	let id = text(obj, &["id"]).unwrap_or_else(|| {
		warn!("node #{} has no id, using a generated one", i);
		format!("node-{}", i)
	});
	let kind = text(obj, &["kind", "tipo", "type"])
		.map(|k| NodeKind::parse(&k))
		.unwrap_or(NodeKind::DeliveryStop);

	let supplied = coordinates(obj);
	let position = supplied.unwrap_or_else(|| {
		let usable_w = (bounds.width - 2.0 * SCATTER_MARGIN).max(0.0);
		let usable_h = (bounds.height - 2.0 * SCATTER_MARGIN).max(0.0);
		Vec2::new(
			SCATTER_MARGIN + unit() * usable_w,
			SCATTER_MARGIN + unit() * usable_h,
		)
	});

	let mut node = Node::new(id, kind, position);
	node.name = text(obj, &["name", "nome"]);
	node.cluster = text(obj, &["cluster"]);
	node.details = details(first(obj, &["payload", "dados", "data", "details"]));

	if kind == NodeKind::Restaurant {
		let home = supplied.unwrap_or_else(|| bounds.center());
		node.position = home;
		node.pinned = Some(home);
		node.anchor = Some(home);
	}
	node
}

fn edge(raw: &Value, default_weight: f64) -> Edge {
	let empty = Map::new();
	let obj = raw.as_object().unwrap_or(&empty);
	let kind = text(obj, &["kind", "tipo", "type"])
		.map(|k| EdgeKind::parse(&k))
		.unwrap_or(EdgeKind::Plain);
	let mut edge = Edge::new(
		text(obj, &["source"]).unwrap_or_default(),
		text(obj, &["target"]).unwrap_or_default(),
		kind,
	);
	edge.weight = number(obj, &["weight", "peso", "distancia_metros", "distance_meters"])
		.filter(|w| *w != 0.0)
		.unwrap_or(default_weight);
	edge
}

/// Open and closed sets hold either bare ids or `[id, g, f]` tuples.
fn id_list(raw: Option<&Value>) -> Vec<String> {
	raw.and_then(Value::as_array)
		.map(|items| {
			items
				.iter()
				.filter_map(|item| match item {
					Value::Array(tuple) => tuple.first().and_then(id_string),
					other => id_string(other),
				})
				.collect()
		})
		.unwrap_or_default()
}

fn search_step(raw: &Value) -> SearchStep {
	let empty = Map::new();
	let obj = raw.as_object().unwrap_or(&empty);
	SearchStep {
		kind: text(obj, &["kind", "tipo"]).unwrap_or_default(),
		current: text(obj, &["currentNode", "current", "no_atual"]),
		open: id_list(obj.get("open")),
		closed: id_list(obj.get("closed")),
	}
}

fn traces(obj: &Map<String, Value>) -> Option<Traces> {
	let raw = first(obj, TRACE_KEYS)?.as_object()?;
	Some(
		raw.iter()
			.map(|(key, steps)| {
				let steps = steps
					.as_array()
					.map(|s| s.iter().map(search_step).collect())
					.unwrap_or_default();
				(key.clone(), steps)
			})
			.collect(),
	)
}

/// Fold a routing payload into canonical nodes and edges.
///
/// Never fails: unusable input is logged and produces an empty graph with
/// `problem` set. The payload itself is not modified.
pub fn normalize(
	payload: &GraphPayload,
	bounds: Bounds,
	theme: &GraphTheme,
	unit: &mut impl FnMut() -> f64,
) -> Normalized {
	let value = match payload {
		GraphPayload::Json(value) => value,
		GraphPayload::Invalid(err) => {
			warn!("unreadable graph payload, showing an empty graph: {}", err);
			return Normalized {
				problem: Some(err.clone()),
				..Default::default()
			};
		}
	};
	let Some(obj) = value.as_object() else {
		warn!("graph payload is not an object, showing an empty graph");
		return Normalized {
			problem: Some(GraphError::MissingNodes),
			..Default::default()
		};
	};

	let raw_nodes = match first(obj, NODE_KEYS) {
		Some(Value::Array(items)) => items,
		Some(_) => {
			let err = GraphError::Payload("node list is not an array".into());
			warn!("{}", err);
			return Normalized {
				problem: Some(err),
				..Default::default()
			};
		}
		None => {
			warn!("{}", GraphError::MissingNodes);
			return Normalized {
				traces: traces(obj),
				problem: Some(GraphError::MissingNodes),
				..Default::default()
			};
		}
	};
	let raw_edges = first(obj, EDGE_KEYS)
		.and_then(Value::as_array)
		.map(Vec::as_slice)
		.unwrap_or_default();

	let nodes: Vec<Node> = raw_nodes
		.iter()
		.enumerate()
		.map(|(i, raw)| node(i, raw, bounds, &mut *unit))
		.collect();
	let edges: Vec<Edge> = raw_edges
		.iter()
		.map(|raw| edge(raw, theme.default_edge_weight))
		.collect();

	debug!("normalized graph: {} nodes, {} edges", nodes.len(), edges.len());

	Normalized {
		graph: GraphData::new(nodes, edges),
		traces: traces(obj),
		problem: None,
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;
	use serde_json::json;

	use super::*;

	fn seeded() -> impl FnMut() -> f64 {
		let mut state = 7u64;
		move || {
			state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
			(state >> 11) as f64 / (1u64 << 53) as f64
		}
	}

	fn run(payload: Value) -> Normalized {
		normalize(
			&GraphPayload::Json(payload),
			Bounds::new(800.0, 600.0),
			&GraphTheme::classic(),
			&mut seeded(),
		)
	}

	#[test]
	fn english_payload() {
		let out = run(json!({
			"nodes": [
				{"id": "R", "kind": "restaurant", "x": 400, "y": 300},
				{"id": "D1", "kind": "delivery-stop", "cluster": 1},
				{"id": "D2", "kind": "delivery-stop", "cluster": 1}
			],
			"edges": [
				{"source": "R", "target": "D1", "kind": "optimized-route"},
				{"source": "R", "target": "D2"}
			]
		}));
		assert!(out.problem.is_none());
		assert_eq!(out.graph.nodes.len(), 3);
		assert_eq!(out.graph.edges.len(), 2);
		let r = out.graph.node("R").expect("restaurant");
		assert_eq!(r.pinned, Some(Vec2::new(400.0, 300.0)));
		assert_eq!(out.graph.node("D1").and_then(|n| n.cluster.as_deref()), Some("1"));
		assert_eq!(out.graph.edges[0].kind, EdgeKind::OptimizedRoute);
		assert_eq!(out.graph.edges[1].kind, EdgeKind::Plain);
	}

	#[test]
	fn portuguese_payload() {
		let out = run(json!({
			"nos": [
				{"id": "restaurante", "tipo": "restaurante", "nome": "Restaurante"},
				{"id": "entrega_5", "tipo": "entrega", "cluster": 2,
				 "dados": {"id": 5, "endereco": "Rua A, 10", "valor": 42.5, "entregador": "Ana"}}
			],
			"arestas": [{"source": "restaurante", "target": "entrega_5", "tipo": "cluster_link", "peso": 300}],
			"animacoes": {"cluster_1": [{"tipo": "expandir", "no_atual": 5, "open": [[6, 1.0, 2.0]], "closed": [5]}]}
		}));
		let r = out.graph.node("restaurante").expect("restaurant");
		// no coordinates: pinned at the canvas center
		assert_eq!(r.pinned, Some(Vec2::new(400.0, 300.0)));
		assert_eq!(r.display_name(), "Restaurante");

		let d = out.graph.node("entrega_5").expect("stop");
		assert_eq!(d.details.address.as_deref(), Some("Rua A, 10"));
		assert_eq!(d.details.value, Some(42.5));
		assert_eq!(d.details.courier.as_deref(), Some("Ana"));
		assert_eq!(d.details.order_id.as_deref(), Some("5"));
		assert_eq!(out.graph.edges[0].weight, 300.0);

		let traces = out.traces.expect("traces");
		let step = &traces["cluster_1"][0];
		assert_eq!(step.current.as_deref(), Some("5"));
		assert_eq!(step.open, vec!["6".to_string()]);
		assert_eq!(step.closed, vec!["5".to_string()]);
	}

	#[test]
	fn missing_coordinates_are_scattered_inside_bounds() {
		let out = run(json!({"nodes": [{"id": 1}, {"id": 2}, {"id": 3}]}));
		for node in &out.graph.nodes {
			assert!(node.pinned.is_none());
			assert!((50.0..=750.0).contains(&node.position.x));
			assert!((50.0..=550.0).contains(&node.position.y));
		}
	}

	#[test]
	fn only_restaurants_start_pinned() {
		let out = run(json!({"nodes": [
			{"id": "a", "kind": "restaurant", "x": 1, "y": 2},
			{"id": "b", "kind": "cluster-center", "x": 3, "y": 4},
			{"id": "c", "x": 5, "y": 6}
		]}));
		let pinned: Vec<_> = out.graph.nodes.iter().map(|n| n.pinned.is_some()).collect();
		assert_eq!(pinned, vec![true, false, false]);
	}

	#[test]
	fn missing_nodes_is_an_empty_graph() {
		let out = run(json!({"edges": [{"source": "a", "target": "b"}]}));
		assert!(out.graph.is_empty());
		assert!(out.graph.edges.is_empty());
		assert!(matches!(out.problem, Some(GraphError::MissingNodes)));

		let out = run(Value::Null);
		assert!(matches!(out.problem, Some(GraphError::MissingNodes)));

		let out = run(json!({"nodes": "nope"}));
		assert!(matches!(out.problem, Some(GraphError::Payload(_))));
	}

	#[test]
	fn duplicates_and_dangling_edges_pass_through() {
		let out = run(json!({
			"nodes": [{"id": "a"}, {"id": "a"}],
			"links": [{"source": "a", "target": "zz"}, {"source": "a", "target": "a"}]
		}));
		assert_eq!(out.graph.nodes.len(), 2);
		assert_eq!(out.graph.edges.len(), 2);
	}

	#[test]
	fn edge_weight_defaults_follow_theme() {
		let payload = GraphPayload::Json(json!({"nodes": [], "edges": [{"source": "a", "target": "b"}]}));
		let bounds = Bounds::new(800.0, 600.0);
		let classic = normalize(&payload, bounds, &GraphTheme::classic(), &mut seeded());
		let vivid = normalize(&payload, bounds, &GraphTheme::vivid(), &mut seeded());
		assert_eq!(classic.graph.edges[0].weight, 0.0);
		assert_eq!(vivid.graph.edges[0].weight, 1.0);
	}

	#[test]
	fn input_is_not_mutated() {
		let raw = json!({"nodes": [{"id": "a", "kind": "restaurant"}]});
		let payload = GraphPayload::Json(raw.clone());
		let _ = normalize(&payload, Bounds::new(10.0, 10.0), &GraphTheme::classic(), &mut seeded());
		assert_eq!(payload, GraphPayload::Json(raw));
	}

	#[test]
	fn unparsable_text_reports_the_parse_error() {
		let payload = GraphPayload::parse("{bad json");
		assert!(matches!(payload, GraphPayload::Invalid(GraphError::Payload(_))));
		let out = normalize(&payload, Bounds::new(800.0, 600.0), &GraphTheme::classic(), &mut seeded());
		assert!(out.graph.is_empty());
		assert!(out.traces.is_none());
		assert!(matches!(out.problem, Some(GraphError::Payload(_))));
	}

	#[test]
	fn exported_position_and_details_are_read_back() {
		let out = run(json!({"nodes": [{
			"id": "d",
			"kind": "delivery-stop",
			"position": {"x": 300.0, "y": 310.0},
			"details": {"order_id": "7", "address": "Rua A"}
		}]}));
		let d = &out.graph.nodes[0];
		assert_eq!(d.position, Vec2::new(300.0, 310.0));
		assert_eq!(d.details.order_id.as_deref(), Some("7"));
		assert_eq!(d.details.address.as_deref(), Some("Rua A"));
	}

	const KINDS: [&str; 7] = [
		"restaurant",
		"restaurante",
		"delivery-stop",
		"entrega",
		"cluster-center",
		"unknown",
		"",
	];

	fn arb_node() -> impl Strategy<Value = Value> {
		(
			0usize..6,
			0..KINDS.len(),
			proptest::option::of((0.0f64..800.0, 0.0f64..600.0)),
			proptest::option::of(0u8..4),
		)
			.prop_map(|(id, kind, xy, cluster)| {
				let mut node = json!({"id": format!("n{}", id), "kind": KINDS[kind]});
				if let Some((x, y)) = xy {
					node["x"] = json!(x);
					node["y"] = json!(y);
				}
				if let Some(c) = cluster {
					node["cluster"] = json!(c);
				}
				node
			})
	}

	fn arb_edge() -> impl Strategy<Value = Value> {
		(0usize..8, 0usize..8, proptest::option::of(0.0f64..5000.0)).prop_map(|(s, t, w)| {
			let mut edge = json!({"source": format!("n{}", s), "target": format!("n{}", t)});
			if let Some(w) = w {
				edge["weight"] = json!(w);
			}
			edge
		})
	}

	proptest! {
		#[test]
		fn counts_match_input_lengths(
			nodes in proptest::collection::vec(arb_node(), 0..30),
			edges in proptest::collection::vec(arb_edge(), 0..40),
			portuguese in any::<bool>(),
		) {
			let (nk, ek) = if portuguese { ("nos", "arestas") } else { ("nodes", "edges") };
			let out = run(json!({(nk): nodes.clone(), (ek): edges.clone()}));
			prop_assert!(out.problem.is_none());
			prop_assert_eq!(out.graph.nodes.len(), nodes.len());
			prop_assert_eq!(out.graph.edges.len(), edges.len());
		}

		#[test]
		fn restaurants_are_pinned_at_their_home(
			nodes in proptest::collection::vec(arb_node(), 0..30),
		) {
			let bounds = Bounds::new(800.0, 600.0);
			let out = run(json!({"nodes": nodes.clone()}));
			for (raw, node) in nodes.iter().zip(&out.graph.nodes) {
				let is_restaurant = matches!(raw["kind"].as_str(), Some("restaurant" | "restaurante"));
				prop_assert_eq!(node.is_restaurant(), is_restaurant);
				if is_restaurant {
					let home = match (raw["x"].as_f64(), raw["y"].as_f64()) {
						(Some(x), Some(y)) => Vec2::new(x, y),
						_ => bounds.center(),
					};
					prop_assert_eq!(node.pinned, Some(home));
					prop_assert_eq!(node.anchor, Some(home));
					prop_assert_eq!(node.position, home);
				} else {
					prop_assert!(node.pinned.is_none());
				}
			}
		}
	}
}
