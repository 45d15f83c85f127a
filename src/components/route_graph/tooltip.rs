use super::types::Node;

/// Pointer offset so the tooltip does not sit under the cursor.
const OFFSET_X: f64 = 12.0;
const OFFSET_Y: f64 = -12.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub left: f64,
	pub top: f64,
	pub title: String,
	pub rows: Vec<(&'static str, String)>,
}

impl Tooltip {
	/// `pointer` is relative to the graph container.
	pub fn for_node(node: &Node, pointer: (f64, f64)) -> Self {
		let mut rows = vec![
			("Kind", node.kind.label().to_string()),
			("Cluster", node.cluster.clone().unwrap_or_else(|| "-".into())),
		];
		let details = &node.details;
		if let Some(address) = &details.address {
			rows.push(("Address", address.clone()));
		}
		if let Some(value) = details.value {
			rows.push(("Value", format!("{:.2}", value)));
		}
		if let Some(courier) = &details.courier {
			rows.push(("Courier", courier.clone()));
		}
		Self {
			left: pointer.0 + OFFSET_X,
			top: pointer.1 + OFFSET_Y,
			title: node.display_name().to_string(),
			rows,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::route_graph::types::{NodeKind, Vec2};

	#[test]
	fn shows_only_available_fields() {
		let mut node = Node::new("d", NodeKind::DeliveryStop, Vec2::ZERO);
		node.name = Some("Order 5".into());
		node.details.value = Some(42.5);
		let tip = Tooltip::for_node(&node, (100.0, 50.0));
		assert_eq!(tip.title, "Order 5");
		assert_eq!((tip.left, tip.top), (112.0, 38.0));
		assert_eq!(
			tip.rows,
			vec![
				("Kind", "Delivery stop".to_string()),
				("Cluster", "-".to_string()),
				("Value", "42.50".to_string()),
			]
		);
	}

	#[test]
	fn unnamed_nodes_get_a_generic_title() {
		let node = Node::new("r", NodeKind::Restaurant, Vec2::ZERO);
		assert_eq!(Tooltip::for_node(&node, (0.0, 0.0)).title, "Node");
	}
}
