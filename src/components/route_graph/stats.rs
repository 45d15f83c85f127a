use std::collections::HashSet;

use super::types::GraphData;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GraphStats {
	pub nodes: usize,
	pub edges: usize,
	pub clusters: usize,
	pub density: f64,
}

impl GraphStats {
	pub fn compute(graph: &GraphData) -> Self {
		let (nodes, edges) = (graph.nodes.len(), graph.edges.len());
		let clusters = graph
			.nodes
			.iter()
			.filter(|n| n.cluster_index().is_some_and(|c| c > 0.0))
			.filter_map(|n| n.cluster.as_deref())
			.collect::<HashSet<_>>()
			.len();
		Self {
			nodes,
			edges,
			clusters,
			density: density(nodes, edges),
		}
	}

	pub fn density_label(&self) -> String {
		format!("{:.3}", self.density)
	}
}

/// `edges / (n * (n - 1) / 2)`, zero below two nodes.
pub fn density(nodes: usize, edges: usize) -> f64 {
	if nodes < 2 {
		return 0.0;
	}
	let n = nodes as f64;
	edges as f64 / (n * (n - 1.0) / 2.0)
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::route_graph::types::{Edge, EdgeKind, Node, NodeKind, Vec2};

	#[test]
	fn delivery_example() {
		let mut d1 = Node::new("D1", NodeKind::DeliveryStop, Vec2::ZERO);
		d1.cluster = Some("1".into());
		let mut d2 = Node::new("D2", NodeKind::DeliveryStop, Vec2::ZERO);
		d2.cluster = Some("1".into());
		let graph = GraphData::new(
			vec![Node::new("R", NodeKind::Restaurant, Vec2::ZERO), d1, d2],
			vec![
				Edge::new("R", "D1", EdgeKind::OptimizedRoute),
				Edge::new("R", "D2", EdgeKind::Plain),
			],
		);
		let stats = GraphStats::compute(&graph);
		assert_eq!((stats.nodes, stats.edges, stats.clusters), (3, 2, 1));
		assert_eq!(stats.density_label(), "0.667");
	}

	#[test]
	fn only_positive_cluster_numbers_are_counted() {
		let nodes = ["0", "1", "1", "2", "-3", "north"]
			.iter()
			.enumerate()
			.map(|(i, c)| {
				let mut n = Node::new(format!("n{}", i), NodeKind::DeliveryStop, Vec2::ZERO);
				n.cluster = Some(c.to_string());
				n
			})
			.chain(std::iter::once(Node::new("r", NodeKind::Restaurant, Vec2::ZERO)))
			.collect();
		let stats = GraphStats::compute(&GraphData::new(nodes, Vec::new()));
		assert_eq!(stats.clusters, 2);
	}

	#[test]
	fn empty_graph_has_zero_density() {
		let stats = GraphStats::compute(&GraphData::default());
		assert_eq!(stats, GraphStats::default());
		assert_eq!(density(1, 5), 0.0);
	}

	proptest! {
		#[test]
		fn density_is_zero_only_without_edges(n in 2usize..500, e in 0usize..1000) {
			let d = density(n, e);
			prop_assert!(d >= 0.0);
			prop_assert_eq!(d == 0.0, e == 0);
		}
	}
}
