use std::f64::consts::PI;

use super::theme::GraphTheme;
use super::types::{Bounds, Node, NodeKind, Vec2};

/// Cluster key for nodes without a cluster.
pub const DEFAULT_CLUSTER: &str = "0";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutKind {
	/// Only restaurants are pinned; the simulation places everything else.
	#[default]
	Free,
	Grid,
	Cluster,
}

impl LayoutKind {
	/// Energy injected so the switch animates.
	pub fn reheat_alpha(self) -> f64 {
		match self {
			LayoutKind::Free | LayoutKind::Grid => 0.8,
			LayoutKind::Cluster => 0.7,
		}
	}
}

pub fn grid_columns(count: usize) -> usize {
	((count.max(1) as f64).sqrt().ceil() as usize).max(1)
}

/// Cell centers of a `ceil(sqrt(n))`-column grid spanning the bounds.
pub fn grid_positions(count: usize, bounds: Bounds) -> Vec<Vec2> {
	let cols = grid_columns(count);
	let (cw, ch) = (bounds.width / cols as f64, bounds.height / cols as f64);
	(0..count)
		.map(|i| {
			let (col, row) = (i % cols, i / cols);
			Vec2::new(col as f64 * cw + cw / 2.0, row as f64 * ch + ch / 2.0)
		})
		.collect()
}

/// Node indices grouped by cluster, groups in order of first appearance.
pub fn cluster_groups(nodes: &[Node]) -> Vec<(String, Vec<usize>)> {
	let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
	for (i, node) in nodes.iter().enumerate() {
		let key = node.cluster.as_deref().unwrap_or(DEFAULT_CLUSTER);
		match groups.iter_mut().find(|(k, _)| k == key) {
			Some((_, members)) => members.push(i),
			None => groups.push((key.to_string(), vec![i])),
		}
	}
	groups
}

/// Centroid of the `index`-th of `count` groups on the ring around the center.
pub fn cluster_centroid(index: usize, count: usize, bounds: Bounds, radius: f64) -> Vec2 {
	let angle = index as f64 * 2.0 * PI / count.max(1) as f64;
	bounds.center() + Vec2::new(angle.cos(), angle.sin()) * radius
}

/// Radial cluster placement. Cluster centers sit on their centroid and the
/// remaining members are spread evenly on a small ring around it.
pub fn cluster_positions(nodes: &[Node], bounds: Bounds, theme: &GraphTheme) -> Vec<Vec2> {
	let mut positions = vec![bounds.center(); nodes.len()];
	let groups = cluster_groups(nodes);
	for (gi, (_, members)) in groups.iter().enumerate() {
		let centroid = cluster_centroid(gi, groups.len(), bounds, theme.cluster_ring_radius);
		let ring: Vec<usize> = members
			.iter()
			.copied()
			.filter(|&i| nodes[i].kind != NodeKind::ClusterCenter)
			.collect();
		for &i in members {
			if nodes[i].kind == NodeKind::ClusterCenter {
				positions[i] = centroid;
			}
		}
		for (j, &i) in ring.iter().enumerate() {
			let angle = j as f64 * 2.0 * PI / ring.len() as f64;
			positions[i] = centroid + Vec2::new(angle.cos(), angle.sin()) * theme.member_ring_radius;
		}
	}
	positions
}

/// Pin nodes for a deterministic layout. `Free` releases every node except
/// restaurants, which go back to their home coordinate.
pub fn apply(kind: LayoutKind, nodes: &mut [Node], bounds: Bounds, theme: &GraphTheme) {
	let targets = match kind {
		LayoutKind::Free => {
			for node in nodes.iter_mut() {
				node.pinned = if node.is_restaurant() {
					node.anchor.or(node.pinned)
				} else {
					None
				};
			}
			return;
		}
		LayoutKind::Grid => grid_positions(nodes.len(), bounds),
		LayoutKind::Cluster => cluster_positions(nodes, bounds, theme),
	};
	for (node, target) in nodes.iter_mut().zip(targets) {
		node.pinned = Some(target);
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use proptest::prelude::*;

	use super::*;

	fn stops(clusters: &[Option<&str>]) -> Vec<Node> {
		clusters
			.iter()
			.enumerate()
			.map(|(i, c)| {
				let mut n = Node::new(format!("n{}", i), NodeKind::DeliveryStop, Vec2::ZERO);
				n.cluster = c.map(str::to_string);
				n
			})
			.collect()
	}

	#[test]
	fn grid_columns_are_ceil_sqrt() {
		assert_eq!(grid_columns(0), 1);
		assert_eq!(grid_columns(1), 1);
		assert_eq!(grid_columns(4), 2);
		assert_eq!(grid_columns(5), 3);
		assert_eq!(grid_columns(10), 4);
	}

	#[test]
	fn grid_layout_pins_everything_including_restaurants() {
		let mut nodes = stops(&[None, None, None]);
		nodes[0].kind = NodeKind::Restaurant;
		nodes[0].anchor = Some(Vec2::new(1.0, 1.0));
		nodes[0].pinned = nodes[0].anchor;
		let bounds = Bounds::new(300.0, 300.0);
		apply(LayoutKind::Grid, &mut nodes, bounds, &GraphTheme::classic());
		assert!(nodes.iter().all(|n| n.pinned.is_some()));
		assert_eq!(nodes[0].pinned, Some(Vec2::new(75.0, 75.0)));

		apply(LayoutKind::Free, &mut nodes, bounds, &GraphTheme::classic());
		assert_eq!(nodes[0].pinned, Some(Vec2::new(1.0, 1.0)));
		assert!(nodes[1].pinned.is_none());
	}

	#[test]
	fn clusterless_nodes_share_the_default_group() {
		let nodes = stops(&[Some("2"), None, Some("1"), None, Some("2")]);
		let groups = cluster_groups(&nodes);
		let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(keys, vec!["2", "0", "1"]);
		assert_eq!(groups[0].1, vec![0, 4]);
		assert_eq!(groups[1].1, vec![1, 3]);
	}

	#[test]
	fn cluster_centers_sit_on_their_centroid() {
		let mut nodes = stops(&[Some("1"), Some("1"), Some("2")]);
		nodes[1].kind = NodeKind::ClusterCenter;
		let bounds = Bounds::new(800.0, 600.0);
		let theme = GraphTheme::classic();
		let positions = cluster_positions(&nodes, bounds, &theme);
		assert_eq!(positions[1], cluster_centroid(0, 2, bounds, theme.cluster_ring_radius));
		assert!((positions[0].distance(positions[1]) - theme.member_ring_radius).abs() < 1e-9);
	}

	proptest! {
		#[test]
		fn grid_cells_are_distinct(n in 0usize..200, w in 50.0f64..2000.0, h in 50.0f64..2000.0) {
			let bounds = Bounds::new(w, h);
			let cols = grid_columns(n);
			let (cw, ch) = (w / cols as f64, h / cols as f64);
			let cells: HashSet<(i64, i64)> = grid_positions(n, bounds)
				.iter()
				.map(|p| ((p.x / cw).floor() as i64, (p.y / ch).floor() as i64))
				.collect();
			prop_assert_eq!(cells.len(), n);
			prop_assert!(cells.iter().all(|&(c, _)| (c as usize) < cols));
		}

		#[test]
		fn clusters_stay_near_equally_spaced_centroids(
			clusters in proptest::collection::vec(proptest::option::of(0u8..6), 1..60)
		) {
			let labels: Vec<Option<String>> = clusters.iter().map(|c| c.map(|c| c.to_string())).collect();
			let refs: Vec<Option<&str>> = labels.iter().map(|c| c.as_deref()).collect();
			let nodes = stops(&refs);
			let bounds = Bounds::new(800.0, 600.0);
			let theme = GraphTheme::classic();
			let positions = cluster_positions(&nodes, bounds, &theme);
			let groups = cluster_groups(&nodes);

			for (gi, (_, members)) in groups.iter().enumerate() {
				let centroid = cluster_centroid(gi, groups.len(), bounds, theme.cluster_ring_radius);
				prop_assert!((centroid.distance(bounds.center()) - theme.cluster_ring_radius).abs() < 1e-9);
				for &i in members {
					prop_assert!(positions[i].distance(centroid) <= theme.member_ring_radius + 1e-9);
				}
			}
			if groups.len() > 1 {
				let step = 2.0 * PI / groups.len() as f64;
				for gi in 0..groups.len() {
					let a = cluster_centroid(gi, groups.len(), bounds, 1.0) - bounds.center();
					let expected = gi as f64 * step;
					prop_assert!((a.x - expected.cos()).abs() < 1e-9 && (a.y - expected.sin()).abs() < 1e-9);
				}
			}
		}
	}
}
