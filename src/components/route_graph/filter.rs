use std::collections::BTreeMap;

use super::theme::GraphTheme;
use super::types::{EdgeKind, NodeKind};

/// One legend entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
	Node(NodeKind),
	Edge(EdgeKind),
}

impl FilterKey {
	pub const ALL: [FilterKey; 7] = [
		FilterKey::Node(NodeKind::Restaurant),
		FilterKey::Node(NodeKind::DeliveryStop),
		FilterKey::Node(NodeKind::ClusterCenter),
		FilterKey::Edge(EdgeKind::OptimizedRoute),
		FilterKey::Edge(EdgeKind::ClusterLink),
		FilterKey::Edge(EdgeKind::ClusterMember),
		FilterKey::Edge(EdgeKind::Plain),
	];

	pub fn label(self) -> &'static str {
		match self {
			FilterKey::Node(kind) => kind.label(),
			FilterKey::Edge(kind) => kind.label(),
		}
	}

	/// Swatch color for the legend.
	pub fn swatch(self, theme: &GraphTheme) -> &'static str {
		match self {
			FilterKey::Node(kind) => theme.node_style(kind).fill,
			FilterKey::Edge(kind) => theme.edge_style(kind).color,
		}
	}
}

/// Visibility per kind. Filtering only fades elements; nothing is removed.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterState {
	visible: BTreeMap<FilterKey, bool>,
}

impl Default for FilterState {
	fn default() -> Self {
		Self {
			visible: FilterKey::ALL.iter().map(|&k| (k, true)).collect(),
		}
	}
}

impl FilterState {
	pub fn is_visible(&self, key: FilterKey) -> bool {
		self.visible.get(&key).copied().unwrap_or(true)
	}

	pub fn set(&mut self, key: FilterKey, visible: bool) {
		self.visible.insert(key, visible);
	}

	/// Flip a legend entry and return its new visibility.
	pub fn toggle(&mut self, key: FilterKey) -> bool {
		let visible = !self.is_visible(key);
		self.set(key, visible);
		visible
	}

	pub fn node_opacity(&self, kind: NodeKind, theme: &GraphTheme) -> f64 {
		if self.is_visible(FilterKey::Node(kind)) {
			1.0
		} else {
			theme.filtered_node_opacity
		}
	}

	pub fn edge_opacity(&self, kind: EdgeKind, theme: &GraphTheme) -> f64 {
		if self.is_visible(FilterKey::Edge(kind)) {
			theme.edge_style(kind).opacity
		} else {
			theme.filtered_edge_opacity
		}
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn everything_starts_visible() {
		let filter = FilterState::default();
		assert!(FilterKey::ALL.iter().all(|&k| filter.is_visible(k)));
	}

	#[test]
	fn hidden_kinds_fade_instead_of_disappearing() {
		let theme = GraphTheme::classic();
		let mut filter = FilterState::default();
		assert!(!filter.toggle(FilterKey::Node(NodeKind::DeliveryStop)));
		assert_eq!(filter.node_opacity(NodeKind::DeliveryStop, &theme), 0.12);
		assert_eq!(filter.node_opacity(NodeKind::Restaurant, &theme), 1.0);
		filter.set(FilterKey::Edge(EdgeKind::Plain), false);
		assert_eq!(filter.edge_opacity(EdgeKind::Plain, &theme), 0.08);
	}

	fn arb_key() -> impl Strategy<Value = FilterKey> {
		(0..FilterKey::ALL.len()).prop_map(|i| FilterKey::ALL[i])
	}

	proptest! {
		#[test]
		fn toggling_twice_restores_opacity(
			setup in proptest::collection::vec((arb_key(), any::<bool>()), 0..10),
			key in arb_key(),
		) {
			let theme = GraphTheme::vivid();
			let mut filter = FilterState::default();
			for (k, v) in setup {
				filter.set(k, v);
			}
			let before = filter.clone();
			filter.toggle(key);
			filter.toggle(key);
			prop_assert_eq!(&filter, &before);
			for kind in NodeKind::ALL {
				prop_assert_eq!(filter.node_opacity(kind, &theme), before.node_opacity(kind, &theme));
			}
			for kind in EdgeKind::ALL {
				prop_assert_eq!(filter.edge_opacity(kind, &theme), before.edge_opacity(kind, &theme));
			}
		}
	}
}
