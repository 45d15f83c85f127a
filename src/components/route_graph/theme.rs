use serde::{Deserialize, Serialize};

use super::types::{Edge, EdgeKind, NodeKind};

#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	pub radius: f64,
	pub fill: &'static str,
	pub stroke: &'static str,
	pub stroke_width: f64,
	pub font_px: f64,
	/// Radius used by the collision force.
	pub collide_radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: &'static str,
	pub width: f64,
	pub opacity: f64,
	pub dash: Option<(f64, f64)>,
	/// Preferred link length when the edge carries no weight.
	pub distance: f64,
}

/// Link length from an edge weight: heavier edges sit closer, down to a floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedDistance {
	pub base: f64,
	pub divisor: f64,
	pub floor: f64,
}

/// Layout picked right after a (re)build.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InitialLayout {
	Free,
	/// Cluster layout above the threshold node count, grid otherwise.
	Auto { cluster_above: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemePreset {
	#[default]
	Classic,
	Vivid,
}

/// Every visual and physics constant of the graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphTheme {
	pub background: &'static str,
	pub label_color: &'static str,
	pub restaurant: NodeStyle,
	pub delivery_stop: NodeStyle,
	pub cluster_center: NodeStyle,
	pub optimized_route: EdgeStyle,
	pub cluster_link: EdgeStyle,
	pub cluster_member: EdgeStyle,
	pub plain: EdgeStyle,
	pub weighted_distance: Option<WeightedDistance>,
	pub default_edge_weight: f64,

	pub charge_strength: f64,
	pub charge_distance_max: Option<f64>,
	/// `None` keeps the degree-based default strength.
	pub link_strength: Option<f64>,
	pub collide_iterations: usize,
	pub alpha_start: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub alpha_idle_target: f64,
	pub alpha_drag_target: f64,
	pub velocity_decay: f64,

	pub initial_layout: InitialLayout,
	pub cluster_ring_radius: f64,
	pub member_ring_radius: f64,

	pub filtered_node_opacity: f64,
	pub filtered_edge_opacity: f64,
}

fn d3_alpha_decay(alpha_min: f64) -> f64 {
	1.0 - alpha_min.powf(1.0 / 300.0)
}

impl GraphTheme {
	pub fn from_preset(preset: ThemePreset) -> Self {
		match preset {
			ThemePreset::Classic => Self::classic(),
			ThemePreset::Vivid => Self::vivid(),
		}
	}

	/// Light dashboard look with gentle physics.
	pub fn classic() -> Self {
		let edge = |color, width, opacity| EdgeStyle {
			color,
			width,
			opacity,
			dash: None,
			distance: 80.0,
		};
		Self {
			background: "#f8f9fa",
			label_color: "#222222",
			restaurant: NodeStyle {
				radius: 14.0,
				fill: "#DC143C",
				stroke: "#ffffff",
				stroke_width: 1.8,
				font_px: 10.0,
				collide_radius: 18.0,
			},
			delivery_stop: NodeStyle {
				radius: 7.0,
				fill: "#1E90FF",
				stroke: "#ffffff",
				stroke_width: 1.8,
				font_px: 10.0,
				collide_radius: 10.0,
			},
			cluster_center: NodeStyle {
				radius: 11.0,
				fill: "#FFD700",
				stroke: "#ffffff",
				stroke_width: 1.8,
				font_px: 10.0,
				collide_radius: 10.0,
			},
			optimized_route: edge("#2E8B57", 2.6, 0.8),
			cluster_link: edge("#A9A9A9", 1.2, 0.8),
			cluster_member: edge("#A9A9A9", 1.2, 0.8),
			plain: edge("#A9A9A9", 1.2, 0.8),
			weighted_distance: Some(WeightedDistance {
				base: 120.0,
				divisor: 10.0,
				floor: 20.0,
			}),
			default_edge_weight: 0.0,
			charge_strength: -60.0,
			charge_distance_max: None,
			link_strength: None,
			collide_iterations: 2,
			alpha_start: 1.0,
			alpha_min: 0.001,
			alpha_decay: d3_alpha_decay(0.001),
			alpha_idle_target: 0.01,
			alpha_drag_target: 0.3,
			velocity_decay: 0.4,
			initial_layout: InitialLayout::Auto { cluster_above: 8 },
			cluster_ring_radius: 200.0,
			member_ring_radius: 40.0,
			filtered_node_opacity: 0.12,
			filtered_edge_opacity: 0.08,
		}
	}

	/// Dark, high-contrast look with a stronger, looser layout.
	pub fn vivid() -> Self {
		Self {
			background: "#1a1a2e",
			label_color: "#ffffff",
			restaurant: NodeStyle {
				radius: 25.0,
				fill: "#ff0000",
				stroke: "#ffffff",
				stroke_width: 4.0,
				font_px: 16.0,
				collide_radius: 30.0,
			},
			delivery_stop: NodeStyle {
				radius: 12.0,
				fill: "#0066ff",
				stroke: "#ffffff",
				stroke_width: 4.0,
				font_px: 11.0,
				collide_radius: 30.0,
			},
			cluster_center: NodeStyle {
				radius: 18.0,
				fill: "#ffff00",
				stroke: "#ffffff",
				stroke_width: 4.0,
				font_px: 14.0,
				collide_radius: 30.0,
			},
			optimized_route: EdgeStyle {
				color: "#00ff00",
				width: 5.0,
				opacity: 0.9,
				dash: None,
				distance: 150.0,
			},
			cluster_link: EdgeStyle {
				color: "#ff00ff",
				width: 3.0,
				opacity: 0.6,
				dash: None,
				distance: 200.0,
			},
			cluster_member: EdgeStyle {
				color: "#aaaaaa",
				width: 1.0,
				opacity: 0.3,
				dash: Some((4.0, 4.0)),
				distance: 80.0,
			},
			plain: EdgeStyle {
				color: "#666666",
				width: 2.0,
				opacity: 0.5,
				dash: None,
				distance: 100.0,
			},
			weighted_distance: None,
			default_edge_weight: 1.0,
			charge_strength: -500.0,
			charge_distance_max: Some(600.0),
			link_strength: Some(0.8),
			collide_iterations: 1,
			alpha_start: 0.5,
			alpha_min: 0.001,
			alpha_decay: 0.02,
			alpha_idle_target: 0.0,
			alpha_drag_target: 0.3,
			velocity_decay: 0.4,
			initial_layout: InitialLayout::Free,
			cluster_ring_radius: 200.0,
			member_ring_radius: 40.0,
			filtered_node_opacity: 0.12,
			filtered_edge_opacity: 0.08,
		}
	}

	pub fn node_style(&self, kind: NodeKind) -> &NodeStyle {
		match kind {
			NodeKind::Restaurant => &self.restaurant,
			NodeKind::DeliveryStop => &self.delivery_stop,
			NodeKind::ClusterCenter => &self.cluster_center,
		}
	}

	pub fn edge_style(&self, kind: EdgeKind) -> &EdgeStyle {
		match kind {
			EdgeKind::OptimizedRoute => &self.optimized_route,
			EdgeKind::ClusterLink => &self.cluster_link,
			EdgeKind::ClusterMember => &self.cluster_member,
			EdgeKind::Plain => &self.plain,
		}
	}

	pub fn link_distance(&self, edge: &Edge) -> f64 {
		match self.weighted_distance {
			Some(w) if edge.weight > 0.0 => (w.base - edge.weight / w.divisor).max(w.floor),
			_ => self.edge_style(edge.kind).distance,
		}
	}
}

impl Default for GraphTheme {
	fn default() -> Self {
		Self::classic()
	}
}
