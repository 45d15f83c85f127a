use log::{debug, info};

use super::config::{GraphConfig, ResizePolicy};
use super::export;
use super::filter::{FilterKey, FilterState};
use super::layout::{self, LayoutKind};
use super::normalize::{GraphPayload, Traces, normalize};
use super::replay::{self, Replay, ReplayHandle, ReplayProgress};
use super::simulation::Simulation;
use super::stats::GraphStats;
use super::theme::{GraphTheme, InitialLayout};
use super::tooltip::Tooltip;
use super::types::{Bounds, Edge, EdgeKind, GraphData, NodeKind, Vec2};
use crate::error::GraphError;

pub const HIT_SLOP: f64 = 4.0;
pub const ZOOM_MIN: f64 = 0.2;
pub const ZOOM_MAX: f64 = 4.0;
/// How long the optimized route stays emphasized.
pub const ROUTE_FLASH_SECS: f64 = 2.2;
/// Opacity factor for edges pushed to the background by a highlight.
const DIMMED: f64 = 0.15;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Vec2,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub pointer: (f64, f64),
}

/// Everything one graph view owns: the model, its simulation, the view
/// transform and the interaction state. Rebuilding replaces all of it.
pub struct RouteGraphState {
	pub graph: GraphData,
	pub traces: Option<Traces>,
	pub problem: Option<GraphError>,
	pub simulation: Simulation,
	pub theme: GraphTheme,
	pub config: GraphConfig,
	pub bounds: Bounds,
	pub layout: LayoutKind,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub filter: FilterState,
	pub show_labels: bool,
	pub show_clusters: bool,
	pub heat: bool,
	pub paused: bool,
	pub stats: GraphStats,
	replay: Option<Replay>,
	replay_handle: Option<ReplayHandle>,
	route_flash: f64,
	status: String,
}

impl RouteGraphState {
	pub fn new(
		payload: &GraphPayload,
		bounds: Bounds,
		config: GraphConfig,
		unit: &mut impl FnMut() -> f64,
	) -> Self {
		let theme = config.theme();
		let normalized = normalize(payload, bounds, &theme, unit);
		let simulation = Simulation::new(&normalized.graph, bounds, &theme);
		let stats = GraphStats::compute(&normalized.graph);

		let mut state = Self {
			graph: normalized.graph,
			traces: normalized.traces,
			problem: normalized.problem,
			simulation,
			theme,
			config,
			bounds,
			layout: LayoutKind::Free,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			filter: FilterState::default(),
			show_labels: true,
			show_clusters: true,
			heat: false,
			paused: false,
			stats,
			replay: None,
			replay_handle: None,
			route_flash: 0.0,
			status: String::new(),
		};
		if let InitialLayout::Auto { cluster_above } = state.theme.initial_layout {
			let kind = if state.graph.nodes.len() > cluster_above {
				LayoutKind::Cluster
			} else {
				LayoutKind::Grid
			};
			state.retarget(kind);
		}
		debug!(
			"graph built: {} nodes, {} edges, layout {:?}",
			state.stats.nodes, state.stats.edges, state.layout
		);
		state
	}

	/// Tear down the current graph and build a new one from `payload`.
	/// The running replay and simulation are stopped first; legend and
	/// visibility toggles carry over.
	pub fn rebuild(&mut self, payload: &GraphPayload, unit: &mut impl FnMut() -> f64) {
		self.cancel_replay();
		self.simulation.stop();
		let mut next = Self::new(payload, self.bounds, self.config.clone(), unit);
		next.filter = self.filter.clone();
		next.show_labels = self.show_labels;
		next.show_clusters = self.show_clusters;
		next.heat = self.heat;
		*self = next;
	}

	pub fn is_empty(&self) -> bool {
		self.graph.is_empty()
	}

	/// Advance the simulation, the replay and the route highlight by one frame.
	pub fn tick(&mut self, dt: f64) {
		if !self.paused {
			self.simulation.tick(&mut self.graph.nodes);
		}
		if let Some(replay) = self.replay.as_mut() {
			if replay.advance(dt) == ReplayProgress::Finished {
				self.replay_handle = None;
			}
		}
		self.route_flash = (self.route_flash - dt).max(0.0);
	}

	pub fn status(&self) -> &str {
		self.replay.as_ref().map(Replay::status).unwrap_or(self.status.as_str())
	}

	// layouts

	pub fn retarget(&mut self, kind: LayoutKind) {
		layout::apply(kind, &mut self.graph.nodes, self.bounds, &self.theme);
		self.layout = kind;
		self.simulation.reheat(kind.reheat_alpha());
	}

	pub fn reset_view(&mut self) {
		info!("resetting graph view");
		self.retarget(LayoutKind::Free);
		self.transform = ViewTransform::default();
		self.cancel_replay();
		self.replay = None;
		self.route_flash = 0.0;
		self.paused = false;
	}

	/// Pause the simulation, or resume it with fresh energy.
	pub fn toggle_simulation(&mut self) -> bool {
		self.paused = !self.paused;
		if !self.paused {
			self.simulation.reheat(0.8);
		}
		!self.paused
	}

	pub fn set_charge_strength(&mut self, strength: f64) {
		self.simulation.set_charge_strength(strength);
	}

	pub fn set_link_strength(&mut self, strength: f64) {
		self.simulation.set_link_strength(strength);
	}

	// coordinates and hit testing

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Vec2 {
		Vec2::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn is_node_shown(&self, idx: usize) -> bool {
		self.show_clusters || self.graph.nodes[idx].kind != NodeKind::ClusterCenter
	}

	pub fn is_edge_shown(&self, edge: &Edge) -> bool {
		self.show_clusters || !edge.kind.is_cluster_edge()
	}

	/// Topmost shown node under the pointer.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let p = self.screen_to_graph(sx, sy);
		self.graph
			.nodes
			.iter()
			.enumerate()
			.rev()
			.filter(|&(i, _)| self.is_node_shown(i))
			.find(|(_, node)| {
				let radius = self.theme.node_style(node.kind).radius + HIT_SLOP;
				node.position.distance(p) < radius
			})
			.map(|(i, _)| i)
	}

	// drag, pan and zoom

	pub fn begin_drag(&mut self, idx: usize, sx: f64, sy: f64) {
		let node = &mut self.graph.nodes[idx];
		node.pinned = Some(node.position);
		self.drag = DragState {
			active: true,
			node_idx: Some(idx),
			start_x: sx,
			start_y: sy,
			node_start: node.position,
		};
		self.simulation.begin_interaction();
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node_idx.filter(|_| self.drag.active) else {
			return;
		};
		let delta = Vec2::new(
			(sx - self.drag.start_x) / self.transform.k,
			(sy - self.drag.start_y) / self.transform.k,
		);
		let target = self.drag.node_start + delta;
		let node = &mut self.graph.nodes[idx];
		node.pinned = Some(target);
		node.position = target;
	}

	/// Release the dragged node. Restaurants, and nodes placed by a grid or
	/// cluster layout, stay where they were dropped.
	pub fn end_drag(&mut self) {
		if let Some(idx) = self.drag.node_idx.take() {
			let keep_pinned = self.layout != LayoutKind::Free;
			let node = &mut self.graph.nodes[idx];
			if !node.is_restaurant() && !keep_pinned {
				node.pinned = None;
			}
			self.simulation.end_interaction();
		}
		self.drag.active = false;
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	pub fn end_pointer(&mut self) {
		self.end_drag();
		self.pan.active = false;
	}

	/// Zoom around the pointer; a positive `delta_y` zooms out.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(ZOOM_MIN, ZOOM_MAX);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	// hover

	/// Update the hovered node and return the tooltip to show, if any.
	pub fn set_hover(&mut self, node: Option<usize>, pointer: (f64, f64)) -> Option<Tooltip> {
		self.hover = HoverState { node, pointer };
		self.tooltip()
	}

	pub fn tooltip(&self) -> Option<Tooltip> {
		let idx = self.hover.node?;
		Some(Tooltip::for_node(self.graph.nodes.get(idx)?, self.hover.pointer))
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
	}

	// filters and toggles

	pub fn toggle_filter(&mut self, key: FilterKey) -> bool {
		let visible = self.filter.toggle(key);
		info!("legend filter {:?} -> {}", key, visible);
		visible
	}

	pub fn set_show_labels(&mut self, show: bool) {
		self.show_labels = show;
	}

	pub fn set_show_clusters(&mut self, show: bool) {
		self.show_clusters = show;
		if !show && self.hover.node.is_some_and(|i| !self.is_node_shown(i)) {
			self.hover.node = None;
		}
	}

	pub fn toggle_heat(&mut self) -> bool {
		self.heat = !self.heat;
		self.heat
	}

	pub fn highlight_route(&mut self) {
		self.route_flash = ROUTE_FLASH_SECS;
	}

	pub fn node_alpha(&self, idx: usize) -> f64 {
		let node = &self.graph.nodes[idx];
		let base = self.filter.node_opacity(node.kind, &self.theme);
		if self.heat {
			let heat = (0.4 + node.cluster_index().unwrap_or(0.0) * 0.05).min(1.0);
			base * heat
		} else {
			base
		}
	}

	pub fn edge_alpha(&self, edge: &Edge) -> f64 {
		let mut alpha = self.filter.edge_opacity(edge.kind, &self.theme);
		if let Some(replay) = self.replay.as_ref().filter(|r| r.is_highlighting()) {
			alpha *= if replay.emphasizes(edge) { 1.0 } else { DIMMED };
		}
		if self.route_flash > 0.0 {
			let t = ease_out_cubic(self.route_flash / ROUTE_FLASH_SECS);
			let goal = if edge.kind == EdgeKind::OptimizedRoute {
				1.0
			} else {
				DIMMED
			};
			alpha += (goal - alpha) * t;
		}
		alpha
	}

	// replay

	/// Replay a search trace: the named one, or the first by key order.
	/// Any replay already running is cancelled first.
	pub fn start_replay(&mut self, key: Option<&str>) -> Option<ReplayHandle> {
		self.cancel_replay();
		let Some(traces) = self.traces.as_ref() else {
			self.replay = None;
			self.status = replay::NO_TRACES.to_string();
			info!("{}", replay::NO_TRACES);
			return None;
		};
		let steps = match key {
			Some(key) => traces.get(key).cloned(),
			None => traces.values().next().cloned(),
		}
		.unwrap_or_default();
		info!("replaying {} search steps", steps.len());

		let (replay, handle) = Replay::start(steps, self.config.replay_interval_secs());
		self.replay_handle = (replay.progress() == ReplayProgress::Running).then(|| handle.clone());
		self.replay = Some(replay);
		Some(handle)
	}

	pub fn cancel_replay(&mut self) {
		if let Some(handle) = self.replay_handle.take() {
			handle.cancel();
			if let Some(replay) = self.replay.as_mut() {
				replay.advance(0.0);
			}
		}
	}

	pub fn replay_progress(&self) -> Option<ReplayProgress> {
		self.replay.as_ref().map(Replay::progress)
	}

	// resize and export

	pub fn resize(&mut self, width: f64, height: f64) {
		let old_center = self.bounds.center();
		self.bounds = Bounds::new(width, height);
		if self.config.resize == ResizePolicy::Recenter {
			let shift = self.bounds.center() - old_center;
			for node in &mut self.graph.nodes {
				node.position = node.position + shift;
				node.pinned = node.pinned.map(|p| p + shift);
				node.anchor = node.anchor.map(|p| p + shift);
			}
			self.simulation.set_center(self.bounds.center());
		}
	}

	pub fn export_json(&self) -> Result<String, GraphError> {
		export::export_json(&self.graph)
	}
}
