//! Force-directed relaxation over the shared node list.
//!
//! Follows the d3-force model: a global `alpha` scales every velocity
//! nudge and decays toward `alpha_target` each tick. Keeping the target
//! above `alpha_min` leaves a small amount of motion alive so the graph
//! reacts to drags; dropping it to zero lets the layout come to rest.

use log::debug;

use super::theme::GraphTheme;
use super::types::{Bounds, GraphData, Node, Vec2};

#[derive(Clone, Debug, PartialEq)]
struct Link {
	source: usize,
	target: usize,
	distance: f64,
	strength: f64,
	/// Share of the correction applied to the target end.
	bias: f64,
}

pub struct Simulation {
	alpha: f64,
	alpha_min: f64,
	alpha_decay: f64,
	alpha_target: f64,
	idle_target: f64,
	drag_target: f64,
	velocity_decay: f64,
	charge_strength: f64,
	charge_distance_max: Option<f64>,
	link_strength: Option<f64>,
	collide_iterations: usize,
	center: Vec2,
	links: Vec<Link>,
	degree: Vec<usize>,
	radii: Vec<f64>,
	running: bool,
	jiggle_state: u32,
}

impl Simulation {
	pub fn new(graph: &GraphData, bounds: Bounds, theme: &GraphTheme) -> Self {
		let mut degree = vec![0usize; graph.nodes.len()];
		let mut resolved = Vec::with_capacity(graph.edges.len());
		for edge in &graph.edges {
			match graph.resolve_strict(edge) {
				Some((s, t)) => {
					degree[s] += 1;
					degree[t] += 1;
					resolved.push((s, t, theme.link_distance(edge)));
				}
				None => debug!(
					"edge {} -> {} references an unknown node, skipped by the link force",
					edge.source, edge.target
				),
			}
		}

		let mut sim = Self {
			alpha: theme.alpha_start,
			alpha_min: theme.alpha_min,
			alpha_decay: theme.alpha_decay,
			alpha_target: theme.alpha_idle_target,
			idle_target: theme.alpha_idle_target,
			drag_target: theme.alpha_drag_target,
			velocity_decay: theme.velocity_decay,
			charge_strength: theme.charge_strength,
			charge_distance_max: theme.charge_distance_max,
			link_strength: theme.link_strength,
			collide_iterations: theme.collide_iterations,
			center: bounds.center(),
			links: resolved
				.into_iter()
				.map(|(source, target, distance)| Link {
					source,
					target,
					distance,
					strength: 0.0,
					bias: 0.0,
				})
				.collect(),
			degree,
			radii: graph
				.nodes
				.iter()
				.map(|n| theme.node_style(n.kind).collide_radius)
				.collect(),
			running: true,
			jiggle_state: 1,
		};
		sim.refresh_link_strengths();
		sim
	}

	fn refresh_link_strengths(&mut self) {
		for link in &mut self.links {
			let (ds, dt) = (
				self.degree[link.source].max(1) as f64,
				self.degree[link.target].max(1) as f64,
			);
			link.bias = ds / (ds + dt);
			link.strength = self.link_strength.unwrap_or(1.0 / ds.min(dt));
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Inject energy and resume ticking.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = alpha;
		self.running = true;
	}

	/// Raise the energy floor while a node is being dragged.
	pub fn begin_interaction(&mut self) {
		self.alpha_target = self.drag_target;
		self.running = true;
	}

	pub fn end_interaction(&mut self) {
		self.alpha_target = self.idle_target;
	}

	pub fn set_center(&mut self, center: Vec2) {
		self.center = center;
	}

	pub fn charge_strength(&self) -> f64 {
		self.charge_strength
	}

	pub fn set_charge_strength(&mut self, strength: f64) {
		self.charge_strength = strength;
		self.reheat(0.3);
	}

	pub fn set_link_strength(&mut self, strength: f64) {
		self.link_strength = Some(strength);
		self.refresh_link_strengths();
		self.reheat(0.3);
	}

	/// Advance one step. Returns `false` once the simulation has cooled
	/// below `alpha_min` and stopped.
	pub fn tick(&mut self, nodes: &mut [Node]) -> bool {
		if !self.running {
			return false;
		}
		// rebuilt graphs always come with a fresh simulation
		debug_assert_eq!(nodes.len(), self.radii.len());

		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

		self.apply_charge(nodes);
		self.apply_links(nodes);
		self.apply_center(nodes);
		self.apply_collide(nodes);

		let keep = 1.0 - self.velocity_decay;
		for node in nodes.iter_mut() {
			match node.pinned {
				Some(pin) => {
					node.position = pin;
					node.velocity = Vec2::ZERO;
				}
				None => {
					node.velocity = node.velocity * keep;
					node.position = node.position + node.velocity;
				}
			}
		}

		if self.alpha < self.alpha_min {
			self.running = false;
		}
		true
	}

	/// Tiny deterministic offset used to split coincident nodes.
	fn jiggle(&mut self) -> f64 {
		self.jiggle_state = self.jiggle_state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		(f64::from(self.jiggle_state) / f64::from(u32::MAX) - 0.5) * 1e-6
	}

	fn apply_charge(&mut self, nodes: &mut [Node]) {
		let max2 = self.charge_distance_max.map(|d| d * d).unwrap_or(f64::INFINITY);
		let scale = self.charge_strength * self.alpha;
		for i in 0..nodes.len() {
			let mut dv = Vec2::ZERO;
			for j in 0..nodes.len() {
				if i == j {
					continue;
				}
				let mut d = nodes[j].position - nodes[i].position;
				if d.x == 0.0 {
					d.x = self.jiggle();
				}
				if d.y == 0.0 {
					d.y = self.jiggle();
				}
				let mut l2 = d.x * d.x + d.y * d.y;
				if l2 >= max2 {
					continue;
				}
				// d3's distanceMin of 1
				if l2 < 1.0 {
					l2 = l2.sqrt();
				}
				dv = dv + d * (scale / l2);
			}
			nodes[i].velocity = nodes[i].velocity + dv;
		}
	}

	fn apply_links(&mut self, nodes: &mut [Node]) {
		for li in 0..self.links.len() {
			let link = self.links[li].clone();
			let (s, t) = (&nodes[link.source], &nodes[link.target]);
			let mut d = (t.position + t.velocity) - (s.position + s.velocity);
			if d.x == 0.0 {
				d.x = self.jiggle();
			}
			if d.y == 0.0 {
				d.y = self.jiggle();
			}
			let l = d.length();
			let k = (l - link.distance) / l * self.alpha * link.strength;
			let d = d * k;
			nodes[link.target].velocity = nodes[link.target].velocity - d * link.bias;
			nodes[link.source].velocity = nodes[link.source].velocity + d * (1.0 - link.bias);
		}
	}

	fn apply_center(&self, nodes: &mut [Node]) {
		if nodes.is_empty() {
			return;
		}
		let n = nodes.len() as f64;
		let sum = nodes.iter().fold(Vec2::ZERO, |acc, node| acc + node.position);
		let shift = sum * (1.0 / n) - self.center;
		for node in nodes.iter_mut() {
			node.position = node.position - shift;
		}
	}

	fn apply_collide(&mut self, nodes: &mut [Node]) {
		for _ in 0..self.collide_iterations {
			for i in 0..nodes.len() {
				for j in (i + 1)..nodes.len() {
					let (ri, rj) = (self.radii[i], self.radii[j]);
					let r = ri + rj;
					let pi = nodes[i].position + nodes[i].velocity;
					let pj = nodes[j].position + nodes[j].velocity;
					let mut d = pi - pj;
					let l2 = d.x * d.x + d.y * d.y;
					if l2 >= r * r {
						continue;
					}
					if d.x == 0.0 {
						d.x = self.jiggle();
					}
					if d.y == 0.0 {
						d.y = self.jiggle();
					}
					let l = d.length();
					let d = d * ((r - l) / l);
					let w = (rj * rj) / (ri * ri + rj * rj);
					nodes[i].velocity = nodes[i].velocity + d * w;
					nodes[j].velocity = nodes[j].velocity - d * (1.0 - w);
				}
			}
		}
	}
}
