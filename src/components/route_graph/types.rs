use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

pub type NodeId = String;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
	pub x: f64,
	pub y: f64,
}

impl Vec2 {
	pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn length(self) -> f64 {
		(self.x * self.x + self.y * self.y).sqrt()
	}

	pub fn distance(self, other: Vec2) -> f64 {
		(self - other).length()
	}
}

impl Add for Vec2 {
	type Output = Vec2;

	fn add(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Vec2 {
	type Output = Vec2;

	fn sub(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Vec2 {
	type Output = Vec2;

	fn mul(self, rhs: f64) -> Vec2 {
		Vec2::new(self.x * rhs, self.y * rhs)
	}
}

/// Drawing area in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub width: f64,
	pub height: f64,
}

impl Bounds {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn center(&self) -> Vec2 {
		Vec2::new(self.width / 2.0, self.height / 2.0)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
	Restaurant,
	DeliveryStop,
	ClusterCenter,
}

impl NodeKind {
	pub const ALL: [NodeKind; 3] = [
		NodeKind::Restaurant,
		NodeKind::DeliveryStop,
		NodeKind::ClusterCenter,
	];

	/// Accepts both the English and the Portuguese spelling used by the
	/// routing backend. Unknown kinds are treated as plain delivery stops.
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"restaurant" | "restaurante" => NodeKind::Restaurant,
			"cluster-center" | "cluster_center" | "cluster_centro" => NodeKind::ClusterCenter,
			_ => NodeKind::DeliveryStop,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			NodeKind::Restaurant => "Restaurant",
			NodeKind::DeliveryStop => "Delivery stop",
			NodeKind::ClusterCenter => "Cluster center",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
	OptimizedRoute,
	ClusterLink,
	ClusterMember,
	Plain,
}

impl EdgeKind {
	pub const ALL: [EdgeKind; 4] = [
		EdgeKind::OptimizedRoute,
		EdgeKind::ClusterLink,
		EdgeKind::ClusterMember,
		EdgeKind::Plain,
	];

	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"optimized-route" | "optimized_route" | "rota_otimizada" => EdgeKind::OptimizedRoute,
			"cluster-link" | "cluster_link" => EdgeKind::ClusterLink,
			"cluster-member" | "cluster_member" => EdgeKind::ClusterMember,
			_ => EdgeKind::Plain,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			EdgeKind::OptimizedRoute => "Optimized route",
			EdgeKind::ClusterLink => "Cluster link",
			EdgeKind::ClusterMember => "Cluster member",
			EdgeKind::Plain => "Link",
		}
	}

	/// Edges that only exist to draw the clustering.
	pub fn is_cluster_edge(self) -> bool {
		matches!(self, EdgeKind::ClusterLink | EdgeKind::ClusterMember)
	}
}

/// Display-only data attached to a node. Layout code never reads it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDetails {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub courier: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	pub id: NodeId,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	pub kind: NodeKind,
	pub position: Vec2,
	#[serde(skip)]
	pub velocity: Vec2,
	/// Fixed coordinate overriding the simulation.
	pub pinned: Option<Vec2>,
	/// Home coordinate of restaurants, restored when the view is reset.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub anchor: Option<Vec2>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cluster: Option<String>,
	#[serde(default)]
	pub details: NodeDetails,
}

impl Node {
	pub fn new(id: impl Into<NodeId>, kind: NodeKind, position: Vec2) -> Self {
		Self {
			id: id.into(),
			name: None,
			kind,
			position,
			velocity: Vec2::ZERO,
			pinned: None,
			anchor: None,
			cluster: None,
			details: NodeDetails::default(),
		}
	}

	pub fn is_restaurant(&self) -> bool {
		self.kind == NodeKind::Restaurant
	}

	pub fn display_name(&self) -> &str {
		self.name.as_deref().unwrap_or("Node")
	}

	/// Numeric cluster index, when the cluster id is a number.
	pub fn cluster_index(&self) -> Option<f64> {
		self.cluster.as_deref().and_then(|c| c.parse::<f64>().ok())
	}

	/// Short text drawn on top of the node.
	pub fn label(&self) -> String {
		match self.kind {
			NodeKind::Restaurant => "\u{1F3E0}".to_string(),
			NodeKind::ClusterCenter => format!("C{}", self.cluster.as_deref().unwrap_or("?")),
			NodeKind::DeliveryStop => {
				format!("#{}", self.details.order_id.as_deref().unwrap_or("?"))
			}
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
	pub source: NodeId,
	pub target: NodeId,
	pub kind: EdgeKind,
	pub weight: f64,
}

impl Edge {
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, kind: EdgeKind) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			kind,
			weight: 0.0,
		}
	}

	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}
}

/// Canonical node/edge lists shared by the simulation and the renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GraphData {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	#[serde(skip)]
	index: HashMap<NodeId, usize>,
}

impl GraphData {
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		let mut index = HashMap::with_capacity(nodes.len());
		for (i, node) in nodes.iter().enumerate() {
			// duplicates pass through; the first occurrence owns the id
			index.entry(node.id.clone()).or_insert(i);
		}
		Self {
			nodes,
			edges,
			index,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	/// Endpoint indices of an edge. Dangling references fall back to the
	/// first node so drawing never fails; `None` only for an empty graph.
	pub fn resolve(&self, edge: &Edge) -> Option<(usize, usize)> {
		if self.nodes.is_empty() {
			return None;
		}
		let source = self.index_of(&edge.source).unwrap_or(0);
		let target = self.index_of(&edge.target).unwrap_or(0);
		Some((source, target))
	}

	/// Like [`GraphData::resolve`] but without the fallback.
	pub fn resolve_strict(&self, edge: &Edge) -> Option<(usize, usize)> {
		Some((self.index_of(&edge.source)?, self.index_of(&edge.target)?))
	}
}

/// One entry of an externally computed path-search trace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStep {
	pub kind: String,
	pub current: Option<NodeId>,
	pub open: Vec<NodeId>,
	pub closed: Vec<NodeId>,
}

impl fmt::Display for SearchStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Step: {} | Current: {} | Open: {} | Closed: {}",
			self.kind,
			self.current.as_deref().unwrap_or("-"),
			self.open.len(),
			self.closed.len()
		)
	}
}
