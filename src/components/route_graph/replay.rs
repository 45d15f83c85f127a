//! Timed playback of an externally computed path-search trace.
//!
//! The replay is advanced by the animation loop rather than by its own
//! timer, so it never outlives the graph it draws on. Each run hands out a
//! [`ReplayHandle`]; cancelling the handle stops the run at the next tick.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use super::types::{Edge, NodeId, SearchStep};

pub const NO_STEPS: &str = "no steps available";
pub const NO_TRACES: &str = "no replay data available";
pub const FINISHED: &str = "Search replay finished.";
pub const CANCELLED: &str = "Search replay stopped.";

#[derive(Clone, Debug, Default)]
pub struct ReplayHandle(Rc<Cell<bool>>);

impl ReplayHandle {
	pub fn cancel(&self) {
		self.0.set(true);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.get()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayProgress {
	Running,
	Finished,
	Cancelled,
}

pub struct Replay {
	steps: Vec<SearchStep>,
	/// Index of the step on screen.
	current: usize,
	elapsed: f64,
	interval: f64,
	handle: ReplayHandle,
	open: HashSet<NodeId>,
	status: String,
	progress: ReplayProgress,
}

impl Replay {
	/// Start at the first step. An empty trace finishes immediately.
	pub fn start(steps: Vec<SearchStep>, interval: f64) -> (Self, ReplayHandle) {
		let handle = ReplayHandle::default();
		let mut replay = Self {
			steps,
			current: 0,
			elapsed: 0.0,
			interval,
			handle: handle.clone(),
			open: HashSet::new(),
			status: NO_STEPS.to_string(),
			progress: ReplayProgress::Finished,
		};
		if !replay.steps.is_empty() {
			replay.progress = ReplayProgress::Running;
			replay.show(0);
		}
		(replay, handle)
	}

	fn show(&mut self, index: usize) {
		let step = &self.steps[index];
		self.current = index;
		self.status = step.to_string();
		self.open = step.open.iter().cloned().collect();
	}

	pub fn advance(&mut self, dt: f64) -> ReplayProgress {
		if self.progress != ReplayProgress::Running {
			return self.progress;
		}
		if self.handle.is_cancelled() {
			self.progress = ReplayProgress::Cancelled;
			self.status = CANCELLED.to_string();
			self.open.clear();
			return self.progress;
		}
		self.elapsed += dt;
		while self.elapsed >= self.interval {
			self.elapsed -= self.interval;
			if self.current + 1 < self.steps.len() {
				self.show(self.current + 1);
			} else {
				self.progress = ReplayProgress::Finished;
				self.status = FINISHED.to_string();
				break;
			}
		}
		self.progress
	}

	pub fn progress(&self) -> ReplayProgress {
		self.progress
	}

	pub fn status(&self) -> &str {
		&self.status
	}

	pub fn current_step(&self) -> Option<&SearchStep> {
		self.steps.get(self.current)
	}

	/// Whether an edge touches the open set of the step on screen.
	pub fn emphasizes(&self, edge: &Edge) -> bool {
		self.open.contains(&edge.source) || self.open.contains(&edge.target)
	}

	/// Whether the replay currently drives edge emphasis.
	pub fn is_highlighting(&self) -> bool {
		self.progress != ReplayProgress::Cancelled && !self.steps.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::route_graph::types::EdgeKind;

	fn step(current: &str, open: &[&str]) -> SearchStep {
		SearchStep {
			kind: "expand".into(),
			current: Some(current.into()),
			open: open.iter().map(|s| s.to_string()).collect(),
			closed: vec![],
		}
	}

	#[test]
	fn empty_trace_finishes_immediately() {
		let (mut replay, _) = Replay::start(vec![], 0.55);
		assert_eq!(replay.status(), "no steps available");
		assert_eq!(replay.progress(), ReplayProgress::Finished);
		assert_eq!(replay.advance(10.0), ReplayProgress::Finished);
		assert!(!replay.is_highlighting());
	}

	#[test]
	fn steps_advance_on_the_interval() {
		let (mut replay, _) = Replay::start(vec![step("a", &["b"]), step("b", &["c"])], 0.5);
		assert_eq!(replay.current_step().and_then(|s| s.current.as_deref()), Some("a"));
		assert!(replay.emphasizes(&Edge::new("x", "b", EdgeKind::Plain)));

		assert_eq!(replay.advance(0.3), ReplayProgress::Running);
		assert_eq!(replay.current_step().and_then(|s| s.current.as_deref()), Some("a"));

		assert_eq!(replay.advance(0.3), ReplayProgress::Running);
		assert_eq!(replay.current_step().and_then(|s| s.current.as_deref()), Some("b"));
		assert!(replay.status().starts_with("Step: expand | Current: b"));
		assert!(!replay.emphasizes(&Edge::new("x", "b", EdgeKind::Plain)));
		assert!(replay.emphasizes(&Edge::new("c", "y", EdgeKind::Plain)));

		assert_eq!(replay.advance(0.5), ReplayProgress::Finished);
		assert_eq!(replay.status(), FINISHED);
	}

	#[test]
	fn cancelled_handle_stops_the_run() {
		let (mut replay, handle) = Replay::start(vec![step("a", &["b"]), step("b", &[])], 0.5);
		handle.cancel();
		assert_eq!(replay.advance(0.1), ReplayProgress::Cancelled);
		assert_eq!(replay.status(), CANCELLED);
		assert!(!replay.emphasizes(&Edge::new("b", "z", EdgeKind::Plain)));
		assert_eq!(replay.advance(5.0), ReplayProgress::Cancelled);
	}
}
