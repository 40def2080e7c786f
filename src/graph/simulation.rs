//! The iterative layout behind the canvas.
//!
//! The engine only relies on the [`LayoutOracle`] contract: seed it, tick it until
//! its energy settles, read positions back. [`ForceLayout`] fulfils it with the
//! `force_graph` spring simulation.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::config::{GraphConfig, SimulationConfig};
use super::layout::{LayoutState, Position};
use super::model::GraphEdge;

const NODE_MASS: f32 = 10.0;
const SPAWN_RADIUS: f64 = 100.0;

/// Iterative layout driven by the engine one tick at a time.
pub trait LayoutOracle {
	/// Replace whatever was running with a fresh simulation over `seeds`.
	fn start(&mut self, seeds: &[(&str, Option<Position>)], edges: &[GraphEdge]);
	/// Advance by `dt` seconds and return the energy left in the system.
	fn tick(&mut self, dt: f32) -> f32;
	/// Current position of every node.
	fn positions(&self) -> LayoutState;
	/// Fix a node in place, e.g. while the user drags it.
	fn pin(&mut self, id: &str, position: Position);
	/// Halt the run, keeping positions.
	fn stop(&mut self);
	/// Whether a run is in progress.
	fn is_running(&self) -> bool;
}

/// [`LayoutOracle`] over a `force_graph` simulation.
pub struct ForceLayout {
	params: SimulationConfig,
	graph: ForceGraph<String, ()>,
	index: HashMap<String, DefaultNodeIdx>,
	running: bool,
}

impl ForceLayout {
	/// Idle layout with the given force parameters.
	pub fn new(params: SimulationConfig) -> Self {
		Self {
			graph: ForceGraph::new(parameters(&params)),
			params,
			index: HashMap::new(),
			running: false,
		}
	}

	/// Nodes in the current run.
	pub fn node_count(&self) -> usize {
		self.index.len()
	}
}

impl Default for ForceLayout {
	fn default() -> Self {
		Self::new(SimulationConfig::default())
	}
}

fn parameters(params: &SimulationConfig) -> SimulationParameters {
	SimulationParameters {
		force_charge: params.force_charge,
		force_spring: params.force_spring,
		force_max: params.force_max,
		node_speed: params.node_speed,
		damping_factor: params.damping_factor,
	}
}

/// Spawn points for unseeded nodes: a ring around the centroid of the seeded ones.
fn spawn_points(seeds: &[(&str, Option<Position>)]) -> Vec<Position> {
	let seeded: Vec<Position> = seeds.iter().filter_map(|(_, p)| *p).collect();
	let (cx, cy) = if seeded.is_empty() {
		(0.0, 0.0)
	} else {
		let n = seeded.len() as f64;
		(
			seeded.iter().map(|p| p.x).sum::<f64>() / n,
			seeded.iter().map(|p| p.y).sum::<f64>() / n,
		)
	};
	let missing = seeds.iter().filter(|(_, p)| p.is_none()).count();
	(0..missing)
		.map(|i| {
			let angle = (i as f64) * 2.0 * PI / missing as f64;
			Position::new(cx + SPAWN_RADIUS * angle.cos(), cy + SPAWN_RADIUS * angle.sin())
		})
		.collect()
}

impl LayoutOracle for ForceLayout {
	fn start(&mut self, seeds: &[(&str, Option<Position>)], edges: &[GraphEdge]) {
		self.graph = ForceGraph::new(parameters(&self.params));
		self.index.clear();

		let mut spawn = spawn_points(seeds).into_iter();
		for &(id, seed) in seeds {
			let Some(position) = seed.or_else(|| spawn.next()) else {
				continue;
			};
			let idx = self.graph.add_node(NodeData {
				x: position.x as f32,
				y: position.y as f32,
				mass: NODE_MASS,
				is_anchor: false,
				user_data: id.to_string(),
			});
			self.index.insert(id.to_string(), idx);
		}

		for edge in edges {
			if let (Some(&src), Some(&tgt)) = (self.index.get(&edge.source), self.index.get(&edge.target)) {
				self.graph.add_edge(src, tgt, EdgeData::default());
			}
		}
		self.running = true;
		debug!("layout started with {} nodes", self.index.len());
	}

	fn tick(&mut self, dt: f32) -> f32 {
		if !self.running || self.index.is_empty() {
			return 0.0;
		}
		let mut before = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			before.insert(node.index(), (node.x(), node.y()));
		});

		self.graph.update(dt);

		let mut moved = 0.0f32;
		self.graph.visit_nodes(|node| {
			if let Some(&(x, y)) = before.get(&node.index()) {
				let (dx, dy) = (node.x() - x, node.y() - y);
				moved += (dx * dx + dy * dy).sqrt();
			}
		});
		moved / self.index.len() as f32
	}

	fn positions(&self) -> LayoutState {
		let mut state = LayoutState::default();
		self.graph.visit_nodes(|node| {
			state.set(
				node.data.user_data.clone(),
				Position::new(node.x() as f64, node.y() as f64),
			);
		});
		state
	}

	fn pin(&mut self, id: &str, position: Position) {
		let Some(&idx) = self.index.get(id) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = position.x as f32;
				node.data.y = position.y as f32;
				node.data.is_anchor = true;
			}
		});
	}

	fn stop(&mut self) {
		if self.running {
			debug!("layout stopped");
		}
		self.running = false;
	}

	fn is_running(&self) -> bool {
		self.running
	}
}

/// One-shot convergence detector for a single build cycle.
#[derive(Clone, Debug)]
pub struct Convergence {
	threshold: f32,
	min_ticks: u32,
	max_ticks: u32,
	ticks: u32,
	reported: bool,
}

impl Convergence {
	/// Detector with thresholds from `config`.
	pub fn new(config: &GraphConfig) -> Self {
		Self {
			threshold: config.convergence_threshold,
			min_ticks: config.min_ticks,
			max_ticks: config.max_ticks.max(config.min_ticks),
			ticks: 0,
			reported: false,
		}
	}

	/// Re-arm for a new build cycle.
	pub fn reset(&mut self) {
		self.ticks = 0;
		self.reported = false;
	}

	/// Ticks observed this cycle.
	pub fn ticks(&self) -> u32 {
		self.ticks
	}

	/// Feed one tick's energy. Returns `true` exactly once per cycle, on the first
	/// tick at which the layout counts as settled.
	pub fn observe(&mut self, energy: f32) -> bool {
		if self.reported {
			return false;
		}
		self.ticks += 1;
		let settled = self.ticks >= self.min_ticks && energy < self.threshold;
		if settled || self.ticks >= self.max_ticks {
			self.reported = true;
		}
		self.reported
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::model::EdgeKind;

	#[test]
	fn seeded_nodes_start_where_they_were() {
		let mut layout = ForceLayout::default();
		let seeds = [("a", Some(Position::new(40.0, -20.0))), ("b", None), ("c", None)];
		layout.start(&seeds, &[GraphEdge::new("a", "b", EdgeKind::Doc)]);

		let positions = layout.positions();
		assert_eq!(positions.len(), 3);
		assert_eq!(positions.get("a"), Some(Position::new(40.0, -20.0)));
		let b = positions.get("b").unwrap();
		assert!(((b.x - 40.0).powi(2) + (b.y + 20.0).powi(2)).sqrt() > 50.0);
	}

	#[test]
	fn pinned_nodes_hold_still() {
		let mut layout = ForceLayout::default();
		let seeds = [("a", None), ("b", None)];
		layout.start(&seeds, &[GraphEdge::new("a", "b", EdgeKind::Doc)]);
		layout.pin("a", Position::new(5.0, 5.0));
		for _ in 0..10 {
			layout.tick(0.016);
		}
		assert_eq!(layout.positions().get("a"), Some(Position::new(5.0, 5.0)));
	}

	#[test]
	fn stopped_layout_has_no_energy() {
		let mut layout = ForceLayout::default();
		layout.start(&[("a", None), ("b", None)], &[]);
		assert!(layout.is_running());
		layout.stop();
		assert!(!layout.is_running());
		assert_eq!(layout.tick(0.016), 0.0);
	}

	#[test]
	fn convergence_reports_once() {
		let config = GraphConfig {
			min_ticks: 3,
			max_ticks: 100,
			convergence_threshold: 0.5,
			..GraphConfig::default()
		};
		let mut convergence = Convergence::new(&config);
		assert!(!convergence.observe(0.1));
		assert!(!convergence.observe(0.1));
		assert!(convergence.observe(0.1));
		assert!(!convergence.observe(0.0));

		convergence.reset();
		assert_eq!(convergence.ticks(), 0);
		assert!(!convergence.observe(9.0));
	}

	#[test]
	fn convergence_gives_up_at_max_ticks() {
		let config = GraphConfig {
			min_ticks: 1,
			max_ticks: 4,
			..GraphConfig::default()
		};
		let mut convergence = Convergence::new(&config);
		let reports: Vec<bool> = (0..6).map(|_| convergence.observe(100.0)).collect();
		assert_eq!(reports, vec![false, false, false, true, false, false]);
	}
}
