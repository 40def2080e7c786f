use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use log::{info, warn};

use crate::graph::{
	DocStatus, FocusView, ForceLayout, GraphConfig, GraphEngine, GraphNode, GroupMode, NodeKind,
	PageCorpus, Position, TickStatus,
};
use crate::storage::LocalStorageStore;

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 12.0;
/// Pointer travel (screen px) under which a press counts as a click.
const CLICK_SLOP: f64 = 3.0;

pub type BrowserEngine = GraphEngine<LocalStorageStore, ForceLayout>;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Option<Position>,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Focus highlighting. The hovered node wins over the selected one; the last
/// focus is kept while the highlight fades out.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	pub hovered: Option<String>,
	pub selected: Option<String>,
	pub focus: FocusView,
	pub prev_focus: FocusView,
	pub highlight_t: f64,
	delay_t: f64,
}

pub struct GraphViewState {
	pub engine: BrowserEngine,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub highlight: HighlightState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl GraphViewState {
	pub fn new(project_id: &str, corpus: PageCorpus, mode: GroupMode, width: f64, height: f64) -> Self {
		let config = GraphConfig::default();
		let oracle = ForceLayout::new(config.simulation.clone());
		let mut engine = GraphEngine::new(project_id, config, LocalStorageStore::new(), oracle);
		engine.set_group_mode(mode);
		engine.set_corpus(corpus);

		Self {
			engine,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			width,
			height,
			flow_time: 0.0,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let positions = self.engine.positions();
		self.engine
			.rendered()
			.nodes
			.iter()
			.rev()
			.find(|node| {
				positions.get(&node.id).is_some_and(|p| {
					let (dx, dy) = (p.x - gx, p.y - gy);
					// HIT_RADIUS is in world-space, scales with zoom like nodes
					(dx * dx + dy * dy).sqrt() < HIT_RADIUS.max(node_radius(node))
				})
			})
			.map(|node| node.id.clone())
	}

	pub fn set_hover(&mut self, node: Option<String>) {
		if self.highlight.hovered == node {
			return;
		}
		if self.highlight.hovered.is_none() && node.is_some() {
			self.highlight.delay_t = 0.0;
		}
		self.highlight.hovered = node;
		self.refocus();
	}

	/// Select a node (or clear the selection) as the persistent focus. A member of
	/// a collapsed group selects the group.
	pub fn select(&mut self, node: Option<String>) {
		self.highlight.selected = node.and_then(|id| self.engine.locate(&id));
		self.refocus();
	}

	/// `(id, title)` of the rendered nodes matching `query`, best first.
	pub fn search(&mut self, query: &str) -> Vec<(String, String)> {
		self.engine
			.search(query)
			.into_iter()
			.map(|node| (node.id.clone(), node.title.clone()))
			.collect()
	}

	fn refocus(&mut self) {
		let center = self
			.highlight
			.hovered
			.clone()
			.or_else(|| self.highlight.selected.clone());
		let focus = match center {
			Some(id) => self.engine.focus_view(&id).unwrap_or_else(|err| {
				warn!("dropping focus: {err}");
				FocusView::default()
			}),
			None => FocusView::default(),
		};
		if !focus.is_active() && self.highlight.focus.is_active() {
			self.highlight.prev_focus = std::mem::take(&mut self.highlight.focus);
		} else {
			self.highlight.prev_focus = FocusView::default();
		}
		self.highlight.focus = focus;
	}

	/// Focus used for drawing: the live one, or the fading previous one.
	pub fn effective_focus(&self) -> &FocusView {
		if self.highlight.focus.is_active() {
			&self.highlight.focus
		} else {
			&self.highlight.prev_focus
		}
	}

	pub fn is_hovered(&self, id: &str) -> bool {
		self.effective_focus().center.as_deref() == Some(id)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.effective_focus().is_active()
	}

	pub fn begin_drag(&mut self, id: String, sx: f64, sy: f64) {
		self.drag = DragState {
			active: true,
			node_start: self.engine.positions().get(&id),
			node: Some(id),
			start_x: sx,
			start_y: sy,
			moved: false,
		};
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let (Some(id), Some(start)) = (self.drag.node.clone(), self.drag.node_start) else {
			return;
		};
		if (sx - self.drag.start_x).abs() + (sy - self.drag.start_y).abs() > CLICK_SLOP {
			self.drag.moved = true;
		}
		let (dx, dy) = (
			(sx - self.drag.start_x) / self.transform.k,
			(sy - self.drag.start_y) / self.transform.k,
		);
		self.engine.pin(&id, Position::new(start.x + dx, start.y + dy));
	}

	/// Finish a drag. A press without movement toggles the selection instead;
	/// a real drag stores the new layout once.
	pub fn end_drag(&mut self) {
		let drag = std::mem::take(&mut self.drag);
		let Some(id) = drag.node else {
			return;
		};
		if !drag.moved {
			let next = (self.highlight.selected.as_deref() != Some(id.as_str())).then_some(id);
			self.select(next);
		} else if let Err(err) = self.engine.persist_layout() {
			warn!("could not store layout after drag: {err}");
		}
	}

	/// Collapse the group of `id`, or expand it when `id` is a group node.
	pub fn toggle_group(&mut self, id: &str) {
		let Some(node) = self.engine.rendered().node(id) else {
			return;
		};
		let Some(key) = node.group_key.clone() else {
			return;
		};
		let collapse = node.kind != NodeKind::Group;
		if let Err(err) = self.engine.set_collapsed(&key, collapse) {
			warn!("cannot toggle group '{key}': {err}");
		}
		self.select(self.highlight.selected.clone());
	}

	pub fn set_mode(&mut self, mode: GroupMode) {
		if self.engine.mode() != mode {
			self.engine.set_group_mode(mode);
			self.select(None);
		}
	}

	pub fn set_corpus(&mut self, corpus: PageCorpus) {
		self.engine.set_corpus(corpus);
		self.select(self.highlight.selected.clone());
	}

	pub fn tick(&mut self, dt: f32) {
		if let TickStatus::Converged = self.engine.tick(dt) {
			info!("graph layout converged");
		}
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.highlight.focus.is_active() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.highlight.focus.is_active() {
			self.highlight.delay_t = (self.highlight.delay_t + dt as f64).min(delay);
			if self.highlight.delay_t >= delay {
				self.highlight.highlight_t +=
					(target - self.highlight.highlight_t) * speed * dt as f64;
			}
		} else {
			self.highlight.highlight_t += (target - self.highlight.highlight_t) * speed * dt as f64;
			if self.highlight.highlight_t < 0.01 {
				self.highlight.highlight_t = 0.0;
				self.highlight.prev_focus = FocusView::default();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Group nodes grow with the number of members they stand for.
pub fn node_radius(node: &GraphNode) -> f64 {
	match node.member_count {
		Some(members) => NODE_RADIUS * (1.0 + (members as f64).sqrt() * 0.5),
		None => NODE_RADIUS,
	}
}

pub fn node_color(node: &GraphNode) -> String {
	match (node.kind, node.doc_status) {
		(NodeKind::Asset, Some(DocStatus::Documented)) => "#2ca02c".into(),
		(NodeKind::Asset, Some(DocStatus::Broken)) => "#d62728".into(),
		(NodeKind::Asset, _) => "#ff7f0e".into(),
		_ => {
			let mut hasher = DefaultHasher::new();
			node.group_key.hash(&mut hasher);
			COLORS[hasher.finish() as usize % COLORS.len()].into()
		}
	}
}
