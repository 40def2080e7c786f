//! Host-facing facade tying the pipeline stages together.
//!
//! Every mutator marks the engine dirty and rebuilds straight away: builder,
//! coverage, grouping, then a fresh layout run seeded from the cache. Positions
//! are the only state carried from one build to the next.

use std::collections::{BTreeSet, HashSet};

use log::{debug, info, warn};

use super::builder;
use super::config::GraphConfig;
use super::corpus::PageCorpus;
use super::coverage::{self, AssetInventory, BrokenRefs, CoverageStats, DocIndex};
use super::error::{GraphError, Result};
use super::focus::{self, FocusView};
use super::grouping::{self, GroupMode};
use super::layout::{LayoutCache, LayoutKey, LayoutState, LayoutStore, Position};
use super::model::{GraphModel, GraphNode};
use super::search;
use super::simulation::{Convergence, LayoutOracle};

/// What a call to [`GraphEngine::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickStatus {
	/// No layout is running.
	Idle,
	/// The layout is still moving.
	Running {
		/// Energy reported by the oracle for this tick.
		energy: f32,
	},
	/// The layout settled on this tick; positions were saved and the run stopped.
	Converged,
}

/// Pipeline state for one project: corpus, grouping, layout and cache.
pub struct GraphEngine<S, O> {
	config: GraphConfig,
	project_id: String,
	corpus: PageCorpus,
	broken: BrokenRefs,
	scope_root: Option<String>,
	mode: GroupMode,
	collapsed: BTreeSet<String>,
	raw: GraphModel,
	rendered: GraphModel,
	layout: LayoutState,
	loaded_key: Option<LayoutKey>,
	cache: LayoutCache<S>,
	oracle: O,
	convergence: Convergence,
	dirty: bool,
	builds: u64,
}

impl<S: LayoutStore, O: LayoutOracle> GraphEngine<S, O> {
	/// Engine for `project_id` with an empty corpus.
	pub fn new(project_id: impl Into<String>, config: GraphConfig, store: S, oracle: O) -> Self {
		Self {
			convergence: Convergence::new(&config),
			config,
			project_id: project_id.into(),
			corpus: PageCorpus::default(),
			broken: BrokenRefs::default(),
			scope_root: None,
			mode: GroupMode::None,
			collapsed: BTreeSet::new(),
			raw: GraphModel::default(),
			rendered: GraphModel::default(),
			layout: LayoutState::default(),
			loaded_key: None,
			cache: LayoutCache::new(store),
			oracle,
			dirty: true,
			builds: 0,
		}
	}

	/// Active configuration.
	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// Current grouping mode.
	pub fn mode(&self) -> GroupMode {
		self.mode
	}

	/// Asset path the graph is narrowed to, if any.
	pub fn scope_root(&self) -> Option<&str> {
		self.scope_root.as_deref()
	}

	/// Collapsed group keys of the current mode.
	pub fn collapsed(&self) -> &BTreeSet<String> {
		&self.collapsed
	}

	/// Graph before grouping.
	pub fn raw(&self) -> &GraphModel {
		&self.raw
	}

	/// Graph handed to the renderer.
	pub fn rendered(&self) -> &GraphModel {
		&self.rendered
	}

	/// Last known position of every node.
	pub fn positions(&self) -> &LayoutState {
		&self.layout
	}

	/// The layout oracle.
	pub fn oracle(&self) -> &O {
		&self.oracle
	}

	/// The layout cache.
	pub fn cache(&self) -> &LayoutCache<S> {
		&self.cache
	}

	/// Number of completed rebuilds.
	pub fn builds(&self) -> u64 {
		self.builds
	}

	/// Cache namespace for the current scope and mode.
	pub fn layout_key(&self) -> LayoutKey {
		LayoutKey::new(&self.project_id, self.scope_root.as_deref(), self.mode)
	}

	/// Replace the corpus and rebuild.
	pub fn set_corpus(&mut self, corpus: PageCorpus) -> &GraphModel {
		self.corpus = corpus;
		self.mark_dirty()
	}

	/// Inject the latest broken-reference report.
	pub fn set_broken_refs(&mut self, broken: BrokenRefs) -> &GraphModel {
		self.broken = broken;
		self.mark_dirty()
	}

	/// Rebuild for `scope_root` (`None` for the whole project).
	pub fn build_graph(&mut self, scope_root: Option<&str>) -> &GraphModel {
		self.scope_root = scope_root
			.map(|root| root.trim_end_matches('/').to_string())
			.filter(|root| !root.is_empty());
		self.mark_dirty()
	}

	/// Switch grouping. Collapsed keys belong to a mode and are cleared.
	pub fn set_group_mode(&mut self, mode: GroupMode) -> &GraphModel {
		if mode != self.mode {
			self.mode = mode;
			self.collapsed.clear();
		}
		self.mark_dirty()
	}

	/// Collapse or expand the group `key` of the current mode.
	pub fn set_collapsed(&mut self, key: &str, collapsed: bool) -> Result<&GraphModel> {
		self.refresh();
		let known = grouping::group_keys(&self.raw, self.mode, &self.config.content_root);
		if !known.contains(key) && !self.collapsed.contains(key) {
			return Err(GraphError::UnknownGroupKey {
				mode: self.mode,
				key: key.to_string(),
			});
		}
		let changed = if collapsed {
			self.collapsed.insert(key.to_string())
		} else {
			self.collapsed.remove(key)
		};
		if changed {
			debug!("group '{key}' collapsed: {collapsed}");
			self.dirty = true;
		}
		Ok(self.refresh())
	}

	/// Group keys available under the current mode.
	pub fn group_keys(&mut self) -> BTreeSet<String> {
		self.refresh();
		grouping::group_keys(&self.raw, self.mode, &self.config.content_root)
	}

	/// Nodes within `hops` of `node_id` in the rendered graph.
	pub fn focus(&mut self, node_id: &str, hops: u32) -> Result<HashSet<String>> {
		self.refresh();
		if !self.rendered.contains(node_id) {
			return Err(GraphError::UnknownNode(node_id.to_string()));
		}
		Ok(focus::neighborhood(node_id, &self.rendered.edges, hops as usize))
	}

	/// [`focus`](Self::focus) with the configured hop count, wrapped for rendering.
	pub fn focus_view(&mut self, node_id: &str) -> Result<FocusView> {
		let hops = self.config.focus_hops;
		let members = self.focus(node_id, hops)?;
		Ok(FocusView::new(node_id, members))
	}

	/// Rendered node standing for `node_id`: the node itself, or the group it is
	/// collapsed into. `None` for ids outside the current graph.
	pub fn locate(&mut self, node_id: &str) -> Option<String> {
		self.refresh();
		if self.rendered.contains(node_id) {
			return Some(node_id.to_string());
		}
		let node = self.raw.node(node_id)?;
		let key = grouping::key_of(node, self.mode, &self.config.content_root);
		let group_id = grouping::group_node_id(self.mode, &key);
		self.rendered.contains(&group_id).then_some(group_id)
	}

	/// Ranked matches among the rendered nodes, so members of collapsed groups
	/// are found through their group.
	pub fn search(&mut self, query: &str) -> Vec<&GraphNode> {
		self.refresh();
		search::search(query, &self.rendered.nodes, self.config.search_limit)
	}

	/// Coverage of `inventory` against the current corpus.
	pub fn coverage_stats(&mut self, inventory: &dyn AssetInventory) -> CoverageStats {
		self.refresh();
		coverage::coverage_stats(inventory, &DocIndex::new(&self.corpus), &self.broken, &self.raw)
	}

	/// Save current positions under the current key.
	pub fn persist_layout(&mut self) -> Result<()> {
		self.sync_positions();
		self.checkpoint()
	}

	/// Reload positions from the cache and restart the layout from them.
	pub fn restore_layout(&mut self) {
		let key = self.layout_key();
		self.layout = self.cache.load(&key);
		self.loaded_key = Some(key);
		self.start_layout();
	}

	/// Pin a node where the user dropped it.
	pub fn pin(&mut self, node_id: &str, position: Position) {
		self.layout.set(node_id, position);
		self.oracle.pin(node_id, position);
	}

	/// Advance the layout. The first settled tick of a build cycle checkpoints
	/// the positions and stops the run.
	pub fn tick(&mut self, dt: f32) -> TickStatus {
		if !self.oracle.is_running() {
			return TickStatus::Idle;
		}
		let energy = self.oracle.tick(dt);
		self.sync_positions();
		if !self.convergence.observe(energy) {
			return TickStatus::Running { energy };
		}

		info!(
			"layout settled after {} ticks (energy {energy:.4})",
			self.convergence.ticks()
		);
		if let Err(err) = self.checkpoint() {
			warn!("could not checkpoint layout: {err}");
		}
		self.oracle.stop();
		TickStatus::Converged
	}

	/// Rebuild if anything changed since the last build.
	pub fn refresh(&mut self) -> &GraphModel {
		if self.dirty {
			self.rebuild();
		}
		&self.rendered
	}

	fn mark_dirty(&mut self) -> &GraphModel {
		self.dirty = true;
		self.refresh()
	}

	fn rebuild(&mut self) {
		self.sync_positions();
		self.oracle.stop();

		let root = &self.config.content_root;
		let mut raw = builder::build(&self.corpus, self.scope_root.as_deref(), root);
		coverage::classify(&mut raw, &DocIndex::new(&self.corpus), &self.broken);
		self.rendered = grouping::group(&raw, self.mode, &self.collapsed, root);
		self.raw = raw;

		let key = self.layout_key();
		if self.loaded_key.as_ref() != Some(&key) {
			self.layout = self.cache.load(&key);
			debug!("loaded {} cached positions for {}", self.layout.len(), key.storage_key());
			self.loaded_key = Some(key);
		}

		self.dirty = false;
		self.builds += 1;
		self.start_layout();
	}

	fn start_layout(&mut self) {
		self.oracle.stop();
		let seeds = self.layout.seeds(self.rendered.nodes.iter().map(|n| n.id.as_str()));
		self.oracle.start(&seeds, &self.rendered.edges);
		self.convergence.reset();
	}

	/// Save the positions of nodes still in the graph under the current key.
	fn checkpoint(&mut self) -> Result<()> {
		let live: HashSet<&str> = self
			.raw
			.nodes
			.iter()
			.chain(&self.rendered.nodes)
			.map(|n| n.id.as_str())
			.collect();
		let before = self.layout.len();
		self.layout.retain(|id| live.contains(id));
		if self.layout.len() < before {
			debug!("pruned {} stale positions", before - self.layout.len());
		}
		let key = self.layout_key();
		self.cache.save(&key, &self.layout)
	}

	fn sync_positions(&mut self) {
		if self.oracle.is_running() {
			self.layout.merge(&self.oracle.positions());
		}
	}
}
