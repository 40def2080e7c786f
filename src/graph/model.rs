use serde::{Deserialize, Serialize};

/// Node variant. A node is exactly one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
	/// A documentation page.
	Page,
	/// An asset referenced by some page.
	Asset,
	/// A collapsed group of nodes.
	Group,
}

/// What an edge stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
	/// Page to page.
	Doc,
	/// Page to a non-blueprint asset.
	AssetRef,
	/// Page to a blueprint asset.
	BlueprintRef,
}

/// Documentation coverage of an asset node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocStatus {
	/// A page declares it documents the asset.
	Documented,
	/// No page documents the asset.
	Missing,
	/// The asset is reported broken.
	Broken,
}

/// A node of the graph. Positions live in [`LayoutState`](super::layout::LayoutState).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Unique within one graph: page id, `asset:<path>.<name>` or `group:<mode>:<key>`.
	pub id: String,
	/// Display title.
	pub title: String,
	/// Node kind.
	pub kind: NodeKind,
	/// Page tags; assets carry `Asset`.
	pub tags: Vec<String>,
	/// Page category, or the folder bucket of an asset.
	pub category: Option<String>,
	/// Canonical reference of an asset.
	pub asset_ref: Option<String>,
	/// Asset type, e.g. `Blueprint`.
	pub asset_type: Option<String>,
	/// Asset package path.
	pub asset_path: Option<String>,
	/// Coverage, set on asset nodes only.
	pub doc_status: Option<DocStatus>,
	/// Page documenting the asset.
	pub linked_page_id: Option<String>,
	/// Group key under the current mode, once grouped.
	pub group_key: Option<String>,
	/// Folded node count, set on group nodes only.
	pub member_count: Option<usize>,
}

impl GraphNode {
	fn bare(id: String, title: String, kind: NodeKind) -> Self {
		Self {
			id,
			title,
			kind,
			tags: Vec::new(),
			category: None,
			asset_ref: None,
			asset_type: None,
			asset_path: None,
			doc_status: None,
			linked_page_id: None,
			group_key: None,
			member_count: None,
		}
	}

	/// Page node.
	pub fn page(id: impl Into<String>, title: impl Into<String>) -> Self {
		Self::bare(id.into(), title.into(), NodeKind::Page)
	}

	/// Asset node, tagged `Asset`.
	pub fn asset(id: impl Into<String>, title: impl Into<String>) -> Self {
		let mut node = Self::bare(id.into(), title.into(), NodeKind::Asset);
		node.tags.push("Asset".into());
		node
	}

	/// Synthetic node standing in for `members` collapsed nodes.
	pub fn group(id: impl Into<String>, key: &str, members: usize) -> Self {
		let mut node = Self::bare(id.into(), key.to_string(), NodeKind::Group);
		node.category = Some(key.to_string());
		node.group_key = Some(key.to_string());
		node.member_count = Some(members);
		node
	}

	/// Set the category.
	pub fn with_category(mut self, category: Option<String>) -> Self {
		self.category = category;
		self
	}

	/// Replace the tags.
	pub fn with_tags(mut self, tags: Vec<String>) -> Self {
		self.tags = tags;
		self
	}

	/// Whether this is an asset node.
	pub fn is_asset(&self) -> bool {
		self.kind == NodeKind::Asset
	}
}

/// Directed edge from a page to what it references.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Edge kind.
	pub kind: EdgeKind,
	/// Number of raw edges this edge stands for.
	pub weight: u32,
}

impl GraphEdge {
	/// A raw edge, always of weight 1.
	pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			kind,
			weight: 1,
		}
	}
}

/// One snapshot of nodes and edges, raw or rendered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphModel {
	/// Nodes, pages first.
	pub nodes: Vec<GraphNode>,
	/// Edges between nodes in `nodes`.
	pub edges: Vec<GraphEdge>,
}

impl GraphModel {
	/// Node with id `id`.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Whether a node with id `id` exists.
	pub fn contains(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	/// Asset nodes only.
	pub fn asset_nodes(&self) -> impl Iterator<Item = &GraphNode> {
		self.nodes.iter().filter(|n| n.is_asset())
	}
}
