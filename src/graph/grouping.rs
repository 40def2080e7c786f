//! Grouping and collapse of the raw graph into the rendered graph.
//!
//! Every node gets a group key under the active [`GroupMode`]. Nodes whose key is
//! collapsed are folded into one synthetic group node and their edges are
//! rerouted to it; parallel edges of the same kind merge by summing weights and
//! edges that end up looping on a group are dropped.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::GraphError;
use super::model::{EdgeKind, GraphEdge, GraphModel, GraphNode, NodeKind};
use super::refs::folder_bucket;

/// Key used by every node when grouping is disabled.
pub const ALL_KEY: &str = "all";

/// How nodes are bucketed for collapsing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
	/// Everything in one `all` bucket; nothing collapses.
	#[default]
	None,
	/// Pages by category, assets by type.
	Category,
	/// Pages by first tag, assets by type.
	Tag,
	/// Pages by category, assets by top-level folder.
	Folder,
}

impl GroupMode {
	/// Every mode, in selector order.
	pub const ALL: [GroupMode; 4] = [Self::None, Self::Category, Self::Tag, Self::Folder];

	/// Lower-case name, as used in ids and storage keys.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Category => "category",
			Self::Tag => "tag",
			Self::Folder => "folder",
		}
	}
}

impl fmt::Display for GroupMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for GroupMode {
	type Err = GraphError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| GraphError::UnknownGroupMode(s.to_string()))
	}
}

/// Id of the node standing for the collapsed group `key`.
pub fn group_node_id(mode: GroupMode, key: &str) -> String {
	format!("group:{}:{}", mode, key)
}

/// Group key of `node` under `mode`.
pub fn key_of(node: &GraphNode, mode: GroupMode, content_root: &str) -> String {
	if node.kind == NodeKind::Group {
		return node.group_key.clone().unwrap_or_else(|| node.title.clone());
	}
	let asset_type = || node.asset_type.clone().unwrap_or_else(|| "Asset".into());
	let page_category = || node.category.clone().unwrap_or_else(|| "General".into());
	match (mode, node.kind) {
		(GroupMode::None, _) => ALL_KEY.into(),
		(GroupMode::Category | GroupMode::Tag, NodeKind::Asset) => asset_type(),
		(GroupMode::Folder, NodeKind::Asset) => match &node.asset_path {
			Some(path) => folder_bucket(path, content_root),
			None => "Root".into(),
		},
		(GroupMode::Category | GroupMode::Folder, _) => page_category(),
		(GroupMode::Tag, _) => node.tags.first().cloned().unwrap_or_else(|| "Untagged".into()),
	}
}

/// Distinct keys present in `model` under `mode`.
pub fn group_keys(model: &GraphModel, mode: GroupMode, content_root: &str) -> BTreeSet<String> {
	model
		.nodes
		.iter()
		.map(|node| key_of(node, mode, content_root))
		.collect()
}

/// Produce the rendered graph from `model`.
///
/// `model` is normally the raw graph. Feeding an already rendered graph back in
/// with the same mode and keys returns it unchanged: existing group nodes keep
/// their member count and existing edge weights are carried over.
pub fn group(
	model: &GraphModel,
	mode: GroupMode,
	collapsed: &BTreeSet<String>,
	content_root: &str,
) -> GraphModel {
	let collapsing = mode != GroupMode::None && !collapsed.is_empty();
	let keyed: Vec<(&GraphNode, String)> = model
		.nodes
		.iter()
		.map(|node| (node, key_of(node, mode, content_root)))
		.collect();
	let is_folded = |key: &str| collapsing && collapsed.contains(key);

	let mut members: HashMap<&str, usize> = HashMap::new();
	for (node, key) in keyed.iter().filter(|(_, key)| is_folded(key)) {
		*members.entry(key.as_str()).or_default() += node.member_count.unwrap_or(1);
	}

	let mut rendered = GraphModel::default();
	let mut remap: HashMap<&str, String> = HashMap::new();
	let mut emitted: HashSet<&str> = HashSet::new();
	for (node, key) in &keyed {
		if is_folded(key) {
			let id = group_node_id(mode, key);
			if emitted.insert(key.as_str()) {
				let count = members.get(key.as_str()).copied().unwrap_or(1);
				rendered.nodes.push(GraphNode::group(&id, key, count));
			}
			remap.insert(node.id.as_str(), id);
		} else {
			let mut node = (*node).clone();
			node.group_key = Some(key.clone());
			rendered.nodes.push(node);
		}
	}

	let known: HashSet<&str> = model.nodes.iter().map(|n| n.id.as_str()).collect();
	let mut slots: HashMap<(String, String, EdgeKind), usize> = HashMap::new();
	for edge in &model.edges {
		if !known.contains(edge.source.as_str()) || !known.contains(edge.target.as_str()) {
			continue;
		}
		let source = remap.get(edge.source.as_str()).unwrap_or(&edge.source);
		let target = remap.get(edge.target.as_str()).unwrap_or(&edge.target);
		if source == target {
			continue;
		}
		let weight = edge.weight.max(1);
		let slot = (source.clone(), target.clone(), edge.kind);
		match slots.get(&slot) {
			Some(&idx) => rendered.edges[idx].weight += weight,
			None => {
				slots.insert(slot, rendered.edges.len());
				rendered.edges.push(GraphEdge {
					weight,
					..GraphEdge::new(source.clone(), target.clone(), edge.kind)
				});
			}
		}
	}

	debug!(
		"grouped by {}: {} -> {} nodes, {} -> {} edges",
		mode,
		model.nodes.len(),
		rendered.nodes.len(),
		model.edges.len(),
		rendered.edges.len()
	);
	rendered
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::builder;
	use crate::graph::corpus::{Page, PageCorpus};

	fn keys(list: &[&str]) -> BTreeSet<String> {
		list.iter().map(|k| k.to_string()).collect()
	}

	fn corpus() -> PageCorpus {
		PageCorpus::new(vec![
			Page::new("a", "A")
				.with_category("NPC")
				.with_tags(["ai", "combat"])
				.with_body("[[B]] [[C]] [[Blueprint'/Game/NPC/BP_Guard.BP_Guard']]"),
			Page::new("b", "B")
				.with_category("NPC")
				.with_body("[[C]] [[Texture'/Game/Env/T_Rock.T_Rock']] [[Blueprint'/Game/NPC/BP_Guard.BP_Guard']]"),
			Page::new("c", "C").with_body("[[Texture'/Game/T_Sky.T_Sky']]"),
		])
	}

	#[test]
	fn parses_modes_case_insensitively() {
		assert_eq!("Folder".parse::<GroupMode>().unwrap(), GroupMode::Folder);
		assert!(matches!(
			"rainbow".parse::<GroupMode>(),
			Err(GraphError::UnknownGroupMode(mode)) if mode == "rainbow"
		));
	}

	#[test]
	fn key_functions_per_mode() {
		let raw = builder::build(&corpus(), None, "/Game");
		let key = |id: &str, mode| key_of(raw.node(id).unwrap(), mode, "/Game");

		assert_eq!(key("a", GroupMode::None), ALL_KEY);
		assert_eq!(key("a", GroupMode::Category), "NPC");
		assert_eq!(key("c", GroupMode::Category), "General");
		assert_eq!(key("a", GroupMode::Tag), "ai");
		assert_eq!(key("b", GroupMode::Tag), "Untagged");
		assert_eq!(key("c", GroupMode::Folder), "General");

		let guard = "asset:/Game/NPC/BP_Guard.BP_Guard";
		let sky = "asset:/Game/T_Sky.T_Sky";
		assert_eq!(key(guard, GroupMode::Category), "Blueprint");
		assert_eq!(key(guard, GroupMode::Tag), "Blueprint");
		assert_eq!(key(guard, GroupMode::Folder), "NPC");
		assert_eq!(key(sky, GroupMode::Folder), "Root");
	}

	#[test]
	fn collapse_replaces_members_and_aggregates_edges() {
		let raw = builder::build(&corpus(), None, "/Game");
		let rendered = group(&raw, GroupMode::Category, &keys(&["NPC"]), "/Game");

		let npc = rendered.node("group:category:NPC").unwrap();
		assert_eq!(npc.kind, NodeKind::Group);
		assert_eq!(npc.member_count, Some(2));
		assert!(rendered.node("a").is_none() && rendered.node("b").is_none());
		assert_eq!(rendered.nodes[0].id, "group:category:NPC");

		let weight = |target: &str, kind| {
			rendered
				.edges
				.iter()
				.find(|e| e.source == "group:category:NPC" && e.target == target && e.kind == kind)
				.map(|e| e.weight)
		};
		assert_eq!(weight("c", EdgeKind::Doc), Some(2));
		assert_eq!(weight("asset:/Game/NPC/BP_Guard.BP_Guard", EdgeKind::BlueprintRef), Some(2));
		assert_eq!(weight("asset:/Game/Env/T_Rock.T_Rock", EdgeKind::AssetRef), Some(1));
		assert!(rendered.edges.iter().all(|e| e.source != e.target));
	}

	#[test]
	fn mode_none_ignores_collapsed_keys() {
		let raw = builder::build(&corpus(), None, "/Game");
		let rendered = group(&raw, GroupMode::None, &keys(&[ALL_KEY, "NPC"]), "/Game");
		assert_eq!(rendered.nodes.len(), raw.nodes.len());
		assert_eq!(rendered.edges, raw.edges);
		assert!(rendered.nodes.iter().all(|n| n.group_key.as_deref() == Some(ALL_KEY)));
	}

	#[test]
	fn unknown_collapsed_keys_produce_nothing() {
		let raw = builder::build(&corpus(), None, "/Game");
		let rendered = group(&raw, GroupMode::Tag, &keys(&["nobody"]), "/Game");
		assert!(rendered.nodes.iter().all(|n| n.kind != NodeKind::Group));
		assert_eq!(rendered.nodes.len(), raw.nodes.len());
	}

	#[test]
	fn regrouping_rendered_output_is_stable() {
		let raw = builder::build(&corpus(), None, "/Game");
		let collapsed = keys(&["NPC", "Texture"]);
		let once = group(&raw, GroupMode::Category, &collapsed, "/Game");
		let twice = group(&once, GroupMode::Category, &collapsed, "/Game");
		assert_eq!(once, twice);
	}

	#[test]
	fn dangling_raw_edges_are_dropped() {
		let mut raw = builder::build(&corpus(), None, "/Game");
		raw.edges.push(GraphEdge::new("a", "ghost", EdgeKind::Doc));
		let rendered = group(&raw, GroupMode::Category, &BTreeSet::new(), "/Game");
		assert!(!rendered.edges.iter().any(|e| e.target == "ghost"));
	}
}
