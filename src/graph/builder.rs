//! Raw graph construction from the page corpus.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use super::corpus::PageCorpus;
use super::model::{EdgeKind, GraphEdge, GraphModel, GraphNode};
use super::refs::{self, AssetRef, Reference};

/// Id prefixes the graph mints itself. Pages may not use them.
const RESERVED_PREFIXES: [&str; 2] = ["asset:", "group:"];

/// Build the raw node/edge set.
///
/// Asset existence is inferred from references alone. With `scope_root` set, only
/// assets at or below that path survive, and only pages referencing at least one
/// of them.
pub fn build(corpus: &PageCorpus, scope_root: Option<&str>, content_root: &str) -> GraphModel {
	let titles = corpus.titles();
	let mut seen_pages = HashSet::with_capacity(corpus.pages.len());
	let parsed: Vec<_> = corpus
		.pages
		.iter()
		.filter(|&page| {
			if RESERVED_PREFIXES.iter().any(|p| page.id.starts_with(p)) {
				warn!("skipping page '{}': id uses a reserved prefix", page.id);
				return false;
			}
			seen_pages.insert(page.id.as_str())
		})
		.map(|page| (page, refs::parse_page(page, &titles)))
		.collect();

	let in_scope = |asset: &AssetRef| scope_root.is_none_or(|root| asset.is_under(root));
	let included: HashSet<&str> = parsed
		.iter()
		.filter(|(_, page_refs)| {
			scope_root.is_none()
				|| page_refs.iter().any(|r| matches!(r, Reference::Asset { asset, .. } if in_scope(asset)))
		})
		.map(|(page, _)| page.id.as_str())
		.collect();

	let mut model = GraphModel::default();
	for (page, _) in parsed.iter().filter(|(p, _)| included.contains(p.id.as_str())) {
		model.nodes.push(
			GraphNode::page(&page.id, &page.title)
				.with_category(page.category.clone())
				.with_tags(page.tags.clone()),
		);
	}

	let mut asset_nodes: HashMap<String, usize> = HashMap::new();
	let mut edge_keys: HashSet<(String, String, EdgeKind)> = HashSet::new();
	for (page, page_refs) in &parsed {
		if !included.contains(page.id.as_str()) {
			continue;
		}
		for reference in page_refs {
			let target = match reference {
				Reference::Page { page_id, .. } => {
					if page_id == &page.id || !included.contains(page_id.as_str()) {
						continue;
					}
					page_id.clone()
				}
				Reference::Asset { asset, .. } => {
					if !in_scope(asset) {
						continue;
					}
					let id = asset.node_id();
					if !asset_nodes.contains_key(&id) {
						asset_nodes.insert(id.clone(), model.nodes.len());
						model.nodes.push(asset_node(&id, asset, content_root));
					}
					id
				}
			};
			let kind = reference.edge_kind();
			if edge_keys.insert((page.id.clone(), target.clone(), kind)) {
				model.edges.push(GraphEdge::new(&page.id, target, kind));
			}
		}
	}

	debug!(
		"built raw graph: {} nodes ({} assets), {} edges, scope {:?}",
		model.nodes.len(),
		asset_nodes.len(),
		model.edges.len(),
		scope_root
	);
	model
}

fn asset_node(id: &str, asset: &AssetRef, content_root: &str) -> GraphNode {
	let mut node = GraphNode::asset(id, &asset.name)
		.with_category(Some(asset.folder_bucket(content_root)));
	node.asset_ref = Some(asset.to_string());
	node.asset_type = Some(asset.type_name.clone());
	node.asset_path = Some(asset.path.clone());
	node
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::graph::corpus::{Page, RawBlock};
	use crate::graph::grouping::{GroupMode, group};
	use crate::graph::model::NodeKind;

	fn ids(model: &GraphModel) -> Vec<&str> {
		model.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn assets_are_deduplicated_by_identity() {
		let corpus = PageCorpus::new(vec![
			Page::new("a", "A").with_body("[[Blueprint'/Game/NPC/BP_Guard.BP_Guard']]"),
			Page::new("b", "B")
				.with_body("[[Object'/Game/NPC/BP_Guard.BP_Guard']]")
				.with_block(RawBlock::new(
					"asset",
					json!({"reference": "Blueprint'/Game/NPC/BP_Guard.BP_Guard'"}),
				)),
		]);
		let model = build(&corpus, None, "/Game");

		assert_eq!(ids(&model), vec!["a", "b", "asset:/Game/NPC/BP_Guard.BP_Guard"]);
		let asset = model.node("asset:/Game/NPC/BP_Guard.BP_Guard").unwrap();
		assert_eq!(asset.kind, NodeKind::Asset);
		assert_eq!(asset.asset_type.as_deref(), Some("Blueprint"));
		assert_eq!(asset.category.as_deref(), Some("NPC"));
		assert_eq!(asset.tags, vec!["Asset".to_string()]);

		let kinds: Vec<EdgeKind> = model.edges.iter().map(|e| e.kind).collect();
		assert_eq!(
			kinds,
			vec![EdgeKind::BlueprintRef, EdgeKind::AssetRef, EdgeKind::BlueprintRef]
		);
	}

	#[test]
	fn repeated_mentions_and_self_links_add_no_edges() {
		let corpus = PageCorpus::new(vec![
			Page::new("a", "A").with_body("[[B]] [[b]] [[A]] [[B|again]]"),
			Page::new("b", "B"),
		]);
		let model = build(&corpus, None, "/Game");
		assert_eq!(model.edges, vec![GraphEdge::new("a", "b", EdgeKind::Doc)]);
	}

	#[test]
	fn pages_with_reserved_ids_are_skipped() {
		let corpus = PageCorpus::new(vec![
			Page::new("group:category:NPC", "Weird").with_category("Other"),
			Page::new("asset:/Game/NPC/BP_Guard.BP_Guard", "Also Weird"),
			Page::new("a", "A")
				.with_category("NPC")
				.with_body("[[Weird]] [[Blueprint'/Game/NPC/BP_Guard.BP_Guard']]"),
		]);
		let model = build(&corpus, None, "/Game");
		assert_eq!(ids(&model), vec!["a", "asset:/Game/NPC/BP_Guard.BP_Guard"]);
		assert_eq!(model.edges.len(), 1);

		let collapsed = ["NPC".to_string()].into();
		let rendered = group(&model, GroupMode::Category, &collapsed, "/Game");
		let rendered_ids = ids(&rendered);
		let unique: HashSet<&str> = rendered_ids.iter().copied().collect();
		assert_eq!(unique.len(), rendered_ids.len());
	}

	#[test]
	fn duplicate_page_ids_keep_first() {
		let corpus = PageCorpus::new(vec![Page::new("a", "First"), Page::new("a", "Second")]);
		let model = build(&corpus, None, "/Game");
		assert_eq!(model.nodes.len(), 1);
		assert_eq!(model.nodes[0].title, "First");
	}

	#[test]
	fn scope_filter_restricts_assets_and_pages() {
		let corpus = PageCorpus::new(vec![
			Page::new("a", "A").with_body(
				"[[B]] [[Blueprint'/Game/NPC/BP_Guard.BP_Guard']] [[Texture'/Game/Env/T_Rock.T_Rock']]",
			),
			Page::new("b", "B").with_body("[[Texture'/Game/NPCs/T_Face.T_Face']]"),
			Page::new("c", "C").with_body("[[A]] [[StaticMesh'/Game/NPC/Props/SM_Spear.SM_Spear']]"),
		]);
		let model = build(&corpus, Some("/Game/NPC/"), "/Game");

		assert_eq!(
			ids(&model),
			vec![
				"a",
				"c",
				"asset:/Game/NPC/BP_Guard.BP_Guard",
				"asset:/Game/NPC/Props/SM_Spear.SM_Spear",
			]
		);
		assert!(model.edges.iter().all(|e| model.contains(&e.source) && model.contains(&e.target)));
		assert!(model.edges.contains(&GraphEdge::new("c", "a", EdgeKind::Doc)));
		assert!(!model.edges.iter().any(|e| e.target == "b"));
	}
}
