//! Quick-jump search over node titles, ids and asset paths.

use super::model::GraphNode;

/// Case-insensitive substring search. A blank query matches nothing.
///
/// Hits are ranked title-prefix first, then title substring, then matches in the
/// other fields; node order breaks ties. At most `limit` hits are returned.
pub fn search<'a>(query: &str, nodes: &'a [GraphNode], limit: usize) -> Vec<&'a GraphNode> {
	let needle = query.trim().to_lowercase();
	if needle.is_empty() || limit == 0 {
		return Vec::new();
	}

	let mut ranked: Vec<(u8, usize, &GraphNode)> = nodes
		.iter()
		.enumerate()
		.filter_map(|(idx, node)| rank(node, &needle).map(|r| (r, idx, node)))
		.collect();
	ranked.sort_by_key(|&(r, idx, _)| (r, idx));
	ranked.into_iter().take(limit).map(|(_, _, node)| node).collect()
}

fn rank(node: &GraphNode, needle: &str) -> Option<u8> {
	let title = node.title.to_lowercase();
	if title.starts_with(needle) {
		return Some(0);
	}
	if title.contains(needle) {
		return Some(1);
	}
	let haystack = [
		Some(node.id.as_str()),
		node.asset_ref.as_deref(),
		node.asset_path.as_deref(),
		node.category.as_deref(),
	]
	.into_iter()
	.flatten()
	.collect::<Vec<_>>()
	.join("\u{1f}")
	.to_lowercase();
	haystack.contains(needle).then_some(2)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn nodes() -> Vec<GraphNode> {
		let mut guard = GraphNode::asset("asset:/Game/NPC/BP_Guard.BP_Guard", "BP_Guard");
		guard.asset_ref = Some("Blueprint'/Game/NPC/BP_Guard.BP_Guard'".into());
		guard.asset_path = Some("/Game/NPC/BP_Guard".into());
		vec![
			GraphNode::page("p1", "Night Watch"),
			GraphNode::page("p2", "Guard Duties"),
			guard,
			GraphNode::page("npc-notes", "Notes").with_category(Some("Lore".into())),
		]
	}

	#[test]
	fn blank_query_matches_nothing() {
		assert!(search("", &nodes(), 8).is_empty());
		assert!(search("   ", &nodes(), 8).is_empty());
	}

	#[test]
	fn ranks_title_prefix_before_other_hits() {
		let nodes = nodes();
		let hits: Vec<&str> = search("GUARD", &nodes, 8).iter().map(|n| n.id.as_str()).collect();
		assert_eq!(hits, vec!["p2", "asset:/Game/NPC/BP_Guard.BP_Guard"]);

		let hits: Vec<&str> = search("npc", &nodes, 8).iter().map(|n| n.id.as_str()).collect();
		assert_eq!(hits, vec!["asset:/Game/NPC/BP_Guard.BP_Guard", "npc-notes"]);
	}

	#[test]
	fn results_are_capped() {
		let many: Vec<GraphNode> =
			(0..20).map(|i| GraphNode::page(format!("p{i}"), format!("Page {i}"))).collect();
		assert_eq!(search("page", &many, 8).len(), 8);
		assert_eq!(search("page", &many, 8)[0].id, "p0");
	}
}
