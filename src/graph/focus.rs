//! Bounded-hop neighbourhoods used to dim everything outside the focus.

use std::collections::{HashMap, HashSet, VecDeque};

use super::model::GraphEdge;

/// Nodes reachable from `start` in at most `hops` edges, ignoring direction and
/// edge kind. Always contains `start`.
pub fn neighborhood(start: &str, edges: &[GraphEdge], hops: usize) -> HashSet<String> {
	let mut reached = HashSet::from([start.to_string()]);
	if hops == 0 {
		return reached;
	}

	let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
	for edge in edges {
		adjacency.entry(&edge.source).or_default().push(&edge.target);
		adjacency.entry(&edge.target).or_default().push(&edge.source);
	}

	let mut queue = VecDeque::from([(start, 0usize)]);
	while let Some((id, depth)) = queue.pop_front() {
		if depth == hops {
			continue;
		}
		for &next in adjacency.get(id).map(Vec::as_slice).unwrap_or_default() {
			if reached.insert(next.to_string()) {
				queue.push_back((next, depth + 1));
			}
		}
	}
	reached
}

/// Presentation-only view over a focus set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusView {
	/// Node the focus is centred on; `None` when nothing is focused.
	pub center: Option<String>,
	/// Nodes inside the neighbourhood, centre included.
	pub members: HashSet<String>,
}

impl FocusView {
	/// Focus on `center` covering `members`.
	pub fn new(center: &str, members: HashSet<String>) -> Self {
		Self {
			center: Some(center.to_string()),
			members,
		}
	}

	/// Whether anything is focused.
	pub fn is_active(&self) -> bool {
		self.center.is_some()
	}

	/// Without an active focus nothing is dimmed.
	pub fn is_node_dimmed(&self, id: &str) -> bool {
		self.is_active() && !self.members.contains(id)
	}

	/// An edge stays lit only when both of its ends are.
	pub fn is_edge_dimmed(&self, edge: &GraphEdge) -> bool {
		self.is_node_dimmed(&edge.source) || self.is_node_dimmed(&edge.target)
	}
}
