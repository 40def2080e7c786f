//! Documentation coverage of asset nodes.
//!
//! Classification order: a page declaring the asset in its metadata makes it
//! `Documented`; otherwise an entry in the broken-reference report makes it
//! `Broken`; otherwise it is `Missing`. The broken report is produced elsewhere
//! and only consumed here. Without one, classification is two-state.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use serde::Serialize;

use super::corpus::PageCorpus;
use super::model::{DocStatus, GraphModel};
use super::refs::AssetRef;

/// Source of the project's full asset list. Used for statistics only.
pub trait AssetInventory {
	/// Every asset the project holds.
	fn list(&self) -> Vec<AssetRef>;
}

/// Canonical references reported as broken by the reference scanner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BrokenRefs {
	identities: HashSet<String>,
}

impl BrokenRefs {
	/// Entries that are not canonical references are dropped.
	pub fn from_refs<I, S>(refs: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut identities = HashSet::new();
		for raw in refs {
			match AssetRef::parse(raw.as_ref()) {
				Some(asset) => {
					identities.insert(asset.identity());
				}
				None => warn!("ignoring malformed broken-reference entry {:?}", raw.as_ref()),
			}
		}
		Self { identities }
	}

	/// Whether the asset with this identity is known to be broken.
	pub fn contains(&self, identity: &str) -> bool {
		self.identities.contains(identity)
	}

	/// Whether no broken references were reported.
	pub fn is_empty(&self) -> bool {
		self.identities.is_empty()
	}

	/// Number of distinct broken identities.
	pub fn len(&self) -> usize {
		self.identities.len()
	}
}

/// Which page documents which asset, keyed by canonical identity.
#[derive(Clone, Debug, Default)]
pub struct DocIndex {
	pages: HashMap<String, String>,
}

impl DocIndex {
	/// Index of the pages declaring which asset they document.
	pub fn new(corpus: &PageCorpus) -> Self {
		let mut pages = HashMap::new();
		for page in &corpus.pages {
			let Some(raw) = page.meta.documents.as_deref() else {
				continue;
			};
			match AssetRef::parse(raw) {
				Some(asset) => {
					pages.entry(asset.identity()).or_insert_with(|| page.id.clone());
				}
				None => debug!("page '{}' declares unparsable asset {:?}", page.id, raw),
			}
		}
		Self { pages }
	}

	/// Page documenting the asset with this identity, if any.
	pub fn page_for(&self, identity: &str) -> Option<&str> {
		self.pages.get(identity).map(String::as_str)
	}
}

/// Status of a single asset identity, with the documenting page if any.
pub fn status_of(identity: &str, docs: &DocIndex, broken: &BrokenRefs) -> (DocStatus, Option<String>) {
	if let Some(page) = docs.page_for(identity) {
		(DocStatus::Documented, Some(page.to_string()))
	} else if broken.contains(identity) {
		(DocStatus::Broken, None)
	} else {
		(DocStatus::Missing, None)
	}
}

/// Annotate every asset node of `model` in place.
pub fn classify(model: &mut GraphModel, docs: &DocIndex, broken: &BrokenRefs) {
	for node in model.nodes.iter_mut().filter(|n| n.is_asset()) {
		let Some(identity) = node.id.strip_prefix("asset:") else {
			continue;
		};
		let (status, page) = status_of(identity, docs, broken);
		node.doc_status = Some(status);
		node.linked_page_id = page;
	}
}

/// Counters for the coverage panel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageStats {
	/// Distinct assets in the inventory.
	pub inventory_total: usize,
	/// Inventory assets some page documents.
	pub documented: usize,
	/// Inventory assets with no documenting page.
	pub missing: usize,
	/// Inventory assets reported broken.
	pub broken: usize,
	/// Asset nodes currently in the graph, i.e. assets referenced by some page.
	pub graph_assets: usize,
}

impl CoverageStats {
	/// Documented share of the inventory, in percent.
	pub fn percent_documented(&self) -> f64 {
		if self.inventory_total == 0 {
			return 0.0;
		}
		self.documented as f64 * 100.0 / self.inventory_total as f64
	}
}

/// Classify every inventory asset and count the outcome.
pub fn coverage_stats(
	inventory: &dyn AssetInventory,
	docs: &DocIndex,
	broken: &BrokenRefs,
	model: &GraphModel,
) -> CoverageStats {
	let mut stats = CoverageStats {
		graph_assets: model.asset_nodes().count(),
		..CoverageStats::default()
	};
	let mut seen = HashSet::new();
	for asset in inventory.list() {
		let identity = asset.identity();
		if !seen.insert(identity.clone()) {
			continue;
		}
		stats.inventory_total += 1;
		match status_of(&identity, docs, broken).0 {
			DocStatus::Documented => stats.documented += 1,
			DocStatus::Broken => stats.broken += 1,
			DocStatus::Missing => stats.missing += 1,
		}
	}
	stats
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::builder;
	use crate::graph::corpus::Page;

	const GUARD: &str = "Blueprint'/Game/NPC/BP_Guard.BP_Guard'";
	const ROCK: &str = "Texture'/Game/Env/T_Rock.T_Rock'";
	const TREE: &str = "StaticMesh'/Game/Env/SM_Tree.SM_Tree'";

	struct Fixed(Vec<&'static str>);

	impl AssetInventory for Fixed {
		fn list(&self) -> Vec<AssetRef> {
			self.0.iter().filter_map(|r| AssetRef::parse(r)).collect()
		}
	}

	fn corpus() -> PageCorpus {
		PageCorpus::new(vec![
			Page::new("guard-doc", "Guard").documenting(GUARD),
			Page::new("notes", "Notes").with_body(format!("[[{GUARD}]] [[{ROCK}]] [[{TREE}]]")),
			Page::new("dup", "Guard again").documenting(GUARD),
			Page::new("junk", "Junk").documenting("Blueprint'/Game/NPC"),
		])
	}

	#[test]
	fn three_state_classification() {
		let corpus = corpus();
		let mut model = builder::build(&corpus, None, "/Game");
		classify(&mut model, &DocIndex::new(&corpus), &BrokenRefs::from_refs([ROCK, "garbage"]));

		let status = |id: &str| {
			let node = model.node(id).unwrap();
			(node.doc_status, node.linked_page_id.clone())
		};
		assert_eq!(
			status("asset:/Game/NPC/BP_Guard.BP_Guard"),
			(Some(DocStatus::Documented), Some("guard-doc".into()))
		);
		assert_eq!(status("asset:/Game/Env/T_Rock.T_Rock"), (Some(DocStatus::Broken), None));
		assert_eq!(status("asset:/Game/Env/SM_Tree.SM_Tree"), (Some(DocStatus::Missing), None));
		assert!(model.node("notes").unwrap().doc_status.is_none());
	}

	#[test]
	fn documented_wins_over_broken() {
		let docs = DocIndex::new(&corpus());
		let broken = BrokenRefs::from_refs([GUARD]);
		let (status, _) = status_of("/Game/NPC/BP_Guard.BP_Guard", &docs, &broken);
		assert_eq!(status, DocStatus::Documented);
	}

	#[test]
	fn stats_count_distinct_inventory_assets() {
		let corpus = corpus();
		let model = builder::build(&corpus, None, "/Game");
		let inventory = Fixed(vec![GUARD, ROCK, TREE, "Blueprint'/Game/NPC/BP_Guard.BP_Guard'", "bad"]);
		let stats = coverage_stats(
			&inventory,
			&DocIndex::new(&corpus),
			&BrokenRefs::from_refs([ROCK]),
			&model,
		);
		assert_eq!(
			stats,
			CoverageStats {
				inventory_total: 3,
				documented: 1,
				missing: 1,
				broken: 1,
				graph_assets: 3,
			}
		);
		assert!((stats.percent_documented() - 100.0 / 3.0).abs() < 1e-9);
	}
}
