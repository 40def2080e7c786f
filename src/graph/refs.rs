//! Reference extraction from page Markdown and canvas blocks.
//!
//! Two reference shapes exist: wiki-links (`[[Title]]`, `[[Title|Label]]`) and
//! canonical asset references (`Type'/Path.Name'`). A wiki-link whose target is a
//! canonical reference points at an asset; any other wiki-link is resolved
//! against page titles. Nothing here fails: malformed input is skipped.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::corpus::{Block, Page, TitleIndex};
use super::model::EdgeKind;

const CANONICAL_PATTERN: &str = r"^([A-Za-z_][A-Za-z0-9_]*)'(/[^']+)\.([^'./]+)'$";
const WIKI_LINK_PATTERN: &str = r"\[\[([^\[\]\n]+)\]\]";

static CANONICAL_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(CANONICAL_PATTERN).unwrap_or_else(|_| panic!("Invalid Regex")));
static WIKI_LINK_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(WIKI_LINK_PATTERN).unwrap_or_else(|_| panic!("Invalid Regex")));

/// A parsed canonical asset reference, `Type'/Path.Name'`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetRef {
	/// Class name, e.g. `Blueprint`.
	pub type_name: String,
	/// Package path, e.g. `/Game/NPC/BP_Guard`.
	pub path: String,
	/// Object name.
	pub name: String,
}

impl AssetRef {
	/// Reference built from its parts.
	pub fn new(
		type_name: impl Into<String>,
		path: impl Into<String>,
		name: impl Into<String>,
	) -> Self {
		Self {
			type_name: type_name.into(),
			path: path.into(),
			name: name.into(),
		}
	}

	/// Parses the exact canonical form. Surrounding whitespace is tolerated,
	/// anything else that deviates yields `None`.
	pub fn parse(raw: &str) -> Option<Self> {
		let caps = CANONICAL_RE.captures(raw.trim())?;
		let path = &caps[2];
		if path.ends_with('/') || path.contains("//") {
			return None;
		}
		Some(Self::new(&caps[1], path, &caps[3]))
	}

	/// Identity used for deduplication. The type is deliberately not part of it.
	pub fn identity(&self) -> String {
		format!("{}.{}", self.path, self.name)
	}

	/// Graph node id of the asset.
	pub fn node_id(&self) -> String {
		format!("asset:{}", self.identity())
	}

	/// Whether the class is a blueprint.
	pub fn is_blueprint(&self) -> bool {
		self.type_name.eq_ignore_ascii_case("blueprint")
	}

	/// Kind of edge pointing at this asset.
	pub fn edge_kind(&self) -> EdgeKind {
		if self.is_blueprint() {
			EdgeKind::BlueprintRef
		} else {
			EdgeKind::AssetRef
		}
	}

	/// `true` when the asset path equals `root` or sits below it.
	pub fn is_under(&self, root: &str) -> bool {
		path_is_under(&self.path, root)
	}

	/// First folder below `content_root`, or `"Root"` for assets directly in it.
	pub fn folder_bucket(&self, content_root: &str) -> String {
		folder_bucket(&self.path, content_root)
	}
}

impl fmt::Display for AssetRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}'{}.{}'", self.type_name, self.path, self.name)
	}
}

/// First folder segment of an asset package path below `content_root`.
///
/// The last segment of `path` is the package itself and never counts as a folder.
pub fn folder_bucket(path: &str, content_root: &str) -> String {
	let folder = path.rsplit_once('/').map(|(f, _)| f).unwrap_or("");
	let root = content_root.trim_end_matches('/');
	let relative = if !root.is_empty() && path_is_under(folder, root) {
		&folder[root.len()..]
	} else {
		folder
	};
	relative
		.split('/')
		.find(|segment| !segment.is_empty())
		.unwrap_or("Root")
		.to_string()
}

/// Segment-aware containment: `/Game/NPC` holds `/Game/NPC/Guard` but not
/// `/Game/NPCs`.
pub fn path_is_under(path: &str, root: &str) -> bool {
	let root = root.trim_end_matches('/');
	if root.is_empty() {
		return path.starts_with('/');
	}
	match path.strip_prefix(root) {
		Some(rest) => rest.is_empty() || rest.starts_with('/'),
		None => false,
	}
}

/// What a reference points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
	/// A page.
	Page,
	/// An asset.
	Asset,
}

/// One reference found on a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
	/// Wiki link resolved to a page.
	Page {
		/// Id of the linked page.
		page_id: String,
		/// Text as written.
		raw: String,
	},
	/// Canonical asset reference.
	Asset {
		/// Parsed reference.
		asset: AssetRef,
		/// Text as written.
		raw: String,
	},
}

impl Reference {
	/// What this reference points at.
	pub fn target_kind(&self) -> TargetKind {
		match self {
			Self::Page { .. } => TargetKind::Page,
			Self::Asset { .. } => TargetKind::Asset,
		}
	}

	/// Text as written in the page.
	pub fn raw(&self) -> &str {
		match self {
			Self::Page { raw, .. } | Self::Asset { raw, .. } => raw,
		}
	}

	/// Kind of edge this reference produces.
	pub fn edge_kind(&self) -> EdgeKind {
		match self {
			Self::Page { .. } => EdgeKind::Doc,
			Self::Asset { asset, .. } => asset.edge_kind(),
		}
	}
}

/// Collect wiki-link references from Markdown, in order of appearance.
pub fn parse_markdown(markdown: &str, titles: &TitleIndex, out: &mut Vec<Reference>) {
	for caps in WIKI_LINK_RE.captures_iter(markdown) {
		let inner = &caps[1];
		let target = inner.split('|').next().unwrap_or(inner).trim();
		if target.is_empty() {
			continue;
		}
		if let Some(asset) = AssetRef::parse(target) {
			out.push(Reference::Asset {
				asset,
				raw: target.to_string(),
			});
		} else if let Some(page_id) = titles.resolve_title(target) {
			out.push(Reference::Page {
				page_id: page_id.to_string(),
				raw: target.to_string(),
			});
		}
	}
}

/// All references of a page: body first, then canvas blocks in block order.
pub fn parse_page(page: &Page, titles: &TitleIndex) -> Vec<Reference> {
	let mut refs = Vec::new();
	parse_markdown(&page.body, titles, &mut refs);
	for block in page.typed_blocks() {
		match block {
			Block::Text { markdown } => parse_markdown(&markdown, titles, &mut refs),
			Block::Asset { reference } => {
				if let Some(asset) = AssetRef::parse(&reference) {
					refs.push(Reference::Asset {
						asset,
						raw: reference,
					});
				}
			}
			Block::Link { page_id } => {
				if titles.has_id(&page_id) {
					refs.push(Reference::Page {
						raw: page_id.clone(),
						page_id,
					});
				}
			}
		}
	}
	refs
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::graph::corpus::{PageCorpus, RawBlock};

	fn titles() -> TitleIndex {
		PageCorpus::new(vec![
			Page::new("b", "B"),
			Page::new("hall", "Bob's Hall"),
		])
		.titles()
	}

	#[test]
	fn canonical_ref_parses_bit_exact() {
		let asset = AssetRef::parse("Blueprint'/Game/NPC/BP_Guard.BP_Guard'").unwrap();
		assert_eq!(asset.type_name, "Blueprint");
		assert_eq!(asset.path, "/Game/NPC/BP_Guard");
		assert_eq!(asset.name, "BP_Guard");
		assert_eq!(asset.node_id(), "asset:/Game/NPC/BP_Guard.BP_Guard");
		assert_eq!(asset.to_string(), "Blueprint'/Game/NPC/BP_Guard.BP_Guard'");
	}

	#[test]
	fn path_extends_to_last_dot() {
		let asset = AssetRef::parse("Texture2D'/Game/v1.2/T_Rock.T_Rock'").unwrap();
		assert_eq!(asset.path, "/Game/v1.2/T_Rock");
		assert_eq!(asset.name, "T_Rock");
	}

	#[test]
	fn malformed_refs_are_rejected() {
		for raw in [
			"Blueprint'/Game/NPC/BP_Guard'",
			"Blueprint'Game/NPC/BP_Guard.BP_Guard'",
			"Blueprint'/Game/NPC/BP_Guard.BP_Guard",
			"'/Game/NPC/BP_Guard.BP_Guard'",
			"Blue print'/Game/A.A'",
			"Blueprint'/Game/NPC/.BP_Guard'",
			"Blueprint'/Game/A.B/C'",
		] {
			assert_eq!(AssetRef::parse(raw), None, "{raw}");
		}
	}

	#[test]
	fn wiki_links_resolve_pages_and_assets() {
		let mut refs = Vec::new();
		parse_markdown(
			"see [[b]] and [[Blueprint'/Game/NPC/BP_Guard.BP_Guard']] or [[B|the B page]]",
			&titles(),
			&mut refs,
		);
		assert_eq!(refs.len(), 3);
		assert_eq!(refs[0].target_kind(), TargetKind::Page);
		assert_eq!(refs[0].edge_kind(), EdgeKind::Doc);
		assert_eq!(refs[1].edge_kind(), EdgeKind::BlueprintRef);
		assert_eq!(refs[2].raw(), "B");
	}

	#[test]
	fn apostrophe_titles_fall_back_to_page_lookup() {
		let mut refs = Vec::new();
		parse_markdown("[[Bob's Hall]] [[Bob's Shed]] [[]] [[ ]]", &titles(), &mut refs);
		assert_eq!(
			refs,
			vec![Reference::Page {
				page_id: "hall".into(),
				raw: "Bob's Hall".into()
			}]
		);
	}

	#[test]
	fn blocks_contribute_after_body() {
		let page = Page::new("a", "A")
			.with_body("[[B]]")
			.with_block(RawBlock::new("asset", json!({"reference": "StaticMesh'/Game/SM_Box.SM_Box'"})))
			.with_block(RawBlock::new("asset", json!({"reference": "not a ref"})))
			.with_block(RawBlock::new("link", json!({"pageId": "hall"})))
			.with_block(RawBlock::new("link", json!({"pageId": "ghost"})));

		let refs = parse_page(&page, &titles());
		let kinds: Vec<EdgeKind> = refs.iter().map(Reference::edge_kind).collect();
		assert_eq!(kinds, vec![EdgeKind::Doc, EdgeKind::AssetRef, EdgeKind::Doc]);
		assert_eq!(refs[2].raw(), "hall");
	}

	#[test]
	fn folder_bucket_strips_content_root() {
		let nested = AssetRef::parse("Blueprint'/Game/NPC/Guards/BP_Guard.BP_Guard'").unwrap();
		let top = AssetRef::parse("Texture'/Game/T_Sky.T_Sky'").unwrap();
		let engine = AssetRef::parse("StaticMesh'/Engine/Basic/Cube.Cube'").unwrap();
		assert_eq!(nested.folder_bucket("/Game"), "NPC");
		assert_eq!(top.folder_bucket("/Game/"), "Root");
		assert_eq!(engine.folder_bucket("/Game"), "Engine");
	}

	#[test]
	fn containment_respects_segments() {
		assert!(path_is_under("/Game/NPC/BP_Guard", "/Game/NPC"));
		assert!(path_is_under("/Game/NPC", "/Game/NPC/"));
		assert!(!path_is_under("/Game/NPCs/BP_Guard", "/Game/NPC"));
	}
}
