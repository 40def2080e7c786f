//! Page corpus as handed over by the document store.
//!
//! Canvas blocks arrive with a free-form `content` payload whose shape depends on
//! the block kind. [`Block::from_raw`] turns the kinds the graph cares about into
//! typed variants and skips everything else.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::Result;

/// Metadata attached to a page by the editor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageMeta {
	/// Canonical reference of the asset this page documents.
	#[serde(alias = "documentsAsset")]
	pub documents: Option<String>,
}

/// A canvas block exactly as stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
	/// Block id, only used in log lines.
	#[serde(default)]
	pub id: String,
	/// Block type, e.g. `text`, `asset` or `link`.
	#[serde(alias = "type")]
	pub kind: String,
	/// Type-specific payload.
	#[serde(default)]
	pub content: Value,
}

impl RawBlock {
	/// Block of `kind` with `content` and no id.
	pub fn new(kind: impl Into<String>, content: Value) -> Self {
		Self {
			id: String::new(),
			kind: kind.into(),
			content,
		}
	}

	fn field(&self, name: &str) -> Option<&str> {
		self.content.get(name).and_then(Value::as_str)
	}
}

/// Canvas blocks that can carry references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
	/// Free text scanned for wiki links.
	Text {
		/// Markdown source.
		markdown: String,
	},
	/// An embedded asset.
	Asset {
		/// Canonical asset reference.
		reference: String,
	},
	/// A link to another page.
	Link {
		/// Target page id.
		page_id: String,
	},
}

impl Block {
	/// Returns `None` for kinds without references and for payloads missing the
	/// expected field.
	pub fn from_raw(raw: &RawBlock) -> Option<Self> {
		let block = match raw.kind.to_ascii_lowercase().as_str() {
			"text" | "markdown" => {
				let markdown = match &raw.content {
					Value::String(s) => Some(s.as_str()),
					_ => raw.field("text").or_else(|| raw.field("markdown")),
				};
				markdown.map(|m| Block::Text {
					markdown: m.to_string(),
				})
			}
			"asset" => raw.field("reference").map(|r| Block::Asset {
				reference: r.to_string(),
			}),
			"link" => raw.field("pageId").map(|p| Block::Link {
				page_id: p.to_string(),
			}),
			_ => None,
		};
		if block.is_none() {
			debug!("skipping canvas block '{}' of kind '{}'", raw.id, raw.kind);
		}
		block
	}
}

/// A documentation page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
	/// Stable page id.
	pub id: String,
	/// Title that wiki links resolve against.
	pub title: String,
	/// Category shown in grouping and search.
	#[serde(default)]
	pub category: Option<String>,
	/// Tags, first one used for tag grouping.
	#[serde(default)]
	pub tags: Vec<String>,
	/// Markdown body.
	#[serde(default, alias = "content")]
	pub body: String,
	/// Canvas blocks.
	#[serde(default)]
	pub blocks: Vec<RawBlock>,
	/// Page metadata.
	#[serde(default)]
	pub meta: PageMeta,
}

impl Page {
	/// Empty page with the given id and title.
	pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			title: title.into(),
			category: None,
			tags: Vec::new(),
			body: String::new(),
			blocks: Vec::new(),
			meta: PageMeta::default(),
		}
	}

	/// Replace the Markdown body.
	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = body.into();
		self
	}

	/// Set the category.
	pub fn with_category(mut self, category: impl Into<String>) -> Self {
		self.category = Some(category.into());
		self
	}

	/// Replace the tags.
	pub fn with_tags<I, T>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: Into<String>,
	{
		self.tags = tags.into_iter().map(Into::into).collect();
		self
	}

	/// Append a canvas block.
	pub fn with_block(mut self, block: RawBlock) -> Self {
		self.blocks.push(block);
		self
	}

	/// Declare the page as documentation of `reference`.
	pub fn documenting(mut self, reference: impl Into<String>) -> Self {
		self.meta.documents = Some(reference.into());
		self
	}

	/// Typed view over the blocks that can carry references.
	pub fn typed_blocks(&self) -> impl Iterator<Item = Block> + '_ {
		self.blocks.iter().filter_map(Block::from_raw)
	}
}

/// All pages of one project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCorpus {
	/// Pages in project order.
	pub pages: Vec<Page>,
}

impl PageCorpus {
	/// Corpus over `pages`.
	pub fn new(pages: Vec<Page>) -> Self {
		Self { pages }
	}

	/// Parse a JSON array of pages.
	pub fn from_json(raw: &str) -> Result<Self> {
		Ok(serde_json::from_str(raw)?)
	}

	/// Title lookup for wiki-link resolution.
	pub fn titles(&self) -> TitleIndex {
		TitleIndex::new(&self.pages)
	}
}

/// Case-insensitive title lookup plus the set of known page ids.
#[derive(Clone, Debug, Default)]
pub struct TitleIndex {
	by_title: HashMap<String, String>,
	ids: HashSet<String>,
}

impl TitleIndex {
	/// Index over `pages`.
	pub fn new(pages: &[Page]) -> Self {
		let mut by_title = HashMap::with_capacity(pages.len());
		let mut ids = HashSet::with_capacity(pages.len());
		for page in pages {
			// First page with a given title wins.
			by_title
				.entry(page.title.trim().to_lowercase())
				.or_insert_with(|| page.id.clone());
			ids.insert(page.id.clone());
		}
		Self { by_title, ids }
	}

	/// Page id for `title`, ignoring case and surrounding whitespace.
	pub fn resolve_title(&self, title: &str) -> Option<&str> {
		self.by_title
			.get(&title.trim().to_lowercase())
			.map(String::as_str)
	}

	/// Whether some page has the id `id`.
	pub fn has_id(&self, id: &str) -> bool {
		self.ids.contains(id)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn typed_blocks_skip_unknown_and_incomplete_kinds() {
		let page = Page::new("p", "P")
			.with_block(RawBlock::new("asset", json!({"reference": "Texture'/Game/T_Rock.T_Rock'"})))
			.with_block(RawBlock::new("image", json!({"src": "rock.png"})))
			.with_block(RawBlock::new("link", json!({"label": "no page id"})))
			.with_block(RawBlock::new("link", json!({"pageId": "q"})))
			.with_block(RawBlock::new("text", json!("see [[Q]]")));

		let blocks: Vec<Block> = page.typed_blocks().collect();
		assert_eq!(
			blocks,
			vec![
				Block::Asset {
					reference: "Texture'/Game/T_Rock.T_Rock'".into()
				},
				Block::Link {
					page_id: "q".into()
				},
				Block::Text {
					markdown: "see [[Q]]".into()
				},
			]
		);
	}

	#[test]
	fn corpus_parses_editor_json() {
		let corpus = PageCorpus::from_json(
			r#"[
				{"id": "a", "title": "Guard", "category": "NPC", "tags": ["ai"],
				 "content": "[[Patrol]]",
				 "blocks": [{"id": "b1", "type": "asset", "content": {"reference": "Blueprint'/Game/BP.BP'"}}],
				 "meta": {"documentsAsset": "Blueprint'/Game/BP.BP'"}},
				{"id": "b", "title": "Patrol"}
			]"#,
		)
		.unwrap();

		assert_eq!(corpus.pages.len(), 2);
		let guard = &corpus.pages[0];
		assert_eq!(guard.body, "[[Patrol]]");
		assert_eq!(guard.blocks[0].kind, "asset");
		assert_eq!(guard.meta.documents.as_deref(), Some("Blueprint'/Game/BP.BP'"));
		assert!(corpus.pages[1].tags.is_empty());
	}

	#[test]
	fn title_lookup_ignores_case_and_padding() {
		let index = PageCorpus::new(vec![Page::new("1", "Main Hall")]).titles();
		assert_eq!(index.resolve_title("  main HALL "), Some("1"));
		assert_eq!(index.resolve_title("Side Hall"), None);
		assert!(index.has_id("1"));
	}
}
