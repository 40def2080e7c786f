//! Node positions and their persistence.
//!
//! Positions are kept apart from the graph model in a [`LayoutState`] keyed by
//! node id, so they survive full rebuilds. A [`LayoutCache`] stores them in a
//! key/value [`LayoutStore`] under a namespace derived from the project, the
//! asset scope and the grouping mode.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::grouping::GroupMode;

const BLOB_VERSION: u32 = 1;

/// Node position in graph space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Position {
	/// Position at `(x, y)`.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Whether both coordinates are finite.
	pub fn is_finite(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

/// Positions by node id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutState {
	positions: HashMap<String, Position>,
}

impl LayoutState {
	/// Position of `id`, if known.
	pub fn get(&self, id: &str) -> Option<Position> {
		self.positions.get(id).copied()
	}

	/// Record the position of `id`.
	pub fn set(&mut self, id: impl Into<String>, position: Position) {
		self.positions.insert(id.into(), position);
	}

	/// Number of known positions.
	pub fn len(&self) -> usize {
		self.positions.len()
	}

	/// Whether no position is known.
	pub fn is_empty(&self) -> bool {
		self.positions.is_empty()
	}

	/// All known positions.
	pub fn iter(&self) -> impl Iterator<Item = (&str, Position)> {
		self.positions.iter().map(|(id, p)| (id.as_str(), *p))
	}

	/// Overwrite entries with those of `other`, keeping ids `other` lacks.
	pub fn merge(&mut self, other: &LayoutState) {
		for (id, position) in other.iter() {
			self.set(id, position);
		}
	}

	/// Drop every entry whose id fails `keep`.
	pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
		self.positions.retain(|id, _| keep(id));
	}

	/// Seed positions for `ids`, `None` where nothing is known.
	pub fn seeds<'a, I>(&self, ids: I) -> Vec<(&'a str, Option<Position>)>
	where
		I: IntoIterator<Item = &'a str>,
	{
		ids.into_iter().map(|id| (id, self.get(id))).collect()
	}
}

impl FromIterator<(String, Position)> for LayoutState {
	fn from_iter<T: IntoIterator<Item = (String, Position)>>(iter: T) -> Self {
		Self {
			positions: iter.into_iter().collect(),
		}
	}
}

/// Cache namespace. A different scope or grouping mode means a different key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayoutKey {
	/// Project the layout belongs to.
	pub project_id: String,
	/// Scope root, `None` for the whole project.
	pub scope_root: Option<String>,
	pub mode: GroupMode,
}

impl LayoutKey {
	/// Key for `project_id` under `scope_root` and `mode`.
	pub fn new(project_id: impl Into<String>, scope_root: Option<&str>, mode: GroupMode) -> Self {
		Self {
			project_id: project_id.into(),
			scope_root: scope_root.map(str::to_string),
			mode,
		}
	}

	/// Key the blob is stored under.
	pub fn storage_key(&self) -> String {
		format!(
			"doc-graph:layout:{}:{}:{}",
			self.project_id,
			self.scope_root.as_deref().unwrap_or("all"),
			self.mode
		)
	}
}

/// Byte-addressable blob store backing the cache.
pub trait LayoutStore {
	/// Stored value for `key`, `None` when absent or unreadable.
	fn read(&self, key: &str) -> Option<String>;
	/// Store `value` under `key`.
	fn write(&mut self, key: &str, value: String) -> Result<()>;
}

/// Store kept in process memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	blobs: HashMap<String, String>,
}

impl MemoryStore {
	/// Raw stored value, for inspection.
	pub fn raw(&self, key: &str) -> Option<&str> {
		self.blobs.get(key).map(String::as_str)
	}
}

impl LayoutStore for MemoryStore {
	fn read(&self, key: &str) -> Option<String> {
		self.blobs.get(key).cloned()
	}

	fn write(&mut self, key: &str, value: String) -> Result<()> {
		self.blobs.insert(key.to_string(), value);
		Ok(())
	}
}

#[derive(Serialize, Deserialize)]
struct LayoutBlob {
	version: u32,
	positions: BTreeMap<String, Position>,
}

/// Versioned layout blobs kept in a [`LayoutStore`].
pub struct LayoutCache<S> {
	store: S,
}

impl<S: LayoutStore> LayoutCache<S> {
	/// Cache over `store`.
	pub fn new(store: S) -> Self {
		Self { store }
	}

	/// Backing store.
	pub fn store(&self) -> &S {
		&self.store
	}

	/// Backing store, mutably.
	pub fn store_mut(&mut self) -> &mut S {
		&mut self.store
	}

	/// Positions saved under `key`. Missing or unreadable data yields an empty
	/// state.
	pub fn load(&self, key: &LayoutKey) -> LayoutState {
		let storage_key = key.storage_key();
		let Some(raw) = self.store.read(&storage_key) else {
			debug!("no cached layout under {storage_key}");
			return LayoutState::default();
		};
		match serde_json::from_str::<LayoutBlob>(&raw) {
			Ok(blob) if blob.version == BLOB_VERSION => blob
				.positions
				.into_iter()
				.filter(|(_, p)| p.is_finite())
				.collect(),
			Ok(blob) => {
				warn!("discarding layout {storage_key} with version {}", blob.version);
				LayoutState::default()
			}
			Err(err) => {
				warn!("discarding unreadable layout {storage_key}: {err}");
				LayoutState::default()
			}
		}
	}

	/// Persist every finite position of `state` under `key`.
	pub fn save(&mut self, key: &LayoutKey, state: &LayoutState) -> Result<()> {
		let positions: BTreeMap<String, Position> = state
			.iter()
			.filter(|(_, p)| p.is_finite())
			.map(|(id, p)| (id.to_string(), p))
			.collect();
		let count = positions.len();
		let blob = serde_json::to_string(&LayoutBlob {
			version: BLOB_VERSION,
			positions,
		})?;
		self.store.write(&key.storage_key(), blob)?;
		debug!("saved {count} positions under {}", key.storage_key());
		Ok(())
	}
}
