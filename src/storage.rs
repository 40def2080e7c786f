//! Browser `localStorage` backing for the layout cache.

use log::warn;
use web_sys::Storage;

use crate::graph::{GraphError, LayoutStore, Result};

/// Layout store over `window.localStorage`. Reads fall back to "nothing stored"
/// when storage is unavailable (private browsing, non-browser targets).
pub struct LocalStorageStore {
	storage: Option<Storage>,
}

impl LocalStorageStore {
	/// Store over the window's `localStorage`, or a no-op store when there is none.
	pub fn new() -> Self {
		let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
		if storage.is_none() {
			warn!("localStorage unavailable, layouts will not persist");
		}
		Self { storage }
	}
}

impl Default for LocalStorageStore {
	fn default() -> Self {
		Self::new()
	}
}

impl LayoutStore for LocalStorageStore {
	fn read(&self, key: &str) -> Option<String> {
		self.storage.as_ref()?.get_item(key).ok().flatten()
	}

	fn write(&mut self, key: &str, value: String) -> Result<()> {
		let storage = self
			.storage
			.as_ref()
			.ok_or_else(|| GraphError::Store("localStorage unavailable".into()))?;
		storage
			.set_item(key, &value)
			.map_err(|err| GraphError::Store(format!("{err:?}")))
	}
}
