//! Asset inventory built from a project's Content folder listing.
//!
//! The desktop shell walks the Content folder and hands over relative file
//! paths; this module turns them into asset records with an engine path and a
//! type guessed from the file name.

use serde::{Deserialize, Serialize};

use super::coverage::AssetInventory;
use super::refs::AssetRef;

const PACKAGE_EXTENSIONS: [&str; 2] = ["uasset", "umap"];

/// Name prefixes and the asset type they conventionally denote.
const TYPE_PREFIXES: [(&str, &str); 4] = [
	("BP_", "Blueprint"),
	("M_", "Material"),
	("SM_", "StaticMesh"),
	("T_", "Texture"),
];

/// One asset found in the Content folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
	/// Package name, e.g. `BP_Guard`.
	pub name: String,
	/// Engine path without extension, e.g. `/Game/NPC/BP_Guard`.
	pub path: String,
	/// Path of the file as listed, relative to the Content folder.
	pub file_path: String,
	/// Type guessed by [`infer_type`].
	pub asset_type: String,
}

impl AssetRecord {
	/// Record for a file listed relative to the Content folder. Files other than
	/// packages and maps yield `None`.
	pub fn from_content_file(relative: &str, mount: &str) -> Option<Self> {
		let normalized = relative.replace('\\', "/");
		let normalized = normalized.trim_start_matches('/');
		let (stem_path, ext) = normalized.rsplit_once('.')?;
		let ext = ext.to_ascii_lowercase();
		if !PACKAGE_EXTENSIONS.contains(&ext.as_str()) {
			return None;
		}
		let name = stem_path.rsplit('/').next().filter(|n| !n.is_empty())?;
		Some(Self {
			name: name.to_string(),
			path: format!("{}/{}", mount.trim_end_matches('/'), stem_path),
			file_path: relative.to_string(),
			asset_type: infer_type(name, &ext).to_string(),
		})
	}

	/// Canonical reference, e.g. `Blueprint'/Game/NPC/BP_Guard.BP_Guard'`.
	pub fn asset_ref(&self) -> AssetRef {
		AssetRef::new(&self.asset_type, &self.path, &self.name)
	}
}

/// Type guess from the file name; maps are always levels.
pub fn infer_type(name: &str, extension: &str) -> &'static str {
	if extension.eq_ignore_ascii_case("umap") {
		return "Level";
	}
	TYPE_PREFIXES
		.iter()
		.find(|(prefix, _)| name.starts_with(prefix))
		.map(|&(_, kind)| kind)
		.unwrap_or("Asset")
}

/// Inventory held in memory, typically filled from one Content scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticInventory {
	/// Records in listing order.
	pub records: Vec<AssetRecord>,
}

impl StaticInventory {
	/// Inventory from Content-relative file paths mounted at `mount`.
	pub fn from_content_files<I, P>(files: I, mount: &str) -> Self
	where
		I: IntoIterator<Item = P>,
		P: AsRef<str>,
	{
		Self {
			records: files
				.into_iter()
				.filter_map(|f| AssetRecord::from_content_file(f.as_ref(), mount))
				.collect(),
		}
	}
}

impl AssetInventory for StaticInventory {
	fn list(&self) -> Vec<AssetRef> {
		self.records.iter().map(AssetRecord::asset_ref).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn records_from_windows_and_unix_listings() {
		let record = AssetRecord::from_content_file("NPC\\Guards\\BP_Guard.uasset", "/Game").unwrap();
		assert_eq!(record.name, "BP_Guard");
		assert_eq!(record.path, "/Game/NPC/Guards/BP_Guard");
		assert_eq!(record.asset_type, "Blueprint");
		assert_eq!(
			record.asset_ref().to_string(),
			"Blueprint'/Game/NPC/Guards/BP_Guard.BP_Guard'"
		);

		let level = AssetRecord::from_content_file("Maps/BP_Arena.umap", "/Game/").unwrap();
		assert_eq!(level.asset_type, "Level");
		assert_eq!(level.path, "/Game/Maps/BP_Arena");
	}

	#[test]
	fn non_package_files_are_skipped() {
		let inventory = StaticInventory::from_content_files(
			["readme.txt", "T_Rock.uasset", "Env/SM_Tree.UASSET", "noext", "Env/.uasset"],
			"/Game",
		);
		let refs: Vec<String> = inventory.list().iter().map(ToString::to_string).collect();
		assert_eq!(
			refs,
			vec![
				"Texture'/Game/T_Rock.T_Rock'".to_string(),
				"StaticMesh'/Game/Env/SM_Tree.SM_Tree'".to_string(),
			]
		);
	}

	#[test]
	fn unknown_prefixes_are_plain_assets() {
		assert_eq!(infer_type("Guard", "uasset"), "Asset");
		assert_eq!(infer_type("M_Stone", "uasset"), "Material");
	}
}
