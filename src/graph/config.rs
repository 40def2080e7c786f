//! Engine tunables supplied by the host.

use serde::{Deserialize, Serialize};

use super::error::Result;

/// Physics parameters handed to the force layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
	/// Repulsion between every pair of nodes.
	pub force_charge: f32,
	/// Pull along each edge.
	pub force_spring: f32,
	/// Cap on the force applied to one node per tick.
	pub force_max: f32,
	/// Velocity multiplier.
	pub node_speed: f32,
	/// Fraction of velocity kept from one tick to the next.
	pub damping_factor: f32,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

/// Engine configuration. Every field has a default, so a host may pass `{}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
	/// Mount point stripped from asset paths before folder bucketing.
	pub content_root: String,
	/// Maximum number of search hits returned.
	pub search_limit: usize,
	/// Hop radius used when the host focuses a node without choosing one.
	pub focus_hops: u32,
	/// Mean per-tick node displacement under which the layout counts as settled.
	pub convergence_threshold: f32,
	/// Ticks before convergence may be reported.
	pub min_ticks: u32,
	/// Hard stop for layouts that never settle.
	pub max_ticks: u32,
	/// Frame time fed to the simulation by the canvas host.
	pub tick_seconds: f32,
	/// Force parameters handed to [`ForceLayout`](super::ForceLayout).
	pub simulation: SimulationConfig,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			content_root: "/Game".into(),
			search_limit: 8,
			focus_hops: 1,
			convergence_threshold: 0.05,
			min_ticks: 30,
			max_ticks: 600,
			tick_seconds: 0.016,
			simulation: SimulationConfig::default(),
		}
	}
}

impl GraphConfig {
	/// Parse a JSON config blob, filling missing fields with defaults.
	pub fn from_json(raw: &str) -> Result<Self> {
		Ok(serde_json::from_str(raw)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_object_yields_defaults() {
		let config = GraphConfig::from_json("{}").unwrap();
		assert_eq!(config, GraphConfig::default());
	}

	#[test]
	fn partial_override_keeps_other_defaults() {
		let config =
			GraphConfig::from_json(r#"{"searchLimit": 3, "simulation": {"forceCharge": 80.0}}"#)
				.unwrap();
		assert_eq!(config.search_limit, 3);
		assert_eq!(config.content_root, "/Game");
		assert_eq!(config.simulation.force_charge, 80.0);
		assert_eq!(config.simulation.damping_factor, 0.9);
	}

	#[test]
	fn malformed_json_is_an_error() {
		assert!(GraphConfig::from_json("{searchLimit").is_err());
	}
}
