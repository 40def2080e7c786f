use thiserror::Error;

use super::grouping::GroupMode;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors surfaced to the host.
///
/// Malformed project data never produces one of these; it is dropped where it is
/// found. These variants signal a caller bug or a failing blob store.
#[derive(Error, Debug)]
pub enum GraphError {
	/// Node id absent from the rendered graph.
	#[error("node '{0}' is not part of the rendered graph")]
	UnknownNode(String),

	/// Group mode name that does not parse.
	#[error("unknown group mode '{0}' (expected none, category, tag or folder)")]
	UnknownGroupMode(String),

	/// Group key absent under the current mode.
	#[error("group key '{key}' does not exist in {mode} grouping")]
	UnknownGroupKey {
		/// Active mode.
		mode: GroupMode,
		/// Requested key.
		key: String,
	},

	/// The layout store rejected a write.
	#[error("layout store failure: {0}")]
	Store(String),

	/// Malformed JSON input.
	#[error(transparent)]
	Json(#[from] serde_json::Error),
}
