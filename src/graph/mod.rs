//! Knowledge graph of documentation pages and the assets they reference.
//!
//! ```text
//! PageCorpus ─ builder ─> raw GraphModel ─ coverage ─> annotated ─ grouping ─> rendered
//!                                                                        │
//!                          LayoutCache <──> LayoutState <── LayoutOracle ┘
//! ```
//!
//! [`GraphEngine`] owns the pipeline; the stages are plain functions and can be
//! used on their own.

mod builder;
mod config;
mod corpus;
mod coverage;
mod engine;
mod error;
mod focus;
mod grouping;
mod inventory;
mod layout;
mod model;
mod refs;
mod search;
mod simulation;

pub use builder::build;
pub use config::{GraphConfig, SimulationConfig};
pub use corpus::{Block, Page, PageCorpus, PageMeta, RawBlock, TitleIndex};
pub use coverage::{
	AssetInventory, BrokenRefs, CoverageStats, DocIndex, classify, coverage_stats, status_of,
};
pub use engine::{GraphEngine, TickStatus};
pub use error::{GraphError, Result};
pub use focus::{FocusView, neighborhood};
pub use grouping::{ALL_KEY, GroupMode, group, group_keys, group_node_id, key_of};
pub use inventory::{AssetRecord, StaticInventory, infer_type};
pub use layout::{LayoutCache, LayoutKey, LayoutState, LayoutStore, MemoryStore, Position};
pub use model::{DocStatus, EdgeKind, GraphEdge, GraphModel, GraphNode, NodeKind};
pub use refs::{AssetRef, Reference, TargetKind, folder_bucket, parse_markdown, parse_page, path_is_under};
pub use search::search;
pub use simulation::{Convergence, ForceLayout, LayoutOracle};
