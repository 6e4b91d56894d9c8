//! In-memory link index: store, builder, queries and snapshots

mod builder;
mod error;
pub mod query;
mod shared;
mod snapshot;
mod store;

pub use builder::{
    BuildError, BuildResult, FileResult, IndexBuilder, NoopReporter, ProgressReporter,
    UpdateResult,
};
pub use error::{IndexError, IndexResult};
pub use query::{DEFAULT_GRAPH_DEPTH, DEFAULT_SEARCH_LIMIT, IndexStats, LinkGraph};
pub use shared::SharedIndex;
pub use snapshot::{SnapshotError, export_index, import_index};
pub use store::{LinkIndex, UpsertOutcome};
