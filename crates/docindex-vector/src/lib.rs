//! docindex-vector
//!
//! Dense document matrix, its on-disk artifacts and the lazily-loaded query
//! handle. Build with [`build_index`], query through [`DocIndex`].

pub mod engine;
pub mod index;
pub mod index_build;
pub mod npy;
pub mod schema;
pub mod search;
pub mod status;
pub mod store;

pub use engine::DocIndex;
pub use index::{IndexedRow, VectorIndex};
pub use index_build::{build_index, BuildOutcome, BuildStats};
pub use search::cosine_top_k;
pub use status::{index_status, IndexStatus};
pub use store::IndexStore;
