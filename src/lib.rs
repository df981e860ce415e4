// MemoryStore v2.0 - Order-Preserving In-Memory Record Index
// Identity lookup + filter/sort queries over a build-once record set

pub mod types;
pub mod error;
pub mod record;
pub mod identity;
pub mod options;
pub mod store;
pub mod query;

// Re-export main types
pub use store::MemoryStore;
pub use query::Query;
pub use identity::{Extractor, IdentitySpec};
pub use record::Record;
pub use options::StoreOptions;
pub use types::{DuplicatePolicy, FloatKey, Identity, KeyPart, KeyParts};
pub use error::{RecordAccessError, Result, StoreError};
