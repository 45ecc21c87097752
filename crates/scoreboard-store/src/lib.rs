pub mod config;
pub mod database;
pub mod diagnostics;
pub mod error;
pub mod record;
pub mod schema;
pub mod shared;
pub mod store;

pub use config::StoreConfig;
pub use database::Database;
pub use diagnostics::{DiagnosticsSnapshot, Failure, FailureKind};
pub use error::StoreError;
pub use record::ScoreRecord;
pub use shared::{global, SharedStore};
pub use store::{ScoreStore, DEFAULT_LIMIT};
