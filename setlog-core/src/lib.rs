//! setlog core library
//!
//! Keeps a paginated, filterable, sortable view of logged exercise sets in
//! step with a remote collection.

pub mod context;
pub mod controller;
pub mod error;
pub mod exercises;
pub mod gateway;
pub mod models;
pub mod query;
pub mod session;
pub mod store;

pub use context::AppContext;
pub use controller::{Notice, NoticeKind, SetListController, SetRow};
pub use error::GatewayError;
pub use exercises::ExerciseCache;
pub use gateway::{HttpGateway, Session, SetGateway, DEFAULT_TIMEOUT};
pub use models::{Exercise, ExerciseSet, NewExercise, NewSet, SetPage, SortKey, SortOrder};
pub use query::{parse_date, QueryParams, DEFAULT_PAGE_SIZE};
pub use session::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use store::{RefreshOutcome, SetStore};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
