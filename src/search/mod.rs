//! Search module / 搜索模块
//!
//! Pipeline: `query` (validate) → `executor` (run against the index, filter,
//! cap) → `format` (JSON body). The index is reached only through
//! `backend::IndexBackend`; `everything` implements it over the Everything SDK.

pub mod backend;
pub mod everything;
pub mod executor;
pub mod format;
pub mod models;
pub mod query;

pub use backend::{IndexBackend, IndexItem, RequestFlags, Timestamp};
pub use everything::EverythingSdk;
pub use executor::SearchExecutor;
pub use format::format_response;
pub use models::{SearchResponse, SearchResult};
pub use query::{QueryRequest, SearchParams};
