//! Search executor / 搜索执行器
//!
//! Drives the index through one locked set → query → enumerate sequence, then
//! filters and caps locally. Per-field and per-candidate read failures are
//! replaced by placeholders so one bad entry never fails a search.

use parking_lot::Mutex;

use super::backend::{IndexBackend, IndexItem, RequestFlags};
use super::models::{SearchResponse, SearchResult};
use super::query::QueryRequest;
use crate::error::{FieldError, SearchError};

/// Characters of the cause kept in a filename placeholder
const FILENAME_ERROR_MAX_CHARS: usize = 50;

pub struct SearchExecutor {
    backend: Mutex<Box<dyn IndexBackend>>,
}

impl SearchExecutor {
    pub fn new(backend: Box<dyn IndexBackend>) -> Self {
        Self {
            backend: Mutex::new(backend),
        }
    }

    pub fn execute(&self, request: &QueryRequest) -> Result<SearchResponse, SearchError> {
        tracing::info!(
            "Performing search with query: '{}', max_results: {}, match_all: {}",
            request.raw_query,
            request.limit,
            request.match_all
        );

        let candidates = self.fetch_candidates(&request.raw_query)?;
        let total_count = candidates.len();

        let mut results = if request.match_all && !request.search_terms.is_empty() {
            tracing::info!(
                "Filtering results to match all search terms: {:?}",
                request.search_terms
            );
            let matched: Vec<SearchResult> = candidates
                .into_iter()
                .filter(|r| matches_all_terms(&r.path, &request.search_terms))
                .collect();
            tracing::info!(
                "After filtering: {} of {} results match all terms",
                matched.len(),
                total_count
            );
            matched
        } else {
            candidates
        };

        if results.len() > request.limit {
            results.truncate(request.limit);
            tracing::info!("Limited to {} results", request.limit);
        }

        let original_query = request.match_all.then(|| request.raw_query.clone());
        Ok(SearchResponse::new(
            results,
            request.raw_query.clone(),
            Some(total_count),
            original_query,
        ))
    }

    /// Everything keeps query state per handle; hold the lock for the whole sequence
    fn fetch_candidates(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let mut backend = self.backend.lock();

        backend.set_search(query);
        backend.set_request_flags(
            RequestFlags::FULL_PATH_AND_FILE_NAME | RequestFlags::DATE_MODIFIED | RequestFlags::SIZE,
        );

        if !backend.query() {
            let error = backend.last_error();
            tracing::error!("Search failed: {}", error);
            return Err(SearchError::Backend(error));
        }

        let count = backend.result_count();
        tracing::info!("Found {} initial results from Everything SDK", count);

        let candidates = (0..count)
            .map(|i| match backend.result(i) {
                Ok(item) => read_item(i, item.as_ref()),
                Err(e) => {
                    tracing::error!("Error processing search result {}: {}", i, e);
                    SearchResult::placeholder(i)
                }
            })
            .collect();

        Ok(candidates)
    }
}

/// Convert one candidate, each field isolated / 逐字段读取候选结果
fn read_item(index: usize, item: &dyn IndexItem) -> SearchResult {
    let mut result = match item.full_path() {
        Ok(path) => SearchResult::from_path(path, None, None),
        Err(e) => {
            tracing::warn!("Error getting filename for result {}: {}", index, e);
            SearchResult {
                filename: filename_error(&e),
                path: "Unknown path".to_string(),
                size: None,
                date_modified: None,
            }
        }
    };

    result.size = item.size().unwrap_or_else(|e| {
        tracing::warn!("Error getting size for result {}: {}", index, e);
        None
    });

    result.date_modified = item.date_modified().unwrap_or_else(|e| {
        tracing::warn!("Error getting date_modified for result {}: {}", index, e);
        None
    });

    result
}

fn filename_error(e: &FieldError) -> String {
    let cause: String = e.message.chars().take(FILENAME_ERROR_MAX_CHARS).collect();
    format!("Error retrieving filename: {}", cause)
}

/// Case-insensitive substring match of every term against the full path.
/// `terms` must already be lower-cased.
pub fn matches_all_terms(path: &str, terms: &[String]) -> bool {
    let path = path.to_lowercase();
    terms.iter().all(|term| path.contains(term.as_str()))
}
