//! Search result model / 搜索结果模型

use super::backend::Timestamp;

/// One normalized candidate / 单条搜索结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub filename: String,
    pub path: String,
    pub size: Option<u64>,
    pub date_modified: Option<Timestamp>,
}

impl SearchResult {
    /// Build from a full path; the filename is its last component
    pub fn from_path(path: String, size: Option<u64>, date_modified: Option<Timestamp>) -> Self {
        Self {
            filename: base_name(&path).to_string(),
            path,
            size,
            date_modified,
        }
    }

    /// Stand-in for a candidate that could not be read at all
    pub fn placeholder(index: usize) -> Self {
        Self {
            filename: format!("Error processing result {}", index),
            path: "Error".to_string(),
            size: Some(0),
            date_modified: None,
        }
    }
}

/// Last path component; both `\` and `/` separate / 提取文件名
pub fn base_name(path: &str) -> &str {
    path.rsplit(&['\\', '/'][..]).next().unwrap_or(path)
}

/// Search response / 搜索响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// The raw query sent to the index
    pub query: String,
    /// Always `results.len()`
    pub count: usize,
    /// Candidates before filtering and capping
    pub total_count: Option<usize>,
    /// Set only when term matching was requested
    pub original_query: Option<String>,
}

impl SearchResponse {
    pub fn new(
        results: Vec<SearchResult>,
        query: String,
        total_count: Option<usize>,
        original_query: Option<String>,
    ) -> Self {
        Self {
            count: results.len(),
            results,
            query,
            total_count,
            original_query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("C:\\Users\\me\\report.pdf"), "report.pdf");
        assert_eq!(base_name("/home/me/notes.txt"), "notes.txt");
        assert_eq!(base_name("C:\\mixed/sep\\file"), "file");
        assert_eq!(base_name("plain"), "plain");
        assert_eq!(base_name(""), "");
        assert_eq!(base_name("C:\\folder\\"), "");
    }

    #[test]
    fn test_count_matches_results() {
        let results = vec![
            SearchResult::from_path("C:\\a.txt".into(), Some(1), None),
            SearchResult::placeholder(1),
        ];
        let response = SearchResponse::new(results, "a.txt".into(), Some(2), None);
        assert_eq!(response.count, 2);
        assert_eq!(response.results[0].filename, "a.txt");
        assert_eq!(response.results[1].filename, "Error processing result 1");
        assert_eq!(response.results[1].size, Some(0));
    }
}
