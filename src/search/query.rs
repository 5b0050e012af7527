//! Query parameter validation / 查询参数校验

use std::num::IntErrorKind;

use crate::config::AppConfig;
use crate::error::ValidationError;

/// Minimum total characters across all search terms / 搜索词最小总长度
pub const MIN_QUERY_CHARS: usize = 3;

/// Fallback when the config has no `max_results` / 默认最大结果数
const DEFAULT_MAX_RESULTS: i64 = 100;

/// Raw query string parameters / 原始查询参数
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub match_all: Option<String>,
}

impl SearchParams {
    /// Build from decoded query pairs; a repeated key keeps its first value
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "q" => &mut params.q,
                "limit" => &mut params.limit,
                "match_all" => &mut params.match_all,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

/// Validated search request / 校验后的搜索请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// Sent to the index unmodified
    pub raw_query: String,
    /// Lower-cased terms, only used for local filtering
    pub search_terms: Vec<String>,
    pub limit: usize,
    pub match_all: bool,
}

impl QueryRequest {
    pub fn from_params(params: &SearchParams, config: &AppConfig) -> Result<Self, ValidationError> {
        let raw_query = match params.q.as_deref() {
            Some(q) if !q.is_empty() => q.to_string(),
            _ => return Err(ValidationError::MissingQuery),
        };

        let terms = split_terms(&raw_query);
        let length: usize = terms.iter().map(|t| t.chars().count()).sum();
        if length < MIN_QUERY_CHARS {
            return Err(ValidationError::QueryTooShort { length });
        }

        let limit = match params.limit.as_deref() {
            Some(raw) => parse_limit(raw)?,
            None => positive_limit(config.get_int("Search", "max_results", DEFAULT_MAX_RESULTS))?,
        };

        Ok(Self {
            search_terms: terms.iter().map(|t| t.to_lowercase()).collect(),
            raw_query,
            limit,
            match_all: parse_match_all(params.match_all.as_deref()),
        })
    }
}

/// Integer limit; values past the integer range saturate instead of failing
pub fn parse_limit(raw: &str) -> Result<usize, ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(value) => positive_limit(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(usize::MAX),
            IntErrorKind::NegOverflow => Err(ValidationError::LimitNotPositive),
            _ => Err(ValidationError::InvalidLimit),
        },
    }
}

fn positive_limit(value: i64) -> Result<usize, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::LimitNotPositive);
    }
    Ok(usize::try_from(value).unwrap_or(usize::MAX))
}

/// Whitespace split, trimmed, empties dropped / 按空白拆分搜索词
pub fn split_terms(query: &str) -> Vec<&str> {
    query
        .split_whitespace()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Only "false", "0" and "no" turn matching off; absence means on
pub fn parse_match_all(value: Option<&str>) -> bool {
    match value {
        Some(v) => !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"),
        None => true,
    }
}
