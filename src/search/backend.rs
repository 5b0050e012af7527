//! External index capability / 外部索引能力接口
//!
//! The executor only talks to the index through `IndexBackend`, mirroring the
//! Everything SDK call sequence: set search → set flags → query → enumerate.
//! Every per-result accessor can fail on its own.

use std::fmt;
use std::ops::BitOr;

use chrono::{DateTime, Utc};

use crate::error::FieldError;

/// Metadata requested from the index (Everything `EVERYTHING_REQUEST_*`) / 请求字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestFlags(u32);

impl RequestFlags {
    pub const FULL_PATH_AND_FILE_NAME: Self = Self(0x0000_0004);
    pub const SIZE: Self = Self(0x0000_0010);
    pub const DATE_MODIFIED: Self = Self(0x0000_0040);

    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for RequestFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Modification time as reported by the index / 修改时间
///
/// Stored raw so that a value chrono cannot represent still has a textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

/// 100ns ticks between 1601-01-01 and 1970-01-01
const FILETIME_UNIX_EPOCH_TICKS: u64 = 116_444_736_000_000_000;
const FILETIME_TICKS_PER_SEC: u64 = 10_000_000;

impl Timestamp {
    pub fn from_unix(secs: i64, nanos: u32) -> Self {
        Self { secs, nanos }
    }

    /// Convert Windows FILETIME ticks / 从 FILETIME 转换
    pub fn from_filetime(ticks: u64) -> Self {
        let secs = (ticks / FILETIME_TICKS_PER_SEC) as i64
            - (FILETIME_UNIX_EPOCH_TICKS / FILETIME_TICKS_PER_SEC) as i64;
        let nanos = (ticks % FILETIME_TICKS_PER_SEC) as u32 * 100;
        Self { secs, nanos }
    }

    /// Calendar conversion, `None` when out of chrono's range
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.secs, self.nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nanos)
    }
}

/// One candidate of the current result set / 单条候选结果
pub trait IndexItem {
    /// Full path including the file name
    fn full_path(&self) -> Result<String, FieldError>;
    /// Size in bytes, `None` when the index does not know it
    fn size(&self) -> Result<Option<u64>, FieldError>;
    fn date_modified(&self) -> Result<Option<Timestamp>, FieldError>;
}

/// Handle to the external index / 外部索引句柄
///
/// Implementations keep per-handle query state, callers must not interleave two
/// searches on the same handle.
pub trait IndexBackend: Send {
    fn set_search(&mut self, query: &str);
    fn set_request_flags(&mut self, flags: RequestFlags);
    /// Run the query; `false` means failure, see `last_error`
    fn query(&mut self) -> bool;
    fn last_error(&self) -> String;
    fn result_count(&self) -> usize;
    fn result(&self, index: usize) -> Result<Box<dyn IndexItem + '_>, FieldError>;
}

/// Scripted in-memory backend for tests / 测试用内存后端
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// A candidate whose fields can each be made to fail
    #[derive(Debug, Clone)]
    pub struct MockItem {
        pub path: Result<String, String>,
        pub size: Result<Option<u64>, String>,
        pub date_modified: Result<Option<Timestamp>, String>,
    }

    impl MockItem {
        pub fn file(path: &str, size: u64) -> Self {
            Self {
                path: Ok(path.to_string()),
                size: Ok(Some(size)),
                date_modified: Ok(Some(Timestamp::from_unix(1_700_000_000, 0))),
            }
        }
    }

    impl IndexItem for MockItem {
        fn full_path(&self) -> Result<String, FieldError> {
            self.path.clone().map_err(FieldError::new)
        }

        fn size(&self) -> Result<Option<u64>, FieldError> {
            self.size.clone().map_err(FieldError::new)
        }

        fn date_modified(&self) -> Result<Option<Timestamp>, FieldError> {
            self.date_modified.clone().map_err(FieldError::new)
        }
    }

    /// Calls observed by the mock, shared with the test
    #[derive(Debug, Default)]
    pub struct Calls {
        pub searches: Vec<String>,
        pub flags: Vec<RequestFlags>,
        pub queries: usize,
    }

    /// `None` entries fail as a whole candidate
    pub struct MockBackend {
        pub items: Vec<Option<MockItem>>,
        pub fail_with: Option<String>,
        pub calls: Arc<Mutex<Calls>>,
    }

    impl MockBackend {
        pub fn new(items: Vec<MockItem>) -> Self {
            Self::with_slots(items.into_iter().map(Some).collect())
        }

        pub fn with_slots(items: Vec<Option<MockItem>>) -> Self {
            Self {
                items,
                fail_with: None,
                calls: Arc::new(Mutex::new(Calls::default())),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::with_slots(Vec::new())
            }
        }
    }

    impl IndexBackend for MockBackend {
        fn set_search(&mut self, query: &str) {
            self.calls.lock().unwrap().searches.push(query.to_string());
        }

        fn set_request_flags(&mut self, flags: RequestFlags) {
            self.calls.lock().unwrap().flags.push(flags);
        }

        fn query(&mut self) -> bool {
            self.calls.lock().unwrap().queries += 1;
            self.fail_with.is_none()
        }

        fn last_error(&self) -> String {
            self.fail_with.clone().unwrap_or_default()
        }

        fn result_count(&self) -> usize {
            self.items.len()
        }

        fn result(&self, index: usize) -> Result<Box<dyn IndexItem + '_>, FieldError> {
            match self.items.get(index) {
                Some(Some(item)) => Ok(Box::new(item.clone())),
                Some(None) => Err(FieldError::new(format!("result {} is unreadable", index))),
                None => Err(FieldError::new("Invalid index")),
            }
        }
    }
}
