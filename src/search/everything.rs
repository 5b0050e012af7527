//! Everything SDK binding / Everything SDK 绑定
//!
//! Loads `Everything64.dll` at runtime through `libloading` and exposes it as an
//! `IndexBackend`. The SDK talks to the running Everything service over IPC and
//! keeps its query state globally in the DLL, so one handle per process.

use std::path::Path;

use libloading::Library;

use super::backend::{IndexBackend, IndexItem, RequestFlags, Timestamp};
use crate::error::FieldError;

type Bool = i32;

/// Windows FILETIME, two DWORDs
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FileTime {
    low: u32,
    high: u32,
}

type SetSearchW = unsafe extern "system" fn(*const u16);
type SetRequestFlags = unsafe extern "system" fn(u32);
type QueryW = unsafe extern "system" fn(Bool) -> Bool;
type GetLastError = unsafe extern "system" fn() -> u32;
type GetNumResults = unsafe extern "system" fn() -> u32;
type GetResultFullPathNameW = unsafe extern "system" fn(u32, *mut u16, u32) -> u32;
type GetResultSize = unsafe extern "system" fn(u32, *mut i64) -> Bool;
type GetResultDateModified = unsafe extern "system" fn(u32, *mut FileTime) -> Bool;
type GetVersionPart = unsafe extern "system" fn() -> u32;

/// `EVERYTHING_ERROR_*` codes / 错误码说明
pub fn describe_error(code: u32) -> String {
    match code {
        0 => "OK".to_string(),
        1 => "Failed to allocate memory for the search query".to_string(),
        2 => "IPC is not available (is Everything running?)".to_string(),
        3 => "Failed to register the search query window class".to_string(),
        4 => "Failed to create the search query window".to_string(),
        5 => "Failed to create the search query thread".to_string(),
        6 => "Invalid index".to_string(),
        7 => "Invalid call".to_string(),
        other => format!("Unknown error code {}", other),
    }
}

/// Resolve one entry point as a plain function pointer.
///
/// # Safety
/// `T` must match the exported symbol's signature.
unsafe fn symbol<T: Copy>(lib: &Library, name: &str) -> anyhow::Result<T> {
    let sym = lib
        .get::<T>(name.as_bytes())
        .map_err(|e| anyhow::anyhow!("Missing symbol {}: {}", name, e))?;
    Ok(*sym)
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Loaded SDK; function pointers stay valid while `_lib` is alive
pub struct EverythingSdk {
    set_search_w: SetSearchW,
    set_request_flags: SetRequestFlags,
    query_w: QueryW,
    get_last_error: GetLastError,
    get_num_results: GetNumResults,
    get_result_full_path_name_w: GetResultFullPathNameW,
    get_result_size: GetResultSize,
    get_result_date_modified: GetResultDateModified,
    get_major_version: GetVersionPart,
    get_minor_version: GetVersionPart,
    get_revision: GetVersionPart,
    _lib: Library,
}

impl EverythingSdk {
    /// Load the DLL and resolve every entry point / 加载 DLL
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        // SAFETY: loading the Everything SDK runs no initialization code with
        // preconditions; symbols are checked below.
        let lib = unsafe { Library::new(path) }
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))?;

        let sdk = Self {
            set_search_w: unsafe { symbol(&lib, "Everything_SetSearchW")? },
            set_request_flags: unsafe { symbol(&lib, "Everything_SetRequestFlags")? },
            query_w: unsafe { symbol(&lib, "Everything_QueryW")? },
            get_last_error: unsafe { symbol(&lib, "Everything_GetLastError")? },
            get_num_results: unsafe { symbol(&lib, "Everything_GetNumResults")? },
            get_result_full_path_name_w: unsafe { symbol(&lib, "Everything_GetResultFullPathNameW")? },
            get_result_size: unsafe { symbol(&lib, "Everything_GetResultSize")? },
            get_result_date_modified: unsafe { symbol(&lib, "Everything_GetResultDateModified")? },
            get_major_version: unsafe { symbol(&lib, "Everything_GetMajorVersion")? },
            get_minor_version: unsafe { symbol(&lib, "Everything_GetMinorVersion")? },
            get_revision: unsafe { symbol(&lib, "Everything_GetRevision")? },
            _lib: lib,
        };

        tracing::info!("Everything SDK initialized successfully");
        Ok(sdk)
    }

    /// Version of the running Everything service, `None` if it is not reachable
    pub fn version(&self) -> Option<String> {
        // SAFETY: no arguments, valid while the library is loaded.
        let (major, minor, revision) = unsafe {
            (
                (self.get_major_version)(),
                (self.get_minor_version)(),
                (self.get_revision)(),
            )
        };
        if major == 0 && minor == 0 && revision == 0 {
            None
        } else {
            Some(format!("{}.{}.{}", major, minor, revision))
        }
    }

    fn last_error_code(&self) -> u32 {
        // SAFETY: see `version`.
        unsafe { (self.get_last_error)() }
    }

    fn index_arg(index: usize) -> Result<u32, FieldError> {
        u32::try_from(index).map_err(|_| FieldError::new(describe_error(6)))
    }
}

impl IndexBackend for EverythingSdk {
    fn set_search(&mut self, query: &str) {
        let wide = to_wide(query);
        // SAFETY: `wide` is NUL-terminated and the SDK copies it.
        unsafe { (self.set_search_w)(wide.as_ptr()) }
    }

    fn set_request_flags(&mut self, flags: RequestFlags) {
        // SAFETY: plain DWORD argument.
        unsafe { (self.set_request_flags)(flags.bits()) }
    }

    fn query(&mut self) -> bool {
        // SAFETY: blocking query (bWait = TRUE).
        unsafe { (self.query_w)(1) != 0 }
    }

    fn last_error(&self) -> String {
        describe_error(self.last_error_code())
    }

    fn result_count(&self) -> usize {
        // SAFETY: see `version`.
        unsafe { (self.get_num_results)() as usize }
    }

    fn result(&self, index: usize) -> Result<Box<dyn IndexItem + '_>, FieldError> {
        let index = Self::index_arg(index)?;
        if index as usize >= self.result_count() {
            return Err(FieldError::new(describe_error(6)));
        }
        Ok(Box::new(EverythingItem { sdk: self, index }))
    }
}

/// Lazy accessor for one row of the current result set
struct EverythingItem<'a> {
    sdk: &'a EverythingSdk,
    index: u32,
}

impl EverythingItem<'_> {
    fn field_error(&self, field: &str) -> FieldError {
        FieldError::new(format!(
            "{}: {}",
            field,
            describe_error(self.sdk.last_error_code())
        ))
    }
}

impl IndexItem for EverythingItem<'_> {
    fn full_path(&self) -> Result<String, FieldError> {
        // SAFETY: a null buffer asks for the required length (without NUL).
        let len = unsafe {
            (self.sdk.get_result_full_path_name_w)(self.index, std::ptr::null_mut(), 0)
        };
        if len == 0 {
            return Err(self.field_error("full path"));
        }

        let mut buf = vec![0u16; len as usize + 1];
        // SAFETY: `buf` holds `len + 1` u16 slots.
        let written = unsafe {
            (self.sdk.get_result_full_path_name_w)(self.index, buf.as_mut_ptr(), buf.len() as u32)
        };
        if written == 0 {
            return Err(self.field_error("full path"));
        }
        buf.truncate(written as usize);

        Ok(String::from_utf16_lossy(&buf))
    }

    fn size(&self) -> Result<Option<u64>, FieldError> {
        let mut size: i64 = 0;
        // SAFETY: valid out pointer.
        let ok = unsafe { (self.sdk.get_result_size)(self.index, &mut size) };
        if ok == 0 {
            return Err(self.field_error("size"));
        }
        // folders without indexed sizes report -1
        Ok(u64::try_from(size).ok())
    }

    fn date_modified(&self) -> Result<Option<Timestamp>, FieldError> {
        let mut ft = FileTime::default();
        // SAFETY: valid out pointer to a FILETIME-layout struct.
        let ok = unsafe { (self.sdk.get_result_date_modified)(self.index, &mut ft) };
        if ok == 0 {
            return Err(self.field_error("date modified"));
        }
        let ticks = (u64::from(ft.high) << 32) | u64::from(ft.low);
        // 0 and u64::MAX mean unknown
        if ticks == 0 || ticks == u64::MAX {
            return Ok(None);
        }
        Ok(Some(Timestamp::from_filetime(ticks)))
    }
}
