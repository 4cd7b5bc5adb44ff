//! FFI bridge for the memcached probe.
//!
//! This crate provides C-compatible bindings that a monitoring agent module
//! can call for its discovery, status and ping items. Every call is a
//! blocking one-shot query.

use mcprobe::{DEFAULT_HOST, Endpoint, LldDocument, Probe, QueryResult, discovery, endpoint};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// Item timeout handed over by the agent, in seconds. 0 means library default.
static ITEM_TIMEOUT_SECS: AtomicU64 = AtomicU64::new(0);

/// Parse C string to Rust String
unsafe fn parse_c_string(ptr: *const c_char) -> Result<String, Box<dyn std::error::Error>> {
    if ptr.is_null() {
        return Err("null pointer".into());
    }
    unsafe { Ok(CStr::from_ptr(ptr).to_str()?.to_string()) }
}

/// Hand a Rust string to C. Interior NULs cannot cross, so they end the string.
fn into_c_string(s: String) -> *mut c_char {
    let bytes: Vec<u8> = s.into_bytes().into_iter().take_while(|&b| b != 0).collect();
    match CString::new(bytes) {
        Ok(c) => c.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn item_timeout() -> Duration {
    Duration::from_secs(ITEM_TIMEOUT_SECS.load(Ordering::Relaxed))
}

fn runtime() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

/// Build an endpoint from an optional host and port text.
///
/// # Safety
///
/// `host` must be null or a valid C string; `port` must be a valid C string.
unsafe fn make_endpoint(host: *const c_char, port: *const c_char) -> Option<Endpoint> {
    let port = unsafe { parse_c_string(port).ok()? };
    let host = if host.is_null() {
        DEFAULT_HOST.to_string()
    } else {
        unsafe { parse_c_string(host).ok()? }
    };
    Some(Endpoint::from_parts(host, &port))
}

/// Set the item processing timeout in seconds (0 = library default)
#[unsafe(no_mangle)]
pub extern "C" fn mcprobe_set_item_timeout(seconds: i32) {
    ITEM_TIMEOUT_SECS.store(u64::try_from(seconds).unwrap_or(0), Ordering::Relaxed);
}

/// Build the discovery JSON for a `memcached_inst_ports` value.
///
/// A null `config` yields an empty discovery list. Returns NULL on error.
/// Free the result with `mcprobe_string_free`.
///
/// # Safety
///
/// `config` must be null or a valid pointer to a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mcprobe_discovery(config: *const c_char) -> *mut c_char {
    let config = if config.is_null() {
        String::new()
    } else {
        match unsafe { parse_c_string(config) } {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "mcprobe_discovery: invalid config string");
                return std::ptr::null_mut();
            }
        }
    };

    let entries = discovery::format(&endpoint::parse(&config));
    match LldDocument::new(&entries).to_json() {
        Ok(json) => into_c_string(json),
        Err(e) => {
            tracing::error!(error = %e, "mcprobe_discovery: serialization failed");
            std::ptr::null_mut()
        }
    }
}

/// Query one statistic.
///
/// Returns 0 and stores the value on success. Returns -1 on failure and,
/// when `error` is not null, stores a message to free with
/// `mcprobe_string_free`.
///
/// # Safety
///
/// `host` may be null (default host). `port` and `key` must be valid C
/// strings. `value` must be a valid pointer; `error` must be null or valid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mcprobe_status(
    host: *const c_char,
    port: *const c_char,
    key: *const c_char,
    value: *mut u64,
    error: *mut *mut c_char,
) -> i32 {
    let set_error = |msg: String| {
        if !error.is_null() {
            unsafe { *error = into_c_string(msg) };
        }
        -1
    };

    if value.is_null() {
        return set_error("Invalid argument: value pointer is null".to_string());
    }

    let (endpoint, key) = unsafe {
        match (make_endpoint(host, port), parse_c_string(key)) {
            (Some(ep), Ok(k)) => (ep, k),
            _ => return set_error("Invalid number of parameters".to_string()),
        }
    };

    let rt = match runtime() {
        Ok(r) => r,
        Err(e) => return set_error(format!("Get memcached status error [{}]", e)),
    };

    let probe = Probe::new(endpoint, item_timeout());
    let result = rt.block_on(async { probe.stat(&key).await });

    match result {
        QueryResult::Found(v) => {
            unsafe { *value = v };
            0
        }
        other => set_error(other.message().unwrap_or_default()),
    }
}

/// Liveness round trip. Returns 1 when alive, 0 otherwise, never an error.
///
/// # Safety
///
/// `host` may be null (default host). `port` must be a valid C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mcprobe_ping(host: *const c_char, port: *const c_char) -> u64 {
    let Some(endpoint) = (unsafe { make_endpoint(host, port) }) else {
        return 0;
    };

    let rt = match runtime() {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create runtime");
            return 0;
        }
    };

    let probe = Probe::new(endpoint, item_timeout());
    rt.block_on(async { probe.ping().await }).as_u64()
}

/// Free a string returned by this library
///
/// # Safety
///
/// `s` must be null or a pointer returned by this library, freed only once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mcprobe_string_free(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            drop(CString::from_raw(s));
        }
    }
}
