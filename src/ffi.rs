//! FFI bindings for Mindwell
//!
//! This module provides C-compatible functions so the desktop shell can
//! call the evaluator directly. All functions use C strings
//! (null-terminated) and return allocated memory that must be freed by the
//! caller using `mindwell_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_double, c_int};
use std::ptr;

use chrono::Utc;

use crate::evaluator::StressEvaluator;
use crate::monitor::StressMonitor;
use crate::types::{Reading, ReadingSource};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Score four readings directly.
///
/// Returns the stress score 0-4, or -1 when any input is non-finite; call
/// `mindwell_last_error` for the error message.
#[no_mangle]
pub extern "C" fn mindwell_score(
    heart_rate_bpm: c_double,
    sleep_hours: c_double,
    noise_level_db: c_double,
    light_level_lux: c_double,
) -> c_int {
    clear_last_error();

    let reading = Reading::new(heart_rate_bpm, sleep_hours, noise_level_db, light_level_lux);
    if let Err(e) = reading.validate() {
        set_last_error(&e.to_string());
        return -1;
    }

    c_int::from(StressEvaluator::score(&reading))
}

/// Evaluate a reading supplied as JSON and return a full assessment report
/// as JSON.
///
/// # Safety
/// - `reading_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `mindwell_free_string`.
/// - Returns NULL on error; call `mindwell_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn mindwell_evaluate_json(reading_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let raw = match cstr_to_string(reading_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid reading JSON pointer");
            return ptr::null_mut();
        }
    };

    let reading: Reading = match serde_json::from_str(&raw) {
        Ok(r) => r,
        Err(e) => {
            set_last_error(&format!("Failed to parse reading: {e}"));
            return ptr::null_mut();
        }
    };

    let monitor = StressMonitor::new();
    match monitor.assess_to_json(&reading, ReadingSource::Manual, Utc::now()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the recommendation text for a score.
///
/// Returns a newly allocated string that must be freed with
/// `mindwell_free_string`. Scores of 4 or more all map to the critical
/// message.
#[no_mangle]
pub extern "C" fn mindwell_recommend(score: c_int) -> *mut c_char {
    clear_last_error();

    let clamped = score.clamp(0, i32::from(u8::MAX)) as u8;
    string_to_cstr(StressEvaluator::recommend(clamped))
}

/// Get the last error message.
///
/// Returns a pointer to thread-local storage valid until the next Mindwell
/// call on this thread, or NULL when there is no pending error. Do NOT free
/// the returned pointer.
#[no_mangle]
pub extern "C" fn mindwell_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(msg) => msg.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string allocated by Mindwell.
///
/// # Safety
/// - `ptr` must be a pointer returned by a Mindwell function, or NULL.
/// - The pointer must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn mindwell_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_over_ffi() {
        assert_eq!(mindwell_score(60.0, 7.0, 40.0, 100.0), 0);
        assert_eq!(mindwell_score(40.0, 5.0, 80.0, 250.0), 4);
    }

    #[test]
    fn test_score_rejects_nan() {
        assert_eq!(mindwell_score(f64::NAN, 7.0, 40.0, 100.0), -1);
        let err = unsafe { CStr::from_ptr(mindwell_last_error()) };
        assert!(err.to_str().unwrap().contains("heart_rate_bpm"));
    }

    #[test]
    fn test_evaluate_json_over_ffi() {
        let input = CString::new(
            r#"{"heart_rate_bpm": 60.0, "sleep_hours": 5.0, "noise_level_db": 40.0, "light_level_lux": 100.0}"#,
        )
        .unwrap();

        let out = unsafe { mindwell_evaluate_json(input.as_ptr()) };
        assert!(!out.is_null());

        let json = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_string();
        unsafe { mindwell_free_string(out) };

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["score"], 1);
        assert_eq!(parsed["level"], "slight");
    }

    #[test]
    fn test_evaluate_json_null_pointer() {
        let out = unsafe { mindwell_evaluate_json(ptr::null()) };
        assert!(out.is_null());
        assert!(!mindwell_last_error().is_null());
    }

    #[test]
    fn test_recommend_over_ffi() {
        let out = mindwell_recommend(0);
        let msg = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_string();
        unsafe { mindwell_free_string(out) };
        assert!(msg.starts_with("You are doing well"));

        // Out-of-table scores clamp to the critical message
        let out = mindwell_recommend(9);
        let msg = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_string();
        unsafe { mindwell_free_string(out) };
        assert!(msg.starts_with("Critical stress"));
    }
}
