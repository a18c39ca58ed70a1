// SPDX-License-Identifier: AGPL-3.0-or-later
//! C FFI exports for embedding front-ends
//!
//! A front-end parses once into an opaque handle, then asks for the graph,
//! diagnostics or a layout as JSON. Every string handed out must be released
//! with `kindred_free_string`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::formats::GedcomHandler;
use crate::layout::{compute_layout, LayoutConfig};
use crate::model::ParseOutcome;
use crate::traits::{ParseConfig, Parser, RenderConfig, Renderer};

/// Opaque handle to a parsed graph
pub struct GraphHandle {
    outcome: ParseOutcome,
}

/// Result code for FFI operations
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResult {
    Success = 0,
    InvalidInput = 1,
    InvalidConfig = 2,
    RenderError = 3,
    SerializationError = 4,
    NullPointer = 5,
    Utf8Error = 6,
}

unsafe fn read_str<'a>(s: *const c_char) -> Result<&'a str, FfiResult> {
    if s.is_null() {
        return Err(FfiResult::NullPointer);
    }
    CStr::from_ptr(s).to_str().map_err(|_| FfiResult::Utf8Error)
}

unsafe fn write_string(
    output: String,
    out_content: *mut *mut c_char,
    out_length: *mut usize,
) -> FfiResult {
    let length = output.len();
    let c_string = match CString::new(output) {
        Ok(s) => s,
        Err(_) => return FfiResult::InvalidInput,
    };
    *out_length = length;
    *out_content = c_string.into_raw();
    FfiResult::Success
}

/// Parse content into a graph handle
///
/// # Safety
/// - `content` must be a valid null-terminated UTF-8 string
/// - `out_handle` must be a valid pointer to store the result
#[no_mangle]
pub unsafe extern "C" fn kindred_parse(
    content: *const c_char,
    out_handle: *mut *mut GraphHandle,
) -> FfiResult {
    if out_handle.is_null() {
        return FfiResult::NullPointer;
    }
    let content_str = match read_str(content) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let outcome = GedcomHandler::new().parse(content_str, &ParseConfig::default());
    *out_handle = Box::into_raw(Box::new(GraphHandle { outcome }));

    FfiResult::Success
}

/// Serialize the parsed graph and its diagnostics to JSON
///
/// # Safety
/// - `handle` must be a valid handle from `kindred_parse`
/// - `out_content` and `out_length` must be valid pointers
#[no_mangle]
pub unsafe extern "C" fn kindred_graph_json(
    handle: *const GraphHandle,
    out_content: *mut *mut c_char,
    out_length: *mut usize,
) -> FfiResult {
    if handle.is_null() || out_content.is_null() || out_length.is_null() {
        return FfiResult::NullPointer;
    }
    match serde_json::to_string(&(*handle).outcome) {
        Ok(json) => write_string(json, out_content, out_length),
        Err(_) => FfiResult::SerializationError,
    }
}

/// Compute a layout and return it as JSON
///
/// `config_json` may be null for the default configuration; otherwise it is
/// a JSON object with any subset of the `LayoutConfig` fields.
///
/// # Safety
/// - `handle` must be a valid handle from `kindred_parse`
/// - `config_json` must be null or a valid null-terminated UTF-8 string
/// - `out_content` and `out_length` must be valid pointers
#[no_mangle]
pub unsafe extern "C" fn kindred_layout_json(
    handle: *const GraphHandle,
    config_json: *const c_char,
    out_content: *mut *mut c_char,
    out_length: *mut usize,
) -> FfiResult {
    if handle.is_null() || out_content.is_null() || out_length.is_null() {
        return FfiResult::NullPointer;
    }

    let config: LayoutConfig = if config_json.is_null() {
        LayoutConfig::default()
    } else {
        let text = match read_str(config_json) {
            Ok(s) => s,
            Err(code) => return code,
        };
        match serde_json::from_str(text) {
            Ok(config) => config,
            Err(_) => return FfiResult::InvalidConfig,
        }
    };

    let layout = match compute_layout(&(*handle).outcome.graph, &config) {
        Ok(layout) => layout,
        Err(_) => return FfiResult::InvalidConfig,
    };
    match serde_json::to_string(&layout) {
        Ok(json) => write_string(json, out_content, out_length),
        Err(_) => FfiResult::SerializationError,
    }
}

/// Render the graph back to line format
///
/// # Safety
/// - `handle` must be a valid handle from `kindred_parse`
/// - `out_content` and `out_length` must be valid pointers
#[no_mangle]
pub unsafe extern "C" fn kindred_render(
    handle: *const GraphHandle,
    out_content: *mut *mut c_char,
    out_length: *mut usize,
) -> FfiResult {
    if handle.is_null() || out_content.is_null() || out_length.is_null() {
        return FfiResult::NullPointer;
    }
    match GedcomHandler::new().render(&(*handle).outcome.graph, &RenderConfig::default()) {
        Ok(text) => write_string(text, out_content, out_length),
        Err(_) => FfiResult::RenderError,
    }
}

/// Number of diagnostics produced by the parse
///
/// # Safety
/// - `handle` must be a valid graph handle or null
#[no_mangle]
pub unsafe extern "C" fn kindred_diagnostic_count(handle: *const GraphHandle) -> usize {
    if handle.is_null() {
        return 0;
    }
    (*handle).outcome.diagnostics.len()
}

/// Free a graph handle
///
/// # Safety
/// - `handle` must be a valid graph handle or null
#[no_mangle]
pub unsafe extern "C" fn kindred_free_graph(handle: *mut GraphHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Free a string allocated by the library
///
/// # Safety
/// - `s` must be a valid string from this library or null
#[no_mangle]
pub unsafe extern "C" fn kindred_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get library version
///
/// Returns a static string, do not free
#[no_mangle]
pub extern "C" fn kindred_version() -> *const c_char {
    static VERSION: &[u8] = b"0.1.0\0";
    VERSION.as_ptr() as *const c_char
}

/// Parse and lay out in one call, returning the layout as JSON
///
/// # Safety
/// - All pointers must be valid; `config_json` may be null
#[no_mangle]
pub unsafe extern "C" fn kindred_parse_and_layout(
    content: *const c_char,
    config_json: *const c_char,
    out_content: *mut *mut c_char,
    out_length: *mut usize,
) -> FfiResult {
    if out_content.is_null() || out_length.is_null() {
        return FfiResult::NullPointer;
    }

    let mut handle: *mut GraphHandle = ptr::null_mut();
    let parse_result = kindred_parse(content, &mut handle);
    if parse_result != FfiResult::Success {
        return parse_result;
    }

    let layout_result = kindred_layout_json(handle, config_json, out_content, out_length);
    kindred_free_graph(handle);

    layout_result
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "\
0 @I1@ INDI
0 @I2@ INDI
0 @F1@ FAM
1 HUSB @I1@
1 CHIL @I2@
1 CHIL @X@
";

    #[test]
    fn test_parse_and_graph_json() {
        let content = CString::new(INPUT).unwrap();
        let mut handle: *mut GraphHandle = ptr::null_mut();
        let mut out: *mut c_char = ptr::null_mut();
        let mut len = 0usize;

        unsafe {
            assert_eq!(kindred_parse(content.as_ptr(), &mut handle), FfiResult::Success);
            assert!(!handle.is_null());
            assert_eq!(kindred_diagnostic_count(handle), 1);

            assert_eq!(kindred_graph_json(handle, &mut out, &mut len), FfiResult::Success);
            let json = CStr::from_ptr(out).to_str().unwrap();
            assert_eq!(json.len(), len);
            let value: serde_json::Value = serde_json::from_str(json).unwrap();
            assert_eq!(value["unions"][0]["children"][0], "I2");

            kindred_free_string(out);
            kindred_free_graph(handle);
        }
    }

    #[test]
    fn test_layout_rejects_bad_config() {
        let content = CString::new(INPUT).unwrap();
        let config = CString::new(r#"{"node_size": -1.0}"#).unwrap();
        let mut out: *mut c_char = ptr::null_mut();
        let mut len = 0usize;

        unsafe {
            let result =
                kindred_parse_and_layout(content.as_ptr(), config.as_ptr(), &mut out, &mut len);
            assert_eq!(result, FfiResult::InvalidConfig);
            assert!(out.is_null());

            let result =
                kindred_parse_and_layout(content.as_ptr(), ptr::null(), &mut out, &mut len);
            assert_eq!(result, FfiResult::Success);
            let value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(out).to_str().unwrap()).unwrap();
            assert!(value["person_positions"].get("I1").is_some());
            kindred_free_string(out);
        }
    }
}
