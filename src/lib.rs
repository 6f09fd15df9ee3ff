//! canorusml — streaming importer for CanorusML, the XML score format of
//! the Canorus music editor.
//!
//! The input is read as a sequence of markup events and turned into a
//! [`Document`]: sheets, staffs with their voices and signs, lyrics and
//! function markings. Clefs, key/time signatures and barlines repeated in
//! every voice of a staff are stored once and shared.
//!
//! # Example
//! ```no_run
//! use canorusml::parse_file;
//!
//! let document = parse_file("path/to/score.can.xml").unwrap();
//! println!("Title: {}", document.title);
//! println!("Sheets: {}", document.sheets.len());
//! println!("Staffs: {}", document.staff_count());
//! ```

pub mod dedup;
pub mod error;
pub mod events;
pub mod model;
pub mod options;
pub mod parser;
pub mod repair;
pub mod resolver;
pub mod writer;

use std::io::Read;
use std::path::Path;

pub use error::{ErrorKind, ExportError, ImportError, Position};
pub use events::{read_events, Attributes, ContentHandler};
pub use model::*;
pub use options::ImportOptions;
pub use parser::{parse_canorusml, parse_canorusml_with_options, ParserContext};
pub use writer::write_document;

/// Parse CanorusML from a string with default settings.
pub fn parse_str(xml: &str) -> Result<Document, ImportError> {
    parse_canorusml(xml)
}

/// Parse CanorusML from a string.
pub fn parse_str_with_options(xml: &str, options: &ImportOptions) -> Result<Document, ImportError> {
    parse_canorusml_with_options(xml, options)
}

/// Parse CanorusML from raw bytes, which must be UTF-8.
pub fn parse_bytes(data: &[u8]) -> Result<Document, ImportError> {
    parse_bytes_with_options(data, &ImportOptions::default())
}

pub fn parse_bytes_with_options(
    data: &[u8],
    options: &ImportOptions,
) -> Result<Document, ImportError> {
    let xml = std::str::from_utf8(data).map_err(|e| {
        let position = std::str::from_utf8(&data[..e.valid_up_to()])
            .ok()
            .map(|valid| Position::from_offset(valid, valid.len()));
        ImportError::new(
            ErrorKind::Markup(format!("invalid UTF-8 in CanorusML input: {e}")),
            position,
        )
    })?;
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    parse_canorusml_with_options(xml, options)
}

/// Parse a CanorusML file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document, ImportError> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| std::io::Error::new(e.kind(), format!("'{}': {e}", path.display())))?;
    parse_bytes(&data)
}

/// Parse CanorusML from any reader. The input is read to the end first.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Document, ImportError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    parse_bytes(&data)
}

/// Convert an imported document to a JSON string.
/// Useful for passing data across FFI boundaries.
pub fn document_to_json(document: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for hosts that consume the document as JSON
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::error;

fn json_c_string(result: Result<Document, ImportError>) -> *mut c_char {
    let document = match result {
        Ok(document) => document,
        Err(e) => {
            error!("CanorusML import failed: {e}");
            return std::ptr::null_mut();
        }
    };
    match document_to_json(&document) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(e) => {
            error!("document serialization failed: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Import a CanorusML file and return the document as a JSON C string,
/// or null on failure.
/// The caller must free the returned string with `canorusml_free_string`.
///
/// # Safety
/// `path` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn canorusml_import_file(path: *const c_char) -> *mut c_char {
    if path.is_null() {
        return std::ptr::null_mut();
    }
    let c_str = unsafe { CStr::from_ptr(path) };
    let path_str = match c_str.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };

    json_c_string(parse_file(path_str))
}

/// Import CanorusML bytes and return the document as a JSON C string, or
/// null on failure.
/// The caller must free the returned string with `canorusml_free_string`.
///
/// # Safety
/// `data` must point to `len` valid bytes.
#[no_mangle]
pub unsafe extern "C" fn canorusml_import_bytes(data: *const u8, len: usize) -> *mut c_char {
    if data.is_null() || len == 0 {
        return std::ptr::null_mut();
    }
    let bytes = unsafe { std::slice::from_raw_parts(data, len) };

    json_c_string(parse_bytes(bytes))
}

/// Free a string previously returned by canorusml functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a canorusml function, or null.
#[no_mangle]
pub unsafe extern "C" fn canorusml_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
