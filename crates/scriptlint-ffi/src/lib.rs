#![warn(missing_docs)]
#![allow(non_camel_case_types)]
//! C API for `scriptlint-core`.
//!
//! The web-demo interface wraps one [`Document`] behind an opaque pointer:
//!
//! ```c
//! qljs_web_demo_document* doc = qljs_web_demo_create_document();
//! qljs_web_demo_set_text(doc, text, strlen(text));
//! for (const qljs_web_demo_diagnostic* d = qljs_web_demo_lint(doc); d->message; ++d) {
//!     printf("%s: %s\n", d->code, d->message);
//! }
//! qljs_web_demo_destroy_document(doc);
//! ```
//!
//! Strings returned by the API are owned by the document and stay valid until the next call
//! which modifies it.

use scriptlint_core::translation_table::LOCALE_TABLE;
use scriptlint_core::{DiagnosticSeverity, Document, LintDiagnostic};
use std::ffi::{CStr, CString, c_char, c_int};
use std::ptr;
use std::sync::OnceLock;

/// One diagnostic returned by [`qljs_web_demo_lint`].
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct qljs_web_demo_diagnostic {
    /// Translated message, or NULL in the terminating entry.
    pub message: *const c_char,
    /// E.g. `"E0034"`, or `""` in the terminating entry.
    pub code: *const c_char,
    /// 1 for errors, 2 for warnings.
    pub severity: c_int,
    /// Byte offset of the start of the diagnostic's span.
    pub begin_offset: usize,
    /// Byte offset one past the end of the diagnostic's span.
    pub end_offset: usize,
}

impl qljs_web_demo_diagnostic {
    const TERMINATOR: Self = Self {
        message: ptr::null(),
        code: c"".as_ptr(),
        severity: 0,
        begin_offset: 0,
        end_offset: 0,
    };
}

/// Opaque document handle.
pub struct qljs_web_demo_document {
    document: Document,
    // Backing storage for the pointers in `diagnostics`.
    strings: Vec<(CString, CString)>,
    diagnostics: Vec<qljs_web_demo_diagnostic>,
}

impl qljs_web_demo_document {
    fn new() -> Self {
        Self {
            document: Document::new(),
            strings: Vec::new(),
            diagnostics: vec![qljs_web_demo_diagnostic::TERMINATOR],
        }
    }

    fn lint(&mut self) -> *const qljs_web_demo_diagnostic {
        let lint_diagnostics = self.document.lint();
        self.strings = lint_diagnostics.iter().map(c_strings).collect();
        self.diagnostics = lint_diagnostics
            .iter()
            .zip(&self.strings)
            .map(|(diagnostic, (message, code))| qljs_web_demo_diagnostic {
                message: message.as_ptr(),
                code: code.as_ptr(),
                severity: c_severity(diagnostic.severity),
                begin_offset: diagnostic.begin_offset,
                end_offset: diagnostic.end_offset,
            })
            .chain([qljs_web_demo_diagnostic::TERMINATOR])
            .collect();
        self.diagnostics.as_ptr()
    }
}

fn c_strings(diagnostic: &LintDiagnostic) -> (CString, CString) {
    // Messages quote source text, which may contain NUL.
    let message = CString::new(diagnostic.message.replace('\0', "")).unwrap_or_default();
    let code = CString::new(diagnostic.code.to_string()).unwrap_or_default();
    (message, code)
}

fn c_severity(severity: DiagnosticSeverity) -> c_int {
    match severity {
        DiagnosticSeverity::Error => 1,
        DiagnosticSeverity::Warning | DiagnosticSeverity::Note => 2,
    }
}

/// `len` bytes at `data`, or nothing if `data` is NULL.
///
/// # Safety
///
/// A non-NULL `data` must point to `len` readable bytes.
unsafe fn bytes<'a>(data: *const u8, len: usize) -> &'a [u8] {
    if data.is_null() {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(data, len) }
    }
}

/// Create an empty document with the default configuration and no locale.
///
/// Free it with [`qljs_web_demo_destroy_document`].
#[unsafe(no_mangle)]
pub extern "C" fn qljs_web_demo_create_document() -> *mut qljs_web_demo_document {
    Box::into_raw(Box::new(qljs_web_demo_document::new()))
}

/// Free a document and every string it returned. NULL is ignored.
///
/// # Safety
///
/// `document` must come from [`qljs_web_demo_create_document`] and must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qljs_web_demo_destroy_document(document: *mut qljs_web_demo_document) {
    if document.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(document) });
}

/// Replace the document's source text with a copy of `len` bytes at `text`.
///
/// # Safety
///
/// `document` must be a live document; `text` must point to `len` readable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qljs_web_demo_set_text(
    document: *mut qljs_web_demo_document,
    text: *const u8,
    len: usize,
) {
    let Some(document) = (unsafe { document.as_mut() }) else {
        return;
    };
    document.document.set_text(unsafe { bytes(text, len) });
}

/// Replace the bytes `begin..end` of the source text with `len` bytes at `text`.
///
/// Returns 0 on success, or -1 if the range is out of bounds or `document` is NULL.
///
/// # Safety
///
/// `document` must be a live document; `text` must point to `len` readable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qljs_web_demo_replace_text(
    document: *mut qljs_web_demo_document,
    begin: usize,
    end: usize,
    text: *const u8,
    len: usize,
) -> c_int {
    let Some(document) = (unsafe { document.as_mut() }) else {
        return -1;
    };
    match document
        .document
        .replace_text(begin..end, unsafe { bytes(text, len) })
    {
        Ok(()) => 0,
        Err(error) => {
            tracing::debug!(%error, "rejected text replacement");
            -1
        }
    }
}

/// Replace the configuration JSON with a copy of `len` bytes at `text`.
///
/// # Safety
///
/// `document` must be a live document; `text` must point to `len` readable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qljs_web_demo_set_config_text(
    document: *mut qljs_web_demo_document,
    text: *const u8,
    len: usize,
) {
    let Some(document) = (unsafe { document.as_mut() }) else {
        return;
    };
    document.document.set_config_text(unsafe { bytes(text, len) });
}

/// Translate future messages into `locale` (e.g. `"de"`). An unknown or empty locale means
/// untranslated messages. NULL is treated as `""`.
///
/// # Safety
///
/// `document` must be a live document; a non-NULL `locale` must be a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qljs_web_demo_set_locale(
    document: *mut qljs_web_demo_document,
    locale: *const c_char,
) {
    let Some(document) = (unsafe { document.as_mut() }) else {
        return;
    };
    let locale = if locale.is_null() {
        ""
    } else {
        unsafe { CStr::from_ptr(locale) }.to_str().unwrap_or_else(|error| {
            tracing::debug!(%error, "locale is not UTF-8");
            ""
        })
    };
    document.document.set_locale(locale);
}

/// Lint the document.
///
/// Returns an array terminated by an entry whose `message` is NULL and whose `code` is `""`.
/// The array is valid until the next call taking this document.
///
/// # Safety
///
/// `document` must be a live document.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qljs_web_demo_lint(
    document: *mut qljs_web_demo_document,
) -> *const qljs_web_demo_diagnostic {
    match unsafe { document.as_mut() } {
        Some(document) => document.lint(),
        None => ptr::null(),
    }
}

struct LocaleList(Vec<*const c_char>);

// The pointers refer to the immutable `LOCALE_TABLE`.
unsafe impl Send for LocaleList {}
unsafe impl Sync for LocaleList {}

static LOCALE_LIST: OnceLock<LocaleList> = OnceLock::new();

/// Every supported locale name, including `""` (untranslated), followed by NULL.
///
/// The array and its strings live for the whole program.
#[unsafe(no_mangle)]
pub extern "C" fn qljs_list_locales() -> *const *const c_char {
    let list = LOCALE_LIST.get_or_init(|| {
        let table: &'static [u8] = LOCALE_TABLE.as_bytes();
        // Each name, the empty one included, starts after the previous NUL.
        let mut pointers = Vec::new();
        let mut start = 0;
        while start < table.len() {
            pointers.push(table[start..].as_ptr().cast::<c_char>());
            match table[start..].iter().position(|&byte| byte == 0) {
                Some(nul) => start += nul + 1,
                None => break,
            }
        }
        pointers.push(ptr::null());
        LocaleList(pointers)
    });
    list.0.as_ptr()
}
