//! The web-demo C API driven the way a C caller would.

use pretty_assertions::assert_eq;
use scriptlint_core::translation_table_locale_names;
use scriptlint_ffi::*;
use std::ffi::{CStr, c_char};

unsafe fn set_text(document: *mut qljs_web_demo_document, text: &str) {
    unsafe { qljs_web_demo_set_text(document, text.as_ptr(), text.len()) }
}

unsafe fn c_str<'a>(ptr: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
}

#[test]
fn empty_document_has_no_diagnostics() {
    unsafe {
        let document = qljs_web_demo_create_document();
        let diagnostics = qljs_web_demo_lint(document);
        assert!((*diagnostics).message.is_null());
        assert_eq!(c_str((*diagnostics).code), "");
        qljs_web_demo_destroy_document(document);
    }
}

#[test]
fn lint_error_after_text_insertion() {
    unsafe {
        let document = qljs_web_demo_create_document();
        set_text(document, "let x;let x;");
        let diagnostics = qljs_web_demo_lint(document);
        let first = *diagnostics;
        let terminator = *diagnostics.add(1);
        assert!(terminator.message.is_null());
        assert_eq!(c_str(terminator.code), "");

        assert_eq!(c_str(first.message), "redeclaration of variable: x");
        assert_eq!(c_str(first.code), "E0034");
        assert_eq!(first.severity, 1);
        assert_eq!(first.begin_offset, "let x;let ".len());
        assert_eq!(first.end_offset, "let x;let x".len());
        qljs_web_demo_destroy_document(document);
    }
}

#[test]
fn lint_new_error_after_second_text_insertion() {
    unsafe {
        let document = qljs_web_demo_create_document();
        set_text(document, "let x;");
        assert!((*qljs_web_demo_lint(document)).message.is_null());

        set_text(document, "let x;let x;");
        let diagnostics = qljs_web_demo_lint(document);
        assert_eq!(c_str((*diagnostics).message), "redeclaration of variable: x");
        assert_eq!(c_str((*diagnostics).code), "E0034");
        assert!((*diagnostics.add(1)).message.is_null());
        qljs_web_demo_destroy_document(document);
    }
}

#[test]
fn setting_locale_changes_messages_forever() {
    unsafe {
        let document = qljs_web_demo_create_document();
        qljs_web_demo_set_locale(document, c"en_US@snarky".as_ptr());

        set_text(document, "let x;let x;");
        let diagnostics = qljs_web_demo_lint(document);
        assert_eq!(
            c_str((*diagnostics).message),
            "you couldn't get enough of x, so you had to make two, huh?"
        );

        set_text(document, "let y;let y;");
        let diagnostics = qljs_web_demo_lint(document);
        assert_eq!(
            c_str((*diagnostics).message),
            "you couldn't get enough of y, so you had to make two, huh?"
        );
        qljs_web_demo_destroy_document(document);
    }
}

#[test]
fn linting_uses_config() {
    unsafe {
        let document = qljs_web_demo_create_document();
        let config = r#"{"globals": {"testGlobalVariable": true}}"#;
        qljs_web_demo_set_config_text(document, config.as_ptr(), config.len());
        set_text(document, "testGlobalVariable;");

        let diagnostics = qljs_web_demo_lint(document);
        assert!((*diagnostics).message.is_null());
        assert_eq!(c_str((*diagnostics).code), "");
        qljs_web_demo_destroy_document(document);
    }
}

#[test]
fn warnings_have_severity_two() {
    unsafe {
        let document = qljs_web_demo_create_document();
        set_text(document, "undeclaredVariable;");
        let diagnostics = qljs_web_demo_lint(document);
        assert_eq!(c_str((*diagnostics).code), "E0057");
        assert_eq!((*diagnostics).severity, 2);
        qljs_web_demo_destroy_document(document);
    }
}

#[test]
fn replaced_text_is_relinted() {
    unsafe {
        let document = qljs_web_demo_create_document();
        set_text(document, "let x;let y;");
        assert!((*qljs_web_demo_lint(document)).message.is_null());

        let replacement = "x";
        assert_eq!(
            qljs_web_demo_replace_text(document, 10, 11, replacement.as_ptr(), replacement.len()),
            0
        );
        let diagnostics = qljs_web_demo_lint(document);
        assert_eq!(c_str((*diagnostics).code), "E0034");
        assert_eq!((*diagnostics).begin_offset, 10);
        qljs_web_demo_destroy_document(document);
    }
}

#[test]
fn locale_list() {
    let mut locales = Vec::new();
    unsafe {
        let mut entry = qljs_list_locales();
        while !(*entry).is_null() {
            locales.push(c_str(*entry).to_owned());
            entry = entry.add(1);
        }
    }
    locales.sort();

    let mut expected: Vec<String> = translation_table_locale_names()
        .map(str::to_owned)
        .collect();
    expected.push(String::new());
    expected.sort();
    assert_eq!(locales, expected);
}
