use pretty_assertions::assert_eq;
use scriptlint_core::{
    DiagAssignmentBeforeVariableDeclaration, DiagAssignmentToConstGlobalVariable,
    DiagRedeclarationOfVariable, DiagReporter, DiagUnexpectedHashCharacter,
    DiagUseOfUndeclaredVariable, DiagnosticArgKind, DiagnosticFormatter, DiagnosticInfo,
    DiagnosticMessage, DiagnosticMessageArgInfo, DiagnosticSeverity, MemoryOutputStream,
    PaddedString, RawDiag, SourceCodeSpan, TranslatableMessage, Translator, VimLocator,
    VimQflistJsonDiagFormatter, VimQflistJsonDiagReporter, VimSource,
};
use serde_json::Value;
use std::io::Write;
use std::mem::{offset_of, size_of};

fn bufnr(bufnr: u32) -> VimSource<'static> {
    VimSource {
        file_name: None,
        bufnr: Some(bufnr),
    }
}

fn file_name(file_name: &str) -> VimSource<'_> {
    VimSource {
        file_name: Some(file_name),
        bufnr: None,
    }
}

fn span(input: &PaddedString, begin: usize, end: usize) -> SourceCodeSpan<'_> {
    SourceCodeSpan::from_range(input.view(), begin..end)
}

fn parse_json(stream: &mut MemoryOutputStream) -> Value {
    stream.flush().unwrap();
    let value = serde_json::from_slice(stream.get_flushed_string8()).unwrap();
    stream.clear();
    value
}

fn qflist(stream: &mut MemoryOutputStream) -> Vec<Value> {
    match parse_json(stream) {
        Value::Object(mut root) => match root.remove("qflist") {
            Some(Value::Array(entries)) => entries,
            other => panic!("qflist is not an array: {other:?}"),
        },
        other => panic!("root is not an object: {other:?}"),
    }
}

#[test]
fn assignment_before_variable_declaration() {
    let input = PaddedString::from("x=0;let x;");
    let assignment = span(&input, 0, 1);
    let declaration = span(&input, 8, 9);
    assert_eq!(assignment.string_view(), b"x");
    assert_eq!(declaration.string_view(), b"x");

    let mut stream = MemoryOutputStream::new();
    let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), &mut stream);
    reporter.set_source(input.view(), bufnr(0));
    reporter.report(
        DiagAssignmentBeforeVariableDeclaration {
            assignment,
            declaration,
        }
        .into(),
    );
    reporter.finish().unwrap();

    let qflist = qflist(&mut stream);
    assert_eq!(qflist.len(), 1);
    let entry = &qflist[0];
    assert_eq!(entry["col"], 1);
    assert_eq!(entry["end_col"], 1);
    assert_eq!(entry["end_lnum"], 1);
    assert_eq!(entry["lnum"], 1);
    assert_eq!(entry["nr"], "E0001");
    assert_eq!(entry["type"], "E");
    assert_eq!(entry["text"], "variable assigned before its declaration");
}

#[test]
fn multiple_errors() {
    let input = PaddedString::from("abc");
    let mut stream = MemoryOutputStream::new();
    let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), &mut stream);
    reporter.set_source(input.view(), bufnr(42));
    for i in 0..3 {
        reporter.report(
            DiagAssignmentToConstGlobalVariable {
                assignment: span(&input, i, i + 1),
            }
            .into(),
        );
    }
    reporter.finish().unwrap();

    assert_eq!(qflist(&mut stream).len(), 3);
}

#[test]
fn finishing_without_reports_writes_empty_list() {
    let mut stream = MemoryOutputStream::new();
    let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), &mut stream);
    reporter.finish().unwrap();
    assert!(qflist(&mut stream).is_empty());
}

#[test]
fn errors_have_buffer_number_if_requested() {
    let input = PaddedString::from("");
    let mut stream = MemoryOutputStream::new();
    let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), &mut stream);
    reporter.set_source(input.view(), bufnr(42));
    reporter.report(
        DiagAssignmentToConstGlobalVariable {
            assignment: span(&input, 0, 0),
        }
        .into(),
    );
    reporter.finish().unwrap();

    let qflist = qflist(&mut stream);
    assert_eq!(qflist.len(), 1);
    assert_eq!(qflist[0]["bufnr"], 42);
    assert!(qflist[0].get("filename").is_none());
}

#[test]
fn errors_have_file_name_if_requested() {
    let input = PaddedString::from("");
    for name in [
        "hello.js",
        "file\\name\\with\\backslashes.js",
        "file\"name'with\nfunky\tcharacters",
    ] {
        let mut stream = MemoryOutputStream::new();
        let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), &mut stream);
        reporter.set_source(input.view(), file_name(name));
        reporter.report(
            DiagAssignmentToConstGlobalVariable {
                assignment: span(&input, 0, 0),
            }
            .into(),
        );
        reporter.finish().unwrap();

        let qflist = qflist(&mut stream);
        assert_eq!(qflist.len(), 1, "{name}");
        assert_eq!(qflist[0]["filename"], name);
        assert!(qflist[0].get("bufnr").is_none(), "{name}");
    }
}

#[test]
fn errors_have_file_name_and_buffer_number_if_requested() {
    let input = PaddedString::from("");
    let mut stream = MemoryOutputStream::new();
    let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), &mut stream);
    reporter.set_source(
        input.view(),
        VimSource {
            file_name: Some("hello.js"),
            bufnr: Some(1337),
        },
    );
    reporter.report(
        DiagAssignmentToConstGlobalVariable {
            assignment: span(&input, 0, 0),
        }
        .into(),
    );
    reporter.finish().unwrap();

    let qflist = qflist(&mut stream);
    assert_eq!(qflist.len(), 1);
    assert_eq!(qflist[0]["bufnr"], 1337);
    assert_eq!(qflist[0]["filename"], "hello.js");
}

#[test]
fn change_source() {
    let input_1 = PaddedString::from("aaaaaaaa");
    let input_2 = PaddedString::from("bbbbbbbb");
    let input_3 = PaddedString::from("cccccccc");

    let mut stream = MemoryOutputStream::new();
    let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), &mut stream);

    reporter.set_source(
        input_1.view(),
        VimSource {
            file_name: Some("hello.js"),
            bufnr: Some(1),
        },
    );
    reporter.report(
        DiagAssignmentToConstGlobalVariable {
            assignment: SourceCodeSpan::unit(&input_1.as_bytes()[4 - 1]),
        }
        .into(),
    );

    reporter.set_source(input_2.view(), file_name("world.js"));
    reporter.report(
        DiagAssignmentToConstGlobalVariable {
            assignment: SourceCodeSpan::unit(&input_2.as_bytes()[5 - 1]),
        }
        .into(),
    );

    reporter.set_source(input_3.view(), bufnr(2));
    reporter.report(
        DiagAssignmentToConstGlobalVariable {
            assignment: SourceCodeSpan::unit(&input_3.as_bytes()[6 - 1]),
        }
        .into(),
    );
    reporter.finish().unwrap();

    let qflist = qflist(&mut stream);
    assert_eq!(qflist.len(), 3);

    assert_eq!(qflist[0]["bufnr"], 1);
    assert_eq!(qflist[0]["col"], 4);
    assert_eq!(qflist[0]["filename"], "hello.js");

    assert!(qflist[1].get("bufnr").is_none());
    assert_eq!(qflist[1]["col"], 5);
    assert_eq!(qflist[1]["filename"], "world.js");

    assert_eq!(qflist[2]["bufnr"], 2);
    assert_eq!(qflist[2]["col"], 6);
    assert!(qflist[2].get("filename").is_none());
}

#[test]
fn assignment_to_const_global_variable() {
    let input = PaddedString::from("to Infinity and beyond");
    let infinity = span(&input, 4 - 1, 11 + 1 - 1);
    assert_eq!(infinity.string_view(), b"Infinity");

    let mut stream = MemoryOutputStream::new();
    let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), &mut stream);
    reporter.set_source(input.view(), bufnr(42));
    reporter.report(
        DiagAssignmentToConstGlobalVariable {
            assignment: infinity,
        }
        .into(),
    );
    reporter.finish().unwrap();

    let qflist = qflist(&mut stream);
    assert_eq!(qflist.len(), 1);
    let entry = &qflist[0];
    assert_eq!(entry["col"], 4);
    assert_eq!(entry["end_col"], 11);
    assert_eq!(entry["end_lnum"], 1);
    assert_eq!(entry["lnum"], 1);
    assert_eq!(entry["nr"], "E0002");
    assert_eq!(entry["type"], "E");
    assert_eq!(entry["text"], "assignment to const global variable");
    assert_eq!(entry["vcol"], 0);
}

#[test]
fn redeclaration_of_variable() {
    let input = PaddedString::from("let myvar; let myvar;");
    let original_declaration = span(&input, 5 - 1, 9 + 1 - 1);
    let redeclaration = span(&input, 16 - 1, 20 + 1 - 1);
    assert_eq!(original_declaration.string_view(), b"myvar");
    assert_eq!(redeclaration.string_view(), b"myvar");

    let mut stream = MemoryOutputStream::new();
    let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), &mut stream);
    reporter.set_source(input.view(), bufnr(0));
    reporter.report(
        DiagRedeclarationOfVariable {
            redeclaration,
            original_declaration,
        }
        .into(),
    );
    reporter.finish().unwrap();

    let qflist = qflist(&mut stream);
    assert_eq!(qflist.len(), 1);
    let entry = &qflist[0];
    assert_eq!(entry["col"], 16);
    assert_eq!(entry["end_col"], 20);
    assert_eq!(entry["end_lnum"], 1);
    assert_eq!(entry["lnum"], 1);
    assert_eq!(entry["nr"], "E0034");
    assert_eq!(entry["type"], "E");
    assert_eq!(entry["text"], "redeclaration of variable: myvar");
}

#[test]
fn redeclaration_of_variable_in_snarky_locale() {
    let input = PaddedString::from("let myvar; let myvar;");
    let mut stream = MemoryOutputStream::new();
    let mut reporter =
        VimQflistJsonDiagReporter::new(Translator::for_locale("en_US@snarky"), &mut stream);
    reporter.set_source(input.view(), bufnr(0));
    reporter.report(
        DiagRedeclarationOfVariable {
            redeclaration: span(&input, 15, 20),
            original_declaration: span(&input, 4, 9),
        }
        .into(),
    );
    reporter.finish().unwrap();

    assert_eq!(
        qflist(&mut stream)[0]["text"],
        "you couldn't get enough of myvar, so you had to make two, huh?"
    );
}

#[test]
fn unexpected_hash_character() {
    let input = PaddedString::from("#");
    let hash = span(&input, 0, 1);
    assert_eq!(hash.string_view(), b"#");

    let mut stream = MemoryOutputStream::new();
    let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), &mut stream);
    reporter.set_source(input.view(), bufnr(0));
    reporter.report(DiagUnexpectedHashCharacter { hash }.into());
    reporter.finish().unwrap();

    let qflist = qflist(&mut stream);
    assert_eq!(qflist.len(), 1);
    let entry = &qflist[0];
    assert_eq!(entry["col"], 1);
    assert_eq!(entry["end_col"], 1);
    assert_eq!(entry["end_lnum"], 1);
    assert_eq!(entry["lnum"], 1);
    assert_eq!(entry["nr"], "E0052");
    assert_eq!(entry["type"], "E");
    assert_eq!(entry["text"], "unexpected '#'");
}

#[test]
fn use_of_undeclared_variable() {
    let input = PaddedString::from("myvar;");
    let name = span(&input, 0, 5);
    assert_eq!(name.string_view(), b"myvar");

    let mut stream = MemoryOutputStream::new();
    let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), &mut stream);
    reporter.set_source(input.view(), bufnr(0));
    reporter.report(DiagUseOfUndeclaredVariable { name }.into());
    reporter.finish().unwrap();

    let qflist = qflist(&mut stream);
    assert_eq!(qflist.len(), 1);
    let entry = &qflist[0];
    assert_eq!(entry["col"], 1);
    assert_eq!(entry["end_col"], 5);
    assert_eq!(entry["end_lnum"], 1);
    assert_eq!(entry["lnum"], 1);
    assert_eq!(entry["nr"], "E0057");
    assert_eq!(entry["text"], "use of undeclared variable: myvar");
    assert_eq!(entry["type"], "W");
}

#[test]
fn formatter_single_span_simple_message() {
    static INFO: DiagnosticInfo = DiagnosticInfo {
        code: 9999,
        severity: DiagnosticSeverity::Error,
        messages: &[DiagnosticMessage {
            format: TranslatableMessage::new("something happened"),
            args: &[DiagnosticMessageArgInfo::new(
                0,
                DiagnosticArgKind::SourceCodeSpan,
            )],
        }],
        payload_size: size_of::<SourceCodeSpan<'static>>(),
    };

    let code = PaddedString::from("hello world");
    let hello = span(&code, 0, 5);
    let locator = VimLocator::new(code.view());

    let mut stream = MemoryOutputStream::new();
    let mut formatter = VimQflistJsonDiagFormatter::new(
        Translator::new(),
        &mut stream,
        &locator,
        Some("FILE"),
        None,
    );
    // SAFETY: INFO describes a lone span.
    formatter.format(&INFO, unsafe { RawDiag::new(&hello) }).unwrap();

    let object = parse_json(&mut stream);
    assert_eq!(object["col"], 1);
    assert_eq!(object["end_col"], 5);
    assert_eq!(object["end_lnum"], 1);
    assert_eq!(object["lnum"], 1);
    assert_eq!(object["text"], "something happened");
}

#[test]
fn formatter_message_with_note_ignores_note() {
    struct TestDiag<'code> {
        hello: SourceCodeSpan<'code>,
        world: SourceCodeSpan<'code>,
    }

    static INFO: DiagnosticInfo = DiagnosticInfo {
        code: 9999,
        severity: DiagnosticSeverity::Error,
        messages: &[
            DiagnosticMessage {
                format: TranslatableMessage::new("something happened"),
                args: &[DiagnosticMessageArgInfo::new(
                    offset_of!(TestDiag<'static>, hello),
                    DiagnosticArgKind::SourceCodeSpan,
                )],
            },
            DiagnosticMessage {
                format: TranslatableMessage::new("here"),
                args: &[DiagnosticMessageArgInfo::new(
                    offset_of!(TestDiag<'static>, world),
                    DiagnosticArgKind::SourceCodeSpan,
                )],
            },
        ],
        payload_size: size_of::<TestDiag<'static>>(),
    };

    let code = PaddedString::from("hello world");
    let locator = VimLocator::new(code.view());
    let diag = TestDiag {
        hello: span(&code, 0, 5),
        world: span(&code, 6, 11),
    };

    let mut stream = MemoryOutputStream::new();
    let mut formatter = VimQflistJsonDiagFormatter::new(
        Translator::new(),
        &mut stream,
        &locator,
        Some("FILE"),
        None,
    );
    // SAFETY: INFO describes TestDiag.
    formatter.format(&INFO, unsafe { RawDiag::new(&diag) }).unwrap();

    let object = parse_json(&mut stream);
    assert_eq!(object["col"], 1);
    assert_eq!(object["end_col"], 5);
    assert_eq!(object["end_lnum"], 1);
    assert_eq!(object["lnum"], 1);
    assert_eq!(object["text"], "something happened");
}
