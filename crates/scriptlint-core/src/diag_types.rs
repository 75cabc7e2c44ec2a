//! Diagnostic payload types and the diagnostic catalog.
//!
//! Each entry below declares a diagnostic type, its plain-data payload struct and its catalog row.
//! Payloads hold spans and small scalars only; spans borrow the source buffer (`'code`).

use crate::diagnostic::{
    DiagnosticArgKind, DiagnosticInfo, DiagnosticMessage, DiagnosticMessageArgInfo,
    DiagnosticSeverity, RawDiag, arg_kinds,
};
use crate::language::{StatementKind, VariableKind};
use crate::span::SourceCodeSpan;
use crate::translation_table::TranslatableMessage;
use std::marker::PhantomData;
use std::mem::{offset_of, size_of};

macro_rules! define_diag_types {
    ($(
        $(#[doc = $doc:literal])*
        $name:ident = $payload:ident {
            code: $code:literal,
            severity: $severity:ident,
            fields: { $($(#[doc = $field_doc:literal])* $field:ident: $field_ty:ty),* $(,)? },
            messages: [$(($text:literal $(, $arg:ident: $kind:ident)*)),+ $(,)?],
        },
    )*) => {
        /// Dense identifier of a diagnostic type. Distinct from the user-visible code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum DiagType {
            $($(#[doc = $doc])* $name,)*
        }

        impl DiagType {
            /// Every diagnostic type, in catalog order.
            pub const ALL: &'static [DiagType] = &[$(DiagType::$name),*];

            /// The catalog row for this type.
            pub fn info(self) -> &'static DiagnosticInfo {
                &DIAGNOSTIC_INFOS[self as usize]
            }

            /// Type name, e.g. `RedeclarationOfVariable`.
            pub fn name(self) -> &'static str {
                match self {
                    $(DiagType::$name => stringify!($name),)*
                }
            }
        }

        static DIAGNOSTIC_INFOS: [DiagnosticInfo; DiagType::ALL.len()] = [$(
            DiagnosticInfo {
                code: $code,
                severity: DiagnosticSeverity::$severity,
                messages: &[$(DiagnosticMessage {
                    format: TranslatableMessage::new($text),
                    args: &[$(DiagnosticMessageArgInfo::new(
                        offset_of!($payload<'static>, $arg),
                        DiagnosticArgKind::$kind,
                    )),*],
                }),+],
                payload_size: size_of::<$payload<'static>>(),
            },
        )*];

        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $payload<'code> {
                $(
                    #[doc = concat!("`", stringify!($field), "` of the diagnostic.")]
                    $(#[doc = $field_doc])*
                    pub $field: $field_ty,
                )*
            }

            impl $payload<'_> {
                /// Catalog type of this payload.
                pub const TYPE: DiagType = DiagType::$name;

                /// Never called; fails to compile if a descriptor's kind does not match its field.
                #[allow(dead_code)]
                fn check_arg_kinds(&self) {
                    $($(let _: PhantomData<arg_kinds::$kind> = arg_kinds::kind_of(&self.$arg);)*)+
                }
            }

            impl<'code> From<$payload<'code>> for Diag<'code> {
                fn from(diag: $payload<'code>) -> Self {
                    Diag::$name(diag)
                }
            }
        )*

        /// A reported diagnostic: its type tag plus payload.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Diag<'code> {
            $($(#[doc = $doc])* $name($payload<'code>),)*
        }

        impl<'code> Diag<'code> {
            /// The diagnostic's type.
            pub fn diag_type(&self) -> DiagType {
                match self {
                    $(Diag::$name(_) => DiagType::$name,)*
                }
            }

            /// Type-erased payload for table-driven formatting.
            pub fn raw(&self) -> RawDiag<'_> {
                // SAFETY: the catalog row of each variant is generated from the same field list as
                // its payload struct, and `check_arg_kinds` ties each descriptor kind to its field.
                match self {
                    $(Diag::$name(payload) => unsafe { RawDiag::new(payload) },)*
                }
            }
        }
    };
}

define_diag_types! {
    /// `x = 0; let x;`
    AssignmentBeforeVariableDeclaration = DiagAssignmentBeforeVariableDeclaration {
        code: 1,
        severity: Error,
        fields: { assignment: SourceCodeSpan<'code>, declaration: SourceCodeSpan<'code> },
        messages: [
            ("variable assigned before its declaration", assignment: SourceCodeSpan),
            ("variable declared here", declaration: SourceCodeSpan),
        ],
    },
    /// `Infinity = 0;`
    AssignmentToConstGlobalVariable = DiagAssignmentToConstGlobalVariable {
        code: 2,
        severity: Error,
        fields: { assignment: SourceCodeSpan<'code> },
        messages: [("assignment to const global variable", assignment: SourceCodeSpan)],
    },
    /// `const x = 0; x = 1;`
    AssignmentToConstVariable = DiagAssignmentToConstVariable {
        code: 3,
        severity: Error,
        fields: { assignment: SourceCodeSpan<'code>, declaration: SourceCodeSpan<'code> },
        messages: [
            ("assignment to const variable", assignment: SourceCodeSpan),
            ("const variable declared here", declaration: SourceCodeSpan),
        ],
    },
    /// A non-identifier character glued to an identifier.
    CharacterDisallowedInIdentifiers = DiagCharacterDisallowedInIdentifiers {
        code: 11,
        severity: Error,
        fields: { character: SourceCodeSpan<'code> },
        messages: [("character is not allowed in identifiers", character: SourceCodeSpan)],
    },
    /// `f() = 1;`
    InvalidExpressionLeftOfAssignment = DiagInvalidExpressionLeftOfAssignment {
        code: 20,
        severity: Error,
        fields: { expression: SourceCodeSpan<'code> },
        messages: [("invalid expression left of assignment", expression: SourceCodeSpan)],
    },
    /// `let undefined;` where the global is not shadowable.
    RedeclarationOfGlobalVariable = DiagRedeclarationOfGlobalVariable {
        code: 33,
        severity: Error,
        fields: { redeclaration: SourceCodeSpan<'code> },
        messages: [("redeclaration of global variable", redeclaration: SourceCodeSpan)],
    },
    /// `let x; let x;`
    RedeclarationOfVariable = DiagRedeclarationOfVariable {
        code: 34,
        severity: Error,
        fields: {
            redeclaration: SourceCodeSpan<'code>,
            original_declaration: SourceCodeSpan<'code>,
        },
        messages: [
            ("redeclaration of variable: {0}", redeclaration: SourceCodeSpan),
            ("variable already declared here", original_declaration: SourceCodeSpan),
        ],
    },
    /// `/* never closed`
    UnclosedBlockComment = DiagUnclosedBlockComment {
        code: 37,
        severity: Error,
        fields: { comment_open: SourceCodeSpan<'code> },
        messages: [("unclosed block comment", comment_open: SourceCodeSpan)],
    },
    /// `"never closed`
    UnclosedStringLiteral = DiagUnclosedStringLiteral {
        code: 38,
        severity: Error,
        fields: { string_literal: SourceCodeSpan<'code> },
        messages: [("unclosed string literal", string_literal: SourceCodeSpan)],
    },
    /// `` `never closed ``
    UnclosedTemplate = DiagUnclosedTemplate {
        code: 39,
        severity: Error,
        fields: { incomplete_template: SourceCodeSpan<'code> },
        messages: [("unclosed template", incomplete_template: SourceCodeSpan)],
    },
    /// A `#` not followed by an identifier.
    UnexpectedHashCharacter = DiagUnexpectedHashCharacter {
        code: 52,
        severity: Error,
        fields: { hash: SourceCodeSpan<'code> },
        messages: [("unexpected '#'", hash: SourceCodeSpan)],
    },
    /// A token which cannot appear where it does.
    UnexpectedToken = DiagUnexpectedToken {
        code: 54,
        severity: Error,
        fields: { token: SourceCodeSpan<'code> },
        messages: [("unexpected token", token: SourceCodeSpan)],
    },
    /// A variable which is neither declared nor a known global.
    UseOfUndeclaredVariable = DiagUseOfUndeclaredVariable {
        code: 57,
        severity: Warning,
        fields: { name: SourceCodeSpan<'code> },
        messages: [("use of undeclared variable: {0}", name: SourceCodeSpan)],
    },
    /// `x; let x;`
    VariableUsedBeforeDeclaration = DiagVariableUsedBeforeDeclaration {
        code: 58,
        severity: Error,
        fields: { use_: SourceCodeSpan<'code>, declaration: SourceCodeSpan<'code> },
        messages: [
            ("variable used before declaration: {0}", use_: SourceCodeSpan),
            ("variable declared here", declaration: SourceCodeSpan),
        ],
    },
    /// `undeclared = 1;`
    AssignmentToUndeclaredVariable = DiagAssignmentToUndeclaredVariable {
        code: 59,
        severity: Warning,
        fields: { assignment: SourceCodeSpan<'code> },
        messages: [("assignment to undeclared variable", assignment: SourceCodeSpan)],
    },
    /// A byte which cannot start any token.
    UnexpectedCharacter = DiagUnexpectedCharacter {
        code: 60,
        severity: Error,
        fields: { character: SourceCodeSpan<'code> },
        messages: [("unexpected character", character: SourceCodeSpan)],
    },
    /// `function () {}` in statement position.
    MissingNameInStatement = DiagMissingNameInStatement {
        code: 61,
        severity: Error,
        fields: { where_: SourceCodeSpan<'code>, statement_kind: StatementKind },
        messages: [("missing name in {1}", where_: SourceCodeSpan, statement_kind: StatementKind)],
    },
    /// `(` or `[` or `{` without its closing bracket.
    UnmatchedBracket = DiagUnmatchedBracket {
        code: 62,
        severity: Error,
        fields: { opening: SourceCodeSpan<'code>, bracket: u8 },
        messages: [("unmatched '{1}'", opening: SourceCodeSpan, bracket: Char8)],
    },
    /// A required token is missing.
    ExpectedToken = DiagExpectedToken {
        code: 63,
        severity: Error,
        fields: { where_: SourceCodeSpan<'code>, expected: &'code [u8] },
        messages: [("expected '{1}'", where_: SourceCodeSpan, expected: String8View)],
    },
    /// The configuration file is not valid JSON.
    ConfigJsonSyntaxError = DiagConfigJsonSyntaxError {
        code: 164,
        severity: Error,
        fields: { where_: SourceCodeSpan<'code> },
        messages: [("JSON syntax error", where_: SourceCodeSpan)],
    },
    /// `"global-groups": [1]`
    ConfigGlobalGroupsGroupTypeMismatch = DiagConfigGlobalGroupsGroupTypeMismatch {
        code: 169,
        severity: Error,
        fields: { group: SourceCodeSpan<'code> },
        messages: [("\"global-groups\" entries must be strings", group: SourceCodeSpan)],
    },
    /// `"globals": []`
    ConfigGlobalsTypeMismatch = DiagConfigGlobalsTypeMismatch {
        code: 170,
        severity: Error,
        fields: { value: SourceCodeSpan<'code> },
        messages: [("\"globals\" must be an object", value: SourceCodeSpan)],
    },
    /// `"global-groups": "browser"`
    ConfigGlobalGroupsTypeMismatch = DiagConfigGlobalGroupsTypeMismatch {
        code: 171,
        severity: Error,
        fields: { value: SourceCodeSpan<'code> },
        messages: [("\"global-groups\" must be a boolean or an array", value: SourceCodeSpan)],
    },
    /// `import x from "m"; x = 1;`
    AssignmentToImportedVariable = DiagAssignmentToImportedVariable {
        code: 185,
        severity: Error,
        fields: { assignment: SourceCodeSpan<'code>, declaration: SourceCodeSpan<'code> },
        messages: [
            ("assignment to imported variable", assignment: SourceCodeSpan),
            ("imported variable declared here", declaration: SourceCodeSpan),
        ],
    },
    /// `"globals": {"x": 1}`
    ConfigGlobalsDescriptorTypeMismatch = DiagConfigGlobalsDescriptorTypeMismatch {
        code: 191,
        severity: Error,
        fields: { descriptor: SourceCodeSpan<'code> },
        messages: [(
            "\"globals\" descriptor must be a boolean or an object",
            descriptor: SourceCodeSpan
        )],
    },
    /// `"globals": {"x": {"shadowable": 1}}`
    ConfigGlobalsDescriptorShadowableTypeMismatch = DiagConfigGlobalsDescriptorShadowableTypeMismatch {
        code: 192,
        severity: Error,
        fields: { value: SourceCodeSpan<'code> },
        messages: [(
            "\"globals\" descriptor \"shadowable\" property must be a boolean",
            value: SourceCodeSpan
        )],
    },
    /// `"globals": {"x": {"writable": 1}}`
    ConfigGlobalsDescriptorWritableTypeMismatch = DiagConfigGlobalsDescriptorWritableTypeMismatch {
        code: 193,
        severity: Error,
        fields: { value: SourceCodeSpan<'code> },
        messages: [(
            "\"globals\" descriptor \"writable\" property must be a boolean",
            value: SourceCodeSpan
        )],
    },
    /// `const x;`
    MissingInitializerInConstDeclaration = DiagMissingInitializerInConstDeclaration {
        code: 205,
        severity: Error,
        fields: { variable_name: SourceCodeSpan<'code>, variable_kind: VariableKind },
        messages: [(
            "missing initializer in {1} declaration",
            variable_name: SourceCodeSpan,
            variable_kind: VariableKind
        )],
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagArgValue;
    use crate::padded_string::PaddedString;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique() {
        let mut seen = HashSet::new();
        for diag_type in DiagType::ALL {
            assert!(
                seen.insert(diag_type.info().code),
                "duplicate code for {}",
                diag_type.name()
            );
        }
    }

    #[test]
    fn every_message_starts_with_a_span_inside_the_payload() {
        for diag_type in DiagType::ALL {
            let info = diag_type.info();
            assert!(!info.messages.is_empty());
            assert_ne!(info.severity, DiagnosticSeverity::Note);
            for message in info.messages {
                assert_eq!(
                    message.args.first().map(|arg| arg.kind),
                    Some(DiagnosticArgKind::SourceCodeSpan),
                    "{}",
                    diag_type.name()
                );
                for arg in message.args {
                    assert!(arg.offset + arg.kind.size() <= info.payload_size);
                }
            }
        }
    }

    #[test]
    fn every_template_is_translatable() {
        for diag_type in DiagType::ALL {
            for message in diag_type.info().messages {
                assert!(
                    message.format.table_index().is_some(),
                    "{:?} is missing from the translation table",
                    message.format.untranslated()
                );
            }
        }
    }

    #[test]
    fn raw_payload_reads_fields_through_descriptors() {
        let input = PaddedString::from("let x; let x;");
        let original = SourceCodeSpan::from_range(input.view(), 4..5);
        let redeclaration = SourceCodeSpan::from_range(input.view(), 11..12);
        let diag: Diag<'_> = DiagRedeclarationOfVariable {
            redeclaration,
            original_declaration: original,
        }
        .into();

        let info = diag.diag_type().info();
        assert_eq!(info.code, 34);
        let raw = diag.raw();
        assert_eq!(
            raw.arg(&info.messages[0].args[0]),
            DiagArgValue::SourceCodeSpan(redeclaration)
        );
        assert_eq!(
            raw.arg(&info.messages[1].args[0]),
            DiagArgValue::SourceCodeSpan(original)
        );
    }

    #[test]
    fn raw_payload_reads_scalar_arguments() {
        let input = PaddedString::from("(");
        let diag: Diag<'_> = DiagUnmatchedBracket {
            opening: SourceCodeSpan::from_range(input.view(), 0..1),
            bracket: b'(',
        }
        .into();
        let info = DiagType::UnmatchedBracket.info();
        assert_eq!(
            diag.raw().arg(&info.messages[0].args[1]),
            DiagArgValue::Char8(b'(')
        );

        let diag: Diag<'_> = DiagMissingInitializerInConstDeclaration {
            variable_name: SourceCodeSpan::from_range(input.view(), 0..1),
            variable_kind: VariableKind::Const,
        }
        .into();
        let info = diag.diag_type().info();
        assert_eq!(
            diag.raw().arg(&info.messages[0].args[1]),
            DiagArgValue::VariableKind(VariableKind::Const)
        );
    }
}
