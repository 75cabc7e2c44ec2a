//! Table-driven diagnostic metadata.
//!
//! Each diagnostic type has one [`DiagnosticInfo`] row: its numeric code, severity and message
//! templates. Every message lists argument descriptors, each a byte offset into the payload struct
//! (from [`core::mem::offset_of!`]) plus the argument's kind. Formatters read arguments through
//! those descriptors, so adding a diagnostic never requires formatter code.

use crate::language::{EnumKind, StatementKind, VariableKind};
use crate::span::SourceCodeSpan;
use crate::translation_table::TranslatableMessage;
use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;

/// Severity of a diagnostic or of one of its messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// A definite mistake.
    Error,
    /// A probable mistake.
    Warning,
    /// Secondary message attached to an error or warning. Never a catalog severity.
    Note,
}

impl DiagnosticSeverity {
    /// Lowercase name used by text output.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Note => "note",
        }
    }
}

/// The kind of a diagnostic message argument, which decides how it is read and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticArgKind {
    /// [`SourceCodeSpan`]; rendered as the covered text.
    SourceCodeSpan,
    /// `u8`; rendered as one character.
    Char8,
    /// [`EnumKind`]; rendered from a fixed string table.
    EnumKind,
    /// `&[u8]`; rendered verbatim.
    String8View,
    /// [`StatementKind`]; rendered from a fixed string table.
    StatementKind,
    /// [`VariableKind`]; rendered from a fixed string table.
    VariableKind,
}

impl DiagnosticArgKind {
    /// Size in bytes of an argument of this kind inside a payload.
    pub const fn size(self) -> usize {
        match self {
            DiagnosticArgKind::SourceCodeSpan => size_of::<SourceCodeSpan<'static>>(),
            DiagnosticArgKind::Char8 => size_of::<u8>(),
            DiagnosticArgKind::EnumKind => size_of::<EnumKind>(),
            DiagnosticArgKind::String8View => size_of::<&'static [u8]>(),
            DiagnosticArgKind::StatementKind => size_of::<StatementKind>(),
            DiagnosticArgKind::VariableKind => size_of::<VariableKind>(),
        }
    }
}

/// One argument descriptor: where to find the argument in the payload, and its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticMessageArgInfo {
    /// Byte offset of the argument within the payload struct.
    pub offset: usize,
    /// How to read and render the argument.
    pub kind: DiagnosticArgKind,
}

impl DiagnosticMessageArgInfo {
    /// Create a descriptor.
    pub const fn new(offset: usize, kind: DiagnosticArgKind) -> Self {
        Self { offset, kind }
    }
}

/// One message (primary or note) of a diagnostic.
///
/// The first argument is the span the message is attached to; `{N}` placeholders in the template
/// refer to `args[N]`.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticMessage {
    /// The untranslated template.
    pub format: TranslatableMessage,
    /// Argument descriptors.
    pub args: &'static [DiagnosticMessageArgInfo],
}

/// Catalog entry for one diagnostic type.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticInfo {
    /// Numeric code; rendered as `Ennnn`.
    pub code: u16,
    /// [`DiagnosticSeverity::Error`] or [`DiagnosticSeverity::Warning`].
    pub severity: DiagnosticSeverity,
    /// Primary message followed by zero or more notes.
    pub messages: &'static [DiagnosticMessage],
    /// Size of the payload struct, used to bounds-check argument reads.
    pub payload_size: usize,
}

impl DiagnosticInfo {
    /// The user-visible code, e.g. `E0034`.
    pub fn code_string(&self) -> DiagnosticCode {
        DiagnosticCode(self.code)
    }

    /// The primary message.
    pub fn primary_message(&self) -> &DiagnosticMessage {
        &self.messages[0]
    }

    /// Notes attached to the primary message.
    pub fn notes(&self) -> &[DiagnosticMessage] {
        &self.messages[1..]
    }
}

/// A diagnostic code which displays as `Ennnn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagnosticCode(pub u16);

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.0)
    }
}

/// A rendered argument value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagArgValue<'a> {
    /// A span argument.
    SourceCodeSpan(SourceCodeSpan<'a>),
    /// A single byte character.
    Char8(u8),
    /// An enum flavor.
    EnumKind(EnumKind),
    /// Verbatim bytes.
    String8View(&'a [u8]),
    /// A statement kind.
    StatementKind(StatementKind),
    /// A variable kind.
    VariableKind(VariableKind),
}

impl<'a> DiagArgValue<'a> {
    /// The bytes inserted for a `{N}` placeholder referring to this argument.
    pub fn rendered(&self) -> std::borrow::Cow<'a, [u8]> {
        use std::borrow::Cow;
        match *self {
            DiagArgValue::SourceCodeSpan(span) => Cow::Borrowed(span.string_view()),
            DiagArgValue::Char8(c) => Cow::Owned(vec![c]),
            DiagArgValue::EnumKind(kind) => Cow::Borrowed(kind.as_str().as_bytes()),
            DiagArgValue::String8View(bytes) => Cow::Borrowed(bytes),
            DiagArgValue::StatementKind(kind) => Cow::Borrowed(kind.as_str().as_bytes()),
            DiagArgValue::VariableKind(kind) => Cow::Borrowed(kind.as_str().as_bytes()),
        }
    }
}

/// A type-erased reference to a diagnostic payload.
#[derive(Clone, Copy)]
pub struct RawDiag<'a> {
    ptr: *const u8,
    size: usize,
    _payload: PhantomData<&'a ()>,
}

impl<'a> RawDiag<'a> {
    /// Erase the type of `payload`.
    ///
    /// # Safety
    ///
    /// Every argument descriptor of every [`DiagnosticInfo`] this value is formatted with must name
    /// a field of `T` at that offset whose type matches the descriptor's kind. Catalog rows
    /// generated for the crate's own payloads satisfy this by construction; prefer
    /// [`Diag::raw`](crate::Diag::raw).
    pub unsafe fn new<T>(payload: &'a T) -> Self {
        Self {
            ptr: (payload as *const T).cast::<u8>(),
            size: size_of::<T>(),
            _payload: PhantomData,
        }
    }

    /// Size of the payload struct in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Read the argument described by `arg`.
    ///
    /// # Panics
    ///
    /// Panics if the descriptor reaches outside the payload.
    pub fn arg(&self, arg: &DiagnosticMessageArgInfo) -> DiagArgValue<'a> {
        assert!(
            arg.offset + arg.kind.size() <= self.size,
            "argument at offset {} ({:?}) outside of {}-byte payload",
            arg.offset,
            arg.kind,
            self.size
        );
        // SAFETY: the descriptor is in bounds (checked above), payload fields are naturally
        // aligned at their offsets, and `RawDiag::new`'s contract guarantees the field at this
        // offset has the descriptor's type. Spans and views borrow for at least `'a`.
        unsafe {
            let field = self.ptr.add(arg.offset);
            match arg.kind {
                DiagnosticArgKind::SourceCodeSpan => DiagArgValue::SourceCodeSpan(
                    field.cast::<SourceCodeSpan<'a>>().read(),
                ),
                DiagnosticArgKind::Char8 => DiagArgValue::Char8(field.read()),
                DiagnosticArgKind::EnumKind => {
                    DiagArgValue::EnumKind(field.cast::<EnumKind>().read())
                }
                DiagnosticArgKind::String8View => {
                    DiagArgValue::String8View(field.cast::<&'a [u8]>().read())
                }
                DiagnosticArgKind::StatementKind => {
                    DiagArgValue::StatementKind(field.cast::<StatementKind>().read())
                }
                DiagnosticArgKind::VariableKind => {
                    DiagArgValue::VariableKind(field.cast::<VariableKind>().read())
                }
            }
        }
    }

    /// The span a message is attached to (its first argument).
    ///
    /// # Panics
    ///
    /// Panics if the message has no arguments or its first argument is not a span.
    pub fn origin_span(&self, message: &DiagnosticMessage) -> SourceCodeSpan<'a> {
        match message.args.first().map(|arg| self.arg(arg)) {
            Some(DiagArgValue::SourceCodeSpan(span)) => span,
            other => panic!("message {:?} has no origin span: {other:?}", message.format),
        }
    }
}

impl fmt::Debug for RawDiag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDiag")
            .field("ptr", &self.ptr)
            .field("size", &self.size)
            .finish()
    }
}

/// Type-level tags tying a field type to a [`DiagnosticArgKind`].
///
/// The catalog macro uses these to reject descriptors whose kind does not match the field.
#[doc(hidden)]
pub mod arg_kinds {
    use super::*;

    pub struct SourceCodeSpan;
    pub struct Char8;
    pub struct EnumKind;
    pub struct String8View;
    pub struct StatementKind;
    pub struct VariableKind;

    pub trait DiagArgType {
        type Kind;
    }

    impl DiagArgType for crate::span::SourceCodeSpan<'_> {
        type Kind = SourceCodeSpan;
    }
    impl DiagArgType for u8 {
        type Kind = Char8;
    }
    impl DiagArgType for crate::language::EnumKind {
        type Kind = EnumKind;
    }
    impl DiagArgType for &[u8] {
        type Kind = String8View;
    }
    impl DiagArgType for crate::language::StatementKind {
        type Kind = StatementKind;
    }
    impl DiagArgType for crate::language::VariableKind {
        type Kind = VariableKind;
    }

    pub fn kind_of<T: DiagArgType>(_: &T) -> PhantomData<T::Kind> {
        PhantomData
    }
}
