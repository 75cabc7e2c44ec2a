//! Linter configuration, loaded from JSON configuration files.
//!
//! ```json
//! {
//!   "global-groups": ["browser", "ecmascript"],
//!   "globals": {
//!     "myGlobal": true,
//!     "console": false,
//!     "VERSION": {"writable": false, "shadowable": true}
//!   }
//! }
//! ```
//!
//! Invalid parts are reported and skipped; the rest of the file still applies.

use crate::diag_reporter::DiagReporter;
use crate::diag_types::{
    Diag, DiagConfigGlobalGroupsGroupTypeMismatch, DiagConfigGlobalGroupsTypeMismatch,
    DiagConfigGlobalsDescriptorShadowableTypeMismatch, DiagConfigGlobalsDescriptorTypeMismatch,
    DiagConfigGlobalsDescriptorWritableTypeMismatch, DiagConfigGlobalsTypeMismatch,
    DiagConfigJsonSyntaxError,
};
use crate::global_declared_variables::{
    ECMASCRIPT_GROUP, GLOBAL_GROUPS, GlobalDeclaredVariableSet, GlobalVariableFlags,
    find_global_group,
};
use crate::padded_string::PaddedStringView;
use crate::span::SourceCodeSpan;
use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde_json::value::RawValue;
use std::fmt;

/// Settings which affect linting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    globals: GlobalDeclaredVariableSet,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            globals: GlobalDeclaredVariableSet::with_all_groups(),
        }
    }
}

impl Configuration {
    /// The configuration used when no file is given: every global group enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Variables the program may use without declaring them.
    pub fn globals(&self) -> &GlobalDeclaredVariableSet {
        &self.globals
    }

    /// Go back to the default configuration.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Replace this configuration with the one in `input`, reporting problems to `reporter`.
    pub fn load_from_json<'code>(
        &mut self,
        input: PaddedStringView<'code>,
        reporter: &mut dyn DiagReporter<'code>,
    ) {
        self.reset();
        let mut loader = ConfigLoader { input, reporter };
        let Some(root) = loader.parse_root() else {
            return;
        };

        let mut global_groups = None;
        let mut globals = Vec::new();
        for (key, value) in root.0 {
            match key.as_str() {
                "global-groups" => global_groups = Some(value),
                "globals" => globals.push(value),
                _ => {}
            }
        }

        self.globals = GlobalDeclaredVariableSet::new();
        if let Some(ecmascript) = find_global_group(ECMASCRIPT_GROUP) {
            self.globals.add_group(ecmascript);
        }
        match global_groups.map(|value| loader.global_groups(value)) {
            Some(Some(GroupSelection::Named(names))) => {
                for name in names {
                    match find_global_group(&name) {
                        Some(group) => self.globals.add_group(group),
                        None => tracing::debug!(group = %name, "ignoring unknown global group"),
                    }
                }
            }
            Some(Some(GroupSelection::None)) => {}
            Some(Some(GroupSelection::All)) | Some(None) | None => {
                for group in GLOBAL_GROUPS {
                    self.globals.add_group(group);
                }
            }
        }
        for value in globals {
            loader.apply_globals(value, &mut self.globals);
        }
    }
}

enum GroupSelection {
    All,
    None,
    Named(Vec<String>),
}

/// A JSON object's members in source order, values unparsed.
struct Members<'a>(Vec<(String, &'a RawValue)>);

impl<'de> Deserialize<'de> for Members<'de> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MembersVisitor;

        impl<'de> Visitor<'de> for MembersVisitor {
            type Value = Members<'de>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut members = Vec::new();
                while let Some(member) = map.next_entry::<String, &'de RawValue>()? {
                    members.push(member);
                }
                Ok(Members(members))
            }
        }

        deserializer.deserialize_map(MembersVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonKind {
    Bool,
    Array,
    Object,
    Other,
}

fn json_kind(value: &RawValue) -> JsonKind {
    match value.get().as_bytes().first() {
        Some(b't' | b'f') => JsonKind::Bool,
        Some(b'[') => JsonKind::Array,
        Some(b'{') => JsonKind::Object,
        _ => JsonKind::Other,
    }
}

struct ConfigLoader<'code, 'r> {
    input: PaddedStringView<'code>,
    reporter: &'r mut dyn DiagReporter<'code>,
}

impl<'code> ConfigLoader<'code, '_> {
    fn report(&mut self, diag: impl Into<Diag<'code>>) {
        self.reporter.report(diag.into());
    }

    /// Span of a value parsed out of the input.
    fn span(&self, value: &RawValue) -> SourceCodeSpan<'code> {
        let text = value.get();
        let begin = self.input.offset_of(text.as_ptr());
        SourceCodeSpan::from_range(self.input, begin..begin + text.len())
    }

    fn parse_root(&mut self) -> Option<Members<'code>> {
        let text = match std::str::from_utf8(self.input.as_bytes()) {
            Ok(text) => text,
            Err(error) => {
                self.report_syntax_error(error.valid_up_to());
                return None;
            }
        };
        match serde_json::from_str::<Members<'code>>(text) {
            Ok(members) => Some(members),
            Err(error) if error.is_data() => {
                tracing::debug!(%error, "configuration is not a JSON object; ignoring");
                None
            }
            Err(error) => {
                tracing::debug!(%error, "configuration is not valid JSON");
                self.report_syntax_error(offset_of_line_and_column(
                    text,
                    error.line(),
                    error.column(),
                ));
                None
            }
        }
    }

    fn report_syntax_error(&mut self, offset: usize) {
        let end = (offset + 1).min(self.input.len());
        let begin = offset.min(end);
        self.report(DiagConfigJsonSyntaxError {
            where_: SourceCodeSpan::from_range(self.input, begin..end),
        });
    }

    fn global_groups(&mut self, value: &'code RawValue) -> Option<GroupSelection> {
        match json_kind(value) {
            JsonKind::Bool => Some(if value.get() == "true" {
                GroupSelection::All
            } else {
                GroupSelection::None
            }),
            JsonKind::Array => {
                let elements: Vec<&RawValue> = serde_json::from_str(value.get()).ok()?;
                let mut names = Vec::new();
                for element in elements {
                    match serde_json::from_str::<String>(element.get()) {
                        Ok(name) => names.push(name),
                        Err(_) => self.report(DiagConfigGlobalGroupsGroupTypeMismatch {
                            group: self.span(element),
                        }),
                    }
                }
                Some(GroupSelection::Named(names))
            }
            JsonKind::Object | JsonKind::Other => {
                self.report(DiagConfigGlobalGroupsTypeMismatch {
                    value: self.span(value),
                });
                None
            }
        }
    }

    fn apply_globals(&mut self, value: &'code RawValue, globals: &mut GlobalDeclaredVariableSet) {
        let members = match json_kind(value) {
            JsonKind::Object => serde_json::from_str::<Members<'_>>(value.get()).ok(),
            _ => None,
        };
        let Some(members) = members else {
            self.report(DiagConfigGlobalsTypeMismatch {
                value: self.span(value),
            });
            return;
        };
        for (name, descriptor) in members.0 {
            match json_kind(descriptor) {
                JsonKind::Bool if descriptor.get() == "true" => {
                    globals.add_variable(name.as_bytes(), GlobalVariableFlags::default())
                }
                JsonKind::Bool => globals.remove_variable(name.as_bytes()),
                JsonKind::Object => {
                    let flags = self.parse_descriptor(descriptor);
                    globals.add_variable(name.as_bytes(), flags);
                }
                JsonKind::Array | JsonKind::Other => {
                    self.report(DiagConfigGlobalsDescriptorTypeMismatch {
                        descriptor: self.span(descriptor),
                    })
                }
            }
        }
    }

    fn parse_descriptor(&mut self, descriptor: &RawValue) -> GlobalVariableFlags {
        let mut flags = GlobalVariableFlags::default();
        let Ok(members) = serde_json::from_str::<Members<'_>>(descriptor.get()) else {
            return flags;
        };
        for (key, value) in members.0 {
            let parsed = serde_json::from_str::<bool>(value.get()).ok();
            match (key.as_str(), parsed) {
                ("writable", Some(writable)) => flags.writable = writable,
                ("shadowable", Some(shadowable)) => flags.shadowable = shadowable,
                ("writable", None) => self.report(DiagConfigGlobalsDescriptorWritableTypeMismatch {
                    value: self.span(value),
                }),
                ("shadowable", None) => {
                    self.report(DiagConfigGlobalsDescriptorShadowableTypeMismatch {
                        value: self.span(value),
                    })
                }
                _ => {}
            }
        }
        flags
    }
}

/// Byte offset of a one-based line and column as reported by `serde_json`.
fn offset_of_line_and_column(text: &str, line: usize, column: usize) -> usize {
    let line_begin = match line {
        0 | 1 => 0,
        _ => text
            .match_indices('\n')
            .nth(line - 2)
            .map_or(text.len(), |(index, _)| index + 1),
    };
    (line_begin + column.saturating_sub(1)).min(text.len())
}
