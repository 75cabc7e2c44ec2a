//! Variables which exist without being declared by the program.

use std::collections::HashMap;

/// What a program may do with a global variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalVariableFlags {
    /// Assignments are allowed.
    pub writable: bool,
    /// A module-level declaration may shadow it.
    pub shadowable: bool,
}

impl Default for GlobalVariableFlags {
    fn default() -> Self {
        Self {
            writable: true,
            shadowable: true,
        }
    }
}

/// A named, predefined list of globals such as `browser` or `jest`.
#[derive(Debug)]
pub struct GlobalGroup {
    /// Name used in configuration files.
    pub name: &'static str,
    /// Writable, shadowable globals.
    pub globals: &'static [&'static str],
    /// Globals which cannot be assigned.
    pub non_writable_globals: &'static [&'static str],
}

/// The `ecmascript` group, always enabled.
pub const ECMASCRIPT_GROUP: &str = "ecmascript";

/// Every built-in group.
pub static GLOBAL_GROUPS: &[GlobalGroup] = &[
    GlobalGroup {
        name: ECMASCRIPT_GROUP,
        globals: &[
            "AggregateError",
            "Array",
            "ArrayBuffer",
            "Atomics",
            "BigInt",
            "BigInt64Array",
            "BigUint64Array",
            "Boolean",
            "DataView",
            "Date",
            "Error",
            "EvalError",
            "FinalizationRegistry",
            "Float32Array",
            "Float64Array",
            "Function",
            "Int16Array",
            "Int32Array",
            "Int8Array",
            "Intl",
            "JSON",
            "Map",
            "Math",
            "Number",
            "Object",
            "Promise",
            "Proxy",
            "RangeError",
            "ReferenceError",
            "Reflect",
            "RegExp",
            "Set",
            "SharedArrayBuffer",
            "String",
            "Symbol",
            "SyntaxError",
            "TypeError",
            "URIError",
            "Uint16Array",
            "Uint32Array",
            "Uint8Array",
            "Uint8ClampedArray",
            "WeakMap",
            "WeakRef",
            "WeakSet",
            "decodeURI",
            "decodeURIComponent",
            "encodeURI",
            "encodeURIComponent",
            "escape",
            "eval",
            "globalThis",
            "isFinite",
            "isNaN",
            "parseFloat",
            "parseInt",
            "unescape",
        ],
        non_writable_globals: &["Infinity", "NaN", "undefined"],
    },
    GlobalGroup {
        name: "browser",
        globals: &[
            "AbortController",
            "Audio",
            "Blob",
            "CustomEvent",
            "Element",
            "Event",
            "EventTarget",
            "File",
            "FileReader",
            "FormData",
            "HTMLElement",
            "Headers",
            "Image",
            "IntersectionObserver",
            "MutationObserver",
            "Node",
            "Request",
            "ResizeObserver",
            "Response",
            "TextDecoder",
            "TextEncoder",
            "URL",
            "URLSearchParams",
            "WebSocket",
            "Worker",
            "XMLHttpRequest",
            "alert",
            "atob",
            "btoa",
            "cancelAnimationFrame",
            "clearInterval",
            "clearTimeout",
            "confirm",
            "console",
            "crypto",
            "document",
            "fetch",
            "getComputedStyle",
            "history",
            "localStorage",
            "location",
            "navigator",
            "performance",
            "postMessage",
            "prompt",
            "queueMicrotask",
            "requestAnimationFrame",
            "screen",
            "self",
            "sessionStorage",
            "setInterval",
            "setTimeout",
            "structuredClone",
            "window",
        ],
        non_writable_globals: &[],
    },
    GlobalGroup {
        name: "node.js",
        globals: &[
            "AbortController",
            "Buffer",
            "TextDecoder",
            "TextEncoder",
            "URL",
            "URLSearchParams",
            "__dirname",
            "__filename",
            "clearImmediate",
            "clearInterval",
            "clearTimeout",
            "console",
            "exports",
            "fetch",
            "global",
            "module",
            "performance",
            "process",
            "queueMicrotask",
            "require",
            "setImmediate",
            "setInterval",
            "setTimeout",
            "structuredClone",
        ],
        non_writable_globals: &[],
    },
    GlobalGroup {
        name: "node.js-es",
        globals: &[
            "AbortController",
            "Buffer",
            "TextDecoder",
            "TextEncoder",
            "URL",
            "URLSearchParams",
            "clearImmediate",
            "clearInterval",
            "clearTimeout",
            "console",
            "fetch",
            "global",
            "performance",
            "process",
            "queueMicrotask",
            "setImmediate",
            "setInterval",
            "setTimeout",
            "structuredClone",
        ],
        non_writable_globals: &[],
    },
    GlobalGroup {
        name: "web-worker",
        globals: &[
            "Blob",
            "TextDecoder",
            "TextEncoder",
            "URL",
            "WorkerGlobalScope",
            "clearInterval",
            "clearTimeout",
            "close",
            "console",
            "crypto",
            "fetch",
            "importScripts",
            "location",
            "navigator",
            "onmessage",
            "performance",
            "postMessage",
            "queueMicrotask",
            "self",
            "setInterval",
            "setTimeout",
            "structuredClone",
        ],
        non_writable_globals: &[],
    },
    GlobalGroup {
        name: "jest",
        globals: &[
            "afterAll",
            "afterEach",
            "beforeAll",
            "beforeEach",
            "describe",
            "expect",
            "fit",
            "it",
            "jest",
            "test",
            "xdescribe",
            "xit",
            "xtest",
        ],
        non_writable_globals: &[],
    },
    GlobalGroup {
        name: "jasmine",
        globals: &[
            "afterAll",
            "afterEach",
            "beforeAll",
            "beforeEach",
            "describe",
            "expect",
            "fail",
            "fdescribe",
            "fit",
            "it",
            "jasmine",
            "pending",
            "spyOn",
            "xdescribe",
            "xit",
        ],
        non_writable_globals: &[],
    },
    GlobalGroup {
        name: "mocha",
        globals: &[
            "after",
            "afterEach",
            "before",
            "beforeEach",
            "context",
            "describe",
            "it",
            "mocha",
            "run",
            "setup",
            "specify",
            "suite",
            "suiteSetup",
            "suiteTeardown",
            "teardown",
            "test",
            "xcontext",
            "xdescribe",
            "xit",
            "xspecify",
        ],
        non_writable_globals: &[],
    },
    GlobalGroup {
        name: "jquery",
        globals: &["$", "jQuery"],
        non_writable_globals: &[],
    },
];

/// Find a built-in group by its configuration name.
pub fn find_global_group(name: &str) -> Option<&'static GlobalGroup> {
    GLOBAL_GROUPS.iter().find(|group| group.name == name)
}

/// The set of globals a program may use without declaring them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalDeclaredVariableSet {
    variables: HashMap<Box<[u8]>, GlobalVariableFlags>,
}

impl GlobalDeclaredVariableSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in group.
    pub fn with_all_groups() -> Self {
        let mut set = Self::new();
        for group in GLOBAL_GROUPS {
            set.add_group(group);
        }
        set
    }

    /// Add every variable of `group`.
    pub fn add_group(&mut self, group: &GlobalGroup) {
        for name in group.globals {
            self.add_variable(name.as_bytes(), GlobalVariableFlags::default());
        }
        for name in group.non_writable_globals {
            self.add_variable(
                name.as_bytes(),
                GlobalVariableFlags {
                    writable: false,
                    shadowable: true,
                },
            );
        }
    }

    /// Add `name`, replacing its flags if it is already present.
    pub fn add_variable(&mut self, name: &[u8], flags: GlobalVariableFlags) {
        self.variables.insert(name.into(), flags);
    }

    /// Forget `name`.
    pub fn remove_variable(&mut self, name: &[u8]) {
        self.variables.remove(name);
    }

    /// Flags of `name`, if it is a global.
    pub fn find(&self, name: &[u8]) -> Option<GlobalVariableFlags> {
        self.variables.get(name).copied()
    }

    /// Number of globals.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether there are no globals.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_names_are_unique() {
        for (i, group) in GLOBAL_GROUPS.iter().enumerate() {
            assert!(
                GLOBAL_GROUPS[i + 1..].iter().all(|other| other.name != group.name),
                "{} listed twice",
                group.name
            );
        }
    }

    #[test]
    fn ecmascript_constants_are_not_writable() {
        let globals = GlobalDeclaredVariableSet::with_all_groups();
        assert_eq!(
            globals.find(b"Infinity"),
            Some(GlobalVariableFlags {
                writable: false,
                shadowable: true,
            })
        );
        assert_eq!(globals.find(b"console"), Some(GlobalVariableFlags::default()));
        assert_eq!(globals.find(b"notAGlobal"), None);
    }

    #[test]
    fn add_and_remove() {
        let mut globals = GlobalDeclaredVariableSet::new();
        assert!(globals.is_empty());
        globals.add_group(find_global_group("jquery").unwrap());
        assert_eq!(globals.len(), 2);
        globals.remove_variable(b"$");
        assert_eq!(globals.find(b"$"), None);
        assert!(globals.find(b"jQuery").is_some());
    }
}
