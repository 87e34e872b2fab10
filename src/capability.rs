//! The capability registry: the closed allow/deny table consulted before any
//! member or method access inside an expression.
//!
//! This replaces unrestricted dynamic property dispatch. The evaluator never
//! reflects over a value's surface; it asks this table, and any name that is
//! denylisted or simply absent fails closed. The registry carries no mutable
//! state and is never extended at runtime; hosts that need an alternative
//! table pass their own reference through the evaluation context instead of
//! mutating anything process-global.

use lazy_static::lazy_static;
use std::collections::HashSet;

/// The value kinds the registry distinguishes. Kinds without an allowlist
/// (boolean, object, null) admit no method calls at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Sequence,
    Text,
    Number,
    Date,
    Boolean,
    Object,
    Null,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Sequence => "sequence",
            ValueKind::Text => "text",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
            ValueKind::Boolean => "boolean",
            ValueKind::Object => "object",
            ValueKind::Null => "null",
        }
    }
}

/// Per-kind method allowlists plus the global denylist.
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    sequence: HashSet<&'static str>,
    text: HashSet<&'static str>,
    number: HashSet<&'static str>,
    date: HashSet<&'static str>,
    denied: HashSet<&'static str>,
}

const SEQUENCE_METHODS: &[&str] = &[
    "length", "includes", "indexOf", "join", "slice", "concat", "at",
];

const TEXT_METHODS: &[&str] = &[
    "length",
    "toUpperCase",
    "toLowerCase",
    "trim",
    "includes",
    "startsWith",
    "endsWith",
    "slice",
    "split",
    "replace",
    "charAt",
    "indexOf",
    "padStart",
    "padEnd",
];

const NUMBER_METHODS: &[&str] = &["toFixed", "round", "floor", "ceil", "abs"];

const DATE_METHODS: &[&str] = &[
    "getTime",
    "getFullYear",
    "getMonth",
    "getDate",
    "getDay",
    "getHours",
    "getMinutes",
    "getSeconds",
    "toISOString",
];

/// Names that could reach a constructor or walk the prototype chain in the
/// hosting renderer. Checked before the allowlists, for every kind.
const DENIED_PROPERTIES: &[&str] = &[
    "constructor",
    "prototype",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
    "call",
    "apply",
    "bind",
    "eval",
];

lazy_static! {
    static ref BUILTIN: CapabilityRegistry = CapabilityRegistry {
        sequence: SEQUENCE_METHODS.iter().copied().collect(),
        text: TEXT_METHODS.iter().copied().collect(),
        number: NUMBER_METHODS.iter().copied().collect(),
        date: DATE_METHODS.iter().copied().collect(),
        denied: DENIED_PROPERTIES.iter().copied().collect(),
    };
}

impl CapabilityRegistry {
    /// The built-in registry every evaluation uses unless the context
    /// supplies its own.
    pub fn builtin() -> &'static CapabilityRegistry {
        &BUILTIN
    }

    pub fn is_denied(&self, name: &str) -> bool {
        self.denied.contains(name)
    }

    /// Whether `name` may be invoked on a value of `kind`. Denied names are
    /// never allowed, whatever the kind.
    pub fn allows(&self, kind: ValueKind, name: &str) -> bool {
        if self.is_denied(name) {
            return false;
        }
        match kind {
            ValueKind::Sequence => self.sequence.contains(name),
            ValueKind::Text => self.text.contains(name),
            ValueKind::Number => self.number.contains(name),
            ValueKind::Date => self.date.contains(name),
            ValueKind::Boolean | ValueKind::Object | ValueKind::Null => false,
        }
    }
}
