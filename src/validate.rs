//! Structural (schema) validation of raw documents.
//!
//! This pass runs before any semantic reasoning. It walks the untyped
//! `serde_json::Value`, carrying a path stack, and collects every structural
//! violation found in a single traversal: required fields, primitive types,
//! enum membership, discriminant tags, identifier shape, and constraint
//! sanity. Malformed input is an ordinary validation failure, never a panic.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES (stable, consumer-facing)
// ═══════════════════════════════════════════════════════════════════════════════

pub const SCHEMA_INVALID: &str = "SCHEMA_INVALID";
pub const UNDEFINED_STATE: &str = "UNDEFINED_STATE";
pub const UNDEFINED_ACTION: &str = "UNDEFINED_ACTION";
pub const VAR_UNDEFINED: &str = "VAR_UNDEFINED";
pub const PARAM_UNDEFINED: &str = "PARAM_UNDEFINED";
pub const DUPLICATE_ACTION: &str = "DUPLICATE_ACTION";
pub const UNSUPPORTED_VERSION: &str = "UNSUPPORTED_VERSION";
pub const COMPONENT_NOT_FOUND: &str = "COMPONENT_NOT_FOUND";
pub const COMPONENT_PROP_MISSING: &str = "COMPONENT_PROP_MISSING";
pub const COMPONENT_CYCLE: &str = "COMPONENT_CYCLE";
pub const COMPONENT_PROP_TYPE: &str = "COMPONENT_PROP_TYPE";

// ═══════════════════════════════════════════════════════════════════════════════
// STRUCTURED PATHS
// ═══════════════════════════════════════════════════════════════════════════════

/// One step from the document root: an object key or an array index.
/// Serialized as a bare string or number so editor tooling can map the path
/// back to a text range without unwrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Mutable path stack threaded through every traversal that can report
/// diagnostics. Push on descent, pop on return, snapshot on error.
#[derive(Debug, Clone, Default)]
pub struct DocPath {
    segments: Vec<PathSegment>,
}

impl DocPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn push_key(&mut self, key: &str) {
        self.segments.push(PathSegment::Key(key.to_string()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    pub fn snapshot(&self) -> Vec<PathSegment> {
        self.segments.clone()
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        let parts: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// A user-facing diagnostic: stable code, human-readable message, and the
/// structured path of the offending node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileError {
    pub code: String,
    pub message: String,
    pub path: Vec<PathSegment>,
}

impl CompileError {
    pub fn new(code: &str, message: impl Into<String>, path: &DocPath) -> Self {
        CompileError {
            code: code.to_string(),
            message: message.into(),
            path: path.snapshot(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATIC TABLES
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    static ref IDENT_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

const STATE_FIELD_TYPES: &[&str] = &["number", "string", "boolean", "list", "object"];
const PARAM_TYPES: &[&str] = &["number", "string", "boolean", "list", "object", "any"];
const EXPRESSION_TYPES: &[&str] = &[
    "literal", "state", "var", "param", "binary", "not", "cond", "member",
];
const BINARY_OPS: &[&str] = &[
    "+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">=", "&&", "||",
];
const ACTION_STEP_TYPES: &[&str] = &["assign", "update", "fetch"];
const UPDATE_OPS: &[&str] = &["add", "subtract", "multiply", "push", "removeAt", "toggle"];
const FETCH_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];
const VIEW_NODE_TYPES: &[&str] = &["element", "text", "if", "for", "component", "slot"];

fn is_identifier(s: &str) -> bool {
    IDENT_RE.is_match(s)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEMA CHECKER
// ═══════════════════════════════════════════════════════════════════════════════

/// Validate a raw document. Returns every structural violation found; an
/// empty list means the document deserializes cleanly into
/// [`Document`](crate::document::Document).
pub fn validate_schema(raw: &Value) -> Vec<CompileError> {
    let mut checker = SchemaChecker {
        errors: Vec::new(),
        path: DocPath::root(),
    };
    checker.check_document(raw);
    debug!(
        errors = checker.errors.len(),
        "schema validation pass finished"
    );
    checker.errors
}

struct SchemaChecker {
    errors: Vec<CompileError>,
    path: DocPath,
}

impl SchemaChecker {
    fn error(&mut self, message: impl Into<String>) {
        self.errors
            .push(CompileError::new(SCHEMA_INVALID, message, &self.path));
    }

    fn check_document(&mut self, raw: &Value) {
        let obj = match raw.as_object() {
            Some(o) => o,
            None => {
                self.error("document must be a JSON object");
                return;
            }
        };

        self.path.push_key("version");
        match obj.get("version") {
            Some(Value::String(_)) => {}
            Some(_) => self.error("version must be a string"),
            None => self.error("missing required field: version"),
        }
        self.path.pop();

        if let Some(state) = obj.get("state") {
            self.path.push_key("state");
            self.check_named_map(state, "state field", |c, field| c.check_state_field(field));
            self.path.pop();
        }

        if let Some(actions) = obj.get("actions") {
            self.path.push_key("actions");
            match actions.as_array() {
                Some(items) => {
                    for (i, action) in items.iter().enumerate() {
                        self.path.push_index(i);
                        self.check_action(action);
                        self.path.pop();
                    }
                }
                None => self.error("actions must be an array"),
            }
            self.path.pop();
        }

        if let Some(components) = obj.get("components") {
            self.path.push_key("components");
            self.check_named_map(components, "component", |c, comp| c.check_component(comp));
            self.path.pop();
        }

        self.path.push_key("view");
        match obj.get("view") {
            Some(view) => self.check_view_node(view),
            None => self.error("missing required field: view"),
        }
        self.path.pop();

        if let Some(styles) = obj.get("styles") {
            self.path.push_key("styles");
            self.check_styles(styles);
            self.path.pop();
        }
    }

    /// Shared shape check for the name → definition maps at the top level.
    fn check_named_map<F>(&mut self, raw: &Value, what: &str, mut check_entry: F)
    where
        F: FnMut(&mut Self, &Value),
    {
        let obj = match raw.as_object() {
            Some(o) => o,
            None => {
                self.error(format!("{} map must be a JSON object", what));
                return;
            }
        };
        for (name, entry) in obj {
            self.path.push_key(name);
            if !is_identifier(name) {
                self.error(format!("invalid {} name: '{}'", what, name));
            }
            check_entry(self, entry);
            self.path.pop();
        }
    }

    // ── State fields ──────────────────────────────────────────────────────────

    fn check_state_field(&mut self, raw: &Value) {
        let obj = match raw.as_object() {
            Some(o) => o,
            None => {
                self.error("state field must be a JSON object");
                return;
            }
        };

        let field_type = match self.check_tag(obj, STATE_FIELD_TYPES, "state field") {
            Some(t) => t,
            None => return,
        };

        // Initial value, when present, must match the declared primitive type.
        if let Some(initial) = obj.get("initial") {
            self.path.push_key("initial");
            let ok = match field_type {
                "number" => initial.is_number(),
                "string" => initial.is_string(),
                "boolean" => initial.is_boolean(),
                "list" => initial.is_array(),
                "object" => initial.is_object(),
                _ => unreachable!(),
            };
            if !ok {
                self.error(format!(
                    "initial value does not match declared type '{}'",
                    field_type
                ));
            }
            self.path.pop();
        }

        if field_type == "number" {
            let min = obj.get("min").map(|v| self.expect_number(v, "min"));
            let max = obj.get("max").map(|v| self.expect_number(v, "max"));
            if let (Some(Some(min)), Some(Some(max))) = (min, max) {
                if min > max {
                    self.error(format!("min ({}) exceeds max ({})", min, max));
                }
            }
        }

        if field_type == "list" {
            if let Some(raw_len) = obj.get("maxLength") {
                self.path.push_key("maxLength");
                match raw_len.as_u64() {
                    Some(_) => {}
                    None => self.error("maxLength must be a non-negative integer"),
                }
                self.path.pop();
            }
        }
    }

    fn expect_number(&mut self, raw: &Value, key: &str) -> Option<f64> {
        match raw.as_f64() {
            Some(n) => Some(n),
            None => {
                self.path.push_key(key);
                self.error(format!("{} must be a number", key));
                self.path.pop();
                None
            }
        }
    }

    // ── Expressions ───────────────────────────────────────────────────────────

    fn check_expression(&mut self, raw: &Value) {
        let obj = match raw.as_object() {
            Some(o) => o,
            None => {
                self.error("expression must be a JSON object");
                return;
            }
        };

        let tag = match self.check_tag(obj, EXPRESSION_TYPES, "expression") {
            Some(t) => t,
            None => return,
        };

        match tag {
            "literal" => {
                if !obj.contains_key("value") {
                    self.error("literal expression requires a value");
                }
            }
            "state" | "var" | "param" => self.check_name_field(obj),
            "binary" => {
                self.path.push_key("op");
                match obj.get("op").and_then(Value::as_str) {
                    Some(op) if BINARY_OPS.contains(&op) => {}
                    Some(op) => self.error(format!("unknown binary operator '{}'", op)),
                    None => self.error("binary expression requires a string op"),
                }
                self.path.pop();
                self.check_expr_field(obj, "left", true);
                self.check_expr_field(obj, "right", true);
            }
            "not" => self.check_expr_field(obj, "operand", true),
            "cond" => {
                self.check_expr_field(obj, "if", true);
                self.check_expr_field(obj, "then", true);
                self.check_expr_field(obj, "else", true);
            }
            "member" => {
                self.check_expr_field(obj, "target", true);
                self.path.push_key("property");
                match obj.get("property") {
                    Some(Value::String(_)) => {}
                    Some(_) => self.error("member property must be a string"),
                    None => self.error("member expression requires a property"),
                }
                self.path.pop();
                if let Some(args) = obj.get("args") {
                    self.path.push_key("args");
                    match args.as_array() {
                        Some(items) => {
                            for (i, arg) in items.iter().enumerate() {
                                self.path.push_index(i);
                                self.check_expression(arg);
                                self.path.pop();
                            }
                        }
                        None => self.error("member args must be an array"),
                    }
                    self.path.pop();
                }
            }
            _ => unreachable!(),
        }
    }

    fn check_name_field(&mut self, obj: &serde_json::Map<String, Value>) {
        self.path.push_key("name");
        match obj.get("name").and_then(Value::as_str) {
            Some(name) if is_identifier(name) => {}
            Some(name) => self.error(format!("invalid reference name: '{}'", name)),
            None => self.error("reference requires a string name"),
        }
        self.path.pop();
    }

    fn check_expr_field(&mut self, obj: &serde_json::Map<String, Value>, key: &str, required: bool) {
        self.path.push_key(key);
        match obj.get(key) {
            Some(expr) => self.check_expression(expr),
            None if required => self.error(format!("missing required expression: {}", key)),
            None => {}
        }
        self.path.pop();
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    fn check_action(&mut self, raw: &Value) {
        let obj = match raw.as_object() {
            Some(o) => o,
            None => {
                self.error("action must be a JSON object");
                return;
            }
        };

        self.check_name_field(obj);

        self.path.push_key("steps");
        match obj.get("steps").and_then(Value::as_array) {
            Some(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    self.path.push_index(i);
                    self.check_action_step(step);
                    self.path.pop();
                }
            }
            None => self.error("action requires a steps array"),
        }
        self.path.pop();

        if let Some(debounce) = obj.get("debounce") {
            self.path.push_key("debounce");
            if debounce.as_f64().map_or(true, |n| n < 0.0) {
                self.error("debounce must be a non-negative number");
            }
            self.path.pop();
        }
    }

    fn check_action_step(&mut self, raw: &Value) {
        let obj = match raw.as_object() {
            Some(o) => o,
            None => {
                self.error("action step must be a JSON object");
                return;
            }
        };

        let tag = match self.check_tag(obj, ACTION_STEP_TYPES, "action step") {
            Some(t) => t,
            None => return,
        };

        match tag {
            "assign" => {
                self.check_target_field(obj);
                self.check_expr_field(obj, "value", true);
            }
            "update" => {
                self.check_target_field(obj);
                self.path.push_key("op");
                match obj.get("op").and_then(Value::as_str) {
                    Some(op) if UPDATE_OPS.contains(&op) => {}
                    Some(op) => self.error(format!("unknown update operator '{}'", op)),
                    None => self.error("update step requires a string op"),
                }
                self.path.pop();
                self.check_expr_field(obj, "value", false);
            }
            "fetch" => {
                self.check_expr_field(obj, "url", true);
                self.path.push_key("method");
                match obj.get("method").and_then(Value::as_str) {
                    Some(m) if FETCH_METHODS.contains(&m) => {}
                    Some(m) => self.error(format!("unknown fetch method '{}'", m)),
                    None => self.error("fetch step requires a string method"),
                }
                self.path.pop();
                self.check_expr_field(obj, "body", false);
            }
            _ => unreachable!(),
        }
    }

    fn check_target_field(&mut self, obj: &serde_json::Map<String, Value>) {
        self.path.push_key("target");
        match obj.get("target").and_then(Value::as_str) {
            Some(target) if is_identifier(target) => {}
            Some(target) => self.error(format!("invalid target name: '{}'", target)),
            None => self.error("step requires a string target"),
        }
        self.path.pop();
    }

    // ── View tree ─────────────────────────────────────────────────────────────

    fn check_view_node(&mut self, raw: &Value) {
        let obj = match raw.as_object() {
            Some(o) => o,
            None => {
                self.error("view node must be a JSON object");
                return;
            }
        };

        let tag = match self.check_tag(obj, VIEW_NODE_TYPES, "view node") {
            Some(t) => t,
            None => return,
        };

        match tag {
            "element" => {
                self.path.push_key("tag");
                match obj.get("tag") {
                    Some(Value::String(t)) if !t.is_empty() => {}
                    Some(_) => self.error("element tag must be a non-empty string"),
                    None => self.error("element requires a tag"),
                }
                self.path.pop();
                self.check_expr_map(obj, "props");
                if let Some(events) = obj.get("events") {
                    self.path.push_key("events");
                    match events.as_object() {
                        Some(map) => {
                            for (event, action) in map {
                                self.path.push_key(event);
                                if !action.is_string() {
                                    self.error("event binding must name an action");
                                }
                                self.path.pop();
                            }
                        }
                        None => self.error("events must be a JSON object"),
                    }
                    self.path.pop();
                }
                self.check_children(obj, "children", false);
            }
            "text" => self.check_expr_field(obj, "value", true),
            "if" => {
                self.check_expr_field(obj, "condition", true);
                self.check_children(obj, "then", true);
                self.check_children(obj, "else", false);
            }
            "for" => {
                self.check_expr_field(obj, "items", true);
                self.check_binding_field(obj, "item", true);
                self.check_binding_field(obj, "index", false);
                self.check_expr_field(obj, "key", false);
                self.check_children(obj, "body", true);
            }
            "component" => {
                self.path.push_key("name");
                match obj.get("name").and_then(Value::as_str) {
                    Some(name) if is_identifier(name) => {}
                    Some(name) => self.error(format!("invalid component name: '{}'", name)),
                    None => self.error("component instance requires a string name"),
                }
                self.path.pop();
                self.check_expr_map(obj, "props");
                self.check_children(obj, "children", false);
            }
            "slot" => {
                if let Some(name) = obj.get("name") {
                    self.path.push_key("name");
                    if !name.is_string() {
                        self.error("slot name must be a string");
                    }
                    self.path.pop();
                }
            }
            _ => unreachable!(),
        }
    }

    fn check_binding_field(&mut self, obj: &serde_json::Map<String, Value>, key: &str, required: bool) {
        self.path.push_key(key);
        match obj.get(key).and_then(Value::as_str) {
            Some(name) if is_identifier(name) => {}
            Some(name) => self.error(format!("invalid loop binding name: '{}'", name)),
            None if required => self.error(format!("for node requires a string {} binding", key)),
            None if obj.contains_key(key) => self.error(format!("{} binding must be a string", key)),
            None => {}
        }
        self.path.pop();
    }

    fn check_expr_map(&mut self, obj: &serde_json::Map<String, Value>, key: &str) {
        if let Some(raw) = obj.get(key) {
            self.path.push_key(key);
            match raw.as_object() {
                Some(map) => {
                    for (name, expr) in map {
                        self.path.push_key(name);
                        self.check_expression(expr);
                        self.path.pop();
                    }
                }
                None => self.error(format!("{} must be a JSON object", key)),
            }
            self.path.pop();
        }
    }

    fn check_children(&mut self, obj: &serde_json::Map<String, Value>, key: &str, required: bool) {
        self.path.push_key(key);
        match obj.get(key) {
            Some(raw) => match raw.as_array() {
                Some(children) => {
                    for (i, child) in children.iter().enumerate() {
                        self.path.push_index(i);
                        self.check_view_node(child);
                        self.path.pop();
                    }
                }
                None => self.error(format!("{} must be an array", key)),
            },
            None if required => self.error(format!("missing required field: {}", key)),
            None => {}
        }
        self.path.pop();
    }

    // ── Components ────────────────────────────────────────────────────────────

    fn check_component(&mut self, raw: &Value) {
        let obj = match raw.as_object() {
            Some(o) => o,
            None => {
                self.error("component must be a JSON object");
                return;
            }
        };

        if let Some(params) = obj.get("params") {
            self.path.push_key("params");
            match params.as_array() {
                Some(items) => {
                    for (i, param) in items.iter().enumerate() {
                        self.path.push_index(i);
                        self.check_param_decl(param);
                        self.path.pop();
                    }
                }
                None => self.error("params must be an array"),
            }
            self.path.pop();
        }

        self.path.push_key("view");
        match obj.get("view") {
            Some(view) => self.check_view_node(view),
            None => self.error("component requires a view"),
        }
        self.path.pop();
    }

    fn check_param_decl(&mut self, raw: &Value) {
        let obj = match raw.as_object() {
            Some(o) => o,
            None => {
                self.error("param declaration must be a JSON object");
                return;
            }
        };

        self.check_name_field(obj);

        self.path.push_key("type");
        match obj.get("type").and_then(Value::as_str) {
            Some(t) if PARAM_TYPES.contains(&t) => {}
            Some(t) => self.error(format!("unknown param type '{}'", t)),
            None => self.error("param declaration requires a string type"),
        }
        self.path.pop();

        if let Some(optional) = obj.get("optional") {
            self.path.push_key("optional");
            if !optional.is_boolean() {
                self.error("optional must be a boolean");
            }
            self.path.pop();
        }

        self.check_expr_field(obj, "default", false);
    }

    // ── Styles ────────────────────────────────────────────────────────────────

    fn check_styles(&mut self, raw: &Value) {
        let obj = match raw.as_object() {
            Some(o) => o,
            None => {
                self.error("styles must be a JSON object");
                return;
            }
        };
        for (preset, decls) in obj {
            self.path.push_key(preset);
            match decls.as_object() {
                Some(map) => {
                    for (prop, value) in map {
                        self.path.push_key(prop);
                        if !value.is_string() {
                            self.error("style value must be a string");
                        }
                        self.path.pop();
                    }
                }
                None => self.error("style preset must be a JSON object"),
            }
            self.path.pop();
        }
    }

    // ── Shared ────────────────────────────────────────────────────────────────

    /// Check the `type` discriminant against the allowed tag set, reporting
    /// on the tag's own path. Returns the tag so callers can dispatch.
    fn check_tag<'v>(
        &mut self,
        obj: &'v serde_json::Map<String, Value>,
        allowed: &[&str],
        what: &str,
    ) -> Option<&'v str> {
        self.path.push_key("type");
        let result = match obj.get("type").and_then(Value::as_str) {
            Some(tag) if allowed.contains(&tag) => Some(tag),
            Some(tag) => {
                self.error(format!("unknown {} type '{}'", what, tag));
                None
            }
            None => {
                self.error(format!("{} requires a string type tag", what));
                None
            }
        };
        self.path.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_doc() -> Value {
        json!({
            "version": "1.1",
            "view": { "type": "element", "tag": "div" }
        })
    }

    #[test]
    fn minimal_document_passes() {
        assert!(validate_schema(&minimal_doc()).is_empty());
    }

    #[test]
    fn non_object_document_rejected() {
        let errors = validate_schema(&json!([1, 2, 3]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, SCHEMA_INVALID);
        assert!(errors[0].path.is_empty());
    }

    #[test]
    fn collects_multiple_errors_in_one_pass() {
        let errors = validate_schema(&json!({
            "state": { "count": { "type": "vector" } },
            "view": { "type": "element" }
        }));
        // Missing version, unknown state field type, missing element tag.
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.code == SCHEMA_INVALID));
    }

    #[test]
    fn error_paths_locate_the_offending_node() {
        let errors = validate_schema(&json!({
            "version": "1.1",
            "view": {
                "type": "if",
                "condition": { "type": "binary", "op": "**",
                               "left": { "type": "literal", "value": 1 },
                               "right": { "type": "literal", "value": 2 } },
                "then": []
            }
        }));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].path,
            vec![
                PathSegment::Key("view".into()),
                PathSegment::Key("condition".into()),
                PathSegment::Key("op".into()),
            ]
        );
    }

    #[test]
    fn initial_value_must_match_declared_type() {
        let errors = validate_schema(&json!({
            "version": "1.0",
            "state": { "count": { "type": "number", "initial": "zero" } },
            "view": { "type": "element", "tag": "div" }
        }));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].path.last(),
            Some(&PathSegment::Key("initial".into()))
        );
    }

    #[test]
    fn min_above_max_rejected() {
        let errors = validate_schema(&json!({
            "version": "1.0",
            "state": { "n": { "type": "number", "min": 10, "max": 5 } },
            "view": { "type": "element", "tag": "div" }
        }));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("min"));
    }

    #[test]
    fn unknown_update_op_rejected_with_index_path() {
        let errors = validate_schema(&json!({
            "version": "1.0",
            "actions": [
                { "name": "bump", "steps": [
                    { "type": "update", "target": "count", "op": "increment" }
                ] }
            ],
            "view": { "type": "element", "tag": "div" }
        }));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].path,
            vec![
                PathSegment::Key("actions".into()),
                PathSegment::Index(0),
                PathSegment::Key("steps".into()),
                PathSegment::Index(0),
                PathSegment::Key("op".into()),
            ]
        );
    }

    #[test]
    fn malformed_identifiers_rejected() {
        let errors = validate_schema(&json!({
            "version": "1.0",
            "state": { "my count": { "type": "number" } },
            "view": { "type": "for", "items": { "type": "state", "name": "my count" },
                      "item": "9bad", "body": [] }
        }));
        let codes: Vec<&str> = errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec![SCHEMA_INVALID; 3]);
    }

    #[test]
    fn validated_document_deserializes() {
        let raw = json!({
            "version": "1.1",
            "state": { "todos": { "type": "list", "initial": [] } },
            "actions": [ { "name": "clear", "steps": [
                { "type": "assign", "target": "todos",
                  "value": { "type": "literal", "value": [] } }
            ] } ],
            "components": {
                "Card": {
                    "params": [ { "name": "title", "type": "string" } ],
                    "view": { "type": "text", "value": { "type": "param", "name": "title" } }
                }
            },
            "view": { "type": "element", "tag": "main" }
        });
        assert!(validate_schema(&raw).is_empty());
        let doc: crate::document::Document = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.version, "1.1");
        assert_eq!(doc.components.len(), 1);
    }
}
