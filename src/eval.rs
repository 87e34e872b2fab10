//! The sandboxed expression evaluator.
//!
//! A pure function from (compiled expression, evaluation context) to a value.
//! Every consumer (client renderer, server renderer) calls this identically,
//! so evaluation semantics are consumer-independent. Evaluation never mutates
//! the program, the context's state store, or the capability registry.
//!
//! Member and method access is the only door out of the expression language,
//! and it is gated by the capability registry: denylisted names and names
//! absent from the target kind's allowlist fail closed with a capability
//! violation. A reference the analyzer should have proven resolvable that
//! fails to resolve at evaluation time is an internal pipeline defect, not a
//! user error, and is reported as such.

use crate::capability::{CapabilityRegistry, ValueKind};
use crate::program::{CompiledExpr, ScopeKind};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

// ═══════════════════════════════════════════════════════════════════════════════
// RUNTIME VALUES
// ═══════════════════════════════════════════════════════════════════════════════

/// A runtime value. JSON-representable kinds round-trip losslessly through
/// `from_json`/`to_json`; `Date` (epoch milliseconds) only enters through the
/// host side of a context and serializes as its millisecond count.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Date(f64),
}

impl Value {
    pub fn from_json(raw: &JsonValue) -> Value {
        match raw {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => Value::Num(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::Str(s.clone()),
            JsonValue::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            JsonValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Num(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Str(s) => JsonValue::String(s.clone()),
            Value::List(items) => {
                JsonValue::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => JsonValue::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Date(ms) => serde_json::Number::from_f64(*ms)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Num(_) => ValueKind::Number,
            Value::Str(_) => ValueKind::Text,
            Value::List(_) => ValueKind::Sequence,
            Value::Object(_) => ValueKind::Object,
            Value::Date(_) => ValueKind::Date,
        }
    }

    /// Truthiness as the hosting renderer's language defines it: empty text
    /// and zero are falsy, sequences and objects are always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Object(_) | Value::Date(_) => true,
        }
    }

    /// Numeric coercion used by arithmetic and comparison. Text does not
    /// silently coerce; the operator reports invalid operands instead.
    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Date(ms) => Some(*ms),
            _ => None,
        }
    }

    /// String rendering used by concatenation, `join`, and text method
    /// arguments.
    pub fn display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Num(n) => format_number(*n),
            Value::Str(s) => s.clone(),
            Value::List(_) | Value::Object(_) => self.to_json().to_string(),
            Value::Date(ms) => iso_string(*ms),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    format!("{}", n)
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATION ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The expression asked for a denylisted or non-allowlisted member.
    /// Fails closed; the underlying value is never exposed.
    #[error("access to '{property}' on a {kind} value is not permitted")]
    CapabilityViolation { kind: &'static str, property: String },

    #[error("invalid operands for '{op}': {detail}")]
    InvalidOperands { op: &'static str, detail: String },

    #[error("invalid arguments to '{method}': {detail}")]
    InvalidArguments { method: String, detail: String },

    /// A reference the analyzer proved resolvable failed to resolve. This is
    /// a pipeline defect, not bad input; hosts must not surface it as a
    /// document error.
    #[error("unresolved {scope} binding '{name}' in a compiled program")]
    ScopeDefect { scope: &'static str, name: String },

    #[error("internal evaluator defect: {0}")]
    Internal(String),
}

impl EvalError {
    /// Distinguishes pipeline defects from ordinary evaluation failures so
    /// host applications do not mistake them for bad input.
    pub fn is_defect(&self) -> bool {
        matches!(self, EvalError::ScopeDefect { .. } | EvalError::Internal(_))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATION CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Environment-specific lookups supplied by the host (current time, viewport,
/// session data). Consulted last when resolving a local binding.
pub trait HostAdapter {
    fn lookup(&self, name: &str) -> Option<Value>;
}

/// Everything a single evaluation may read. One context per call; the state
/// store is borrowed read-only and never written through.
pub struct EvalContext<'a> {
    pub state: &'a BTreeMap<String, Value>,
    /// Loop bindings established by the renderer while walking a `for` body.
    pub locals: BTreeMap<String, Value>,
    /// The enclosing component instance's parameter values.
    pub params: BTreeMap<String, Value>,
    /// Route parameters supplied by the router, resolved as ambient locals.
    pub route: Option<&'a BTreeMap<String, Value>>,
    /// Imported values supplied by the island loader, resolved after route
    /// parameters.
    pub imports: Option<&'a BTreeMap<String, Value>>,
    /// Style presets, for hosts that override the program's own table.
    pub styles: Option<&'a BTreeMap<String, BTreeMap<String, String>>>,
    pub host: Option<&'a dyn HostAdapter>,
    pub registry: &'a CapabilityRegistry,
}

impl<'a> EvalContext<'a> {
    pub fn new(state: &'a BTreeMap<String, Value>) -> Self {
        EvalContext {
            state,
            locals: BTreeMap::new(),
            params: BTreeMap::new(),
            route: None,
            imports: None,
            styles: None,
            host: None,
            registry: CapabilityRegistry::builtin(),
        }
    }

    fn resolve_local(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.locals.get(name) {
            return Some(value.clone());
        }
        if let Some(route) = self.route {
            if let Some(value) = route.get(name) {
                return Some(value.clone());
            }
        }
        if let Some(imports) = self.imports {
            if let Some(value) = imports.get(name) {
                return Some(value.clone());
            }
        }
        self.host.and_then(|host| host.lookup(name))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Evaluate a compiled expression against a context.
pub fn evaluate(expr: &CompiledExpr, ctx: &EvalContext) -> Result<Value, EvalError> {
    match expr {
        CompiledExpr::Literal { value } => Ok(Value::from_json(value)),

        CompiledExpr::Load { scope, name } => match scope {
            ScopeKind::State => ctx
                .state
                .get(name)
                .cloned()
                .ok_or_else(|| scope_defect("state", name)),
            ScopeKind::Local => ctx
                .resolve_local(name)
                .ok_or_else(|| scope_defect("local", name)),
            ScopeKind::Param => ctx
                .params
                .get(name)
                .cloned()
                .ok_or_else(|| scope_defect("param", name)),
        },

        CompiledExpr::Binary { op, left, right } => {
            use crate::document::BinaryOp;
            if op.is_logical() {
                let lhs = evaluate(left, ctx)?;
                // Short-circuit: the untaken operand is never evaluated.
                return match op {
                    BinaryOp::And if !lhs.is_truthy() => Ok(lhs),
                    BinaryOp::Or if lhs.is_truthy() => Ok(lhs),
                    _ => evaluate(right, ctx),
                };
            }
            let lhs = evaluate(left, ctx)?;
            let rhs = evaluate(right, ctx)?;
            apply_binary(*op, lhs, rhs)
        }

        CompiledExpr::Not { operand } => {
            Ok(Value::Bool(!evaluate(operand, ctx)?.is_truthy()))
        }

        CompiledExpr::Cond {
            if_expr,
            then_expr,
            else_expr,
        } => {
            // Exactly one branch is evaluated.
            if evaluate(if_expr, ctx)?.is_truthy() {
                evaluate(then_expr, ctx)
            } else {
                evaluate(else_expr, ctx)
            }
        }

        CompiledExpr::Member {
            target,
            property,
            args,
        } => {
            let value = evaluate(target, ctx)?;
            eval_member(value, property, args.as_deref(), ctx)
        }
    }
}

fn scope_defect(scope: &'static str, name: &str) -> EvalError {
    warn!(scope, name, "compiled program reference failed to resolve");
    EvalError::ScopeDefect {
        scope,
        name: name.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BINARY OPERATORS
// ═══════════════════════════════════════════════════════════════════════════════

fn apply_binary(
    op: crate::document::BinaryOp,
    lhs: Value,
    rhs: Value,
) -> Result<Value, EvalError> {
    use crate::document::BinaryOp::*;
    match op {
        Add => {
            // Text on either side means concatenation.
            if matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_)) {
                return Ok(Value::Str(lhs.display_string() + &rhs.display_string()));
            }
            numeric(op, &lhs, &rhs).map(|(a, b)| Value::Num(a + b))
        }
        Sub => numeric(op, &lhs, &rhs).map(|(a, b)| Value::Num(a - b)),
        Mul => numeric(op, &lhs, &rhs).map(|(a, b)| Value::Num(a * b)),
        Div => numeric(op, &lhs, &rhs).map(|(a, b)| Value::Num(a / b)),
        Mod => numeric(op, &lhs, &rhs).map(|(a, b)| Value::Num(a % b)),
        Eq => Ok(Value::Bool(lhs == rhs)),
        Ne => Ok(Value::Bool(lhs != rhs)),
        Lt => compare(op, &lhs, &rhs).map(|ord| Value::Bool(ord == std::cmp::Ordering::Less)),
        Le => compare(op, &lhs, &rhs).map(|ord| Value::Bool(ord != std::cmp::Ordering::Greater)),
        Gt => compare(op, &lhs, &rhs).map(|ord| Value::Bool(ord == std::cmp::Ordering::Greater)),
        Ge => compare(op, &lhs, &rhs).map(|ord| Value::Bool(ord != std::cmp::Ordering::Less)),
        And | Or => Err(EvalError::Internal(
            "logical operator reached apply_binary".to_string(),
        )),
    }
}

fn op_symbol(op: crate::document::BinaryOp) -> &'static str {
    use crate::document::BinaryOp::*;
    match op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Mod => "%",
        Eq => "==",
        Ne => "!=",
        Lt => "<",
        Le => "<=",
        Gt => ">",
        Ge => ">=",
        And => "&&",
        Or => "||",
    }
}

fn numeric(
    op: crate::document::BinaryOp,
    lhs: &Value,
    rhs: &Value,
) -> Result<(f64, f64), EvalError> {
    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(EvalError::InvalidOperands {
            op: op_symbol(op),
            detail: format!(
                "expected numbers, got {} and {}",
                lhs.kind().name(),
                rhs.kind().name()
            ),
        }),
    }
}

fn compare(
    op: crate::document::BinaryOp,
    lhs: &Value,
    rhs: &Value,
) -> Result<std::cmp::Ordering, EvalError> {
    if let (Value::Str(a), Value::Str(b)) = (lhs, rhs) {
        return Ok(a.cmp(b));
    }
    let (a, b) = numeric(op, lhs, rhs)?;
    a.partial_cmp(&b).ok_or(EvalError::InvalidOperands {
        op: op_symbol(op),
        detail: "comparison with NaN".to_string(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMBER / METHOD ACCESS
// ═══════════════════════════════════════════════════════════════════════════════

fn eval_member(
    value: Value,
    property: &str,
    args: Option<&[CompiledExpr]>,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let registry = ctx.registry;
    let kind = value.kind();

    // The denylist is consulted before anything else, for every kind.
    if registry.is_denied(property) {
        return Err(violation(kind, property));
    }

    match args {
        // Property read: object key lookup and the `length` pseudo-property
        // are the only permitted forms. Everything else, including an
        // allowlisted method name read without a call, fails closed so a
        // callable is never surfaced as a value.
        None => match &value {
            Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
            Value::Str(s) if property == "length" && registry.allows(kind, "length") => {
                Ok(Value::Num(s.chars().count() as f64))
            }
            Value::List(items) if property == "length" && registry.allows(kind, "length") => {
                Ok(Value::Num(items.len() as f64))
            }
            _ => Err(violation(kind, property)),
        },

        // Method call: capability check first, argument evaluation second.
        Some(arg_exprs) => {
            if !registry.allows(kind, property) {
                return Err(violation(kind, property));
            }
            let args: Vec<Value> = arg_exprs
                .iter()
                .map(|arg| evaluate(arg, ctx))
                .collect::<Result<_, _>>()?;
            match value {
                Value::List(items) => sequence_method(&items, property, &args),
                Value::Str(s) => text_method(&s, property, &args),
                Value::Num(n) => number_method(n, property, &args),
                Value::Date(ms) => date_method(ms, property, &args),
                _ => Err(EvalError::Internal(format!(
                    "allowlist admitted '{}' on a {} value",
                    property,
                    kind.name()
                ))),
            }
        }
    }
}

fn violation(kind: ValueKind, property: &str) -> EvalError {
    EvalError::CapabilityViolation {
        kind: kind.name(),
        property: property.to_string(),
    }
}

fn require_arg<'v>(args: &'v [Value], i: usize, method: &str) -> Result<&'v Value, EvalError> {
    args.get(i).ok_or_else(|| EvalError::InvalidArguments {
        method: method.to_string(),
        detail: format!("missing argument {}", i + 1),
    })
}

fn require_number(args: &[Value], i: usize, method: &str) -> Result<f64, EvalError> {
    let value = require_arg(args, i, method)?;
    value.as_number().ok_or_else(|| EvalError::InvalidArguments {
        method: method.to_string(),
        detail: format!("argument {} must be a number", i + 1),
    })
}

fn optional_number(args: &[Value], i: usize, method: &str) -> Result<Option<f64>, EvalError> {
    match args.get(i) {
        None => Ok(None),
        Some(value) => value
            .as_number()
            .map(Some)
            .ok_or_else(|| EvalError::InvalidArguments {
                method: method.to_string(),
                detail: format!("argument {} must be a number", i + 1),
            }),
    }
}

/// Normalize a possibly negative index against a length, clamping to bounds.
fn norm_index(i: f64, len: usize) -> usize {
    let len = len as f64;
    let idx = if i < 0.0 { len + i } else { i };
    idx.clamp(0.0, len) as usize
}

// ── Sequence methods ─────────────────────────────────────────────────────────

fn sequence_method(items: &[Value], method: &str, args: &[Value]) -> Result<Value, EvalError> {
    match method {
        "length" => Ok(Value::Num(items.len() as f64)),
        "includes" => {
            let needle = require_arg(args, 0, method)?;
            Ok(Value::Bool(items.contains(needle)))
        }
        "indexOf" => {
            let needle = require_arg(args, 0, method)?;
            let idx = items
                .iter()
                .position(|item| item == needle)
                .map_or(-1.0, |i| i as f64);
            Ok(Value::Num(idx))
        }
        "join" => {
            let sep = args
                .first()
                .map_or_else(|| ",".to_string(), Value::display_string);
            let joined: Vec<String> = items.iter().map(Value::display_string).collect();
            Ok(Value::Str(joined.join(&sep)))
        }
        "slice" => {
            let start = norm_index(optional_number(args, 0, method)?.unwrap_or(0.0), items.len());
            let end = norm_index(
                optional_number(args, 1, method)?.unwrap_or(items.len() as f64),
                items.len(),
            );
            let slice = if start < end { &items[start..end] } else { &[] };
            Ok(Value::List(slice.to_vec()))
        }
        "concat" => {
            let mut result = items.to_vec();
            for arg in args {
                match arg {
                    Value::List(other) => result.extend(other.iter().cloned()),
                    single => result.push(single.clone()),
                }
            }
            Ok(Value::List(result))
        }
        "at" => {
            let i = require_number(args, 0, method)?;
            let len = items.len() as f64;
            let idx = if i < 0.0 { len + i } else { i };
            if idx < 0.0 || idx >= len {
                Ok(Value::Null)
            } else {
                Ok(items[idx as usize].clone())
            }
        }
        _ => Err(EvalError::Internal(format!(
            "unimplemented sequence method '{}'",
            method
        ))),
    }
}

// ── Text methods ─────────────────────────────────────────────────────────────

fn text_method(s: &str, method: &str, args: &[Value]) -> Result<Value, EvalError> {
    match method {
        "length" => Ok(Value::Num(s.chars().count() as f64)),
        "toUpperCase" => Ok(Value::Str(s.to_uppercase())),
        "toLowerCase" => Ok(Value::Str(s.to_lowercase())),
        "trim" => Ok(Value::Str(s.trim().to_string())),
        "includes" => {
            let needle = require_arg(args, 0, method)?.display_string();
            Ok(Value::Bool(s.contains(&needle)))
        }
        "startsWith" => {
            let needle = require_arg(args, 0, method)?.display_string();
            Ok(Value::Bool(s.starts_with(&needle)))
        }
        "endsWith" => {
            let needle = require_arg(args, 0, method)?.display_string();
            Ok(Value::Bool(s.ends_with(&needle)))
        }
        "slice" => {
            let chars: Vec<char> = s.chars().collect();
            let start = norm_index(optional_number(args, 0, method)?.unwrap_or(0.0), chars.len());
            let end = norm_index(
                optional_number(args, 1, method)?.unwrap_or(chars.len() as f64),
                chars.len(),
            );
            let out: String = if start < end {
                chars[start..end].iter().collect()
            } else {
                String::new()
            };
            Ok(Value::Str(out))
        }
        "split" => {
            let sep = require_arg(args, 0, method)?.display_string();
            let parts: Vec<Value> = if sep.is_empty() {
                s.chars().map(|c| Value::Str(c.to_string())).collect()
            } else {
                s.split(&sep as &str)
                    .map(|part| Value::Str(part.to_string()))
                    .collect()
            };
            Ok(Value::List(parts))
        }
        "replace" => {
            let from = require_arg(args, 0, method)?.display_string();
            let to = require_arg(args, 1, method)?.display_string();
            if from.is_empty() {
                return Ok(Value::Str(s.to_string()));
            }
            Ok(Value::Str(s.replacen(&from as &str, &to, 1)))
        }
        "charAt" => {
            let i = require_number(args, 0, method)?;
            let out = if i < 0.0 {
                None
            } else {
                s.chars().nth(i as usize)
            };
            Ok(Value::Str(out.map(|c| c.to_string()).unwrap_or_default()))
        }
        "indexOf" => {
            let needle = require_arg(args, 0, method)?.display_string();
            let idx = s
                .find(&needle as &str)
                .map_or(-1.0, |byte_idx| s[..byte_idx].chars().count() as f64);
            Ok(Value::Num(idx))
        }
        "padStart" | "padEnd" => {
            let target = require_number(args, 0, method)?.max(0.0) as usize;
            let pad = args
                .get(1)
                .map_or_else(|| " ".to_string(), Value::display_string);
            let current = s.chars().count();
            if pad.is_empty() || current >= target {
                return Ok(Value::Str(s.to_string()));
            }
            let fill: String = pad.chars().cycle().take(target - current).collect();
            let out = if method == "padStart" {
                fill + s
            } else {
                s.to_string() + &fill
            };
            Ok(Value::Str(out))
        }
        _ => Err(EvalError::Internal(format!(
            "unimplemented text method '{}'",
            method
        ))),
    }
}

// ── Number methods ───────────────────────────────────────────────────────────

fn number_method(n: f64, method: &str, args: &[Value]) -> Result<Value, EvalError> {
    match method {
        "toFixed" => {
            let digits = optional_number(args, 0, method)?.unwrap_or(0.0);
            if !(0.0..=20.0).contains(&digits) {
                return Err(EvalError::InvalidArguments {
                    method: method.to_string(),
                    detail: "digits must be between 0 and 20".to_string(),
                });
            }
            Ok(Value::Str(format!("{:.*}", digits as usize, n)))
        }
        "round" => Ok(Value::Num((n + 0.5).floor())),
        "floor" => Ok(Value::Num(n.floor())),
        "ceil" => Ok(Value::Num(n.ceil())),
        "abs" => Ok(Value::Num(n.abs())),
        _ => Err(EvalError::Internal(format!(
            "unimplemented number method '{}'",
            method
        ))),
    }
}

// ── Date methods ─────────────────────────────────────────────────────────────

/// Calendar parts of an epoch-millisecond timestamp, in UTC.
struct DateParts {
    year: i64,
    month: u32,
    day: u32,
    weekday: u32,
    hours: u32,
    minutes: u32,
    seconds: u32,
    millis: u32,
}

fn date_parts(ms: f64) -> DateParts {
    let days = (ms / 86_400_000.0).floor();
    let ms_of_day = (ms - days * 86_400_000.0) as i64;
    let (year, month, day) = civil_from_days(days as i64);
    DateParts {
        year,
        month,
        day,
        weekday: ((days as i64 + 4).rem_euclid(7)) as u32,
        hours: (ms_of_day / 3_600_000) as u32,
        minutes: (ms_of_day / 60_000 % 60) as u32,
        seconds: (ms_of_day / 1_000 % 60) as u32,
        millis: (ms_of_day % 1_000) as u32,
    }
}

/// Days-since-epoch to proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if month <= 2 { year + 1 } else { year }, month, day)
}

fn iso_string(ms: f64) -> String {
    let parts = date_parts(ms);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        parts.year, parts.month, parts.day, parts.hours, parts.minutes, parts.seconds,
        parts.millis
    )
}

fn date_method(ms: f64, method: &str, _args: &[Value]) -> Result<Value, EvalError> {
    let parts = date_parts(ms);
    match method {
        "getTime" => Ok(Value::Num(ms)),
        "getFullYear" => Ok(Value::Num(parts.year as f64)),
        // Zero-based, as the hosting renderer's Date exposes it.
        "getMonth" => Ok(Value::Num((parts.month - 1) as f64)),
        "getDate" => Ok(Value::Num(parts.day as f64)),
        "getDay" => Ok(Value::Num(parts.weekday as f64)),
        "getHours" => Ok(Value::Num(parts.hours as f64)),
        "getMinutes" => Ok(Value::Num(parts.minutes as f64)),
        "getSeconds" => Ok(Value::Num(parts.seconds as f64)),
        "toISOString" => Ok(Value::Str(iso_string(ms))),
        _ => Err(EvalError::Internal(format!(
            "unimplemented date method '{}'",
            method
        ))),
    }
}
