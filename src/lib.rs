//! # Lumen Compiler Core
//!
//! The native compilation and evaluation core for Lumen documents: JSON
//! definitions of declarative UI programs (state, actions, components, a
//! view tree). This crate is the only place correctness and security of
//! those untrusted documents are enforced; renderers, servers, the router,
//! and editor tooling consume its output and trust its guarantees.
//!
//! ## Pipeline Invariants
//!
//! 1. **Validate before reasoning**: the schema pass walks the raw JSON and
//!    collects every structural violation before any semantic work happens.
//! 2. **Resolve before lowering**: the analyzer proves every symbolic
//!    reference (state, action, loop variable, component parameter,
//!    component name) resolves in its lexical scope, and that the component
//!    graph is acyclic, before the transformer bakes scope kinds into
//!    references.
//! 3. **Exhaustive diagnostics**: both passes accumulate errors; a user sees
//!    every problem at once, each with a stable code and a structured path.
//! 4. **Compiled programs are immutable**: evaluation never mutates the
//!    program, the context's state store, or the capability registry, so one
//!    program may serve any number of concurrent evaluations.
//! 5. **Fail closed**: member and method access inside expressions goes
//!    through the capability registry; denylisted and unknown names produce
//!    a capability violation, never a host-object lookup.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod analyze;
mod capability;
mod compile;
mod document;
mod eval;
mod program;
mod transform;
mod validate;

#[cfg(test)]
mod pipeline_tests;

pub use analyze::analyze;
pub use capability::{CapabilityRegistry, ValueKind};
pub use compile::{compile, CompileOptions, CompileOutcome};
pub use document::{
    ActionDefinition, ActionStep, BinaryOp, ComponentDef, Document, Expression, FetchMethod,
    FieldType, ParamDecl, ParamType, StateField, UpdateOp, ViewNode, SUPPORTED_VERSIONS,
};
pub use eval::{evaluate, EvalContext, EvalError, HostAdapter, Value};
pub use program::{
    CompiledAction, CompiledComponent, CompiledExpr, CompiledNode, CompiledStateField,
    CompiledStep, Program, ScopeKind,
};
pub use transform::lower;
pub use validate::{validate_schema, CompileError, DocPath, PathSegment};
pub use validate::{
    COMPONENT_CYCLE, COMPONENT_NOT_FOUND, COMPONENT_PROP_MISSING, COMPONENT_PROP_TYPE,
    DUPLICATE_ACTION, PARAM_UNDEFINED, SCHEMA_INVALID, UNDEFINED_ACTION, UNDEFINED_STATE,
    UNSUPPORTED_VERSION, VAR_UNDEFINED,
};

// ═══════════════════════════════════════════════════════════════════════════════
// N-API BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

/// JSON-string-in / JSON-string-out compile surface for the Node host.
#[cfg(feature = "napi")]
#[napi]
pub fn compile_document_native(document_json: String) -> String {
    let outcome: CompileOutcome = match serde_json::from_str::<serde_json::Value>(&document_json) {
        Ok(raw) => compile(&raw, &CompileOptions::default()).into(),
        Err(err) => CompileOutcome {
            ok: false,
            program: None,
            errors: vec![CompileError::new(
                SCHEMA_INVALID,
                format!("document is not valid JSON: {}", err),
                &DocPath::root(),
            )],
        },
    };
    serde_json::to_string(&outcome).expect("compile outcome serializes")
}

/// Evaluate a compiled expression against a JSON-encoded context of state,
/// local, param, and route value maps. Returns `{ok, value}` or
/// `{ok: false, error, defect}`.
#[cfg(feature = "napi")]
#[napi]
pub fn evaluate_expression_native(expr_json: String, context_json: String) -> String {
    use std::collections::BTreeMap;

    #[derive(serde::Deserialize, Default)]
    #[serde(default)]
    struct WireContext {
        state: BTreeMap<String, serde_json::Value>,
        locals: BTreeMap<String, serde_json::Value>,
        params: BTreeMap<String, serde_json::Value>,
        route: BTreeMap<String, serde_json::Value>,
    }

    fn failure(message: String, defect: bool) -> String {
        serde_json::to_string(&serde_json::json!({
            "ok": false,
            "error": message,
            "defect": defect,
        }))
        .expect("failure envelope serializes")
    }

    let expr: CompiledExpr = match serde_json::from_str(&expr_json) {
        Ok(expr) => expr,
        Err(err) => return failure(format!("expression is not valid JSON: {}", err), false),
    };
    let wire: WireContext = match serde_json::from_str(&context_json) {
        Ok(ctx) => ctx,
        Err(err) => return failure(format!("context is not valid JSON: {}", err), false),
    };

    let to_values = |map: BTreeMap<String, serde_json::Value>| -> BTreeMap<String, Value> {
        map.iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect()
    };

    let state = to_values(wire.state);
    let route = to_values(wire.route);
    let mut ctx = EvalContext::new(&state);
    ctx.locals = to_values(wire.locals);
    ctx.params = to_values(wire.params);
    ctx.route = Some(&route);

    match evaluate(&expr, &ctx) {
        Ok(value) => serde_json::to_string(&serde_json::json!({
            "ok": true,
            "value": value.to_json(),
        }))
        .expect("success envelope serializes"),
        Err(err) => failure(err.to_string(), err.is_defect()),
    }
}
