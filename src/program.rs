//! The compiled program representation.
//!
//! Produced once per compile by the transformer and treated as read-only
//! from then on: no interior mutability anywhere in these types, so a
//! program is safely shareable across any number of concurrent evaluations.
//! References carry the scope kind proven by the analyzer; nothing here
//! retains untyped dynamic JSON except literal values themselves.

use crate::document::{BinaryOp, FetchMethod, UpdateOp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A lowered, reference-resolved Lumen program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub version: String,
    pub state: BTreeMap<String, CompiledStateField>,
    pub actions: BTreeMap<String, CompiledAction>,
    pub components: BTreeMap<String, CompiledComponent>,
    pub view: CompiledNode,
    #[serde(default)]
    pub styles: BTreeMap<String, BTreeMap<String, String>>,
}

/// State after lowering: the initial value is always materialized and the
/// validation-only constraints are gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledStateField {
    pub initial: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledAction {
    pub steps: Vec<CompiledStep>,
    #[serde(default)]
    pub debounce: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CompiledStep {
    Assign {
        target: String,
        value: CompiledExpr,
    },
    Update {
        target: String,
        op: UpdateOp,
        #[serde(default)]
        value: Option<CompiledExpr>,
    },
    Fetch {
        url: CompiledExpr,
        method: FetchMethod,
        #[serde(default)]
        body: Option<CompiledExpr>,
    },
}

/// Which table a lowered reference reads from. Baked in by the transformer
/// after the analyzer proved the name resolves there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    State,
    Local,
    Param,
}

impl ScopeKind {
    pub fn name(self) -> &'static str {
        match self {
            ScopeKind::State => "state",
            ScopeKind::Local => "local",
            ScopeKind::Param => "param",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CompiledExpr {
    Literal {
        value: Value,
    },
    Load {
        scope: ScopeKind,
        name: String,
    },
    Binary {
        op: BinaryOp,
        left: Box<CompiledExpr>,
        right: Box<CompiledExpr>,
    },
    Not {
        operand: Box<CompiledExpr>,
    },
    Cond {
        #[serde(rename = "if")]
        if_expr: Box<CompiledExpr>,
        #[serde(rename = "then")]
        then_expr: Box<CompiledExpr>,
        #[serde(rename = "else")]
        else_expr: Box<CompiledExpr>,
    },
    Member {
        target: Box<CompiledExpr>,
        property: String,
        #[serde(default)]
        args: Option<Vec<CompiledExpr>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CompiledNode {
    Element {
        tag: String,
        props: BTreeMap<String, CompiledExpr>,
        events: BTreeMap<String, String>,
        children: Vec<CompiledNode>,
    },
    Text {
        value: CompiledExpr,
    },
    If {
        condition: CompiledExpr,
        then_branch: Vec<CompiledNode>,
        else_branch: Vec<CompiledNode>,
    },
    For {
        items: CompiledExpr,
        item: String,
        index: Option<String>,
        key: Option<CompiledExpr>,
        body: Vec<CompiledNode>,
    },
    /// Instance props include materialized parameter defaults for anything
    /// the document omitted.
    Component {
        name: String,
        props: BTreeMap<String, CompiledExpr>,
        children: Vec<CompiledNode>,
    },
    Slot {
        name: Option<String>,
    },
}

/// Component after lowering: declared types and defaults are gone (defaults
/// were merged at every instantiation site); the parameter names survive
/// for host introspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledComponent {
    pub params: Vec<String>,
    pub view: CompiledNode,
}
