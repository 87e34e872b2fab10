//! Typed model of the raw Lumen document.
//!
//! The schema validator walks the untyped `serde_json::Value` first; once it
//! reports no violations the document is deserialized into these types and
//! everything downstream (analyzer, transformer) works on exhaustive tagged
//! variants instead of dynamic JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Document format versions this compiler accepts.
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0", "1.1"];

/// A complete parsed Lumen document, prior to analysis and lowering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    #[serde(default)]
    pub state: BTreeMap<String, StateField>,
    /// Declared as a list so duplicate names are representable; the analyzer
    /// flags them and the transformer builds the name-keyed map.
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentDef>,
    pub view: ViewNode,
    #[serde(default)]
    pub styles: BTreeMap<String, BTreeMap<String, String>>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE FIELDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Declared mutable state. `min`/`max`/`maxLength` are validation-only
/// constraint metadata and do not survive lowering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StateField {
    Number {
        #[serde(default)]
        initial: Option<f64>,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    String {
        #[serde(default)]
        initial: Option<std::string::String>,
    },
    Boolean {
        #[serde(default)]
        initial: Option<bool>,
    },
    List {
        #[serde(default)]
        initial: Option<Vec<Value>>,
        #[serde(default, rename = "maxLength")]
        max_length: Option<u64>,
    },
    Object {
        #[serde(default)]
        initial: Option<serde_json::Map<std::string::String, Value>>,
    },
}

/// The five value kinds a state field (or component parameter) may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Number,
    String,
    Boolean,
    List,
    Object,
}

impl FieldType {
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::List => "list",
            FieldType::Object => "object",
        }
    }
}

impl StateField {
    pub fn field_type(&self) -> FieldType {
        match self {
            StateField::Number { .. } => FieldType::Number,
            StateField::String { .. } => FieldType::String,
            StateField::Boolean { .. } => FieldType::Boolean,
            StateField::List { .. } => FieldType::List,
            StateField::Object { .. } => FieldType::Object,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// The restricted expression language. Immutable tree; no statements, no
/// lambdas, no user-defined functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Expression {
    Literal {
        value: Value,
    },
    /// Reference to a global state field.
    State {
        name: String,
    },
    /// Reference to a loop-local binding (item or index variable).
    Var {
        name: String,
    },
    /// Reference to an enclosing component's parameter.
    Param {
        name: String,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not {
        operand: Box<Expression>,
    },
    Cond {
        #[serde(rename = "if")]
        if_expr: Box<Expression>,
        #[serde(rename = "then")]
        then_expr: Box<Expression>,
        #[serde(rename = "else")]
        else_expr: Box<Expression>,
    },
    /// Property read (`args` absent) or method call (`args` present) on the
    /// target value. Gated by the capability registry at evaluation time.
    Member {
        target: Box<Expression>,
        property: String,
        #[serde(default)]
        args: Option<Vec<Expression>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl BinaryOp {
    /// Logical operators short-circuit: the right operand must not be
    /// evaluated when the left already determines the result.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ACTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// An ordered sequence of steps plus event-binding metadata carried through
/// for the host runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    pub steps: Vec<ActionStep>,
    #[serde(default)]
    pub debounce: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionStep {
    Assign {
        target: String,
        value: Expression,
    },
    Update {
        target: String,
        op: UpdateOp,
        #[serde(default)]
        value: Option<Expression>,
    },
    /// Statically validated only; dispatch belongs to the host runtime.
    Fetch {
        url: Expression,
        method: FetchMethod,
        #[serde(default)]
        body: Option<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateOp {
    Add,
    Subtract,
    Multiply,
    Push,
    RemoveAt,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchMethod {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "PUT")]
    Put,
    #[serde(rename = "PATCH")]
    Patch,
    #[serde(rename = "DELETE")]
    Delete,
}

// ═══════════════════════════════════════════════════════════════════════════════
// VIEW TREE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewNode {
    Element {
        tag: String,
        #[serde(default)]
        props: BTreeMap<String, Expression>,
        /// Event name → action name. Resolved by the analyzer.
        #[serde(default)]
        events: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<ViewNode>,
    },
    Text {
        value: Expression,
    },
    If {
        condition: Expression,
        #[serde(rename = "then")]
        then_branch: Vec<ViewNode>,
        #[serde(rename = "else", default)]
        else_branch: Vec<ViewNode>,
    },
    For {
        items: Expression,
        item: String,
        #[serde(default)]
        index: Option<String>,
        #[serde(default)]
        key: Option<Expression>,
        body: Vec<ViewNode>,
    },
    Component {
        name: String,
        #[serde(default)]
        props: BTreeMap<String, Expression>,
        #[serde(default)]
        children: Vec<ViewNode>,
    },
    Slot {
        #[serde(default)]
        name: Option<String>,
    },
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDef {
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    pub view: ViewNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub optional: bool,
    /// A parameter with a default is implicitly optional.
    #[serde(default)]
    pub default: Option<Expression>,
}

impl ParamDecl {
    pub fn is_required(&self) -> bool {
        !self.optional && self.default.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Number,
    String,
    Boolean,
    List,
    Object,
    Any,
}

impl ParamType {
    pub fn name(self) -> &'static str {
        match self {
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
            ParamType::List => "list",
            ParamType::Object => "object",
            ParamType::Any => "any",
        }
    }

    /// Whether a value of the given declared field type satisfies this
    /// parameter type. Used for the statically determinable prop checks.
    pub fn accepts(self, field: FieldType) -> bool {
        match self {
            ParamType::Any => true,
            ParamType::Number => field == FieldType::Number,
            ParamType::String => field == FieldType::String,
            ParamType::Boolean => field == FieldType::Boolean,
            ParamType::List => field == FieldType::List,
            ParamType::Object => field == FieldType::Object,
        }
    }

    /// Statically classify a literal JSON value against this type.
    /// `None` means "not statically determinable" (e.g. null).
    pub fn accepts_literal(self, value: &Value) -> Option<bool> {
        let field = match value {
            Value::Number(_) => FieldType::Number,
            Value::String(_) => FieldType::String,
            Value::Bool(_) => FieldType::Boolean,
            Value::Array(_) => FieldType::List,
            Value::Object(_) => FieldType::Object,
            Value::Null => return None,
        };
        Some(self.accepts(field))
    }
}
