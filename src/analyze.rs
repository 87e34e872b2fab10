//! Semantic analysis of structurally valid documents.
//!
//! Resolves every symbolic reference against its enclosing scope, flags
//! duplicate action names, validates component composition, detects
//! component inclusion cycles, and checks the declared format version.
//! Like the schema pass, every violation is accumulated; analysis never
//! stops at the first error. Invariants proven here are trusted by the
//! transformer and the evaluator and are not re-checked downstream.

use crate::document::{
    ActionStep, ComponentDef, Document, Expression, ParamDecl, ViewNode, SUPPORTED_VERSIONS,
};
use crate::validate::{
    CompileError, DocPath, COMPONENT_CYCLE, COMPONENT_NOT_FOUND, COMPONENT_PROP_MISSING,
    COMPONENT_PROP_TYPE, DUPLICATE_ACTION, PARAM_UNDEFINED, UNDEFINED_ACTION, UNDEFINED_STATE,
    UNSUPPORTED_VERSION, VAR_UNDEFINED,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};

/// Analyze a document that already passed schema validation.
/// Returns every semantic violation found.
///
/// `ambient_locals` are names the host promises to bind at evaluation time
/// (route parameters, adapter lookups); they resolve like outermost loop
/// bindings.
pub fn analyze<'d>(doc: &'d Document, ambient_locals: &'d [String]) -> Vec<CompileError> {
    let mut analyzer = Analyzer {
        doc,
        ambient_locals,
        action_names: HashSet::new(),
        errors: Vec::new(),
        path: DocPath::root(),
    };

    analyzer.check_version();
    analyzer.collect_actions();
    analyzer.check_actions();
    analyzer.check_components();
    analyzer.check_root_view();
    analyzer.check_component_cycles();

    debug!(errors = analyzer.errors.len(), "semantic analysis finished");
    analyzer.errors
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCOPE STACK
// ═══════════════════════════════════════════════════════════════════════════════

/// One `for` node's bindings: the item variable and the optional index.
struct LoopFrame<'d> {
    item: &'d str,
    index: Option<&'d str>,
}

/// Layered name bindings used during reference resolution. Global state is
/// read from the document directly; this tracks the lexical part: the
/// enclosing component's parameters and the stack of loop frames, innermost
/// last so inner bindings shadow outer ones.
struct Scope<'d> {
    params: Option<&'d [ParamDecl]>,
    loops: Vec<LoopFrame<'d>>,
    /// Host-declared ambient names, resolved after every loop frame.
    ambient: &'d [String],
}

impl<'d> Scope<'d> {
    fn root(ambient: &'d [String]) -> Self {
        Scope {
            params: None,
            loops: Vec::new(),
            ambient,
        }
    }

    fn component(params: &'d [ParamDecl], ambient: &'d [String]) -> Self {
        Scope {
            params: Some(params),
            loops: Vec::new(),
            ambient,
        }
    }

    fn resolves_var(&self, name: &str) -> bool {
        self.loops
            .iter()
            .rev()
            .any(|frame| frame.item == name || frame.index == Some(name))
            || self.ambient.iter().any(|ambient| ambient == name)
    }

    fn resolves_param(&self, name: &str) -> bool {
        self.params
            .map_or(false, |params| params.iter().any(|p| p.name == name))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ANALYZER
// ═══════════════════════════════════════════════════════════════════════════════

struct Analyzer<'d> {
    doc: &'d Document,
    ambient_locals: &'d [String],
    /// First-occurrence action names; later duplicates are flagged.
    action_names: HashSet<&'d str>,
    errors: Vec<CompileError>,
    path: DocPath,
}

impl<'d> Analyzer<'d> {
    fn error(&mut self, code: &str, message: impl Into<String>) {
        self.errors.push(CompileError::new(code, message, &self.path));
    }

    // ── Version ──────────────────────────────────────────────────────────────

    /// Checked independently of everything else.
    fn check_version(&mut self) {
        if !SUPPORTED_VERSIONS.contains(&self.doc.version.as_str()) {
            self.path.push_key("version");
            self.error(
                UNSUPPORTED_VERSION,
                format!(
                    "unsupported document version '{}' (supported: {})",
                    self.doc.version,
                    SUPPORTED_VERSIONS.join(", ")
                ),
            );
            self.path.pop();
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────────

    fn collect_actions(&mut self) {
        let mut duplicates = Vec::new();
        for (i, action) in self.doc.actions.iter().enumerate() {
            if !self.action_names.insert(action.name.as_str()) {
                duplicates.push((i, action.name.clone()));
            }
        }
        for (i, name) in duplicates {
            self.path.push_key("actions");
            self.path.push_index(i);
            self.path.push_key("name");
            self.error(
                DUPLICATE_ACTION,
                format!("duplicate action name '{}'", name),
            );
            self.path.pop();
            self.path.pop();
            self.path.pop();
        }
    }

    fn check_actions(&mut self) {
        self.path.push_key("actions");
        for (i, action) in self.doc.actions.iter().enumerate() {
            self.path.push_index(i);
            self.path.push_key("steps");
            for (j, step) in action.steps.iter().enumerate() {
                self.path.push_index(j);
                self.check_action_step(step);
                self.path.pop();
            }
            self.path.pop();
            self.path.pop();
        }
        self.path.pop();
    }

    /// Action expressions run outside any view, so only global state is in
    /// scope for them.
    fn check_action_step(&mut self, step: &'d ActionStep) {
        let scope = Scope::root(self.ambient_locals);
        match step {
            ActionStep::Assign { target, value } => {
                self.check_state_target(target);
                self.path.push_key("value");
                self.check_expression(value, &scope);
                self.path.pop();
            }
            ActionStep::Update { target, value, .. } => {
                self.check_state_target(target);
                if let Some(value) = value {
                    self.path.push_key("value");
                    self.check_expression(value, &scope);
                    self.path.pop();
                }
            }
            ActionStep::Fetch { url, body, .. } => {
                self.path.push_key("url");
                self.check_expression(url, &scope);
                self.path.pop();
                if let Some(body) = body {
                    self.path.push_key("body");
                    self.check_expression(body, &scope);
                    self.path.pop();
                }
            }
        }
    }

    fn check_state_target(&mut self, target: &str) {
        if !self.doc.state.contains_key(target) {
            self.path.push_key("target");
            self.error(
                UNDEFINED_STATE,
                format!("unknown state field '{}'", target),
            );
            self.path.pop();
        }
    }

    // ── Expressions ──────────────────────────────────────────────────────────

    fn check_expression(&mut self, expr: &'d Expression, scope: &Scope<'d>) {
        match expr {
            Expression::Literal { .. } => {}
            Expression::State { name } => {
                if !self.doc.state.contains_key(name) {
                    trace!(name = name.as_str(), "unresolved state reference");
                    self.error(UNDEFINED_STATE, format!("unknown state field '{}'", name));
                }
            }
            Expression::Var { name } => {
                if !scope.resolves_var(name) {
                    self.error(
                        VAR_UNDEFINED,
                        format!("unknown loop variable '{}'", name),
                    );
                }
            }
            Expression::Param { name } => {
                if !scope.resolves_param(name) {
                    self.error(
                        PARAM_UNDEFINED,
                        format!("unknown component parameter '{}'", name),
                    );
                }
            }
            Expression::Binary { left, right, .. } => {
                self.path.push_key("left");
                self.check_expression(left, scope);
                self.path.pop();
                self.path.push_key("right");
                self.check_expression(right, scope);
                self.path.pop();
            }
            Expression::Not { operand } => {
                self.path.push_key("operand");
                self.check_expression(operand, scope);
                self.path.pop();
            }
            Expression::Cond {
                if_expr,
                then_expr,
                else_expr,
            } => {
                self.path.push_key("if");
                self.check_expression(if_expr, scope);
                self.path.pop();
                self.path.push_key("then");
                self.check_expression(then_expr, scope);
                self.path.pop();
                self.path.push_key("else");
                self.check_expression(else_expr, scope);
                self.path.pop();
            }
            Expression::Member { target, args, .. } => {
                self.path.push_key("target");
                self.check_expression(target, scope);
                self.path.pop();
                if let Some(args) = args {
                    self.path.push_key("args");
                    for (i, arg) in args.iter().enumerate() {
                        self.path.push_index(i);
                        self.check_expression(arg, scope);
                        self.path.pop();
                    }
                    self.path.pop();
                }
            }
        }
    }

    // ── View tree ────────────────────────────────────────────────────────────

    fn check_root_view(&mut self) {
        self.path.push_key("view");
        let mut scope = Scope::root(self.ambient_locals);
        self.check_view_node(&self.doc.view, &mut scope);
        self.path.pop();
    }

    fn check_components(&mut self) {
        self.path.push_key("components");
        for (name, component) in &self.doc.components {
            self.path.push_key(name);
            self.check_component_def(component);
            self.path.pop();
        }
        self.path.pop();
    }

    fn check_component_def(&mut self, component: &'d ComponentDef) {
        // Param defaults may read global state but not other params or loop
        // variables.
        self.path.push_key("params");
        for (i, param) in component.params.iter().enumerate() {
            if let Some(default) = &param.default {
                self.path.push_index(i);
                self.path.push_key("default");
                self.check_expression(default, &Scope::root(self.ambient_locals));
                self.path.pop();
                self.path.pop();
            }
        }
        self.path.pop();

        self.path.push_key("view");
        let mut scope = Scope::component(&component.params, self.ambient_locals);
        self.check_view_node(&component.view, &mut scope);
        self.path.pop();
    }

    fn check_view_node(&mut self, node: &'d ViewNode, scope: &mut Scope<'d>) {
        match node {
            ViewNode::Element {
                props,
                events,
                children,
                ..
            } => {
                self.check_prop_exprs(props, scope);
                self.path.push_key("events");
                for (event, action) in events {
                    if !self.action_names.contains(action.as_str()) {
                        self.path.push_key(event);
                        self.error(
                            UNDEFINED_ACTION,
                            format!("unknown action '{}' bound to '{}'", action, event),
                        );
                        self.path.pop();
                    }
                }
                self.path.pop();
                self.check_children(children, "children", scope);
            }
            ViewNode::Text { value } => {
                self.path.push_key("value");
                self.check_expression(value, scope);
                self.path.pop();
            }
            ViewNode::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.path.push_key("condition");
                self.check_expression(condition, scope);
                self.path.pop();
                self.check_children(then_branch, "then", scope);
                self.check_children(else_branch, "else", scope);
            }
            ViewNode::For {
                items,
                item,
                index,
                key,
                body,
            } => {
                // The items source is evaluated in the outer scope; the key
                // expression and body see the loop bindings.
                self.path.push_key("items");
                self.check_expression(items, scope);
                self.path.pop();

                scope.loops.push(LoopFrame {
                    item,
                    index: index.as_deref(),
                });
                if let Some(key) = key {
                    self.path.push_key("key");
                    self.check_expression(key, scope);
                    self.path.pop();
                }
                self.check_children(body, "body", scope);
                scope.loops.pop();
            }
            ViewNode::Component {
                name,
                props,
                children,
            } => {
                self.check_instantiation(name, props, scope);
                // Slotted children keep the instantiating scope, not the
                // component's own.
                self.check_children(children, "children", scope);
            }
            ViewNode::Slot { .. } => {}
        }
    }

    fn check_children(
        &mut self,
        children: &'d [ViewNode],
        key: &str,
        scope: &mut Scope<'d>,
    ) {
        self.path.push_key(key);
        for (i, child) in children.iter().enumerate() {
            self.path.push_index(i);
            self.check_view_node(child, scope);
            self.path.pop();
        }
        self.path.pop();
    }

    fn check_prop_exprs(
        &mut self,
        props: &'d BTreeMap<String, Expression>,
        scope: &Scope<'d>,
    ) {
        self.path.push_key("props");
        for (name, expr) in props {
            self.path.push_key(name);
            self.check_expression(expr, scope);
            self.path.pop();
        }
        self.path.pop();
    }

    // ── Component instantiation ──────────────────────────────────────────────

    fn check_instantiation(
        &mut self,
        name: &str,
        props: &'d BTreeMap<String, Expression>,
        scope: &Scope<'d>,
    ) {
        self.check_prop_exprs(props, scope);

        let component = match self.doc.components.get(name) {
            Some(c) => c,
            None => {
                self.error(
                    COMPONENT_NOT_FOUND,
                    format!("unknown component '{}'", name),
                );
                return;
            }
        };

        for param in &component.params {
            match props.get(&param.name) {
                None if param.is_required() => {
                    self.error(
                        COMPONENT_PROP_MISSING,
                        format!(
                            "component '{}' requires parameter '{}'",
                            name, param.name
                        ),
                    );
                }
                Some(expr) => self.check_prop_type(name, param, expr),
                None => {}
            }
        }
    }

    /// Static-only prop type checking: literals and state references have a
    /// statically known kind; anything computed defers to runtime.
    fn check_prop_type(&mut self, component: &str, param: &ParamDecl, expr: &Expression) {
        let mismatch = match expr {
            Expression::Literal { value } => {
                param.param_type.accepts_literal(value) == Some(false)
            }
            Expression::State { name } => self
                .doc
                .state
                .get(name)
                .map_or(false, |field| !param.param_type.accepts(field.field_type())),
            _ => false,
        };

        if mismatch {
            self.path.push_key("props");
            self.path.push_key(&param.name);
            self.error(
                COMPONENT_PROP_TYPE,
                format!(
                    "parameter '{}' of component '{}' expects {}",
                    param.name,
                    component,
                    param.param_type.name()
                ),
            );
            self.path.pop();
            self.path.pop();
        }
    }

    // ── Component cycles ─────────────────────────────────────────────────────

    /// Depth-first traversal of the component-reference graph with an
    /// explicit recursion stack, so the full cycle path can be reported and
    /// pathological nesting cannot exhaust the native stack.
    fn check_component_cycles(&mut self) {
        let edges: BTreeMap<&str, Vec<&str>> = self
            .doc
            .components
            .iter()
            .map(|(name, component)| {
                let mut refs = Vec::new();
                collect_component_refs(&component.view, &mut refs);
                (name.as_str(), refs)
            })
            .collect();

        let mut visited: HashSet<&str> = HashSet::new();

        for &root in edges.keys() {
            if visited.contains(root) {
                continue;
            }

            // Frame: (node, index of the next edge to follow).
            let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
            let mut on_stack: HashSet<&str> = HashSet::new();
            on_stack.insert(root);

            while let Some((node, edge_idx)) = stack.pop() {
                let neighbors = &edges[node];
                if edge_idx >= neighbors.len() {
                    on_stack.remove(node);
                    visited.insert(node);
                    continue;
                }
                stack.push((node, edge_idx + 1));

                let next = neighbors[edge_idx];
                if !edges.contains_key(next) {
                    // Unknown component; already reported at the usage site.
                    continue;
                }
                if on_stack.contains(next) {
                    let start = stack
                        .iter()
                        .position(|(n, _)| *n == next)
                        .expect("cycle entry is on the stack");
                    let mut cycle: Vec<&str> =
                        stack[start..].iter().map(|(n, _)| *n).collect();
                    cycle.push(next);
                    self.report_cycle(&cycle);
                    continue;
                }
                if !visited.contains(next) {
                    on_stack.insert(next);
                    stack.push((next, 0));
                }
            }
        }
    }

    fn report_cycle(&mut self, cycle: &[&str]) {
        self.path.push_key("components");
        self.path.push_key(cycle[0]);
        self.error(
            COMPONENT_CYCLE,
            format!("circular component inclusion: {}", cycle.join(" -> ")),
        );
        self.path.pop();
        self.path.pop();
    }
}

/// Collect the names of all components instantiated anywhere in a view
/// subtree, in document order.
fn collect_component_refs<'d>(node: &'d ViewNode, refs: &mut Vec<&'d str>) {
    match node {
        ViewNode::Element { children, .. } => {
            for child in children {
                collect_component_refs(child, refs);
            }
        }
        ViewNode::If {
            then_branch,
            else_branch,
            ..
        } => {
            for child in then_branch.iter().chain(else_branch) {
                collect_component_refs(child, refs);
            }
        }
        ViewNode::For { body, .. } => {
            for child in body {
                collect_component_refs(child, refs);
            }
        }
        ViewNode::Component { name, children, .. } => {
            refs.push(name);
            for child in children {
                collect_component_refs(child, refs);
            }
        }
        ViewNode::Text { .. } | ViewNode::Slot { .. } => {}
    }
}
