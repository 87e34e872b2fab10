//! Lowering of analysis-passed documents into compiled programs.
//!
//! Three responsibilities: materialize defaults the document omitted (state
//! initial values, component parameter defaults, untaken else branches),
//! normalize scope-resolved references into their direct addressable form,
//! and discard validation-only metadata (numeric constraints, declared
//! parameter types). This pass performs no validation of its own: the
//! analyzer already proved resolution sound, and a failure here would be a
//! pipeline defect, not a user error.

use crate::document::{
    ActionStep, ComponentDef, Document, Expression, StateField, ViewNode,
};
use crate::program::{
    CompiledAction, CompiledComponent, CompiledExpr, CompiledNode, CompiledStateField,
    CompiledStep, Program, ScopeKind,
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Lower an analysis-passed document into its compiled program.
pub fn lower(doc: Document) -> Program {
    let components_src = doc.components;

    let state = doc
        .state
        .into_iter()
        .map(|(name, field)| (name, lower_state_field(field)))
        .collect();

    let actions: BTreeMap<String, CompiledAction> = doc
        .actions
        .into_iter()
        .map(|action| {
            let steps = action.steps.into_iter().map(lower_step).collect();
            (
                action.name,
                CompiledAction {
                    steps,
                    debounce: action.debounce,
                },
            )
        })
        .collect();

    let components: BTreeMap<String, CompiledComponent> = components_src
        .iter()
        .map(|(name, component)| {
            (
                name.clone(),
                CompiledComponent {
                    params: component.params.iter().map(|p| p.name.clone()).collect(),
                    view: lower_node(&component.view, &components_src),
                },
            )
        })
        .collect();

    let view = lower_node(&doc.view, &components_src);

    debug!(
        components = components.len(),
        actions = actions.len(),
        "lowering finished"
    );

    Program {
        version: doc.version,
        state,
        actions,
        components,
        view,
        styles: doc.styles,
    }
}

fn lower_state_field(field: StateField) -> CompiledStateField {
    let initial = match field {
        StateField::Number { initial, .. } => {
            initial.map_or_else(|| Value::from(0.0), Value::from)
        }
        StateField::String { initial } => {
            Value::String(initial.unwrap_or_default())
        }
        StateField::Boolean { initial } => Value::Bool(initial.unwrap_or(false)),
        StateField::List { initial, .. } => {
            Value::Array(initial.unwrap_or_default())
        }
        StateField::Object { initial } => {
            Value::Object(initial.unwrap_or_default())
        }
    };
    CompiledStateField { initial }
}

fn lower_step(step: ActionStep) -> CompiledStep {
    match step {
        ActionStep::Assign { target, value } => CompiledStep::Assign {
            target,
            value: lower_expr(&value),
        },
        ActionStep::Update { target, op, value } => CompiledStep::Update {
            target,
            op,
            value: value.map(|v| lower_expr(&v)),
        },
        ActionStep::Fetch { url, method, body } => CompiledStep::Fetch {
            url: lower_expr(&url),
            method,
            body: body.map(|b| lower_expr(&b)),
        },
    }
}

fn lower_expr(expr: &Expression) -> CompiledExpr {
    match expr {
        Expression::Literal { value } => CompiledExpr::Literal {
            value: value.clone(),
        },
        Expression::State { name } => CompiledExpr::Load {
            scope: ScopeKind::State,
            name: name.clone(),
        },
        Expression::Var { name } => CompiledExpr::Load {
            scope: ScopeKind::Local,
            name: name.clone(),
        },
        Expression::Param { name } => CompiledExpr::Load {
            scope: ScopeKind::Param,
            name: name.clone(),
        },
        Expression::Binary { op, left, right } => CompiledExpr::Binary {
            op: *op,
            left: Box::new(lower_expr(left)),
            right: Box::new(lower_expr(right)),
        },
        Expression::Not { operand } => CompiledExpr::Not {
            operand: Box::new(lower_expr(operand)),
        },
        Expression::Cond {
            if_expr,
            then_expr,
            else_expr,
        } => CompiledExpr::Cond {
            if_expr: Box::new(lower_expr(if_expr)),
            then_expr: Box::new(lower_expr(then_expr)),
            else_expr: Box::new(lower_expr(else_expr)),
        },
        Expression::Member {
            target,
            property,
            args,
        } => CompiledExpr::Member {
            target: Box::new(lower_expr(target)),
            property: property.clone(),
            args: args
                .as_ref()
                .map(|list| list.iter().map(lower_expr).collect()),
        },
    }
}

fn lower_node(node: &ViewNode, components: &BTreeMap<String, ComponentDef>) -> CompiledNode {
    match node {
        ViewNode::Element {
            tag,
            props,
            events,
            children,
        } => CompiledNode::Element {
            tag: tag.clone(),
            props: lower_prop_map(props),
            events: events.clone(),
            children: lower_children(children, components),
        },
        ViewNode::Text { value } => CompiledNode::Text {
            value: lower_expr(value),
        },
        ViewNode::If {
            condition,
            then_branch,
            else_branch,
        } => CompiledNode::If {
            condition: lower_expr(condition),
            then_branch: lower_children(then_branch, components),
            else_branch: lower_children(else_branch, components),
        },
        ViewNode::For {
            items,
            item,
            index,
            key,
            body,
        } => CompiledNode::For {
            items: lower_expr(items),
            item: item.clone(),
            index: index.clone(),
            key: key.as_ref().map(lower_expr),
            body: lower_children(body, components),
        },
        ViewNode::Component {
            name,
            props,
            children,
        } => {
            let mut lowered = lower_prop_map(props);
            // Materialize declared defaults for omitted props, so the
            // renderer never consults the component definition for them.
            if let Some(component) = components.get(name) {
                for param in &component.params {
                    if !lowered.contains_key(&param.name) {
                        if let Some(default) = &param.default {
                            lowered.insert(param.name.clone(), lower_expr(default));
                        }
                    }
                }
            }
            CompiledNode::Component {
                name: name.clone(),
                props: lowered,
                children: lower_children(children, components),
            }
        }
        ViewNode::Slot { name } => CompiledNode::Slot { name: name.clone() },
    }
}

fn lower_prop_map(props: &BTreeMap<String, Expression>) -> BTreeMap<String, CompiledExpr> {
    props
        .iter()
        .map(|(name, expr)| (name.clone(), lower_expr(expr)))
        .collect()
}

fn lower_children(
    children: &[ViewNode],
    components: &BTreeMap<String, ComponentDef>,
) -> Vec<CompiledNode> {
    children
        .iter()
        .map(|child| lower_node(child, components))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lowered(raw: serde_json::Value) -> Program {
        let doc: Document = serde_json::from_value(raw).unwrap();
        lower(doc)
    }

    #[test]
    fn state_initials_materialized() {
        let program = lowered(json!({
            "version": "1.1",
            "state": {
                "count": { "type": "number" },
                "label": { "type": "string" },
                "open":  { "type": "boolean" },
                "rows":  { "type": "list", "maxLength": 5 },
                "meta":  { "type": "object" }
            },
            "view": { "type": "element", "tag": "div" }
        }));

        assert_eq!(program.state["count"].initial, json!(0.0));
        assert_eq!(program.state["label"].initial, json!(""));
        assert_eq!(program.state["open"].initial, json!(false));
        assert_eq!(program.state["rows"].initial, json!([]));
        assert_eq!(program.state["meta"].initial, json!({}));
    }

    #[test]
    fn references_get_scope_baked_in() {
        let program = lowered(json!({
            "version": "1.1",
            "state": { "items": { "type": "list", "initial": [] } },
            "view": { "type": "for",
                      "items": { "type": "state", "name": "items" },
                      "item": "it",
                      "body": [
                          { "type": "text", "value": { "type": "var", "name": "it" } }
                      ] }
        }));

        match &program.view {
            CompiledNode::For { items, body, .. } => {
                assert_eq!(
                    *items,
                    CompiledExpr::Load {
                        scope: ScopeKind::State,
                        name: "items".into()
                    }
                );
                match &body[0] {
                    CompiledNode::Text { value } => assert_eq!(
                        *value,
                        CompiledExpr::Load {
                            scope: ScopeKind::Local,
                            name: "it".into()
                        }
                    ),
                    other => panic!("unexpected node: {:?}", other),
                }
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn param_defaults_merged_at_instantiation() {
        let program = lowered(json!({
            "version": "1.1",
            "components": {
                "Card": {
                    "params": [
                        { "name": "title", "type": "string",
                          "default": { "type": "literal", "value": "Untitled" } },
                        { "name": "tone", "type": "string", "optional": true }
                    ],
                    "view": { "type": "text",
                              "value": { "type": "param", "name": "title" } }
                }
            },
            "view": { "type": "component", "name": "Card" }
        }));

        match &program.view {
            CompiledNode::Component { props, .. } => {
                assert_eq!(
                    props["title"],
                    CompiledExpr::Literal {
                        value: json!("Untitled")
                    }
                );
                // No default declared for `tone`; nothing to materialize.
                assert!(!props.contains_key("tone"));
            }
            other => panic!("unexpected node: {:?}", other),
        }

        // Declared types and defaults are stripped from the component.
        assert_eq!(program.components["Card"].params, vec!["title", "tone"]);
    }

    #[test]
    fn supplied_prop_wins_over_default() {
        let program = lowered(json!({
            "version": "1.1",
            "components": {
                "Card": {
                    "params": [
                        { "name": "title", "type": "string",
                          "default": { "type": "literal", "value": "Untitled" } }
                    ],
                    "view": { "type": "text",
                              "value": { "type": "param", "name": "title" } }
                }
            },
            "view": { "type": "component", "name": "Card",
                      "props": { "title": { "type": "literal", "value": "Inbox" } } }
        }));

        match &program.view {
            CompiledNode::Component { props, .. } => {
                assert_eq!(
                    props["title"],
                    CompiledExpr::Literal {
                        value: json!("Inbox")
                    }
                );
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn actions_become_a_name_keyed_map() {
        let program = lowered(json!({
            "version": "1.1",
            "state": { "count": { "type": "number", "initial": 0 } },
            "actions": [ { "name": "increment", "debounce": 150, "steps": [
                { "type": "update", "target": "count", "op": "add",
                  "value": { "type": "literal", "value": 1 } }
            ] } ],
            "view": { "type": "element", "tag": "div" }
        }));

        let action = &program.actions["increment"];
        assert_eq!(action.debounce, Some(150.0));
        assert_eq!(action.steps.len(), 1);
        match &action.steps[0] {
            CompiledStep::Update { target, value, .. } => {
                assert_eq!(target, "count");
                assert!(value.is_some());
            }
            other => panic!("unexpected step: {:?}", other),
        }
    }
}
