//! End-to-end gates over the whole pipeline: documents go in, diagnostics or
//! compiled programs come out, and evaluation behaves identically for every
//! consumer of the same (program, context) pair.

#[cfg(test)]
mod tests {
    use crate::compile::{compile, CompileOptions};
    use crate::eval::{evaluate, EvalContext, Value};
    use crate::program::{CompiledExpr, CompiledNode, CompiledStep, Program, ScopeKind};
    use crate::validate::PathSegment;
    use crate::document::UpdateOp;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn compile_ok(raw: serde_json::Value) -> Program {
        compile(&raw, &CompileOptions::default()).expect("document should compile")
    }

    /// Seed a host state store from the program's materialized initials.
    fn seed_state(program: &Program) -> BTreeMap<String, Value> {
        program
            .state
            .iter()
            .map(|(name, field)| (name.clone(), Value::from_json(&field.initial)))
            .collect()
    }

    /// A miniature host runtime: apply an action's steps to the state store.
    /// Step dispatch lives outside the evaluator by contract; the evaluator
    /// only computes the step's value expression.
    fn apply_action(program: &Program, name: &str, state: &mut BTreeMap<String, Value>) {
        let action = program.actions.get(name).expect("action exists").clone();
        for step in &action.steps {
            match step {
                CompiledStep::Assign { target, value } => {
                    let next = {
                        let ctx = EvalContext::new(state);
                        evaluate(value, &ctx).expect("assign value evaluates")
                    };
                    state.insert(target.clone(), next);
                }
                CompiledStep::Update { target, op, value } => {
                    let operand = value.as_ref().map(|value| {
                        let ctx = EvalContext::new(state);
                        evaluate(value, &ctx).expect("update value evaluates")
                    });
                    let current = state.get(target).cloned().unwrap_or(Value::Null);
                    let next = match (op, current, operand) {
                        (UpdateOp::Add, Value::Num(n), Some(Value::Num(d))) => Value::Num(n + d),
                        (UpdateOp::Subtract, Value::Num(n), Some(Value::Num(d))) => {
                            Value::Num(n - d)
                        }
                        (UpdateOp::Toggle, Value::Bool(b), _) => Value::Bool(!b),
                        (UpdateOp::Push, Value::List(mut items), Some(item)) => {
                            items.push(item);
                            Value::List(items)
                        }
                        (op, current, _) => {
                            panic!("unsupported host update {:?} on {:?}", op, current)
                        }
                    };
                    state.insert(target.clone(), next);
                }
                CompiledStep::Fetch { .. } => {
                    // Network dispatch is out of the core's contract.
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // END-TO-END SCENARIOS
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn counter_round_trip() {
        let program = compile_ok(json!({
            "version": "1.1",
            "state": { "count": { "type": "number", "initial": 0 } },
            "actions": [ { "name": "increment", "steps": [
                { "type": "update", "target": "count", "op": "add",
                  "value": { "type": "literal", "value": 1 } }
            ] } ],
            "view": { "type": "element", "tag": "button",
                      "events": { "click": "increment" },
                      "children": [
                          { "type": "text", "value": { "type": "state", "name": "count" } }
                      ] }
        }));

        let mut state = seed_state(&program);

        let count_expr = CompiledExpr::Load {
            scope: ScopeKind::State,
            name: "count".into(),
        };

        {
            let ctx = EvalContext::new(&state);
            assert_eq!(evaluate(&count_expr, &ctx), Ok(Value::Num(0.0)));
        }

        apply_action(&program, "increment", &mut state);

        let ctx = EvalContext::new(&state);
        assert_eq!(evaluate(&count_expr, &ctx), Ok(Value::Num(1.0)));
    }

    #[test]
    fn missing_required_prop_names_component_and_param() {
        let errors = compile(
            &json!({
                "version": "1.1",
                "components": {
                    "Card": {
                        "params": [ { "name": "title", "type": "string" } ],
                        "view": { "type": "text",
                                  "value": { "type": "param", "name": "title" } }
                    }
                },
                "view": { "type": "component", "name": "Card" }
            }),
            &CompileOptions::default(),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "COMPONENT_PROP_MISSING");
        assert!(errors[0].message.contains("Card"));
        assert!(errors[0].message.contains("title"));
    }

    #[test]
    fn component_cycle_reports_rotation_from_first_visited() {
        let errors = compile(
            &json!({
                "version": "1.1",
                "components": {
                    "A": { "view": { "type": "component", "name": "B" } },
                    "B": { "view": { "type": "component", "name": "A" } }
                },
                "view": { "type": "element", "tag": "div" }
            }),
            &CompileOptions::default(),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "COMPONENT_CYCLE");
        assert!(errors[0].message.contains("A -> B -> A"));
    }

    #[test]
    fn unresolvable_reference_paths_point_at_the_referencing_node() {
        let errors = compile(
            &json!({
                "version": "1.1",
                "state": { "rows": { "type": "list", "initial": [] } },
                "view": { "type": "for",
                          "items": { "type": "state", "name": "rows" },
                          "item": "row",
                          "body": [
                              { "type": "text",
                                "value": { "type": "binary", "op": "+",
                                           "left": { "type": "var", "name": "row" },
                                           "right": { "type": "var", "name": "col" } } }
                          ] }
            }),
            &CompileOptions::default(),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "VAR_UNDEFINED");
        assert_eq!(
            errors[0].path,
            vec![
                PathSegment::Key("view".into()),
                PathSegment::Key("body".into()),
                PathSegment::Index(0),
                PathSegment::Key("value".into()),
                PathSegment::Key("right".into()),
            ]
        );
    }

    #[test]
    fn full_document_compiles_and_evaluates() {
        let program = compile_ok(json!({
            "version": "1.0",
            "state": {
                "todos": { "type": "list",
                           "initial": [ { "title": "write docs", "done": false } ] },
                "filter": { "type": "string", "initial": "all" }
            },
            "actions": [
                { "name": "clearFilter", "steps": [
                    { "type": "assign", "target": "filter",
                      "value": { "type": "literal", "value": "all" } }
                ] },
                { "name": "load", "steps": [
                    { "type": "fetch", "method": "GET",
                      "url": { "type": "literal", "value": "/api/todos" } }
                ] }
            ],
            "components": {
                "Badge": {
                    "params": [
                        { "name": "text", "type": "string" },
                        { "name": "tone", "type": "string",
                          "default": { "type": "literal", "value": "neutral" } }
                    ],
                    "view": { "type": "element", "tag": "span",
                              "props": { "class": { "type": "param", "name": "tone" } },
                              "children": [
                                  { "type": "text",
                                    "value": { "type": "param", "name": "text" } },
                                  { "type": "slot" }
                              ] }
                }
            },
            "view": {
                "type": "element", "tag": "main",
                "children": [
                    { "type": "if",
                      "condition": { "type": "binary", "op": "==",
                                     "left": { "type": "state", "name": "filter" },
                                     "right": { "type": "literal", "value": "all" } },
                      "then": [
                          { "type": "for",
                            "items": { "type": "state", "name": "todos" },
                            "item": "todo", "index": "i",
                            "key": { "type": "member",
                                     "target": { "type": "var", "name": "todo" },
                                     "property": "title" },
                            "body": [
                                { "type": "component", "name": "Badge",
                                  "props": { "text": {
                                      "type": "member",
                                      "target": { "type": "var", "name": "todo" },
                                      "property": "title" } } }
                            ] }
                      ] }
                ]
            },
            "styles": { "card": { "padding": "1rem" } }
        }));

        // Defaults for the omitted `tone` prop were materialized.
        let badge_instance = match &program.view {
            CompiledNode::Element { children, .. } => match &children[0] {
                CompiledNode::If { then_branch, .. } => match &then_branch[0] {
                    CompiledNode::For { body, .. } => &body[0],
                    other => panic!("unexpected node: {:?}", other),
                },
                other => panic!("unexpected node: {:?}", other),
            },
            other => panic!("unexpected node: {:?}", other),
        };
        match badge_instance {
            CompiledNode::Component { name, props, .. } => {
                assert_eq!(name, "Badge");
                assert!(props.contains_key("tone"));
                assert!(props.contains_key("text"));
            }
            other => panic!("unexpected node: {:?}", other),
        }

        assert_eq!(program.styles["card"]["padding"], "1rem");

        // Evaluate the loop key expression the way a renderer would.
        let state = seed_state(&program);
        let mut ctx = EvalContext::new(&state);
        let todo = match &state["todos"] {
            Value::List(items) => items[0].clone(),
            other => panic!("unexpected state value: {:?}", other),
        };
        ctx.locals.insert("todo".into(), todo);
        ctx.locals.insert("i".into(), Value::Num(0.0));

        let key = CompiledExpr::Member {
            target: Box::new(CompiledExpr::Load {
                scope: ScopeKind::Local,
                name: "todo".into(),
            }),
            property: "title".into(),
            args: None,
        };
        assert_eq!(evaluate(&key, &ctx), Ok(Value::Str("write docs".into())));
    }

    #[test]
    fn identical_programs_evaluate_identically() {
        let raw = json!({
            "version": "1.1",
            "state": { "greeting": { "type": "string", "initial": "hello" } },
            "view": { "type": "text",
                      "value": { "type": "member",
                                 "target": { "type": "state", "name": "greeting" },
                                 "property": "toUpperCase",
                                 "args": [] } }
        });

        let first = compile_ok(raw.clone());
        let second = compile_ok(raw);
        assert_eq!(first, second);

        let value_expr = match (&first.view, &second.view) {
            (CompiledNode::Text { value: a }, CompiledNode::Text { value: b }) => {
                assert_eq!(a, b);
                a.clone()
            }
            other => panic!("unexpected views: {:?}", other),
        };

        let state = seed_state(&first);
        let ctx = EvalContext::new(&state);
        assert_eq!(
            evaluate(&value_expr, &ctx),
            Ok(Value::Str("HELLO".into()))
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PROPERTIES
    // ═══════════════════════════════════════════════════════════════════════════

    mod properties {
        use super::*;
        use crate::document::BinaryOp;
        use proptest::prelude::*;

        fn arb_expr() -> impl Strategy<Value = CompiledExpr> {
            let leaf = prop_oneof![
                (-1000i64..1000).prop_map(|n| CompiledExpr::Literal { value: json!(n) }),
                "[a-z]{0,6}".prop_map(|s| CompiledExpr::Literal { value: json!(s) }),
                proptest::bool::ANY.prop_map(|b| CompiledExpr::Literal { value: json!(b) }),
            ];
            leaf.prop_recursive(4, 24, 2, |inner| {
                (
                    prop_oneof![
                        Just(BinaryOp::Add),
                        Just(BinaryOp::Sub),
                        Just(BinaryOp::Mul),
                        Just(BinaryOp::Lt),
                        Just(BinaryOp::Eq),
                        Just(BinaryOp::And),
                        Just(BinaryOp::Or),
                    ],
                    inner.clone(),
                    inner,
                )
                    .prop_map(|(op, left, right)| CompiledExpr::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    })
            })
        }

        proptest! {
            /// The same expression against the same context always produces
            /// the same outcome, success or failure.
            #[test]
            fn evaluation_is_deterministic(expr in arb_expr()) {
                let state = BTreeMap::new();
                let ctx = EvalContext::new(&state);
                prop_assert_eq!(evaluate(&expr, &ctx), evaluate(&expr, &ctx));
            }

            /// A falsy left operand makes the right operand of `&&` fully
            /// opaque, whatever it contains.
            #[test]
            fn short_circuit_opacity(guard in proptest::bool::ANY) {
                let state = BTreeMap::new();
                let ctx = EvalContext::new(&state);
                let expr = CompiledExpr::Binary {
                    op: BinaryOp::And,
                    left: Box::new(CompiledExpr::Literal { value: json!(guard) }),
                    right: Box::new(CompiledExpr::Member {
                        target: Box::new(CompiledExpr::Literal { value: json!({}) }),
                        property: "__proto__".into(),
                        args: None,
                    }),
                };
                let result = evaluate(&expr, &ctx);
                if guard {
                    prop_assert!(result.is_err());
                } else {
                    prop_assert_eq!(result, Ok(Value::Bool(false)));
                }
            }
        }
    }
}
