use super::*;

fn scene() -> MemoryGraph {
    let mut g = MemoryGraph::new();
    let a = g.add_node("a", NodeKind::Other("transform".to_owned()));
    g.add_attribute(&a.plug("x"), Value::DoubleLinear(0.0));
    g.add_attribute(&a.plug("y"), Value::Double(3.0));
    g
}

#[test]
fn created_nodes_get_unique_names_and_defaults() {
    let mut g = MemoryGraph::new();
    let n1 = g.create_node(NodeKind::MultiplyDivide).unwrap();
    let n2 = g.create_node(NodeKind::MultiplyDivide).unwrap();
    assert_eq!(n1.name(), "multiplyDivide1");
    assert_eq!(n2.name(), "multiplyDivide2");
    assert_eq!(
        g.get_attribute(&n1.plug(multiply_divide::OPERATION)).unwrap(),
        Value::Int(multiply_divide::MULTIPLY)
    );
    assert_eq!(
        g.ops()[0],
        GraphOp::CreateNode {
            node: n1,
            kind: NodeKind::MultiplyDivide,
        }
    );
}

#[test]
fn unknown_attributes_are_rejected_but_elements_spawn() {
    let mut g = scene();
    let a = NodeHandle::new("a");
    assert!(matches!(
        g.set_attribute(&a.plug("nope"), Value::Double(1.0)),
        Err(GraphError::UnknownAttribute(_))
    ));
    g.set_attribute(&a.plug("weights[4]"), Value::Double(1.0)).unwrap();
    assert_eq!(g.value(&a.plug("weights[4]")), Some(&Value::Double(1.0)));
}

#[test]
fn numeric_writes_keep_declared_unit() {
    let mut g = scene();
    let x = Plug::new("a", "x");
    g.set_attribute(&x, Value::Double(2.5)).unwrap();
    assert_eq!(g.value(&x), Some(&Value::DoubleLinear(2.5)));
}

#[test]
fn locked_plugs_refuse_writes_until_unlocked() {
    let mut g = scene();
    let x = Plug::new("a", "x");
    let y = Plug::new("a", "y");
    g.lock(&x).unwrap();
    assert!(g.is_locked(&x).unwrap());
    assert!(matches!(
        g.connect(&y, &x, true),
        Err(GraphError::Locked(_))
    ));
    g.set_locked(&x, false).unwrap();
    g.connect(&y, &x, true).unwrap();
    assert_eq!(g.source_of(&x), Some(&y));
}

#[test]
fn connect_without_force_refuses_to_replace() {
    let mut g = scene();
    let b = g.add_node("b", NodeKind::Other("transform".to_owned()));
    g.add_attribute(&b.plug("z"), Value::Double(0.0));
    let x = Plug::new("a", "x");
    g.connect(&Plug::new("a", "y"), &x, false).unwrap();
    assert!(matches!(
        g.connect(&b.plug("z"), &x, false),
        Err(GraphError::AlreadyConnected(_))
    ));
    g.connect(&b.plug("z"), &x, true).unwrap();
    assert_eq!(g.source_of(&x), Some(&b.plug("z")));
}

#[test]
fn incoming_connections_cover_elements() {
    let mut g = scene();
    let e = g.add_node("expression1", NodeKind::Other("expression".to_owned()));
    let input = e.plug("input");
    assert_eq!(g.list_incoming_connections(&input).unwrap(), None);
    g.add_connection(&Plug::new("a", "y"), &e.plug("input[0]"))
        .unwrap();
    assert_eq!(
        g.list_incoming_connections(&input).unwrap(),
        Some(vec![Plug::new("a", "y")])
    );
}

#[test]
fn delete_node_drops_its_connections_and_selection() {
    let mut g = scene();
    let e = g.add_node("expression1", NodeKind::Other("expression".to_owned()));
    g.add_connection(&Plug::new("a", "y"), &e.plug("input[0]"))
        .unwrap();
    g.select("expression1").unwrap();
    g.delete_node(&e).unwrap();
    assert!(!g.contains(&e));
    assert_eq!(g.source_of(&e.plug("input[0]")), None);
    assert!(g.selection().is_empty());
    assert!(matches!(
        g.delete_node(&e),
        Err(GraphError::UnknownNode(_))
    ));
}

#[test]
fn list_constructs_filters_by_host_type() {
    let mut g = scene();
    g.add_node("expression2", NodeKind::Other("expression".to_owned()));
    g.add_node("expression1", NodeKind::Other("expression".to_owned()));
    let found = g.list_constructs("expression").unwrap();
    assert_eq!(
        found,
        vec![NodeHandle::new("expression1"), NodeHandle::new("expression2")]
    );
}

#[test]
fn keyframes_only_on_curves() {
    let mut g = scene();
    let md = g.create_node(NodeKind::MultiplyDivide).unwrap();
    assert!(matches!(
        g.create_keyframe(&md, Keyframe::linear(0.0, 0.0)),
        Err(GraphError::WrongNodeKind { .. })
    ));
    let curve = g.create_node(NodeKind::RampCurve).unwrap();
    g.create_keyframe(&curve, Keyframe::linear(2.0, 1.0)).unwrap();
    g.create_keyframe(&curve, Keyframe::linear(0.0, 0.0)).unwrap();
    let keys = g.keyframes(&curve).unwrap();
    assert_eq!(keys[0].position, 0.0);
    assert_eq!(keys[1].position, 2.0);
}

#[test]
fn evaluates_arithmetic_chain() {
    let mut g = scene();
    let md = g.create_node(NodeKind::MultiplyDivide).unwrap();
    g.connect(&Plug::new("a", "y"), &md.plug(multiply_divide::INPUT1), true)
        .unwrap();
    g.set_attribute(&md.plug(multiply_divide::INPUT2), Value::Double(4.0))
        .unwrap();
    g.set_attribute(
        &md.plug(multiply_divide::OPERATION),
        Value::Int(multiply_divide::DIVIDE),
    )
    .unwrap();
    g.connect(&md.plug(multiply_divide::OUTPUT), &Plug::new("a", "x"), true)
        .unwrap();
    assert_eq!(g.evaluate(&Plug::new("a", "x")).unwrap(), 0.75);
}

#[test]
fn cyclic_curve_repeats() {
    let mut g = scene();
    let curve = g.create_node(NodeKind::RampCurve).unwrap();
    g.create_keyframe(&curve, Keyframe::linear(0.0, 0.0)).unwrap();
    g.create_keyframe(&curve, Keyframe::linear(2.0, 1.0)).unwrap();
    g.set_extrapolation(&curve, Extrapolation::Cyclic, Extrapolation::Cyclic)
        .unwrap();
    let input = curve.plug(ramp_curve::INPUT);
    let output = curve.plug(ramp_curve::OUTPUT);
    for (x, want) in [(1.0, 0.5), (5.0, 0.5), (-1.5, 0.25), (4.0, 0.0)] {
        g.set_attribute(&input, Value::Double(x)).unwrap();
        let got = g.evaluate(&output).unwrap();
        assert!((got - want).abs() < 1e-9, "x={x}: {got} != {want}");
    }
}

#[test]
fn evaluation_detects_cycles() {
    let mut g = scene();
    let md = g.create_node(NodeKind::MultDoubleLinear).unwrap();
    g.connect(
        &md.plug(mult_double_linear::OUTPUT),
        &md.plug(mult_double_linear::INPUT1),
        true,
    )
    .unwrap();
    match g.evaluate(&md.plug(mult_double_linear::OUTPUT)) {
        Err(GraphError::Evaluation(_, msg)) => assert_eq!(msg, "dependency cycle"),
        other => panic!("expected cycle error, got {other:?}"),
    }
}

#[test]
fn evaluation_detects_cycles_across_nodes() {
    let mut g = scene();
    let first = g.create_node(NodeKind::PlusMinusAverage).unwrap();
    let second = g.create_node(NodeKind::MultDoubleLinear).unwrap();
    g.connect(
        &first.plug(plus_minus_average::OUTPUT),
        &second.plug(mult_double_linear::INPUT1),
        true,
    )
    .unwrap();
    g.connect(
        &second.plug(mult_double_linear::OUTPUT),
        &first.plug(plus_minus_average::INPUT2),
        true,
    )
    .unwrap();
    g.connect(
        &first.plug(plus_minus_average::OUTPUT),
        &NodeHandle::new("a").plug("x"),
        true,
    )
    .unwrap();
    assert!(matches!(
        g.evaluate(&Plug::new("a", "x")),
        Err(GraphError::Evaluation(..))
    ));
}

#[test]
fn shared_inputs_are_not_cycles() {
    let mut g = scene();
    let a = NodeHandle::new("a");
    let sq = g.create_node(NodeKind::MultDoubleLinear).unwrap();
    g.connect(&a.plug("y"), &sq.plug(mult_double_linear::INPUT1), true)
        .unwrap();
    g.connect(&a.plug("y"), &sq.plug(mult_double_linear::INPUT2), true)
        .unwrap();

    let mut prev = sq.plug(mult_double_linear::OUTPUT);
    for _ in 0..32 {
        let add = g.create_node(NodeKind::PlusMinusAverage).unwrap();
        g.connect(&prev, &add.plug(plus_minus_average::INPUT1), true)
            .unwrap();
        g.connect(&a.plug("y"), &add.plug(plus_minus_average::INPUT2), true)
            .unwrap();
        prev = add.plug(plus_minus_average::OUTPUT);
    }
    assert_eq!(g.evaluate(&prev).unwrap(), 9.0 + 32.0 * 3.0);
}

#[test]
fn builds_from_json_scene() {
    let g = MemoryGraph::from_json(
        r#"{
            "nodes": [
                {"name": "ctrl", "type": "transform",
                 "attributes": {"tx": {"double_linear": 1.5}}, "locked": ["tx"]},
                {"name": "expression1", "type": "expression",
                 "attributes": {"expression": {"string": ".O[0] = .I[0];"}}}
            ],
            "connections": [["ctrl.tx", "expression1.input[0]"]],
            "selection": ["ctrl"]
        }"#,
    )
    .unwrap();
    assert!(g.is_locked(&Plug::new("ctrl", "tx")).unwrap());
    assert_eq!(
        g.source_of(&Plug::new("expression1", "input[0]")),
        Some(&Plug::new("ctrl", "tx"))
    );
    assert_eq!(g.selection(), ["ctrl".to_owned()]);
    assert!(g.ops().is_empty());
}

#[test]
fn bad_json_is_a_serde_error() {
    let err = MemoryGraph::from_json("{\"nodes\": 3}").unwrap_err();
    assert!(matches!(err, ConvertError::Serde(_)));
}

#[test]
fn ops_serialize_with_tags() {
    let mut g = scene();
    g.clear_selection().unwrap();
    g.set_attribute(&Plug::new("a", "y"), Value::Double(1.0))
        .unwrap();
    let json = serde_json::to_value(g.ops()).unwrap();
    assert_eq!(json[0]["op"], "clear_selection");
    assert_eq!(json[1]["op"], "set_attribute");
    assert_eq!(json[1]["plug"], "a.y");
    assert_eq!(json[1]["value"]["double"], 1.0);
}

#[test]
fn driven_plugs_refuse_writes_until_disconnected() {
    let mut g = scene();
    let x = Plug::new("a", "x");
    g.connect(&Plug::new("a", "y"), &x, false).unwrap();
    assert!(matches!(
        g.set_attribute(&x, Value::Double(1.0)),
        Err(GraphError::Driven(_))
    ));
    g.clear_ops();
    g.disconnect(&x).unwrap();
    g.disconnect(&x).unwrap();
    assert_eq!(g.ops(), [GraphOp::Disconnect { dest: x.clone() }]);
    g.set_attribute(&x, Value::Double(1.0)).unwrap();
    assert_eq!(g.evaluate(&x).unwrap(), 1.0);
}
