use fluxo::{
    CancelToken, ExecutionMode, ExecutorConfig, FxError, Graph, GraphExecutor, NdArray, Node,
    OpFamily, PairwiseOp, ReduceOp, TransformOp, VarId, Variable,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn filled(rows: usize, cols: usize, value: f32) -> NdArray<f32> {
    let mut m = NdArray::<f32>::matrix(rows, cols).unwrap();
    m.assign_scalar(value);
    m
}

fn seed(graph: &Graph<f32>, id: i32, array: NdArray<f32>) {
    graph
        .variable_space()
        .put_variable(VarId(id), Variable::with_array(VarId(id), array));
}

fn transform(id: i32, op: TransformOp, inputs: &[i32], outputs: &[i32]) -> Node<f32> {
    Node::new(OpFamily::Transform, op.as_num(), id, inputs, outputs)
}

fn pairwise(id: i32, op: PairwiseOp, inputs: &[i32], outputs: &[i32]) -> Node<f32> {
    Node::new(OpFamily::Pairwise, op.as_num(), id, inputs, outputs)
}

fn mean_of(graph: &Graph<f32>, id: i32) -> f32 {
    graph
        .variable_space()
        .array(VarId(id))
        .unwrap()
        .mean()
        .unwrap()
}

#[test]
fn single_input_chain() {
    init_tracing();
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(5, 5, -2.0));

    graph.add_node(transform(1, TransformOp::Abs, &[-1], &[2])).unwrap();
    graph.add_node(transform(2, TransformOp::Neg, &[1], &[3])).unwrap();
    graph.add_node(transform(3, TransformOp::Abs, &[2], &[])).unwrap();

    GraphExecutor::execute(&mut graph).unwrap();

    assert_eq!(graph.root_nodes(), 1);
    assert_eq!(graph.total_nodes(), 3);
    assert!((mean_of(&graph, 2) + 2.0).abs() < 1e-5);
    assert!((mean_of(&graph, 3) - 2.0).abs() < 1e-5);
}

#[test]
fn double_input_chain() {
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(5, 5, -2.0));
    seed(&graph, -2, filled(5, 5, -1.0));
    seed(&graph, -3, filled(5, 5, 0.0));

    graph.add_node(transform(1, TransformOp::Abs, &[-1], &[3])).unwrap();
    graph.add_node(transform(2, TransformOp::Abs, &[-2], &[3])).unwrap();
    graph.add_node(pairwise(3, PairwiseOp::Add, &[1, 2], &[-3])).unwrap();

    GraphExecutor::execute(&mut graph).unwrap();

    assert_eq!(graph.root_nodes(), 2);
    assert!((mean_of(&graph, -3) - 3.0).abs() < 1e-5);
}

#[test]
fn fan_out_then_two_branches() {
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(5, 5, -2.0));
    seed(&graph, -2, filled(5, 5, 0.0));
    seed(&graph, -3, filled(5, 5, 0.0));

    graph.add_node(transform(1, TransformOp::Abs, &[-1], &[2, 3])).unwrap();
    graph.add_node(transform(2, TransformOp::Sqrt, &[1], &[-2])).unwrap();
    graph.add_node(transform(3, TransformOp::Neg, &[1], &[-3])).unwrap();

    GraphExecutor::execute(&mut graph).unwrap();

    assert!((mean_of(&graph, -2) - 1.4142135).abs() < 1e-5);
    assert!((mean_of(&graph, -3) + 2.0).abs() < 1e-5);
}

// a producer consumed by two branches keeps its published value
#[test]
fn fan_out_preserves_producer_value() {
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(5, 5, -2.0));

    graph.add_node(transform(1, TransformOp::Abs, &[-1], &[2, 3])).unwrap();
    graph.add_node(transform(2, TransformOp::Sqrt, &[1], &[])).unwrap();
    graph.add_node(transform(3, TransformOp::Neg, &[1], &[])).unwrap();

    GraphExecutor::execute(&mut graph).unwrap();

    assert_eq!(graph.fan_out(VarId(1)), 2);
    assert!((mean_of(&graph, 1) - 2.0).abs() < 1e-6);
    // the external input was never written through either branch
    assert!((mean_of(&graph, -1) + 2.0).abs() < 1e-6);
}

#[test]
fn axis_reduction_feeds_transform() {
    let mut graph = Graph::<f32>::new();
    let mut x = NdArray::<f32>::matrix(5, 5).unwrap();
    for r in 0..x.rows() {
        for c in 0..x.columns() {
            x.set_index(&[r, c], -(c as f32));
        }
    }
    seed(&graph, -1, x);
    seed(&graph, -2, NdArray::<f32>::zeros(&[1, 5]).unwrap());

    graph
        .add_node(
            Node::new(OpFamily::Accumulation, ReduceOp::Mean.as_num(), 1, &[-1], &[2])
                .with_axes(&[1]),
        )
        .unwrap();
    graph.add_node(transform(2, TransformOp::Abs, &[1], &[-2])).unwrap();

    GraphExecutor::execute(&mut graph).unwrap();

    let out = graph.variable_space().array(VarId(-2)).unwrap();
    assert_eq!(out.shape(), &[1, 5]);
    assert!((out.mean().unwrap() - 2.0).abs() < 1e-5);
}

#[test]
fn axis_sum_along_columns() {
    let mut graph = Graph::<f32>::new();
    let mut x = NdArray::<f32>::matrix(5, 5).unwrap();
    for r in 0..5 {
        for c in 0..5 {
            x.set_index(&[r, c], -(c as f32));
        }
    }
    seed(&graph, -1, x);

    graph
        .add_node(
            Node::new(OpFamily::Accumulation, ReduceOp::Sum.as_num(), 1, &[-1], &[2])
                .with_axes(&[0]),
        )
        .unwrap();
    graph.add_node(transform(2, TransformOp::Abs, &[1], &[])).unwrap();

    GraphExecutor::execute(&mut graph).unwrap();

    let out = graph.variable_space().array(VarId(-2)).unwrap();
    assert_eq!(out.to_flat_vec(), vec![0.0, 5.0, 10.0, 15.0, 20.0]);
}

#[test]
fn internal_branching_meets_at_layer_three() {
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(5, 5, 0.0));
    seed(&graph, -2, filled(5, 5, 0.0));

    graph.add_node(transform(1, TransformOp::OneMinus, &[-1], &[11, 21])).unwrap();
    graph.add_node(transform(11, TransformOp::Neg, &[1], &[12])).unwrap();
    graph.add_node(transform(12, TransformOp::OneMinus, &[11], &[31])).unwrap();
    graph.add_node(transform(21, TransformOp::Neg, &[1], &[22])).unwrap();
    graph.add_node(transform(22, TransformOp::Neg, &[21], &[31])).unwrap();
    graph.add_node(pairwise(31, PairwiseOp::Add, &[12, 22], &[-2])).unwrap();

    GraphExecutor::execute(&mut graph).unwrap();

    assert_eq!(graph.node(VarId(31)).unwrap().layer(), Some(3));
    assert!((mean_of(&graph, -2) - 3.0).abs() < 1e-5);
}

// layering monotonicity: every node sits strictly above its internal
// producers, external-only nodes sit on layer 0
#[test]
fn layering_is_monotone() {
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(5, 5, 0.0));

    graph.add_node(transform(1, TransformOp::OneMinus, &[-1], &[11, 21])).unwrap();
    graph.add_node(transform(11, TransformOp::Neg, &[1], &[12])).unwrap();
    graph.add_node(transform(12, TransformOp::OneMinus, &[11], &[31])).unwrap();
    graph.add_node(transform(21, TransformOp::Neg, &[1], &[22])).unwrap();
    graph.add_node(transform(22, TransformOp::Neg, &[21], &[31])).unwrap();
    graph.add_node(pairwise(31, PairwiseOp::Add, &[12, 22], &[])).unwrap();
    graph.build().unwrap();

    for node in graph.nodes() {
        let layer = node.layer().unwrap();
        if node.has_internal_inputs() {
            for &input in node.inputs() {
                if input.is_internal() {
                    let producer = graph.node(input).unwrap().layer().unwrap();
                    assert!(layer > producer);
                }
            }
        } else {
            assert_eq!(layer, 0);
        }
    }
}

#[test]
fn quad_input_tree() {
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(5, 5, 0.0));
    seed(&graph, -2, filled(5, 5, -1.0));
    seed(&graph, -3, filled(5, 5, -2.0));
    seed(&graph, -4, filled(5, 5, -3.0));
    seed(&graph, -5, filled(5, 5, 119.0));

    graph.add_node(transform(1, TransformOp::Abs, &[-1], &[11])).unwrap();
    graph.add_node(transform(2, TransformOp::Abs, &[-2], &[11])).unwrap();
    graph.add_node(transform(3, TransformOp::Abs, &[-3], &[21])).unwrap();
    graph.add_node(transform(4, TransformOp::Abs, &[-4], &[21])).unwrap();
    graph.add_node(pairwise(11, PairwiseOp::Add, &[1, 2], &[31])).unwrap();
    graph.add_node(pairwise(21, PairwiseOp::Add, &[3, 4], &[31])).unwrap();
    graph.add_node(pairwise(31, PairwiseOp::Add, &[11, 21], &[-5])).unwrap();

    GraphExecutor::execute(&mut graph).unwrap();

    assert_eq!(graph.root_nodes(), 4);
    assert!((mean_of(&graph, -5) - 6.0).abs() < 1e-5);
}

#[test]
fn auto_output_for_leaf_node() {
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(5, 5, -2.0));

    graph.add_node(transform(1, TransformOp::Abs, &[-1], &[2])).unwrap();
    graph.add_node(transform(2, TransformOp::OneMinus, &[1], &[])).unwrap();

    graph.build().unwrap();
    assert!(graph.variable_space().has(VarId(-2)));

    GraphExecutor::execute(&mut graph).unwrap();

    let outputs = graph.fetch_outputs();
    assert_eq!(outputs.len(), 1);
    assert!((outputs[0].array().unwrap().mean().unwrap() + 1.0).abs() < 1e-5);
}

#[test]
fn auto_output_discovery() {
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(5, 5, -2.0));

    graph.add_node(transform(1, TransformOp::Abs, &[-1], &[2, 3, -1])).unwrap();
    graph.add_node(transform(2, TransformOp::OneMinus, &[1], &[])).unwrap();
    graph.add_node(transform(3, TransformOp::Neg, &[1], &[])).unwrap();

    graph.build().unwrap();
    for id in [-1, -2, -3] {
        assert!(graph.variable_space().has(VarId(id)));
    }

    GraphExecutor::execute(&mut graph).unwrap();

    let outputs = graph.fetch_outputs();
    assert_eq!(outputs.len(), 3);
    assert!((mean_of(&graph, -1) - 2.0).abs() < 1e-5);
    assert!((mean_of(&graph, -2) + 1.0).abs() < 1e-5);
    assert!((mean_of(&graph, -3) + 2.0).abs() < 1e-5);
}

fn branching_run(config: ExecutorConfig) -> Vec<(i32, Vec<f32>)> {
    let mut graph = Graph::<f32>::with_config(config);
    seed(&graph, -1, filled(5, 5, 0.0));
    seed(&graph, -2, filled(5, 5, 0.0));

    graph.add_node(transform(1, TransformOp::OneMinus, &[-1], &[11, 21])).unwrap();
    graph.add_node(transform(11, TransformOp::Neg, &[1], &[12])).unwrap();
    graph.add_node(transform(12, TransformOp::OneMinus, &[11], &[31])).unwrap();
    graph.add_node(transform(21, TransformOp::Neg, &[1], &[22])).unwrap();
    graph.add_node(transform(22, TransformOp::Neg, &[21], &[31])).unwrap();
    graph.add_node(pairwise(31, PairwiseOp::Add, &[12, 22], &[-2])).unwrap();

    GraphExecutor::execute(&mut graph).unwrap();

    let mut snapshot: Vec<(i32, Vec<f32>)> = graph
        .variable_space()
        .ids()
        .into_iter()
        .filter_map(|id| {
            graph
                .variable_space()
                .array(id)
                .ok()
                .map(|a| (id.0, a.to_flat_vec()))
        })
        .collect();
    snapshot.sort_by_key(|(id, _)| *id);
    snapshot
}

// re-running the same graph over fresh variable spaces lands on identical
// slot contents, and sequential and parallel scheduling agree
#[test]
fn execution_is_repeatable_across_modes() {
    init_tracing();
    let auto1 = branching_run(ExecutorConfig::default());
    let auto2 = branching_run(ExecutorConfig::default());
    let sequential = branching_run(ExecutorConfig {
        mode: ExecutionMode::Sequential,
        ..ExecutorConfig::default()
    });
    let pinned = branching_run(ExecutorConfig {
        workers: Some(2),
        ..ExecutorConfig::default()
    });

    assert_eq!(auto1, auto2);
    assert_eq!(auto1, sequential);
    assert_eq!(auto1, pinned);
}

#[test]
fn failing_node_finishes_its_layer_but_stops_the_run() {
    let config = ExecutorConfig {
        mode: ExecutionMode::Sequential,
        ..ExecutorConfig::default()
    };
    let mut graph = Graph::<f32>::with_config(config);
    seed(&graph, -1, filled(5, 5, -2.0));
    seed(&graph, -2, filled(3, 3, -1.0));

    graph.add_node(transform(1, TransformOp::Abs, &[-1], &[3, 5])).unwrap();
    graph.add_node(transform(2, TransformOp::Abs, &[-2], &[3])).unwrap();
    // layer 1: node 3 fails on mismatched shapes, node 5 succeeds
    graph.add_node(pairwise(3, PairwiseOp::Add, &[1, 2], &[4])).unwrap();
    graph.add_node(transform(5, TransformOp::Neg, &[1], &[])).unwrap();
    // layer 2 must never run
    graph.add_node(transform(4, TransformOp::Abs, &[3], &[])).unwrap();

    let err = GraphExecutor::execute(&mut graph).unwrap_err();
    assert!(matches!(err, FxError::ShapeMismatch { .. }));

    // the sibling on the failing layer still ran
    assert!(graph.variable_space().array(VarId(5)).is_ok());
    // the dependent layer was never scheduled
    assert!(graph.variable_space().array(VarId(4)).is_err());
}

#[test]
fn cancellation_is_checked_at_layer_boundaries() {
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(5, 5, 1.0));
    graph.add_node(transform(1, TransformOp::Neg, &[-1], &[])).unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    let err = GraphExecutor::execute_with(&mut graph, &cancel).unwrap_err();
    assert!(matches!(err, FxError::Cancelled));
    assert!(graph.variable_space().array(VarId(1)).is_err());
}

#[test]
fn unknown_op_number_is_reported() {
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(2, 2, 1.0));
    graph
        .add_node(Node::new(OpFamily::Transform, 99, 1, &[-1], &[]))
        .unwrap();

    let err = GraphExecutor::execute(&mut graph).unwrap_err();
    assert!(matches!(err, FxError::UnknownOp { op_num: 99, .. }));
}

#[test]
fn dangling_edge_fails_the_build() {
    let mut graph = Graph::<f32>::new();
    seed(&graph, -1, filled(2, 2, 1.0));
    graph.add_node(transform(1, TransformOp::Abs, &[-1], &[2])).unwrap();
    graph.add_node(transform(2, TransformOp::Abs, &[7], &[])).unwrap();

    let err = GraphExecutor::execute(&mut graph).unwrap_err();
    assert!(matches!(err, FxError::DanglingEdge { node: 2, input: 7 }));
}
