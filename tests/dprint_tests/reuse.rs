use crate::dprint_tests::{init_logging, lines, output};
use graph_dprint::dtype::DType;
use graph_dprint::graph::TensorId;
use graph_dprint::numeric_tensor::NumericTensor;
use graph_dprint::shape::Shape;
use graph_dprint::{
    DprintError, EagerTensor, Graph, GraphMutator, GraphObject, OutputSpec, PrintOptions, Printer, debug_print_all,
    debug_print_to,
};

/// `exp(neg(x))` and `abs(neg(x))` sharing one `neg`.
fn shared_graph() -> (Graph, TensorId, TensorId) {
    let mut mutator = GraphMutator::new();
    let spec = || OutputSpec::new(DType::F32, vec![2usize]);
    let x = mutator.new_placeholder_tensor("x", DType::F32, Some(Shape::from(vec![2usize])));
    let neg = mutator.add_op("Neg", "neg", &[x], spec()).unwrap();
    let exp = mutator.add_op("Exp", "exp", &[neg], spec()).unwrap();
    let abs = mutator.add_op("Abs", "abs", &[neg], spec()).unwrap();
    (mutator.get_inner(), exp, abs)
}

pub fn test_reused_printer_collapses_earlier_subgraphs() {
    init_logging();
    let (graph, exp, _) = shared_graph();
    let exp = graph.tensor(exp).unwrap();
    let mut printer = Printer::new(Vec::new());

    debug_print_to(&exp, &mut printer).unwrap();
    debug_print_to(&exp, &mut printer).unwrap();
    assert_eq!(printer.printed_subgraphs().len(), 2);
    assert_eq!(
        output(printer),
        lines(&[
            "Value(Exp):0,\tdtype=float32,\tshape=[2],\t\"exp:0\"",
            "|  Value(Neg):0,\tdtype=float32,\tshape=[2],\t\"neg:0\"",
            "|  |  Value(Placeholder):0,\tdtype=float32,\tshape=[2],\t\"x:0\"",
            "Value(Exp):0,\tdtype=float32,\tshape=[2],\t\"exp:0\"",
            "|  ...",
        ])
    );
}

pub fn test_reset_subgraphs_restores_full_output() {
    init_logging();
    let (graph, exp, _) = shared_graph();
    let exp = graph.tensor(exp).unwrap();
    let mut printer = Printer::new(Vec::new());

    debug_print_to(&exp, &mut printer).unwrap();
    let first_len = printer.get_ref().len();
    printer.reset_subgraphs();
    assert!(printer.printed_subgraphs().is_empty());
    debug_print_to(&exp, &mut printer).unwrap();

    let written = output(printer);
    let (first, second) = written.split_at(first_len);
    assert_eq!(first, second);
}

pub fn test_print_all_shares_expanded_subgraphs() {
    init_logging();
    let (graph, exp, abs) = shared_graph();
    let exp = graph.tensor(exp).unwrap();
    let abs = graph.tensor(abs).unwrap();
    let mut printer = Printer::new(Vec::new());

    debug_print_all([GraphObject::from(&exp), GraphObject::from(&abs)], &mut printer).unwrap();
    assert_eq!(
        output(printer),
        lines(&[
            "Value(Exp):0,\tdtype=float32,\tshape=[2],\t\"exp:0\"",
            "|  Value(Neg):0,\tdtype=float32,\tshape=[2],\t\"neg:0\"",
            "|  |  Value(Placeholder):0,\tdtype=float32,\tshape=[2],\t\"x:0\"",
            "Value(Abs):0,\tdtype=float32,\tshape=[2],\t\"abs:0\"",
            "|  Value(Neg):0,\tdtype=float32,\tshape=[2],\t\"neg:0\"",
            "|  |  ...",
        ])
    );
}

pub fn test_print_all_checks_every_root_first() {
    init_logging();
    let (graph, exp, _) = shared_graph();
    let exp = graph.tensor(exp).unwrap();
    let eager = EagerTensor::new("late", NumericTensor::from_vec(vec![0u8]));
    let mut printer = Printer::new(Vec::new());

    let result = debug_print_all([GraphObject::from(&exp), GraphObject::from(&eager)], &mut printer);
    assert!(matches!(result, Err(DprintError::GraphNotInspectable(_))));
    assert!(printer.printed_subgraphs().is_empty());
    assert_eq!(output(printer), "");
}

pub fn test_custom_options_change_indent_and_threshold() {
    init_logging();
    let mut mutator = GraphMutator::new();
    let c = mutator.new_constant_tensor(NumericTensor::from_vec((0..8i32).collect::<Vec<_>>()), "c");
    let graph = mutator.get_inner();
    let options = PrintOptions::from_json(r#"{"indent": "  ", "threshold": 5, "edge_items": 2}"#).unwrap();
    let mut printer = Printer::new(Vec::new()).with_options(options);

    debug_print_to(&graph.tensor(c).unwrap(), &mut printer).unwrap();
    assert_eq!(
        output(printer),
        lines(&[
            "Value(Const):0,\tdtype=int32,\tshape=[8],\t\"c:0\"",
            "  [0 1 ... 6 7]",
        ])
    );
}

fn shout(text: &str) -> String {
    text.to_uppercase()
}

pub fn test_formatter_applies_to_every_line() {
    init_logging();
    let (graph, _, abs) = shared_graph();
    let mut printer = Printer::new(Vec::new()).with_formatter(shout);

    debug_print_to(&graph.tensor(abs).unwrap(), &mut printer).unwrap();
    assert_eq!(
        output(printer),
        lines(&[
            "VALUE(ABS):0,\tDTYPE=FLOAT32,\tSHAPE=[2],\t\"ABS:0\"",
            "|  VALUE(NEG):0,\tDTYPE=FLOAT32,\tSHAPE=[2],\t\"NEG:0\"",
            "|  |  VALUE(PLACEHOLDER):0,\tDTYPE=FLOAT32,\tSHAPE=[2],\t\"X:0\"",
        ])
    );
}
