use std::rc::Rc;
use crate::dprint_tests::{init_logging, lines, output, trace};
use graph_dprint::attributes::{AttributeValue, Attributes};
use graph_dprint::dtype::DType;
use graph_dprint::graph::GraphError;
use graph_dprint::numeric_tensor::NumericTensor;
use graph_dprint::shape::{Shape, ShapeError};
use graph_dprint::{
    DprintError, EagerTensor, GraphObject, MetaOp, MetaTensor, NodeIdentity, OperationLike, Printer, TensorLike,
    Unbound, VarResolver, debug_print_to,
};

fn named(name: &str) -> Unbound<String> {
    Unbound::Resolved(name.to_string())
}

pub fn test_unresolved_producer_prints_header_only() {
    let mut resolver = VarResolver::new();
    let op_var = resolver.new_named_var("op");
    let tensor = MetaTensor::new(&mut resolver, Unbound::Unresolved(op_var)).with_name(named("t"));

    let out = trace(&tensor);
    assert_eq!(out, "Value(~op):0,\tdtype=None,\tshape=Unknown,\t\"t\"\n");
}

pub fn test_unresolved_inputs_print_their_var() {
    let mut resolver = VarResolver::new();
    let inputs_var = resolver.new_named_var("inputs");
    let op = MetaOp::new(&mut resolver, named("Add"), Unbound::Unresolved(inputs_var));
    let tensor = MetaTensor::new(&mut resolver, Unbound::Resolved(Rc::new(op)))
        .with_dtype(Unbound::Resolved(DType::F32))
        .with_name(named("sum"));

    let out = trace(&tensor);
    assert_eq!(
        out,
        lines(&[
            "Value(Add):0,\tdtype=float32,\tshape=Unknown,\t\"sum\"",
            "|  ~inputs",
        ])
    );
}

pub fn test_unresolved_fields_render_as_vars() {
    let mut resolver = VarResolver::new();
    let dtype_var = resolver.new_named_var("dt");
    let slot_var = resolver.new_named_var("slot");
    let name_var = resolver.new_named_var("name");
    let op = MetaOp::resolved(&mut resolver, "Placeholder", vec![]);
    let tensor = MetaTensor::new(&mut resolver, Unbound::Resolved(Rc::new(op)))
        .with_dtype(Unbound::Unresolved(dtype_var))
        .with_value_index(Unbound::Unresolved(slot_var))
        .with_shape(Unbound::Resolved(Some(Shape::from(vec![None, Some(3usize)]))))
        .with_name(Unbound::Unresolved(name_var));

    let out = trace(&tensor);
    assert_eq!(out, "Value(Placeholder):~slot,\tdtype=~dt,\tshape=[None, 3],\t\"~name\"\n");
}

pub fn test_symbolic_chain_and_shared_input() {
    let mut resolver = VarResolver::new();
    let x_op = MetaOp::resolved(&mut resolver, "Placeholder", vec![]).with_name(named("x"));
    let x = Rc::new(
        MetaTensor::new(&mut resolver, Unbound::Resolved(Rc::new(x_op)))
            .with_dtype(Unbound::Resolved(DType::F64))
            .with_name(named("x:0")),
    );
    let square = MetaOp::resolved(&mut resolver, "Mul", vec![x.clone(), x.clone()]);
    let out_tensor = MetaTensor::new(&mut resolver, Unbound::Resolved(Rc::new(square)))
        .with_dtype(Unbound::Resolved(DType::F64))
        .with_name(named("sq:0"));

    let out = trace(&out_tensor);
    assert_eq!(
        out,
        lines(&[
            "Value(Mul):0,\tdtype=float64,\tshape=Unknown,\t\"sq:0\"",
            "|  Value(Placeholder):0,\tdtype=float64,\tshape=Unknown,\t\"x:0\"",
            "|  Value(Placeholder):0,\tdtype=float64,\tshape=Unknown,\t\"x:0\"",
        ])
    );
}

pub fn test_meta_constant_with_unresolved_node_def() {
    let mut resolver = VarResolver::new();
    let node_def = resolver.new_named_var("node_def");
    let op = MetaOp::resolved(&mut resolver, "Const", vec![]).with_node_def(Unbound::Unresolved(node_def));
    let tensor = MetaTensor::new(&mut resolver, Unbound::Resolved(Rc::new(op)))
        .with_dtype(Unbound::Resolved(DType::I32))
        .with_name(named("c"));

    let out = trace(&tensor);
    assert_eq!(
        out,
        lines(&[
            "Value(Const):0,\tdtype=int32,\tshape=Unknown,\t\"c\"",
            "|  ~node_def",
        ])
    );
}

pub fn test_meta_constant_reads_value_attribute() {
    let mut resolver = VarResolver::new();
    let attributes = Attributes::new()
        .with("dtype", AttributeValue::DType(DType::BOOL))
        .with("value", AttributeValue::Tensor(NumericTensor::from_vec(vec![true, false])));
    let op = MetaOp::resolved(&mut resolver, "Const", vec![]).with_node_def(Unbound::Resolved(attributes));
    let tensor = MetaTensor::new(&mut resolver, Unbound::Resolved(Rc::new(op)))
        .with_dtype(Unbound::Resolved(DType::BOOL))
        .with_shape(Unbound::Resolved(Some(Shape::from(vec![2usize]))))
        .with_name(named("mask"));

    let out = trace(&tensor);
    assert_eq!(
        out,
        lines(&[
            "Value(Const):0,\tdtype=bool,\tshape=[2],\t\"mask\"",
            "|  [ True False]",
        ])
    );
}

pub fn test_meta_constant_with_wrong_value_kind() {
    init_logging();
    let mut resolver = VarResolver::new();
    let attributes = Attributes::new().with("value", AttributeValue::Int(3));
    let op = MetaOp::resolved(&mut resolver, "Const", vec![])
        .with_name(named("three"))
        .with_node_def(Unbound::Resolved(attributes));
    let tensor = MetaTensor::new(&mut resolver, Unbound::Resolved(Rc::new(op))).with_name(named("three:0"));
    let mut printer = Printer::new(Vec::new());

    let result = debug_print_to(&tensor, &mut printer);
    assert!(matches!(
        result,
        Err(DprintError::Graph(GraphError::WrongAttributeKind(_, _, "int")))
    ));
    assert_eq!(output(printer), "Value(Const):0,\tdtype=None,\tshape=Unknown,\t\"three:0\"\n");
}

/// An operation mixing a symbolic input with one whose producer was dropped.
struct MixedOp {
    leaf: MetaTensor,
    eager: EagerTensor,
    attributes: Attributes,
}

impl OperationLike for MixedOp {
    fn op_type(&self) -> Unbound<String> {
        named("Concat")
    }

    fn name(&self) -> Unbound<String> {
        named("concat")
    }

    fn inputs(&self) -> Unbound<Vec<Box<dyn TensorLike + '_>>> {
        Unbound::Resolved(vec![
            Box::new(&self.leaf) as Box<dyn TensorLike + '_>,
            Box::new(&self.eager) as Box<dyn TensorLike + '_>,
        ])
    }

    fn attributes(&self) -> Unbound<&Attributes> {
        Unbound::Resolved(&self.attributes)
    }
}

struct MixedOutput {
    op: MixedOp,
}

impl TensorLike for MixedOutput {
    fn identity(&self) -> NodeIdentity {
        NodeIdentity::Meta(usize::MAX)
    }

    fn op(&self) -> Option<Unbound<Box<dyn OperationLike + '_>>> {
        Some(Unbound::Resolved(Box::new(&self.op) as Box<dyn OperationLike + '_>))
    }

    fn value_index(&self) -> Unbound<usize> {
        Unbound::Resolved(0)
    }

    fn dtype(&self) -> Option<Unbound<DType>> {
        Some(Unbound::Resolved(DType::F32))
    }

    fn shape(&self) -> Result<Shape, ShapeError> {
        Ok(Shape::from(vec![3usize]))
    }

    fn name(&self) -> Unbound<String> {
        named("concat:0")
    }

    fn evaluate(&self) -> Option<Result<NumericTensor, GraphError>> {
        None
    }
}

pub fn test_detached_input_fails_mid_trace() {
    init_logging();
    let mut resolver = VarResolver::new();
    let leaf_op = MetaOp::resolved(&mut resolver, "Placeholder", vec![]);
    let leaf = MetaTensor::new(&mut resolver, Unbound::Resolved(Rc::new(leaf_op)))
        .with_dtype(Unbound::Resolved(DType::F32))
        .with_shape(Unbound::Resolved(Some(Shape::from(vec![2usize]))))
        .with_name(named("a:0"));
    let root = MixedOutput {
        op: MixedOp {
            leaf,
            eager: EagerTensor::new("b", NumericTensor::from_vec(vec![1f32])),
            attributes: Attributes::new(),
        },
    };
    let mut printer = Printer::new(Vec::new());

    let result = debug_print_to(GraphObject::tensor(&root), &mut printer);
    assert!(matches!(result, Err(DprintError::GraphNotInspectable(ref name)) if name == "b"));
    assert_eq!(printer.indentation(), "");
    assert_eq!(printer.depth(), 0);
    assert_eq!(
        output(printer),
        lines(&[
            "Value(Concat):0,\tdtype=float32,\tshape=[3],\t\"concat:0\"",
            "|  Value(Placeholder):0,\tdtype=float32,\tshape=[2],\t\"a:0\"",
        ])
    );
}
