//! Symbolic counterparts of graph tensors and operations.
//!
//! Every field may be left [`Unbound::Unresolved`], which lets a partially
//! known graph (a pattern, or the result of a partial unification) be built
//! and printed with the same dispatcher as a materialized one.
use std::rc::Rc;
use crate::attributes::Attributes;
use crate::dtype::DType;
use crate::graph::GraphError;
use crate::node::{GraphObject, NodeIdentity, OperationLike, TensorLike};
use crate::numeric_tensor::NumericTensor;
use crate::shape::{Shape, ShapeError};
use crate::unbound::{Unbound, VarResolver};

#[derive(Debug)]
pub struct MetaOp {
    op_type: Unbound<String>,
    name: Unbound<String>,
    inputs: Unbound<Vec<Rc<MetaTensor>>>,
    node_def: Unbound<Attributes>,
}

impl MetaOp {
    pub fn new(resolver: &mut VarResolver, op_type: Unbound<String>, inputs: Unbound<Vec<Rc<MetaTensor>>>) -> Self {
        Self {
            op_type,
            name: Unbound::Unresolved(resolver.new_var()),
            inputs,
            node_def: Unbound::Resolved(Attributes::new()),
        }
    }

    /// An operation whose type and inputs are known.
    pub fn resolved(resolver: &mut VarResolver, op_type: &str, inputs: Vec<Rc<MetaTensor>>) -> Self {
        Self::new(resolver, Unbound::Resolved(op_type.to_string()), Unbound::Resolved(inputs))
    }

    pub fn with_name(mut self, name: Unbound<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_node_def(mut self, node_def: Unbound<Attributes>) -> Self {
        self.node_def = node_def;
        self
    }

    pub fn node_def(&self) -> &Unbound<Attributes> {
        &self.node_def
    }

    pub fn input_tensors(&self) -> Option<&[Rc<MetaTensor>]> {
        self.inputs.as_resolved().map(|x| x.as_slice())
    }
}

impl OperationLike for MetaOp {
    fn op_type(&self) -> Unbound<String> {
        self.op_type.clone()
    }

    fn name(&self) -> Unbound<String> {
        self.name.clone()
    }

    fn inputs(&self) -> Unbound<Vec<Box<dyn TensorLike + '_>>> {
        self.inputs
            .as_ref()
            .map(|inputs| inputs.iter().map(|x| Box::new(&**x) as Box<dyn TensorLike + '_>).collect())
    }

    fn attributes(&self) -> Unbound<&Attributes> {
        self.node_def.as_ref()
    }
}

#[derive(Debug)]
pub struct MetaTensor {
    id: usize,
    op: Unbound<Rc<MetaOp>>,
    value_index: Unbound<usize>,
    dtype: Option<Unbound<DType>>,
    shape: Unbound<Option<Shape>>,
    name: Unbound<String>,
}

impl MetaTensor {
    /// Output `0` of `op`, with unknown dtype and shape and an unresolved name.
    pub fn new(resolver: &mut VarResolver, op: Unbound<Rc<MetaOp>>) -> Self {
        Self {
            id: resolver.new_id(),
            op,
            value_index: Unbound::Resolved(0),
            dtype: None,
            shape: Unbound::Resolved(None),
            name: Unbound::Unresolved(resolver.new_var()),
        }
    }

    pub fn with_value_index(mut self, value_index: Unbound<usize>) -> Self {
        self.value_index = value_index;
        self
    }

    pub fn with_dtype(mut self, dtype: Unbound<DType>) -> Self {
        self.dtype = Some(dtype);
        self
    }

    pub fn with_shape(mut self, shape: Unbound<Option<Shape>>) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_name(mut self, name: Unbound<String>) -> Self {
        self.name = name;
        self
    }

    pub fn producer(&self) -> &Unbound<Rc<MetaOp>> {
        &self.op
    }
}

impl TensorLike for MetaTensor {
    fn identity(&self) -> NodeIdentity {
        NodeIdentity::Meta(self.id)
    }

    fn op(&self) -> Option<Unbound<Box<dyn OperationLike + '_>>> {
        Some(self.op.as_ref().map(|op| Box::new(&**op) as Box<dyn OperationLike + '_>))
    }

    fn value_index(&self) -> Unbound<usize> {
        self.value_index.clone()
    }

    fn dtype(&self) -> Option<Unbound<DType>> {
        self.dtype.clone()
    }

    fn shape(&self) -> Result<Shape, ShapeError> {
        match &self.shape {
            Unbound::Resolved(Some(shape)) => Ok(shape.clone()),
            Unbound::Resolved(None) => Err(ShapeError::UnknownRank),
            Unbound::Unresolved(var) => Err(ShapeError::Unresolved(var.clone())),
        }
    }

    fn name(&self) -> Unbound<String> {
        self.name.clone()
    }

    fn evaluate(&self) -> Option<Result<NumericTensor, GraphError>> {
        None
    }
}

impl<'a> From<&'a MetaTensor> for GraphObject<'a> {
    fn from(value: &'a MetaTensor) -> Self {
        GraphObject::Tensor(value)
    }
}

impl<'a> From<&'a MetaOp> for GraphObject<'a> {
    fn from(value: &'a MetaOp) -> Self {
        GraphObject::Operation(value)
    }
}
