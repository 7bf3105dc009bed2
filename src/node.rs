//! Read-only capabilities the printer needs from graph nodes.
//!
//! Both the materialized graph in [`crate::graph`] and the symbolic nodes in
//! [`crate::meta`] implement these; the dispatcher only ever talks to them
//! through [`GraphObject`].
use std::borrow::Cow;
use crate::attributes::Attributes;
use crate::dtype::DType;
use crate::graph::{GraphError, GraphId, TensorId};
use crate::numeric_tensor::NumericTensor;
use crate::shape::{Shape, ShapeError};
use crate::unbound::Unbound;

/// Operation type tag of constant-valued operations.
pub const CONST_OP_TYPE: &str = "Const";

/// Attribute holding the payload of a constant operation.
pub const CONSTANT_VALUE_ATTRIBUTE: &str = "value";

/// Identity of a value node, independent of its contents.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum NodeIdentity {
    Materialized { graph: GraphId, tensor: TensorId },
    Eager(usize),
    Meta(usize),
}

/// A node that yields one output slot of an operation.
pub trait TensorLike {
    fn identity(&self) -> NodeIdentity;

    /// The producing operation, or `None` when the node was created in a
    /// context that does not retain producers (eager execution).
    fn op(&self) -> Option<Unbound<Box<dyn OperationLike + '_>>>;

    fn value_index(&self) -> Unbound<usize>;

    fn dtype(&self) -> Option<Unbound<DType>>;

    fn shape(&self) -> Result<Shape, ShapeError>;

    fn name(&self) -> Unbound<String>;

    /// Computes the concrete value of the node, if it has a way to do so.
    fn evaluate(&self) -> Option<Result<NumericTensor, GraphError>>;
}

pub trait OperationLike {
    fn op_type(&self) -> Unbound<String>;

    fn name(&self) -> Unbound<String>;

    /// Inputs in the order the operation consumes them.
    fn inputs(&self) -> Unbound<Vec<Box<dyn TensorLike + '_>>>;

    fn attributes(&self) -> Unbound<&Attributes>;
}

impl<T: TensorLike + ?Sized> TensorLike for &T {
    fn identity(&self) -> NodeIdentity {
        (**self).identity()
    }
    fn op(&self) -> Option<Unbound<Box<dyn OperationLike + '_>>> {
        (**self).op()
    }
    fn value_index(&self) -> Unbound<usize> {
        (**self).value_index()
    }
    fn dtype(&self) -> Option<Unbound<DType>> {
        (**self).dtype()
    }
    fn shape(&self) -> Result<Shape, ShapeError> {
        (**self).shape()
    }
    fn name(&self) -> Unbound<String> {
        (**self).name()
    }
    fn evaluate(&self) -> Option<Result<NumericTensor, GraphError>> {
        (**self).evaluate()
    }
}

impl<T: OperationLike + ?Sized> OperationLike for &T {
    fn op_type(&self) -> Unbound<String> {
        (**self).op_type()
    }
    fn name(&self) -> Unbound<String> {
        (**self).name()
    }
    fn inputs(&self) -> Unbound<Vec<Box<dyn TensorLike + '_>>> {
        (**self).inputs()
    }
    fn attributes(&self) -> Unbound<&Attributes> {
        (**self).attributes()
    }
}

/// Anything the dispatcher can be asked to print.
pub enum GraphObject<'a> {
    /// Printed verbatim.
    Opaque(Cow<'a, str>),
    Tensor(&'a dyn TensorLike),
    Operation(&'a dyn OperationLike),
}

impl<'a> GraphObject<'a> {
    pub fn tensor(tensor: &'a dyn TensorLike) -> Self {
        GraphObject::Tensor(tensor)
    }

    pub fn operation(op: &'a dyn OperationLike) -> Self {
        GraphObject::Operation(op)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GraphObject::Opaque(_) => "opaque",
            GraphObject::Tensor(_) => "tensor",
            GraphObject::Operation(_) => "operation",
        }
    }
}

impl<'a> From<&'a str> for GraphObject<'a> {
    fn from(value: &'a str) -> Self {
        GraphObject::Opaque(Cow::Borrowed(value))
    }
}

impl From<String> for GraphObject<'_> {
    fn from(value: String) -> Self {
        GraphObject::Opaque(Cow::Owned(value))
    }
}
