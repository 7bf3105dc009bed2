use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use serde::{Deserialize, Serialize};
use crate::attributes::{AttributeValue, Attributes};
use crate::dtype::DType;
use crate::node::{CONST_OP_TYPE, CONSTANT_VALUE_ATTRIBUTE, GraphObject, NodeIdentity, OperationLike, TensorLike};
use crate::numeric_tensor::{NumericTensor, NumericTensorError};
use crate::shape::{Shape, ShapeError};
use crate::unbound::Unbound;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Unknown tensor id {0}")]
    UnknownTensor(TensorId),
    #[error("Unknown operation id {0}")]
    UnknownOperation(OperationId),
    #[error("Unknown tensor name \"{0}\"")]
    UnknownTensorName(String),
    #[error("Tensor \"{0}\" is not listed among its producer's outputs")]
    InconsistentTensor(String),
    #[error("Tensor \"{0}\" is not produced by a constant and cannot be evaluated")]
    NotConstant(String),
    #[error("Missing expected attribute \"{1}\" for op {0}")]
    MissingAttribute(String, String),
    #[error("Attribute \"{1}\" of op {0} holds a {2}, expected a tensor")]
    WrongAttributeKind(String, String, &'static str),
    #[error(transparent)]
    NumericTensorError(#[from] NumericTensorError),
}

pub type TensorId = usize;
pub type OperationId = usize;

static NEXT_GRAPH_ID: AtomicUsize = AtomicUsize::new(0);
static NEXT_EAGER_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct GraphId(usize);

impl GraphId {
    fn next() -> Self {
        GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TensorInfo {
    name: String,
    dtype: Option<DType>,
    shape: Option<Shape>,
    producer: OperationId,
    value_index: usize,
}

impl TensorInfo {
    pub fn shape(&self) -> Option<Shape> {
        self.shape.clone()
    }

    pub fn dtype(&self) -> Option<DType> {
        self.dtype
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Declared type information for one output of a new operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputSpec {
    pub dtype: Option<DType>,
    pub shape: Option<Shape>,
}

impl OutputSpec {
    pub fn new(dtype: DType, shape: impl Into<Shape>) -> Self {
        Self { dtype: Some(dtype), shape: Some(shape.into()) }
    }

    pub fn unknown_shape(dtype: DType) -> Self {
        Self { dtype: Some(dtype), shape: None }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphOperation {
    pub name: String,
    pub op_type: String,
    pub inputs: Vec<TensorId>,
    pub outputs: Vec<TensorId>,
    pub attributes: Attributes,
}

/// A fully materialized dataflow graph: every tensor knows its producer.
///
/// Deserialization checks every cross reference and assigns a fresh
/// [`GraphId`], so a loaded copy never shares identities with its source.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "SerializedGraph")]
pub struct Graph {
    #[serde(skip_serializing)]
    id: GraphId,
    tensors: Vec<TensorInfo>,
    operations: Vec<GraphOperation>,
}

#[derive(Deserialize)]
struct SerializedGraph {
    tensors: Vec<TensorInfo>,
    operations: Vec<GraphOperation>,
}

impl TryFrom<SerializedGraph> for Graph {
    type Error = GraphError;

    fn try_from(value: SerializedGraph) -> Result<Self, Self::Error> {
        let SerializedGraph { tensors, operations } = value;
        for (tensor_id, tensor) in tensors.iter().enumerate() {
            let producer = operations
                .get(tensor.producer)
                .ok_or(GraphError::UnknownOperation(tensor.producer))?;
            if producer.outputs.get(tensor.value_index) != Some(&tensor_id) {
                return Err(GraphError::InconsistentTensor(tensor.name.clone()));
            }
        }
        for op in &operations {
            if let Some(id) = op.inputs.iter().chain(&op.outputs).find(|id| **id >= tensors.len()) {
                return Err(GraphError::UnknownTensor(*id));
            }
        }
        Ok(Graph { id: GraphId::next(), tensors, operations })
    }
}

impl Graph {
    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn get_tensor_info(&self, tensor_id: TensorId) -> Option<&TensorInfo> {
        self.tensors.get(tensor_id)
    }

    pub fn get_operation(&self, op_id: OperationId) -> Option<&GraphOperation> {
        self.operations.get(op_id)
    }

    pub fn tensor(&self, tensor_id: TensorId) -> Result<TensorRef<'_>, GraphError> {
        if tensor_id < self.tensors.len() {
            Ok(TensorRef { graph: self, id: tensor_id })
        } else {
            Err(GraphError::UnknownTensor(tensor_id))
        }
    }

    pub fn operation(&self, op_id: OperationId) -> Result<OperationRef<'_>, GraphError> {
        if op_id < self.operations.len() {
            Ok(OperationRef { graph: self, id: op_id })
        } else {
            Err(GraphError::UnknownOperation(op_id))
        }
    }

    pub fn tensor_by_name(&self, name: &str) -> Result<TensorRef<'_>, GraphError> {
        self.tensors
            .iter()
            .position(|x| x.name == name)
            .map(|id| TensorRef { graph: self, id })
            .ok_or_else(|| GraphError::UnknownTensorName(name.to_string()))
    }

    pub fn num_tensors(&self) -> usize {
        self.tensors.len()
    }

    pub fn num_operations(&self) -> usize {
        self.operations.len()
    }
}

pub struct GraphMutator {
    graph: Graph,
    operation_name_counts: HashMap<String, usize>,
}

impl Default for GraphMutator {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphMutator {
    pub fn new() -> Self {
        Self {
            graph: Graph {
                id: GraphId::next(),
                tensors: Vec::new(),
                operations: Vec::new(),
            },
            operation_name_counts: HashMap::new(),
        }
    }

    pub fn get_inner(self) -> Graph {
        self.graph
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// `name`, then `name_1`, `name_2`, ... for repeated requests.
    fn unique_operation_name(&mut self, name: &str) -> String {
        let count = self.operation_name_counts.entry(name.to_string()).or_insert(0);
        let unique = if *count == 0 {
            name.to_string()
        } else {
            format!("{}_{}", name, count)
        };
        *count += 1;
        unique
    }

    pub fn add_operation(
        &mut self,
        op_type: &str,
        name: &str,
        inputs: &[TensorId],
        attributes: Attributes,
        outputs: &[OutputSpec],
    ) -> Result<Vec<TensorId>, GraphError> {
        for input in inputs {
            if *input >= self.graph.tensors.len() {
                return Err(GraphError::UnknownTensor(*input));
            }
        }
        let op_id = self.graph.operations.len();
        let name = self.unique_operation_name(name);

        let mut output_ids = Vec::with_capacity(outputs.len());
        for (value_index, spec) in outputs.iter().enumerate() {
            let tensor_id = self.graph.tensors.len();
            self.graph.tensors.push(TensorInfo {
                name: format!("{}:{}", name, value_index),
                dtype: spec.dtype,
                shape: spec.shape.clone(),
                producer: op_id,
                value_index,
            });
            output_ids.push(tensor_id);
        }

        self.graph.operations.push(GraphOperation {
            name,
            op_type: op_type.to_string(),
            inputs: inputs.to_vec(),
            outputs: output_ids.clone(),
            attributes,
        });
        Ok(output_ids)
    }

    /// Adds a single-output operation with no attributes.
    pub fn add_op(&mut self, op_type: &str, name: &str, inputs: &[TensorId], output: OutputSpec) -> Result<TensorId, GraphError> {
        let outputs = self.add_operation(op_type, name, inputs, Attributes::new(), &[output])?;
        Ok(outputs[0])
    }

    pub fn new_constant_tensor(&mut self, value: NumericTensor, name: &str) -> TensorId {
        let output = OutputSpec::new(value.dtype(), value.shape());
        let attributes = Attributes::new()
            .with("dtype", AttributeValue::DType(value.dtype()))
            .with(CONSTANT_VALUE_ATTRIBUTE, AttributeValue::Tensor(value));
        let op_id = self.graph.operations.len();
        let tensor_id = self.graph.tensors.len();
        let name = self.unique_operation_name(name);
        self.graph.tensors.push(TensorInfo {
            name: format!("{}:0", name),
            dtype: output.dtype,
            shape: output.shape,
            producer: op_id,
            value_index: 0,
        });
        self.graph.operations.push(GraphOperation {
            name,
            op_type: CONST_OP_TYPE.to_string(),
            inputs: vec![],
            outputs: vec![tensor_id],
            attributes,
        });
        tensor_id
    }

    pub fn new_placeholder_tensor(&mut self, name: &str, dtype: DType, shape: Option<Shape>) -> TensorId {
        let tensor_id = self.graph.tensors.len();
        let op_id = self.graph.operations.len();
        let name = self.unique_operation_name(name);
        self.graph.tensors.push(TensorInfo {
            name: format!("{}:0", name),
            dtype: Some(dtype),
            shape,
            producer: op_id,
            value_index: 0,
        });
        self.graph.operations.push(GraphOperation {
            name,
            op_type: "Placeholder".to_string(),
            inputs: vec![],
            outputs: vec![tensor_id],
            attributes: Attributes::new().with("dtype", AttributeValue::DType(dtype)),
        });
        tensor_id
    }
}

/// Handle to one tensor of a [`Graph`].
#[derive(Clone, Copy, Debug)]
pub struct TensorRef<'g> {
    graph: &'g Graph,
    id: TensorId,
}

impl<'g> TensorRef<'g> {
    pub fn id(&self) -> TensorId {
        self.id
    }

    pub fn info(&self) -> &'g TensorInfo {
        &self.graph.tensors[self.id]
    }

    pub fn producer(&self) -> OperationRef<'g> {
        OperationRef { graph: self.graph, id: self.info().producer }
    }

    /// Reads the value of a tensor produced by a constant operation.
    pub fn eval_constant(&self) -> Result<NumericTensor, GraphError> {
        let op = self.producer().inner();
        if op.op_type != CONST_OP_TYPE || !op.inputs.is_empty() {
            return Err(GraphError::NotConstant(self.info().name.clone()));
        }
        Ok(op.attributes.require_tensor(&op.name, CONSTANT_VALUE_ATTRIBUTE)?.clone())
    }
}

impl TensorLike for TensorRef<'_> {
    fn identity(&self) -> NodeIdentity {
        NodeIdentity::Materialized { graph: self.graph.id, tensor: self.id }
    }

    fn op(&self) -> Option<Unbound<Box<dyn OperationLike + '_>>> {
        Some(Unbound::Resolved(Box::new(self.producer())))
    }

    fn value_index(&self) -> Unbound<usize> {
        Unbound::Resolved(self.info().value_index)
    }

    fn dtype(&self) -> Option<Unbound<DType>> {
        self.info().dtype.map(Unbound::Resolved)
    }

    fn shape(&self) -> Result<Shape, ShapeError> {
        self.info().shape.clone().ok_or(ShapeError::UnknownRank)
    }

    fn name(&self) -> Unbound<String> {
        Unbound::Resolved(self.info().name.clone())
    }

    fn evaluate(&self) -> Option<Result<NumericTensor, GraphError>> {
        Some(self.eval_constant())
    }
}

/// Handle to one operation of a [`Graph`].
#[derive(Clone, Copy, Debug)]
pub struct OperationRef<'g> {
    graph: &'g Graph,
    id: OperationId,
}

impl<'g> OperationRef<'g> {
    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn inner(&self) -> &'g GraphOperation {
        &self.graph.operations[self.id]
    }

    pub fn input_refs(&self) -> Vec<TensorRef<'g>> {
        self.inner()
            .inputs
            .iter()
            .map(|id| TensorRef { graph: self.graph, id: *id })
            .collect()
    }
}

impl OperationLike for OperationRef<'_> {
    fn op_type(&self) -> Unbound<String> {
        Unbound::Resolved(self.inner().op_type.clone())
    }

    fn name(&self) -> Unbound<String> {
        Unbound::Resolved(self.inner().name.clone())
    }

    fn inputs(&self) -> Unbound<Vec<Box<dyn TensorLike + '_>>> {
        Unbound::Resolved(
            self.input_refs()
                .into_iter()
                .map(|x| Box::new(x) as Box<dyn TensorLike + '_>)
                .collect(),
        )
    }

    fn attributes(&self) -> Unbound<&Attributes> {
        Unbound::Resolved(&self.inner().attributes)
    }
}

/// A value computed immediately, outside of any graph. Its producer is not
/// retained, so it cannot be traced.
#[derive(Clone, Debug)]
pub struct EagerTensor {
    id: usize,
    name: String,
    value: NumericTensor,
}

impl EagerTensor {
    pub fn new(name: &str, value: NumericTensor) -> Self {
        Self {
            id: NEXT_EAGER_ID.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            value,
        }
    }

    pub fn value(&self) -> &NumericTensor {
        &self.value
    }
}

impl TensorLike for EagerTensor {
    fn identity(&self) -> NodeIdentity {
        NodeIdentity::Eager(self.id)
    }

    fn op(&self) -> Option<Unbound<Box<dyn OperationLike + '_>>> {
        None
    }

    fn value_index(&self) -> Unbound<usize> {
        Unbound::Resolved(0)
    }

    fn dtype(&self) -> Option<Unbound<DType>> {
        Some(Unbound::Resolved(self.value.dtype()))
    }

    fn shape(&self) -> Result<Shape, ShapeError> {
        Ok(Shape::from(self.value.shape()))
    }

    fn name(&self) -> Unbound<String> {
        Unbound::Resolved(self.name.clone())
    }

    fn evaluate(&self) -> Option<Result<NumericTensor, GraphError>> {
        Some(Ok(self.value.clone()))
    }
}

impl<'a, 'g: 'a> From<&'a TensorRef<'g>> for GraphObject<'a> {
    fn from(value: &'a TensorRef<'g>) -> Self {
        GraphObject::Tensor(value)
    }
}

impl<'a, 'g: 'a> From<&'a OperationRef<'g>> for GraphObject<'a> {
    fn from(value: &'a OperationRef<'g>) -> Self {
        GraphObject::Operation(value)
    }
}

impl<'a> From<&'a EagerTensor> for GraphObject<'a> {
    fn from(value: &'a EagerTensor) -> Self {
        GraphObject::Tensor(value)
    }
}
