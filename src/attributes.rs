use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::dtype::DType;
use crate::graph::GraphError;
use crate::numeric_tensor::NumericTensor;
use crate::shape::Shape;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum AttributeValue {
    Int(i64),
    Float(f32),
    Ints(Vec<i64>),
    String(String),
    DType(DType),
    Shape(Shape),
    Tensor(NumericTensor),
}

impl AttributeValue {
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

/// Low-level attribute storage of an operation, keyed by attribute name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    values: BTreeMap<String, AttributeValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: AttributeValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: AttributeValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    /// The tensor stored under `key`, as required by operation `op_name`.
    pub fn require_tensor(&self, op_name: &str, key: &str) -> Result<&NumericTensor, GraphError> {
        match self.get(key) {
            Some(AttributeValue::Tensor(x)) => Ok(x),
            Some(other) => Err(GraphError::WrongAttributeKind(op_name.to_string(), key.to_string(), other.kind())),
            None => Err(GraphError::MissingAttribute(op_name.to_string(), key.to_string())),
        }
    }
}
