use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use crate::unbound::LogicVar;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ShapeError {
    #[error("Shape has unknown rank")]
    UnknownRank,
    #[error("Shape is unresolved ({0})")]
    Unresolved(LogicVar),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    Known(usize),
    Unknown,
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Known(x) => write!(f, "{}", x),
            Dimension::Unknown => write!(f, "None"),
        }
    }
}

impl From<usize> for Dimension {
    fn from(value: usize) -> Self {
        Dimension::Known(value)
    }
}

impl From<Option<usize>> for Dimension {
    fn from(value: Option<usize>) -> Self {
        match value {
            Some(x) => Dimension::Known(x),
            None => Dimension::Unknown,
        }
    }
}

/// A shape whose rank is known, though individual dimensions may not be.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape(Vec<Dimension>);

impl Shape {
    pub fn new(dims: Vec<Dimension>) -> Self {
        Self(dims)
    }

    pub fn scalar() -> Self {
        Self(vec![])
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.0
    }

    pub fn is_fully_known(&self) -> bool {
        self.0.iter().all(|x| matches!(x, Dimension::Known(_)))
    }
}

impl From<&[usize]> for Shape {
    fn from(value: &[usize]) -> Self {
        Self(value.iter().map(|x| Dimension::Known(*x)).collect())
    }
}

impl From<Vec<usize>> for Shape {
    fn from(value: Vec<usize>) -> Self {
        Self::from(value.as_slice())
    }
}

impl From<Vec<Option<usize>>> for Shape {
    fn from(value: Vec<Option<usize>>) -> Self {
        Self(value.into_iter().map(Dimension::from).collect())
    }
}

/// Renders as a dimension list, e.g. `[2, None, 3]`.
impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, "]")
    }
}
