use crate::array_format::{ArrayFormatOptions, array2string};
use crate::dtype::{DType, DTypeOfPrimitive};
use half::{bf16, f16};
use ndarray::{ArcArray, IxDyn};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, thiserror::Error)]
pub enum NumericTensorError {
    #[error("Requested dtype {0}, but had dtype {1}")]
    WrongDTypeError(DType, DType),
    #[error(transparent)]
    ShapeError(#[from] ndarray::ShapeError),
}

/// Dense, dynamic-rank tensor payload, tagged by element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NumericTensor {
    F64(ArcArray<f64, IxDyn>),
    F32(ArcArray<f32, IxDyn>),
    BF16(ArcArray<bf16, IxDyn>),
    F16(ArcArray<f16, IxDyn>),
    U64(ArcArray<u64, IxDyn>),
    I64(ArcArray<i64, IxDyn>),
    U32(ArcArray<u32, IxDyn>),
    I32(ArcArray<i32, IxDyn>),
    U16(ArcArray<u16, IxDyn>),
    I16(ArcArray<i16, IxDyn>),
    U8(ArcArray<u8, IxDyn>),
    I8(ArcArray<i8, IxDyn>),
    BOOL(ArcArray<bool, IxDyn>),
}

macro_rules! for_each_variant {
    ($tensor:expr, $x:ident => $body:expr) => {
        match $tensor {
            NumericTensor::F64($x) => $body,
            NumericTensor::F32($x) => $body,
            NumericTensor::BF16($x) => $body,
            NumericTensor::F16($x) => $body,
            NumericTensor::U64($x) => $body,
            NumericTensor::I64($x) => $body,
            NumericTensor::U32($x) => $body,
            NumericTensor::I32($x) => $body,
            NumericTensor::U16($x) => $body,
            NumericTensor::I16($x) => $body,
            NumericTensor::U8($x) => $body,
            NumericTensor::I8($x) => $body,
            NumericTensor::BOOL($x) => $body,
        }
    };
}

pub trait NumericTensorType: Sized + DTypeOfPrimitive + Clone {
    fn numeric_tensor_from_ndarray(value: ArcArray<Self, IxDyn>) -> NumericTensor;
    fn numeric_tensor_inner(tensor: &NumericTensor) -> Result<&ArcArray<Self, IxDyn>, NumericTensorError>;
}

macro_rules! impl_numeric_tensor_type {
    ($a:ident, $b:ident) => {
        impl NumericTensorType for $a {
            fn numeric_tensor_from_ndarray(value: ArcArray<Self, IxDyn>) -> NumericTensor {
                NumericTensor::$b(value)
            }

            fn numeric_tensor_inner(tensor: &NumericTensor) -> Result<&ArcArray<Self, IxDyn>, NumericTensorError> {
                if let NumericTensor::$b(x) = tensor {
                    Ok(x)
                } else {
                    Err(NumericTensorError::WrongDTypeError(Self::DTYPE, tensor.dtype()))
                }
            }
        }
    };
}

impl_numeric_tensor_type!(f64, F64);
impl_numeric_tensor_type!(f32, F32);
impl_numeric_tensor_type!(bf16, BF16);
impl_numeric_tensor_type!(f16, F16);
impl_numeric_tensor_type!(u64, U64);
impl_numeric_tensor_type!(i64, I64);
impl_numeric_tensor_type!(u32, U32);
impl_numeric_tensor_type!(i32, I32);
impl_numeric_tensor_type!(u16, U16);
impl_numeric_tensor_type!(i16, I16);
impl_numeric_tensor_type!(u8, U8);
impl_numeric_tensor_type!(i8, I8);
impl_numeric_tensor_type!(bool, BOOL);

impl NumericTensor {
    pub fn from_vec<T: NumericTensorType>(v: Vec<T>) -> Self {
        T::numeric_tensor_from_ndarray(ArcArray::from_vec(v).into_dyn())
    }

    pub fn from_vec_shape<T: NumericTensorType>(v: Vec<T>, shape: &[usize]) -> Result<Self, NumericTensorError> {
        let x = ArcArray::from_shape_vec(IxDyn(shape), v)?;
        Ok(T::numeric_tensor_from_ndarray(x))
    }

    pub fn scalar<T: NumericTensorType>(v: T) -> Self {
        T::numeric_tensor_from_ndarray(ArcArray::from_elem(IxDyn(&[]), v))
    }

    pub fn as_inner<T: NumericTensorType>(&self) -> Result<&ArcArray<T, IxDyn>, NumericTensorError> {
        T::numeric_tensor_inner(self)
    }

    pub fn dtype(&self) -> DType {
        match self {
            NumericTensor::F64(_) => DType::F64,
            NumericTensor::F32(_) => DType::F32,
            NumericTensor::BF16(_) => DType::BF16,
            NumericTensor::F16(_) => DType::F16,
            NumericTensor::U64(_) => DType::U64,
            NumericTensor::I64(_) => DType::I64,
            NumericTensor::U32(_) => DType::U32,
            NumericTensor::I32(_) => DType::I32,
            NumericTensor::U16(_) => DType::U16,
            NumericTensor::I16(_) => DType::I16,
            NumericTensor::U8(_) => DType::U8,
            NumericTensor::I8(_) => DType::I8,
            NumericTensor::BOOL(_) => DType::BOOL,
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        for_each_variant!(self, x => x.shape().to_vec())
    }

    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    pub fn num_elements(&self) -> usize {
        for_each_variant!(self, x => x.len())
    }

    /// Renders the tensor the way `array2string` would for its element type.
    pub fn format_with(&self, options: &ArrayFormatOptions) -> String {
        for_each_variant!(self, x => array2string(x.view(), options))
    }
}

impl Display for NumericTensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_with(&ArrayFormatOptions::default()))
    }
}

impl<T: NumericTensorType> From<Vec<T>> for NumericTensor {
    fn from(value: Vec<T>) -> Self {
        NumericTensor::from_vec(value)
    }
}
