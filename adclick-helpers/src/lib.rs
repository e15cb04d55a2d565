use ndarray::{NdFloat, ScalarOperand};
use num_traits::FromPrimitive;

use std::iter::Sum;

// Include submodules
mod common;
mod scaling;

// Re-export types from submodules
pub use common::{stack_features, DataPoint};
pub use scaling::{MinMaxScaler, ScalerError};

/// Floating point types usable as features throughout the workspace.
pub trait Float:
    NdFloat
    + FromPrimitive
    + Default
    + Sum
    + ScalarOperand
    + std::marker::Unpin
{
}

impl Float for f32 {}

impl Float for f64 {}
