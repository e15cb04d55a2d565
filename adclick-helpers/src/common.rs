use ndarray::{Array1, Array2};
use crate::Float;
use std::fmt::Debug;

/// Represents a single labelled observation.
///
/// L: The type of the label (e.g., bool, String, an enum).
/// F: The float type for the features (e.g., f32, f64).
#[derive(Debug, Clone)]
pub struct DataPoint<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub features: Array1<F>,
    pub label: L,
}

impl<L, F> DataPoint<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub fn new(features: Array1<F>, label: L) -> Self {
        DataPoint { features, label }
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }
}

/// Stacks the feature vectors of `points` into an `n_points x n_features` matrix.
///
/// Returns `None` if the slice is empty or the points disagree on their dimension.
pub fn stack_features<L, F>(points: &[DataPoint<L, F>]) -> Option<Array2<F>>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    let n_features = points.first()?.n_features();
    let mut matrix = Array2::zeros((points.len(), n_features));
    for (mut row, point) in matrix.rows_mut().into_iter().zip(points) {
        if point.n_features() != n_features {
            return None;
        }
        row.assign(&point.features);
    }
    Some(matrix)
}
