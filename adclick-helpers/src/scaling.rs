use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::Float;

/// Errors that can occur when fitting or applying a [`MinMaxScaler`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScalerError {
    /// Cannot fit a scaler on zero rows or zero columns
    EmptyData,
    /// The requested output range is empty or inverted
    InvalidRange,
    /// The input does not have the number of features the scaler was fitted on
    DimensionMismatch { expected: usize, found: usize },
}

impl Display for ScalerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalerError::EmptyData => write!(f, "Cannot fit a scaler on empty data"),
            ScalerError::InvalidRange => {
                write!(f, "Feature range minimum must be strictly below its maximum")
            }
            ScalerError::DimensionMismatch { expected, found } => write!(
                f,
                "Expected {} features but the input has {}",
                expected, found
            ),
        }
    }
}

impl Error for ScalerError {}

/// Rescales each feature independently into `feature_range`.
///
/// The per-column minimum and maximum are learned by [`MinMaxScaler::fit`] and then
/// reused for every call to [`MinMaxScaler::transform`]. Values outside the fitted
/// range are extrapolated linearly, not clipped.
///
/// A column whose minimum equals its maximum is mapped to the lower bound of the range.
/// In particular, fitting on a single row collapses every feature of that row to the
/// lower bound, so the scaler should be fitted on a representative sample.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct MinMaxScaler<F: Float> {
    feature_range: (F, F),
    data_min: Array1<F>,
    data_max: Array1<F>,
}

impl<F: Float> MinMaxScaler<F> {
    /// Fits a scaler mapping each column of `data` into `[0, 1]`.
    pub fn fit(data: ArrayView2<F>) -> Result<Self, ScalerError> {
        Self::fit_with_range(data, (F::zero(), F::one()))
    }

    /// Fits a scaler mapping each column of `data` into `feature_range`.
    ///
    /// # Errors
    ///
    /// Returns `ScalerError::InvalidRange` if `feature_range.0 >= feature_range.1`.
    /// Returns `ScalerError::EmptyData` if `data` has no rows or no columns.
    pub fn fit_with_range(data: ArrayView2<F>, feature_range: (F, F)) -> Result<Self, ScalerError> {
        if !(feature_range.0 < feature_range.1) {
            return Err(ScalerError::InvalidRange);
        }
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(ScalerError::EmptyData);
        }

        let data_min = data.fold_axis(Axis(0), F::infinity(), |&acc, &x| acc.min(x));
        let data_max = data.fold_axis(Axis(0), F::neg_infinity(), |&acc, &x| acc.max(x));

        Ok(Self {
            feature_range,
            data_min,
            data_max,
        })
    }

    /// Scales a single feature vector.
    pub fn transform(&self, features: ArrayView1<F>) -> Result<Array1<F>, ScalerError> {
        self.check_dimension(features.len())?;
        let (scale, offset) = self.scale_and_offset();
        Ok(&features * &scale + &offset)
    }

    /// Scales every row of a feature matrix.
    pub fn transform_rows(&self, data: ArrayView2<F>) -> Result<Array2<F>, ScalerError> {
        self.check_dimension(data.ncols())?;
        let (scale, offset) = self.scale_and_offset();
        Ok(&data * &scale + &offset)
    }

    pub fn n_features(&self) -> usize {
        self.data_min.len()
    }

    pub fn data_min(&self) -> ArrayView1<'_, F> {
        self.data_min.view()
    }

    pub fn data_max(&self) -> ArrayView1<'_, F> {
        self.data_max.view()
    }

    pub fn feature_range(&self) -> (F, F) {
        self.feature_range
    }

    /// Checks that the fitted state is usable, e.g. after deserializing it.
    ///
    /// # Errors
    ///
    /// Returns `ScalerError::InvalidRange` if the output range is empty or inverted.
    /// Returns `ScalerError::EmptyData` if no feature was fitted.
    /// Returns `ScalerError::DimensionMismatch` if the minima and maxima differ in length.
    pub fn validate(&self) -> Result<(), ScalerError> {
        if !(self.feature_range.0 < self.feature_range.1) {
            return Err(ScalerError::InvalidRange);
        }
        if self.data_min.is_empty() {
            return Err(ScalerError::EmptyData);
        }
        if self.data_max.len() != self.data_min.len() {
            return Err(ScalerError::DimensionMismatch {
                expected: self.data_min.len(),
                found: self.data_max.len(),
            });
        }
        Ok(())
    }

    fn check_dimension(&self, found: usize) -> Result<(), ScalerError> {
        self.validate()?;
        if found != self.n_features() {
            return Err(ScalerError::DimensionMismatch {
                expected: self.n_features(),
                found,
            });
        }
        Ok(())
    }

    /// `x_scaled = x * scale + offset`, per feature.
    fn scale_and_offset(&self) -> (Array1<F>, Array1<F>) {
        let (lo, hi) = self.feature_range;
        let mut scale = Array1::zeros(self.n_features());
        // constant columns get a unit span so they land on `lo`
        Zip::from(&mut scale)
            .and(&self.data_min)
            .and(&self.data_max)
            .for_each(|s, &min, &max| {
                let span = max - min;
                let span = if span == F::zero() { F::one() } else { span };
                *s = (hi - lo) / span;
            });
        let offset = -(&self.data_min * &scale) + lo;
        (scale, offset)
    }
}
