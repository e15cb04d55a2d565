use std::error::Error;
use std::fmt::{Display, Formatter};

use adclick_helpers::{stack_features, DataPoint, Float};

use ndarray::{Array1, ArrayView1};

/// Errors that can occur when training or using the logistic regression classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum LogisticError {
    /// Cannot fit a model without any training data
    EmptyTrainingSet,
    /// Training points (or a query point) disagree on the number of features
    DimensionMismatch { expected: usize, found: usize },
    /// The learning rate must be strictly positive
    InvalidLearningRate,
    /// At least one epoch is required
    InvalidEpochs,
    /// Training data contains only one class, so there is no boundary to learn
    SingleClass,
    /// Gradient descent produced non-finite parameters
    Diverged { epoch: usize },
}

impl Display for LogisticError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogisticError::EmptyTrainingSet => write!(f, "Cannot fit with an empty training set"),
            LogisticError::DimensionMismatch { expected, found } => write!(
                f,
                "Expected {} features but found {}",
                expected, found
            ),
            LogisticError::InvalidLearningRate => write!(f, "Learning rate must be positive"),
            LogisticError::InvalidEpochs => write!(f, "At least one training epoch is required"),
            LogisticError::SingleClass => {
                write!(f, "Training data must contain both classes")
            }
            LogisticError::Diverged { epoch } => write!(
                f,
                "Gradient descent diverged at epoch {} (try a smaller learning rate)",
                epoch
            ),
        }
    }
}

impl Error for LogisticError {}

/// Hyperparameters for [`LogisticRegression::fit`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingParams<F: Float> {
    /// Step size of each gradient descent update.
    pub learning_rate: F,
    /// Maximum number of full passes over the training data.
    pub epochs: usize,
    /// L2 penalty applied to the weights (not the bias).
    pub l2_penalty: F,
    /// Training stops early once every gradient component is below this value.
    pub tolerance: F,
}

impl<F: Float> Default for TrainingParams<F> {
    fn default() -> Self {
        Self {
            learning_rate: F::from_f64(0.5).unwrap_or_else(F::one),
            epochs: 5_000,
            l2_penalty: F::zero(),
            tolerance: F::from_f64(1e-6).unwrap_or_else(F::epsilon),
        }
    }
}

/// A binary logistic regression classifier.
///
/// The model scores a point with `w · x + b` and predicts `true` (label 1) when the
/// score is strictly positive, i.e. when the estimated click probability exceeds 0.5.
///
/// Training uses full-batch gradient descent on the mean log-loss, so the features
/// should be on comparable scales (see `adclick_helpers::MinMaxScaler`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct LogisticRegression<F: Float> {
    weights: Array1<F>,
    bias: F,
}

impl<F: Float> LogisticRegression<F> {
    /// Builds a model from already-learned parameters.
    pub fn from_parameters(weights: Array1<F>, bias: F) -> Self {
        Self { weights, bias }
    }

    /// Fits a model on labelled points, where `true` is the positive class.
    ///
    /// # Errors
    ///
    /// Returns `LogisticError::EmptyTrainingSet` if `data` is empty.
    /// Returns `LogisticError::DimensionMismatch` if the points differ in dimension.
    /// Returns `LogisticError::SingleClass` if every point carries the same label.
    /// Returns `LogisticError::Diverged` if the parameters stop being finite.
    pub fn fit(data: &[DataPoint<bool, F>], params: &TrainingParams<F>) -> Result<Self, LogisticError> {
        if params.learning_rate <= F::zero() || !params.learning_rate.is_finite() {
            return Err(LogisticError::InvalidLearningRate);
        }
        if params.epochs == 0 {
            return Err(LogisticError::InvalidEpochs);
        }
        let first = data.first().ok_or(LogisticError::EmptyTrainingSet)?;
        if let Some(bad) = data.iter().find(|p| p.n_features() != first.n_features()) {
            return Err(LogisticError::DimensionMismatch {
                expected: first.n_features(),
                found: bad.n_features(),
            });
        }
        if data.iter().all(|p| p.label == first.label) {
            return Err(LogisticError::SingleClass);
        }

        let x = stack_features(data).ok_or(LogisticError::EmptyTrainingSet)?;
        let y: Array1<F> = data
            .iter()
            .map(|p| if p.label { F::one() } else { F::zero() })
            .collect();
        let n = F::from_usize(data.len()).ok_or(LogisticError::EmptyTrainingSet)?;

        let mut weights: Array1<F> = Array1::zeros(x.ncols());
        let mut bias = F::zero();

        for epoch in 0..params.epochs {
            // 1. Predicted probabilities for the whole batch.
            let scores = x.dot(&weights) + bias;
            let residuals = scores.mapv(sigmoid) - &y;

            // 2. Gradient of the mean log-loss (plus the L2 term on the weights).
            let grad_w = x.t().dot(&residuals) / n + &weights * params.l2_penalty;
            let grad_b = residuals.sum() / n;

            // 3. Step downhill.
            weights.scaled_add(-params.learning_rate, &grad_w);
            bias -= params.learning_rate * grad_b;

            if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
                return Err(LogisticError::Diverged { epoch });
            }

            let largest = grad_w
                .iter()
                .fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if largest < params.tolerance {
                break;
            }
        }

        Ok(Self { weights, bias })
    }

    /// The raw score `w · x + b` for a point.
    pub fn decision_function(&self, features: ArrayView1<F>) -> Result<F, LogisticError> {
        if features.len() != self.weights.len() {
            return Err(LogisticError::DimensionMismatch {
                expected: self.weights.len(),
                found: features.len(),
            });
        }
        Ok(self.weights.dot(&features) + self.bias)
    }

    /// Probability that the point belongs to the positive class.
    pub fn predict_proba(&self, features: ArrayView1<F>) -> Result<F, LogisticError> {
        self.decision_function(features).map(sigmoid)
    }

    /// Predicts the label for a new point: `true` for the positive class.
    pub fn predict(&self, features: ArrayView1<F>) -> Result<bool, LogisticError> {
        Ok(self.decision_function(features)? > F::zero())
    }

    /// Fraction of `data` whose label is predicted correctly.
    pub fn accuracy(&self, data: &[DataPoint<bool, F>]) -> Result<F, LogisticError> {
        if data.is_empty() {
            return Err(LogisticError::EmptyTrainingSet);
        }
        let mut correct = 0usize;
        for point in data {
            if self.predict(point.features.view())? == point.label {
                correct += 1;
            }
        }
        let correct = F::from_usize(correct).ok_or(LogisticError::EmptyTrainingSet)?;
        let total = F::from_usize(data.len()).ok_or(LogisticError::EmptyTrainingSet)?;
        Ok(correct / total)
    }

    pub fn weights(&self) -> ArrayView1<'_, F> {
        self.weights.view()
    }

    pub fn bias(&self) -> F {
        self.bias
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }
}

/// Logistic function, written so that neither branch overflows.
pub fn sigmoid<F: Float>(z: F) -> F {
    if z >= F::zero() {
        F::one() / (F::one() + (-z).exp())
    } else {
        let e = z.exp();
        e / (F::one() + e)
    }
}
