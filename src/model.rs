//! The click prediction model artifact.
//!
//! A trained [`ClickModel`] bundles the min-max scaler fitted on the training rows with
//! the logistic regression learned on the scaled features. It is persisted as JSON and
//! loaded by the dashboard, which only ever calls [`ClickModel::predict`].

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use adclick_helpers::{DataPoint, MinMaxScaler};
use logistic_regression::{LogisticRegression, TrainingParams};
use ndarray::{array, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TrainingConfig;
use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};

/// Shown when the classifier returns label 1.
pub const LIKELY_MESSAGE: &str = "✔ The user is LIKELY to click the ad.";
/// Shown for any other label.
pub const NOT_LIKELY_MESSAGE: &str = "✖ The user is NOT likely to click the ad.";

/// Inputs of a prediction: time on site and salary.
const N_FEATURES: usize = 2;

/// Outcome of a prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    LikelyToClick,
    NotLikelyToClick,
}

impl Verdict {
    pub fn from_label(clicked: bool) -> Self {
        if clicked {
            Verdict::LikelyToClick
        } else {
            Verdict::NotLikelyToClick
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Verdict::LikelyToClick => LIKELY_MESSAGE,
            Verdict::NotLikelyToClick => NOT_LIKELY_MESSAGE,
        }
    }

    pub fn is_likely(self) -> bool {
        self == Verdict::LikelyToClick
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// How the artifact was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_accuracy: f64,
    /// `None` when no rows were held out.
    pub test_accuracy: Option<f64>,
}

/// Scaler plus classifier, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickModel {
    scaler: MinMaxScaler<f64>,
    classifier: LogisticRegression<f64>,
    report: TrainingReport,
}

impl ClickModel {
    /// Assembles a model from already-fitted parts.
    pub fn new(
        scaler: MinMaxScaler<f64>,
        classifier: LogisticRegression<f64>,
        report: TrainingReport,
    ) -> Self {
        Self {
            scaler,
            classifier,
            report,
        }
    }

    /// Trains on `dataset`, holding out `config.test_fraction` of the rows.
    ///
    /// The scaler only sees the training rows, so the held-out accuracy is honest.
    pub fn train(dataset: &Dataset, config: &TrainingConfig) -> Result<Self> {
        if !(0.0..1.0).contains(&config.test_fraction) {
            return Err(DashboardError::Training {
                message: format!(
                    "test_fraction must be in [0, 1), got {}",
                    config.test_fraction
                ),
            });
        }

        let points = dataset.to_data_points();
        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        order.shuffle(&mut rng);

        let n_test = (points.len() as f64 * config.test_fraction).floor() as usize;
        let (test_idx, train_idx) = order.split_at(n_test);
        let train: Vec<DataPoint<bool, f64>> = train_idx.iter().map(|&i| points[i].clone()).collect();
        let test: Vec<DataPoint<bool, f64>> = test_idx.iter().map(|&i| points[i].clone()).collect();

        let train_matrix = stack_rows(&train);
        let scaler = MinMaxScaler::fit(train_matrix.view())?;
        let train_scaled = scale_points(&scaler, &train)?;
        let test_scaled = scale_points(&scaler, &test)?;

        let params = TrainingParams {
            learning_rate: config.learning_rate,
            epochs: config.epochs,
            l2_penalty: config.l2_penalty,
            tolerance: config.tolerance,
        };
        let classifier = LogisticRegression::fit(&train_scaled, &params)?;

        let train_accuracy = classifier.accuracy(&train_scaled)?;
        let test_accuracy = if test_scaled.is_empty() {
            None
        } else {
            Some(classifier.accuracy(&test_scaled)?)
        };
        let report = TrainingReport {
            train_rows: train_scaled.len(),
            test_rows: test_scaled.len(),
            train_accuracy,
            test_accuracy,
        };
        info!(
            train_rows = report.train_rows,
            test_rows = report.test_rows,
            train_accuracy = report.train_accuracy,
            test_accuracy = ?report.test_accuracy,
            "trained click model"
        );

        Ok(Self::new(scaler, classifier, report))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DashboardError::io(path, e))?;
        let model: ClickModel =
            serde_json::from_str(&content).map_err(|source| DashboardError::Artifact {
                path: path.to_path_buf(),
                source,
            })?;
        model
            .check_shape()
            .map_err(|message| DashboardError::InvalidArtifact {
                path: path.to_path_buf(),
                message,
            })?;
        info!(path = %path.display(), "loaded click model");
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|source| DashboardError::Artifact {
                path: path.to_path_buf(),
                source,
            })?;
        fs::write(path, content).map_err(|e| DashboardError::io(path, e))?;
        info!(path = %path.display(), "saved click model");
        Ok(())
    }

    /// Predicts whether a viewer with these inputs clicks. Inputs are not range-checked.
    pub fn predict(&self, time_spent: f64, salary: f64) -> Result<Verdict> {
        let scaled = self.scaler.transform(array![time_spent, salary].view())?;
        let clicked = self.classifier.predict(scaled.view())?;
        debug!(time_spent, salary, clicked, "prediction");
        Ok(Verdict::from_label(clicked))
    }

    /// A deserialized artifact must scale and classify exactly the two inputs.
    fn check_shape(&self) -> std::result::Result<(), String> {
        self.scaler.validate().map_err(|e| e.to_string())?;
        if self.scaler.n_features() != N_FEATURES {
            return Err(format!(
                "scaler expects {} features, not {}",
                self.scaler.n_features(),
                N_FEATURES
            ));
        }
        if self.classifier.n_features() != N_FEATURES {
            return Err(format!(
                "classifier expects {} features, not {}",
                self.classifier.n_features(),
                N_FEATURES
            ));
        }
        let finite = self.classifier.bias().is_finite()
            && self.classifier.weights().iter().all(|w| w.is_finite());
        if !finite {
            return Err("classifier parameters are not finite".to_string());
        }
        Ok(())
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn scaler(&self) -> &MinMaxScaler<f64> {
        &self.scaler
    }

    pub fn classifier(&self) -> &LogisticRegression<f64> {
        &self.classifier
    }
}

fn stack_rows(points: &[DataPoint<bool, f64>]) -> Array2<f64> {
    adclick_helpers::stack_features(points).unwrap_or_else(|| Array2::zeros((0, 2)))
}

fn scale_points(
    scaler: &MinMaxScaler<f64>,
    points: &[DataPoint<bool, f64>],
) -> Result<Vec<DataPoint<bool, f64>>> {
    points
        .iter()
        .map(|p| Ok(DataPoint::new(scaler.transform(p.features.view())?, p.label)))
        .collect()
}
