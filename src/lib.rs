//! Facebook ads analytics: dataset loading, exploratory chart data and the
//! click prediction model used by the dashboard.

pub mod config;
pub mod dataset;
pub mod eda;
pub mod error;
pub mod model;

pub use config::{Config, DEFAULT_CONFIG_PATH};
pub use dataset::{AdRecord, Column, Dataset};
pub use eda::{EdaChart, EdaReport, Insight};
pub use error::{DashboardError, Result};
pub use model::{ClickModel, TrainingReport, Verdict, LIKELY_MESSAGE, NOT_LIKELY_MESSAGE};
