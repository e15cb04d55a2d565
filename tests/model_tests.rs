use adclick::eda::EdaReport;
use adclick::{
    AdRecord, ClickModel, Config, DashboardError, Dataset, Verdict, LIKELY_MESSAGE,
    NOT_LIKELY_MESSAGE,
};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Long visits click, short visits don't; salary is noise.
fn synthetic_dataset() -> Dataset {
    let mut records = Vec::new();
    for i in 0..50 {
        let step = i as f64;
        records.push(AdRecord {
            time_spent: 5.0 + step * 0.4,
            salary: 20_000.0 + (step * 7_919.0) % 60_000.0,
            clicked: false,
        });
        records.push(AdRecord {
            time_spent: 35.0 + step * 0.4,
            salary: 20_000.0 + (step * 6_007.0) % 60_000.0,
            clicked: true,
        });
    }
    Dataset::from_records(records, "synthetic").unwrap()
}

#[test]
fn test_train_save_load_predict() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("my_model.json");
    let mut config = Config::default();
    config.training.learning_rate = 1.0;

    let model = ClickModel::train(&synthetic_dataset(), &config.training).unwrap();
    model.save(&path).unwrap();
    let loaded = ClickModel::load(&path).unwrap();

    assert_eq!(loaded, model);
    assert_eq!(loaded.predict(50.0, 40_000.0).unwrap(), Verdict::LikelyToClick);
    assert_eq!(loaded.predict(8.0, 40_000.0).unwrap(), Verdict::NotLikelyToClick);
    assert!(loaded.report().train_accuracy > 0.95);
}

#[test]
fn test_every_input_maps_to_exactly_one_message() {
    let mut config = Config::default();
    config.training.learning_rate = 1.0;
    let model = ClickModel::train(&synthetic_dataset(), &config.training).unwrap();

    for time in [-10.0, 0.0, 20.0, 40.0, 1e6] {
        for salary in [-5_000.0, 0.0, 55_000.0, 1e9] {
            let message = model.predict(time, salary).unwrap().to_string();
            let matches = [LIKELY_MESSAGE, NOT_LIKELY_MESSAGE]
                .iter()
                .filter(|m| **m == message)
                .count();
            assert_eq!(matches, 1, "time={time} salary={salary}");
        }
    }
}

#[test]
fn test_request_scaling_uses_training_statistics() {
    let mut config = Config::default();
    config.training.learning_rate = 1.0;
    let model = ClickModel::train(&synthetic_dataset(), &config.training).unwrap();

    // a scaler re-fitted on the request would give the same answer for every input
    let short = model.predict(6.0, 30_000.0).unwrap();
    let long = model.predict(50.0, 30_000.0).unwrap();
    assert_ne!(short, long);
    assert!(model.scaler().data_max()[0] > model.scaler().data_min()[0]);
}

#[test]
fn test_corrupt_artifact_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("my_model.json");
    fs::write(&path, "{\"not\": \"a model\"}").unwrap();
    let err = ClickModel::load(&path).unwrap_err();
    assert!(matches!(err, DashboardError::Artifact { .. }));
}

/// Saves a trained model, lets `edit` rewrite its JSON, and writes it back.
fn write_edited_artifact(path: &Path, edit: impl FnOnce(&mut Value)) {
    let mut config = Config::default();
    config.training.learning_rate = 1.0;
    let model = ClickModel::train(&synthetic_dataset(), &config.training).unwrap();
    model.save(path).unwrap();

    let mut artifact: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    edit(&mut artifact);
    fs::write(path, serde_json::to_string(&artifact).unwrap()).unwrap();
}

fn three_values() -> Value {
    json!({"v": 1, "dim": [3], "data": [0.0, 1.0, 2.0]})
}

#[test]
fn test_mismatched_scaler_bounds_fail_to_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("my_model.json");
    write_edited_artifact(&path, |artifact| {
        artifact["scaler"]["data_max"] = three_values();
    });

    let err = ClickModel::load(&path).unwrap_err();
    assert!(matches!(err, DashboardError::InvalidArtifact { .. }), "{err:?}");
}

#[test]
fn test_three_feature_artifact_fails_to_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("my_model.json");
    write_edited_artifact(&path, |artifact| {
        artifact["scaler"]["data_min"] = three_values();
        artifact["scaler"]["data_max"] = three_values();
        artifact["classifier"]["weights"] = three_values();
    });

    let err = ClickModel::load(&path).unwrap_err();
    assert!(matches!(err, DashboardError::InvalidArtifact { .. }), "{err:?}");
}

#[test]
fn test_inverted_feature_range_fails_to_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("my_model.json");
    write_edited_artifact(&path, |artifact| {
        artifact["scaler"]["feature_range"] = json!([1.0, 0.0]);
    });

    let err = ClickModel::load(&path).unwrap_err();
    assert!(matches!(err, DashboardError::InvalidArtifact { .. }), "{err:?}");
}

#[test]
fn test_all_eda_charts_build_for_the_dataset() {
    let report = EdaReport::build(&synthetic_dataset());
    assert_eq!(report.scatter.groups.len(), 2);
    assert!(report.scatter.groups.iter().all(|g| g.trendline.is_some()));
    assert_eq!(report.histogram.counts.len(), 2);
    assert_eq!(report.pie.slices.len(), 2);
    assert_eq!(report.violin.violins.len(), 2);
}
