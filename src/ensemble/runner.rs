//! Classifier ensemble: load once, predict many times.
//!
//! The runner owns one instance of each classifier for the lifetime of the
//! process (or until a reload swaps in a new runner, see `ensemble::store`).
//! Running it is pure computation: no I/O, no locks, no shared mutable state.

use std::time::Instant;

use rayon::prelude::*;

use crate::domain::{ArtifactPaths, EnsembleOutputs, ModelId, OrderedFeatureVector};
use crate::error::ModelLoadError;
use crate::io::artifacts::{load_forest, load_knn, load_network};
use crate::models::Classifier;

/// Description of one loaded classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub id: ModelId,
    pub detail: String,
}

#[derive(Debug)]
pub struct EnsembleRunner {
    models: Vec<Box<dyn Classifier>>,
}

impl EnsembleRunner {
    /// Build a runner from already-loaded classifiers.
    pub fn new(models: Vec<Box<dyn Classifier>>) -> Self {
        Self { models }
    }

    /// Load and validate all artifacts; fails on the first one that cannot be used.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ModelLoadError> {
        let started = Instant::now();

        let distance = load_knn(&paths.distance)?;
        tracing::info!(path = %paths.distance.display(), "loaded distance model");

        let tree = load_forest(&paths.tree_ensemble)?;
        tracing::info!(path = %paths.tree_ensemble.display(), "loaded tree ensemble");

        let network = load_network(&paths.neural_network, &paths.scaler)?;
        tracing::info!(
            path = %paths.neural_network.display(),
            scaler = %paths.scaler.display(),
            "loaded neural network"
        );

        tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "ensemble ready");
        Ok(Self::new(vec![
            Box::new(distance),
            Box::new(tree),
            Box::new(network),
        ]))
    }

    /// One raw label per classifier.
    pub fn run(&self, features: &OrderedFeatureVector) -> EnsembleOutputs {
        let outputs: EnsembleOutputs = self
            .models
            .iter()
            .map(|m| (m.id(), m.predict(features)))
            .collect();
        tracing::debug!(?outputs, "ensemble outputs");
        outputs
    }

    /// Evaluate many vectors in parallel, preserving input order.
    pub fn run_batch(&self, batch: &[OrderedFeatureVector]) -> Vec<EnsembleOutputs> {
        batch.par_iter().map(|x| self.run(x)).collect()
    }

    pub fn model_ids(&self) -> Vec<ModelId> {
        self.models.iter().map(|m| m.id()).collect()
    }

    pub fn describe(&self) -> Vec<ModelSummary> {
        self.models
            .iter()
            .map(|m| ModelSummary {
                id: m.id(),
                detail: m.summary(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FEATURE_COUNT, RawLabel};
    use crate::models::fixtures::{self, FixedClassifier};

    fn x(age: f64, glucose: f64) -> OrderedFeatureVector {
        let mut v = [0.0; FEATURE_COUNT];
        v[1] = age;
        v[7] = glucose;
        OrderedFeatureVector::from_model_order(v).unwrap()
    }

    #[test]
    fn loads_all_three_models() {
        let dir = tempfile::tempdir().unwrap();
        let paths = fixtures::write_artifacts(dir.path());
        let runner = EnsembleRunner::load(&paths).unwrap();
        assert_eq!(runner.model_ids(), ModelId::ALL.to_vec());

        let outputs = runner.run(&x(80.0, 240.0));
        assert_eq!(outputs.len(), 3);
        for id in ModelId::ALL {
            assert_eq!(outputs.get(id), Some(RawLabel::AT_RISK), "{id:?}");
        }

        let outputs = runner.run(&x(30.0, 90.0));
        for id in ModelId::ALL {
            assert_eq!(outputs.get(id), Some(RawLabel::NO_RISK), "{id:?}");
        }
    }

    #[test]
    fn demo_artifacts_load() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/artifacts");
        let runner = EnsembleRunner::load(&ArtifactPaths::from_dir(&dir)).unwrap();
        assert_eq!(runner.describe().len(), 3);

        let young = OrderedFeatureVector::from_model_order([
            0.0, 24.0, 0.0, 0.0, 0.0, 0.0, 0.0, 82.3, 21.7, 0.0,
        ])
        .unwrap();
        let old = OrderedFeatureVector::from_model_order([
            0.0, 79.0, 1.0, 1.0, 1.0, 3.0, 1.0, 188.0, 27.8, 1.0,
        ])
        .unwrap();
        assert_eq!(runner.run(&young).get(ModelId::TreeEnsemble), Some(RawLabel::NO_RISK));
        assert_eq!(runner.run(&old).get(ModelId::TreeEnsemble), Some(RawLabel::AT_RISK));
    }

    #[test]
    fn missing_artifact_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        let paths = fixtures::write_artifacts(dir.path());
        std::fs::remove_file(&paths.tree_ensemble).unwrap();
        let err = EnsembleRunner::load(&paths).unwrap_err();
        assert!(matches!(err, ModelLoadError::NotFound { .. }));
        assert_eq!(err.path(), paths.tree_ensemble.as_path());
    }

    #[test]
    fn batch_matches_single_runs() {
        let runner = EnsembleRunner::new(vec![
            Box::new(fixtures::knn()),
            Box::new(fixtures::forest()),
        ]);
        let batch: Vec<OrderedFeatureVector> = (0..50)
            .map(|i| x(20.0 + i as f64, 80.0 + 4.0 * i as f64))
            .collect();
        let parallel = runner.run_batch(&batch);
        let serial: Vec<EnsembleOutputs> = batch.iter().map(|b| runner.run(b)).collect();
        assert_eq!(parallel, serial);
    }

    #[test]
    fn outputs_are_keyed_by_model() {
        let runner = EnsembleRunner::new(vec![Box::new(FixedClassifier {
            id: ModelId::TreeEnsemble,
            label: RawLabel(1),
        })]);
        let outputs = runner.run(&x(1.0, 1.0));
        assert_eq!(outputs.get(ModelId::TreeEnsemble), Some(RawLabel(1)));
        assert_eq!(outputs.get(ModelId::Distance), None);
        assert_eq!(runner.describe()[0].detail, "fixed label 1");
    }
}
