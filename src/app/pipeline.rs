//! Shared prediction pipeline used by every `stroke` subcommand.
//!
//! One submission flows through:
//! raw form map -> normalize -> remap -> ensemble -> policy -> presentation
//!
//! The front-ends only decide where submissions come from and where the
//! `PredictionOutcome`s go.

use rayon::prelude::*;

use crate::domain::{Decision, PolicyKind, PredictionOutcome, PredictorConfig, RawInputMap};
use crate::ensemble::{ArtifactStore, EnsembleRunner, ResolverPolicy, policy_from_config};
use crate::error::{AppError, ModelLoadError};
use crate::features::{normalize, remap};
use crate::report::present;

/// Loaded artifacts plus the decision policy: the context every request runs in.
#[derive(Debug)]
pub struct Predictor {
    store: ArtifactStore,
    policy: Box<dyn ResolverPolicy>,
}

impl Predictor {
    pub fn new(store: ArtifactStore, policy: Box<dyn ResolverPolicy>) -> Self {
        Self { store, policy }
    }

    /// Load the artifacts named in `config`. Fails before serving anything if
    /// any of them is unusable.
    pub fn from_config(config: &PredictorConfig) -> Result<Self, AppError> {
        let store = ArtifactStore::open(config.artifacts.clone())?;
        let policy = policy_from_config(config);
        tracing::info!(policy = ?policy.kind(), "predictor ready");
        Ok(Self::new(store, policy))
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy.kind()
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Re-read the artifacts; on failure the previous models stay in service.
    pub fn reload(&self) -> Result<(), ModelLoadError> {
        self.store.reload()
    }

    /// Run one submission through the whole pipeline.
    pub fn evaluate(&self, raw: &RawInputMap) -> PredictionOutcome {
        let runner = self.store.snapshot();
        self.evaluate_with(&runner, raw)
    }

    /// Evaluate many submissions in parallel against one snapshot.
    ///
    /// Results come back in input order.
    pub fn evaluate_batch(&self, raws: &[RawInputMap]) -> Vec<PredictionOutcome> {
        let runner = self.store.snapshot();
        raws.par_iter().map(|raw| self.evaluate_with(&runner, raw)).collect()
    }

    fn evaluate_with(&self, runner: &EnsembleRunner, raw: &RawInputMap) -> PredictionOutcome {
        let features = match normalize(raw) {
            Ok(features) => features,
            Err(err) => {
                tracing::warn!(error = %err, kind = ?err.kind(), "rejected submission");
                return PredictionOutcome {
                    decision: Decision::Error,
                    presentation: present(Decision::Error),
                    outputs: None,
                    error: Some(err),
                };
            }
        };

        let outputs = runner.run(&remap(&features));
        let decision = self.policy.resolve(&outputs);
        tracing::debug!(decision = decision.as_str(), "resolved");
        PredictionOutcome {
            decision,
            presentation: present(decision),
            outputs: Some(outputs),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtifactPaths, AssetKey, FEATURE_COUNT, FormField, ModelId, RawLabel};
    use crate::ensemble::{MajorityVote, TreeAuthoritative};
    use crate::error::NormalizationErrorKind;
    use crate::models::Classifier;
    use crate::models::fixtures::{self, FixedClassifier};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const PATIENT: [&str; FEATURE_COUNT] = [
        "67", "1", "0", "0", "1", "1", "228.69", "36.6", "0", "1",
    ];

    fn submission(values: &[&str]) -> RawInputMap {
        FormField::ALL
            .iter()
            .zip(values)
            .map(|(f, v)| (f.wire_name(), *v))
            .collect()
    }

    fn fixed_with(policy: Box<dyn ResolverPolicy>, labels: [i64; 3]) -> Predictor {
        let models = ModelId::ALL
            .into_iter()
            .zip(labels)
            .map(|(id, label)| {
                Box::new(FixedClassifier {
                    id,
                    label: RawLabel(label),
                }) as Box<dyn Classifier>
            })
            .collect();
        let store = ArtifactStore::with_runner(
            ArtifactPaths::from_dir(Path::new("unused")),
            EnsembleRunner::new(models),
        );
        Predictor::new(store, policy)
    }

    fn fixed(distance: i64, tree: i64, network: i64) -> Predictor {
        fixed_with(Box::new(TreeAuthoritative), [distance, tree, network])
    }

    #[test]
    fn tree_no_risk_shows_happy() {
        let outcome = fixed(1, 0, 1).evaluate(&submission(&PATIENT));
        assert_eq!(outcome.decision, Decision::NoRisk);
        assert_eq!(outcome.presentation.label_text, "No Risk of Stroke");
        assert_eq!(outcome.presentation.asset_key, AssetKey::Happy);
        assert_eq!(outcome.outputs.unwrap().len(), 3);
    }

    #[test]
    fn tree_risk_shows_sad() {
        let outcome = fixed(0, 1, 0).evaluate(&submission(&PATIENT));
        assert_eq!(outcome.decision, Decision::AtRisk);
        assert_eq!(outcome.presentation.label_text, "Risk of Stroke");
        assert_eq!(outcome.presentation.asset_key, AssetKey::Sad);
    }

    #[test]
    fn nine_fields_is_an_error() {
        let outcome = fixed(0, 1, 0).evaluate(&submission(&PATIENT[..9]));
        assert_eq!(outcome.decision, Decision::Error);
        assert_eq!(outcome.presentation, present(Decision::Error));
        assert_eq!(outcome.outputs, None);
        assert_eq!(outcome.error.unwrap().kind(), NormalizationErrorKind::WrongCount);
    }

    #[test]
    fn non_numeric_field_is_an_error() {
        let mut values = PATIENT;
        values[7] = "abc";
        let outcome = fixed(0, 1, 0).evaluate(&submission(&values));
        assert_eq!(outcome.decision, Decision::Error);
        assert_eq!(outcome.presentation.asset_key, AssetKey::Blank);
        assert_eq!(outcome.error.unwrap().kind(), NormalizationErrorKind::NotNumeric);
    }

    #[test]
    fn unexpected_tree_label_is_an_error() {
        let outcome = fixed(0, 7, 0).evaluate(&submission(&PATIENT));
        assert_eq!(outcome.decision, Decision::Error);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.outputs.unwrap().get(ModelId::TreeEnsemble), Some(RawLabel(7)));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let predictor = fixed(0, 1, 1);
        let raw = submission(&PATIENT);
        assert_eq!(predictor.evaluate(&raw), predictor.evaluate(&raw));
    }

    #[test]
    fn policy_is_pluggable() {
        let predictor = fixed_with(Box::new(MajorityVote), [1, 0, 1]);
        assert_eq!(predictor.policy(), PolicyKind::Majority);
        assert_eq!(predictor.evaluate(&submission(&PATIENT)).decision, Decision::AtRisk);
    }

    #[test]
    fn batch_preserves_order() {
        let predictor = fixed(0, 1, 0);
        let mut bad = PATIENT;
        bad[0] = "";
        let raws = vec![submission(&PATIENT), submission(&bad), submission(&PATIENT[..3])];
        let outcomes = predictor.evaluate_batch(&raws);
        let decisions: Vec<Decision> = outcomes.iter().map(|o| o.decision).collect();
        assert_eq!(decisions, vec![Decision::AtRisk, Decision::Error, Decision::Error]);
        assert_eq!(
            outcomes[1].error.as_ref().map(|e| e.kind()),
            Some(NormalizationErrorKind::MissingField)
        );
    }

    #[test]
    fn loads_real_artifacts_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let paths = fixtures::write_artifacts(dir.path());
        let predictor = Predictor::from_config(&PredictorConfig::new(paths)).unwrap();

        let mut values = PATIENT.map(str::to_string);
        values[7] = "25".to_string();
        values[9] = "80".to_string();
        let young: RawInputMap = FormField::ALL
            .iter()
            .zip(values)
            .map(|(f, v)| (f.wire_name(), v))
            .collect();
        assert_eq!(predictor.evaluate(&young).decision, Decision::NoRisk);
    }

    #[test]
    fn missing_artifacts_fail_with_load_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let config = PredictorConfig::new(ArtifactPaths::from_dir(dir.path()));
        let err = Predictor::from_config(&config).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_MODEL_LOAD);
    }
}
