//! Decision policies: combine ensemble outputs into one `Decision`.
//!
//! Every policy is total: any combination of labels (including missing models
//! and codes outside `{0, 1}`) maps to exactly one decision, and nothing here
//! returns an error or panics.
//!
//! The default policy (`TreeAuthoritative`) lets the tree ensemble decide alone;
//! the distance and neural-network labels are still computed and reported. The
//! other policies exist so that choice can be revisited through configuration.

use std::collections::BTreeMap;

use crate::domain::{Decision, EnsembleOutputs, ModelId, PolicyKind, PredictorConfig, RawLabel};

/// Strategy for turning per-model labels into a decision.
pub trait ResolverPolicy: Send + Sync + std::fmt::Debug {
    fn resolve(&self, outputs: &EnsembleOutputs) -> Decision;

    fn kind(&self) -> PolicyKind;
}

fn from_label(label: RawLabel) -> Decision {
    match label.0 {
        0 => Decision::NoRisk,
        1 => Decision::AtRisk,
        _ => Decision::Error,
    }
}

/// All labels, or `None` if there are none or any is outside `{0, 1}`.
fn binary_labels(outputs: &EnsembleOutputs) -> Option<Vec<(ModelId, bool)>> {
    if outputs.is_empty() {
        return None;
    }
    outputs
        .iter()
        .map(|(id, label)| label.is_binary().then_some((id, label == RawLabel::AT_RISK)))
        .collect()
}

/// The tree ensemble's label is the decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeAuthoritative;

impl ResolverPolicy for TreeAuthoritative {
    fn resolve(&self, outputs: &EnsembleOutputs) -> Decision {
        outputs
            .get(ModelId::TreeEnsemble)
            .map_or(Decision::Error, from_label)
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Tree
    }
}

/// More risk votes than no-risk votes; a tie counts as at-risk.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityVote;

impl ResolverPolicy for MajorityVote {
    fn resolve(&self, outputs: &EnsembleOutputs) -> Decision {
        let Some(labels) = binary_labels(outputs) else {
            return Decision::Error;
        };
        let risk = labels.iter().filter(|(_, r)| *r).count();
        if risk * 2 >= labels.len() {
            Decision::AtRisk
        } else {
            Decision::NoRisk
        }
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Majority
    }
}

/// At-risk only when every model agrees on risk.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unanimous;

impl ResolverPolicy for Unanimous {
    fn resolve(&self, outputs: &EnsembleOutputs) -> Decision {
        match binary_labels(outputs) {
            None => Decision::Error,
            Some(labels) if labels.iter().all(|(_, r)| *r) => Decision::AtRisk,
            Some(_) => Decision::NoRisk,
        }
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Unanimous
    }
}

/// At-risk when at least one model reports risk.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyRisk;

impl ResolverPolicy for AnyRisk {
    fn resolve(&self, outputs: &EnsembleOutputs) -> Decision {
        match binary_labels(outputs) {
            None => Decision::Error,
            Some(labels) if labels.iter().any(|(_, r)| *r) => Decision::AtRisk,
            Some(_) => Decision::NoRisk,
        }
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Any
    }
}

/// Weighted share of risk votes compared against `threshold`.
#[derive(Debug, Clone)]
pub struct WeightedVote {
    weights: BTreeMap<ModelId, f64>,
    threshold: f64,
}

impl WeightedVote {
    /// Models without an explicit weight count 1.0. Negative or non-finite
    /// weights are treated as 0.
    pub fn new(weights: BTreeMap<ModelId, f64>, threshold: f64) -> Self {
        Self { weights, threshold }
    }

    fn weight(&self, id: ModelId) -> f64 {
        match self.weights.get(&id) {
            Some(w) if w.is_finite() && *w > 0.0 => *w,
            Some(_) => 0.0,
            None => 1.0,
        }
    }
}

impl ResolverPolicy for WeightedVote {
    fn resolve(&self, outputs: &EnsembleOutputs) -> Decision {
        let Some(labels) = binary_labels(outputs) else {
            return Decision::Error;
        };
        let total: f64 = labels.iter().map(|(id, _)| self.weight(*id)).sum();
        if total <= 0.0 {
            return Decision::Error;
        }
        let risk: f64 = labels
            .iter()
            .filter(|(_, r)| *r)
            .map(|(id, _)| self.weight(*id))
            .sum();
        if risk / total >= self.threshold {
            Decision::AtRisk
        } else {
            Decision::NoRisk
        }
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Weighted
    }
}

/// Build the policy selected in the configuration.
pub fn policy_from_config(config: &PredictorConfig) -> Box<dyn ResolverPolicy> {
    match config.policy {
        PolicyKind::Tree => Box::new(TreeAuthoritative),
        PolicyKind::Majority => Box::new(MajorityVote),
        PolicyKind::Unanimous => Box::new(Unanimous),
        PolicyKind::Any => Box::new(AnyRisk),
        PolicyKind::Weighted => Box::new(WeightedVote::new(config.weights.clone(), config.threshold)),
    }
}

/// Resolve with the default (tree-authoritative) policy.
pub fn resolve(outputs: &EnsembleOutputs) -> Decision {
    TreeAuthoritative.resolve(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArtifactPaths;

    const CODES: [i64; 3] = [0, 1, 2];

    fn outputs(distance: i64, tree: i64, network: i64) -> EnsembleOutputs {
        [
            (ModelId::Distance, RawLabel(distance)),
            (ModelId::TreeEnsemble, RawLabel(tree)),
            (ModelId::NeuralNetwork, RawLabel(network)),
        ]
        .into_iter()
        .collect()
    }

    fn all_policies() -> Vec<Box<dyn ResolverPolicy>> {
        let mut weights = BTreeMap::new();
        weights.insert(ModelId::TreeEnsemble, 2.0);
        vec![
            Box::new(TreeAuthoritative),
            Box::new(MajorityVote),
            Box::new(Unanimous),
            Box::new(AnyRisk),
            Box::new(WeightedVote::new(weights, 0.5)),
        ]
    }

    #[test]
    fn tree_label_is_authoritative() {
        for d in CODES {
            for n in CODES {
                assert_eq!(resolve(&outputs(d, 0, n)), Decision::NoRisk);
                assert_eq!(resolve(&outputs(d, 1, n)), Decision::AtRisk);
                assert_eq!(resolve(&outputs(d, 2, n)), Decision::Error);
            }
        }
    }

    #[test]
    fn every_policy_is_total_over_label_triples() {
        for policy in all_policies() {
            for d in CODES {
                for t in CODES {
                    for n in CODES {
                        let decision = policy.resolve(&outputs(d, t, n));
                        let invalid = [d, t, n].iter().any(|c| *c > 1);
                        if invalid && policy.kind() != PolicyKind::Tree {
                            assert_eq!(decision, Decision::Error, "{:?} {d}{t}{n}", policy.kind());
                        }
                    }
                }
            }
            assert_eq!(policy.resolve(&EnsembleOutputs::new()), Decision::Error);
        }
    }

    #[test]
    fn negative_and_huge_codes_are_errors() {
        assert_eq!(resolve(&outputs(0, -1, 0)), Decision::Error);
        assert_eq!(resolve(&outputs(0, i64::MAX, 0)), Decision::Error);
    }

    #[test]
    fn majority_vote() {
        assert_eq!(MajorityVote.resolve(&outputs(1, 0, 1)), Decision::AtRisk);
        assert_eq!(MajorityVote.resolve(&outputs(0, 1, 0)), Decision::NoRisk);
        let tie: EnsembleOutputs = [
            (ModelId::Distance, RawLabel(1)),
            (ModelId::TreeEnsemble, RawLabel(0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(MajorityVote.resolve(&tie), Decision::AtRisk);
    }

    #[test]
    fn unanimous_and_any() {
        assert_eq!(Unanimous.resolve(&outputs(1, 1, 1)), Decision::AtRisk);
        assert_eq!(Unanimous.resolve(&outputs(1, 1, 0)), Decision::NoRisk);
        assert_eq!(AnyRisk.resolve(&outputs(0, 0, 1)), Decision::AtRisk);
        assert_eq!(AnyRisk.resolve(&outputs(0, 0, 0)), Decision::NoRisk);
    }

    #[test]
    fn weighted_vote_uses_weights_and_threshold() {
        let mut weights = BTreeMap::new();
        weights.insert(ModelId::TreeEnsemble, 2.0);
        let policy = WeightedVote::new(weights.clone(), 0.5);
        // tree alone carries 2 of 4
        assert_eq!(policy.resolve(&outputs(0, 1, 0)), Decision::AtRisk);
        assert_eq!(policy.resolve(&outputs(1, 0, 0)), Decision::NoRisk);

        let strict = WeightedVote::new(weights, 0.75);
        assert_eq!(strict.resolve(&outputs(0, 1, 0)), Decision::NoRisk);
        assert_eq!(strict.resolve(&outputs(1, 1, 0)), Decision::AtRisk);
    }

    #[test]
    fn weighted_vote_with_no_weight_is_error() {
        let weights: BTreeMap<ModelId, f64> = ModelId::ALL.iter().map(|id| (*id, 0.0)).collect();
        let policy = WeightedVote::new(weights, 0.5);
        assert_eq!(policy.resolve(&outputs(1, 1, 1)), Decision::Error);
    }

    #[test]
    fn config_selects_policy() {
        let mut config = PredictorConfig::new(ArtifactPaths::from_dir(std::path::Path::new("m")));
        assert_eq!(policy_from_config(&config).kind(), PolicyKind::Tree);
        config.policy = PolicyKind::Weighted;
        assert_eq!(policy_from_config(&config).kind(), PolicyKind::Weighted);
    }
}
