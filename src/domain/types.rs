//! Shared domain types.
//!
//! These types follow one submission through the pipeline:
//!
//! - `RawInputMap` as handed over by the form layer
//! - `FeatureVector` (submission order) and `OrderedFeatureVector` (model order)
//! - `EnsembleOutputs` with one `RawLabel` per classifier
//! - `Decision` and the user-facing `PresentationState`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::NormalizationError;

/// Number of fields a complete submission carries.
pub const FEATURE_COUNT: usize = 10;

/// One field of the health-attribute form.
///
/// Variants are declared in submission order; `FormField::ALL[i]` is the field
/// whose value lands at index `i` of a `FeatureVector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Gender,
    Hypertension,
    HeartDisease,
    EverMarried,
    SmokingStatus,
    ResidenceType,
    WorkType,
    Age,
    Bmi,
    Glucose,
}

impl FormField {
    /// All fields in submission order.
    pub const ALL: [FormField; FEATURE_COUNT] = [
        FormField::Gender,
        FormField::Hypertension,
        FormField::HeartDisease,
        FormField::EverMarried,
        FormField::SmokingStatus,
        FormField::ResidenceType,
        FormField::WorkType,
        FormField::Age,
        FormField::Bmi,
        FormField::Glucose,
    ];

    /// Name the form layer submits this field under.
    pub fn wire_name(self) -> &'static str {
        match self {
            FormField::Gender => "gender",
            FormField::Hypertension => "hypertension",
            FormField::HeartDisease => "heartDisease",
            FormField::EverMarried => "everMarried",
            FormField::SmokingStatus => "smokingStatus",
            FormField::ResidenceType => "residenceType",
            FormField::WorkType => "workType",
            FormField::Age => "age",
            FormField::Bmi => "bmi",
            FormField::Glucose => "glucose",
        }
    }

    /// Alternative spellings accepted on input (snake_case exports, training column names).
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            FormField::HeartDisease => &["heart_disease"],
            FormField::EverMarried => &["ever_married"],
            FormField::SmokingStatus => &["smoking_status"],
            FormField::ResidenceType => &["residence_type", "Residence_type"],
            FormField::WorkType => &["work_type"],
            FormField::Glucose => &["avg_glucose_level"],
            FormField::Gender | FormField::Hypertension | FormField::Age | FormField::Bmi => &[],
        }
    }

    pub fn matches(self, name: &str) -> bool {
        let name = name.trim();
        name == self.wire_name() || self.aliases().contains(&name)
    }

    pub fn from_name(name: &str) -> Option<FormField> {
        FormField::ALL.into_iter().find(|f| f.matches(name))
    }

    /// Index of this field in submission order.
    pub fn submission_index(self) -> usize {
        self as usize
    }
}

/// Raw form data: field name to submitted string, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputMap {
    entries: Vec<(String, String)>,
}

impl RawInputMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing (in place) any earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a form field by its wire name or any alias.
    pub fn get_field(&self, field: FormField) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| field.matches(n))
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawInputMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RawInputMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Normalized submission values in submission order.
///
/// Always exactly `FEATURE_COUNT` finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Returns `None` if any value is not finite.
    pub fn new(values: [f64; FEATURE_COUNT]) -> Option<Self> {
        values.iter().all(|v| v.is_finite()).then_some(Self(values))
    }

    /// Values that came out of another validated vector.
    pub(crate) fn from_validated(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, field: FormField) -> f64 {
        self.0[field.submission_index()]
    }
}

/// Feature values in the order the classifiers were trained on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedFeatureVector([f64; FEATURE_COUNT]);

impl OrderedFeatureVector {
    /// Wrap values that are already in model order.
    ///
    /// Returns `None` if any value is not finite.
    pub fn from_model_order(values: [f64; FEATURE_COUNT]) -> Option<Self> {
        values.iter().all(|v| v.is_finite()).then_some(Self(values))
    }

    pub(crate) fn from_permuted(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// A single classifier's class prediction.
///
/// Well-formed artifacts emit `0` (no elevated risk) or `1` (elevated risk); any
/// other code is carried through so the resolver can reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawLabel(pub i64);

impl RawLabel {
    pub const NO_RISK: RawLabel = RawLabel(0);
    pub const AT_RISK: RawLabel = RawLabel(1);

    pub fn is_binary(self) -> bool {
        matches!(self.0, 0 | 1)
    }
}

impl std::fmt::Display for RawLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a classifier in the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    Distance,
    TreeEnsemble,
    NeuralNetwork,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [ModelId::Distance, ModelId::TreeEnsemble, ModelId::NeuralNetwork];

    pub fn name(self) -> &'static str {
        match self {
            ModelId::Distance => "distance",
            ModelId::TreeEnsemble => "tree_ensemble",
            ModelId::NeuralNetwork => "neural_network",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelId::Distance => "k-nearest neighbors",
            ModelId::TreeEnsemble => "random forest",
            ModelId::NeuralNetwork => "neural network",
        }
    }
}

/// Raw labels from every classifier that ran for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnsembleOutputs {
    labels: BTreeMap<ModelId, RawLabel>,
}

impl EnsembleOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: ModelId, label: RawLabel) {
        self.labels.insert(model, label);
    }

    pub fn get(&self, model: ModelId) -> Option<RawLabel> {
        self.labels.get(&model).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelId, RawLabel)> + '_ {
        self.labels.iter().map(|(m, l)| (*m, *l))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<(ModelId, RawLabel)> for EnsembleOutputs {
    fn from_iter<I: IntoIterator<Item = (ModelId, RawLabel)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

/// Resolved risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    NoRisk,
    AtRisk,
    Error,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::NoRisk => "no_risk",
            Decision::AtRisk => "at_risk",
            Decision::Error => "error",
        }
    }
}

/// Illustrative image shown next to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKey {
    Happy,
    Sad,
    Blank,
}

impl AssetKey {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKey::Happy => "happy",
            AssetKey::Sad => "sad",
            AssetKey::Blank => "blank",
        }
    }
}

/// What the rendering layer displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationState {
    pub label_text: String,
    pub asset_key: AssetKey,
}

/// Everything computed for one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub decision: Decision,
    pub presentation: PresentationState,
    /// Per-model labels; `None` when the submission never reached the ensemble.
    pub outputs: Option<EnsembleOutputs>,
    /// Why the submission was rejected, if it was.
    pub error: Option<NormalizationError>,
}

/// How ensemble outputs are combined into a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// The tree ensemble's label decides; other models are informational.
    Tree,
    /// Simple majority of binary labels; ties count as at-risk.
    Majority,
    /// At-risk only when every model reports risk.
    Unanimous,
    /// At-risk when any model reports risk.
    Any,
    /// Weighted share of risk votes compared against a threshold.
    Weighted,
}

/// File locations of the four classifier artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub distance: PathBuf,
    pub tree_ensemble: PathBuf,
    pub neural_network: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    pub const DISTANCE_FILE: &'static str = "knn.json";
    pub const TREE_ENSEMBLE_FILE: &'static str = "random_forest.json";
    pub const NEURAL_NETWORK_FILE: &'static str = "neural_network.json";
    pub const SCALER_FILE: &'static str = "scaler.json";

    /// Standard file names inside one artifact directory.
    pub fn from_dir(dir: &Path) -> Self {
        Self {
            distance: dir.join(Self::DISTANCE_FILE),
            tree_ensemble: dir.join(Self::TREE_ENSEMBLE_FILE),
            neural_network: dir.join(Self::NEURAL_NETWORK_FILE),
            scaler: dir.join(Self::SCALER_FILE),
        }
    }
}

/// Everything needed to build a `Predictor`, resolved once at startup.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub artifacts: ArtifactPaths,
    pub policy: PolicyKind,
    /// Per-model vote weights for `PolicyKind::Weighted` (missing models weigh 1.0).
    pub weights: BTreeMap<ModelId, f64>,
    /// Risk share at or above which `PolicyKind::Weighted` reports at-risk.
    pub threshold: f64,
}

impl PredictorConfig {
    pub fn new(artifacts: ArtifactPaths) -> Self {
        Self {
            artifacts,
            policy: PolicyKind::Tree,
            weights: BTreeMap::new(),
            threshold: 0.5,
        }
    }
}
