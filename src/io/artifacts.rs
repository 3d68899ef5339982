//! Read classifier artifacts from disk.
//!
//! Artifacts are JSON exports owned by the training pipeline. Loading is a
//! two-step contract:
//! - deserialize into the artifact schema (`ModelLoadError::Parse` on failure)
//! - validate shapes and values (`ModelLoadError::Invalid` on failure)
//!
//! A model that passes both steps cannot fail at prediction time.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::ModelLoadError;
use crate::math::MinMaxScaler;
use crate::models::{KnnModel, NetworkArtifact, RandomForest, ScaledNetwork};

/// Deserialize one JSON artifact.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ModelLoadError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ModelLoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ModelLoadError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ModelLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(path: &Path, reason: String) -> ModelLoadError {
    ModelLoadError::Invalid {
        path: path.to_path_buf(),
        reason,
    }
}

pub fn load_knn(path: &Path) -> Result<KnnModel, ModelLoadError> {
    let model: KnnModel = read_artifact(path)?;
    model.validate().map_err(|reason| invalid(path, reason))?;
    Ok(model)
}

pub fn load_forest(path: &Path) -> Result<RandomForest, ModelLoadError> {
    let model: RandomForest = read_artifact(path)?;
    model.validate().map_err(|reason| invalid(path, reason))?;
    Ok(model)
}

/// Load the network together with the scaler fitted alongside it.
pub fn load_network(network_path: &Path, scaler_path: &Path) -> Result<ScaledNetwork, ModelLoadError> {
    let scaler: MinMaxScaler = read_artifact(scaler_path)?;
    scaler.validate().map_err(|reason| invalid(scaler_path, reason))?;
    let artifact: NetworkArtifact = read_artifact(network_path)?;
    ScaledNetwork::new(artifact, scaler).map_err(|reason| invalid(network_path, reason))
}
