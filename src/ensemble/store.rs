//! Process-wide holder for the loaded ensemble with atomic reload.
//!
//! Readers take a snapshot (`Arc<EnsembleRunner>`) and evaluate against it
//! without holding any lock. `reload` builds a complete new runner first and
//! only then swaps the pointer, so:
//! - in-flight evaluations finish on the snapshot they started with
//! - a failed reload leaves the previous runner in service

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::ArtifactPaths;
use crate::ensemble::runner::EnsembleRunner;
use crate::error::ModelLoadError;

/// The runner in service and the generation it was installed as.
#[derive(Debug)]
struct Installed {
    generation: u64,
    runner: Arc<EnsembleRunner>,
}

#[derive(Debug)]
pub struct ArtifactStore {
    paths: ArtifactPaths,
    current: RwLock<Installed>,
}

impl ArtifactStore {
    /// Load the artifacts once. Fails if any artifact is unusable.
    pub fn open(paths: ArtifactPaths) -> Result<Self, ModelLoadError> {
        let runner = EnsembleRunner::load(&paths)?;
        Ok(Self::with_runner(paths, runner))
    }

    /// Wrap an already-built runner (used by tests and embedders).
    pub fn with_runner(paths: ArtifactPaths, runner: EnsembleRunner) -> Self {
        Self {
            paths,
            current: RwLock::new(Installed {
                generation: 1,
                runner: Arc::new(runner),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Installed> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Installed> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The runner currently in service.
    pub fn snapshot(&self) -> Arc<EnsembleRunner> {
        Arc::clone(&self.read().runner)
    }

    /// The runner in service together with its generation, read atomically.
    pub fn versioned_snapshot(&self) -> (u64, Arc<EnsembleRunner>) {
        let installed = self.read();
        (installed.generation, Arc::clone(&installed.runner))
    }

    /// How many runners have been installed (starts at 1).
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Reload all artifacts from disk and swap them in.
    pub fn reload(&self) -> Result<(), ModelLoadError> {
        let runner = match EnsembleRunner::load(&self.paths) {
            Ok(runner) => Arc::new(runner),
            Err(err) => {
                tracing::error!(error = %err, "artifact reload failed; keeping previous models");
                return Err(err);
            }
        };

        let generation = {
            let mut installed = self.write();
            installed.generation += 1;
            installed.runner = runner;
            installed.generation
        };
        tracing::info!(generation, "artifacts reloaded");
        Ok(())
    }
}
