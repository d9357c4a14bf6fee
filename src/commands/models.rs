//! Backend model listing and the landing-screen model picker

use crate::error::BackendError;
use crate::models::ModelInfo;
use crate::services::{Backend, Config};

/// Choose the model to start with.
///
/// A `persisted` choice wins while the backend still lists it. Otherwise the
/// first model from a preferred family that fits in memory, then the first
/// model that fits, then the first model at all.
pub fn pick_default_model(
    models: &[ModelInfo],
    preferred_families: &[String],
    persisted: Option<&str>,
) -> Option<String> {
    if let Some(name) = persisted {
        if models.iter().any(|m| m.name == name) {
            return Some(name.to_string());
        }
    }

    models
        .iter()
        .find(|m| m.fits && preferred_families.iter().any(|f| m.name.contains(f.as_str())))
        .or_else(|| models.iter().find(|m| m.fits))
        .or_else(|| models.first())
        .map(|m| m.name.clone())
}

#[derive(Debug, Default)]
pub struct ModelCatalog {
    models: Vec<ModelInfo>,
    selected: Option<String>,
    offline: bool,
    loading: bool,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Set when the last listing failed; the landing screen offers a retry
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Pick a listed model; unknown names are refused
    pub fn select(&mut self, name: &str) -> bool {
        if !self.models.iter().any(|m| m.name == name) {
            return false;
        }
        self.selected = Some(name.to_string());
        true
    }

    pub fn begin_refresh(&mut self) {
        self.loading = true;
        self.offline = false;
    }

    pub fn finish_refresh(&mut self, result: Result<Vec<ModelInfo>, BackendError>, config: &Config) {
        self.loading = false;
        match result {
            Ok(models) => {
                self.selected =
                    pick_default_model(&models, &config.preferred_families, config.model.as_deref());
                tracing::info!(
                    "Backend lists {} models, selected {:?}",
                    models.len(),
                    self.selected
                );
                self.models = models;
            }
            Err(e) => {
                tracing::error!("Backend offline: {}", e);
                self.offline = true;
            }
        }
    }

    pub async fn refresh(&mut self, backend: &dyn Backend, config: &Config) {
        self.begin_refresh();
        let result = backend.list_models().await;
        self.finish_refresh(result, config);
    }

    /// Manual retry after the backend was found offline
    pub async fn retry(&mut self, backend: &dyn Backend, config: &Config) {
        self.refresh(backend, config).await;
    }
}
