//! Application state.

use std::sync::Arc;

use axum::extract::FromRef;
use pixgen_provider::{FalClient, FalConfig, GenerativeProvider};
use pixgen_store::Store;

use crate::config::ApiConfig;
use crate::services::{CompletionReconciler, GenerationOrchestrator};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Store,
    pub orchestrator: GenerationOrchestrator,
    pub reconciler: CompletionReconciler,
}

impl AppState {
    /// Create application state from config: open the database and wire
    /// up the fal.ai provider.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let store = Store::connect(&config.database_url).await?;

        let mut fal = FalConfig::new(&config.fal_api_key)
            .with_base_url(&config.fal_base_url)
            .with_timeout(config.provider_timeout);
        if let Some(base) = &config.public_base_url {
            fal = fal.with_webhook_base(base);
        }
        let provider: Arc<dyn GenerativeProvider> =
            Arc::new(FalClient::new(fal).map_err(|e| anyhow::anyhow!(e))?);

        Ok(Self::with_parts(config, store, provider))
    }

    /// Assemble state from prebuilt parts. Lets tests swap the provider
    /// for a scripted double.
    pub fn with_parts(
        config: ApiConfig,
        store: Store,
        provider: Arc<dyn GenerativeProvider>,
    ) -> Self {
        let orchestrator = GenerationOrchestrator::new(store.clone(), Arc::clone(&provider));
        let reconciler = CompletionReconciler::new(store.clone());
        Self {
            config,
            store,
            orchestrator,
            reconciler,
        }
    }
}

impl FromRef<AppState> for ApiConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
