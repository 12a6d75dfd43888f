use insightplug::advisor::{
    advisor_from_config, AdvisorContext, AdvisorSummary, ChatAdvisor, NarrativeComposer,
};
use insightplug::catalog::{ProfileSelection, ReferenceCatalog};
use insightplug::config::{AppConfig, LimiterSettings};
use insightplug::economics::{DerivedMetrics, SignalEngine, VehicleProfile};
use insightplug::error::AppError;
use insightplug::limiter::{FileLimiterStore, InMemoryLimiterStore, LimiterStore, RequestLimiter};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Shared services behind the `/api/v1` routes.
pub(crate) struct ApiState {
    pub(crate) catalog: ReferenceCatalog,
    pub(crate) engine: SignalEngine,
    pub(crate) chat: ChatAdvisor,
}

impl ApiState {
    pub(crate) fn new(catalog: ReferenceCatalog, engine: SignalEngine, chat: ChatAdvisor) -> Self {
        Self {
            catalog,
            engine,
            chat,
        }
    }

    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let catalog = ReferenceCatalog::load(&config.catalog)?;
        let store = limiter_store(&config.limiter)?;
        let limiter = RequestLimiter::new(config.limiter.limits, store);
        let remote = advisor_from_config(&config.advisor)?;

        info!(
            provider = config.advisor.provider.label(),
            ev_models = catalog.ev_models().len(),
            regions = catalog.regions().len(),
            "analysis services configured"
        );

        Ok(Self::new(
            catalog,
            SignalEngine::standard(),
            ChatAdvisor::new(Arc::new(limiter), remote),
        ))
    }

    /// Resolves a selection against the catalog and derives its metrics.
    pub(crate) fn analyze(
        &self,
        selection: &ProfileSelection,
    ) -> Result<(VehicleProfile, DerivedMetrics), AppError> {
        let profile = self.catalog.build_profile(selection)?;
        let metrics = self.engine.derive(&profile)?;
        Ok((profile, metrics))
    }

    pub(crate) fn summary(
        &self,
        selection: &ProfileSelection,
    ) -> Result<AdvisorSummary, AppError> {
        let (profile, metrics) = self.analyze(selection)?;
        Ok(NarrativeComposer::new().summarize(&AdvisorContext::new(&profile, &metrics)))
    }
}

/// Durable file store when a state directory is configured, process memory otherwise.
pub(crate) fn limiter_store(settings: &LimiterSettings) -> Result<Arc<dyn LimiterStore>, AppError> {
    match &settings.state_dir {
        Some(dir) => {
            let store = FileLimiterStore::open(dir)?;
            info!(dir = %store.dir().display(), "chat limiter state persisted to disk");
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryLimiterStore::new())),
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> ApiState {
    use insightplug::limiter::LimiterConfig;

    let store: Arc<dyn LimiterStore> = Arc::new(InMemoryLimiterStore::new());
    let limiter = RequestLimiter::new(
        LimiterConfig {
            max_per_window: 2,
            ..LimiterConfig::default()
        },
        store,
    );
    ApiState::new(
        ReferenceCatalog::builtin(),
        SignalEngine::standard(),
        ChatAdvisor::new(Arc::new(limiter), None),
    )
}
