use std::sync::Arc;

use anyhow::Result;

use kpi_application::{AppState, Metrics};
use kpi_domain::IndicatorDomainService;
use kpi_infrastructure::{AppConfig, FileDataStore, SystemClock};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let store = Arc::new(
            FileDataStore::load(
                &config.indicators_path,
                &config.history_path,
                &config.alerts_path,
            )
            .await?,
        );

        let state = AppState {
            config: config.to_runtime_config(),
            indicator_repo: store.clone(),
            history_repo: store.clone(),
            alert_repo: store,
            clock: Arc::new(SystemClock),
            indicator_service: IndicatorDomainService::new(),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
