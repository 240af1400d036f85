use std::sync::Arc;

use kpi_domain::ports::{AlertLogRepository, Clock, HistoricalDataRepository, IndicatorRepository};
use kpi_domain::{IndicatorDomainService, RuntimeConfig};

use crate::queries::KpiAnalyticsService;
use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub indicator_repo: Arc<dyn IndicatorRepository>,
    pub history_repo: Arc<dyn HistoricalDataRepository>,
    pub alert_repo: Arc<dyn AlertLogRepository>,
    pub clock: Arc<dyn Clock>,
    pub indicator_service: IndicatorDomainService,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn analytics(&self) -> KpiAnalyticsService {
        KpiAnalyticsService::new(
            self.indicator_repo.clone(),
            self.history_repo.clone(),
            self.alert_repo.clone(),
            self.clock.clone(),
        )
    }
}
