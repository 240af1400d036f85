use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    evaluations: AtomicU64,
    breaches: AtomicU64,
    events: AtomicU64,
    anomalies: AtomicU64,
}

impl Metrics {
    pub fn record_evaluation(&self, breached: bool) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        if breached {
            self.breaches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_events(&self, count: usize) {
        self.events.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_anomalies(&self, count: usize) {
        self.anomalies.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let evaluations = self.evaluations.load(Ordering::Relaxed);
        let breaches = self.breaches.load(Ordering::Relaxed);
        let events = self.events.load(Ordering::Relaxed);
        let anomalies = self.anomalies.load(Ordering::Relaxed);

        format!(
            "# TYPE kpi_evaluations_total counter\n\
kpi_evaluations_total {}\n\
# TYPE kpi_threshold_breaches_total counter\n\
kpi_threshold_breaches_total {}\n\
# TYPE kpi_domain_events_total counter\n\
kpi_domain_events_total {}\n\
# TYPE kpi_anomalies_total counter\n\
kpi_anomalies_total {}\n",
            evaluations, breaches, events, anomalies
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_counters() {
        let metrics = Metrics::default();
        metrics.record_evaluation(true);
        metrics.record_evaluation(false);
        metrics.record_events(3);
        let text = metrics.render_prometheus();
        assert!(text.contains("kpi_evaluations_total 2\n"));
        assert!(text.contains("kpi_threshold_breaches_total 1\n"));
        assert!(text.contains("kpi_domain_events_total 3\n"));
        assert!(text.contains("kpi_anomalies_total 0\n"));
    }
}
