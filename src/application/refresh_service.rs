// Refresh service - Periodic and range-triggered dataset reloads
use crate::application::dashboard_service::DashboardService;
use crate::application::event_bus::{DashboardEvent, EventBus};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Clone)]
pub struct RefreshService {
    dashboard_service: DashboardService,
    interval: Duration,
}

impl RefreshService {
    pub fn new(dashboard_service: DashboardService, interval: Duration) -> Self {
        Self {
            dashboard_service,
            interval,
        }
    }

    /// Start the refresh loop.
    ///
    /// Refreshes once immediately, then every `interval`. A range change on
    /// the bus triggers an immediate refresh and restarts the interval.
    pub fn spawn(self, bus: &EventBus) -> JoinHandle<()> {
        // One pending trigger is enough, later range changes coalesce into it
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(1);
        let subscription = bus.subscribe_scoped(move |event| {
            if matches!(event, DashboardEvent::RangeChanged { .. }) {
                let _ = trigger_tx.try_send(());
            }
        });

        tokio::spawn(async move {
            let _subscription = subscription;
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tracing::debug!("Auto-refreshing dashboard data");
                    }
                    trigger = trigger_rx.recv() => {
                        if trigger.is_none() {
                            break;
                        }
                        tracing::info!("Refreshing after range change");
                        ticker.reset();
                    }
                }

                if let Err(e) = self.dashboard_service.refresh().await {
                    tracing::warn!("Dashboard refresh failed, keeping previous data: {:#}", e);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::tests::{FakeRepository, chart, service_with};
    use crate::domain::range::RangeSelection;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_range_change_triggers_refetch_with_new_range() {
        let repo = Arc::new(FakeRepository::default());
        repo.serve(vec![chart(0, 20)]);
        let bus = EventBus::new();
        let service = service_with(repo.clone(), bus.clone());

        let handle = RefreshService::new(service.clone(), Duration::from_secs(60)).spawn(&bus);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(repo.requests.lock().unwrap().len(), 1);
        assert_eq!(service.chart_summaries().len(), 1);

        let range = RangeSelection::predefined("24h").unwrap();
        service.change_range(range.clone()).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        {
            let requests = repo.requests.lock().unwrap();
            assert_eq!(requests.len(), 2);
            assert_eq!(requests[1], range);
        }

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(repo.requests.lock().unwrap().len(), 3);

        handle.abort();
    }
}
