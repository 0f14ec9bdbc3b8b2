// Dashboard service - Owns the chart widgets and keeps them in sync with the backend
use crate::application::chart_widget::{ChartFrame, ChartView, ChartWidget};
use crate::application::event_bus::{DashboardEvent, EventBus};
use crate::application::sensor_repository::SensorRepository;
use crate::domain::dashboard::Dashboard;
use crate::domain::gesture::{EventResponse, InputEvent};
use crate::domain::range::{RangeError, RangeSelection};
use crate::infrastructure::config::Profiles;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    pub id: usize,
    pub title: String,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputOutcome {
    pub response: EventResponse,
    pub frame: ChartFrame,
}

#[derive(Default)]
struct DashboardState {
    charts: BTreeMap<usize, ChartWidget>,
    sensor_list: Vec<String>,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn SensorRepository>,
    bus: EventBus,
    machine_name: String,
    profiles: Profiles,
    palette: Arc<[String]>,
    range: Arc<Mutex<RangeSelection>>,
    state: Arc<Mutex<DashboardState>>,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn SensorRepository>,
        bus: EventBus,
        machine_name: String,
        initial_range: RangeSelection,
        profiles: Profiles,
        palette: Vec<String>,
    ) -> Self {
        Self {
            repository,
            bus,
            machine_name,
            profiles,
            palette: palette.into(),
            range: Arc::new(Mutex::new(initial_range)),
            state: Arc::new(Mutex::new(DashboardState::default())),
        }
    }

    pub fn current_range(&self) -> RangeSelection {
        lock(&self.range).clone()
    }

    /// Select a new time range and announce it; listeners decide when to refetch.
    pub fn change_range(&self, range: RangeSelection) -> Result<(), RangeError> {
        let range = range.validated()?;
        *lock(&self.range) = range.clone();
        tracing::info!("Range changed to {}", range);
        self.bus.publish(&DashboardEvent::RangeChanged { range });
        Ok(())
    }

    pub fn open_notes(&self) -> usize {
        self.bus.publish(&DashboardEvent::OpenNotes)
    }

    /// Fetch the current range from the backend and replace every dataset.
    ///
    /// On failure the previously loaded datasets stay in place.
    pub async fn refresh(&self) -> anyhow::Result<usize> {
        let range = self.current_range();
        let dashboard = self
            .repository
            .fetch_dashboard(&self.machine_name, &range)
            .await?;

        let charts = dashboard.charts.len();
        self.apply_dashboard(dashboard);
        tracing::debug!("Refreshed {} charts for {} ({})", charts, self.machine_name, range);
        Ok(charts)
    }

    fn apply_dashboard(&self, dashboard: Dashboard) {
        let mut replaced = Vec::new();
        {
            let mut state = lock(&self.state);
            let incoming: Vec<usize> = dashboard.charts.iter().map(|c| c.id).collect();
            state.charts.retain(|id, _| incoming.contains(id));

            for block in dashboard.charts {
                let id = block.id;
                let len = block.dataset.len();
                match state.charts.get_mut(&id) {
                    Some(widget) => {
                        if widget.replace_dataset(block) {
                            replaced.push(DashboardEvent::DatasetReplaced { chart_id: id, len });
                        }
                    }
                    None => {
                        let widget = ChartWidget::new(
                            block,
                            self.profiles.compact.clone(),
                            self.profiles.full_screen.clone(),
                            self.palette.clone(),
                        );
                        state.charts.insert(id, widget);
                        replaced.push(DashboardEvent::DatasetReplaced { chart_id: id, len });
                    }
                }
            }
            state.sensor_list = dashboard.sensor_list;
        }

        // Published after the lock is released so handlers may query the service
        for event in &replaced {
            self.bus.publish(event);
        }
    }

    pub fn chart_summaries(&self) -> Vec<ChartSummary> {
        lock(&self.state)
            .charts
            .values()
            .map(|widget| ChartSummary {
                id: widget.id(),
                title: widget.title().to_string(),
                samples: widget.sample_count(),
            })
            .collect()
    }

    pub fn sensor_list(&self) -> Vec<String> {
        lock(&self.state).sensor_list.clone()
    }

    pub fn frame(&self, chart_id: usize, view: ChartView) -> Option<ChartFrame> {
        lock(&self.state)
            .charts
            .get(&chart_id)
            .map(|widget| widget.frame(view))
    }

    /// Feed one input event to a chart view; `None` when the chart is unknown.
    pub fn handle_input(
        &self,
        chart_id: usize,
        view: ChartView,
        event: &InputEvent,
    ) -> Option<InputOutcome> {
        let mut activated = false;
        let outcome = {
            let mut state = lock(&self.state);
            let widget = state.charts.get_mut(&chart_id)?;
            let response = widget.handle_input(view, event, &mut || activated = true);
            InputOutcome {
                response,
                frame: widget.frame(view),
            }
        };

        if activated {
            tracing::info!("Detail view requested for chart {}", chart_id);
            self.bus.publish(&DashboardEvent::DetailRequested { chart_id });
        }
        Some(outcome)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
