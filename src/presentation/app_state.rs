// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::event_bus::EventBus;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub bus: EventBus,
}
