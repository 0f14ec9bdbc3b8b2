// Application layer - Use cases wiring the viewport engine to data and events
pub mod chart_widget;
pub mod dashboard_service;
pub mod event_bus;
pub mod refresh_service;
pub mod sensor_repository;
