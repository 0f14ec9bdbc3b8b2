// Repository trait for sensor data access
use crate::domain::dashboard::Dashboard;
use crate::domain::range::RangeSelection;
use async_trait::async_trait;

#[async_trait]
pub trait SensorRepository: Send + Sync {
    /// Fetch every chart block configured for a machine over the selected range
    async fn fetch_dashboard(
        &self,
        machine_name: &str,
        range: &RangeSelection,
    ) -> anyhow::Result<Dashboard>;
}
