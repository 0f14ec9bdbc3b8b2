// Dashboard domain model
use super::sample::Dataset;

pub const DEFAULT_Y_AXIS_DOMAIN: (f64, f64) = (0.0, 100.0);

/// Presentation settings of one chart block, as configured on the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub unit: Option<String>,
    /// Explicit series list; empty means "detect from the data".
    pub series: Vec<String>,
    pub colors: Vec<String>,
    pub y_axis_domain: (f64, f64),
}

impl ChartSpec {
    pub fn new(title: String) -> Self {
        Self {
            title,
            unit: None,
            series: Vec::new(),
            colors: Vec::new(),
            y_axis_domain: DEFAULT_Y_AXIS_DOMAIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBlock {
    pub id: usize,
    pub spec: ChartSpec,
    pub dataset: Dataset,
}

impl ChartBlock {
    pub fn new(id: usize, spec: ChartSpec, dataset: Dataset) -> Self {
        Self { id, spec, dataset }
    }

    /// Series to plot: the configured list, else whatever the samples carry.
    pub fn series_names(&self) -> Vec<String> {
        if self.spec.series.is_empty() {
            self.dataset.detect_series()
        } else {
            self.spec.series.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub machine_name: String,
    pub charts: Vec<ChartBlock>,
    pub sensor_list: Vec<String>,
}

impl Dashboard {
    pub fn new(machine_name: String, charts: Vec<ChartBlock>, sensor_list: Vec<String>) -> Self {
        Self {
            machine_name,
            charts,
            sensor_list,
        }
    }
}
