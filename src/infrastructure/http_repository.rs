// Dashboard backend repository implementation
use crate::application::sensor_repository::SensorRepository;
use crate::domain::dashboard::{ChartBlock, ChartSpec, Dashboard, DEFAULT_Y_AXIS_DOMAIN};
use crate::domain::range::RangeSelection;
use crate::domain::sample::Dataset;
use crate::infrastructure::config::build_url;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;

const DASHBOARD_ENDPOINT: &str = "/api/dashboard-config/";
const GRAPH_BLOCK: &str = "Graph";

#[derive(Debug, Clone)]
pub struct HttpSensorRepository {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DashboardEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Vec<BlockEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BlockEntry {
    Block {
        config: BlockConfig,
        #[serde(default)]
        data: Vec<Option<serde_json::Value>>,
    },
    Sensors {
        sensor_list: Vec<serde_json::Value>,
    },
    #[allow(dead_code)]
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct BlockConfig {
    #[serde(rename = "Type", default)]
    kind: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Units", default)]
    units: Option<String>,
    #[serde(rename = "Series", default)]
    series: Vec<String>,
    #[serde(rename = "YAxisDomain", default)]
    y_axis_domain: Option<serde_json::Value>,
    #[serde(rename = "Color", default)]
    color: Option<serde_json::Value>,
}

impl BlockConfig {
    fn into_spec(self) -> ChartSpec {
        let y_axis_domain = self
            .y_axis_domain
            .as_ref()
            .and_then(|v| v.as_array())
            .and_then(|bounds| match bounds.as_slice() {
                [low, high] => Some((low.as_f64()?, high.as_f64()?)),
                _ => None,
            })
            .unwrap_or(DEFAULT_Y_AXIS_DOMAIN);

        // Stat blocks use a single colour string, graphs a list
        let colors = self
            .color
            .as_ref()
            .and_then(|v| v.as_array())
            .map(|list| {
                list.iter()
                    .filter_map(|c| c.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        ChartSpec {
            title: self.title,
            unit: self.units.filter(|u| !u.is_empty()),
            series: self.series,
            colors,
            y_axis_domain,
        }
    }
}

impl HttpSensorRepository {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_dashboard_url(&self, machine_name: &str, range: &RangeSelection) -> String {
        let mut params = vec![("machine_name", Some(machine_name.to_string()))];
        params.extend(
            range
                .query_params()
                .into_iter()
                .map(|(key, value)| (key, Some(value))),
        );
        build_url(&self.base_url, DASHBOARD_ENDPOINT, &params)
    }
}

#[async_trait]
impl SensorRepository for HttpSensorRepository {
    async fn fetch_dashboard(
        &self,
        machine_name: &str,
        range: &RangeSelection,
    ) -> Result<Dashboard> {
        let url = self.build_dashboard_url(machine_name, range);
        tracing::debug!("Fetching dashboard: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to dashboard backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Dashboard backend returned status {}: {}", status, body);
        }

        let text = response
            .text()
            .await
            .context("Failed to read dashboard response body")?;

        parse_dashboard(machine_name, &text)
    }
}

/// Parse the backend envelope into chart blocks.
///
/// Only graph blocks become charts; each keeps its position in the envelope
/// as its id so ids stay stable across refreshes.
pub fn parse_dashboard(machine_name: &str, body: &str) -> Result<Dashboard> {
    let body = sanitize_nan(body);
    let envelope: DashboardEnvelope =
        serde_json::from_str(&body).context("Failed to parse dashboard response")?;

    if envelope.status != "success" {
        anyhow::bail!(
            "Dashboard backend reported {}: {}",
            envelope.status,
            envelope.message.unwrap_or_default()
        );
    }

    let mut charts = Vec::new();
    let mut sensor_list = Vec::new();

    for (position, entry) in envelope.data.into_iter().enumerate() {
        match entry {
            BlockEntry::Block { config, data } if config.kind == GRAPH_BLOCK => {
                let title = config.title.clone();
                let dataset = match data.into_iter().next().flatten() {
                    Some(records) => serde_json::from_value::<Dataset>(records)
                        .with_context(|| format!("Malformed samples in chart '{}'", title))?,
                    None => Dataset::default(),
                };
                charts.push(ChartBlock::new(position, config.into_spec(), dataset));
            }
            BlockEntry::Block { .. } => {}
            BlockEntry::Sensors { sensor_list: sensors } => {
                sensor_list = sensors
                    .into_iter()
                    .map(|s| match s {
                        serde_json::Value::String(name) => name,
                        other => other.to_string(),
                    })
                    .collect();
            }
            BlockEntry::Other(_) => {}
        }
    }

    tracing::debug!(
        "Parsed {} charts and {} sensors for {}",
        charts.len(),
        sensor_list.len(),
        machine_name
    );
    Ok(Dashboard::new(machine_name.to_string(), charts, sensor_list))
}

/// Replace bare `NaN` tokens (not valid JSON) with `null`, leaving strings alone.
pub fn sanitize_nan(body: &str) -> Cow<'_, str> {
    if !body.contains("NaN") {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = body;

    while let Some(ch) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
        } else if ch == '"' {
            in_string = true;
        } else if rest.starts_with("NaN") && !preceded_by_word(&out) {
            out.push_str("null");
            rest = &rest[3..];
            continue;
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    Cow::Owned(out)
}

fn preceded_by_word(out: &str) -> bool {
    out.chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}
