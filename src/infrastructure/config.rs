use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub profiles: Profiles,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    #[serde(default = "default_machine_name")]
    pub machine_name: String,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    #[serde(default = "default_range")]
    pub default_range: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Profiles {
    #[serde(default = "WidgetProfile::compact", deserialize_with = "compact_profile")]
    pub compact: WidgetProfile,
    #[serde(default = "WidgetProfile::full_screen", deserialize_with = "full_screen_profile")]
    pub full_screen: WidgetProfile,
}

impl Default for Profiles {
    fn default() -> Self {
        Self {
            compact: WidgetProfile::compact(),
            full_screen: WidgetProfile::full_screen(),
        }
    }
}

/// Per-widget tuning; the engine itself is shared by every chart variant.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetProfile {
    /// Pixels of drag that pan by one full window span
    pub pan_sensitivity: f64,
    /// Rendered height, 0 fills the container
    pub height_px: u32,
    /// Cap on auto-detected series, unlimited when absent
    pub max_series: Option<usize>,
}

/// A `[profiles.*]` table; keys left out keep the profile's built-in value.
#[derive(Debug, Deserialize)]
struct ProfileOverrides {
    pan_sensitivity: Option<f64>,
    height_px: Option<u32>,
    /// 0 lifts the cap
    max_series: Option<usize>,
}

impl ProfileOverrides {
    fn apply(self, mut profile: WidgetProfile) -> WidgetProfile {
        if let Some(sensitivity) = self.pan_sensitivity {
            profile.pan_sensitivity = sensitivity;
        }
        if let Some(height) = self.height_px {
            profile.height_px = height;
        }
        if let Some(max) = self.max_series {
            profile.max_series = (max > 0).then_some(max);
        }
        profile
    }
}

fn compact_profile<'de, D: Deserializer<'de>>(deserializer: D) -> Result<WidgetProfile, D::Error> {
    ProfileOverrides::deserialize(deserializer).map(|o| o.apply(WidgetProfile::compact()))
}

fn full_screen_profile<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<WidgetProfile, D::Error> {
    ProfileOverrides::deserialize(deserializer).map(|o| o.apply(WidgetProfile::full_screen()))
}

impl WidgetProfile {
    pub fn compact() -> Self {
        Self {
            pan_sensitivity: 500.0,
            height_px: 288,
            max_series: Some(5),
        }
    }

    pub fn full_screen() -> Self {
        Self {
            pan_sensitivity: 800.0,
            height_px: 0,
            max_series: None,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_machine_name() -> String {
    "Hurco".to_string()
}

fn default_refresh_secs() -> u64 {
    60
}

fn default_range() -> String {
    "3h".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

pub fn default_palette() -> Vec<String> {
    [
        "#FF0000", "#4ECDC4", "#FFD93D", "#6BCB77", "#4D96FF", "#FF8E53", "#A78BFA", "#F472B6",
        "#34D399", "#FBBF24", "#A3E635", "#FFB387",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Join `base` and `endpoint` and append the parameters that are present
pub fn build_url(base: &str, endpoint: &str, params: &[(&str, Option<String>)]) -> String {
    let mut url = format!("{}{}", base.trim_end_matches('/'), endpoint);
    let query: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect();

    if !query.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query.join("&"));
    }
    url
}
