use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub gps: GpsSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
    #[serde(default)]
    pub assessment: AssessmentSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GpsSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherSettings {
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_weather_ttl")]
    pub ttl_secs: i64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
            api_key: None,
            ttl_secs: default_weather_ttl(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssessmentSettings {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_fuel_window")]
    pub fuel_window_minutes: i64,
    #[serde(default = "default_eco_window")]
    pub eco_window_hours: i64,
    /// Registers the fuel simulation route
    #[serde(default)]
    pub dev_routes: bool,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            fuel_window_minutes: default_fuel_window(),
            eco_window_hours: default_eco_window(),
            dev_routes: false,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_weather_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_ttl() -> i64 {
    600
}

fn default_concurrency() -> usize {
    8
}

fn default_fuel_window() -> i64 {
    crate::domain::fuel::FUEL_WINDOW_MINUTES
}

fn default_eco_window() -> i64 {
    24
}

impl AppConfig {
    /// Provider credentials are mandatory; everything else has a default.
    pub fn validate(&self) -> anyhow::Result<()> {
        let missing: Vec<&str> = [
            ("gps.base_url", &self.gps.base_url),
            ("gps.username", &self.gps.username),
            ("gps.password", &self.gps.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            anyhow::bail!("Missing GPS API settings: {}", missing.join(", "));
        }
        Ok(())
    }
}

/// `config/fleet.toml` (optional) overridden by `FLEET__SECTION__KEY` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/fleet").required(false))
        .add_source(config::Environment::with_prefix("FLEET").separator("__"))
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}
