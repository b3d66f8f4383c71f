// OpenWeather current-conditions client
use crate::application::fleet_repository::WeatherSource;
use crate::domain::vehicle::Position;
use crate::domain::weather::WeatherReading;
use crate::infrastructure::upstream_error::{UpstreamError, fetch_json};
use crate::infrastructure::upstream_mapper::weather_from_json;
use async_trait::async_trait;

const PROVIDER: &str = "Weather API";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(client: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    fn current_url(&self, position: Position, api_key: &str) -> String {
        format!(
            "{}/weather?lat={}&lon={}&units=metric&appid={}",
            self.base_url,
            position.lat,
            position.lng,
            urlencoding::encode(api_key)
        )
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, position: Position) -> anyhow::Result<WeatherReading> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("weather.api_key"))?;

        let raw = fetch_json(PROVIDER, self.client.get(self.current_url(position, api_key))).await?;
        Ok(weather_from_json(&raw))
    }
}
