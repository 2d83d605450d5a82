use std::sync::Arc;

use log::*;
use reqwest::Client;
use serde::Deserialize;
use steps_engine::walk::TemperatureService;

use crate::{config::WeatherConfig, integrations::IntegrationError};

/// Current temperature from Open-Meteo. No API key is needed.
#[derive(Clone)]
pub struct OpenMeteoClient {
    url: String,
    client: Arc<Client>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, IntegrationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IntegrationError::Initialization(e.to_string()))?;
        Ok(Self { url: config.url.clone(), client: Arc::new(client) })
    }

    pub async fn fetch_temperature(&self, lat: f64, lon: f64) -> Result<Option<f64>, IntegrationError> {
        let params = [
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("current_weather", "true".to_string()),
            ("timezone", "auto".to_string()),
        ];
        trace!("🌡️ Fetching the temperature at ({lat:.4}, {lon:.4})");
        let response = self
            .client
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .map_err(|e| IntegrationError::RequestError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(IntegrationError::QueryError { status, message });
        }
        let forecast =
            response.json::<ForecastResponse>().await.map_err(|e| IntegrationError::JsonError(e.to_string()))?;
        Ok(forecast.current_weather.and_then(|w| w.temperature))
    }
}

impl TemperatureService for OpenMeteoClient {
    async fn current_temp_c(&self, lat: f64, lon: f64) -> Option<i64> {
        match self.fetch_temperature(lat, lon).await {
            Ok(Some(t)) if t.is_finite() => Some(t.round() as i64),
            Ok(_) => {
                debug!("🌡️ Open-Meteo did not report a current temperature");
                None
            },
            Err(e) => {
                warn!("🌡️ Could not fetch the temperature. {e}");
                None
            },
        }
    }
}
