//! Short-range weather advice for field work.
//!
//! The weather model is an external service. When it cannot answer, a
//! threshold heuristic produces the same response shape so callers never see
//! an error.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::predictor::PredictorError;

pub const FALLBACK_FORECAST: f64 = 0.5;

/// Each field falls back to its own default when missing, empty or not a
/// number, so one bad form field does not discard the others.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWeatherQuery")]
pub struct WeatherQuery {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

impl Default for WeatherQuery {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            humidity: default_humidity(),
            pressure: default_pressure(),
        }
    }
}

fn default_temperature() -> f64 {
    25.0
}

fn default_humidity() -> f64 {
    80.0
}

fn default_pressure() -> f64 {
    1012.0
}

#[derive(Deserialize)]
struct RawWeatherQuery {
    #[serde(default)]
    temperature: LenientNumber,
    #[serde(default)]
    humidity: LenientNumber,
    #[serde(default)]
    pressure: LenientNumber,
}

impl From<RawWeatherQuery> for WeatherQuery {
    fn from(raw: RawWeatherQuery) -> Self {
        Self {
            temperature: raw.temperature.0.unwrap_or_else(default_temperature),
            humidity: raw.humidity.0.unwrap_or_else(default_humidity),
            pressure: raw.pressure.0.unwrap_or_else(default_pressure),
        }
    }
}

/// Form posts deliver every field as a string; anything unusable reads as absent.
#[derive(Default)]
struct LenientNumber(Option<f64>);

impl<'de> Deserialize<'de> for LenientNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Value::deserialize(deserializer)? {
            Value::Number(number) => number.as_f64(),
            Value::String(raw) => raw.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(Self(value.filter(|value| value.is_finite())))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherAdvice {
    pub forecast: f64,
    pub description: String,
    pub advice: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

#[async_trait]
pub trait WeatherModel: Send + Sync {
    async fn forecast(&self, query: &WeatherQuery) -> Result<WeatherAdvice, PredictorError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeatherCondition {
    HotAndDry,
    Humid,
    Cool,
    Mild,
}

impl WeatherCondition {
    pub fn classify(query: &WeatherQuery) -> Self {
        if query.temperature > 30.0 && query.humidity < 50.0 {
            Self::HotAndDry
        } else if query.humidity > 80.0 {
            Self::Humid
        } else if query.temperature < 15.0 {
            Self::Cool
        } else {
            Self::Mild
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::HotAndDry => "Hot and Dry",
            Self::Humid => "Humid, Possible Rain",
            Self::Cool => "Cool Weather",
            Self::Mild => "Mild Weather",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Self::HotAndDry => "Irrigate crops and provide shade for livestock.",
            Self::Humid => "Monitor for fungal diseases and drainage.",
            Self::Cool => "Protect sensitive crops from cold.",
            Self::Mild => "Good conditions for most crops.",
        }
    }
}

pub fn fallback_advice(query: &WeatherQuery) -> WeatherAdvice {
    let condition = WeatherCondition::classify(query);
    WeatherAdvice {
        forecast: FALLBACK_FORECAST,
        description: condition.description().to_string(),
        advice: condition.advice().to_string(),
        temperature: query.temperature,
        humidity: query.humidity,
        pressure: query.pressure,
    }
}

#[derive(Clone, Debug)]
pub struct WeatherAdvisor {
    timeout: Duration,
}

impl Default for WeatherAdvisor {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl WeatherAdvisor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn advise(&self, query: &WeatherQuery, model: &dyn WeatherModel) -> WeatherAdvice {
        let outcome = match tokio::time::timeout(self.timeout, model.forecast(query)).await {
            Ok(result) => result,
            Err(_) => Err(PredictorError::Timeout(self.timeout.as_millis())),
        };

        match outcome {
            Ok(advice) => advice,
            Err(error) => {
                warn!(
                    event_name = "agent.weather.model_failed",
                    error_kind = error.kind(),
                    error = %error,
                    "weather model unavailable, using heuristic advice"
                );
                fallback_advice(query)
            }
        }
    }
}
