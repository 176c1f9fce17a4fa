use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub crop: String,
    pub area_hectares: f64,
    pub total_yield_tons: f64,
    pub total_yield_kg: f64,
    pub yield_per_hectare: f64,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub factors: ImpactFactors,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Percentage contributions of growing conditions to a prediction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpactFactors {
    pub temperature_impact: f64,
    pub rainfall_impact: f64,
    pub soil_impact: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Other(String),
}

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for RiskLevel {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Other(value),
        }
    }
}

impl From<RiskLevel> for String {
    fn from(value: RiskLevel) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PredictionResult {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(DomainError::InvariantViolation(format!(
                "prediction confidence must be within 0..=1, got {}",
                self.confidence
            )));
        }

        let numeric = [
            ("area_hectares", self.area_hectares),
            ("total_yield_tons", self.total_yield_tons),
            ("total_yield_kg", self.total_yield_kg),
            ("yield_per_hectare", self.yield_per_hectare),
            ("factors.temperature_impact", self.factors.temperature_impact),
            ("factors.rainfall_impact", self.factors.rainfall_impact),
            ("factors.soil_impact", self.factors.soil_impact),
        ];
        if let Some((field, _)) = numeric.iter().find(|(_, value)| !value.is_finite()) {
            return Err(DomainError::InvariantViolation(format!(
                "prediction field `{field}` must be a finite number"
            )));
        }

        Ok(())
    }

    /// Confidence as a whole percentage, rounded half away from zero.
    pub fn confidence_pct(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}
