use serde::Serialize;

use super::vocabulary::{Crop, IrrigationMethod, SoilType};

/// Fixed acre → hectare conversion factor.
pub const HECTARES_PER_ACRE: f64 = 0.404686;

/// Parameters recognized in a single message.
///
/// Every field is optional and stays absent when nothing matched; the JSON
/// form omits absent fields entirely. Values are fixed at construction, so a
/// new extraction always yields a fresh value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExtractedParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    crop: Option<Crop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    area_hectares: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rainfall_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    soil_type: Option<SoilType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    irrigation: Option<IrrigationMethod>,
}

impl ExtractedParameters {
    pub fn builder() -> ParametersBuilder {
        ParametersBuilder::default()
    }

    pub fn crop(&self) -> Option<Crop> {
        self.crop
    }

    pub fn area_hectares(&self) -> Option<f64> {
        self.area_hectares
    }

    pub fn temperature_c(&self) -> Option<f64> {
        self.temperature_c
    }

    pub fn rainfall_mm(&self) -> Option<f64> {
        self.rainfall_mm
    }

    pub fn soil_type(&self) -> Option<SoilType> {
        self.soil_type
    }

    pub fn irrigation(&self) -> Option<IrrigationMethod> {
        self.irrigation
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Names of the fields that were extracted, in declaration order.
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.crop.is_some() {
            fields.push("crop");
        }
        if self.area_hectares.is_some() {
            fields.push("area_hectares");
        }
        if self.temperature_c.is_some() {
            fields.push("temperature_c");
        }
        if self.rainfall_mm.is_some() {
            fields.push("rainfall_mm");
        }
        if self.soil_type.is_some() {
            fields.push("soil_type");
        }
        if self.irrigation.is_some() {
            fields.push("irrigation");
        }
        fields
    }
}

#[derive(Clone, Debug, Default)]
pub struct ParametersBuilder {
    inner: ExtractedParameters,
}

impl ParametersBuilder {
    pub fn crop(mut self, crop: Option<Crop>) -> Self {
        self.inner.crop = crop;
        self
    }

    /// Non-finite values are dropped rather than stored.
    pub fn area_hectares(mut self, area: Option<f64>) -> Self {
        self.inner.area_hectares = area.filter(|value| value.is_finite());
        self
    }

    pub fn temperature_c(mut self, temperature: Option<f64>) -> Self {
        self.inner.temperature_c = temperature.filter(|value| value.is_finite());
        self
    }

    pub fn rainfall_mm(mut self, rainfall: Option<f64>) -> Self {
        self.inner.rainfall_mm = rainfall.filter(|value| value.is_finite());
        self
    }

    pub fn soil_type(mut self, soil_type: Option<SoilType>) -> Self {
        self.inner.soil_type = soil_type;
        self
    }

    pub fn irrigation(mut self, irrigation: Option<IrrigationMethod>) -> Self {
        self.inner.irrigation = irrigation;
        self
    }

    pub fn build(self) -> ExtractedParameters {
        self.inner
    }
}
