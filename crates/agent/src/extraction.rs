use std::sync::LazyLock;

use agrichat_core::{
    Crop, ExtractedParameters, IrrigationMethod, SoilType, Vocabulary, HECTARES_PER_ACRE,
};
use regex::{Captures, Regex};

static AREA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+(?:\.[0-9]*)?)\s*(hectares?|acres?|ha)\b").expect("area regex is valid")
});

static TEMPERATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+(?:\.[0-9]*)?)\s*(?:°\s*c\b|℃|celsius\b|degrees?\b)")
        .expect("temperature regex is valid")
});

static RAINFALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+(?:\.[0-9]*)?)\s*mm\b").expect("rainfall regex is valid")
});

#[derive(Clone, Copy, Debug, Default)]
pub struct ParameterExtractor;

impl ParameterExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, message: &str) -> ExtractedParameters {
        let normalized_text = message.to_lowercase();

        ExtractedParameters::builder()
            .crop(Crop::first_in(&normalized_text))
            .area_hectares(extract_area_hectares(&normalized_text))
            .temperature_c(first_number(&TEMPERATURE_RE, &normalized_text))
            .rainfall_mm(first_number(&RAINFALL_RE, &normalized_text))
            .soil_type(SoilType::first_in(&normalized_text))
            .irrigation(IrrigationMethod::first_in(&normalized_text))
            .build()
    }
}

fn extract_area_hectares(text: &str) -> Option<f64> {
    let captures = AREA_RE.captures(text)?;
    let area = parse_number(&captures)?;
    let unit = captures.get(2)?.as_str();
    if unit.starts_with("acre") {
        Some(area * HECTARES_PER_ACRE)
    } else {
        Some(area)
    }
}

fn first_number(pattern: &Regex, text: &str) -> Option<f64> {
    pattern.captures(text).and_then(|captures| parse_number(&captures))
}

fn parse_number(captures: &Captures<'_>) -> Option<f64> {
    captures.get(1)?.as_str().parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use agrichat_core::{Crop, IrrigationMethod, SoilType};
    use approx::assert_relative_eq;

    use super::ParameterExtractor;

    #[test]
    fn extracts_every_field_from_rich_request() {
        let params = ParameterExtractor::new().extract(
            "5 hectares of wheat at 30°C with 100mm rainfall, loamy soil, drip irrigation",
        );

        assert_eq!(params.crop(), Some(Crop::Wheat));
        assert_eq!(params.area_hectares(), Some(5.0));
        assert_eq!(params.temperature_c(), Some(30.0));
        assert_eq!(params.rainfall_mm(), Some(100.0));
        assert_eq!(params.soil_type(), Some(SoilType::Loamy));
        assert_eq!(params.irrigation(), Some(IrrigationMethod::Drip));
    }

    #[test]
    fn converts_acres_to_hectares() {
        let params = ParameterExtractor::new().extract("2 acres");
        let area = params.area_hectares().unwrap_or_default();
        assert_relative_eq!(area, 0.809372, epsilon = 1e-9);
        assert_eq!(params.present_fields(), vec!["area_hectares"]);
    }

    #[test]
    fn unit_matching_is_case_insensitive() {
        let extractor = ParameterExtractor::new();
        assert_eq!(extractor.extract("2.5 HA of Barley").area_hectares(), Some(2.5));
        assert_eq!(extractor.extract("2.5 HA of Barley").crop(), Some(Crop::Barley));
        assert_eq!(extractor.extract("avg 22 Celsius").temperature_c(), Some(22.0));
        assert_eq!(extractor.extract("650 MM per season").rainfall_mm(), Some(650.0));
        assert_eq!(extractor.extract("around 18 degrees").temperature_c(), Some(18.0));
    }

    #[test]
    fn unmatched_fields_stay_absent() {
        let params = ParameterExtractor::new().extract("What is nitrogen fixation?");
        assert!(params.is_empty());
    }

    #[test]
    fn unit_words_must_stand_alone() {
        let params = ParameterExtractor::new().extract("I have 5 hats and 3 mmol of salt");
        assert_eq!(params.area_hectares(), None);
        assert_eq!(params.rainfall_mm(), None);
    }

    #[test]
    fn oversized_numerals_are_omitted_instead_of_stored_as_infinity() {
        let huge = format!("{} mm of rain", "9".repeat(400));
        let params = ParameterExtractor::new().extract(&huge);
        assert_eq!(params.rainfall_mm(), None);
    }

    #[test]
    fn first_vocabulary_entry_wins() {
        let params = ParameterExtractor::new()
            .extract("rotating maize and soybean on sandy clay with sprinkler or flood irrigation");
        assert_eq!(params.crop(), Some(Crop::Maize));
        assert_eq!(params.soil_type(), Some(SoilType::Clay));
        assert_eq!(params.irrigation(), Some(IrrigationMethod::Sprinkler));
    }

    #[test]
    fn trailing_decimal_point_still_parses() {
        let params = ParameterExtractor::new().extract("about 3. hectares");
        assert_eq!(params.area_hectares(), Some(3.0));
    }

    #[test]
    fn extraction_is_deterministic_and_fresh() {
        let extractor = ParameterExtractor::new();
        let first = extractor.extract("10 ha potato, 25 °C");
        let second = extractor.extract("10 ha potato, 25 °C");
        assert_eq!(first, second);
        assert_eq!(first.temperature_c(), Some(25.0));
    }

    #[test]
    fn non_ascii_digits_do_not_hide_later_values() {
        let params = ParameterExtractor::new().extract("२५ mm then 100 mm rain on ४ ha, 3 ha sown");
        assert_eq!(params.rainfall_mm(), Some(100.0));
        assert_eq!(params.area_hectares(), Some(3.0));
    }

    #[test]
    fn temperature_needs_a_celsius_marker() {
        let extractor = ParameterExtractor::new();
        assert_eq!(extractor.extract("it was 30 °F yesterday").temperature_c(), None);
        assert_eq!(extractor.extract("around 28℃").temperature_c(), Some(28.0));
        assert_eq!(extractor.extract("about 31 degrees").temperature_c(), Some(31.0));
        assert_eq!(extractor.extract("86 °F or 30 Celsius").temperature_c(), Some(30.0));
    }
}
