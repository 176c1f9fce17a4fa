//! Closed vocabularies recognized in free-text messages.
//!
//! Each vocabulary exposes a `PRIORITY` slice. Matching walks that slice in
//! order and the first hit wins, so overlapping words resolve the same way on
//! every call.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crop {
    Wheat,
    Rice,
    Maize,
    Corn,
    Soybean,
    Cotton,
    Sugarcane,
    Potato,
    Tomato,
    Millet,
    Barley,
}

impl Crop {
    pub const PRIORITY: [Self; 11] = [
        Self::Wheat,
        Self::Rice,
        Self::Maize,
        Self::Corn,
        Self::Soybean,
        Self::Cotton,
        Self::Sugarcane,
        Self::Potato,
        Self::Tomato,
        Self::Millet,
        Self::Barley,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wheat => "wheat",
            Self::Rice => "rice",
            Self::Maize => "maize",
            Self::Corn => "corn",
            Self::Soybean => "soybean",
            Self::Cotton => "cotton",
            Self::Sugarcane => "sugarcane",
            Self::Potato => "potato",
            Self::Tomato => "tomato",
            Self::Millet => "millet",
            Self::Barley => "barley",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilType {
    Loamy,
    Clay,
    Sandy,
    Silt,
    Black,
    Red,
}

impl SoilType {
    pub const PRIORITY: [Self; 6] =
        [Self::Loamy, Self::Clay, Self::Sandy, Self::Silt, Self::Black, Self::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loamy => "loamy",
            Self::Clay => "clay",
            Self::Sandy => "sandy",
            Self::Silt => "silt",
            Self::Black => "black",
            Self::Red => "red",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrigationMethod {
    Drip,
    Sprinkler,
    Flood,
    Rainfed,
}

impl IrrigationMethod {
    pub const PRIORITY: [Self; 4] = [Self::Drip, Self::Sprinkler, Self::Flood, Self::Rainfed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drip => "drip",
            Self::Sprinkler => "sprinkler",
            Self::Flood => "flood",
            Self::Rainfed => "rainfed",
        }
    }
}

/// Vocabulary types that can be scanned for in lowercase text.
pub trait Vocabulary: Copy + 'static {
    fn priority() -> &'static [Self];
    fn word(&self) -> &'static str;

    /// First entry, in priority order, that occurs as a substring of `lowercase_text`.
    fn first_in(lowercase_text: &str) -> Option<Self> {
        Self::priority().iter().copied().find(|entry| lowercase_text.contains(entry.word()))
    }
}

impl Vocabulary for Crop {
    fn priority() -> &'static [Self] {
        &Self::PRIORITY
    }

    fn word(&self) -> &'static str {
        self.as_str()
    }
}

impl Vocabulary for SoilType {
    fn priority() -> &'static [Self] {
        &Self::PRIORITY
    }

    fn word(&self) -> &'static str {
        self.as_str()
    }
}

impl Vocabulary for IrrigationMethod {
    fn priority() -> &'static [Self] {
        &Self::PRIORITY
    }

    fn word(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for IrrigationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Crop, IrrigationMethod, SoilType, Vocabulary};

    #[test]
    fn priority_order_resolves_overlapping_mentions() {
        assert_eq!(Crop::first_in("barley after wheat"), Some(Crop::Wheat));
        assert_eq!(Crop::first_in("maize, also called corn"), Some(Crop::Maize));
        assert_eq!(SoilType::first_in("sandy clay mix"), Some(SoilType::Clay));
    }

    #[test]
    fn no_match_yields_none() {
        assert_eq!(Crop::first_in("what about nitrogen?"), None);
        assert_eq!(IrrigationMethod::first_in("manual watering"), None);
    }

    #[test]
    fn serializes_as_vocabulary_word() {
        let json = serde_json::to_string(&Crop::Sugarcane).unwrap_or_default();
        assert_eq!(json, "\"sugarcane\"");
        assert_eq!(IrrigationMethod::Rainfed.to_string(), "rainfed");
    }
}
