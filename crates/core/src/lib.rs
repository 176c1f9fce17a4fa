//! Domain types, configuration and error taxonomy shared by the AgriChat crates.

pub mod config;
pub mod domain;
pub mod errors;

pub use domain::conversation::{ChatRole, ChatTurn, ResponseLanguage};
pub use domain::parameters::{ExtractedParameters, ParametersBuilder, HECTARES_PER_ACRE};
pub use domain::prediction::{ImpactFactors, PredictionResult, RiskLevel};
pub use domain::vocabulary::{Crop, IrrigationMethod, SoilType, Vocabulary};
pub use errors::{ApplicationError, DomainError, InterfaceError};
