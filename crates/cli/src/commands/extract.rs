use agrichat_agent::{IntentDetector, ParameterExtractor};
use agrichat_core::ExtractedParameters;
use serde::Serialize;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ExtractionReport {
    yield_intent: bool,
    matched_keyword: Option<&'static str>,
    parameters: ExtractedParameters,
    present_fields: Vec<&'static str>,
}

/// Offline view of what the chat pipeline would send to the yield model.
pub fn run(message: &str) -> CommandResult {
    let matched_keyword = IntentDetector::new().matched_keyword(message);
    let parameters = ParameterExtractor::new().extract(message);

    CommandResult::success(
        "extract",
        ExtractionReport {
            yield_intent: matched_keyword.is_some(),
            matched_keyword,
            present_fields: parameters.present_fields(),
            parameters,
        },
    )
}
