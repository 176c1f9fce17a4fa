/// Phrases that mark a message as asking for a yield estimate, in match order.
pub const YIELD_KEYWORDS: [&str; 14] = [
    "yield",
    "production",
    "harvest",
    "how much will i get",
    "how much can i produce",
    "expected output",
    "crop output",
    "ton",
    "kg",
    "quintals",
    "estimate",
    "predict my yield",
    "production estimate",
    "how much will grow",
];

#[derive(Clone, Copy, Debug, Default)]
pub struct IntentDetector;

impl IntentDetector {
    pub fn new() -> Self {
        Self
    }

    /// Heuristic recall: plain substring matching, so "cotton" also hits "ton".
    pub fn classify(&self, message: &str) -> bool {
        self.matched_keyword(message).is_some()
    }

    pub fn matched_keyword(&self, message: &str) -> Option<&'static str> {
        let lowered = message.to_lowercase();
        YIELD_KEYWORDS.iter().copied().find(|keyword| lowered.contains(keyword))
    }
}
