use crate::account::{FailureReason, Verdict};
use crate::csv_checker::{RowContext, ValueRule};

pub const DEFAULT_MESSAGE_KEY: &str = "variableSymbol.format";

const MAX_DIGITS: usize = 10;

/// Checks a column of variable symbols: payment identifiers of up to ten
/// digits with no checksum.
pub struct VariableSymbolRule {
    message_key: String,
}

impl VariableSymbolRule {
    pub fn new() -> Self {
        Self {
            message_key: DEFAULT_MESSAGE_KEY.to_string(),
        }
    }

    pub fn with_message_key(mut self, key: &str) -> Self {
        self.message_key = key.to_string();
        self
    }
}

impl Default for VariableSymbolRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueRule for VariableSymbolRule {
    fn check(&self, value: &str, _row: &RowContext) -> Verdict {
        let value = value.trim();
        if value.is_empty() {
            return Verdict::SkippedEmpty;
        }

        if value.len() <= MAX_DIGITS && value.chars().all(|c| c.is_ascii_digit()) {
            Verdict::Valid
        } else {
            Verdict::Invalid(FailureReason::Malformed)
        }
    }

    fn message_key(&self) -> &str {
        &self.message_key
    }

    fn description(&self) -> &str {
        "Validates variable symbols of up to ten digits"
    }
}
