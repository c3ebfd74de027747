use crate::account::{validate, validate_with, Verdict};
use crate::csv_checker::{RowContext, ValueRule};
use crate::registry::BankRegistry;

/// Header names probed when no account column is named explicitly, in order
/// of preference. Czech exports are split between English and ASCII-folded
/// Czech headings.
pub const ACCOUNT_COLUMN_ALIASES: &[&str] = &["account_number", "account", "ucet", "cislo_uctu"];

pub const DEFAULT_MESSAGE_KEY: &str = "bankAccountNumber.format";

/// Checks a column of domestic Czech account numbers. Uses the bundled bank
/// registry unless a snapshot is supplied.
pub struct BankAccountRule {
    message_key: String,
    registry: Option<BankRegistry>,
}

impl BankAccountRule {
    pub fn new() -> Self {
        Self {
            message_key: DEFAULT_MESSAGE_KEY.to_string(),
            registry: None,
        }
    }

    pub fn with_message_key(mut self, key: &str) -> Self {
        self.message_key = key.to_string();
        self
    }

    pub fn with_registry(mut self, registry: BankRegistry) -> Self {
        self.registry = Some(registry);
        self
    }
}

impl Default for BankAccountRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueRule for BankAccountRule {
    fn check(&self, value: &str, _row: &RowContext) -> Verdict {
        let value = value.trim();
        match &self.registry {
            Some(registry) => validate_with(value, registry),
            None => validate(value),
        }
    }

    fn message_key(&self) -> &str {
        &self.message_key
    }

    fn description(&self) -> &str {
        "Validates Czech account number format, checksums and bank code"
    }
}
