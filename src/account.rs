use crate::registry::BankRegistry;
use std::fmt;

// Mod-11 weights prescribed for domestic account numbers, leftmost padded
// digit first. The prefix is checked over 6 positions, the basic part over 10.
const PREFIX_WEIGHTS: [u32; 6] = [10, 5, 8, 4, 2, 1];
const BASE_WEIGHTS: [u32; 10] = [6, 3, 7, 9, 10, 5, 8, 4, 2, 1];

const MODULO: u32 = 11;

const PREFIX_MAX_DIGITS: usize = 6;
const BASE_MIN_DIGITS: usize = 2;
const BASE_MAX_DIGITS: usize = 10;
const BANK_CODE_DIGITS: usize = 4;

/// A domestic Czech account number split into its three parts:
/// `[prefix-]base/bank_code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNumber {
    prefix: Option<String>,
    base: String,
    bank_code: String,
}

impl AccountNumber {
    /// Parse the `[prefix-]base/bank_code` grammar. The whole string must
    /// match: an optional prefix of up to 6 digits before a `-`, a basic part
    /// of 2 to 10 digits, a `/`, and exactly 4 bank code digits. Anything
    /// else, including surrounding whitespace, is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        let (before_slash, bank_code) = value.split_once('/')?;
        if bank_code.len() != BANK_CODE_DIGITS || !all_ascii_digits(bank_code) {
            return None;
        }

        let (prefix, base) = match before_slash.split_once('-') {
            Some((prefix, base)) => {
                // A bare leading '-' is allowed; it reads as "no prefix".
                if prefix.len() > PREFIX_MAX_DIGITS || !all_ascii_digits(prefix) {
                    return None;
                }
                (Some(prefix), base)
            }
            None => (None, before_slash),
        };

        if base.len() < BASE_MIN_DIGITS || base.len() > BASE_MAX_DIGITS || !all_ascii_digits(base)
        {
            return None;
        }

        Some(Self {
            prefix: prefix.map(str::to_string),
            base: base.to_string(),
            bank_code: bank_code.to_string(),
        })
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn bank_code(&self) -> &str {
        &self.bank_code
    }

    /// Check the optional prefix. An absent or empty prefix passes: there is
    /// nothing to check.
    pub fn prefix_checksum_ok(&self) -> bool {
        match self.prefix.as_deref() {
            None | Some("") => true,
            Some(prefix) => weighted_mod11(prefix, &PREFIX_WEIGHTS),
        }
    }

    /// Check the basic part. Always applies.
    pub fn base_checksum_ok(&self) -> bool {
        weighted_mod11(&self.base, &BASE_WEIGHTS)
    }
}

/// Weighted digit sum, valid iff divisible by 11.
///
/// The scheme pads the number with zeros on the left to the full weight
/// width; padding zeros contribute nothing to the sum, so pairing digits and
/// weights from the right is equivalent and skips the padding entirely.
fn weighted_mod11(digits: &str, weights: &[u32]) -> bool {
    let sum: u32 = digits
        .chars()
        .rev()
        .zip(weights.iter().rev())
        .filter_map(|(c, weight)| c.to_digit(10).map(|digit| digit * weight))
        .sum();

    sum % MODULO == 0
}

fn all_ascii_digits(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit())
}

/// Outcome of validating one candidate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Format, checksums and bank code all check out.
    Valid,
    /// The input was empty: nothing to validate. Counts as valid for
    /// pipeline purposes, optional-field semantics.
    SkippedEmpty,
    /// At least one check failed.
    Invalid(FailureReason),
}

impl Verdict {
    /// True unless a check actually failed; an empty input is acceptable.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Verdict::Invalid(_))
    }
}

/// The first check that failed. Reported in logs; violation records carry
/// only the configured message key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Malformed,
    PrefixChecksum,
    BaseChecksum,
    UnknownBankCode,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::Malformed => "value does not match the expected format",
            FailureReason::PrefixChecksum => "prefix fails the mod-11 checksum",
            FailureReason::BaseChecksum => "account number fails the mod-11 checksum",
            FailureReason::UnknownBankCode => "bank code does not belong to a known bank",
        };
        f.write_str(text)
    }
}

/// Validate a candidate account number against the bundled bank registry.
pub fn validate(value: &str) -> Verdict {
    validate_with(value, BankRegistry::bundled())
}

/// Validate a candidate account number against a caller-supplied registry.
///
/// The empty string short-circuits to [`Verdict::SkippedEmpty`] before any
/// parsing; a non-empty value that fails the grammar is malformed. Checks run
/// format, prefix, base, bank code in that order and stop at the first
/// failure, so the reported reason is the earliest one.
pub fn validate_with(value: &str, registry: &BankRegistry) -> Verdict {
    if value.is_empty() {
        return Verdict::SkippedEmpty;
    }

    let Some(account) = AccountNumber::parse(value) else {
        return Verdict::Invalid(FailureReason::Malformed);
    };

    if !account.prefix_checksum_ok() {
        return Verdict::Invalid(FailureReason::PrefixChecksum);
    }

    if !account.base_checksum_ok() {
        return Verdict::Invalid(FailureReason::BaseChecksum);
    }

    if registry.name_for(account.bank_code()).is_none() {
        return Verdict::Invalid(FailureReason::UnknownBankCode);
    }

    Verdict::Valid
}
