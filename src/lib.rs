pub mod account;
pub mod bank_report;
pub mod cli;
pub mod csv_checker;
pub mod google_sheets;
pub mod registry;
pub mod rules;

pub use account::{validate, validate_with, AccountNumber, FailureReason, Verdict};
pub use bank_report::{BankReport, BankReportStats};
pub use cli::{Cli, Commands};
pub use csv_checker::{read_headers, CheckStats, CsvChecker, RowContext, ValueRule, Violation};
pub use registry::BankRegistry;
pub use rules::{BankAccountRule, VariableSymbolRule, ACCOUNT_COLUMN_ALIASES};
