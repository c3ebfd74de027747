pub mod bank_account;
pub mod variable_symbol;

pub use bank_account::{BankAccountRule, ACCOUNT_COLUMN_ALIASES};
pub use variable_symbol::VariableSymbolRule;
