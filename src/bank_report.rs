use crate::account::AccountNumber;
use crate::csv_checker::read_input_text;
use crate::registry::BankRegistry;
use anyhow::{Context, Result};
use csv::{Reader, Writer};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Cursor;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BankReportStats {
    pub unique_banks: usize,
    pub total_rows: usize,
    /// Rows whose account cell was empty or not parseable.
    pub skipped_rows: usize,
    /// Distinct bank codes with no registry entry.
    pub unknown_codes: usize,
}

pub struct BankReport;

impl BankReport {
    /// Summarize a payment CSV by receiving bank: one output row per bank
    /// code seen in `account_column`, with the institution name and the
    /// number of accounts pointing at it, ordered by code.
    ///
    /// Rows are grouped by parsed bank code only; checksums are not applied
    /// here, that is the checker's job.
    pub fn generate(
        input_path: &str,
        output_path: &str,
        account_column: &str,
        registry: &BankRegistry,
    ) -> Result<BankReportStats> {
        let contents = read_input_text(input_path)?;
        let mut reader = Reader::from_reader(Cursor::new(contents));

        let headers = reader.headers()?.clone();
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

        let account_idx = headers
            .iter()
            .position(|h| h == account_column)
            .with_context(|| format!("Column '{}' not found in CSV", account_column))?;

        let mut bank_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut stats = BankReportStats::default();

        for result in reader.records() {
            let record = result?;
            stats.total_rows += 1;

            let value = record.get(account_idx).map(str::trim).unwrap_or("");
            if value.is_empty() {
                stats.skipped_rows += 1;
                continue;
            }

            match AccountNumber::parse(value) {
                Some(account) => {
                    *bank_counts
                        .entry(account.bank_code().to_string())
                        .or_insert(0) += 1;
                }
                None => {
                    stats.skipped_rows += 1;
                }
            }
        }

        stats.unique_banks = bank_counts.len();

        let output_file = File::create(output_path).context("Failed to create output file")?;
        let mut writer = Writer::from_writer(output_file);

        writer.write_record(["bank_code", "bank_name", "accounts"])?;

        for (bank_code, count) in bank_counts {
            let bank_name = registry.name_for(&bank_code).unwrap_or("");
            if bank_name.is_empty() {
                stats.unknown_codes += 1;
            }

            let count_str = count.to_string();
            writer.write_record([bank_code.as_str(), bank_name, count_str.as_str()])?;
        }

        writer.flush()?;
        Ok(stats)
    }
}
