use crate::account::Verdict;
use anyhow::{bail, Context, Result};
use csv::{Reader, Writer};
use encoding_rs::WINDOWS_1250;
use log::warn;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Cursor;

const WARN_LIMIT: usize = 25;

/// Read a CSV file into memory, accepting UTF-8 or, failing that,
/// Windows-1250 as still produced by older Czech banking exports.
pub(crate) fn read_input_text(path: &str) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read input file {path}"))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let bytes = err.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1250.decode(&bytes);
            if had_errors {
                bail!("Input file {path} is neither valid UTF-8 nor Windows-1250");
            }
            Ok(decoded.into_owned())
        }
    }
}

/// Header row of a CSV file, decoded the same way as checked input.
pub fn read_headers(path: &str) -> Result<Vec<String>> {
    let contents = read_input_text(path)?;
    let mut reader = Reader::from_reader(Cursor::new(contents));
    Ok(reader.headers()?.iter().map(|h| h.to_string()).collect())
}

/// A validation rule bound to one column. Rules receive the raw cell and are
/// expected to do their own trimming; empty cells come back as
/// [`Verdict::SkippedEmpty`] rather than a failure.
pub trait ValueRule {
    fn check(&self, value: &str, row: &RowContext) -> Verdict;
    /// Stable key identifying the violation, e.g. `bankAccountNumber.format`.
    fn message_key(&self) -> &str;
    fn description(&self) -> &str;
}

#[derive(Debug)]
pub struct RowContext<'a> {
    headers: &'a [String],
    values: &'a [String],
    row_index: usize,
}

impl<'a> RowContext<'a> {
    pub fn new(headers: &'a [String], values: &'a [String], row_index: usize) -> Self {
        Self {
            headers,
            values,
            row_index,
        }
    }

    /// Get the current row index (0-based, excluding header)
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.values.get(i).map(|s| s.as_str()))
    }

    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).map(str::trim).unwrap_or("")
    }
}

/// One failed check: which cell, what it held, and the message key of the
/// rule that rejected it. The key is deliberately the only error detail a
/// violation carries; the specific reason goes to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// 1-based data row number, headers excluded.
    pub row: usize,
    pub column: String,
    pub value: String,
    pub message_key: String,
}

pub struct CsvChecker {
    column_rules: BTreeMap<String, Box<dyn ValueRule>>,
    mark_rejected: bool,
}

impl Default for CsvChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvChecker {
    pub fn new() -> Self {
        Self {
            column_rules: BTreeMap::new(),
            mark_rejected: false,
        }
    }

    pub fn add_column_rule<V>(mut self, column: &str, rule: V) -> Self
    where
        V: ValueRule + 'static,
    {
        self.column_rules.insert(column.to_string(), Box::new(rule));
        self
    }

    /// Keep rejected rows in the output, marked with a leading `#` in the
    /// first cell, instead of dropping them.
    pub fn mark_rejected(mut self, mark: bool) -> Self {
        self.mark_rejected = mark;
        self
    }

    /// Check a CSV file and write the accepted rows to `output_path`.
    pub fn check_file(&self, input_path: &str, output_path: &str) -> Result<CheckStats> {
        let contents = read_input_text(input_path)?;
        let mut reader = Reader::from_reader(Cursor::new(contents));
        self.check_csv_reader(&mut reader, output_path)
    }

    /// Internal method to check CSV from any reader
    pub(crate) fn check_csv_reader<R: std::io::Read>(
        &self,
        reader: &mut Reader<R>,
        output_path: &str,
    ) -> Result<CheckStats> {
        let headers_snapshot = reader.headers()?.clone();
        let headers: Vec<String> = headers_snapshot.iter().map(|h| h.to_string()).collect();

        let header_map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        let missing: Vec<&str> = self
            .column_rules
            .keys()
            .map(String::as_str)
            .filter(|column| !header_map.contains_key(*column))
            .collect();
        if !missing.is_empty() {
            bail!(
                "Column(s) not present in the CSV header: {}",
                missing.join(", ")
            );
        }

        let output_file = File::create(output_path).context("Failed to create output file")?;
        let mut writer = Writer::from_writer(output_file);

        // Write headers to output unchanged
        writer.write_record(&headers)?;

        let mut stats = CheckStats::new();
        let mut violation_logging_suppressed = false;

        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut row_values: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            if row_values.len() < headers.len() {
                row_values.resize(headers.len(), String::new());
            }

            let mut row_valid = true;

            // Every ruled column is checked even after the row has failed, so
            // one pass reports all violations a row carries.
            for (column_name, rule) in &self.column_rules {
                let Some(&col_index) = header_map.get(column_name) else {
                    continue;
                };
                let value = row_values.get(col_index).cloned().unwrap_or_default();
                let row_context = RowContext::new(&headers, &row_values, row_idx);

                match rule.check(&value, &row_context) {
                    Verdict::Valid => {
                        stats.cells_checked += 1;
                    }
                    Verdict::SkippedEmpty => {
                        stats.cells_skipped_empty += 1;
                    }
                    Verdict::Invalid(reason) => {
                        stats.cells_checked += 1;
                        row_valid = false;

                        stats.violations.push(Violation {
                            row: row_idx + 1,
                            column: column_name.clone(),
                            value: value.clone(),
                            message_key: rule.message_key().to_string(),
                        });

                        if stats.violations.len() <= WARN_LIMIT {
                            warn!(
                                "Validation failed for column '{}' at row {} using rule '{}'. Value='{}'. Reason: {}.",
                                column_name,
                                row_idx + 1,
                                rule.description(),
                                value,
                                reason
                            );
                        } else if !violation_logging_suppressed {
                            warn!(
                                "More than {} violations encountered. Suppressing additional violation logs to avoid noise.",
                                WARN_LIMIT
                            );
                            violation_logging_suppressed = true;
                        }
                    }
                }
            }

            if row_valid {
                writer.write_record(&row_values)?;
                stats.rows_written += 1;
            } else {
                stats.rows_rejected += 1;
                if self.mark_rejected {
                    if let Some(first_cell) = row_values.first_mut() {
                        if !first_cell.starts_with('#') {
                            first_cell.insert(0, '#');
                        }
                    }
                    writer.write_record(&row_values)?;
                }
            }
        }

        for column_name in self.column_rules.keys() {
            stats.columns_checked.insert(column_name.clone());
        }

        writer.flush()?;
        Ok(stats)
    }
}

#[derive(Debug, Default)]
pub struct CheckStats {
    /// Rows that passed every rule and were written out.
    pub rows_written: usize,
    /// Rows with at least one violation. Marked rows count here too.
    pub rows_rejected: usize,
    pub cells_checked: usize,
    pub cells_skipped_empty: usize,
    pub violations: Vec<Violation>,
    pub columns_checked: std::collections::HashSet<String>,
}

impl CheckStats {
    pub fn new() -> Self {
        Self::default()
    }
}
