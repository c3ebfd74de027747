use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use kontrola::{
    read_headers, validate_with, AccountNumber, BankAccountRule, BankRegistry, BankReport,
    BankReportStats, CheckStats, Cli, Commands, CsvChecker, VariableSymbolRule, Verdict,
    ACCOUNT_COLUMN_ALIASES,
};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn generate_output_filename(input: &str) -> String {
    let path = Path::new(input);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("csv");

    if let Some(parent) = path.parent() {
        parent
            .join(format!("{}-checked.{}", stem, extension))
            .to_string_lossy()
            .to_string()
    } else {
        format!("{}-checked.{}", stem, extension)
    }
}

fn generate_sheets_output_filename() -> String {
    "sheets-output-checked.csv".to_string()
}

fn generate_report_filename(checked_path: &str) -> String {
    let path = Path::new(checked_path);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("banks");
    let file_name = format!("{}-banks.csv", stem);

    if let Some(parent) = path.parent() {
        parent.join(file_name).to_string_lossy().to_string()
    } else {
        file_name
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Check { accounts, registry }) => {
            check_values(accounts, registry.as_deref())?;
        }
        Some(Commands::Banks { registry }) => {
            list_banks(registry.as_deref())?;
        }
        Some(Commands::BankReport {
            input,
            url,
            output,
            account_column,
            registry,
        }) => {
            let output_path = output
                .clone()
                .unwrap_or_else(|| "bank-report.csv".to_string());
            run_bank_report(
                input.as_deref(),
                url.as_deref(),
                &output_path,
                account_column.as_deref(),
                registry.as_deref(),
            )?;
        }
        None => match (cli.input.as_deref(), cli.url.as_deref()) {
            (Some(input_path), None) => {
                let output_path = cli
                    .output
                    .clone()
                    .unwrap_or_else(|| generate_output_filename(input_path));
                check_file(input_path, &output_path, &cli)?;
            }
            (None, Some(url)) => {
                let output_path = cli
                    .output
                    .clone()
                    .unwrap_or_else(generate_sheets_output_filename);
                check_sheets(url, &output_path, &cli)?;
            }
            (Some(_), Some(_)) => {
                anyhow::bail!("Specify either a file path or --url, not both");
            }
            (None, None) => {
                anyhow::bail!(
                    "No input provided. Pass a file path or use --url with a Google Sheets link"
                );
            }
        },
    }

    Ok(())
}

fn init_logging() {
    let env = Env::default().filter_or("RUST_LOG", "warn");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .format_target(false)
        .try_init();
}

fn load_registry(path: Option<&str>) -> Result<Option<BankRegistry>> {
    path.map(BankRegistry::from_toml_path).transpose()
}

/// Pick the column to check: an explicit name wins, otherwise the header is
/// probed for the usual candidates.
fn resolve_account_column(input: &str, explicit: Option<&str>) -> Result<String> {
    if let Some(column) = explicit {
        return Ok(column.to_string());
    }

    let headers = read_headers(input)?;
    for candidate in ACCOUNT_COLUMN_ALIASES {
        if headers.iter().any(|h| h == candidate) {
            return Ok((*candidate).to_string());
        }
    }

    anyhow::bail!(
        "No account number column found; looked for {}. Use --account-column to name it",
        ACCOUNT_COLUMN_ALIASES.join(", ")
    )
}

fn build_checker(
    account_column: &str,
    symbol_column: Option<&str>,
    registry: Option<&BankRegistry>,
    mark: bool,
) -> CsvChecker {
    println!("Checking column '{}' as a bank account number", account_column);

    let mut rule = BankAccountRule::new();
    if let Some(registry) = registry {
        rule = rule.with_registry(registry.clone());
    }

    let mut checker = CsvChecker::new()
        .add_column_rule(account_column, rule)
        .mark_rejected(mark);

    if let Some(symbol_column) = symbol_column {
        println!("Checking column '{}' as a variable symbol", symbol_column);
        checker = checker.add_column_rule(symbol_column, VariableSymbolRule::new());
    }

    checker
}

fn check_file(input: &str, output: &str, cli: &Cli) -> Result<()> {
    // Validate input file exists
    if !Path::new(input).exists() {
        anyhow::bail!("Input file does not exist: {}", input);
    }

    println!("Checking file: {}", input);

    run_check(input, output, cli)
}

fn check_sheets(url: &str, output: &str, cli: &Cli) -> Result<()> {
    println!("Checking Google Sheets URL: {}", url);

    // Show the converted CSV URL for transparency
    let csv_url = CsvChecker::sheets_export_url(url)?;
    println!("CSV export URL: {}", csv_url);

    let csv_data = CsvChecker::fetch_sheets_csv(url)?;
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(csv_data.as_bytes())?;

    let temp_path = temp_file.path().to_path_buf();
    let path_str = temp_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Temporary file path is not valid UTF-8"))?;

    run_check(path_str, output, cli)
}

fn run_check(input: &str, output: &str, cli: &Cli) -> Result<()> {
    let registry = load_registry(cli.registry.as_deref())?;
    let account_column = resolve_account_column(input, cli.account_column.as_deref())?;

    let checker = build_checker(
        &account_column,
        cli.symbol_column.as_deref(),
        registry.as_ref(),
        cli.mark,
    );
    let stats = checker.check_file(input, output)?;

    println!("Check complete!");
    println!("{} rows passed", stats.rows_written);

    if stats.rows_rejected > 0 {
        println!(
            "WARNING: {} rows rejected with {} violations",
            stats.rows_rejected,
            stats.violations.len()
        );
    }

    println!("Output written to: {}", output);

    if cli.stats {
        print_detailed_stats(&stats);
    }

    if cli.full {
        let report_output = cli
            .report_output
            .clone()
            .unwrap_or_else(|| generate_report_filename(output));
        let registry_ref = registry.as_ref().unwrap_or_else(|| BankRegistry::bundled());
        let report_stats =
            BankReport::generate(output, &report_output, &account_column, registry_ref)?;
        print_bank_report_summary(&report_stats, &report_output);
    }

    if cli.strict && !stats.violations.is_empty() {
        anyhow::bail!("{} violations recorded", stats.violations.len());
    }

    Ok(())
}

fn check_values(accounts: &[String], registry_path: Option<&str>) -> Result<()> {
    let custom = load_registry(registry_path)?;
    let registry = custom.as_ref().unwrap_or_else(|| BankRegistry::bundled());

    let mut failures = 0usize;
    for value in accounts {
        let trimmed = value.trim();
        match validate_with(trimmed, registry) {
            Verdict::Valid => {
                let bank_name = AccountNumber::parse(trimmed)
                    .and_then(|account| registry.name_for(account.bank_code()).map(str::to_string));
                match bank_name {
                    Some(name) => println!("{}: valid ({})", value, name),
                    None => println!("{}: valid", value),
                }
            }
            Verdict::SkippedEmpty => {
                println!("{}: empty, nothing to check", value);
            }
            Verdict::Invalid(reason) => {
                println!("{}: INVALID ({})", value, reason);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!(
            "{} of {} account numbers failed validation",
            failures,
            accounts.len()
        );
    }

    Ok(())
}

fn list_banks(registry_path: Option<&str>) -> Result<()> {
    let custom = load_registry(registry_path)?;
    let registry = custom.as_ref().unwrap_or_else(|| BankRegistry::bundled());

    let mut listed = 0usize;
    for code in registry.codes() {
        if let Some(name) = registry.name_for(code) {
            println!("{}  {}", code, name);
            listed += 1;
        }
    }
    println!("{} banks", listed);

    Ok(())
}

fn run_bank_report(
    input: Option<&str>,
    url: Option<&str>,
    output: &str,
    account_column: Option<&str>,
    registry_path: Option<&str>,
) -> Result<()> {
    match (input, url) {
        (Some(path), None) => bank_report_from_path(path, output, account_column, registry_path),
        (None, Some(link)) => bank_report_from_url(link, output, account_column, registry_path),
        (Some(_), Some(_)) => {
            anyhow::bail!("Specify either a file path or --url for bank-report, not both")
        }
        (None, None) => {
            anyhow::bail!("No input provided for bank-report. Pass a file path or use --url.")
        }
    }
}

fn bank_report_from_path(
    input: &str,
    output: &str,
    account_column: Option<&str>,
    registry_path: Option<&str>,
) -> Result<()> {
    if !Path::new(input).exists() {
        anyhow::bail!("Input file does not exist: {}", input);
    }

    println!("Generating bank report from: {}", input);

    let custom = load_registry(registry_path)?;
    let registry = custom.as_ref().unwrap_or_else(|| BankRegistry::bundled());
    let column = resolve_account_column(input, account_column)?;

    let stats = BankReport::generate(input, output, &column, registry)?;
    print_bank_report_summary(&stats, output);

    Ok(())
}

fn bank_report_from_url(
    url: &str,
    output: &str,
    account_column: Option<&str>,
    registry_path: Option<&str>,
) -> Result<()> {
    println!("Generating bank report from Google Sheets URL: {}", url);

    let csv_data = CsvChecker::fetch_sheets_csv(url)?;
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(csv_data.as_bytes())?;

    let temp_path = temp_file.path().to_path_buf();
    let path_str = temp_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Temporary file path is not valid UTF-8"))?;

    let custom = load_registry(registry_path)?;
    let registry = custom.as_ref().unwrap_or_else(|| BankRegistry::bundled());
    let column = resolve_account_column(path_str, account_column)?;

    let stats = BankReport::generate(path_str, output, &column, registry)?;
    print_bank_report_summary(&stats, output);

    Ok(())
}

fn print_bank_report_summary(stats: &BankReportStats, output: &str) {
    println!("\u{2713} Bank report generated!");
    println!("  - Banks seen: {}", stats.unique_banks);
    println!("  - Rows read: {}", stats.total_rows);
    println!("  - Output written to: {}", output);

    if stats.skipped_rows > 0 {
        println!(
            "  \u{26a0} Skipped {} rows without a parseable account number",
            stats.skipped_rows
        );
    }

    if stats.unknown_codes > 0 {
        println!(
            "  \u{26a0} {} bank codes not found in the registry",
            stats.unknown_codes
        );
    }
}

fn print_detailed_stats(stats: &CheckStats) {
    println!("\nDetailed Statistics:");
    println!("- Rows passed: {}", stats.rows_written);
    println!("- Rows rejected: {}", stats.rows_rejected);
    println!("- Cells checked: {}", stats.cells_checked);
    println!("- Empty cells skipped: {}", stats.cells_skipped_empty);
    println!("- Columns checked: {}", stats.columns_checked.len());

    if !stats.columns_checked.is_empty() {
        println!(
            "  Columns: {}",
            stats
                .columns_checked
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if !stats.violations.is_empty() {
        let mut by_key: BTreeMap<&str, usize> = BTreeMap::new();
        for violation in &stats.violations {
            *by_key.entry(violation.message_key.as_str()).or_insert(0) += 1;
        }
        println!("- Violations by message key:");
        for (key, count) in by_key {
            println!("  {}: {}", key, count);
        }
    }
}
