use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "kontrola")]
#[command(about = "Checks Czech bank account numbers in payment CSV files")]
#[command(subcommand_negates_reqs = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to input CSV file
    #[arg(
        value_name = "INPUT",
        conflicts_with = "url",
        required_unless_present_any = ["url", "command"]
    )]
    pub input: Option<String>,

    /// Google Sheets URL (edit URL will be converted to CSV export URL)
    #[arg(long, value_name = "URL", conflicts_with = "input")]
    pub url: Option<String>,

    /// Path to output CSV file (defaults vary based on input type)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Column holding the account numbers (auto-detected when omitted)
    #[arg(long, value_name = "COLUMN")]
    pub account_column: Option<String>,

    /// Also check this column as a variable symbol
    #[arg(long, value_name = "COLUMN")]
    pub symbol_column: Option<String>,

    /// TOML bank registry snapshot to use instead of the bundled table
    #[arg(long, value_name = "FILE")]
    pub registry: Option<String>,

    /// Keep rejected rows in the output, marked with a leading '#'
    #[arg(long)]
    pub mark: bool,

    /// Show detailed checking statistics
    #[arg(long)]
    pub stats: bool,

    /// Exit with an error when any violation is recorded
    #[arg(long)]
    pub strict: bool,

    /// Also generate a per-bank report from the checked output
    #[arg(long, conflicts_with = "command")]
    pub full: bool,

    /// File name or path for the bank report when using --full
    #[arg(
        long,
        value_name = "FILE",
        requires = "full",
        conflicts_with = "command"
    )]
    pub report_output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check account numbers given on the command line
    Check {
        /// Account numbers in [prefix-]number/bank_code form
        #[arg(value_name = "ACCOUNT", required = true)]
        accounts: Vec<String>,

        /// TOML bank registry snapshot to use instead of the bundled table
        #[arg(long, value_name = "FILE")]
        registry: Option<String>,
    },

    /// List the bank codes known to the registry
    Banks {
        /// TOML bank registry snapshot to use instead of the bundled table
        #[arg(long, value_name = "FILE")]
        registry: Option<String>,
    },

    /// Summarize a payment CSV by receiving bank
    BankReport {
        /// Path to input CSV file (typically the checked file)
        #[arg(
            value_name = "INPUT",
            conflicts_with = "url",
            required_unless_present = "url"
        )]
        input: Option<String>,

        /// Google Sheets URL to source the data from
        #[arg(
            long,
            value_name = "URL",
            conflicts_with = "input",
            required_unless_present = "input"
        )]
        url: Option<String>,

        /// Path to output CSV file (defaults to 'bank-report.csv')
        #[arg(short, long)]
        output: Option<String>,

        /// Column holding the account numbers (auto-detected when omitted)
        #[arg(long, value_name = "COLUMN")]
        account_column: Option<String>,

        /// TOML bank registry snapshot to use instead of the bundled table
        #[arg(long, value_name = "FILE")]
        registry: Option<String>,
    },
}
