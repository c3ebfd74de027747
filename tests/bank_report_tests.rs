use anyhow::Result;
use kontrola::{BankRegistry, BankReport};
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

fn create_test_csv(path: &str, content: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[test]
fn test_bank_report_basic() -> Result<()> {
    let dir = tempdir()?;
    let input_path = dir.path().join("payments.csv");
    let output_path = dir.path().join("bank-report.csv");

    let csv_content = "payment_id,account_number,amount\n\
                      1,19-2000145399/0800,1200\n\
                      2,178124-4159/0710,500\n\
                      3,1111111111/0100,300\n\
                      4,19/0800,400\n";

    create_test_csv(input_path.to_str().unwrap(), csv_content)?;

    let stats = BankReport::generate(
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
        "account_number",
        BankRegistry::bundled(),
    )?;

    assert_eq!(stats.unique_banks, 3);
    assert_eq!(stats.total_rows, 4);
    assert_eq!(stats.skipped_rows, 0);
    assert_eq!(stats.unknown_codes, 0);

    let output_content = std::fs::read_to_string(&output_path)?;
    let mut reader = csv::Reader::from_reader(output_content.as_bytes());

    let headers = reader.headers()?.clone();
    assert_eq!(headers, csv::StringRecord::from(vec!["bank_code", "bank_name", "accounts"]));

    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    assert_eq!(records.len(), 3);

    // Rows come out ordered by bank code
    assert_eq!(&records[0][0], "0100");
    assert_eq!(&records[0][1], "Komerční banka, a.s.");
    assert_eq!(&records[0][2], "1");

    assert_eq!(&records[1][0], "0710");
    assert_eq!(&records[1][1], "ČESKÁ NÁRODNÍ BANKA");
    assert_eq!(&records[1][2], "1");

    assert_eq!(&records[2][0], "0800");
    assert_eq!(&records[2][1], "Česká spořitelna, a.s.");
    assert_eq!(&records[2][2], "2");

    Ok(())
}

#[test]
fn test_bank_report_skips_unparseable_rows() -> Result<()> {
    let dir = tempdir()?;
    let input_path = dir.path().join("payments.csv");
    let output_path = dir.path().join("bank-report.csv");

    // Grouping only needs the grammar; a failed checksum still counts toward
    // its bank, that distinction belongs to the checker.
    let csv_content = "payment_id,account_number\n\
                      1,19/0800\n\
                      2,\n\
                      3,not-an-account\n\
                      4,1234567890/0100\n";

    create_test_csv(input_path.to_str().unwrap(), csv_content)?;

    let stats = BankReport::generate(
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
        "account_number",
        BankRegistry::bundled(),
    )?;

    assert_eq!(stats.total_rows, 4);
    assert_eq!(stats.skipped_rows, 2);
    assert_eq!(stats.unique_banks, 2);

    let output_content = std::fs::read_to_string(&output_path)?;
    assert!(output_content.contains("0100"));
    assert!(output_content.contains("0800"));
    assert!(!output_content.contains("not-an-account"));

    Ok(())
}

#[test]
fn test_bank_report_counts_unknown_codes() -> Result<()> {
    let dir = tempdir()?;
    let input_path = dir.path().join("payments.csv");
    let output_path = dir.path().join("bank-report.csv");

    let csv_content = "payment_id,account_number\n\
                      1,19/9999\n\
                      2,19/0800\n\
                      3,35/9999\n";

    create_test_csv(input_path.to_str().unwrap(), csv_content)?;

    let stats = BankReport::generate(
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
        "account_number",
        BankRegistry::bundled(),
    )?;

    assert_eq!(stats.unique_banks, 2);
    assert_eq!(stats.unknown_codes, 1);

    // Unknown codes keep their row, with an empty name
    let output_content = std::fs::read_to_string(&output_path)?;
    assert!(output_content.contains("9999,,2"));

    Ok(())
}

#[test]
fn test_bank_report_missing_column() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("payments.csv");
    let output_path = dir.path().join("bank-report.csv");

    let csv_content = "payment_id,amount\n1,1200\n";
    create_test_csv(input_path.to_str().unwrap(), csv_content).unwrap();

    let result = BankReport::generate(
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
        "account_number",
        BankRegistry::bundled(),
    );

    assert!(result.is_err());
}

#[test]
fn test_bank_report_custom_column() -> Result<()> {
    let dir = tempdir()?;
    let input_path = dir.path().join("payments.csv");
    let output_path = dir.path().join("bank-report.csv");

    let csv_content = "id,ucet\n1,19/0800\n2,35/0800\n";

    create_test_csv(input_path.to_str().unwrap(), csv_content)?;

    let stats = BankReport::generate(
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
        "ucet",
        BankRegistry::bundled(),
    )?;

    assert_eq!(stats.unique_banks, 1);
    assert_eq!(stats.total_rows, 2);

    let output_content = std::fs::read_to_string(&output_path)?;
    assert!(output_content.contains("0800"));
    assert!(output_content.contains(",2"));

    Ok(())
}

#[test]
fn test_bank_report_with_custom_registry() -> Result<()> {
    let dir = tempdir()?;
    let input_path = dir.path().join("payments.csv");
    let output_path = dir.path().join("bank-report.csv");

    let csv_content = "payment_id,account_number\n1,19/9999\n";

    create_test_csv(input_path.to_str().unwrap(), csv_content)?;

    let registry = BankRegistry::from_toml_str("[banks]\n\"9999\" = \"Test Bank\"\n")?;
    let stats = BankReport::generate(
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
        "account_number",
        &registry,
    )?;

    assert_eq!(stats.unique_banks, 1);
    assert_eq!(stats.unknown_codes, 0);

    let output_content = std::fs::read_to_string(&output_path)?;
    assert!(output_content.contains("9999,Test Bank,1"));

    Ok(())
}
