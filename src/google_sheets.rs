use crate::csv_checker::CsvChecker;
use anyhow::{Context, Result};
use url::Url;

fn is_plausible_sheet_id(id: &str) -> bool {
    if id.len() < 2 || id == "edit" {
        return false;
    }

    let starts_alphanumeric = id.chars().next().is_some_and(|c| c.is_alphanumeric());

    starts_alphanumeric && id.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Pull the spreadsheet ID out of a `/spreadsheets/d/<id>/...` path.
fn extract_sheet_id(url: &Url) -> Option<&str> {
    let mut segments = url.path_segments()?;
    if segments.next()? != "spreadsheets" {
        return None;
    }
    if segments.next()? != "d" {
        return None;
    }
    segments.next().filter(|id| !id.is_empty())
}

impl CsvChecker {
    /// Convert a Google Sheets URL to its CSV export URL.
    pub fn sheets_export_url(sheets_url: &str) -> Result<String> {
        let url = Url::parse(sheets_url).context("Invalid Google Sheets URL")?;

        if url.host_str() != Some("docs.google.com") {
            anyhow::bail!(
                "URL must be from docs.google.com, got: {}",
                url.host_str().unwrap_or("unknown")
            );
        }

        let sheet_id = extract_sheet_id(&url)
            .filter(|id| is_plausible_sheet_id(id))
            .with_context(|| {
                format!("Could not extract a spreadsheet ID from URL: {sheets_url}")
            })?;

        Ok(format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
            sheet_id
        ))
    }

    /// Fetch the sheet as CSV text.
    pub fn fetch_sheets_csv(sheets_url: &str) -> Result<String> {
        let csv_url = Self::sheets_export_url(sheets_url)?;

        let response = reqwest::blocking::get(&csv_url)
            .with_context(|| format!("Failed to fetch spreadsheet CSV from: {}", csv_url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "HTTP error {} while fetching spreadsheet data",
                response.status()
            );
        }

        response
            .text()
            .context("Failed to read response body as text")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_id_from_the_document_path() {
        let url =
            Url::parse("https://docs.google.com/spreadsheets/d/1KvCzPayments2026/edit#gid=0")
                .unwrap();
        assert_eq!(extract_sheet_id(&url), Some("1KvCzPayments2026"));
    }

    #[test]
    fn extraction_requires_the_exact_leading_segments() {
        // `/spreadsheets/d/` appearing later in the path does not count
        let rejected = vec![
            "https://docs.google.com/document/d/1KvCzPayments2026/edit",
            "https://docs.google.com/a/example.com/spreadsheets/d/1KvCzPayments2026/edit",
            "https://docs.google.com/spreadsheets/u/0/d/1KvCzPayments2026/edit",
            "https://docs.google.com/spreadsheets/d",
            "https://docs.google.com/spreadsheets/d//edit",
        ];
        for candidate in rejected {
            let url = Url::parse(candidate).unwrap();
            assert_eq!(extract_sheet_id(&url), None, "{}", candidate);
        }
    }

    #[test]
    fn id_plausibility() {
        assert!(is_plausible_sheet_id("1KvCz2026-payments_export"));
        assert!(is_plausible_sheet_id("1a"));

        assert!(!is_plausible_sheet_id("edit"));
        assert!(!is_plausible_sheet_id("1"));
        assert!(!is_plausible_sheet_id(""));
        assert!(!is_plausible_sheet_id("-1KvCzPayments2026"));
        assert!(!is_plausible_sheet_id("_1KvCzPayments2026"));
        assert!(!is_plausible_sheet_id("1KvCz Payments"));
        assert!(!is_plausible_sheet_id("1KvCz/Payments"));
    }

    #[test]
    fn converts_an_edit_url_to_the_csv_export_url() {
        let export = CsvChecker::sheets_export_url(
            "https://docs.google.com/spreadsheets/d/1KvCzPayments2026/edit#gid=0",
        )
        .unwrap();
        assert_eq!(
            export,
            "https://docs.google.com/spreadsheets/d/1KvCzPayments2026/export?format=csv"
        );
    }

    #[test]
    fn accepts_the_usual_link_shapes() {
        let variants = vec![
            "https://docs.google.com/spreadsheets/d/1KvCzPayments2026",
            "https://docs.google.com/spreadsheets/d/1KvCzPayments2026/",
            "https://docs.google.com/spreadsheets/d/1KvCzPayments2026/edit",
            "https://docs.google.com/spreadsheets/d/1KvCzPayments2026/edit?usp=sharing",
        ];
        for url in variants {
            let export = CsvChecker::sheets_export_url(url).unwrap();
            assert_eq!(
                export,
                "https://docs.google.com/spreadsheets/d/1KvCzPayments2026/export?format=csv",
                "{}",
                url
            );
        }
    }

    #[test]
    fn long_ids_round_trip_unchanged() {
        let id = "1oPkzCX6kaK9WB5tebjqBTwpqJqXYAuzuX0DU9nKvCz8";
        let url = format!("https://docs.google.com/spreadsheets/d/{}/edit#gid=251", id);
        let export = CsvChecker::sheets_export_url(&url).unwrap();
        assert!(export.contains(id));
        assert!(export.ends_with("/export?format=csv"));
    }

    #[test]
    fn requires_the_docs_google_host() {
        let foreign = vec![
            "https://drive.google.com/spreadsheets/d/1KvCzPayments2026/edit",
            "https://sheets.example.com/spreadsheets/d/1KvCzPayments2026/edit",
        ];
        for url in foreign {
            let err = CsvChecker::sheets_export_url(url).unwrap_err();
            assert!(err.to_string().contains("docs.google.com"), "{}", url);
        }
    }

    #[test]
    fn rejects_links_without_a_usable_id() {
        let bad = vec![
            "https://docs.google.com/spreadsheets/d/1/edit",
            "https://docs.google.com/spreadsheets/d/-1KvCz/edit",
            "https://docs.google.com/spreadsheets",
            "https://docs.google.com/forms/d/1KvCzPayments2026/edit",
        ];
        for url in bad {
            let err = CsvChecker::sheets_export_url(url).unwrap_err();
            assert!(err.to_string().contains("spreadsheet ID"), "{}: {}", url, err);
        }
    }

    #[test]
    fn rejects_text_that_is_not_a_url() {
        let err = CsvChecker::sheets_export_url("not a link").unwrap_err();
        assert!(err.to_string().contains("Invalid Google Sheets URL"));
    }
}
