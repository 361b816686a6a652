//! Filing metadata and optional issuer enrichment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FilingError, Result};

/// Placeholder used for issuer fields the caller did not supply.
pub const UNKNOWN: &str = "unknown";

/// Identity of one filing, shared by every result derived from it.
///
/// Construct it once per document and hand it to the analyzer, detector and
/// linker; each result embeds a copy so consumers never re-derive issuer
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Accession number, globally unique per filing.
    filing_id: String,

    /// Form type, e.g. "8-K" or "10-K".
    filing_type: String,

    company_name: String,

    /// Central Index Key of the issuer.
    cik: String,

    filing_date: NaiveDate,
}

impl DocumentMetadata {
    /// Create metadata with unknown issuer fields.
    pub fn new(
        filing_id: impl Into<String>,
        filing_type: impl Into<String>,
        filing_date: NaiveDate,
    ) -> Self {
        Self {
            filing_id: filing_id.into(),
            filing_type: filing_type.into(),
            company_name: UNKNOWN.to_string(),
            cik: UNKNOWN.to_string(),
            filing_date,
        }
    }

    /// Set the issuer name and CIK.
    pub fn with_issuer(mut self, company_name: impl Into<String>, cik: impl Into<String>) -> Self {
        self.company_name = company_name.into();
        self.cik = cik.into();
        self
    }

    /// Check the caller contract: a filing id and a form type are required.
    pub fn validate(&self) -> Result<()> {
        if self.filing_id.trim().is_empty() {
            return Err(FilingError::InvalidMetadata {
                field: "filing_id",
                reason: "must not be empty",
            });
        }
        if self.filing_type.trim().is_empty() {
            return Err(FilingError::InvalidMetadata {
                field: "filing_type",
                reason: "must not be empty",
            });
        }
        Ok(())
    }

    pub fn filing_id(&self) -> &str {
        &self.filing_id
    }

    pub fn filing_type(&self) -> &str {
        &self.filing_type
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn cik(&self) -> &str {
        &self.cik
    }

    pub fn filing_date(&self) -> NaiveDate {
        self.filing_date
    }

    /// Whether the issuer CIK is known (lookups are skipped otherwise).
    pub fn has_cik(&self) -> bool {
        !self.cik.trim().is_empty() && self.cik != UNKNOWN
    }
}

/// Issuer details returned by an [`IssuerInfoProvider`](crate::traits::issuer::IssuerInfoProvider).
///
/// Field names follow the SEC submissions feed. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerInfo {
    #[serde(default)]
    pub cik: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub tickers: Vec<String>,

    #[serde(default)]
    pub exchanges: Vec<String>,

    /// Standard Industrial Classification description
    #[serde(default)]
    pub sic_description: Option<String>,

    #[serde(default)]
    pub state_of_incorporation: Option<String>,

    /// MMDD
    #[serde(default)]
    pub fiscal_year_end: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()
    }

    #[test]
    fn test_new_defaults_issuer_to_unknown() {
        let meta = DocumentMetadata::new("0000320193-23-000077", "8-K", date());
        assert_eq!(meta.company_name(), UNKNOWN);
        assert_eq!(meta.cik(), UNKNOWN);
        assert!(!meta.has_cik());
    }

    #[test]
    fn test_validate_rejects_blank_filing_id() {
        let meta = DocumentMetadata::new("  ", "8-K", date());
        let err = meta.validate().unwrap_err();
        assert!(matches!(
            err,
            FilingError::InvalidMetadata {
                field: "filing_id",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_blank_form_type() {
        let meta = DocumentMetadata::new("0000320193-23-000077", "", date());
        assert!(meta.validate().is_err());
    }

    #[test]
    fn test_serializes_with_result_field_names() {
        let meta = DocumentMetadata::new("0000320193-23-000077", "8-K", date())
            .with_issuer("APPLE INC", "0000320193");
        let json = serde_json::to_value(&meta).unwrap();

        assert_eq!(json["filing_id"], "0000320193-23-000077");
        assert_eq!(json["filing_type"], "8-K");
        assert_eq!(json["cik"], "0000320193");
        assert_eq!(json["filing_date"], "2023-03-01");
    }

    #[test]
    fn test_issuer_info_reads_submissions_shape() {
        let info: IssuerInfo = serde_json::from_str(
            r#"{
                "cik": "320193",
                "name": "Apple Inc.",
                "tickers": ["AAPL"],
                "exchanges": ["Nasdaq"],
                "sicDescription": "Electronic Computers",
                "fiscalYearEnd": "0930",
                "filings": {"recent": {}}
            }"#,
        )
        .unwrap();

        assert_eq!(info.name.as_deref(), Some("Apple Inc."));
        assert_eq!(info.tickers, vec!["AAPL"]);
        assert_eq!(info.sic_description.as_deref(), Some("Electronic Computers"));
        assert!(info.state_of_incorporation.is_none());
    }
}
