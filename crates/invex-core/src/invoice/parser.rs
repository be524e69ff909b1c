//! Rule-based parser for labeled invoice fields.

use tracing::debug;

use super::fields::{Field, FieldRecord};
use super::patterns::pattern_for;

/// Regex field parser.
///
/// Assumes invoices with labeled fields ("Invoice Number: X"). Templated or
/// tabular invoices will simply come back mostly unmatched; that is a valid
/// result, not an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldParser;

impl FieldParser {
    /// Parser over the eight field patterns.
    pub fn new() -> Self {
        Self
    }

    /// Parse every fixed field out of the raw text.
    pub fn parse(&self, text: &str) -> FieldRecord {
        let mut record = FieldRecord::new();

        for field in Field::ALL {
            if let Some(value) = self.extract_field(field, text) {
                record.set(field, value);
            }
        }

        debug!(
            "Matched {}/{} fields in {} characters of text",
            record.matched_count(),
            Field::ALL.len(),
            text.len()
        );

        record
    }

    /// First capture of the first match, trimmed. Empty captures count as unmatched.
    fn extract_field(&self, field: Field, text: &str) -> Option<String> {
        let caps = pattern_for(field).captures(text)?;
        let value = caps.get(1)?.as_str().trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::fields::SENTINEL;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_labeled_invoice() {
        let text = r#"
            Company Name: Sharma Electronics Pvt Ltd
            GSTIN: 27ABCDE1234F1Z5
            Invoice Number: INV-2024-001
            Invoice Date: 15/01/2024
            Due Date: 2024-01-29
            Phone: +919876543210
            Email: billing@sharma.example.in
            Total Amount: 1,150.00
        "#;

        let record = FieldParser::new().parse(text);

        assert_eq!(record.get(Field::CompanyName), Some("Sharma Electronics Pvt Ltd"));
        assert_eq!(record.get(Field::Gstin), Some("27ABCDE1234F1Z5"));
        assert_eq!(record.get(Field::InvoiceNumber), Some("INV-2024-001"));
        assert_eq!(record.get(Field::InvoiceDate), Some("15/01/2024"));
        assert_eq!(record.get(Field::DueDate), Some("2024-01-29"));
        assert_eq!(record.get(Field::CustomerPhone), Some("+919876543210"));
        assert_eq!(record.get(Field::CustomerEmail), Some("billing@sharma.example.in"));
        assert_eq!(record.get(Field::TotalAmount), Some("1,150.00"));
        assert_eq!(record.matched_count(), 8);
    }

    #[test]
    fn test_partial_match_uses_sentinel() {
        let text = "Invoice Number: INV-2024-001\nTotal Amount: 150.00\n";
        let map = FieldParser::new().parse(text).to_display_map();

        assert_eq!(map["Invoice Number"], "INV-2024-001");
        assert_eq!(map["Total Amount"], "150.00");
        for field in Field::ALL {
            if field != Field::InvoiceNumber && field != Field::TotalAmount {
                assert_eq!(map[field.label()], SENTINEL, "{}", field);
            }
        }
    }

    #[test]
    fn test_no_matches_is_not_an_error() {
        let record = FieldParser::new().parse("Tax invoice\nThank you for your business");
        assert_eq!(record.matched_count(), 0);
        assert_eq!(record.iter().count(), 8);
        assert!(record.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "Company Name: Acme\nGSTIN: 29AAACA1234A1Z1\nDue Date: 01-02-2024";
        let parser = FieldParser::new();
        assert_eq!(parser.parse(text), parser.parse(text));
    }

    #[test]
    fn test_first_match_wins() {
        let text = "Invoice Number: FIRST-1\nInvoice Number: SECOND-2";
        let record = FieldParser::new().parse(text);
        assert_eq!(record.get(Field::InvoiceNumber), Some("FIRST-1"));
    }

    #[test]
    fn test_company_name_on_next_line() {
        let text = "Company Name:\nNorthwind Traders\nGSTIN: X1";
        let record = FieldParser::new().parse(text);
        assert_eq!(record.get(Field::CompanyName), Some("Northwind Traders"));
    }
}
