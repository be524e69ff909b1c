//! Flat field records produced by the regex strategy.

use std::collections::BTreeMap;
use std::fmt;

/// Placeholder rendered for a field that was not found.
pub const SENTINEL: &str = "N/A";

/// The fixed set of fields the regex strategy looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    CompanyName,
    Gstin,
    CustomerPhone,
    CustomerEmail,
    InvoiceNumber,
    InvoiceDate,
    DueDate,
    TotalAmount,
}

impl Field {
    /// Every field, in report order.
    pub const ALL: [Field; 8] = [
        Field::CompanyName,
        Field::Gstin,
        Field::CustomerPhone,
        Field::CustomerEmail,
        Field::InvoiceNumber,
        Field::InvoiceDate,
        Field::DueDate,
        Field::TotalAmount,
    ];

    /// Human-readable label, as used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Field::CompanyName => "Company Name",
            Field::Gstin => "GSTIN",
            Field::CustomerPhone => "Customer Phone",
            Field::CustomerEmail => "Customer Email",
            Field::InvoiceNumber => "Invoice Number",
            Field::InvoiceDate => "Invoice Date",
            Field::DueDate => "Due Date",
            Field::TotalAmount => "Total Amount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Field name to value mapping for one document.
///
/// Unmatched fields are simply absent; every [`Field`] is still reported by
/// [`FieldRecord::iter`] and [`FieldRecord::to_display_map`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    values: BTreeMap<Field, String>,
}

impl FieldRecord {
    /// Record with no matched fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a matched value.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// The matched value, if any.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// All fixed fields in report order, with their value if matched.
    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<&str>)> + '_ {
        Field::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Number of fields that matched.
    pub fn matched_count(&self) -> usize {
        self.values.len()
    }

    /// Label to value map with unmatched fields rendered as [`SENTINEL`].
    pub fn to_display_map(&self) -> BTreeMap<&'static str, String> {
        self.iter()
            .map(|(f, v)| (f.label(), v.unwrap_or(SENTINEL).to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labels_are_distinct() {
        let labels: std::collections::BTreeSet<_> = Field::ALL.iter().map(|f| f.label()).collect();
        assert_eq!(labels.len(), Field::ALL.len());
        assert_eq!(Field::Gstin.to_string(), "GSTIN");
    }

    #[test]
    fn test_display_map_has_every_field() {
        let mut record = FieldRecord::new();
        record.set(Field::Gstin, "22AAAAA0000A1Z5");

        let map = record.to_display_map();
        assert_eq!(map.len(), 8);
        assert_eq!(map["GSTIN"], "22AAAAA0000A1Z5");
        assert_eq!(map["Due Date"], SENTINEL);
    }
}
