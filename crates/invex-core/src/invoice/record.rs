//! Nested invoice records produced by the model strategy.
//!
//! The model's JSON is kept as-is: no schema is enforced, absent fields read
//! as `None`, and extra fields pass through untouched. Typed accessors below
//! know where each field lives.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the line-item array.
pub const ITEMS_KEY: &str = "Item Details";

/// Key of the payment sub-object.
pub const PAYMENT_KEY: &str = "Payment Details";

/// Top-level invoice fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeaderField {
    InvoiceNumber,
    InvoiceDate,
    DueDate,
    CustomerName,
    PlaceOfSupply,
    TotalTaxableAmount,
    TotalTaxAmount,
    TotalAmount,
    TotalDiscount,
}

impl HeaderField {
    pub const ALL: [HeaderField; 9] = [
        HeaderField::InvoiceNumber,
        HeaderField::InvoiceDate,
        HeaderField::DueDate,
        HeaderField::CustomerName,
        HeaderField::PlaceOfSupply,
        HeaderField::TotalTaxableAmount,
        HeaderField::TotalTaxAmount,
        HeaderField::TotalAmount,
        HeaderField::TotalDiscount,
    ];

    /// JSON key in the model's output.
    pub fn key(self) -> &'static str {
        match self {
            HeaderField::InvoiceNumber => "Invoice Number",
            HeaderField::InvoiceDate => "Invoice Date",
            HeaderField::DueDate => "Due Date",
            HeaderField::CustomerName => "Customer Name",
            HeaderField::PlaceOfSupply => "Place of Supply",
            HeaderField::TotalTaxableAmount => "Total Taxable Amount",
            HeaderField::TotalTaxAmount => "Total Tax Amount",
            HeaderField::TotalAmount => "Total Amount",
            HeaderField::TotalDiscount => "Total Discount",
        }
    }
}

/// Fields of the payment sub-object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaymentField {
    UpiId,
    BankAccount,
    IfscCode,
    Bank,
    Branch,
}

impl PaymentField {
    pub const ALL: [PaymentField; 5] = [
        PaymentField::UpiId,
        PaymentField::BankAccount,
        PaymentField::IfscCode,
        PaymentField::Bank,
        PaymentField::Branch,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PaymentField::UpiId => "UPI ID",
            PaymentField::BankAccount => "Bank Account",
            PaymentField::IfscCode => "IFSC Code",
            PaymentField::Bank => "Bank",
            PaymentField::Branch => "Branch",
        }
    }
}

/// Fields of one line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemField {
    ItemName,
    Quantity,
    Rate,
    TaxPercentage,
    TaxAmount,
    TotalAmount,
}

impl ItemField {
    pub const ALL: [ItemField; 6] = [
        ItemField::ItemName,
        ItemField::Quantity,
        ItemField::Rate,
        ItemField::TaxPercentage,
        ItemField::TaxAmount,
        ItemField::TotalAmount,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ItemField::ItemName => "Item Name",
            ItemField::Quantity => "Quantity",
            ItemField::Rate => "Rate",
            ItemField::TaxPercentage => "Tax Percentage",
            ItemField::TaxAmount => "Tax Amount",
            ItemField::TotalAmount => "Total Amount",
        }
    }
}

/// One invoice as returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceRecord(Map<String, Value>);

impl InvoiceRecord {
    /// Wrap a JSON value. Only objects are invoice records.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Raw JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// A header value; `None` when absent.
    pub fn header(&self, field: HeaderField) -> Option<&Value> {
        self.0.get(field.key())
    }

    /// A payment value; `None` when the field or the whole sub-object is absent.
    pub fn payment(&self, field: PaymentField) -> Option<&Value> {
        self.0
            .get(PAYMENT_KEY)
            .and_then(Value::as_object)
            .and_then(|p| p.get(field.key()))
    }

    /// Line items in model order.
    ///
    /// A missing or non-array item field yields nothing; non-object entries
    /// are skipped.
    pub fn line_items(&self) -> impl Iterator<Item = LineItem<'_>> {
        self.0
            .get(ITEMS_KEY)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .map(LineItem)
    }
}

/// Borrowed view of one line item.
#[derive(Debug, Clone, Copy)]
pub struct LineItem<'a>(&'a Map<String, Value>);

impl<'a> LineItem<'a> {
    /// Raw value of one item field. `None` if the key is absent.
    pub fn get(&self, field: ItemField) -> Option<&'a Value> {
        self.0.get(field.key())
    }
}

/// Render a JSON value as a report cell.
///
/// `null` becomes an empty cell; strings are unquoted; everything else uses
/// its compact JSON text.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
