//! Regex patterns for labeled invoice fields.
//!
//! Each pattern has exactly one capturing group holding the value.

use lazy_static::lazy_static;
use regex::Regex;

use super::fields::Field;

lazy_static! {
    pub static ref COMPANY_NAME: Regex = Regex::new(
        r"(?i)Company Name:\s*(.*)"
    ).unwrap();

    // GSTIN (Indian GST identification number)
    pub static ref GSTIN: Regex = Regex::new(
        r"GSTIN:\s*(\w+)"
    ).unwrap();

    pub static ref CUSTOMER_PHONE: Regex = Regex::new(
        r"Phone:\s*(\+?\d{10,})"
    ).unwrap();

    pub static ref CUSTOMER_EMAIL: Regex = Regex::new(
        r"Email:\s*([\w.-]+@[\w.-]+)"
    ).unwrap();

    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"Invoice Number:\s*([\w/-]+)"
    ).unwrap();

    // Dates are kept verbatim: 01/02/2024, 2024-02-01, ...
    pub static ref INVOICE_DATE: Regex = Regex::new(
        r"Invoice Date:\s*([\d/-]+)"
    ).unwrap();

    pub static ref DUE_DATE: Regex = Regex::new(
        r"Due Date:\s*([\d/-]+)"
    ).unwrap();

    // 150.00 or 1,500.00
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"Total Amount:\s*(\d{1,3}(?:,\d{3})+\.\d{2}|\d+\.\d{2})"
    ).unwrap();
}

/// The pattern used for a field.
pub fn pattern_for(field: Field) -> &'static Regex {
    match field {
        Field::CompanyName => &COMPANY_NAME,
        Field::Gstin => &GSTIN,
        Field::CustomerPhone => &CUSTOMER_PHONE,
        Field::CustomerEmail => &CUSTOMER_EMAIL,
        Field::InvoiceNumber => &INVOICE_NUMBER,
        Field::InvoiceDate => &INVOICE_DATE,
        Field::DueDate => &DUE_DATE,
        Field::TotalAmount => &TOTAL_AMOUNT,
    }
}
