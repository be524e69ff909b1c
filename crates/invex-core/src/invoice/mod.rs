//! Invoice field extraction module.

pub mod fields;
mod parser;
pub mod patterns;
pub mod record;

pub use fields::{Field, FieldRecord, SENTINEL};
pub use parser::FieldParser;
pub use record::{HeaderField, InvoiceRecord, ItemField, LineItem, PaymentField};
