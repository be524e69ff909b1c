//! Prompts for model-assisted invoice extraction.

/// System role sent with every extraction request.
pub const SYSTEM_PROMPT: &str = "You are an invoice data extraction assistant.";

/// Fields requested from the model, in prompt order.
const REQUESTED_FIELDS: &str = "\
- Invoice Number
- Invoice Date
- Due Date
- Customer Name
- Place of Supply
- Item Details (including Item Name, Quantity, Rate, Tax Percentage, Tax Amount, and Total Amount for each item)
- Total Taxable Amount
- Total Tax Amount
- Total Amount
- Total Discount
- Payment Details (such as UPI ID, Bank Account, IFSC Code, Bank Name, Branch, etc.)";

/// Example of the JSON shape the model must return.
pub const SCHEMA_EXAMPLE: &str = r#"{
    "Invoice Number": "INV-001",
    "Invoice Date": "01 Jan 2024",
    "Due Date": "10 Jan 2024",
    "Customer Name": "John Doe",
    "Place of Supply": "California",
    "Item Details": [
        {
            "Item Name": "Product A",
            "Quantity": 2,
            "Rate": 100,
            "Tax Percentage": 10,
            "Tax Amount": 20,
            "Total Amount": 220
        }
    ],
    "Total Taxable Amount": 200,
    "Total Tax Amount": 20,
    "Total Amount": 220,
    "Total Discount": 0,
    "Payment Details": {
        "UPI ID": "john.doe@upi",
        "Bank Account": "1234567890",
        "IFSC Code": "IFSC0001234",
        "Bank": "Bank of America",
        "Branch": "Downtown Branch"
    }
}"#;

/// Build the user prompt for one invoice. The text is embedded verbatim.
pub fn build_extraction_prompt(invoice_text: &str) -> String {
    format!(
        "Extract the following details from the invoice text:\n\
         {REQUESTED_FIELDS}\n\n\
         Here's the invoice text:\n\
         {invoice_text}\n\n\
         Return the data in strictly valid JSON format, without any additional explanations or comments. Example:\n\
         {SCHEMA_EXAMPLE}\n"
    )
}
