//! Flattening extraction results into CSV reports.
//!
//! Both strategies share one column layout. The regex strategy fills only
//! its own fields and leaves every other column as [`SENTINEL`]; the model
//! strategy produces one row per line item with header and payment values
//! repeated on each row.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::batch::{Extracted, FieldExtraction};
use crate::error::ReportError;
use crate::invoice::{
    Field, FieldRecord, HeaderField, InvoiceRecord, ItemField, PaymentField, SENTINEL,
};
use crate::invoice::record::cell_text;

/// Report columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    File,
    Field(Field),
    Header(HeaderField),
    Payment(PaymentField),
    Item(ItemField),
}

impl Column {
    /// Every column in output order.
    pub fn all() -> Vec<Column> {
        let mut columns = vec![Column::File];
        columns.extend(
            Field::ALL
                .into_iter()
                .map(Column::for_field)
                .filter(|c| matches!(c, Column::Field(_))),
        );
        columns.extend(HeaderField::ALL.into_iter().map(Column::Header));
        columns.extend(PaymentField::ALL.into_iter().map(Column::Payment));
        columns.extend(ItemField::ALL.into_iter().map(Column::Item));
        columns
    }

    /// Header label.
    pub fn label(self) -> &'static str {
        match self {
            Column::File => "File",
            Column::Field(f) => f.label(),
            Column::Header(h) => h.key(),
            Column::Payment(p) => p.key(),
            Column::Item(ItemField::TotalAmount) => "Total Amount per Item",
            Column::Item(i) => i.key(),
        }
    }

    /// The column a regex field lands in.
    ///
    /// Fields the model strategy also produces share its header column.
    fn for_field(field: Field) -> Column {
        match field {
            Field::InvoiceNumber => Column::Header(HeaderField::InvoiceNumber),
            Field::InvoiceDate => Column::Header(HeaderField::InvoiceDate),
            Field::DueDate => Column::Header(HeaderField::DueDate),
            Field::TotalAmount => Column::Header(HeaderField::TotalAmount),
            other => Column::Field(other),
        }
    }
}

/// One report row.
///
/// A column absent from the row renders as [`SENTINEL`]; a column present
/// with `None` renders empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
    cells: BTreeMap<Column, Option<String>>,
}

impl FlatRow {
    /// Row with only the `File` cell set.
    pub fn new(filename: &str) -> Self {
        let mut row = Self::default();
        row.set(Column::File, Some(filename.to_string()));
        row
    }

    /// Set one cell. `None` renders as an empty cell.
    pub fn set(&mut self, column: Column, value: Option<String>) {
        self.cells.insert(column, value);
    }

    /// Rendered cell text.
    pub fn cell(&self, column: Column) -> &str {
        match self.cells.get(&column) {
            None => SENTINEL,
            Some(None) => "",
            Some(Some(v)) => v,
        }
    }

    /// Cells in column order.
    pub fn render(&self, columns: &[Column]) -> Vec<&str> {
        columns.iter().map(|c| self.cell(*c)).collect()
    }
}

/// Row for one regex-strategy document.
pub fn flatten_fields(filename: &str, record: &FieldRecord) -> FlatRow {
    let mut row = FlatRow::new(filename);
    for (field, value) in record.iter() {
        if let Some(v) = value {
            row.set(Column::for_field(field), Some(v.to_string()));
        }
    }
    row
}

/// Rows for one model-strategy invoice: one per line item.
///
/// An invoice without line items yields no rows. A field the model omitted
/// or set to `null` renders as an empty cell.
pub fn flatten_record(filename: &str, record: &InvoiceRecord) -> Vec<FlatRow> {
    let mut base = FlatRow::new(filename);
    for field in HeaderField::ALL {
        base.set(Column::Header(field), record.header(field).map(cell_text));
    }
    for field in PaymentField::ALL {
        base.set(Column::Payment(field), record.payment(field).map(cell_text));
    }

    record
        .line_items()
        .map(|item| {
            let mut row = base.clone();
            for field in ItemField::ALL {
                row.set(Column::Item(field), item.get(field).map(cell_text));
            }
            row
        })
        .collect()
}

/// An ordered set of rows ready to be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    rows: Vec<FlatRow>,
}

impl Report {
    /// Report over already flattened rows.
    pub fn new(rows: Vec<FlatRow>) -> Self {
        Self { rows }
    }

    /// One row per regex result.
    pub fn from_field_results(results: &[Extracted<FieldExtraction>]) -> Self {
        Self::new(
            results
                .iter()
                .map(|r| flatten_fields(&r.filename, &r.value.fields))
                .collect(),
        )
    }

    /// One row per line item across all model results, in input order.
    pub fn from_invoice_results(results: &[Extracted<InvoiceRecord>]) -> Self {
        Self::new(
            results
                .iter()
                .flat_map(|r| flatten_record(&r.filename, &r.value))
                .collect(),
        )
    }

    /// Rows in the order they will be written.
    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    /// Number of data rows, not counting the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Writes reports as CSV with a fixed header row.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    columns: Vec<Column>,
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportWriter {
    /// Writer using the full column layout.
    pub fn new() -> Self {
        Self {
            columns: Column::all(),
        }
    }

    /// Write the header and every row. A report with no rows still gets
    /// its header.
    pub fn write_to<W: Write>(&self, report: &Report, writer: W) -> Result<(), ReportError> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(self.columns.iter().map(|c| c.label()))?;
        for row in report.rows() {
            out.write_record(row.render(&self.columns))?;
        }
        out.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Render the report into memory.
    pub fn to_bytes(&self, report: &Report) -> Result<Vec<u8>, ReportError> {
        let mut out = Vec::new();
        self.write_to(report, &mut out)?;
        Ok(out)
    }

    /// Write `<prefix>_<YYYYmmdd_HHMMSS>.csv` into `dir`, never replacing an
    /// existing file. Returns the path written.
    pub fn write_to_dir(
        &self,
        report: &Report,
        dir: &Path,
        prefix: &str,
    ) -> Result<PathBuf, ReportError> {
        let bytes = self.to_bytes(report)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = persist_unique(dir, prefix, &stamp, &bytes)?;

        info!("Wrote {} rows to {}", report.len(), path.display());
        Ok(path)
    }
}

/// Write `bytes` to the first free `<prefix>_<stamp>[_n].csv` in `dir`.
///
/// A file that was created but could not be written is removed again.
fn persist_unique(
    dir: &Path,
    prefix: &str,
    stamp: &str,
    bytes: &[u8],
) -> Result<PathBuf, ReportError> {
    let (path, mut file) = create_unique(dir, prefix, stamp)?;

    if let Err(source) = file.write_all(bytes).and_then(|_| file.flush()) {
        drop(file);
        let _ = std::fs::remove_file(&path);
        return Err(ReportError::Write { path, source });
    }
    Ok(path)
}

fn create_unique(
    dir: &Path,
    prefix: &str,
    stamp: &str,
) -> Result<(PathBuf, std::fs::File), ReportError> {
    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            format!("{}_{}.csv", prefix, stamp)
        } else {
            format!("{}_{}_{}.csv", prefix, stamp, suffix)
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => suffix += 1,
            Err(source) => return Err(ReportError::Write { path, source }),
        }
    }
}
