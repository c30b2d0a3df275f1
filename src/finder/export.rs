//! CSV export of projected rows.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

use super::Row;
use crate::error::ExportError;

/// UTF-8 byte-order mark. Spreadsheet software uses it to detect the
/// encoding, without it CJK category names come out garbled.
const BYTE_ORDER_MARK: &[u8] = b"\xEF\xBB\xBF";

/// Writes projected rows as CSV under a header of column labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvExport {
    byte_order_mark: bool,
}

impl Default for CsvExport {
    fn default() -> Self {
        Self {
            byte_order_mark: true,
        }
    }
}

impl CsvExport {
    /// Creates an exporter that writes a byte-order mark.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns the leading byte-order mark on or off.
    #[must_use]
    pub const fn with_byte_order_mark(mut self, enabled: bool) -> Self {
        self.byte_order_mark = enabled;
        self
    }

    /// Writes `labels` as the header row, then one record per row.
    ///
    /// Row values are written in the row's own key order; [`FieldValue::Null`]
    /// becomes an empty cell. Every row is checked before anything is
    /// written.
    ///
    /// # Errors
    ///
    /// [`ExportError::ColumnMismatch`] if a row's width differs from the
    /// number of labels, or a CSV/IO error from the writer.
    ///
    /// [`FieldValue::Null`]: super::FieldValue::Null
    pub fn write<W, S>(&self, mut writer: W, labels: &[S], rows: &[Row]) -> Result<(), ExportError>
    where
        W: Write,
        S: AsRef<str>,
    {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != labels.len())
        {
            return Err(ExportError::ColumnMismatch {
                row,
                width: values.len(),
                labels: labels.len(),
            });
        }

        if self.byte_order_mark {
            writer.write_all(BYTE_ORDER_MARK)?;
        }

        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(labels.iter().map(AsRef::as_ref))?;
        for row in rows {
            csv.write_record(row.values().map(ToString::to_string))?;
        }
        csv.flush()?;

        Ok(())
    }

    /// Renders the export into a string.
    ///
    /// # Errors
    ///
    /// See [`CsvExport::write`].
    pub fn to_csv_string<S: AsRef<str>>(
        &self,
        labels: &[S],
        rows: &[Row],
    ) -> Result<String, ExportError> {
        let mut buffer = Vec::new();
        self.write(&mut buffer, labels, rows)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Writes the export to a file, creating or truncating it.
    ///
    /// # Errors
    ///
    /// See [`CsvExport::write`]. Also fails if the file cannot be created.
    pub fn write_to_path<S: AsRef<str>>(
        &self,
        path: impl AsRef<Path>,
        labels: &[S],
        rows: &[Row],
    ) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.write(BufWriter::new(file), labels, rows)
    }
}

/// File name for an export made today: `materials_YYYY-MM-DD.csv`.
#[must_use]
pub fn default_export_file_name() -> String {
    format!("materials_{}.csv", Local::now().format("%Y-%m-%d"))
}
