//! CSV export: one file per report section

use csv::WriterBuilder;

use super::table::{sheets, Sheet};
use super::{ExportedFile, ReportData};
use crate::error::ExportError;

fn file_name(sheet: &Sheet) -> String {
    format!("{}.csv", sheet.name.to_lowercase().replace(' ', "_"))
}

fn write_sheet(sheet: &Sheet) -> Result<Vec<u8>, ExportError> {
    // Rows have different widths (titles, spacers)
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    for row in &sheet.rows {
        if row.is_empty() {
            writer.write_record([""])?;
        } else {
            writer.write_record(row.iter().map(|cell| cell.to_field()))?;
        }
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// Render every present section as its own CSV file
pub fn render(report: &ReportData) -> Result<Vec<ExportedFile>, ExportError> {
    sheets(report)
        .iter()
        .map(|sheet| {
            Ok(ExportedFile {
                name: file_name(sheet),
                bytes: write_sheet(sheet)?,
            })
        })
        .collect()
}
