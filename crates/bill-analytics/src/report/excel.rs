//! Spreadsheet export: one worksheet per report section

use chrono::Datelike;
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook};

use super::table::{sheets, Cell};
use super::ReportData;
use crate::error::ExportError;

const FIRST_COLUMN_WIDTH: f64 = 24.0;
const COLUMN_WIDTH: f64 = 16.0;

/// Render the report as an .xlsx workbook
pub fn render(report: &ReportData) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    // Pin the creation date to the report date so identical reports give
    // identical files
    let date = report.generated_at.date();
    let created = ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
    let properties = DocProperties::new()
        .set_title("Utility Bill Analysis Report")
        .set_creation_datetime(&created);
    workbook.set_properties(&properties);

    let bold = Format::new().set_bold();

    for sheet in sheets(report) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name)?;
        worksheet.set_column_width(0, FIRST_COLUMN_WIDTH)?;

        let widest = sheet.rows.iter().map(Vec::len).max().unwrap_or(0);
        for col in 1..widest {
            worksheet.set_column_width(col as u16, COLUMN_WIDTH)?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_num = row_idx as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = col_idx as u16;
                match cell {
                    Cell::Text(text) if row_idx == 0 => {
                        worksheet.write_string_with_format(row_num, col_num, text, &bold)?;
                    }
                    Cell::Text(text) => {
                        worksheet.write_string(row_num, col_num, text)?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(row_num, col_num, *value)?;
                    }
                    Cell::Empty => {}
                }
            }
        }
    }

    // A workbook needs at least one sheet
    if report.is_blank() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Report")?;
        worksheet.write_string(0, 0, "No sections selected")?;
        worksheet.write_string(1, 0, report.timestamp())?;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::full_report;

    #[test]
    fn test_render_produces_zip_container() {
        let bytes = render(&full_report()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = full_report();
        assert_eq!(render(&report).unwrap(), render(&report).unwrap());
    }

    #[test]
    fn test_blank_report_still_renders() {
        let mut report = full_report();
        report.overview = None;
        report.monthly_trends = None;
        report.utility_breakdown = None;
        report.budget_analysis = None;
        report.savings_progress = None;
        report.anomalies = None;
        report.predictions = None;
        report.year_comparison = None;
        assert!(render(&report).unwrap().starts_with(b"PK"));
    }
}
