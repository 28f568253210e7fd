//! Single-page A4 PDF rendering
//!
//! Text is laid out top-down from the page margin. Content that runs past
//! the bottom edge is clipped; the report has no pagination.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::ReportData;
use crate::constants::{
    MONTH_LABELS, PDF_BODY_SIZE, PDF_HEADING_GAP, PDF_HEADING_SIZE, PDF_LEFT_MARGIN,
    PDF_LINE_HEIGHT, PDF_PAGE_HEIGHT, PDF_PAGE_WIDTH, PDF_SECTION_GAP, PDF_TITLE_SIZE,
    PDF_TOP_MARGIN, QUARTER_LABELS,
};
use crate::error::ExportError;

/// One positioned line of text
#[derive(Debug, Clone, PartialEq)]
pub(super) struct TextLine {
    pub text: String,
    pub size: i64,
    pub y: f32,
}

struct Cursor {
    y: f32,
    lines: Vec<TextLine>,
}

impl Cursor {
    fn new() -> Self {
        Self {
            y: PDF_PAGE_HEIGHT - PDF_TOP_MARGIN,
            lines: Vec::new(),
        }
    }

    fn text(&mut self, text: impl Into<String>, size: i64) {
        self.lines.push(TextLine {
            text: text.into(),
            size,
            y: self.y,
        });
        self.y -= PDF_LINE_HEIGHT;
    }

    fn body(&mut self, text: impl Into<String>) {
        self.text(text, PDF_BODY_SIZE);
    }

    fn heading(&mut self, text: &str) {
        self.text(text, PDF_HEADING_SIZE);
        self.y -= PDF_HEADING_GAP;
    }

    fn gap(&mut self, amount: f32) {
        self.y -= amount;
    }
}

/// Encode text for the WinAnsi font encoding. Characters outside it
/// become '?'.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

fn money(value: f64) -> String {
    format!("${:.2}", value)
}

/// Lay out every present section
pub(super) fn layout(report: &ReportData) -> Vec<TextLine> {
    let mut page = Cursor::new();

    page.text("Utility Bill Analysis Report", PDF_TITLE_SIZE);
    page.body(format!("Generated on {}", report.timestamp()));
    page.gap(PDF_SECTION_GAP);

    if let Some(overview) = &report.overview {
        page.heading("Overview");
        page.body(format!("Total Bills: {}", overview.total_bills));
        page.body(format!("Total Spent: {}", money(overview.total_spent)));
        page.body(format!("Average Bill: {}", money(overview.average_spent)));
        page.body(format!("Highest Bill: {}", money(overview.highest_bill)));
        page.body(format!("Lowest Bill: {}", money(overview.lowest_bill)));
        page.gap(PDF_SECTION_GAP);
    }

    if let Some(trends) = &report.monthly_trends {
        page.heading(&format!("Monthly Trends ({})", trends.year));
        let quarters: Vec<String> = QUARTER_LABELS
            .iter()
            .zip(trends.quarterly)
            .map(|(label, amount)| format!("{} {}", label, money(amount)))
            .collect();
        page.body(quarters.join("   "));
        match trends.peak_month() {
            Some((month, amount)) => {
                page.body(format!("Peak Month: {} ({})", MONTH_LABELS[month], money(amount)))
            }
            None => page.body("Peak Month: none"),
        }
        if let Some(next) = trends.predictions.first() {
            page.body(format!("Next Trend Point: {} {}", next.month, money(next.amount)));
        }
        if let Some(line) = trends.monthly_budget {
            page.body(format!("Monthly Budget: {}", money(line)));
        }
        page.gap(PDF_SECTION_GAP);
    }

    if let Some(breakdown) = &report.utility_breakdown {
        page.heading("Utility Breakdown");
        for share in breakdown {
            page.body(format!(
                "{}: {} ({:.1}%)",
                share.utility_type,
                money(share.amount),
                share.share
            ));
        }
        page.gap(PDF_SECTION_GAP);
    }

    if let Some(budget) = &report.budget_analysis {
        page.heading("Budget Analysis");
        page.body(format!("Budget: {}", money(budget.budget)));
        page.body(format!("Actual Spending: {}", money(budget.spent)));
        let direction = if budget.variance >= 0.0 { "Over" } else { "Under" };
        page.body(format!("Variance: {} ({})", money(budget.variance.abs()), direction));
        page.gap(PDF_SECTION_GAP);
    }

    if let Some(savings) = &report.savings_progress {
        page.heading("Savings Progress");
        page.body(format!("Target: {}", money(savings.target)));
        page.body(format!("Saved: {}", money(savings.saved.max(0.0))));
        page.body(format!("Progress: {:.1}%", savings.progress));
        page.gap(PDF_SECTION_GAP);
    }

    if let Some(anomalies) = report.anomalies.as_ref().filter(|a| !a.is_empty()) {
        page.heading("Spending Anomalies");
        for anomaly in anomalies {
            page.body(format!("Date: {}", anomaly.bill.bill_date.format("%Y-%m-%d")));
            let deviation = anomaly
                .deviation
                .map_or_else(|| "n/a".to_string(), |d| format!("{:.1}%", d));
            page.body(format!(
                "Amount: {} ({} deviation)",
                money(anomaly.bill.amount),
                deviation
            ));
            page.gap(PDF_HEADING_GAP);
        }
        page.gap(PDF_SECTION_GAP - PDF_HEADING_GAP);
    }

    if let Some(forecast) = &report.predictions {
        page.heading("Budget Forecast");
        page.body(format!(
            "Average Monthly Change: {:.1}%",
            forecast.average_change * 100.0
        ));
        if let (Some(first), Some(last)) = (forecast.points.first(), forecast.points.last()) {
            page.body(format!("{}: {}", first.month, money(first.amount)));
            if forecast.points.len() > 1 {
                page.body(format!("{}: {}", last.month, money(last.amount)));
            }
        }
        page.gap(PDF_SECTION_GAP);
    }

    if let Some(yoy) = &report.year_comparison {
        page.heading(&format!("Year Comparison ({} vs {})", yoy.year, yoy.comparison_year));
        page.body(format!("{} Total: {}", yoy.year, money(yoy.current_total)));
        page.body(format!("{} Total: {}", yoy.comparison_year, money(yoy.comparison_total)));
        let change = yoy
            .percentage_change
            .map_or_else(|| "n/a".to_string(), |c| format!("{:+.1}%", c));
        page.body(format!("Change: {}", change));
        page.gap(PDF_SECTION_GAP);
    }

    page.lines
}

/// Render the report as PDF bytes
pub fn render(report: &ReportData) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut operations = Vec::new();
    for line in layout(report) {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), line.size.into()]));
        operations.push(Operation::new(
            "Td",
            vec![Object::Real(PDF_LEFT_MARGIN), Object::Real(line.y)],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(win_ansi(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(PDF_PAGE_WIDTH),
            Object::Real(PDF_PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::full_report;

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render(&full_report()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert!(contains(&bytes, "Utility Bill Analysis Report"));
        assert!(contains(&bytes, "Budget Analysis"));
        assert!(contains(&bytes, "Generated on 2024-06-30 09:30:00"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = full_report();
        assert_eq!(render(&report).unwrap(), render(&report).unwrap());
    }

    #[test]
    fn test_layout_positions() {
        let lines = layout(&full_report());
        assert_eq!(lines[0].text, "Utility Bill Analysis Report");
        assert_eq!(lines[0].size, PDF_TITLE_SIZE);
        assert!((lines[0].y - (PDF_PAGE_HEIGHT - 50.0)).abs() < 1e-3);
        // title, timestamp, then a section gap before the first heading
        assert_eq!(lines[2].text, "Overview");
        assert!((lines[1].y - lines[2].y - 40.0).abs() < 1e-3);
        // heading gap before the first body line
        assert!((lines[2].y - lines[3].y - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_budget_variance_direction() {
        let lines = layout(&full_report());
        assert!(lines.iter().any(|l| l.text == "Variance: $160.00 (Over)"));
    }

    #[test]
    fn test_blank_report_has_title_only() {
        let mut report = full_report();
        report.overview = None;
        report.monthly_trends = None;
        report.utility_breakdown = None;
        report.budget_analysis = None;
        report.savings_progress = None;
        report.anomalies = None;
        report.predictions = None;
        report.year_comparison = None;
        assert_eq!(layout(&report).len(), 2);
    }

    #[test]
    fn test_text_is_win_ansi_encoded() {
        assert_eq!(win_ansi("Gas"), b"Gas".to_vec());
        assert_eq!(win_ansi("Été"), vec![0xC9, b't', 0xE9]);
        assert_eq!(win_ansi("\u{20AC}5"), vec![0x80, b'5']);
        assert_eq!(win_ansi("水道"), b"??".to_vec());
    }

    #[test]
    fn test_custom_utility_name_renders_in_font_encoding() {
        let mut report = full_report();
        if let Some(breakdown) = report.utility_breakdown.as_mut() {
            breakdown[0].utility_type = "Énergie".to_string();
        }
        let bytes = render(&report).unwrap();
        assert!(contains(&bytes, "/WinAnsiEncoding"));
        // raw byte or octal escape, depending on the writer
        assert!(bytes.windows(7).any(|w| w == b"\xC9nergie") || contains(&bytes, "\\311nergie"));
        assert!(!contains(&bytes, "Énergie"));
    }
}
