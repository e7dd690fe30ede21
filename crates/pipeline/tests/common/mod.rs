//! Shared fixtures for the pipeline integration tests.
#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use zip::write::SimpleFileOptions;

use promoflow_core::validation::{Rule, ValidationReport};
use promoflow_core::PromotionRecord;
use promoflow_db::{RecordSink, SinkError};
use promoflow_events::{NotifyOutcome, StatusNotifier, StatusReport};

/// Raw spreadsheet headers in source order.
pub const HEADERS: [&str; 10] = [
    "Year",
    "week number",
    "Product",
    "Price",
    "Discount",
    "Units",
    "Sales $",
    "Gross Margin $",
    "# Transactions that contained the product",
    "On Flyer?",
];

#[derive(Debug, Clone)]
pub enum Cell {
    Text(String),
    Num(f64),
    Blank,
}

pub fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

/// One data row in [`HEADERS`] order.
#[allow(clippy::too_many_arguments)]
pub fn promo_row(
    year: f64,
    week: f64,
    product: &str,
    price: f64,
    discount: f64,
    units: f64,
    sales: f64,
    margin: f64,
    transactions: f64,
    on_flyer: &str,
) -> Vec<Cell> {
    vec![
        Cell::Num(year),
        Cell::Num(week),
        text(product),
        Cell::Num(price),
        Cell::Num(discount),
        Cell::Num(units),
        Cell::Num(sales),
        Cell::Num(margin),
        Cell::Num(transactions),
        text(on_flyer),
    ]
}

pub fn header_row() -> Vec<Cell> {
    HEADERS.iter().map(|h| text(h)).collect()
}

// ---------------------------------------------------------------------------
// Spreadsheet writer
// ---------------------------------------------------------------------------

/// Write a minimal `.xlsx` with one worksheet per entry of `sheets`.
///
/// Strings are stored inline so no shared-string table is needed.
pub fn write_xlsx(path: &Path, sheets: &[(&str, Vec<Vec<Cell>>)]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut put = |name: &str, body: String| {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    };

    let overrides: String = (1..=sheets.len())
        .map(|i| {
            format!(
                r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            )
        })
        .collect();
    put(
        "[Content_Types].xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>{overrides}</Types>"#
        ),
    );
    put(
        "_rels/.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
            .to_string(),
    );

    let sheet_entries: String = sheets
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(name),
                i + 1,
                i + 1
            )
        })
        .collect();
    put(
        "xl/workbook.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_entries}</sheets></workbook>"#
        ),
    );

    let relationships: String = (1..=sheets.len())
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
            )
        })
        .collect();
    put(
        "xl/_rels/workbook.xml.rels",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
        ),
    );

    for (i, (_, rows)) in sheets.iter().enumerate() {
        put(&format!("xl/worksheets/sheet{}.xml", i + 1), sheet_xml(rows));
    }

    zip.finish().unwrap();
}

fn sheet_xml(rows: &[Vec<Cell>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        let r = r + 1;
        xml.push_str(&format!(r#"<row r="{r}">"#));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{r}", column_letter(c));
            match cell {
                Cell::Text(s) => xml.push_str(&format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    escape(s)
                )),
                Cell::Num(n) => xml.push_str(&format!(r#"<c r="{reference}"><v>{n}</v></c>"#)),
                Cell::Blank => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn column_letter(index: usize) -> char {
    assert!(index < 26, "fixture sheets stay within column Z");
    (b'A' + index as u8) as char
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Write `rows` under `headers` as CSV.
pub fn write_csv(path: &Path, headers: &[&str], rows: &[Vec<&str>]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(headers).unwrap();
    for row in rows {
        writer.write_record(row).unwrap();
    }
    writer.flush().unwrap();
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Sink that keeps every written record in memory.
#[derive(Default)]
pub struct RecordingSink {
    pub records: Mutex<Vec<PromotionRecord>>,
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn write(&self, records: &[PromotionRecord]) -> Result<u64, SinkError> {
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(records.len() as u64)
    }
}

/// Notifier that keeps every report it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    pub reports: Mutex<Vec<StatusReport>>,
}

#[async_trait]
impl StatusNotifier for RecordingNotifier {
    async fn notify(&self, report: &StatusReport) -> NotifyOutcome {
        self.reports.lock().unwrap().push(report.clone());
        NotifyOutcome::Sent
    }
}

/// Total violations recorded for `rule`.
pub fn violations(report: &ValidationReport, rule: Rule) -> u64 {
    report
        .findings
        .iter()
        .filter(|f| f.rule == rule)
        .map(|f| f.violations)
        .sum()
}
